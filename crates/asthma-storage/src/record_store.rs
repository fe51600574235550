//! 评估记录库
//!
//! 整表读写：启动时整体加载，每次追加后整体重写，清空时删除文件。
//! 不做并发控制，多个进程同时写同一文件会互相覆盖。

use crate::columns::RecordSchema;
use crate::export;
use asthma_core::{AsthmaError, AssessmentRecord, HistoryRow, Result, RiskLevel};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 历史列表过滤条件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilter {
    /// 姓名包含（不区分大小写）
    pub patient_name: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &AssessmentRecord) -> bool {
        let name_ok = match &self.patient_name {
            Some(needle) if !needle.trim().is_empty() => record
                .patient_name
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            _ => true,
        };
        let level_ok = self.risk_level.map_or(true, |level| record.risk_level == level);
        name_ok && level_ok
    }
}

/// 记录库
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    feature_columns: Vec<String>,
    records: Vec<AssessmentRecord>,
}

impl RecordStore {
    /// 创建空记录库，`feature_columns` 为当前模型的特征列
    pub fn new(path: impl Into<PathBuf>, feature_columns: Vec<String>) -> Self {
        Self {
            path: path.into(),
            feature_columns,
            records: Vec::new(),
        }
    }

    /// 创建并从磁盘加载
    pub fn open(path: impl Into<PathBuf>, feature_columns: Vec<String>) -> Result<Self> {
        let mut store = Self::new(path, feature_columns);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从磁盘读取全部记录；文件不存在时为空库
    pub fn load(&mut self) -> Result<usize> {
        if !self.path.exists() {
            info!("Record file {} not found, starting empty", self.path.display());
            self.records.clear();
            return Ok(0);
        }

        self.records = read_records(&self.path)?;
        info!(
            "Loaded {} records from {}",
            self.records.len(),
            self.path.display()
        );
        Ok(self.records.len())
    }

    /// 追加一条记录并重写整个文件；写入失败时内存状态不变
    pub fn append(&mut self, record: AssessmentRecord) -> Result<()> {
        let mut next = self.records.clone();
        next.push(record);

        let schema = RecordSchema::covering(&self.feature_columns, &next);
        write_records(&self.path, &schema, &next)?;

        self.records = next;
        debug!("Record store now holds {} records", self.records.len());
        Ok(())
    }

    /// 全部记录，按写入顺序
    pub fn list(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 历史展示列，按条件过滤
    pub fn history(&self, filter: &HistoryFilter) -> Vec<HistoryRow> {
        self.records
            .iter()
            .filter(|record| filter.matches(record))
            .map(AssessmentRecord::to_history_row)
            .collect()
    }

    /// 当前记录对应的表结构
    pub fn schema(&self) -> RecordSchema {
        RecordSchema::covering(&self.feature_columns, &self.records)
    }

    /// 全量导出为 xlsx
    pub fn export_all(&self, path: impl AsRef<Path>) -> Result<usize> {
        export::export_to_path(&self.schema(), &self.records, path)
    }

    pub fn export_to_buffer(&self) -> Result<Vec<u8>> {
        export::export_to_buffer(&self.schema(), &self.records)
    }

    /// 清空内存并删除记录文件
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!("Cleared record store {}", self.path.display());
        Ok(())
    }
}

fn storage_error(path: &Path, e: csv::Error) -> AsthmaError {
    AsthmaError::Storage(format!("{}: {}", path.display(), e))
}

fn read_records(path: &Path) -> Result<Vec<AssessmentRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| storage_error(path, e))?;
    let header: Vec<String> = reader
        .headers()
        .map_err(|e| storage_error(path, e))?
        .iter()
        .map(String::from)
        .collect();

    // 空文件没有表头
    if header.is_empty() {
        return Ok(Vec::new());
    }
    let schema = RecordSchema::from_header(&header)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| storage_error(path, e))?;
        let fields: Vec<String> = row.iter().map(String::from).collect();
        let record = schema.parse_row(&header, &fields).map_err(|e| {
            AsthmaError::Storage(format!("{} row {}: {}", path.display(), line + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// 先写同目录下的临时文件，再整体替换目标文件
fn write_records(path: &Path, schema: &RecordSchema, records: &[AssessmentRecord]) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let staged = tempfile::NamedTempFile::new_in(&dir)?;
    {
        let mut writer = csv::Writer::from_writer(staged.as_file());
        writer
            .write_record(schema.header())
            .map_err(|e| storage_error(path, e))?;
        for record in records {
            writer
                .write_record(schema.text_row(record))
                .map_err(|e| storage_error(path, e))?;
        }
        writer.flush()?;
    }
    staged.as_file().sync_all()?;

    staged
        .persist(path)
        .map_err(|e| AsthmaError::Storage(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{PATIENT_NAME, TRAILING_COLUMNS};
    use asthma_core::{AgeGroup, Diagnosis, FeatureVector, SuggestedAction};
    use calamine::{open_workbook, Reader, Xlsx};

    fn columns() -> Vec<String> {
        ["Age", "BMI", "FEV1_FVC_Ratio", "Smoking"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn record(name: &str, age: f64, risk_percent: f64, level: RiskLevel) -> AssessmentRecord {
        let features: FeatureVector = [
            ("Age", age),
            ("BMI", 22.5),
            ("FEV1_FVC_Ratio", 0.833),
            ("Smoking", 1.0),
        ]
        .into_iter()
        .collect();

        AssessmentRecord {
            patient_name: name.to_string(),
            features,
            prediction: Diagnosis::AsthmaDetected,
            risk_percent,
            risk_level: level,
            age_group: AgeGroup::Adult,
            top_risks: "Smoking".to_string(),
            action: SuggestedAction::LungFunctionTest,
            doctor_note: "follow up, \"spirometry\" in 2 weeks".to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("records.csv"), columns()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_then_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");

        let mut store = RecordStore::open(&path, columns()).unwrap();
        let written = vec![
            record("Ana, Lopez", 34.0, 45.67, RiskLevel::Medium),
            record("Bo", 8.0, 12.0, RiskLevel::Low),
            record("Cy", 71.0, 88.12, RiskLevel::High),
        ];
        for r in &written {
            store.append(r.clone()).unwrap();
        }

        let reloaded = RecordStore::open(&path, columns()).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.list(), written.as_slice());
    }

    #[test]
    fn test_file_has_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");

        let mut store = RecordStore::new(&path, columns());
        store.append(record("Ana", 34.0, 45.67, RiskLevel::Medium)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let first_line = contents.lines().next().unwrap();
        assert_eq!(
            first_line,
            "PatientName,Age,BMI,FEV1_FVC_Ratio,Smoking,Prediction,RiskPercent,RiskLevel,AgeGroup,TopRisks,Action,DoctorNote"
        );
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // 目标路径是目录，写入必然失败
        let mut store = RecordStore::new(dir.path(), columns());

        assert!(store.append(record("Ana", 34.0, 45.67, RiskLevel::Medium)).is_err());
        assert!(store.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_append_replaces_file_instead_of_truncating() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");

        let mut store = RecordStore::new(&path, columns());
        store.append(record("Ana", 34.0, 45.67, RiskLevel::Medium)).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        // 旧句柄仍指向替换前的文件
        let mut old_handle = std::fs::File::open(&path).unwrap();
        store.append(record("Bo", 8.0, 12.0, RiskLevel::Low)).unwrap();

        let mut seen = String::new();
        old_handle.read_to_string(&mut seen).unwrap();
        assert_eq!(seen, first);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);

        // 不留下临时文件
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");

        let mut store = RecordStore::new(&path, columns());
        store.append(record("Ana", 34.0, 45.67, RiskLevel::Medium)).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());

        let reloaded = RecordStore::open(&path, columns()).unwrap();
        assert!(reloaded.is_empty());

        // 再次清空不报错
        store.clear().unwrap();
    }

    #[test]
    fn test_history_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::new(dir.path().join("records.csv"), columns());
        store.append(record("Ana Lopez", 34.0, 45.67, RiskLevel::Medium)).unwrap();
        store.append(record("Bo", 8.0, 12.0, RiskLevel::Low)).unwrap();
        store.append(record("anabel", 71.0, 88.12, RiskLevel::High)).unwrap();

        assert_eq!(store.history(&HistoryFilter::default()).len(), 3);

        let by_name = HistoryFilter {
            patient_name: Some("ANA".to_string()),
            risk_level: None,
        };
        let rows = store.history(&by_name);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].patient_name, "Ana Lopez");

        let by_level = HistoryFilter {
            patient_name: Some("ana".to_string()),
            risk_level: Some(RiskLevel::High),
        };
        let rows = store.history(&by_level);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_name, "anabel");
    }

    #[test]
    fn test_malformed_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(&path, "Name,Score\nAna,3\n").unwrap();

        let err = RecordStore::open(&path, columns()).unwrap_err();
        assert!(matches!(err, AsthmaError::Storage(_)));
    }

    #[test]
    fn test_export_empty_store_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"), columns());
        let xlsx = dir.path().join("export.xlsx");

        assert_eq!(store.export_all(&xlsx).unwrap(), 0);

        let mut workbook: Xlsx<_> = open_workbook(&xlsx).unwrap();
        let range = workbook.worksheet_range(export::SHEET_NAME).unwrap();
        assert_eq!(range.height(), 1);

        let header: Vec<String> = range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        assert_eq!(header.first().map(String::as_str), Some(PATIENT_NAME));
        assert_eq!(header.len(), 1 + columns().len() + TRAILING_COLUMNS.len());
    }

    #[test]
    fn test_export_mirrors_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::new(dir.path().join("records.csv"), columns());
        store.append(record("Ana", 34.0, 45.67, RiskLevel::Medium)).unwrap();
        store.append(record("Bo", 8.0, 12.0, RiskLevel::Low)).unwrap();

        let xlsx = dir.path().join("export.xlsx");
        assert_eq!(store.export_all(&xlsx).unwrap(), 2);

        let mut workbook: Xlsx<_> = open_workbook(&xlsx).unwrap();
        let range = workbook.worksheet_range(export::SHEET_NAME).unwrap();
        assert_eq!(range.height(), 3);

        let second = range.rows().nth(2).unwrap();
        assert_eq!(second[0].to_string(), "Bo");
        assert_eq!(second[1].to_string(), "8");

        let buffer = store.export_to_buffer().unwrap();
        assert!(buffer.starts_with(b"PK"));
    }
}
