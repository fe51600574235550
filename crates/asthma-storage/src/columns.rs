//! 记录文件列定义
//!
//! 列顺序：`PatientName`、特征列、`Prediction` … `DoctorNote`。

use asthma_core::{AsthmaError, AssessmentRecord, FeatureVector, Result};

pub const PATIENT_NAME: &str = "PatientName";
pub const PREDICTION: &str = "Prediction";
pub const RISK_PERCENT: &str = "RiskPercent";
pub const RISK_LEVEL: &str = "RiskLevel";
pub const AGE_GROUP: &str = "AgeGroup";
pub const TOP_RISKS: &str = "TopRisks";
pub const ACTION: &str = "Action";
pub const DOCTOR_NOTE: &str = "DoctorNote";

/// 特征列之后的固定列
pub const TRAILING_COLUMNS: [&str; 7] = [
    PREDICTION,
    RISK_PERCENT,
    RISK_LEVEL,
    AGE_GROUP,
    TOP_RISKS,
    ACTION,
    DOCTOR_NOTE,
];

/// 单元格取值
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Empty,
}

/// 记录表结构
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSchema {
    feature_columns: Vec<String>,
}

impl RecordSchema {
    pub fn new(feature_columns: Vec<String>) -> Self {
        Self { feature_columns }
    }

    /// 以给定特征列为基础，补上记录中出现的额外特征列
    pub fn covering(base: &[String], records: &[AssessmentRecord]) -> Self {
        let mut feature_columns = base.to_vec();
        for record in records {
            for column in record.features.columns() {
                if !feature_columns.contains(column) {
                    feature_columns.push(column.clone());
                }
            }
        }
        Self { feature_columns }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn header(&self) -> Vec<&str> {
        std::iter::once(PATIENT_NAME)
            .chain(self.feature_columns.iter().map(String::as_str))
            .chain(TRAILING_COLUMNS)
            .collect()
    }

    /// 按列顺序展开一条记录
    pub fn cells<'a>(&self, record: &'a AssessmentRecord) -> Vec<Cell<'a>> {
        let mut cells = Vec::with_capacity(self.feature_columns.len() + 8);
        cells.push(Cell::Text(&record.patient_name));
        for column in &self.feature_columns {
            cells.push(match record.features.get(column) {
                Some(value) => Cell::Number(value),
                None => Cell::Empty,
            });
        }
        cells.push(Cell::Text(record.prediction.as_str()));
        cells.push(Cell::Number(record.risk_percent));
        cells.push(Cell::Text(record.risk_level.as_str()));
        cells.push(Cell::Text(record.age_group.as_str()));
        cells.push(Cell::Text(&record.top_risks));
        cells.push(Cell::Text(record.action.as_str()));
        cells.push(Cell::Text(&record.doctor_note));
        cells
    }

    /// CSV 文本行
    pub fn text_row(&self, record: &AssessmentRecord) -> Vec<String> {
        self.cells(record)
            .into_iter()
            .map(|cell| match cell {
                Cell::Text(text) => text.to_string(),
                Cell::Number(value) => value.to_string(),
                Cell::Empty => String::new(),
            })
            .collect()
    }

    /// 从表头推导结构
    pub fn from_header(header: &[String]) -> Result<Self> {
        if header.first().map(String::as_str) != Some(PATIENT_NAME) {
            return Err(AsthmaError::Storage(format!(
                "record file must start with a {} column",
                PATIENT_NAME
            )));
        }
        for column in TRAILING_COLUMNS {
            if !header.iter().any(|h| h == column) {
                return Err(AsthmaError::Storage(format!(
                    "record file is missing column {}",
                    column
                )));
            }
        }

        let feature_columns = header[1..]
            .iter()
            .filter(|h| !TRAILING_COLUMNS.contains(&h.as_str()))
            .cloned()
            .collect();
        Ok(Self { feature_columns })
    }

    /// 解析一行文本为记录；空的特征单元格视为该特征不存在
    pub fn parse_row(&self, header: &[String], row: &[String]) -> Result<AssessmentRecord> {
        if row.len() != header.len() {
            return Err(AsthmaError::Storage(format!(
                "expected {} fields, found {}",
                header.len(),
                row.len()
            )));
        }
        let field = |name: &str| field_value(header, row, name);

        let mut features = FeatureVector::new();
        for column in &self.feature_columns {
            let raw = field(column);
            if raw.is_empty() {
                continue;
            }
            features.insert(column.clone(), parse_number(column, raw)?);
        }

        Ok(AssessmentRecord {
            patient_name: field(PATIENT_NAME).to_string(),
            features,
            prediction: field(PREDICTION).parse()?,
            risk_percent: parse_number(RISK_PERCENT, field(RISK_PERCENT))?,
            risk_level: field(RISK_LEVEL).parse()?,
            age_group: field(AGE_GROUP).parse()?,
            top_risks: field(TOP_RISKS).to_string(),
            action: field(ACTION).parse()?,
            doctor_note: field(DOCTOR_NOTE).to_string(),
        })
    }
}

fn field_value<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    header
        .iter()
        .position(|h| h == name)
        .map(|idx| row[idx].as_str())
        .unwrap_or_default()
}

fn parse_number(column: &str, raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        AsthmaError::Storage(format!("column {} has non-numeric value {:?}", column, raw))
    })
}
