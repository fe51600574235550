//! 会话状态
//!
//! 进程内唯一的会话：启动时从磁盘加载模型和记录，之后只有追加和清空会修改记录，
//! 关闭时不做任何隐式写入。

use asthma_admin::DashboardConfig;
use asthma_assessment::{Assessment, AssessmentEngine, AssessmentRequest};
use asthma_core::{HistoryRow, Result};
use asthma_model::Predictor;
use asthma_storage::{HistoryFilter, RecordStore};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Web 层共享的会话句柄，所有操作串行执行
pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug)]
pub struct Session {
    engine: AssessmentEngine,
    store: RecordStore,
    export_path: PathBuf,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub fn new(engine: AssessmentEngine, store: RecordStore, export_path: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            store,
            export_path: export_path.into(),
            opened_at: Utc::now(),
        }
    }

    /// 按配置打开会话；模型或记录文件损坏时失败
    pub fn open(config: &DashboardConfig) -> Result<Self> {
        let predictor = Predictor::from_path(&config.model.artifact_path)?;
        let engine = AssessmentEngine::new(predictor);
        let store = RecordStore::open(
            &config.storage.record_file,
            engine.feature_names().to_vec(),
        )?;

        info!(
            "Session opened: {} features, {} existing records",
            engine.feature_names().len(),
            store.len()
        );
        Ok(Self::new(engine, store, &config.storage.export_file))
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// 评估并保存；保存失败时返回错误，记录不进入内存
    pub fn assess_and_record(&mut self, request: &AssessmentRequest) -> Result<Assessment> {
        let assessment = self.engine.assess(request)?;
        self.store.append(assessment.record.clone())?;
        Ok(assessment)
    }

    pub fn history(&self, filter: &HistoryFilter) -> Vec<HistoryRow> {
        self.store.history(filter)
    }

    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    pub fn feature_names(&self) -> &[String] {
        self.engine.feature_names()
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// 导出到配置的 xlsx 文件
    pub fn export(&self) -> Result<usize> {
        self.store.export_all(&self.export_path)
    }

    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        self.store.export_to_buffer()
    }

    /// 清空记录，返回清除前的条数
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.store.len();
        self.store.clear()?;
        Ok(count)
    }

    /// 结束会话
    pub fn close(self) {
        info!(
            "Session closed after {}s with {} records",
            (Utc::now() - self.opened_at).num_seconds(),
            self.store.len()
        );
    }
}
