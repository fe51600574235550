//! # 记录存储模块
//!
//! 评估记录以 CSV 整表读写，支持历史过滤展示、Excel 导出和整体清空。

pub mod columns;
pub mod export;
pub mod record_store;

pub use columns::{RecordSchema, PATIENT_NAME, TRAILING_COLUMNS};
pub use export::{export_to_buffer, export_to_path, SHEET_NAME};
pub use record_store::{HistoryFilter, RecordStore};
