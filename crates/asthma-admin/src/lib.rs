//! # 运维支撑模块
//!
//! 提供分层配置加载与校验，以及日志初始化

pub mod config;
pub mod logging;

pub use crate::config::{
    ConfigManager, ConfigValidator, DashboardConfig, LogFormat, LoggingConfig, ModelConfig,
    ServerConfig, StorageConfig,
};
pub use crate::logging::{init_tracing, with_bootstrap_logging};
