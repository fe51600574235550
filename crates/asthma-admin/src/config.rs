//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、配置文件、`ASTHMA_` 前缀的环境变量。
//! 例如 `ASTHMA_SERVER__PORT=9000` 覆盖 `server.port`。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// 仪表盘完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 模型配置
    pub model: ModelConfig,
    /// 存储配置
    pub storage: StorageConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 模型配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 模型文件路径
    pub artifact_path: String,
}

/// 存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 评估记录 CSV 文件
    pub record_file: String,
    /// Excel 导出文件
    pub export_file: String,
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法），`RUST_LOG` 优先
    pub level: String,
    /// 日志格式
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "models/asthma_model.json".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            record_file: "asthma_patient_records.csv".to_string(),
            export_file: "asthma_predictions.xlsx".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}

/// 配置加载器
pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置；`config_path` 为空时只使用默认值和环境变量
    pub fn load(config_path: Option<&Path>) -> Result<DashboardConfig> {
        let defaults = Config::try_from(&DashboardConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("ASTHMA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        let config: DashboardConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ConfigValidator::new().validate(&config)?;

        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path.display()),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }
}

/// 配置验证规则
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&DashboardConfig) -> Result<()>,
}

/// 配置验证器
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

fn non_empty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(anyhow::anyhow!("{} cannot be empty", what))
    } else {
        Ok(())
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "server.port",
                validator: |config| {
                    if config.server.port == 0 {
                        Err(anyhow::anyhow!("Server port cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "server.host",
                validator: |config| non_empty(&config.server.host, "Server host"),
            },
            ValidationRule {
                field_path: "model.artifact_path",
                validator: |config| non_empty(&config.model.artifact_path, "Model artifact path"),
            },
            ValidationRule {
                field_path: "storage.record_file",
                validator: |config| non_empty(&config.storage.record_file, "Record file"),
            },
            ValidationRule {
                field_path: "storage.export_file",
                validator: |config| non_empty(&config.storage.export_file, "Export file"),
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &DashboardConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid {}: {}", rule.field_path, e));
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
