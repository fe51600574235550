//! 错误定义模块

use thiserror::Error;

/// 评估系统统一错误类型
#[derive(Error, Debug)]
pub enum AsthmaError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("模型错误: {0}")]
    Model(String),

    #[error("推理错误: {0}")]
    Inference(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("导出错误: {0}")]
    Export(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 评估系统统一结果类型
pub type Result<T> = std::result::Result<T, AsthmaError>;
