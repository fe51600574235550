//! 哮喘风险评估仪表盘主程序

use anyhow::Context;
use asthma_admin::{
    init_tracing, with_bootstrap_logging, ConfigManager, ConfigValidator, DashboardConfig,
};
use asthma_web::{Session, WebServer};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 命令行参数，优先级高于配置文件和环境变量
#[derive(Parser, Debug)]
#[command(name = "asthma-server")]
#[command(about = "Asthma risk prediction dashboard")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 监听地址
    #[arg(long)]
    host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 模型文件路径
    #[arg(short, long)]
    model: Option<String>,

    /// 评估记录 CSV 文件
    #[arg(short, long)]
    records: Option<String>,

    /// Excel 导出文件
    #[arg(short, long)]
    export: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut DashboardConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = self.model {
            config.model.artifact_path = model;
        }
        if let Some(records) = self.records {
            config.storage.record_file = records;
        }
        if let Some(export) = self.export {
            config.storage.export_file = export;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 配置加载期间的日志先输出到临时 subscriber
    let config = with_bootstrap_logging(|| -> anyhow::Result<DashboardConfig> {
        let mut config = ConfigManager::load(args.config.as_deref())?;
        args.apply(&mut config);
        ConfigValidator::new().validate(&config)?;
        Ok(config)
    })?;

    // 初始化日志
    init_tracing(&config.logging)?;

    info!("启动哮喘风险评估仪表盘...");
    info!("  模型文件: {}", config.model.artifact_path);
    info!("  记录文件: {}", config.storage.record_file);
    info!("  导出文件: {}", config.storage.export_file);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    // 模型或记录文件无法加载时直接退出
    let session = Session::open(&config)
        .context("Failed to open session")?
        .shared();

    if let Err(e) = WebServer::new(addr, session.clone()).run().await {
        error!("服务器运行失败: {}", e);
        return Err(e.into());
    }

    match Arc::try_unwrap(session) {
        Ok(session) => session.into_inner().close(),
        Err(_) => warn!("Session still referenced at shutdown"),
    }

    Ok(())
}
