//! Web服务器

use axum::{
    routing::{get, post},
    Router,
};
use asthma_core::Result;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::dashboard::dashboard;
use crate::handlers::{
    clear_records, create_assessment, download_export, export_records, health, list_records,
    model_features,
};
use crate::session::SharedSession;

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, session: SharedSession) -> Self {
        Self {
            addr,
            app: build_router(session),
        }
    }

    /// 运行直到收到 Ctrl-C
    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// 构建路由
pub fn build_router(session: SharedSession) -> Router {
    Router::new()
        // 仪表盘页面
        .route("/", get(dashboard))
        // 健康检查
        .route("/health", get(health))
        // API路由
        .nest("/api/v1", api_routes())
        .with_state(session)
        // 全局中间件
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// API v1 路由
fn api_routes() -> Router<SharedSession> {
    Router::new()
        .route("/model", get(model_features))
        .route("/assessments", post(create_assessment))
        .route("/records", get(list_records).delete(clear_records))
        .route("/records/export", get(download_export).post(export_records))
}
