//! HTTP处理器

use crate::session::SharedSession;
use asthma_assessment::AssessmentRequest;
use asthma_core::AsthmaError;
use asthma_storage::HistoryFilter;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, info, warn};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// API 错误，包装统一错误类型以便转换为 HTTP 响应
#[derive(Debug)]
pub struct ApiError(pub AsthmaError);

impl From<AsthmaError> for ApiError {
    fn from(e: AsthmaError) -> Self {
        Self(e)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 请求体或查询参数无法解析时按输入校验错误处理
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AsthmaError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AsthmaError::Validation(rejection.body_text()))
    }
}

/// 健康检查处理器
pub async fn health(State(session): State<SharedSession>) -> impl IntoResponse {
    let records = session.lock().await.record_count();

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "records": records
    }))
}

/// 模型特征列
pub async fn model_features(State(session): State<SharedSession>) -> impl IntoResponse {
    let session = session.lock().await;
    Json(json!({ "features": session.feature_names() }))
}

/// 评估并保存
pub async fn create_assessment(
    State(session): State<SharedSession>,
    payload: std::result::Result<Json<AssessmentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let mut session = session.lock().await;
    let assessment = session.assess_and_record(&request)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "record": assessment.record,
            "label": assessment.prediction.label,
            "probability": assessment.prediction.probability,
            "top_risks": assessment.narrative.top_risks,
        })),
    ))
}

/// 历史记录
pub async fn list_records(
    State(session): State<SharedSession>,
    query: std::result::Result<Query<HistoryFilter>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(filter) = query?;
    let session = session.lock().await;
    let rows = session.history(&filter);

    Ok(Json(json!({
        "total": rows.len(),
        "records": rows,
    })))
}

/// 导出到服务端 xlsx 文件
pub async fn export_records(State(session): State<SharedSession>) -> ApiResult<impl IntoResponse> {
    let session = session.lock().await;
    let rows = session.export()?;

    Ok(Json(json!({
        "path": session.export_path().display().to_string(),
        "rows": rows,
    })))
}

/// 下载 xlsx
pub async fn download_export(State(session): State<SharedSession>) -> ApiResult<Response> {
    let session = session.lock().await;
    let bytes = session.export_bytes()?;
    let filename = session
        .export_path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asthma_predictions.xlsx".to_string());

    info!("Serving export download ({} bytes)", bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// 清空记录
pub async fn clear_records(State(session): State<SharedSession>) -> ApiResult<impl IntoResponse> {
    let mut session = session.lock().await;
    let cleared = session.clear()?;

    Ok(Json(json!({ "cleared": cleared })))
}

/// 错误处理
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AsthmaError::Validation(_) => StatusCode::BAD_REQUEST,
            AsthmaError::NotFound(_) => StatusCode::NOT_FOUND,
            AsthmaError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = Json(json!({
            "error": true,
            "message": self.0.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
