//! Handler模块

use std::time::Instant;

use axum::{
    extract::{Extension, Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::middleware::RequestId;
use common::models::{DeleteForm, InsertForm, StatusModel, TableSnapshot};
use common::response::ApiResponse;

use crate::render::render_status_page;
use crate::state::AppState;

/// 状态页面：所有表的数据与缓存内容
pub async fn status_page(State(state): State<AppState>) -> Html<String> {
    let model = state.aggregator.build_status_model().await;
    Html(render_status_page(&model))
}

/// 向任意已发现的表插入一行
pub async fn add_row(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let result = match InsertForm::from_pairs(pairs) {
        Ok(form) => state.mutations.insert_row(&form.table, form.fields).await,
        Err(e) => Err(e),
    };
    mutation_response(result)
}

/// 按 `id` 列删除一行
pub async fn delete_row(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let result = match form.validate() {
        Ok(()) => state.mutations.delete_row(&form.table, &form.id).await,
        Err(e) => Err(AppError::from(e)),
    };
    mutation_response(result)
}

/// 成功时回到状态页，失败时返回原始错误文本
fn mutation_response(result: Result<u64, AppError>) -> Response {
    match result {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "mutation failed");
            (e.status_code(), e.to_string()).into_response()
        }
    }
}

/// 以 JSON 形式返回状态视图
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "当前状态视图", body = ApiResponse<StatusModel>)
    )
)]
pub async fn status_json(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<ApiResponse<StatusModel>> {
    let start = Instant::now();
    let model = state.aggregator.build_status_model().await;
    Json(
        ApiResponse::ok_with_service(model, state.config.service_name.clone())
            .with_request_id(request_id.as_str())
            .with_duration(start.elapsed().as_millis() as u64),
    )
}

/// 以 JSON 形式返回单个表的快照
#[utoipa::path(
    get,
    path = "/api/tables/{table}",
    tag = "status",
    params(
        ("table" = String, Path, description = "已发现的表名")
    ),
    responses(
        (status = 200, description = "表快照", body = ApiResponse<TableSnapshot>),
        (status = 400, description = "表不存在于当前 schema"),
        (status = 503, description = "数据库不可达")
    )
)]
pub async fn table_json(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(table): Path<String>,
) -> AppResult<Json<ApiResponse<TableSnapshot>>> {
    let start = Instant::now();
    let snapshot = state.aggregator.table_snapshot(&table).await?;
    Ok(Json(
        ApiResponse::ok_with_service(snapshot, state.config.service_name.clone())
            .with_request_id(request_id.as_str())
            .with_duration(start.elapsed().as_millis() as u64),
    ))
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        cache_enabled: state.config.cache.enabled,
    })
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 是否启用缓存
    pub cache_enabled: bool,
}
