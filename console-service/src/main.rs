//! 通用数据库管理控制台服务
//!
//! 在请求时发现数据库中的表并提供统一的管理能力：
//! - 展示所有表的数据与缓存中的键值
//! - 通用的新增/删除行操作
//! - 关系库与缓存故障相互隔离

mod aggregator;
mod cache_snapshot;
mod discovery;
mod handlers;
mod mutation;
mod render;
mod routes;
mod state;
mod stores;

use std::sync::Arc;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_id_middleware;
use state::AppState;
use stores::{CacheStore, PgStore, RedisCache};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "console-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "控制台服务 API",
        version = "0.1.0",
        description = "通用数据库管理控制台"
    ),
    paths(
        handlers::status_json,
        handlers::table_json,
        handlers::health_check,
    ),
    components(schemas(
        common::models::StatusModel,
        common::models::TableSnapshot,
        common::models::SourceStatus,
        common::models::CacheEntry,
        common::models::CacheValue,
        handlers::HealthResponse,
    )),
    tags(
        (name = "status", description = "状态视图端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 初始化日志追踪
    init_tracing(config.json_logs);

    // 连接池只创建一次，首次使用时才真正建立连接
    let relational = Arc::new(PgStore::connect_lazy(&config)?);
    let cache: Option<Arc<dyn CacheStore>> = if config.cache.enabled {
        Some(Arc::new(RedisCache::new(&config)?))
    } else {
        info!("cache subsystem disabled");
        None
    };

    let state = AppState::new(config.clone(), relational.clone(), cache);
    let app = create_router(state);

    // 启动服务
    let addr = config.bind_address();
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行失败")?;

    relational.close().await;
    info!(service = SERVICE_NAME, "服务已停止");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
