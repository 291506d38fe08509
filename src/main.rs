use axum::{routing::{get, post}, Router};
use ckd_checker::{api, AppConfig, CheckService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_max_level(config.log.max_level())
        .with_target(true)
        .with_level(true)
        .init();

    info!("Starting server with config: {:?}", config.server);

    let service = Arc::new(CheckService::new(config.recon.clone())?);

    // 构建路由
    let check_routes = Router::new()
        .route("/api/check", post(api::check))
        .route("/api/check/export", post(api::export_csv))
        .route("/api/mapping/suggest", post(api::suggest_mapping))
        .with_state(service);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(check_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/check            - BOM 与清单核对");
    info!("  POST /api/check/export     - 比对结果 CSV");
    info!("  POST /api/mapping/suggest  - 列映射预判");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
