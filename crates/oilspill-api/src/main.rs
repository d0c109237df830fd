use std::net::SocketAddr;

use oilspill_core::AppConfig;
use oilspill_observability::init_observability;
use tracing::info;

use oilspill_api::{build_app, SimulationRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = match std::env::var("OILSPILL_CONFIG_FILE") {
        Ok(path) => AppConfig::load(&path)?,
        Err(_) => AppConfig::from_env(),
    };

    init_observability(&app_config.observability);

    info!("starting oilspill-api v{}", env!("CARGO_PKG_VERSION"));

    let registry = SimulationRegistry::new(app_config.api.max_concurrent_runs);
    let app = build_app(registry);

    let addr: SocketAddr = format!("{}:{}", app_config.api.bind_addr, app_config.api.port).parse()?;
    info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
