use mimalloc::MiMalloc;
use pricehouse::{
    PricePipeline, PriceStore,
    config::Config,
    server::router::{PricehouseState, pricehouse_router},
};
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        max_upload_bytes = cfg.pipeline.max_upload_bytes,
        max_payload_bytes = cfg.pipeline.max_payload_bytes,
        request_timeout_secs = cfg.basic.request_timeout_secs
    );

    let store = PriceStore::connect(&cfg.database).await?;
    let pipeline = PricePipeline::new(store.clone(), cfg.pipeline.archive_limits());
    let state = PricehouseState::new(pipeline, cfg.pipeline.max_upload_bytes);
    let app = pricehouse_router(state, &cfg);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let served = serve(addr, app).await;

    // Release the pool whether or not serving failed.
    store.close().await;
    info!("Server has shut down gracefully.");
    served
}

async fn serve(addr: SocketAddr, app: axum::Router) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
