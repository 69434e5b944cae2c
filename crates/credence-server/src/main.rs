//! Credence HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use credence::{
    Config, FsObjectStore, HttpGatewayConfig, HttpModelGateway, JobRegistry, ModelGateway,
    ObjectStore, Orchestrator, RetryPolicy,
};
use credence_server::api::{create_router_with_state, AppState, GatewayMode};
use credence_server::StubModelGateway;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Terminal jobs older than this are evicted from the registry.
const JOB_RETENTION_HOURS: i64 = 24;
/// How often the retention sweep runs.
const RETENTION_SWEEP_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
 ██████╗██████╗ ███████╗██████╗ ███████╗███╗   ██╗ ██████╗███████╗
██╔════╝██╔══██╗██╔════╝██╔══██╗██╔════╝████╗  ██║██╔════╝██╔════╝
██║     ██████╔╝█████╗  ██║  ██║█████╗  ██╔██╗ ██║██║     █████╗
██║     ██╔══██╗██╔══╝  ██║  ██║██╔══╝  ██║╚██╗██║██║     ██╔══╝
╚██████╗██║  ██║███████╗██████╔╝███████╗██║ ╚████║╚██████╗███████╗
 ╚═════╝╚═╝  ╚═╝╚══════╝╚═════╝ ╚══════╝╚═╝  ╚═══╝ ╚═════╝╚══════╝

        EXTRACT. ANALYZE. VERDICT.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        storage_path = %config.storage_path.display(),
        "Credence starting"
    );

    let store = Arc::new(FsObjectStore::new(config.storage_path.clone()));
    let store_dyn: Arc<dyn ObjectStore> = store.clone();

    let (gateway, gateway_mode): (Arc<dyn ModelGateway>, GatewayMode) = match &config.gateway_url {
        Some(url) => {
            let gateway = HttpModelGateway::new(HttpGatewayConfig {
                url: url.clone(),
                api_key: config.gateway_api_key.clone(),
                model: config.gateway_model.clone(),
                timeout: Duration::from_secs(config.gateway_timeout_secs),
            })?;
            tracing::info!(model = %config.gateway_model, "model gateway: live");
            (Arc::new(gateway), GatewayMode::Live)
        }
        None => {
            tracing::warn!("No CREDENCE_GATEWAY_URL configured, running gateway in stub mode");
            (Arc::new(StubModelGateway::new()), GatewayMode::Stub)
        }
    };

    let registry = Arc::new(JobRegistry::new());
    let retry = RetryPolicy {
        max_attempts: config.max_attempts,
        ..RetryPolicy::default()
    };
    let orchestrator = Arc::new(Orchestrator::new(
        store_dyn.clone(),
        gateway,
        registry.clone(),
        config.report_container.clone(),
        retry,
    ));

    spawn_retention_sweeper(registry);

    let state = AppState::new(
        orchestrator,
        store_dyn,
        config.screenshot_container.clone(),
        config.report_container.clone(),
        config.storage_path.clone(),
        gateway_mode,
    );

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Credence shutdown complete");
    Ok(())
}

fn spawn_retention_sweeper(registry: Arc<JobRegistry>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(RETENTION_SWEEP_SECS));
        interval.tick().await;
        loop {
            interval.tick().await;
            registry.evict_older_than(chrono::Duration::hours(JOB_RETENTION_HOURS));
        }
    });
}

fn run_health_check() -> i32 {
    let port = std::env::var("CREDENCE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
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
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
