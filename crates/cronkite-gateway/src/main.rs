use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

mod app;
mod autostart;
mod http;
mod ws;

/// Headless cron-style job scheduler with a WebSocket control surface.
#[derive(Parser, Debug)]
#[command(name = "cronkite-gateway", version, about)]
struct Args {
    /// Config file path (default: ~/.cronkite/cronkite.toml)
    #[arg(long)]
    config: Option<String>,

    /// Written into autostart entries; a headless daemon has no window to
    /// hide, so the flag is accepted and ignored.
    #[arg(long)]
    hidden: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cronkite_gateway=info,cronkite_scheduler=info,cronkite_exec=info".into()
            }),
        )
        .init();

    if args.hidden {
        tracing::debug!("launched with --hidden (autostart entry)");
    }

    // load config: --config > CRONKITE_CONFIG env > ~/.cronkite/cronkite.toml
    let config = cronkite_core::config::CronkiteConfig::load(args.config.as_deref())
        .unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            cronkite_core::config::CronkiteConfig::default()
        });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let events = cronkite_core::EventBus::new();
    let clock: Arc<dyn cronkite_core::Clock> = Arc::new(cronkite_core::SystemClock);

    let store = cronkite_scheduler::JobStore::new(config.store.path.clone());
    info!(path = %config.store.path, "opening job store");
    let registry = Arc::new(cronkite_scheduler::JobRegistry::open(
        store,
        events.clone(),
        Arc::clone(&clock),
    ));

    let launcher = Arc::new(cronkite_exec::ProcessLauncher::new(config.exec.timeout_secs));
    let executor = Arc::new(cronkite_exec::Executor::new(launcher, events.clone()));

    let scheduler = Arc::new(cronkite_scheduler::Scheduler::new(
        Arc::clone(&registry),
        Arc::clone(&executor),
        events.clone(),
        clock,
        std::time::Duration::from_secs(config.scheduler.tick_secs),
    ));

    let start_on_launch = config.scheduler.start_on_launch;
    let state = Arc::new(app::AppState::new(
        config,
        events,
        registry,
        executor,
        Arc::clone(&scheduler),
    ));
    let router = app::build_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            // The bound port is the single-instance lock. Another gateway owns
            // it — ask that one to raise its UIs, then bow out.
            info!(%addr, "gateway already running, sending activate");
            activate_running_instance(&state.config).await;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Only the instance that holds the port runs the scan loop; starting any
    // earlier could double-dispatch against a shared job file.
    if start_on_launch {
        scheduler.start();
    }

    // Forward engine events to WS clients as EVENT frames.
    tokio::spawn(ws::broadcast::pump(Arc::clone(&state)));

    info!("cronkite gateway listening on {}", addr);
    axum::serve(listener, router).await?;

    scheduler.stop();
    Ok(())
}

/// Tell the gateway that owns the port to broadcast `app.activate`.
async fn activate_running_instance(config: &cronkite_core::CronkiteConfig) {
    let url = format!(
        "http://{}:{}/activate",
        config.gateway.bind, config.gateway.port
    );
    let body = match config.gateway.auth.token {
        Some(ref token) => serde_json::json!({ "token": token }),
        None => serde_json::json!({}),
    };
    if let Err(e) = reqwest::Client::new().post(&url).json(&body).send().await {
        tracing::warn!(error = %e, "activate ping failed");
    }
}
