use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use smarttasks_core::config::SmartTasksConfig;
use smarttasks_reminder::{
    AlarmFiredHandler, ReminderScheduler, SystemClock, TaskLifecycleBridge, BRIDGE_EVENT_KINDS,
};
use smarttasks_tasks::{TaskEventBus, TaskManager};
use tracing::info;

mod alarm;
mod app;
mod http;
mod inbox;

/// SmartTasks daemon: task store, reminder engine and HTTP API.
#[derive(Debug, Parser)]
#[command(name = "smarttasks-daemon", version, about)]
struct Args {
    /// Path to smarttasks.toml (falls back to SMARTTASKS_CONFIG, then
    /// ~/.smarttasks/smarttasks.toml).
    #[arg(long)]
    config: Option<String>,
    /// Override server.bind.
    #[arg(long)]
    bind: Option<String>,
    /// Override server.port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "smarttasks_daemon=info,smarttasks_reminder=info,tower_http=debug".into()
            }),
        )
        .init();

    let args = Args::parse();

    // load config: --config > SMARTTASKS_CONFIG env > ~/.smarttasks/smarttasks.toml
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("SMARTTASKS_CONFIG").ok());
    let mut config = SmartTasksConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        SmartTasksConfig::default()
    });
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");
    let db = rusqlite::Connection::open(&db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    smarttasks_tasks::db::init_db(&db)?;

    let bus = Arc::new(TaskEventBus::new());
    let tasks = TaskManager::new(db, bus.clone());

    // Fired-alarm queue: TokioAlarm → AlarmFiredHandler
    let (fired_tx, fired_rx) =
        tokio::sync::mpsc::channel(config.reminder.fired_queue_capacity.max(1));
    let alarm = Arc::new(alarm::TokioAlarm::new(fired_tx));
    let inbox = Arc::new(inbox::NotificationInbox::new());
    let scheduler = Arc::new(ReminderScheduler::new(
        alarm,
        inbox.clone(),
        Arc::new(SystemClock),
    ));

    // Subscribe before the reseed scan so no mutation slips between the two;
    // an event that overlaps the scan is re-applied, which is harmless.
    let bridge = TaskLifecycleBridge::new(scheduler.clone());
    let events = bus.subscribe(&BRIDGE_EVENT_KINDS);
    let report = bridge.reseed(&tasks.list()?);
    info!(
        scheduled = report.scheduled,
        skipped = report.skipped,
        "reminders restored from task store"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(bridge.run(events, shutdown_rx.clone()));
    let handler = AlarmFiredHandler::new(scheduler.clone(), inbox.clone());
    tokio::spawn(handler.run(fired_rx, shutdown_rx.clone()));
    tokio::spawn(
        scheduler
            .clone()
            .run_reconciler(config.reminder.reconcile_interval(), shutdown_rx),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = Arc::new(app::AppState::new(config, tasks, scheduler, inbox));
    let router = app::build_router(state);

    info!("SmartTasks daemon listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal background loops to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
