mod commands;
mod config;
mod session;

use std::sync::Arc;

use tracing::{debug, info};

use pulse_notify::{Dispatcher, ToastCenter};
use pulse_store::{LocalStorage, PreferenceStore};

use crate::commands::{Command, USAGE};
use crate::config::Config;
use crate::session::DiscoverySession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr, stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=info,pulse_store=info,pulse_notify=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match Command::parse(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = Config::from_env()?;
    debug!("Config: {:?}", config);

    let storage = Arc::new(LocalStorage::open(&config.db_path)?.with_quota(config.quota_bytes));

    // Subscribe before anything can publish
    let dispatcher = Dispatcher::with_capacity(config.notify.bus_capacity);
    let mut events = dispatcher.subscribe();
    let toasts = ToastCenter::new(config.notify.default_toast_duration);

    let session = DiscoverySession::new(storage.clone(), config.history_limit, dispatcher);
    let prefs = PreferenceStore::new(storage);

    let out = commands::run(cmd, &session, &prefs)?;
    println!("{}", serde_json::to_string_pretty(&out)?);

    // One-shot process: show what the UI would have toasted, then exit
    while let Ok(event) = events.try_recv() {
        if let Some(req) = event.toast() {
            toasts.show(req.clone());
        }
    }
    for toast in toasts.visible() {
        info!("[{:?}] {}", toast.kind, toast.message);
    }

    Ok(())
}
