//! # Mesa Onsite Library
//!
//! Session host for the onsite ordering front-end: one cart and one
//! notification queue per process, driven by JSON-lines commands.
//!
//! ## Module Organization
//! ```text
//! mesa_onsite_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── AppConfig: defaults, TOML file, env overrides
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (everything a session owns)
//! │   └── cart.rs     ◄─── CartState (Arc<Mutex<Cart>>)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Cart manipulation and checkout
//! │   └── notifications.rs ◄─── Queue commands, operations events
//! ├── events.rs       ◄─── OperationsEvent port
//! ├── ipc.rs          ◄─── stdin/stdout JSON-lines bridge
//! └── error.rs        ◄─── AppError (startup), ApiError (commands)
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod ipc;
pub mod state;

use std::path::PathBuf;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, CONFIG_PATH_ENV};
use error::AppResult;
use state::AppState;

/// Runs one ordering session until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Session Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr            │
/// │     • Default: info,mesa=debug; override with RUST_LOG                  │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • $MESA_CONFIG or the platform config dir                           │
/// │     • Falls back to defaults on a bad file                              │
/// │                                                                         │
/// │  3. Build AppState ───────────────────────────────────────────────────► │
/// │     • Empty cart, empty notification queue                              │
/// │                                                                         │
/// │  4. Serve stdin → stdout until EOF ───────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> AppResult<()> {
    init_tracing();

    info!("Starting Mesa onsite session");

    let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path);
    info!(
        venue = %config.venue.name,
        service_fee_bps = config.pricing.service_fee_bps,
        tax_bps = config.pricing.tax_bps,
        "Configuration loaded"
    );

    let state = AppState::new(config)?;
    info!("State initialized");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    ipc::serve(&state, stdin, stdout).await?;

    let dropped = state.notifications.clear();
    info!(dropped, "Session ended");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mesa_notify=trace` - Trace the notification queue only
/// - Default: `info,mesa=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mesa=debug"));

    // stdout carries responses
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
