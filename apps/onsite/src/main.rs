//! # Mesa Onsite Entry Point
//!
//! Spawned by the onsite front-end shell. Reads commands from stdin,
//! answers on stdout, logs to stderr.
//!
//! ```text
//! ┌──────────────────────┐   JSON lines    ┌──────────────────────────────┐
//! │  Front-end shell     │ ──── stdin ───► │  mesa-onsite (this binary)   │
//! │  menu · cart drawer  │                 │  AppState                    │
//! │  toasts              │ ◄─── stdout ─── │   ├── CartState              │
//! └──────────────────────┘                 │   └── NotificationQueue      │
//!                                          └──────────────────────────────┘
//! ```
//!
//! The actual setup is in lib.rs for testability.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match mesa_onsite_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Onsite session failed: {}", e);
            eprintln!("mesa-onsite: {}", e);
            ExitCode::FAILURE
        }
    }
}
