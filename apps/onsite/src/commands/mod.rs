//! # Commands Module
//!
//! All commands the front-end shell can invoke over the IPC bridge.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs            ◄─── You are here (exports)
//! ├── cart.rs           ◄─── Cart manipulation and checkout
//! └── notifications.rs  ◄─── Notification queue and operations events
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front-end shell                                                        │
//! │  ───────────────                                                        │
//! │  {"id":7,"command":"addToCart",                                         │
//! │   "args":{"item":{...},"quantity":2}}                                   │
//! │         │                                                               │
//! │         │ (one JSON line on stdin)                                      │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  ipc::handle_line ──► Command::AddToCart { item, quantity }             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::cart::add_to_cart(&state, item, quantity)                    │
//! │      -> Result<CartResponse, ApiError>                                  │
//! │         │                                                               │
//! │         │ (one JSON line on stdout)                                     │
//! │         ▼                                                               │
//! │  {"id":7,"ok":true,"data":{...}}                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command takes `&AppState` and returns plain data or `ApiError`;
//! none of them touch the transport.

pub mod cart;
pub mod notifications;
