//! Compass Dash - terminal dashboard for a Compass ledger node
//!
//! Observes a node exclusively through its JSON-RPC endpoint. The pieces:
//!
//! - [`rpc`]: envelope/id handling and typed method wrappers
//! - [`loader`] + [`views`]: per-view concurrent loads and the view router
//! - [`poller`]: fixed 5s dashboard refresh
//! - [`metrics`]: pure derived values (progress, accuracy, mintability, scaling)
//! - [`app`] + [`session`]: the single mutable state root and the remembered wallet
//!
//! Background tasks never touch [`app::App`]; they send [`types::AppEvent`]s
//! that the event loop applies one at a time.

pub mod actions;
pub mod app;
pub mod config;
pub mod constants;
pub mod loader;
pub mod metrics;
pub mod poller;
pub mod rpc;
pub mod session;
pub mod theme;
pub mod types;
pub mod ui;
pub mod views;
