use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod config;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;
pub mod session;

/// Data shared by every request handler: connectivity to external systems
/// plus the signer which mints and checks session tokens.
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub sessions: session::SessionSigner,
}

pub type AppState = State<Arc<SharedData>>;
