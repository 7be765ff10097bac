use crate::{SharedData, logging, session};
use axum::Router;
use axum::middleware;
use std::sync::Arc;

pub mod auth;
pub mod tasks;

#[cfg(test)]
mod test_util;

/// Assembles the full application router: the authenticated portion of the
/// site behind the login gate, the public auth pages in front of it, and
/// request tracing around everything.
pub fn app_router(shared: Arc<SharedData>) -> Router {
    let protected_routes = tasks::task_routes()
        .merge(auth::protected_auth_routes())
        .route_layer(middleware::from_fn_with_state(
            shared.clone(),
            session::require_login,
        ));
    let router = protected_routes.merge(auth::auth_routes()).with_state(shared);

    logging::attach_tracing_http(router)
}
