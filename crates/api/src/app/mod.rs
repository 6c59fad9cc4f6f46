//! HTTP application wiring.
//!
//! - `services.rs`: backend selection (user store, revocation registry)
//! - `routes/`: handlers, one file per area
//! - `dto.rs`: request bodies and token header helpers
//! - `errors.rs`: consistent error responses

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(state: AppState) -> Router {
    routes::router(&state).with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
