//! Router assembly.

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;

use sentra_auth::AuthContext;

use crate::middleware::{auth_middleware, AuthState};

/// Build the router: open health endpoint plus the authenticated identity
/// echo. Business routes belong to the consuming application; this surface
/// exists to wire and exercise the auth middleware.
pub fn build_app(state: AuthState) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(protected)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Echo the authenticated principal's context (fresh roles/permissions).
async fn me(Extension(ctx): Extension<AuthContext>) -> Json<AuthContext> {
    Json(ctx)
}
