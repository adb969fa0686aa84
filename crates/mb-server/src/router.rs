use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use mb_ledger::StationLedger;

use crate::handler;

/// Shared handler state: the one long-lived ledger service.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<StationLedger>,
}

/// Build the axum router with all Meterbook endpoints.
pub fn build_router(ledger: Arc<StationLedger>) -> Router {
    let state = AppState { ledger };
    Router::new()
        .route("/v1/snapshots", post(handler::store_snapshot))
        .route("/v1/snapshots/:station/:date", get(handler::get_snapshot))
        .route("/v1/settlements", post(handler::store_settlement))
        .route(
            "/v1/settlements/:station/:period",
            get(handler::get_effective_settlement),
        )
        .route(
            "/v1/settlements/:station/:period/amendments",
            post(handler::amend_settlement),
        )
        .route(
            "/v1/settlements/:station/:period/revisions/:revision",
            get(handler::get_settlement_by_revision),
        )
        .route("/v1/pause", post(handler::pause))
        .route("/v1/unpause", post(handler::unpause))
        .route("/v1/roles/grant", post(handler::grant_role))
        .route("/v1/roles/revoke", post(handler::revoke_role))
        .route("/v1/roles/renounce", post(handler::renounce_role))
        .route("/v1/roles/:account", get(handler::get_roles))
        .route("/v1/health", get(handler::health))
        .route("/v1/info", get(handler::info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
