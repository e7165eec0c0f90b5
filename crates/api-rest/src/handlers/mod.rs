//! Request handlers, one module per dashboard tab.
//!
//! Every handler except [`health`] and [`list_roles`] checks the caller's role header
//! against the tab it belongs to before touching any state.

pub mod architecture;
pub mod datasets;
pub mod hub;
pub mod knowledge;
pub mod support;
pub mod wizards;

use crate::state::AppState;
use api_shared::{dto, HealthService};
use axum::{extract::State, response::Json};
use navigator_core::Role;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Also reports whether the AI gateway has credentials; without them the AI panels still
/// respond, with their failure messages.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health(state.gateway_configured))
}

#[utoipa::path(
    get,
    path = "/roles",
    responses(
        (status = 200, description = "Roles with the tabs each may open", body = dto::RolesRes)
    )
)]
#[axum::debug_handler]
pub async fn list_roles() -> Json<dto::RolesRes> {
    Json(dto::RolesRes {
        roles: Role::ALL.into_iter().map(Into::into).collect(),
    })
}
