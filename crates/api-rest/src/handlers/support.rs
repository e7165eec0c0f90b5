//! Support Operations Center: incident library and vendor escalation matrix.

use crate::error::{gate, reject, ApiResult};
use crate::state::AppState;
use api_shared::dto;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use navigator_core::Tab;

const TABS: &[Tab] = &[Tab::SupportCenter, Tab::SupportHub];

#[utoipa::path(
    get,
    path = "/incidents",
    responses(
        (status = 200, description = "Incident assessments", body = dto::IncidentsRes)
    )
)]
#[axum::debug_handler]
pub async fn list_incidents(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<dto::IncidentsRes>> {
    gate(&headers, TABS)?;
    Ok(Json(dto::IncidentsRes {
        incidents: state
            .catalog
            .incidents()
            .iter()
            .map(|doc| dto::IncidentSummaryRes {
                id: doc.id.to_string(),
                title: doc.title.clone(),
            })
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/incidents/{id}",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Incident with its parsed body", body = dto::IncidentRes),
        (status = 404, description = "Unknown incident")
    )
)]
#[axum::debug_handler]
pub async fn get_incident(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<dto::IncidentRes>> {
    gate(&headers, TABS)?;
    let doc = state.catalog.incident(&id).map_err(reject)?;
    match dto::IncidentRes::new(doc) {
        Ok(res) => Ok(Json(res)),
        Err(e) => {
            tracing::error!("Incident serialization error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/escalation-matrix",
    responses(
        (status = 200, description = "Vendor escalation contacts", body = dto::EscalationMatrixRes)
    )
)]
#[axum::debug_handler]
pub async fn escalation_matrix(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<dto::EscalationMatrixRes>> {
    gate(&headers, TABS)?;
    Ok(Json(dto::EscalationMatrixRes {
        rows: state
            .catalog
            .escalation_matrix()
            .iter()
            .map(Into::into)
            .collect(),
    }))
}
