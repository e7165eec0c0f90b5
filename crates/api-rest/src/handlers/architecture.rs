//! System Architecture Explorer endpoints.

use crate::error::{gate, reject, ApiResult};
use crate::state::AppState;
use api_shared::dto;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use navigator_core::{Direction, Tab};

const TABS: &[Tab] = &[Tab::Architecture];

#[utoipa::path(
    get,
    path = "/architecture",
    responses(
        (status = 200, description = "All components and connections", body = dto::ArchitectureRes),
        (status = 403, description = "Role cannot open the architecture explorer")
    )
)]
/// Lists every component and connection of the system graph.
#[axum::debug_handler]
pub async fn get_architecture(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<dto::ArchitectureRes>> {
    gate(&headers, TABS)?;
    let graph = state.catalog.graph();
    Ok(Json(dto::ArchitectureRes {
        components: graph.components().iter().map(Into::into).collect(),
        connections: graph.connections().iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/architecture/components/{id}",
    params(("id" = String, Path, description = "Component id")),
    responses(
        (status = 200, description = "Component with its neighbours", body = dto::ComponentDetailRes),
        (status = 404, description = "Unknown component")
    )
)]
/// Details panel for one component: its metadata plus incoming and outgoing connections.
#[axum::debug_handler]
pub async fn get_component(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<dto::ComponentDetailRes>> {
    gate(&headers, TABS)?;
    let graph = state.catalog.graph();
    let component = graph.component(&id).map_err(reject)?;
    let incoming = graph.neighbors(&id, Direction::Incoming).map_err(reject)?;
    let outgoing = graph.neighbors(&id, Direction::Outgoing).map_err(reject)?;
    let related = graph.related_ids(&id).map_err(reject)?;

    Ok(Json(dto::ComponentDetailRes {
        component: component.into(),
        incoming: incoming.into_iter().map(Into::into).collect(),
        outgoing: outgoing.into_iter().map(Into::into).collect(),
        related: related.into_iter().map(str::to_owned).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/architecture/focus/{id}",
    params(("id" = String, Path, description = "Focused component id")),
    responses(
        (status = 200, description = "Emphasis of every entity around the focused component", body = dto::GraphViewRes),
        (status = 404, description = "Unknown component")
    )
)]
#[axum::debug_handler]
pub async fn focus_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<dto::GraphViewRes>> {
    gate(&headers, TABS)?;
    let view = state.catalog.graph().focus_view(Some(&id)).map_err(reject)?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    post,
    path = "/architecture/highlight",
    request_body = dto::HighlightReq,
    responses(
        (status = 200, description = "Emphasis of every entity for a highlight set", body = dto::GraphViewRes)
    )
)]
/// Classifies the graph against a highlight set. Unknown ids are ignored.
#[axum::debug_handler]
pub async fn highlight_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::HighlightReq>,
) -> ApiResult<Json<dto::GraphViewRes>> {
    gate(&headers, &[Tab::Architecture, Tab::SupportHub])?;
    let graph = state.catalog.graph();
    let highlight = graph.retain_known(req.ids);
    Ok(Json(graph.membership_view(&highlight).into()))
}
