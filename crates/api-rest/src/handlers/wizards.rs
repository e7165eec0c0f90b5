//! Scripted troubleshooting wizards and their sessions.

use crate::error::{gate, reject, ApiResult};
use crate::state::AppState;
use api_shared::dto;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use navigator_core::{DecisionTree, NavigatorResult, Tab, WizardKind, WizardSession};
use uuid::Uuid;

const TABS: &[Tab] = &[Tab::SupportCenter, Tab::SupportHub];

fn session_res(
    id: Uuid,
    session: &WizardSession,
    tree: &DecisionTree,
) -> NavigatorResult<dto::WizardSessionRes> {
    let cursor = session.cursor();
    let node = session.current_node(tree)?;
    Ok(dto::WizardSessionRes {
        id: id.to_string(),
        kind: session.kind().slug().into(),
        node: dto::TreeNodeRes::new(cursor.current(), node),
        history: cursor.history().to_vec(),
        can_go_back: cursor.can_go_back(),
    })
}

fn parse_kind(kind: &str) -> ApiResult<WizardKind> {
    kind.parse().map_err(reject)
}

#[utoipa::path(
    get,
    path = "/wizards",
    responses(
        (status = 200, description = "Available wizards", body = dto::WizardsRes)
    )
)]
#[axum::debug_handler]
pub async fn list_wizards(headers: HeaderMap) -> ApiResult<Json<dto::WizardsRes>> {
    gate(&headers, TABS)?;
    Ok(Json(dto::WizardsRes {
        wizards: WizardKind::ALL.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/wizards/{kind}",
    params(("kind" = String, Path, description = "dicom, hl7 or powerscribe")),
    responses(
        (status = 200, description = "Wizard with its full decision tree", body = dto::WizardTreeRes),
        (status = 404, description = "Unknown wizard")
    )
)]
/// Returns the whole tree, with the nodes no path from `start` reaches.
#[axum::debug_handler]
pub async fn get_wizard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(kind): Path<String>,
) -> ApiResult<Json<dto::WizardTreeRes>> {
    gate(&headers, TABS)?;
    let kind = parse_kind(&kind)?;
    let tree = state.catalog.tree(kind);
    let nodes = tree
        .keys()
        .map(|key| {
            tree.current_node(key.as_str())
                .map(|node| dto::TreeNodeRes::new(key.as_str(), node))
        })
        .collect::<NavigatorResult<Vec<_>>>()
        .map_err(reject)?;

    Ok(Json(dto::WizardTreeRes {
        wizard: kind.into(),
        nodes,
        orphans: tree.orphans().into_iter().map(ToString::to_string).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/wizards/{kind}/sessions",
    params(("kind" = String, Path, description = "dicom, hl7 or powerscribe")),
    responses(
        (status = 201, description = "Session positioned at the start node", body = dto::WizardSessionRes),
        (status = 404, description = "Unknown wizard")
    )
)]
#[axum::debug_handler]
pub async fn open_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(kind): Path<String>,
) -> ApiResult<(StatusCode, Json<dto::WizardSessionRes>)> {
    gate(&headers, TABS)?;
    let kind = parse_kind(&kind)?;
    let session = WizardSession::open(kind);
    let id = Uuid::new_v4();
    let res = session_res(id, &session, state.catalog.tree(kind)).map_err(reject)?;
    state.wizard_sessions().insert(id, session);
    tracing::info!(%id, wizard = kind.slug(), "wizard session opened");
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(
    get,
    path = "/wizard-sessions/{id}",
    params(("id" = Uuid, Path, description = "Wizard session id")),
    responses(
        (status = 200, description = "Current node of the session", body = dto::WizardSessionRes),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::WizardSessionRes>> {
    gate(&headers, TABS)?;
    let mut sessions = state.wizard_sessions();
    let session = sessions.get_mut(id).map_err(reject)?;
    let tree = state.catalog.tree(session.kind());
    session_res(id, session, tree).map(Json).map_err(reject)
}

#[utoipa::path(
    delete,
    path = "/wizard-sessions/{id}",
    params(("id" = Uuid, Path, description = "Wizard session id")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
pub async fn close_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    gate(&headers, TABS)?;
    state
        .wizard_sessions()
        .remove(id)
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/wizard-sessions/{id}/choose",
    params(("id" = Uuid, Path, description = "Wizard session id")),
    request_body = dto::ChooseReq,
    responses(
        (status = 200, description = "Session moved to the chosen node", body = dto::WizardSessionRes),
        (status = 400, description = "Option index out of range"),
        (status = 404, description = "Unknown session")
    )
)]
/// Takes one option of the current node. An invalid index leaves the session where it was.
#[axum::debug_handler]
pub async fn choose(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::ChooseReq>,
) -> ApiResult<Json<dto::WizardSessionRes>> {
    gate(&headers, TABS)?;
    let mut sessions = state.wizard_sessions();
    let session = sessions.get_mut(id).map_err(reject)?;
    let tree = state.catalog.tree(session.kind());
    session.choose(tree, req.option).map_err(reject)?;
    session_res(id, session, tree).map(Json).map_err(reject)
}

#[utoipa::path(
    post,
    path = "/wizard-sessions/{id}/back",
    params(("id" = Uuid, Path, description = "Wizard session id")),
    responses(
        (status = 200, description = "Session moved to the previous node", body = dto::WizardSessionRes),
        (status = 400, description = "Already at the start node"),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
pub async fn back(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::WizardSessionRes>> {
    gate(&headers, TABS)?;
    let mut sessions = state.wizard_sessions();
    let session = sessions.get_mut(id).map_err(reject)?;
    let tree = state.catalog.tree(session.kind());
    session.back(tree).map_err(reject)?;
    session_res(id, session, tree).map(Json).map_err(reject)
}

#[utoipa::path(
    post,
    path = "/wizard-sessions/{id}/reset",
    params(("id" = Uuid, Path, description = "Wizard session id")),
    responses(
        (status = 200, description = "Session back at the start node", body = dto::WizardSessionRes),
        (status = 404, description = "Unknown session")
    )
)]
#[axum::debug_handler]
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::WizardSessionRes>> {
    gate(&headers, TABS)?;
    let mut sessions = state.wizard_sessions();
    let session = sessions.get_mut(id).map_err(reject)?;
    let tree = state.catalog.tree(session.kind());
    session.reset(tree).map_err(reject)?;
    session_res(id, session, tree).map(Json).map_err(reject)
}
