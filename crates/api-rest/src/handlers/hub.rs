//! Integrated Support Hub: assistant chat, AI diagnostic chat, context selection,
//! documentation drafts and explanations, all scoped to one hub session.
//!
//! Every gateway-backed endpoint follows the same three steps: start the panel's turn under
//! the lock, call the gateway unlocked, then complete the turn under the lock again. The
//! call and the completion run as a detached task bounded by the gateway timeout, so a
//! dropped request still releases the panel.

use crate::error::{detach, gate, reject, ApiResult};
use crate::state::AppState;
use api_shared::dto;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use navigator_core::{
    Catalog, DiagnosticOutcome, HubSession, Tab, TurnOutcome, WizardKind,
};
use navigator_gateway as gateway;
use uuid::Uuid;

const TABS: &[Tab] = &[Tab::SupportHub];

fn hub_res(catalog: &Catalog, hub: &HubSession) -> dto::HubRes {
    let diagnostic = hub.diagnostic().map(|chat| {
        let view = catalog.graph().membership_view(chat.highlights());
        dto::DiagnosticRes::new(chat, view)
    });
    dto::HubRes::new(hub, diagnostic)
}

#[utoipa::path(
    post,
    path = "/hub",
    responses(
        (status = 201, description = "New hub session", body = dto::HubRes)
    )
)]
#[axum::debug_handler]
pub async fn open_hub(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<dto::HubRes>)> {
    gate(&headers, TABS)?;
    let hub = HubSession::new();
    let res = hub_res(&state.catalog, &hub);
    tracing::info!(id = %hub.id(), "hub session opened");
    state.hubs().insert(hub.id(), hub);
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(
    get,
    path = "/hub/{id}",
    params(("id" = Uuid, Path, description = "Hub session id")),
    responses(
        (status = 200, description = "Hub state", body = dto::HubRes),
        (status = 404, description = "Unknown hub session")
    )
)]
#[axum::debug_handler]
pub async fn get_hub(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::HubRes>> {
    gate(&headers, TABS)?;
    let mut hubs = state.hubs();
    let hub = hubs.get_mut(id).map_err(reject)?;
    Ok(Json(hub_res(&state.catalog, hub)))
}

#[utoipa::path(
    delete,
    path = "/hub/{id}",
    params(("id" = Uuid, Path, description = "Hub session id")),
    responses(
        (status = 204, description = "Hub closed and its state discarded"),
        (status = 404, description = "Unknown hub session")
    )
)]
#[axum::debug_handler]
pub async fn close_hub(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    gate(&headers, TABS)?;
    state
        .hubs()
        .remove(id)
        .map_err(reject)?;
    tracing::info!(%id, "hub session closed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/hub/{id}/assistant",
    params(("id" = Uuid, Path, description = "Hub session id")),
    request_body = dto::ChatReq,
    responses(
        (status = 200, description = "Hub with the assistant reply appended", body = dto::HubRes),
        (status = 204, description = "Blank message, nothing sent"),
        (status = 409, description = "A reply is still pending")
    )
)]
#[axum::debug_handler]
pub async fn assistant_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::ChatReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let turn = {
        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        hub.assistant_mut().begin_turn(&req.message).map_err(reject)?
    };
    let Some(turn) = turn else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    detach(async move {
        let call = gateway::ask(
            state.gateway.as_ref(),
            state.catalog.knowledge_base(),
            turn.input.as_str(),
        );
        let outcome = match state.bounded(call).await {
            Ok(text) => TurnOutcome::Reply(text),
            Err(_) => TurnOutcome::Failed,
        };

        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        hub.assistant_mut().complete_turn(turn.ticket, outcome);
        Ok(Json(hub_res(&state.catalog, hub)).into_response())
    })
    .await
}

#[utoipa::path(
    post,
    path = "/hub/{id}/assistant/reset",
    params(("id" = Uuid, Path, description = "Hub session id")),
    responses(
        (status = 200, description = "Assistant chat back to its greeting", body = dto::HubRes)
    )
)]
#[axum::debug_handler]
pub async fn reset_assistant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::HubRes>> {
    gate(&headers, TABS)?;
    let mut hubs = state.hubs();
    let hub = hubs.get_mut(id).map_err(reject)?;
    hub.assistant_mut().reset();
    Ok(Json(hub_res(&state.catalog, hub)))
}

#[utoipa::path(
    post,
    path = "/hub/{id}/diagnostics",
    params(("id" = Uuid, Path, description = "Hub session id")),
    request_body = dto::OpenDiagnosticReq,
    responses(
        (status = 200, description = "Hub with a fresh diagnostic chat", body = dto::HubRes),
        (status = 404, description = "Unknown hub session or wizard")
    )
)]
/// Opens an AI diagnostic chat for a wizard kind, replacing any chat already open.
#[axum::debug_handler]
pub async fn open_diagnostic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::OpenDiagnosticReq>,
) -> ApiResult<Json<dto::HubRes>> {
    gate(&headers, TABS)?;
    let kind: WizardKind = req.kind.parse().map_err(reject)?;
    let mut hubs = state.hubs();
    let hub = hubs.get_mut(id).map_err(reject)?;
    hub.open_diagnostic(kind);
    Ok(Json(hub_res(&state.catalog, hub)))
}

#[utoipa::path(
    delete,
    path = "/hub/{id}/diagnostics",
    params(("id" = Uuid, Path, description = "Hub session id")),
    responses(
        (status = 200, description = "Hub without a diagnostic chat", body = dto::HubRes),
        (status = 404, description = "No diagnostic chat is open")
    )
)]
#[axum::debug_handler]
pub async fn close_diagnostic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::HubRes>> {
    gate(&headers, TABS)?;
    let mut hubs = state.hubs();
    let hub = hubs.get_mut(id).map_err(reject)?;
    hub.close_diagnostic().map_err(reject)?;
    Ok(Json(hub_res(&state.catalog, hub)))
}

#[utoipa::path(
    post,
    path = "/hub/{id}/diagnostics/messages",
    params(("id" = Uuid, Path, description = "Hub session id")),
    request_body = dto::ChatReq,
    responses(
        (status = 200, description = "Hub with the diagnostic reply and highlights", body = dto::HubRes),
        (status = 204, description = "Blank message, nothing sent"),
        (status = 404, description = "No diagnostic chat is open"),
        (status = 409, description = "A reply is still pending")
    )
)]
/// Sends one diagnostic chat message. The reply replaces the chat's highlight set.
#[axum::debug_handler]
pub async fn diagnostic_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::ChatReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let started = {
        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        let chat = hub.diagnostic_mut().map_err(reject)?;
        let kind = chat.kind();
        chat.begin_turn(&req.message)
            .map_err(reject)?
            .map(|turn| (kind, turn))
    };
    let Some((kind, turn)) = started else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    detach(async move {
        let call = gateway::diagnose(
            state.gateway.as_ref(),
            state.catalog.knowledge_base(),
            state.catalog.graph(),
            kind,
            &turn.history,
        );
        let outcome = match state.bounded(call).await {
            Ok(reply) => DiagnosticOutcome::Reply {
                text: reply.text,
                highlights: reply.highlights,
            },
            Err(_) => DiagnosticOutcome::Failed,
        };

        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        // The chat may have been closed or replaced while the gateway was busy.
        if let Ok(chat) = hub.diagnostic_mut() {
            chat.complete_turn(turn.ticket, outcome);
        }
        Ok(Json(hub_res(&state.catalog, hub)).into_response())
    })
    .await
}

#[utoipa::path(
    post,
    path = "/hub/{id}/context/toggle",
    params(("id" = Uuid, Path, description = "Hub session id")),
    request_body = dto::ToggleContextReq,
    responses(
        (status = 200, description = "Selection state after the toggle", body = dto::ToggleContextRes),
        (status = 204, description = "Blank text, nothing toggled")
    )
)]
/// Adds a transcript excerpt to the documentation context, or removes it if already selected.
#[axum::debug_handler]
pub async fn toggle_context(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::ToggleContextReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    if req.text.trim().is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let mut hubs = state.hubs();
    let hub = hubs.get_mut(id).map_err(reject)?;
    let selected = hub.toggle_context(&req.text);
    Ok(Json(dto::ToggleContextRes {
        selected,
        context: hub.context().iter().map(str::to_owned).collect(),
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/hub/{id}/documentation",
    params(("id" = Uuid, Path, description = "Hub session id")),
    request_body = dto::DocumentationReq,
    responses(
        (status = 200, description = "Hub with the generated document", body = dto::HubRes),
        (status = 204, description = "Blank topic, nothing sent"),
        (status = 409, description = "A document is still being generated"),
        (status = 502, description = "Generation failed; the error is also kept on the draft")
    )
)]
/// Generates a documentation draft from the knowledge base, the selected context and a topic.
#[axum::debug_handler]
pub async fn generate_documentation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::DocumentationReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let pending = {
        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        hub.begin_documentation(&req.topic, state.catalog.knowledge_base())
            .map_err(reject)?
    };
    let Some(pending) = pending else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    detach(async move {
        let call = gateway::generate_documentation(state.gateway.as_ref(), &pending.prompt);
        let result = state.bounded(call).await.map_err(|e| e.to_string());

        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        hub.documentation_mut()
            .complete(pending.ticket, result.clone());
        match result {
            Ok(_) => Ok(Json(hub_res(&state.catalog, hub)).into_response()),
            Err(e) => Err((StatusCode::BAD_GATEWAY, e)),
        }
    })
    .await
}

#[utoipa::path(
    post,
    path = "/hub/{id}/explain",
    params(("id" = Uuid, Path, description = "Hub session id")),
    request_body = dto::ExplainReq,
    responses(
        (status = 200, description = "Explanation of the given step or message", body = dto::ExplanationRes),
        (status = 204, description = "Blank text, nothing sent"),
        (status = 409, description = "An explanation is still pending")
    )
)]
#[axum::debug_handler]
pub async fn explain(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::ExplainReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let started = {
        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        hub.explanation_mut().begin(&req.text).map_err(reject)?
    };
    let Some((ticket, text)) = started else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    detach(async move {
        let call = gateway::explain(
            state.gateway.as_ref(),
            state.catalog.knowledge_base(),
            text.as_str(),
        );
        let outcome = match state.bounded(call).await {
            Ok(content) => TurnOutcome::Reply(content),
            Err(_) => TurnOutcome::Failed,
        };

        let mut hubs = state.hubs();
        let hub = hubs.get_mut(id).map_err(reject)?;
        hub.explanation_mut().complete(ticket, outcome);
        Ok(Json(dto::ExplanationRes::from(hub.explanation())).into_response())
    })
    .await
}
