//! Knowledge Extraction Engine: one-shot questions and chat sessions over the knowledge base.

use crate::error::{detach, gate, reject, ApiResult};
use crate::state::AppState;
use api_shared::dto;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use navigator_core::constants::CHAT_FAILURE_MESSAGE;
use navigator_core::{ChatPanel, NonEmptyText, Tab, TurnOutcome};
use navigator_gateway as gateway;
use uuid::Uuid;

const TABS: &[Tab] = &[Tab::KnowledgeEngine];

#[utoipa::path(
    post,
    path = "/knowledge/ask",
    request_body = dto::AskReq,
    responses(
        (status = 200, description = "Answer grounded on the knowledge base", body = dto::AskRes),
        (status = 204, description = "Blank question, nothing sent")
    )
)]
/// Answers a single question. A gateway failure is reported as the chat failure message.
#[axum::debug_handler]
pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::AskReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let Some(question) = NonEmptyText::parse_optional(&req.question) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let call = gateway::ask(
        state.gateway.as_ref(),
        state.catalog.knowledge_base(),
        question.as_str(),
    );
    let answer = state
        .bounded(call)
        .await
        .unwrap_or_else(|_| CHAT_FAILURE_MESSAGE.to_owned());

    Ok(Json(dto::AskRes { answer }).into_response())
}

#[utoipa::path(
    post,
    path = "/knowledge/chats",
    responses(
        (status = 201, description = "Chat opened with the greeting", body = dto::KnowledgeChatRes)
    )
)]
#[axum::debug_handler]
pub async fn open_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<dto::KnowledgeChatRes>)> {
    gate(&headers, TABS)?;
    let id = Uuid::new_v4();
    let chat = ChatPanel::knowledge();
    let res = dto::KnowledgeChatRes::new(&id.to_string(), &chat);
    state.knowledge_chats().insert(id, chat);
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(
    get,
    path = "/knowledge/chats/{id}",
    params(("id" = Uuid, Path, description = "Chat id")),
    responses(
        (status = 200, description = "Chat transcript", body = dto::KnowledgeChatRes),
        (status = 404, description = "Unknown chat")
    )
)]
#[axum::debug_handler]
pub async fn get_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::KnowledgeChatRes>> {
    gate(&headers, TABS)?;
    let mut chats = state.knowledge_chats();
    let chat = chats.get_mut(id).map_err(reject)?;
    Ok(Json(dto::KnowledgeChatRes::new(&id.to_string(), chat)))
}

#[utoipa::path(
    delete,
    path = "/knowledge/chats/{id}",
    params(("id" = Uuid, Path, description = "Chat id")),
    responses(
        (status = 204, description = "Chat closed"),
        (status = 404, description = "Unknown chat")
    )
)]
#[axum::debug_handler]
pub async fn close_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    gate(&headers, TABS)?;
    state
        .knowledge_chats()
        .remove(id)
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/knowledge/chats/{id}/messages",
    params(("id" = Uuid, Path, description = "Chat id")),
    request_body = dto::ChatReq,
    responses(
        (status = 200, description = "Transcript with the reply appended", body = dto::KnowledgeChatRes),
        (status = 204, description = "Blank message, nothing sent"),
        (status = 404, description = "Unknown chat"),
        (status = 409, description = "A reply is still pending")
    )
)]
/// Sends one chat message and waits for the reply.
///
/// The chat is unlocked while the gateway call runs. If the chat is reset or closed in the
/// meantime, the late reply is dropped. The reply is recorded even if the caller disconnects.
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<dto::ChatReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let turn = {
        let mut chats = state.knowledge_chats();
        let chat = chats.get_mut(id).map_err(reject)?;
        chat.begin_turn(&req.message).map_err(reject)?
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

        let mut chats = state.knowledge_chats();
        let chat = chats.get_mut(id).map_err(reject)?;
        chat.complete_turn(turn.ticket, outcome);
        Ok(Json(dto::KnowledgeChatRes::new(&id.to_string(), chat)).into_response())
    })
    .await
}

#[utoipa::path(
    post,
    path = "/knowledge/chats/{id}/reset",
    params(("id" = Uuid, Path, description = "Chat id")),
    responses(
        (status = 200, description = "Chat back to its greeting", body = dto::KnowledgeChatRes),
        (status = 404, description = "Unknown chat")
    )
)]
#[axum::debug_handler]
pub async fn reset_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<dto::KnowledgeChatRes>> {
    gate(&headers, TABS)?;
    let mut chats = state.knowledge_chats();
    let chat = chats.get_mut(id).map_err(reject)?;
    chat.reset();
    Ok(Json(dto::KnowledgeChatRes::new(&id.to_string(), chat)))
}
