//! LM Dataset Generator.

use crate::error::{gate, reject, ApiResult};
use crate::state::AppState;
use api_shared::dto;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use navigator_core::constants::{DEFAULT_DATASET_COUNT, MAX_DATASET_COUNT, MIN_DATASET_COUNT};
use navigator_core::dataset::{PERSONAS, TOPICS};
use navigator_core::{DatasetExport, DatasetRequest, NavigatorError, Tab};
use navigator_gateway as gateway;

const TABS: &[Tab] = &[Tab::DatasetGenerator];

#[utoipa::path(
    get,
    path = "/datasets/options",
    responses(
        (status = 200, description = "Topics, personas and count range", body = dto::DatasetOptionsRes)
    )
)]
#[axum::debug_handler]
pub async fn options(headers: HeaderMap) -> ApiResult<Json<dto::DatasetOptionsRes>> {
    gate(&headers, TABS)?;
    Ok(Json(dto::DatasetOptionsRes {
        topics: TOPICS.iter().map(|t| t.to_string()).collect(),
        personas: PERSONAS.iter().map(|p| p.to_string()).collect(),
        min_count: MIN_DATASET_COUNT,
        max_count: MAX_DATASET_COUNT,
        default_count: DEFAULT_DATASET_COUNT,
    }))
}

#[utoipa::path(
    post,
    path = "/datasets",
    request_body = dto::DatasetReq,
    responses(
        (status = 200, description = "Generated dataset ready for download", body = dto::DatasetRes),
        (status = 204, description = "Blank topic or persona, nothing sent"),
        (status = 502, description = "The gateway failed or returned no usable pairs")
    )
)]
/// Generates question/answer pairs for a topic and persona. The count is clamped to the
/// accepted range before the request is sent.
#[axum::debug_handler]
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::DatasetReq>,
) -> ApiResult<Response> {
    gate(&headers, TABS)?;
    let request = match DatasetRequest::new(&req.topic, &req.persona, req.count) {
        Ok(request) => request,
        Err(NavigatorError::EmptyInput) => return Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => return Err(reject(e)),
    };

    let call = gateway::generate_dataset(
        state.gateway.as_ref(),
        state.catalog.knowledge_base(),
        &request,
    );
    let pairs = state
        .bounded(call)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    let export = DatasetExport::new(&request, pairs, Utc::now());
    let generated = &export.generated_from;
    Ok(Json(dto::DatasetRes {
        filename: export.filename(),
        generated_from: dto::GeneratedFromRes {
            topic: generated.topic.clone(),
            persona: generated.persona.clone(),
            count: generated.count,
            timestamp: generated
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        dataset: export.dataset.into_iter().map(Into::into).collect(),
    })
    .into_response())
}
