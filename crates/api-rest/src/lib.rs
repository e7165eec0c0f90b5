//! # API REST
//!
//! REST API implementation for the Knowledge Navigator.
//!
//! Handles:
//! - HTTP endpoints with axum, one handler module per dashboard tab
//! - Role header gating
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for wire types and `navigator-gateway` for AI calls.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod state;

pub use state::{gateway_timeout, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use handlers::{architecture, datasets, hub, knowledge, support, wizards};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::dto;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_roles,
        architecture::get_architecture,
        architecture::get_component,
        architecture::focus_view,
        architecture::highlight_view,
        wizards::list_wizards,
        wizards::get_wizard,
        wizards::open_session,
        wizards::get_session,
        wizards::close_session,
        wizards::choose,
        wizards::back,
        wizards::reset,
        support::list_incidents,
        support::get_incident,
        support::escalation_matrix,
        knowledge::ask,
        knowledge::open_chat,
        knowledge::get_chat,
        knowledge::close_chat,
        knowledge::send_message,
        knowledge::reset_chat,
        hub::open_hub,
        hub::get_hub,
        hub::close_hub,
        hub::assistant_message,
        hub::reset_assistant,
        hub::open_diagnostic,
        hub::close_diagnostic,
        hub::diagnostic_message,
        hub::toggle_context,
        hub::generate_documentation,
        hub::explain,
        datasets::options,
        datasets::generate,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ErrorRes,
        dto::TabRes,
        dto::RoleRes,
        dto::RolesRes,
        dto::ComponentStatusRes,
        dto::ComponentRes,
        dto::ConnectionRes,
        dto::ArchitectureRes,
        dto::ComponentDetailRes,
        dto::ComponentEmphasisRes,
        dto::ConnectionEmphasisRes,
        dto::GraphViewRes,
        dto::HighlightReq,
        dto::WizardRes,
        dto::WizardsRes,
        dto::TreeOptionRes,
        dto::TreeNodeRes,
        dto::WizardTreeRes,
        dto::WizardSessionRes,
        dto::ChooseReq,
        dto::IncidentSummaryRes,
        dto::IncidentsRes,
        dto::IncidentRes,
        dto::EscalationRowRes,
        dto::EscalationMatrixRes,
        dto::AskReq,
        dto::AskRes,
        dto::KnowledgeChatRes,
        dto::MessageRes,
        dto::DiagnosticRes,
        dto::DocumentationRes,
        dto::ExplanationRes,
        dto::HubRes,
        dto::ChatReq,
        dto::OpenDiagnosticReq,
        dto::ToggleContextReq,
        dto::ToggleContextRes,
        dto::DocumentationReq,
        dto::ExplainReq,
        dto::DatasetOptionsRes,
        dto::DatasetReq,
        dto::QaPairRes,
        dto::GeneratedFromRes,
        dto::DatasetRes,
    ))
)]
pub struct ApiDoc;

/// Builds the complete REST application for `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/roles", get(handlers::list_roles))
        .route("/architecture", get(architecture::get_architecture))
        .route("/architecture/components/:id", get(architecture::get_component))
        .route("/architecture/focus/:id", get(architecture::focus_view))
        .route("/architecture/highlight", post(architecture::highlight_view))
        .route("/wizards", get(wizards::list_wizards))
        .route("/wizards/:kind", get(wizards::get_wizard))
        .route("/wizards/:kind/sessions", post(wizards::open_session))
        .route(
            "/wizard-sessions/:id",
            get(wizards::get_session).delete(wizards::close_session),
        )
        .route("/wizard-sessions/:id/choose", post(wizards::choose))
        .route("/wizard-sessions/:id/back", post(wizards::back))
        .route("/wizard-sessions/:id/reset", post(wizards::reset))
        .route("/incidents", get(support::list_incidents))
        .route("/incidents/:id", get(support::get_incident))
        .route("/escalation-matrix", get(support::escalation_matrix))
        .route("/knowledge/ask", post(knowledge::ask))
        .route("/knowledge/chats", post(knowledge::open_chat))
        .route(
            "/knowledge/chats/:id",
            get(knowledge::get_chat).delete(knowledge::close_chat),
        )
        .route("/knowledge/chats/:id/messages", post(knowledge::send_message))
        .route("/knowledge/chats/:id/reset", post(knowledge::reset_chat))
        .route("/hub", post(hub::open_hub))
        .route("/hub/:id", get(hub::get_hub).delete(hub::close_hub))
        .route("/hub/:id/assistant", post(hub::assistant_message))
        .route("/hub/:id/assistant/reset", post(hub::reset_assistant))
        .route(
            "/hub/:id/diagnostics",
            post(hub::open_diagnostic).delete(hub::close_diagnostic),
        )
        .route("/hub/:id/diagnostics/messages", post(hub::diagnostic_message))
        .route("/hub/:id/context/toggle", post(hub::toggle_context))
        .route("/hub/:id/documentation", post(hub::generate_documentation))
        .route("/hub/:id/explain", post(hub::explain))
        .route("/datasets/options", get(datasets::options))
        .route("/datasets", post(datasets::generate))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
