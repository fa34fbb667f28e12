use crate::controller::{chat_controller, health_check_controller, summary_controller};
use crate::{controller, params, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Meeting Minutes API"
        ),
        paths(
            health_check_controller::health_check,
            summary_controller::create,
            chat_controller::create,
        ),
        components(
            schemas(
                controller::Envelope,
                controller::EnvelopeData,
                health_check_controller::HealthStatus,
                params::summary::SummaryParams,
                params::chat::ChatParams,
                params::chat::ChatTurn,
                params::chat::TurnRole,
            )
        ),
        tags(
            (name = "meeting_minutes", description = "Meeting summaries and contextual Q&A backed by an LLM")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes(app_state.clone()))
        .merge(minutes_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

fn minutes_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/summary", post(summary_controller::create))
        .route("/chat", post(chat_controller::create))
        .with_state(app_state)
}
