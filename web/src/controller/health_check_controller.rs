use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthStatus {
    #[schema(example = "ok")]
    status: &'static str,
    /// Number of meetings with a cached summary.
    cached_meetings: usize,
}

/// GET service liveness and summary cache size
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = HealthStatus),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let cached_meetings = app_state.summary_store_ref().count().await?;
    Ok((
        StatusCode::OK,
        Json(HealthStatus {
            status: "ok",
            cached_meetings,
        }),
    ))
}
