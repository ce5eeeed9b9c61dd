use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{dto::stats_dto::StatisticsResponse, error::Result, AppState};

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Assignment statistics", body = StatisticsResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_statistics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.stats_service.statistics().await?;
    Ok(Json(StatisticsResponse::from(stats)))
}
