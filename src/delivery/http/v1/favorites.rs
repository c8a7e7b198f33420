use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::delivery::http::v1::middleware::{locale_from_headers, AuthenticatedUser};
use crate::delivery::http::v1::places::stats_to_response;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, place_id = %place_id))]
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(place_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling toggle favorite request");

    let outcome = state
        .favorites_usecase
        .toggle(user.user_id, place_id)
        .await?;

    metrics::counter!("favorite_toggles_total", "outcome" => outcome.as_str()).increment(1);
    tracing::debug!(outcome = outcome.as_str(), "favorite toggled successfully");
    Ok((StatusCode::OK, Json(json!({"status": outcome.as_str()}))))
}

#[tracing::instrument(skip(state, headers), fields(user_id = %user.user_id))]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list favorites request");

    let locale = locale_from_headers(&headers);
    let mut rows = state.favorites_usecase.list(user.user_id).await?;
    for row in &mut rows {
        row.name = state.translator.translate(&row.name, locale).await;
        row.description = state.translator.translate(&row.description, locale).await;
    }

    let response: Vec<_> = rows.into_iter().map(stats_to_response).collect();

    tracing::debug!(count = response.len(), "favorites listed successfully");
    Ok((StatusCode::OK, Json(response)))
}
