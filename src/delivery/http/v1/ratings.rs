use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::rating::Rating;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Serialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub stars: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            place_id: r.place_id,
            stars: r.stars,
            comment: r.comment,
            photo: r.photo,
            created_at: r.created_at,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateRatingRequest {
    #[validate(range(min = 0.0, max = 5.0))]
    pub stars: f64,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    pub photo: Option<String>,
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, place_id = %place_id))]
pub async fn create_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(place_id): Path<Uuid>,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create rating request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(user_id = %user.user_id, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let rating = state
        .ratings_usecase
        .add_rating(user.user_id, place_id, payload.stars, comment, payload.photo)
        .await?;

    metrics::counter!("ratings_created_total").increment(1);
    tracing::debug!(rating_id = %rating.id, "rating created successfully");
    Ok((StatusCode::CREATED, Json(RatingResponse::from(rating))))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, rating_id = %rating_id))]
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(rating_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete rating request");

    state
        .ratings_usecase
        .delete_rating(user.actor(), rating_id)
        .await?;

    tracing::debug!(rating_id = %rating_id, "rating deleted successfully");
    Ok((StatusCode::OK, Json(json!({"status": "success"}))))
}
