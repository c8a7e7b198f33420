use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::middleware::{locale_from_headers, AuthenticatedUser};
use crate::delivery::http::v1::ratings::RatingResponse;
use crate::domain::place::{Place, PlaceFilter, PlaceWithStats};
use crate::usecase::error::UsecaseError;
use crate::usecase::places::NewPlace;
use crate::usecase::translator::Locale;
use crate::AppState;

#[derive(Serialize)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct PlaceStatsResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub avg_rating: f64,
    pub ratings_count: i64,
}

#[derive(Serialize)]
pub struct PlacePageResponse {
    pub items: Vec<PlaceStatsResponse>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

#[derive(Serialize)]
pub struct PlaceDetailResponse {
    pub place: PlaceResponse,
    pub avg_rating: f64,
    pub ratings: Vec<RatingResponse>,
}

#[derive(Serialize)]
pub struct CategoryCountResponse {
    pub category: String,
    pub count: i64,
}

#[derive(Serialize)]
pub struct LandingResponse {
    pub users_count: i64,
    pub places_count: i64,
    pub top_places: Vec<PlaceStatsResponse>,
    pub categories: Vec<CategoryCountResponse>,
}

#[derive(Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 50))]
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPlacesQuery {
    pub category: Option<String>,
    pub region: Option<String>,
    /// Minimum average rating, applied after aggregates are computed.
    pub rating: Option<f64>,
    /// Case-insensitive substring match on the name.
    pub q: Option<String>,
    #[serde(default)]
    pub favorites_only: bool,
    pub page: Option<usize>,
}

pub fn place_to_response(p: Place) -> PlaceResponse {
    PlaceResponse {
        id: p.id,
        name: p.name,
        description: p.description,
        category: p.category,
        region: p.region,
        image: p.image,
        latitude: p.latitude,
        longitude: p.longitude,
        user_id: p.user_id,
        created_at: p.created_at,
    }
}

pub fn stats_to_response(p: PlaceWithStats) -> PlaceStatsResponse {
    PlaceStatsResponse {
        id: p.id,
        name: p.name,
        description: p.description,
        category: p.category,
        region: p.region,
        image: p.image,
        latitude: p.latitude,
        longitude: p.longitude,
        avg_rating: p.avg_rating,
        ratings_count: p.ratings_count,
    }
}

async fn translate_stats(
    state: &AppState,
    locale: Locale,
    mut rows: Vec<PlaceWithStats>,
) -> Vec<PlaceStatsResponse> {
    for row in &mut rows {
        row.name = state.translator.translate(&row.name, locale).await;
        row.description = state.translator.translate(&row.description, locale).await;
    }
    rows.into_iter().map(stats_to_response).collect()
}

#[tracing::instrument(skip(state, headers), fields(user_id = %user.user_id))]
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    Query(params): Query<ListPlacesQuery>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(?params, "handling list places request");

    let locale = locale_from_headers(&headers);
    let filter = PlaceFilter {
        category: params.category.filter(|s| !s.is_empty()),
        region: params.region.filter(|s| !s.is_empty()),
        name_contains: params.q.filter(|s| !s.is_empty()),
        favorites_of: params.favorites_only.then_some(user.user_id),
    };

    let page = state
        .places_usecase
        .list_places(filter, params.rating, params.page.unwrap_or(1))
        .await?;

    let items = translate_stats(&state, locale, page.items).await;

    tracing::debug!(count = items.len(), total = page.total, "places listed successfully");
    Ok((
        StatusCode::OK,
        Json(PlacePageResponse {
            items,
            page: page.page,
            total_pages: page.total_pages,
            total: page.total,
        }),
    ))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn create_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreatePlaceRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create place request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(user_id = %user.user_id, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let place = state
        .places_usecase
        .create_place(
            user.user_id,
            NewPlace {
                name: payload.name,
                description: payload.description,
                category: payload.category,
                region: payload.region,
                latitude: payload.latitude,
                longitude: payload.longitude,
                image: payload.image,
            },
        )
        .await?;

    metrics::counter!("places_created_total").increment(1);
    tracing::debug!(place_id = %place.id, "place created successfully");
    Ok((StatusCode::CREATED, Json(place_to_response(place))))
}

#[tracing::instrument(skip(state, headers), fields(user_id = %user.user_id, place_id = %place_id))]
pub async fn get_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    Path(place_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get place request");

    let locale = locale_from_headers(&headers);
    let mut detail = state.places_usecase.get_place(place_id).await?;

    detail.place.name = state.translator.translate(&detail.place.name, locale).await;
    detail.place.description = state
        .translator
        .translate(&detail.place.description, locale)
        .await;

    let mut ratings = Vec::with_capacity(detail.ratings.len());
    for rating in detail.ratings {
        let comment = state
            .translator
            .translate_opt(rating.comment.as_deref(), locale)
            .await;
        ratings.push(RatingResponse {
            id: rating.id,
            user_id: rating.user_id,
            place_id: rating.place_id,
            stars: rating.stars,
            comment,
            photo: rating.photo,
            created_at: rating.created_at,
        });
    }

    Ok((
        StatusCode::OK,
        Json(PlaceDetailResponse {
            place: place_to_response(detail.place),
            avg_rating: detail.avg_rating,
            ratings,
        }),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, place_id = %place_id))]
pub async fn delete_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(place_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete place request");

    state
        .places_usecase
        .delete_place(user.actor(), place_id)
        .await?;

    tracing::debug!(place_id = %place_id, "place deleted successfully");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn map_places(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling map places request");

    let places = state.places_usecase.map_places().await?;
    let response: Vec<PlaceResponse> = places.into_iter().map(place_to_response).collect();

    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, headers), fields(user_id = %user.user_id))]
pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling suggestions request");

    let locale = locale_from_headers(&headers);
    let rows = state.places_usecase.suggestions().await?;
    let response = translate_stats(&state, locale, rows).await;

    tracing::debug!(count = response.len(), "suggestions listed successfully");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state))]
pub async fn landing(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling landing request");

    let users_count = state.auth_usecase.user_count().await?;
    let places_count = state.places_usecase.place_count().await?;
    let top_places = state
        .places_usecase
        .suggestions()
        .await?
        .into_iter()
        .map(stats_to_response)
        .collect();
    let categories = state
        .places_usecase
        .category_counts()
        .await?
        .into_iter()
        .map(|c| CategoryCountResponse {
            category: c.category,
            count: c.count,
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(LandingResponse {
            users_count,
            places_count,
            top_places,
            categories,
        }),
    ))
}
