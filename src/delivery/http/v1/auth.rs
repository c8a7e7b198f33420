use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::middleware::{locale_from_headers, AuthenticatedUser};
use crate::delivery::http::v1::places::{
    place_to_response, stats_to_response, PlaceResponse, PlaceStatsResponse,
};
use crate::delivery::http::v1::routes::RouteResponse;
use crate::domain::user::User;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address.
    #[validate(length(min = 1))]
    pub identifier: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            is_admin: u.is_admin,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    /// Mean of the averages of the user's rated favorites.
    pub avg_rating: f64,
    pub my_places: Vec<PlaceResponse>,
    pub favorites: Vec<PlaceStatsResponse>,
    pub planned_routes: Vec<RouteResponse>,
}

#[tracing::instrument(skip(state, payload))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling register request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let (user, tokens) = state
        .auth_usecase
        .register(payload.username, payload.email, payload.password)
        .await?;

    metrics::counter!("users_registered_total").increment(1);
    tracing::debug!(user_id = %user.id, "user registered successfully");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

#[tracing::instrument(skip(state, payload))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling login request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let (user, tokens) = state
        .auth_usecase
        .login(payload.identifier, payload.password)
        .await?;

    metrics::counter!("users_logged_in_total").increment(1);
    tracing::debug!(user_id = %user.id, "user logged in successfully");
    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            user: UserResponse::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

#[tracing::instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling refresh request");

    let access_token = state.auth_usecase.refresh(&payload.refresh_token).await?;

    Ok((StatusCode::OK, Json(RefreshResponse { access_token })))
}

#[tracing::instrument(skip(state, headers), fields(user_id = %user.user_id))]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling profile request");

    let locale = locale_from_headers(&headers);

    let account = state.auth_usecase.get_user(user.user_id).await?;
    let avg_rating = state.favorites_usecase.user_average(user.user_id).await?;

    let mut my_places = Vec::new();
    for mut place in state.places_usecase.places_of(user.user_id).await? {
        place.name = state.translator.translate(&place.name, locale).await;
        my_places.push(place_to_response(place));
    }

    let mut favorites = Vec::new();
    for mut row in state.favorites_usecase.list(user.user_id).await? {
        row.name = state.translator.translate(&row.name, locale).await;
        favorites.push(stats_to_response(row));
    }

    let planned_routes = state
        .planned_routes_usecase
        .list(user.user_id)
        .await?
        .into_iter()
        .map(RouteResponse::from)
        .collect();

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            user: UserResponse::from(account),
            avg_rating,
            my_places,
            favorites,
            planned_routes,
        }),
    ))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling change password request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(user_id = %user.user_id, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    state
        .auth_usecase
        .change_password(user.user_id, payload.old_password, payload.new_password)
        .await?;

    tracing::debug!("password changed successfully");
    Ok(StatusCode::OK)
}
