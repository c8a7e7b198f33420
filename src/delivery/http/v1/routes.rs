use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::planned_route::PlannedRoute;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Serialize)]
pub struct RouteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub visit_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<PlannedRoute> for RouteResponse {
    fn from(r: PlannedRoute) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            place_id: r.place_id,
            visit_date: r.visit_date,
            created_at: r.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct BookVisitRequest {
    pub place_id: Uuid,
    pub date: NaiveDate,
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, place_id = %place_id))]
pub async fn plan_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(place_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling plan route request");

    let outcome = state
        .planned_routes_usecase
        .plan(user.user_id, place_id)
        .await?;

    let status = if outcome.created {
        metrics::counter!("routes_planned_total").increment(1);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    tracing::debug!(route_id = %outcome.route.id, created = outcome.created, "route planned");
    Ok((status, Json(RouteResponse::from(outcome.route))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn book_visit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<BookVisitRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling book visit request");

    let route = state
        .planned_routes_usecase
        .book(user.user_id, payload.place_id, payload.date)
        .await?;

    metrics::counter!("visits_booked_total").increment(1);
    tracing::debug!(route_id = %route.id, "visit booked successfully");
    Ok((StatusCode::CREATED, Json(RouteResponse::from(route))))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_routes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list routes request");

    let routes = state.planned_routes_usecase.list(user.user_id).await?;
    let response: Vec<RouteResponse> = routes.into_iter().map(RouteResponse::from).collect();

    tracing::debug!(count = response.len(), "routes listed successfully");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, route_id = %route_id))]
pub async fn delete_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(route_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete route request");

    state
        .planned_routes_usecase
        .delete(user.actor(), route_id)
        .await?;

    tracing::debug!(route_id = %route_id, "route deleted successfully");
    Ok(StatusCode::NO_CONTENT)
}
