use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::planned_route::PlannedRoute;
use crate::domain::user::Actor;
use crate::usecase::contracts::{PlaceRepository, PlannedRouteRepository};
use crate::usecase::error::UsecaseError;

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub route: PlannedRoute,
    /// False when the user had already planned this place and the existing
    /// route was returned unchanged.
    pub created: bool,
}

pub struct PlannedRoutesUseCase<Pr, P>
where
    Pr: PlannedRouteRepository,
    P: PlaceRepository,
{
    route_repository: Pr,
    place_repository: P,
}

impl<Pr, P> PlannedRoutesUseCase<Pr, P>
where
    Pr: PlannedRouteRepository,
    P: PlaceRepository,
{
    pub fn new(route_repository: Pr, place_repository: P) -> Self {
        Self {
            route_repository,
            place_repository,
        }
    }

    /// The "plan" action dedups per (user, place): planning an
    /// already-planned place is a no-op that returns the existing route.
    #[tracing::instrument(skip(self), fields(place_id = %place_id, user_id = %user_id))]
    pub async fn plan(&self, user_id: Uuid, place_id: Uuid) -> Result<PlanOutcome, UsecaseError> {
        tracing::debug!("planning route");

        self.place_repository
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Place".to_string()))?;

        if let Some(existing) = self
            .route_repository
            .find_by_pair(user_id, place_id)
            .await?
        {
            return Ok(PlanOutcome {
                route: existing,
                created: false,
            });
        }

        let route = PlannedRoute::new(user_id, place_id, Utc::now().date_naive());
        self.route_repository.create(&route).await?;

        tracing::info!(route_id = %route.id, "route planned successfully");
        Ok(PlanOutcome {
            route,
            created: true,
        })
    }

    /// The booking flow always inserts, duplicates included; each booking
    /// names an explicit date. Deliberately a different contract from
    /// [`plan`](Self::plan).
    #[tracing::instrument(skip(self), fields(place_id = %place_id, user_id = %user_id, %visit_date))]
    pub async fn book(
        &self,
        user_id: Uuid,
        place_id: Uuid,
        visit_date: NaiveDate,
    ) -> Result<PlannedRoute, UsecaseError> {
        tracing::debug!("booking visit");

        self.place_repository
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Place".to_string()))?;

        let route = PlannedRoute::new(user_id, place_id, visit_date);
        self.route_repository.create(&route).await?;

        tracing::info!(route_id = %route.id, "visit booked successfully");
        Ok(route)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<PlannedRoute>, UsecaseError> {
        Ok(self.route_repository.list_for_user(user_id).await?)
    }

    #[tracing::instrument(skip(self), fields(actor_id = %actor.id, route_id = %route_id))]
    pub async fn delete(&self, actor: Actor, route_id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting planned route");

        let route = self
            .route_repository
            .find_by_id(route_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Route".to_string()))?;

        if !actor.owns_or_admin(route.user_id) {
            return Err(UsecaseError::Forbidden(
                "Only the route's owner or an admin can delete it".to_string(),
            ));
        }

        self.route_repository.delete(route_id).await?;

        tracing::info!(route_id = %route_id, "planned route deleted successfully");
        Ok(())
    }
}
