use uuid::Uuid;

use crate::domain::favorite::Favorite;
use crate::domain::place::PlaceWithStats;
use crate::domain::rating::round_to_tenth;
use crate::usecase::contracts::{FavoriteRepository, PlaceRepository};
use crate::usecase::error::UsecaseError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Added => "added",
            ToggleOutcome::Removed => "removed",
        }
    }
}

pub struct FavoritesUseCase<F, P>
where
    F: FavoriteRepository,
    P: PlaceRepository,
{
    favorite_repository: F,
    place_repository: P,
}

impl<F, P> FavoritesUseCase<F, P>
where
    F: FavoriteRepository,
    P: PlaceRepository,
{
    pub fn new(favorite_repository: F, place_repository: P) -> Self {
        Self {
            favorite_repository,
            place_repository,
        }
    }

    /// Read-then-write flip. The unique index on (user, place) arbitrates
    /// races: a losing duplicate insert is ignored and still reports
    /// `Added`, since the edge is present either way.
    #[tracing::instrument(skip(self), fields(place_id = %place_id, user_id = %user_id))]
    pub async fn toggle(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<ToggleOutcome, UsecaseError> {
        tracing::debug!("toggling favorite");

        self.place_repository
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Place".to_string()))?;

        let existing = self
            .favorite_repository
            .find_by_pair(user_id, place_id)
            .await?;

        let outcome = if existing.is_some() {
            self.favorite_repository
                .delete_by_pair(user_id, place_id)
                .await?;
            ToggleOutcome::Removed
        } else {
            let favorite = Favorite::new(user_id, place_id);
            self.favorite_repository.insert(&favorite).await?;
            ToggleOutcome::Added
        };

        tracing::info!(place_id = %place_id, user_id = %user_id, outcome = outcome.as_str(), "favorite toggled");
        Ok(outcome)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<PlaceWithStats>, UsecaseError> {
        let mut rows = self.favorite_repository.list_for_user(user_id).await?;
        for row in &mut rows {
            row.avg_rating = round_to_tenth(row.avg_rating);
        }

        tracing::debug!(user_id = %user_id, count = rows.len(), "favorites listed");
        Ok(rows)
    }

    /// Mean of the favorited places' average ratings, skipping places with
    /// no ratings at all; 0.0 when nothing qualifies.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_average(&self, user_id: Uuid) -> Result<f64, UsecaseError> {
        let rows = self.favorite_repository.list_for_user(user_id).await?;

        let rated: Vec<f64> = rows
            .iter()
            .filter(|row| row.ratings_count > 0)
            .map(|row| round_to_tenth(row.avg_rating))
            .collect();

        if rated.is_empty() {
            return Ok(0.0);
        }

        let sum: f64 = rated.iter().sum();
        Ok(round_to_tenth(sum / rated.len() as f64))
    }
}
