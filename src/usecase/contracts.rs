use uuid::Uuid;

use crate::domain::favorite::Favorite;
use crate::domain::place::{CategoryCount, Place, PlaceFilter, PlaceWithStats};
use crate::domain::planned_route::PlannedRoute;
use crate::domain::rating::Rating;
use crate::domain::user::User;
use crate::repository::errors::RepositoryError;

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    /// Matches against username or email, whichever the caller typed.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, RepositoryError>;
    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, RepositoryError>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PlaceRepository: Send + Sync {
    async fn create(&self, place: &Place) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, RepositoryError>;
    /// Case-insensitive exact match.
    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError>;
    async fn list_with_stats(
        &self,
        filter: &PlaceFilter,
    ) -> Result<Vec<PlaceWithStats>, RepositoryError>;
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Place>, RepositoryError>;
    /// Places with both coordinates present, for the map view.
    async fn list_mapped(&self) -> Result<Vec<Place>, RepositoryError>;
    /// Deletes the place together with its ratings, favorite edges and
    /// planned routes, in one transaction.
    async fn delete_with_dependents(&self, id: Uuid) -> Result<(), RepositoryError>;
    async fn category_counts(&self) -> Result<Vec<CategoryCount>, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: &Rating) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError>;
    async fn find_by_place(&self, place_id: Uuid) -> Result<Vec<Rating>, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// Raw mean of stars; None when the place has no ratings.
    async fn average_for(&self, place_id: Uuid) -> Result<Option<f64>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FavoriteRepository: Send + Sync {
    /// Returns false when the pair already existed (duplicate insert is
    /// ignored, not an error).
    async fn insert(&self, favorite: &Favorite) -> Result<bool, RepositoryError>;
    async fn delete_by_pair(&self, user_id: Uuid, place_id: Uuid)
        -> Result<bool, RepositoryError>;
    async fn find_by_pair(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<Favorite>, RepositoryError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PlaceWithStats>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PlannedRouteRepository: Send + Sync {
    async fn create(&self, route: &PlannedRoute) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlannedRoute>, RepositoryError>;
    async fn find_by_pair(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<PlannedRoute>, RepositoryError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PlannedRoute>, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
