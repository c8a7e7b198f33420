use uuid::Uuid;

use crate::domain::rating::{Rating, round_to_tenth};
use crate::domain::user::Actor;
use crate::usecase::contracts::{PlaceRepository, RatingRepository};
use crate::usecase::error::UsecaseError;

pub struct RatingsUseCase<Ra, P>
where
    Ra: RatingRepository,
    P: PlaceRepository,
{
    rating_repository: Ra,
    place_repository: P,
}

impl<Ra, P> RatingsUseCase<Ra, P>
where
    Ra: RatingRepository,
    P: PlaceRepository,
{
    pub fn new(rating_repository: Ra, place_repository: P) -> Self {
        Self {
            rating_repository,
            place_repository,
        }
    }

    /// Repeat ratings by the same user are allowed; each visit may leave one.
    #[tracing::instrument(skip(self, comment, photo), fields(place_id = %place_id, user_id = %user_id, stars))]
    pub async fn add_rating(
        &self,
        user_id: Uuid,
        place_id: Uuid,
        stars: f64,
        comment: Option<String>,
        photo: Option<String>,
    ) -> Result<Rating, UsecaseError> {
        tracing::debug!("adding rating");

        if !(0.0..=5.0).contains(&stars) {
            return Err(UsecaseError::Validation(
                "Stars must be between 0 and 5".to_string(),
            ));
        }

        self.place_repository
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Place".to_string()))?;

        let rating = Rating::new(user_id, place_id, stars, comment, photo);
        self.rating_repository.create(&rating).await?;

        tracing::info!(rating_id = %rating.id, "rating added successfully");
        Ok(rating)
    }

    #[tracing::instrument(skip(self), fields(actor_id = %actor.id, rating_id = %rating_id))]
    pub async fn delete_rating(&self, actor: Actor, rating_id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting rating");

        let rating = self
            .rating_repository
            .find_by_id(rating_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Rating".to_string()))?;

        if !actor.owns_or_admin(rating.user_id) {
            return Err(UsecaseError::Forbidden(
                "Only the rating's author or an admin can delete it".to_string(),
            ));
        }

        self.rating_repository.delete(rating_id).await?;

        tracing::info!(rating_id = %rating_id, "rating deleted successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(place_id = %place_id))]
    pub async fn average_for(&self, place_id: Uuid) -> Result<f64, UsecaseError> {
        let average = self.rating_repository.average_for(place_id).await?;
        Ok(average.map(round_to_tenth).unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::place::Place;
    use crate::usecase::contracts::{MockPlaceRepository, MockRatingRepository};

    fn make_place() -> Place {
        Place::new(
            "Kazbegi View".to_string(),
            "d".to_string(),
            "mountains".to_string(),
            "Mtskheta-Mtianeti".to_string(),
            None,
            Some(42.66),
            Some(44.64),
            None,
        )
    }

    #[tokio::test]
    async fn test_add_rating_success() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mut mock_place_repo = MockPlaceRepository::new();
        let place = make_place();

        mock_place_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(place.clone())));
        mock_rating_repo.expect_create().times(1).returning(|_| Ok(()));

        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let result = usecase
            .add_rating(Uuid::new_v4(), Uuid::new_v4(), 4.5, Some("great".to_string()), None)
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().stars, 4.5);
    }

    #[tokio::test]
    async fn test_add_rating_out_of_range() {
        for stars in [-0.5, 5.5] {
            let mock_rating_repo = MockRatingRepository::new();
            let mock_place_repo = MockPlaceRepository::new();

            let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
            let result = usecase
                .add_rating(Uuid::new_v4(), Uuid::new_v4(), stars, None, None)
                .await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_add_rating_place_not_found() {
        let mock_rating_repo = MockRatingRepository::new();
        let mut mock_place_repo = MockPlaceRepository::new();

        mock_place_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let result = usecase
            .add_rating(Uuid::new_v4(), Uuid::new_v4(), 3.0, None, None)
            .await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_rating_by_owner() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mock_place_repo = MockPlaceRepository::new();
        let user_id = Uuid::new_v4();
        let rating = Rating::new(user_id, Uuid::new_v4(), 4.0, None, None);
        let rating_id = rating.id;

        mock_rating_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(rating.clone())));
        mock_rating_repo
            .expect_delete()
            .with(mockall::predicate::eq(rating_id))
            .times(1)
            .returning(|_| Ok(()));

        let actor = Actor {
            id: user_id,
            is_admin: false,
        };
        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let result = usecase.delete_rating(actor, rating_id).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rating_forbidden_for_stranger() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mock_place_repo = MockPlaceRepository::new();
        let rating = Rating::new(Uuid::new_v4(), Uuid::new_v4(), 4.0, None, None);

        // No delete expectation: the rating must stay intact.
        mock_rating_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(rating.clone())));

        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: false,
        };
        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let result = usecase.delete_rating(actor, Uuid::new_v4()).await;

        assert!(matches!(result, Err(UsecaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_rating_by_admin() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mock_place_repo = MockPlaceRepository::new();
        let rating = Rating::new(Uuid::new_v4(), Uuid::new_v4(), 4.0, None, None);

        mock_rating_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(rating.clone())));
        mock_rating_repo.expect_delete().times(1).returning(|_| Ok(()));

        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: true,
        };
        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let result = usecase.delete_rating(actor, Uuid::new_v4()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rating_not_found() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mock_place_repo = MockPlaceRepository::new();

        mock_rating_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: true,
        };
        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let result = usecase.delete_rating(actor, Uuid::new_v4()).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_average_for_rounds_to_one_decimal() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mock_place_repo = MockPlaceRepository::new();

        mock_rating_repo
            .expect_average_for()
            .times(1)
            .returning(|_| Ok(Some(10.0 / 3.0)));

        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let average = usecase.average_for(Uuid::new_v4()).await.unwrap();

        assert_eq!(average, 3.3);
    }

    #[tokio::test]
    async fn test_average_for_empty_is_zero() {
        let mut mock_rating_repo = MockRatingRepository::new();
        let mock_place_repo = MockPlaceRepository::new();

        mock_rating_repo
            .expect_average_for()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = RatingsUseCase::new(mock_rating_repo, mock_place_repo);
        let average = usecase.average_for(Uuid::new_v4()).await.unwrap();

        assert_eq!(average, 0.0);
    }
}
