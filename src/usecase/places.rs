use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::domain::place::{CategoryCount, Place, PlaceFilter, PlaceWithStats};
use crate::domain::rating::{Rating, round_to_tenth};
use crate::domain::user::Actor;
use crate::usecase::contracts::{PlaceRepository, RatingRepository};
use crate::usecase::error::UsecaseError;

pub const PAGE_SIZE: usize = 20;
const SUGGESTION_LIMIT: usize = 10;
const SUGGESTION_MIN_AVG: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct NewPlace {
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacePage {
    pub items: Vec<PlaceWithStats>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct PlaceDetail {
    pub place: Place,
    pub ratings: Vec<Rating>,
    pub avg_rating: f64,
}

pub struct PlacesUseCase<P, R>
where
    P: PlaceRepository,
    R: RatingRepository,
{
    place_repository: P,
    rating_repository: R,
}

impl<P, R> PlacesUseCase<P, R>
where
    P: PlaceRepository,
    R: RatingRepository,
{
    pub fn new(place_repository: P, rating_repository: R) -> Self {
        Self {
            place_repository,
            rating_repository,
        }
    }

    #[tracing::instrument(skip(self, input), fields(owner_id = %owner, name = %input.name))]
    pub async fn create_place(
        &self,
        owner: Uuid,
        input: NewPlace,
    ) -> Result<Place, UsecaseError> {
        tracing::debug!("creating place");

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(UsecaseError::Validation(
                "Place name must not be empty".to_string(),
            ));
        }

        // Both-or-neither: a lone latitude cannot be placed on the map.
        if input.latitude.is_some() != input.longitude.is_some() {
            return Err(UsecaseError::Validation(
                "Latitude and longitude must be supplied together".to_string(),
            ));
        }

        if self.place_repository.exists_by_name(&name).await? {
            return Err(UsecaseError::DuplicateName(name));
        }

        let place = Place::new(
            name,
            input.description,
            input.category,
            input.region,
            input.image,
            input.latitude,
            input.longitude,
            Some(owner),
        );
        self.place_repository.create(&place).await?;

        tracing::info!(place_id = %place.id, "place created successfully");
        Ok(place)
    }

    /// Category, region, name and favorites predicates run in storage; the
    /// minimum-average filter runs here, after aggregates are rounded, and
    /// pagination applies to whatever survives it.
    #[tracing::instrument(skip(self, filter))]
    pub async fn list_places(
        &self,
        filter: PlaceFilter,
        min_rating: Option<f64>,
        page: usize,
    ) -> Result<PlacePage, UsecaseError> {
        tracing::debug!(?filter, ?min_rating, page, "listing places");

        let mut rows = self.place_repository.list_with_stats(&filter).await?;
        for row in &mut rows {
            row.avg_rating = round_to_tenth(row.avg_rating);
        }
        if let Some(min) = min_rating {
            rows.retain(|row| row.avg_rating >= min);
        }

        let total = rows.len();
        let total_pages = total.div_ceil(PAGE_SIZE);
        let page = page.max(1);
        let items = rows
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();

        Ok(PlacePage {
            items,
            page,
            total_pages,
            total,
        })
    }

    #[tracing::instrument(skip(self), fields(place_id = %place_id))]
    pub async fn get_place(&self, place_id: Uuid) -> Result<PlaceDetail, UsecaseError> {
        let place = self
            .place_repository
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Place".to_string()))?;

        let ratings = self.rating_repository.find_by_place(place_id).await?;
        let avg_rating = if ratings.is_empty() {
            0.0
        } else {
            let sum: f64 = ratings.iter().map(|r| r.stars).sum();
            round_to_tenth(sum / ratings.len() as f64)
        };

        Ok(PlaceDetail {
            place,
            ratings,
            avg_rating,
        })
    }

    #[tracing::instrument(skip(self), fields(actor_id = %actor.id, place_id = %place_id))]
    pub async fn delete_place(&self, actor: Actor, place_id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting place");

        if !actor.is_admin {
            return Err(UsecaseError::Forbidden(
                "Only admins can delete places".to_string(),
            ));
        }

        self.place_repository
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Place".to_string()))?;

        self.place_repository
            .delete_with_dependents(place_id)
            .await?;

        tracing::info!(place_id = %place_id, "place deleted successfully");
        Ok(())
    }

    /// Top list: places averaging at least 4.0, shuffled, capped at ten;
    /// padded from the rest of the catalog when too few qualify.
    #[tracing::instrument(skip(self))]
    pub async fn suggestions(&self) -> Result<Vec<PlaceWithStats>, UsecaseError> {
        let mut rows = self.place_repository.list_with_stats(&PlaceFilter::default()).await?;
        for row in &mut rows {
            row.avg_rating = round_to_tenth(row.avg_rating);
        }

        let mut rng = rand::thread_rng();
        let (mut top, mut rest): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|row| row.avg_rating >= SUGGESTION_MIN_AVG);

        top.shuffle(&mut rng);
        top.truncate(SUGGESTION_LIMIT);

        if top.len() < SUGGESTION_LIMIT {
            rest.shuffle(&mut rng);
            top.extend(rest.into_iter().take(SUGGESTION_LIMIT - top.len()));
        }

        Ok(top)
    }

    #[tracing::instrument(skip(self))]
    pub async fn map_places(&self) -> Result<Vec<Place>, UsecaseError> {
        Ok(self.place_repository.list_mapped().await?)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn places_of(&self, user_id: Uuid) -> Result<Vec<Place>, UsecaseError> {
        Ok(self.place_repository.list_by_owner(user_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn category_counts(&self) -> Result<Vec<CategoryCount>, UsecaseError> {
        Ok(self.place_repository.category_counts().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn place_count(&self) -> Result<i64, UsecaseError> {
        Ok(self.place_repository.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::{MockPlaceRepository, MockRatingRepository};

    fn new_place_input() -> NewPlace {
        NewPlace {
            name: "Kazbegi View".to_string(),
            description: "Mountain viewpoint".to_string(),
            category: "mountains".to_string(),
            region: "Mtskheta-Mtianeti".to_string(),
            latitude: Some(42.66),
            longitude: Some(44.64),
            image: None,
        }
    }

    fn stats_row(name: &str, avg_rating: f64, ratings_count: i64) -> PlaceWithStats {
        PlaceWithStats {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "d".to_string(),
            category: "mountains".to_string(),
            region: "Svaneti".to_string(),
            image: None,
            latitude: None,
            longitude: None,
            user_id: None,
            created_at: chrono::Utc::now(),
            avg_rating,
            ratings_count,
        }
    }

    #[tokio::test]
    async fn test_create_place_success() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();
        let owner = Uuid::new_v4();

        mock_place_repo
            .expect_exists_by_name()
            .with(mockall::predicate::eq("Kazbegi View"))
            .times(1)
            .returning(|_| Ok(false));
        mock_place_repo.expect_create().times(1).returning(|_| Ok(()));

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let result = usecase.create_place(owner, new_place_input()).await;

        assert!(result.is_ok());
        let place = result.unwrap();
        assert_eq!(place.name, "Kazbegi View");
        assert_eq!(place.user_id, Some(owner));
    }

    #[tokio::test]
    async fn test_create_place_duplicate_name_case_insensitive() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        // The repository match is case-insensitive, so "KAZBEGI VIEW"
        // collides with an existing "kazbegi view".
        mock_place_repo
            .expect_exists_by_name()
            .times(1)
            .returning(|_| Ok(true));

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let mut input = new_place_input();
        input.name = "KAZBEGI VIEW".to_string();
        let result = usecase.create_place(Uuid::new_v4(), input).await;

        assert!(matches!(result, Err(UsecaseError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_create_place_partial_coordinates() {
        let mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let mut input = new_place_input();
        input.longitude = None;
        let result = usecase.create_place(Uuid::new_v4(), input).await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_place_empty_name() {
        let mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let mut input = new_place_input();
        input.name = "   ".to_string();
        let result = usecase.create_place(Uuid::new_v4(), input).await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_places_pagination() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        mock_place_repo
            .expect_list_with_stats()
            .times(3)
            .returning(|_| Ok((0..45).map(|i| stats_row(&format!("p{i}"), 0.0, 0)).collect()));

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);

        let page1 = usecase
            .list_places(PlaceFilter::default(), None, 1)
            .await
            .unwrap();
        assert_eq!(page1.items.len(), 20);
        assert_eq!(page1.total_pages, 3);
        assert_eq!(page1.total, 45);

        let page3 = usecase
            .list_places(PlaceFilter::default(), None, 3)
            .await
            .unwrap();
        assert_eq!(page3.items.len(), 5);

        let page4 = usecase
            .list_places(PlaceFilter::default(), None, 4)
            .await
            .unwrap();
        assert!(page4.items.is_empty());
    }

    #[tokio::test]
    async fn test_list_places_min_rating_applied_after_rounding() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        mock_place_repo.expect_list_with_stats().times(1).returning(|_| {
            Ok(vec![
                stats_row("just-under", 3.94, 5),
                stats_row("rounds-up", 3.96, 5),
                stats_row("well-over", 4.7, 5),
                stats_row("unrated", 0.0, 0),
            ])
        });

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let page = usecase
            .list_places(PlaceFilter::default(), Some(4.0), 1)
            .await
            .unwrap();

        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["rounds-up", "well-over"]);
        assert_eq!(page.items[0].avg_rating, 4.0);
    }

    #[tokio::test]
    async fn test_get_place_detail_average() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mut mock_rating_repo = MockRatingRepository::new();
        let place_id = Uuid::new_v4();

        let place = Place::new(
            "Kazbegi View".to_string(),
            "d".to_string(),
            "mountains".to_string(),
            "Mtskheta-Mtianeti".to_string(),
            None,
            Some(42.66),
            Some(44.64),
            None,
        );
        let found = Place { id: place_id, ..place };
        mock_place_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(found.clone())));
        mock_rating_repo.expect_find_by_place().times(1).returning(move |_| {
            Ok(vec![
                Rating::new(Uuid::new_v4(), place_id, 5.0, None, None),
                Rating::new(Uuid::new_v4(), place_id, 3.0, None, None),
            ])
        });

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let detail = usecase.get_place(place_id).await.unwrap();

        assert_eq!(detail.avg_rating, 4.0);
        assert_eq!(detail.ratings.len(), 2);
    }

    #[tokio::test]
    async fn test_get_place_not_found() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        mock_place_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let result = usecase.get_place(Uuid::new_v4()).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_place_requires_admin() {
        let mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();
        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: false,
        };

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let result = usecase.delete_place(actor, Uuid::new_v4()).await;

        assert!(matches!(result, Err(UsecaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_place_as_admin() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();
        let place_id = Uuid::new_v4();

        let place = Place::new(
            "Kazbegi View".to_string(),
            "d".to_string(),
            "mountains".to_string(),
            "Mtskheta-Mtianeti".to_string(),
            None,
            None,
            None,
            None,
        );
        mock_place_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(place.clone())));
        mock_place_repo
            .expect_delete_with_dependents()
            .with(mockall::predicate::eq(place_id))
            .times(1)
            .returning(|_| Ok(()));

        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: true,
        };
        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let result = usecase.delete_place(actor, place_id).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_suggestions_prefers_highly_rated() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        mock_place_repo.expect_list_with_stats().times(1).returning(|_| {
            let mut rows: Vec<PlaceWithStats> =
                (0..12).map(|i| stats_row(&format!("top{i}"), 4.5, 3)).collect();
            rows.extend((0..5).map(|i| stats_row(&format!("low{i}"), 2.0, 3)));
            Ok(rows)
        });

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let suggested = usecase.suggestions().await.unwrap();

        assert_eq!(suggested.len(), 10);
        assert!(suggested.iter().all(|p| p.avg_rating >= 4.0));
    }

    #[tokio::test]
    async fn test_suggestions_pads_from_full_catalog() {
        let mut mock_place_repo = MockPlaceRepository::new();
        let mock_rating_repo = MockRatingRepository::new();

        mock_place_repo.expect_list_with_stats().times(1).returning(|_| {
            Ok(vec![
                stats_row("top0", 4.2, 3),
                stats_row("top1", 4.8, 3),
                stats_row("low0", 1.0, 1),
                stats_row("low1", 2.0, 1),
            ])
        });

        let usecase = PlacesUseCase::new(mock_place_repo, mock_rating_repo);
        let suggested = usecase.suggestions().await.unwrap();

        assert_eq!(suggested.len(), 4);
        let mut names: Vec<&str> = suggested.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
