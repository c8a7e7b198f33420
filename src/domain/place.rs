use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    pub image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Seeded places have no owner.
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Place {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        description: String,
        category: String,
        region: String,
        image: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        user_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            category,
            region,
            image,
            latitude,
            longitude,
            user_id,
            created_at: Utc::now(),
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Catalog row with its rating aggregate, as read by listing queries.
/// `avg_rating` is raw here; use cases round it before it leaves the core.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlaceWithStats {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    pub image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub avg_rating: f64,
    pub ratings_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Storage-level predicates for catalog listing. The minimum-average-rating
/// filter is deliberately absent: it applies after aggregates are computed.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    pub category: Option<String>,
    pub region: Option<String>,
    pub name_contains: Option<String>,
    pub favorites_of: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_creation() {
        let owner = Uuid::new_v4();
        let place = Place::new(
            "Kazbegi View".to_string(),
            "Mountain viewpoint".to_string(),
            "mountains".to_string(),
            "Mtskheta-Mtianeti".to_string(),
            None,
            Some(42.66),
            Some(44.64),
            Some(owner),
        );

        assert_eq!(place.name, "Kazbegi View");
        assert_eq!(place.user_id, Some(owner));
        assert!(place.has_coordinates());
    }

    #[test]
    fn test_place_without_coordinates() {
        let place = Place::new(
            "Old Bridge".to_string(),
            "Stone bridge".to_string(),
            "historic".to_string(),
            "Imereti".to_string(),
            None,
            None,
            None,
            None,
        );

        assert!(!place.has_coordinates());
        assert!(place.user_id.is_none());
    }
}
