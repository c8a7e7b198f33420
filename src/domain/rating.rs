use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub stars: f64,
    pub comment: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        user_id: Uuid,
        place_id: Uuid,
        stars: f64,
        comment: Option<String>,
        photo: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            place_id,
            stars,
            comment,
            photo,
            created_at: Utc::now(),
        }
    }
}

/// Rounds to one decimal place, half away from zero. Every average that
/// leaves the core goes through this.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
