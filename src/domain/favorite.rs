use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership edge between a user and a place. Unique per (user, place);
/// the database index enforces that under concurrent toggles.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(user_id: Uuid, place_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            place_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_creation() {
        let user_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();
        let favorite = Favorite::new(user_id, place_id);

        assert_eq!(favorite.user_id, user_id);
        assert_eq!(favorite.place_id, place_id);
    }
}
