use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlannedRoute {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub visit_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl PlannedRoute {
    pub fn new(user_id: Uuid, place_id: Uuid, visit_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            place_id,
            visit_date,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_route_creation() {
        let user_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
        let route = PlannedRoute::new(user_id, place_id, date);

        assert_eq!(route.user_id, user_id);
        assert_eq!(route.place_id, place_id);
        assert_eq!(route.visit_date, date);
    }
}
