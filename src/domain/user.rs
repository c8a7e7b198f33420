use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            role: "user".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    pub fn update_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// The identity performing a request, as far as ownership checks care.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn owns_or_admin(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.is_admin
    }
}
