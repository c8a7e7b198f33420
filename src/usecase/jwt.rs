use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to generate token: {0}")]
    TokenGenerationError(String),
    #[error("Failed to validate token: {0}")]
    TokenValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,      // Subject (user id)
    pub username: String,
    pub is_admin: bool,   // ownership checks need this without a DB round trip
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Clone)]
pub struct JwtService {
    secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl JwtService {
    pub fn new(secret: String, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            secret,
            access_token_duration: Duration::minutes(access_minutes),
            refresh_token_duration: Duration::days(refresh_days),
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        username: String,
        is_admin: bool,
    ) -> Result<String, JwtError> {
        self.generate_token(
            user_id,
            username,
            is_admin,
            TokenType::Access,
            self.access_token_duration,
        )
    }

    pub fn generate_refresh_token(
        &self,
        user_id: Uuid,
        username: String,
        is_admin: bool,
    ) -> Result<String, JwtError> {
        self.generate_token(
            user_id,
            username,
            is_admin,
            TokenType::Refresh,
            self.refresh_token_duration,
        )
    }

    fn generate_token(
        &self,
        user_id: Uuid,
        username: String,
        is_admin: bool,
        token_type: TokenType,
        duration: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = (now + duration).timestamp();
        let iat = now.timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            username,
            is_admin,
            exp,
            iat,
            token_type,
        };

        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::TokenGenerationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = jsonwebtoken::Validation::default();
        validation.validate_exp = true;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::TokenValidationError(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_jwt_service() -> JwtService {
        JwtService::new("test_secret_key_123".to_string(), 15, 7)
    }

    #[test]
    fn test_generate_access_token_returns_valid_token() {
        let service = create_test_jwt_service();

        let token = service
            .generate_access_token(Uuid::new_v4(), "gio".to_string(), false)
            .unwrap();

        assert!(!token.is_empty());
        assert!(token.contains('.'));
    }

    #[test]
    fn test_validate_access_token_with_valid_token() {
        let service = create_test_jwt_service();
        let user_id = Uuid::new_v4();

        let token = service
            .generate_access_token(user_id, "gio".to_string(), true)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "gio");
        assert!(claims.is_admin);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_refresh_token_carries_refresh_type() {
        let service = create_test_jwt_service();

        let token = service
            .generate_refresh_token(Uuid::new_v4(), "gio".to_string(), false)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_validate_token_with_invalid_token() {
        let service = create_test_jwt_service();

        assert!(service.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_validate_token_with_wrong_secret() {
        let service1 = JwtService::new("secret1".to_string(), 15, 7);
        let service2 = JwtService::new("secret2".to_string(), 15, 7);

        let token = service1
            .generate_access_token(Uuid::new_v4(), "gio".to_string(), false)
            .unwrap();

        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_token_contains_expiration_time() {
        let service = create_test_jwt_service();

        let token = service
            .generate_access_token(Uuid::new_v4(), "gio".to_string(), false)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert!(claims.exp > Utc::now().timestamp());
        assert!(claims.iat <= Utc::now().timestamp());
    }
}
