use uuid::Uuid;

use crate::domain::user::User;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::UserRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::jwt::{JwtService, TokenType};
use crate::usecase::password::{hash_password, verify_password};

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthUseCase<U>
where
    U: UserRepository,
{
    user_repository: U,
    jwt_service: JwtService,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repository: U, jwt_service: JwtService) -> Self {
        Self {
            user_repository,
            jwt_service,
        }
    }

    #[tracing::instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(User, TokenPair), UsecaseError> {
        tracing::debug!("registering user");

        if self
            .user_repository
            .identity_taken(&username, &email)
            .await?
        {
            return Err(UsecaseError::DuplicateIdentity);
        }

        let password_hash = hash_password(&password)?;
        let user = User::new(username, email, password_hash);

        // A concurrent registration may slip past the check; the unique
        // indexes report it here.
        match self.user_repository.create(&user).await {
            Ok(()) => {}
            Err(RepositoryError::Duplicate) => return Err(UsecaseError::DuplicateIdentity),
            Err(e) => return Err(e.into()),
        }

        let tokens = self.issue_tokens(&user)?;

        tracing::info!(user_id = %user.id, "user registered successfully");
        Ok((user, tokens))
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        identifier: String,
        password: String,
    ) -> Result<(User, TokenPair), UsecaseError> {
        tracing::debug!("logging in");

        let user = self
            .user_repository
            .find_by_identifier(&identifier)
            .await?
            .ok_or(UsecaseError::InvalidCredentials)?;

        if !verify_password(&password, &user.password_hash)? {
            return Err(UsecaseError::InvalidCredentials);
        }

        let tokens = self.issue_tokens(&user)?;

        tracing::info!(user_id = %user.id, "user logged in successfully");
        Ok((user, tokens))
    }

    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, UsecaseError> {
        let claims = self
            .jwt_service
            .validate_token(refresh_token)
            .map_err(|_| UsecaseError::InvalidCredentials)?;

        if claims.token_type != TokenType::Refresh {
            return Err(UsecaseError::InvalidCredentials);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| UsecaseError::InvalidCredentials)?;

        self.jwt_service
            .generate_access_token(user_id, claims.username, claims.is_admin)
            .map_err(|e| UsecaseError::Internal(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, UsecaseError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("User".to_string()))
    }

    #[tracing::instrument(skip(self, old_password, new_password), fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: String,
        new_password: String,
    ) -> Result<(), UsecaseError> {
        tracing::debug!("changing password");

        let user = self.get_user(user_id).await?;

        if !verify_password(&old_password, &user.password_hash)? {
            return Err(UsecaseError::InvalidCredentials);
        }

        let password_hash = hash_password(&new_password)?;
        self.user_repository
            .update_password(user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %user_id, "password changed successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn user_count(&self) -> Result<i64, UsecaseError> {
        Ok(self.user_repository.count().await?)
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, UsecaseError> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, user.username.clone(), user.is_admin)
            .map_err(|e| UsecaseError::Internal(e.to_string()))?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, user.username.clone(), user.is_admin)
            .map_err(|e| UsecaseError::Internal(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::MockUserRepository;

    fn make_jwt_service() -> JwtService {
        JwtService::new("test_secret".to_string(), 15, 7)
    }

    fn stored_user(password: &str) -> User {
        User::new(
            "gio".to_string(),
            "gio@example.com".to_string(),
            hash_password(password).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut mock_user_repo = MockUserRepository::new();

        mock_user_repo
            .expect_identity_taken()
            .times(1)
            .returning(|_, _| Ok(false));
        mock_user_repo.expect_create().times(1).returning(|_| Ok(()));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .register(
                "gio".to_string(),
                "gio@example.com".to_string(),
                "password123".to_string(),
            )
            .await;

        assert!(result.is_ok());
        let (user, tokens) = result.unwrap();
        assert_eq!(user.username, "gio");
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_identity() {
        let mut mock_user_repo = MockUserRepository::new();

        mock_user_repo
            .expect_identity_taken()
            .times(1)
            .returning(|_, _| Ok(true));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .register(
                "gio".to_string(),
                "gio@example.com".to_string(),
                "password123".to_string(),
            )
            .await;

        assert!(matches!(result, Err(UsecaseError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_register_loses_race_on_unique_index() {
        let mut mock_user_repo = MockUserRepository::new();

        mock_user_repo
            .expect_identity_taken()
            .times(1)
            .returning(|_, _| Ok(false));
        mock_user_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::Duplicate));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .register(
                "gio".to_string(),
                "gio@example.com".to_string(),
                "password123".to_string(),
            )
            .await;

        assert!(matches!(result, Err(UsecaseError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn test_login_by_username_and_email() {
        for identifier in ["gio", "gio@example.com"] {
            let mut mock_user_repo = MockUserRepository::new();
            let user = stored_user("password123");

            mock_user_repo
                .expect_find_by_identifier()
                .with(mockall::predicate::eq(identifier))
                .times(1)
                .returning(move |_| Ok(Some(user.clone())));

            let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
            let result = usecase
                .login(identifier.to_string(), "password123".to_string())
                .await;

            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut mock_user_repo = MockUserRepository::new();
        let user = stored_user("password123");

        mock_user_repo
            .expect_find_by_identifier()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .login("gio".to_string(), "wrong_password".to_string())
            .await;

        assert!(matches!(result, Err(UsecaseError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_identifier() {
        let mut mock_user_repo = MockUserRepository::new();

        mock_user_repo
            .expect_find_by_identifier()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .login("nobody".to_string(), "password123".to_string())
            .await;

        assert!(matches!(result, Err(UsecaseError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let mock_user_repo = MockUserRepository::new();
        let jwt_service = make_jwt_service();
        let access = jwt_service
            .generate_access_token(Uuid::new_v4(), "gio".to_string(), false)
            .unwrap();

        let usecase = AuthUseCase::new(mock_user_repo, jwt_service);
        let result = usecase.refresh(&access).await;

        assert!(matches!(result, Err(UsecaseError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_with_refresh_token() {
        let mock_user_repo = MockUserRepository::new();
        let jwt_service = make_jwt_service();
        let refresh = jwt_service
            .generate_refresh_token(Uuid::new_v4(), "gio".to_string(), false)
            .unwrap();

        let usecase = AuthUseCase::new(mock_user_repo, jwt_service);
        let result = usecase.refresh(&refresh).await;

        assert!(result.is_ok());
        assert!(!result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_password() {
        let mut mock_user_repo = MockUserRepository::new();
        let user = stored_user("old_password");
        let user_id = user.id;

        mock_user_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .change_password(user_id, "not_the_old".to_string(), "new_password".to_string())
            .await;

        assert!(matches!(result, Err(UsecaseError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let mut mock_user_repo = MockUserRepository::new();
        let user = stored_user("old_password");
        let user_id = user.id;

        mock_user_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        mock_user_repo
            .expect_update_password()
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = AuthUseCase::new(mock_user_repo, make_jwt_service());
        let result = usecase
            .change_password(user_id, "old_password".to_string(), "new_password".to_string())
            .await;

        assert!(result.is_ok());
    }
}
