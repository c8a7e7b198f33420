use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::user::Actor;
use crate::usecase::jwt::TokenType;
use crate::usecase::translator::Locale;
use crate::AppState;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            header.strip_prefix("Bearer ").unwrap()
        }
        _ => {
            tracing::warn!("missing or invalid authorization header");
            return Err((
                StatusCode::UNAUTHORIZED,
                "Missing or invalid Authorization header".to_string(),
            ));
        }
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(?e, "invalid token");
            return Err((StatusCode::UNAUTHORIZED, format!("Invalid token: {}", e)));
        }
    };

    // Refresh tokens only mint new access tokens, nothing else.
    if claims.token_type != TokenType::Access {
        tracing::warn!("attempted to use non-access token for authentication");
        return Err((StatusCode::UNAUTHORIZED, "Invalid token type".to_string()));
    }

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::error!(?e, "failed to parse user_id from token");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid user ID in token".to_string(),
        )
    })?;

    let authenticated_user = AuthenticatedUser {
        user_id,
        username: claims.username,
        is_admin: claims.is_admin,
    };

    tracing::debug!(?authenticated_user, "user authenticated successfully");
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Reads the display locale from the `lang` cookie. Absent or unknown
/// values fall back to Georgian.
pub fn locale_from_headers(headers: &HeaderMap) -> Locale {
    let lang = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|pair| pair.strip_prefix("lang="))
        });

    Locale::from_lang_cookie(lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_locale_from_headers_en() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc; lang=en; theme=dark"),
        );

        assert_eq!(locale_from_headers(&headers), Locale::En);
    }

    #[test]
    fn test_locale_from_headers_defaults_to_georgian() {
        let mut headers = HeaderMap::new();
        assert_eq!(locale_from_headers(&headers), Locale::Ka);

        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        assert_eq!(locale_from_headers(&headers), Locale::Ka);
    }
}
