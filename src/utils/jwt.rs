// src/utils/jwt.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    utils::cookie::{AUTH_COOKIE, read_cookie},
};

const OAUTH_STATE_PURPOSE: &str = "oauth_state";

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Issued-at as Unix timestamp.
    pub iat: usize,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))
    }
}

/// Claims of the short-lived token passed as OAuth `state`.
#[derive(Debug, Deserialize, Serialize, Clone)]
struct StateClaims {
    purpose: String,
    nonce: String,
    exp: usize,
}

/// Identity of the caller on routes where signing in is optional.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Claims>);

impl Viewer {
    /// The caller's user id, or `None` for anonymous requests.
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().and_then(|claims| claims.user_id().ok())
    }
}

fn now_secs() -> usize {
    Utc::now().timestamp().max(0) as usize
}

/// Signs a session token for the user.
pub fn sign_jwt(user_id: i64, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let now = now_secs();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + expiration_seconds as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a session token.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::AuthError("Token expired".to_string()),
        _ => AppError::AuthError("Invalid token".to_string()),
    })
}

/// Signs the OAuth `state` parameter. It embeds `nonce`, which the callback
/// compares against the value stored in the browser's state cookie.
pub fn sign_oauth_state(nonce: &str, secret: &str) -> Result<String, AppError> {
    let claims = StateClaims {
        purpose: OAUTH_STATE_PURPOSE.to_string(),
        nonce: nonce.to_string(),
        exp: now_secs() + 10 * 60,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Returns the nonce inside a valid, unexpired `state` token.
pub fn verify_oauth_state(state: &str, secret: &str) -> Result<String, AppError> {
    let claims = decode::<StateClaims>(
        state,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid OAuth state".to_string()))?
    .claims;

    if claims.purpose != OAUTH_STATE_PURPOSE {
        return Err(AppError::AuthError("Invalid OAuth state".to_string()));
    }
    Ok(claims.nonce)
}

/// Bearer header first, then the auth cookie.
fn token_from_request(req: &Request<Body>) -> Option<&str> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or_else(|| read_cookie(req.headers(), AUTH_COOKIE))
}

/// Axum Middleware: Authentication.
///
/// Accepts `Authorization: Bearer <token>` or the `authToken` cookie.
/// If valid and the user still exists, injects `Claims` into the request
/// extensions for handlers to use. Otherwise returns 401 Unauthorized.
pub async fn auth_middleware(
    State(config): State<Config>,
    State(pool): State<PgPool>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_request(&req)
        .ok_or_else(|| AppError::AuthError("Access token required".to_string()))?;

    let claims = verify_jwt(token, &config.jwt_secret)?;

    // Tokens outlive deleted accounts.
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(claims.user_id()?)
        .fetch_one(&pool)
        .await?;
    if !exists {
        return Err(AppError::AuthError("User not found".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Axum Middleware: Optional authentication.
///
/// Always injects a [`Viewer`]; a missing or bad token just means anonymous.
pub async fn optional_auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let claims = token_from_request(&req).and_then(|token| verify_jwt(token, &config.jwt_secret).ok());
    req.extensions_mut().insert(Viewer(claims));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn signed_token_verifies() {
        let token = sign_jwt(42, SECRET, 60).unwrap();
        let claims = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_jwt(42, SECRET, 60).unwrap();
        assert!(matches!(
            verify_jwt(&token, "another-secret"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let claims = Claims {
            sub: "1".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        match verify_jwt(&token, SECRET) {
            Err(AppError::AuthError(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn session_token_is_not_an_oauth_state() {
        let session = sign_jwt(1, SECRET, 60).unwrap();
        assert!(verify_oauth_state(&session, SECRET).is_err());

        let state = sign_oauth_state("n0nce", SECRET).unwrap();
        assert_eq!(verify_oauth_state(&state, SECRET).unwrap(), "n0nce");
    }

    #[test]
    fn anonymous_viewer_has_no_id() {
        assert_eq!(Viewer::default().user_id(), None);
    }
}
