//! "Sign in with Google" through the OAuth2 authorization-code flow.
//!
//! The `state` parameter is a short-lived signed token carrying a nonce that
//! is also stored in an HttpOnly cookie; the callback requires both to match.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use url::Url;

use crate::{
    config::{Config, GoogleOAuthConfig},
    error::AppError,
    handlers::auth::issue_session,
    models::user::{NAME_MAX, USER_COLUMNS, User},
    state::AppState,
    utils::{
        cookie::{OAUTH_STATE_COOKIE, build_cookie, clear_cookie, read_cookie},
        html::clean_text,
        jwt::{sign_oauth_state, verify_oauth_state},
    },
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const STATE_COOKIE_MAX_AGE: u64 = 10 * 60;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OpenID Connect userinfo claims we use.
#[derive(Debug, Deserialize)]
struct GoogleProfile {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

fn google_config(config: &Config) -> Result<&GoogleOAuthConfig, AppError> {
    config
        .google
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Google sign-in is not configured".to_string()))
}

fn new_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn consent_url(google: &GoogleOAuthConfig, state: &str) -> Result<Url, AppError> {
    Url::parse_with_params(
        GOOGLE_AUTH_URL,
        &[
            ("client_id", google.client_id.as_str()),
            ("redirect_uri", google.callback_url.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", state),
            ("prompt", "select_account"),
        ],
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Redirects the browser to Google's consent screen.
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 404, description = "Google sign-in is not configured")
    )
)]
pub async fn google_login(State(config): State<Config>) -> Result<impl IntoResponse, AppError> {
    let google = google_config(&config)?;

    let nonce = new_nonce();
    let state = sign_oauth_state(&nonce, &config.jwt_secret)?;
    let url = consent_url(google, &state)?;

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, url.to_string()),
            (
                header::SET_COOKIE,
                build_cookie(
                    OAUTH_STATE_COOKIE,
                    &nonce,
                    STATE_COOKIE_MAX_AGE,
                    config.cookie_secure,
                ),
            ),
        ],
    ))
}

/// Completes the sign-in and redirects to the frontend.
///
/// Any failure sends the browser to the login page with `error=auth_failed`.
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let config = &state.config;
    let clear_state = clear_cookie(OAUTH_STATE_COOKIE, config.cookie_secure);

    let outcome = match complete_sign_in(&state, &headers, params).await {
        Ok(user) => issue_session(user.id, config).map(|(_, cookie)| cookie),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(session_cookie) => (
            StatusCode::SEE_OTHER,
            AppendHeaders([
                (header::LOCATION, format!("{}/auth/callback", config.frontend_url)),
                (header::SET_COOKIE, session_cookie),
                (header::SET_COOKIE, clear_state),
            ]),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Google sign-in failed: {}", e);
            (
                StatusCode::SEE_OTHER,
                [
                    (
                        header::LOCATION,
                        format!("{}/login?error=auth_failed", config.frontend_url),
                    ),
                    (header::SET_COOKIE, clear_state),
                ],
            )
                .into_response()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    headers: &HeaderMap,
    params: CallbackParams,
) -> Result<User, AppError> {
    let config = &state.config;
    let google = google_config(config)?;

    if let Some(error) = params.error {
        return Err(AppError::AuthError(format!("Google returned error: {}", error)));
    }
    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;
    let returned_state = params
        .state
        .ok_or_else(|| AppError::BadRequest("Missing OAuth state".to_string()))?;

    let nonce = verify_oauth_state(&returned_state, &config.jwt_secret)?;
    if read_cookie(headers, OAUTH_STATE_COOKIE) != Some(nonce.as_str()) {
        return Err(AppError::AuthError("OAuth state mismatch".to_string()));
    }

    let token = exchange_code(&state.http, google, &code).await?;
    let profile = fetch_profile(&state.http, &token.access_token).await?;
    find_or_create_user(&state.pool, profile).await
}

async fn exchange_code(
    http: &reqwest::Client,
    google: &GoogleOAuthConfig,
    code: &str,
) -> Result<TokenResponse, AppError> {
    let response = http
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("code", code),
            ("client_id", google.client_id.as_str()),
            ("client_secret", google.client_secret.as_str()),
            ("redirect_uri", google.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::AuthError(format!(
            "Token exchange rejected ({}): {}",
            status, body
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Bad token response: {}", e)))
}

async fn fetch_profile(http: &reqwest::Client, access_token: &str) -> Result<GoogleProfile, AppError> {
    let response = http
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Userinfo request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::AuthError(format!(
            "Userinfo rejected ({})",
            response.status()
        )));
    }

    response
        .json::<GoogleProfile>()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Bad userinfo response: {}", e)))
}

/// Display name for a new account: the profile name, else the email's local part.
fn display_name(profile_name: Option<&str>, email: &str) -> String {
    let name = profile_name.map(clean_text).unwrap_or_default();
    let name = if name.is_empty() {
        email.split('@').next().unwrap_or(email).to_string()
    } else {
        name
    };
    name.chars().take(NAME_MAX).collect()
}

/// The profile's email, lowercased, if Google has verified it. An unverified
/// address must not claim or link an account.
fn verified_email(profile: &GoogleProfile) -> Result<String, AppError> {
    let email = profile
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::AuthError("Google account has no email".to_string()))?;

    if !profile.email_verified {
        return Err(AppError::AuthError(
            "Google account email is not verified".to_string(),
        ));
    }
    Ok(email)
}

/// Known Google id: sign in. Known email: link the Google id to that
/// account. Otherwise: create a password-less account. Linking and creating
/// both need a verified email.
async fn find_or_create_user(pool: &PgPool, profile: GoogleProfile) -> Result<User, AppError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET last_login = NOW() WHERE google_id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&profile.sub)
    .fetch_optional(&mut *tx)
    .await?;

    let user = match existing {
        Some(user) => user,
        None => {
            let email = verified_email(&profile)?;
            let linked = sqlx::query_as::<_, User>(&format!(
                r#"
                UPDATE users
                SET google_id = $1, avatar = COALESCE($2, avatar),
                    last_login = NOW(), updated_at = NOW()
                WHERE email = $3
                RETURNING {}
                "#,
                USER_COLUMNS
            ))
            .bind(&profile.sub)
            .bind(&profile.picture)
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;

            match linked {
                Some(user) => {
                    tracing::info!(user_id = user.id, "Linked Google account");
                    user
                }
                None => {
                    let user = sqlx::query_as::<_, User>(&format!(
                        r#"
                        INSERT INTO users (name, email, google_id, avatar)
                        VALUES ($1, $2, $3, $4)
                        RETURNING {}
                        "#,
                        USER_COLUMNS
                    ))
                    .bind(display_name(profile.name.as_deref(), &email))
                    .bind(&email)
                    .bind(&profile.sub)
                    .bind(&profile.picture)
                    .fetch_one(&mut *tx)
                    .await?;
                    tracing::info!(user_id = user.id, "User registered through Google");
                    user
                }
            }
        }
    };

    tx.commit().await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            callback_url: "http://localhost:5000/api/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn consent_url_carries_client_and_state() {
        let url = consent_url(&google(), "signed.state").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("state".to_string(), "signed.state".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "openid email profile".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:5000/api/auth/google/callback".to_string()
        )));
    }

    #[test]
    fn nonces_are_random_hex() {
        let a = new_nonce();
        let b = new_nonce();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(display_name(Some("Ada Lovelace"), "ada@example.com"), "Ada Lovelace");
        assert_eq!(display_name(None, "ada@example.com"), "ada");
        assert_eq!(display_name(Some("  "), "ada@example.com"), "ada");
        assert_eq!(display_name(Some("x".repeat(80).as_str()), "a@b.c").len(), 50);
    }

    fn profile(body: serde_json::Value) -> GoogleProfile {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn unverified_email_cannot_link_or_register() {
        let unverified = profile(serde_json::json!({
            "sub": "1234",
            "email": "victim@example.com",
            "email_verified": false
        }));
        assert!(matches!(verified_email(&unverified), Err(AppError::AuthError(_))));

        // Absent claim counts as unverified
        let silent = profile(serde_json::json!({ "sub": "1234", "email": "victim@example.com" }));
        assert!(verified_email(&silent).is_err());

        let verified = profile(serde_json::json!({
            "sub": "1234",
            "email": " Ada@Example.com ",
            "email_verified": true
        }));
        assert_eq!(verified_email(&verified).unwrap(), "ada@example.com");
    }
}
