// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::{
        recipe::RecipeSummary,
        user::{
            AuthResponse, LoginRequest, MeResponse, NAME_MAX, RegisterRequest, USER_COLUMNS,
            UpdatePreferencesRequest, User,
        },
    },
    utils::{
        cookie::{AUTH_COOKIE, build_cookie, clear_cookie},
        extract::AppJson,
        hash::{hash_password, verify_password},
        html::clean_bounded,
        jwt::{Claims, sign_jwt},
    },
};

pub(crate) async fn load_user(pool: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Signs a session token and the matching `Set-Cookie` value.
pub(crate) fn issue_session(user_id: i64, config: &Config) -> Result<(String, String), AppError> {
    let token = sign_jwt(user_id, &config.jwt_secret, config.jwt_expiration)?;
    let cookie = build_cookie(
        AUTH_COOKIE,
        &token,
        config.jwt_expiration,
        config.cookie_secure,
    );
    Ok((token, cookie))
}

/// Registers a new user with email and password.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with a session token, also set as a cookie.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = clean_bounded(&payload.name, "Name", NAME_MAX)?;
    let email = payload.email.trim().to_lowercase();
    let password_hash = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("User already exists with this email".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, "User registered");

    let (token, cookie) = issue_session(user.id, &config)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            user: user.public(),
        }),
    ))
}

/// Authenticates with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(&email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?
    .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    let Some(password_hash) = user.password_hash.as_deref() else {
        return Err(AppError::AuthError(
            "This account uses Google sign-in".to_string(),
        ));
    };

    if !verify_password(&payload.password, password_hash)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    let (token, cookie) = issue_session(user.id, &config)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            user: user.public(),
        }),
    ))
}

async fn recipe_summaries(pool: &PgPool, sql: &str, user_id: i64) -> Result<Vec<RecipeSummary>, AppError> {
    Ok(sqlx::query_as::<_, RecipeSummary>(sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?)
}

/// The signed-in user with saved and favorite recipes.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = load_user(&pool, claims.user_id()?).await?;

    let saved_recipes = recipe_summaries(
        &pool,
        r#"
        SELECT r.id, r.title, r.prep_time, r.cook_time, r.difficulty
        FROM saved_recipes s
        JOIN recipes r ON r.id = s.recipe_id
        WHERE s.user_id = $1 AND (r.is_public OR r.author_id = $1)
        ORDER BY s.created_at DESC
        "#,
        user.id,
    )
    .await?;

    let favorites = recipe_summaries(
        &pool,
        r#"
        SELECT r.id, r.title, r.prep_time, r.cook_time, r.difficulty
        FROM recipe_likes l
        JOIN recipes r ON r.id = l.recipe_id
        WHERE l.user_id = $1 AND (r.is_public OR r.author_id = $1)
        ORDER BY l.created_at DESC
        "#,
        user.id,
    )
    .await?;

    let recipe_count = saved_recipes.len() as i64;
    let profile = MeResponse {
        user: user.public(),
        saved_recipes,
        favorites,
        recipe_count,
    };

    Ok(Json(json!({
        "success": true,
        "user": profile,
    })))
}

#[utoipa::path(
    put,
    path = "/api/auth/preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated"),
        (status = 400, description = "Unknown option")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_preferences(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<UpdatePreferencesRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = load_user(&pool, claims.user_id()?).await?;
    let preferences = payload.apply(user.preferences());

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users SET
            pref_dietary = $1, pref_allergies = $2, pref_cuisine = $3,
            pref_difficulty = $4, pref_max_prep_time = $5, updated_at = NOW()
        WHERE id = $6
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(&preferences.dietary)
    .bind(&preferences.allergies)
    .bind(&preferences.cuisine)
    .bind(&preferences.difficulty)
    .bind(preferences.max_prep_time)
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Preferences updated successfully",
        "user": user.public(),
    })))
}

/// Clears the session cookie. Bearer tokens stay valid until they expire.
pub async fn logout(State(config): State<Config>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_cookie(AUTH_COOKIE, config.cookie_secure))],
        Json(json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
}

/// Deletes the account together with its recipes, comments, likes and saves.
#[utoipa::path(
    delete,
    path = "/api/auth/account",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id, "Account deleted");

    Ok((
        [(header::SET_COOKIE, clear_cookie(AUTH_COOKIE, config.cookie_secure))],
        Json(json!({
            "success": true,
            "message": "Account deleted successfully",
        })),
    ))
}
