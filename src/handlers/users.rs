// src/handlers/users.rs

use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{auth::load_user, recipes::select_recipes},
    models::{
        recipe::{PageParams, Pagination, Recipe, RecipePage, RecipeSummary},
        user::{
            NAME_MAX, PublicProfile, USER_COLUMNS, UpdateProfileRequest, User, UserStats,
        },
    },
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        html::clean_bounded,
        jwt::Claims,
    },
};

/// How a listed recipe relates to the user.
#[derive(Debug, Clone, Copy)]
enum Relation {
    Saved,
    Liked,
    Authored,
}

impl Relation {
    /// Join clause, the column to sort by, and the column holding the user id.
    fn sql(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Relation::Saved => (
                " JOIN saved_recipes rel ON rel.recipe_id = r.id",
                "rel.created_at",
                "rel.user_id",
            ),
            Relation::Liked => (
                " JOIN recipe_likes rel ON rel.recipe_id = r.id",
                "rel.created_at",
                "rel.user_id",
            ),
            Relation::Authored => ("", "r.created_at", "r.author_id"),
        }
    }
}

/// Recipes related to `user_id`, newest relation first.
///
/// `viewer` decides which private recipes may appear: only the viewer's own.
async fn related_recipes(
    pool: &PgPool,
    relation: Relation,
    user_id: i64,
    viewer: Option<i64>,
    page: PageParams,
) -> Result<RecipePage, AppError> {
    let (join, order_by, owner_column) = relation.sql();

    let mut qb = select_recipes(viewer);
    qb.push(join);
    qb.push(format!(" WHERE {} = ", owner_column));
    qb.push_bind(user_id);
    qb.push(" AND (r.is_public OR r.author_id = ");
    qb.push_bind(viewer);
    qb.push(format!(") ORDER BY {} DESC, r.id DESC LIMIT ", order_by));
    qb.push_bind(page.limit());
    qb.push(" OFFSET ");
    qb.push_bind(page.offset());

    let recipes = qb.build_query_as::<Recipe>().fetch_all(pool).await?;

    let mut count = sqlx::QueryBuilder::<sqlx::Postgres>::new("SELECT COUNT(*) FROM recipes r");
    count.push(join);
    count.push(format!(" WHERE {} = ", owner_column));
    count.push_bind(user_id);
    count.push(" AND (r.is_public OR r.author_id = ");
    count.push_bind(viewer);
    count.push(")");
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    Ok(RecipePage {
        recipes,
        pagination: Pagination::new(page, total),
    })
}

/// Recipes the caller saved.
#[utoipa::path(
    get,
    path = "/api/users/me/recipes",
    params(
        ("page" = Option<i64>, Query, description = "1-based page"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses((status = 200, description = "Saved recipes", body = RecipePage)),
    security(("bearer_auth" = []))
)]
pub async fn saved_recipes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let page = related_recipes(&pool, Relation::Saved, user_id, Some(user_id), page).await?;
    Ok(Json(page))
}

/// Recipes the caller liked.
pub async fn favorite_recipes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let page = related_recipes(&pool, Relation::Liked, user_id, Some(user_id), page).await?;
    Ok(Json(page))
}

/// Recipes the caller wrote or generated, private ones included.
pub async fn created_recipes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let page = related_recipes(&pool, Relation::Authored, user_id, Some(user_id), page).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/users/me/stats",
    responses((status = 200, description = "Activity counters", body = UserStats)),
    security(("bearer_auth" = []))
)]
pub async fn stats(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let (saved, liked, created, commented): (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM saved_recipes WHERE user_id = $1),
            (SELECT COUNT(*) FROM recipe_likes WHERE user_id = $1),
            (SELECT COUNT(*) FROM recipes WHERE author_id = $1),
            (SELECT COUNT(DISTINCT recipe_id) FROM comments WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    // Favorites are the liked recipes.
    let stats = UserStats::new(saved, liked, created, liked, commented);

    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

#[utoipa::path(
    put,
    path = "/api/users/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Nothing to update or invalid values")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = match payload.name.as_deref() {
        Some(raw) => Some(clean_bounded(raw, "Name", NAME_MAX)?),
        None => None,
    };
    let avatar = payload.avatar.map(|a| a.trim().to_string());

    if name.is_none() && avatar.is_none() {
        return Err(AppError::BadRequest("No valid fields to update".to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($1, name), avatar = COALESCE($2, avatar), updated_at = NOW()
        WHERE id = $3
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(name)
    .bind(avatar)
    .bind(claims.user_id()?)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": user.public(),
    })))
}

/// What anyone can see about a user.
#[utoipa::path(
    get,
    path = "/api/users/{id}/profile",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn public_profile(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = load_user(&pool, id).await?;

    let recipe_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1 AND is_public")
            .bind(id)
            .fetch_one(&pool)
            .await?;

    let recent_recipes = sqlx::query_as::<_, RecipeSummary>(
        r#"
        SELECT r.id, r.title, r.prep_time, r.cook_time, r.difficulty
        FROM saved_recipes s
        JOIN recipes r ON r.id = s.recipe_id
        WHERE s.user_id = $1 AND r.is_public
        ORDER BY r.created_at DESC
        LIMIT 6
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let profile = PublicProfile {
        id: user.id,
        name: user.name.clone(),
        avatar: user.avatar.clone(),
        preferences: user.preferences(),
        recipe_count,
        recent_recipes,
        member_since: user.created_at,
    };

    Ok(Json(json!({
        "success": true,
        "user": profile,
    })))
}

/// A user's public recipes, newest first.
pub async fn public_recipes(
    State(pool): State<PgPool>,
    AppPath(id): AppPath<i64>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    load_user(&pool, id).await?;
    let page = related_recipes(&pool, Relation::Authored, id, None, page).await?;
    Ok(Json(page))
}
