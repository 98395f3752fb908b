// src/handlers/recipes.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use validator::Validate;

use crate::{
    ai::{GenerationRequest, RecipeGenerator},
    config::Config,
    error::AppError,
    models::{
        comment::{COMMENT_MAX, Comment, CreateCommentRequest, UpdateCommentRequest},
        recipe::{
            Pagination, Recipe, RecipeDraft, RecipeListParams, RecipePage, SOURCE_GENERATED,
            SOURCE_USER, UpdateRecipeRequest,
        },
    },
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        html::clean_bounded,
        jwt::{Claims, Viewer},
    },
};

/// SELECT list shared by every endpoint returning [`Recipe`] rows.
/// Callers append joins, `WHERE` clauses and ordering.
pub(crate) fn select_recipes<'a>(viewer: Option<i64>) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT r.id, r.title, r.description, r.ingredients, r.steps, r.tags, r.servings, \
         r.prep_time, r.cook_time, r.total_time, r.difficulty, r.cuisine, r.source, \
         r.author_id, u.name AS author_name, u.avatar AS author_avatar, r.nutrition, \
         r.is_public, r.created_at, r.updated_at, \
         (SELECT COUNT(*) FROM recipe_likes rl WHERE rl.recipe_id = r.id) AS like_count, \
         (SELECT COUNT(*) FROM comments rc WHERE rc.recipe_id = r.id) AS comment_count, \
         EXISTS (SELECT 1 FROM recipe_likes me WHERE me.recipe_id = r.id AND me.user_id = ",
    );
    qb.push_bind(viewer);
    qb.push(") AS liked_by_me FROM recipes r JOIN users u ON u.id = r.author_id");
    qb
}

const COMMENT_SELECT: &str = "SELECT c.id, c.recipe_id, c.user_id, u.name AS user_name, \
    u.avatar AS user_avatar, c.text, c.rating, c.is_edited, c.edited_at, c.created_at, \
    c.updated_at FROM comments c JOIN users u ON u.id = c.user_id";

/// Escapes `LIKE` wildcards in user input.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the `WHERE` clause for the recipe listing.
/// Anonymous viewers only see public recipes.
fn push_list_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    params: &RecipeListParams,
    viewer: Option<i64>,
) {
    qb.push(" WHERE (r.is_public OR r.author_id = ");
    qb.push_bind(viewer);
    qb.push(")");

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (r.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR r.description ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR EXISTS (SELECT 1 FROM unnest(r.tags) AS tag WHERE tag ILIKE ");
        qb.push_bind(pattern);
        qb.push("))");
    }

    if let Some(difficulty) = params.difficulty.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND r.difficulty = ");
        qb.push_bind(difficulty.to_lowercase());
    }

    if let Some(cuisine) = params.cuisine.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND r.cuisine = ");
        qb.push_bind(cuisine.to_lowercase());
    }

    if let Some(max_time) = params.max_time {
        qb.push(" AND r.total_time <= ");
        qb.push_bind(max_time);
    }

    let tags = params.tag_list();
    if !tags.is_empty() {
        qb.push(" AND r.tags && ");
        qb.push_bind(tags);
    }

    if let Some(author_id) = params.author_id {
        qb.push(" AND r.author_id = ");
        qb.push_bind(author_id);
    }
}

pub(crate) async fn fetch_recipe(
    pool: &PgPool,
    id: i64,
    viewer: Option<i64>,
) -> Result<Option<Recipe>, AppError> {
    let mut qb = select_recipes(viewer);
    qb.push(" WHERE r.id = ");
    qb.push_bind(id);
    Ok(qb.build_query_as::<Recipe>().fetch_optional(pool).await?)
}

/// Ok when the recipe exists and the user may see it.
async fn ensure_visible<'e, E: PgExecutor<'e>>(
    executor: E,
    recipe_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    let visible: Option<bool> =
        sqlx::query_scalar("SELECT is_public OR author_id = $2 FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

    match visible {
        Some(true) => Ok(()),
        _ => Err(AppError::NotFound("Recipe not found".to_string())),
    }
}

/// Ok when the recipe exists and `user_id` wrote it.
async fn ensure_author(
    pool: &PgPool,
    recipe_id: i64,
    user_id: i64,
    action: &str,
) -> Result<(), AppError> {
    let author_id: Option<i64> = sqlx::query_scalar("SELECT author_id FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

    match author_id {
        None => Err(AppError::NotFound("Recipe not found".to_string())),
        Some(author_id) if author_id != user_id => Err(AppError::Forbidden(format!(
            "You can only {} your own recipes",
            action
        ))),
        Some(_) => Ok(()),
    }
}

async fn insert_recipe(
    pool: &PgPool,
    author_id: i64,
    draft: &RecipeDraft,
    source: &str,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO recipes (
            title, description, ingredients, steps, tags, servings,
            prep_time, cook_time, total_time, difficulty, cuisine,
            source, author_id, nutrition, is_public
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(SqlJson(&draft.ingredients))
    .bind(&draft.steps)
    .bind(&draft.tags)
    .bind(draft.servings)
    .bind(draft.prep_time)
    .bind(draft.cook_time)
    .bind(draft.total_time())
    .bind(&draft.difficulty)
    .bind(&draft.cuisine)
    .bind(source)
    .bind(author_id)
    .bind(draft.nutrition.as_ref().map(SqlJson))
    .bind(draft.is_public)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert recipe: {:?}", e);
        AppError::from(e)
    })?;

    Ok(id)
}

async fn fetch_comment(pool: &PgPool, recipe_id: i64, comment_id: i64) -> Result<Comment, AppError> {
    sqlx::query_as::<_, Comment>(&format!(
        "{} WHERE c.id = $1 AND c.recipe_id = $2",
        COMMENT_SELECT
    ))
    .bind(comment_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
}

/// Generates a recipe from the caller's ingredients and stores it.
///
/// Users may generate at most `generation_limit_per_hour` recipes in any
/// trailing hour. When the model is unavailable or answers with something
/// unusable, the template recipe is stored instead and `fallback` is set.
#[utoipa::path(
    post,
    path = "/api/recipes/generate",
    request_body = GenerationRequest,
    responses(
        (status = 201, description = "Recipe generated"),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Not signed in"),
        (status = 429, description = "Hourly generation limit reached")
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_recipe(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(generator): State<Arc<RecipeGenerator>>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<GenerationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let recent: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM recipes
        WHERE author_id = $1
          AND source = $2
          AND created_at > NOW() - INTERVAL '1 hour'
        "#,
    )
    .bind(user_id)
    .bind(SOURCE_GENERATED)
    .fetch_one(&pool)
    .await?;

    if recent >= config.generation_limit_per_hour {
        tracing::info!(user_id, recent, "Generation limit reached");
        return Err(AppError::TooManyRequests(
            "Rate limit exceeded. Please wait before generating more recipes.".to_string(),
        ));
    }

    let generation = generator.generate(&payload).await;
    let draft = generation.recipe.into_draft().normalized();
    draft
        .validate()
        .map_err(|e| AppError::InternalServerError(format!("Generated recipe is invalid: {}", e)))?;

    let id = insert_recipe(&pool, user_id, &draft, SOURCE_GENERATED).await?;
    let recipe = fetch_recipe(&pool, id, Some(user_id))
        .await?
        .ok_or_else(|| AppError::InternalServerError(format!("Recipe {} vanished", id)))?;

    tracing::info!(user_id, recipe_id = id, fallback = generation.fallback, "Recipe stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Recipe generated successfully",
            "fallback": generation.fallback,
            "recipe": recipe,
        })),
    ))
}

/// Lists recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("search" = Option<String>, Query, description = "Matches title, description and tags"),
        ("difficulty" = Option<String>, Query, description = "easy, medium or hard"),
        ("cuisine" = Option<String>, Query, description = "Exact cuisine"),
        ("maxTime" = Option<i32>, Query, description = "Upper bound on total minutes"),
        ("tags" = Option<String>, Query, description = "Comma separated, any match"),
        ("authorId" = Option<i64>, Query, description = "Only this author's recipes"),
        ("page" = Option<i64>, Query, description = "1-based page"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses((status = 200, description = "A page of recipes", body = RecipePage))
)]
pub async fn list_recipes(
    State(pool): State<PgPool>,
    Extension(viewer): Extension<Viewer>,
    AppQuery(params): AppQuery<RecipeListParams>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = viewer.user_id();
    let page = params.page_params();

    let mut qb = select_recipes(viewer);
    push_list_filters(&mut qb, &params, viewer);
    qb.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ");
    qb.push_bind(page.limit());
    qb.push(" OFFSET ");
    qb.push_bind(page.offset());

    let recipes = qb
        .build_query_as::<Recipe>()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list recipes: {:?}", e);
            AppError::from(e)
        })?;

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
    push_list_filters(&mut count, &params, viewer);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(&pool).await?;

    Ok(Json(RecipePage {
        recipes,
        pagination: Pagination::new(page, total),
    }))
}

/// Creates a recipe written by the caller.
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeDraft,
    responses(
        (status = 201, description = "Recipe created", body = Recipe),
        (status = 400, description = "Invalid recipe")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<RecipeDraft>,
) -> Result<impl IntoResponse, AppError> {
    let draft = payload.normalized();
    draft.validate()?;
    let user_id = claims.user_id()?;

    let id = insert_recipe(&pool, user_id, &draft, SOURCE_USER).await?;
    let recipe = fetch_recipe(&pool, id, Some(user_id))
        .await?
        .ok_or_else(|| AppError::InternalServerError(format!("Recipe {} vanished", id)))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Recipe created successfully",
            "recipe": recipe,
        })),
    ))
}

/// A single recipe with its comments, oldest first.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe with comments"),
        (status = 404, description = "Missing, or private and not yours")
    )
)]
pub async fn get_recipe(
    State(pool): State<PgPool>,
    Extension(viewer): Extension<Viewer>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = viewer.user_id();
    let recipe = fetch_recipe(&pool, id, viewer)
        .await?
        .filter(|recipe| recipe.is_public || Some(recipe.author_id) == viewer)
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    let comments = sqlx::query_as::<_, Comment>(&format!(
        "{} WHERE c.recipe_id = $1 ORDER BY c.created_at ASC, c.id ASC",
        COMMENT_SELECT
    ))
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "recipe": recipe,
        "comments": comments,
    })))
}

/// Partial update by the author. Total time is recomputed.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateRecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    ensure_author(&pool, id, user_id, "edit").await?;

    let current = fetch_recipe(&pool, id, Some(user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    let draft = payload.apply(current.to_draft()).normalized();
    draft.validate()?;

    sqlx::query(
        r#"
        UPDATE recipes SET
            title = $1, description = $2, ingredients = $3, steps = $4, tags = $5,
            servings = $6, prep_time = $7, cook_time = $8, total_time = $9,
            difficulty = $10, cuisine = $11, nutrition = $12, is_public = $13,
            updated_at = NOW()
        WHERE id = $14
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(SqlJson(&draft.ingredients))
    .bind(&draft.steps)
    .bind(&draft.tags)
    .bind(draft.servings)
    .bind(draft.prep_time)
    .bind(draft.cook_time)
    .bind(draft.total_time())
    .bind(&draft.difficulty)
    .bind(&draft.cuisine)
    .bind(draft.nutrition.as_ref().map(SqlJson))
    .bind(draft.is_public)
    .bind(id)
    .execute(&pool)
    .await?;

    let recipe = fetch_recipe(&pool, id, Some(user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Recipe updated successfully",
        "recipe": recipe,
    })))
}

/// Deletes a recipe. Comments, likes and saves go with it.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    ensure_author(&pool, id, user_id, "delete").await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    tracing::info!(user_id, recipe_id = id, "Recipe deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Recipe deleted successfully",
    })))
}

async fn set_visibility(
    pool: &PgPool,
    claims: &Claims,
    id: i64,
    is_public: bool,
    action: &str,
) -> Result<(), AppError> {
    let user_id = claims.user_id()?;
    ensure_author(pool, id, user_id, action).await?;

    sqlx::query("UPDATE recipes SET is_public = $1, updated_at = NOW() WHERE id = $2")
        .bind(is_public)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Hides the recipe from everyone but its author.
pub async fn archive_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    set_visibility(&pool, &claims, id, false, "archive").await?;
    Ok(Json(json!({
        "success": true,
        "message": "Recipe archived successfully",
    })))
}

pub async fn unarchive_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    set_visibility(&pool, &claims, id, true, "unarchive").await?;
    Ok(Json(json!({
        "success": true,
        "message": "Recipe unarchived successfully",
    })))
}

/// Adds the recipe to the caller's collection. Saving twice is a no-op.
pub async fn save_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    ensure_visible(&pool, id, user_id).await?;

    sqlx::query(
        "INSERT INTO saved_recipes (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(id)
    .execute(&pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Recipe saved successfully",
    })))
}

pub async fn unsave_recipe(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Recipe not found".to_string()));
    }

    sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Recipe removed from collection",
    })))
}

/// Likes the recipe, or removes the like if it was already there.
/// A liked recipe is also one of the user's favorites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/like",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "New like state and count"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_like(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;
    ensure_visible(&mut *tx, id, user_id).await?;

    let removed = sqlx::query("DELETE FROM recipe_likes WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if removed == 0 {
        sqlx::query(
            "INSERT INTO recipe_likes (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        true
    } else {
        false
    };

    let like_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipe_likes WHERE recipe_id = $1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    let message = if liked { "Recipe liked" } else { "Recipe unliked" };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "liked": liked,
        "likeCount": like_count,
    })))
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/comments",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Invalid comment"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let text = clean_bounded(&payload.text, "Comment text", COMMENT_MAX)?;
    let user_id = claims.user_id()?;
    ensure_visible(&pool, id, user_id).await?;

    let comment_id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (recipe_id, user_id, text, rating) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(id)
    .bind(user_id)
    .bind(&text)
    .bind(payload.rating)
    .fetch_one(&pool)
    .await?;

    let comment = fetch_comment(&pool, id, comment_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Comment added successfully",
            "comment": comment,
        })),
    ))
}

/// Edits the caller's own comment. Changing the text marks it edited.
pub async fn update_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppPath((recipe_id, comment_id)): AppPath<(i64, i64)>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.text.is_none() && payload.rating.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }
    let user_id = claims.user_id()?;

    let mut comment = fetch_comment(&pool, recipe_id, comment_id).await?;
    if comment.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only edit your own comments".to_string(),
        ));
    }

    if let Some(text) = payload.text.as_deref() {
        let text = clean_bounded(text, "Comment text", COMMENT_MAX)?;
        comment.edit_text(text, chrono::Utc::now());
    }
    if let Some(rating) = payload.rating {
        comment.rating = Some(rating);
    }

    sqlx::query(
        r#"
        UPDATE comments
        SET text = $1, rating = $2, is_edited = $3, edited_at = $4, updated_at = NOW()
        WHERE id = $5
        "#,
    )
    .bind(&comment.text)
    .bind(comment.rating)
    .bind(comment.is_edited)
    .bind(comment.edited_at)
    .bind(comment.id)
    .execute(&pool)
    .await?;

    let comment = fetch_comment(&pool, recipe_id, comment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment updated successfully",
        "comment": comment,
    })))
}
