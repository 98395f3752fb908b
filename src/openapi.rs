use utoipa::{
    OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

use crate::{
    ai::GenerationRequest,
    handlers::{auth, misc, oauth, recipes, users},
    models::{
        comment::{Comment, CreateCommentRequest, UpdateCommentRequest},
        recipe::{
            Ingredient, Nutrition, Pagination, Recipe, RecipeDraft, RecipePage, RecipeSummary,
            UpdateRecipeRequest,
        },
        user::{
            AuthResponse, LoginRequest, MeResponse, Preferences, PublicProfile, RegisterRequest,
            UpdatePreferencesRequest, UpdateProfileRequest, UserResponse, UserStats,
        },
    },
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Recipe API", description = "AI-assisted recipe generation and sharing"),
    paths(
        misc::health,
        misc::contact,
        auth::register,
        auth::login,
        auth::me,
        auth::update_preferences,
        auth::delete_account,
        oauth::google_login,
        recipes::generate_recipe,
        recipes::list_recipes,
        recipes::create_recipe,
        recipes::get_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::toggle_like,
        recipes::add_comment,
        users::saved_recipes,
        users::stats,
        users::update_profile,
        users::public_profile,
    ),
    components(schemas(
        misc::ContactRequest,
        GenerationRequest,
        Ingredient,
        Nutrition,
        Recipe,
        RecipeDraft,
        RecipeSummary,
        RecipePage,
        Pagination,
        UpdateRecipeRequest,
        Comment,
        CreateCommentRequest,
        UpdateCommentRequest,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        MeResponse,
        Preferences,
        UpdatePreferencesRequest,
        UpdateProfileRequest,
        PublicProfile,
        UserStats,
    ))
)]
pub struct ApiDoc;

/// The full document served at `/api/openapi.json`.
pub fn spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
    spec
}
