use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

pub const UNITS: [&str; 19] = [
    "cup", "tbsp", "tsp", "oz", "lb", "g", "kg", "ml", "l", "piece", "clove", "slice", "pinch",
    "dash", "handful", "bunch", "can", "package", "other",
];

/// Upper bound for prep and cook time, in minutes.
pub const MINUTES_MAX: i32 = 1440;

pub const SOURCE_GENERATED: &str = "generated";
pub const SOURCE_USER: &str = "user";

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub name: String,
    /// Free-form amount ("2", "1/2", "1.5").
    pub quantity: String,
    pub unit: String,
}

/// Per-serving nutrition facts, grams except for calories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
}

impl Nutrition {
    pub fn is_empty(&self) -> bool {
        self == &Nutrition::default()
    }
}

/// A recipe row joined with its author and interaction counters.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[schema(value_type = Vec<Ingredient>)]
    pub ingredients: Json<Vec<Ingredient>>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
    pub servings: i32,
    pub prep_time: i32,
    pub cook_time: i32,
    pub total_time: i32,
    pub difficulty: String,
    pub cuisine: String,
    pub source: String,
    pub author_id: i64,
    pub author_name: String,
    pub author_avatar: Option<String>,
    #[schema(value_type = Option<Nutrition>)]
    pub nutrition: Option<Json<Nutrition>>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub comment_count: i64,
    /// Whether the requesting user has liked this recipe.
    pub liked_by_me: bool,
}

impl Recipe {
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.0.clone(),
            steps: self.steps.clone(),
            tags: self.tags.clone(),
            servings: self.servings,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            difficulty: self.difficulty.clone(),
            cuisine: self.cuisine.clone(),
            nutrition: self.nutrition.as_ref().map(|n| n.0.clone()),
            is_public: self.is_public,
        }
    }
}

/// Lightweight listing used inside user profiles.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub difficulty: String,
}

/// The writable part of a recipe. Used for user-authored recipes and as the
/// target of AI generation and partial updates.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 characters"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be 500 characters or less"))]
    pub description: String,

    #[validate(custom(function = "validate_ingredients"))]
    pub ingredients: Vec<Ingredient>,

    #[validate(custom(function = "validate_steps"))]
    pub steps: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[validate(range(min = 1, max = 20, message = "Servings must be between 1 and 20"))]
    pub servings: i32,

    #[validate(range(min = 1, max = 1440, message = "Prep time must be 1-1440 minutes"))]
    pub prep_time: i32,

    #[validate(range(min = 0, max = 1440, message = "Cook time must be 0-1440 minutes"))]
    pub cook_time: i32,

    #[serde(default = "default_difficulty")]
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "Cuisine must be 50 characters or less"))]
    pub cuisine: String,

    #[serde(default)]
    pub nutrition: Option<Nutrition>,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

impl RecipeDraft {
    /// Derived on every write: prep plus cook. Saturates for drafts that
    /// have not been validated yet.
    pub fn total_time(&self) -> i32 {
        self.prep_time.saturating_add(self.cook_time)
    }

    /// Trims free text and lowercases the enumerated/tag-like fields.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.difficulty = self.difficulty.trim().to_lowercase();
        self.cuisine = self.cuisine.trim().to_lowercase();

        for ingredient in &mut self.ingredients {
            ingredient.name = ingredient.name.trim().to_string();
            ingredient.quantity = ingredient.quantity.trim().to_string();
            ingredient.unit = ingredient.unit.trim().to_lowercase();
        }

        self.steps = self
            .steps
            .into_iter()
            .map(|step| step.trim().to_string())
            .filter(|step| !step.is_empty())
            .collect();

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        self.tags = tags;

        if self.nutrition.as_ref().is_some_and(Nutrition::is_empty) {
            self.nutrition = None;
        }

        self
    }
}

/// Partial update of a recipe. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub steps: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub difficulty: Option<String>,
    pub cuisine: Option<String>,
    pub nutrition: Option<Nutrition>,
    pub is_public: Option<bool>,
}

impl UpdateRecipeRequest {
    pub fn apply(self, mut draft: RecipeDraft) -> RecipeDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(ingredients) = self.ingredients {
            draft.ingredients = ingredients;
        }
        if let Some(steps) = self.steps {
            draft.steps = steps;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(servings) = self.servings {
            draft.servings = servings;
        }
        if let Some(prep_time) = self.prep_time {
            draft.prep_time = prep_time;
        }
        if let Some(cook_time) = self.cook_time {
            draft.cook_time = cook_time;
        }
        if let Some(difficulty) = self.difficulty {
            draft.difficulty = difficulty;
        }
        if let Some(cuisine) = self.cuisine {
            draft.cuisine = cuisine;
        }
        if let Some(nutrition) = self.nutrition {
            draft.nutrition = Some(nutrition);
        }
        if let Some(is_public) = self.is_public {
            draft.is_public = is_public;
        }
        draft
    }
}

/// Query parameters for listing recipes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListParams {
    /// Matched against title, description and tags.
    pub search: Option<String>,
    pub difficulty: Option<String>,
    pub cuisine: Option<String>,
    /// Upper bound on total time, in minutes.
    pub max_time: Option<i32>,
    /// Comma separated; a recipe matches when it has any of them.
    pub tags: Option<String>,
    pub author_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RecipeListParams {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Page-number pagination (1-based).
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Default 20, max 100.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// Saturates, so an absurd page number yields an empty page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            page: params.page(),
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub pagination: Pagination,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_true() -> bool {
    true
}

pub fn validate_difficulty(value: &str) -> Result<(), ValidationError> {
    if DIFFICULTIES.contains(&value.trim().to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("difficulty")
            .with_message("Difficulty must be easy, medium, or hard".into()))
    }
}

fn validate_ingredients(ingredients: &[Ingredient]) -> Result<(), ValidationError> {
    if ingredients.is_empty() {
        return Err(ValidationError::new("ingredients")
            .with_message("At least one ingredient is required".into()));
    }
    for ingredient in ingredients {
        let name = ingredient.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(ValidationError::new("ingredients")
                .with_message("Ingredient names must be 1-100 characters".into()));
        }
        if ingredient.quantity.trim().is_empty() {
            return Err(ValidationError::new("ingredients")
                .with_message("Ingredient quantity is required".into()));
        }
        if !UNITS.contains(&ingredient.unit.trim().to_lowercase().as_str()) {
            return Err(ValidationError::new("ingredients")
                .with_message(format!("Unknown unit '{}'", ingredient.unit).into()));
        }
    }
    Ok(())
}

fn validate_steps(steps: &[String]) -> Result<(), ValidationError> {
    if steps.iter().all(|step| step.trim().is_empty()) {
        return Err(ValidationError::new("steps").with_message("At least one step is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            title: "  Tomato Soup ".to_string(),
            description: String::new(),
            ingredients: vec![Ingredient {
                name: "tomato".to_string(),
                quantity: "4".to_string(),
                unit: "Piece".to_string(),
            }],
            steps: vec!["Chop".to_string(), "  ".to_string(), "Simmer".to_string()],
            tags: vec!["Soup".to_string(), "soup".to_string(), " Vegan ".to_string()],
            servings: 2,
            prep_time: 10,
            cook_time: 25,
            difficulty: "Easy".to_string(),
            cuisine: " Italian ".to_string(),
            nutrition: Some(Nutrition::default()),
            is_public: true,
        }
    }

    #[test]
    fn total_time_is_prep_plus_cook() {
        let draft = draft();
        assert_eq!(draft.total_time(), 35);

        let updated = UpdateRecipeRequest {
            cook_time: Some(5),
            ..Default::default()
        }
        .apply(draft);
        assert_eq!(updated.total_time(), 15);
    }

    #[test]
    fn normalization_cleans_text_and_tags() {
        let draft = draft().normalized();
        assert_eq!(draft.title, "Tomato Soup");
        assert_eq!(draft.difficulty, "easy");
        assert_eq!(draft.cuisine, "italian");
        assert_eq!(draft.tags, vec!["soup", "vegan"]);
        assert_eq!(draft.steps, vec!["Chop", "Simmer"]);
        assert_eq!(draft.ingredients[0].unit, "piece");
        assert!(draft.nutrition.is_none());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let mut bad = draft().normalized();
        bad.title = String::new();
        assert!(bad.validate().is_err());

        let mut bad = draft().normalized();
        bad.ingredients.clear();
        assert!(bad.validate().is_err());

        let mut bad = draft().normalized();
        bad.steps.clear();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut bad = draft().normalized();
        bad.servings = 21;
        assert!(bad.validate().is_err());

        let mut bad = draft().normalized();
        bad.prep_time = 0;
        assert!(bad.validate().is_err());

        let mut bad = draft().normalized();
        bad.difficulty = "extreme".to_string();
        assert!(bad.validate().is_err());

        let mut bad = draft().normalized();
        bad.ingredients[0].unit = "bucket".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn oversized_times_fail_validation_instead_of_overflowing() {
        let mut bad = draft().normalized();
        bad.prep_time = i32::MAX;
        bad.cook_time = 1;
        assert!(bad.validate().is_err());
        assert_eq!(bad.total_time(), i32::MAX);

        let mut bad = draft().normalized();
        bad.cook_time = 1441;
        assert!(bad.validate().is_err());

        let mut longest = draft().normalized();
        longest.prep_time = 1440;
        longest.cook_time = 1440;
        assert!(longest.validate().is_ok());
        assert_eq!(longest.total_time(), 2880);
    }

    #[test]
    fn pagination_defaults_and_bounds() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);

        let params = PageParams {
            page: Some(3),
            limit: Some(500),
        };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 200);

        let params = PageParams {
            page: Some(i64::MAX),
            limit: Some(20),
        };
        assert_eq!(params.offset(), i64::MAX);

        assert_eq!(Pagination::new(PageParams::default(), 41).pages, 3);
        assert_eq!(Pagination::new(PageParams::default(), 0).pages, 0);
    }

    #[test]
    fn tag_filter_is_split_and_lowercased() {
        let params = RecipeListParams {
            tags: Some("Quick, ,vegan".to_string()),
            ..Default::default()
        };
        assert_eq!(params.tag_list(), vec!["quick", "vegan"]);
    }
}
