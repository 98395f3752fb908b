use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::recipe::validate_difficulty;

/// Instructions sent with every generation request. Describes the only
/// answer shape the normalizer is written against.
pub const SYSTEM_PROMPT: &str = r#"You are a culinary assistant that writes practical recipes for home cooks from the ingredients a user has on hand.

Answer with a single JSON object and nothing else: no prose, no markdown.

The object must have this shape:
{
  "title": "string, at most 100 characters",
  "description": "string, at most 500 characters",
  "ingredients": [
    {
      "name": "string",
      "quantity": "string such as \"2\", \"1/2\" or \"1.5\"",
      "unit": "one of: cup, tbsp, tsp, oz, lb, g, kg, ml, l, piece, clove, slice, pinch, dash, handful, bunch, can, package, other"
    }
  ],
  "steps": ["string", "string"],
  "servings": 4,
  "prepTime": 15,
  "cookTime": 30,
  "totalTime": 45,
  "difficulty": "easy | medium | hard",
  "cuisine": "string, optional",
  "tags": ["string"],
  "nutrition": {
    "calories": 350,
    "protein": 25,
    "carbs": 30,
    "fat": 15,
    "fiber": 5,
    "sugar": 8
  }
}

Times are whole minutes. Nutrition is per serving, in grams except calories.
Respect every dietary restriction and allergy you are given. Use realistic
quantities and times, and write steps a beginner can follow. Tag the recipe
with its meal type, cooking method and any dietary labels it satisfies."#;

/// Body of `POST /api/recipes/generate`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[validate(
        length(min = 1, max = 30, message = "Between 1 and 30 ingredients are required"),
        custom(function = "validate_ingredient_names")
    )]
    pub ingredients: Vec<String>,

    /// Free-form hints ("spice level": "mild").
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,

    #[serde(default)]
    pub dietary: Vec<String>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 30, message = "Cuisine must be 30 characters or less"))]
    pub cuisine: Option<String>,

    #[serde(default = "default_difficulty")]
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: String,

    /// Upper bound on total time, in minutes.
    #[serde(default = "default_max_time")]
    #[validate(range(min = 5, max = 300, message = "Max time must be between 5 and 300 minutes"))]
    pub max_time: u32,
}

impl GenerationRequest {
    /// Ingredient names with surrounding whitespace removed.
    pub fn ingredient_names(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .map(|ingredient| ingredient.trim().to_string())
            .filter(|ingredient| !ingredient.is_empty())
            .collect()
    }
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_max_time() -> u32 {
    60
}

fn validate_ingredient_names(ingredients: &[String]) -> Result<(), ValidationError> {
    for ingredient in ingredients {
        let len = ingredient.trim().chars().count();
        if len == 0 || len > 50 {
            return Err(ValidationError::new("ingredients")
                .with_message("Each ingredient must be 1-50 characters".into()));
        }
    }
    Ok(())
}

fn join_or(values: &[String], empty: &str) -> String {
    let joined = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        empty.to_string()
    } else {
        joined
    }
}

fn render_preferences(preferences: &Map<String, Value>) -> String {
    let rendered = preferences
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}: {}", key, s),
            other => format!("{}: {}", key, other),
        })
        .collect::<Vec<_>>()
        .join(", ");
    if rendered.is_empty() {
        "None specified".to_string()
    } else {
        rendered
    }
}

/// Renders the user half of the prompt.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let cuisine = request
        .cuisine
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("Any");

    format!(
        "Create a recipe from the following.\n\n\
         Available ingredients: {ingredients}\n\
         Preferences: {preferences}\n\
         Dietary restrictions: {dietary}\n\
         Allergies: {allergies}\n\
         Cuisine: {cuisine}\n\
         Difficulty: {difficulty}\n\
         Maximum total time: {max_time} minutes\n\n\
         Use the available ingredients and honor the restrictions above. \
         Reply with the JSON object only.",
        ingredients = request.ingredient_names().join(", "),
        preferences = render_preferences(&request.preferences),
        dietary = join_or(&request.dietary, "None"),
        allergies = join_or(&request.allergies, "None"),
        cuisine = cuisine,
        difficulty = request.difficulty.trim().to_lowercase(),
        max_time = request.max_time,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> GenerationRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let req = request(json!({ "ingredients": ["eggs", " rice "] }));
        assert_eq!(req.difficulty, "medium");
        assert_eq!(req.max_time, 60);
        assert!(req.validate().is_ok());

        let prompt = build_prompt(&req);
        assert!(prompt.contains("Available ingredients: eggs, rice\n"));
        assert!(prompt.contains("Preferences: None specified\n"));
        assert!(prompt.contains("Dietary restrictions: None\n"));
        assert!(prompt.contains("Allergies: None\n"));
        assert!(prompt.contains("Cuisine: Any\n"));
        assert!(prompt.contains("Maximum total time: 60 minutes"));
    }

    #[test]
    fn preferences_and_restrictions_are_rendered() {
        let req = request(json!({
            "ingredients": ["tofu"],
            "preferences": { "spice": "mild", "servings": 2 },
            "dietary": ["vegan"],
            "allergies": ["soy", "nuts"],
            "cuisine": "Thai",
            "difficulty": "hard",
            "maxTime": 45
        }));
        let prompt = build_prompt(&req);
        assert!(prompt.contains("spice: mild"));
        assert!(prompt.contains("servings: 2"));
        assert!(prompt.contains("Dietary restrictions: vegan\n"));
        assert!(prompt.contains("Allergies: soy, nuts\n"));
        assert!(prompt.contains("Cuisine: Thai\n"));
        assert!(prompt.contains("Difficulty: hard\n"));
        assert!(prompt.contains("Maximum total time: 45 minutes"));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        assert!(request(json!({ "ingredients": [] })).validate().is_err());
        assert!(request(json!({ "ingredients": ["  "] })).validate().is_err());
        assert!(
            request(json!({ "ingredients": ["a".repeat(51)] }))
                .validate()
                .is_err()
        );
        assert!(
            request(json!({ "ingredients": ["egg"], "maxTime": 1 }))
                .validate()
                .is_err()
        );
        assert!(
            request(json!({ "ingredients": ["egg"], "difficulty": "chef" }))
                .validate()
                .is_err()
        );
    }
}
