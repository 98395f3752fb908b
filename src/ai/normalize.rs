//! Turns the model's loosely structured answer into a recipe we can store.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::recipe::{
    DIFFICULTIES, Ingredient, MINUTES_MAX, Nutrition, RecipeDraft, UNITS,
};

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const CUISINE_MAX: usize = 50;
const QUANTITY_MAX: usize = 30;
const INGREDIENT_NAME_MAX: usize = 100;

const DEFAULT_SERVINGS: i32 = 4;
const DEFAULT_PREP_TIME: i32 = 15;
const DEFAULT_COOK_TIME: i32 = 30;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*\n?").expect("valid fence regex"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digit regex"));

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("model response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("model response is not a JSON object")]
    NotAnObject,

    #[error("model response has no usable {0}")]
    Missing(&'static str),
}

/// A recipe as produced by the generator, before it has an author or id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub servings: i32,
    pub prep_time: i32,
    pub cook_time: i32,
    pub total_time: i32,
    pub difficulty: String,
    pub cuisine: String,
    pub tags: Vec<String>,
    pub nutrition: Option<Nutrition>,
}

impl GeneratedRecipe {
    pub fn into_draft(self) -> RecipeDraft {
        RecipeDraft {
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            steps: self.steps,
            tags: self.tags,
            servings: self.servings,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            difficulty: self.difficulty,
            cuisine: self.cuisine,
            nutrition: self.nutrition,
            is_public: true,
        }
    }
}

/// Removes markdown code fences and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Parses and normalizes a raw model answer.
pub fn parse_recipe(raw: &str) -> Result<GeneratedRecipe, NormalizeError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        // Some answers wrap the object in prose; retry on the outermost braces.
        Err(err) => match outer_object(&cleaned) {
            Some(candidate) => serde_json::from_str(candidate)?,
            None => return Err(err.into()),
        },
    };

    let object = value.as_object().ok_or(NormalizeError::NotAnObject)?;
    normalize(object)
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn normalize(data: &Map<String, Value>) -> Result<GeneratedRecipe, NormalizeError> {
    let title = first_str(data, &["title", "recipeName", "name"])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Generated Recipe");

    let description = first_str(data, &["description", "summary"])
        .map(str::trim)
        .unwrap_or_default();

    let ingredients: Vec<Ingredient> = data
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_ingredient).collect())
        .unwrap_or_default();
    if ingredients.is_empty() {
        return Err(NormalizeError::Missing("ingredients"));
    }

    let steps = first_value(data, &["steps", "instructions", "directions"])
        .map(normalize_steps)
        .unwrap_or_default();
    if steps.is_empty() {
        return Err(NormalizeError::Missing("steps"));
    }

    let servings = parse_int(data.get("servings"), DEFAULT_SERVINGS).clamp(1, 20);
    let prep_time = parse_int(data.get("prepTime"), DEFAULT_PREP_TIME).clamp(1, MINUTES_MAX);
    let cook_time = parse_int(data.get("cookTime"), DEFAULT_COOK_TIME).clamp(0, MINUTES_MAX);

    let difficulty = data
        .get("difficulty")
        .and_then(Value::as_str)
        .map(|d| d.trim().to_lowercase())
        .filter(|d| DIFFICULTIES.contains(&d.as_str()))
        .unwrap_or_else(|| "medium".to_string());

    let cuisine = data
        .get("cuisine")
        .and_then(Value::as_str)
        .map(|c| truncate(c.trim(), CUISINE_MAX).to_lowercase())
        .unwrap_or_default();

    let tags = data
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            let mut out: Vec<String> = Vec::new();
            for tag in tags.iter().filter_map(Value::as_str) {
                let tag = tag.trim().to_lowercase();
                if !tag.is_empty() && !out.contains(&tag) {
                    out.push(tag);
                }
            }
            out
        })
        .unwrap_or_default();

    let nutrition = data
        .get("nutrition")
        .and_then(Value::as_object)
        .map(|n| Nutrition {
            calories: number_like(n.get("calories")),
            protein: number_like(n.get("protein")),
            carbs: number_like(n.get("carbs")),
            fat: number_like(n.get("fat")),
            fiber: number_like(n.get("fiber")),
            sugar: number_like(n.get("sugar")),
        })
        .filter(|n| !n.is_empty());

    Ok(GeneratedRecipe {
        title: truncate(title, TITLE_MAX),
        description: truncate(description, DESCRIPTION_MAX),
        ingredients,
        steps,
        servings,
        prep_time,
        cook_time,
        total_time: prep_time + cook_time,
        difficulty,
        cuisine,
        tags,
        nutrition,
    })
}

fn normalize_ingredient(value: &Value) -> Option<Ingredient> {
    let (name, quantity, unit) = match value {
        Value::String(name) => (name.trim().to_string(), None, None),
        Value::Object(item) => (
            first_str(item, &["name", "item", "ingredient"])
                .map(|n| n.trim().to_string())
                .unwrap_or_default(),
            first_value(item, &["quantity", "amount"]).and_then(scalar_text),
            item.get("unit").and_then(Value::as_str).map(|u| u.trim().to_lowercase()),
        ),
        _ => return None,
    };

    if name.is_empty() {
        return None;
    }

    let unit = match unit {
        Some(unit) if UNITS.contains(&unit.as_str()) => unit,
        Some(unit) if !unit.is_empty() => "other".to_string(),
        _ => "piece".to_string(),
    };

    Some(Ingredient {
        name: truncate(&name, INGREDIENT_NAME_MAX),
        quantity: quantity
            .map(|q| truncate(q.trim(), QUANTITY_MAX))
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| "1".to_string()),
        unit,
    })
}

fn normalize_steps(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => first_str(o, &["text", "instruction", "step"]).map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.lines().map(str::to_string).collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Integers as-is; for strings the first run of digits, else `default`.
fn parse_int(value: Option<&Value>, default: i32) -> i32 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(default),
        Some(Value::String(s)) => DIGITS
            .find(s)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(default),
        _ => default,
    }
}

fn number_like(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_end_matches(|c: char| c.is_alphabetic() || c.is_whitespace())
            .parse()
            .ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_value<'a>(data: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|value| !value.is_null())
}

fn first_str<'a>(data: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| data.get(*key).and_then(Value::as_str))
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim_end().to_string()
}

/// The recipe served when generation fails. Built only from the input.
pub fn fallback_recipe(ingredients: &[String]) -> GeneratedRecipe {
    let list = ingredients
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let list = if list.is_empty() {
        "your ingredients".to_string()
    } else {
        list
    };

    let ingredient = |name: &str, quantity: &str, unit: &str| Ingredient {
        name: name.to_string(),
        quantity: quantity.to_string(),
        unit: unit.to_string(),
    };

    GeneratedRecipe {
        title: truncate(&format!("Simple Recipe with {}", list), TITLE_MAX),
        description: truncate(
            &format!(
                "A quick and easy recipe using your available ingredients: {}",
                list
            ),
            DESCRIPTION_MAX,
        ),
        ingredients: vec![
            ingredient(&truncate(&list, INGREDIENT_NAME_MAX), "1", "handful"),
            ingredient("salt", "1", "pinch"),
            ingredient("pepper", "1", "pinch"),
            ingredient("olive oil", "2", "tbsp"),
        ],
        steps: vec![
            "Heat olive oil in a pan over medium heat".to_string(),
            format!("Add {} and season with salt and pepper", list),
            "Cook for 5-10 minutes until tender".to_string(),
            "Serve hot and enjoy!".to_string(),
        ],
        servings: 2,
        prep_time: 5,
        cook_time: 10,
        total_time: 15,
        difficulty: "easy".to_string(),
        cuisine: String::new(),
        tags: vec!["quick".to_string(), "simple".to_string()],
        nutrition: Some(Nutrition {
            calories: Some(150.0),
            protein: Some(5.0),
            carbs: Some(10.0),
            fat: Some(12.0),
            fiber: Some(2.0),
            sugar: Some(3.0),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    const WELL_FORMED: &str = r#"```json
{
  "title": "Garlic Butter Rice",
  "description": "Fragrant rice.",
  "ingredients": [
    {"name": "rice", "quantity": "1", "unit": "cup"},
    {"name": "garlic", "quantity": 3, "unit": "Clove"}
  ],
  "steps": ["Rinse the rice", "Cook with garlic"],
  "servings": 2,
  "prepTime": 10,
  "cookTime": 20,
  "totalTime": 30,
  "difficulty": "Easy",
  "cuisine": "Asian",
  "tags": ["Side", "quick"],
  "nutrition": {"calories": 320, "protein": 6, "carbs": 55, "fat": 8, "fiber": 1, "sugar": 0}
}
```"#;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn parses_a_well_formed_answer() {
        let recipe = parse_recipe(WELL_FORMED).unwrap();
        assert_eq!(recipe.title, "Garlic Butter Rice");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[1].quantity, "3");
        assert_eq!(recipe.ingredients[1].unit, "clove");
        assert_eq!(recipe.difficulty, "easy");
        assert_eq!(recipe.cuisine, "asian");
        assert_eq!(recipe.tags, vec!["side", "quick"]);
        assert_eq!(recipe.total_time, 30);
        assert_eq!(recipe.nutrition.as_ref().and_then(|n| n.calories), Some(320.0));

        let draft = recipe.into_draft().normalized();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn tolerates_alternate_field_names_and_string_numbers() {
        let raw = r#"{
            "recipeName": "Omelette",
            "ingredients": [{"item": "eggs", "amount": "3"}, "chives"],
            "instructions": ["Whisk", "Fry"],
            "servings": "serves 2",
            "prepTime": "5 minutes",
            "cookTime": "about 10-12 min",
            "difficulty": "trivial"
        }"#;
        let recipe = parse_recipe(raw).unwrap();
        assert_eq!(recipe.title, "Omelette");
        assert_eq!(recipe.ingredients[0].name, "eggs");
        assert_eq!(recipe.ingredients[0].quantity, "3");
        assert_eq!(recipe.ingredients[0].unit, "piece");
        assert_eq!(recipe.ingredients[1].name, "chives");
        assert_eq!(recipe.steps, vec!["Whisk", "Fry"]);
        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.prep_time, 5);
        assert_eq!(recipe.cook_time, 10);
        assert_eq!(recipe.total_time, 15);
        assert_eq!(recipe.difficulty, "medium");
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let raw = r#"{
            "ingredients": [{"name": "kale", "unit": "bucket"}],
            "steps": "Wash\n\nServe",
            "servings": "a few",
            "prepTime": null
        }"#;
        let recipe = parse_recipe(raw).unwrap();
        assert_eq!(recipe.title, "Generated Recipe");
        assert_eq!(recipe.ingredients[0].unit, "other");
        assert_eq!(recipe.ingredients[0].quantity, "1");
        assert_eq!(recipe.steps, vec!["Wash", "Serve"]);
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert_eq!(recipe.prep_time, DEFAULT_PREP_TIME);
        assert_eq!(recipe.cook_time, DEFAULT_COOK_TIME);
        assert_eq!(recipe.total_time, DEFAULT_PREP_TIME + DEFAULT_COOK_TIME);
    }

    #[test]
    fn times_are_clamped_to_a_day() {
        let raw = r#"{"ingredients": ["beef"], "steps": ["Smoke"], "prepTime": 0, "cookTime": 99999}"#;
        let recipe = parse_recipe(raw).unwrap();
        assert_eq!(recipe.prep_time, 1);
        assert_eq!(recipe.cook_time, MINUTES_MAX);
        assert!(recipe.into_draft().normalized().validate().is_ok());
    }

    #[test]
    fn finds_object_inside_prose() {
        let raw = "Here is your recipe: {\"title\": \"Toast\", \"ingredients\": [\"bread\"], \"steps\": [\"Toast it\"]} Enjoy!";
        assert_eq!(parse_recipe(raw).unwrap().title, "Toast");
    }

    #[test]
    fn rejects_unusable_answers() {
        assert!(matches!(
            parse_recipe("I cannot help with that."),
            Err(NormalizeError::InvalidJson(_))
        ));
        assert!(matches!(parse_recipe("[1, 2]"), Err(NormalizeError::NotAnObject)));
        assert!(matches!(
            parse_recipe(r#"{"title": "Air", "ingredients": [], "steps": ["Breathe"]}"#),
            Err(NormalizeError::Missing("ingredients"))
        ));
        assert!(matches!(
            parse_recipe(r#"{"title": "Air", "ingredients": ["air"]}"#),
            Err(NormalizeError::Missing("steps"))
        ));
    }

    #[test]
    fn long_titles_are_truncated() {
        let raw = format!(
            r#"{{"title": "{}", "ingredients": ["x"], "steps": ["y"]}}"#,
            "t".repeat(150)
        );
        assert_eq!(parse_recipe(&raw).unwrap().title.chars().count(), TITLE_MAX);
    }

    #[test]
    fn fallback_is_built_from_the_ingredients() {
        let ingredients = vec!["chicken".to_string(), " rice ".to_string()];
        let recipe = fallback_recipe(&ingredients);
        assert_eq!(recipe.title, "Simple Recipe with chicken, rice");
        assert_eq!(recipe.ingredients[0].name, "chicken, rice");
        assert_eq!(recipe.ingredients[0].unit, "handful");
        assert_eq!(recipe.steps[1], "Add chicken, rice and season with salt and pepper");
        assert_eq!(recipe.total_time, 15);
        assert_eq!(recipe.difficulty, "easy");
        assert_eq!(recipe, fallback_recipe(&ingredients));

        assert!(recipe.into_draft().normalized().validate().is_ok());
    }
}
