// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::recipe::{RecipeSummary, validate_difficulty};

pub const DIETARY_OPTIONS: [&str; 8] = [
    "vegetarian",
    "vegan",
    "gluten-free",
    "dairy-free",
    "keto",
    "paleo",
    "halal",
    "kosher",
];

pub const ALLERGY_OPTIONS: [&str; 8] = [
    "nuts", "shellfish", "eggs", "soy", "wheat", "dairy", "fish", "sesame",
];

pub const CUISINE_OPTIONS: [&str; 10] = [
    "italian",
    "mexican",
    "chinese",
    "indian",
    "japanese",
    "thai",
    "french",
    "mediterranean",
    "american",
    "other",
];

/// Matches `users.name VARCHAR(50)`.
pub const NAME_MAX: usize = 50;

/// Column list matching [`User`], for `SELECT ... FROM users`.
pub const USER_COLUMNS: &str = "id, name, email, password_hash, google_id, avatar, \
    pref_dietary, pref_allergies, pref_cuisine, pref_difficulty, pref_max_prep_time, \
    created_at, updated_at, last_login";

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Unique, stored lowercase.
    pub email: String,
    /// Argon2 hash; `None` for accounts created through Google.
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub pref_dietary: Vec<String>,
    pub pref_allergies: Vec<String>,
    pub pref_cuisine: Vec<String>,
    pub pref_difficulty: String,
    pub pref_max_prep_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl User {
    pub fn preferences(&self) -> Preferences {
        Preferences {
            dietary: self.pref_dietary.clone(),
            allergies: self.pref_allergies.clone(),
            cuisine: self.pref_cuisine.clone(),
            difficulty: self.pref_difficulty.clone(),
            max_prep_time: self.pref_max_prep_time,
        }
    }

    /// What the account owner sees about themselves.
    pub fn public(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            preferences: self.preferences(),
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub dietary: Vec<String>,
    pub allergies: Vec<String>,
    pub cuisine: Vec<String>,
    pub difficulty: String,
    pub max_prep_time: i32,
}

/// A user without credentials or linked identities.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Returned by register and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: UserResponse,
}

/// Aggregated profile data for the current user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub saved_recipes: Vec<RecipeSummary>,
    pub favorites: Vec<RecipeSummary>,
    pub recipe_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub saved_recipes: i64,
    pub favorite_recipes: i64,
    pub created_recipes: i64,
    pub liked_recipes: i64,
    pub commented_recipes: i64,
    pub total_activity: i64,
}

impl UserStats {
    pub fn new(saved: i64, favorites: i64, created: i64, liked: i64, commented: i64) -> Self {
        Self {
            saved_recipes: saved,
            favorite_recipes: favorites,
            created_recipes: created,
            liked_recipes: liked,
            commented_recipes: commented,
            total_activity: saved + favorites + created + liked + commented,
        }
    }
}

/// What anyone can see about a user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub preferences: Preferences,
    pub recipe_count: i64,
    pub recent_recipes: Vec<RecipeSummary>,
    pub member_since: DateTime<Utc>,
}

/// DTO for email/password registration.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name length must be between 1 and 50 characters."
    ))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required."))]
    pub password: String,
}

/// Partial update of the preference set.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    #[validate(custom(function = "validate_dietary"))]
    pub dietary: Option<Vec<String>>,
    #[validate(custom(function = "validate_allergies"))]
    pub allergies: Option<Vec<String>>,
    #[validate(custom(function = "validate_cuisines"))]
    pub cuisine: Option<Vec<String>>,
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 1440, message = "Max prep time must be 1-1440 minutes"))]
    pub max_prep_time: Option<i32>,
}

impl UpdatePreferencesRequest {
    pub fn apply(self, mut preferences: Preferences) -> Preferences {
        if let Some(dietary) = self.dietary {
            preferences.dietary = lowercase_unique(dietary);
        }
        if let Some(allergies) = self.allergies {
            preferences.allergies = lowercase_unique(allergies);
        }
        if let Some(cuisine) = self.cuisine {
            preferences.cuisine = lowercase_unique(cuisine);
        }
        if let Some(difficulty) = self.difficulty {
            preferences.difficulty = difficulty.trim().to_lowercase();
        }
        if let Some(max_prep_time) = self.max_prep_time {
            preferences.max_prep_time = max_prep_time;
        }
        preferences
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name length must be between 1 and 50 characters."
    ))]
    pub name: Option<String>,
    #[validate(url(message = "Avatar must be a URL."))]
    pub avatar: Option<String>,
}

fn lowercase_unique(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_lowercase();
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn check_members(
    values: &[String],
    allowed: &[&str],
    field: &'static str,
) -> Result<(), ValidationError> {
    match values
        .iter()
        .find(|v| !allowed.contains(&v.trim().to_lowercase().as_str()))
    {
        Some(bad) => Err(ValidationError::new(field)
            .with_message(format!("'{}' is not a valid {} option", bad, field).into())),
        None => Ok(()),
    }
}

fn validate_dietary(values: &[String]) -> Result<(), ValidationError> {
    check_members(values, &DIETARY_OPTIONS, "dietary")
}

fn validate_allergies(values: &[String]) -> Result<(), ValidationError> {
    check_members(values, &ALLERGY_OPTIONS, "allergies")
}

fn validate_cuisines(values: &[String]) -> Result<(), ValidationError> {
    check_members(values, &CUISINE_OPTIONS, "cuisine")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Preferences {
        Preferences {
            dietary: vec![],
            allergies: vec![],
            cuisine: vec![],
            difficulty: "medium".to_string(),
            max_prep_time: 60,
        }
    }

    #[test]
    fn register_requires_email_and_password() {
        let bad = RegisterRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
        };
        assert!(bad.validate().is_err());

        let short = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "123".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn preferences_reject_unknown_tags() {
        let req = UpdatePreferencesRequest {
            dietary: Some(vec!["vegan".to_string(), "carnivore".to_string()]),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdatePreferencesRequest {
            difficulty: Some("impossible".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn preferences_update_is_partial() {
        let req = UpdatePreferencesRequest {
            allergies: Some(vec!["Nuts".to_string(), "nuts".to_string()]),
            max_prep_time: Some(30),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let updated = req.apply(defaults());
        assert_eq!(updated.allergies, vec!["nuts"]);
        assert_eq!(updated.max_prep_time, 30);
        assert_eq!(updated.difficulty, "medium");
        assert!(updated.dietary.is_empty());
    }

    #[test]
    fn stats_total_is_the_sum() {
        let stats = UserStats::new(1, 2, 3, 4, 5);
        assert_eq!(stats.total_activity, 15);
    }
}
