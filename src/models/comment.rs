use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A comment joined with its author's display info.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub recipe_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub text: String,
    pub rating: Option<i16>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Replaces the text of an existing comment.
    ///
    /// Returns `true` when the text actually changed, in which case the
    /// comment is flagged as edited and stamped with `now`.
    pub fn edit_text(&mut self, text: String, now: DateTime<Utc>) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text;
        self.is_edited = true;
        self.edited_at = Some(now);
        self.updated_at = now;
        true
    }
}

/// Matches `comments.text VARCHAR(500)`.
pub const COMMENT_MAX: usize = 500;

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be 1-500 characters"
    ))]
    pub text: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

/// DTO for editing one's own comment.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be 1-500 characters"
    ))]
    pub text: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment() -> Comment {
        let created = Utc::now();
        Comment {
            id: 1,
            recipe_id: 7,
            user_id: 3,
            user_name: "Ada".to_string(),
            user_avatar: None,
            text: "Lovely".to_string(),
            rating: Some(5),
            is_edited: false,
            edited_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn changing_text_marks_comment_edited() {
        let mut comment = comment();
        let now = Utc::now();
        assert!(comment.edit_text("Lovely, made it twice".to_string(), now));
        assert!(comment.is_edited);
        assert_eq!(comment.edited_at, Some(now));
    }

    #[test]
    fn same_text_is_not_an_edit() {
        let mut comment = comment();
        assert!(!comment.edit_text("Lovely".to_string(), Utc::now()));
        assert!(!comment.is_edited);
        assert!(comment.edited_at.is_none());
    }

    #[test]
    fn rating_must_be_one_to_five() {
        let ok = CreateCommentRequest {
            text: "Nice".to_string(),
            rating: Some(4),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateCommentRequest {
            text: "Nice".to_string(),
            rating: Some(6),
        };
        assert!(bad.validate().is_err());

        let empty = CreateCommentRequest {
            text: String::new(),
            rating: None,
        };
        assert!(empty.validate().is_err());
    }
}
