use std::sync::LazyLock;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppError, mail::ContactMessage, openapi, state::AppState, utils::extract::AppJson,
};

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+()\-\s.]+$").expect("valid phone regex"));

/// DTO for the contact form.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 80, message = "Name must be 1-80 characters"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(
        length(min = 7, max = 20, message = "Phone must be 7-20 characters"),
        regex(path = *PHONE, message = "Phone contains invalid characters")
    )]
    pub phone: Option<String>,
    #[validate(length(min = 10, max = 2000, message = "Message must be 10-2000 characters"))]
    pub message: String,
}

impl ContactRequest {
    fn into_message(self) -> ContactMessage {
        ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            message: self.message.trim().to_string(),
        }
    }
}

/// Liveness probe. Does not touch the database.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

/// Forwards a contact-form message by mail, or logs it when SMTP is off.
/// Delivery failures are logged and never reported to the sender.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message accepted"),
        (status = 400, description = "Invalid message"),
        (status = 429, description = "Too many messages")
    )
)]
pub async fn contact(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let message = payload.into_message();

    match &state.mailer {
        Some(mailer) => {
            if let Err(e) = mailer.send_contact(&message).await {
                tracing::error!(from = %message.email, "Failed to send contact mail: {}", e);
            } else {
                tracing::info!(from = %message.email, "Contact mail sent");
            }
        }
        None => {
            tracing::info!(
                name = %message.name,
                from = %message.email,
                preview = %message.preview(),
                "Contact message received (SMTP not configured)"
            );
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Thank you for your message! We'll get back to you soon.",
    })))
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(openapi::spec())
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(phone: Option<&str>) -> ContactRequest {
        ContactRequest {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: phone.map(str::to_string),
            message: "Hello there, nice app!".to_string(),
        }
    }

    #[test]
    fn phone_is_optional_but_checked() {
        assert!(request(None).validate().is_ok());
        assert!(request(Some("+1 (555) 123-4567")).validate().is_ok());
        assert!(request(Some("call me")).validate().is_err());
        assert!(request(Some("123")).validate().is_err());
    }

    #[test]
    fn short_messages_are_rejected() {
        let mut req = request(None);
        req.message = "hi".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_phone_is_dropped() {
        let message = ContactRequest {
            phone: Some("   ".to_string()),
            ..request(None)
        }
        .into_message();
        assert!(message.phone.is_none());
    }
}
