//! Outbound mail for the contact form.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A message submitted through `POST /api/contact`.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactMessage {
    pub fn subject(&self) -> String {
        format!("Recipe app contact: {}", self.name)
    }

    pub fn body(&self) -> String {
        format!(
            "New message from {}\nEmail: {}\nPhone: {}\n\n{}",
            self.name,
            self.email,
            self.phone.as_deref().unwrap_or("N/A"),
            self.message
        )
    }

    /// First 200 characters, for logs.
    pub fn preview(&self) -> String {
        let mut preview: String = self.message.chars().take(200).collect();
        if self.message.chars().count() > 200 {
            preview.push_str("...");
        }
        preview
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    to: Mailbox,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, to: &str, from: &str) -> Result<Self, MailError> {
        let builder = if smtp.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        };

        let transport = builder
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            to: to.parse()?,
            from: from.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), MailError> {
        let reply_to: Mailbox = message.email.parse()?;
        let email = Message::builder()
            .from(self.from.clone())
            .reply_to(reply_to)
            .to(self.to.clone())
            .subject(message.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body())?;

        self.transport.send(email).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_lists_sender_details() {
        let message = ContactMessage {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            message: "Love the app, any plans for meal plans?".to_string(),
        };
        let body = message.body();
        assert!(body.starts_with("New message from Sam\nEmail: sam@example.com\nPhone: N/A\n\n"));
        assert!(body.ends_with("meal plans?"));
        assert_eq!(message.subject(), "Recipe app contact: Sam");
    }

    #[test]
    fn preview_is_truncated() {
        let message = ContactMessage {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: Some("5551234567".to_string()),
            message: "x".repeat(250),
        };
        assert_eq!(message.preview().len(), 203);
    }
}
