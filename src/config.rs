// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Google OAuth2 client credentials.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

/// SMTP relay used by the contact form.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS (port 465 style) instead of STARTTLS.
    pub secure: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,

    pub gemini_api_key: Option<String>,
    pub gemini_model: String,

    pub google: Option<GoogleOAuthConfig>,

    pub smtp: Option<SmtpConfig>,
    pub contact_to: String,
    pub contact_from: String,

    /// Generated recipes allowed per user in the trailing hour.
    pub generation_limit_per_hour: i64,
    /// Seconds to replenish one request in the per-IP limiter.
    pub rate_limit_period_secs: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let frontend_url = optional("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = optional("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let google = match (optional("GOOGLE_CLIENT_ID"), optional("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                callback_url: optional("GOOGLE_CALLBACK_URL").unwrap_or_else(|| {
                    "http://localhost:5000/api/auth/google/callback".to_string()
                }),
            }),
            _ => None,
        };

        let smtp = match (
            optional("SMTP_HOST"),
            optional("SMTP_USER"),
            optional("SMTP_PASS"),
        ) {
            (Some(host), Some(username), Some(password)) => {
                let port = parsed_or("SMTP_PORT", 587u16);
                Some(SmtpConfig {
                    host,
                    port,
                    secure: optional("SMTP_SECURE")
                        .map(|v| parse_bool(&v))
                        .unwrap_or(port == 465),
                    username,
                    password,
                })
            }
            _ => None,
        };

        let contact_to =
            optional("CONTACT_TO").unwrap_or_else(|| "contact@localhost".to_string());
        let contact_from = optional("CONTACT_FROM").unwrap_or_else(|| contact_to.clone());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: parsed_or("JWT_EXPIRATION", 7 * 24 * 60 * 60),
            rust_log,
            port: parsed_or("PORT", 5000),
            frontend_url,
            cors_origins,
            cookie_secure: optional("COOKIE_SECURE")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            google,
            smtp,
            contact_to,
            contact_from,
            generation_limit_per_hour: parsed_or("GENERATION_LIMIT_PER_HOUR", 10),
            rate_limit_period_secs: parsed_or("RATE_LIMIT_PERIOD_SECS", 9).max(1),
            rate_limit_burst: parsed_or("RATE_LIMIT_BURST", 100).max(1),
        }
    }

    /// Configuration for tests and local tooling: no outbound integrations.
    pub fn for_tests(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration: 600,
            rust_log: "error".to_string(),
            port: 0,
            frontend_url: "http://localhost:3000".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            cookie_secure: false,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            google: None,
            smtp: None,
            contact_to: "contact@localhost".to_string(),
            contact_from: "contact@localhost".to_string(),
            generation_limit_per_hour: 10,
            rate_limit_period_secs: 1,
            rate_limit_burst: 1000,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match optional(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_truthy_spellings() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("no"));
        assert!(!parse_bool(""));
    }
}
