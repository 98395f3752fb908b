use std::{sync::Arc, time::Instant};

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{ai::RecipeGenerator, config::Config, mail::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub generator: Arc<RecipeGenerator>,
    /// `None` when SMTP is not configured; contact messages are only logged.
    pub mailer: Option<Arc<dyn Mailer>>,
    /// Shared client for Google OAuth calls.
    pub http: reqwest::Client,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let generator = Arc::new(RecipeGenerator::from_config(&config));
        Self {
            pool,
            config,
            generator,
            mailer: None,
            http: reqwest::Client::new(),
            started_at: Instant::now(),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_generator(mut self, generator: RecipeGenerator) -> Self {
        self.generator = Arc::new(generator);
        self
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<RecipeGenerator> {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}
