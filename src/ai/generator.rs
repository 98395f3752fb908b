use std::sync::Arc;

use thiserror::Error;

use super::gemini::GeminiProvider;
use super::normalize::{GeneratedRecipe, NormalizeError, fallback_recipe, parse_recipe};
use super::prompt::{GenerationRequest, SYSTEM_PROMPT, build_prompt};
use super::{LlmError, LlmProvider};
use crate::config::Config;

#[derive(Error, Debug)]
enum GenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Outcome of a generation attempt.
#[derive(Debug, Clone)]
pub struct Generation {
    pub recipe: GeneratedRecipe,
    /// True when the template recipe was served instead of a model answer.
    pub fallback: bool,
}

/// One prompt, one call, one parse. Never fails: errors become the fallback.
#[derive(Clone)]
pub struct RecipeGenerator {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl RecipeGenerator {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { provider }
    }

    /// Uses Gemini when an API key is configured.
    pub fn from_config(config: &Config) -> Self {
        let provider = config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiProvider::new(key.clone(), config.gemini_model.clone()))
                as Arc<dyn LlmProvider>
        });
        if provider.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; recipe generation will use the fallback template");
        }
        Self::new(provider)
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Generation {
        let Some(provider) = &self.provider else {
            return self.fallback(request);
        };

        match self.try_generate(provider.as_ref(), request).await {
            Ok(recipe) => {
                tracing::info!(
                    provider = provider.provider_name(),
                    model = provider.model_name(),
                    title = %recipe.title,
                    "Recipe generated"
                );
                Generation {
                    recipe,
                    fallback: false,
                }
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    "Recipe generation failed, serving fallback: {}",
                    e
                );
                self.fallback(request)
            }
        }
    }

    async fn try_generate(
        &self,
        provider: &dyn LlmProvider,
        request: &GenerationRequest,
    ) -> Result<GeneratedRecipe, GenerationError> {
        let prompt = build_prompt(request);
        let text = provider.complete(SYSTEM_PROMPT, &prompt).await?;
        match parse_recipe(&text) {
            Ok(recipe) => Ok(recipe),
            Err(e) => {
                tracing::debug!("Unusable model output: {}", text);
                Err(e.into())
            }
        }
    }

    fn fallback(&self, request: &GenerationRequest) -> Generation {
        Generation {
            recipe: fallback_recipe(&request.ingredient_names()),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedProvider {
        answer: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn answering(text: &str) -> Self {
            Self {
                answer: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(|_| LlmError::ApiError {
                status: 503,
                message: "unavailable".to_string(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "test"
        }
    }

    fn request() -> GenerationRequest {
        serde_json::from_value(serde_json::json!({ "ingredients": ["salmon", "lemon"] })).unwrap()
    }

    #[tokio::test]
    async fn uses_the_model_answer_when_it_parses() {
        let provider = Arc::new(ScriptedProvider::answering(
            r#"{"title": "Lemon Salmon", "ingredients": [{"name": "salmon", "quantity": "2", "unit": "piece"}], "steps": ["Bake"]}"#,
        ));
        let generator = RecipeGenerator::new(Some(provider.clone()));

        let generation = generator.generate(&request()).await;
        assert!(!generation.fallback);
        assert_eq!(generation.recipe.title, "Lemon Salmon");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("salmon, lemon"));
    }

    #[tokio::test]
    async fn falls_back_on_garbage_output() {
        let provider = Arc::new(ScriptedProvider::answering("Sorry, I can't do that"));
        let generator = RecipeGenerator::new(Some(provider));

        let generation = generator.generate(&request()).await;
        assert!(generation.fallback);
        assert_eq!(generation.recipe.title, "Simple Recipe with salmon, lemon");
    }

    #[tokio::test]
    async fn falls_back_on_provider_error_without_retrying() {
        let provider = Arc::new(ScriptedProvider::failing());
        let generator = RecipeGenerator::new(Some(provider.clone()));

        let generation = generator.generate(&request()).await;
        assert!(generation.fallback);
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_generator_serves_the_fallback() {
        let generator = RecipeGenerator::new(None);
        assert!(!generator.is_configured());
        let generation = generator.generate(&request()).await;
        assert!(generation.fallback);
        assert_eq!(generation.recipe.servings, 2);
    }
}
