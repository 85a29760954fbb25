use std::sync::Arc;

use cm_core::ports::{GenerationRequest, RecipeGenerationPort};
use cm_core::projection::{self, SubmitReadiness};
use cm_core::{Ingredient, Language, Preferences, Recipe};
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::request_cache::{FetchError, RequestCache, RequestState};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateRecipesError {
    /// Nothing is in use; carries the reason and where to send the user.
    #[error("no ingredients to submit")]
    NothingToSubmit(SubmitReadiness),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Use case: ask the backend for recipes matching the in-use ingredients.
/// 用例：根据当前食材和偏好生成菜谱。
pub struct GenerateRecipes {
    generator: Arc<dyn RecipeGenerationPort>,
    cache: RequestCache<GenerationRequest, Vec<Recipe>>,
}

impl GenerateRecipes {
    pub fn new(generator: Arc<dyn RecipeGenerationPort>) -> Self {
        Self {
            generator,
            cache: RequestCache::new("generation"),
        }
    }

    /// Build the request body from the current session state.
    pub fn request_for(
        ingredients: &[Ingredient],
        preferences: &Preferences,
        language: Language,
    ) -> Result<GenerationRequest, SubmitReadiness> {
        match projection::submit_readiness(ingredients) {
            SubmitReadiness::Ready(names) => Ok(GenerationRequest {
                ingredients: names,
                preferences: preferences.clone(),
                language,
            }),
            other => Err(other),
        }
    }

    pub async fn execute(
        &self,
        ingredients: &[Ingredient],
        preferences: &Preferences,
        language: Language,
    ) -> Result<Vec<Recipe>, GenerateRecipesError> {
        let request = Self::request_for(ingredients, preferences, language)
            .map_err(GenerateRecipesError::NothingToSubmit)?;
        self.execute_request(request).await
    }

    /// Resolve a prepared request, at most one backend call per distinct body.
    pub async fn execute_request(
        &self,
        request: GenerationRequest,
    ) -> Result<Vec<Recipe>, GenerateRecipesError> {
        let span = info_span!(
            "usecase.generate_recipes.execute",
            ingredients = request.ingredients.len(),
            language = %request.language,
        );

        async {
            let generator = self.generator.clone();
            let body = request.clone();
            let recipes = self
                .cache
                .get_or_fetch(request, move || async move {
                    generator.generate(&body).await.map_err(FetchError::failed)
                })
                .await?;
            info!(count = recipes.len(), "recipes resolved");
            Ok(recipes)
        }
        .instrument(span)
        .await
    }

    pub fn state(&self, request: &GenerationRequest) -> RequestState<Vec<Recipe>> {
        self.cache.state(request)
    }

    pub fn retry(&self, request: &GenerationRequest) -> bool {
        self.cache.retry(request)
    }
}
