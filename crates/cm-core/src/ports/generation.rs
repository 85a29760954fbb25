use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    language::Language, ports::errors::GenerationError, preferences::Preferences, recipe::Recipe,
};

/// Body of a recipe generation request.
///
/// Also the memoization key: the same triple never triggers a second call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub ingredients: Vec<String>,
    pub preferences: Preferences,
    pub language: Language,
}

/// Recipe generation service.
///
/// Implementations return the backend's keyed collection flattened into
/// display order.
#[async_trait]
pub trait RecipeGenerationPort: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Recipe>, GenerationError>;
}
