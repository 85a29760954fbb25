use async_trait::async_trait;

use crate::{
    image::SourceImage, ingredient::RecognizedIngredient, language::Language,
    ports::errors::RecognitionError,
};

/// Image recognition service: photo in, ingredient records out.
///
/// An empty list means "no food detected" and is not an error.
#[async_trait]
pub trait IngredientRecognitionPort: Send + Sync {
    async fn recognize(
        &self,
        image: &SourceImage,
        language: Language,
    ) -> Result<Vec<RecognizedIngredient>, RecognitionError>;
}
