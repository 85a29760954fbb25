use async_trait::async_trait;
use cm_core::ports::{IngredientRecognitionPort, RecognitionError};
use cm_core::{Language, RecognizedIngredient, SourceImage};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use super::client::BackendClient;

const FALLBACK_MESSAGE: &str = "Failed to get ingredients";

/// `POST /get-ingredients` with the photo as a multipart file part.
pub struct HttpIngredientRecognizer {
    client: BackendClient,
}

impl HttpIngredientRecognizer {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn form(image: &SourceImage, language: Language) -> Result<Form, RecognitionError> {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| RecognitionError::Transport(format!("invalid content type: {e}")))?;
        Ok(Form::new()
            .part("image", part)
            .text("language", language.as_str()))
    }
}

#[async_trait]
impl IngredientRecognitionPort for HttpIngredientRecognizer {
    async fn recognize(
        &self,
        image: &SourceImage,
        language: Language,
    ) -> Result<Vec<RecognizedIngredient>, RecognitionError> {
        let url = self.client.endpoint("get-ingredients");
        debug!(%url, bytes = image.len(), %language, "posting image");

        let response = self
            .client
            .http()
            .post(&url)
            .multipart(Self::form(image, language)?)
            .send()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                body
            };
            warn!(status = status.as_u16(), %message, "recognition rejected");
            return Err(RecognitionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<RecognizedIngredient>>()
            .await
            .map_err(|e| RecognitionError::Decode(e.to_string()))
    }
}
