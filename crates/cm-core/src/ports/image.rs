use async_trait::async_trait;

use crate::{image::SourceImage, ports::errors::ImagePrepareError};

/// Shrinks an upload before it is sent for recognition.
#[async_trait]
pub trait ImagePreparePort: Send + Sync {
    async fn prepare(&self, image: &SourceImage) -> Result<SourceImage, ImagePrepareError>;
}
