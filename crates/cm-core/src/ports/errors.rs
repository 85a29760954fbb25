use thiserror::Error;

use crate::ids::DocId;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("recognition request failed: {0}")]
    Transport(String),

    #[error("recognition service rejected the image ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("recognition response malformed: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("Failed to fetch recipe ({status})")]
    Rejected { status: u16 },

    #[error("generation response malformed: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum RecipeRepositoryError {
    #[error("recipe document not found: {0}")]
    NotFound(DocId),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("subscription closed")]
    SubscriptionClosed,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider failed: {0}")]
    Provider(String),
}

#[derive(Debug, Error)]
pub enum ImagePrepareError {
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),
}
