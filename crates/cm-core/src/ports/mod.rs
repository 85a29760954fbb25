//! Port interfaces for the application layer
//!
//! Ports define the contract between the session (stores and use cases) and
//! the external collaborators: recognition and generation backends, the
//! identity provider and the document store. Implementations live in
//! `cm-infra`; tests substitute their own.

mod clock;
pub mod errors;
pub mod generation;
pub mod identity;
pub mod image;
pub mod recipe_repository;
pub mod recognition;

pub use clock::ClockPort;
pub use errors::{
    GenerationError, IdentityError, ImagePrepareError, RecipeRepositoryError, RecognitionError,
};
pub use generation::{GenerationRequest, RecipeGenerationPort};
pub use identity::IdentityPort;
pub use image::ImagePreparePort;
pub use recipe_repository::RecipeRepositoryPort;
pub use recognition::IngredientRecognitionPort;
