//! # cm-infra
//!
//! Adapters for the `cm-core` ports: backend HTTP clients, image
//! preparation, saved recipe storage, identity and clock.

pub mod http;
pub mod identity;
pub mod media;
pub mod persistence;
pub mod time;

pub use http::{BackendClient, HttpIngredientRecognizer, HttpRecipeGenerator};
pub use identity::LocalIdentityProvider;
pub use media::ImageCompressor;
pub use persistence::{InMemoryRecipeStore, JsonFileRecipeStore};
pub use time::SystemClock;
