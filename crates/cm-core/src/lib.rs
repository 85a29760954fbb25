//! # cm-core
//!
//! Core domain models and ports for CookMate.
//!
//! This crate contains pure domain logic without any infrastructure dependencies.

pub mod account;
pub mod config;
pub mod ids;
pub mod image;
pub mod ingredient;
pub mod language;
pub mod ports;
pub mod preferences;
pub mod projection;
pub mod recipe;

// Re-export commonly used types at the crate root
pub use account::Identity;
pub use config::AppConfig;
pub use ids::{DocId, IngredientId, RecipeId, UserId};
pub use image::{ImageFingerprint, SourceImage};
pub use ingredient::{Ingredient, IngredientOrigin, Nutrients, RecognizedIngredient};
pub use language::Language;
pub use preferences::{Cuisine, PreferenceToggle, Preferences, SpiceLevel, SpiceTier};
pub use projection::{Step, SubmitReadiness};
pub use recipe::{Recipe, RecipeIngredient, SavedRecipeDocument};
