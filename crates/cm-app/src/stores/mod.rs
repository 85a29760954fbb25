//! Session stores.
//!
//! `IngredientStore` and `PreferencesStore` are plain in-memory state with
//! no I/O. `RecipeCollection` is a view over the document store for the
//! current identity.

pub mod ingredients;
pub mod preferences;
pub mod recipe_collection;

pub use ingredients::IngredientStore;
pub use preferences::PreferencesStore;
pub use recipe_collection::{RecipeCollection, RecipeCollectionError, SaveOutcome};
