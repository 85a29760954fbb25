//! Use cases that reach the backend or the document store.
//! 需要访问后端或文档存储的用例。
//!
//! Recognition and generation are memoized per input through
//! [`RequestCache`](crate::request_cache::RequestCache).

pub mod generate_recipes;
pub mod recognize_ingredients;
pub mod saved_recipes_feed;

pub use generate_recipes::{GenerateRecipes, GenerateRecipesError};
pub use recognize_ingredients::{Recognition, RecognitionKey, RecognizeIngredients};
pub use saved_recipes_feed::SavedRecipesFeed;
