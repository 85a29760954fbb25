//! HTTP clients for the recipe backend.
//!
//! Both endpoints live under the same base URL:
//! - `POST {api_url}/get-ingredients` (multipart: `image`, `language`)
//! - `POST {api_url}/generate-recipe` (JSON: `ingredients`, `preferences`, `language`)

mod client;
pub mod generation;
pub mod recognition;

pub use client::BackendClient;
pub use generation::HttpRecipeGenerator;
pub use recognition::HttpIngredientRecognizer;
