//! # cm-app
//!
//! Session state, stores and use cases for CookMate.
//!
//! This crate depends only on `cm-core` ports; adapters are injected through
//! [`SessionDeps`].

pub mod deps;
pub mod events;
pub mod request_cache;
pub mod session;
pub mod stores;
pub mod usecases;

pub use deps::SessionDeps;
pub use events::SessionEvent;
pub use request_cache::{FetchError, RequestCache, RequestState};
pub use session::{RecognitionOutcome, Session, SessionError};
pub use stores::{IngredientStore, PreferencesStore, RecipeCollection, RecipeCollectionError, SaveOutcome};
