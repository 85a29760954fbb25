//! Saved recipe document stores.
//!
//! Both stores keep documents in insertion order and push a fresh snapshot
//! of an owner's documents to that owner's subscribers after every change.

mod json_file_store;
mod memory_store;
mod subscribers;

pub use json_file_store::JsonFileRecipeStore;
pub use memory_store::InMemoryRecipeStore;

use chrono::{DateTime, Utc};
use cm_core::{DocId, Recipe, SavedRecipeDocument, UserId};

fn new_document(owner: &UserId, recipe: &Recipe, created_at: DateTime<Utc>) -> SavedRecipeDocument {
    SavedRecipeDocument {
        doc_id: DocId::generate(),
        user_id: owner.clone(),
        created_at,
        // The document id lives on the envelope, never inside the body.
        recipe: recipe.without_doc_id(),
    }
}

fn owned_by(docs: &[SavedRecipeDocument], owner: &UserId) -> Vec<SavedRecipeDocument> {
    docs.iter().filter(|d| &d.user_id == owner).cloned().collect()
}
