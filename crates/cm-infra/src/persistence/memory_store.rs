use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cm_core::ports::{RecipeRepositoryError, RecipeRepositoryPort};
use cm_core::{DocId, Recipe, SavedRecipeDocument, UserId};
use tokio::sync::mpsc;
use tracing::debug;

use super::subscribers::SubscriberRegistry;
use super::{new_document, owned_by};

/// Process-local document store. Contents are lost on exit.
#[derive(Default)]
pub struct InMemoryRecipeStore {
    docs: Mutex<Vec<SavedRecipeDocument>>,
    subscribers: SubscriberRegistry,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> MutexGuard<'_, Vec<SavedRecipeDocument>> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.live_count()
    }
}

#[async_trait]
impl RecipeRepositoryPort for InMemoryRecipeStore {
    async fn create(
        &self,
        owner: &UserId,
        recipe: &Recipe,
        created_at: DateTime<Utc>,
    ) -> Result<DocId, RecipeRepositoryError> {
        let doc = new_document(owner, recipe, created_at);
        let doc_id = doc.doc_id.clone();
        let snapshot = {
            let mut docs = self.docs();
            docs.push(doc);
            owned_by(&docs, owner)
        };
        debug!(doc_id = %doc_id, user_id = %owner, "document created");
        self.subscribers.publish(owner, &snapshot);
        Ok(doc_id)
    }

    async fn delete(&self, doc_id: &DocId) -> Result<(), RecipeRepositoryError> {
        let (owner, snapshot) = {
            let mut docs = self.docs();
            let pos = docs
                .iter()
                .position(|d| &d.doc_id == doc_id)
                .ok_or_else(|| RecipeRepositoryError::NotFound(doc_id.clone()))?;
            let owner = docs.remove(pos).user_id;
            let snapshot = owned_by(&docs, &owner);
            (owner, snapshot)
        };
        debug!(doc_id = %doc_id, "document deleted");
        self.subscribers.publish(&owner, &snapshot);
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SavedRecipeDocument>, RecipeRepositoryError> {
        Ok(owned_by(&self.docs(), owner))
    }

    async fn subscribe(
        &self,
        owner: &UserId,
    ) -> Result<mpsc::Receiver<Vec<SavedRecipeDocument>>, RecipeRepositoryError> {
        let initial = owned_by(&self.docs(), owner);
        Ok(self.subscribers.subscribe(owner, initial))
    }
}
