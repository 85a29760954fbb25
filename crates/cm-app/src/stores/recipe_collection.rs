use std::sync::Arc;

use chrono::{DateTime, Utc};
use cm_core::ports::{ClockPort, IdentityPort, RecipeRepositoryError, RecipeRepositoryPort};
use cm_core::{DocId, Recipe, SavedRecipeDocument};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, info_span, warn, Instrument};

#[derive(Debug, Error)]
pub enum RecipeCollectionError {
    #[error("failed to save recipe: {0}")]
    Save(#[source] RecipeRepositoryError),

    #[error("failed to remove recipe: {0}")]
    Remove(#[source] RecipeRepositoryError),

    #[error("failed to load saved recipes: {0}")]
    Load(#[source] RecipeRepositoryError),
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(DocId),
    /// Nobody is signed in; nothing was written.
    SignInRequired,
}

/// The user's saved recipes, as last seen in the document store.
///
/// The store is the system of record. This type only keeps the last good
/// snapshot for the current identity; a failed call never touches it.
pub struct RecipeCollection {
    repo: Arc<dyn RecipeRepositoryPort>,
    identity: Arc<dyn IdentityPort>,
    clock: Arc<dyn ClockPort>,
    saved: RwLock<Vec<Recipe>>,
}

impl RecipeCollection {
    pub fn new(
        repo: Arc<dyn RecipeRepositoryPort>,
        identity: Arc<dyn IdentityPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            repo,
            identity,
            clock,
            saved: RwLock::new(Vec::new()),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_else(Utc::now)
    }

    /// Persist `recipe` for the signed-in user.
    pub async fn save(&self, recipe: &Recipe) -> Result<SaveOutcome, RecipeCollectionError> {
        let span = info_span!("recipes.save", recipe_id = %recipe.id);

        async {
            let Some(identity) = self.identity.current() else {
                warn!("save requested without a signed-in user");
                return Ok(SaveOutcome::SignInRequired);
            };

            let doc_id = self
                .repo
                .create(&identity.user_id, &recipe.without_doc_id(), self.now())
                .await
                .map_err(RecipeCollectionError::Save)?;
            info!(doc_id = %doc_id, "recipe saved");

            self.refresh_after_write().await;
            Ok(SaveOutcome::Saved(doc_id))
        }
        .instrument(span)
        .await
    }

    /// Delete a saved recipe by its document id.
    pub async fn remove(&self, doc_id: &DocId) -> Result<(), RecipeCollectionError> {
        let span = info_span!("recipes.remove", doc_id = %doc_id);

        async {
            self.repo
                .delete(doc_id)
                .await
                .map_err(RecipeCollectionError::Remove)?;
            info!("recipe removed");

            self.refresh_after_write().await;
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Saved recipes in the store's order.
    pub async fn list(&self) -> Vec<Recipe> {
        self.saved.read().await.clone()
    }

    /// Re-query the store for the current identity.
    ///
    /// Without an identity the list is cleared.
    pub async fn refresh(&self) -> Result<(), RecipeCollectionError> {
        let Some(identity) = self.identity.current() else {
            self.clear().await;
            return Ok(());
        };

        let docs = self
            .repo
            .list_by_owner(&identity.user_id)
            .await
            .map_err(RecipeCollectionError::Load)?;
        self.apply_snapshot(docs).await;
        Ok(())
    }

    async fn refresh_after_write(&self) {
        // The write went through; a failed re-query only leaves the old view.
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "refresh after write failed, keeping last known list");
        }
    }

    pub(crate) async fn apply_snapshot(&self, docs: Vec<SavedRecipeDocument>) -> usize {
        let recipes: Vec<Recipe> = docs.iter().map(SavedRecipeDocument::to_recipe).collect();
        let count = recipes.len();
        *self.saved.write().await = recipes;
        count
    }

    pub(crate) async fn clear(&self) {
        self.saved.write().await.clear();
    }
}
