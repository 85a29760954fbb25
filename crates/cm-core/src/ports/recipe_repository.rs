use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::{
    ids::{DocId, UserId},
    ports::errors::RecipeRepositoryError,
    recipe::{Recipe, SavedRecipeDocument},
};

/// Document store for saved recipes, keyed by owning identity.
#[async_trait]
pub trait RecipeRepositoryPort: Send + Sync {
    /// Store a recipe for `owner` and return the new document id.
    async fn create(
        &self,
        owner: &UserId,
        recipe: &Recipe,
        created_at: DateTime<Utc>,
    ) -> Result<DocId, RecipeRepositoryError>;

    /// Delete by document id.
    async fn delete(&self, doc_id: &DocId) -> Result<(), RecipeRepositoryError>;

    /// All documents of `owner`, in the store's own stable order.
    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SavedRecipeDocument>, RecipeRepositoryError>;

    /// Live snapshots of `owner`'s documents.
    ///
    /// The current snapshot is delivered first; a new one follows every
    /// change. Dropping the receiver ends the subscription.
    async fn subscribe(
        &self,
        owner: &UserId,
    ) -> Result<mpsc::Receiver<Vec<SavedRecipeDocument>>, RecipeRepositoryError>;
}
