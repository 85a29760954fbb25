use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cm_core::ports::{RecipeRepositoryError, RecipeRepositoryPort};
use cm_core::{DocId, Recipe, SavedRecipeDocument, UserId};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use super::subscribers::SubscriberRegistry;
use super::{new_document, owned_by};

/// On-disk layout of the recipe file.
#[derive(Debug, Deserialize)]
struct RecipeFile {
    #[serde(default)]
    documents: Vec<SavedRecipeDocument>,
}

/// Document store backed by a single JSON file.
///
/// The file is read on first use and rewritten atomically after every
/// change. One store instance should own a given path.
pub struct JsonFileRecipeStore {
    path: PathBuf,
    docs: Mutex<Option<Vec<SavedRecipeDocument>>>,
    subscribers: SubscriberRegistry,
}

fn storage_err(err: anyhow::Error) -> RecipeRepositoryError {
    RecipeRepositoryError::Storage(format!("{err:#}"))
}

impl JsonFileRecipeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            docs: Mutex::new(None),
            subscribers: SubscriberRegistry::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Vec<SavedRecipeDocument>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read recipes failed: {}", self.path.display()))
            }
        };
        let file: RecipeFile = serde_json::from_str(&content)
            .with_context(|| format!("parse recipes failed: {}", self.path.display()))?;
        debug!(count = file.documents.len(), "recipe file loaded");
        Ok(file.documents)
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create recipes dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Write to a sibling temp file, then rename over the target.
    async fn atomic_write(&self, documents: &[SavedRecipeDocument]) -> Result<()> {
        self.ensure_parent_dir().await?;

        let content = serde_json::to_string_pretty(&RecipeFileRef { documents })
            .context("serialize recipes failed")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp recipes failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp recipes to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }

    /// Apply `change` to the documents and persist the result.
    ///
    /// The in-memory copy is only replaced once the write succeeded.
    async fn modify<T>(
        &self,
        change: impl FnOnce(&mut Vec<SavedRecipeDocument>) -> Result<T, RecipeRepositoryError>,
    ) -> Result<(T, Vec<SavedRecipeDocument>), RecipeRepositoryError> {
        let mut guard = self.docs.lock().await;
        let mut docs = match guard.as_ref() {
            Some(docs) => docs.clone(),
            None => self.read_file().await.map_err(storage_err)?,
        };
        let out = change(&mut docs)?;
        self.atomic_write(&docs).await.map_err(storage_err)?;
        *guard = Some(docs.clone());
        Ok((out, docs))
    }

    async fn snapshot(&self, owner: &UserId) -> Result<Vec<SavedRecipeDocument>, RecipeRepositoryError> {
        let mut guard = self.docs.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await.map_err(storage_err)?);
        }
        Ok(guard.as_deref().map(|docs| owned_by(docs, owner)).unwrap_or_default())
    }
}

#[derive(Serialize)]
struct RecipeFileRef<'a> {
    documents: &'a [SavedRecipeDocument],
}

#[async_trait]
impl RecipeRepositoryPort for JsonFileRecipeStore {
    async fn create(
        &self,
        owner: &UserId,
        recipe: &Recipe,
        created_at: DateTime<Utc>,
    ) -> Result<DocId, RecipeRepositoryError> {
        let doc = new_document(owner, recipe, created_at);
        let (doc_id, docs) = self
            .modify(move |docs| {
                let id = doc.doc_id.clone();
                docs.push(doc);
                Ok(id)
            })
            .await?;
        info!(doc_id = %doc_id, user_id = %owner, "recipe document written");
        self.subscribers.publish(owner, &owned_by(&docs, owner));
        Ok(doc_id)
    }

    async fn delete(&self, doc_id: &DocId) -> Result<(), RecipeRepositoryError> {
        let (owner, docs) = self
            .modify(|docs| {
                let pos = docs
                    .iter()
                    .position(|d| &d.doc_id == doc_id)
                    .ok_or_else(|| RecipeRepositoryError::NotFound(doc_id.clone()))?;
                Ok(docs.remove(pos).user_id)
            })
            .await?;
        info!(doc_id = %doc_id, "recipe document deleted");
        self.subscribers.publish(&owner, &owned_by(&docs, &owner));
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<SavedRecipeDocument>, RecipeRepositoryError> {
        self.snapshot(owner).await
    }

    async fn subscribe(
        &self,
        owner: &UserId,
    ) -> Result<mpsc::Receiver<Vec<SavedRecipeDocument>>, RecipeRepositoryError> {
        let initial = self.snapshot(owner).await?;
        Ok(self.subscribers.subscribe(owner, initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn recipe(id: &str) -> Recipe {
        serde_json::from_value(serde_json::json!({ "id": id, "title": id })).unwrap()
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileRecipeStore::new(dir.path().join("none.json"));
        assert!(store.list_by_owner(&UserId::from("a")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn documents_survive_a_new_store_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("saved_recipes.json");
        let owner = UserId::from("alice");

        let store = JsonFileRecipeStore::new(&path);
        let first = store.create(&owner, &recipe("r1"), Utc::now()).await.unwrap();
        store.create(&owner, &recipe("r2"), Utc::now()).await.unwrap();
        store.delete(&first).await.unwrap();

        let reopened = JsonFileRecipeStore::new(&path);
        let docs = reopened.list_by_owner(&owner).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].recipe.id.as_str(), "r2");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn file_uses_camel_case_document_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved_recipes.json");
        let store = JsonFileRecipeStore::new(&path);
        store
            .create(&UserId::from("alice"), &recipe("r1"), Utc::now())
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let doc = &raw["documents"][0];
        assert_eq!(doc["userId"], "alice");
        assert!(doc.get("docId").is_some());
        assert!(doc.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved_recipes.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileRecipeStore::new(&path);
        let err = store.list_by_owner(&UserId::from("a")).await.unwrap_err();
        assert!(matches!(err, RecipeRepositoryError::Storage(_)));
    }

    #[tokio::test]
    async fn unusable_path_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("saved_recipes.json");
        std::fs::create_dir(&path).unwrap();
        let store = JsonFileRecipeStore::new(&path);
        let owner = UserId::from("alice");

        let err = store.create(&owner, &recipe("r1"), Utc::now()).await.unwrap_err();
        assert!(matches!(err, RecipeRepositoryError::Storage(_)));
    }

    #[tokio::test]
    async fn subscribers_see_each_write() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileRecipeStore::new(dir.path().join("saved_recipes.json"));
        let owner = UserId::from("alice");

        let mut rx = store.subscribe(&owner).await.unwrap();
        assert!(rx.recv().await.unwrap().is_empty());

        store.create(&owner, &recipe("r1"), Utc::now()).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].user_id, owner);
    }
}
