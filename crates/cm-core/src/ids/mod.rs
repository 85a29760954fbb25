//! ID type wrappers for type safety.
//!
//! `RecipeId` comes from the generation backend, `DocId` from the document
//! store once a recipe is saved. They are never interchangeable: deleting a
//! saved recipe always goes through its `DocId`.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

/// Session-local ingredient identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(String);

/// Identifier assigned by the recipe generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

/// Identifier assigned by the persistence layer to a saved recipe document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

/// Owning identity, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl_id!(IngredientId, RecipeId, DocId, UserId);
