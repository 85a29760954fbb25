//! Recipes produced by the generation backend and saved by users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DocId, RecipeId, UserId};

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default)]
    pub portion: String,
    #[serde(default)]
    pub unit: String,
}

/// A generated recipe. All display fields are free text from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    /// Set by the persistence layer once the recipe is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub servings: String,
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub additional_ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Display tags such as "Traditional" or "Spicy".
    #[serde(default)]
    pub preference: Vec<String>,
}

impl Recipe {
    pub fn is_saved(&self) -> bool {
        self.doc_id.is_some()
    }

    /// Copy of this recipe without persistence metadata, as it is sent on save.
    pub fn without_doc_id(&self) -> Self {
        Self {
            doc_id: None,
            ..self.clone()
        }
    }
}

/// A recipe as stored in the document store, tagged with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecipeDocument {
    pub doc_id: DocId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub recipe: Recipe,
}

impl SavedRecipeDocument {
    /// The recipe as seen by the UI, carrying its `docId`.
    pub fn to_recipe(&self) -> Recipe {
        Recipe {
            doc_id: Some(self.doc_id.clone()),
            ..self.recipe.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "r1",
        "title": "Tamagoyaki",
        "description": "Rolled omelette",
        "time": "15 min",
        "servings": "2",
        "calories": "180",
        "cuisine": "japanese",
        "ingredients": [{"name": "egg", "portion": "3", "unit": "pcs"}],
        "additionalIngredients": [{"name": "soy sauce", "portion": "1", "unit": "tsp"}],
        "instructions": ["Beat eggs", "Roll"],
        "preference": ["Traditional", "Quick cook"]
    }"#;

    #[test]
    fn parses_backend_shape() {
        let recipe: Recipe = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(recipe.id, RecipeId::from("r1"));
        assert!(!recipe.is_saved());
        assert_eq!(recipe.additional_ingredients[0].unit, "tsp");
        assert_eq!(recipe.preference, vec!["Traditional", "Quick cook"]);
    }

    #[test]
    fn saved_document_exposes_doc_id() {
        let recipe: Recipe = serde_json::from_str(SAMPLE).unwrap();
        let doc = SavedRecipeDocument {
            doc_id: DocId::from("d1"),
            user_id: UserId::from("u1"),
            created_at: Utc::now(),
            recipe,
        };
        let shown = doc.to_recipe();
        assert!(shown.is_saved());
        assert_eq!(shown.doc_id, Some(DocId::from("d1")));
        assert!(!shown.without_doc_id().is_saved());
    }
}
