//! Ingredient domain model.
//!
//! An ingredient is either typed in by the user (`Manual`) or produced by the
//! image recognition pass (`FromImage`). Only image ingredients carry an
//! explicit opt-out; manual ingredients are always in use.

use serde::{Deserialize, Serialize};

use crate::ids::IngredientId;

/// Nutrient breakdown (per 100g) reported by the recognition service.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrients {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

/// Where an ingredient came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientOrigin {
    /// Entered by hand. Always counted as in use.
    Manual,
    /// Detected on an uploaded photo. In use only while `selected`.
    FromImage { selected: bool },
}

/// A candidate ingredient in the current session.
///
/// The wire shape is the flat record used by the frontend and backend
/// (`id`, `name`, `nutrients?`, `selected?`, `fromImage?`); see
/// [`IngredientRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IngredientRecord", into = "IngredientRecord")]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub nutrients: Option<Nutrients>,
    pub origin: IngredientOrigin,
}

impl Ingredient {
    /// Build a manual ingredient from user input.
    ///
    /// Returns `None` when the input is empty after trimming.
    pub fn manual(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: IngredientId::generate(),
            name: name.to_string(),
            nutrients: None,
            origin: IngredientOrigin::Manual,
        })
    }

    /// Build an image-derived ingredient from a recognition record.
    ///
    /// Returns `None` when the recognized name is blank.
    pub fn from_recognized(record: RecognizedIngredient) -> Option<Self> {
        let name = record.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: IngredientId::generate(),
            name: name.to_string(),
            nutrients: record.nutrients,
            origin: IngredientOrigin::FromImage {
                selected: record.selected.unwrap_or(false),
            },
        })
    }

    pub fn is_from_image(&self) -> bool {
        matches!(self.origin, IngredientOrigin::FromImage { .. })
    }

    /// Whether this ingredient counts toward a generation request.
    pub fn is_in_use(&self) -> bool {
        match self.origin {
            IngredientOrigin::Manual => true,
            IngredientOrigin::FromImage { selected } => selected,
        }
    }

    /// Flip the selection of an image ingredient.
    ///
    /// Returns `false` (and changes nothing) for manual ingredients.
    pub fn toggle_selected(&mut self) -> bool {
        match &mut self.origin {
            IngredientOrigin::Manual => false,
            IngredientOrigin::FromImage { selected } => {
                *selected = !*selected;
                true
            }
        }
    }
}

/// One entry of an image recognition response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedIngredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrients: Option<Nutrients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl RecognizedIngredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nutrients: None,
            selected: None,
        }
    }
}

/// Flat wire representation of an [`Ingredient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRecord {
    pub id: IngredientId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrients: Option<Nutrients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_image: Option<bool>,
}

impl From<IngredientRecord> for Ingredient {
    fn from(record: IngredientRecord) -> Self {
        // A `selected` flag without `fromImage` has no meaning and is dropped.
        let origin = if record.from_image.unwrap_or(false) {
            IngredientOrigin::FromImage {
                selected: record.selected.unwrap_or(false),
            }
        } else {
            IngredientOrigin::Manual
        };
        Self {
            id: record.id,
            name: record.name,
            nutrients: record.nutrients,
            origin,
        }
    }
}

impl From<Ingredient> for IngredientRecord {
    fn from(ingredient: Ingredient) -> Self {
        let (selected, from_image) = match ingredient.origin {
            IngredientOrigin::Manual => (None, None),
            IngredientOrigin::FromImage { selected } => (Some(selected), Some(true)),
        };
        Self {
            id: ingredient.id,
            name: ingredient.name,
            nutrients: ingredient.nutrients,
            selected,
            from_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_rejects_blank_names() {
        assert!(Ingredient::manual("").is_none());
        assert!(Ingredient::manual("   \t\n").is_none());
    }

    #[test]
    fn manual_trims_name() {
        let ing = Ingredient::manual("  egg ").unwrap();
        assert_eq!(ing.name, "egg");
        assert_eq!(ing.origin, IngredientOrigin::Manual);
        assert!(ing.is_in_use());
    }

    #[test]
    fn recognized_ingredients_start_deselected() {
        let ing = Ingredient::from_recognized(RecognizedIngredient::named("tomato")).unwrap();
        assert_eq!(ing.origin, IngredientOrigin::FromImage { selected: false });
        assert!(!ing.is_in_use());
    }

    #[test]
    fn toggle_is_refused_for_manual_ingredients() {
        let mut ing = Ingredient::manual("rice").unwrap();
        assert!(!ing.toggle_selected());
        assert_eq!(ing.origin, IngredientOrigin::Manual);
    }

    #[test]
    fn wire_record_without_from_image_is_manual_even_if_deselected() {
        let json = r#"{"id":"1","name":"egg","selected":false}"#;
        let ing: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ing.origin, IngredientOrigin::Manual);
        assert!(ing.is_in_use());
    }

    #[test]
    fn wire_record_keeps_image_selection() {
        let json = r#"{"id":"2","name":"carrot","fromImage":true,"selected":true,
                      "nutrients":{"calories":41,"protein":0.9,"carbs":9.6,"fat":0.2}}"#;
        let ing: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ing.origin, IngredientOrigin::FromImage { selected: true });
        assert_eq!(ing.nutrients.unwrap().calories, 41.0);

        let value = serde_json::to_value(&ing).unwrap();
        assert_eq!(value["fromImage"], true);
        assert_eq!(value["selected"], true);
    }

    #[test]
    fn manual_ingredient_serializes_without_flags() {
        let ing = Ingredient::manual("egg").unwrap();
        let value = serde_json::to_value(&ing).unwrap();
        assert!(value.get("fromImage").is_none());
        assert!(value.get("selected").is_none());
    }
}
