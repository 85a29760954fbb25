//! Selection projection: which ingredients are "in use".
//!
//! An ingredient is in use iff it was entered manually, or it came from an
//! image and is currently selected. The projection feeds both the
//! generation request and the preferences summary.

use crate::ingredient::Ingredient;

/// Flow steps a user can be sent back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Input,
    Ingredients,
    Preferences,
    Recipes,
    Saved,
}

/// In-use ingredients, in list order.
pub fn in_use(ingredients: &[Ingredient]) -> Vec<&Ingredient> {
    ingredients.iter().filter(|i| i.is_in_use()).collect()
}

/// Names of in-use ingredients, in list order.
pub fn in_use_names(ingredients: &[Ingredient]) -> Vec<String> {
    ingredients
        .iter()
        .filter(|i| i.is_in_use())
        .map(|i| i.name.clone())
        .collect()
}

/// Whether the current list can be submitted for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReadiness {
    Ready(Vec<String>),
    /// Nothing was entered or detected yet.
    NoIngredients,
    /// Only image ingredients exist and all of them are deselected.
    AllImageIngredientsDeselected,
}

impl SubmitReadiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, SubmitReadiness::Ready(_))
    }

    /// Where to send the user when there is nothing to submit.
    pub fn redirect(&self) -> Option<Step> {
        match self {
            SubmitReadiness::Ready(_) => None,
            SubmitReadiness::NoIngredients => Some(Step::Input),
            SubmitReadiness::AllImageIngredientsDeselected => Some(Step::Ingredients),
        }
    }
}

pub fn submit_readiness(ingredients: &[Ingredient]) -> SubmitReadiness {
    if ingredients.is_empty() {
        return SubmitReadiness::NoIngredients;
    }
    let names = in_use_names(ingredients);
    if names.is_empty() {
        // Manual ingredients are always in use, so only deselected image
        // ingredients can be left here.
        SubmitReadiness::AllImageIngredientsDeselected
    } else {
        SubmitReadiness::Ready(names)
    }
}
