//! Plain-text output for the command line.

use std::fmt::Write;

use cm_core::{Ingredient, Nutrients, Preferences, Recipe, RecipeIngredient, SubmitReadiness};

pub const NO_FOOD_DETECTED: &str = "No food detected in the image.";
pub const SIGN_IN_REQUIRED: &str = "Sign in to save recipes (pass --user ID).";

fn nutrients_line(n: &Nutrients) -> String {
    format!(
        "{:.0} kcal, protein {:.1}g, carbs {:.1}g, fat {:.1}g (per 100g)",
        n.calories, n.protein, n.carbs, n.fat
    )
}

/// One line per ingredient: `[x]` in use, `[ ]` deselected image item.
pub fn ingredients(items: &[Ingredient]) -> String {
    let mut out = String::new();
    for item in items {
        let mark = if item.is_in_use() { "x" } else { " " };
        let source = if item.is_from_image() { "photo" } else { "typed" };
        let _ = write!(out, "[{mark}] {} ({source})", item.name);
        if let Some(n) = &item.nutrients {
            let _ = write!(out, ": {}", nutrients_line(n));
        }
        out.push('\n');
    }
    out
}

pub fn preferences(prefs: &Preferences) -> String {
    let mut switches = Vec::new();
    if prefs.traditional {
        switches.push("traditional");
    }
    if prefs.quick_cook {
        switches.push("quick");
    }
    if prefs.beginner {
        switches.push("beginner");
    }
    if prefs.microwave_only {
        switches.push("microwave only");
    }
    let switches = if switches.is_empty() {
        "none".to_string()
    } else {
        switches.join(", ")
    };
    format!(
        "Cuisine: {} | Spice: {} ({}) | Options: {switches}\n",
        prefs.effective_cuisine(),
        prefs.spice_level.value(),
        prefs.spice_level.tier().label(),
    )
}

fn ingredient_line(out: &mut String, item: &RecipeIngredient) {
    let amount = [item.portion.trim(), item.unit.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if amount.is_empty() {
        let _ = writeln!(out, "    - {}", item.name);
    } else {
        let _ = writeln!(out, "    - {} {}", amount, item.name);
    }
}

/// Full recipe cards, numbered from 1.
pub fn recipes(list: &[Recipe]) -> String {
    let mut out = String::new();
    for (i, recipe) in list.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, recipe.title);
        if let Some(doc_id) = &recipe.doc_id {
            let _ = writeln!(out, "   saved as {doc_id}");
        }
        if !recipe.description.is_empty() {
            let _ = writeln!(out, "   {}", recipe.description);
        }
        let facts = [
            ("time", &recipe.time),
            ("servings", &recipe.servings),
            ("calories", &recipe.calories),
            ("cuisine", &recipe.cuisine),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>();
        if !facts.is_empty() {
            let _ = writeln!(out, "   {}", facts.join(" | "));
        }
        if !recipe.preference.is_empty() {
            let _ = writeln!(out, "   tags: {}", recipe.preference.join(", "));
        }
        if !recipe.ingredients.is_empty() {
            out.push_str("   Ingredients:\n");
            recipe.ingredients.iter().for_each(|item| ingredient_line(&mut out, item));
        }
        if !recipe.additional_ingredients.is_empty() {
            out.push_str("   You will also need:\n");
            recipe
                .additional_ingredients
                .iter()
                .for_each(|item| ingredient_line(&mut out, item));
        }
        if !recipe.instructions.is_empty() {
            out.push_str("   Steps:\n");
            for (n, step) in recipe.instructions.iter().enumerate() {
                let _ = writeln!(out, "    {}. {step}", n + 1);
            }
        }
        out.push('\n');
    }
    out
}

/// Short listing of saved recipes with their document ids.
pub fn saved(list: &[Recipe]) -> String {
    if list.is_empty() {
        return "No saved recipes.\n".to_string();
    }
    let mut out = String::new();
    for recipe in list {
        let doc_id = recipe.doc_id.as_ref().map(|d| d.as_str()).unwrap_or("-");
        let _ = writeln!(out, "{doc_id}  {}", recipe.title);
    }
    out
}

/// Why a generation request was not sent.
pub fn not_ready(readiness: &SubmitReadiness) -> &'static str {
    match readiness {
        SubmitReadiness::Ready(_) => "",
        SubmitReadiness::NoIngredients => {
            "No ingredients. Add some with --ingredient or --image."
        }
        SubmitReadiness::AllImageIngredientsDeselected => {
            "All photo ingredients are deselected. Pick some with --keep."
        }
    }
}
