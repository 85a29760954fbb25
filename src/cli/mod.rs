//! `cookmate` command line.
//!
//! Usage:
//! ```bash
//! # Recognize ingredients on a photo
//! cookmate recognize fridge.jpg --lang ja
//!
//! # Generate recipes from typed ingredients and a photo, keeping two items
//! cookmate generate --ingredient rice --image fridge.jpg --keep egg --keep leek --quick
//!
//! # Generate and save the second recipe for a user
//! cookmate generate --ingredient egg --save 2 --user alice
//!
//! # List, then remove, saved recipes
//! cookmate saved --user alice
//! cookmate saved --user alice --remove 0192f1c4-...
//! ```

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use commands::run;

#[derive(Debug, Parser)]
#[command(
    name = "cookmate",
    version,
    about = "Turn a photo of your ingredients into recipes",
    long_about = "Recognize ingredients on a photo, pick the ones to cook with, set preferences and generate recipes. Saved recipes are kept per user."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to $COOKMATE_CONFIG or ./cookmate.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recognize the ingredients on a photo
    Recognize {
        /// Image file (jpeg, png, webp)
        image: PathBuf,

        /// Response language: en, ja or zh (defaults to the configured language)
        #[arg(long)]
        lang: Option<String>,
    },

    /// Generate recipes from ingredients and preferences
    Generate(GenerateArgs),

    /// List or remove a user's saved recipes
    Saved {
        /// User id
        #[arg(long)]
        user: String,

        /// Document id of a saved recipe to remove first
        #[arg(long)]
        remove: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Ingredient typed by hand (repeatable)
    #[arg(long = "ingredient", value_name = "NAME")]
    pub ingredients: Vec<String>,

    /// Photo to recognize ingredients from
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Recognized ingredient to cook with (repeatable, needs --image)
    #[arg(long, value_name = "NAME", requires = "image")]
    pub keep: Vec<String>,

    /// Cuisine: any, italian, chinese, japanese, indian, mexican, french, thai, korean
    #[arg(long)]
    pub cuisine: Option<String>,

    /// Free-text cuisine, overrides --cuisine
    #[arg(long)]
    pub custom_cuisine: Option<String>,

    /// Spice level 0-100
    #[arg(long, allow_negative_numbers = true)]
    pub spice: Option<i64>,

    #[arg(long)]
    pub traditional: bool,

    #[arg(long)]
    pub quick: bool,

    #[arg(long)]
    pub beginner: bool,

    #[arg(long)]
    pub microwave: bool,

    /// Response language: en, ja or zh (defaults to the configured language)
    #[arg(long)]
    pub lang: Option<String>,

    /// Save the recipe at this position (1-based) of the result
    #[arg(long, value_name = "INDEX")]
    pub save: Option<usize>,

    /// User to save for
    #[arg(long, requires = "save")]
    pub user: Option<String>,
}
