use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::export::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse recipe ingredients and build a consolidated shopping list", long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the JSON store holding the shopping list and favourites
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Keep tablespoons, teaspoons and cups out of the milliliter total
    #[arg(long, global = true)]
    pub no_fold_spoons: bool,

    /// Keep ounces and pounds out of the gram total
    #[arg(long, global = true)]
    pub no_fold_imperial: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse free-text ingredient lines
    Parse {
        /// Ingredient lines, e.g. "2 1/2 cups flour"
        lines: Vec<String>,
        /// Read one ingredient per line from this file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Load a generated recipe (JSON with title, ingredients, instructions, servings)
    Import {
        recipe_file: PathBuf,
        #[command(flatten)]
        target: RecipeTarget,
    },
    /// Ask the language model for a new recipe
    Generate {
        /// What to cook, dietary needs, cook time, ...
        prompt: String,
        #[command(flatten)]
        target: RecipeTarget,
    },
    /// Show the aggregated shopping list
    List {
        /// Only include items from these recipes ("Manually Added" for hand-entered items)
        #[arg(short, long = "recipe")]
        recipes: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the recipes contributing to the shopping list
    Sources,
    /// Add an item by hand
    Add {
        name: String,
        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(short, long, default_value = "")]
        unit: String,
    },
    /// Toggle the checked state of an item
    Check { id: u64 },
    /// Change the quantity of an item
    SetQuantity { id: u64, quantity: f64 },
    /// Remove an item
    Remove { id: u64 },
    /// Remove every item from the shopping list
    Clear,
    /// List favourite recipes
    Favorites,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RecipeTarget {
    /// Scale the recipe to this many servings
    #[arg(short, long)]
    pub servings: Option<u32>,
    /// Add the (scaled) ingredients to the shopping list
    #[arg(long)]
    pub add_to_list: bool,
    /// Save the recipe to favourites
    #[arg(long)]
    pub favorite: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
