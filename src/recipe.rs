use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

use crate::ingredient_parser::{parse_ingredients, Ingredient};
use crate::store::{get_json, set_json, KeyValueStore, StoreError, FAVORITES_KEY};
use crate::units::round2;

pub const DEFAULT_BASE_SERVINGS: u32 = 2;
pub const MAX_SERVINGS: u32 = 100;
const UNTITLED: &str = "Untitled Recipe";
/// Smallest amount a scaled, non-special ingredient may round to.
const MIN_SCALED_QUANTITY: f64 = 0.01;

#[derive(Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error("servings must be between 1 and {max}, got {requested}")]
    InvalidServings { requested: u32, max: u32 },
}

/// Recipe as returned by the generative model, before any parsing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratedRecipe {
    #[serde(alias = "recipe_title")]
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(default)]
    pub servings: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    /// Quantities are for `base_servings`.
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub servings: u32,
    pub base_servings: u32,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Recipe {
    pub fn from_generated(generated: GeneratedRecipe, default_base_servings: u32) -> Self {
        let base_servings = generated
            .servings
            .filter(|s| *s > 0)
            .unwrap_or(default_base_servings);
        let title = match generated.title.trim() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };
        let ingredients = parse_ingredients(&generated.ingredients);
        info!(
            title = %title,
            lines = generated.ingredients.len(),
            base_servings,
            "recipe ingredients parsed"
        );
        Self {
            id: new_recipe_id(),
            title,
            ingredients,
            instructions: generated.instructions,
            servings: base_servings,
            base_servings,
            is_favorite: false,
        }
    }

    pub fn set_servings(&mut self, servings: u32) -> Result<(), RecipeError> {
        validate_servings(servings)?;
        self.servings = servings;
        Ok(())
    }

    /// Ingredients scaled from `base_servings` to `servings`, rounded to two
    /// decimals and never below 0.01 unless special. A zero base leaves
    /// quantities untouched.
    pub fn scaled_ingredients(&self, servings: u32) -> Result<Vec<Ingredient>, RecipeError> {
        validate_servings(servings)?;
        if self.base_servings == 0 {
            return Ok(self.ingredients.clone());
        }
        let factor = f64::from(servings) / f64::from(self.base_servings);
        Ok(self
            .ingredients
            .iter()
            .map(|ing| {
                let mut quantity = round2(ing.quantity * factor);
                if !ing.is_special() && quantity < MIN_SCALED_QUANTITY {
                    quantity = MIN_SCALED_QUANTITY;
                }
                Ingredient {
                    quantity,
                    ..ing.clone()
                }
            })
            .collect())
    }

    /// Ingredients at the recipe's current serving count.
    pub fn current_ingredients(&self) -> Vec<Ingredient> {
        self.scaled_ingredients(self.servings)
            .unwrap_or_else(|_| self.ingredients.clone())
    }
}

fn validate_servings(servings: u32) -> Result<(), RecipeError> {
    if servings == 0 || servings > MAX_SERVINGS {
        return Err(RecipeError::InvalidServings {
            requested: servings,
            max: MAX_SERVINGS,
        });
    }
    Ok(())
}

fn new_recipe_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    millis.to_string()
}

/// Favourite recipes, persisted as one JSON array.
#[derive(Debug, Default, Clone)]
pub struct Favorites {
    pub recipes: Vec<Recipe>,
}

impl Favorites {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let recipes = get_json(store, FAVORITES_KEY)?.unwrap_or_default();
        Ok(Self { recipes })
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        set_json(store, FAVORITES_KEY, &self.recipes)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recipes.iter().any(|r| r.id == id)
    }

    /// Add the recipe if absent, remove it if present. Returns the new state.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        if self.contains(&recipe.id) {
            self.recipes.retain(|r| r.id != recipe.id);
            false
        } else {
            self.recipes.push(Recipe {
                is_favorite: true,
                ..recipe.clone()
            });
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn generated() -> GeneratedRecipe {
        GeneratedRecipe {
            title: "Pancakes".to_string(),
            ingredients: vec![
                "2 cups flour".to_string(),
                "3 eggs".to_string(),
                "salt to taste".to_string(),
            ],
            instructions: "Mix and fry.".to_string(),
            servings: Some(4),
        }
    }

    #[test]
    fn test_from_generated_parses_lines() {
        let recipe = Recipe::from_generated(generated(), DEFAULT_BASE_SERVINGS);
        assert_eq!(recipe.base_servings, 4);
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[0].unit, "cups");
        assert!(recipe.ingredients[2].is_special());
    }

    #[test]
    fn test_missing_servings_and_title_use_defaults() {
        let mut g = generated();
        g.servings = None;
        g.title = "  ".to_string();
        let recipe = Recipe::from_generated(g, 2);
        assert_eq!(recipe.base_servings, 2);
        assert_eq!(recipe.title, UNTITLED);
    }

    #[test]
    fn test_scaling_rounds_and_keeps_special_at_zero() {
        let recipe = Recipe::from_generated(generated(), 2);
        let scaled = recipe.scaled_ingredients(6).unwrap();
        assert_eq!(scaled[0].quantity, 3.0);
        assert_eq!(scaled[1].quantity, 4.5);
        assert_eq!(scaled[2].quantity, 0.0);

        let third = recipe.scaled_ingredients(1).unwrap();
        assert_eq!(third[0].quantity, 0.5);
        assert_eq!(third[1].quantity, 0.75);
    }

    #[test]
    fn test_servings_bounds() {
        let mut recipe = Recipe::from_generated(generated(), 2);
        assert!(recipe.scaled_ingredients(0).is_err());
        assert_eq!(
            recipe.set_servings(101),
            Err(RecipeError::InvalidServings {
                requested: 101,
                max: MAX_SERVINGS
            })
        );
        recipe.set_servings(8).unwrap();
        assert_eq!(recipe.current_ingredients()[0].quantity, 4.0);
    }

    #[test]
    fn test_favorites_toggle_and_persist() {
        let mut store = MemoryStore::new();
        let recipe = Recipe::from_generated(generated(), 2);

        let mut favorites = Favorites::load(&store).unwrap();
        assert!(favorites.toggle(&recipe));
        favorites.save(&mut store).unwrap();

        let mut reloaded = Favorites::load(&store).unwrap();
        assert!(reloaded.contains(&recipe.id));
        assert!(reloaded.recipes[0].is_favorite);
        assert!(!reloaded.toggle(&recipe));
        assert!(reloaded.recipes.is_empty());
    }

    #[test]
    fn test_tiny_scaled_amounts_stay_positive() {
        let mut recipe = Recipe::from_generated(generated(), 2);
        recipe.base_servings = 1000;
        let scaled = recipe.scaled_ingredients(1).unwrap();
        assert_eq!(scaled[0].quantity, MIN_SCALED_QUANTITY);
        assert_eq!(scaled[1].quantity, MIN_SCALED_QUANTITY);
        assert_eq!(scaled[2].quantity, 0.0);
        assert!(scaled[2].is_special());
    }
}
