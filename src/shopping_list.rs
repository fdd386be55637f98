use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::info;

use crate::recipe::{Recipe, RecipeError};
use crate::store::{get_json, set_json, KeyValueStore, StoreError, SHOPPING_LIST_KEY};

/// Provenance label for items entered by hand rather than from a recipe.
pub const MANUALLY_ADDED: &str = "Manually Added";

#[derive(Debug, Error)]
pub enum ShoppingListError {
    #[error("item name must not be empty")]
    EmptyName,
    #[error("quantity must be a positive number, got {0}")]
    InvalidQuantity(f64),
    #[error("no shopping list item with id {0}")]
    UnknownItem(u64),
    #[error(transparent)]
    Recipe(#[from] RecipeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    /// 0 until the list assigns one.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_title: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Number(u64),
    Text(String),
}

/// Ids written by other clients may be strings such as "manual-1700000000";
/// anything that is not a plain number reads as unassigned.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match Option::<StoredId>::deserialize(deserializer)? {
        Some(StoredId::Number(id)) => id,
        Some(StoredId::Text(text)) => text.trim().parse().unwrap_or(0),
        None => 0,
    })
}

impl ShoppingListItem {
    /// Provenance used for filtering; items without a recipe are "Manually Added".
    pub fn source(&self) -> &str {
        self.recipe_title.as_deref().unwrap_or(MANUALLY_ADDED)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShoppingList {
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn new(items: Vec<ShoppingListItem>) -> Self {
        Self { items }
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let items = get_json(store, SHOPPING_LIST_KEY)?.unwrap_or_default();
        let mut list = Self { items };
        list.assign_missing_ids();
        Ok(list)
    }

    /// Give unassigned or repeated ids fresh values, keeping the first holder.
    fn assign_missing_ids(&mut self) {
        let mut next = self.next_id();
        let mut seen = std::collections::HashSet::new();
        for item in self.items.iter_mut() {
            if item.id == 0 || !seen.insert(item.id) {
                item.id = next;
                next += 1;
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        set_json(store, SHOPPING_LIST_KEY, &self.items)
    }

    fn next_id(&self) -> u64 {
        self.items.iter().map(|i| i.id).max().map_or(1, |id| id + 1)
    }

    /// One item per ingredient, scaled to `servings`.
    pub fn add_recipe(&mut self, recipe: &Recipe, servings: u32) -> Result<usize, ShoppingListError> {
        let ingredients = recipe.scaled_ingredients(servings)?;
        let mut id = self.next_id();
        for ingredient in &ingredients {
            self.items.push(ShoppingListItem {
                id,
                name: ingredient.name.clone(),
                quantity: ingredient.quantity,
                unit: ingredient.unit.clone(),
                recipe_title: Some(recipe.title.clone()),
                checked: false,
            });
            id += 1;
        }
        info!(recipe = %recipe.title, servings, added = ingredients.len(), "recipe added to shopping list");
        Ok(ingredients.len())
    }

    pub fn add_manual(
        &mut self,
        name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<&ShoppingListItem, ShoppingListError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShoppingListError::EmptyName);
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(ShoppingListError::InvalidQuantity(quantity));
        }
        let id = self.next_id();
        self.items.push(ShoppingListItem {
            id,
            name: name.to_string(),
            quantity,
            unit: unit.trim().to_string(),
            recipe_title: Some(MANUALLY_ADDED.to_string()),
            checked: false,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    fn item_mut(&mut self, id: u64) -> Result<&mut ShoppingListItem, ShoppingListError> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(ShoppingListError::UnknownItem(id))
    }

    /// Flip the checked flag, returning its new value.
    pub fn toggle_checked(&mut self, id: u64) -> Result<bool, ShoppingListError> {
        let item = self.item_mut(id)?;
        item.checked = !item.checked;
        Ok(item.checked)
    }

    pub fn set_quantity(&mut self, id: u64, quantity: f64) -> Result<(), ShoppingListError> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(ShoppingListError::InvalidQuantity(quantity));
        }
        self.item_mut(id)?.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, id: u64) -> Result<ShoppingListItem, ShoppingListError> {
        let idx = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(ShoppingListError::UnknownItem(id))?;
        Ok(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Distinct provenance labels in first-seen order.
    pub fn sources(&self) -> Vec<String> {
        unique_sources(&self.items)
    }
}

pub fn unique_sources(items: &[ShoppingListItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.iter().any(|s| s == item.source()) {
            seen.push(item.source().to_string());
        }
    }
    seen
}

/// Keep only items whose provenance is in `selected`.
pub fn filter_by_sources<'a, T: AsRef<str>>(
    items: &'a [ShoppingListItem],
    selected: &[T],
) -> Vec<&'a ShoppingListItem> {
    items
        .iter()
        .filter(|item| selected.iter().any(|s| s.as_ref() == item.source()))
        .collect()
}
