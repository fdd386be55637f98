//! Consolidates shopping list items from many recipes into one list.
//!
//! Items are grouped by trimmed, lowercased name plus base unit, summed in
//! base-unit terms, then re-expressed in a display unit (g/kg, ml/L, or the
//! base unit itself). Nothing here fails: unknown units become their own
//! group.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shopping_list::{filter_by_sources, ShoppingListItem};
use crate::units::{to_base, to_display, ConversionPolicy};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedItem {
    /// `lowercase(trim(name)) + "-" + base unit`
    pub key: String,
    pub name: String,
    pub total_quantity: f64,
    pub unit: String,
    pub checked: bool,
}

struct Group {
    name: String,
    base_unit: String,
    amounts: Vec<f64>,
}

impl Group {
    /// Summed in ascending order so the total does not depend on input order.
    fn total(&mut self) -> f64 {
        self.amounts.sort_by(f64::total_cmp);
        self.amounts.iter().sum()
    }
}

pub fn aggregation_key(name: &str, base_unit: &str) -> String {
    format!("{}-{}", name.trim().to_lowercase(), base_unit)
}

/// Group, sum and convert for display. Output is sorted by name.
pub fn aggregate<'a, I>(items: I, policy: ConversionPolicy) -> Vec<AggregatedItem>
where
    I: IntoIterator<Item = &'a ShoppingListItem>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for item in items {
        let base = to_base(item.quantity, &item.unit, policy);
        let key = aggregation_key(&item.name, &base.base_unit);
        match groups.get_mut(&key) {
            Some(group) => group.amounts.push(base.quantity),
            None => {
                order.push(key.clone());
                groups.insert(
                    key,
                    Group {
                        name: item.name.trim().to_string(),
                        base_unit: base.base_unit,
                        amounts: vec![base.quantity],
                    },
                );
            }
        }
    }

    let mut aggregated: Vec<AggregatedItem> = order
        .into_iter()
        .filter_map(|key| {
            let mut group = groups.remove(&key)?;
            let (total_quantity, unit) = to_display(group.total(), &group.base_unit);
            Some(AggregatedItem {
                key,
                name: group.name,
                total_quantity,
                unit,
                checked: false,
            })
        })
        .collect();

    aggregated.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.key.cmp(&b.key))
    });
    debug!(groups = aggregated.len(), "shopping list aggregated");
    aggregated
}

/// Restrict to the selected sources first, then aggregate.
pub fn aggregate_sources<T: AsRef<str>>(
    items: &[ShoppingListItem],
    selected: &[T],
    policy: ConversionPolicy,
) -> Vec<AggregatedItem> {
    aggregate(filter_by_sources(items, selected), policy)
}

/// Carry `checked` over from an earlier projection for keys that survive.
pub fn retain_checked(previous: &[AggregatedItem], next: &mut [AggregatedItem]) {
    for item in next.iter_mut() {
        if let Some(prev) = previous.iter().find(|p| p.key == item.key) {
            item.checked = prev.checked;
        }
    }
}

/// Aggregate and mark a group checked once every item in it is checked.
pub fn aggregate_with_checked(items: &[&ShoppingListItem], policy: ConversionPolicy) -> Vec<AggregatedItem> {
    let mut aggregated = aggregate(items.iter().copied(), policy);
    let mut done = aggregate(items.iter().copied().filter(|i| i.checked), policy);
    for item in done.iter_mut() {
        item.checked = true;
    }
    retain_checked(&done, &mut aggregated);
    let pending = aggregate(items.iter().copied().filter(|i| !i.checked), policy);
    for item in aggregated.iter_mut() {
        if pending.iter().any(|p| p.key == item.key) {
            item.checked = false;
        }
    }
    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopping_list::MANUALLY_ADDED;

    fn item(name: &str, quantity: f64, unit: &str) -> ShoppingListItem {
        ShoppingListItem {
            id: 0,
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            recipe_title: None,
            checked: false,
        }
    }

    #[test]
    fn test_grams_and_kilograms_merge() {
        let items = vec![item("Flour", 500.0, "g"), item("flour", 1.0, "kg")];
        let result = aggregate(&items, ConversionPolicy::default());
        assert_eq!(
            result,
            vec![AggregatedItem {
                key: "flour-gram".to_string(),
                name: "Flour".to_string(),
                total_quantity: 1.5,
                unit: "kg".to_string(),
                checked: false,
            }]
        );
    }

    #[test]
    fn test_cups_fold_into_milliliters() {
        let items = vec![item("Milk", 1.0, "cup"), item("Milk", 250.0, "ml")];
        let result = aggregate(&items, ConversionPolicy::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_quantity, 490.0);
        assert_eq!(result[0].unit, "ml");
    }

    #[test]
    fn test_strict_policy_keeps_cups_apart() {
        let items = vec![item("Milk", 1.0, "cup"), item("Milk", 250.0, "ml")];
        let result = aggregate(&items, ConversionPolicy::strict());
        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|r| r.key == "milk-cup" && r.unit == "cup"));
    }

    #[test]
    fn test_unmapped_units_stay_separate() {
        let items = vec![item("Egg", 2.0, "piece"), item("Egg", 1.0, "dozen")];
        let result = aggregate(&items, ConversionPolicy::default());
        assert_eq!(result.len(), 2);
        let keys: Vec<&str> = result.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["egg-dozen", "egg-piece"]);
    }

    #[test]
    fn test_boundary_at_one_thousand() {
        let exact = aggregate(&[item("Sugar", 600.0, "g"), item("sugar", 400.0, "g")], ConversionPolicy::default());
        assert_eq!((exact[0].total_quantity, exact[0].unit.as_str()), (1.0, "kg"));

        let below = aggregate(&[item("Sugar", 999.99, "g")], ConversionPolicy::default());
        assert_eq!((below[0].total_quantity, below[0].unit.as_str()), (999.99, "g"));
    }

    #[test]
    fn test_special_and_unitless_groups() {
        let items = vec![
            item("Salt to taste", 0.0, "special"),
            item("eggs", 2.0, ""),
            item("Eggs ", 3.0, ""),
        ];
        let result = aggregate(&items, ConversionPolicy::default());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].key, "eggs-unit");
        assert_eq!(result[0].total_quantity, 5.0);
        assert_eq!(result[0].name, "eggs");
        assert_eq!(result[1].unit, "special");
        assert_eq!(result[1].total_quantity, 0.0);
    }

    #[test]
    fn test_filter_applies_before_grouping() {
        let mut bread = item("Flour", 300.0, "g");
        bread.recipe_title = Some("Bread".to_string());
        let mut cake = item("Flour", 900.0, "g");
        cake.recipe_title = Some("Cake".to_string());
        let manual = item("flour", 100.0, "g");
        let items = vec![bread, cake, manual];

        let result = aggregate_sources(&items, &["Bread", MANUALLY_ADDED], ConversionPolicy::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_quantity, 400.0);
        assert_eq!(result[0].unit, "g");
    }

    #[test]
    fn test_retain_checked_by_key() {
        let items = vec![item("Flour", 500.0, "g"), item("Milk", 1.0, "l")];
        let mut previous = aggregate(&items, ConversionPolicy::default());
        previous[0].checked = true;

        let mut next = aggregate(&items[..1], ConversionPolicy::default());
        retain_checked(&previous, &mut next);
        assert!(next[0].checked);
    }

    #[test]
    fn test_group_checked_only_when_every_item_is() {
        let mut salt = item("Salt", 1.0, "tsp");
        salt.checked = true;
        let mut flour_a = item("Flour", 200.0, "g");
        flour_a.checked = true;
        let flour_b = item("Flour", 300.0, "g");
        let items = vec![&salt, &flour_a, &flour_b];
        let result = aggregate_with_checked(&items, ConversionPolicy::default());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Flour");
        assert!(!result[0].checked);
        assert_eq!(result[0].total_quantity, 500.0);
        assert!(result[1].checked);
    }

    #[test]
    fn test_fractional_imperial_totals_ignore_order() {
        let forward = vec![
            item("Butter", 1.52, "mg"),
            item("Butter", 0.24, "oz"),
            item("Butter", 1.3, "lb"),
        ];
        let backward: Vec<ShoppingListItem> = forward.iter().rev().cloned().collect();
        let a = aggregate(&forward, ConversionPolicy::default());
        let b = aggregate(&backward, ConversionPolicy::default());
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].unit, "g");
        assert_eq!(a[0].total_quantity, b[0].total_quantity);
    }

    #[test]
    fn test_milliliters_reaching_one_thousand_show_as_liters() {
        let items = vec![
            item("Stock", 250.0, "ml"),
            item("stock", 0.5, "l"),
            item("Stock", 250.0, "ml"),
        ];
        let result = aggregate(&items, ConversionPolicy::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].key, "stock-milliliter");
        assert_eq!(result[0].total_quantity, 1.0);
        assert_eq!(result[0].unit, "L");
    }
}
