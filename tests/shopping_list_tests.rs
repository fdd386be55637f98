use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use recipe_cart::recipe::{Favorites, GeneratedRecipe, Recipe};
use recipe_cart::shopping_aggregator::{aggregate, aggregate_sources};
use recipe_cart::shopping_list::{ShoppingList, MANUALLY_ADDED};
use recipe_cart::store::JsonFileStore;
use recipe_cart::units::ConversionPolicy;
use tempfile::tempdir;

fn generated(title: &str, ingredients: &[&str], servings: u32) -> GeneratedRecipe {
    GeneratedRecipe {
        title: title.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        instructions: "Mix and cook.".to_string(),
        servings: Some(servings),
    }
}

fn pancakes() -> Recipe {
    Recipe::from_generated(
        generated(
            "Pancakes",
            &["1 cup milk", "200 g flour", "2 eggs", "salt to taste"],
            2,
        ),
        2,
    )
}

fn bread() -> Recipe {
    Recipe::from_generated(
        generated("Bread", &["500 ml milk", "1 kg flour", "1 tsp salt"], 1),
        2,
    )
}

fn summary(items: &[recipe_cart::shopping_aggregator::AggregatedItem]) -> Vec<(String, f64, String)> {
    items
        .iter()
        .map(|i| (i.key.clone(), i.total_quantity, i.unit.clone()))
        .collect()
}

#[test]
fn test_recipes_to_consolidated_list_through_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cart.json");

    {
        let mut store = JsonFileStore::new(&path);
        let mut list = ShoppingList::load(&store).unwrap();
        assert_eq!(list.add_recipe(&pancakes(), 4).unwrap(), 4);
        assert_eq!(list.add_recipe(&bread(), 1).unwrap(), 3);
        list.add_manual("Eggs", 2.0, "").unwrap();
        list.save(&mut store).unwrap();
    }

    let store = JsonFileStore::new(&path);
    let list = ShoppingList::load(&store).unwrap();
    assert_eq!(list.items.len(), 8);
    assert_eq!(list.sources(), vec!["Pancakes", "Bread", MANUALLY_ADDED]);

    let aggregated = aggregate(&list.items, ConversionPolicy::default());
    assert_eq!(
        summary(&aggregated),
        vec![
            ("eggs-unit".to_string(), 6.0, "unit".to_string()),
            ("flour-gram".to_string(), 1.4, "kg".to_string()),
            ("milk-milliliter".to_string(), 980.0, "ml".to_string()),
            ("salt-milliliter".to_string(), 5.0, "ml".to_string()),
            ("salt to taste-special".to_string(), 0.0, "special".to_string()),
        ]
    );
    assert_eq!(aggregated[0].name, "eggs");
    assert!(aggregated.iter().all(|i| !i.checked));
}

#[test]
fn test_source_filter_and_strict_policy() {
    let mut list = ShoppingList::default();
    list.add_recipe(&pancakes(), 2).unwrap();
    list.add_recipe(&bread(), 1).unwrap();

    let only_bread = aggregate_sources(&list.items, &["Bread"], ConversionPolicy::default());
    assert_eq!(only_bread.len(), 3);
    assert!(only_bread.iter().any(|i| i.key == "flour-gram" && i.total_quantity == 1.0 && i.unit == "kg"));

    let strict = aggregate(&list.items, ConversionPolicy::strict());
    assert!(strict.iter().any(|i| i.key == "milk-cup" && i.total_quantity == 1.0));
    assert!(strict.iter().any(|i| i.key == "milk-milliliter" && i.total_quantity == 500.0));

    let nothing = aggregate_sources(&list.items, &[MANUALLY_ADDED], ConversionPolicy::default());
    assert!(nothing.is_empty());
}

#[test]
fn test_aggregation_ignores_input_order() {
    let mut list = ShoppingList::default();
    list.add_recipe(&pancakes(), 6).unwrap();
    list.add_recipe(&bread(), 3).unwrap();
    list.add_manual("flour", 250.0, "g").unwrap();
    list.add_manual("milk", 1.5, "l").unwrap();

    let expected = summary(&aggregate(&list.items, ConversionPolicy::default()));
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut shuffled = list.items.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(summary(&aggregate(&shuffled, ConversionPolicy::default())), expected);
    }
}

#[test]
fn test_favorites_persist_beside_shopping_list() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("cart.json"));
    let recipe = pancakes();

    let mut list = ShoppingList::load(&store).unwrap();
    list.add_recipe(&recipe, 2).unwrap();
    list.save(&mut store).unwrap();

    let mut favorites = Favorites::load(&store).unwrap();
    assert!(favorites.toggle(&recipe));
    favorites.save(&mut store).unwrap();

    let favorites = Favorites::load(&store).unwrap();
    assert!(favorites.contains(&recipe.id));
    assert!(favorites.recipes[0].is_favorite);
    assert_eq!(ShoppingList::load(&store).unwrap().items.len(), 4);
}
