use anyhow::{Context, Result};
use recipe_cart::api_connection::Provider;
use recipe_cart::cli::{parse_args, Cli, Command, RecipeTarget};
use recipe_cart::config::AppConfig;
use recipe_cart::export::{render, OutputFormat};
use recipe_cart::ingredient_parser::{parse_ingredients, Ingredient};
use recipe_cart::recipe::{Favorites, GeneratedRecipe, Recipe};
use recipe_cart::recipe_generator::generate_recipe;
use recipe_cart::shopping_aggregator::aggregate_with_checked;
use recipe_cart::shopping_list::{filter_by_sources, ShoppingList, ShoppingListItem};
use recipe_cart::store::JsonFileStore;
use tokio::fs;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(path) = &cli.store {
        config.store_path = path.clone();
    }
    if cli.no_fold_spoons {
        config.conversion.fold_spoon_measures = false;
    }
    if cli.no_fold_imperial {
        config.conversion.fold_imperial_weights = false;
    }
    config
}

fn print_ingredients(ingredients: &[Ingredient]) {
    for ingredient in ingredients {
        println!("  - {}", ingredient);
    }
}

fn print_recipe(recipe: &Recipe) {
    println!("\n{} (serves {})", recipe.title, recipe.servings);
    println!("Ingredients:");
    print_ingredients(&recipe.current_ingredients());
    println!("Instructions:\n{}", recipe.instructions);
}

fn finish_recipe(
    generated: GeneratedRecipe,
    target: &RecipeTarget,
    config: &AppConfig,
    store: &mut JsonFileStore,
) -> Result<()> {
    let mut recipe = Recipe::from_generated(generated, config.default_base_servings);
    if let Some(servings) = target.servings {
        recipe.set_servings(servings)?;
    }
    print_recipe(&recipe);

    if target.add_to_list {
        let mut list = ShoppingList::load(&*store)?;
        let added = list.add_recipe(&recipe, recipe.servings)?;
        list.save(store)?;
        println!("\nAdded {} items to the shopping list.", added);
    }
    if target.favorite {
        let mut favorites = Favorites::load(&*store)?;
        if favorites.contains(&recipe.id) {
            println!("'{}' is already a favourite.", recipe.title);
        } else {
            favorites.toggle(&recipe);
            favorites.save(store)?;
            println!("Saved '{}' to favourites.", recipe.title);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();
    init_tracing(cli.verbose);

    let config = apply_overrides(AppConfig::from_env()?, &cli);
    debug!(?config, "configuration loaded");
    let mut store = JsonFileStore::new(config.store_path.clone());
    let policy = config.conversion;

    match cli.command {
        Command::Parse { lines, file, json } => {
            let mut all_lines = lines;
            if let Some(path) = file {
                let content = fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read ingredient file '{}'", path.display()))?;
                all_lines.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string),
                );
            }
            if all_lines.is_empty() {
                warn!("no ingredient lines given");
                return Ok(());
            }
            let ingredients = parse_ingredients(&all_lines);
            if json {
                println!("{}", serde_json::to_string_pretty(&ingredients)?);
            } else {
                for (line, ingredient) in all_lines.iter().zip(&ingredients) {
                    println!(
                        "{:<45} -> quantity: {}, unit: '{}', name: '{}'",
                        line, ingredient.quantity, ingredient.unit, ingredient.name
                    );
                }
            }
        }
        Command::Import { recipe_file, target } => {
            let content = fs::read_to_string(&recipe_file)
                .await
                .with_context(|| format!("Failed to read recipe file '{}'", recipe_file.display()))?;
            let generated: GeneratedRecipe = serde_json::from_str(&content)
                .with_context(|| format!("'{}' is not a recipe JSON document", recipe_file.display()))?;
            finish_recipe(generated, &target, &config, &mut store)?;
        }
        Command::Generate { prompt, target } => {
            let provider = Provider::from_config(&config);
            info!(model = %config.model, "requesting recipe");
            let generated = generate_recipe(&provider, &prompt, target.servings, &config.model)
                .await
                .context("Failed to generate recipe")?;
            finish_recipe(generated, &target, &config, &mut store)?;
        }
        Command::List { recipes, format } => {
            let list = ShoppingList::load(&store)?;
            let selected: Vec<&ShoppingListItem> = if recipes.is_empty() {
                list.items.iter().collect()
            } else {
                filter_by_sources(&list.items, &recipes)
            };
            let aggregated = aggregate_with_checked(&selected, policy);
            println!("{}", render(&aggregated, format)?);
            if format == OutputFormat::Text && !aggregated.is_empty() {
                let done = aggregated.iter().filter(|i| i.checked).count();
                println!("\n{} of {} items checked.", done, aggregated.len());
            }
        }
        Command::Sources => {
            let list = ShoppingList::load(&store)?;
            let sources = list.sources();
            if sources.is_empty() {
                println!("Your shopping list is empty.");
            }
            for source in sources {
                let count = list.items.iter().filter(|i| i.source() == source).count();
                println!("{} ({} items)", source, count);
            }
        }
        Command::Add { name, quantity, unit } => {
            let mut list = ShoppingList::load(&store)?;
            let item = list.add_manual(&name, quantity, &unit)?;
            println!("Added #{}: {} {} {}", item.id, item.quantity, item.unit, item.name);
            list.save(&mut store)?;
        }
        Command::Check { id } => {
            let mut list = ShoppingList::load(&store)?;
            let checked = list.toggle_checked(id)?;
            list.save(&mut store)?;
            println!("Item #{} is now {}.", id, if checked { "checked" } else { "unchecked" });
        }
        Command::SetQuantity { id, quantity } => {
            let mut list = ShoppingList::load(&store)?;
            list.set_quantity(id, quantity)?;
            list.save(&mut store)?;
            println!("Item #{} quantity set to {}.", id, quantity);
        }
        Command::Remove { id } => {
            let mut list = ShoppingList::load(&store)?;
            let removed = list.remove(id)?;
            list.save(&mut store)?;
            println!("Removed #{}: {}", removed.id, removed.name);
        }
        Command::Clear => {
            let mut list = ShoppingList::load(&store)?;
            let count = list.items.len();
            list.clear();
            list.save(&mut store)?;
            println!("Cleared {} items.", count);
        }
        Command::Favorites => {
            let favorites = Favorites::load(&store)?;
            if favorites.recipes.is_empty() {
                println!("No favourite recipes yet.");
            }
            for recipe in &favorites.recipes {
                println!(
                    "{} (serves {}, {} ingredients)",
                    recipe.title,
                    recipe.servings,
                    recipe.ingredients.len()
                );
            }
        }
    }

    Ok(())
}
