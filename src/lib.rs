pub mod api_connection;
pub mod cli;
pub mod config;
pub mod export;
pub mod ingredient_parser;
pub mod recipe;
pub mod recipe_generator;
pub mod shopping_aggregator;
pub mod shopping_list;
pub mod store;
pub mod units;
