//! Runtime configuration read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api_connection::endpoints::{DEFAULT_RECIPE_MODEL, OPENROUTER_CHAT_URL};
use crate::recipe::DEFAULT_BASE_SERVINGS;
use crate::units::ConversionPolicy;

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
const MODEL_VAR: &str = "RECIPE_MODEL";
const ENDPOINT_VAR: &str = "OPENROUTER_ENDPOINT";
const STORE_PATH_VAR: &str = "SHOPPING_LIST_PATH";
const BASE_SERVINGS_VAR: &str = "DEFAULT_BASE_SERVINGS";
const FOLD_SPOONS_VAR: &str = "FOLD_SPOON_MEASURES";
const FOLD_IMPERIAL_VAR: &str = "FOLD_IMPERIAL_WEIGHTS";
const SITE_URL_VAR: &str = "SITE_URL";
const APP_NAME_VAR: &str = "APP_NAME";

const DEFAULT_STORE_PATH: &str = "shopping_list.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key_env_var: String,
    pub api_endpoint: String,
    pub model: String,
    pub store_path: PathBuf,
    pub default_base_servings: u32,
    pub conversion: ConversionPolicy,
    pub site_url: String,
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            api_endpoint: OPENROUTER_CHAT_URL.to_string(),
            model: DEFAULT_RECIPE_MODEL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            default_base_servings: DEFAULT_BASE_SERVINGS,
            conversion: ConversionPolicy::default(),
            site_url: "http://localhost:3000".to_string(),
            app_name: "RecipeCart".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then overlay environment variables on the defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(model) = lookup(MODEL_VAR) {
            config.model = model;
        }
        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            config.api_endpoint = endpoint;
        }
        if let Some(path) = lookup(STORE_PATH_VAR) {
            config.store_path = PathBuf::from(path);
        }
        if let Some(servings) = lookup(BASE_SERVINGS_VAR) {
            let parsed: u32 = servings.trim().parse().with_context(|| {
                format!("{BASE_SERVINGS_VAR} must be a positive integer, got '{servings}'")
            })?;
            if parsed == 0 {
                anyhow::bail!("{BASE_SERVINGS_VAR} must be a positive integer, got 0");
            }
            config.default_base_servings = parsed;
        }
        if let Some(flag) = lookup(FOLD_SPOONS_VAR) {
            config.conversion.fold_spoon_measures = parse_flag(FOLD_SPOONS_VAR, &flag)?;
        }
        if let Some(flag) = lookup(FOLD_IMPERIAL_VAR) {
            config.conversion.fold_imperial_weights = parse_flag(FOLD_IMPERIAL_VAR, &flag)?;
        }
        if let Some(site_url) = lookup(SITE_URL_VAR) {
            config.site_url = site_url;
        }
        if let Some(app_name) = lookup(APP_NAME_VAR) {
            config.app_name = app_name;
        }
        Ok(config)
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{var} must be true or false, got '{other}'"),
    }
}
