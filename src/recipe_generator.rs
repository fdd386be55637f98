use std::collections::HashMap;
use tracing::{debug, info};

use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, JsonSchemaProperty,
    Provider, ResponseFormat,
};
use crate::api_connection::ApiConnectionError;
use crate::recipe::GeneratedRecipe;

const SYSTEM_PROMPT: &str = "/no_thinking
You are an expert recipe generating assistant. Generate a detailed recipe from the user's preferences and prompt.
If the prompt specifies a number of servings, the ingredient quantities and the 'servings' field must match it; otherwise choose a reasonable number (2 to 4) and report it in 'servings'.
Return ONLY a JSON object with these properties:
- \"title\": an appealing title for the recipe.
- \"ingredients\": an array of strings, one ingredient per string, quantity first (e.g. \"1 cup flour\", \"2 large eggs, beaten\", \"salt to taste\").
- \"instructions\": a single string with clear, numbered, step-by-step instructions.
- \"servings\": the number of servings as an integer.
Do not wrap the JSON in markdown.";

fn get_recipe_json_schema() -> JsonSchemaDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "title".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("The title of the recipe.".to_string()),
            items: None,
        },
    );
    properties.insert(
        "ingredients".to_string(),
        JsonSchemaProperty {
            property_type: "array".to_string(),
            description: Some("One ingredient per string, quantity first.".to_string()),
            items: Some(Box::new(JsonSchema::scalar("string"))),
        },
    );
    properties.insert(
        "instructions".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("Step-by-step preparation instructions.".to_string()),
            items: None,
        },
    );
    properties.insert(
        "servings".to_string(),
        JsonSchemaProperty {
            property_type: "integer".to_string(),
            description: Some("Number of servings the quantities are for.".to_string()),
            items: None,
        },
    );

    JsonSchemaDefinition {
        name: "generated_recipe".to_string(),
        strict: Some(true),
        schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec![
                "title".to_string(),
                "ingredients".to_string(),
                "instructions".to_string(),
                "servings".to_string(),
            ]),
            additional_properties: Some(false),
        },
    }
}

/// Build the chat request for a recipe prompt.
pub fn build_request(prompt: &str, servings: Option<u32>, model: &str) -> ChatCompletionRequest {
    let user_prompt = match servings {
        Some(n) => format!("{prompt}\n\nServings: {n}"),
        None => prompt.to_string(),
    };
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
        response_format: Some(ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: Some(get_recipe_json_schema()),
        }),
        temperature: Some(0.7),
        max_tokens: Some(2048),
    }
}

/// Remove a surrounding ```json ... ``` (or bare ```) fence, if any.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

pub fn decode_generated_recipe(content: &str) -> Result<GeneratedRecipe, ApiConnectionError> {
    let body = strip_code_fences(content);
    if body.is_empty() {
        return Err(ApiConnectionError::EmptyResponse(
            "content was empty after removing markdown fences".to_string(),
        ));
    }
    let recipe: GeneratedRecipe = serde_json::from_str(body)?;
    Ok(recipe)
}

pub async fn generate_recipe(
    provider: &Provider,
    prompt: &str,
    servings: Option<u32>,
    model: &str,
) -> Result<GeneratedRecipe, ApiConnectionError> {
    let request = build_request(prompt, servings, model);
    let response = provider.call_chat_completion(request).await?;
    let content = response
        .first_content()
        .ok_or_else(|| ApiConnectionError::EmptyResponse("no choices in response".to_string()))?;
    debug!(content, "raw recipe response");

    let recipe = decode_generated_recipe(content)?;
    info!(title = %recipe.title, ingredients = recipe.ingredients.len(), "recipe generated");
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```"), "```");
    }

    #[test]
    fn test_decode_generated_recipe() {
        let content = "```json
{\"title\": \"Hummus\", \"ingredients\": [\"1 (14oz) can chickpeas, drained\", \"salt to taste\"], \"instructions\": \"Blend.\", \"servings\": 4}
```";
        let recipe = decode_generated_recipe(content).unwrap();
        assert_eq!(recipe.title, "Hummus");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.servings, Some(4));
    }

    #[test]
    fn test_decode_rejects_empty_and_invalid() {
        assert!(matches!(
            decode_generated_recipe("``````"),
            Err(ApiConnectionError::EmptyResponse(_))
        ));
        assert!(matches!(
            decode_generated_recipe("not json"),
            Err(ApiConnectionError::SerializationError(_))
        ));
    }

    #[test]
    fn test_build_request_mentions_servings() {
        let request = build_request("a vegan curry", Some(6), "some/model");
        assert_eq!(request.model, "some/model");
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[1].content.ends_with("Servings: 6"));
        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(payload["response_format"]["type"], "json_schema");
        assert_eq!(
            payload["response_format"]["json_schema"]["schema"]["properties"]["ingredients"]["items"]["type"],
            "string"
        );
    }
}
