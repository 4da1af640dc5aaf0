//! Output schemas for model responses.
//!
//! Every record a model is asked to produce implements [`Schema`], which
//! exposes a JSON Schema description of its shape. The same description is
//! used twice: rendered into the prompt by [`format_instructions`] and
//! enforced on the reply by [`parse`], so the model is validated against
//! exactly what it was told.

use crate::core::{FoodItemWithQuantity, GroceryList, MealPlan, Menu};
use crate::utils::error::{PlannerError, Result};
use jsonschema::error::ValidationErrorKind;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("fenced block pattern is valid")
});

pub trait Schema: Serialize + DeserializeOwned {
    fn json_schema() -> Value;
}

impl Schema for FoodItemWithQuantity {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "description": "food item with quantity",
            "properties": {
                "food": { "type": "string", "minLength": 1, "pattern": "\\S", "description": "food item" },
                "quantity": { "type": "string", "minLength": 1, "pattern": "\\S", "description": "quantity in grams" }
            },
            "required": ["food", "quantity"]
        })
    }
}

impl Schema for Menu {
    fn json_schema() -> Value {
        let descriptions = [
            "Breakfast",
            "Morning snack",
            "Lunch",
            "Afternoon snack",
            "Dinner",
            "Evening snack",
        ];

        let mut properties = serde_json::Map::new();
        for (slot, description) in Menu::MEAL_SLOTS.iter().zip(descriptions) {
            properties.insert(
                slot.to_string(),
                json!({
                    "type": "array",
                    "description": description,
                    "items": FoodItemWithQuantity::json_schema()
                }),
            );
        }

        json!({
            "type": "object",
            "description": "Menu",
            "properties": properties,
            "required": Menu::MEAL_SLOTS
        })
    }
}

impl Schema for GroceryList {
    fn json_schema() -> Value {
        json!({
            "type": "array",
            "description": "Grocery list",
            "items": FoodItemWithQuantity::json_schema()
        })
    }
}

impl Schema for MealPlan {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "menu": Menu::json_schema(),
                "grocery_list": GroceryList::json_schema()
            },
            "required": ["menu", "grocery_list"]
        })
    }
}

/// Text telling the model which JSON shape to emit.
pub fn format_instructions<T: Schema>() -> String {
    let schema = T::json_schema().to_string();
    format!(
        "The output must be a single JSON value that conforms to the JSON Schema below, \
wrapped in a ```json code block, with no other text.\n\n\
For example, for the schema {{\"type\": \"object\", \"properties\": {{\"foo\": {{\"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}} \
the value {{\"foo\": [\"bar\", \"baz\"]}} conforms, while {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} does not.\n\n\
Here is the output schema:\n```json\n{schema}\n```"
    )
}

/// Parses raw model output into `T`. All-or-nothing: the first violation is
/// returned with its field path.
pub fn parse<T: Schema>(raw: &str) -> Result<T> {
    let value = extract_json(raw)?;
    validate_against::<T>(&value)?;
    serde_json::from_value(value).map_err(|e| PlannerError::schema("$", e.to_string()))
}

/// Finds the JSON value in a model reply.
///
/// A fenced block wins when present. Otherwise the whole reply is tried, and
/// then every `{` or `[` in order, keeping the first value that parses and
/// ignoring whatever follows it. A bracketed span in the prose that is itself
/// valid JSON, such as `[1]`, is taken as the answer and then fails the schema.
fn extract_json(raw: &str) -> Result<Value> {
    if let Some(block) = FENCED_BLOCK.captures(raw).and_then(|caps| caps.get(1)) {
        return serde_json::from_str(block.as_str().trim())
            .map_err(|e| PlannerError::schema("$", format!("fenced block is not valid JSON: {e}")));
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::schema("$", "response is empty"));
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    // 模型偶爾會在 JSON 前後加說明文字
    trimmed
        .match_indices(['{', '['])
        .find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&trimmed[start..])
                .into_iter::<Value>()
                .next()
                .and_then(|parsed| parsed.ok())
        })
        .ok_or_else(|| PlannerError::schema("$", "response does not contain a JSON value"))
}

fn validate_against<T: Schema>(value: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(&T::json_schema()).map_err(|e| {
        PlannerError::ConfigError {
            message: format!("invalid output schema: {e}"),
        }
    })?;

    let result = match validator.iter_errors(value).next() {
        None => Ok(()),
        Some(error) => {
            let mut path = dotted_path(value, &error.instance_path.to_string());
            if let ValidationErrorKind::Required { property } = &error.kind {
                if let Some(name) = property.as_str() {
                    path = format!("{path}.{name}");
                }
            }
            Err(PlannerError::schema(path, error.to_string()))
        }
    };
    result
}

/// Turns a JSON pointer such as `/lunch/1/quantity` into `$.lunch[1].quantity`.
/// Array indices are told apart from keys by walking `instance`.
fn dotted_path(instance: &Value, pointer: &str) -> String {
    let mut path = String::from("$");
    let mut current = Some(instance);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        match current {
            Some(Value::Array(items)) => {
                path.push_str(&format!("[{segment}]"));
                current = segment.parse::<usize>().ok().and_then(|index| items.get(index));
            }
            Some(value) => {
                path.push('.');
                path.push_str(&segment);
                current = value.get(segment.as_str());
            }
            None => {
                path.push('.');
                path.push_str(&segment);
            }
        }
    }
    path
}
