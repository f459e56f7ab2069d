//! JSON Schema validation for inbound requests.
//!
//! One schema per operation, embedded at compile time from `schemas/`.

use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const FIND_RECIPES_SCHEMA_JSON: &str =
    include_str!("../../../../schemas/find_recipes.schema.json");
const MISSING_INGREDIENTS_SCHEMA_JSON: &str =
    include_str!("../../../../schemas/missing_ingredients.schema.json");
const SEND_LIST_SCHEMA_JSON: &str = include_str!("../../../../schemas/send_list.schema.json");

type CompiledSchema = OnceLock<Result<jsonschema::Validator, String>>;

static FIND_RECIPES_SCHEMA: CompiledSchema = OnceLock::new();
static MISSING_INGREDIENTS_SCHEMA: CompiledSchema = OnceLock::new();
static SEND_LIST_SCHEMA: CompiledSchema = OnceLock::new();

/// The inbound operation a payload is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    FindRecipes,
    MissingIngredients,
    SendList,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::FindRecipes => write!(f, "find-recipes"),
            RequestKind::MissingIngredients => write!(f, "missing-ingredients"),
            RequestKind::SendList => write!(f, "send-list"),
        }
    }
}

impl RequestKind {
    fn source(&self) -> (&'static CompiledSchema, &'static str) {
        match self {
            RequestKind::FindRecipes => (&FIND_RECIPES_SCHEMA, FIND_RECIPES_SCHEMA_JSON),
            RequestKind::MissingIngredients => {
                (&MISSING_INGREDIENTS_SCHEMA, MISSING_INGREDIENTS_SCHEMA_JSON)
            }
            RequestKind::SendList => (&SEND_LIST_SCHEMA, SEND_LIST_SCHEMA_JSON),
        }
    }
}

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator(kind: RequestKind) -> Result<&'static jsonschema::Validator, SchemaError> {
    let (cell, source) = kind.source();
    let result = cell.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(source) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid {} schema JSON: {}", kind, e)),
        };

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile {} schema: {}", kind, e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a raw request payload.
///
/// Returns every violation, each with the JSON pointer it applies to.
pub fn validate_request_schema(
    kind: RequestKind,
    payload: &serde_json::Value,
) -> Result<(), Vec<String>> {
    let validator = get_validator(kind).map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(payload)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
