//! Core logic behind the `form-watch` binary.
//!
//! - `form-watch [--flatten]` maps `{ "schema", "changed", "all" }` read from
//!   stdin to its value path map
//! - `form-watch variants <path>` lists the path variants of `<path>` under
//!   the schema read from stdin

use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::changes::{map_changes, IndexPath, PathEntry, ValuePathMap};
use crate::error::SchemaError;
use crate::flatten::Flattener;
use crate::schema::{SchemaContext, SchemaNode};
use form_watch_path::{parse_value_path, validate_value_path, PathError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
}

#[derive(Debug, Deserialize)]
struct MapRequest {
    #[serde(default)]
    schema: Option<Value>,
    changed: Value,
    #[serde(default)]
    all: Option<Value>,
}

/// Map a change request to a JSON object of `path -> { value, index }`.
///
/// `all` defaults to `changed`.
pub fn map_request(input: &str, flatten: bool) -> Result<String, CliError> {
    let request: MapRequest = serde_json::from_str(input)?;
    let all = request.all.unwrap_or_else(|| request.changed.clone());
    let map = match request.schema {
        Some(schema) if flatten => {
            let context = SchemaContext::new(SchemaNode::from_json(&schema)?);
            let flattener = Flattener::new(&context.voids);
            map_changes(&flattener.flatten(&request.changed), &flattener.flatten(&all))
        }
        _ => map_changes(&request.changed, &all),
    };
    Ok(serde_json::to_string_pretty(&map_to_json(&map))?)
}

/// List the variants of `path` under the schema in `input`.
pub fn variants_request(input: &str, path: &str) -> Result<String, CliError> {
    validate_value_path(path)?;
    let context = SchemaContext::new(SchemaNode::from_json_str(input)?);
    let variants: Vec<String> = context
        .voids
        .path_variants(&parse_value_path(path))
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(serde_json::to_string_pretty(&variants)?)
}

pub fn map_to_json(map: &ValuePathMap) -> Value {
    let object: Map<String, Value> =
        map.iter().map(|(path, entry)| (path.to_string(), entry_to_json(entry))).collect();
    Value::Object(object)
}

fn entry_to_json(entry: &PathEntry) -> Value {
    let index = match &entry.index {
        IndexPath::Indices(indices) => json!(indices),
        IndexPath::Delta(delta) => delta.clone(),
    };
    json!({ "value": entry.value, "index": index })
}
