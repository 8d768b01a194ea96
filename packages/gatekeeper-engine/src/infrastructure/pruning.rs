//! Specification pruning and feature extraction.
//!
//! Strips boilerplate that varies without changing an API's meaning
//! (`servers`, `externalDocs`, top-level `security`, contact/license data
//! inside `info`) and extracts the structural identity of the API as a
//! sorted, deduplicated list of feature strings:
//!
//! - path tokens: `"GET /pets/{param}"`, plus `operationId:` and `tag:`
//!   variants where the operation carries them
//! - schema tokens: `"schema:pet"`, `"schema:pet.name:string"`
//!
//! Input may be JSON or YAML; the format is detected by whether the first
//! non-whitespace byte is `{`. The pruned document is re-serialized as
//! canonical (sorted-key) JSON so identical specs always compare equal.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{GatekeeperError, Result};

/// Path parameters like `{id}` or `{userId}` normalize to `{param}`.
static PATH_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("valid regex"));

/// HTTP methods whose operations contribute `operationId:`/`tag:` tokens.
const DETAILED_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

/// HTTP methods recorded as bare `"METHOD path"` tokens only.
const BARE_METHODS: [&str; 2] = ["head", "options"];

/// Parses a specification document, detecting JSON vs YAML by the first
/// non-whitespace byte.
fn parse_definition(definition: &str) -> Result<Map<String, Value>> {
    let trimmed = definition.trim();
    if trimmed.is_empty() {
        return Err(GatekeeperError::invalid_input(
            "invalid specification: definition is empty",
        ));
    }

    let root: Value = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| {
            GatekeeperError::parse(format!("unparseable specification: {e}")).with_source(e)
        })?
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| {
            GatekeeperError::parse(format!("unparseable specification: {e}")).with_source(e)
        })?
    };

    match root {
        Value::Object(map) => Ok(map),
        _ => Err(GatekeeperError::invalid_input(
            "invalid specification: root is not a JSON/YAML object",
        )),
    }
}

/// Prunes boilerplate fields from a specification and returns the remainder
/// as canonical JSON.
///
/// Removed: `servers`, `externalDocs`, top-level `security`, and `contact`,
/// `license`, `termsOfService` inside `info`. `info.title`,
/// `info.description` and `info.version` are kept; so are all `paths` and
/// `components.schemas`.
pub fn prune_definition(definition: &str) -> Result<String> {
    let mut root = parse_definition(definition)?;

    root.remove("servers");
    root.remove("externalDocs");
    root.remove("security");

    if let Some(Value::Object(info)) = root.get_mut("info") {
        info.remove("contact");
        info.remove("license");
        info.remove("termsOfService");
    }

    serde_json::to_string(&Value::Object(root))
        .map_err(|e| GatekeeperError::internal("failed to serialize pruned specification").with_source(e))
}

/// Normalizes a path: every `{segment}` becomes `{param}`, lowercased.
fn normalize_path(path: &str) -> String {
    PATH_PARAM.replace_all(path, "{param}").to_lowercase()
}

fn collect_path_features(root: &Map<String, Value>, features: &mut BTreeSet<String>) {
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return;
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        let normalized = normalize_path(path);

        for method in DETAILED_METHODS {
            let Some(operation) = item.get(method) else {
                continue;
            };
            let upper = method.to_uppercase();
            features.insert(format!("{upper} {normalized}"));

            let Some(operation) = operation.as_object() else {
                continue;
            };
            if let Some(id) = operation.get("operationId").and_then(Value::as_str) {
                features.insert(format!(
                    "{upper} {normalized} operationId:{}",
                    id.to_lowercase()
                ));
            }
            if let Some(tags) = operation.get("tags").and_then(Value::as_array) {
                for tag in tags.iter().filter_map(Value::as_str) {
                    features.insert(format!("{upper} {normalized} tag:{}", tag.to_lowercase()));
                }
            }
        }

        for method in BARE_METHODS {
            if item.get(method).is_some() {
                features.insert(format!("{} {normalized}", method.to_uppercase()));
            }
        }
    }
}

fn collect_schema_features(root: &Map<String, Value>, features: &mut BTreeSet<String>) {
    let Some(schemas) = root
        .get("components")
        .and_then(Value::as_object)
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return;
    };

    for (name, schema) in schemas {
        let schema_name = name.to_lowercase();
        features.insert(format!("schema:{schema_name}"));

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (prop, prop_schema) in properties {
                let prop_type = prop_schema
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("object");
                features.insert(format!(
                    "schema:{schema_name}.{}:{}",
                    prop.to_lowercase(),
                    prop_type.to_lowercase()
                ));
            }
        }
    }
}

/// Extracts normalized path tokens from a specification.
pub fn extract_normalized_paths(definition: &str) -> Result<BTreeSet<String>> {
    let root = parse_definition(definition)?;
    let mut features = BTreeSet::new();
    collect_path_features(&root, &mut features);
    Ok(features)
}

/// Extracts normalized schema tokens from a specification.
pub fn extract_normalized_schemas(definition: &str) -> Result<BTreeSet<String>> {
    let root = parse_definition(definition)?;
    let mut features = BTreeSet::new();
    collect_schema_features(&root, &mut features);
    Ok(features)
}

/// Extracts the combined, sorted, deduplicated feature list used for MinHash
/// computation.
///
/// A valid specification with zero paths and zero schemas yields an empty
/// list; that is not an error.
pub fn extract_features(definition: &str) -> Result<Vec<String>> {
    let root = parse_definition(definition)?;
    let mut features = BTreeSet::new();
    collect_path_features(&root, &mut features);
    collect_schema_features(&root, &mut features);
    Ok(features.into_iter().collect())
}
