use schemars::schema::{RootSchema, Schema};
use schemars::schema_for;
use serde_json::json;

use crate::RefqConfig;

/// Type strings accepted in compatibility rules: a dotted name followed by `[]` pairs.
const TYPE_PATTERN: &str = r"^\s*[A-Za-z_$][A-Za-z0-9_$.]*(\s*\[\s*\])*\s*$";

/// JSON schema for `refq.toml`.
///
/// Intended for editor tooling (TOML JSON schema integration) and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(RefqConfig);
    apply_semantic_constraints(&mut schema);
    schema
}

fn apply_semantic_constraints(schema: &mut RootSchema) {
    // `table` mode needs at least one rule to differ from `exact`.
    push_all_of(
        schema,
        schema_from_json(json!({
            "if": {
                "required": ["compatibility"],
                "properties": {
                    "compatibility": {
                        "required": ["mode"],
                        "properties": { "mode": { "const": "table" } }
                    }
                }
            },
            "then": {
                "properties": {
                    "compatibility": {
                        "required": ["rules"],
                        "properties": { "rules": { "minItems": 1 } }
                    }
                }
            }
        })),
    );

    for field in ["actual", "declared"] {
        set_property_pattern(schema, "CompatibilityRule", field, TYPE_PATTERN);
    }
}

fn push_all_of(root: &mut RootSchema, schema: Schema) {
    let subschemas = root.schema.subschemas();
    subschemas.all_of.get_or_insert_with(Vec::new).push(schema);
}

fn schema_from_json(value: serde_json::Value) -> Schema {
    // Literal schemas only.
    serde_json::from_value(value).unwrap_or(Schema::Bool(true))
}

fn set_property_pattern(
    schema: &mut RootSchema,
    definition_name: &str,
    property_name: &str,
    pattern: &str,
) {
    let Some(Schema::Object(definition)) = schema.definitions.get_mut(definition_name) else {
        return;
    };
    let Some(Schema::Object(property)) = definition.object().properties.get_mut(property_name)
    else {
        return;
    };
    property.string().pattern = Some(pattern.to_owned());
}
