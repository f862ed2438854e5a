use refq_config::json_schema;

fn schema_value() -> serde_json::Value {
    serde_json::to_value(json_schema()).expect("schema serializes")
}

#[test]
fn json_schema_lists_both_sections() {
    let value = schema_value();
    let properties = value
        .pointer("/properties")
        .and_then(|v| v.as_object())
        .expect("root properties");
    assert!(properties.contains_key("logging"));
    assert!(properties.contains_key("compatibility"));
}

#[test]
fn json_schema_rejects_unknown_keys() {
    let value = schema_value();
    assert_eq!(
        value.pointer("/additionalProperties").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        value
            .pointer("/definitions/CompatibilityRule/additionalProperties")
            .and_then(|v| v.as_bool()),
        Some(false)
    );
}

#[test]
fn json_schema_enumerates_compatibility_modes() {
    let value = schema_value();
    let modes = value
        .pointer("/definitions/CompatibilityMode")
        .expect("CompatibilityMode definition");
    let text = modes.to_string();
    assert!(text.contains("\"exact\""), "{text}");
    assert!(text.contains("\"table\""), "{text}");
}

#[test]
fn json_schema_constrains_rule_type_strings() {
    let value = schema_value();
    let pattern = value
        .pointer("/definitions/CompatibilityRule/properties/actual/pattern")
        .and_then(|v| v.as_str())
        .expect("actual has a pattern");
    assert!(pattern.starts_with('^'));
    assert!(value
        .pointer("/definitions/CompatibilityRule/properties/declared/pattern")
        .is_some());
}

#[test]
fn json_schema_requires_rules_in_table_mode() {
    let value = schema_value();
    let all_of = value
        .pointer("/allOf")
        .and_then(|v| v.as_array())
        .expect("allOf constraints");
    assert!(all_of.iter().any(|rule| {
        rule.pointer("/if/properties/compatibility/properties/mode/const")
            .and_then(|v| v.as_str())
            == Some("table")
    }));
}
