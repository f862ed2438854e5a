mod discovery;
mod schema_rules;
