use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{InputSchema, RunInput, START_URLS_FIELD, SchemaFieldType, StartUrl};

/// Field name to error message, as shown next to form fields.
pub type FormErrors = BTreeMap<String, String>;

/// Derives the values a freshly opened input form starts with.
///
/// Actors that need start URLs always get one placeholder entry. Every schema
/// property then takes its declared default, or an empty value of its type.
#[must_use]
pub fn initial_input(schema: &InputSchema, needs_start_urls: bool) -> RunInput {
    let mut input = RunInput::new();

    if needs_start_urls {
        input.set_start_urls(&[StartUrl::placeholder()]);
    }

    for (name, property) in schema.properties() {
        if name == START_URLS_FIELD && input.contains(START_URLS_FIELD) {
            continue;
        }

        if let Some(default) = property.default {
            input.insert(name, default);
            continue;
        }

        match property.field_type {
            SchemaFieldType::Boolean => input.insert(name, Value::Bool(false)),
            SchemaFieldType::Array if name == START_URLS_FIELD => {
                input.set_start_urls(&[StartUrl::placeholder()]);
            }
            SchemaFieldType::Array => input.insert(name, Value::Array(Vec::new())),
            SchemaFieldType::Object => input.insert(name, Value::Object(Map::new())),
            _ => input.insert(name, Value::String(String::new())),
        }
    }

    input
}

/// Checks a filled form before it is submitted.
#[must_use]
pub fn validate_input(schema: &InputSchema, input: &RunInput, needs_start_urls: bool) -> FormErrors {
    let mut errors = FormErrors::new();

    if needs_start_urls && !input.has_start_urls() {
        errors.insert(
            START_URLS_FIELD.to_owned(),
            "Start URLs are required".to_owned(),
        );
    }

    for name in schema.required() {
        if input.get(name).is_none_or(is_blank) {
            errors
                .entry(name.to_owned())
                .or_insert_with(|| "This field is required".to_owned());
        }
    }

    errors
}

/// Rewrites `startUrls` into `{url, method}` entries and drops blank URLs.
#[must_use]
pub fn normalize_for_submit(mut input: RunInput) -> RunInput {
    if input
        .get(START_URLS_FIELD)
        .is_some_and(Value::is_array)
    {
        let urls: Vec<StartUrl> = input
            .start_urls()
            .into_iter()
            .filter(|url| !url.url.trim().is_empty())
            .collect();
        input.set_start_urls(&urls);
    }

    input
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
