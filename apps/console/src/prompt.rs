use std::fmt::Display;

use actordeck_core::{AppError, AppResult};
use actordeck_domain::{START_URLS_FIELD, SchemaFieldType, SchemaProperty, StartUrl};
use inquire::error::CustomUserError;
use inquire::validator::Validation;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use serde_json::{Map, Number, Value};

/// Outcome of one prompt: a value, Esc (go back) or Ctrl-C (quit).
#[derive(Debug, Clone, PartialEq)]
pub enum Answer<T> {
    Value(T),
    Back,
    Quit,
}

fn answer<T>(result: Result<T, InquireError>) -> AppResult<Answer<T>> {
    match result {
        Ok(value) => Ok(Answer::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Back),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Quit),
        Err(error) => Err(AppError::Internal(format!("prompt failed: {error}"))),
    }
}

pub fn api_key() -> AppResult<Answer<String>> {
    answer(
        Password::new("Apify API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_help_message("Found under Settings > Integrations in the Apify console")
            .prompt(),
    )
}

pub fn search_term() -> AppResult<Answer<String>> {
    answer(
        Text::new("Search actors:")
            .with_help_message("Matches name, title and description; leave empty to list all")
            .prompt(),
    )
}

pub fn choose<T: Display>(message: &str, options: Vec<T>) -> AppResult<Answer<T>> {
    answer(Select::new(message, options).with_page_size(12).prompt())
}

pub fn confirm(message: &str, default: bool) -> AppResult<Answer<bool>> {
    answer(Confirm::new(message).with_default(default).prompt())
}

/// Asks for one input field, using the control that fits its schema type.
pub fn field_value(
    name: &str,
    property: &SchemaProperty,
    current: Option<&Value>,
    required: bool,
) -> AppResult<Answer<Value>> {
    let label = field_label(name, property, required);
    let help = property.description.clone().unwrap_or_default();

    if !property.enum_values.is_empty() {
        let options = property.enum_values.clone();
        let cursor = current
            .and_then(Value::as_str)
            .and_then(|current| options.iter().position(|option| option == current))
            .unwrap_or(0);
        let chosen = Select::new(&label, options)
            .with_starting_cursor(cursor)
            .prompt();
        return answer(chosen.map(Value::String));
    }

    match &property.field_type {
        SchemaFieldType::Boolean => {
            let default = current.and_then(Value::as_bool).unwrap_or(false);
            let confirmed = Confirm::new(&label)
                .with_default(default)
                .with_help_message(&help)
                .prompt();
            answer(confirmed.map(Value::Bool))
        }
        SchemaFieldType::Integer | SchemaFieldType::Number => {
            let integer = property.field_type == SchemaFieldType::Integer;
            let (minimum, maximum) = (property.minimum, property.maximum);
            let default = current
                .filter(|value| value.is_number())
                .map(Value::to_string)
                .unwrap_or_default();
            let help = bounds_help(&help, minimum, maximum);
            let text = Text::new(&label)
                .with_default(&default)
                .with_help_message(&help)
                .with_validator(move |text: &str| -> Result<Validation, CustomUserError> {
                    Ok(match parse_number(text, integer, minimum, maximum) {
                        Ok(None) if required => Validation::Invalid("This field is required".into()),
                        Ok(_) => Validation::Valid,
                        Err(message) => Validation::Invalid(message.into()),
                    })
                })
                .prompt();
            answer(text.map(|text| {
                parse_number(&text, integer, minimum, maximum)
                    .ok()
                    .flatten()
                    .unwrap_or(Value::String(String::new()))
            }))
        }
        SchemaFieldType::Array => {
            let default = current.map(list_text).unwrap_or_default();
            let start_urls = name == START_URLS_FIELD;
            let text = Text::new(&label)
                .with_default(&default)
                .with_help_message(if start_urls {
                    "Comma separated URLs"
                } else {
                    "Comma separated values, or a JSON array"
                })
                .prompt();
            answer(text.map(|text| parse_list(&text, start_urls)))
        }
        SchemaFieldType::Object => {
            let default = current.map(Value::to_string).unwrap_or_default();
            let text = Text::new(&label)
                .with_default(&default)
                .with_help_message("JSON object")
                .with_validator(|text: &str| -> Result<Validation, CustomUserError> {
                    Ok(match parse_object(text) {
                        Ok(_) => Validation::Valid,
                        Err(message) => Validation::Invalid(message.into()),
                    })
                })
                .prompt();
            answer(text.map(|text| parse_object(&text).unwrap_or_default()))
        }
        SchemaFieldType::String | SchemaFieldType::Other(_) => {
            let default = current.and_then(Value::as_str).unwrap_or_default();
            let text = Text::new(&label)
                .with_default(default)
                .with_help_message(&help)
                .prompt();
            answer(text.map(Value::String))
        }
    }
}

fn field_label(name: &str, property: &SchemaProperty, required: bool) -> String {
    let title = property.title.as_deref().unwrap_or(name);
    if required {
        format!("{title} *")
    } else {
        title.to_owned()
    }
}

fn bounds_help(help: &str, minimum: Option<f64>, maximum: Option<f64>) -> String {
    let bounds = match (minimum, maximum) {
        (Some(minimum), Some(maximum)) => format!("between {minimum} and {maximum}"),
        (Some(minimum), None) => format!("at least {minimum}"),
        (None, Some(maximum)) => format!("at most {maximum}"),
        (None, None) => return help.to_owned(),
    };

    if help.is_empty() {
        bounds
    } else {
        format!("{help} ({bounds})")
    }
}

/// Parses a numeric field; blank text means "no value".
pub fn parse_number(
    text: &str,
    integer: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
) -> Result<Option<Value>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (number, value) = if integer {
        let parsed = text
            .parse::<i64>()
            .map_err(|_| "Enter a whole number".to_owned())?;
        (parsed as f64, Value::Number(Number::from(parsed)))
    } else {
        let parsed = text
            .parse::<f64>()
            .map_err(|_| "Enter a number".to_owned())?;
        let number = Number::from_f64(parsed).ok_or_else(|| "Enter a finite number".to_owned())?;
        (parsed, Value::Number(number))
    };

    if minimum.is_some_and(|minimum| number < minimum) {
        return Err(format!("Must be at least {}", minimum.unwrap_or_default()));
    }
    if maximum.is_some_and(|maximum| number > maximum) {
        return Err(format!("Must be at most {}", maximum.unwrap_or_default()));
    }

    Ok(Some(value))
}

/// Parses a list field. `startUrls` entries become `{url, method}` objects.
pub fn parse_list(text: &str, start_urls: bool) -> Value {
    let text = text.trim();
    if !start_urls
        && text.starts_with('[')
        && let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text)
    {
        return Value::Array(items);
    }

    let entries = text
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty());

    if start_urls {
        Value::Array(
            entries
                .filter_map(|url| serde_json::to_value(StartUrl::get(url)).ok())
                .collect(),
        )
    } else {
        Value::Array(
            entries
                .map(|entry| Value::String(entry.to_owned()))
                .collect(),
        )
    }
}

/// Parses an object field; blank text is an empty object.
pub fn parse_object(text: &str) -> Result<Value, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => Ok(Value::Object(fields)),
        Ok(_) => Err("Enter a JSON object".to_owned()),
        Err(error) => Err(format!("Invalid JSON: {error}")),
    }
}

/// Current list value as editable comma separated text.
pub fn list_text(value: &Value) -> String {
    let Some(items) = value.as_array() else {
        return String::new();
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(text) => text.clone(),
            Value::Object(fields) => fields
                .get("url")
                .and_then(Value::as_str)
                .map_or_else(|| item.to_string(), ToOwned::to_owned),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
