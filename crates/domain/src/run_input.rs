use actordeck_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ActorCapabilityRules;

/// Input field holding the URLs a crawler starts from.
pub const START_URLS_FIELD: &str = "startUrls";

/// URL pre-filled for actors that need start URLs.
pub const PLACEHOLDER_START_URL: &str = "https://example.com";

/// One entry of the `startUrls` input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartUrl {
    /// Absolute URL to request.
    pub url: String,
    /// HTTP method, `GET` unless stated otherwise.
    #[serde(default = "default_method")]
    pub method: String,
}

impl StartUrl {
    /// Creates a `GET` entry.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
        }
    }

    /// Entry shown before the user typed anything.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::get(PLACEHOLDER_START_URL)
    }

    /// Reads an entry that may be a bare string or an object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) => Some(Self::get(url.as_str())),
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

fn default_method() -> String {
    "GET".to_owned()
}

/// Field values submitted as an actor's run input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunInput(Map<String, Value>);

impl RunInput {
    /// Creates an empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a request payload; missing or `null` means an empty input.
    pub fn from_value(value: Option<Value>) -> AppResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(Value::Object(fields)) => Ok(Self(fields)),
            Some(_) => Err(AppError::Validation(
                "input must be a JSON object".to_owned(),
            )),
        }
    }

    /// Returns one field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns whether the field is set.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Sets one field value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Iterates over fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the input, returning the JSON object sent to the platform.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Returns whether `startUrls` is a non-empty array.
    #[must_use]
    pub fn has_start_urls(&self) -> bool {
        self.get(START_URLS_FIELD)
            .and_then(Value::as_array)
            .is_some_and(|urls| !urls.is_empty())
    }

    /// Reads `startUrls`, skipping entries that are neither strings nor objects.
    #[must_use]
    pub fn start_urls(&self) -> Vec<StartUrl> {
        self.get(START_URLS_FIELD)
            .and_then(Value::as_array)
            .map(|urls| urls.iter().filter_map(StartUrl::from_value).collect())
            .unwrap_or_default()
    }

    /// Replaces `startUrls`.
    pub fn set_start_urls(&mut self, urls: &[StartUrl]) {
        let urls = urls
            .iter()
            .map(|url| serde_json::json!({"url": url.url, "method": url.method}))
            .collect();
        self.insert(START_URLS_FIELD, Value::Array(urls));
    }

    /// Rejects inputs without start URLs for actors that need them.
    pub fn ensure_start_urls(&self, rules: &ActorCapabilityRules, actor_id: &str) -> AppResult<()> {
        if !rules.requires_start_urls(actor_id, None) || self.has_start_urls() {
            return Ok(());
        }

        Err(AppError::InvalidField {
            message: "startUrls is required and must be a non-empty array".to_owned(),
            received: self.get(START_URLS_FIELD).cloned(),
        })
    }
}
