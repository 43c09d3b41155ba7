use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Field type declared by one input schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaFieldType {
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `string`
    String,
    /// Missing or unrecognised type; rendered as free text.
    Other(Option<String>),
}

impl SchemaFieldType {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("boolean") => Self::Boolean,
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            Some("string") => Self::String,
            other => Self::Other(other.map(str::to_owned)),
        }
    }
}

/// Read-only view of one schema property.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    /// Declared type.
    pub field_type: SchemaFieldType,
    /// Declared default value.
    pub default: Option<Value>,
    /// Allowed values for enumerated string fields.
    pub enum_values: Vec<String>,
    /// Display title.
    pub title: Option<String>,
    /// Help text.
    pub description: Option<String>,
    /// Lower bound for numeric fields.
    pub minimum: Option<f64>,
    /// Upper bound for numeric fields.
    pub maximum: Option<f64>,
}

impl SchemaProperty {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);

        Self {
            field_type: SchemaFieldType::parse(value.get("type").and_then(Value::as_str)),
            default: value.get("default").filter(|value| !value.is_null()).cloned(),
            enum_values: value
                .get("enum")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .map(|value| match value {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            title: text("title"),
            description: text("description"),
            minimum: value.get("minimum").and_then(Value::as_f64),
            maximum: value.get("maximum").and_then(Value::as_f64),
        }
    }
}

/// JSON-schema-like description of an actor's run input.
///
/// The document is kept as received and never validated as JSON Schema.
/// Accessors read it leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSchema(Value);

impl InputSchema {
    /// Schema used when an actor declares none.
    #[must_use]
    pub fn empty() -> Self {
        Self(json!({"type": "object", "properties": {}}))
    }

    /// Wraps a schema document.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Picks the build-declared schema, then the actor-level schema, then the empty schema.
    #[must_use]
    pub fn resolve(build_schema: Option<Value>, actor_schema: Option<Value>) -> Self {
        build_schema
            .into_iter()
            .chain(actor_schema)
            .find(is_present)
            .map(Self)
            .unwrap_or_else(Self::empty)
    }

    /// Returns the raw document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the schema, returning the raw document.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns whether the document declares a `properties` object.
    #[must_use]
    pub fn has_properties(&self) -> bool {
        self.properties_map().is_some()
    }

    /// Returns declared properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> Vec<(&str, SchemaProperty)> {
        self.properties_map()
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, value)| (name.as_str(), SchemaProperty::from_value(value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the names listed in `required`.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns whether `name` is listed in `required`.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required().contains(&name)
    }

    fn properties_map(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::empty()
    }
}

fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}
