/*
[INPUT]:  Caller query arguments (JSON mapping or bare shorthand string)
[OUTPUT]: Validated scalar parameters and their canonical encoding
[POS]:    HTTP layer - query validation and canonicalization before signing
[UPDATE]: When changing canonical ordering or accepted argument forms
*/

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::http::{Result, VoptionError};

/// Argument accepted by every catalog method
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryArg {
    #[default]
    Empty,
    /// Bare value standing in for `{<endpoint shorthand key>: value}`
    Shorthand(String),
    Params(Value),
}

impl QueryArg {
    /// Resolve into parameters, expanding a shorthand under `shorthand_key`
    pub fn into_params(self, shorthand_key: &str) -> Result<QueryParams> {
        match self {
            QueryArg::Empty => Ok(QueryParams::new()),
            QueryArg::Shorthand(value) => {
                let mut params = QueryParams::new();
                params.insert(shorthand_key, value);
                Ok(params)
            }
            QueryArg::Params(value) => QueryParams::from_value(value),
        }
    }
}

impl From<()> for QueryArg {
    fn from(_: ()) -> Self {
        QueryArg::Empty
    }
}

impl From<&str> for QueryArg {
    fn from(value: &str) -> Self {
        QueryArg::Shorthand(value.to_string())
    }
}

impl From<String> for QueryArg {
    fn from(value: String) -> Self {
        QueryArg::Shorthand(value)
    }
}

impl From<Value> for QueryArg {
    fn from(value: Value) -> Self {
        QueryArg::Params(value)
    }
}

impl From<Map<String, Value>> for QueryArg {
    fn from(value: Map<String, Value>) -> Self {
        QueryArg::Params(Value::Object(value))
    }
}

impl From<QueryParams> for QueryArg {
    fn from(value: QueryParams) -> Self {
        QueryArg::Params(Value::Object(
            value
                .0
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        ))
    }
}

/// Scalar query parameters in canonical (ascending key) order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON mapping of scalars. `null` means no parameters;
    /// anything else that is not a mapping is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(map) => map,
            other => {
                return Err(VoptionError::InvalidQuery(format!(
                    "query must be a mapping, got {}",
                    json_type(&other)
                )));
            }
        };

        let mut params = Self::new();
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(text) => params.insert(key, text),
                Value::Number(number) => params.insert(key, number.to_string()),
                Value::Bool(flag) => params.insert(key, flag.to_string()),
                other => {
                    return Err(VoptionError::InvalidQuery(format!(
                        "query field {key} must be a scalar, got {}",
                        json_type(&other)
                    )));
                }
            }
        }
        Ok(params)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` string; this exact string is signed
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
