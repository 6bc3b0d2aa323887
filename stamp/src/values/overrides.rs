//! Layering of values documents: deep merge and `--set` expressions.

use std::str::FromStr;

use serde_yaml::{Mapping, Value};
use snafu::{OptionExt, ensure};

use crate::values::{Error, error};

/// A `--set dotted.path=value` expression. The value is read as a YAML
/// scalar, so `true` and `8080` become a boolean and a number.
#[derive(Clone, Debug, PartialEq)]
pub struct SetOverride {
    path: Vec<String>,
    value: Value,
}

impl SetOverride {
    /// Parses a `--set-string` expression: the value is kept as a string.
    pub fn parse_string(expression: &str) -> Result<Self, Error> {
        let (path, raw) = split_expression(expression)?;
        Ok(Self { path, value: Value::String(raw.to_string()) })
    }

    pub fn apply(&self, document: &mut Value) {
        let Some((last, parents)) = self.path.split_last() else {
            return;
        };
        let mut current = ensure_mapping(document);
        for key in parents {
            current = ensure_mapping(&mut current[key.as_str()]);
        }
        if self.value.is_null() {
            if let Value::Mapping(mapping) = current {
                let _removed = mapping.remove(last.as_str());
            }
        } else {
            current[last.as_str()] = self.value.clone();
        }
    }
}

impl FromStr for SetOverride {
    type Err = Error;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let (path, raw) = split_expression(expression)?;
        let value = if raw.is_empty() {
            Value::String(String::new())
        } else {
            serde_yaml::from_str::<Value>(raw)
                .ok()
                .filter(|value| !matches!(value, Value::Mapping(_) | Value::Sequence(_)))
                .unwrap_or_else(|| Value::String(raw.to_string()))
        };
        Ok(Self { path, value })
    }
}

fn split_expression(expression: &str) -> Result<(Vec<String>, &str), Error> {
    let (path, raw) =
        expression.split_once('=').context(error::ParseOverrideSnafu { expression })?;
    let path = path.split('.').map(str::trim).map(ToString::to_string).collect::<Vec<_>>();
    ensure!(!path.iter().any(String::is_empty), error::ParseOverrideSnafu { expression });
    Ok((path, raw))
}

/// Turns `value` into an empty mapping unless it already is one.
fn ensure_mapping(value: &mut Value) -> &mut Value {
    if !value.is_mapping() {
        *value = Value::Mapping(Mapping::new());
    }
    value
}

/// Merges `overlay` into `base`. Mappings merge key by key, a `null` in the
/// overlay deletes the key, anything else replaces the base value.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    let _removed = base.remove(&key);
                } else if let Some(existing) = base.get_mut(&key) {
                    merge(existing, value);
                } else {
                    let _previous = base.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
