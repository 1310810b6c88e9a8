//! Parameter model for registered experiments.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorInfo, LaunchError};

/// A single stringifiable parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Free-form text, passed through verbatim.
    Str(String),
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(true) => f.write_str("True"),
            Scalar::Bool(false) => f.write_str("False"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => f.write_str(&render_float(*value)),
            Scalar::Str(value) => f.write_str(value),
        }
    }
}

/// Shortest round-trip float text in the form Python entry points parse back:
/// positional for decimal exponents in `-4..16` (`0.0001`, `1.0`), otherwise
/// scientific with a signed two-digit exponent (`1e-05`, `1.5e+16`).
fn render_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs());
    }
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let point = exponent + 1;
    let body = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let point = point as usize;
        if point >= digits.len() {
            format!("{digits}{}.0", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

/// Value bound to a parameter name: a scalar or a flat sequence of scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Single value rendered as one token.
    Scalar(Scalar),
    /// Ordered values rendered as space separated tokens.
    Sequence(Vec<Scalar>),
}

macro_rules! param_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Scalar(value.into())
                }
            }

            impl From<Vec<$ty>> for ParamValue {
                fn from(values: Vec<$ty>) -> Self {
                    ParamValue::Sequence(values.into_iter().map(Into::into).collect())
                }
            }
        )*
    };
}

param_value_from!(bool, i32, i64, u32, f64, &str, String, Scalar);

impl ParamValue {
    /// Converts an untyped JSON value, rejecting nulls, objects and nested arrays.
    pub fn from_json(key: &str, value: Value) -> Result<Self, LaunchError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    scalar_from_json(item).map_err(|kind| {
                        invalid_type(key, kind).with_context("index", idx.to_string())
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::Sequence)
                .map_err(LaunchError::InvalidParameterType),
            other => scalar_from_json(other)
                .map(ParamValue::Scalar)
                .map_err(|kind| LaunchError::InvalidParameterType(invalid_type(key, kind))),
        }
    }

    /// Rendered tokens for this value, one per scalar.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ParamValue::Scalar(scalar) => vec![scalar.to_string()],
            ParamValue::Sequence(values) => values.iter().map(ToString::to_string).collect(),
        }
    }
}

fn scalar_from_json(value: Value) -> Result<Scalar, &'static str> {
    match value {
        Value::Bool(flag) => Ok(Scalar::Bool(flag)),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(Scalar::Int(int))
            } else if number.is_u64() {
                // Out of i64 range; keep the exact digits.
                Ok(Scalar::Str(number.to_string()))
            } else {
                number.as_f64().map(Scalar::Float).ok_or("number")
            }
        }
        Value::String(text) => Ok(Scalar::Str(text)),
        Value::Null => Err("null"),
        Value::Array(_) => Err("nested sequence"),
        Value::Object(_) => Err("mapping"),
    }
}

fn invalid_type(key: &str, kind: &str) -> ErrorInfo {
    ErrorInfo::new(
        "params.invalid_type",
        format!("unsupported {kind} value for parameter `{key}`"),
    )
    .with_context("key", key)
    .with_hint("use a scalar or a flat list of scalars")
}

/// Insertion ordered mapping from parameter name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    entries: IndexMap<String, ParamValue>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter. Replaced keys keep their position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder form of [`ParameterSet::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up a parameter by name.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Builds a parameter set from an ordered map of untyped values.
    pub fn from_json_map(map: IndexMap<String, Value>) -> Result<Self, LaunchError> {
        let mut entries = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            let converted = ParamValue::from_json(&key, value)?;
            entries.insert(key, converted);
        }
        Ok(Self { entries })
    }
}

impl TryFrom<Value> for ParameterSet {
    type Error = LaunchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Self::from_json_map(map.into_iter().collect()),
            Value::Null => Ok(Self::new()),
            _ => Err(LaunchError::InvalidParameterType(
                ErrorInfo::new("params.not_a_mapping", "parameter set must be a mapping")
                    .with_hint("write parameters as `name: value` pairs"),
            )),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}
