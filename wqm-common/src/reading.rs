//! Reading model
//!
//! Readings arrive from the service with loosely typed fields: metrics are
//! usually two-decimal strings, `timestamp_utc` is epoch seconds, and
//! coordinates may be numbers, numeric strings, `null`, or missing entirely.
//! Each field is kept as its raw JSON value ([`LooseValue`]) and interpreted
//! with JavaScript truthiness, which is what the service's other consumers
//! rely on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::{Error, Result};

/// Raw JSON value of a reading field
///
/// `Null` doubles as "absent": the wire format does not distinguish the two
/// in any way the views care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LooseValue(pub Value);

impl LooseValue {
    pub fn is_absent(&self) -> bool {
        self.0.is_null()
    }

    /// JavaScript truthiness
    ///
    /// `null`, `false`, `0`, `NaN` and `""` are falsy. Arrays and objects
    /// are truthy even when empty.
    pub fn is_truthy(&self) -> bool {
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Numeric interpretation: numbers as-is, strings parsed after trimming
    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|f| f.is_finite())
    }
}

impl From<Value> for LooseValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for LooseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::Null => write!(f, "unknown"),
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// Potability status shown on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Potability {
    Safe,
    NotSafe,
}

impl Potability {
    pub fn label(&self) -> &'static str {
        match self {
            Potability::Safe => "✅ Safe",
            Potability::NotSafe => "⚠️ Not Safe",
        }
    }
}

/// Potability normalization
///
/// Exactly two representations mean "safe": the number 1 and the string
/// `"1"`. Everything else, including `true`, `"1.0"`, `0` and `null`, is
/// not safe.
pub fn is_potable(value: &LooseValue) -> bool {
    match &value.0 {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s == "1",
        _ => false,
    }
}

/// Latitude/longitude pair sent to the service when tagging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Parse user-entered coordinates
    ///
    /// Each input is read up to the end of its leading decimal number, so
    /// `"12.9 N"` gives 12.9. Input with no leading number is rejected here
    /// rather than sent; JSON has no encoding for NaN.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let parse_one = |name: &str, raw: &str| {
            leading_number(raw)
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidInput(format!("{} must be a number, got '{}'", name, raw)))
        };

        Ok(Self {
            latitude: parse_one("Latitude", latitude)?,
            longitude: parse_one("Longitude", longitude)?,
        })
    }
}

/// Longest decimal prefix of `raw` after leading whitespace
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// exponent only when digits follow it. Trailing text is ignored.
fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// One sensor observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub reading_id: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub timestamp_utc: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub latitude: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub longitude: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub ph: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub solids: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub turbidity: LooseValue,
    #[serde(default, skip_serializing_if = "LooseValue::is_absent")]
    pub is_potable: LooseValue,
    /// Fields the views do not interpret (`device_id`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reading {
    /// Decode one array element of a fetch response
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidInput(format!("expected a reading object, got {}", value)));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Identifier used for updates; `None` when missing or falsy
    pub fn id(&self) -> Option<String> {
        self.reading_id
            .is_truthy()
            .then(|| self.reading_id.to_string())
    }

    /// Stable key for list display: the id, else a timestamp-derived fallback
    pub fn display_key(&self) -> String {
        self.id()
            .unwrap_or_else(|| format!("TS: {}", self.timestamp_utc))
    }

    /// Both coordinates present and truthy (`0` counts as missing)
    pub fn is_geotagged(&self) -> bool {
        self.latitude.is_truthy() && self.longitude.is_truthy()
    }

    /// Numeric coordinates for drawing, when both parse
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude.as_f64()?,
            longitude: self.longitude.as_f64()?,
        })
    }

    pub fn potability(&self) -> Potability {
        if is_potable(&self.is_potable) {
            Potability::Safe
        } else {
            Potability::NotSafe
        }
    }
}
