use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PROPERTY_TYPE: &str = "Condo";
pub const DEFAULT_TOWNSHIP: &str = "Kamayut";
pub const DEFAULT_BEDROOMS: i64 = 3;
pub const DEFAULT_PROPERTY_SIZE: f64 = 2000.0;

pub const CURRENCY: &str = "USD";

/// Raw prediction query as received; every field is optional
///
/// Values stay untyped until [`PredictionRequest::resolve`] so that numeric
/// strings are accepted and coercion failures are reported as invalid input.
/// A JSON `null` counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub property_type: Option<Value>,
    #[serde(default)]
    pub township: Option<Value>,
    #[serde(default)]
    pub bedrooms: Option<Value>,
    #[serde(default)]
    pub property_size: Option<Value>,
}

/// The single row fed to the feature transform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFeatures {
    pub property_type: String,
    pub township: String,
    pub bedrooms: i64,
    pub property_size: f64,
}

impl PropertyFeatures {
    /// Column order the transform was fitted on
    pub const COLUMNS: [&'static str; 4] = ["property_type", "township", "bedrooms", "property_size"];

    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "property_type" => Some(self.property_type.as_str()),
            "township" => Some(self.township.as_str()),
            _ => None,
        }
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "bedrooms" => Some(self.bedrooms as f64),
            "property_size" => Some(self.property_size),
            _ => None,
        }
    }
}

impl Default for PropertyFeatures {
    fn default() -> Self {
        Self {
            property_type: DEFAULT_PROPERTY_TYPE.to_string(),
            township: DEFAULT_TOWNSHIP.to_string(),
            bedrooms: DEFAULT_BEDROOMS,
            property_size: DEFAULT_PROPERTY_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Price in original units, rounded to cents
    pub predicted_price: f64,
    pub currency: &'static str,
    /// Effective inputs after defaults were applied
    pub input: PropertyFeatures,
}

impl PredictionRequest {
    /// Apply defaults and coerce field types.
    pub fn resolve(&self) -> Result<PropertyFeatures, PredictionError> {
        let defaults = PropertyFeatures::default();

        Ok(PropertyFeatures {
            property_type: match &self.property_type {
                Some(value) => coerce_text("property_type", value)?,
                None => defaults.property_type,
            },
            township: match &self.township {
                Some(value) => coerce_text("township", value)?,
                None => defaults.township,
            },
            bedrooms: match &self.bedrooms {
                Some(value) => coerce_integer("bedrooms", value)?,
                None => defaults.bedrooms,
            },
            property_size: match &self.property_size {
                Some(value) => coerce_float("property_size", value)?,
                None => defaults.property_size,
            },
        })
    }
}

fn invalid(field: &str, value: &Value, expected: &str) -> PredictionError {
    PredictionError::InvalidInput(format!("{} must be {}, got {}", field, expected, value))
}

fn coerce_text(field: &str, value: &Value) -> Result<String, PredictionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(invalid(field, other, "a string")),
    }
}

/// Integers pass through, floats truncate toward zero, strings must parse as integers.
fn coerce_integer(field: &str, value: &Value) -> Result<i64, PredictionError> {
    let coerced = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    coerced.ok_or_else(|| invalid(field, value, "an integer"))
}

fn coerce_float(field: &str, value: &Value) -> Result<f64, PredictionError> {
    let coerced = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    coerced
        .filter(|f| f.is_finite())
        .ok_or_else(|| invalid(field, value, "a number"))
}

/// Round to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render a size like `2,000.0 sqft`.
pub fn format_size(size: f64) -> String {
    let repr = format!("{:?}", size);
    if !size.is_finite() {
        return format!("{} sqft", repr);
    }
    if let Some((mantissa, exponent)) = repr.split_once('e') {
        // Signed, at least two exponent digits: 1e+16, 1e-05
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2} sqft", mantissa, sign, digits);
    }

    let (sign, unsigned) = match repr.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", repr.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "0"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}.{} sqft", sign, grouped, fraction)
}
