//! The order payload posted by the storefront.

use std::fmt;

use serde::Deserialize;

/// A single form value as it arrives in JSON.
///
/// Storefront forms are not strict about types, so numbers and booleans
/// (e.g. `"quantity": 2`) are accepted alongside strings. Arrays and objects
/// land in `Other` and are rendered as JSON text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Other(serde_json::Value),
}

impl FieldValue {
    /// Whether the value counts as filled in.
    ///
    /// Empty strings, numeric zero and `false` are treated as missing. The
    /// string `"0"` is a real value.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
            FieldValue::Bool(flag) => *flag,
            FieldValue::Other(_) => true,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => match number.as_f64() {
                // `2.0` reads as `2`, the way the storefront typed it.
                Some(n) if number.is_f64() && n.fract() == 0.0 && n.abs() < 1e15 => {
                    write!(f, "{}", n as i64)
                }
                _ => write!(f, "{number}"),
            },
            FieldValue::Bool(flag) => write!(f, "{flag}"),
            FieldValue::Other(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

/// One customer order. Lives for the duration of a single request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderSubmission {
    pub name: Option<FieldValue>,
    pub phone: Option<FieldValue>,
    pub email: Option<FieldValue>,
    pub address: Option<FieldValue>,
    pub barangay: Option<FieldValue>,
    pub city: Option<FieldValue>,
    pub province: Option<FieldValue>,
    pub postcode: Option<FieldValue>,
    pub jewelry_type: Option<FieldValue>,
    pub quantity: Option<FieldValue>,
    pub engraving: Option<FieldValue>,
    pub payment_method: Option<FieldValue>,
    pub shipping_option: Option<FieldValue>,
    pub notes: Option<FieldValue>,
}

impl OrderSubmission {
    /// Required fields paired with their JSON names, in form order.
    pub fn required_fields(&self) -> [(&'static str, Option<&FieldValue>); 8] {
        [
            ("name", self.name.as_ref()),
            ("phone", self.phone.as_ref()),
            ("email", self.email.as_ref()),
            ("address", self.address.as_ref()),
            ("city", self.city.as_ref()),
            ("province", self.province.as_ref()),
            ("postcode", self.postcode.as_ref()),
            ("jewelryType", self.jewelry_type.as_ref()),
        ]
    }
}

/// Text of a field, or `default` when the field is missing.
pub(crate) fn text_or(field: &Option<FieldValue>, default: &str) -> String {
    match field {
        Some(value) if value.is_present() => value.to_string(),
        _ => default.to_string(),
    }
}
