//! Stored values and typed conversions.
//!
//! Reads are forgiving: an integer stored where a float is expected (or a
//! numeric string where an integer is expected) still converts.  Anything
//! that cannot be converted yields `None`, and typed getters fall back to the
//! caller's default.

use serde::{Deserialize, Serialize};

/// A single stored scalar.
///
/// Serialized untagged so that the TOML backend stays human-editable
/// (`"…/LidarPort" = 2368`).  Variant order matters for deserialization:
/// integers are tried before floats, string lists before byte blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    StringList(Vec<String>),
    /// Opaque blob (window geometry).
    Bytes(Vec<u8>),
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        SettingValue::Int(v as i64)
    }
}

impl From<u16> for SettingValue {
    fn from(v: u16) -> Self {
        SettingValue::Int(v as i64)
    }
}

impl From<usize> for SettingValue {
    fn from(v: usize) -> Self {
        SettingValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Double(v)
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::String(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::String(v.to_string())
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(v: Vec<String>) -> Self {
        SettingValue::StringList(v)
    }
}

impl From<Vec<u8>> for SettingValue {
    fn from(v: Vec<u8>) -> Self {
        SettingValue::Bytes(v)
    }
}

/// Conversion from a stored value into a concrete type.
pub trait FromSetting: Sized {
    fn from_setting(value: &SettingValue) -> Option<Self>;
}

impl FromSetting for i64 {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(i) => Some(*i),
            SettingValue::Double(d) if d.is_finite() => Some(d.round() as i64),
            SettingValue::Bool(b) => Some(*b as i64),
            SettingValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromSetting for i32 {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        i64::from_setting(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl FromSetting for f64 {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Double(d) => Some(*d),
            SettingValue::Int(i) => Some(*i as f64),
            SettingValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromSetting for bool {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Int(i) => Some(*i != 0),
            SettingValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromSetting for String {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::String(s) => Some(s.clone()),
            SettingValue::Int(i) => Some(i.to_string()),
            SettingValue::Double(d) => Some(d.to_string()),
            SettingValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromSetting for Vec<String> {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::StringList(l) => Some(l.clone()),
            SettingValue::String(s) => Some(vec![s.clone()]),
            SettingValue::Bytes(b) if b.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }
}

impl FromSetting for Vec<u8> {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bytes(b) => Some(b.clone()),
            SettingValue::String(s) => Some(s.as_bytes().to_vec()),
            SettingValue::StringList(l) if l.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }
}
