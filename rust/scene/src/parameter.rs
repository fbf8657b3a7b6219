// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter values stored on operation nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A loosely typed scalar, as stored on an operation node.
///
/// Conversions are lenient: text that does not parse converts to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Double(f64),
    String(String),
}

impl Default for ParameterValue {
    /// The empty value: an empty string (converts to `0`).
    fn default() -> Self {
        ParameterValue::String(String::new())
    }
}

impl ParameterValue {
    pub fn to_f64(&self) -> f64 {
        match self {
            ParameterValue::Int(v) => *v as f64,
            ParameterValue::Double(v) => *v,
            ParameterValue::String(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    /// Integer value. Doubles and numeric text are truncated toward zero.
    pub fn to_i64(&self) -> i64 {
        match self {
            ParameterValue::Int(v) => *v,
            ParameterValue::Double(v) => *v as i64,
            ParameterValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|v| v as i64))
                    .unwrap_or(0)
            }
        }
    }

    /// Text form of the value
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// The string payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for the empty string value
    pub fn is_empty(&self) -> bool {
        matches!(self, ParameterValue::String(s) if s.is_empty())
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::Double(v) => write!(f, "{v}"),
            ParameterValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Double(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::String(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_conversions() {
        assert_eq!(ParameterValue::from("2.5").to_f64(), 2.5);
        assert_eq!(ParameterValue::from(" 7 ").to_i64(), 7);
        assert_eq!(ParameterValue::from("3.9").to_i64(), 3);
        assert_eq!(ParameterValue::from("abc").to_f64(), 0.0);
        assert_eq!(ParameterValue::default().to_i64(), 0);
        assert_eq!(ParameterValue::Double(-1.7).to_i64(), -1);
        assert_eq!(ParameterValue::Int(4).to_f64(), 4.0);
    }

    #[test]
    fn test_text() {
        assert_eq!(ParameterValue::Int(3).text(), "3");
        assert_eq!(ParameterValue::Double(0.5).text(), "0.5");
        assert_eq!(ParameterValue::from("Fixed").text(), "Fixed");
        assert!(ParameterValue::default().is_empty());
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<ParameterValue> = serde_json::from_str(r#"[1, 1.5, "Scaled"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ParameterValue::Int(1),
                ParameterValue::Double(1.5),
                ParameterValue::from("Scaled"),
            ]
        );
    }
}
