//! Query value types for Grove GraphQL.

use std::fmt::{self, Write as _};

/// A value as written in a query document. May reference variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    Variable(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

/// A value with all variables already substituted.
///
/// Object fields are kept as an ordered pair list, exactly as the parser
/// produced them; duplicate keys are preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    List(Vec<ConstValue>),
    Object(Vec<(String, ConstValue)>),
}

impl ConstValue {
    /// Returns true for `ConstValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    /// Builds a const value from a JSON value.
    ///
    /// Numbers become `Int` when they fit in an `i64`, `Float` otherwise.
    pub fn from_json(value: serde_json::Value) -> ConstValue {
        match value {
            serde_json::Value::Null => ConstValue::Null,
            serde_json::Value::Bool(b) => ConstValue::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConstValue::Int(i),
                None => n.as_f64().map(ConstValue::Float).unwrap_or(ConstValue::Null),
            },
            serde_json::Value::String(s) => ConstValue::String(s),
            serde_json::Value::Array(items) => {
                ConstValue::List(items.into_iter().map(ConstValue::from_json).collect())
            }
            serde_json::Value::Object(fields) => ConstValue::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, ConstValue::from_json(value)))
                    .collect(),
            ),
        }
    }
}

impl From<ConstValue> for serde_json::Value {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Null => serde_json::Value::Null,
            ConstValue::Int(n) => n.into(),
            ConstValue::Float(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConstValue::String(s) => s.into(),
            ConstValue::Boolean(b) => b.into(),
            ConstValue::Enum(name) => name.into(),
            ConstValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            ConstValue::Object(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, value.into()))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for ConstValue {
    fn from(value: i64) -> Self {
        ConstValue::Int(value)
    }
}

impl From<f64> for ConstValue {
    fn from(value: f64) -> Self {
        ConstValue::Float(value)
    }
}

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Boolean(value)
    }
}

impl From<&str> for ConstValue {
    fn from(value: &str) -> Self {
        ConstValue::String(value.to_string())
    }
}

impl From<String> for ConstValue {
    fn from(value: String) -> Self {
        ConstValue::String(value)
    }
}

impl From<Vec<ConstValue>> for ConstValue {
    fn from(items: Vec<ConstValue>) -> Self {
        ConstValue::List(items)
    }
}

impl fmt::Display for ConstValue {
    /// Formats the value as a query-document literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Int(n) => write!(f, "{}", n),
            ConstValue::Float(n) => write!(f, "{}", n),
            ConstValue::String(s) => write_quoted(f, s),
            ConstValue::Boolean(b) => write!(f, "{}", b),
            ConstValue::Enum(name) => f.write_str(name),
            ConstValue::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
            ConstValue::Object(fields) => {
                f.write_char('{')?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let value = ConstValue::from_json(serde_json::json!({
            "id": 7,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "active": true,
            "missing": null,
        }));

        assert_eq!(
            value,
            ConstValue::Object(vec![
                ("id".to_string(), ConstValue::Int(7)),
                ("ratio".to_string(), ConstValue::Float(0.5)),
                (
                    "tags".to_string(),
                    ConstValue::List(vec![ConstValue::from("a"), ConstValue::from("b")])
                ),
                ("active".to_string(), ConstValue::Boolean(true)),
                ("missing".to_string(), ConstValue::Null),
            ])
        );
    }

    #[test]
    fn test_into_json_preserves_field_order() {
        let value = ConstValue::Object(vec![
            ("z".to_string(), ConstValue::Int(1)),
            ("a".to_string(), ConstValue::Int(2)),
        ]);

        let json: serde_json::Value = value.into();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_enum_serializes_as_string() {
        let json: serde_json::Value = ConstValue::Enum("ACTIVE".to_string()).into();
        assert_eq!(json, serde_json::json!("ACTIVE"));
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(ConstValue::Null.to_string(), "null");
        assert_eq!(ConstValue::Int(42).to_string(), "42");
        assert_eq!(ConstValue::from("a \"quoted\" str").to_string(), "\"a \\\"quoted\\\" str\"");
        assert_eq!(ConstValue::Enum("RED".to_string()).to_string(), "RED");
        assert_eq!(
            ConstValue::List(vec![ConstValue::Int(1), ConstValue::Int(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(
            ConstValue::Object(vec![("limit".to_string(), ConstValue::Int(10))]).to_string(),
            "{limit: 10}"
        );
    }
}
