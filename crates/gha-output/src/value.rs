//! Output values and ordered output sets

use serde_json::Value;

use crate::OutputError;

/// A value that can be written to the output channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl OutputValue {
    /// Convert a selected JSON value.
    ///
    /// Only strings, integers, booleans and null are accepted; floats,
    /// sequences and mappings fail with `UnsupportedOutputType`.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, OutputError> {
        let unsupported = |kind| OutputError::UnsupportedOutputType {
            name: name.to_string(),
            kind,
        };
        match value {
            Value::Null => Ok(OutputValue::Null),
            Value::Bool(b) => Ok(OutputValue::Bool(*b)),
            Value::String(s) => Ok(OutputValue::Str(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(OutputValue::Int)
                .ok_or_else(|| unsupported("float")),
            Value::Array(_) => Err(unsupported("sequence")),
            Value::Object(_) => Err(unsupported("mapping")),
        }
    }

    /// Render the value as it appears in the output channel
    pub fn render(&self, name: &str) -> String {
        match self {
            OutputValue::Str(s) => s.clone(),
            OutputValue::Int(n) => n.to_string(),
            OutputValue::Bool(true) => name.to_lowercase(),
            OutputValue::Bool(false) | OutputValue::Null => String::new(),
        }
    }
}

impl From<&str> for OutputValue {
    fn from(s: &str) -> Self {
        OutputValue::Str(s.to_string())
    }
}

impl From<String> for OutputValue {
    fn from(s: String) -> Self {
        OutputValue::Str(s)
    }
}

impl From<bool> for OutputValue {
    fn from(b: bool) -> Self {
        OutputValue::Bool(b)
    }
}

impl From<i64> for OutputValue {
    fn from(n: i64) -> Self {
        OutputValue::Int(n)
    }
}

impl<T: Into<OutputValue>> From<Option<T>> for OutputValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(OutputValue::Null)
    }
}

/// Named outputs in insertion order; inserting an existing name replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    entries: Vec<(String, OutputValue)>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OutputValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OutputValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert every entry of `other`, replacing values already present
    pub fn extend(&mut self, other: Outputs) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_encoding() {
        assert_eq!(OutputValue::Bool(true).render("LOGIN_GITHUB"), "login_github");
        assert_eq!(OutputValue::Bool(false).render("LOGIN_GITHUB"), "");
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(OutputValue::Int(42).render("N"), "42");
        assert_eq!(OutputValue::Null.render("N"), "");
        assert_eq!(OutputValue::from("x").render("N"), "x");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(
            OutputValue::from_json("A", &json!("s")).unwrap(),
            OutputValue::Str("s".to_string())
        );
        assert_eq!(OutputValue::from_json("A", &json!(7)).unwrap(), OutputValue::Int(7));
        assert_eq!(OutputValue::from_json("A", &json!(null)).unwrap(), OutputValue::Null);
    }

    #[test]
    fn test_from_json_unsupported() {
        for value in [json!(1.5), json!(["a"]), json!({"a": 1})] {
            let err = OutputValue::from_json("BAD", &value).unwrap_err();
            assert!(matches!(err, OutputError::UnsupportedOutputType { .. }));
            assert!(err.to_string().contains("BAD"));
        }
    }

    #[test]
    fn test_outputs_replace_in_place() {
        let mut outputs = Outputs::new().with("A", "1").with("B", true);
        outputs.insert("A", "2");

        let names: Vec<&str> = outputs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(outputs.get("A"), Some(&OutputValue::from("2")));
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<String> = None;
        assert_eq!(OutputValue::from(none), OutputValue::Null);
        assert_eq!(OutputValue::from(Some("v")), OutputValue::from("v"));
    }
}
