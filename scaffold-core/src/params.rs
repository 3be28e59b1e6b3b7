//! Typed request parameters
//!
//! Every value kind has exactly one string rendering, shared by the
//! canonicalizer and the URL codec, so two implementations signing the same
//! set always produce the same bytes.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single parameter value
///
/// Values compare and hash by their rendered form: `Integer(5)` and
/// `Text("5")` sign and encode identically, so they are the same parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Rendered verbatim
    Text(String),
    /// Rendered in decimal, `-` only for negatives
    Integer(i64),
    /// Rendered in decimal
    Unsigned(u64),
    /// Rendered as `true` or `false`
    Bool(bool),
}

impl ParamValue {
    /// The value's string form, as signed and as sent
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Borrow the text if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Integer(n) => write!(f, "{}", n),
            ParamValue::Unsigned(n) => write!(f, "{}", n),
            ParamValue::Bool(true) => f.write_str("true"),
            ParamValue::Bool(false) => f.write_str("false"),
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Text(a), ParamValue::Text(b)) => a == b,
            _ => self.render() == other.render(),
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.render().hash(state);
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Unsigned(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Unsigned(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Request parameters keyed by name
///
/// Names are unique and iteration is always in byte order of the name, so
/// insertion order never leaks into signatures or URLs. There is no null
/// value: an absent optional parameter is simply not in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    entries: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Insert a parameter only when a value is present
    pub fn insert_optional<V: Into<ParamValue>>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.entries.insert(name.into(), value.into());
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a parameter
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    /// Remove a parameter
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.entries.remove(name)
    }

    /// Whether a parameter is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over parameters in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.entries.iter()
    }

    /// Parameter names in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for ParameterSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_rendering() {
        assert_eq!(ParamValue::from("abc").render(), "abc");
        assert_eq!(ParamValue::from(1_350_000_000_i64).render(), "1350000000");
        assert_eq!(ParamValue::from(-42).render(), "-42");
        assert_eq!(ParamValue::from(0_u64).render(), "0");
        assert_eq!(ParamValue::from(1_000_000_u32).render(), "1000000");
        assert_eq!(ParamValue::from(true).render(), "true");
        assert_eq!(ParamValue::from(false).render(), "false");
    }

    #[test]
    fn test_values_compare_by_rendering() {
        assert_eq!(ParamValue::from(5_i64), ParamValue::from("5"));
        assert_eq!(ParamValue::from(true), ParamValue::from("true"));
        assert_ne!(ParamValue::from(5_i64), ParamValue::from("05"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut params = ParameterSet::new();
        assert!(params.insert("name", "first").is_none());
        let replaced = params.insert("name", "second");

        assert_eq!(replaced, Some(ParamValue::from("first")));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("name").and_then(ParamValue::as_text), Some("second"));
    }

    #[test]
    fn test_absent_optional_is_omitted() {
        let mut params = ParameterSet::new();
        params.insert_optional("address2", None::<String>);
        params.insert_optional("zip", Some("94107"));

        assert!(!params.contains("address2"));
        assert!(params.contains("zip"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let params: ParameterSet = vec![("zeta", "1"), ("Alpha", "2"), ("alpha", "3"), ("_x", "4")]
            .into_iter()
            .collect();

        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["Alpha", "_x", "alpha", "zeta"]);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = ParameterSet::new().with("a", "1").with("b", 2);
        let b = ParameterSet::new().with("b", 2).with("a", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove() {
        let mut params = ParameterSet::new().with("signature", "abc").with("code", "1234");
        assert_eq!(params.remove("signature"), Some(ParamValue::from("abc")));
        assert!(params.remove("signature").is_none());
        assert_eq!(params.len(), 1);
        assert!(!params.is_empty());
    }
}
