//! Natural key types
//!
//! Every stored record is matched by the provider's external identifier, or by
//! a composite of identifiers for records such as game logs. [`NaturalKey`]
//! keeps the parts in the same order as the table's key columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One component of a natural key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Int(i64),
    Text(String),
}

impl KeyPart {
    /// Provider ids are positive; zero or negative means the upstream id was unusable
    pub fn is_valid(&self) -> bool {
        match self {
            KeyPart::Int(id) => *id > 0,
            KeyPart::Text(text) => !text.trim().is_empty(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            KeyPart::Int(id) => serde_json::Value::from(*id),
            KeyPart::Text(text) => serde_json::Value::from(text.as_str()),
        }
    }

    /// Reads a key part back out of a stored JSON row
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(KeyPart::Int),
            serde_json::Value::String(s) => Some(KeyPart::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Int(id) => write!(f, "{id}"),
            KeyPart::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<i64> for KeyPart {
    fn from(id: i64) -> Self {
        KeyPart::Int(id)
    }
}

impl From<&str> for KeyPart {
    fn from(text: &str) -> Self {
        KeyPart::Text(text.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(text: String) -> Self {
        KeyPart::Text(text)
    }
}

/// Single-column or composite key used to match rows on upsert
///
/// # Examples
///
/// ```
/// use courtsync::domain::ids::NaturalKey;
///
/// let key = NaturalKey::composite([201939_i64, 14_i64]);
/// assert_eq!(key.to_string(), "201939/14");
/// assert!(key.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey(Vec<KeyPart>);

impl NaturalKey {
    pub fn single(part: impl Into<KeyPart>) -> Self {
        Self(vec![part.into()])
    }

    pub fn composite<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(KeyPart::is_valid)
    }

    /// Builds a `{column: value}` object for the given key columns
    ///
    /// Columns beyond the number of parts are ignored.
    pub fn to_json_object(&self, columns: &[&str]) -> serde_json::Value {
        let map = columns
            .iter()
            .zip(self.0.iter())
            .map(|(column, part)| ((*column).to_string(), part.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Extracts the key for `columns` from a serialized row
    pub fn from_row(row: &serde_json::Value, columns: &[&str]) -> Option<Self> {
        columns
            .iter()
            .map(|column| row.get(*column).and_then(KeyPart::from_json))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{rendered}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_key_display() {
        let key = NaturalKey::single(42);
        assert_eq!(key.to_string(), "42");
    }

    #[test]
    fn test_invalid_keys() {
        assert!(!NaturalKey::single(0).is_valid());
        assert!(!NaturalKey::single(-3).is_valid());
        assert!(!NaturalKey::single("  ").is_valid());
        assert!(!NaturalKey::composite(Vec::<i64>::new()).is_valid());
    }

    #[test]
    fn test_mixed_composite_key() {
        let key = NaturalKey::composite([
            KeyPart::Int(9),
            KeyPart::Int(3),
            KeyPart::Text("actual".to_string()),
        ]);
        assert!(key.is_valid());
        assert_eq!(key.to_string(), "9/3/actual");
    }

    #[test]
    fn test_key_json_object() {
        let key = NaturalKey::composite([5_i64, 7_i64]);
        let object = key.to_json_object(&["player_id", "game_id"]);
        assert_eq!(object, json!({"player_id": 5, "game_id": 7}));
    }

    #[test]
    fn test_key_from_row() {
        let row = json!({"player_id": 5, "game_id": 7, "points": 31});
        let key = NaturalKey::from_row(&row, &["player_id", "game_id"]).unwrap();
        assert_eq!(key, NaturalKey::composite([5_i64, 7_i64]));

        assert!(NaturalKey::from_row(&row, &["team_id"]).is_none());
    }
}
