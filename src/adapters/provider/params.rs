//! Query parameters for provider requests
//!
//! List values are comma-joined and unset values are dropped before the
//! request is built.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamValue {
    Single(String),
    List(Vec<String>),
}

/// Ordered set of query parameters
///
/// # Examples
///
/// ```
/// use courtsync::adapters::provider::QueryParams;
///
/// let params = QueryParams::new()
///     .list("team", ["BOS", "NYK"])
///     .opt("position", None::<String>)
///     .set("limit", 50);
///
/// assert_eq!(
///     params.to_pairs(),
///     vec![
///         ("limit".to_string(), "50".to_string()),
///         ("team".to_string(), "BOS,NYK".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Option<ParamValue>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.values
            .insert(key.into(), Some(ParamValue::Single(value.to_string())));
        self
    }

    /// Sets `key` when `value` is present; `None` removes any earlier value
    pub fn opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.values.insert(
            key.into(),
            value.map(|v| ParamValue::Single(v.to_string())),
        );
        self
    }

    pub fn list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.values.insert(key.into(), Some(ParamValue::List(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_pairs().is_empty()
    }

    /// Key/value pairs ready for the request, sorted by key
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value.as_ref()? {
                    ParamValue::Single(v) => v.clone(),
                    ParamValue::List(items) => {
                        let items: Vec<&str> = items
                            .iter()
                            .map(|item| item.trim())
                            .filter(|item| !item.is_empty())
                            .collect();
                        if items.is_empty() {
                            return None;
                        }
                        items.join(",")
                    }
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_values_are_comma_joined() {
        let params = QueryParams::new().list("player", [201939, 2544]);
        assert_eq!(
            params.to_pairs(),
            vec![("player".to_string(), "201939,2544".to_string())]
        );
    }

    #[test]
    fn test_unset_values_are_dropped() {
        let params = QueryParams::new()
            .opt("status", None::<&str>)
            .opt("rosterStatus", Some("assigned-to-roster"))
            .list("team", Vec::<String>::new());

        assert_eq!(
            params.to_pairs(),
            vec![("rosterStatus".to_string(), "assigned-to-roster".to_string())]
        );
    }

    #[test]
    fn test_none_clears_previous_value() {
        let params = QueryParams::new().set("limit", 10).opt("limit", None::<u32>);
        assert!(params.is_empty());
    }

    #[test]
    fn test_blank_list_items_skipped() {
        let params = QueryParams::new().list("stats", ["pts", " ", "reb "]);
        assert_eq!(params.to_pairs()[0].1, "pts,reb");
    }
}
