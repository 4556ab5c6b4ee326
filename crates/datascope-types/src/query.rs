use crate::catalog::FieldDef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// A filter in whichever representation the service accepts.
///
/// The browser never interprets filters; they pass through verbatim to
/// the backend query call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Free-text fragment (e.g. a SQL WHERE clause)
    Text(String),
    /// Structured key/value filter built from the service's filter schema
    Structured(BTreeMap<String, serde_json::Value>),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::Structured(map) => map.is_empty(),
        }
    }

    /// Backend wire form: text filters become `{"where": "..."}`,
    /// structured filters serialize as the object itself.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            FilterValue::Text(s) => serde_json::json!({ "where": s }),
            FilterValue::Structured(map) => {
                serde_json::to_value(map).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// Options for a single data query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOptions {
    pub limit: usize,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterValue>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            sort_by: None,
            sort_order: SortOrder::Asc,
            filter: None,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPage {
    pub fields: Vec<FieldDef>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    /// Total rows matching the query before limit/offset, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    pub returned_count: usize,
    pub execution_ms: u64,
}

impl QueryPage {
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            rows: Vec::new(),
            total_count: Some(0),
            returned_count: 0,
            execution_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_toggle() {
        assert_eq!(SortOrder::Asc.toggle(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.toggle(), SortOrder::Asc);
    }

    #[test]
    fn test_text_filter_wire_form() {
        let filter = FilterValue::Text("age > 21".to_string());
        assert_eq!(filter.to_wire(), serde_json::json!({"where": "age > 21"}));
    }

    #[test]
    fn test_structured_filter_wire_form() {
        let mut map = BTreeMap::new();
        map.insert("status".to_string(), serde_json::json!("active"));
        let filter = FilterValue::Structured(map);
        assert_eq!(filter.to_wire(), serde_json::json!({"status": "active"}));
    }

    #[test]
    fn test_blank_text_filter_is_empty() {
        assert!(FilterValue::Text("   ".to_string()).is_empty());
        assert!(!FilterValue::Text("id = 1".to_string()).is_empty());
    }
}
