use serde::{Deserialize, Serialize};

/// One level of a service's declared container hierarchy.
///
/// Services describe their navigation structure as a table indexed by
/// depth. A PostgreSQL service declares three levels (root lists
/// databases, databases list schemas, schemas list tables); an object
/// store declares two (root lists buckets, buckets list objects).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HierarchyLevel {
    /// Level number (0 = root)
    pub level: u32,
    /// Human-readable name for this level
    pub name: String,
    /// Type label of containers found at this level
    pub container_type: String,
    /// Can list sub-containers at this level?
    pub can_list_containers: bool,
    /// Can list entities at this level?
    pub can_list_entities: bool,
}

/// How a service expects filters to be expressed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Free-text fragment passed through verbatim (SQL WHERE clause)
    Text,
    /// Key/value object built from the declared filter schema
    Structured,
    /// Service does not accept filters
    None,
}

/// Capability metadata for one service, fetched once per service
/// selection and immutable for the lifetime of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCapabilities {
    /// Service type identifier ("postgres", "s3", "mongodb", ...)
    pub service_type: String,
    /// Capability tags declared by the service ("sql", "object-store", ...)
    pub capabilities: Vec<String>,
    /// Hierarchy levels, indexed by depth
    pub hierarchy: Vec<HierarchyLevel>,
    /// JSON Schema for structured filters, when the service supports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_schema: Option<serde_json::Value>,
}

impl ServiceCapabilities {
    /// Decide the filter mode from the declared metadata: a filter schema
    /// means structured filtering, an `sql` capability tag means free
    /// text, anything else means no filtering.
    pub fn filter_mode(&self) -> FilterMode {
        if self.filter_schema.is_some() {
            FilterMode::Structured
        } else if self.capabilities.iter().any(|c| c == "sql") {
            FilterMode::Text
        } else {
            FilterMode::None
        }
    }

    pub fn level(&self, depth: u32) -> Option<&HierarchyLevel> {
        self.hierarchy.iter().find(|l| l.level == depth)
    }

    pub fn max_level(&self) -> Option<&HierarchyLevel> {
        self.hierarchy.iter().max_by_key(|l| l.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(tags: &[&str], filter_schema: Option<serde_json::Value>) -> ServiceCapabilities {
        ServiceCapabilities {
            service_type: "test".to_string(),
            capabilities: tags.iter().map(|s| s.to_string()).collect(),
            hierarchy: Vec::new(),
            filter_schema,
        }
    }

    #[test]
    fn test_filter_mode_structured_wins_over_sql() {
        let c = caps(&["sql"], Some(serde_json::json!({"type": "object"})));
        assert_eq!(c.filter_mode(), FilterMode::Structured);
    }

    #[test]
    fn test_filter_mode_text_for_sql() {
        assert_eq!(caps(&["sql"], None).filter_mode(), FilterMode::Text);
    }

    #[test]
    fn test_filter_mode_none_otherwise() {
        assert_eq!(caps(&["object-store"], None).filter_mode(), FilterMode::None);
    }
}
