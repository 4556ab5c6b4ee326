use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-provided hint about how many entities a container holds.
///
/// Containers hinted `large` never materialize their entities as tree
/// children; the entities render in the paginated table view instead.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCountHint {
    Small,
    Large,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A container (database, schema, bucket, namespace) as returned by a
/// container listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    /// Type label ("database", "schema", "bucket", ...)
    pub container_type: String,
    /// Per-container capability override; falls back to the hierarchy
    /// level's value when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_list_containers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_list_entities: Option<bool>,
    #[serde(default)]
    pub entity_count_hint: EntityCountHint,
}

impl ContainerSummary {
    pub fn new(name: impl Into<String>, container_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container_type: container_type.into(),
            can_list_containers: None,
            can_list_entities: None,
            entity_count_hint: EntityCountHint::Unknown,
        }
    }

    pub fn with_hint(mut self, hint: EntityCountHint) -> Self {
        self.entity_count_hint = hint;
        self
    }
}

/// An entity (table, collection, object) as returned by an entity listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    pub name: String,
    /// Type label ("table", "collection", "object", "key")
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl EntitySummary {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            row_count: None,
            size_bytes: None,
        }
    }
}

/// Field data types that can appear in query results.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Null,
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bytes,
    Date,
    Timestamp,
    Json,
    Uuid,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Date => "date",
            FieldType::Timestamp => "timestamp",
            FieldType::Json => "json",
            FieldType::Uuid => "uuid",
        };
        write!(f, "{}", name)
    }
}

/// Definition of a single field in an entity's schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
}

/// Detailed information about one entity, as returned by the entity
/// info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfo {
    pub name: String,
    pub entity_type: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Backend-specific metadata (content_type, last_modified, etag, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl EntityInfo {
    /// Whether this entity is a downloadable object rather than tabular
    /// data. Downloadable entities are never queried for rows.
    pub fn is_downloadable(&self) -> bool {
        if self.entity_type == "object" {
            return true;
        }
        self.metadata
            .as_ref()
            .and_then(|m| m.get("content_type"))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_count_hint_serde() {
        let hint: EntityCountHint = serde_json::from_str("\"large\"").unwrap();
        assert_eq!(hint, EntityCountHint::Large);
        // Unrecognized values fall back to unknown
        let hint: EntityCountHint = serde_json::from_str("\"huge\"").unwrap();
        assert_eq!(hint, EntityCountHint::Unknown);
    }

    #[test]
    fn test_object_entity_is_downloadable() {
        let info = EntityInfo {
            name: "report.pdf".to_string(),
            entity_type: "object".to_string(),
            fields: Vec::new(),
            row_count: None,
            size_bytes: Some(1024),
            metadata: None,
        };
        assert!(info.is_downloadable());
    }

    #[test]
    fn test_table_entity_is_not_downloadable() {
        let info = EntityInfo {
            name: "users".to_string(),
            entity_type: "table".to_string(),
            fields: Vec::new(),
            row_count: Some(10),
            size_bytes: None,
            metadata: None,
        };
        assert!(!info.is_downloadable());
    }

    #[test]
    fn test_content_type_metadata_is_downloadable() {
        let info = EntityInfo {
            name: "archive.tar".to_string(),
            entity_type: "blob".to_string(),
            fields: Vec::new(),
            row_count: None,
            size_bytes: None,
            metadata: Some(serde_json::json!({"content_type": "application/x-tar"})),
        };
        assert!(info.is_downloadable());
    }
}
