//! Ready-made service fixtures covering the three hierarchy shapes the
//! gateway declares: relational (3 levels), object store (2 levels with
//! a large bucket), and document store (2 levels, structured filters).

use crate::scripted::ScriptedService;
use datascope_types::{
    ContainerSummary, EntityCountHint, EntitySummary, HierarchyLevel, ServiceCapabilities,
};

fn level(
    level: u32,
    name: &str,
    container_type: &str,
    can_list_containers: bool,
    can_list_entities: bool,
) -> HierarchyLevel {
    HierarchyLevel {
        level,
        name: name.to_string(),
        container_type: container_type.to_string(),
        can_list_containers,
        can_list_entities,
    }
}

/// Capability table of a relational service: root lists databases,
/// databases list schemas, schemas list tables. Free-text filtering.
pub fn relational_capabilities() -> ServiceCapabilities {
    ServiceCapabilities {
        service_type: "postgres".to_string(),
        capabilities: vec!["sql".to_string()],
        hierarchy: vec![
            level(0, "root", "database", true, false),
            level(1, "database", "schema", true, false),
            level(2, "schema", "table", false, true),
        ],
        filter_schema: None,
    }
}

/// Capability table of an object store: root lists buckets, buckets
/// list objects. No filtering.
pub fn object_store_capabilities() -> ServiceCapabilities {
    ServiceCapabilities {
        service_type: "s3".to_string(),
        capabilities: vec!["object-store".to_string()],
        hierarchy: vec![
            level(0, "root", "bucket", true, false),
            level(1, "bucket", "object", false, true),
        ],
        filter_schema: None,
    }
}

/// Capability table of a document store: root lists databases,
/// databases list collections. Structured filtering from a schema.
pub fn document_store_capabilities() -> ServiceCapabilities {
    ServiceCapabilities {
        service_type: "mongodb".to_string(),
        capabilities: vec!["document".to_string()],
        hierarchy: vec![
            level(0, "root", "database", true, false),
            level(1, "database", "collection", false, true),
        ],
        filter_schema: Some(serde_json::json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["active", "archived"],
                    "description": "Document status"
                },
                "owner": { "type": "string" },
                "min_score": { "type": "number" },
                "include_deleted": { "type": "boolean" },
                "notes": { "type": "string", "format": "textarea" }
            }
        })),
    }
}

fn row(pairs: &[(&str, serde_json::Value)]) -> serde_json::Map<String, serde_json::Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// A relational service with one database, two schemas, and a `users`
/// and `events` table under `mydb/public`.
pub fn relational_service() -> ScriptedService {
    let events: Vec<_> = (0..250)
        .map(|i| {
            row(&[
                ("id", serde_json::json!(i)),
                ("kind", serde_json::json!(if i % 2 == 0 { "click" } else { "view" })),
                ("timestamp", serde_json::json!(format!("2026-01-{:02}T00:00:00Z", (i % 28) + 1))),
            ])
        })
        .collect();

    ScriptedService::new(relational_capabilities())
        .with_containers("", vec![ContainerSummary::new("mydb", "database")])
        .with_containers(
            "mydb",
            vec![
                ContainerSummary::new("public", "schema").with_hint(EntityCountHint::Small),
                ContainerSummary::new("internal", "schema").with_hint(EntityCountHint::Small),
            ],
        )
        .with_entities(
            "mydb/public",
            vec![
                EntitySummary::new("users", "table"),
                EntitySummary::new("events", "table"),
            ],
        )
        .with_rows(
            "mydb/public",
            "users",
            vec![
                row(&[("id", serde_json::json!(1)), ("name", serde_json::json!("ada"))]),
                row(&[("id", serde_json::json!(2)), ("name", serde_json::json!("grace"))]),
                row(&[("id", serde_json::json!(3)), ("name", serde_json::json!("edsger"))]),
            ],
        )
        .with_rows("mydb/public", "events", events)
}

/// An object store with a small `assets` bucket (objects appear in the
/// tree) and a `logs` bucket hinted large (objects stay out of it).
pub fn object_store_service() -> ScriptedService {
    let log_objects: Vec<_> = (0..500)
        .map(|i| EntitySummary::new(format!("app-{i:04}.log"), "object"))
        .collect();

    ScriptedService::new(object_store_capabilities())
        .with_containers(
            "",
            vec![
                ContainerSummary::new("assets", "bucket").with_hint(EntityCountHint::Small),
                ContainerSummary::new("logs", "bucket").with_hint(EntityCountHint::Large),
            ],
        )
        .with_entities(
            "assets",
            vec![
                EntitySummary::new("logo.png", "object"),
                EntitySummary::new("report.pdf", "object"),
            ],
        )
        .with_entities("logs", log_objects)
        .with_object("assets", "logo.png", b"\x89PNG-not-really".to_vec(), Some("image/png"))
        .with_object(
            "assets",
            "report.pdf",
            b"%PDF-1.7 fixture".to_vec(),
            Some("application/pdf"),
        )
}

/// A document store with one database and two collections; structured
/// filters per `document_store_capabilities`.
pub fn document_store_service() -> ScriptedService {
    ScriptedService::new(document_store_capabilities())
        .with_containers("", vec![ContainerSummary::new("appdata", "database")])
        .with_entities(
            "appdata",
            vec![
                EntitySummary::new("sessions", "collection"),
                EntitySummary::new("profiles", "collection"),
            ],
        )
        .with_rows(
            "appdata",
            "profiles",
            vec![
                row(&[
                    ("_id", serde_json::json!("p1")),
                    ("status", serde_json::json!("active")),
                ]),
                row(&[
                    ("_id", serde_json::json!("p2")),
                    ("status", serde_json::json!("archived")),
                ]),
            ],
        )
}
