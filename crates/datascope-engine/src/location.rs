use crate::store::TreeStore;
use datascope_types::ContainerPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The persisted, shareable navigation state of a browser session: a
/// selected container path and optionally a selected entity within it.
///
/// Encodes to a query string with exactly two parameters, `path` and
/// `entity`. Reconstructing a session from the encoded form reproduces
/// the same expansion and selection state (see `location_to_plan`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: Option<ContainerPath>,
    pub entity: Option<String>,
}

impl Location {
    pub fn container(path: ContainerPath) -> Self {
        Self {
            path: Some(path),
            entity: None,
        }
    }

    pub fn entity(path: ContainerPath, entity: impl Into<String>) -> Self {
        Self {
            path: Some(path),
            entity: Some(entity.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_none() && self.entity.is_none()
    }

    /// Encode as a query string. Segment separators survive verbatim;
    /// everything else that could collide with the query syntax is
    /// percent-encoded.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(path) = &self.path {
            let encoded: Vec<String> = path
                .segments
                .iter()
                .map(|s| urlencoding::encode(s).into_owned())
                .collect();
            parts.push(format!("path={}", encoded.join("/")));
        }
        if let Some(entity) = &self.entity {
            parts.push(format!("entity={}", urlencoding::encode(entity)));
        }
        parts.join("&")
    }

    /// Parse a query string produced by `to_query_string`. Unknown
    /// parameters are ignored; an empty string is the empty location.
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut location = Location::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            match key {
                "path" => {
                    let segments: Vec<String> = value
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(|s| {
                            urlencoding::decode(s)
                                .map(|d| d.into_owned())
                                .unwrap_or_else(|_| s.to_string())
                        })
                        .collect();
                    if !segments.is_empty() {
                        location.path = Some(ContainerPath::new(segments));
                    }
                }
                "entity" => {
                    let decoded = urlencoding::decode(value)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| value.to_string());
                    if !decoded.is_empty() {
                        location.entity = Some(decoded);
                    }
                }
                _ => {}
            }
        }
        location
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_string())
    }
}

/// One step of an expansion plan: an ancestor prefix that still needs
/// attention before the selection is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionStep {
    pub path: ContainerPath,
    /// Children for this prefix have not been loaded yet
    pub needs_load: bool,
    /// The node exists but is collapsed
    pub needs_expand: bool,
}

/// The work required to make a location visible in the tree, computed
/// as a pure function of the location and the current store snapshot.
///
/// Steps are ordered shortest-prefix first and must be executed
/// sequentially, each load awaited before moving on: the nodes of a
/// deeper prefix do not exist until the shallower prefix has loaded.
/// The plan is a snapshot; executors re-check each step against the
/// live store, so re-planning mid-flight is safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionPlan {
    pub steps: Vec<ExpansionStep>,
    pub select: Location,
}

impl ExpansionPlan {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Compute the expansion plan for a location against a store snapshot.
///
/// Every proper ancestor of the selected path gets a step when it is
/// collapsed or unloaded. The deepest segment itself gets a step only
/// when an entity under it is selected (its children must be loaded to
/// show the entity) or when it is an expandable container; a container
/// hinted `large` selected on its own is selected without expansion.
pub fn location_to_plan(location: &Location, store: &TreeStore) -> ExpansionPlan {
    let mut plan = ExpansionPlan {
        steps: Vec::new(),
        select: location.clone(),
    };

    let Some(path) = &location.path else {
        return plan;
    };

    let prefixes = path.prefixes();
    let last_index = prefixes.len().saturating_sub(1);

    for (i, prefix) in prefixes.iter().enumerate() {
        let key = prefix.join();
        let node = store.get(&key);

        let is_final = i == last_index;
        let wants_children = if is_final {
            // The deepest segment opens up only for an entity selection
            // or when its children belong in the tree.
            location.entity.is_some() || node.map(|n| n.is_expandable()) == Some(true)
        } else {
            true
        };

        if !wants_children {
            continue;
        }

        match node {
            Some(node) => {
                let needs_load = !node.is_loaded;
                let needs_expand = !node.is_expanded;
                if needs_load || needs_expand {
                    plan.steps.push(ExpansionStep {
                        path: prefix.clone(),
                        needs_load,
                        needs_expand,
                    });
                }
            }
            // Node not materialized yet: its parent hasn't loaded. It
            // still needs both; the executor reaches it after the
            // previous step's load lands.
            None => plan.steps.push(ExpansionStep {
                path: prefix.clone(),
                needs_load: true,
                needs_expand: true,
            }),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::CapabilityResolver;
    use datascope_types::{ContainerSummary, EntityCountHint};

    #[test]
    fn test_query_string_round_trip() {
        let location = Location::entity(ContainerPath::parse("mydb/public"), "events");
        let encoded = location.to_query_string();
        assert_eq!(encoded, "path=mydb/public&entity=events");
        assert_eq!(Location::parse(&encoded), location);
    }

    #[test]
    fn test_round_trip_with_awkward_names() {
        let location = Location::entity(
            ContainerPath::new(vec!["my db".to_string(), "a&b".to_string()]),
            "50%=half",
        );
        let encoded = location.to_query_string();
        assert_eq!(Location::parse(&encoded), location);
    }

    #[test]
    fn test_parse_empty_and_unknown_params() {
        assert!(Location::parse("").is_empty());
        assert!(Location::parse("?tab=data&foo").is_empty());
        let location = Location::parse("?path=a/b");
        assert_eq!(location.path, Some(ContainerPath::parse("a/b")));
        assert_eq!(location.entity, None);
    }

    #[test]
    fn test_location_serialization_shape() {
        let location = Location::entity(ContainerPath::parse("mydb/public"), "events");
        insta::assert_json_snapshot!(location, @r#"
        {
          "path": {
            "segments": [
              "mydb",
              "public"
            ]
          },
          "entity": "events"
        }
        "#);
    }

    #[test]
    fn test_plan_covers_unmaterialized_prefixes() {
        let store = TreeStore::new();
        let location = Location::container(ContainerPath::parse("a/b/c"));
        let plan = location_to_plan(&location, &store);

        // The ancestors are planned even though their nodes do not exist
        // yet. The final prefix is not: whether it opens up is only known
        // once it materializes, and executors re-plan after each load.
        assert_eq!(plan.steps.len(), 2);
        assert!(plan.steps.iter().all(|s| s.needs_load && s.needs_expand));
        assert_eq!(plan.steps[0].path.join(), "a");
        assert_eq!(plan.steps[1].path.join(), "a/b");
    }

    #[test]
    fn test_plan_skips_already_expanded_prefixes() {
        let resolver = CapabilityResolver::new();
        let mut store = TreeStore::new();
        store.insert_roots(&[ContainerSummary::new("a", "folder")], &resolver);
        store.load_children_at("a", &[ContainerSummary::new("b", "folder")], &[], &resolver);
        store.expand("a");

        let location = Location::entity(ContainerPath::parse("a/b"), "events");
        let plan = location_to_plan(&location, &store);

        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].path.join(), "a/b");
        assert!(plan.steps[0].needs_load);
    }

    #[test]
    fn test_large_container_selection_does_not_expand() {
        let resolver = CapabilityResolver::new();
        let mut store = TreeStore::new();
        let mut leaf = ContainerSummary::new("bucket", "bucket").with_hint(EntityCountHint::Large);
        leaf.can_list_containers = Some(false);
        leaf.can_list_entities = Some(true);
        store.insert_roots(&[leaf], &resolver);

        let location = Location::container(ContainerPath::parse("bucket"));
        let plan = location_to_plan(&location, &store);
        assert!(plan.is_noop());

        // But selecting an entity inside it does require loading it.
        let location = Location::entity(ContainerPath::parse("bucket"), "object.bin");
        let plan = location_to_plan(&location, &store);
        assert_eq!(plan.steps.len(), 1);
    }
}
