use crate::resolver::CapabilityResolver;
use datascope_types::{ContainerPath, ContainerSummary, EntityCountHint, EntitySummary};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Entity,
}

/// One node of the browser tree.
///
/// `path` is the slash-joined key of the node and is unique within the
/// store; it is always `parent.path + "/" + name` except for root-level
/// nodes, whose path is just their name.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub depth: u32,
    /// Whether a load-children request has completed for this node.
    /// Distinct from "has no children".
    pub is_loaded: bool,
    pub is_expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    pub can_list_containers: bool,
    pub can_list_entities: bool,
    pub entity_count_hint: EntityCountHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Child paths in listing order
    pub children: Vec<String>,
}

impl TreeNode {
    fn container(
        parent: &ContainerPath,
        summary: &ContainerSummary,
        resolver: &CapabilityResolver,
    ) -> Self {
        let path = parent.child(&summary.name);
        let resolved = resolver.resolve(path.depth());
        Self {
            name: summary.name.clone(),
            depth: path.depth(),
            path: path.join(),
            kind: NodeKind::Container,
            is_loaded: false,
            is_expanded: false,
            container_type: Some(summary.container_type.clone()),
            // Per-container hints from the listing override the depth-level
            // capabilities when present.
            can_list_containers: summary
                .can_list_containers
                .unwrap_or(resolved.can_list_containers),
            can_list_entities: summary
                .can_list_entities
                .unwrap_or(resolved.can_list_entities),
            entity_count_hint: summary.entity_count_hint,
            entity_type: None,
            children: Vec::new(),
        }
    }

    fn entity(parent: &ContainerPath, summary: &EntitySummary) -> Self {
        let path = parent.child(&summary.name);
        Self {
            name: summary.name.clone(),
            depth: path.depth(),
            path: path.join(),
            kind: NodeKind::Entity,
            is_loaded: true,
            is_expanded: false,
            container_type: None,
            can_list_containers: false,
            can_list_entities: false,
            entity_count_hint: EntityCountHint::Unknown,
            entity_type: Some(summary.entity_type.clone()),
            children: Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    /// Whether this container opens up in the tree. Containers hinted
    /// `large` do not: their entities are kept out of the tree entirely.
    pub fn is_expandable(&self) -> bool {
        self.is_container()
            && (self.can_list_containers
                || (self.can_list_entities && self.entity_count_hint != EntityCountHint::Large))
    }

    /// Containers hinted `large` render their entities in the paginated
    /// table view instead of as tree children.
    pub fn shows_entity_table(&self) -> bool {
        self.is_container()
            && self.can_list_entities
            && self.entity_count_hint == EntityCountHint::Large
    }

    fn matches(&self, needle: &str) -> bool {
        let name_hit = self.name.to_lowercase().contains(needle);
        let label = self
            .container_type
            .as_deref()
            .or(self.entity_type.as_deref())
            .unwrap_or("");
        name_hit || label.to_lowercase().contains(needle)
    }
}

/// In-memory forest of tree nodes, keyed by slash-joined path.
///
/// The representation is a flat arena (path -> node, plus a child-path
/// index per node), so toggles and removals touch a handful of map
/// entries instead of rebuilding nested structures. All operations are
/// synchronous and infallible; operations addressed at a missing path
/// are no-ops.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeStore {
    nodes: HashMap<String, TreeNode>,
    roots: Vec<String>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().filter_map(|p| self.nodes.get(p))
    }

    pub fn children(&self, path: &str) -> Vec<&TreeNode> {
        match self.nodes.get(path) {
            Some(node) => node
                .children
                .iter()
                .filter_map(|p| self.nodes.get(p))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Replace the (empty) forest with the root container list. Guarded:
    /// once the forest is non-empty, repeated calls are no-ops.
    pub fn insert_roots(
        &mut self,
        containers: &[ContainerSummary],
        resolver: &CapabilityResolver,
    ) -> bool {
        if !self.is_empty() {
            return false;
        }

        let root = ContainerPath::root();
        for summary in containers {
            let node = TreeNode::container(&root, summary, resolver);
            self.roots.push(node.path.clone());
            self.nodes.insert(node.path.clone(), node);
        }
        true
    }

    /// Populate the children of the node at `path` from a container
    /// listing and an entity listing, and mark it loaded.
    ///
    /// Containers hinted `large` keep an empty child list no matter what
    /// the entity fetch returned; their entities belong in the paginated
    /// table view, never in the tree.
    pub fn load_children_at(
        &mut self,
        path: &str,
        containers: &[ContainerSummary],
        entities: &[EntitySummary],
        resolver: &CapabilityResolver,
    ) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };
        if !node.is_container() {
            return;
        }

        // A reload replaces whatever was there before.
        let stale: Vec<String> = node.children.clone();
        for child in stale {
            self.remove_subtree(&child);
        }

        let hint = self.nodes.get(path).map(|n| n.entity_count_hint);
        let parent_path = ContainerPath::parse(path);

        let mut children = Vec::new();
        if hint != Some(EntityCountHint::Large) {
            for summary in containers {
                let child = TreeNode::container(&parent_path, summary, resolver);
                children.push(child.path.clone());
                self.nodes.insert(child.path.clone(), child);
            }
            for summary in entities {
                let child = TreeNode::entity(&parent_path, summary);
                children.push(child.path.clone());
                self.nodes.insert(child.path.clone(), child);
            }
        }

        if let Some(node) = self.nodes.get_mut(path) {
            node.children = children;
            node.is_loaded = true;
        }
    }

    /// Flip expansion of the node at `path` only; descendants keep their
    /// own expansion state.
    pub fn toggle_expansion(&mut self, path: &str) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.is_expanded = !node.is_expanded;
        }
    }

    pub fn expand(&mut self, path: &str) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.is_expanded = true;
        }
    }

    pub fn collapse(&mut self, path: &str) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.is_expanded = false;
        }
    }

    /// Remove the node at `path` and its whole subtree. Returns the
    /// removed paths so callers can purge caches keyed by them.
    pub fn remove_at(&mut self, path: &str) -> Vec<String> {
        if !self.nodes.contains_key(path) {
            return Vec::new();
        }

        // Detach from the parent's child index (or the root list).
        match ContainerPath::parse(path).parent() {
            Some(parent) if !parent.is_root() => {
                if let Some(parent_node) = self.nodes.get_mut(&parent.join()) {
                    parent_node.children.retain(|p| p != path);
                }
            }
            _ => self.roots.retain(|p| p != path),
        }

        self.remove_subtree(path)
    }

    fn remove_subtree(&mut self, path: &str) -> Vec<String> {
        let mut removed = Vec::new();
        let mut stack = vec![path.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed.push(current);
            }
        }
        removed
    }

    /// Read-only filter projection: a pruned copy containing the nodes
    /// whose name or type label contains `substring` (case-insensitive)
    /// plus every ancestor of a match, with those ancestors forced open
    /// so the match is visible. The live forest is never touched.
    pub fn filter(&self, substring: &str) -> TreeStore {
        let needle = substring.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        let mut projection = TreeStore::new();
        for root in &self.roots {
            if self.project_into(root, &needle, &mut projection) {
                projection.roots.push(root.clone());
            }
        }
        projection
    }

    fn project_into(&self, path: &str, needle: &str, out: &mut TreeStore) -> bool {
        let Some(node) = self.nodes.get(path) else {
            return false;
        };

        let mut kept_children = Vec::new();
        for child in &node.children {
            if self.project_into(child, needle, out) {
                kept_children.push(child.clone());
            }
        }

        let self_match = node.matches(needle);
        if !self_match && kept_children.is_empty() {
            return false;
        }

        let mut copy = node.clone();
        // Ancestors of a match open up so the match is visible.
        if !kept_children.is_empty() {
            copy.is_expanded = true;
        }
        copy.children = kept_children;
        out.nodes.insert(path.to_string(), copy);
        true
    }

    /// Depth-first flattening of the forest respecting expansion state;
    /// the row order a tree renderer draws.
    pub fn visible_rows(&self) -> Vec<&TreeNode> {
        let mut rows = Vec::new();
        for root in &self.roots {
            self.collect_visible(root, &mut rows);
        }
        rows
    }

    fn collect_visible<'a>(&'a self, path: &str, rows: &mut Vec<&'a TreeNode>) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };
        rows.push(node);
        if node.is_expanded {
            for child in &node.children {
                self.collect_visible(child, rows);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datascope_types::{HierarchyLevel, ServiceCapabilities};

    fn resolver() -> CapabilityResolver {
        CapabilityResolver::with_table(ServiceCapabilities {
            service_type: "postgres".to_string(),
            capabilities: vec!["sql".to_string()],
            hierarchy: vec![
                HierarchyLevel {
                    level: 0,
                    name: "root".to_string(),
                    container_type: "database".to_string(),
                    can_list_containers: true,
                    can_list_entities: false,
                },
                HierarchyLevel {
                    level: 1,
                    name: "database".to_string(),
                    container_type: "schema".to_string(),
                    can_list_containers: true,
                    can_list_entities: false,
                },
                HierarchyLevel {
                    level: 2,
                    name: "schema".to_string(),
                    container_type: "table".to_string(),
                    can_list_containers: false,
                    can_list_entities: true,
                },
            ],
            filter_schema: None,
        })
    }

    fn seeded_store() -> TreeStore {
        let resolver = resolver();
        let mut store = TreeStore::new();
        store.insert_roots(
            &[
                ContainerSummary::new("public", "database"),
                ContainerSummary::new("analytics", "database"),
            ],
            &resolver,
        );
        store
    }

    #[test]
    fn test_insert_roots_is_guarded() {
        let resolver = resolver();
        let mut store = seeded_store();
        assert_eq!(store.len(), 2);

        let inserted = store.insert_roots(&[ContainerSummary::new("other", "database")], &resolver);
        assert!(!inserted);
        assert_eq!(store.len(), 2);
        assert!(store.get("other").is_none());
    }

    #[test]
    fn test_load_children_builds_paths_and_depths() {
        let resolver = resolver();
        let mut store = seeded_store();
        store.load_children_at(
            "public",
            &[ContainerSummary::new("users", "schema")],
            &[],
            &resolver,
        );

        let parent = store.get("public").unwrap();
        assert!(parent.is_loaded);
        assert_eq!(parent.children, vec!["public/users"]);

        let child = store.get("public/users").unwrap();
        assert_eq!(child.kind, NodeKind::Container);
        assert_eq!(child.depth, 2);
        // Depth 2 is the schema level: entities only.
        assert!(!child.can_list_containers);
        assert!(child.can_list_entities);
    }

    #[test]
    fn test_per_container_hints_override_level() {
        let resolver = resolver();
        let mut store = seeded_store();
        let mut summary = ContainerSummary::new("locked", "schema");
        summary.can_list_entities = Some(false);
        store.load_children_at("public", &[summary], &[], &resolver);

        let child = store.get("public/locked").unwrap();
        assert!(!child.can_list_entities);
    }

    #[test]
    fn test_large_hint_keeps_children_empty() {
        let resolver = resolver();
        let mut store = TreeStore::new();
        store.insert_roots(
            &[ContainerSummary::new("mybucket", "bucket").with_hint(EntityCountHint::Large)],
            &resolver,
        );

        let entities: Vec<EntitySummary> = (0..500)
            .map(|i| EntitySummary::new(format!("object-{i}"), "object"))
            .collect();
        store.load_children_at("mybucket", &[], &entities, &resolver);

        let node = store.get("mybucket").unwrap();
        assert!(node.is_loaded);
        assert!(node.children.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_toggle_does_not_cascade() {
        let resolver = resolver();
        let mut store = seeded_store();
        store.load_children_at(
            "public",
            &[ContainerSummary::new("users", "schema")],
            &[],
            &resolver,
        );
        store.expand("public");
        store.expand("public/users");

        store.toggle_expansion("public");
        assert!(!store.get("public").unwrap().is_expanded);
        assert!(store.get("public/users").unwrap().is_expanded);
    }

    #[test]
    fn test_remove_at_drops_subtree_and_reports_paths() {
        let resolver = resolver();
        let mut store = seeded_store();
        store.load_children_at(
            "public",
            &[ContainerSummary::new("users", "schema")],
            &[],
            &resolver,
        );
        store.load_children_at(
            "public/users",
            &[],
            &[EntitySummary::new("events", "table")],
            &resolver,
        );

        let mut removed = store.remove_at("public");
        removed.sort();
        assert_eq!(removed, vec!["public", "public/users", "public/users/events"]);
        assert!(store.get("public").is_none());
        assert_eq!(store.roots().count(), 1);
    }

    #[test]
    fn test_reload_replaces_children() {
        let resolver = resolver();
        let mut store = seeded_store();
        store.load_children_at(
            "public",
            &[ContainerSummary::new("old", "schema")],
            &[],
            &resolver,
        );
        store.load_children_at(
            "public",
            &[ContainerSummary::new("new", "schema")],
            &[],
            &resolver,
        );

        assert!(store.get("public/old").is_none());
        assert_eq!(store.get("public").unwrap().children, vec!["public/new"]);
    }

    #[test]
    fn test_filter_preserves_ancestors_and_forces_expansion() {
        let resolver = resolver();
        let mut store = seeded_store();
        store.load_children_at(
            "public",
            &[ContainerSummary::new("users", "schema")],
            &[],
            &resolver,
        );
        store.load_children_at(
            "public/users",
            &[],
            &[EntitySummary::new("events", "table")],
            &resolver,
        );

        let projection = store.filter("events");
        assert!(projection.get("analytics").is_none());
        assert!(projection.get("public/users/events").is_some());
        // Ancestors of the match are kept and forced open.
        assert!(projection.get("public").unwrap().is_expanded);
        assert!(projection.get("public/users").unwrap().is_expanded);
        // The live forest is untouched.
        assert!(!store.get("public").unwrap().is_expanded);
    }

    #[test]
    fn test_filter_matches_type_labels() {
        let store = seeded_store();
        let projection = store.filter("database");
        assert_eq!(projection.roots().count(), 2);
    }

    #[test]
    fn test_filter_clear_restores_everything() {
        let mut store = seeded_store();
        store.expand("analytics");
        let projection = store.filter("");
        assert_eq!(projection.len(), store.len());
        assert!(projection.get("analytics").unwrap().is_expanded);
        assert!(!projection.get("public").unwrap().is_expanded);
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let resolver = resolver();
        let mut store = seeded_store();
        store.load_children_at(
            "public",
            &[ContainerSummary::new("users", "schema")],
            &[],
            &resolver,
        );

        let collapsed: Vec<&str> = store.visible_rows().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(collapsed, vec!["public", "analytics"]);

        store.expand("public");
        let expanded: Vec<&str> = store.visible_rows().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(expanded, vec!["public", "public/users", "analytics"]);
    }
}
