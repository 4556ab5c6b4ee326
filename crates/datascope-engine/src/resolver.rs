use datascope_types::{HierarchyLevel, ServiceCapabilities};

/// Capabilities that apply to a node at a given hierarchy depth.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedCapabilities {
    pub can_list_containers: bool,
    pub can_list_entities: bool,
    /// Type label of containers at this depth
    pub container_type: String,
}

impl ResolvedCapabilities {
    fn from_level(level: &HierarchyLevel) -> Self {
        Self {
            can_list_containers: level.can_list_containers,
            can_list_entities: level.can_list_entities,
            container_type: level.container_type.clone(),
        }
    }

    /// Permissive default used before service metadata arrives; lets the
    /// tree degrade gracefully instead of refusing to expand anything.
    fn permissive() -> Self {
        Self {
            can_list_containers: true,
            can_list_entities: true,
            container_type: "folder".to_string(),
        }
    }
}

/// Answers "what can the tree do at this depth" from a service's
/// declared hierarchy table.
///
/// A depth with no declared level resolves to the deepest declared
/// level ("deepest wins"). The table is loaded once per service
/// selection and never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct CapabilityResolver {
    capabilities: Option<ServiceCapabilities>,
}

impl CapabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(capabilities: ServiceCapabilities) -> Self {
        Self {
            capabilities: Some(capabilities),
        }
    }

    pub fn load(&mut self, capabilities: ServiceCapabilities) {
        self.capabilities = Some(capabilities);
    }

    pub fn is_loaded(&self) -> bool {
        self.capabilities.is_some()
    }

    pub fn service(&self) -> Option<&ServiceCapabilities> {
        self.capabilities.as_ref()
    }

    /// Resolve capabilities for a hierarchy depth. Total: always returns
    /// a value, never fails.
    pub fn resolve(&self, depth: u32) -> ResolvedCapabilities {
        let Some(caps) = &self.capabilities else {
            return ResolvedCapabilities::permissive();
        };

        if let Some(level) = caps.level(depth) {
            return ResolvedCapabilities::from_level(level);
        }

        // Depth beyond the declared hierarchy: fall back to the deepest
        // declared level rather than erroring.
        match caps.max_level() {
            Some(level) => ResolvedCapabilities::from_level(level),
            None => ResolvedCapabilities::permissive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datascope_types::HierarchyLevel;

    fn postgres_table() -> ServiceCapabilities {
        ServiceCapabilities {
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
        }
    }

    #[test]
    fn test_unloaded_resolver_is_permissive() {
        let resolver = CapabilityResolver::new();
        let caps = resolver.resolve(3);
        assert!(caps.can_list_containers);
        assert!(caps.can_list_entities);
        assert_eq!(caps.container_type, "folder");
    }

    #[test]
    fn test_declared_levels_resolve_exactly() {
        let resolver = CapabilityResolver::with_table(postgres_table());
        let root = resolver.resolve(0);
        assert!(root.can_list_containers);
        assert!(!root.can_list_entities);
        assert_eq!(root.container_type, "database");

        let schema = resolver.resolve(2);
        assert!(!schema.can_list_containers);
        assert!(schema.can_list_entities);
        assert_eq!(schema.container_type, "table");
    }

    #[test]
    fn test_deepest_level_wins_beyond_table() {
        let resolver = CapabilityResolver::with_table(postgres_table());
        let deepest = resolver.resolve(2);
        for depth in 3..10 {
            assert_eq!(resolver.resolve(depth), deepest);
        }
    }
}
