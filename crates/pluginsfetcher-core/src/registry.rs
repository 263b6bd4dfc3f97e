//! Plugin registry providers.
//!
//! The registry is owned by the host; this crate only reads it through the
//! [`PluginRegistry`] trait. [`StaticRegistry`] is an in-memory provider for
//! embedders that already hold the plugin list, and for tests.

use crate::Result;
use crate::record::{PluginRecord, PluginTypeGroup};

/// Source of installed plugin records.
pub trait PluginRegistry: Send + Sync {
    /// Return all installed plugins grouped by type, in registry iteration
    /// order. Component ids are unique across the returned groups.
    fn plugins_by_type(&self) -> Result<Vec<PluginTypeGroup>>;
}

/// In-memory registry.
///
/// Type groups keep the order in which their first plugin was registered;
/// plugins keep registration order inside their group.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    groups: Vec<PluginTypeGroup>,
}

impl StaticRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Register a plugin.
    ///
    /// A record whose component is already registered replaces the earlier
    /// record in place.
    pub fn register(&mut self, mut record: PluginRecord) {
        record.normalize_component();

        for group in &mut self.groups {
            if let Some(existing) = group
                .plugins
                .iter_mut()
                .find(|p| p.component == record.component)
            {
                if group.plugin_type == record.plugin_type {
                    *existing = record;
                    return;
                }
                group.plugins.retain(|p| p.component != record.component);
                break;
            }
        }
        self.groups.retain(|g| !g.plugins.is_empty());

        match self
            .groups
            .iter_mut()
            .find(|g| g.plugin_type == record.plugin_type)
        {
            Some(group) => group.plugins.push(record),
            None => {
                let mut group = PluginTypeGroup::new(record.plugin_type.clone());
                group.plugins.push(record);
                self.groups.push(group);
            }
        }
    }

    /// Look up a plugin by component name.
    pub fn get(&self, component: &str) -> Option<&PluginRecord> {
        self.groups
            .iter()
            .flat_map(|g| g.plugins.iter())
            .find(|p| p.component == component)
    }

    /// Plugin types in iteration order.
    pub fn plugin_types(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.plugin_type.as_str()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.plugins.len()).sum()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<PluginRecord> for StaticRegistry {
    fn from_iter<I: IntoIterator<Item = PluginRecord>>(iter: I) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.register(record);
        }
        registry
    }
}

impl PluginRegistry for StaticRegistry {
    fn plugins_by_type(&self) -> Result<Vec<PluginTypeGroup>> {
        Ok(self.groups.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = StaticRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.plugins_by_type().unwrap().is_empty());
    }

    #[test]
    fn test_groups_keep_first_registration_order() {
        let registry: StaticRegistry = [
            PluginRecord::new("mod", "quiz", "Quiz"),
            PluginRecord::new("block", "html", "Text"),
            PluginRecord::new("mod", "forum", "Forum"),
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.plugin_types(), vec!["mod", "block"]);
        let groups = registry.plugins_by_type().unwrap();
        let mods: Vec<&str> = groups[0].plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(mods, vec!["quiz", "forum"]);
    }

    #[test]
    fn test_register_replaces_existing_in_place() {
        let mut registry = StaticRegistry::new();
        registry.register(PluginRecord::new("mod", "quiz", "Quiz"));
        registry.register(PluginRecord::new("mod", "forum", "Forum"));
        registry.register(PluginRecord::new("mod", "quiz", "Quiz (patched)"));

        assert_eq!(registry.len(), 2);
        let groups = registry.plugins_by_type().unwrap();
        assert_eq!(groups[0].plugins[0].display_name, "Quiz (patched)");
    }

    #[test]
    fn test_register_moves_component_between_types() {
        let mut registry = StaticRegistry::new();
        let mut record = PluginRecord::new("local", "thing", "Thing");
        record.component = "shared_thing".to_string();
        registry.register(record);

        let mut moved = PluginRecord::new("tool", "thing", "Thing");
        moved.component = "shared_thing".to_string();
        registry.register(moved);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.plugin_types(), vec!["tool"]);
    }

    #[test]
    fn test_get_by_component() {
        let registry: StaticRegistry = [PluginRecord::new("block", "html", "Text")]
            .into_iter()
            .collect();
        assert_eq!(registry.get("block_html").unwrap().display_name, "Text");
        assert!(registry.get("block_nonexistent").is_none());
    }
}
