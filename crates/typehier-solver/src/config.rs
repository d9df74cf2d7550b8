//! Session configuration.

use crate::recursion::RecursionProfile;
use serde::{Deserialize, Serialize};

/// Knobs for one [`CachedTypeHierarchy`](crate::CachedTypeHierarchy) session.
///
/// Deserializable with every field optional, so hosts can embed it in their
/// own settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HierarchyConfig {
    /// Universal supertype. Matched by qualified or simple name.
    pub root_type: String,
    /// The type with no values; compatible only with itself and the root.
    pub void_type: String,
    /// Load the root's subtree when the session is created.
    pub preload_root: bool,
    /// Depth limit for a single subtree walk.
    pub max_load_depth: u32,
    /// Iteration budget for a single subtree walk.
    pub max_load_iterations: u32,
    /// Nesting limit for generic arguments within one query.
    pub max_generic_depth: u32,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            root_type: "java.lang.Object".to_string(),
            void_type: "void".to_string(),
            preload_root: true,
            max_load_depth: RecursionProfile::SubtreeLoad.max_depth(),
            max_load_iterations: RecursionProfile::SubtreeLoad.max_iterations(),
            max_generic_depth: RecursionProfile::GenericArguments.max_depth(),
        }
    }
}

impl HierarchyConfig {
    pub fn with_root_type(mut self, root_type: impl Into<String>) -> Self {
        self.root_type = root_type.into();
        self
    }

    pub fn with_void_type(mut self, void_type: impl Into<String>) -> Self {
        self.void_type = void_type.into();
        self
    }

    pub fn with_preload_root(mut self, preload: bool) -> Self {
        self.preload_root = preload;
        self
    }

    pub fn with_max_load_depth(mut self, depth: u32) -> Self {
        self.max_load_depth = depth;
        self
    }

    pub fn with_max_generic_depth(mut self, depth: u32) -> Self {
        self.max_generic_depth = depth;
        self
    }

    /// True if `name` denotes the root type, either fully qualified
    /// (`java.lang.Object`) or by its simple name (`Object`).
    pub fn is_root(&self, name: &str) -> bool {
        name == self.root_type || name == simple_name(&self.root_type)
    }

    pub fn is_void(&self, name: &str) -> bool {
        name == self.void_type
    }

    pub(crate) fn load_profile(&self) -> RecursionProfile {
        RecursionProfile::Custom {
            max_depth: self.max_load_depth,
            max_iterations: self.max_load_iterations,
        }
    }
}

/// The part of a qualified name after the last `.`.
fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_matches_qualified_and_simple_name() {
        let config = HierarchyConfig::default();
        assert!(config.is_root("java.lang.Object"));
        assert!(config.is_root("Object"));
        assert!(!config.is_root("lang.Object"));
        assert!(!config.is_root("java.lang.String"));
    }

    #[test]
    fn custom_root_without_package() {
        let config = HierarchyConfig::default().with_root_type("Any");
        assert!(config.is_root("Any"));
        assert!(!config.is_root("Object"));
    }

    #[test]
    fn deserializes_partial_settings() {
        let config: HierarchyConfig =
            serde_json::from_str(r#"{ "rootType": "kotlin.Any", "preloadRoot": false }"#)
                .unwrap();
        assert_eq!(config.root_type, "kotlin.Any");
        assert!(!config.preload_root);
        assert_eq!(config.void_type, "void");
        assert_eq!(config.max_generic_depth, 64);
    }

    #[test]
    fn load_profile_uses_configured_limits() {
        let config = HierarchyConfig::default().with_max_load_depth(3);
        assert_eq!(config.load_profile().max_depth(), 3);
        assert_eq!(config.load_profile().max_iterations(), 1_000_000);
    }
}
