use crate::visit::Visitor;
use std::collections::BTreeMap;
use styleguide::{PluginCatalog, RawStyleguide};

/// The visitor set a rule attaches: `(node type name, visitor)` pairs.
pub type VisitorSet = Vec<(String, Box<dyn Visitor>)>;

/// A rule, preprocessor, or decorator exported by a plugin. `build` is a
/// plain function so a Plugin stays a passive value; it runs once at bind
/// time.
pub struct PluginRule {
    pub name: &'static str,
    pub build: fn() -> VisitorSet,
    /// When set, the rule does not fire inside `$ref` targets.
    pub skip_refs: bool,
}

/// A custom assertion predicate: receives the asserted value and the
/// predicate's configured options, and describes the failure on Err.
pub type AssertionFn = fn(&serde_json::Value, &serde_json::Value) -> Result<(), String>;

/// An in-process plugin registration. Rule ids exported by a plugin are
/// namespaced `"<pluginId>/<name>"`; likewise assertion functions and
/// named configs.
#[derive(Default)]
pub struct Plugin {
    pub id: String,
    pub rules: Vec<PluginRule>,
    pub preprocessors: Vec<PluginRule>,
    pub decorators: Vec<PluginRule>,
    pub assertions: BTreeMap<String, AssertionFn>,
    pub configs: BTreeMap<String, RawStyleguide>,
}

/// View of a plugin slice as the name-only catalog config resolution needs.
pub struct Plugins<'a>(pub &'a [Plugin]);

impl PluginCatalog for Plugins<'_> {
    fn has_plugin(&self, id: &str) -> bool {
        self.0.iter().any(|p| p.id == id)
    }

    fn has_assertion(&self, plugin: &str, function: &str) -> bool {
        self.0
            .iter()
            .find(|p| p.id == plugin)
            .map_or(false, |p| p.assertions.contains_key(function))
    }

    fn config(&self, plugin: &str, name: &str) -> Option<RawStyleguide> {
        self.0
            .iter()
            .find(|p| p.id == plugin)?
            .configs
            .get(name)
            .cloned()
    }
}
