pub mod error;
pub mod models;
pub mod presets;
pub mod resolve;

pub use error::ConfigError;
pub use models::{
    ApiConfig, RawAssertion, RawConfig, RawStyleguide, RuleSetting, SeverityLevel,
    BUILTIN_PREDICATES,
};
pub use presets::{preset, BUILTIN_RULES, PRESET_NAMES};
pub use resolve::{resolve_apis, resolve_config, resolve_styleguide, ResolvedApi, ResolvedConfig};

use std::collections::BTreeMap;
use url::Url;

/// The catalog of plugins registered for a run. Config resolution consults
/// it to validate plugin references; it deliberately exposes names only, so
/// that rule and predicate implementations stay with the linting layer.
pub trait PluginCatalog: Send + Sync {
    fn has_plugin(&self, id: &str) -> bool;
    fn has_assertion(&self, plugin: &str, function: &str) -> bool;
    /// A named config exported by a plugin, referenced from `extends` as
    /// `"<pluginId>/<configName>"`.
    fn config(&self, plugin: &str, name: &str) -> Option<RawStyleguide>;
}

/// The empty plugin catalog.
pub struct NoPlugins;

impl PluginCatalog for NoPlugins {
    fn has_plugin(&self, _id: &str) -> bool {
        false
    }
    fn has_assertion(&self, _plugin: &str, _function: &str) -> bool {
        false
    }
    fn config(&self, _plugin: &str, _name: &str) -> Option<RawStyleguide> {
        None
    }
}

/// A styleguide after extends/plugin resolution: the effective rule set,
/// frozen before any walk begins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyleguide {
    pub rules: BTreeMap<String, RuleSetting>,
    pub assertions: Vec<RawAssertion>,
    pub preprocessors: BTreeMap<String, RuleSetting>,
    pub decorators: BTreeMap<String, RuleSetting>,
    pub plugins: Vec<String>,
    /// Ordered, de-duplicated URIs of every config fetched through
    /// `extends`, for diagnostics.
    pub extend_paths: Vec<Url>,
    /// Ordered, de-duplicated identifiers of activated plugins.
    pub plugin_paths: Vec<String>,
    pub recommended_fallback: bool,
}

impl ResolvedStyleguide {
    /// Merge `other` over self: later entries override earlier.
    pub fn apply(&mut self, other: &ResolvedStyleguide) {
        for (id, setting) in &other.rules {
            self.rules.insert(id.clone(), setting.clone());
        }
        self.assertions.extend(other.assertions.iter().cloned());
        for (id, setting) in &other.preprocessors {
            self.preprocessors.insert(id.clone(), setting.clone());
        }
        for (id, setting) in &other.decorators {
            self.decorators.insert(id.clone(), setting.clone());
        }
        for plugin in &other.plugins {
            if !self.plugins.contains(plugin) {
                self.plugins.push(plugin.clone());
            }
        }
        for path in &other.extend_paths {
            if !self.extend_paths.contains(path) {
                self.extend_paths.push(path.clone());
            }
        }
        for path in &other.plugin_paths {
            if !self.plugin_paths.contains(path) {
                self.plugin_paths.push(path.clone());
            }
        }
    }

    pub fn apply_rules(&mut self, rules: &BTreeMap<String, RuleSetting>) {
        for (id, setting) in rules {
            self.rules.insert(id.clone(), setting.clone());
        }
    }
}
