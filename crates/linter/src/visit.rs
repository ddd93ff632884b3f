use crate::plugin::Plugin;
use crate::problem::Severity;
use crate::{assertions, rules};
use oas::{NodeType, OasVersion, Registry};
use sources::{Catalog, ParseNode, Pointer, Resolution, ResolveError, Scope};
use std::collections::BTreeMap;
use styleguide::{ConfigError, ResolvedStyleguide, SeverityLevel};
use url::Url;

/// A rule callback set for one node type. Implementations must be stateless
/// across nodes: per-walk state belongs on the Context.
pub trait Visitor: Send + Sync {
    fn enter(&self, node: &ParseNode, ctx: &mut Context) {
        let (_, _) = (node, ctx);
    }
    fn leave(&self, node: &ParseNode, ctx: &mut Context) {
        let (_, _) = (node, ctx);
    }
}

/// A problem reported by a rule. The walker fills in the rule id, the
/// configured severity, and the location chain; a rule may override the
/// pointer within the current source and anchor on the key.
#[derive(Debug, Default, Clone)]
pub struct Report {
    pub message: String,
    pub suggest: Vec<String>,
    pub location: Option<Pointer>,
    pub report_on_key: bool,
}

/// Context passed to rule callbacks.
pub struct Context<'w> {
    /// Registry name of the node's resolved type.
    pub type_name: &'static str,
    pub node_type: &'static NodeType,
    /// Nearest enclosing mapping key; None directly under a sequence root.
    pub key: Option<&'w str>,
    pub version: OasVersion,
    pub registry: Registry,
    pub rule_id: &'w str,

    pub(crate) scope: &'w Scope<'w>,
    pub(crate) catalog: &'w Catalog,
    pub(crate) reports: Vec<Report>,
    pub(crate) patches: Vec<(Url, Pointer, serde_json::Value)>,
    pub(crate) skipped: bool,
    pub(crate) skipped_refs: bool,
}

impl<'w> Context<'w> {
    /// The pointer of the current node within its source.
    pub fn pointer(&self) -> Pointer {
        self.scope.pointer()
    }

    /// The URI of the source the current node lives in.
    pub fn resource(&self) -> &Url {
        self.scope.resource()
    }

    /// Report a problem. The rule id, severity, and location chain are
    /// attached by the walker.
    pub fn report(&mut self, report: Report) {
        self.reports.push(report);
    }

    /// Skip the subtree under the current node for this rule only.
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    /// Stop firing this rule inside `$ref` targets for the rest of the
    /// walk. The walk itself still crosses references; other rules are
    /// unaffected.
    pub fn skip_refs(&mut self) {
        self.skipped_refs = true;
    }

    /// Record a rewrite of the current node, applied at emission time.
    /// Parse trees themselves stay immutable.
    pub fn patch(&mut self, value: serde_json::Value) {
        self.patches
            .push((self.resource().clone(), self.pointer(), value));
    }

    /// Resolve the `$ref` of `node`, if it is a reference object.
    pub fn resolve(&self, node: &ParseNode) -> Option<Result<Resolution, ResolveError>> {
        let target = node.ref_target()?;
        Some(self.catalog.resolve(self.resource(), target))
    }
}

/// A rule bound to its configured severity, ready for dispatch.
pub struct BoundRule {
    pub id: String,
    pub severity: Severity,
    /// Visitors keyed by node type name. The key "any" fires on every node.
    pub visitors: BTreeMap<String, Box<dyn Visitor>>,
    /// When set, this rule does not fire inside `$ref` targets. Declared
    /// statically here (plugins set it on their rule exports), or requested
    /// mid-walk through [`Context::skip_refs`].
    pub skip_refs: bool,
}

impl BoundRule {
    pub fn new(id: impl Into<String>, severity: Severity) -> BoundRule {
        BoundRule {
            id: id.into(),
            severity,
            visitors: BTreeMap::new(),
            skip_refs: false,
        }
    }

    pub fn with_visitor(
        mut self,
        type_name: impl Into<String>,
        visitor: Box<dyn Visitor>,
    ) -> BoundRule {
        self.visitors.insert(type_name.into(), visitor);
        self
    }
}

/// The full set of visitors bound for a walk, phase by phase.
pub struct RuleSet {
    pub preprocessors: Vec<BoundRule>,
    pub rules: Vec<BoundRule>,
    pub decorators: Vec<BoundRule>,
}

impl RuleSet {
    /// The configured severity of a rule the walker itself reports for
    /// (`spec` union dispatch, `no-unresolved-refs`). None when disabled.
    pub fn severity_of(&self, id: &str) -> Option<Severity> {
        self.rules
            .iter()
            .find(|rule| rule.id == id)
            .map(|rule| rule.severity)
    }
}

fn severity(level: SeverityLevel) -> Option<Severity> {
    match level {
        SeverityLevel::Error => Some(Severity::Error),
        SeverityLevel::Warn => Some(Severity::Warn),
        SeverityLevel::Off => None,
    }
}

/// Bind a resolved styleguide to executable rules: built-ins first, then
/// plugin rules, then assertions compiled to synthetic rules. Every rule id
/// must name a built-in or an exported plugin rule.
pub fn bind(styleguide: &ResolvedStyleguide, plugins: &[Plugin]) -> Result<RuleSet, ConfigError> {
    let mut built_ins = Vec::new();
    let mut plugin_rules = Vec::new();

    for (id, setting) in &styleguide.rules {
        let Some(severity) = severity(setting.severity()) else {
            continue;
        };
        if let Some(rule) = rules::built_in(id, severity, setting.options()) {
            built_ins.push(rule);
            continue;
        }
        if let Some((visitors, skip_refs)) = plugin_visitors(plugins, id, |p| &p.rules) {
            plugin_rules.push(BoundRule {
                id: id.clone(),
                severity,
                visitors,
                skip_refs,
            });
            continue;
        }
        return Err(ConfigError::UnknownRule { id: id.clone() });
    }

    let mut rules: Vec<BoundRule> = built_ins.into_iter().chain(plugin_rules).collect();
    for (index, assertion) in styleguide.assertions.iter().enumerate() {
        if assertion.severity == Some(SeverityLevel::Off) {
            continue;
        }
        rules.push(assertions::compile(assertion, index, plugins)?);
    }

    let preprocessors = bind_phase(&styleguide.preprocessors, plugins, |p| &p.preprocessors)?;
    let decorators = bind_phase(&styleguide.decorators, plugins, |p| &p.decorators)?;

    Ok(RuleSet {
        preprocessors,
        rules,
        decorators,
    })
}

fn bind_phase(
    settings: &BTreeMap<String, styleguide::RuleSetting>,
    plugins: &[Plugin],
    select: fn(&Plugin) -> &Vec<crate::plugin::PluginRule>,
) -> Result<Vec<BoundRule>, ConfigError> {
    let mut bound = Vec::new();
    for (id, setting) in settings {
        let Some(severity) = severity(setting.severity()) else {
            continue;
        };
        let Some((visitors, skip_refs)) = plugin_visitors(plugins, id, select) else {
            return Err(ConfigError::UnknownRule { id: id.clone() });
        };
        bound.push(BoundRule {
            id: id.clone(),
            severity,
            visitors,
            skip_refs,
        });
    }
    Ok(bound)
}

/// Look up `"<pluginId>/<name>"` among the plugins' exported rule sets,
/// yielding its visitors and its declared ref-skip behavior.
fn plugin_visitors(
    plugins: &[Plugin],
    id: &str,
    select: fn(&Plugin) -> &Vec<crate::plugin::PluginRule>,
) -> Option<(BTreeMap<String, Box<dyn Visitor>>, bool)> {
    let (plugin_id, name) = id.split_once('/')?;
    let plugin = plugins.iter().find(|p| p.id == plugin_id)?;
    let rule = select(plugin).iter().find(|r| r.name == name)?;
    Some(((rule.build)().into_iter().collect(), rule.skip_refs))
}
