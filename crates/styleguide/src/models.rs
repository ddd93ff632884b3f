use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The raw, file-shaped configuration: `apis`, a `styleguide`, and the
/// top-level `extends` / `rules` shorthand which merges into the root
/// styleguide. Unknown keys are tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawConfig {
    /// # API descriptions managed by this configuration, keyed by alias.
    #[serde(default)]
    pub apis: BTreeMap<String, ApiConfig>,
    /// # Root styleguide applied to every API unless overridden.
    #[serde(default)]
    pub styleguide: Option<RawStyleguide>,
    /// # Shorthand for `styleguide.extends`.
    #[serde(default)]
    pub extends: Option<Vec<String>>,
    /// # Shorthand for `styleguide.rules`.
    #[serde(default)]
    pub rules: Option<BTreeMap<String, RuleSetting>>,
    #[serde(default)]
    pub theme: Option<serde_json::Value>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl RawConfig {
    /// The root styleguide with the top-level shorthand folded in.
    pub fn root_styleguide(&self) -> RawStyleguide {
        let mut styleguide = self.styleguide.clone().unwrap_or_default();
        if let Some(extends) = &self.extends {
            let nested = std::mem::take(&mut styleguide.extends);
            styleguide.extends = extends.iter().cloned().chain(nested).collect();
        }
        if let Some(rules) = &self.rules {
            for (id, setting) in rules {
                styleguide.rules.entry(id.clone()).or_insert(setting.clone());
            }
        }
        styleguide
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiConfig {
    /// # Root document of this API, as a path or URL.
    pub root: String,
    #[serde(default)]
    pub styleguide: Option<RawStyleguide>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawStyleguide {
    /// # Presets, config paths, or URLs merged left-to-right beneath this
    /// config's own entries.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
    #[serde(default)]
    pub assertions: Vec<RawAssertion>,
    #[serde(default)]
    pub preprocessors: BTreeMap<String, RuleSetting>,
    #[serde(default)]
    pub decorators: BTreeMap<String, RuleSetting>,
    /// # Identifiers of plugins activated for this styleguide.
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl RawStyleguide {
    pub fn is_empty(&self) -> bool {
        self.extends.is_empty() && self.rules.is_empty()
    }
}

/// Severity of a rule as configured: `"error" | "warn" | "off"`, or an
/// object carrying a severity plus rule options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RuleSetting {
    Severity(SeverityLevel),
    Detailed(DetailedSetting),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedSetting {
    pub severity: SeverityLevel,
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Error,
    Warn,
    Off,
}

impl RuleSetting {
    pub fn severity(&self) -> SeverityLevel {
        match self {
            RuleSetting::Severity(severity) => *severity,
            RuleSetting::Detailed(detailed) => detailed.severity,
        }
    }

    pub fn is_off(&self) -> bool {
        self.severity() == SeverityLevel::Off
    }

    pub fn options(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        match self {
            RuleSetting::Severity(_) => None,
            RuleSetting::Detailed(detailed) => Some(&detailed.options),
        }
    }
}

/// A declarative assertion: a subject node type, an optional property, and
/// predicate fields. Predicates not in the built-in set are resolved as
/// `"<pluginId>/<function>"` against the plugin catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawAssertion {
    pub subject: String,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<SeverityLevel>,
    #[serde(rename = "assertionId", default)]
    pub assertion_id: Option<String>,
    #[serde(flatten)]
    pub predicates: BTreeMap<String, serde_json::Value>,
}

/// Predicate names evaluated by the engine itself.
pub const BUILTIN_PREDICATES: &[&str] = &[
    "defined",
    "pattern",
    "minLength",
    "maxLength",
    "enum",
    "casing",
    "ref",
    "const",
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let raw: RawConfig = serde_yaml::from_str(
            "\
apis:
  main:
    root: ./openapi.yaml
    styleguide:
      rules:
        operation-4xx-response: error
extends:
  - recommended
rules:
  operation-2xx-response: warn
  no-path-trailing-slash:
    severity: error
    ignoreLastPathSegment: true
",
        )
        .unwrap();

        let styleguide = raw.root_styleguide();
        assert_eq!(styleguide.extends, vec!["recommended"]);
        assert_eq!(
            styleguide.rules["operation-2xx-response"].severity(),
            SeverityLevel::Warn
        );

        let detailed = &styleguide.rules["no-path-trailing-slash"];
        assert_eq!(detailed.severity(), SeverityLevel::Error);
        assert_eq!(
            detailed.options().unwrap()["ignoreLastPathSegment"],
            serde_json::json!(true)
        );

        let api = &raw.apis["main"];
        assert_eq!(api.root, "./openapi.yaml");
        assert!(api.styleguide.is_some());
    }

    #[test]
    fn test_assertion_deserialization() {
        let assertion: RawAssertion = serde_yaml::from_str(
            "\
subject: Operation
property: summary
assertionId: operation-summary-length
severity: warn
minLength: 10
maxLength: 60
",
        )
        .unwrap();

        assert_eq!(assertion.subject, "Operation");
        assert_eq!(assertion.property.as_deref(), Some("summary"));
        assert_eq!(assertion.predicates["minLength"], serde_json::json!(10));
        assert_eq!(assertion.predicates["maxLength"], serde_json::json!(60));
    }
}
