//! Built-in rule bundles. Every preset assigns an explicit severity to every
//! built-in rule id, so that preset merges are order-sensitive in the
//! expected way: a later preset fully overrides an earlier one.

use crate::models::{RuleSetting, SeverityLevel};
use std::collections::BTreeMap;

pub const PRESET_NAMES: &[&str] = &["minimal", "recommended", "recommended-strict", "all"];

/// Ids of every built-in rule, in a stable order.
pub const BUILTIN_RULES: &[&str] = &[
    "spec",
    "no-unresolved-refs",
    "operation-2xx-response",
    "operation-4xx-response",
    "operation-operationId",
    "operation-description",
    "no-path-trailing-slash",
    "tag-description",
    "info-description",
];

pub fn preset(name: &str) -> Option<BTreeMap<String, RuleSetting>> {
    use SeverityLevel::*;

    let assignments: &[(&str, SeverityLevel)] = match name {
        "minimal" => &[
            ("spec", Error),
            ("no-unresolved-refs", Error),
            ("operation-2xx-response", Warn),
            ("operation-4xx-response", Off),
            ("operation-operationId", Warn),
            ("operation-description", Off),
            ("no-path-trailing-slash", Warn),
            ("tag-description", Off),
            ("info-description", Off),
        ],
        "recommended" => &[
            ("spec", Error),
            ("no-unresolved-refs", Error),
            ("operation-2xx-response", Warn),
            ("operation-4xx-response", Warn),
            ("operation-operationId", Warn),
            ("operation-description", Off),
            ("no-path-trailing-slash", Error),
            ("tag-description", Warn),
            ("info-description", Warn),
        ],
        "recommended-strict" => &[
            ("spec", Error),
            ("no-unresolved-refs", Error),
            ("operation-2xx-response", Error),
            ("operation-4xx-response", Error),
            ("operation-operationId", Error),
            ("operation-description", Off),
            ("no-path-trailing-slash", Error),
            ("tag-description", Error),
            ("info-description", Error),
        ],
        "all" => {
            return Some(
                BUILTIN_RULES
                    .iter()
                    .map(|id| (id.to_string(), RuleSetting::Severity(Error)))
                    .collect(),
            )
        }
        _ => return None,
    };

    Some(
        assignments
            .iter()
            .map(|(id, severity)| (id.to_string(), RuleSetting::Severity(*severity)))
            .collect(),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_presets_are_total() {
        for name in PRESET_NAMES {
            let preset = preset(name).unwrap();
            for id in BUILTIN_RULES {
                assert!(preset.contains_key(*id), "{name} is missing {id}");
            }
            assert_eq!(preset.len(), BUILTIN_RULES.len());
        }
        assert!(preset("nonesuch").is_none());
    }

    #[test]
    fn test_strict_escalates_recommended() {
        let recommended = preset("recommended").unwrap();
        let strict = preset("recommended-strict").unwrap();

        for (id, setting) in &recommended {
            let strict_severity = strict[id].severity();
            match setting.severity() {
                SeverityLevel::Warn => assert_eq!(strict_severity, SeverityLevel::Error),
                other => assert_eq!(strict_severity, other),
            }
        }
    }
}
