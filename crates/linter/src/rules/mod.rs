mod spec;
mod style;

use crate::problem::Severity;
use crate::visit::BoundRule;
use std::collections::BTreeMap;

/// Construct a built-in rule by id, or None if the id is not a built-in.
/// The full id list lives in `styleguide::BUILTIN_RULES`.
pub fn built_in(
    id: &str,
    severity: Severity,
    options: Option<&BTreeMap<String, serde_json::Value>>,
) -> Option<BoundRule> {
    let _ = options;
    Some(match id {
        "spec" => spec::rule(severity),
        // Reported by the walker as it crosses references.
        "no-unresolved-refs" => BoundRule::new(id, severity),
        "operation-2xx-response" => style::responses_have(id, severity, '2'),
        "operation-4xx-response" => style::responses_have(id, severity, '4'),
        "operation-operationId" => style::required_field(id, severity, "Operation", "operationId"),
        "operation-description" => style::required_field(id, severity, "Operation", "description"),
        "no-path-trailing-slash" => style::no_path_trailing_slash(severity),
        "tag-description" => style::required_field(id, severity, "Tag", "description"),
        "info-description" => style::required_field(id, severity, "Info", "description"),
        _ => return None,
    })
}
