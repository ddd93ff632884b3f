//! Stylistic built-in rules, each a small visitor on one node type.

use crate::problem::Severity;
use crate::visit::{BoundRule, Context, Report, Visitor};
use sources::ParseNode;

/// `operation-2xx-response` / `operation-4xx-response`: an operation's
/// responses must include at least one status of the given class.
pub(crate) fn responses_have(id: &str, severity: Severity, class: char) -> BoundRule {
    BoundRule::new(id, severity).with_visitor("Responses", Box::new(ResponsesHave { class }))
}

struct ResponsesHave {
    class: char,
}

impl Visitor for ResponsesHave {
    fn enter(&self, node: &ParseNode, ctx: &mut Context) {
        let ParseNode::Mapping { entries, .. } = node else {
            return;
        };
        if !entries.iter().any(|e| e.key.starts_with(self.class)) {
            ctx.report(Report {
                message: format!(
                    "Operation must have at least one `{}xx` response.",
                    self.class
                ),
                report_on_key: true,
                ..Default::default()
            });
        }
    }
}

/// Rules of the shape "`<Type>` object should contain `<field>` field".
pub(crate) fn required_field(
    id: &str,
    severity: Severity,
    subject: &'static str,
    field: &'static str,
) -> BoundRule {
    BoundRule::new(id, severity).with_visitor(subject, Box::new(RequiredField { subject, field }))
}

struct RequiredField {
    subject: &'static str,
    field: &'static str,
}

impl Visitor for RequiredField {
    fn enter(&self, node: &ParseNode, ctx: &mut Context) {
        if node.get(self.field).is_none() {
            ctx.report(Report {
                message: format!(
                    "{} object should contain `{}` field.",
                    self.subject, self.field
                ),
                report_on_key: true,
                ..Default::default()
            });
        }
    }
}

pub(crate) fn no_path_trailing_slash(severity: Severity) -> BoundRule {
    BoundRule::new("no-path-trailing-slash", severity)
        .with_visitor("PathItem", Box::new(NoPathTrailingSlash))
}

struct NoPathTrailingSlash;

impl Visitor for NoPathTrailingSlash {
    fn enter(&self, _node: &ParseNode, ctx: &mut Context) {
        let Some(path) = ctx.key else { return };
        if path.len() > 1 && path.ends_with('/') {
            ctx.report(Report {
                message: format!("`{path}` should not have a trailing slash."),
                report_on_key: true,
                ..Default::default()
            });
        }
    }
}
