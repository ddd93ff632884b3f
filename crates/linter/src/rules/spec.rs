//! The `spec` rule: structural conformance of every node against its
//! NodeType, covering required and unexpected fields, scalar kinds and
//! enums, and the named shape constraints of the registry.

use crate::problem::Severity;
use crate::visit::{BoundRule, Context, Report, Visitor};
use itertools::Itertools;
use oas::{Additional, NodeType, ObjectType, ScalarType, ShapeRule};
use sources::{ParseNode, Pointer, Token};

pub(crate) fn rule(severity: Severity) -> BoundRule {
    BoundRule::new("spec", severity).with_visitor("any", Box::new(SpecVisitor))
}

struct SpecVisitor;

impl Visitor for SpecVisitor {
    fn enter(&self, node: &ParseNode, ctx: &mut Context) {
        match ctx.node_type {
            NodeType::Object(object) => check_object(node, object, ctx),
            NodeType::MapOf { .. } => {
                if !matches!(node, ParseNode::Mapping { .. }) {
                    report_kind_mismatch(node, "object", ctx);
                }
            }
            NodeType::Array { .. } => {
                if !matches!(node, ParseNode::Sequence { .. }) {
                    report_kind_mismatch(node, "array", ctx);
                }
            }
            NodeType::Scalar(scalar) => check_scalar(node, scalar, ctx),
            NodeType::Any | NodeType::Union(_) => {}
        }
    }
}

fn check_object(node: &ParseNode, object: &ObjectType, ctx: &mut Context) {
    let ParseNode::Mapping { entries, .. } = node else {
        report_kind_mismatch(node, "object", ctx);
        return;
    };

    for property in object.properties.iter().filter(|p| p.required) {
        if !entries.iter().any(|e| e.key == property.name) {
            ctx.report(Report {
                message: format!(
                    "The field `{}` must be present on this level.",
                    property.name
                ),
                report_on_key: true,
                ..Default::default()
            });
        }
    }

    for entry in entries {
        let known = object.properties.iter().any(|p| p.name == entry.key)
            || (entry.key.starts_with("x-") && object.extensions_allowed)
            || object
                .pattern_properties
                .iter()
                .any(|(pattern, _)| oas::pattern_matches(pattern, &entry.key))
            || matches!(object.additional, Additional::Typed(_));
        if !known {
            ctx.report(Report {
                message: format!("Property `{}` is not expected here.", entry.key),
                location: Some(child_pointer(ctx, &entry.key)),
                report_on_key: true,
                ..Default::default()
            });
        }
    }

    for shape_rule in object.shape_rules {
        match shape_rule {
            ShapeRule::RequireAny { fields } => {
                if !fields
                    .iter()
                    .any(|field| entries.iter().any(|e| e.key == *field))
                {
                    ctx.report(Report {
                        message: format!(
                            "Must contain at least one of the following fields: {}.",
                            fields.join(", ")
                        ),
                        report_on_key: true,
                        ..Default::default()
                    });
                }
            }
            ShapeRule::NullableRequiresType => {
                if node.get("nullable").is_some() && node.get("type").is_none() {
                    ctx.report(Report {
                        message: "The `type` field must be defined when the `nullable` field is used."
                            .to_string(),
                        location: Some(child_pointer(ctx, "nullable")),
                        report_on_key: false,
                        ..Default::default()
                    });
                }
            }
        }
    }
}

fn check_scalar(node: &ParseNode, scalar: &ScalarType, ctx: &mut Context) {
    if !matches!(node, ParseNode::Scalar { .. }) {
        report_kind_mismatch(node, scalar.primitive.name(), ctx);
        return;
    }

    if let Some(values) = scalar.enum_values {
        let allowed = node
            .as_str()
            .map_or(false, |value| values.iter().any(|v| *v == value));
        if !allowed {
            let field = ctx.key.unwrap_or(ctx.type_name);
            let list = values.iter().map(|v| format!("\"{v}\"")).join(", ");
            ctx.report(Report {
                message: format!("`{field}` can be one of the following only: {list}."),
                ..Default::default()
            });
        }
    } else if !scalar.primitive.matches(node) {
        report_kind_mismatch(node, scalar.primitive.name(), ctx);
    }
}

fn report_kind_mismatch(node: &ParseNode, expected: &str, ctx: &mut Context) {
    ctx.report(Report {
        message: format!(
            "Expected type `{}` ({expected}) but got {}.",
            ctx.type_name,
            node.kind()
        ),
        ..Default::default()
    });
}

fn child_pointer(ctx: &Context, key: &str) -> Pointer {
    let mut pointer = ctx.pointer();
    pointer.push(Token::Property(key.to_string()));
    pointer
}
