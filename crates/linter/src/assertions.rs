//! Compilation of declarative assertions into synthetic rules attached to
//! their subject node type.

use crate::plugin::{AssertionFn, Plugin};
use crate::problem::Severity;
use crate::visit::{BoundRule, Context, Report, Visitor};
use lazy_static::lazy_static;
use regex::Regex;
use sources::{ParseNode, Token};
use styleguide::{ConfigError, RawAssertion, SeverityLevel};

pub(crate) fn compile(
    assertion: &RawAssertion,
    index: usize,
    plugins: &[Plugin],
) -> Result<BoundRule, ConfigError> {
    let id = assertion
        .assertion_id
        .clone()
        .unwrap_or_else(|| format!("assertion-{index}"));
    let severity = match assertion.severity {
        Some(SeverityLevel::Warn) => Severity::Warn,
        Some(SeverityLevel::Off) | Some(SeverityLevel::Error) | None => Severity::Error,
    };

    let mut predicates = Vec::new();
    for (name, options) in &assertion.predicates {
        predicates.push(Predicate::parse(name, options, plugins)?);
    }

    let visitor = AssertionVisitor {
        property: assertion.property.clone(),
        message: assertion.message.clone(),
        predicates,
    };
    Ok(BoundRule::new(id, severity).with_visitor(assertion.subject.clone(), Box::new(visitor)))
}

enum Predicate {
    Defined(bool),
    Pattern(Regex),
    MinLength(usize),
    MaxLength(usize),
    Enum(Vec<serde_json::Value>),
    Casing(Casing),
    Ref(bool),
    Const(serde_json::Value),
    Custom {
        function: AssertionFn,
        options: serde_json::Value,
    },
}

impl Predicate {
    fn parse(
        name: &str,
        options: &serde_json::Value,
        plugins: &[Plugin],
    ) -> Result<Predicate, ConfigError> {
        let invalid = |detail: &str| ConfigError::InvalidAssertion {
            predicate: name.to_string(),
            detail: detail.to_string(),
        };

        Ok(match name {
            "defined" => Predicate::Defined(
                options.as_bool().ok_or_else(|| invalid("expected a boolean"))?,
            ),
            "pattern" => {
                let pattern = options.as_str().ok_or_else(|| invalid("expected a string"))?;
                Predicate::Pattern(
                    Regex::new(pattern).map_err(|err| invalid(&err.to_string()))?,
                )
            }
            "minLength" => Predicate::MinLength(
                options
                    .as_u64()
                    .ok_or_else(|| invalid("expected an unsigned integer"))?
                    as usize,
            ),
            "maxLength" => Predicate::MaxLength(
                options
                    .as_u64()
                    .ok_or_else(|| invalid("expected an unsigned integer"))?
                    as usize,
            ),
            "enum" => Predicate::Enum(
                options
                    .as_array()
                    .ok_or_else(|| invalid("expected an array"))?
                    .clone(),
            ),
            "casing" => Predicate::Casing(Casing::parse(
                options.as_str().ok_or_else(|| invalid("expected a string"))?,
            )?),
            "ref" => Predicate::Ref(
                options.as_bool().ok_or_else(|| invalid("expected a boolean"))?,
            ),
            "const" => Predicate::Const(options.clone()),
            other => {
                // "<pluginId>/<function>", pre-validated at config time.
                let Some((plugin_id, function)) = other.split_once('/') else {
                    return Err(ConfigError::UnknownPredicate {
                        name: other.to_string(),
                    });
                };
                let plugin = plugins
                    .iter()
                    .find(|p| p.id == plugin_id)
                    .ok_or_else(|| ConfigError::UnknownPlugin {
                        id: plugin_id.to_string(),
                    })?;
                let function = plugin.assertions.get(function).copied().ok_or_else(|| {
                    ConfigError::MissingAssertionFunction {
                        plugin: plugin_id.to_string(),
                        function: function.to_string(),
                    }
                })?;
                Predicate::Custom {
                    function,
                    options: options.clone(),
                }
            }
        })
    }

    /// Evaluate against a present value; Err carries the failure text.
    /// `Defined` is handled by the visitor, which knows about absence.
    fn check(&self, node: &ParseNode) -> Result<(), String> {
        match self {
            Predicate::Defined(_) => Ok(()),
            Predicate::Pattern(pattern) => match node.as_str() {
                Some(value) if pattern.is_match(value) => Ok(()),
                Some(_) => Err(format!("should match pattern /{pattern}/")),
                None => Err("should be a string".to_string()),
            },
            Predicate::MinLength(min) => match length_of(node) {
                Some(len) if len >= *min => Ok(()),
                Some(_) => Err(format!("should have a minimum length of {min}")),
                None => Err("should have a length".to_string()),
            },
            Predicate::MaxLength(max) => match length_of(node) {
                Some(len) if len <= *max => Ok(()),
                Some(_) => Err(format!("should have a maximum length of {max}")),
                None => Err("should have a length".to_string()),
            },
            Predicate::Enum(values) => {
                if values.contains(&node.to_value()) {
                    Ok(())
                } else {
                    Err("should be one of the allowed values".to_string())
                }
            }
            Predicate::Casing(casing) => match node.as_str() {
                Some(value) if casing.matches(value) => Ok(()),
                Some(_) => Err(format!("should use {} casing", casing.name())),
                None => Err("should be a string".to_string()),
            },
            Predicate::Ref(expected) => {
                let is_ref = node.ref_target().is_some();
                match (is_ref, expected) {
                    (true, true) | (false, false) => Ok(()),
                    (false, true) => Err("should be a $ref".to_string()),
                    (true, false) => Err("should not be a $ref".to_string()),
                }
            }
            Predicate::Const(expected) => {
                if node.to_value() == *expected {
                    Ok(())
                } else {
                    Err("should be equal to the expected value".to_string())
                }
            }
            Predicate::Custom { function, options } => function(&node.to_value(), options),
        }
    }
}

fn length_of(node: &ParseNode) -> Option<usize> {
    match node {
        ParseNode::Scalar { .. } => node.as_str().map(|s| s.chars().count()),
        ParseNode::Sequence { items, .. } => Some(items.len()),
        ParseNode::Mapping { entries, .. } => Some(entries.len()),
    }
}

struct AssertionVisitor {
    property: Option<String>,
    message: Option<String>,
    predicates: Vec<Predicate>,
}

impl AssertionVisitor {
    fn message_or(&self, detail: String) -> String {
        self.message.clone().unwrap_or(detail)
    }
}

impl Visitor for AssertionVisitor {
    fn enter(&self, node: &ParseNode, ctx: &mut Context) {
        let required = self.predicates.iter().find_map(|p| match p {
            Predicate::Defined(required) => Some(*required),
            _ => None,
        });

        let target = match &self.property {
            Some(property) => node.get(property),
            None => Some(node),
        };

        let property_pointer = self.property.as_ref().map(|property| {
            let mut pointer = ctx.pointer();
            pointer.push(Token::Property(property.clone()));
            pointer
        });

        match (target, required) {
            // Missing property anchors the problem on the subject's key.
            (None, Some(true)) => {
                let property = self.property.as_deref().unwrap_or_default();
                ctx.report(Report {
                    message: self.message_or(format!("`{property}` must be defined")),
                    report_on_key: true,
                    ..Default::default()
                });
            }
            (None, _) => {}
            (Some(_), Some(false)) => {
                let property = self.property.as_deref().unwrap_or_default();
                ctx.report(Report {
                    message: self.message_or(format!("`{property}` must not be defined")),
                    location: property_pointer,
                    ..Default::default()
                });
            }
            (Some(value), _) => {
                for predicate in &self.predicates {
                    if let Err(detail) = predicate.check(value) {
                        ctx.report(Report {
                            message: self.message_or(detail),
                            location: property_pointer.clone(),
                            ..Default::default()
                        });
                    }
                }
            }
        }
    }
}

#[derive(Copy, Clone)]
enum Casing {
    Camel,
    Kebab,
    Snake,
    Pascal,
    Cobol,
    Macro,
}

impl Casing {
    fn parse(name: &str) -> Result<Casing, ConfigError> {
        Ok(match name {
            "camelCase" => Casing::Camel,
            "kebab-case" => Casing::Kebab,
            "snake_case" => Casing::Snake,
            "PascalCase" => Casing::Pascal,
            "COBOL-CASE" => Casing::Cobol,
            "MACRO_CASE" => Casing::Macro,
            other => {
                return Err(ConfigError::InvalidAssertion {
                    predicate: "casing".to_string(),
                    detail: format!("unknown casing style '{other}'"),
                })
            }
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Casing::Camel => "camelCase",
            Casing::Kebab => "kebab-case",
            Casing::Snake => "snake_case",
            Casing::Pascal => "PascalCase",
            Casing::Cobol => "COBOL-CASE",
            Casing::Macro => "MACRO_CASE",
        }
    }

    fn matches(&self, value: &str) -> bool {
        lazy_static! {
            static ref CAMEL: Regex = Regex::new("^[a-z][a-zA-Z0-9]*$").expect("static pattern");
            static ref KEBAB: Regex =
                Regex::new("^[a-z0-9]+(-[a-z0-9]+)*$").expect("static pattern");
            static ref SNAKE: Regex =
                Regex::new("^[a-z0-9]+(_[a-z0-9]+)*$").expect("static pattern");
            static ref PASCAL: Regex = Regex::new("^[A-Z][a-zA-Z0-9]*$").expect("static pattern");
            static ref COBOL: Regex =
                Regex::new("^[A-Z0-9]+(-[A-Z0-9]+)*$").expect("static pattern");
            static ref MACRO: Regex =
                Regex::new("^[A-Z0-9]+(_[A-Z0-9]+)*$").expect("static pattern");
        }
        match self {
            Casing::Camel => CAMEL.is_match(value),
            Casing::Kebab => KEBAB.is_match(value),
            Casing::Snake => SNAKE.is_match(value),
            Casing::Pascal => PASCAL.is_match(value),
            Casing::Cobol => COBOL.is_match(value),
            Casing::Macro => MACRO.is_match(value),
        }
    }
}
