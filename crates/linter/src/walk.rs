//! The central traversal: schema-directed descent over a resolved document,
//! firing preprocessor / rule / decorator visitors per node, crossing `$ref`
//! boundaries with `from` bookkeeping, and isolating rule panics.

use crate::problem::{LocationStep, Problem, ProblemCollector, Severity};
use crate::visit::{BoundRule, Context, Report, RuleSet};
use oas::{Additional, NodeType, Registry};
use sources::{Catalog, ParseNode, Pointer, Resolution, Scope, Source, Token};
use std::panic::{catch_unwind, AssertUnwindSafe};
use url::Url;

#[derive(Copy, Clone, PartialEq)]
enum Phase {
    Preprocess,
    Rule,
    Decorate,
}

#[derive(Default)]
struct PhaseState {
    // Depth at which each visitor skipped the subtree, or None.
    skips: Vec<Option<usize>>,
    // Visitors which requested skip_refs during this walk.
    skip_refs: Vec<bool>,
    // Visitors disabled after a panic.
    disabled: Vec<bool>,
}

impl PhaseState {
    fn sized(len: usize) -> PhaseState {
        PhaseState {
            skips: vec![None; len],
            skip_refs: vec![false; len],
            disabled: vec![false; len],
        }
    }
}

pub(crate) struct Walker<'r> {
    catalog: &'r Catalog,
    registry: Registry,
    rule_set: &'r RuleSet,
    collector: &'r mut ProblemCollector,
    pub(crate) edits: Vec<(Url, Pointer, serde_json::Value)>,

    pre_state: PhaseState,
    rule_state: PhaseState,
    dec_state: PhaseState,
    depth: usize,
    // (uri, pointer) of each `$ref` target crossed on the current path.
    // Re-entry through a different chain is allowed; through the same chain
    // it would never terminate.
    chain: Vec<(Url, Pointer)>,
}

impl<'r> Walker<'r> {
    pub fn new(
        catalog: &'r Catalog,
        registry: Registry,
        rule_set: &'r RuleSet,
        collector: &'r mut ProblemCollector,
    ) -> Walker<'r> {
        Walker {
            catalog,
            registry,
            rule_set,
            collector,
            edits: Vec::new(),
            pre_state: PhaseState::sized(rule_set.preprocessors.len()),
            rule_state: PhaseState::sized(rule_set.rules.len()),
            dec_state: PhaseState::sized(rule_set.decorators.len()),
            depth: 0,
            chain: Vec::new(),
        }
    }

    pub fn walk(&mut self, source: &Source) {
        self.surface_parse_warnings();

        let scope = Scope::new(&source.uri);
        self.walk_node(&source.root, Registry::ROOT, &scope, None);
    }

    /// Parser conditions which are reported rather than raised (duplicate
    /// keys, non-string keys, tabs in indentation) surface as `spec`
    /// problems against their source.
    fn surface_parse_warnings(&mut self) {
        let Some(severity) = self.rule_set.severity_of("spec") else {
            return;
        };
        for source in self.catalog.sources() {
            for warning in &source.warnings {
                let pointer = source.pointer_of(warning.span().begin);
                self.collector.push(Problem {
                    rule_id: "spec".to_string(),
                    severity,
                    message: warning.to_string(),
                    suggest: Vec::new(),
                    location: vec![LocationStep {
                        source: source.uri.clone(),
                        pointer,
                        report_on_key: false,
                    }],
                    from: None,
                });
            }
        }
    }

    fn walk_node(
        &mut self,
        node: &ParseNode,
        type_name: &'static str,
        scope: &Scope,
        key: Option<&str>,
    ) {
        self.depth += 1;

        if let Some(reference) = node.ref_target() {
            self.walk_ref(reference, type_name, scope, key);
            self.depth -= 1;
            return;
        }

        if let Some((type_name, node_type)) = self.effective_type(type_name, node, scope, key) {
            // Phase order per node: preprocessors, rule enters, children,
            // rule leaves, decorators.
            self.fire(Phase::Preprocess, true, node, type_name, node_type, scope, key);
            self.fire(Phase::Rule, true, node, type_name, node_type, scope, key);

            self.walk_children(node, node_type, scope, key);

            self.fire(Phase::Rule, false, node, type_name, node_type, scope, key);
            self.fire(Phase::Decorate, false, node, type_name, node_type, scope, key);

            self.clear_skips();
        }
        self.depth -= 1;
    }

    /// Resolve a Union to its concrete variant. A node matching no variant
    /// is reported and its descent halts; known siblings continue.
    fn effective_type(
        &mut self,
        name: &'static str,
        node: &ParseNode,
        scope: &Scope,
        key: Option<&str>,
    ) -> Option<(&'static str, &'static NodeType)> {
        static ANY: NodeType = NodeType::Any;

        let Some(node_type) = self.registry.node_type(name) else {
            return Some((name, &ANY));
        };
        let NodeType::Union(union) = node_type else {
            return Some((name, node_type));
        };

        if let Some(discriminated) = &union.discriminator {
            if let Some(tag) = node.get(discriminated.field).and_then(ParseNode::as_str) {
                if let Some((_, variant)) = discriminated
                    .mapping
                    .iter()
                    .find(|(value, _)| *value == tag)
                {
                    return self.effective_type(variant, node, scope, key);
                }
            }
        }
        for variant in union.variants {
            if self.registry.shape_matches(variant, node) {
                return self.effective_type(variant, node, scope, key);
            }
        }

        self.report_walker(
            scope,
            "spec",
            Report {
                message: format!("Property `{}` is not expected here.", key.unwrap_or(name)),
                report_on_key: true,
                ..Default::default()
            },
        );
        None
    }

    fn walk_children(
        &mut self,
        node: &ParseNode,
        node_type: &'static NodeType,
        scope: &Scope,
        key: Option<&str>,
    ) {
        match node_type {
            NodeType::Object(object) => {
                let ParseNode::Mapping { entries, .. } = node else {
                    return;
                };
                for entry in entries {
                    let child = scope.push_prop(&entry.key);
                    if let Some(property) =
                        object.properties.iter().find(|p| p.name == entry.key)
                    {
                        self.walk_node(&entry.value, property.type_name, &child, Some(&entry.key));
                    } else if entry.key.starts_with("x-") && object.extensions_allowed {
                        // Extensions are typed Any unless registered.
                    } else if let Some((_, type_name)) = object
                        .pattern_properties
                        .iter()
                        .find(|(pattern, _)| oas::pattern_matches(pattern, &entry.key))
                    {
                        self.walk_node(&entry.value, type_name, &child, Some(&entry.key));
                    } else if let Additional::Typed(type_name) = object.additional {
                        self.walk_node(&entry.value, type_name, &child, Some(&entry.key));
                    }
                    // Unknown fields halt descent; the spec rule reports them.
                }
            }
            NodeType::MapOf { value } => {
                let ParseNode::Mapping { entries, .. } = node else {
                    return;
                };
                for entry in entries {
                    let child = scope.push_prop(&entry.key);
                    self.walk_node(&entry.value, value, &child, Some(&entry.key));
                }
            }
            NodeType::Array { item } => {
                let ParseNode::Sequence { items, .. } = node else {
                    return;
                };
                for (index, item_node) in items.iter().enumerate() {
                    let child = scope.push_item(index);
                    // Items inherit the enclosing property name for messages.
                    self.walk_node(item_node, item, &child, key);
                }
            }
            NodeType::Scalar(_) | NodeType::Any | NodeType::Union(_) => {}
        }
    }

    fn walk_ref(
        &mut self,
        reference: &str,
        type_name: &'static str,
        scope: &Scope,
        key: Option<&str>,
    ) {
        let resolved = match self.catalog.resolve(scope.resource(), reference) {
            Err(err) => {
                self.report_walker(
                    scope,
                    "no-unresolved-refs",
                    Report {
                        message: err.to_string(),
                        ..Default::default()
                    },
                );
                return;
            }
            // The sentinel stops traversal; rules that care inspect it
            // through Context::resolve.
            Ok(Resolution::Circular(_)) => return,
            Ok(Resolution::Resolved(resolved)) => resolved,
        };

        let step = (resolved.uri.clone(), resolved.pointer.clone());
        if self.chain.contains(&step) {
            return;
        }
        let Some(source) = self.catalog.source(&resolved.uri) else {
            return;
        };
        let Some(target) = source.node_at(&resolved.pointer) else {
            return;
        };

        // The nearest property name inside the target, for rule messages.
        let target_key = resolved.pointer.0.iter().rev().find_map(|token| match token {
            Token::Property(name) => Some(name.clone()),
            Token::Index(_) => None,
        });

        self.chain.push(step);
        let target_scope = scope.push_resource(&source.uri);
        self.descend(
            &resolved.pointer.0,
            &target_scope,
            target,
            type_name,
            target_key.as_deref().or(key),
        );
        self.chain.pop();
    }

    /// Rebuild the target's location steps inside its own source, then walk.
    fn descend(
        &mut self,
        tokens: &[Token],
        scope: &Scope,
        target: &ParseNode,
        type_name: &'static str,
        key: Option<&str>,
    ) {
        match tokens.split_first() {
            None => self.walk_node(target, type_name, scope, key),
            Some((Token::Property(name), rest)) => {
                let next = scope.push_prop(name);
                self.descend(rest, &next, target, type_name, key);
            }
            Some((Token::Index(index), rest)) => {
                let next = scope.push_item(*index);
                self.descend(rest, &next, target, type_name, key);
            }
        }
    }

    fn fire(
        &mut self,
        phase: Phase,
        enter: bool,
        node: &ParseNode,
        type_name: &'static str,
        node_type: &'static NodeType,
        scope: &Scope,
        key: Option<&str>,
    ) {
        let rule_set = self.rule_set;
        let rules: &'r [BoundRule] = match phase {
            Phase::Preprocess => &rule_set.preprocessors,
            Phase::Rule => &rule_set.rules,
            Phase::Decorate => &rule_set.decorators,
        };

        let depth = self.depth;
        let in_ref_target = scope.resource_depth() > 1;
        for (index, rule) in rules.iter().enumerate() {
            {
                let state = self.state(phase);
                if state.disabled[index] {
                    continue;
                }
                if matches!(state.skips[index], Some(at) if depth > at) {
                    continue;
                }
                if in_ref_target && (rule.skip_refs || state.skip_refs[index]) {
                    continue;
                }
            }
            let Some(visitor) = rule
                .visitors
                .get(type_name)
                .or_else(|| rule.visitors.get("any"))
            else {
                continue;
            };

            let mut ctx = Context {
                type_name,
                node_type,
                key,
                version: self.registry.version,
                registry: self.registry,
                rule_id: &rule.id,
                scope,
                catalog: self.catalog,
                reports: Vec::new(),
                patches: Vec::new(),
                skipped: false,
                skipped_refs: false,
            };

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                if enter {
                    visitor.enter(node, &mut ctx);
                } else {
                    visitor.leave(node, &mut ctx);
                }
            }));

            match outcome {
                Ok(()) => {
                    let Context {
                        reports,
                        patches,
                        skipped,
                        skipped_refs,
                        ..
                    } = ctx;
                    if skipped {
                        self.state(phase).skips[index] = Some(depth);
                    }
                    if skipped_refs {
                        self.state(phase).skip_refs[index] = true;
                    }
                    for report in reports {
                        self.emit(&rule.id, rule.severity, report, scope);
                    }
                    self.edits.extend(patches);
                }
                Err(payload) => {
                    drop(ctx);
                    self.state(phase).disabled[index] = true;
                    self.collector.rule_errors += 1;
                    tracing::error!(
                        rule = %rule.id,
                        panic = %panic_message(&payload),
                        "rule callback panicked, rule is disabled for the rest of the walk",
                    );
                }
            }
        }
    }

    fn state(&mut self, phase: Phase) -> &mut PhaseState {
        match phase {
            Phase::Preprocess => &mut self.pre_state,
            Phase::Rule => &mut self.rule_state,
            Phase::Decorate => &mut self.dec_state,
        }
    }

    fn clear_skips(&mut self) {
        let depth = self.depth;
        for state in [&mut self.pre_state, &mut self.rule_state, &mut self.dec_state] {
            for skip in &mut state.skips {
                if matches!(skip, Some(at) if *at >= depth) {
                    *skip = None;
                }
            }
        }
    }

    /// Problems the walker reports on its own behalf, under a named rule's
    /// configured severity. Disabled rules silence them.
    fn report_walker(&mut self, scope: &Scope, rule_id: &str, report: Report) {
        let Some(severity) = self.rule_set.severity_of(rule_id) else {
            return;
        };
        self.emit(rule_id, severity, report, scope);
    }

    fn emit(&mut self, rule_id: &str, severity: Severity, report: Report, scope: &Scope) {
        let mut location: Vec<LocationStep> = scope
            .chain()
            .into_iter()
            .map(|(source, pointer)| LocationStep {
                source,
                pointer,
                report_on_key: false,
            })
            .collect();
        if let Some(pointer) = report.location {
            location[0].pointer = pointer;
        }
        location[0].report_on_key = report.report_on_key;
        let from = location.get(1).cloned();

        self.collector.push(Problem {
            rule_id: rule_id.to_string(),
            severity,
            message: report.message,
            suggest: report.suggest,
            location,
            from,
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
