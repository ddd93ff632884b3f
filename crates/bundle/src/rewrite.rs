use crate::BundleError;
use serde_json::{json, Value};
use sources::{Catalog, ParseNode, Pointer, Resolution, ResolvedRef, Token};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Inline every non-circular external reference into `components/…`,
/// renaming on collision with a deterministic numeric suffix. References
/// within the root document stay local; circular references stay as `$ref`s
/// into the bundled components section.
pub fn bundle(catalog: &Catalog, root: &Url) -> Result<Value, BundleError> {
    let (root, source) = require_source(catalog, root)?;

    let mut bundler = Bundler {
        catalog,
        root: root.clone(),
        components: BTreeMap::new(),
        assigned: BTreeMap::new(),
        used: seed_used(&source.root),
        stack: Vec::new(),
    };
    let mut doc = bundler.rewrite(&source.root, &root)?;

    if !bundler.components.is_empty() {
        if let Value::Object(map) = &mut doc {
            let components = map
                .entry("components")
                .or_insert_with(|| json!({}));
            for (section, entries) in bundler.components {
                if let Some(components) = components.as_object_mut() {
                    let section = components
                        .entry(section)
                        .or_insert_with(|| json!({}));
                    if let Some(section) = section.as_object_mut() {
                        for (name, body) in entries {
                            section.insert(name, body);
                        }
                    }
                }
            }
        }
    }
    Ok(doc)
}

/// Inline every reference at its use site. Circular references cannot be
/// represented this way and are fatal.
pub fn dereference(catalog: &Catalog, root: &Url) -> Result<Value, BundleError> {
    let (root, source) = require_source(catalog, root)?;
    let mut stack = Vec::new();
    deref_rewrite(catalog, &source.root, &root, &mut stack)
}

fn require_source<'c>(
    catalog: &'c Catalog,
    root: &Url,
) -> Result<(Url, &'c std::sync::Arc<sources::Source>), BundleError> {
    let mut root = root.clone();
    root.set_fragment(None);
    let source = catalog
        .source(&root)
        .ok_or_else(|| BundleError::MissingSource { uri: root.clone() })?;
    Ok((root, source))
}

struct Bundler<'c> {
    catalog: &'c Catalog,
    root: Url,
    // section -> name -> rewritten body.
    components: BTreeMap<String, BTreeMap<String, Value>>,
    assigned: BTreeMap<(Url, Pointer), (String, String)>,
    used: BTreeMap<String, BTreeSet<String>>,
    stack: Vec<(Url, Pointer)>,
}

impl<'c> Bundler<'c> {
    fn rewrite(&mut self, node: &ParseNode, base: &Url) -> Result<Value, BundleError> {
        if let Some(reference) = node.ref_target() {
            return self.rewrite_ref(reference, base);
        }
        Ok(match node {
            ParseNode::Mapping { entries, .. } => {
                let mut map = serde_json::Map::new();
                for entry in entries {
                    map.insert(entry.key.clone(), self.rewrite(&entry.value, base)?);
                }
                Value::Object(map)
            }
            ParseNode::Sequence { items, .. } => Value::Array(
                items
                    .iter()
                    .map(|item| self.rewrite(item, base))
                    .collect::<Result<_, _>>()?,
            ),
            ParseNode::Scalar { .. } => node.to_value(),
        })
    }

    fn rewrite_ref(&mut self, reference: &str, base: &Url) -> Result<Value, BundleError> {
        let resolved = match self.catalog.resolve(base, reference)? {
            // Pointer-level cycles stay as written.
            Resolution::Circular(_) => return Ok(json!({ "$ref": reference })),
            Resolution::Resolved(resolved) => resolved,
        };

        if resolved.uri == self.root {
            return Ok(json!({ "$ref": format!("#{}", resolved.pointer) }));
        }

        let key = (resolved.uri.clone(), resolved.pointer.clone());
        if let Some(place) = self.assigned.get(&key) {
            return Ok(component_ref(place));
        }
        if self.stack.contains(&key) {
            // A circular external target: reserve its component slot and
            // point at it; its body completes up-stack.
            let place = self.assign(&resolved);
            return Ok(component_ref(&place));
        }

        let source =
            self.catalog
                .source(&resolved.uri)
                .ok_or_else(|| BundleError::MissingSource {
                    uri: resolved.uri.clone(),
                })?;
        let target = source
            .node_at(&resolved.pointer)
            .ok_or_else(|| BundleError::MissingSource {
                uri: resolved.uri.clone(),
            })?;

        self.stack.push(key.clone());
        let body = self.rewrite(target, &resolved.uri)?;
        self.stack.pop();

        let place = match self.assigned.get(&key) {
            Some(place) => place.clone(),
            None => self.assign(&resolved),
        };
        self.components
            .entry(place.0.clone())
            .or_default()
            .insert(place.1.clone(), body);
        Ok(component_ref(&place))
    }

    /// Choose a components section and collision-free name for a target.
    /// Targets already shaped like `…/components/<section>/<name>` or
    /// `…/definitions/<name>` keep their section and name.
    fn assign(&mut self, resolved: &ResolvedRef) -> (String, String) {
        let tokens = resolved.pointer.0.as_slice();
        let (section, base_name) = match tokens {
            [Token::Property(c), Token::Property(section), Token::Property(name), ..]
                if c == "components" =>
            {
                (section.clone(), name.clone())
            }
            [Token::Property(d), Token::Property(name), ..] if d == "definitions" => {
                ("schemas".to_string(), name.clone())
            }
            _ => {
                let name = tokens
                    .iter()
                    .rev()
                    .find_map(|token| match token {
                        Token::Property(name) => Some(name.clone()),
                        Token::Index(_) => None,
                    })
                    .unwrap_or_else(|| file_stem(&resolved.uri));
                ("schemas".to_string(), name)
            }
        };

        let used = self.used.entry(section.clone()).or_default();
        let mut name = base_name.clone();
        let mut counter = 1;
        while used.contains(&name) {
            counter += 1;
            name = format!("{base_name}-{counter}");
        }
        used.insert(name.clone());

        let place = (section, name);
        self.assigned.insert(
            (resolved.uri.clone(), resolved.pointer.clone()),
            place.clone(),
        );
        place
    }
}

fn component_ref(place: &(String, String)) -> Value {
    let escape = |s: &str| s.replace('~', "~0").replace('/', "~1");
    json!({ "$ref": format!("#/components/{}/{}", escape(&place.0), escape(&place.1)) })
}

/// Component names already taken by the root document itself.
fn seed_used(root: &ParseNode) -> BTreeMap<String, BTreeSet<String>> {
    let mut used: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    if let Some(components) = root.get("components") {
        for section in components.entries() {
            let names = section
                .value
                .entries()
                .iter()
                .map(|e| e.key.clone())
                .collect();
            used.insert(section.key.clone(), names);
        }
    }
    if let Some(definitions) = root.get("definitions") {
        used.insert(
            "schemas".to_string(),
            definitions.entries().iter().map(|e| e.key.clone()).collect(),
        );
    }
    used
}

fn file_stem(uri: &Url) -> String {
    uri.path_segments()
        .and_then(|segments| segments.last())
        .map(|segment| segment.split('.').next().unwrap_or(segment).to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "schema".to_string())
}

fn deref_rewrite(
    catalog: &Catalog,
    node: &ParseNode,
    base: &Url,
    stack: &mut Vec<(Url, Pointer)>,
) -> Result<Value, BundleError> {
    if let Some(reference) = node.ref_target() {
        let resolved = match catalog.resolve(base, reference)? {
            Resolution::Circular(circular) => {
                return Err(BundleError::CircularJsonNotSupported {
                    uri: circular.uri,
                    pointer: circular.pointer,
                })
            }
            Resolution::Resolved(resolved) => resolved,
        };
        let key = (resolved.uri.clone(), resolved.pointer.clone());
        if stack.contains(&key) {
            return Err(BundleError::CircularJsonNotSupported {
                uri: resolved.uri,
                pointer: resolved.pointer,
            });
        }
        let source = catalog
            .source(&resolved.uri)
            .ok_or_else(|| BundleError::MissingSource {
                uri: resolved.uri.clone(),
            })?;
        let target = source
            .node_at(&resolved.pointer)
            .ok_or_else(|| BundleError::MissingSource {
                uri: resolved.uri.clone(),
            })?;

        stack.push(key);
        let inlined = deref_rewrite(catalog, target, &resolved.uri, stack)?;
        stack.pop();
        return Ok(inlined);
    }

    Ok(match node {
        ParseNode::Mapping { entries, .. } => {
            let mut map = serde_json::Map::new();
            for entry in entries {
                map.insert(
                    entry.key.clone(),
                    deref_rewrite(catalog, &entry.value, base, stack)?,
                );
            }
            Value::Object(map)
        }
        ParseNode::Sequence { items, .. } => Value::Array(
            items
                .iter()
                .map(|item| deref_rewrite(catalog, item, base, stack))
                .collect::<Result<_, _>>()?,
        ),
        ParseNode::Scalar { .. } => node.to_value(),
    })
}
