use crate::fetch::Fetcher;
use crate::parse::ParseNode;
use crate::ptr::{Pointer, Token};
use crate::store::Source;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("failed to parse $ref '{reference}': {detail}")]
    MalformedRef { reference: String, detail: String },
    #[error("failed to resolve '{uri}': {detail}")]
    Fetch { uri: Url, detail: String },
    #[error("can't resolve $ref: no node at '{uri}#{pointer}'")]
    PointerNotFound { uri: Url, pointer: Pointer },
}

/// The target of a successfully resolved reference. The node itself is
/// retrieved through [`Catalog::node`], keeping ResolvedRef cheap to cache
/// and clone.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRef {
    pub uri: Url,
    pub pointer: Pointer,
}

/// Sentinel for a reference which closes a cycle. Traversal stops at it;
/// rules which care inspect the marker.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularRef {
    pub uri: Url,
    pub pointer: Pointer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedRef),
    Circular(CircularRef),
}

/// Catalog holds every Source fetched for a run, the per-URI failures of
/// the crawl, and a cache of resolved references. It is created fresh per
/// run and append-only thereafter.
#[derive(Debug)]
pub struct Catalog {
    sources: BTreeMap<Url, Arc<Source>>,
    failures: BTreeMap<Url, String>,
    cache: Mutex<BTreeMap<(Url, Pointer), Result<Resolution, ResolveError>>>,
}

impl Catalog {
    pub fn source(&self, uri: &Url) -> Option<&Arc<Source>> {
        self.sources.get(uri)
    }

    pub fn sources(&self) -> impl Iterator<Item = &Arc<Source>> {
        self.sources.values()
    }

    /// The crawl failure recorded for `uri`, if any.
    pub fn failure(&self, uri: &Url) -> Option<&str> {
        self.failures.get(uri).map(String::as_str)
    }

    pub fn node(&self, resolved: &ResolvedRef) -> Option<&ParseNode> {
        self.sources
            .get(&resolved.uri)
            .and_then(|source| source.node_at(&resolved.pointer))
    }

    /// Resolve `reference` (the string value of a `$ref`) against the source
    /// identified by `base`. Pointer segments which pass through nested
    /// `$ref`s are followed; a reference which closes a cycle yields the
    /// [`CircularRef`] sentinel. Results are cached by normalized target.
    pub fn resolve(&self, base: &Url, reference: &str) -> Result<Resolution, ResolveError> {
        let (uri, pointer) = split_reference(base, reference)?;

        let key = (uri.clone(), pointer.clone());
        if let Some(hit) = self.cache.lock().expect("cache lock").get(&key) {
            return hit.clone();
        }

        let mut visited = BTreeSet::new();
        let result = self.resolve_pointer(uri, pointer, &mut visited);

        self.cache
            .lock()
            .expect("cache lock")
            .insert(key, result.clone());
        result
    }

    fn resolve_pointer(
        &self,
        uri: Url,
        pointer: Pointer,
        visited: &mut BTreeSet<(Url, Pointer)>,
    ) -> Result<Resolution, ResolveError> {
        if !visited.insert((uri.clone(), pointer.clone())) {
            return Ok(Resolution::Circular(CircularRef { uri, pointer }));
        }

        let source = match self.sources.get(&uri) {
            Some(source) => source,
            None => {
                let detail = self
                    .failures
                    .get(&uri)
                    .cloned()
                    .unwrap_or_else(|| "resource was not fetched".to_string());
                return Err(ResolveError::Fetch { uri, detail });
            }
        };

        let mut node = &source.root;
        for (depth, token) in pointer.iter().enumerate() {
            // A segment which points through a nested reference re-bases the
            // remainder of the pointer onto the reference's target.
            if let Some(target) = node.ref_target() {
                let (next_uri, mut next_pointer) = split_reference(&uri, target)?;
                next_pointer.0.extend(pointer.0[depth..].iter().cloned());
                return self.resolve_pointer(next_uri, next_pointer, visited);
            }

            let next = match node {
                ParseNode::Mapping { entries, .. } => {
                    let name = token.as_property();
                    entries
                        .iter()
                        .find(|e| e.key == name.as_ref())
                        .map(|e| &e.value)
                }
                ParseNode::Sequence { items, .. } => match token {
                    Token::Index(ind) => items.get(*ind),
                    Token::Property(_) => None,
                },
                _ => None,
            };
            node = next.ok_or_else(|| ResolveError::PointerNotFound {
                uri: uri.clone(),
                pointer: pointer.clone(),
            })?;
        }

        Ok(Resolution::Resolved(ResolvedRef { uri, pointer }))
    }
}

/// Split a reference string into its absolute target URI and its pointer,
/// resolving relative URIs against `base` and percent-decoding the fragment.
fn split_reference(base: &Url, reference: &str) -> Result<(Url, Pointer), ResolveError> {
    let malformed = |detail: String| ResolveError::MalformedRef {
        reference: reference.to_string(),
        detail,
    };

    let (target, fragment) = match reference.split_once('#') {
        Some((target, fragment)) => (target, fragment),
        None => (reference, ""),
    };

    let mut uri = if target.is_empty() {
        base.clone()
    } else {
        base.join(target).map_err(|err| malformed(err.to_string()))?
    };
    uri.set_fragment(None);

    let fragment = percent_encoding::percent_decode_str(fragment)
        .decode_utf8()
        .map_err(|err| malformed(err.to_string()))?;

    Ok((uri, Pointer::parse(&fragment)))
}

/// Loader crawls the reference graph of a root document: it fetches and
/// parses the root, discovers `$ref` targets transitively, and fetches each
/// external resource exactly once, concurrently. Failures are recorded
/// per-URI; they surface later as unresolved-reference problems rather than
/// aborting the crawl.
pub struct Loader<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> Loader<F> {
    pub fn new(fetcher: F) -> Loader<F> {
        Loader { fetcher }
    }

    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    pub async fn load(&self, root: &Url) -> Catalog {
        let mut root = root.clone();
        root.set_fragment(None);

        let mut sources = BTreeMap::new();
        let mut failures = BTreeMap::new();
        let mut visited: BTreeSet<Url> = [root.clone()].into();

        let mut pending = FuturesUnordered::new();
        pending.push(self.fetch_one(root));

        while let Some((uri, outcome)) = pending.next().await {
            let text = match outcome {
                Ok(text) => text,
                Err(detail) => {
                    tracing::warn!(url = %uri, %detail, "failed to fetch resource");
                    failures.insert(uri, detail);
                    continue;
                }
            };
            let source = match Source::parse(uri.clone(), text) {
                Ok(source) => source,
                Err(err) => {
                    tracing::warn!(url = %uri, error = %err, "failed to parse resource");
                    failures.insert(uri, err.to_string());
                    continue;
                }
            };

            let mut targets = Vec::new();
            collect_ref_targets(&source.root, &source.uri, &mut targets);
            for target in targets {
                if visited.insert(target.clone()) {
                    pending.push(self.fetch_one(target));
                }
            }
            sources.insert(uri, Arc::new(source));
        }

        Catalog {
            sources,
            failures,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    async fn fetch_one(&self, uri: Url) -> (Url, Result<String, String>) {
        let outcome = self.fetcher.fetch(&uri).await.map_err(|e| e.to_string());
        (uri, outcome)
    }
}

/// Gather the absolute, fragment-less URIs of every external `$ref` target
/// reachable within `node`.
fn collect_ref_targets(node: &ParseNode, base: &Url, out: &mut Vec<Url>) {
    match node {
        ParseNode::Mapping { entries, .. } => {
            if let Some(reference) = node.ref_target() {
                if let Ok((uri, _)) = split_reference(base, reference) {
                    if uri != *base {
                        out.push(uri);
                    }
                }
            }
            for entry in entries {
                collect_ref_targets(&entry.value, base, out);
            }
        }
        ParseNode::Sequence { items, .. } => {
            for item in items {
                collect_ref_targets(item, base, out);
            }
        }
        ParseNode::Scalar { .. } => {}
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fetch::MapFetcher;

    async fn fixture_catalog() -> Catalog {
        let fetcher = MapFetcher::new()
            .add(
                "https://example/openapi.yaml",
                "\
openapi: 3.0.0
components:
  schemas:
    Pet:
      $ref: 'shared.yaml#/Pet'
    Indirect:
      $ref: '#/components/schemas/Pet'
    Loop:
      $ref: '#/components/schemas/Loop'
",
            )
            .add(
                "https://example/shared.yaml",
                "\
Pet:
  type: object
  properties:
    name:
      type: string
",
            );

        Loader::new(fetcher)
            .load(&Url::parse("https://example/openapi.yaml").unwrap())
            .await
    }

    #[tokio::test]
    async fn test_crawl_and_resolve() {
        let catalog = fixture_catalog().await;
        let base = Url::parse("https://example/openapi.yaml").unwrap();

        // Both documents were fetched.
        assert_eq!(catalog.sources().count(), 2);

        let resolved = match catalog.resolve(&base, "shared.yaml#/Pet").unwrap() {
            Resolution::Resolved(r) => r,
            other => panic!("expected resolution, got {other:?}"),
        };
        assert_eq!(resolved.uri.as_str(), "https://example/shared.yaml");
        assert_eq!(resolved.pointer.to_string(), "/Pet");
        assert_eq!(catalog.node(&resolved).unwrap().get("type").unwrap().as_str(), Some("object"));
    }

    #[tokio::test]
    async fn test_pointer_through_nested_ref() {
        let catalog = fixture_catalog().await;
        let base = Url::parse("https://example/openapi.yaml").unwrap();

        // /components/schemas/Pet/properties/name passes through two $refs.
        let resolved = match catalog
            .resolve(&base, "#/components/schemas/Pet/properties/name")
            .unwrap()
        {
            Resolution::Resolved(r) => r,
            other => panic!("expected resolution, got {other:?}"),
        };
        assert_eq!(resolved.uri.as_str(), "https://example/shared.yaml");
        assert_eq!(resolved.pointer.to_string(), "/Pet/properties/name");
    }

    #[tokio::test]
    async fn test_cycle_detection() {
        let catalog = fixture_catalog().await;
        let base = Url::parse("https://example/openapi.yaml").unwrap();

        let resolution = catalog
            .resolve(&base, "#/components/schemas/Loop/type")
            .unwrap();
        assert!(matches!(resolution, Resolution::Circular(_)));
    }

    #[tokio::test]
    async fn test_failures_are_recorded() {
        let fetcher = MapFetcher::new().add(
            "https://example/openapi.yaml",
            "components:\n  schemas:\n    Gone:\n      $ref: 'missing.yaml#/Nope'\n",
        );
        let catalog = Loader::new(fetcher)
            .load(&Url::parse("https://example/openapi.yaml").unwrap())
            .await;

        let base = Url::parse("https://example/openapi.yaml").unwrap();
        let err = catalog.resolve(&base, "missing.yaml#/Nope").unwrap_err();
        assert!(matches!(err, ResolveError::Fetch { .. }));

        let missing = Url::parse("https://example/missing.yaml").unwrap();
        assert!(catalog.failure(&missing).is_some());
    }

    #[tokio::test]
    async fn test_pointer_not_found() {
        let catalog = fixture_catalog().await;
        let base = Url::parse("https://example/openapi.yaml").unwrap();

        let err = catalog.resolve(&base, "#/components/absent").unwrap_err();
        assert_eq!(
            err,
            ResolveError::PointerNotFound {
                uri: base,
                pointer: Pointer::parse("/components/absent"),
            }
        );
    }
}
