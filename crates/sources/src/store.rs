use crate::parse::{self, ParseError, ParseNode, ParseWarning};
use crate::ptr::{Pointer, Token};
use crate::span::{LineMap, Span};
use std::sync::OnceLock;
use url::Url;

/// Source is one fetched document: its URI, verbatim text, parsed tree, and
/// parse warnings. Sources are created on first fetch and retained for the
/// duration of a run so that problems can be rendered against their spans.
pub struct Source {
    pub uri: Url,
    pub text: String,
    pub root: ParseNode,
    pub warnings: Vec<ParseWarning>,
    line_map: OnceLock<LineMap>,
}

impl Source {
    /// Parse `text` into a new Source. A syntax failure is fatal for the
    /// document: no partial Source is produced.
    pub fn parse(uri: Url, text: String) -> Result<Source, ParseError> {
        let (root, warnings) = parse::parse(&text)?;
        Ok(Source {
            uri,
            text,
            root,
            warnings,
            line_map: OnceLock::new(),
        })
    }

    /// Map a byte offset to its 1-based (line, column). The line map is
    /// built on first use and cached.
    pub fn position_of(&self, offset: usize) -> (usize, usize) {
        self.line_map
            .get_or_init(|| LineMap::new(&self.text))
            .position(&self.text, offset)
    }

    /// The node at `pointer`, if it exists.
    pub fn node_at(&self, pointer: &Pointer) -> Option<&ParseNode> {
        pointer.query(&self.root)
    }

    /// The span of the node at `pointer`. When `on_key` is set and the
    /// pointed node is a mapping entry value, the span of its key is
    /// returned instead.
    pub fn span_at(&self, pointer: &Pointer, on_key: bool) -> Option<Span> {
        if on_key && !pointer.is_root() {
            let parent = Pointer(pointer.0[..pointer.0.len() - 1].to_vec());
            let last = pointer.0.last().expect("non-root pointer");
            if let Some(entry) = self
                .node_at(&parent)
                .and_then(|node| node.entry(&last.as_property()))
            {
                return Some(entry.key_span);
            }
        }
        self.node_at(pointer).map(ParseNode::span)
    }

    /// Derive the pointer of the innermost node whose span contains
    /// `offset`, by descent through the parse tree.
    pub fn pointer_of(&self, offset: usize) -> Pointer {
        let mut pointer = Pointer::root();
        let mut node = &self.root;

        'descend: loop {
            match node {
                ParseNode::Mapping { entries, .. } => {
                    for entry in entries {
                        if entry.key_span.contains(offset) || entry.value.span().contains(offset) {
                            pointer.push(Token::Property(entry.key.clone()));
                            node = &entry.value;
                            continue 'descend;
                        }
                    }
                }
                ParseNode::Sequence { items, .. } => {
                    for (index, item) in items.iter().enumerate() {
                        if item.span().contains(offset) {
                            pointer.push(Token::Index(index));
                            node = item;
                            continue 'descend;
                        }
                    }
                }
                ParseNode::Scalar { .. } => {}
            }
            return pointer;
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("uri", &self.uri.as_str())
            .field("bytes", &self.text.len())
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture() -> Source {
        let text = "\
openapi: 3.0.0
paths:
  /test:
    get:
      summary: A test
";
        Source::parse(
            Url::parse("https://example/openapi.yaml").unwrap(),
            text.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_pointer_of_round_trips() {
        let source = fixture();

        for ptr in ["/openapi", "/paths/~1test/get/summary", "/paths/~1test"] {
            let pointer = Pointer::parse(ptr);
            let key_span = source.span_at(&pointer, true).unwrap();
            assert_eq!(source.pointer_of(key_span.begin).to_string(), *ptr);
        }
    }

    #[test]
    fn test_span_at_key() {
        let source = fixture();
        let pointer = Pointer::parse("/paths/~1test");

        let key_span = source.span_at(&pointer, true).unwrap();
        assert_eq!(&source.text[key_span.begin..key_span.end], "/test");

        let value_span = source.span_at(&pointer, false).unwrap();
        assert!(value_span.begin > key_span.begin);
    }

    #[test]
    fn test_positions() {
        let source = fixture();
        let span = source
            .span_at(&Pointer::parse("/paths/~1test/get"), true)
            .unwrap();
        assert_eq!(source.position_of(span.begin), (4, 5));
    }
}
