mod json;
mod yaml;

use crate::span::Span;

/// Scalar leaf values of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Number preserves the integer / float distinction of the source text.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// One `key: value` entry of a Mapping, with the span of its key token.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub key_span: Span,
    pub value: ParseNode,
}

/// ParseNode is the uniform span-tagged tree produced by both the YAML and
/// JSON parsers. Mapping entries preserve source order. Duplicate keys are
/// reported as warnings and only the first binding is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    Scalar { value: Scalar, span: Span },
    Sequence { items: Vec<ParseNode>, span: Span },
    Mapping { entries: Vec<MapEntry>, span: Span },
}

impl ParseNode {
    pub fn span(&self) -> Span {
        match self {
            ParseNode::Scalar { span, .. }
            | ParseNode::Sequence { span, .. }
            | ParseNode::Mapping { span, .. } => *span,
        }
    }

    /// Short kind name used in problem messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseNode::Scalar {
                value: Scalar::Null, ..
            } => "null",
            ParseNode::Scalar {
                value: Scalar::Bool(_),
                ..
            } => "boolean",
            ParseNode::Scalar {
                value: Scalar::Number(_),
                ..
            } => "number",
            ParseNode::Scalar {
                value: Scalar::String(_),
                ..
            } => "string",
            ParseNode::Sequence { .. } => "array",
            ParseNode::Mapping { .. } => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParseNode::Scalar {
                value: Scalar::String(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    pub fn entries(&self) -> &[MapEntry] {
        match self {
            ParseNode::Mapping { entries, .. } => entries,
            _ => &[],
        }
    }

    pub fn entry(&self, key: &str) -> Option<&MapEntry> {
        self.entries().iter().find(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&ParseNode> {
        self.entry(key).map(|e| &e.value)
    }

    /// The `$ref` target string, if this node is a reference object.
    pub fn ref_target(&self) -> Option<&str> {
        self.get("$ref").and_then(ParseNode::as_str)
    }

    /// Convert to a serde_json::Value, dropping spans. Mapping order is
    /// preserved only as far as serde_json's map implementation allows.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            ParseNode::Scalar { value, .. } => match value {
                Scalar::Null => serde_json::Value::Null,
                Scalar::Bool(b) => serde_json::Value::Bool(*b),
                Scalar::Number(Number::Unsigned(n)) => (*n).into(),
                Scalar::Number(Number::Signed(n)) => (*n).into(),
                Scalar::Number(Number::Float(n)) => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                Scalar::String(s) => serde_json::Value::String(s.clone()),
            },
            ParseNode::Sequence { items, .. } => {
                serde_json::Value::Array(items.iter().map(ParseNode::to_value).collect())
            }
            ParseNode::Mapping { entries, .. } => {
                let mut map = serde_json::Map::new();
                for entry in entries {
                    map.insert(entry.key.clone(), entry.value.to_value());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Conditions which are reported but do not abort the parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    DuplicateKey { key: String, span: Span },
    NonStringKey { span: Span },
    TabIndent { span: Span },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::DuplicateKey { key, .. } => {
                write!(f, "duplicate key `{key}`, the first binding is used")
            }
            ParseWarning::NonStringKey { .. } => write!(f, "mapping key is not a string"),
            ParseWarning::TabIndent { .. } => write!(f, "tab character used for indentation"),
        }
    }
}

impl ParseWarning {
    pub fn span(&self) -> Span {
        match self {
            ParseWarning::DuplicateKey { span, .. }
            | ParseWarning::NonStringKey { span }
            | ParseWarning::TabIndent { span } => *span,
        }
    }
}

/// Unrecoverable syntax failure. No partial tree accompanies it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn at(message: impl Into<String>, span: Span) -> ParseError {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// Parse `text` as YAML or JSON, sniffed by its leading non-whitespace
/// character. YAML is a superset of JSON, but the dedicated JSON parser
/// produces tighter spans and JSON-specific syntax errors.
pub fn parse(text: &str) -> Result<(ParseNode, Vec<ParseWarning>), ParseError> {
    match text.trim_start().bytes().next() {
        Some(b'{') | Some(b'[') => json::parse(text),
        _ => yaml::parse(text),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sniffing() {
        let (node, _) = parse("{\"a\": 1}").unwrap();
        assert_eq!(node.kind(), "object");

        let (node, _) = parse("a: 1").unwrap();
        assert_eq!(node.kind(), "object");

        let (node, _) = parse("  \n [1, 2]").unwrap();
        assert_eq!(node.kind(), "array");
    }

    #[test]
    fn test_to_value() {
        let (node, _) = parse("a: [1, -2, 3.5, x]\nb:\nc: true").unwrap();
        assert_eq!(
            node.to_value(),
            serde_json::json!({"a": [1, -2, 3.5, "x"], "b": null, "c": true}),
        );
    }
}
