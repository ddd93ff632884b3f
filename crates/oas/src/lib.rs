mod oas2;
mod oas3;
pub mod types;

pub use types::{
    Additional, Discriminated, NodeType, ObjectType, Primitive, Property, ScalarType, ShapeRule,
    UnionType,
};

use lazy_static::lazy_static;
use sources::ParseNode;
use std::collections::BTreeMap;
use std::sync::Mutex;
use types::{scalar, Primitive as P};

/// The OAS revision of a document, derived once from its root
/// `openapi` / `swagger` field and fixed for the whole walk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum OasVersion {
    #[serde(rename = "oas2")]
    Oas2,
    #[serde(rename = "oas3_0")]
    Oas3_0,
    #[serde(rename = "oas3_1")]
    Oas3_1,
}

impl std::fmt::Display for OasVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OasVersion::Oas2 => write!(f, "2.0"),
            OasVersion::Oas3_0 => write!(f, "3.0"),
            OasVersion::Oas3_1 => write!(f, "3.1"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VersionError {
    #[error("unsupported OpenAPI version '{0}'")]
    Unsupported(String),
    #[error("the document is not an OpenAPI description: it has no `openapi` or `swagger` field")]
    Missing,
}

/// Inspect the root of a parsed document and derive its version tag.
pub fn detect_version(root: &ParseNode) -> Result<OasVersion, VersionError> {
    if let Some(swagger) = root.get("swagger") {
        return match swagger.as_str() {
            Some("2.0") => Ok(OasVersion::Oas2),
            other => Err(VersionError::Unsupported(
                other.unwrap_or("<not a string>").to_string(),
            )),
        };
    }
    if let Some(openapi) = root.get("openapi").and_then(ParseNode::as_str) {
        if openapi.starts_with("3.0") {
            return Ok(OasVersion::Oas3_0);
        }
        if openapi.starts_with("3.1") {
            return Ok(OasVersion::Oas3_1);
        }
        return Err(VersionError::Unsupported(openapi.to_string()));
    }
    Err(VersionError::Missing)
}

/// Registry resolves NodeTypes by name for one OAS version. Lookups are by
/// name rather than by reference so that recursive shapes simply name
/// themselves.
#[derive(Debug, Copy, Clone)]
pub struct Registry {
    pub version: OasVersion,
}

impl Registry {
    pub fn new(version: OasVersion) -> Registry {
        Registry { version }
    }

    /// The name of the root NodeType every walk starts from.
    pub const ROOT: &'static str = "Root";

    pub fn node_type(&self, name: &str) -> Option<&'static NodeType> {
        if let Some(builtin) = builtin_type(name) {
            return Some(builtin);
        }
        match self.version {
            OasVersion::Oas2 => oas2::node_type(name),
            OasVersion::Oas3_0 | OasVersion::Oas3_1 => oas3::node_type(self.version, name),
        }
    }

    /// Shallow test of whether `node` could be of the named type, used for
    /// union dispatch. Unions recurse into their variants.
    pub fn shape_matches(&self, name: &str, node: &ParseNode) -> bool {
        match self.node_type(name) {
            Some(NodeType::Object(_)) | Some(NodeType::MapOf { .. }) => {
                matches!(node, ParseNode::Mapping { .. })
            }
            Some(NodeType::Array { .. }) => matches!(node, ParseNode::Sequence { .. }),
            Some(NodeType::Scalar(scalar)) => scalar.primitive.matches(node),
            Some(NodeType::Union(union)) => union
                .variants
                .iter()
                .any(|variant| self.shape_matches(variant, node)),
            Some(NodeType::Any) => true,
            None => false,
        }
    }
}

fn builtin_type(name: &str) -> Option<&'static NodeType> {
    static STRING: NodeType = scalar(P::String);
    static NUMBER: NodeType = scalar(P::Number);
    static INTEGER: NodeType = scalar(P::Integer);
    static BOOLEAN: NodeType = scalar(P::Boolean);
    static ANY: NodeType = NodeType::Any;
    static STRING_LIST: NodeType = NodeType::Array { item: "string" };
    static ANY_LIST: NodeType = NodeType::Array { item: "any" };
    static STRING_MAP: NodeType = NodeType::MapOf { value: "string" };
    static ANY_MAP: NodeType = NodeType::MapOf { value: "any" };

    Some(match name {
        "string" => &STRING,
        "number" => &NUMBER,
        "integer" => &INTEGER,
        "boolean" => &BOOLEAN,
        "any" => &ANY,
        "StringList" => &STRING_LIST,
        "AnyList" => &ANY_LIST,
        "StringMap" => &STRING_MAP,
        "AnyMap" => &ANY_MAP,
        _ => return None,
    })
}

lazy_static! {
    static ref PATTERN_CACHE: Mutex<BTreeMap<&'static str, regex::Regex>> =
        Mutex::new(BTreeMap::new());
}

/// Whether `key` matches the registry pattern `pattern`. Compiled patterns
/// are process-wide: the pattern set is static, so the cache never grows
/// beyond it.
pub fn pattern_matches(pattern: &'static str, key: &str) -> bool {
    let mut cache = PATTERN_CACHE.lock().expect("pattern cache lock");
    let regex = cache
        .entry(pattern)
        .or_insert_with(|| regex::Regex::new(pattern).expect("registry patterns are well-formed"));
    regex.is_match(key)
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(text: &str) -> ParseNode {
        sources::parse::parse(text).unwrap().0
    }

    #[test]
    fn test_version_detection() {
        assert_eq!(
            detect_version(&parse("swagger: '2.0'\n")),
            Ok(OasVersion::Oas2)
        );
        assert_eq!(
            detect_version(&parse("openapi: 3.0.3\n")),
            Ok(OasVersion::Oas3_0)
        );
        assert_eq!(
            detect_version(&parse("openapi: 3.1.0\n")),
            Ok(OasVersion::Oas3_1)
        );
        assert_eq!(
            detect_version(&parse("openapi: 4.0.0\n")),
            Err(VersionError::Unsupported("4.0.0".to_string()))
        );
        assert_eq!(detect_version(&parse("title: nope\n")), Err(VersionError::Missing));
    }

    #[test]
    fn test_version_specific_shapes() {
        let v30 = Registry::new(OasVersion::Oas3_0);
        let v31 = Registry::new(OasVersion::Oas3_1);

        // 3.1 roots may declare webhooks; 3.0 roots may not.
        let has_webhooks = |registry: &Registry| match registry.node_type("Root") {
            Some(NodeType::Object(object)) => {
                object.properties.iter().any(|p| p.name == "webhooks")
            }
            _ => false,
        };
        assert!(!has_webhooks(&v30));
        assert!(has_webhooks(&v31));

        // 3.0 `type` is a bare enum; 3.1 admits a list of names.
        assert!(matches!(
            v30.node_type("SchemaType"),
            Some(NodeType::Scalar(_))
        ));
        assert!(matches!(
            v31.node_type("SchemaType"),
            Some(NodeType::Union(_))
        ));
    }

    #[test]
    fn test_recursion_via_names() {
        let registry = Registry::new(OasVersion::Oas3_0);
        let schema = registry.node_type("Schema").unwrap();

        let NodeType::Object(object) = schema else {
            panic!("Schema is an object type");
        };
        let all_of = object
            .properties
            .iter()
            .find(|p| p.name == "allOf")
            .unwrap();
        assert_eq!(all_of.type_name, "SchemaList");
        assert!(matches!(
            registry.node_type("SchemaList"),
            Some(NodeType::Array { item: "Schema" })
        ));
    }

    #[test]
    fn test_shape_matching() {
        let registry = Registry::new(OasVersion::Oas3_1);

        let string = parse("value: object\n");
        let list = parse("value: [object, 'null']\n");
        assert!(registry.shape_matches("SchemaType", string.get("value").unwrap()));
        assert!(registry.shape_matches("SchemaType", list.get("value").unwrap()));
        let mapping = parse("value: {}\n");
        assert!(!registry.shape_matches("SchemaType", mapping.get("value").unwrap()));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(pattern_matches("^/", "/pets/{id}"));
        assert!(!pattern_matches("^/", "pets"));
        assert!(pattern_matches("^([0-9]{3}|[1-5]XX)$", "200"));
        assert!(pattern_matches("^([0-9]{3}|[1-5]XX)$", "4XX"));
        assert!(!pattern_matches("^([0-9]{3}|[1-5]XX)$", "20"));
    }
}
