//! The typed shape vocabulary of the registries: every position in a walked
//! document is described by a NodeType, resolved lazily by name so that
//! recursive shapes (Schema within Schema) need no indirection.

use sources::{ParseNode, Scalar};

/// Expected shape of a value at one position of the document.
#[derive(Debug)]
pub enum NodeType {
    Object(ObjectType),
    /// Free-form mapping whose values share one type.
    MapOf { value: &'static str },
    Array { item: &'static str },
    Scalar(ScalarType),
    Union(UnionType),
    /// Anything goes: extension values and untyped examples.
    Any,
}

#[derive(Debug)]
pub struct ObjectType {
    pub properties: &'static [Property],
    /// Whether `x-*` fields are allowed (typed Any unless registered).
    pub extensions_allowed: bool,
    /// Pattern-keyed properties, e.g. path templates under `paths`.
    pub pattern_properties: &'static [(&'static str, &'static str)],
    pub additional: Additional,
    pub shape_rules: &'static [ShapeRule],
}

#[derive(Debug)]
pub struct Property {
    pub name: &'static str,
    pub type_name: &'static str,
    pub required: bool,
}

impl Property {
    pub const fn required(name: &'static str, type_name: &'static str) -> Property {
        Property {
            name,
            type_name,
            required: true,
        }
    }
    pub const fn optional(name: &'static str, type_name: &'static str) -> Property {
        Property {
            name,
            type_name,
            required: false,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub enum Additional {
    /// Unknown fields are unexpected and reported.
    Closed,
    /// Unknown fields are allowed, typed as named.
    Typed(&'static str),
}

/// Named presence constraints checked by the `spec` rule beyond what the
/// property table can express.
#[derive(Debug)]
pub enum ShapeRule {
    /// At least one of `fields` must be present.
    RequireAny { fields: &'static [&'static str] },
    /// OAS 3.0 `nullable` demands a sibling `type` in the direct fields.
    NullableRequiresType,
}

#[derive(Debug)]
pub struct ScalarType {
    pub primitive: Primitive,
    pub enum_values: Option<&'static [&'static str]>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Integer,
    Boolean,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Integer => "integer",
            Primitive::Boolean => "boolean",
        }
    }

    pub fn matches(&self, node: &ParseNode) -> bool {
        match self {
            Primitive::String => matches!(
                node,
                ParseNode::Scalar {
                    value: Scalar::String(_),
                    ..
                }
            ),
            Primitive::Boolean => matches!(
                node,
                ParseNode::Scalar {
                    value: Scalar::Bool(_),
                    ..
                }
            ),
            Primitive::Number => matches!(
                node,
                ParseNode::Scalar {
                    value: Scalar::Number(_),
                    ..
                }
            ),
            Primitive::Integer => matches!(
                node,
                ParseNode::Scalar {
                    value: Scalar::Number(
                        sources::Number::Unsigned(_) | sources::Number::Signed(_)
                    ),
                    ..
                }
            ),
        }
    }
}

/// A position which admits several shapes, picked by discriminator field
/// when declared, else by structural match in declaration order.
#[derive(Debug)]
pub struct UnionType {
    pub discriminator: Option<Discriminated>,
    pub variants: &'static [&'static str],
}

#[derive(Debug)]
pub struct Discriminated {
    pub field: &'static str,
    pub mapping: &'static [(&'static str, &'static str)],
}

// Shorthand used throughout the registry tables.
pub(crate) const fn obj(properties: &'static [Property]) -> NodeType {
    NodeType::Object(ObjectType {
        properties,
        extensions_allowed: true,
        pattern_properties: &[],
        additional: Additional::Closed,
        shape_rules: &[],
    })
}

pub(crate) const fn scalar(primitive: Primitive) -> NodeType {
    NodeType::Scalar(ScalarType {
        primitive,
        enum_values: None,
    })
}

pub(crate) const fn scalar_enum(
    primitive: Primitive,
    enum_values: &'static [&'static str],
) -> NodeType {
    NodeType::Scalar(ScalarType {
        primitive,
        enum_values: Some(enum_values),
    })
}
