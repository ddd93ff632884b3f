//! NodeType table for OAS 2.0 (swagger). Shapes shared with OAS 3.x
//! (info, tags, external docs) are borrowed from the 3.0 table.

use crate::types::{obj, scalar_enum, Additional, NodeType, ObjectType, Primitive, Property};
use crate::OasVersion;

pub(crate) fn node_type(name: &str) -> Option<&'static NodeType> {
    Some(match name {
        "Root" => &ROOT,
        "SwaggerVersion" => &SWAGGER_VERSION,
        "SecuritySchemeType" => &SECURITY_SCHEME_TYPE,
        "Paths" => &PATHS,
        "PathItem" => &PATH_ITEM,
        "Operation" => &OPERATION,
        "Parameter" => &PARAMETER,
        "ParameterList" => &PARAMETER_LIST,
        "ParameterLocation" => &PARAMETER_LOCATION,
        "ParameterType" => &PARAMETER_TYPE,
        "Items" => &ITEMS,
        "Responses" => &RESPONSES,
        "Response" => &RESPONSE,
        "Header" => &HEADER,
        "HeaderMap" => &HEADER_MAP,
        "Schema" => &SCHEMA,
        "SchemaList" => &SCHEMA_LIST,
        "SchemaMap" => &SCHEMA_MAP,
        "SchemaType" => &SCHEMA_TYPE,
        "SchemaOrBool" => &SCHEMA_OR_BOOL,
        "SecurityScheme" => &SECURITY_SCHEME,
        "NamedSecuritySchemes" => &NAMED_SECURITY_SCHEMES,
        "NamedSchemas" => &SCHEMA_MAP,
        "NamedParameters" => &NAMED_PARAMETERS,
        "NamedResponses" => &NAMED_RESPONSES,
        // Shared with 3.0.
        "Info" | "Contact" | "License" | "Tag" | "TagList" | "ExternalDocs"
        | "SecurityRequirement" | "SecurityRequirementList" | "Xml" => {
            return crate::oas3::node_type(OasVersion::Oas3_0, name)
        }
        _ => return None,
    })
}

static ROOT: NodeType = obj(&[
    Property::required("swagger", "SwaggerVersion"),
    Property::required("info", "Info"),
    Property::required("paths", "Paths"),
    Property::optional("host", "string"),
    Property::optional("basePath", "string"),
    Property::optional("schemes", "StringList"),
    Property::optional("consumes", "StringList"),
    Property::optional("produces", "StringList"),
    Property::optional("definitions", "NamedSchemas"),
    Property::optional("parameters", "NamedParameters"),
    Property::optional("responses", "NamedResponses"),
    Property::optional("securityDefinitions", "NamedSecuritySchemes"),
    Property::optional("security", "SecurityRequirementList"),
    Property::optional("tags", "TagList"),
    Property::optional("externalDocs", "ExternalDocs"),
]);

static PATHS: NodeType = NodeType::Object(ObjectType {
    properties: &[],
    extensions_allowed: true,
    pattern_properties: &[("^/", "PathItem")],
    additional: Additional::Closed,
    shape_rules: &[],
});

static PATH_ITEM: NodeType = obj(&[
    Property::optional("$ref", "string"),
    Property::optional("get", "Operation"),
    Property::optional("put", "Operation"),
    Property::optional("post", "Operation"),
    Property::optional("delete", "Operation"),
    Property::optional("options", "Operation"),
    Property::optional("head", "Operation"),
    Property::optional("patch", "Operation"),
    Property::optional("parameters", "ParameterList"),
]);

static OPERATION: NodeType = obj(&[
    Property::required("responses", "Responses"),
    Property::optional("tags", "StringList"),
    Property::optional("summary", "string"),
    Property::optional("description", "string"),
    Property::optional("externalDocs", "ExternalDocs"),
    Property::optional("operationId", "string"),
    Property::optional("consumes", "StringList"),
    Property::optional("produces", "StringList"),
    Property::optional("parameters", "ParameterList"),
    Property::optional("schemes", "StringList"),
    Property::optional("deprecated", "boolean"),
    Property::optional("security", "SecurityRequirementList"),
]);

static PARAMETER: NodeType = obj(&[
    Property::required("name", "string"),
    Property::required("in", "ParameterLocation"),
    Property::optional("description", "string"),
    Property::optional("required", "boolean"),
    Property::optional("schema", "Schema"),
    Property::optional("type", "ParameterType"),
    Property::optional("format", "string"),
    Property::optional("allowEmptyValue", "boolean"),
    Property::optional("items", "Items"),
    Property::optional("collectionFormat", "string"),
    Property::optional("default", "any"),
    Property::optional("maximum", "number"),
    Property::optional("exclusiveMaximum", "boolean"),
    Property::optional("minimum", "number"),
    Property::optional("exclusiveMinimum", "boolean"),
    Property::optional("maxLength", "integer"),
    Property::optional("minLength", "integer"),
    Property::optional("pattern", "string"),
    Property::optional("maxItems", "integer"),
    Property::optional("minItems", "integer"),
    Property::optional("uniqueItems", "boolean"),
    Property::optional("enum", "AnyList"),
    Property::optional("multipleOf", "number"),
]);
static PARAMETER_LIST: NodeType = NodeType::Array { item: "Parameter" };
static PARAMETER_LOCATION: NodeType = scalar_enum(
    Primitive::String,
    &["query", "header", "path", "formData", "body"],
);
static PARAMETER_TYPE: NodeType = scalar_enum(
    Primitive::String,
    &["string", "number", "integer", "boolean", "array", "file"],
);

static ITEMS: NodeType = obj(&[
    Property::optional("type", "ParameterType"),
    Property::optional("format", "string"),
    Property::optional("items", "Items"),
    Property::optional("collectionFormat", "string"),
    Property::optional("default", "any"),
    Property::optional("enum", "AnyList"),
]);

static RESPONSES: NodeType = NodeType::Object(ObjectType {
    properties: &[Property::optional("default", "Response")],
    extensions_allowed: true,
    pattern_properties: &[("^([0-9]{3})$", "Response")],
    additional: Additional::Closed,
    shape_rules: &[],
});

static RESPONSE: NodeType = obj(&[
    Property::required("description", "string"),
    Property::optional("schema", "Schema"),
    Property::optional("headers", "HeaderMap"),
    Property::optional("examples", "any"),
]);

static HEADER: NodeType = obj(&[
    Property::required("type", "ParameterType"),
    Property::optional("description", "string"),
    Property::optional("format", "string"),
    Property::optional("items", "Items"),
    Property::optional("collectionFormat", "string"),
    Property::optional("default", "any"),
]);
static HEADER_MAP: NodeType = NodeType::MapOf { value: "Header" };

static SCHEMA: NodeType = obj(&[
    Property::optional("title", "string"),
    Property::optional("description", "string"),
    Property::optional("type", "SchemaType"),
    Property::optional("format", "string"),
    Property::optional("default", "any"),
    Property::optional("enum", "AnyList"),
    Property::optional("multipleOf", "number"),
    Property::optional("maximum", "number"),
    Property::optional("exclusiveMaximum", "boolean"),
    Property::optional("minimum", "number"),
    Property::optional("exclusiveMinimum", "boolean"),
    Property::optional("maxLength", "integer"),
    Property::optional("minLength", "integer"),
    Property::optional("pattern", "string"),
    Property::optional("maxItems", "integer"),
    Property::optional("minItems", "integer"),
    Property::optional("uniqueItems", "boolean"),
    Property::optional("maxProperties", "integer"),
    Property::optional("minProperties", "integer"),
    Property::optional("required", "StringList"),
    Property::optional("allOf", "SchemaList"),
    Property::optional("not", "Schema"),
    Property::optional("items", "Schema"),
    Property::optional("properties", "SchemaMap"),
    Property::optional("additionalProperties", "SchemaOrBool"),
    Property::optional("discriminator", "string"),
    Property::optional("readOnly", "boolean"),
    Property::optional("xml", "Xml"),
    Property::optional("externalDocs", "ExternalDocs"),
    Property::optional("example", "any"),
]);
static SCHEMA_LIST: NodeType = NodeType::Array { item: "Schema" };
static SCHEMA_MAP: NodeType = NodeType::MapOf { value: "Schema" };
static SCHEMA_TYPE: NodeType = scalar_enum(
    Primitive::String,
    &["object", "array", "string", "number", "integer", "boolean", "file"],
);
static SCHEMA_OR_BOOL: NodeType = NodeType::Union(crate::types::UnionType {
    discriminator: None,
    variants: &["boolean", "Schema"],
});

static SECURITY_SCHEME: NodeType = obj(&[
    Property::required("type", "SecuritySchemeType"),
    Property::optional("description", "string"),
    Property::optional("name", "string"),
    Property::optional("in", "string"),
    Property::optional("flow", "string"),
    Property::optional("authorizationUrl", "string"),
    Property::optional("tokenUrl", "string"),
    Property::optional("scopes", "StringMap"),
]);
static NAMED_SECURITY_SCHEMES: NodeType = NodeType::MapOf {
    value: "SecurityScheme",
};

static NAMED_PARAMETERS: NodeType = NodeType::MapOf { value: "Parameter" };
static NAMED_RESPONSES: NodeType = NodeType::MapOf { value: "Response" };

static SWAGGER_VERSION: NodeType = scalar_enum(Primitive::String, &["2.0"]);
static SECURITY_SCHEME_TYPE: NodeType =
    scalar_enum(Primitive::String, &["basic", "apiKey", "oauth2"]);
