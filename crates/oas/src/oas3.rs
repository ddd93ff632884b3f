//! NodeType tables shared by OAS 3.0 and 3.1, with statics split per
//! version where the two revisions disagree.

use crate::types::{
    obj, scalar_enum, Additional, NodeType, ObjectType, Primitive, Property, ShapeRule, UnionType,
};
use crate::OasVersion;

pub(crate) fn node_type(version: OasVersion, name: &str) -> Option<&'static NodeType> {
    let v31 = version == OasVersion::Oas3_1;

    Some(match name {
        "Root" => {
            if v31 {
                &ROOT_3_1
            } else {
                &ROOT_3_0
            }
        }
        "Info" => {
            if v31 {
                &INFO_3_1
            } else {
                &INFO_3_0
            }
        }
        "License" => {
            if v31 {
                &LICENSE_3_1
            } else {
                &LICENSE_3_0
            }
        }
        "Schema" => {
            if v31 {
                &SCHEMA_3_1
            } else {
                &SCHEMA_3_0
            }
        }
        "SchemaType" => {
            if v31 {
                &SCHEMA_TYPE_3_1
            } else {
                &SCHEMA_TYPE_3_0
            }
        }
        "SecurityScheme" => &SECURITY_SCHEME,
        "SecuritySchemeType" => {
            if v31 {
                &SECURITY_SCHEME_TYPE_3_1
            } else {
                &SECURITY_SCHEME_TYPE_3_0
            }
        }
        "ParameterLocation" => &PARAMETER_LOCATION,
        "SchemaTypeName" => &SCHEMA_TYPE_NAME,
        "SchemaTypeNameList" => &SCHEMA_TYPE_NAME_LIST,
        "Components" => {
            if v31 {
                &COMPONENTS_3_1
            } else {
                &COMPONENTS_3_0
            }
        }
        "Contact" => &CONTACT,
        "Server" => &SERVER,
        "ServerList" => &SERVER_LIST,
        "ServerVariable" => &SERVER_VARIABLE,
        "ServerVariableMap" => &SERVER_VARIABLE_MAP,
        "Paths" => &PATHS,
        "PathItem" => &PATH_ITEM,
        "Webhooks" => &WEBHOOKS,
        "Operation" => &OPERATION,
        "Parameter" => &PARAMETER,
        "ParameterList" => &PARAMETER_LIST,
        "RequestBody" => &REQUEST_BODY,
        "MediaType" => &MEDIA_TYPE,
        "MediaTypeMap" => &MEDIA_TYPE_MAP,
        "Responses" => &RESPONSES,
        "Response" => &RESPONSE,
        "Header" => &HEADER,
        "HeaderMap" => &HEADER_MAP,
        "Example" => &EXAMPLE,
        "ExampleMap" => &EXAMPLE_MAP,
        "Encoding" => &ENCODING,
        "EncodingMap" => &ENCODING_MAP,
        "Link" => &LINK,
        "LinkMap" => &LINK_MAP,
        "Callback" => &CALLBACK,
        "CallbackMap" => &CALLBACK_MAP,
        "Tag" => &TAG,
        "TagList" => &TAG_LIST,
        "ExternalDocs" => &EXTERNAL_DOCS,
        "SecurityRequirement" => &SECURITY_REQUIREMENT,
        "SecurityRequirementList" => &SECURITY_REQUIREMENT_LIST,
        "OAuthFlows" => &OAUTH_FLOWS,
        "OAuthFlow" => &OAUTH_FLOW,
        "Discriminator" => &DISCRIMINATOR,
        "Xml" => &XML,
        "SchemaList" => &SCHEMA_LIST,
        "SchemaMap" => &SCHEMA_MAP,
        "SchemaOrBool" => &SCHEMA_OR_BOOL,
        "NamedSchemas" => &SCHEMA_MAP,
        "NamedResponses" => &NAMED_RESPONSES,
        "NamedParameters" => &NAMED_PARAMETERS,
        "NamedExamples" => &EXAMPLE_MAP,
        "NamedRequestBodies" => &NAMED_REQUEST_BODIES,
        "NamedHeaders" => &HEADER_MAP,
        "NamedSecuritySchemes" => &NAMED_SECURITY_SCHEMES,
        "NamedLinks" => &LINK_MAP,
        "NamedCallbacks" => &CALLBACK_MAP,
        "NamedPathItems" => &WEBHOOKS,
        _ => return None,
    })
}

static ROOT_3_0: NodeType = NodeType::Object(ObjectType {
    properties: &[
        Property::required("openapi", "string"),
        Property::required("info", "Info"),
        Property::required("paths", "Paths"),
        Property::optional("servers", "ServerList"),
        Property::optional("components", "Components"),
        Property::optional("security", "SecurityRequirementList"),
        Property::optional("tags", "TagList"),
        Property::optional("externalDocs", "ExternalDocs"),
    ],
    extensions_allowed: true,
    pattern_properties: &[],
    additional: Additional::Closed,
    shape_rules: &[],
});

static ROOT_3_1: NodeType = NodeType::Object(ObjectType {
    properties: &[
        Property::required("openapi", "string"),
        Property::required("info", "Info"),
        Property::optional("jsonSchemaDialect", "string"),
        Property::optional("paths", "Paths"),
        Property::optional("webhooks", "Webhooks"),
        Property::optional("servers", "ServerList"),
        Property::optional("components", "Components"),
        Property::optional("security", "SecurityRequirementList"),
        Property::optional("tags", "TagList"),
        Property::optional("externalDocs", "ExternalDocs"),
    ],
    extensions_allowed: true,
    pattern_properties: &[],
    additional: Additional::Closed,
    shape_rules: &[ShapeRule::RequireAny {
        fields: &["paths", "components", "webhooks"],
    }],
});

static INFO_3_0: NodeType = obj(&[
    Property::required("title", "string"),
    Property::required("version", "string"),
    Property::optional("description", "string"),
    Property::optional("termsOfService", "string"),
    Property::optional("contact", "Contact"),
    Property::optional("license", "License"),
]);

static INFO_3_1: NodeType = obj(&[
    Property::required("title", "string"),
    Property::required("version", "string"),
    Property::optional("summary", "string"),
    Property::optional("description", "string"),
    Property::optional("termsOfService", "string"),
    Property::optional("contact", "Contact"),
    Property::optional("license", "License"),
]);

static CONTACT: NodeType = obj(&[
    Property::optional("name", "string"),
    Property::optional("url", "string"),
    Property::optional("email", "string"),
]);

static LICENSE_3_0: NodeType = obj(&[
    Property::required("name", "string"),
    Property::optional("url", "string"),
]);

static LICENSE_3_1: NodeType = obj(&[
    Property::required("name", "string"),
    Property::optional("identifier", "string"),
    Property::optional("url", "string"),
]);

static SERVER: NodeType = obj(&[
    Property::required("url", "string"),
    Property::optional("description", "string"),
    Property::optional("variables", "ServerVariableMap"),
]);
static SERVER_LIST: NodeType = NodeType::Array { item: "Server" };
static SERVER_VARIABLE_MAP: NodeType = NodeType::MapOf {
    value: "ServerVariable",
};

static SERVER_VARIABLE: NodeType = obj(&[
    Property::required("default", "string"),
    Property::optional("enum", "StringList"),
    Property::optional("description", "string"),
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
    Property::optional("summary", "string"),
    Property::optional("description", "string"),
    Property::optional("get", "Operation"),
    Property::optional("put", "Operation"),
    Property::optional("post", "Operation"),
    Property::optional("delete", "Operation"),
    Property::optional("options", "Operation"),
    Property::optional("head", "Operation"),
    Property::optional("patch", "Operation"),
    Property::optional("trace", "Operation"),
    Property::optional("servers", "ServerList"),
    Property::optional("parameters", "ParameterList"),
]);

static WEBHOOKS: NodeType = NodeType::MapOf { value: "PathItem" };

static OPERATION: NodeType = obj(&[
    Property::required("responses", "Responses"),
    Property::optional("tags", "StringList"),
    Property::optional("summary", "string"),
    Property::optional("description", "string"),
    Property::optional("externalDocs", "ExternalDocs"),
    Property::optional("operationId", "string"),
    Property::optional("parameters", "ParameterList"),
    Property::optional("requestBody", "RequestBody"),
    Property::optional("callbacks", "CallbackMap"),
    Property::optional("deprecated", "boolean"),
    Property::optional("security", "SecurityRequirementList"),
    Property::optional("servers", "ServerList"),
]);

static PARAMETER: NodeType = NodeType::Object(ObjectType {
    properties: &[
        Property::required("name", "string"),
        Property::required("in", "ParameterLocation"),
        Property::optional("description", "string"),
        Property::optional("required", "boolean"),
        Property::optional("deprecated", "boolean"),
        Property::optional("allowEmptyValue", "boolean"),
        Property::optional("style", "string"),
        Property::optional("explode", "boolean"),
        Property::optional("allowReserved", "boolean"),
        Property::optional("schema", "Schema"),
        Property::optional("example", "any"),
        Property::optional("examples", "ExampleMap"),
        Property::optional("content", "MediaTypeMap"),
    ],
    extensions_allowed: true,
    pattern_properties: &[],
    additional: Additional::Closed,
    shape_rules: &[ShapeRule::RequireAny {
        fields: &["schema", "content"],
    }],
});
static PARAMETER_LIST: NodeType = NodeType::Array { item: "Parameter" };

static REQUEST_BODY: NodeType = obj(&[
    Property::required("content", "MediaTypeMap"),
    Property::optional("description", "string"),
    Property::optional("required", "boolean"),
]);

static MEDIA_TYPE: NodeType = obj(&[
    Property::optional("schema", "Schema"),
    Property::optional("example", "any"),
    Property::optional("examples", "ExampleMap"),
    Property::optional("encoding", "EncodingMap"),
]);
static MEDIA_TYPE_MAP: NodeType = NodeType::MapOf { value: "MediaType" };

static RESPONSES: NodeType = NodeType::Object(ObjectType {
    properties: &[Property::optional("default", "Response")],
    extensions_allowed: true,
    pattern_properties: &[("^([0-9]{3}|[1-5]XX)$", "Response")],
    additional: Additional::Closed,
    shape_rules: &[],
});

static RESPONSE: NodeType = obj(&[
    Property::required("description", "string"),
    Property::optional("headers", "HeaderMap"),
    Property::optional("content", "MediaTypeMap"),
    Property::optional("links", "LinkMap"),
]);

static HEADER: NodeType = obj(&[
    Property::optional("description", "string"),
    Property::optional("required", "boolean"),
    Property::optional("deprecated", "boolean"),
    Property::optional("allowEmptyValue", "boolean"),
    Property::optional("style", "string"),
    Property::optional("explode", "boolean"),
    Property::optional("allowReserved", "boolean"),
    Property::optional("schema", "Schema"),
    Property::optional("example", "any"),
    Property::optional("examples", "ExampleMap"),
    Property::optional("content", "MediaTypeMap"),
]);
static HEADER_MAP: NodeType = NodeType::MapOf { value: "Header" };

static EXAMPLE: NodeType = obj(&[
    Property::optional("summary", "string"),
    Property::optional("description", "string"),
    Property::optional("value", "any"),
    Property::optional("externalValue", "string"),
]);
static EXAMPLE_MAP: NodeType = NodeType::MapOf { value: "Example" };

static ENCODING: NodeType = obj(&[
    Property::optional("contentType", "string"),
    Property::optional("headers", "HeaderMap"),
    Property::optional("style", "string"),
    Property::optional("explode", "boolean"),
    Property::optional("allowReserved", "boolean"),
]);
static ENCODING_MAP: NodeType = NodeType::MapOf { value: "Encoding" };

static LINK: NodeType = obj(&[
    Property::optional("operationRef", "string"),
    Property::optional("operationId", "string"),
    Property::optional("parameters", "AnyMap"),
    Property::optional("requestBody", "any"),
    Property::optional("description", "string"),
    Property::optional("server", "Server"),
]);
static LINK_MAP: NodeType = NodeType::MapOf { value: "Link" };

static CALLBACK: NodeType = NodeType::MapOf { value: "PathItem" };
static CALLBACK_MAP: NodeType = NodeType::MapOf { value: "Callback" };

static TAG: NodeType = obj(&[
    Property::required("name", "string"),
    Property::optional("description", "string"),
    Property::optional("externalDocs", "ExternalDocs"),
]);
static TAG_LIST: NodeType = NodeType::Array { item: "Tag" };

static EXTERNAL_DOCS: NodeType = obj(&[
    Property::required("url", "string"),
    Property::optional("description", "string"),
]);

static SECURITY_REQUIREMENT: NodeType = NodeType::MapOf {
    value: "StringList",
};
static SECURITY_REQUIREMENT_LIST: NodeType = NodeType::Array {
    item: "SecurityRequirement",
};

static SECURITY_SCHEME: NodeType = obj(&[
    Property::required("type", "SecuritySchemeType"),
    Property::optional("description", "string"),
    Property::optional("name", "string"),
    Property::optional("in", "string"),
    Property::optional("scheme", "string"),
    Property::optional("bearerFormat", "string"),
    Property::optional("flows", "OAuthFlows"),
    Property::optional("openIdConnectUrl", "string"),
]);
static SECURITY_SCHEME_TYPE_3_0: NodeType = scalar_enum(
    Primitive::String,
    &["apiKey", "http", "oauth2", "openIdConnect"],
);
static SECURITY_SCHEME_TYPE_3_1: NodeType = scalar_enum(
    Primitive::String,
    &["apiKey", "http", "oauth2", "openIdConnect", "mutualTLS"],
);
static PARAMETER_LOCATION: NodeType =
    scalar_enum(Primitive::String, &["query", "header", "path", "cookie"]);
static NAMED_SECURITY_SCHEMES: NodeType = NodeType::MapOf {
    value: "SecurityScheme",
};

static OAUTH_FLOWS: NodeType = obj(&[
    Property::optional("implicit", "OAuthFlow"),
    Property::optional("password", "OAuthFlow"),
    Property::optional("clientCredentials", "OAuthFlow"),
    Property::optional("authorizationCode", "OAuthFlow"),
]);

static OAUTH_FLOW: NodeType = obj(&[
    Property::optional("authorizationUrl", "string"),
    Property::optional("tokenUrl", "string"),
    Property::optional("refreshUrl", "string"),
    Property::required("scopes", "StringMap"),
]);

static COMPONENTS_3_0: NodeType = obj(&[
    Property::optional("schemas", "NamedSchemas"),
    Property::optional("responses", "NamedResponses"),
    Property::optional("parameters", "NamedParameters"),
    Property::optional("examples", "NamedExamples"),
    Property::optional("requestBodies", "NamedRequestBodies"),
    Property::optional("headers", "NamedHeaders"),
    Property::optional("securitySchemes", "NamedSecuritySchemes"),
    Property::optional("links", "NamedLinks"),
    Property::optional("callbacks", "NamedCallbacks"),
]);
static COMPONENTS_3_1: NodeType = obj(&[
    Property::optional("schemas", "NamedSchemas"),
    Property::optional("responses", "NamedResponses"),
    Property::optional("parameters", "NamedParameters"),
    Property::optional("examples", "NamedExamples"),
    Property::optional("requestBodies", "NamedRequestBodies"),
    Property::optional("headers", "NamedHeaders"),
    Property::optional("securitySchemes", "NamedSecuritySchemes"),
    Property::optional("links", "NamedLinks"),
    Property::optional("callbacks", "NamedCallbacks"),
    Property::optional("pathItems", "NamedPathItems"),
]);

static NAMED_RESPONSES: NodeType = NodeType::MapOf { value: "Response" };
static NAMED_PARAMETERS: NodeType = NodeType::MapOf { value: "Parameter" };
static NAMED_REQUEST_BODIES: NodeType = NodeType::MapOf {
    value: "RequestBody",
};

static SCHEMA_3_0: NodeType = NodeType::Object(ObjectType {
    properties: &[
        Property::optional("nullable", "boolean"),
        Property::optional("exclusiveMaximum", "boolean"),
        Property::optional("exclusiveMinimum", "boolean"),
        Property::optional("title", "string"),
        Property::optional("description", "string"),
        Property::optional("type", "SchemaType"),
        Property::optional("format", "string"),
        Property::optional("default", "any"),
        Property::optional("enum", "AnyList"),
        Property::optional("multipleOf", "number"),
        Property::optional("maximum", "number"),
        Property::optional("minimum", "number"),
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
        Property::optional("oneOf", "SchemaList"),
        Property::optional("anyOf", "SchemaList"),
        Property::optional("not", "Schema"),
        Property::optional("items", "Schema"),
        Property::optional("properties", "SchemaMap"),
        Property::optional("additionalProperties", "SchemaOrBool"),
        Property::optional("discriminator", "Discriminator"),
        Property::optional("readOnly", "boolean"),
        Property::optional("writeOnly", "boolean"),
        Property::optional("xml", "Xml"),
        Property::optional("externalDocs", "ExternalDocs"),
        Property::optional("example", "any"),
        Property::optional("deprecated", "boolean"),
    ],
    extensions_allowed: true,
    pattern_properties: &[],
    additional: Additional::Closed,
    shape_rules: &[ShapeRule::NullableRequiresType],
});

static SCHEMA_3_1: NodeType = NodeType::Object(ObjectType {
    properties: &[
        Property::optional("exclusiveMaximum", "number"),
        Property::optional("exclusiveMinimum", "number"),
        Property::optional("const", "any"),
        Property::optional("examples", "AnyList"),
        Property::optional("prefixItems", "SchemaList"),
        Property::optional("patternProperties", "SchemaMap"),
        Property::optional("$defs", "SchemaMap"),
        Property::optional("contentEncoding", "string"),
        Property::optional("contentMediaType", "string"),
        Property::optional("title", "string"),
        Property::optional("description", "string"),
        Property::optional("type", "SchemaType"),
        Property::optional("format", "string"),
        Property::optional("default", "any"),
        Property::optional("enum", "AnyList"),
        Property::optional("multipleOf", "number"),
        Property::optional("maximum", "number"),
        Property::optional("minimum", "number"),
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
        Property::optional("oneOf", "SchemaList"),
        Property::optional("anyOf", "SchemaList"),
        Property::optional("not", "Schema"),
        Property::optional("items", "Schema"),
        Property::optional("properties", "SchemaMap"),
        Property::optional("additionalProperties", "SchemaOrBool"),
        Property::optional("discriminator", "Discriminator"),
        Property::optional("readOnly", "boolean"),
        Property::optional("writeOnly", "boolean"),
        Property::optional("xml", "Xml"),
        Property::optional("externalDocs", "ExternalDocs"),
        Property::optional("example", "any"),
        Property::optional("deprecated", "boolean"),
    ],
    extensions_allowed: true,
    pattern_properties: &[],
    additional: Additional::Closed,
    shape_rules: &[],
});

static SCHEMA_LIST: NodeType = NodeType::Array { item: "Schema" };
static SCHEMA_MAP: NodeType = NodeType::MapOf { value: "Schema" };

static SCHEMA_TYPE_3_0: NodeType = scalar_enum(
    Primitive::String,
    &["object", "array", "string", "number", "integer", "boolean"],
);

// OAS 3.1 `type` is a primitive name or a list of them.
static SCHEMA_TYPE_3_1: NodeType = NodeType::Union(UnionType {
    discriminator: None,
    variants: &["SchemaTypeName", "SchemaTypeNameList"],
});
static SCHEMA_TYPE_NAME: NodeType = scalar_enum(
    Primitive::String,
    &[
        "object", "array", "string", "number", "integer", "boolean", "null",
    ],
);
static SCHEMA_TYPE_NAME_LIST: NodeType = NodeType::Array {
    item: "SchemaTypeName",
};

static SCHEMA_OR_BOOL: NodeType = NodeType::Union(UnionType {
    discriminator: None,
    variants: &["boolean", "Schema"],
});

static DISCRIMINATOR: NodeType = obj(&[
    Property::required("propertyName", "string"),
    Property::optional("mapping", "StringMap"),
]);

static XML: NodeType = obj(&[
    Property::optional("name", "string"),
    Property::optional("namespace", "string"),
    Property::optional("prefix", "string"),
    Property::optional("attribute", "boolean"),
    Property::optional("wrapped", "boolean"),
]);
