use oas::OasVersion;

// Canonical top-level key orders.
const OAS3_ORDER: &[&str] = &[
    "openapi",
    "info",
    "jsonSchemaDialect",
    "servers",
    "security",
    "tags",
    "externalDocs",
    "paths",
    "webhooks",
    "x-webhooks",
    "components",
];
const OAS2_ORDER: &[&str] = &[
    "swagger",
    "info",
    "host",
    "basePath",
    "schemes",
    "consumes",
    "produces",
    "security",
    "tags",
    "externalDocs",
    "paths",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
];

/// Reorder the document's top-level keys into the canonical order for its
/// version, with no other change. Keys outside the canonical list keep
/// their relative order after it.
pub fn normalize(value: serde_json::Value, version: OasVersion) -> serde_json::Value {
    let serde_json::Value::Object(map) = value else {
        return value;
    };
    let order = match version {
        OasVersion::Oas2 => OAS2_ORDER,
        OasVersion::Oas3_0 | OasVersion::Oas3_1 => OAS3_ORDER,
    };

    let mut map = map;
    let mut normalized = serde_json::Map::new();
    for key in order {
        if let Some(entry) = map.remove(*key) {
            normalized.insert(key.to_string(), entry);
        }
    }
    for (key, entry) in map {
        normalized.insert(key, entry);
    }
    serde_json::Value::Object(normalized)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reorders_top_level_only() {
        let scrambled = json!({
            "paths": {"/b": {}, "/a": {}},
            "x-internal": true,
            "info": {"version": "1.0", "title": "t"},
            "openapi": "3.0.0",
        });
        let normalized = normalize(scrambled.clone(), OasVersion::Oas3_0);

        let keys: Vec<_> = normalized.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["openapi", "info", "paths", "x-internal"]);

        // Semantically identical.
        assert_eq!(normalized, scrambled);

        // Nested orders are untouched.
        let paths: Vec<_> = normalized["paths"].as_object().unwrap().keys().collect();
        assert_eq!(paths, vec!["/b", "/a"]);
    }

    #[test]
    fn test_oas2_order() {
        let scrambled = json!({
            "definitions": {},
            "swagger": "2.0",
            "host": "example.com",
            "info": {},
            "paths": {},
        });
        let normalized = normalize(scrambled, OasVersion::Oas2);
        let keys: Vec<_> = normalized.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["swagger", "info", "host", "paths", "definitions"]);
    }
}
