use bundle::{bundle, dereference, normalize, to_yaml_string, BundleError};
use pretty_assertions::assert_eq;
use serde_json::json;
use sources::{Loader, MapFetcher};
use url::Url;

const ROOT: &str = "https://example/openapi.yaml";

async fn load(files: &[(&str, &str)]) -> sources::Catalog {
    let mut fetcher = MapFetcher::new();
    for (url, content) in files {
        fetcher = fetcher.add(url, content);
    }
    Loader::new(fetcher).load(&Url::parse(ROOT).unwrap()).await
}

fn root_url() -> Url {
    Url::parse(ROOT).unwrap()
}

#[tokio::test]
async fn test_bundle_inlines_external_refs() {
    let catalog = load(&[
        (
            ROOT,
            "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: 'shared.yaml#/components/schemas/Pet'
",
        ),
        (
            "https://example/shared.yaml",
            "\
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
",
        ),
    ])
    .await;

    let bundled = bundle(&catalog, &root_url()).unwrap();

    // The use site now points into the bundled components section.
    assert_eq!(
        bundled["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"],
        json!({"$ref": "#/components/schemas/Pet"}),
    );
    assert_eq!(
        bundled["components"]["schemas"]["Pet"],
        json!({"type": "object", "properties": {"name": {"type": "string"}}}),
    );
}

#[tokio::test]
async fn test_bundle_renames_on_collision() {
    let catalog = load(&[
        (
            ROOT,
            "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths: {}
components:
  schemas:
    Pet:
      type: string
    Imported:
      $ref: 'shared.yaml#/components/schemas/Pet'
",
        ),
        (
            "https://example/shared.yaml",
            "\
components:
  schemas:
    Pet:
      type: object
",
        ),
    ])
    .await;

    let bundled = bundle(&catalog, &root_url()).unwrap();

    // The root's own Pet survives; the imported one gets a suffix.
    assert_eq!(bundled["components"]["schemas"]["Pet"], json!({"type": "string"}));
    assert_eq!(
        bundled["components"]["schemas"]["Imported"],
        json!({"$ref": "#/components/schemas/Pet-2"}),
    );
    assert_eq!(
        bundled["components"]["schemas"]["Pet-2"],
        json!({"type": "object"}),
    );
}

#[tokio::test]
async fn test_bundle_keeps_circular_external_refs_as_refs() {
    let catalog = load(&[
        (
            ROOT,
            "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths: {}
components:
  schemas:
    Node:
      $ref: 'shared.yaml#/Node'
",
        ),
        (
            "https://example/shared.yaml",
            "\
Node:
  type: object
  properties:
    next:
      $ref: '#/Node'
",
        ),
    ])
    .await;

    let bundled = bundle(&catalog, &root_url()).unwrap();

    // The cycle stays a reference into the bundled components section.
    assert_eq!(
        bundled["components"]["schemas"]["Node-2"]["properties"]["next"],
        json!({"$ref": "#/components/schemas/Node-2"}),
    );
}

#[tokio::test]
async fn test_dereference_inlines_at_use_site() {
    let catalog = load(&[
        (
            ROOT,
            "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths: {}
components:
  schemas:
    A:
      $ref: '#/components/schemas/B'
    B:
      type: integer
",
        ),
    ])
    .await;

    let dereferenced = dereference(&catalog, &root_url()).unwrap();
    assert_eq!(
        dereferenced["components"]["schemas"]["A"],
        json!({"type": "integer"}),
    );
}

#[tokio::test]
async fn test_dereference_rejects_cycles() {
    let catalog = load(&[
        (
            ROOT,
            "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths: {}
components:
  schemas:
    Loop:
      properties:
        next:
          $ref: '#/components/schemas/Loop'
",
        ),
    ])
    .await;

    let err = dereference(&catalog, &root_url()).unwrap_err();
    assert!(matches!(err, BundleError::CircularJsonNotSupported { .. }));
}

#[tokio::test]
async fn test_round_trip_is_semantic_identity() {
    let text = "\
paths:
  /b:
    get:
      responses:
        '200':
          description: ok
  /a: {}
info:
  version: '1'
  title: scrambled
openapi: 3.0.0
";
    let catalog = load(&[(ROOT, text)]).await;
    let source = catalog.source(&root_url()).unwrap();
    let version = oas::detect_version(&source.root).unwrap();

    let normalized = normalize(source.root.to_value(), version);

    // Top-level keys land in canonical order.
    let keys: Vec<_> = normalized.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["openapi", "info", "paths"]);

    // Emit as YAML, re-parse, and compare semantically.
    let emitted = to_yaml_string(&normalized);
    let (reparsed, warnings) = sources::parse::parse(&emitted).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(reparsed.to_value(), source.root.to_value());

    // Nested mapping order is preserved through the round trip.
    let path_keys: Vec<_> = reparsed.get("paths").unwrap().entries().iter().map(|e| e.key.as_str()).collect();
    assert_eq!(path_keys, vec!["/b", "/a"]);
}
