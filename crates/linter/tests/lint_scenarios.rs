//! End-to-end linting scenarios over in-memory document fixtures.

use linter::{
    lint_document, LintOutcome, Plugin, PluginRule, Problem, Report, Severity, Visitor,
};
use pretty_assertions::assert_eq;
use sources::{MapFetcher, ParseNode, Pointer};
use styleguide::{RawAssertion, ResolvedStyleguide, RuleSetting, SeverityLevel};
use url::Url;

const ROOT: &str = "https://example/openapi.yaml";

fn root_url() -> Url {
    Url::parse(ROOT).unwrap()
}

fn styleguide(rules: &[(&str, SeverityLevel)]) -> ResolvedStyleguide {
    ResolvedStyleguide {
        rules: rules
            .iter()
            .map(|(id, level)| (id.to_string(), RuleSetting::Severity(*level)))
            .collect(),
        ..Default::default()
    }
}

async fn lint_files(
    files: &[(&str, &str)],
    rules: &[(&str, SeverityLevel)],
    plugins: &[Plugin],
) -> LintOutcome {
    let mut fetcher = MapFetcher::new();
    for (url, content) in files {
        fetcher = fetcher.add(url, content);
    }
    lint_document(&root_url(), &styleguide(rules), plugins, Vec::new(), fetcher)
        .await
        .unwrap()
}

async fn lint(document: &str, rules: &[(&str, SeverityLevel)]) -> Vec<Problem> {
    lint_files(&[(ROOT, document)], rules, &[])
        .await
        .report
        .problems
}

fn spec_only() -> Vec<(&'static str, SeverityLevel)> {
    vec![("spec", SeverityLevel::Error)]
}

#[tokio::test]
async fn test_missing_required_fields_oas3_0() {
    let document = "\
openapi: 3.0.0
paths:
  /test:
    get:
      responses:
        '200':
          description: ok
      parameters:
        - name: id
          in: path
          required: true
";
    let problems = lint(document, &spec_only()).await;

    assert_eq!(problems.len(), 2, "{problems:#?}");

    assert_eq!(problems[0].rule_id, "spec");
    assert_eq!(problems[0].severity, Severity::Error);
    assert_eq!(
        problems[0].message,
        "The field `info` must be present on this level."
    );
    assert_eq!(problems[0].location[0].pointer, Pointer::parse(""));
    assert!(problems[0].location[0].report_on_key);

    assert_eq!(problems[1].rule_id, "spec");
    assert_eq!(problems[1].severity, Severity::Error);
    assert_eq!(
        problems[1].message,
        "Must contain at least one of the following fields: schema, content."
    );
    assert_eq!(
        problems[1].location[0].pointer,
        Pointer::parse("/paths/~1test/get/parameters/0")
    );
    assert!(problems[1].location[0].report_on_key);
}

#[tokio::test]
async fn test_nullable_requires_type() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths: {}
components:
  schemas:
    Thing:
      nullable: true
";
    let problems = lint(document, &spec_only()).await;

    assert_eq!(problems.len(), 1, "{problems:#?}");
    assert_eq!(
        problems[0].message,
        "The `type` field must be defined when the `nullable` field is used."
    );
    assert_eq!(
        problems[0].location[0].pointer,
        Pointer::parse("/components/schemas/Thing/nullable")
    );
    assert!(!problems[0].location[0].report_on_key);
    assert_eq!(problems[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_bad_type_in_oas3_1_list() {
    let document = "\
openapi: 3.1.0
info:
  title: t
  version: '1'
paths: {}
components:
  schemas:
    TestSchema:
      type: [string, foo]
";
    let problems = lint(document, &spec_only()).await;

    assert_eq!(problems.len(), 1, "{problems:#?}");
    assert_eq!(
        problems[0].message,
        "`type` can be one of the following only: \"object\", \"array\", \"string\", \
         \"number\", \"integer\", \"boolean\", \"null\"."
    );
    assert_eq!(
        problems[0].location[0].pointer,
        Pointer::parse("/components/schemas/TestSchema/type/1")
    );
}

#[tokio::test]
async fn test_problems_through_refs_carry_from() {
    let root = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /test:
    get:
      responses:
        '200':
          $ref: 'shared.yaml#/components/responses/Ok'
";
    let shared = "\
components:
  responses:
    Ok: {}
";
    let outcome = lint_files(
        &[(ROOT, root), ("https://example/shared.yaml", shared)],
        &spec_only(),
        &[],
    )
    .await;
    let problems = outcome.report.problems;

    assert_eq!(problems.len(), 1, "{problems:#?}");
    assert_eq!(
        problems[0].message,
        "The field `description` must be present on this level."
    );

    // Innermost location is inside the referenced source.
    assert_eq!(
        problems[0].location[0].source.as_str(),
        "https://example/shared.yaml"
    );
    assert_eq!(
        problems[0].location[0].pointer,
        Pointer::parse("/components/responses/Ok")
    );

    // The `from` step is the ref site within the root document.
    let from = problems[0].from.as_ref().unwrap();
    assert_eq!(from.source.as_str(), ROOT);
    assert_eq!(
        from.pointer,
        Pointer::parse("/paths/~1test/get/responses/200")
    );
}

#[tokio::test]
async fn test_unresolved_ref_is_a_problem_not_fatal() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /test:
    get:
      responses:
        '200':
          $ref: 'missing.yaml#/nope'
";
    let problems = lint(
        document,
        &[
            ("spec", SeverityLevel::Error),
            ("no-unresolved-refs", SeverityLevel::Error),
        ],
    )
    .await;

    assert_eq!(problems.len(), 1, "{problems:#?}");
    assert_eq!(problems[0].rule_id, "no-unresolved-refs");
    assert_eq!(
        problems[0].location[0].pointer,
        Pointer::parse("/paths/~1test/get/responses/200")
    );
}

#[tokio::test]
async fn test_unknown_property_reported_and_not_descended() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
  nonsense:
    deeper: [also, nonsense]
paths: {}
";
    let problems = lint(document, &spec_only()).await;

    assert_eq!(problems.len(), 1, "{problems:#?}");
    assert_eq!(
        problems[0].message,
        "Property `nonsense` is not expected here."
    );
    assert_eq!(problems[0].location[0].pointer, Pointer::parse("/info/nonsense"));
    assert!(problems[0].location[0].report_on_key);
}

#[tokio::test]
async fn test_stylistic_rules() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /late/:
    get:
      responses:
        '404':
          description: gone
";
    let problems = lint(
        document,
        &[
            ("operation-2xx-response", SeverityLevel::Warn),
            ("no-path-trailing-slash", SeverityLevel::Error),
            ("operation-operationId", SeverityLevel::Off),
        ],
    )
    .await;

    assert_eq!(problems.len(), 2, "{problems:#?}");
    assert_eq!(problems[0].rule_id, "no-path-trailing-slash");
    assert_eq!(
        problems[0].message,
        "`/late/` should not have a trailing slash."
    );
    assert_eq!(problems[1].rule_id, "operation-2xx-response");
    assert_eq!(
        problems[1].message,
        "Operation must have at least one `2xx` response."
    );
    assert_eq!(problems[1].severity, Severity::Warn);
}

#[tokio::test]
async fn test_assertions_compile_and_fire() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
";
    let mut styleguide = styleguide(&[]);
    styleguide.assertions.push(RawAssertion {
        subject: "Operation".to_string(),
        property: Some("summary".to_string()),
        message: None,
        severity: Some(SeverityLevel::Warn),
        assertion_id: Some("operation-summary-defined".to_string()),
        predicates: [("defined".to_string(), serde_json::json!(true))]
            .into_iter()
            .collect(),
    });

    let fetcher = MapFetcher::new().add(ROOT, document);
    let outcome = lint_document(&root_url(), &styleguide, &[], Vec::new(), fetcher)
        .await
        .unwrap();
    let problems = outcome.report.problems;

    assert_eq!(problems.len(), 1, "{problems:#?}");
    assert_eq!(problems[0].rule_id, "operation-summary-defined");
    assert_eq!(problems[0].severity, Severity::Warn);
    assert_eq!(problems[0].location[0].pointer, Pointer::parse("/paths/~1a/get"));
    assert!(problems[0].location[0].report_on_key);
}

struct PanickingVisitor;

impl Visitor for PanickingVisitor {
    fn enter(&self, _node: &ParseNode, _ctx: &mut linter::Context) {
        panic!("rule exploded");
    }
}

struct ReportingVisitor;

impl Visitor for ReportingVisitor {
    fn enter(&self, _node: &ParseNode, ctx: &mut linter::Context) {
        ctx.report(Report {
            message: "operation seen".to_string(),
            ..Default::default()
        });
    }
}

#[tokio::test]
async fn test_rule_panic_is_isolated() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
  /b:
    get:
      responses:
        '200':
          description: ok
";
    let plugin = Plugin {
        id: "test".to_string(),
        rules: vec![
            PluginRule {
                name: "boom",
                build: || vec![("Operation".to_string(), Box::new(PanickingVisitor))],
                skip_refs: false,
            },
            PluginRule {
                name: "seen",
                build: || vec![("Operation".to_string(), Box::new(ReportingVisitor))],
                skip_refs: false,
            },
        ],
        ..Default::default()
    };

    let outcome = lint_files(
        &[(ROOT, document)],
        &[
            ("test/boom", SeverityLevel::Error),
            ("test/seen", SeverityLevel::Warn),
        ],
        &[plugin],
    )
    .await;

    // The panicking rule was disabled after its first callback; the healthy
    // rule still fired for both operations.
    assert_eq!(outcome.report.rule_errors, 1);
    let seen: Vec<_> = outcome
        .report
        .problems
        .iter()
        .filter(|p| p.rule_id == "test/seen")
        .collect();
    assert_eq!(seen.len(), 2);
}

static FIRED: std::sync::Mutex<Vec<String>> = std::sync::Mutex::new(Vec::new());

struct LogPhase(&'static str);

impl Visitor for LogPhase {
    fn enter(&self, _node: &ParseNode, _ctx: &mut linter::Context) {
        FIRED.lock().unwrap().push(format!("{}:enter", self.0));
    }
    fn leave(&self, _node: &ParseNode, _ctx: &mut linter::Context) {
        FIRED.lock().unwrap().push(format!("{}:leave", self.0));
    }
}

#[tokio::test]
async fn test_phase_order_per_node() {
    let document = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths: {}
";
    let plugin = Plugin {
        id: "test".to_string(),
        rules: vec![PluginRule {
            name: "rule",
            build: || vec![("Info".to_string(), Box::new(LogPhase("rule")))],
            skip_refs: false,
        }],
        preprocessors: vec![PluginRule {
            name: "pre",
            build: || vec![("Info".to_string(), Box::new(LogPhase("preprocessor")))],
            skip_refs: false,
        }],
        decorators: vec![PluginRule {
            name: "dec",
            build: || vec![("Info".to_string(), Box::new(LogPhase("decorator")))],
            skip_refs: false,
        }],
        ..Default::default()
    };

    let mut styleguide = styleguide(&[("test/rule", SeverityLevel::Warn)]);
    styleguide.preprocessors.insert(
        "test/pre".to_string(),
        RuleSetting::Severity(SeverityLevel::Warn),
    );
    styleguide.decorators.insert(
        "test/dec".to_string(),
        RuleSetting::Severity(SeverityLevel::Warn),
    );

    FIRED.lock().unwrap().clear();
    let fetcher = MapFetcher::new().add(ROOT, document);
    lint_document(&root_url(), &styleguide, &[plugin], Vec::new(), fetcher)
        .await
        .unwrap();

    // Preprocessors run on the way in, decorators on the way out, rules
    // in between; nothing fires twice.
    let fired = FIRED.lock().unwrap().clone();
    assert_eq!(
        fired,
        vec![
            "preprocessor:enter".to_string(),
            "rule:enter".to_string(),
            "rule:leave".to_string(),
            "decorator:leave".to_string(),
        ],
    );
}

struct SkipRefsVisitor;

impl Visitor for SkipRefsVisitor {
    fn enter(&self, _node: &ParseNode, ctx: &mut linter::Context) {
        ctx.skip_refs();
    }
}

struct NoteResponse(&'static str);

impl Visitor for NoteResponse {
    fn enter(&self, _node: &ParseNode, ctx: &mut linter::Context) {
        ctx.report(Report {
            message: self.0.to_string(),
            ..Default::default()
        });
    }
}

#[tokio::test]
async fn test_rules_can_opt_out_of_ref_targets() {
    let root = "\
openapi: 3.0.0
info:
  title: t
  version: '1'
paths:
  /inline:
    get:
      responses:
        '200':
          description: ok
  /referenced:
    get:
      responses:
        '200':
          $ref: 'shared.yaml#/components/responses/Ok'
";
    let shared = "\
components:
  responses:
    Ok:
      description: ok
";
    let plugin = Plugin {
        id: "test".to_string(),
        rules: vec![
            PluginRule {
                name: "dynamic-skip",
                build: || {
                    vec![
                        ("Root".to_string(), Box::new(SkipRefsVisitor)),
                        ("Response".to_string(), Box::new(NoteResponse("dynamic"))),
                    ]
                },
                skip_refs: false,
            },
            PluginRule {
                name: "static-skip",
                build: || vec![("Response".to_string(), Box::new(NoteResponse("static")))],
                skip_refs: true,
            },
            PluginRule {
                name: "witness",
                build: || vec![("Response".to_string(), Box::new(NoteResponse("witness")))],
                skip_refs: false,
            },
        ],
        ..Default::default()
    };

    let outcome = lint_files(
        &[(ROOT, root), ("https://example/shared.yaml", shared)],
        &[
            ("test/dynamic-skip", SeverityLevel::Warn),
            ("test/static-skip", SeverityLevel::Warn),
            ("test/witness", SeverityLevel::Warn),
        ],
        &[plugin],
    )
    .await;

    let count = |id: &str| {
        outcome
            .report
            .problems
            .iter()
            .filter(|p| p.rule_id == id)
            .count()
    };
    // The walk still crosses the reference: the unrestricted rule sees both
    // the inline and the referenced Response. Rules which opted out, either
    // statically on the plugin export or via the callback, see only the
    // inline one.
    assert_eq!(count("test/witness"), 2);
    assert_eq!(count("test/dynamic-skip"), 1);
    assert_eq!(count("test/static-skip"), 1);

    let dynamic: Vec<_> = outcome
        .report
        .problems
        .iter()
        .filter(|p| p.rule_id == "test/dynamic-skip")
        .collect();
    assert_eq!(
        dynamic[0].location[0].pointer,
        Pointer::parse("/paths/~1inline/get/responses/200")
    );
}

#[tokio::test]
async fn test_determinism() {
    let document = "\
openapi: 3.0.0
paths:
  /test:
    get:
      responses:
        '200':
          description: ok
      parameters:
        - name: id
          in: path
";
    let first = serde_json::to_string(&lint(document, &spec_only()).await).unwrap();
    let second = serde_json::to_string(&lint(document, &spec_only()).await).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_rule_is_fatal() {
    let fetcher = MapFetcher::new().add(ROOT, "openapi: 3.0.0\n");
    let err = lint_document(
        &root_url(),
        &styleguide(&[("no-such-rule", SeverityLevel::Error)]),
        &[],
        Vec::new(),
        fetcher,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        linter::LintError::Config(styleguide::ConfigError::UnknownRule { .. })
    ));
}
