use serde::Serialize;
use sources::{Catalog, Pointer};
use std::collections::BTreeSet;
use url::Url;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
}

/// One step of a problem's location chain: a pointer within a source, and
/// whether the problem is anchored on the mapping key rather than the value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStep {
    pub source: Url,
    pub pointer: Pointer,
    pub report_on_key: bool,
}

/// A typed problem. `location` is ordered innermost-first and crosses one
/// step per `$ref` boundary on the way in; `from` is the nearest ref site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggest: Vec<String>,
    pub location: Vec<LocationStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<LocationStep>,
}

impl Problem {
    fn dedupe_key(&self) -> (String, String, String) {
        let chain = self
            .location
            .iter()
            .map(|step| format!("{}#{}{}", step.source, step.pointer, step.report_on_key))
            .collect::<Vec<_>>()
            .join("|");
        (self.rule_id.clone(), chain, self.message.clone())
    }
}

/// A location to silence, as read from an ignore file.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct IgnoreEntry {
    pub source: Url,
    pub pointer: Pointer,
    pub rule_id: String,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub errors: usize,
    pub warnings: usize,
    pub ignored: usize,
}

/// Accumulates problems over a walk, then de-duplicates, applies ignores,
/// and sorts into the stable output order.
#[derive(Default)]
pub struct ProblemCollector {
    problems: Vec<Problem>,
    ignore: Vec<IgnoreEntry>,
    pub rule_errors: usize,
}

impl ProblemCollector {
    pub fn new(ignore: Vec<IgnoreEntry>) -> ProblemCollector {
        ProblemCollector {
            ignore,
            ..Default::default()
        }
    }

    pub fn push(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    /// De-duplicate on (rule id, location chain, message), drop ignored
    /// problems, and sort by (source URI, start offset, rule id).
    pub fn finish(self, catalog: &Catalog) -> (Vec<Problem>, Totals) {
        let mut seen = BTreeSet::new();
        let mut totals = Totals::default();
        let mut kept = Vec::new();

        for problem in self.problems {
            if !seen.insert(problem.dedupe_key()) {
                continue;
            }
            let silenced = problem.location.first().map_or(false, |step| {
                self.ignore.iter().any(|entry| {
                    entry.source == step.source
                        && entry.pointer == step.pointer
                        && entry.rule_id == problem.rule_id
                })
            });
            if silenced {
                totals.ignored += 1;
                continue;
            }
            match problem.severity {
                Severity::Error => totals.errors += 1,
                Severity::Warn => totals.warnings += 1,
            }
            kept.push(problem);
        }

        kept.sort_by_cached_key(|problem| {
            let step = problem.location.first();
            let offset = step
                .and_then(|step| {
                    catalog
                        .source(&step.source)?
                        .span_at(&step.pointer, step.report_on_key)
                })
                .map(|span| span.begin)
                .unwrap_or(usize::MAX);
            (
                step.map(|step| step.source.to_string()).unwrap_or_default(),
                offset,
                problem.rule_id.clone(),
            )
        });

        (kept, totals)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn problem(rule_id: &str, pointer: &str, severity: Severity) -> Problem {
        Problem {
            rule_id: rule_id.to_string(),
            severity,
            message: format!("{rule_id} at {pointer}"),
            suggest: Vec::new(),
            location: vec![LocationStep {
                source: Url::parse("https://example/openapi.yaml").unwrap(),
                pointer: Pointer::parse(pointer),
                report_on_key: false,
            }],
            from: None,
        }
    }

    async fn catalog() -> Catalog {
        let fetcher = sources::MapFetcher::new().add(
            "https://example/openapi.yaml",
            "openapi: 3.0.0\ninfo:\n  title: x\npaths: {}\n",
        );
        sources::Loader::new(fetcher)
            .load(&Url::parse("https://example/openapi.yaml").unwrap())
            .await
    }

    #[tokio::test]
    async fn test_dedupe_sort_and_totals() {
        let mut collector = ProblemCollector::default();
        collector.push(problem("b-rule", "/paths", Severity::Warn));
        collector.push(problem("a-rule", "/paths", Severity::Error));
        collector.push(problem("spec", "/openapi", Severity::Error));
        // Exact duplicate collapses.
        collector.push(problem("spec", "/openapi", Severity::Error));

        let (problems, totals) = collector.finish(&catalog().await);

        let order: Vec<_> = problems.iter().map(|p| p.rule_id.as_str()).collect();
        assert_eq!(order, vec!["spec", "a-rule", "b-rule"]);
        assert_eq!(
            totals,
            Totals {
                errors: 2,
                warnings: 1,
                ignored: 0
            }
        );
    }

    #[tokio::test]
    async fn test_ignore_entries() {
        let ignore = vec![IgnoreEntry {
            source: Url::parse("https://example/openapi.yaml").unwrap(),
            pointer: Pointer::parse("/paths"),
            rule_id: "a-rule".to_string(),
        }];
        let mut collector = ProblemCollector::new(ignore);
        collector.push(problem("a-rule", "/paths", Severity::Error));
        collector.push(problem("b-rule", "/paths", Severity::Warn));

        let (problems, totals) = collector.finish(&catalog().await);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].rule_id, "b-rule");
        assert_eq!(totals.ignored, 1);
        assert_eq!(totals.errors, 0);
    }

    #[test]
    fn test_stable_json_shape() {
        let rendered = serde_json::to_value(problem("spec", "/paths/~1x", Severity::Error)).unwrap();
        assert_eq!(
            rendered,
            serde_json::json!({
                "ruleId": "spec",
                "severity": "error",
                "message": "spec at /paths/~1x",
                "location": [{
                    "source": "https://example/openapi.yaml",
                    "pointer": "/paths/~1x",
                    "reportOnKey": false,
                }],
            }),
        );
    }
}
