pub mod assertions;
pub mod plugin;
pub mod problem;
pub mod rules;
pub mod visit;
mod walk;

pub use plugin::{AssertionFn, Plugin, PluginRule, Plugins, VisitorSet};
pub use problem::{IgnoreEntry, LocationStep, Problem, ProblemCollector, Severity, Totals};
pub use visit::{bind, BoundRule, Context, Report, RuleSet, Visitor};

use oas::Registry;
use sources::{Catalog, Fetcher, Loader, Pointer};
use styleguide::ResolvedStyleguide;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum LintError {
    #[error("failed to load '{uri}': {detail}")]
    Load { uri: Url, detail: String },
    #[error(transparent)]
    Config(#[from] styleguide::ConfigError),
    #[error(transparent)]
    Version(#[from] oas::VersionError),
}

/// Rewrites recorded by preprocessors and decorators during the walk,
/// keyed by source and pointer, applied at emission time.
pub type Edits = Vec<(Url, Pointer, serde_json::Value)>;

/// The output of one walk.
#[derive(Debug)]
pub struct WalkReport {
    pub problems: Vec<Problem>,
    pub totals: Totals,
    pub edits: Edits,
    /// Rule callbacks which panicked and were disabled; the walk continued.
    pub rule_errors: usize,
}

#[derive(Debug)]
pub struct LintOutcome {
    pub report: WalkReport,
    /// The sources and resolutions of this run, for subsequent emission.
    pub catalog: Catalog,
}

/// Load a root document and everything it references, then lint it under
/// the given styleguide. The crawl is the only concurrent part; the walk
/// itself is strictly sequential.
pub async fn lint_document(
    root: &Url,
    styleguide: &ResolvedStyleguide,
    plugins: &[Plugin],
    ignore: Vec<IgnoreEntry>,
    fetcher: impl Fetcher,
) -> Result<LintOutcome, LintError> {
    let catalog = Loader::new(fetcher).load(root).await;
    let report = lint_catalog(&catalog, root, styleguide, plugins, ignore)?;
    Ok(LintOutcome { report, catalog })
}

/// Lint a document whose reference graph is already loaded.
pub fn lint_catalog(
    catalog: &Catalog,
    root: &Url,
    styleguide: &ResolvedStyleguide,
    plugins: &[Plugin],
    ignore: Vec<IgnoreEntry>,
) -> Result<WalkReport, LintError> {
    let mut root = root.clone();
    root.set_fragment(None);

    let source = catalog.source(&root).ok_or_else(|| LintError::Load {
        uri: root.clone(),
        detail: catalog
            .failure(&root)
            .unwrap_or("resource was not fetched")
            .to_string(),
    })?;

    let version = oas::detect_version(&source.root)?;
    let registry = Registry::new(version);
    let rule_set = bind(styleguide, plugins)?;

    let mut collector = ProblemCollector::new(ignore);
    let mut walker = walk::Walker::new(catalog, registry, &rule_set, &mut collector);
    walker.walk(source);
    let edits = std::mem::take(&mut walker.edits);
    drop(walker);

    let rule_errors = collector.rule_errors;
    let (problems, totals) = collector.finish(catalog);
    Ok(WalkReport {
        problems,
        totals,
        edits,
        rule_errors,
    })
}
