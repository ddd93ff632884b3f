//! Resolution of the `extends` cascade: a depth-first, memoized fold over an
//! immutable DAG of configs, with the owning config's entries applied last.

use crate::error::ConfigError;
use crate::models::{RawAssertion, RawConfig, RawStyleguide, BUILTIN_PREDICATES};
use crate::presets;
use crate::{PluginCatalog, ResolvedStyleguide};
use futures::future::BoxFuture;
use sources::Fetcher;
use std::collections::BTreeMap;
use url::Url;

/// A per-API resolution: the absolute root document URL and the effective
/// styleguide governing its walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedApi {
    pub root: Url,
    pub styleguide: ResolvedStyleguide,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    pub styleguide: ResolvedStyleguide,
    pub apis: BTreeMap<String, ResolvedApi>,
}

/// Resolve a raw root config into per-API effective styleguides.
///
/// The preset fallback applies here: when neither the root nor any API
/// declares `extends` or `rules`, the root behaves as
/// `extends: ["recommended"]` and the result is marked.
pub async fn resolve_config(
    raw: &RawConfig,
    config_url: &Url,
    plugins: &dyn PluginCatalog,
    fetcher: &dyn Fetcher,
) -> Result<ResolvedConfig, ConfigError> {
    let root_raw = raw.root_styleguide();

    let apis_empty = raw
        .apis
        .values()
        .all(|api| api.styleguide.as_ref().map_or(true, RawStyleguide::is_empty));
    let fallback = root_raw.is_empty() && apis_empty;

    let effective_root = if fallback {
        tracing::debug!("no rules or extends configured, falling back to `recommended`");
        RawStyleguide {
            extends: vec!["recommended".to_string()],
            ..root_raw.clone()
        }
    } else {
        root_raw
    };

    let mut resolver = Resolver {
        plugins,
        fetcher,
        memo: BTreeMap::new(),
        stack: Vec::new(),
    };
    let mut root_resolved = resolver
        .styleguide(effective_root, config_url.clone())
        .await?;
    root_resolved.recommended_fallback = fallback;

    let mut apis = BTreeMap::new();
    for (alias, api) in &raw.apis {
        let mut resolved = root_resolved.clone();
        if let Some(styleguide) = &api.styleguide {
            let api_resolved = resolver
                .styleguide(styleguide.clone(), config_url.clone())
                .await?;
            resolved.apply(&api_resolved);
        }
        resolved.recommended_fallback = fallback;

        let root = config_url
            .join(&api.root)
            .map_err(|err| ConfigError::InvalidApiRoot {
                root: api.root.clone(),
                detail: err.to_string(),
            })?;
        apis.insert(
            alias.clone(),
            ResolvedApi {
                root,
                styleguide: resolved,
            },
        );
    }

    Ok(ResolvedConfig {
        styleguide: root_resolved,
        apis,
    })
}

/// Resolve only the per-API map of a raw config.
pub async fn resolve_apis(
    raw: &RawConfig,
    config_url: &Url,
    plugins: &dyn PluginCatalog,
    fetcher: &dyn Fetcher,
) -> Result<BTreeMap<String, ResolvedApi>, ConfigError> {
    Ok(resolve_config(raw, config_url, plugins, fetcher).await?.apis)
}

/// Resolve one styleguide in isolation (no API overrides, no fallback).
pub async fn resolve_styleguide(
    raw: &RawStyleguide,
    base: &Url,
    plugins: &dyn PluginCatalog,
    fetcher: &dyn Fetcher,
) -> Result<ResolvedStyleguide, ConfigError> {
    let mut resolver = Resolver {
        plugins,
        fetcher,
        memo: BTreeMap::new(),
        stack: Vec::new(),
    };
    resolver.styleguide(raw.clone(), base.clone()).await
}

struct Resolver<'a> {
    plugins: &'a dyn PluginCatalog,
    fetcher: &'a dyn Fetcher,
    // Fetched configs resolve once; re-extension is a memo hit.
    memo: BTreeMap<Url, ResolvedStyleguide>,
    // URIs currently being resolved, for cycle detection.
    stack: Vec<Url>,
}

impl<'a> Resolver<'a> {
    /// Right-fold of the extends chain: presets, plugin configs, and fetched
    /// configs merge left-to-right, and `raw`'s own entries apply last.
    fn styleguide<'s>(
        &'s mut self,
        raw: RawStyleguide,
        base: Url,
    ) -> BoxFuture<'s, Result<ResolvedStyleguide, ConfigError>> {
        Box::pin(async move {
            let mut acc = ResolvedStyleguide::default();

            for entry in &raw.extends {
                if let Some(rules) = presets::preset(entry) {
                    acc.apply_rules(&rules);
                    continue;
                }
                if let Some((plugin, config)) = entry.split_once('/') {
                    if self.plugins.has_plugin(plugin) {
                        let exported = self.plugins.config(plugin, config).ok_or_else(|| {
                            ConfigError::UnknownExtend {
                                name: entry.clone(),
                            }
                        })?;
                        let resolved = self.styleguide(exported, base.clone()).await?;
                        acc.apply(&resolved);
                        continue;
                    }
                }
                if looks_like_preset(entry) {
                    return Err(ConfigError::UnknownExtend {
                        name: entry.clone(),
                    });
                }

                let target = base.join(entry).map_err(|err| ConfigError::Fetch {
                    uri: entry.clone(),
                    detail: err.to_string(),
                })?;
                let resolved = self.extend_file(target).await?;
                acc.apply(&resolved);
            }

            // The config's own entries always apply last, over anything an
            // extended preset or file said about the same rule id.
            acc.apply_rules(&raw.rules);
            self.validate_assertions(&raw.assertions)?;
            acc.assertions.extend(raw.assertions.iter().cloned());
            for (id, setting) in &raw.preprocessors {
                acc.preprocessors.insert(id.clone(), setting.clone());
            }
            for (id, setting) in &raw.decorators {
                acc.decorators.insert(id.clone(), setting.clone());
            }
            for plugin in &raw.plugins {
                if !self.plugins.has_plugin(plugin) {
                    return Err(ConfigError::UnknownPlugin { id: plugin.clone() });
                }
                if !acc.plugins.contains(plugin) {
                    acc.plugins.push(plugin.clone());
                }
                if !acc.plugin_paths.contains(plugin) {
                    acc.plugin_paths.push(plugin.clone());
                }
            }

            Ok(acc)
        })
    }

    async fn extend_file(&mut self, target: Url) -> Result<ResolvedStyleguide, ConfigError> {
        if let Some(hit) = self.memo.get(&target) {
            return Ok(hit.clone());
        }
        if self.stack.contains(&target) {
            return Err(ConfigError::ExtendsCycle {
                uri: target.to_string(),
            });
        }
        self.stack.push(target.clone());

        let text = self
            .fetcher
            .fetch(&target)
            .await
            .map_err(|err| ConfigError::Fetch {
                uri: target.to_string(),
                detail: err.to_string(),
            })?;
        let raw: RawConfig =
            serde_yaml::from_str(&text).map_err(|err| ConfigError::Parse {
                uri: target.to_string(),
                detail: err.to_string(),
            })?;

        let mut resolved = self
            .styleguide(raw.root_styleguide(), target.clone())
            .await?;
        if !resolved.extend_paths.contains(&target) {
            resolved.extend_paths.push(target.clone());
        }

        self.stack.pop();
        self.memo.insert(target, resolved.clone());
        Ok(resolved)
    }

    fn validate_assertions(&self, assertions: &[RawAssertion]) -> Result<(), ConfigError> {
        for assertion in assertions {
            for name in assertion.predicates.keys() {
                if BUILTIN_PREDICATES.iter().any(|p| *p == name.as_str()) {
                    continue;
                }
                let Some((plugin, function)) = name.split_once('/') else {
                    return Err(ConfigError::UnknownPredicate { name: name.clone() });
                };
                if !self.plugins.has_plugin(plugin) {
                    return Err(ConfigError::UnknownPlugin {
                        id: plugin.to_string(),
                    });
                }
                if !self.plugins.has_assertion(plugin, function) {
                    return Err(ConfigError::MissingAssertionFunction {
                        plugin: plugin.to_string(),
                        function: function.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Bare identifiers are preset names; anything with path or URL syntax is a
/// fetchable config.
fn looks_like_preset(entry: &str) -> bool {
    !entry.contains('/') && !entry.contains('.') && !entry.contains(':')
}
