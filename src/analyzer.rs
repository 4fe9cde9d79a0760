//! Host scan loop
//!
//! Walks a token stream once, dispatching each token to the matchers
//! registered for its kind and turning their results into diagnostics.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::diagnostics::{classify, emit, legacy_tokenizer_notice, Diagnostics};
use crate::error::Result;
use crate::features::{Feature, FeatureRegistry};
use crate::lexer::{TokenStream, TokenizerProfile};
use crate::matchers::{matchers_for, Framing, Matcher, MATCHERS};
use crate::version::VersionRange;

/// Anchor, offset inside the anchor, feature, framing and found text.
type SeenKey = (usize, usize, Feature, Framing, Option<String>);

/// Per-run analysis settings
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub range: VersionRange,
    /// Features never reported.
    pub suppressed: HashSet<Feature>,
}

impl AnalysisConfig {
    pub fn new(range: VersionRange) -> Self {
        Self {
            range,
            suppressed: HashSet::new(),
        }
    }

    pub fn suppress(mut self, feature: Feature) -> Self {
        self.suppressed.insert(feature);
        self
    }
}

/// State shared by every file analysed in one run
#[derive(Debug, Default)]
pub struct RunState {
    legacy_notice: AtomicBool,
    cancelled: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop every analysis of this run at its next matcher boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// True exactly once per run.
    fn claim_legacy_notice(&self) -> bool {
        !self.legacy_notice.swap(true, Ordering::AcqRel)
    }
}

pub struct Analyzer<'a> {
    registry: &'a FeatureRegistry,
    config: &'a AnalysisConfig,
    /// Per entry of [`MATCHERS`]: whether any of its features can be reported.
    active: Vec<bool>,
}

impl<'a> Analyzer<'a> {
    pub fn new(registry: &'a FeatureRegistry, config: &'a AnalysisConfig) -> Self {
        let active = MATCHERS
            .iter()
            .map(|matcher| Self::is_active(registry, config, matcher))
            .collect();
        Self {
            registry,
            config,
            active,
        }
    }

    fn is_active(registry: &FeatureRegistry, config: &AnalysisConfig, matcher: &Matcher) -> bool {
        if !config.range.is_configured() {
            return false;
        }
        matcher.features.iter().any(|feature| {
            if config.suppressed.contains(feature) {
                return false;
            }
            registry.get(*feature).is_ok_and(|descriptor| {
                classify(descriptor, &config.range).is_some() || descriptor.invalid_message.is_some()
            })
        })
    }

    pub fn run(&self, stream: &TokenStream, run_state: &RunState, file: Option<&Path>) -> Result<Diagnostics> {
        tracing::debug!(
            file = %file.map(|f| f.display().to_string()).unwrap_or_default(),
            tokens = stream.len(),
            range = %self.config.range,
            "analysing token stream"
        );

        let mut diags = Diagnostics::new();
        if !self.config.range.is_configured() {
            return Ok(diags);
        }
        if stream.profile() == TokenizerProfile::Legacy && run_state.claim_legacy_notice() {
            diags.add(legacy_tokenizer_notice(stream, file));
        }

        let mut skip_until: Vec<Option<usize>> = vec![None; MATCHERS.len()];
        let mut seen: HashSet<SeenKey> = HashSet::new();

        for idx in 0..stream.len() {
            let Some(kind) = stream.kind(idx) else {
                break;
            };
            for &m in matchers_for(kind) {
                if !self.active[m] || skip_until[m].is_some_and(|until| idx <= until) {
                    continue;
                }
                if run_state.is_cancelled() {
                    tracing::debug!(token = idx, "analysis cancelled");
                    return Ok(diags);
                }

                let matcher = &MATCHERS[m];
                for result in (matcher.run)(stream, idx) {
                    if let Some(skip_to) = result.skip_to {
                        skip_until[m] = skip_until[m].max(Some(skip_to));
                    }
                    if self.config.suppressed.contains(&result.feature)
                        || !seen.insert((
                            result.anchor,
                            result.offset,
                            result.feature,
                            result.framing,
                            result.found.clone(),
                        ))
                    {
                        continue;
                    }
                    tracing::trace!(matcher = matcher.name, feature = %result.feature, anchor = result.anchor, "match");

                    let descriptor = self.registry.get(result.feature)?;
                    if let Some(diag) = emit(descriptor, &self.config.range, &result, stream, file) {
                        diags.add(diag);
                    }
                }
            }
        }
        Ok(diags)
    }
}

/// Analyse one stream with the global registry and a fresh run state.
pub fn analyze(stream: &TokenStream, config: &AnalysisConfig) -> Result<Diagnostics> {
    Analyzer::new(FeatureRegistry::global(), config).run(stream, &RunState::new(), None)
}
