//! phpcompat - PHP cross-version compatibility checker
//!
//! # Overview
//! Scans a tokenized PHP file for constructs whose availability changed
//! between PHP releases and reports the ones that do not work on every
//! version of a target range.
//!
//! # Author
//! Tane Channel Technology

pub mod analyzer;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod lexer;
pub mod matchers;
pub mod version;
pub mod window;

use std::path::Path;

pub use analyzer::{analyze, AnalysisConfig, Analyzer, RunState};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CompatError, Result};
pub use features::{Feature, FeatureRegistry};
pub use lexer::{tokenize, TokenStream, TokenizerProfile};
pub use version::{Version, VersionRange};

/// Tokenize PHP source and analyse it with the global registry
pub fn check_source(
    source: &str,
    file: Option<&Path>,
    config: &AnalysisConfig,
    profile: TokenizerProfile,
) -> Result<Diagnostics> {
    let stream = tokenize(source, profile);
    Analyzer::new(FeatureRegistry::global(), config).run(&stream, &RunState::new(), file)
}

/// Read and check a PHP file, sharing `run_state` with the rest of the run
pub fn check_file(
    path: &Path,
    config: &AnalysisConfig,
    profile: TokenizerProfile,
    run_state: &RunState,
) -> Result<Diagnostics> {
    let source = std::fs::read_to_string(path)?;
    let stream = tokenize(&source, profile);
    Analyzer::new(FeatureRegistry::global(), config).run(&stream, run_state, Some(path))
}
