use pretty_assertions::assert_eq;
use std::path::Path;

use phpcompat::diagnostics::{emit, render, template_for, Diagnostics, Severity};
use phpcompat::features::{version_info, Feature, FeatureRegistry, Transition};
use phpcompat::matchers::MatchResult;
use phpcompat::{check_source, tokenize, AnalysisConfig, TokenizerProfile, Version, VersionRange};

fn range(raw: &str) -> VersionRange {
    VersionRange::parse(raw).unwrap()
}

#[test]
fn test_removed_message_mentions_deprecation_and_alternative() {
    let descriptor = FeatureRegistry::global().get(Feature::RemovedRealCast).unwrap();
    let transition = version_info(descriptor, &range("7.0-8.1")).relevant().unwrap();
    assert_eq!(
        transition,
        Transition::Removed {
            since: Version::new(8, 0),
            deprecated: Some(Version::new(7, 4)),
        }
    );
    let template = template_for(descriptor, &transition);
    assert_eq!(
        render(&template, descriptor, transition.version(), Some("(real)")),
        "The (real) cast is deprecated since PHP 7.4 and removed since PHP 8.0; Use (float) instead. Found: (real)"
    );
}

#[test]
fn test_not_introduced_message_has_no_alternative() {
    let descriptor = FeatureRegistry::global().get(Feature::NewNullsafeOperator).unwrap();
    let transition = version_info(descriptor, &range("7.4")).relevant().unwrap();
    let message = render(&template_for(descriptor, &transition), descriptor, transition.version(), None);
    assert!(message.ends_with("is not present in PHP version 7.4 or earlier"));
}

#[test]
fn test_emit_carries_positional_arguments() {
    let stream = tokenize("<?php $a ??= 1;", TokenizerProfile::Modern);
    let descriptor = FeatureRegistry::global().get(Feature::NewCoalesceEqual).unwrap();
    let anchor = stream.tokens().iter().position(|t| t.content == "??=").unwrap();
    let result = MatchResult::new(Feature::NewCoalesceEqual, anchor).with_found("??=");

    let diag = emit(descriptor, &range("7.0"), &result, &stream, Some(Path::new("a.php"))).unwrap();
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.feature, "NewCoalesceEqual");
    assert_eq!(diag.args, vec![descriptor.description.to_string(), "7.3".to_string(), "??=".to_string()]);
    assert_eq!((diag.span.line, diag.span.column, diag.span.end_column), (1, 10, 12));

    assert!(emit(descriptor, &range("7.4"), &result, &stream, None).is_none());
}

#[test]
fn test_json_output() {
    let config = AnalysisConfig::new(range("7.3"));
    let diags = check_source("<?php $a ??= 1;", Some(Path::new("a.php")), &config, TokenizerProfile::Modern).unwrap();
    let json: serde_json::Value = serde_json::from_str(&diags.to_json()).unwrap();
    let first = &json["diagnostics"][0];
    assert_eq!(first["code"], "PHPC-NEW-COALESCE-EQUAL");
    assert_eq!(first["severity"], "error");
    assert_eq!(first["span"]["file"], "a.php");
    assert_eq!(first["span"]["line"], 1);
}

#[test]
fn test_counts_and_merge() {
    let config = AnalysisConfig::new(range("7.4-8.2"));
    let mut diags = Diagnostics::new();
    diags.extend(check_source("<?php $a = (real) $b;", None, &config, TokenizerProfile::Modern).unwrap());
    diags.extend(check_source("<?php echo \"${x}\";", None, &config, TokenizerProfile::Modern).unwrap());
    assert_eq!(diags.error_count(), 1);
    assert_eq!(diags.warning_count(), 1);
    assert!(diags.has_errors());
}

#[test]
fn test_warnings_alone_are_not_errors() {
    let config = AnalysisConfig::new(range("8.2"));
    let diags = check_source("<?php echo \"${x}\";", None, &config, TokenizerProfile::Modern).unwrap();
    assert_eq!(diags.len(), 1);
    assert!(!diags.has_errors());
    assert!(diags.to_text().contains("warning: Embedding variables in strings using ${...} is deprecated since PHP 8.2; Use {$...} instead. Found: ${x}"));
}
