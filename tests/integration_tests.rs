//! Integration tests for phpcompat

use pretty_assertions::assert_eq;
use std::path::Path;

use phpcompat::{check_source, AnalysisConfig, Diagnostic, Severity, TokenizerProfile, VersionRange};

fn config(raw: &str) -> AnalysisConfig {
    AnalysisConfig::new(VersionRange::parse(raw).unwrap())
}

fn check(source: &str, range: &str) -> Vec<Diagnostic> {
    check_source(source, None, &config(range), TokenizerProfile::Modern)
        .unwrap()
        .diagnostics
}

fn codes(source: &str, range: &str) -> Vec<String> {
    check(source, range).into_iter().map(|d| d.code).collect()
}

/// list() with a repeated target on PHP 7.0 only
#[test]
fn test_list_assignment_order() {
    let diags = check("<?php list($a, $b, $a) = [1, 2, 3];", "7.0-7.0");
    assert_eq!(diags.len(), 1);
    let diag = &diags[0];
    assert_eq!(diag.code, "PHPC-ASSIGNMENT-ORDER");
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!((diag.span.line, diag.span.column), (1, 7));
    assert!(diag.message.contains("make sure all variables in list() are unique"));
    assert!(diag.message.ends_with("Found: $a"));
}

#[test]
fn test_list_assignment_order_nested_reports_once() {
    let source = "<?php\nlist($a, list($b, list($c, $a))) = $x;\nlist($d, $e) = $y;\n";
    assert_eq!(codes(source, "7.0"), vec!["PHPC-ASSIGNMENT-ORDER"]);
}

/// ??= on 7.3 and on 7.4-8.0
#[test]
fn test_coalesce_equal() {
    let diags = check("<?php $a ??= 'default';", "7.3-7.3");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "PHPC-NEW-COALESCE-EQUAL");
    assert_eq!(
        diags[0].message,
        "The null coalescing assignment operator (??=) is not present in PHP version 7.3 or earlier"
    );

    assert!(check("<?php $a ??= 'default';", "7.4-8.0").is_empty());
}

/// #[Foo] under both tokenizer profiles
#[test]
fn test_attribute_across_tokenizers() {
    let source = "<?php\n#[Foo]\nclass A {}\n";
    let modern = check(source, "7.4-7.4");
    assert_eq!(modern.len(), 1);
    assert_eq!(modern[0].code, "PHPC-NEW-ATTRIBUTES");
    assert!(check(source, "8.0-8.0").is_empty());

    let legacy = check_source(source, None, &config("7.4-7.4"), TokenizerProfile::Legacy)
        .unwrap()
        .diagnostics;
    let attribute: Vec<&Diagnostic> = legacy.iter().filter(|d| d.code == "PHPC-NEW-ATTRIBUTES").collect();
    assert_eq!(attribute.len(), 1);
    assert_eq!(
        (attribute[0].span.line, attribute[0].span.column, &attribute[0].message),
        (modern[0].span.line, modern[0].span.column, &modern[0].message)
    );
    assert!(legacy.iter().any(|d| d.code == "PHPC-LEGACY-TOKENIZER"));
}

#[test]
fn test_unicode_escape_versions() {
    let source = "<?php echo \"\\u{1F600}\";";
    assert!(check(source, "7.0-").is_empty());
    assert_eq!(codes(source, "5.6"), vec!["PHPC-NEW-UNICODE-ESCAPE"]);

    let empty = "<?php echo \"\\u{}\";";
    assert_eq!(codes(empty, "7.0-"), vec!["PHPC-NEW-UNICODE-ESCAPE-INVALID"]);
    assert_eq!(codes(empty, "5.6"), vec!["PHPC-NEW-UNICODE-ESCAPE-INVALID"]);
}

#[test]
fn test_unconfigured_range_reports_nothing() {
    let source = r#"<?php
$a ??= $b?->c;
list($x, $x) = [1, 2];
echo "\u{}", 1 << -1;
#[Attr]
function f($p, $p) { break 0; }
"#;
    let diags = check_source(source, None, &AnalysisConfig::default(), TokenizerProfile::Modern).unwrap();
    assert!(diags.is_empty());
}

#[test]
fn test_analysis_is_deterministic() {
    let source = r#"<?php
$x = $y ?? throw new Exception();
$s = "${name} \u{41}";
$o = (new Foo)->bar();
$v = match ($k) { 1 => 'a', default => 'b' };
"#;
    assert_eq!(check(source, "5.3-"), check(source, "5.3-"));
}

#[test]
fn test_deprecation_and_removal() {
    let source = "<?php $a = (real) $b; $s = \"${x}\";";
    let warnings = check(source, "7.4-8.2");
    let summary: Vec<(String, Severity)> = warnings.iter().map(|d| (d.code.clone(), d.severity)).collect();
    assert_eq!(
        summary,
        vec![
            ("PHPC-REMOVED-REAL-CAST".to_string(), Severity::Error),
            ("PHPC-DEPRECATED-DOLLAR-BRACE-EMBED".to_string(), Severity::Warning),
        ]
    );
    assert!(warnings[0].message.contains("Use (float) instead"));
}

#[test]
fn test_modern_php_on_old_target() {
    let source = r#"<?php
enum Suit { case Hearts; }
final class Point {
    public function __construct(public readonly int $x = 1_000) {}
}
$f = fn($v) => $v ** 2;
$n = 0o17;
"#;
    let found = codes(source, "7.0");
    for code in [
        "PHPC-NEW-ENUM",
        "PHPC-NEW-READONLY",
        "PHPC-NEW-NUMERIC-LITERAL-SEPARATOR",
        "PHPC-NEW-ARROW-FUNCTION",
        "PHPC-NEW-EXPLICIT-OCTAL",
    ] {
        assert!(found.iter().any(|c| c == code), "missing {code} in {found:?}");
    }
    assert!(!found.iter().any(|c| c == "PHPC-NEW-POW"));
}

#[test]
fn test_file_path_in_span() {
    let diags = check_source(
        "<?php $a ??= 1;",
        Some(Path::new("src/app.php")),
        &config("7.3"),
        TokenizerProfile::Modern,
    )
    .unwrap();
    assert_eq!(diags.diagnostics[0].span.file.as_deref(), Some("src/app.php"));
    assert_eq!(
        diags.to_text(),
        "[PHPC-NEW-COALESCE-EQUAL] src/app.php:1:10 error: The null coalescing assignment operator (??=) is not present in PHP version 7.3 or earlier\n"
    );
}

#[test]
fn test_short_list_as_if_body() {
    let source = "<?php if ($c) [$a, $a] = $x;";
    assert_eq!(codes(source, "7.1"), vec!["PHPC-ASSIGNMENT-ORDER"]);
    assert_eq!(codes(source, "7.0"), vec!["PHPC-NEW-SHORT-LIST", "PHPC-ASSIGNMENT-ORDER"]);
}

/// A bracket without a partner only stops the matcher that needed it
#[test]
fn test_unbalanced_bracket_keeps_later_diagnostics() {
    let source = "<?php list($a, $a = $x;\n$b ??= 1;\n";
    let diags = check(source, "7.3");
    let found: Vec<(&str, usize)> = diags.iter().map(|d| (d.code.as_str(), d.span.line)).collect();
    assert_eq!(found, vec![("PHPC-NEW-COALESCE-EQUAL", 2)]);

    let call = "<?php foo(list($a, $a);\n$b ??= 1;\n";
    assert!(codes(call, "7.3").iter().any(|c| c == "PHPC-NEW-COALESCE-EQUAL"));
}

/// Several attributes on one line under both tokenizer profiles
#[test]
fn test_attributes_sharing_a_line_across_tokenizers() {
    let source = "<?php\n#[A] #[B]\nfunction f() {}\n";
    let positions = |profile| -> Vec<(usize, usize, String)> {
        check_source(source, None, &config("7.4"), profile)
            .unwrap()
            .diagnostics
            .into_iter()
            .filter(|d| d.code == "PHPC-NEW-ATTRIBUTES")
            .map(|d| (d.span.line, d.span.column, d.message))
            .collect()
    };
    let modern = positions(TokenizerProfile::Modern);
    let columns: Vec<(usize, usize)> = modern.iter().map(|(line, column, _)| (*line, *column)).collect();
    assert_eq!(columns, vec![(2, 1), (2, 6)]);
    assert!(modern[1].2.ends_with("Found: #[B]"));
    assert_eq!(positions(TokenizerProfile::Legacy), modern);
}
