//! Escape sequences and interpolation inside string literals
//!
//! A literal may be split over several tokens, so the regexes run on the
//! reconstructed text of the whole literal. Match offsets are mapped back to
//! the token that holds them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::MatchResult;
use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};
use crate::window::{join_text, literal_end, literal_start, locate_offset, next_significant};

/// Any escape; group 1/2 capture the body and closing brace of `\u{...}`.
static UNICODE_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\\(?:u\{([^}\s"'\\]*)(\})?|.)"#).expect("valid unicode escape pattern"));

/// Any escape; group 1 captures a `${...}` embed.
static DOLLAR_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\.|(\$\{[^}]*\}?)").expect("valid dollar brace pattern"));

/// Token range `from..to` holding the body of an escape-processing literal anchored at `anchor`.
fn literal_body(stream: &TokenStream, anchor: usize) -> Option<(usize, usize, usize)> {
    if literal_start(stream, anchor) != anchor {
        return None;
    }
    let end = literal_end(stream, anchor);
    match stream.kind(anchor)? {
        TokenKind::StartHeredoc => Some((anchor + 1, end, end)),
        TokenKind::ConstantEncapsedString => {
            let content = stream.content(anchor);
            let quote = content.trim_start_matches(['b', 'B']).chars().next();
            (quote == Some('"')).then_some((anchor, end + 1, end))
        }
        TokenKind::DoubleQuotedString | TokenKind::Backtick => Some((anchor, end + 1, end)),
        _ => None,
    }
}

fn valid_codepoint(body: &str) -> bool {
    !body.is_empty()
        && body.bytes().all(|b| b.is_ascii_hexdigit())
        && u32::from_str_radix(body, 16).is_ok_and(|cp| cp <= 0x10FFFF)
}

/// `\u{...}` escapes. Malformed bodies get the invalid framing.
pub(super) fn unicode_escape(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let Some((from, to, end)) = literal_body(stream, anchor) else {
        return Vec::new();
    };
    let text = join_text(stream, from, to);
    let mut results = Vec::new();
    for caps in UNICODE_ESCAPE.captures_iter(&text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some((token, inner)) = locate_offset(stream, from, to, whole.start()) else {
            continue;
        };
        let closed = caps.get(2).is_some();
        let result = if closed && valid_codepoint(body.as_str()) {
            MatchResult::new(Feature::NewUnicodeEscape, token)
        } else {
            MatchResult::invalid(Feature::NewUnicodeEscape, token)
        };
        results.push(result.with_found(whole.as_str()).with_offset(inner).with_skip_to(end));
    }
    results
}

/// `"${name}"` and `"${expr}"` embeds.
pub(super) fn dollar_brace_embed(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let Some((from, to, end)) = literal_body(stream, anchor) else {
        return Vec::new();
    };
    let text = join_text(stream, from, to);
    DOLLAR_BRACE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|embed| {
            let (token, inner) = locate_offset(stream, from, to, embed.start())?;
            Some(
                MatchResult::new(Feature::DeprecatedDollarBraceEmbed, token)
                    .with_found(embed.as_str())
                    .with_offset(inner)
                    .with_skip_to(end),
            )
        })
        .collect()
}

/// Closing markers that are indented or share their line with more code.
pub(super) fn flexible_heredoc(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let content = stream.content(anchor);
    let indented = content.starts_with([' ', '\t']);

    let standalone = match stream.kind(anchor + 1) {
        None => true,
        Some(TokenKind::Whitespace) => stream.content(anchor + 1).starts_with(['\n', '\r']),
        Some(TokenKind::Semicolon) => match stream.kind(anchor + 2) {
            None | Some(TokenKind::CloseTag) => true,
            Some(TokenKind::Whitespace) => stream.content(anchor + 2).starts_with(['\n', '\r']),
            _ => false,
        },
        _ => false,
    };

    if indented || !standalone {
        let trailing = next_significant(stream, anchor + 1, None)
            .map(|n| stream.content(n))
            .unwrap_or_default();
        let found = format!("{}{}", content.trim(), trailing);
        vec![MatchResult::new(Feature::NewFlexibleHeredoc, anchor).with_found(found)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{collect, features, stream};
    use crate::matchers::Framing;
    use pretty_assertions::assert_eq;

    const STRING_ANCHORS: &[TokenKind] = &[
        TokenKind::ConstantEncapsedString,
        TokenKind::DoubleQuotedString,
        TokenKind::StartHeredoc,
        TokenKind::Backtick,
    ];

    fn escapes(source: &str) -> Vec<(Framing, String, usize)> {
        let s = stream(source);
        collect(&s, STRING_ANCHORS, unicode_escape)
            .into_iter()
            .map(|r| (r.framing, r.found.unwrap_or_default(), s.get(r.anchor).map_or(0, |t| t.line)))
            .collect()
    }

    #[test]
    fn test_valid_escape_is_version_gated() {
        assert_eq!(
            escapes(r#"<?php echo "smile \u{1F600}";"#),
            vec![(Framing::VersionGated, r"\u{1F600}".to_string(), 1)]
        );
    }

    #[test]
    fn test_malformed_escapes_are_invalid() {
        let found: Vec<Framing> = escapes(r#"<?php echo "\u{}", "\u{zz}", "\u{110000}", "\u{41";"#)
            .into_iter()
            .map(|(framing, _, _)| framing)
            .collect();
        assert_eq!(found, vec![Framing::Invalid; 4]);
    }

    #[test]
    fn test_escapes_in_one_token_keep_their_offsets() {
        let s = stream(r#"<?php echo "\u{41}\u{1F600}", "\u{} \u{zz}";"#);
        let found: Vec<(usize, usize, Framing)> = collect(&s, STRING_ANCHORS, unicode_escape)
            .into_iter()
            .map(|r| (r.anchor, r.offset, r.framing))
            .collect();
        let first = s.tokens().iter().position(|t| t.content.starts_with("\"\\u{41}")).unwrap();
        let second = s.tokens().iter().position(|t| t.content.starts_with("\"\\u{}")).unwrap();
        assert_eq!(
            found,
            vec![
                (first, 1, Framing::VersionGated),
                (first, 7, Framing::VersionGated),
                (second, 1, Framing::Invalid),
                (second, 6, Framing::Invalid),
            ]
        );
    }

    #[test]
    fn test_single_quotes_and_escaped_backslash_are_ignored() {
        assert!(escapes(r#"<?php echo '\u{41}', "\\u{41}", "\u0041";"#).is_empty());
    }

    #[test]
    fn test_escape_in_multiline_literal_maps_to_its_line() {
        let found = escapes("<?php echo \"first\nsecond \\u{41}\nthird\";");
        assert_eq!(found, vec![(Framing::VersionGated, r"\u{41}".to_string(), 2)]);
    }

    #[test]
    fn test_escape_in_heredoc() {
        let found = escapes("<?php echo <<<EOT\nline\n\\u{1F600}\nEOT;\n");
        assert_eq!(found, vec![(Framing::VersionGated, r"\u{1F600}".to_string(), 3)]);
        assert!(escapes("<?php echo <<<'EOT'\n\\u{1F600}\nEOT;\n").is_empty());
    }

    #[test]
    fn test_dollar_brace_embed() {
        let s = stream(r#"<?php echo "a ${name} b {$ok} c ${arr['k']} \${no}";"#);
        let results = collect(&s, &[TokenKind::DoubleQuotedString], dollar_brace_embed);
        let found: Vec<Option<&str>> = results.iter().map(|r| r.found.as_deref()).collect();
        assert_eq!(found, vec![Some("${name}"), Some("${arr['k']}")]);
    }

    #[test]
    fn test_flexible_heredoc() {
        let detect = |source: &str| {
            let s = stream(source);
            features(&collect(&s, &[TokenKind::EndHeredoc, TokenKind::EndNowdoc], flexible_heredoc))
        };
        assert!(detect("<?php $a = <<<EOT\ntext\nEOT;\n").is_empty());
        assert!(detect("<?php foo(<<<EOT\ntext\nEOT\n);\n").is_empty());
        assert_eq!(detect("<?php $a = <<<EOT\n  text\n  EOT;\n"), vec![Feature::NewFlexibleHeredoc]);
        assert_eq!(detect("<?php foo(<<<'EOT'\ntext\nEOT, $b);\n"), vec![Feature::NewFlexibleHeredoc]);
    }
}
