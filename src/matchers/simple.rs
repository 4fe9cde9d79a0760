//! Single-token features
//!
//! The anchor token is the feature. A rule may add a content or light
//! structural check before it fires.

use super::MatchResult;
use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};
use crate::window::{next_significant, prev_significant};

pub(super) struct SimpleRule {
    pub kind: TokenKind,
    pub feature: Feature,
    pub accept: fn(&TokenStream, usize) -> bool,
    /// Quote the token content in the message.
    pub quote: bool,
}

pub(super) const SIMPLE_RULES: &[SimpleRule] = &[
    SimpleRule {
        kind: TokenKind::Goto,
        feature: Feature::NewGoto,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Trait,
        feature: Feature::NewTraits,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::LNumber,
        feature: Feature::NewBinaryLiteral,
        accept: |stream, idx| has_prefix(stream.content(idx), "0b"),
        quote: true,
    },
    SimpleRule {
        kind: TokenKind::Yield,
        feature: Feature::NewGenerators,
        accept: inside_function,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::DoubleColon,
        feature: Feature::NewClassNameResolution,
        accept: |stream, idx| {
            next_significant(stream, idx + 1, None)
                .is_some_and(|n| stream.content(n).eq_ignore_ascii_case("class"))
        },
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Pow,
        feature: Feature::NewPow,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::PowEqual,
        feature: Feature::NewPowEqual,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Ellipsis,
        feature: Feature::NewEllipsis,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Coalesce,
        feature: Feature::NewCoalesce,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Spaceship,
        feature: Feature::NewSpaceship,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::YieldFrom,
        feature: Feature::NewYieldFrom,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::CoalesceEqual,
        feature: Feature::NewCoalesceEqual,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Fn,
        feature: Feature::NewArrowFunction,
        accept: |stream, idx| {
            next_significant(stream, idx + 1, None).is_some_and(|n| {
                matches!(
                    stream.kind(n),
                    Some(TokenKind::OpenParenthesis | TokenKind::BitwiseAnd)
                )
            })
        },
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::LNumber,
        feature: Feature::NewNumericLiteralSeparator,
        accept: |stream, idx| stream.content(idx).contains('_'),
        quote: true,
    },
    SimpleRule {
        kind: TokenKind::DNumber,
        feature: Feature::NewNumericLiteralSeparator,
        accept: |stream, idx| stream.content(idx).contains('_'),
        quote: true,
    },
    SimpleRule {
        kind: TokenKind::NullsafeObjectOperator,
        feature: Feature::NewNullsafeOperator,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Match,
        feature: Feature::NewMatchExpression,
        accept: match_with_body,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Enum,
        feature: Feature::NewEnum,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::Readonly,
        feature: Feature::NewReadonly,
        accept: |_, _| true,
        quote: false,
    },
    SimpleRule {
        kind: TokenKind::LNumber,
        feature: Feature::NewExplicitOctal,
        accept: |stream, idx| has_prefix(stream.content(idx), "0o"),
        quote: true,
    },
    SimpleRule {
        kind: TokenKind::UnsetCast,
        feature: Feature::RemovedUnsetCast,
        accept: |_, _| true,
        quote: true,
    },
    SimpleRule {
        kind: TokenKind::DoubleCast,
        feature: Feature::RemovedRealCast,
        accept: |stream, idx| cast_name(stream.content(idx)) == "real",
        quote: true,
    },
];

/// Every kind in [`SIMPLE_RULES`], without repeats.
pub(super) const SIMPLE_ANCHORS: &[TokenKind] = &[
    TokenKind::Goto,
    TokenKind::Trait,
    TokenKind::LNumber,
    TokenKind::DNumber,
    TokenKind::Yield,
    TokenKind::DoubleColon,
    TokenKind::Pow,
    TokenKind::PowEqual,
    TokenKind::Ellipsis,
    TokenKind::Coalesce,
    TokenKind::Spaceship,
    TokenKind::YieldFrom,
    TokenKind::CoalesceEqual,
    TokenKind::Fn,
    TokenKind::NullsafeObjectOperator,
    TokenKind::Match,
    TokenKind::Enum,
    TokenKind::Readonly,
    TokenKind::UnsetCast,
    TokenKind::DoubleCast,
];

/// Every feature in [`SIMPLE_RULES`], without repeats.
pub(super) const SIMPLE_FEATURES: &[Feature] = &[
    Feature::NewGoto,
    Feature::NewTraits,
    Feature::NewBinaryLiteral,
    Feature::NewGenerators,
    Feature::NewClassNameResolution,
    Feature::NewPow,
    Feature::NewPowEqual,
    Feature::NewEllipsis,
    Feature::NewCoalesce,
    Feature::NewSpaceship,
    Feature::NewYieldFrom,
    Feature::NewCoalesceEqual,
    Feature::NewArrowFunction,
    Feature::NewNumericLiteralSeparator,
    Feature::NewNullsafeOperator,
    Feature::NewMatchExpression,
    Feature::NewEnum,
    Feature::NewReadonly,
    Feature::NewExplicitOctal,
    Feature::RemovedUnsetCast,
    Feature::RemovedRealCast,
];

fn has_prefix(content: &str, prefix: &str) -> bool {
    content.len() > prefix.len() && content[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// `(real)`, `( REAL )` -> `real`
fn cast_name(content: &str) -> String {
    content
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_ascii_lowercase()
}

fn inside_function(stream: &TokenStream, idx: usize) -> bool {
    stream
        .enclosing_scope(idx)
        .and_then(|scope| stream.kind(scope.owner))
        .is_some_and(|kind| matches!(kind, TokenKind::Function | TokenKind::Fn))
}

/// `match (...) {`
fn match_with_body(stream: &TokenStream, idx: usize) -> bool {
    let Some(open) = next_significant(stream, idx + 1, None) else {
        return false;
    };
    if stream.kind(open) != Some(TokenKind::OpenParenthesis) {
        return false;
    }
    let Some(close) = stream.partner(open) else {
        tracing::debug!(token = open, "match condition without closing parenthesis");
        return false;
    };
    // `->match(` and `::match(` are method calls.
    let member = idx
        .checked_sub(1)
        .and_then(|i| prev_significant(stream, i, None))
        .and_then(|p| stream.kind(p));
    !matches!(
        member,
        Some(TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator | TokenKind::DoubleColon)
    ) && next_significant(stream, close + 1, None).and_then(|n| stream.kind(n))
        == Some(TokenKind::OpenCurlyBracket)
}

pub(super) fn run(stream: &TokenStream, idx: usize) -> Vec<MatchResult> {
    let Some(kind) = stream.kind(idx) else {
        return Vec::new();
    };
    SIMPLE_RULES
        .iter()
        .filter(|rule| rule.kind == kind && (rule.accept)(stream, idx))
        .map(|rule| {
            let result = MatchResult::new(rule.feature, idx);
            if rule.quote {
                result.with_found(stream.content(idx))
            } else {
                result
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{collect, features, stream};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn detect(source: &str) -> Vec<Feature> {
        let s = stream(source);
        features(&collect(&s, SIMPLE_ANCHORS, run))
    }

    #[test]
    fn test_anchor_and_feature_lists_match_rules() {
        let kinds: HashSet<TokenKind> = SIMPLE_RULES.iter().map(|r| r.kind).collect();
        let anchors: HashSet<TokenKind> = SIMPLE_ANCHORS.iter().copied().collect();
        assert_eq!(kinds, anchors);
        assert_eq!(anchors.len(), SIMPLE_ANCHORS.len());

        let from_rules: HashSet<Feature> = SIMPLE_RULES.iter().map(|r| r.feature).collect();
        let declared: HashSet<Feature> = SIMPLE_FEATURES.iter().copied().collect();
        assert_eq!(from_rules, declared);
        assert_eq!(declared.len(), SIMPLE_FEATURES.len());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            detect("<?php $a ??= $b ?? $c <=> $d ** 2; $e **= 2; $f?->g;"),
            vec![
                Feature::NewCoalesceEqual,
                Feature::NewCoalesce,
                Feature::NewSpaceship,
                Feature::NewPow,
                Feature::NewPowEqual,
                Feature::NewNullsafeOperator,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(
            detect("<?php $a = [0b101, 0o17, 1_000, 1_0.5, 017, 10];"),
            vec![
                Feature::NewBinaryLiteral,
                Feature::NewExplicitOctal,
                Feature::NewNumericLiteralSeparator,
                Feature::NewNumericLiteralSeparator,
            ]
        );
    }

    #[test]
    fn test_structural_checks() {
        assert_eq!(
            detect("<?php Foo::class; Foo::BAR; $f = fn($x) => $x; $o->fn; $m = match($x) { default => 1 }; $o->match($y);"),
            vec![
                Feature::NewClassNameResolution,
                Feature::NewArrowFunction,
                Feature::NewMatchExpression,
            ]
        );
    }

    #[test]
    fn test_yield_requires_function_scope() {
        assert_eq!(detect("<?php function g() { yield 1; }"), vec![Feature::NewGenerators]);
        assert_eq!(detect("<?php yield 1;"), Vec::<Feature>::new());
        assert_eq!(
            detect("<?php function g() { yield from h(); }"),
            vec![Feature::NewYieldFrom]
        );
    }

    #[test]
    fn test_casts_quote_found_text() {
        let s = stream("<?php $a = (unset) $b; $c = (real) $d; $e = (double) $f;");
        let results = collect(&s, SIMPLE_ANCHORS, run);
        let found: Vec<(Feature, Option<&str>)> = results
            .iter()
            .map(|r| (r.feature, r.found.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![
                (Feature::RemovedUnsetCast, Some("(unset)")),
                (Feature::RemovedRealCast, Some("(real)")),
            ]
        );
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            detect("<?php trait T {} enum E {} class C { public readonly int $x; } goto end;"),
            vec![
                Feature::NewTraits,
                Feature::NewEnum,
                Feature::NewReadonly,
                Feature::NewGoto,
            ]
        );
    }
}
