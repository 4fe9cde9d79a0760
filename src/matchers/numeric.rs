//! Operand checks: bit shifts, `break`/`continue` levels, `empty()`
//! arguments and parameter lists

use std::collections::HashSet;

use super::MatchResult;
use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};
use crate::window::{
    evaluate_numeric_literal, is_variable_expression, next_significant, normalized_text, statement_end,
};

/// Operators binding looser than a shift; they end its right operand.
fn ends_shift_operand(kind: TokenKind) -> bool {
    kind.is_assignment()
        || kind.is_closer()
        || matches!(
            kind,
            TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::CloseTag
                | TokenKind::DoubleArrow
                | TokenKind::InlineThen
                | TokenKind::Colon
                | TokenKind::Coalesce
                | TokenKind::Sl
                | TokenKind::Sr
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::IsSmallerOrEqual
                | TokenKind::IsGreaterOrEqual
                | TokenKind::IsEqual
                | TokenKind::IsNotEqual
                | TokenKind::IsIdentical
                | TokenKind::IsNotIdentical
                | TokenKind::Spaceship
                | TokenKind::BitwiseAnd
                | TokenKind::BitwiseOr
                | TokenKind::BitwiseXor
                | TokenKind::BooleanAnd
                | TokenKind::BooleanOr
                | TokenKind::LogicalAnd
                | TokenKind::LogicalOr
                | TokenKind::LogicalXor
        )
}

/// `1 << -1`, `$a >>= -2`
pub(super) fn negative_bitshift(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let mut idx = anchor + 1;
    while let Some(kind) = stream.kind(idx) {
        if ends_shift_operand(kind) {
            break;
        }
        if kind.is_opener() {
            match stream.partner(idx) {
                Some(close) if close > idx => idx = close,
                _ => break,
            }
        }
        idx += 1;
    }

    let negative = evaluate_numeric_literal(stream, anchor + 1, idx, true).is_some_and(|n| n.trunc() < 0.0);
    if negative {
        vec![MatchResult::new(Feature::ForbiddenNegativeBitshift, anchor)
            .with_found(normalized_text(stream, anchor + 1, idx))]
    } else {
        Vec::new()
    }
}

/// `break $n;` and `continue 0;`
pub(super) fn break_continue(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let end = statement_end(stream, anchor);
    if next_significant(stream, anchor + 1, Some(end)).is_none() {
        return Vec::new();
    }
    let found = normalized_text(stream, anchor + 1, end);

    let variable = (anchor + 1..end).any(|i| stream.kind(i) == Some(TokenKind::Variable));
    if variable {
        return vec![MatchResult::new(Feature::RemovedBreakContinueVariable, anchor).with_found(found)];
    }
    if evaluate_numeric_literal(stream, anchor + 1, end, false) == Some(0.0) {
        return vec![MatchResult::new(Feature::RemovedBreakContinueZero, anchor).with_found(found)];
    }
    Vec::new()
}

/// `empty(trim($x))`, `empty(CONSTANT)`
pub(super) fn empty_non_variable(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let Some(open) = next_significant(stream, anchor + 1, None) else {
        return Vec::new();
    };
    if stream.kind(open) != Some(TokenKind::OpenParenthesis) {
        return Vec::new();
    }
    let Some(close) = stream.partner(open).filter(|&c| c > open) else {
        tracing::debug!(token = open, "empty() without closing parenthesis");
        return Vec::new();
    };
    if next_significant(stream, open + 1, Some(close)).is_none() {
        return Vec::new();
    }

    let nesting = stream.get(open).map_or(0, |t| t.nesting + 1);
    if is_variable_expression(stream, open + 1, close, nesting) {
        return Vec::new();
    }
    vec![MatchResult::new(Feature::NewEmptyNonVariable, anchor)
        .with_found(normalized_text(stream, open + 1, close))]
}

/// Parameter list owned by the `function`/`fn` keyword at `anchor`.
fn parameter_list(stream: &TokenStream, anchor: usize) -> Option<(usize, usize)> {
    if let Some(parens) = stream.scope_of(anchor).and_then(|scope| scope.parens) {
        return Some(parens);
    }
    // Declarations without a body, such as interface methods.
    let mut idx = anchor;
    for _ in 0..3 {
        idx = next_significant(stream, idx + 1, None)?;
        let token = stream.get(idx)?;
        if token.kind == TokenKind::OpenParenthesis {
            if token.paren_owner != Some(anchor) {
                return None;
            }
            let close = stream.partner(idx).filter(|&close| close > idx)?;
            return Some((idx, close));
        }
    }
    None
}

/// `function f($a, $a)`
pub(super) fn duplicate_parameters(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let Some((open, close)) = parameter_list(stream, anchor) else {
        return Vec::new();
    };
    let depth = stream.get(open).map_or(0, |t| t.nesting + 1);

    let mut seen = HashSet::new();
    let mut slot_has_name = false;
    for idx in open + 1..close {
        let Some(token) = stream.get(idx) else {
            break;
        };
        if token.nesting != depth {
            continue;
        }
        match token.kind {
            TokenKind::Comma => slot_has_name = false,
            // Default values may mention other variables.
            TokenKind::Variable if !slot_has_name => {
                slot_has_name = true;
                if !seen.insert(token.content.as_str()) {
                    return vec![MatchResult::new(Feature::ForbiddenDuplicateParameters, idx)
                        .with_found(token.content.clone())];
                }
            }
            _ => {}
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{collect, features, nth, stream};
    use pretty_assertions::assert_eq;

    fn found(results: &[MatchResult]) -> Vec<(Feature, Option<&str>)> {
        results.iter().map(|r| (r.feature, r.found.as_deref())).collect()
    }

    #[test]
    fn test_negative_bitshift() {
        let s = stream("<?php $a = 1 << -1; $b >>= -(2); $c = 1 << -1 + 2; $d = 1 >> 3; $e = 8 << -0.5;");
        let results = collect(&s, &[TokenKind::Sl, TokenKind::Sr, TokenKind::SlEqual, TokenKind::SrEqual], negative_bitshift);
        assert_eq!(
            found(&results),
            vec![
                (Feature::ForbiddenNegativeBitshift, Some("-1")),
                (Feature::ForbiddenNegativeBitshift, Some("-(2)")),
            ]
        );
    }

    #[test]
    fn test_negative_bitshift_operand_stops_at_looser_operator() {
        let s = stream("<?php $a = 1 << -1 ?: 0; foo(1 << -2, 3);");
        let results = collect(&s, &[TokenKind::Sl], negative_bitshift);
        assert_eq!(features(&results), vec![Feature::ForbiddenNegativeBitshift; 2]);
    }

    #[test]
    fn test_break_continue_arguments() {
        let s = stream("<?php while (1) { break $n; continue 0; break 2; continue; break (0); }");
        let results = collect(&s, &[TokenKind::Break, TokenKind::Continue], break_continue);
        assert_eq!(
            found(&results),
            vec![
                (Feature::RemovedBreakContinueVariable, Some("$n")),
                (Feature::RemovedBreakContinueZero, Some("0")),
                (Feature::RemovedBreakContinueZero, Some("(0)")),
            ]
        );
    }

    #[test]
    fn test_empty_with_expression() {
        let s = stream("<?php empty($a); empty($a['k']->b); empty(trim($x)); empty(FOO); empty($o->m()); empty();");
        let results = collect(&s, &[TokenKind::Empty], empty_non_variable);
        assert_eq!(
            found(&results),
            vec![
                (Feature::NewEmptyNonVariable, Some("trim($x)")),
                (Feature::NewEmptyNonVariable, Some("FOO")),
                (Feature::NewEmptyNonVariable, Some("$o->m()")),
            ]
        );
    }

    #[test]
    fn test_duplicate_parameters() {
        let s = stream("<?php function f($a, int $b = 1, &...$a) {}");
        let results = duplicate_parameters(&s, nth(&s, "function", 0));
        assert_eq!(found(&results), vec![(Feature::ForbiddenDuplicateParameters, Some("$a"))]);
        assert_eq!(results[0].anchor, nth(&s, "$a", 1));
    }

    #[test]
    fn test_parameters_in_defaults_and_bodies_are_not_duplicates() {
        let s = stream("<?php $f = function ($a, $b = [1, 2]) use ($a) { $a = 1; }; $g = fn($x) => $x;");
        assert!(collect(&s, &[TokenKind::Function, TokenKind::Fn], duplicate_parameters).is_empty());
    }

    #[test]
    fn test_duplicate_parameters_without_body() {
        let s = stream("<?php interface I { public function m($x, $X); public function n($x, $x); }");
        let results = collect(&s, &[TokenKind::Function], duplicate_parameters);
        assert_eq!(found(&results), vec![(Feature::ForbiddenDuplicateParameters, Some("$x"))]);
    }
}
