//! Keywords in expression position: `throw` and `new`

use super::MatchResult;
use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};
use crate::window::{is_ternary_else, next_significant, prev_significant, statement_end};

fn prev_code(stream: &TokenStream, idx: usize) -> Option<usize> {
    idx.checked_sub(1).and_then(|i| prev_significant(stream, i, None))
}

/// Whether the token at `prev` puts the following keyword in expression position.
fn opens_expression(stream: &TokenStream, prev: usize) -> bool {
    let Some(kind) = stream.kind(prev) else {
        return false;
    };
    match kind {
        TokenKind::Colon => is_ternary_else(stream, prev),
        TokenKind::Coalesce
        | TokenKind::InlineThen
        | TokenKind::DoubleArrow
        | TokenKind::OpenParenthesis
        | TokenKind::Comma
        | TokenKind::BooleanAnd
        | TokenKind::BooleanOr
        | TokenKind::LogicalAnd
        | TokenKind::LogicalOr
        | TokenKind::LogicalXor => true,
        _ => kind.is_assignment(),
    }
}

/// Operators after a grouping parenthesis that consume its value.
fn consumes_group(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Coalesce
            | TokenKind::InlineThen
            | TokenKind::BooleanAnd
            | TokenKind::BooleanOr
            | TokenKind::LogicalAnd
            | TokenKind::LogicalOr
            | TokenKind::LogicalXor
            | TokenKind::Concat
            | TokenKind::ObjectOperator
            | TokenKind::NullsafeObjectOperator
    )
}

/// `throw` used as an expression (`$x ?? throw ...`, `fn() => throw ...`).
pub(super) fn throw_expression(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let end = statement_end(stream, anchor);

    let by_prefix = (anchor..=end).find(|&idx| {
        stream.kind(idx) == Some(TokenKind::Throw)
            && prev_code(stream, idx).is_some_and(|prev| opens_expression(stream, prev))
    });

    // `(throw $e) ?? ...` and the like
    let by_suffix = || {
        let grouped = stream.kind(end) == Some(TokenKind::CloseParenthesis)
            && stream.get(end).is_some_and(|t| t.paren_owner.is_none());
        grouped
            && next_significant(stream, end + 1, None)
                .and_then(|n| stream.kind(n))
                .is_some_and(consumes_group)
    };

    match by_prefix {
        Some(idx) => vec![MatchResult::new(Feature::NewThrowExpression, idx).with_skip_to(end)],
        None if by_suffix() => vec![MatchResult::new(Feature::NewThrowExpression, anchor).with_skip_to(end)],
        None => Vec::new(),
    }
}

fn is_member_access(kind: Option<TokenKind>) -> bool {
    matches!(
        kind,
        Some(
            TokenKind::ObjectOperator
                | TokenKind::NullsafeObjectOperator
                | TokenKind::DoubleColon
                | TokenKind::OpenSquareBracket
        )
    )
}

/// Last token of the `new` expression's class reference and argument list.
fn instantiation_end(stream: &TokenStream, anchor: usize) -> Option<usize> {
    let mut idx = next_significant(stream, anchor + 1, None)?;
    let mut last = anchor;
    loop {
        match stream.kind(idx)? {
            TokenKind::String
            | TokenKind::NsSeparator
            | TokenKind::Variable
            | TokenKind::Static
            | TokenKind::Namespace => last = idx,
            TokenKind::OpenParenthesis => return stream.partner(idx),
            _ => return (last != anchor).then_some(last),
        }
        idx = next_significant(stream, idx + 1, None)?;
    }
}

/// `(new Foo)->bar()`, `new Foo()->bar()` and `new class {}`.
pub(super) fn instantiation(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let mut results = Vec::new();
    let next = next_significant(stream, anchor + 1, None);
    let anonymous = next.and_then(|n| stream.kind(n)) == Some(TokenKind::Class);
    if anonymous {
        results.push(MatchResult::new(Feature::NewAnonymousClasses, anchor));
    }

    let end = if anonymous {
        next.and_then(|class| {
            let mut body = next_significant(stream, class + 1, None)?;
            while stream.kind(body)? != TokenKind::OpenCurlyBracket {
                body = match stream.kind(body)? {
                    TokenKind::OpenParenthesis => stream.partner(body)? + 1,
                    _ => body + 1,
                };
            }
            stream.partner(body)
        })
    } else {
        instantiation_end(stream, anchor)
    };
    let Some(end) = end else {
        return results;
    };
    let after = next_significant(stream, end + 1, None);

    // Wrapped: `(` `new ...` `)` followed by member access
    let wrapper = prev_code(stream, anchor).filter(|&open| {
        stream.kind(open) == Some(TokenKind::OpenParenthesis)
            && stream.get(open).is_some_and(|t| t.paren_owner.is_none())
            && !prev_code(stream, open).and_then(|p| stream.kind(p)).is_some_and(|k| {
                matches!(
                    k,
                    TokenKind::String
                        | TokenKind::Variable
                        | TokenKind::CloseParenthesis
                        | TokenKind::CloseSquareBracket
                        | TokenKind::CloseCurlyBracket
                        | TokenKind::Static
                )
            })
    });
    if let Some(open) = wrapper {
        let close = stream.partner(open);
        if close == after {
            let following = close.and_then(|c| next_significant(stream, c + 1, None));
            if is_member_access(following.and_then(|f| stream.kind(f))) {
                results.push(MatchResult::new(Feature::NewClassMemberAccess, anchor));
            }
        }
        return results;
    }

    // Unwrapped: `new Foo()->bar()`
    let has_arguments = stream.kind(end) == Some(TokenKind::CloseParenthesis)
        || stream.kind(end) == Some(TokenKind::CloseCurlyBracket);
    if has_arguments && is_member_access(after.and_then(|a| stream.kind(a))) {
        results.push(MatchResult::new(Feature::NewMemberAccessWithoutParens, anchor));
    }
    results
}
