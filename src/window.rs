//! Token-window utilities
//!
//! Stateless lookups over a [`TokenStream`]. Spans are half-open
//! (`from..to`). Every function signals "not found" through its return value;
//! none of them panics on malformed input.

use crate::lexer::{parse_int_literal, TokenKind, TokenStream};

/// First non-whitespace, non-comment token in `from..stop`.
pub fn next_significant(stream: &TokenStream, from: usize, stop: Option<usize>) -> Option<usize> {
    let stop = stop.unwrap_or(stream.len()).min(stream.len());
    (from..stop).find(|&i| stream.kind(i).is_some_and(|k| !k.is_empty()))
}

/// Last non-whitespace, non-comment token at or before `from`, never below `stop`.
pub fn prev_significant(stream: &TokenStream, from: usize, stop: Option<usize>) -> Option<usize> {
    let stop = stop.unwrap_or(0);
    if from < stop || stream.is_empty() {
        return None;
    }
    let from = from.min(stream.len() - 1);
    (stop..=from)
        .rev()
        .find(|&i| stream.kind(i).is_some_and(|k| !k.is_empty()))
}

/// Whether the `:` at `colon` is the else branch of a ternary.
pub fn is_ternary_else(stream: &TokenStream, colon: usize) -> bool {
    let mut pending = 0usize;
    let mut idx = colon;
    while idx > 0 {
        idx -= 1;
        let Some(kind) = stream.kind(idx) else {
            return false;
        };
        match kind {
            TokenKind::InlineThen if pending == 0 => return true,
            TokenKind::InlineThen => pending -= 1,
            TokenKind::Colon => pending += 1,
            TokenKind::Semicolon
            | TokenKind::OpenTag
            | TokenKind::OpenTagWithEcho
            | TokenKind::CloseTag
            | TokenKind::Case
            | TokenKind::Default => return false,
            _ if kind.is_closer() => match stream.partner(idx) {
                Some(open) if open < idx => idx = open,
                _ => return false,
            },
            _ if kind.is_opener() => return false,
            _ => {}
        }
    }
    false
}

/// Token ending the statement that contains `from`.
///
/// Stops at `;`, a close tag, a top-level comma, a closer not opened inside
/// the statement, or a `:` that does not belong to a ternary. Bracket pairs
/// are skipped through their partner. Returns the last index at end of
/// stream.
pub fn statement_end(stream: &TokenStream, from: usize) -> usize {
    let last = stream.len().saturating_sub(1);
    let mut pending_ternary = 0usize;
    let mut idx = from;
    while idx < stream.len() {
        let Some(kind) = stream.kind(idx) else {
            break;
        };
        match kind {
            TokenKind::Semicolon | TokenKind::CloseTag => return idx,
            TokenKind::Comma if idx != from => return idx,
            TokenKind::InlineThen => pending_ternary += 1,
            TokenKind::Colon if pending_ternary > 0 => pending_ternary -= 1,
            TokenKind::Colon => return idx,
            _ if kind.is_opener() => match stream.partner(idx) {
                Some(close) if close > idx => {
                    idx = close + 1;
                    continue;
                }
                _ => {
                    tracing::debug!(token = idx, "opener without partner ends the statement");
                    return idx;
                }
            },
            _ if kind.is_closer() && idx != from => return idx,
            _ => {}
        }
        idx += 1;
    }
    last
}

/// Whether `from..to` denotes exactly one variable, possibly reached through
/// array, property or static property access.
pub fn is_variable_expression(stream: &TokenStream, from: usize, to: usize, nesting: usize) -> bool {
    let Some(mut idx) = next_significant(stream, from, Some(to)) else {
        return false;
    };
    if stream.get(idx).map_or(true, |t| t.nesting != nesting) {
        return false;
    }

    // Root: `$var`, `$$var`, `${expr}` or `Name::$prop`
    while stream.kind(idx) == Some(TokenKind::Dollar) {
        match next_significant(stream, idx + 1, Some(to)) {
            Some(next) => idx = next,
            None => return false,
        }
    }
    match stream.kind(idx) {
        Some(TokenKind::Variable) => {}
        Some(TokenKind::OpenCurlyBracket) => match stream.partner(idx) {
            Some(close) if close < to => idx = close,
            _ => return false,
        },
        Some(TokenKind::String | TokenKind::Static) => {
            let Some(colons) = next_significant(stream, idx + 1, Some(to)) else {
                return false;
            };
            let prop = next_significant(stream, colons + 1, Some(to));
            if stream.kind(colons) != Some(TokenKind::DoubleColon)
                || prop.and_then(|p| stream.kind(p)) != Some(TokenKind::Variable)
            {
                return false;
            }
            idx = prop.unwrap_or(colons);
        }
        _ => return false,
    }

    // Access chain
    loop {
        let Some(next) = next_significant(stream, idx + 1, Some(to)) else {
            return true;
        };
        match stream.kind(next) {
            Some(TokenKind::OpenSquareBracket | TokenKind::OpenCurlyBracket) => match stream.partner(next) {
                Some(close) if close < to => idx = close,
                _ => return false,
            },
            Some(TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator | TokenKind::DoubleColon) => {
                let Some(member) = next_significant(stream, next + 1, Some(to)) else {
                    return false;
                };
                idx = match stream.kind(member) {
                    Some(TokenKind::String | TokenKind::Variable) => member,
                    Some(TokenKind::OpenCurlyBracket) => match stream.partner(member) {
                        Some(close) if close < to => close,
                        _ => return false,
                    },
                    _ => return false,
                };
                // Method calls are not variables.
                let call = next_significant(stream, idx + 1, Some(to));
                if call.and_then(|c| stream.kind(c)) == Some(TokenKind::OpenParenthesis) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// Fold a span of signs, wrapping parentheses and one numeric literal.
pub fn evaluate_numeric_literal(stream: &TokenStream, from: usize, to: usize, allow_float: bool) -> Option<f64> {
    let mut sign = 1.0;
    let mut idx = next_significant(stream, from, Some(to))?;
    loop {
        match stream.kind(idx)? {
            TokenKind::Minus => sign = -sign,
            TokenKind::Plus => {}
            TokenKind::OpenParenthesis => {
                let close = stream.partner(idx).filter(|&c| c < to)?;
                if next_significant(stream, close + 1, Some(to)).is_some() {
                    return None;
                }
                return evaluate_numeric_literal(stream, idx + 1, close, allow_float).map(|n| sign * n);
            }
            TokenKind::LNumber => {
                let value = parse_int_literal(stream.content(idx))? as f64;
                return only_trailing_space(stream, idx, to).then_some(sign * value);
            }
            TokenKind::DNumber if allow_float => {
                let cleaned: String = stream.content(idx).chars().filter(|&c| c != '_').collect();
                let value = cleaned.parse::<f64>().ok()?;
                return only_trailing_space(stream, idx, to).then_some(sign * value);
            }
            _ => return None,
        }
        idx = next_significant(stream, idx + 1, Some(to))?;
    }
}

fn only_trailing_space(stream: &TokenStream, idx: usize, to: usize) -> bool {
    next_significant(stream, idx + 1, Some(to)).is_none()
}

/// Literal content without the surrounding quotes (and `b` prefix).
///
/// Pieces of a multi-line literal carry a quote on one side only.
pub fn strip_string_quotes(content: &str) -> &str {
    let content = match content.strip_prefix(['b', 'B']) {
        Some(rest) if rest.starts_with(['"', '\'']) => rest,
        _ => content,
    };
    let content = content.strip_prefix(['"', '\'']).unwrap_or(content);
    content.strip_suffix(['"', '\'']).unwrap_or(content)
}

/// Raw text of `from..to`.
pub fn join_text(stream: &TokenStream, from: usize, to: usize) -> String {
    (from..to.min(stream.len())).map(|i| stream.content(i)).collect()
}

/// Text of `from..to` without whitespace and comments.
pub fn normalized_text(stream: &TokenStream, from: usize, to: usize) -> String {
    (from..to.min(stream.len()))
        .filter(|&i| stream.kind(i).is_some_and(|k| !k.is_empty()))
        .map(|i| stream.content(i))
        .collect()
}

/// Token holding byte `offset` of `join_text(stream, from, to)`, with the offset inside it.
pub fn locate_offset(stream: &TokenStream, from: usize, to: usize, offset: usize) -> Option<(usize, usize)> {
    let mut consumed = 0usize;
    for idx in from..to.min(stream.len()) {
        let len = stream.content(idx).len();
        if offset < consumed + len {
            return Some((idx, offset - consumed));
        }
        consumed += len;
    }
    None
}

/// Token holding byte `offset` of `join_text(stream, from, to)`.
pub fn token_at_offset(stream: &TokenStream, from: usize, to: usize, offset: usize) -> Option<usize> {
    locate_offset(stream, from, to, offset).map(|(idx, _)| idx)
}

/// Whether the `}` at `close` ends a statement block rather than an expression.
pub fn is_block_closer(stream: &TokenStream, close: usize) -> bool {
    let Some(open) = stream.partner(close).filter(|&o| o < close) else {
        return false;
    };
    let before = open.checked_sub(1).and_then(|i| prev_significant(stream, i, None));
    !matches!(
        before.and_then(|b| stream.kind(b)),
        Some(
            TokenKind::Dollar
                | TokenKind::Variable
                | TokenKind::ObjectOperator
                | TokenKind::NullsafeObjectOperator
                | TokenKind::DoubleColon
                | TokenKind::CloseSquareBracket
        )
    )
}

/// Whether the `[` at `open` starts an array literal (or short list) rather than an index access.
pub fn is_short_array(stream: &TokenStream, open: usize) -> bool {
    if stream.kind(open) != Some(TokenKind::OpenSquareBracket) {
        return false;
    }
    let Some(before) = open.checked_sub(1).and_then(|i| prev_significant(stream, i, None)) else {
        return true;
    };
    match stream.kind(before) {
        // `if (...) [`: the condition ends and a new statement begins.
        Some(TokenKind::CloseParenthesis) if closes_control_condition(stream, before) => true,
        Some(
            TokenKind::Variable
            | TokenKind::CloseParenthesis
            | TokenKind::CloseSquareBracket
            | TokenKind::String
            | TokenKind::Static
            | TokenKind::ConstantEncapsedString
            | TokenKind::DoubleQuotedString
            | TokenKind::EndHeredoc
            | TokenKind::EndNowdoc,
        ) => false,
        Some(TokenKind::CloseCurlyBracket) => is_block_closer(stream, before),
        _ => true,
    }
}

fn closes_control_condition(stream: &TokenStream, close: usize) -> bool {
    matches!(
        stream.get(close).and_then(|t| t.paren_owner).and_then(|owner| stream.kind(owner)),
        Some(
            TokenKind::If
                | TokenKind::ElseIf
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::Declare
        )
    )
}

/// Whether the `[` at `open` is a destructuring target.
pub fn is_short_list(stream: &TokenStream, open: usize) -> bool {
    if !is_short_array(stream, open) {
        return false;
    }
    let Some(close) = stream.partner(open).filter(|&c| c > open) else {
        return false;
    };

    let after = next_significant(stream, close + 1, None);
    if after.and_then(|a| stream.kind(a)) == Some(TokenKind::Equal) {
        return true;
    }

    let before = open.checked_sub(1).and_then(|i| prev_significant(stream, i, None));
    match before.and_then(|b| stream.kind(b)) {
        Some(TokenKind::As) => return true,
        Some(TokenKind::DoubleArrow) => {
            let in_foreach = stream
                .get(open)
                .and_then(|t| t.enclosing)
                .and_then(|e| stream.get(e))
                .and_then(|t| t.paren_owner)
                .and_then(|owner| stream.kind(owner))
                == Some(TokenKind::Foreach);
            if in_foreach {
                return true;
            }
        }
        _ => {}
    }

    // A slot of an enclosing short list
    let outer = stream.get(open).and_then(|t| t.enclosing);
    match (outer, before.and_then(|b| stream.kind(b))) {
        (
            Some(outer),
            Some(TokenKind::OpenSquareBracket | TokenKind::Comma | TokenKind::DoubleArrow),
        ) if stream.kind(outer) == Some(TokenKind::OpenSquareBracket) => is_short_list(stream, outer),
        _ => false,
    }
}

/// First token of the literal whose piece sits at `idx`.
pub fn literal_start(stream: &TokenStream, idx: usize) -> usize {
    let Some(kind) = stream.kind(idx) else {
        return idx;
    };
    let mut start = idx;
    match kind {
        TokenKind::HeredocBody | TokenKind::NowdocBody | TokenKind::EndHeredoc | TokenKind::EndNowdoc => {
            while start > 0
                && !matches!(
                    stream.kind(start),
                    Some(TokenKind::StartHeredoc | TokenKind::StartNowdoc)
                )
            {
                start -= 1;
            }
        }
        _ if kind.is_string_piece() || kind == TokenKind::Backtick => {
            while start > 0
                && stream.kind(start - 1) == Some(kind)
                && stream.content(start - 1).ends_with('\n')
            {
                start -= 1;
            }
        }
        _ => {}
    }
    start
}

/// Last token of the literal starting at `start`.
pub fn literal_end(stream: &TokenStream, start: usize) -> usize {
    let Some(kind) = stream.kind(start) else {
        return start;
    };
    match kind {
        TokenKind::StartHeredoc | TokenKind::StartNowdoc => (start + 1..stream.len())
            .find(|&i| matches!(stream.kind(i), Some(TokenKind::EndHeredoc | TokenKind::EndNowdoc)))
            .unwrap_or(stream.len().saturating_sub(1)),
        _ if kind.is_string_piece() || kind == TokenKind::Backtick => {
            let mut end = start;
            while stream.kind(end + 1) == Some(kind) && stream.content(end).ends_with('\n') {
                end += 1;
            }
            end
        }
        _ => start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, TokenizerProfile};
    use pretty_assertions::assert_eq;

    fn stream(source: &str) -> TokenStream {
        tokenize(source, TokenizerProfile::Modern)
    }

    fn find(stream: &TokenStream, content: &str) -> usize {
        stream.tokens().iter().position(|t| t.content == content).unwrap()
    }

    fn find_last(stream: &TokenStream, content: &str) -> usize {
        stream.tokens().iter().rposition(|t| t.content == content).unwrap()
    }

    #[test]
    fn test_significant_search() {
        let s = stream("<?php $a /* c */ = 1;");
        let a = find(&s, "$a");
        assert_eq!(next_significant(&s, a + 1, None), Some(find(&s, "=")));
        assert_eq!(prev_significant(&s, find(&s, "=") - 1, None), Some(a));
        assert_eq!(next_significant(&s, a + 1, Some(a + 3)), None);
        assert_eq!(prev_significant(&s, a - 1, Some(a)), None);
        assert_eq!(next_significant(&s, 999, None), None);
    }

    #[test]
    fn test_statement_end() {
        let s = stream("<?php $a = foo(1, [2, 3]) ? $b : $c; $d;");
        assert_eq!(statement_end(&s, find(&s, "$a")), find(&s, ";"));
        let d = find(&s, "$d");
        assert_eq!(statement_end(&s, d), find_last(&s, ";"));
    }

    #[test]
    fn test_statement_end_stops_at_case_colon() {
        let s = stream("<?php switch ($x) { case $y ? 1 : 2: break; }");
        let case = find(&s, "case");
        let end = statement_end(&s, case);
        assert_eq!(s.content(end), ":");
        assert_eq!(s.get(end).map(|t| t.column), Some(36));
    }

    #[test]
    fn test_statement_end_without_terminator() {
        let s = stream("<?php $a = 1");
        assert_eq!(statement_end(&s, find(&s, "$a")), s.len() - 1);
    }

    #[test]
    fn test_is_ternary_else() {
        let s = stream("<?php $a ? $b : $c; switch ($x) { case 1: }");
        assert!(is_ternary_else(&s, find(&s, ":")));
        assert!(!is_ternary_else(&s, find_last(&s, ":")));
    }

    #[test]
    fn test_is_variable_expression() {
        let check = |source: &str| {
            let s = stream(source);
            let open = find(&s, "(");
            let close = s.partner(open).unwrap();
            let nesting = s.get(open).unwrap().nesting + 1;
            is_variable_expression(&s, open + 1, close, nesting)
        };
        assert!(check("<?php empty($a);"));
        assert!(check("<?php empty($a['k'][0]->b?->c);"));
        assert!(check("<?php empty($$name);"));
        assert!(check("<?php empty(Foo::$bar);"));
        assert!(!check("<?php empty($a->b());"));
        assert!(!check("<?php empty($a + 1);"));
        assert!(!check("<?php empty(foo());"));
        assert!(!check("<?php empty(  );"));
    }

    #[test]
    fn test_evaluate_numeric_literal() {
        let eval = |source: &str, allow_float: bool| {
            let s = stream(source);
            evaluate_numeric_literal(&s, 1, s.len(), allow_float)
        };
        assert_eq!(eval("<?php -1", false), Some(-1.0));
        assert_eq!(eval("<?php -(-(0x10))", false), Some(16.0));
        assert_eq!(eval("<?php 1_000", false), Some(1000.0));
        assert_eq!(eval("<?php 1.5", false), None);
        assert_eq!(eval("<?php -1.5", true), Some(-1.5));
        assert_eq!(eval("<?php 1 + 1", false), None);
        assert_eq!(eval("<?php $a", false), None);
        assert_eq!(eval("<?php (1", false), None);
    }

    #[test]
    fn test_strip_string_quotes() {
        assert_eq!(strip_string_quotes("'abc'"), "abc");
        assert_eq!(strip_string_quotes("\"a\\u{41}\""), "a\\u{41}");
        assert_eq!(strip_string_quotes("b'x'"), "x");
        assert_eq!(strip_string_quotes("\"first line\n"), "first line\n");
        assert_eq!(strip_string_quotes("bare"), "bare");
    }

    #[test]
    fn test_text_helpers() {
        let s = stream("<?php $a [ 'k' ] ;");
        let a = find(&s, "$a");
        let semi = find(&s, ";");
        assert_eq!(join_text(&s, a, semi), "$a [ 'k' ] ");
        assert_eq!(normalized_text(&s, a, semi), "$a['k']");
        assert_eq!(token_at_offset(&s, a, semi, 0), Some(a));
        assert_eq!(token_at_offset(&s, a, semi, 5), Some(find(&s, "'k'")));
        assert_eq!(token_at_offset(&s, a, semi, 500), None);
        assert_eq!(locate_offset(&s, a, semi, 0), Some((a, 0)));
        assert_eq!(locate_offset(&s, a, semi, 6), Some((find(&s, "'k'"), 1)));
    }

    #[test]
    fn test_short_list_after_control_condition() {
        let s = stream("<?php if ($c) [$a, $b] = $x; while (f()) [$d] = $y; g($e)[0];");
        let opens: Vec<usize> = s
            .tokens()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::OpenSquareBracket)
            .map(|(i, _)| i)
            .collect();
        let lists: Vec<bool> = opens.iter().map(|&i| is_short_list(&s, i)).collect();
        assert_eq!(lists, vec![true, true, false]);
        assert!(!is_short_array(&s, opens[2]));
    }

    #[test]
    fn test_short_array_and_list() {
        let s = stream("<?php [$a, [$b]] = $c[0]; $d = [1]; foreach ($e as [$f]) {}");
        let opens: Vec<usize> = s
            .tokens()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::OpenSquareBracket)
            .map(|(i, _)| i)
            .collect();
        let classes: Vec<(bool, bool)> = opens
            .iter()
            .map(|&i| (is_short_array(&s, i), is_short_list(&s, i)))
            .collect();
        assert_eq!(
            classes,
            vec![
                (true, true),
                (true, true),
                (false, false),
                (true, false),
                (true, true),
            ]
        );
    }

    #[test]
    fn test_literal_bounds() {
        let s = stream("<?php $a = \"one\ntwo\nthree\"; $h = <<<X\nbody\nX;\n");
        let first = s
            .tokens()
            .iter()
            .position(|t| t.kind == TokenKind::ConstantEncapsedString)
            .unwrap();
        assert_eq!(literal_end(&s, first), first + 2);
        assert_eq!(literal_start(&s, first + 2), first);

        let start = s.tokens().iter().position(|t| t.kind == TokenKind::StartHeredoc).unwrap();
        let end = literal_end(&s, start);
        assert_eq!(s.kind(end), Some(TokenKind::EndHeredoc));
        assert_eq!(literal_start(&s, end), start);
    }
}
