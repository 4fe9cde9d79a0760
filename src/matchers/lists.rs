//! Destructuring analysis for `list()` and `[...]`
//!
//! The outermost list construct is walked once, slot by slot, recursing into
//! nested lists. Nested anchors decline on their own; the outer result's
//! `skip_to` covers them.

use std::collections::HashSet;

use super::MatchResult;
use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};
use crate::window::{is_short_array, is_short_list, next_significant, normalized_text};

#[derive(Debug, Default)]
struct ListWalk {
    results: Vec<MatchResult>,
    /// Normalized target text and its first token, across the whole construct.
    targets: Vec<(String, usize)>,
}

/// Whether the list opened at `open` sits in a slot of another list.
fn is_nested(stream: &TokenStream, open: usize) -> bool {
    let Some(outer) = stream.get(open).and_then(|t| t.enclosing) else {
        return false;
    };
    match stream.kind(outer) {
        Some(TokenKind::OpenParenthesis) => stream
            .get(outer)
            .and_then(|t| t.paren_owner)
            .and_then(|owner| stream.kind(owner))
            == Some(TokenKind::List),
        Some(TokenKind::OpenSquareBracket) => is_short_list(stream, outer),
        _ => false,
    }
}

/// Top-level comma-separated slots of `open..close`.
fn slots(stream: &TokenStream, open: usize, close: usize) -> Option<Vec<(usize, usize)>> {
    let mut slots = Vec::new();
    let mut start = open + 1;
    let mut idx = open + 1;
    while idx < close {
        let kind = stream.kind(idx)?;
        if kind == TokenKind::Comma {
            slots.push((start, idx));
            start = idx + 1;
        } else if kind.is_opener() {
            idx = stream.partner(idx).filter(|&p| p > idx && p < close)?;
        }
        idx += 1;
    }
    slots.push((start, close));
    Some(slots)
}

/// First top-level `=>` in `from..to`.
fn slot_arrow(stream: &TokenStream, from: usize, to: usize) -> Option<usize> {
    let mut idx = from;
    while idx < to {
        let kind = stream.kind(idx)?;
        if kind == TokenKind::DoubleArrow {
            return Some(idx);
        }
        if kind.is_opener() {
            idx = stream.partner(idx)?;
        }
        idx += 1;
    }
    None
}

/// Walk one list. Returns `None` on a token-stream inconsistency.
fn walk(stream: &TokenStream, anchor: usize, open: usize, close: usize, long: bool, state: &mut ListWalk) -> Option<()> {
    let mut keyed = false;
    let mut all_empty = true;

    for (from, to) in slots(stream, open, close)? {
        let Some(first) = next_significant(stream, from, Some(to)) else {
            continue;
        };
        all_empty = false;

        let mut value = first;
        if let Some(arrow) = slot_arrow(stream, from, to) {
            keyed = true;
            value = next_significant(stream, arrow + 1, Some(to))?;
        }
        if stream.kind(value) == Some(TokenKind::BitwiseAnd) {
            state
                .results
                .push(MatchResult::new(Feature::NewListReferenceAssignment, value));
            value = next_significant(stream, value + 1, Some(to))?;
        }

        match stream.kind(value)? {
            TokenKind::List => {
                let inner_open = next_significant(stream, value + 1, Some(to))?;
                if stream.kind(inner_open) != Some(TokenKind::OpenParenthesis) {
                    return None;
                }
                let inner_close = stream.partner(inner_open)?;
                walk(stream, value, inner_open, inner_close, true, state)?;
            }
            TokenKind::OpenSquareBracket if is_short_array(stream, value) => {
                let inner_close = stream.partner(value)?;
                walk(stream, value, value, inner_close, false, state)?;
            }
            _ => {
                let text = normalized_text(stream, value, to);
                if !text.is_empty() {
                    state.targets.push((text, value));
                }
            }
        }
    }

    if keyed {
        state.results.push(MatchResult::new(Feature::NewKeyedList, anchor));
    }
    if long && all_empty {
        state.results.push(MatchResult::new(Feature::ForbiddenEmptyList, anchor));
    }
    Some(())
}

pub(super) fn run(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    let (open, long) = match stream.kind(anchor) {
        Some(TokenKind::List) => match next_significant(stream, anchor + 1, None) {
            Some(open) if stream.kind(open) == Some(TokenKind::OpenParenthesis) => (open, true),
            _ => return Vec::new(),
        },
        Some(TokenKind::OpenSquareBracket) => {
            if !is_short_array(stream, anchor) {
                return Vec::new();
            }
            if !is_short_list(stream, anchor) {
                return vec![MatchResult::new(Feature::NewShortArray, anchor)];
            }
            (anchor, false)
        }
        _ => return Vec::new(),
    };

    if is_nested(stream, open) {
        return Vec::new();
    }
    let Some(close) = stream.partner(open).filter(|&c| c > open) else {
        tracing::debug!(token = anchor, "list without closing bracket");
        return Vec::new();
    };

    let mut state = ListWalk::default();
    if walk(stream, anchor, open, close, long, &mut state).is_none() {
        tracing::debug!(token = anchor, "malformed list construct");
        return Vec::new();
    }

    let mut results = Vec::new();
    if !long {
        results.push(MatchResult::new(Feature::NewShortList, anchor));
    }
    let mut seen = HashSet::new();
    if let Some((text, _)) = state.targets.iter().find(|(text, _)| !seen.insert(text.as_str())) {
        results.push(MatchResult::new(Feature::AssignmentOrder, anchor).with_found(text.clone()));
    }
    results.extend(state.results);
    results.into_iter().map(|r| r.with_skip_to(close)).collect()
}
