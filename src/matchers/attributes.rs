//! `#[...]` attributes under both tokenizer profiles
//!
//! The modern tokenizer emits an attribute opener paired with its closing
//! bracket. The legacy tokenizer sees a `#` comment that runs to the end of
//! the line, and a multi-line attribute continues as raw tokens after it.
//! Both shapes normalize to the same spans and text.

use super::MatchResult;
use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};
use crate::window::join_text;

/// A normalized attribute block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    pub start: usize,
    /// Token holding the closing `]`.
    pub end: usize,
    /// Byte offset of the `#[` inside the `start` token.
    pub offset: usize,
    /// Attribute text with whitespace runs collapsed to one space.
    pub text: String,
}

/// Bracket depth tracker that ignores brackets inside quoted strings.
#[derive(Debug, Default)]
struct BracketDepth {
    depth: usize,
    quote: Option<char>,
    escaped: bool,
}

impl BracketDepth {
    /// Feed `text`; returns the byte offset just past the `]` closing the block.
    fn feed(&mut self, text: &str) -> Option<usize> {
        for (at, c) in text.char_indices() {
            if let Some(q) = self.quote {
                match c {
                    _ if self.escaped => self.escaped = false,
                    '\\' => self.escaped = true,
                    _ if c == q => self.quote = None,
                    _ => {}
                }
                continue;
            }
            match c {
                '\'' | '"' => self.quote = Some(c),
                '[' => self.depth += 1,
                ']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Some(at + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize the attribute blocks starting at `anchor`.
///
/// A legacy comment may hold several blocks on one line; each gets its own
/// span. Only the last one may continue past the comment.
pub fn normalize_attribute(stream: &TokenStream, anchor: usize) -> Vec<AttributeSpan> {
    match stream.kind(anchor) {
        Some(TokenKind::Attribute) => stream
            .partner(anchor)
            .filter(|&e| e > anchor)
            .map(|end| AttributeSpan {
                start: anchor,
                end,
                offset: 0,
                text: collapse(&join_text(stream, anchor, end + 1)),
            })
            .into_iter()
            .collect(),
        Some(TokenKind::Comment) => comment_blocks(stream, anchor),
        _ => Vec::new(),
    }
}

fn comment_blocks(stream: &TokenStream, anchor: usize) -> Vec<AttributeSpan> {
    let content = stream.content(anchor);
    let mut spans = Vec::new();
    let mut at = 0;
    while content[at..].starts_with("#[") {
        let mut depth = BracketDepth::default();
        let rest = &content[at..];
        if let Some(cut) = depth.feed(rest) {
            spans.push(AttributeSpan {
                start: anchor,
                end: anchor,
                offset: at,
                text: collapse(&rest[..cut]),
            });
            at += cut;
            at += content[at..].len() - content[at..].trim_start_matches([' ', '\t']).len();
            continue;
        }

        let mut text = rest.to_string();
        for idx in anchor + 1..stream.len() {
            let piece = stream.content(idx);
            if let Some(cut) = depth.feed(piece) {
                text.push_str(&piece[..cut]);
                spans.push(AttributeSpan {
                    start: anchor,
                    end: idx,
                    offset: at,
                    text: collapse(&text),
                });
                return spans;
            }
            text.push_str(piece);
        }
        tracing::debug!(token = anchor, offset = at, "unterminated attribute comment");
        break;
    }
    spans
}

pub(super) fn run(stream: &TokenStream, anchor: usize) -> Vec<MatchResult> {
    normalize_attribute(stream, anchor)
        .into_iter()
        .map(|span| {
            MatchResult::new(Feature::NewAttributes, span.start)
                .with_found(span.text)
                .with_offset(span.offset)
                .with_skip_to(span.end)
        })
        .collect()
}
