//! Structural pass - bracket partners, nesting, parenthesis owners and scopes
//!
//! Malformed input is expected (code being typed). Unbalanced brackets are
//! left without a partner instead of failing the whole stream.

use super::token::{ScopeInfo, Token, TokenKind};

pub(super) fn resolve(tokens: &mut [Token], scopes: &mut Vec<ScopeInfo>) {
    match_brackets(tokens);
    assign_paren_owners(tokens);
    collect_scopes(tokens, scopes);
}

fn match_brackets(tokens: &mut [Token]) {
    let mut stack: Vec<usize> = Vec::new();

    for idx in 0..tokens.len() {
        let kind = tokens[idx].kind;
        if kind.is_opener() {
            tokens[idx].nesting = stack.len();
            tokens[idx].enclosing = stack.last().copied();
            stack.push(idx);
            continue;
        }

        let openers: &[TokenKind] = match kind {
            TokenKind::CloseParenthesis => &[TokenKind::OpenParenthesis],
            TokenKind::CloseSquareBracket | TokenKind::AttributeEnd => {
                &[TokenKind::OpenSquareBracket, TokenKind::Attribute]
            }
            TokenKind::CloseCurlyBracket => &[TokenKind::OpenCurlyBracket],
            _ => &[],
        };

        if let Some(&open) = stack.last() {
            if openers.contains(&tokens[open].kind) {
                stack.pop();
                tokens[open].partner = Some(idx);
                tokens[idx].partner = Some(open);
                tokens[idx].kind = if tokens[open].kind == TokenKind::Attribute {
                    TokenKind::AttributeEnd
                } else if kind == TokenKind::AttributeEnd {
                    TokenKind::CloseSquareBracket
                } else {
                    kind
                };
            }
        }
        tokens[idx].nesting = stack.len();
        tokens[idx].enclosing = stack.last().copied();
    }
}

fn prev_code(tokens: &[Token], idx: usize) -> Option<usize> {
    (0..idx).rev().find(|&i| !tokens[i].kind.is_empty())
}

fn next_code(tokens: &[Token], idx: usize) -> Option<usize> {
    (idx + 1..tokens.len()).find(|&i| !tokens[i].kind.is_empty())
}

fn owner_of_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let prev = prev_code(tokens, open)?;
    match tokens[prev].kind {
        TokenKind::Function
        | TokenKind::Fn
        | TokenKind::List
        | TokenKind::Array
        | TokenKind::Isset
        | TokenKind::Empty
        | TokenKind::Unset
        | TokenKind::If
        | TokenKind::ElseIf
        | TokenKind::While
        | TokenKind::For
        | TokenKind::Foreach
        | TokenKind::Switch
        | TokenKind::Match
        | TokenKind::Catch
        | TokenKind::Declare
        | TokenKind::Exit
        | TokenKind::Eval
        | TokenKind::Use => Some(prev),
        // `function name(`, `function &name(` and `fn &(`
        TokenKind::String | TokenKind::BitwiseAnd => {
            let mut before = prev_code(tokens, prev)?;
            if tokens[prev].kind == TokenKind::String && tokens[before].kind == TokenKind::BitwiseAnd {
                before = prev_code(tokens, before)?;
            }
            match tokens[before].kind {
                TokenKind::Function | TokenKind::Fn => Some(before),
                _ => None,
            }
        }
        _ => None,
    }
}

fn assign_paren_owners(tokens: &mut [Token]) {
    for idx in 0..tokens.len() {
        if tokens[idx].kind != TokenKind::OpenParenthesis {
            continue;
        }
        let Some(owner) = owner_of_paren(tokens, idx) else {
            continue;
        };
        tokens[idx].paren_owner = Some(owner);
        if let Some(close) = tokens[idx].partner {
            tokens[close].paren_owner = Some(owner);
        }
    }
}

/// Parameter list owned by the function keyword at `owner`.
fn owned_parens(tokens: &[Token], owner: usize) -> Option<(usize, usize)> {
    let mut idx = owner;
    // Keyword, optional `&`, optional name, then the list itself.
    for _ in 0..3 {
        idx = next_code(tokens, idx)?;
        if tokens[idx].kind == TokenKind::OpenParenthesis {
            if tokens[idx].paren_owner != Some(owner) {
                return None;
            }
            return Some((idx, tokens[idx].partner?));
        }
    }
    None
}

/// First `{` at the owner's depth, jumping over nested pairs. A `;` first means no body.
fn body_opener(tokens: &[Token], from: usize, depth: usize) -> Option<usize> {
    let mut idx = from;
    while idx < tokens.len() {
        let token = &tokens[idx];
        match token.kind {
            TokenKind::OpenCurlyBracket if token.nesting == depth => return Some(idx),
            TokenKind::Semicolon if token.nesting == depth => return None,
            _ if token.kind.is_closer() && token.nesting < depth => return None,
            _ if token.kind.is_opener() => idx = token.partner? + 1,
            _ => idx += 1,
        }
    }
    None
}

/// Arrow function bodies end at the first `;`, `,` or unmatched closer.
fn arrow_body_end(tokens: &[Token], arrow: usize) -> Option<usize> {
    let depth = tokens[arrow].nesting;
    let mut idx = arrow + 1;
    let mut last = arrow;
    while idx < tokens.len() {
        let token = &tokens[idx];
        if token.kind.is_closer() || (token.nesting == depth && matches!(token.kind, TokenKind::Semicolon | TokenKind::Comma | TokenKind::CloseTag)) {
            return Some(last);
        }
        if !token.kind.is_empty() {
            last = idx;
        }
        if token.kind.is_opener() {
            let close = token.partner?;
            last = close;
            idx = close + 1;
        } else {
            idx += 1;
        }
    }
    Some(last)
}

fn collect_scopes(tokens: &[Token], scopes: &mut Vec<ScopeInfo>) {
    for owner in 0..tokens.len() {
        match tokens[owner].kind {
            TokenKind::Function => {
                let Some((open, close)) = owned_parens(tokens, owner) else {
                    continue;
                };
                let Some(opener) = body_opener(tokens, close + 1, tokens[owner].nesting) else {
                    continue;
                };
                if let Some(closer) = tokens[opener].partner {
                    scopes.push(ScopeInfo {
                        owner,
                        opener,
                        closer,
                        parens: Some((open, close)),
                    });
                }
            }
            TokenKind::Fn => {
                let Some((open, close)) = owned_parens(tokens, owner) else {
                    continue;
                };
                let arrow = (close + 1..tokens.len())
                    .find(|&i| tokens[i].kind == TokenKind::DoubleArrow && tokens[i].nesting == tokens[owner].nesting);
                let Some(arrow) = arrow else {
                    continue;
                };
                if let Some(closer) = arrow_body_end(tokens, arrow) {
                    scopes.push(ScopeInfo {
                        owner,
                        opener: arrow,
                        closer,
                        parens: Some((open, close)),
                    });
                }
            }
            TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum => {
                let Some(opener) = body_opener(tokens, owner + 1, tokens[owner].nesting) else {
                    continue;
                };
                if let Some(closer) = tokens[opener].partner {
                    scopes.push(ScopeInfo {
                        owner,
                        opener,
                        closer,
                        parens: None,
                    });
                }
            }
            _ => {}
        }
    }
}
