//! Hand-written PHP scanner
//!
//! Produces one token per lexeme with 1-indexed line/column positions.
//! Multi-line string literals and heredoc bodies are split into one token
//! per line, the way established PHP tooling hands them to sniffs. Every
//! token boundary falls on an ASCII byte, so slicing the source is always
//! valid UTF-8.

use super::token::{Token, TokenKind, TokenizerProfile};

/// Longest operators first.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("**=", TokenKind::PowEqual),
    ("...", TokenKind::Ellipsis),
    ("<=>", TokenKind::Spaceship),
    ("===", TokenKind::IsIdentical),
    ("!==", TokenKind::IsNotIdentical),
    ("<<=", TokenKind::SlEqual),
    (">>=", TokenKind::SrEqual),
    ("??=", TokenKind::CoalesceEqual),
    ("?->", TokenKind::NullsafeObjectOperator),
    ("**", TokenKind::Pow),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("->", TokenKind::ObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::DoubleColon),
    ("==", TokenKind::IsEqual),
    ("!=", TokenKind::IsNotEqual),
    ("<>", TokenKind::IsNotEqual),
    ("<=", TokenKind::IsSmallerOrEqual),
    (">=", TokenKind::IsGreaterOrEqual),
    ("&&", TokenKind::BooleanAnd),
    ("||", TokenKind::BooleanOr),
    ("??", TokenKind::Coalesce),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinusEqual),
    ("*=", TokenKind::MulEqual),
    ("/=", TokenKind::DivEqual),
    (".=", TokenKind::ConcatEqual),
    ("%=", TokenKind::ModEqual),
    ("&=", TokenKind::AndEqual),
    ("|=", TokenKind::OrEqual),
    ("^=", TokenKind::XorEqual),
    ("<<", TokenKind::Sl),
    (">>", TokenKind::Sr),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    ("%", TokenKind::Modulus),
    ("=", TokenKind::Equal),
    ("<", TokenKind::LessThan),
    (">", TokenKind::GreaterThan),
    ("!", TokenKind::BooleanNot),
    (".", TokenKind::Concat),
    ("&", TokenKind::BitwiseAnd),
    ("|", TokenKind::BitwiseOr),
    ("^", TokenKind::BitwiseXor),
    ("~", TokenKind::BitwiseNot),
    ("?", TokenKind::InlineThen),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("(", TokenKind::OpenParenthesis),
    (")", TokenKind::CloseParenthesis),
    ("[", TokenKind::OpenSquareBracket),
    ("]", TokenKind::CloseSquareBracket),
    ("{", TokenKind::OpenCurlyBracket),
    ("}", TokenKind::CloseCurlyBracket),
    ("@", TokenKind::At),
];

fn keyword_kind(lower: &str) -> Option<TokenKind> {
    let kind = match lower {
        "abstract" => TokenKind::Abstract,
        "and" => TokenKind::LogicalAnd,
        "array" => TokenKind::Array,
        "as" => TokenKind::As,
        "break" => TokenKind::Break,
        "callable" => TokenKind::Callable,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "class" => TokenKind::Class,
        "clone" => TokenKind::Clone,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "declare" => TokenKind::Declare,
        "default" => TokenKind::Default,
        "die" | "exit" => TokenKind::Exit,
        "do" => TokenKind::Do,
        "echo" => TokenKind::Echo,
        "else" => TokenKind::Else,
        "elseif" => TokenKind::ElseIf,
        "empty" => TokenKind::Empty,
        "enddeclare" => TokenKind::EndDeclare,
        "endfor" => TokenKind::EndFor,
        "endforeach" => TokenKind::EndForeach,
        "endif" => TokenKind::EndIf,
        "endswitch" => TokenKind::EndSwitch,
        "endwhile" => TokenKind::EndWhile,
        "eval" => TokenKind::Eval,
        "extends" => TokenKind::Extends,
        "false" => TokenKind::False,
        "final" => TokenKind::Final,
        "finally" => TokenKind::Finally,
        "fn" => TokenKind::Fn,
        "for" => TokenKind::For,
        "foreach" => TokenKind::Foreach,
        "function" => TokenKind::Function,
        "global" => TokenKind::Global,
        "goto" => TokenKind::Goto,
        "if" => TokenKind::If,
        "implements" => TokenKind::Implements,
        "include" => TokenKind::Include,
        "include_once" => TokenKind::IncludeOnce,
        "instanceof" => TokenKind::InstanceOf,
        "insteadof" => TokenKind::InsteadOf,
        "interface" => TokenKind::Interface,
        "isset" => TokenKind::Isset,
        "list" => TokenKind::List,
        "namespace" => TokenKind::Namespace,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "or" => TokenKind::LogicalOr,
        "print" => TokenKind::Print,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "public" => TokenKind::Public,
        "readonly" => TokenKind::Readonly,
        "require" => TokenKind::Require,
        "require_once" => TokenKind::RequireOnce,
        "return" => TokenKind::Return,
        "static" => TokenKind::Static,
        "switch" => TokenKind::Switch,
        "throw" => TokenKind::Throw,
        "trait" => TokenKind::Trait,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "unset" => TokenKind::Unset,
        "use" => TokenKind::Use,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        "xor" => TokenKind::LogicalXor,
        "yield" => TokenKind::Yield,
        _ => return None,
    };
    Some(kind)
}

fn cast_kind(lower: &str) -> Option<TokenKind> {
    let kind = match lower {
        "int" | "integer" => TokenKind::IntCast,
        "bool" | "boolean" => TokenKind::BoolCast,
        "float" | "double" | "real" => TokenKind::DoubleCast,
        "string" | "binary" => TokenKind::StringCast,
        "array" => TokenKind::ArrayCast,
        "object" => TokenKind::ObjectCast,
        "unset" => TokenKind::UnsetCast,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

pub(super) struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    profile: TokenizerProfile,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub(super) fn new(src: &'a str, profile: TokenizerProfile) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            profile,
            tokens: Vec::new(),
        }
    }

    pub(super) fn scan(mut self) -> Vec<Token> {
        let mut in_php = false;
        while self.pos < self.bytes.len() {
            if !in_php {
                in_php = self.inline_html();
                continue;
            }
            if self.close_tag() {
                in_php = false;
                continue;
            }
            self.next_token();
        }
        self.tokens
    }

    // ─── Helpers ────────────────────────────────────────────────────

    fn peek(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn starts_with(&self, at: usize, needle: &str) -> bool {
        self.bytes
            .get(at..at + needle.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(needle.as_bytes()))
    }

    fn push(&mut self, kind: TokenKind, end: usize) {
        let end = end.min(self.bytes.len());
        let content = &self.src[self.pos..end];
        self.tokens
            .push(Token::new(kind, content, self.line, self.column));
        for &b in content.as_bytes() {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    /// One token per line for literals spanning several lines.
    fn push_lines(&mut self, kind: TokenKind, end: usize) {
        let end = end.min(self.bytes.len());
        while self.pos < end {
            let piece_end = self.bytes[self.pos..end]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(end, |nl| self.pos + nl + 1);
            self.push(kind, piece_end);
        }
    }

    fn last_code(&self, skip: usize) -> Option<TokenKind> {
        self.tokens
            .iter()
            .rev()
            .filter(|t| !t.kind.is_empty())
            .nth(skip)
            .map(|t| t.kind)
    }

    // ─── Inline HTML and tags ───────────────────────────────────────

    /// Emits HTML up to the next open tag. Returns `true` when PHP mode starts.
    fn inline_html(&mut self) -> bool {
        let mut at = self.pos;
        while at + 1 < self.bytes.len() {
            if self.bytes[at] == b'<' && self.bytes[at + 1] == b'?' {
                if self.starts_with(at, "<?=") {
                    if at > self.pos {
                        self.push(TokenKind::InlineHtml, at);
                    }
                    self.push(TokenKind::OpenTagWithEcho, at + 3);
                    return true;
                }
                let after = self.bytes.get(at + 5).copied();
                if self.starts_with(at, "<?php") && after.map_or(true, |b| b.is_ascii_whitespace()) {
                    if at > self.pos {
                        self.push(TokenKind::InlineHtml, at);
                    }
                    let mut end = at + 5;
                    if self.starts_with(end, "\r\n") {
                        end += 2;
                    } else if after.is_some() {
                        end += 1;
                    }
                    self.push(TokenKind::OpenTag, end);
                    return true;
                }
            }
            at += 1;
        }
        self.push(TokenKind::InlineHtml, self.bytes.len());
        false
    }

    fn close_tag(&mut self) -> bool {
        if !self.starts_with(self.pos, "?>") {
            return false;
        }
        let mut end = self.pos + 2;
        if self.starts_with(end, "\r\n") {
            end += 2;
        } else if self.bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
        self.push(TokenKind::CloseTag, end);
        true
    }

    // ─── Dispatch ───────────────────────────────────────────────────

    fn next_token(&mut self) {
        let b = self.peek(0);
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => self.whitespace(),
            b'#' => self.hash(),
            b'/' => self.slash(),
            b'$' => self.dollar(),
            b'\'' => self.single_quoted(self.pos),
            b'"' => self.double_quoted(self.pos),
            b'`' => self.backtick(),
            b'0'..=b'9' => self.number(),
            b'.' if self.peek(1).is_ascii_digit() => self.number(),
            b'(' => self.paren_or_cast(),
            b'<' if self.starts_with(self.pos, "<<<") => {
                if !self.heredoc() {
                    self.operator();
                }
            }
            b'\\' => self.push(TokenKind::NsSeparator, self.pos + 1),
            _ if is_ident_start(b) => self.identifier(),
            _ => self.operator(),
        }
    }

    fn whitespace(&mut self) {
        let len = self.bytes[self.pos..]
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
            .count();
        self.push(TokenKind::Whitespace, self.pos + len);
    }

    fn hash(&mut self) {
        if self.profile == TokenizerProfile::Modern && self.peek(1) == b'[' {
            self.push(TokenKind::Attribute, self.pos + 2);
        } else {
            self.line_comment();
        }
    }

    /// Runs to the end of the line (newline included) or up to a close tag.
    fn line_comment(&mut self) {
        let mut end = self.pos;
        while end < self.bytes.len() {
            if self.bytes[end] == b'\n' {
                end += 1;
                break;
            }
            if self.starts_with(end, "?>") {
                break;
            }
            end += 1;
        }
        self.push(TokenKind::Comment, end);
    }

    fn slash(&mut self) {
        match self.peek(1) {
            b'/' => self.line_comment(),
            b'*' => {
                let body = self.pos + 2;
                let end = self.src[body..]
                    .find("*/")
                    .map_or(self.bytes.len(), |at| body + at + 2);
                let is_doc = self.peek(2) == b'*' && self.peek(3).is_ascii_whitespace();
                let kind = if is_doc {
                    TokenKind::DocComment
                } else {
                    TokenKind::Comment
                };
                self.push(kind, end);
            }
            _ => self.operator(),
        }
    }

    fn dollar(&mut self) {
        if is_ident_start(self.peek(1)) {
            let len = self.bytes[self.pos + 1..]
                .iter()
                .take_while(|&&b| is_ident_char(b))
                .count();
            self.push(TokenKind::Variable, self.pos + 1 + len);
        } else {
            self.push(TokenKind::Dollar, self.pos + 1);
        }
    }

    // ─── Names ──────────────────────────────────────────────────────

    fn skip_blank(&self, mut at: usize) -> usize {
        while at < self.bytes.len() && self.bytes[at].is_ascii_whitespace() {
            at += 1;
        }
        at
    }

    fn identifier(&mut self) {
        let start = self.pos;
        let end = start
            + self.bytes[start..]
                .iter()
                .take_while(|&&b| is_ident_char(b))
                .count();
        let word = &self.src[start..end];

        // b"..." and b'...' binary strings
        if word.eq_ignore_ascii_case("b") {
            match self.bytes.get(end) {
                Some(b'\'') => return self.single_quoted(start),
                Some(b'"') => return self.double_quoted(start),
                _ => {}
            }
        }

        let member_name = matches!(
            self.last_code(0),
            Some(
                TokenKind::ObjectOperator
                    | TokenKind::NullsafeObjectOperator
                    | TokenKind::DoubleColon
                    | TokenKind::Function
                    | TokenKind::Const
            )
        ) || (self.last_code(0) == Some(TokenKind::BitwiseAnd)
            && self.last_code(1) == Some(TokenKind::Function));
        if member_name {
            return self.push(TokenKind::String, end);
        }

        let lower = word.to_ascii_lowercase();
        let next = self.skip_blank(end);
        let kind = match lower.as_str() {
            "yield" => {
                let from_end = next + 4;
                if next > end
                    && self.starts_with(next, "from")
                    && !self.bytes.get(from_end).is_some_and(|&b| is_ident_char(b))
                {
                    return self.push(TokenKind::YieldFrom, from_end);
                }
                TokenKind::Yield
            }
            "enum" => {
                let names_type = next > end
                    && self.bytes.get(next).is_some_and(|&b| is_ident_start(b))
                    && !self.starts_with(next, "extends")
                    && !self.starts_with(next, "implements");
                if names_type {
                    TokenKind::Enum
                } else {
                    TokenKind::String
                }
            }
            "match" => {
                if self.bytes.get(next) == Some(&b'(') {
                    TokenKind::Match
                } else {
                    TokenKind::String
                }
            }
            _ => keyword_kind(&lower).unwrap_or(TokenKind::String),
        };
        self.push(kind, end);
    }

    // ─── Numbers ────────────────────────────────────────────────────

    fn digits(&self, mut at: usize, valid: fn(u8) -> bool) -> usize {
        while at < self.bytes.len() {
            let b = self.bytes[at];
            if valid(b) {
                at += 1;
            } else if b == b'_' && self.bytes.get(at + 1).is_some_and(|&n| valid(n)) && at > 0 && valid(self.bytes[at - 1]) {
                at += 1;
            } else {
                break;
            }
        }
        at
    }

    fn number(&mut self) {
        let start = self.pos;
        let prefix = if self.peek(0) == b'0' {
            self.peek(1).to_ascii_lowercase()
        } else {
            0
        };
        let radix_digits: Option<fn(u8) -> bool> = match prefix {
            b'x' => Some(|b: u8| b.is_ascii_hexdigit()),
            b'b' => Some(|b: u8| b == b'0' || b == b'1'),
            b'o' => Some(|b: u8| (b'0'..=b'7').contains(&b)),
            _ => None,
        };
        if let Some(valid) = radix_digits {
            if self.bytes.get(start + 2).is_some_and(|&b| valid(b)) {
                let end = self.digits(start + 2, valid);
                let kind = if parse_int_literal(&self.src[start..end]).is_some() {
                    TokenKind::LNumber
                } else {
                    TokenKind::DNumber
                };
                return self.push(kind, end);
            }
        }

        let decimal = |b: u8| b.is_ascii_digit();
        let mut end = self.digits(start, decimal);
        let mut is_float = false;
        if self.bytes.get(end) == Some(&b'.') && self.bytes.get(end + 1) != Some(&b'.') {
            is_float = true;
            end += 1;
            if self.bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
                end = self.digits(end, decimal);
            }
        }
        if matches!(self.bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(self.bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            if self.bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                end = self.digits(exp, decimal);
            }
        }
        let kind = if is_float || parse_int_literal(&self.src[start..end]).is_none() {
            TokenKind::DNumber
        } else {
            TokenKind::LNumber
        };
        self.push(kind, end);
    }

    // ─── Strings ────────────────────────────────────────────────────

    fn single_quoted(&mut self, start: usize) {
        let quote = self.src[start..].find('\'').map_or(start, |at| start + at);
        let mut at = quote + 1;
        while at < self.bytes.len() {
            match self.bytes[at] {
                b'\\' => at += 2,
                b'\'' => {
                    at += 1;
                    break;
                }
                _ => at += 1,
            }
        }
        self.push_lines(TokenKind::ConstantEncapsedString, at);
    }

    /// Index just past the `}` closing an embedded expression starting at `open`.
    fn skip_embedded(&self, open: usize) -> usize {
        let mut depth = 0usize;
        let mut at = open;
        while at < self.bytes.len() {
            match self.bytes[at] {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return at + 1;
                    }
                }
                quote @ (b'\'' | b'"') => {
                    at += 1;
                    while at < self.bytes.len() && self.bytes[at] != quote {
                        if self.bytes[at] == b'\\' {
                            at += 1;
                        }
                        at += 1;
                    }
                }
                _ => {}
            }
            at += 1;
        }
        self.bytes.len()
    }

    fn double_quoted(&mut self, start: usize) {
        let quote = self.src[start..].find('"').map_or(start, |at| start + at);
        let mut at = quote + 1;
        let mut interpolated = false;
        while at < self.bytes.len() {
            let next = self.bytes.get(at + 1).copied().unwrap_or(0);
            match self.bytes[at] {
                b'\\' => at += 2,
                b'"' => {
                    at += 1;
                    break;
                }
                b'$' if is_ident_start(next) => {
                    interpolated = true;
                    at += 1;
                }
                b'$' if next == b'{' => {
                    interpolated = true;
                    at = self.skip_embedded(at + 1);
                }
                b'{' if next == b'$' => {
                    interpolated = true;
                    at = self.skip_embedded(at);
                }
                _ => at += 1,
            }
        }
        let kind = if interpolated {
            TokenKind::DoubleQuotedString
        } else {
            TokenKind::ConstantEncapsedString
        };
        self.push_lines(kind, at);
    }

    fn backtick(&mut self) {
        let mut at = self.pos + 1;
        while at < self.bytes.len() {
            match self.bytes[at] {
                b'\\' => at += 2,
                b'`' => {
                    at += 1;
                    break;
                }
                _ => at += 1,
            }
        }
        self.push_lines(TokenKind::Backtick, at);
    }

    /// `<<<LABEL`, `<<<"LABEL"` or `<<<'LABEL'` followed by a newline.
    /// Returns `false` without consuming anything when the opener is malformed.
    fn heredoc(&mut self) -> bool {
        let mut at = self.pos + 3;
        while matches!(self.bytes.get(at), Some(b' ' | b'\t')) {
            at += 1;
        }
        let quote = match self.bytes.get(at) {
            Some(&q @ (b'"' | b'\'')) => {
                at += 1;
                Some(q)
            }
            _ => None,
        };
        if !self.bytes.get(at).is_some_and(|&b| is_ident_start(b)) {
            return false;
        }
        let label_start = at;
        while self.bytes.get(at).is_some_and(|&b| is_ident_char(b)) {
            at += 1;
        }
        let label = self.src[label_start..at].to_string();
        if let Some(q) = quote {
            if self.bytes.get(at) != Some(&q) {
                return false;
            }
            at += 1;
        }
        if self.starts_with(at, "\r\n") {
            at += 2;
        } else if self.bytes.get(at) == Some(&b'\n') {
            at += 1;
        } else {
            return false;
        }

        let nowdoc = quote == Some(b'\'');
        let (start_kind, body_kind, end_kind) = if nowdoc {
            (TokenKind::StartNowdoc, TokenKind::NowdocBody, TokenKind::EndNowdoc)
        } else {
            (TokenKind::StartHeredoc, TokenKind::HeredocBody, TokenKind::EndHeredoc)
        };
        self.push(start_kind, at);

        while self.pos < self.bytes.len() {
            let indent_end = self.pos
                + self.bytes[self.pos..]
                    .iter()
                    .take_while(|&&b| b == b' ' || b == b'\t')
                    .count();
            let label_end = indent_end + label.len();
            let closes = self.bytes.get(indent_end..label_end) == Some(label.as_bytes())
                && !self.bytes.get(label_end).is_some_and(|&b| is_ident_char(b));
            if closes {
                self.push(end_kind, label_end);
                break;
            }
            let line_end = self.bytes[self.pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(self.bytes.len(), |nl| self.pos + nl + 1);
            self.push(body_kind, line_end);
        }
        true
    }

    // ─── Operators ──────────────────────────────────────────────────

    fn paren_or_cast(&mut self) {
        let mut at = self.pos + 1;
        while matches!(self.bytes.get(at), Some(b' ' | b'\t')) {
            at += 1;
        }
        let word_start = at;
        while self.bytes.get(at).is_some_and(|b| b.is_ascii_alphabetic()) {
            at += 1;
        }
        let word = self.src[word_start..at].to_ascii_lowercase();
        while matches!(self.bytes.get(at), Some(b' ' | b'\t')) {
            at += 1;
        }
        if self.bytes.get(at) == Some(&b')') {
            if let Some(kind) = cast_kind(&word) {
                return self.push(kind, at + 1);
            }
        }
        self.push(TokenKind::OpenParenthesis, self.pos + 1);
    }

    fn operator(&mut self) {
        for (text, kind) in OPERATORS {
            if self.bytes[self.pos..].starts_with(text.as_bytes()) {
                return self.push(*kind, self.pos + text.len());
            }
        }
        self.push(TokenKind::Unknown, self.pos + 1);
    }
}

/// Value of an integer literal in any base, `None` when it is not one or overflows.
pub(crate) fn parse_int_literal(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok();
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok();
    }
    if lower.len() > 1 && lower.starts_with('0') {
        return i64::from_str_radix(&lower[1..], 8).ok();
    }
    lower.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source, TokenizerProfile::Modern)
            .scan()
            .into_iter()
            .filter(|t| !t.kind.is_empty())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_inline_html_and_tags() {
        let tokens = Scanner::new("<p>\n<?php echo 1; ?>\n<b>", TokenizerProfile::Modern).scan();
        let summary: Vec<_> = tokens.iter().map(|t| (t.kind, t.content.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::InlineHtml, "<p>\n"),
                (TokenKind::OpenTag, "<?php "),
                (TokenKind::Echo, "echo"),
                (TokenKind::Whitespace, " "),
                (TokenKind::LNumber, "1"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Whitespace, " "),
                (TokenKind::CloseTag, "?>\n"),
                (TokenKind::InlineHtml, "<b>"),
            ]
        );
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 7);
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("<?php $a ??= $b ?? $c <=> $d ** 2 ?-> ..."),
            vec![
                TokenKind::OpenTag,
                TokenKind::Variable,
                TokenKind::CoalesceEqual,
                TokenKind::Variable,
                TokenKind::Coalesce,
                TokenKind::Variable,
                TokenKind::Spaceship,
                TokenKind::Variable,
                TokenKind::Pow,
                TokenKind::LNumber,
                TokenKind::NullsafeObjectOperator,
                TokenKind::Ellipsis,
            ]
        );
    }

    #[test]
    fn test_casts_and_parenthesis() {
        assert_eq!(
            kinds("<?php (real) $a; ( unset )$b; (foo)"),
            vec![
                TokenKind::OpenTag,
                TokenKind::DoubleCast,
                TokenKind::Variable,
                TokenKind::Semicolon,
                TokenKind::UnsetCast,
                TokenKind::Variable,
                TokenKind::Semicolon,
                TokenKind::OpenParenthesis,
                TokenKind::String,
                TokenKind::CloseParenthesis,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Scanner::new("<?php 1_000 0x1F 0o17 0b101 1.5 1e3 9223372036854775808", TokenizerProfile::Modern).scan();
        let numbers: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::LNumber | TokenKind::DNumber))
            .map(|t| (t.kind, t.content.as_str()))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (TokenKind::LNumber, "1_000"),
                (TokenKind::LNumber, "0x1F"),
                (TokenKind::LNumber, "0o17"),
                (TokenKind::LNumber, "0b101"),
                (TokenKind::DNumber, "1.5"),
                (TokenKind::DNumber, "1e3"),
                (TokenKind::DNumber, "9223372036854775808"),
            ]
        );
    }

    #[test]
    fn test_keywords_after_member_access_are_names() {
        assert_eq!(
            kinds("<?php $o->list; Foo::class; function list() {}"),
            vec![
                TokenKind::OpenTag,
                TokenKind::Variable,
                TokenKind::ObjectOperator,
                TokenKind::String,
                TokenKind::Semicolon,
                TokenKind::String,
                TokenKind::DoubleColon,
                TokenKind::String,
                TokenKind::Semicolon,
                TokenKind::Function,
                TokenKind::String,
                TokenKind::OpenParenthesis,
                TokenKind::CloseParenthesis,
                TokenKind::OpenCurlyBracket,
                TokenKind::CloseCurlyBracket,
            ]
        );
    }

    #[test]
    fn test_contextual_keywords() {
        assert_eq!(
            kinds("<?php yield from $g; enum Suit {} $enum; match($x) {}"),
            vec![
                TokenKind::OpenTag,
                TokenKind::YieldFrom,
                TokenKind::Variable,
                TokenKind::Semicolon,
                TokenKind::Enum,
                TokenKind::String,
                TokenKind::OpenCurlyBracket,
                TokenKind::CloseCurlyBracket,
                TokenKind::Variable,
                TokenKind::Semicolon,
                TokenKind::Match,
                TokenKind::OpenParenthesis,
                TokenKind::Variable,
                TokenKind::CloseParenthesis,
                TokenKind::OpenCurlyBracket,
                TokenKind::CloseCurlyBracket,
            ]
        );
    }

    #[test]
    fn test_strings_split_per_line() {
        let tokens = Scanner::new("<?php $a = \"one\ntwo $x\";", TokenizerProfile::Modern).scan();
        let pieces: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::DoubleQuotedString)
            .map(|t| (t.line, t.content.as_str()))
            .collect();
        assert_eq!(pieces, vec![(1, "\"one\n"), (2, "two $x\"")]);
    }

    #[test]
    fn test_embedded_expression_with_quotes() {
        let tokens = Scanner::new("<?php \"{$a[\"k\"]}\";", TokenizerProfile::Modern).scan();
        assert_eq!(tokens[1].kind, TokenKind::DoubleQuotedString);
        assert_eq!(tokens[1].content, "\"{$a[\"k\"]}\"");
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_heredoc() {
        let source = "<?php\n$x = <<<EOT\n  a\\u{41}\n  EOT;\n";
        let tokens = Scanner::new(source, TokenizerProfile::Modern).scan();
        let summary: Vec<_> = tokens
            .iter()
            .filter(|t| !t.kind.is_empty())
            .map(|t| (t.kind, t.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::OpenTag, "<?php\n"),
                (TokenKind::Variable, "$x"),
                (TokenKind::Equal, "="),
                (TokenKind::StartHeredoc, "<<<EOT\n"),
                (TokenKind::HeredocBody, "  a\\u{41}\n"),
                (TokenKind::EndHeredoc, "  EOT"),
                (TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_attribute_depends_on_profile() {
        let modern = Scanner::new("<?php #[Foo]\n", TokenizerProfile::Modern).scan();
        assert_eq!(modern[1].kind, TokenKind::Attribute);

        let legacy = Scanner::new("<?php #[Foo]\n", TokenizerProfile::Legacy).scan();
        assert_eq!(legacy[1].kind, TokenKind::Comment);
        assert_eq!(legacy[1].content, "#[Foo]\n");
    }

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("1_000"), Some(1000));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("0o17"), Some(15));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("1.5"), None);
    }
}
