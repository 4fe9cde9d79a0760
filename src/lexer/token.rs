//! Token definitions and the token stream consumed by the matchers

use serde::Serialize;

/// Token kinds for the PHP lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Structure
    OpenTag,
    OpenTagWithEcho,
    CloseTag,
    InlineHtml,
    Whitespace,
    Comment,
    DocComment,

    // Names and literals
    Variable,
    /// Identifier, function or constant name.
    String,
    NsSeparator,
    Dollar,
    LNumber,
    DNumber,
    ConstantEncapsedString,
    DoubleQuotedString,
    Backtick,
    StartHeredoc,
    HeredocBody,
    EndHeredoc,
    StartNowdoc,
    NowdocBody,
    EndNowdoc,
    True,
    False,
    Null,

    // Keywords
    Abstract,
    Array,
    As,
    Break,
    Callable,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    ElseIf,
    Empty,
    EndDeclare,
    EndFor,
    EndForeach,
    EndIf,
    EndSwitch,
    EndWhile,
    Enum,
    Eval,
    Exit,
    Extends,
    Final,
    Finally,
    Fn,
    For,
    Foreach,
    Function,
    Global,
    Goto,
    If,
    Implements,
    Include,
    IncludeOnce,
    InstanceOf,
    InsteadOf,
    Interface,
    Isset,
    List,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Match,
    Namespace,
    New,
    Print,
    Private,
    Protected,
    Public,
    Readonly,
    Require,
    RequireOnce,
    Return,
    Static,
    Switch,
    Throw,
    Trait,
    Try,
    Unset,
    Use,
    Var,
    While,
    Yield,
    YieldFrom,

    // Casts
    IntCast,
    DoubleCast,
    StringCast,
    BoolCast,
    ArrayCast,
    ObjectCast,
    UnsetCast,

    // Operators
    Equal,
    IsEqual,
    IsIdentical,
    IsNotEqual,
    IsNotIdentical,
    LessThan,
    GreaterThan,
    IsSmallerOrEqual,
    IsGreaterOrEqual,
    Spaceship,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    Pow,
    Inc,
    Dec,
    Concat,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseNot,
    Sl,
    Sr,
    BooleanAnd,
    BooleanOr,
    BooleanNot,
    PlusEqual,
    MinusEqual,
    MulEqual,
    DivEqual,
    ConcatEqual,
    ModEqual,
    PowEqual,
    AndEqual,
    OrEqual,
    XorEqual,
    SlEqual,
    SrEqual,
    Coalesce,
    CoalesceEqual,
    InlineThen,
    Colon,
    DoubleColon,
    ObjectOperator,
    NullsafeObjectOperator,
    DoubleArrow,
    Ellipsis,
    At,
    Semicolon,
    Comma,

    // Brackets
    OpenParenthesis,
    CloseParenthesis,
    OpenSquareBracket,
    CloseSquareBracket,
    OpenCurlyBracket,
    CloseCurlyBracket,
    /// `#[` as produced by tokenizers that know attributes.
    Attribute,
    AttributeEnd,

    Unknown,
}

impl TokenKind {
    /// Whitespace and comments; skipped by every significant-token search.
    pub fn is_empty(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }

    pub fn is_opener(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParenthesis
                | TokenKind::OpenSquareBracket
                | TokenKind::OpenCurlyBracket
                | TokenKind::Attribute
        )
    }

    pub fn is_closer(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParenthesis
                | TokenKind::CloseSquareBracket
                | TokenKind::CloseCurlyBracket
                | TokenKind::AttributeEnd
        )
    }

    pub fn is_cast(self) -> bool {
        matches!(
            self,
            TokenKind::IntCast
                | TokenKind::DoubleCast
                | TokenKind::StringCast
                | TokenKind::BoolCast
                | TokenKind::ArrayCast
                | TokenKind::ObjectCast
                | TokenKind::UnsetCast
        )
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::MulEqual
                | TokenKind::DivEqual
                | TokenKind::ConcatEqual
                | TokenKind::ModEqual
                | TokenKind::PowEqual
                | TokenKind::AndEqual
                | TokenKind::OrEqual
                | TokenKind::XorEqual
                | TokenKind::SlEqual
                | TokenKind::SrEqual
                | TokenKind::CoalesceEqual
        )
    }

    /// Pieces of a string literal that a tokenizer may split over several tokens.
    pub fn is_string_piece(self) -> bool {
        matches!(
            self,
            TokenKind::ConstantEncapsedString
                | TokenKind::DoubleQuotedString
                | TokenKind::HeredocBody
                | TokenKind::NowdocBody
        )
    }
}

/// Which generation of tokenizer produced a stream.
///
/// Older tokenizers do not know `#[` and hand it over as a `#` comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TokenizerProfile {
    #[default]
    Modern,
    Legacy,
}

/// A single token with the structural metadata resolved ahead of time
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    /// 1-indexed line
    pub line: usize,
    /// 1-indexed column (bytes)
    pub column: usize,
    /// Matching bracket for openers and closers.
    pub partner: Option<usize>,
    /// Number of brackets enclosing this token. An opener and its closer share a depth.
    pub nesting: usize,
    /// Innermost enclosing opener.
    pub enclosing: Option<usize>,
    /// Keyword owning a parenthesis pair (`list`, `function`, `empty`, ...).
    pub paren_owner: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            content: content.into(),
            line,
            column,
            partner: None,
            nesting: 0,
            enclosing: None,
            paren_owner: None,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Boundaries of a function, closure or class-like body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeInfo {
    pub owner: usize,
    pub opener: usize,
    pub closer: usize,
    /// Parameter list of functions and closures.
    pub parens: Option<(usize, usize)>,
}

/// A fully tokenized file. Read-only for the duration of an analysis.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    scopes: Vec<ScopeInfo>,
    profile: TokenizerProfile,
}

impl TokenStream {
    /// Build a stream from host-provided tokens, resolving brackets, owners and scopes.
    pub fn from_tokens(tokens: Vec<Token>, profile: TokenizerProfile) -> Self {
        let mut stream = Self {
            tokens,
            scopes: Vec::new(),
            profile,
        };
        super::structure::resolve(&mut stream.tokens, &mut stream.scopes);
        stream
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    pub fn kind(&self, idx: usize) -> Option<TokenKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    pub fn content(&self, idx: usize) -> &str {
        self.tokens.get(idx).map_or("", |t| t.content.as_str())
    }

    pub fn partner(&self, idx: usize) -> Option<usize> {
        self.tokens.get(idx).and_then(|t| t.partner)
    }

    pub fn profile(&self) -> TokenizerProfile {
        self.profile
    }

    pub fn scopes(&self) -> &[ScopeInfo] {
        &self.scopes
    }

    /// Scope owned by the keyword at `owner`.
    pub fn scope_of(&self, owner: usize) -> Option<&ScopeInfo> {
        self.scopes.iter().find(|s| s.owner == owner)
    }

    /// Innermost scope whose body contains `idx`.
    pub fn enclosing_scope(&self, idx: usize) -> Option<&ScopeInfo> {
        self.scopes
            .iter()
            .filter(|s| s.opener < idx && idx < s.closer)
            .max_by_key(|s| s.opener)
    }
}
