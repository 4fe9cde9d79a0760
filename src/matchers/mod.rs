//! Feature matchers
//!
//! A matcher inspects the token window around an anchor and returns what it
//! recognised. Matchers are plain function pointers registered in
//! [`MATCHERS`]; [`matchers_for`] serves the dispatch table keyed by token
//! kind. None of them keeps state between invocations.

mod attributes;
mod expressions;
mod lists;
mod numeric;
mod simple;
mod strings;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::features::Feature;
use crate::lexer::{TokenKind, TokenStream};

pub use attributes::{normalize_attribute, AttributeSpan};

/// How a match is to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framing {
    /// Gated by the feature timeline and the configured range.
    VersionGated,
    /// Malformed in every version; always an error for a configured range.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub feature: Feature,
    pub anchor: usize,
    /// Byte offset of the construct inside the anchor token.
    pub offset: usize,
    pub found: Option<String>,
    /// Last token consumed; the same matcher is not run again up to here.
    pub skip_to: Option<usize>,
    pub framing: Framing,
}

impl MatchResult {
    pub fn new(feature: Feature, anchor: usize) -> Self {
        Self {
            feature,
            anchor,
            offset: 0,
            found: None,
            skip_to: None,
            framing: Framing::VersionGated,
        }
    }

    pub fn invalid(feature: Feature, anchor: usize) -> Self {
        Self {
            framing: Framing::Invalid,
            ..Self::new(feature, anchor)
        }
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_skip_to(mut self, skip_to: usize) -> Self {
        self.skip_to = Some(skip_to);
        self
    }
}

pub type MatchFn = fn(&TokenStream, usize) -> Vec<MatchResult>;

pub struct Matcher {
    pub name: &'static str,
    pub anchors: &'static [TokenKind],
    /// Every feature the matcher may report.
    pub features: &'static [Feature],
    pub run: MatchFn,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.name)
            .field("anchors", &self.anchors)
            .field("features", &self.features)
            .finish()
    }
}

pub const MATCHERS: &[Matcher] = &[
    Matcher {
        name: "simple",
        anchors: simple::SIMPLE_ANCHORS,
        features: simple::SIMPLE_FEATURES,
        run: simple::run,
    },
    Matcher {
        name: "lists",
        anchors: &[TokenKind::List, TokenKind::OpenSquareBracket],
        features: &[
            Feature::NewShortArray,
            Feature::NewShortList,
            Feature::NewKeyedList,
            Feature::NewListReferenceAssignment,
            Feature::AssignmentOrder,
            Feature::ForbiddenEmptyList,
        ],
        run: lists::run,
    },
    Matcher {
        name: "throw_expression",
        anchors: &[TokenKind::Throw],
        features: &[Feature::NewThrowExpression],
        run: expressions::throw_expression,
    },
    Matcher {
        name: "instantiation",
        anchors: &[TokenKind::New],
        features: &[
            Feature::NewClassMemberAccess,
            Feature::NewMemberAccessWithoutParens,
            Feature::NewAnonymousClasses,
        ],
        run: expressions::instantiation,
    },
    Matcher {
        name: "unicode_escape",
        anchors: &[
            TokenKind::ConstantEncapsedString,
            TokenKind::DoubleQuotedString,
            TokenKind::StartHeredoc,
            TokenKind::Backtick,
        ],
        features: &[Feature::NewUnicodeEscape],
        run: strings::unicode_escape,
    },
    Matcher {
        name: "dollar_brace_embed",
        anchors: &[
            TokenKind::DoubleQuotedString,
            TokenKind::StartHeredoc,
            TokenKind::Backtick,
        ],
        features: &[Feature::DeprecatedDollarBraceEmbed],
        run: strings::dollar_brace_embed,
    },
    Matcher {
        name: "flexible_heredoc",
        anchors: &[TokenKind::EndHeredoc, TokenKind::EndNowdoc],
        features: &[Feature::NewFlexibleHeredoc],
        run: strings::flexible_heredoc,
    },
    Matcher {
        name: "attributes",
        anchors: &[TokenKind::Attribute, TokenKind::Comment],
        features: &[Feature::NewAttributes],
        run: attributes::run,
    },
    Matcher {
        name: "negative_bitshift",
        anchors: &[TokenKind::Sl, TokenKind::Sr, TokenKind::SlEqual, TokenKind::SrEqual],
        features: &[Feature::ForbiddenNegativeBitshift],
        run: numeric::negative_bitshift,
    },
    Matcher {
        name: "break_continue",
        anchors: &[TokenKind::Break, TokenKind::Continue],
        features: &[
            Feature::RemovedBreakContinueVariable,
            Feature::RemovedBreakContinueZero,
        ],
        run: numeric::break_continue,
    },
    Matcher {
        name: "empty_non_variable",
        anchors: &[TokenKind::Empty],
        features: &[Feature::NewEmptyNonVariable],
        run: numeric::empty_non_variable,
    },
    Matcher {
        name: "duplicate_parameters",
        anchors: &[TokenKind::Function, TokenKind::Fn],
        features: &[Feature::ForbiddenDuplicateParameters],
        run: numeric::duplicate_parameters,
    },
];

static DISPATCH: Lazy<HashMap<TokenKind, Vec<usize>>> = Lazy::new(|| {
    let mut table: HashMap<TokenKind, Vec<usize>> = HashMap::new();
    for (idx, matcher) in MATCHERS.iter().enumerate() {
        for kind in matcher.anchors {
            table.entry(*kind).or_default().push(idx);
        }
    }
    table
});

/// Indices into [`MATCHERS`] registered for `kind`, in registration order.
pub fn matchers_for(kind: TokenKind) -> &'static [usize] {
    DISPATCH.get(&kind).map(Vec::as_slice).unwrap_or(&[])
}
