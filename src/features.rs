//! Feature registry (centralized version timelines)
//!
//! Every detectable construct has one [`FeatureDescriptor`] in
//! [`FEATURE_SPECS`]. The table is compiled in and indexed once into the
//! process-wide [`FeatureRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{CompatError, Result};
use crate::version::{Version, VersionRange};
use Availability::{Deprecated, Introduced, Removed};

/// Declares [`Feature`] together with [`Feature::ALL`] and the textual ids.
macro_rules! features {
    ($($name:ident),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum Feature {
            $($name,)*
        }

        impl Feature {
            pub const ALL: &'static [Feature] = &[$(Feature::$name,)*];

            /// Stable textual id, used for suppression and registry lookups.
            pub fn id(self) -> &'static str {
                match self {
                    $(Feature::$name => stringify!($name),)*
                }
            }
        }
    };
}

features! {
    NewGoto,
    NewTraits,
    NewBinaryLiteral,
    NewShortArray,
    NewClassMemberAccess,
    NewGenerators,
    NewClassNameResolution,
    NewEmptyNonVariable,
    NewPow,
    NewPowEqual,
    NewEllipsis,
    NewCoalesce,
    NewSpaceship,
    NewYieldFrom,
    NewAnonymousClasses,
    NewUnicodeEscape,
    NewKeyedList,
    NewShortList,
    NewListReferenceAssignment,
    NewFlexibleHeredoc,
    NewCoalesceEqual,
    NewArrowFunction,
    NewNumericLiteralSeparator,
    NewNullsafeOperator,
    NewMatchExpression,
    NewThrowExpression,
    NewAttributes,
    NewEnum,
    NewReadonly,
    NewExplicitOctal,
    NewMemberAccessWithoutParens,
    RemovedBreakContinueVariable,
    RemovedBreakContinueZero,
    AssignmentOrder,
    ForbiddenEmptyList,
    ForbiddenNegativeBitshift,
    ForbiddenDuplicateParameters,
    RemovedUnsetCast,
    RemovedRealCast,
    DeprecatedDollarBraceEmbed,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Feature {
    type Err = CompatError;

    fn from_str(raw: &str) -> Result<Self> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.id().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| CompatError::UnknownFeature(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Introduced,
    Deprecated,
    Removed,
}

/// Version timeline and message data of one feature
#[derive(Debug)]
pub struct FeatureDescriptor {
    pub feature: Feature,
    /// Stem of the diagnostic code (`PHPC-{code}`)
    pub code: &'static str,
    pub timeline: &'static [(Version, Availability)],
    pub description: &'static str,
    pub alternative: Option<&'static str>,
    /// Replaces the default sentence for version-gated results.
    pub message: Option<&'static str>,
    /// Template for occurrences that are malformed in every version.
    pub invalid_message: Option<&'static str>,
}

impl FeatureDescriptor {
    fn event(&self, availability: Availability) -> Option<Version> {
        self.timeline
            .iter()
            .find(|(_, a)| *a == availability)
            .map(|(v, _)| *v)
    }

    pub fn introduced(&self) -> Option<Version> {
        self.event(Availability::Introduced)
    }

    pub fn deprecated(&self) -> Option<Version> {
        self.event(Availability::Deprecated)
    }

    pub fn removed(&self) -> Option<Version> {
        self.event(Availability::Removed)
    }
}

const fn v(major: u32, minor: u32) -> Version {
    Version::new(major, minor)
}

/// Feature timelines, in catalogue order
pub const FEATURE_SPECS: &[FeatureDescriptor] = &[
    FeatureDescriptor {
        feature: Feature::NewGoto,
        code: "NEW-GOTO",
        timeline: &[(v(5, 3), Introduced)],
        description: "goto",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewTraits,
        code: "NEW-TRAITS",
        timeline: &[(v(5, 4), Introduced)],
        description: "Traits",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewBinaryLiteral,
        code: "NEW-BINARY-LITERAL",
        timeline: &[(v(5, 4), Introduced)],
        description: "Binary integer literals",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewShortArray,
        code: "NEW-SHORT-ARRAY",
        timeline: &[(v(5, 4), Introduced)],
        description: "Short array syntax []",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewClassMemberAccess,
        code: "NEW-CLASS-MEMBER-ACCESS",
        timeline: &[(v(5, 4), Introduced)],
        description: "Class member access on object instantiation",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewGenerators,
        code: "NEW-GENERATORS",
        timeline: &[(v(5, 5), Introduced)],
        description: "Generators (yield)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewClassNameResolution,
        code: "NEW-CLASS-NAME-RESOLUTION",
        timeline: &[(v(5, 5), Introduced)],
        description: "Class name resolution using ::class",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewEmptyNonVariable,
        code: "NEW-EMPTY-NON-VARIABLE",
        timeline: &[(v(5, 5), Introduced)],
        description: "Passing a non-variable expression to empty()",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewPow,
        code: "NEW-POW",
        timeline: &[(v(5, 6), Introduced)],
        description: "The power operator (**)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewPowEqual,
        code: "NEW-POW-EQUAL",
        timeline: &[(v(5, 6), Introduced)],
        description: "The power assignment operator (**=)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewEllipsis,
        code: "NEW-ELLIPSIS",
        timeline: &[(v(5, 6), Introduced)],
        description: "Variadic functions and argument unpacking (...)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewCoalesce,
        code: "NEW-COALESCE",
        timeline: &[(v(7, 0), Introduced)],
        description: "The null coalescing operator (??)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewSpaceship,
        code: "NEW-SPACESHIP",
        timeline: &[(v(7, 0), Introduced)],
        description: "The spaceship operator (<=>)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewYieldFrom,
        code: "NEW-YIELD-FROM",
        timeline: &[(v(7, 0), Introduced)],
        description: "Generator delegation using yield from",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewAnonymousClasses,
        code: "NEW-ANONYMOUS-CLASSES",
        timeline: &[(v(7, 0), Introduced)],
        description: "Anonymous classes",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewUnicodeEscape,
        code: "NEW-UNICODE-ESCAPE",
        timeline: &[(v(7, 0), Introduced)],
        description: "Unicode codepoint escape sequences (\\u{...})",
        alternative: None,
        message: None,
        invalid_message: Some(
            "A string containing an invalid unicode codepoint escape sequence is a fatal error since PHP {version}",
        ),
    },
    FeatureDescriptor {
        feature: Feature::NewKeyedList,
        code: "NEW-KEYED-LIST",
        timeline: &[(v(7, 1), Introduced)],
        description: "Specifying keys in list constructs",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewShortList,
        code: "NEW-SHORT-LIST",
        timeline: &[(v(7, 1), Introduced)],
        description: "The shorthand list syntax [] to destructure arrays",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewListReferenceAssignment,
        code: "NEW-LIST-REFERENCE-ASSIGNMENT",
        timeline: &[(v(7, 3), Introduced)],
        description: "Reference assignments within list constructs",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewFlexibleHeredoc,
        code: "NEW-FLEXIBLE-HEREDOC",
        timeline: &[(v(7, 3), Introduced)],
        description: "Indented or non-standalone heredoc/nowdoc closing markers",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewCoalesceEqual,
        code: "NEW-COALESCE-EQUAL",
        timeline: &[(v(7, 4), Introduced)],
        description: "The null coalescing assignment operator (??=)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewArrowFunction,
        code: "NEW-ARROW-FUNCTION",
        timeline: &[(v(7, 4), Introduced)],
        description: "Arrow functions",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewNumericLiteralSeparator,
        code: "NEW-NUMERIC-LITERAL-SEPARATOR",
        timeline: &[(v(7, 4), Introduced)],
        description: "The numeric literal separator (_)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewNullsafeOperator,
        code: "NEW-NULLSAFE-OPERATOR",
        timeline: &[(v(8, 0), Introduced)],
        description: "The nullsafe object operator (?->)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewMatchExpression,
        code: "NEW-MATCH-EXPRESSION",
        timeline: &[(v(8, 0), Introduced)],
        description: "Match expressions",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewThrowExpression,
        code: "NEW-THROW-EXPRESSION",
        timeline: &[(v(8, 0), Introduced)],
        description: "Throw as an expression",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewAttributes,
        code: "NEW-ATTRIBUTES",
        timeline: &[(v(8, 0), Introduced)],
        description: "Attributes",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewEnum,
        code: "NEW-ENUM",
        timeline: &[(v(8, 1), Introduced)],
        description: "Enumerations",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewReadonly,
        code: "NEW-READONLY",
        timeline: &[(v(8, 1), Introduced)],
        description: "Readonly properties",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewExplicitOctal,
        code: "NEW-EXPLICIT-OCTAL",
        timeline: &[(v(8, 1), Introduced)],
        description: "Explicit octal integer notation (0o)",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::NewMemberAccessWithoutParens,
        code: "NEW-MEMBER-ACCESS-WITHOUT-PARENS",
        timeline: &[(v(8, 4), Introduced)],
        description: "Class member access on instantiation without parentheses",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::RemovedBreakContinueVariable,
        code: "REMOVED-BREAK-CONTINUE-VARIABLE",
        timeline: &[(v(5, 4), Removed)],
        description: "Using a variable argument on break or continue",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::RemovedBreakContinueZero,
        code: "REMOVED-BREAK-CONTINUE-ZERO",
        timeline: &[(v(5, 4), Removed)],
        description: "Using 0 as the argument of break or continue",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::AssignmentOrder,
        code: "ASSIGNMENT-ORDER",
        timeline: &[(v(7, 0), Removed)],
        description: "Right-to-left list() assignment order",
        alternative: None,
        message: Some(
            "list() assigns variables from left to right since PHP {version}; make sure all variables in list() are unique",
        ),
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::ForbiddenEmptyList,
        code: "FORBIDDEN-EMPTY-LIST",
        timeline: &[(v(7, 0), Removed)],
        description: "Empty list() assignments",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::ForbiddenNegativeBitshift,
        code: "FORBIDDEN-NEGATIVE-BITSHIFT",
        timeline: &[(v(7, 0), Removed)],
        description: "Bitwise shifts by a negative number",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::ForbiddenDuplicateParameters,
        code: "FORBIDDEN-DUPLICATE-PARAMETERS",
        timeline: &[(v(7, 0), Removed)],
        description: "Declaring several function parameters with the same name",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::RemovedUnsetCast,
        code: "REMOVED-UNSET-CAST",
        timeline: &[(v(7, 2), Deprecated), (v(8, 0), Removed)],
        description: "The (unset) cast",
        alternative: None,
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::RemovedRealCast,
        code: "REMOVED-REAL-CAST",
        timeline: &[(v(7, 4), Deprecated), (v(8, 0), Removed)],
        description: "The (real) cast",
        alternative: Some("(float)"),
        message: None,
        invalid_message: None,
    },
    FeatureDescriptor {
        feature: Feature::DeprecatedDollarBraceEmbed,
        code: "DEPRECATED-DOLLAR-BRACE-EMBED",
        timeline: &[(v(8, 2), Deprecated)],
        description: "Embedding variables in strings using ${...}",
        alternative: Some("{$...}"),
        message: None,
        invalid_message: None,
    },
];

/// The single transition that matters for a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Absent in `last_without` and every release below it.
    NotIntroduced { last_without: Version },
    Deprecated { since: Version },
    Removed {
        since: Version,
        deprecated: Option<Version>,
    },
}

impl Transition {
    /// Version substituted for `{version}` in message templates.
    pub fn version(&self) -> Version {
        match self {
            Transition::NotIntroduced { last_without } => *last_without,
            Transition::Deprecated { since } | Transition::Removed { since, .. } => *since,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub not_in_version: Option<Version>,
    pub deprecated: Option<Version>,
    pub removed: Option<Version>,
}

impl VersionInfo {
    /// Not-yet-introduced wins over removed, removed wins over deprecated.
    pub fn relevant(&self) -> Option<Transition> {
        if let Some(last_without) = self.not_in_version {
            return Some(Transition::NotIntroduced { last_without });
        }
        if let Some(since) = self.removed {
            return Some(Transition::Removed {
                since,
                deprecated: self.deprecated,
            });
        }
        self.deprecated.map(|since| Transition::Deprecated { since })
    }
}

/// Derive which transitions of `descriptor` fall inside `range`.
pub fn version_info(descriptor: &FeatureDescriptor, range: &VersionRange) -> VersionInfo {
    let not_in_version = descriptor
        .introduced()
        .and_then(|introduced| introduced.previous_release())
        .filter(|&prev| range.should_run_on_or_below(prev));
    let deprecated = descriptor
        .deprecated()
        .filter(|&d| range.should_run_on_or_above(d));
    let removed = descriptor
        .removed()
        .filter(|&r| range.should_run_on_or_above(r));
    VersionInfo {
        not_in_version,
        deprecated,
        removed,
    }
}

/// Timeline ordering rules every descriptor must satisfy.
pub fn timeline_is_valid(timeline: &[(Version, Availability)]) -> bool {
    let increasing = timeline.windows(2).all(|pair| pair[0].0 < pair[1].0);
    let count = |a: Availability| timeline.iter().filter(|(_, x)| *x == a).count();
    let position = |a: Availability| timeline.iter().position(|(_, x)| *x == a);
    let deprecation_first = match (position(Availability::Deprecated), position(Availability::Removed)) {
        (Some(d), Some(r)) => d < r,
        _ => true,
    };
    !timeline.is_empty()
        && increasing
        && count(Availability::Introduced) <= 1
        && count(Availability::Removed) <= 1
        && count(Availability::Deprecated) <= 1
        && deprecation_first
}

static GLOBAL_REGISTRY: Lazy<FeatureRegistry> = Lazy::new(|| FeatureRegistry::from_specs(FEATURE_SPECS));

/// Lookup table over a static descriptor set
#[derive(Debug)]
pub struct FeatureRegistry {
    specs: &'static [FeatureDescriptor],
    by_id: HashMap<&'static str, usize>,
}

impl FeatureRegistry {
    /// The compiled-in registry shared by every analysis in the process.
    pub fn global() -> &'static FeatureRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn from_specs(specs: &'static [FeatureDescriptor]) -> Self {
        let by_id = specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.feature.id(), idx))
            .collect();
        Self { specs, by_id }
    }

    pub fn lookup(&self, id: &str) -> Result<&'static FeatureDescriptor> {
        self.by_id
            .get(id)
            .map(|&idx| &self.specs[idx])
            .ok_or_else(|| CompatError::UnknownFeature(id.to_string()))
    }

    pub fn get(&self, feature: Feature) -> Result<&'static FeatureDescriptor> {
        self.lookup(feature.id())
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.by_id.contains_key(feature.id())
    }

    pub fn descriptors(&self) -> &'static [FeatureDescriptor] {
        self.specs
    }
}
