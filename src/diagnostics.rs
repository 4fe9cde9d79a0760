//! Diagnostics - severity policy, message rendering and output

use serde::Serialize;
use std::path::Path;

use crate::features::{version_info, FeatureDescriptor, Transition};
use crate::lexer::TokenStream;
use crate::matchers::{Framing, MatchResult};
use crate::version::{Version, VersionRange};

pub const LEGACY_TOKENIZER_CODE: &str = "PHPC-LEGACY-TOKENIZER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticSpan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    /// Id of the feature that produced this diagnostic.
    pub feature: String,
    /// Index of the anchor token in the analysed stream.
    pub anchor: usize,
    pub span: DiagnosticSpan,
    /// Positional arguments: description, version, found text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn add(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            let file = diag.span.file.as_deref().unwrap_or("<input>");
            out.push_str(&format!(
                "[{}] {}:{}:{} {}: {}\n",
                diag.code,
                file,
                diag.span.line,
                diag.span.column,
                diag.severity.as_str(),
                diag.message
            ));
        }
        out
    }
}

/// Span covering the anchor token, which may run over several lines.
pub fn span_for_token(file: Option<&Path>, stream: &TokenStream, anchor: usize) -> DiagnosticSpan {
    span_at_offset(file, stream, anchor, 0)
}

/// Span from byte `offset` of the anchor token to the token's end.
pub fn span_at_offset(file: Option<&Path>, stream: &TokenStream, anchor: usize, offset: usize) -> DiagnosticSpan {
    let file = file.map(|p| p.display().to_string());
    let Some(token) = stream.get(anchor) else {
        return DiagnosticSpan {
            file,
            line: 1,
            column: 1,
            end_line: 1,
            end_column: 1,
        };
    };
    let content = token.content.trim_end_matches(['\r', '\n']);
    let offset = offset.min(content.len());

    let (mut line, mut column) = (token.line, token.column);
    for b in content.bytes().take(offset) {
        if b == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    // End is the position of the last byte.
    let (mut end_line, mut end_column) = (line, column);
    let (mut at_line, mut at_column) = (line, column);
    for b in content.bytes().skip(offset) {
        if b == b'\n' {
            at_line += 1;
            at_column = 1;
        } else {
            (end_line, end_column) = (at_line, at_column);
            at_column += 1;
        }
    }
    DiagnosticSpan {
        file,
        line,
        column,
        end_line,
        end_column,
    }
}

/// Severity and transition of `descriptor` for `range`, or `None` when silent.
pub fn classify(descriptor: &FeatureDescriptor, range: &VersionRange) -> Option<(Severity, Transition)> {
    let transition = version_info(descriptor, range).relevant()?;
    let severity = match transition {
        Transition::NotIntroduced { .. } | Transition::Removed { .. } => Severity::Error,
        Transition::Deprecated { .. } => Severity::Warning,
    };
    Some((severity, transition))
}

/// Message template for a version-gated transition.
pub fn template_for(descriptor: &FeatureDescriptor, transition: &Transition) -> String {
    if let Some(message) = descriptor.message {
        return message.to_string();
    }
    let mut template = match transition {
        Transition::NotIntroduced { .. } => {
            "{description} is not present in PHP version {version} or earlier".to_string()
        }
        Transition::Deprecated { .. } => "{description} is deprecated since PHP {version}".to_string(),
        Transition::Removed {
            deprecated: Some(deprecated),
            ..
        } => format!("{{description}} is deprecated since PHP {deprecated} and removed since PHP {{version}}"),
        Transition::Removed { deprecated: None, .. } => {
            "{description} is removed since PHP {version}".to_string()
        }
    };
    if descriptor.alternative.is_some() && !matches!(transition, Transition::NotIntroduced { .. }) {
        template.push_str("; Use {alternative} instead");
    }
    template
}

/// Fill a template. Found text is appended when the template has no slot for it.
pub fn render(template: &str, descriptor: &FeatureDescriptor, version: Version, found: Option<&str>) -> String {
    let mut message = template
        .replace("{description}", descriptor.description)
        .replace("{version}", &version.to_string())
        .replace("{alternative}", descriptor.alternative.unwrap_or(""));
    match found {
        Some(found) if message.contains("{found}") => message = message.replace("{found}", found),
        Some(found) => {
            message.push_str(". Found: ");
            message.push_str(found);
        }
        None => message = message.replace("{found}", ""),
    }
    message
}

/// Turn a match into a diagnostic, or nothing when the range allows the construct.
pub fn emit(
    descriptor: &FeatureDescriptor,
    range: &VersionRange,
    result: &MatchResult,
    stream: &TokenStream,
    file: Option<&Path>,
) -> Option<Diagnostic> {
    let found = result.found.as_deref();
    let (severity, code, version, message) = match result.framing {
        Framing::VersionGated => {
            let (severity, transition) = classify(descriptor, range)?;
            let version = transition.version();
            let template = template_for(descriptor, &transition);
            let message = render(&template, descriptor, version, found);
            (severity, format!("PHPC-{}", descriptor.code), version, message)
        }
        Framing::Invalid => {
            if !range.is_configured() {
                return None;
            }
            let version = descriptor.introduced().or(descriptor.removed())?;
            let template = descriptor
                .invalid_message
                .unwrap_or("{description} is malformed and is a fatal error since PHP {version}");
            let message = render(template, descriptor, version, found);
            (Severity::Error, format!("PHPC-{}-INVALID", descriptor.code), version, message)
        }
    };

    let mut args = vec![descriptor.description.to_string(), version.to_string()];
    if let Some(found) = found {
        args.push(found.to_string());
    }
    Some(Diagnostic {
        code,
        message,
        severity,
        feature: descriptor.feature.id().to_string(),
        anchor: result.anchor,
        span: span_at_offset(file, stream, result.anchor, result.offset),
        args,
    })
}

/// Once-per-run notice for streams produced by a tokenizer without attribute tokens.
pub fn legacy_tokenizer_notice(stream: &TokenStream, file: Option<&Path>) -> Diagnostic {
    Diagnostic {
        code: LEGACY_TOKENIZER_CODE.to_string(),
        message: "The token stream comes from a legacy tokenizer; attributes are recovered from comment tokens"
            .to_string(),
        severity: Severity::Warning,
        feature: String::new(),
        anchor: 0,
        span: span_for_token(file, stream, 0),
        args: Vec::new(),
    }
}
