use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// Non-fatal finding from a parse or serialize pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,

    /// Short machine-readable code, e.g. `unresolved-binding`
    pub rule: String,

    pub message: String,

    /// Byte range in the source text, when the finding came from parsing
    pub span: Option<Range<usize>>,

    pub element_id: Option<String>,
}

impl Diagnostic {
    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            rule: rule.into(),
            message: message.into(),
            span: None,
            element_id: None,
        }
    }

    pub fn info(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            ..Self::warning(rule, message)
        }
    }

    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            ..Self::warning(rule, message)
        }
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    pub fn for_element(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }
}

pub mod rules {
    pub const UNRESOLVED_BINDING: &str = "unresolved-binding";
    pub const RESERVED_ATTRIBUTE: &str = "reserved-attribute";
    pub const UNSUPPORTED_STATE: &str = "unsupported-state";
    pub const UNSUPPORTED_ATTRIBUTE: &str = "unsupported-attribute";
    pub const MISSING_CHILD: &str = "missing-child";
    pub const CYCLE: &str = "cycle";
    pub const GENERATED_ID: &str = "generated-id";
    pub const PARSE_FAILURE: &str = "parse-failure";
}
