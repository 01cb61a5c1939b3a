// diag.rs — Diagnostics model
//
// Load and validation passes recover from bad input by skipping the offending
// entity and recording a diagnostic instead of failing. Diagnostics point at
// graph entities rather than source spans.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

use crate::id::{LinkId, NodeId};

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `W0101`).
///
/// Once assigned, a code must never be reassigned to a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered diagnostic codes.
pub mod codes {
    use super::DiagCode;

    /// Node record names a kind tag the registry does not know.
    pub const UNKNOWN_NODE_KIND: DiagCode = DiagCode("W0101");
    /// Node record collides with an already restored node or pin id, or its
    /// pin range runs past the id space.
    pub const DUPLICATE_NODE_ID: DiagCode = DiagCode("W0102");
    /// More than one output node in a snapshot.
    pub const EXTRA_OUTPUT_NODE: DiagCode = DiagCode("W0103");
    /// Parameter vector length differs from the definition.
    pub const PARAMETER_LENGTH: DiagCode = DiagCode("W0104");
    /// Snapshot had no output node; a fresh one was created.
    pub const MISSING_OUTPUT_NODE: DiagCode = DiagCode("W0105");
    /// Link endpoint does not resolve to a restored pin.
    pub const INVALID_LINK_ENDPOINTS: DiagCode = DiagCode("W0201");
    /// Link endpoints resolve but fail link validation, land on an already
    /// linked single input, or repeat an existing link.
    pub const REJECTED_LINK: DiagCode = DiagCode("W0202");
    /// Link id already used by a restored link or node, or outside the id
    /// space.
    pub const DUPLICATE_LINK_ID: DiagCode = DiagCode("W0203");
    /// Snapshot had no output node and no id range is left to create one.
    pub const NO_ROOM_FOR_OUTPUT: DiagCode = DiagCode("E0106");
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Subject ──────────────────────────────────────────────────────────────

/// The graph entity a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Graph,
    Node(NodeId),
    Link(LinkId),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Graph => write!(f, "graph"),
            Subject::Node(id) => write!(f, "{}", id),
            Subject::Link(id) => write!(f, "{}", id),
        }
    }
}

// ── Diagnostic ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub subject: Subject,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code or hint.
    pub fn new(level: DiagLevel, subject: Subject, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            subject,
            message: message.into(),
            hint: None,
        }
    }

    pub fn warning(subject: Subject, message: impl Into<String>) -> Self {
        Self::new(DiagLevel::Warning, subject, message)
    }

    pub fn error(subject: Subject, message: impl Into<String>) -> Self {
        Self::new(DiagLevel::Error, subject, message)
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}: {}", level, code, self.subject, self.message)?;
        } else {
            write!(f, "{}: {}: {}", level, self.subject, self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

/// True when any diagnostic is error-level.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.level == DiagLevel::Error)
}
