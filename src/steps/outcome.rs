//! Classified step results.

use serde::{Deserialize, Serialize};

/// Classification of a step or sub-action result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// The action accomplished its full intent.
    Success,
    /// Expected, benign condition such as "already exists".
    Warning,
    /// The action did not accomplish its intent.
    Failure,
}

impl OutcomeKind {
    /// Get a display character for this kind.
    pub fn display_char(&self) -> char {
        match self {
            OutcomeKind::Success => '✓',
            OutcomeKind::Warning => '⚠',
            OutcomeKind::Failure => '✗',
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Warning => "warning",
            OutcomeKind::Failure => "failure",
        };
        write!(f, "{}", s)
    }
}

/// One labeled entry in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Name of the step (or `preflight`) that produced this entry.
    pub step: String,

    /// Classification.
    pub kind: OutcomeKind,

    /// Human-readable description.
    pub message: String,

    /// Sub-items the message refers to (packages, ports, services).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

impl Outcome {
    /// Create an outcome without sub-items.
    pub fn new(step: &str, kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            kind,
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Create a success outcome.
    pub fn success(step: &str, message: impl Into<String>) -> Self {
        Self::new(step, OutcomeKind::Success, message)
    }

    /// Create a warning outcome.
    pub fn warning(step: &str, message: impl Into<String>) -> Self {
        Self::new(step, OutcomeKind::Warning, message)
    }

    /// Create a failure outcome.
    pub fn failure(step: &str, message: impl Into<String>) -> Self {
        Self::new(step, OutcomeKind::Failure, message)
    }

    /// Attach sub-items.
    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self
    }

    /// Whether this entry counts toward the error total.
    pub fn is_failure(&self) -> bool {
        self.kind == OutcomeKind::Failure
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        if self.items.is_empty() {
            format!("{}: {}", self.step, self.message)
        } else {
            format!("{}: {} ({})", self.step, self.message, self.items.join(", "))
        }
    }
}
