//! Diagnostics: non-fatal findings of a rename run.
//!
//! Nothing the engine finds while renaming aborts the run. Conflicts are
//! reported here (and through `tracing`) and resolution continues with a
//! deterministic choice.

use std::sync::Arc;

/// Diagnostic codes emitted by the rename engine.
pub mod codes {
    /// A method overrides methods from two unrelated declaring types.
    pub const DIAMOND_OVERRIDE: &str = "W0101";
    /// A decided alias could not be used and was replaced.
    pub const UNUSABLE_ALIAS: &str = "W0102";

    /// Stored presets were left untouched.
    pub const PRESET_NOT_OVERWRITTEN: &str = "I0101";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Info,
}

/// One finding, keyed by a code from [`codes`].
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: Arc<str>,
    /// Identity of the symbol the finding is about.
    pub subject: Option<Arc<str>>,
    /// Other symbols involved, in the order they were found.
    pub related: Vec<Arc<str>>,
}

impl Diagnostic {
    pub fn warning(code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn info(code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    fn new(severity: Severity, code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            subject: None,
            related: Vec::new(),
        }
    }

    pub fn about(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn involving(mut self, other: impl Into<Arc<str>>) -> Self {
        self.related.push(other.into());
        self
    }
}

pub(crate) fn diamond_override(signature: &str, first: &str, second: &str, root: &str) -> Diagnostic {
    Diagnostic::warning(
        codes::DIAMOND_OVERRIDE,
        format!("multiple overriding '{signature}' from '{first}' and '{second}' in '{root}'"),
    )
    .about(root)
    .involving(first)
    .involving(second)
}

pub(crate) fn unusable_alias(identity: &str, alias: &str, replacement: &str) -> Diagnostic {
    Diagnostic::warning(
        codes::UNUSABLE_ALIAS,
        format!("alias '{alias}' for '{identity}' is not a usable identifier, using '{replacement}'"),
    )
    .about(identity)
}

pub(crate) fn preset_not_overwritten(entries: usize) -> Diagnostic {
    Diagnostic::info(
        codes::PRESET_NOT_OVERWRITTEN,
        format!("stored presets kept, {entries} decided aliases not saved; set force_regenerate to overwrite"),
    )
}

// ============================================================================
// SINKS
// ============================================================================

/// Receiver of diagnostics emitted during a run.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that keeps everything in arrival order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    items: Vec<Diagnostic>,
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn by_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    /// Hand the collected diagnostics to the caller and start over.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
