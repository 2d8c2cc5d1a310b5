//! Export diagnostics and the per-invocation result report.
//!
//! Recoverable conditions never abort the pipeline; they are collected
//! here alongside the identifiers that were annotated successfully, so
//! the caller can decide whether a partial document is acceptable.

use serde::{Deserialize, Serialize};

/// What kind of recoverable condition a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Multiple curated matches existed for one metabolite; the first was
    /// chosen.
    MultipleMatches,
    /// A measurement unit had no registered conversion; values passed
    /// through unchanged.
    UnrecognizedUnit,
    /// A mass-based unit could not be converted because the metabolite has
    /// no curated molar mass.
    MissingMolarMass,
    /// The evaluation time fell outside the measured bracket of a series;
    /// the flux step was skipped rather than extrapolated.
    ExtrapolationSkipped,
    /// Neither a species nor a reaction could be matched for a metabolite.
    UnmatchedIdentity,
    /// A matched entity id was not present in the document.
    MissingEntity,
    /// Concentration or flux derivation failed for one metabolite.
    DerivationFailed,
    /// No per-sample biomass factor was found; the default was used.
    DefaultFactorUsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Info,
}

/// One recoverable condition encountered during an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// The accumulated outcome of one export invocation.
///
/// `annotated_species` and `bounded_reactions` list the document entities
/// that received values; metabolites missing from both lists were skipped
/// for a reason recorded in `diagnostics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportReport {
    pub annotated_species: Vec<String>,
    pub bounded_reactions: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning-severity diagnostic.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(kind, Severity::Warning, message));
    }

    /// Records an info-severity diagnostic.
    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(kind, Severity::Info, message));
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    /// Diagnostics of one kind, in the order they were recorded.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}
