//! fluxml Rust Library
//!
//! This library embeds experimental measurement data into SBML-style
//! metabolic model documents, including:
//! - Grouping heterogeneous time-series measurements by metabolite
//! - Reducing all series to a shared valid evaluation-time domain
//! - Matching metabolite names to model species and exchange reactions
//! - Deriving biomass-normalized concentrations and fluxes
//! - Rewriting species notes and reaction flux bounds in place

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::annotate::*;
    pub use crate::density::{BiomassCurveBuilder, ConstantFactor, DensityCurve, FactorSource};
    pub use crate::document::{AnnotatableDocument, AnnotationBlock, NoteValue};
    pub use crate::domain::{TimeDomain, TimeDomainReducer};
    pub use crate::error::ExportError;
    pub use crate::export::SbmlFluxExport;
    pub use crate::flux::{ConcentrationSample, FluxDeriver};
    pub use crate::interpolate::interpolate_at;
    pub use crate::matching::{EntityCatalog, EntityMatch, IdentityMatcher, InMemoryCatalog};
    pub use crate::report::{Diagnostic, DiagnosticKind, ExportReport, Severity};
    pub use crate::sbml::model::*;
    pub use crate::series::*;
    pub use crate::units::{Conversion, UnitRegistry};
}

/// Embedding of derived values into the model document
pub mod annotate;

/// Biomass density curve construction
pub mod density;

/// Narrow capability interface over the target model document
pub mod document;

/// Evaluation-time domain reduction
pub mod domain;

/// Fatal export errors
pub mod error;

/// The export pipeline orchestrator
pub mod export;

/// Concentration and flux derivation
pub mod flux;

/// Linear interpolation over sorted point sequences
pub mod interpolate;

/// Name-based matching of metabolites to model entities
pub mod matching;

/// Export diagnostics and reporting
pub mod report;

/// In-memory SBML-style document handling
pub mod sbml {
    /// Model document structures
    pub mod model;
    /// XHTML note-body parsing and writing
    pub mod notes;
}

/// Measurement data model
pub mod series;

/// Unit conversion registry
pub mod units;
