//! Fatal export errors.
//!
//! These abort the whole export: without a usable evaluation time or a
//! biomass growth curve there is nothing meaningful to embed. Everything
//! recoverable per metabolite is collected as a
//! [`Diagnostic`](crate::report::Diagnostic) instead.

use thiserror::Error;

/// Errors that abort an export invocation.
#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    /// No measurement series contributed any data points, so no time
    /// domain could be established.
    #[error("no measurement series contributed any data points")]
    NoMeasurementData,

    /// The observed time ranges of the selected series do not overlap.
    #[error("measurement time ranges do not overlap: lower bound {lower} exceeds upper bound {upper}")]
    EmptyTimeRange { lower: f64, upper: f64 },

    /// Non-interpolating series exist but share no common time point
    /// inside the reduced domain.
    #[error("non-interpolating series share no common time point within [{lower}, {upper}]")]
    NoCommonTimePoint { lower: f64, upper: f64 },

    /// The caller-chosen evaluation time is not a legal point of the
    /// reported domain.
    #[error("evaluation time {time} lies outside the valid time domain [{lower}, {upper}]")]
    TimeOutsideDomain { time: f64, lower: f64, upper: f64 },

    /// Fewer than two density points were collected; a growth curve needs
    /// at least two to be interpolated.
    #[error("density data contains fewer than two points; cannot build a biomass curve")]
    InsufficientDensityData,
}
