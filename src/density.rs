//! Biomass density curve construction.
//!
//! Optical-density measurements are converted to grams cell dry weight
//! per liter (gCDW/L) with a per-sample conversion factor and merged into
//! a single trajectory. The curve is built once per export and shared
//! read-only by all flux derivations, which divide by the interpolated
//! density at the evaluation time.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::error::ExportError;
use crate::interpolate::{interpolate_at, InterpolateError};
use crate::report::{DiagnosticKind, ExportReport};
use crate::series::{MeasurementSeries, Point};

/// Default OD-to-gCDW/L conversion factor when no per-sample metadata is
/// available.
pub const DEFAULT_GCDW_FACTOR: f64 = 0.65;

/// Per-sample lookup of the biomass conversion factor.
///
/// The builder falls back to [`FactorSource::default_factor`] for samples
/// the source does not know, recording an info diagnostic per sample.
pub trait FactorSource {
    fn factor_for(&self, sample_id: &str) -> Option<f64>;

    fn default_factor(&self) -> f64 {
        DEFAULT_GCDW_FACTOR
    }
}

/// A factor source with no per-sample metadata; every sample converts with
/// the given constant.
#[derive(Debug, Clone, Copy)]
pub struct ConstantFactor(pub f64);

impl FactorSource for ConstantFactor {
    fn factor_for(&self, _sample_id: &str) -> Option<f64> {
        None
    }

    fn default_factor(&self) -> f64 {
        self.0
    }
}

impl FactorSource for HashMap<String, f64> {
    fn factor_for(&self, sample_id: &str) -> Option<f64> {
        self.get(sample_id).copied()
    }
}

/// The biomass-density trajectory (gCDW/L) of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    points: Vec<Point>,
}

impl DensityCurve {
    /// The interpolated density at time `t`.
    pub fn density_at(&self, t: f64) -> Result<f64, InterpolateError> {
        interpolate_at(&self.points, t)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Merges density series into a [`DensityCurve`], applying per-sample
/// conversion factors.
#[derive(Debug, Default)]
pub struct BiomassCurveBuilder {
    points: Vec<Point>,
    defaulted_samples: BTreeSet<String>,
}

impl BiomassCurveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one density series, scaling every value by the factor resolved
    /// for the originating sample.
    pub fn add_series(&mut self, series: &MeasurementSeries, factors: &dyn FactorSource) {
        let resolved = series
            .sample_id
            .as_deref()
            .and_then(|sample| factors.factor_for(sample));
        let factor = match resolved {
            Some(factor) => factor,
            None => {
                let sample = series.sample_id.as_deref().unwrap_or("<unknown sample>");
                self.defaulted_samples.insert(sample.to_string());
                factors.default_factor()
            }
        };
        self.points
            .extend(series.points.iter().map(|p| Point::new(p.x, p.y * factor)));
    }

    /// Finishes the curve: coincident times are kept as-is, the merged
    /// points re-sorted ascending.
    ///
    /// # Errors
    ///
    /// [`ExportError::InsufficientDensityData`] when fewer than two points
    /// were collected; a growth curve needs at least two.
    pub fn build(mut self, report: &mut ExportReport) -> Result<DensityCurve, ExportError> {
        for sample in &self.defaulted_samples {
            report.info(
                DiagnosticKind::DefaultFactorUsed,
                format!("no gCDW/L/OD factor found for {sample}; using the default"),
            );
        }
        if self.points.len() < 2 {
            return Err(ExportError::InsufficientDensityData);
        }
        self.points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Ok(DensityCurve {
            points: self.points,
        })
    }
}
