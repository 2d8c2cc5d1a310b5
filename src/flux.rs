//! Derivation of concentrations and biomass-normalized fluxes.
//!
//! Works on the pooled, unit-converted, time-sorted point sequence of one
//! metabolite. Concentrations are interpolated directly; fluxes are either
//! the interpolated value of an already-intensive rate series, or the
//! finite-difference slope over the bracketing sample pair, both divided
//! by the interpolated biomass density at the same time.

use thiserror::Error;

use crate::density::DensityCurve;
use crate::interpolate::{interpolate_at, InterpolateError};
use crate::series::Point;
use crate::units;

/// The three concentration values embedded into a species annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcentrationSample {
    /// Interpolated value at the evaluation time.
    pub current: f64,
    /// Lowest observed value across the pooled points.
    pub lowest: f64,
    /// Highest observed value across the pooled points.
    pub highest: f64,
}

/// Errors during per-metabolite derivation. All of these are contained at
/// the metabolite boundary by the pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum DeriveError {
    #[error(transparent)]
    Interpolate(#[from] InterpolateError),

    /// The pooled sequence had no points at all.
    #[error("no data points available for derivation")]
    NoData,

    /// The evaluation time falls at or beyond the last sample, or before
    /// the first; the flux bracket would require extrapolation.
    #[error("evaluation time {0} is outside the measured bracket; refusing to extrapolate")]
    OutsideBracket(f64),
}

/// Derives values at a chosen time against a fixed density curve.
pub struct FluxDeriver<'a> {
    density: &'a DensityCurve,
}

impl<'a> FluxDeriver<'a> {
    pub fn new(density: &'a DensityCurve) -> Self {
        Self { density }
    }

    /// Computes the concentration values for a species annotation.
    pub fn concentration_at(
        &self,
        points: &[Point],
        t: f64,
    ) -> Result<ConcentrationSample, DeriveError> {
        if points.is_empty() {
            return Err(DeriveError::NoData);
        }
        let current = interpolate_at(points, t)?;
        let lowest = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let highest = points
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(ConcentrationSample {
            current,
            lowest,
            highest,
        })
    }

    /// Computes the biomass-normalized flux for a reaction bound.
    ///
    /// `unit` is the (canonicalized) unit of the contributing series; a
    /// rate-suffixed unit bypasses the finite-difference step.
    pub fn flux_at(&self, points: &[Point], unit: &str, t: f64) -> Result<f64, DeriveError> {
        if points.is_empty() {
            return Err(DeriveError::NoData);
        }
        // Insertion index of t among the sorted times (bisect-right).
        let next = points.partition_point(|p| p.x <= t);
        if next == 0 || next == points.len() {
            return Err(DeriveError::OutsideBracket(t));
        }

        let density = self.density.density_at(t)?;
        if units::is_rate_unit(unit) {
            return Ok(interpolate_at(points, t)? / density);
        }

        let (prev, next) = (&points[next - 1], &points[next]);
        let slope = (next.y - prev.y) / (next.x - prev.x);
        Ok(slope / density)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::density::{BiomassCurveBuilder, ConstantFactor};
    use crate::report::ExportReport;
    use crate::series::{MeasurementSeriesBuilder, MetaboliteRefBuilder};

    fn density(points: Vec<Point>) -> DensityCurve {
        let series = MeasurementSeriesBuilder::default()
            .metabolite(
                MetaboliteRefBuilder::default()
                    .id("od")
                    .short_name("OD")
                    .build()
                    .unwrap(),
            )
            .unit("")
            .points(points)
            .build()
            .unwrap();
        let mut builder = BiomassCurveBuilder::new();
        builder.add_series(&series, &ConstantFactor(1.0));
        builder.build(&mut ExportReport::new()).unwrap()
    }

    #[test]
    fn test_concentration_values() {
        let curve = density(vec![Point::new(0.0, 1.0), Point::new(2.0, 1.0)]);
        let deriver = FluxDeriver::new(&curve);
        let points = vec![
            Point::new(0.0, 10.0),
            Point::new(2.0, 14.0),
            Point::new(4.0, 6.0),
        ];

        let sample = deriver.concentration_at(&points, 1.0).unwrap();
        assert_relative_eq!(sample.current, 12.0);
        assert_relative_eq!(sample.lowest, 6.0);
        assert_relative_eq!(sample.highest, 14.0);
    }

    #[test]
    fn test_finite_difference_flux() {
        // slope (14-10)/(2-0) = 2, density 2 at t=1 -> flux 1
        let curve = density(vec![Point::new(0.0, 1.0), Point::new(2.0, 3.0)]);
        let deriver = FluxDeriver::new(&curve);
        let points = vec![Point::new(0.0, 10.0), Point::new(2.0, 14.0)];

        let flux = deriver.flux_at(&points, "mM", 1.0).unwrap();
        assert_relative_eq!(flux, 1.0);
    }

    #[test]
    fn test_rate_unit_bypasses_finite_difference() {
        let curve = density(vec![Point::new(0.0, 2.0), Point::new(2.0, 2.0)]);
        let deriver = FluxDeriver::new(&curve);
        let points = vec![Point::new(0.0, 8.0), Point::new(2.0, 12.0)];

        let flux = deriver.flux_at(&points, "mM/hr", 1.0).unwrap();
        // interpolate(series, 1) = 10, density 2
        assert_relative_eq!(flux, 5.0);
    }

    #[test]
    fn test_no_extrapolation_past_last_point() {
        let curve = density(vec![Point::new(0.0, 1.0), Point::new(4.0, 1.0)]);
        let deriver = FluxDeriver::new(&curve);
        let points = vec![Point::new(0.0, 10.0), Point::new(2.0, 14.0)];

        // equal to the last sample time: no bracket beyond it
        assert_eq!(
            deriver.flux_at(&points, "mM", 2.0),
            Err(DeriveError::OutsideBracket(2.0))
        );
        // strictly before the first
        assert_eq!(
            deriver.flux_at(&points, "mM", -1.0),
            Err(DeriveError::OutsideBracket(-1.0))
        );
        // equal to the first sample time is a valid bracket start
        assert!(deriver.flux_at(&points, "mM", 0.0).is_ok());
    }

    #[test]
    fn test_empty_points() {
        let curve = density(vec![Point::new(0.0, 1.0), Point::new(2.0, 1.0)]);
        let deriver = FluxDeriver::new(&curve);
        assert_eq!(
            deriver.concentration_at(&[], 1.0),
            Err(DeriveError::NoData)
        );
        assert_eq!(deriver.flux_at(&[], "mM", 1.0), Err(DeriveError::NoData));
    }
}
