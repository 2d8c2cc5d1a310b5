//! Reduction of heterogeneous measurement sets to one evaluation-time
//! domain.
//!
//! Every selected series constrains the domain: the intersection of all
//! observed `[min(x), max(x)]` ranges bounds it, and series whose category
//! forbids interpolation additionally restrict legal evaluation times to
//! the exact time points they all share. The caller picks one time from
//! the reported domain before derivation starts.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::series::MeasurementSeries;

/// The shared valid evaluation-time domain of one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeDomain {
    pub lower: f64,
    pub upper: f64,
    /// When present, the only legal evaluation times; populated as soon as
    /// at least one non-interpolating series contributed. Sorted ascending.
    pub exact_points: Option<Vec<f64>>,
}

impl TimeDomain {
    /// Whether `t` is a legal evaluation time for this domain.
    pub fn contains(&self, t: f64) -> bool {
        match &self.exact_points {
            Some(points) => points.iter().any(|p| *p == t),
            None => self.lower <= t && t <= self.upper,
        }
    }

    /// A sensible default choice: the first exact point, or the lower
    /// bound of a continuous domain.
    pub fn default_time(&self) -> f64 {
        self.exact_points
            .as_ref()
            .and_then(|points| points.first().copied())
            .unwrap_or(self.lower)
    }
}

/// Accumulates series ranges and exact-point sets, then reduces them to a
/// [`TimeDomain`].
#[derive(Debug, Default)]
pub struct TimeDomainReducer {
    lower: Option<f64>,
    upper: Option<f64>,
    exact_sets: Vec<Vec<f64>>,
}

impl TimeDomainReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one series into the reduction. Empty series contribute
    /// nothing.
    pub fn add_series(&mut self, series: &MeasurementSeries) {
        let Some((min, max)) = series.time_range() else {
            return;
        };
        // running max of mins, running min of maxes
        self.lower = Some(self.lower.map_or(min, |lower| lower.max(min)));
        self.upper = Some(self.upper.map_or(max, |upper| upper.min(max)));

        if !series.interpolate {
            self.exact_sets
                .push(series.points.iter().map(|p| p.x).collect());
        }
    }

    /// Reduces the accumulated constraints to a domain.
    ///
    /// # Errors
    ///
    /// * [`ExportError::NoMeasurementData`] when no series contributed
    /// * [`ExportError::EmptyTimeRange`] when the ranges do not overlap
    /// * [`ExportError::NoCommonTimePoint`] when non-interpolating series
    ///   exist but share no time point within the bounds
    pub fn finalize(&self) -> Result<TimeDomain, ExportError> {
        let (lower, upper) = match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => (lower, upper),
            _ => return Err(ExportError::NoMeasurementData),
        };
        if lower > upper {
            return Err(ExportError::EmptyTimeRange { lower, upper });
        }
        if self.exact_sets.is_empty() {
            return Ok(TimeDomain {
                lower,
                upper,
                exact_points: None,
            });
        }

        // Bound each exact set by the final range, then intersect.
        let mut sets = self.exact_sets.iter().map(|set| {
            set.iter()
                .copied()
                .filter(|t| lower <= *t && *t <= upper)
                .collect::<Vec<f64>>()
        });
        let mut common = sets.next().unwrap_or_default();
        for set in sets {
            common.retain(|t| set.contains(t));
        }
        common.sort_by(|a, b| a.total_cmp(b));
        common.dedup();

        if common.is_empty() {
            return Err(ExportError::NoCommonTimePoint { lower, upper });
        }
        Ok(TimeDomain {
            lower,
            upper,
            exact_points: Some(common),
        })
    }
}
