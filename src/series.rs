//! Measurement data model.
//!
//! The types in this module are the already-resolved inputs handed to the
//! export pipeline: individual time-series measurements, the metabolite they
//! describe, and the category-grouped selection a host assembles from user
//! choices. Persistence and form handling live outside this crate.

use derive_builder::Builder;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// A single sample of a time series: `x` is time, `y` is the measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A stable reference to one biological metabolite.
///
/// All measurement series describing the same substance share one
/// `MetaboliteRef`, keyed by `id`. The `short_name` drives heuristic
/// name matching against model entities, and the molar mass (g/mol)
/// feeds mass-to-molar unit conversions when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct MetaboliteRef {
    /// Opaque key grouping series of the same metabolite.
    #[builder(setter(into))]
    pub id: String,

    /// Human-readable short name used for name-based matching.
    #[builder(setter(into))]
    pub short_name: String,

    /// Molar mass in g/mol, when curated for this metabolite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub molar_mass: Option<f64>,
}

/// One loaded measurement time series.
///
/// Points are expected to be sorted ascending by `x` before derivation;
/// [`MeasurementSeries::sort_points`] enforces this. Duplicate `x` values
/// are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct MeasurementSeries {
    /// The metabolite this series measures.
    pub metabolite: MetaboliteRef,

    /// Name of the measurement unit, resolved through the unit registry.
    #[builder(setter(into))]
    pub unit: String,

    /// Originating sample, used to look up per-sample biomass factors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub sample_id: Option<String>,

    /// Measured samples, ascending by time once sorted.
    #[builder(default, setter(into, each(name = "to_points")))]
    pub points: Vec<Point>,

    /// Whether evaluation times between samples are permitted for this series.
    #[serde(default = "default_interpolate")]
    #[builder(default = "true")]
    pub interpolate: bool,
}

fn default_interpolate() -> bool {
    true
}

impl MeasurementSeries {
    /// Sorts the points ascending by time. Duplicate times keep their
    /// relative order.
    pub fn sort_points(&mut self) {
        self.points.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    /// Observed `[min(x), max(x)]` of the series, or `None` when empty.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        match self.points.iter().map(|p| p.x).minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(x) => Some((x, x)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        }
    }
}

/// Source category of a measurement series.
///
/// Categories mirror the protocol categorizations of the originating data
/// store; the optical-density category feeds the biomass curve instead of
/// the per-metabolite derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementCategory {
    OpticalDensity,
    Chromatography,
    MassSpec,
    OffGas,
    Omics,
}

/// Series of one category, tagged with the category-wide interpolation
/// permission chosen by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySelection {
    pub category: MeasurementCategory,
    pub interpolate: bool,
    pub series: Vec<MeasurementSeries>,
}

/// The already-resolved selection of measurements for one export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementSelection {
    pub categories: Vec<CategorySelection>,
}

impl MeasurementSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds all series of one category, stamping the category-wide
    /// interpolation permission onto each series.
    pub fn add_category(
        &mut self,
        category: MeasurementCategory,
        interpolate: bool,
        series: Vec<MeasurementSeries>,
    ) -> &mut Self {
        let series = series
            .into_iter()
            .map(|mut s| {
                s.interpolate = interpolate;
                s
            })
            .collect();
        self.categories.push(CategorySelection {
            category,
            interpolate,
            series,
        });
        self
    }

    /// Iterates over the optical-density series of the selection.
    pub fn density_series(&self) -> impl Iterator<Item = &MeasurementSeries> {
        self.categories
            .iter()
            .filter(|c| c.category == MeasurementCategory::OpticalDensity)
            .flat_map(|c| c.series.iter())
    }

    /// Iterates over all non-density series of the selection.
    pub fn measurement_series(&self) -> impl Iterator<Item = &MeasurementSeries> {
        self.categories
            .iter()
            .filter(|c| c.category != MeasurementCategory::OpticalDensity)
            .flat_map(|c| c.series.iter())
    }
}
