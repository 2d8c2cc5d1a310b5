//! Unit conversion registry.
//!
//! Measured values arrive in whatever unit the assay produced; before
//! pooling, every series is converted to the canonical concentration unit
//! (mM, or mM/hr for intensive rates). Conversions are metabolite-aware:
//! mass-based units divide by the metabolite's curated molar mass.
//!
//! The registry is an injected value rather than process-global state, so
//! isolated exports and deterministic tests can carry their own tables.
//! [`UnitRegistry::default`] seeds from the built-in table.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::report::{DiagnosticKind, ExportReport};
use crate::series::{MeasurementSeries, Point};

/// Suffix convention marking a unit as an already-intensive rate.
const RATE_SUFFIX: &str = "/hr";

/// A conversion from a source unit into the canonical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// The source unit already is the canonical unit.
    Identity,
    /// Multiply by a constant factor.
    Scale(f64),
    /// Divide by the metabolite molar mass (g/mol), then scale.
    /// Converts mass concentrations into molar ones.
    PerMolarMass(f64),
}

impl Conversion {
    /// Applies the conversion to one value. Returns `None` when a
    /// molar-mass conversion is requested for a metabolite without a
    /// curated molar mass.
    pub fn apply(&self, value: f64, molar_mass: Option<f64>) -> Option<f64> {
        match self {
            Conversion::Identity => Some(value),
            Conversion::Scale(factor) => Some(value * factor),
            Conversion::PerMolarMass(scale) => molar_mass.map(|m| value / m * scale),
        }
    }
}

lazy_static! {
    static ref DEFAULT_CONVERSIONS: HashMap<&'static str, Conversion> = {
        let mut m = HashMap::new();
        // Molar concentrations, canonical unit mM
        m.insert("mM", Conversion::Identity);
        m.insert("uM", Conversion::Scale(1e-3));
        m.insert("µM", Conversion::Scale(1e-3));
        m.insert("M", Conversion::Scale(1e3));
        m.insert("mol/L", Conversion::Scale(1e3));

        // Mass concentrations: value [g/L] / molar mass [g/mol] = mol/L
        m.insert("g/L", Conversion::PerMolarMass(1e3));
        m.insert("mg/L", Conversion::PerMolarMass(1.0));

        // Intensive rates keep their time base, amounts converted as above
        m.insert("mM/hr", Conversion::Identity);
        m.insert("uM/hr", Conversion::Scale(1e-3));
        m.insert("mol/L/hr", Conversion::Scale(1e3));
        m.insert("g/L/hr", Conversion::PerMolarMass(1e3));
        m.insert("mg/L/hr", Conversion::PerMolarMass(1.0));

        m
    };
}

/// Returns whether a unit name denotes an already-intensive rate.
///
/// Rate-unit series bypass the finite-difference step during flux
/// derivation; their interpolated value only needs biomass normalization.
pub fn is_rate_unit(unit: &str) -> bool {
    unit.ends_with(RATE_SUFFIX)
}

/// Maps unit names to conversions into the canonical unit.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    table: HashMap<String, Conversion>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        let table = DEFAULT_CONVERSIONS
            .iter()
            .map(|(name, conversion)| (name.to_string(), *conversion))
            .collect();
        Self { table }
    }
}

impl UnitRegistry {
    /// A registry with no conversions; every unit passes through.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Registers or replaces the conversion for a unit name.
    pub fn register(&mut self, unit: impl Into<String>, conversion: Conversion) -> &mut Self {
        self.table.insert(unit.into(), conversion);
        self
    }

    /// The registered conversion for a unit name, if any.
    pub fn conversion_for(&self, unit: &str) -> Option<Conversion> {
        self.table.get(unit).copied()
    }

    /// Converts one value, passing it through unchanged when the unit has
    /// no registered conversion or the needed molar mass is missing.
    pub fn convert(
        &self,
        unit: &str,
        value: f64,
        molar_mass: Option<f64>,
        report: &mut ExportReport,
    ) -> f64 {
        match self.conversion_for(unit) {
            Some(conversion) => match conversion.apply(value, molar_mass) {
                Some(converted) => converted,
                None => {
                    report.warn(
                        DiagnosticKind::MissingMolarMass,
                        format!("no molar mass available to convert unit '{unit}'"),
                    );
                    value
                }
            },
            None => {
                log::warn!("unrecognized unit {unit}");
                report.warn(
                    DiagnosticKind::UnrecognizedUnit,
                    format!("unrecognized unit '{unit}'; values passed through unconverted"),
                );
                value
            }
        }
    }

    /// Converts all points of a series into the canonical unit.
    ///
    /// The unit is resolved once per series; an unrecognized unit or a
    /// missing molar mass produces a single diagnostic and leaves the
    /// values untouched.
    pub fn convert_points(
        &self,
        series: &MeasurementSeries,
        report: &mut ExportReport,
    ) -> Vec<Point> {
        let conversion = match self.conversion_for(&series.unit) {
            Some(conversion) => conversion,
            None => {
                log::warn!("unrecognized unit {}", series.unit);
                report.warn(
                    DiagnosticKind::UnrecognizedUnit,
                    format!(
                        "unrecognized unit '{}' for {}; values passed through unconverted",
                        series.unit, series.metabolite.short_name
                    ),
                );
                return series.points.clone();
            }
        };

        let molar_mass = series.metabolite.molar_mass;
        if matches!(conversion, Conversion::PerMolarMass(_)) && molar_mass.is_none() {
            report.warn(
                DiagnosticKind::MissingMolarMass,
                format!(
                    "no molar mass for {}; cannot convert unit '{}'",
                    series.metabolite.short_name, series.unit
                ),
            );
            return series.points.clone();
        }

        series
            .points
            .iter()
            .map(|p| {
                let y = conversion
                    .apply(p.y, molar_mass)
                    .unwrap_or(p.y);
                Point::new(p.x, y)
            })
            .collect()
    }
}
