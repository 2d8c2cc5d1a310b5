//! The export pipeline.
//!
//! Ties the pieces together for one invocation: density series feed the
//! biomass curve, measurement series are grouped by metabolite and folded
//! into the time-domain reduction, the caller picks an evaluation time
//! from the reported domain, and [`SbmlFluxExport::export`] derives and
//! embeds values for every metabolite. Per-metabolite failures are
//! contained and reported; only an unusable time domain or biomass curve
//! aborts the export.

use crate::annotate::{annotate_reaction, annotate_species};
use crate::density::{BiomassCurveBuilder, FactorSource};
use crate::document::AnnotatableDocument;
use crate::domain::{TimeDomain, TimeDomainReducer};
use crate::error::ExportError;
use crate::flux::{DeriveError, FluxDeriver};
use crate::matching::{EntityCatalog, IdentityMatcher};
use crate::report::{DiagnosticKind, ExportReport};
use crate::series::{MeasurementSeries, MeasurementSelection, MetaboliteRef, Point};
use crate::units::{self, UnitRegistry};

/// All series of one metabolite, pooled before derivation.
struct MeasurementGroup {
    metabolite: MetaboliteRef,
    series: Vec<MeasurementSeries>,
}

/// One export invocation.
///
/// Owns its own match cache, density curve, and diagnostics; nothing is
/// shared across exports. Hosts running independent exports in parallel
/// construct one `SbmlFluxExport` per invocation.
pub struct SbmlFluxExport<'a> {
    catalog: &'a dyn EntityCatalog,
    units: &'a UnitRegistry,
    reducer: TimeDomainReducer,
    biomass: BiomassCurveBuilder,
    groups: Vec<MeasurementGroup>,
    report: ExportReport,
}

impl<'a> SbmlFluxExport<'a> {
    pub fn new(catalog: &'a dyn EntityCatalog, units: &'a UnitRegistry) -> Self {
        Self {
            catalog,
            units,
            reducer: TimeDomainReducer::new(),
            biomass: BiomassCurveBuilder::new(),
            groups: Vec::new(),
            report: ExportReport::new(),
        }
    }

    /// Adds optical-density series to the biomass curve. Density series do
    /// not constrain the evaluation-time domain.
    pub fn add_density(&mut self, series: &[MeasurementSeries], factors: &dyn FactorSource) {
        for s in series {
            self.biomass.add_series(s, factors);
        }
    }

    /// Adds measurement series, grouping them by metabolite and folding
    /// each into the time-domain reduction.
    pub fn add_measurements(&mut self, series: Vec<MeasurementSeries>) {
        for mut s in series {
            s.sort_points();
            self.reducer.add_series(&s);
            match self
                .groups
                .iter_mut()
                .find(|g| g.metabolite.id == s.metabolite.id)
            {
                Some(group) => group.series.push(s),
                None => self.groups.push(MeasurementGroup {
                    metabolite: s.metabolite.clone(),
                    series: vec![s],
                }),
            }
        }
    }

    /// Adds a whole category-grouped selection: density series feed the
    /// biomass curve, everything else the measurement groups.
    pub fn add_selection(&mut self, selection: &MeasurementSelection, factors: &dyn FactorSource) {
        let density: Vec<MeasurementSeries> = selection.density_series().cloned().collect();
        self.add_density(&density, factors);
        self.add_measurements(selection.measurement_series().cloned().collect());
    }

    /// The shared valid evaluation-time domain of everything added so far.
    /// The caller picks the export time from this domain.
    pub fn time_domain(&self) -> Result<TimeDomain, ExportError> {
        self.reducer.finalize()
    }

    /// Runs the export at the chosen evaluation time, mutating the
    /// document in place.
    ///
    /// # Errors
    ///
    /// Fatal conditions only: an unusable time domain, an evaluation time
    /// outside it, or insufficient density data. Everything else is
    /// reported in the returned [`ExportReport`].
    pub fn export(
        mut self,
        document: &mut dyn AnnotatableDocument,
        time: f64,
    ) -> Result<ExportReport, ExportError> {
        let domain = self.reducer.finalize()?;
        if !domain.contains(time) {
            return Err(ExportError::TimeOutsideDomain {
                time,
                lower: domain.lower,
                upper: domain.upper,
            });
        }

        let curve = self.biomass.build(&mut self.report)?;
        let deriver = FluxDeriver::new(&curve);
        let mut matcher = IdentityMatcher::new(self.catalog);

        for group in &self.groups {
            let matched = matcher.resolve(&group.metabolite, &mut self.report);
            if matched.is_unmatched() {
                self.report.warn(
                    DiagnosticKind::UnmatchedIdentity,
                    format!(
                        "no species or exchange matched for {}; skipping",
                        group.metabolite.short_name
                    ),
                );
                continue;
            }

            // Pool all series of the metabolite into one canonical-unit,
            // time-sorted sequence.
            let mut pooled: Vec<Point> = group
                .series
                .iter()
                .flat_map(|s| self.units.convert_points(s, &mut self.report))
                .collect();
            pooled.sort_by(|a, b| a.x.total_cmp(&b.x));

            // A group measured as an intensive rate bypasses the
            // finite-difference step during flux derivation.
            let unit = group
                .series
                .iter()
                .map(|s| s.unit.as_str())
                .find(|u| units::is_rate_unit(u))
                .unwrap_or_else(|| group.series[0].unit.as_str());

            if let Some(species_id) = &matched.species_id {
                match deriver.concentration_at(&pooled, time) {
                    Ok(sample) => {
                        if annotate_species(document, species_id, &sample, &mut self.report) {
                            self.report.annotated_species.push(species_id.clone());
                        }
                    }
                    Err(err) => {
                        log::warn!(
                            "hit an error calculating species values for {}: {err}",
                            group.metabolite.short_name
                        );
                        self.report.warn(
                            DiagnosticKind::DerivationFailed,
                            format!(
                                "concentration derivation failed for {}: {err}",
                                group.metabolite.short_name
                            ),
                        );
                    }
                }
            }

            if let Some(reaction_id) = &matched.reaction_id {
                match deriver.flux_at(&pooled, unit, time) {
                    Ok(flux) => {
                        if annotate_reaction(document, reaction_id, flux, &mut self.report) {
                            self.report.bounded_reactions.push(reaction_id.clone());
                        }
                    }
                    Err(DeriveError::OutsideBracket(t)) => {
                        log::warn!("tried to calculate beyond the range of data at {t}");
                        self.report.warn(
                            DiagnosticKind::ExtrapolationSkipped,
                            format!(
                                "evaluation time {t} has no flux bracket for {}; bound skipped",
                                group.metabolite.short_name
                            ),
                        );
                    }
                    Err(err) => {
                        log::warn!(
                            "hit an error calculating reaction values for {}: {err}",
                            group.metabolite.short_name
                        );
                        self.report.warn(
                            DiagnosticKind::DerivationFailed,
                            format!(
                                "flux derivation failed for {}: {err}",
                                group.metabolite.short_name
                            ),
                        );
                    }
                }
            }
        }

        Ok(self.report)
    }
}
