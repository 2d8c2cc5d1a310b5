//! End-to-end tests for the export pipeline.
//!
//! Each test drives the full chain: density series into the biomass
//! curve, measurement series into grouping and domain reduction, identity
//! matching against a catalog, derivation at a chosen time, and
//! annotation of an in-memory SBML document.

#[cfg(test)]
mod test_export {
    use std::collections::HashMap;

    use approx::assert_relative_eq;
    use fluxml::prelude::*;

    fn metabolite(id: &str, short_name: &str) -> MetaboliteRef {
        MetaboliteRefBuilder::default()
            .id(id)
            .short_name(short_name)
            .build()
            .expect("Failed to build metabolite")
    }

    fn series(
        metabolite_ref: MetaboliteRef,
        unit: &str,
        points: Vec<(f64, f64)>,
    ) -> MeasurementSeries {
        MeasurementSeriesBuilder::default()
            .metabolite(metabolite_ref)
            .unit(unit)
            .points(points.into_iter().map(|(x, y)| Point::new(x, y)).collect::<Vec<_>>())
            .build()
            .expect("Failed to build series")
    }

    fn od_series() -> MeasurementSeries {
        MeasurementSeriesBuilder::default()
            .metabolite(metabolite("od", "OD"))
            .unit("")
            .sample_id("line1")
            .points(vec![Point::new(0.0, 1.0), Point::new(2.0, 2.0)])
            .build()
            .expect("Failed to build series")
    }

    fn factors() -> HashMap<String, f64> {
        let mut factors = HashMap::new();
        factors.insert("line1".to_string(), 0.5);
        factors
    }

    fn catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog
            .add_species("M_glc_DASH_D_c", "M_glc_DASH_D_c")
            .add_exchange("M_glc_DASH_D_e", "R_EX_glc_e")
            .add_exchange("M_co2_e", "R_EX_co2_e");
        catalog
    }

    fn document() -> SbmlDocument {
        SbmlDocumentBuilder::default()
            .model(
                SbmlModelBuilder::default()
                    .id("ecoli_core")
                    .to_species(
                        SpeciesBuilder::default()
                            .id("M_glc_DASH_D_c")
                            .name("D-Glucose")
                            .notes("<body><p>Foo: bar</p></body>".to_string())
                            .build()
                            .unwrap(),
                    )
                    .to_reactions(
                        ReactionBuilder::default()
                            .id("R_EX_glc_e")
                            .kinetic_law(
                                KineticLawBuilder::default()
                                    .to_parameters(LocalParameter {
                                        id: LOWER_BOUND_ID.to_string(),
                                        value: -1000.0,
                                    })
                                    .to_parameters(LocalParameter {
                                        id: UPPER_BOUND_ID.to_string(),
                                        value: 1000.0,
                                    })
                                    .build()
                                    .unwrap(),
                            )
                            .build()
                            .unwrap(),
                    )
                    .to_reactions(ReactionBuilder::default().id("R_EX_co2_e").build().unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn glucose_series() -> MeasurementSeries {
        series(
            metabolite("1", "glc-D"),
            "mM",
            vec![(0.0, 10.0), (2.0, 14.0)],
        )
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_full_export() {
        // ARRANGE
        init_logging();
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_density(&[od_series()], &factors());
        export.add_measurements(vec![glucose_series()]);

        // ACT
        let domain = export.time_domain().expect("Failed to reduce domain");
        assert_eq!((domain.lower, domain.upper), (0.0, 2.0));
        assert_eq!(domain.exact_points, None);
        let report = export.export(&mut doc, 1.0).expect("Failed to export");

        // ASSERT
        assert_eq!(report.annotated_species, vec!["M_glc_DASH_D_c"]);
        assert_eq!(report.bounded_reactions, vec!["R_EX_glc_e"]);

        let notes = doc.species_annotation("M_glc_DASH_D_c").unwrap();
        assert_eq!(notes.get("Foo").unwrap().as_text(), Some("bar"));
        assert_eq!(
            notes.get(CONCENTRATION_CURRENT).unwrap().as_text(),
            Some("12")
        );
        assert_eq!(
            notes.get(CONCENTRATION_HIGHEST).unwrap().as_text(),
            Some("14")
        );
        assert_eq!(
            notes.get(CONCENTRATION_LOWEST).unwrap().as_text(),
            Some("10")
        );

        // slope (14-10)/(2-0) = 2; density at t=1 is 0.75 after the 0.5
        // gCDW factor; both bounds pinned to the same flux
        let (lower, upper) = doc.reaction_bounds("R_EX_glc_e").unwrap();
        assert_relative_eq!(lower, 2.0 / 0.75);
        assert_eq!(lower, upper);

        let reaction_notes = doc.reaction_annotation("R_EX_glc_e").unwrap();
        assert_eq!(
            reaction_notes.get(GENE_TRANSCRIPTION_VALUES).unwrap().as_text(),
            Some("")
        );
        assert_eq!(
            reaction_notes.get(PROTEIN_COPY_VALUES).unwrap().as_text(),
            Some("")
        );
    }

    #[test]
    fn test_exact_points_restrict_evaluation_time() {
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_density(&[od_series()], &factors());
        export.add_measurements(vec![glucose_series()]);

        let mut off_gas = series(
            metabolite("2", "CO2p"),
            "mM/hr",
            vec![(0.0, 8.0), (1.0, 9.0), (2.0, 12.0)],
        );
        off_gas.interpolate = false;
        export.add_measurements(vec![off_gas]);

        let domain = export.time_domain().unwrap();
        assert_eq!(domain.exact_points, Some(vec![0.0, 1.0, 2.0]));

        let result = export.export(&mut doc, 0.5);
        assert!(matches!(
            result,
            Err(ExportError::TimeOutsideDomain { time, .. }) if time == 0.5
        ));
    }

    #[test]
    fn test_rate_unit_bypasses_finite_difference() {
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_density(&[od_series()], &factors());
        export.add_measurements(vec![glucose_series()]);
        // the CO2p alias maps onto co2, matching the registered exchange
        export.add_measurements(vec![series(
            metabolite("2", "CO2p"),
            "mM/hr",
            vec![(0.0, 8.0), (2.0, 12.0)],
        )]);

        let report = export.export(&mut doc, 1.0).unwrap();
        assert!(report.bounded_reactions.contains(&"R_EX_co2_e".to_string()));

        // interpolated rate 10 mM/hr over density 0.75 gCDW/L
        let (lower, _) = doc.reaction_bounds("R_EX_co2_e").unwrap();
        assert_relative_eq!(lower, 10.0 / 0.75);
    }

    #[test]
    fn test_partial_failure_containment() {
        let mut catalog = catalog();
        catalog.add_curated_species("3", "M_glc_DASH_D_c");
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_density(&[od_series()], &factors());
        export.add_measurements(vec![glucose_series()]);
        // a matched metabolite with no data at all: derivation fails for
        // it, the others must still be annotated
        export.add_measurements(vec![series(metabolite("3", "empty"), "mM", vec![])]);

        let report = export.export(&mut doc, 1.0).unwrap();
        assert_eq!(report.annotated_species, vec!["M_glc_DASH_D_c"]);
        assert_eq!(report.bounded_reactions, vec!["R_EX_glc_e"]);
        assert!(report
            .of_kind(DiagnosticKind::DerivationFailed)
            .next()
            .is_some());
    }

    #[test]
    fn test_boundary_skip_leaves_bounds_untouched() {
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_density(&[od_series()], &factors());
        export.add_measurements(vec![glucose_series()]);

        // t equal to the last sample: concentration still works (exact
        // hit), the flux bracket does not
        let report = export.export(&mut doc, 2.0).unwrap();
        assert_eq!(report.annotated_species, vec!["M_glc_DASH_D_c"]);
        assert!(report.bounded_reactions.is_empty());
        assert_eq!(
            report.of_kind(DiagnosticKind::ExtrapolationSkipped).count(),
            1
        );
        assert_eq!(
            doc.reaction_bounds("R_EX_glc_e"),
            Some((-1000.0, 1000.0))
        );
    }

    #[test]
    fn test_unmatched_metabolite_is_skipped() {
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_density(&[od_series()], &factors());
        export.add_measurements(vec![glucose_series()]);
        export.add_measurements(vec![series(
            metabolite("4", "unobtainium"),
            "mM",
            vec![(0.0, 1.0), (2.0, 2.0)],
        )]);

        let report = export.export(&mut doc, 1.0).unwrap();
        assert_eq!(report.annotated_species, vec!["M_glc_DASH_D_c"]);
        assert_eq!(
            report.of_kind(DiagnosticKind::UnmatchedIdentity).count(),
            1
        );
    }

    #[test]
    fn test_selection_feeds_pipeline() {
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();

        let mut selection = MeasurementSelection::new();
        selection.add_category(MeasurementCategory::OpticalDensity, true, vec![od_series()]);
        selection.add_category(
            MeasurementCategory::Chromatography,
            true,
            vec![glucose_series()],
        );

        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_selection(&selection, &factors());
        let report = export.export(&mut doc, 1.0).unwrap();
        assert_eq!(report.annotated_species, vec!["M_glc_DASH_D_c"]);
    }

    #[test]
    fn test_missing_density_is_fatal() {
        let catalog = catalog();
        let units = UnitRegistry::default();
        let mut doc = document();
        let mut export = SbmlFluxExport::new(&catalog, &units);
        export.add_measurements(vec![glucose_series()]);

        assert_eq!(
            export.export(&mut doc, 1.0).unwrap_err(),
            ExportError::InsufficientDensityData
        );
    }
}
