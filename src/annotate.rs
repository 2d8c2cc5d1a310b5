//! Embedding of derived values into the model document.
//!
//! Species receive the three concentration values as note keys; reactions
//! receive the computed flux as both kinetic bounds plus two placeholder
//! note keys reserved for future gene-transcription and protein-copy
//! data. Existing unrelated note content is preserved by the merge.

use crate::document::AnnotatableDocument;
use crate::flux::ConcentrationSample;
use crate::report::{DiagnosticKind, ExportReport};

/// Note key for the interpolated concentration at the evaluation time.
pub const CONCENTRATION_CURRENT: &str = "CONCENTRATION_CURRENT";
/// Note key for the highest observed concentration.
pub const CONCENTRATION_HIGHEST: &str = "CONCENTRATION_HIGHEST";
/// Note key for the lowest observed concentration.
pub const CONCENTRATION_LOWEST: &str = "CONCENTRATION_LOWEST";
/// Placeholder note key reserved for gene transcription data.
pub const GENE_TRANSCRIPTION_VALUES: &str = "GENE_TRANSCRIPTION_VALUES";
/// Placeholder note key reserved for protein copy data.
pub const PROTEIN_COPY_VALUES: &str = "PROTEIN_COPY_VALUES";

/// Merges the concentration values into a species' notes.
///
/// A missing species id is recoverable: it is logged, reported, and the
/// export continues with the remaining metabolites.
pub fn annotate_species(
    document: &mut dyn AnnotatableDocument,
    species_id: &str,
    sample: &ConcentrationSample,
    report: &mut ExportReport,
) -> bool {
    let Some(mut notes) = document.species_annotation(species_id) else {
        log::warn!("no species found in the document with id {species_id}");
        report.warn(
            DiagnosticKind::MissingEntity,
            format!("No species found in the document with id {species_id}"),
        );
        return false;
    };
    notes.set(CONCENTRATION_CURRENT, sample.current.to_string());
    notes.set(CONCENTRATION_HIGHEST, sample.highest.to_string());
    notes.set(CONCENTRATION_LOWEST, sample.lowest.to_string());
    document.set_species_annotation(species_id, &notes)
}

/// Pins a reaction's kinetic bounds to the computed flux and merges the
/// placeholder note keys.
///
/// Lower and upper bound are both set to the same value on purpose: the
/// export pins the reaction to the observed rate instead of leaving a
/// feasible range.
pub fn annotate_reaction(
    document: &mut dyn AnnotatableDocument,
    reaction_id: &str,
    flux: f64,
    report: &mut ExportReport,
) -> bool {
    let Some(mut notes) = document.reaction_annotation(reaction_id) else {
        log::warn!("no reaction found in the document with id {reaction_id}");
        report.warn(
            DiagnosticKind::MissingEntity,
            format!("No reaction found in the document with id {reaction_id}"),
        );
        return false;
    };
    notes.set(GENE_TRANSCRIPTION_VALUES, "");
    notes.set(PROTEIN_COPY_VALUES, "");
    document.set_reaction_annotation(reaction_id, &notes);
    document.set_reaction_bounds(reaction_id, flux, flux)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbml::model::{
        ReactionBuilder, SbmlDocumentBuilder, SbmlModelBuilder, SpeciesBuilder,
    };

    fn document() -> crate::sbml::model::SbmlDocument {
        SbmlDocumentBuilder::default()
            .model(
                SbmlModelBuilder::default()
                    .id("test")
                    .to_species(
                        SpeciesBuilder::default()
                            .id("M_ac_c")
                            .notes("<body><p>Foo: bar</p></body>".to_string())
                            .build()
                            .unwrap(),
                    )
                    .to_reactions(ReactionBuilder::default().id("R_EX_ac_e").build().unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_species_annotation_preserves_unrelated_keys() {
        let mut doc = document();
        let mut report = ExportReport::new();
        let sample = ConcentrationSample {
            current: 2.5,
            lowest: 1.0,
            highest: 4.0,
        };

        assert!(annotate_species(&mut doc, "M_ac_c", &sample, &mut report));
        let notes = crate::document::AnnotatableDocument::species_annotation(&doc, "M_ac_c")
            .unwrap();
        assert_eq!(notes.get("Foo").unwrap().as_text(), Some("bar"));
        assert_eq!(
            notes.get(CONCENTRATION_CURRENT).unwrap().as_text(),
            Some("2.5")
        );
        assert_eq!(
            notes.get(CONCENTRATION_LOWEST).unwrap().as_text(),
            Some("1")
        );
    }

    #[test]
    fn test_reaction_bounds_pinned_to_flux() {
        let mut doc = document();
        let mut report = ExportReport::new();

        assert!(annotate_reaction(&mut doc, "R_EX_ac_e", 1.25, &mut report));
        let bounds =
            crate::document::AnnotatableDocument::reaction_bounds(&doc, "R_EX_ac_e").unwrap();
        assert_eq!(bounds, (1.25, 1.25));

        let notes = crate::document::AnnotatableDocument::reaction_annotation(&doc, "R_EX_ac_e")
            .unwrap();
        assert_eq!(
            notes.get(GENE_TRANSCRIPTION_VALUES).unwrap().as_text(),
            Some("")
        );
        assert_eq!(notes.get(PROTEIN_COPY_VALUES).unwrap().as_text(), Some(""));
    }

    #[test]
    fn test_missing_ids_are_reported_not_fatal() {
        let mut doc = document();
        let mut report = ExportReport::new();
        let sample = ConcentrationSample {
            current: 0.0,
            lowest: 0.0,
            highest: 0.0,
        };

        assert!(!annotate_species(&mut doc, "M_gone_c", &sample, &mut report));
        assert!(!annotate_reaction(&mut doc, "R_gone", 1.0, &mut report));
        assert_eq!(report.of_kind(DiagnosticKind::MissingEntity).count(), 2);
    }
}
