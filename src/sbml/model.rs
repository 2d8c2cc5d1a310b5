//! In-memory SBML-style model document.
//!
//! A deliberately small slice of SBML: species and reactions with notes,
//! and kinetic-law parameters holding flux bounds. Parsing the template
//! from its wire format and serializing it back are the hosting
//! application's concern; the pipeline only manipulates this tree through
//! the [`AnnotatableDocument`] capability interface.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::document::{AnnotatableDocument, AnnotationBlock};
use crate::sbml::notes::{parse_note_body, write_note_body};

/// Parameter id of the lower kinetic flux bound.
pub const LOWER_BOUND_ID: &str = "LOWER_BOUND";
/// Parameter id of the upper kinetic flux bound.
pub const UPPER_BOUND_ID: &str = "UPPER_BOUND";

/// A species of the model, holding concentration notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct Species {
    #[builder(setter(into))]
    pub id: String,

    #[serde(default)]
    #[builder(default, setter(into))]
    pub name: String,

    /// XHTML note body, parsed on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub notes: Option<String>,
}

/// One local parameter of a kinetic law.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct LocalParameter {
    #[builder(setter(into))]
    pub id: String,
    pub value: f64,
}

/// The kinetic law of a reaction; flux bounds live in its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct KineticLaw {
    #[serde(default)]
    #[builder(default, setter(into, each(name = "to_parameters")))]
    pub parameters: Vec<LocalParameter>,
}

impl KineticLaw {
    pub fn parameter(&self, id: &str) -> Option<&LocalParameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Sets a parameter value, creating the parameter when absent.
    pub fn set_parameter(&mut self, id: &str, value: f64) {
        match self.parameters.iter_mut().find(|p| p.id == id) {
            Some(parameter) => parameter.value = value,
            None => self.parameters.push(LocalParameter {
                id: id.to_string(),
                value,
            }),
        }
    }
}

/// A reaction of the model, holding flux-bound parameters and notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct Reaction {
    #[builder(setter(into))]
    pub id: String,

    #[serde(default)]
    #[builder(default, setter(into))]
    pub name: String,

    /// XHTML note body, parsed on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub kinetic_law: Option<KineticLaw>,
}

/// The model element of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct SbmlModel {
    #[builder(setter(into))]
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_species")))]
    pub species: Vec<Species>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_reactions")))]
    pub reactions: Vec<Reaction>,
}

/// The root document handed to the export pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
pub struct SbmlDocument {
    pub model: SbmlModel,
}

impl SbmlDocument {
    pub fn species(&self, id: &str) -> Option<&Species> {
        self.model.species.iter().find(|s| s.id == id)
    }

    pub fn species_mut(&mut self, id: &str) -> Option<&mut Species> {
        self.model.species.iter_mut().find(|s| s.id == id)
    }

    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.model.reactions.iter().find(|r| r.id == id)
    }

    pub fn reaction_mut(&mut self, id: &str) -> Option<&mut Reaction> {
        self.model.reactions.iter_mut().find(|r| r.id == id)
    }
}

/// Parses an entity's note body, or yields an empty block for entities
/// without notes. Malformed notes degrade to an empty block with a log
/// entry rather than failing the whole entity.
fn notes_to_block(notes: Option<&String>) -> AnnotationBlock {
    match notes {
        Some(notes) => parse_note_body(notes).unwrap_or_else(|err| {
            log::warn!("discarding malformed note body: {err}");
            AnnotationBlock::new()
        }),
        None => AnnotationBlock::new(),
    }
}

impl AnnotatableDocument for SbmlDocument {
    fn species_annotation(&self, species_id: &str) -> Option<AnnotationBlock> {
        self.species(species_id)
            .map(|s| notes_to_block(s.notes.as_ref()))
    }

    fn set_species_annotation(&mut self, species_id: &str, block: &AnnotationBlock) -> bool {
        match self.species_mut(species_id) {
            Some(species) => {
                species.notes = Some(write_note_body(block));
                true
            }
            None => false,
        }
    }

    fn reaction_annotation(&self, reaction_id: &str) -> Option<AnnotationBlock> {
        self.reaction(reaction_id)
            .map(|r| notes_to_block(r.notes.as_ref()))
    }

    fn set_reaction_annotation(&mut self, reaction_id: &str, block: &AnnotationBlock) -> bool {
        match self.reaction_mut(reaction_id) {
            Some(reaction) => {
                reaction.notes = Some(write_note_body(block));
                true
            }
            None => false,
        }
    }

    fn reaction_bounds(&self, reaction_id: &str) -> Option<(f64, f64)> {
        let law = self.reaction(reaction_id)?.kinetic_law.as_ref()?;
        let lower = law.parameter(LOWER_BOUND_ID)?.value;
        let upper = law.parameter(UPPER_BOUND_ID)?.value;
        Some((lower, upper))
    }

    fn set_reaction_bounds(&mut self, reaction_id: &str, lower: f64, upper: f64) -> bool {
        match self.reaction_mut(reaction_id) {
            Some(reaction) => {
                let law = reaction.kinetic_law.get_or_insert_with(KineticLaw::default);
                law.set_parameter(LOWER_BOUND_ID, lower);
                law.set_parameter(UPPER_BOUND_ID, upper);
                true
            }
            None => false,
        }
    }
}
