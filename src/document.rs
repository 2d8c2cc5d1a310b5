//! Narrow capability interface over the target model document.
//!
//! Derivation logic never touches a concrete document library; it sees
//! only annotation blocks and kinetic bounds through
//! [`AnnotatableDocument`]. The crate ships an SBML-style implementation
//! in [`crate::sbml`], and hosts may plug in their own.

use serde::{Deserialize, Serialize};

/// A value stored under one annotation key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoteValue {
    /// Plain text.
    Text(String),
    /// An XML subtree carried through untouched.
    Opaque(String),
}

impl NoteValue {
    /// The textual content for plain values, `None` for opaque subtrees.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NoteValue::Text(text) => Some(text),
            NoteValue::Opaque(_) => None,
        }
    }
}

impl From<&str> for NoteValue {
    fn from(value: &str) -> Self {
        NoteValue::Text(value.to_string())
    }
}

impl From<String> for NoteValue {
    fn from(value: String) -> Self {
        NoteValue::Text(value)
    }
}

/// An ordered mapping of annotation keys to values.
///
/// Updates merge: keys not named keep their value and their original
/// position, named keys are overwritten in place, and unseen keys append
/// in update order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBlock {
    entries: Vec<(String, NoteValue)>,
}

impl AnnotationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&NoteValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Sets one key, overwriting in place or appending when new.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<NoteValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merges all entries of `other` into this block.
    pub fn merge(&mut self, other: &AnnotationBlock) {
        for (key, value) in &other.entries {
            self.set(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NoteValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the pipeline needs from a model document: annotation blocks on
/// species and reactions, and kinetic flux bounds on reactions.
///
/// Getters return `None` when the entity id does not exist in the
/// document (an entity without notes yields an empty block). Setters
/// return whether the entity was found and updated.
pub trait AnnotatableDocument {
    fn species_annotation(&self, species_id: &str) -> Option<AnnotationBlock>;

    fn set_species_annotation(&mut self, species_id: &str, block: &AnnotationBlock) -> bool;

    fn reaction_annotation(&self, reaction_id: &str) -> Option<AnnotationBlock>;

    fn set_reaction_annotation(&mut self, reaction_id: &str, block: &AnnotationBlock) -> bool;

    /// The reaction's kinetic `(lower, upper)` bound values, when both are
    /// present.
    fn reaction_bounds(&self, reaction_id: &str) -> Option<(f64, f64)>;

    fn set_reaction_bounds(&mut self, reaction_id: &str, lower: f64, upper: f64) -> bool;
}
