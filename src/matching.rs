//! Name-based matching of metabolites to model entities.
//!
//! A metabolite is matched independently on two sides: the species holding
//! its concentration notes, and the exchange reaction carrying its flux
//! bounds. A curated catalog entry always wins; without one, a fixed
//! ordered list of candidate identifiers is generated from the metabolite
//! short name and tried against the template. Unmatched sides stay `None`
//! and are left for manual resolution by the host.
//!
//! Matching is heuristic name resolution and not free to recompute, so
//! results are memoized for the lifetime of one export.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::report::{DiagnosticKind, ExportReport};
use crate::series::MetaboliteRef;

/// Resolved mapping from one metabolite to model entities. Either side may
/// be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub species_id: Option<String>,
    pub reaction_id: Option<String>,
}

impl EntityMatch {
    pub fn is_unmatched(&self) -> bool {
        self.species_id.is_none() && self.reaction_id.is_none()
    }
}

/// Read-only lookup service over the curated mapping store and the
/// template's entity names.
///
/// Injected into the pipeline so each export can run against its own
/// template context with deterministic results.
pub trait EntityCatalog {
    /// Curated species ids mapped to this metabolite, in stable order.
    fn curated_species(&self, metabolite: &MetaboliteRef) -> Vec<String>;

    /// Curated exchange reaction ids mapped to this metabolite, in stable
    /// order.
    fn curated_exchanges(&self, metabolite: &MetaboliteRef) -> Vec<String>;

    /// Resolves a candidate species name to a species id in the template.
    fn lookup_species(&self, name: &str) -> Option<String>;

    /// Resolves a candidate reactant name to its exchange reaction id.
    fn lookup_exchange(&self, name: &str) -> Option<String>;
}

/// Map-backed [`EntityCatalog`] for hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    curated_species: HashMap<String, Vec<String>>,
    curated_exchanges: HashMap<String, Vec<String>>,
    species: HashMap<String, String>,
    exchanges: HashMap<String, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template species under the name candidates resolve to.
    pub fn add_species(&mut self, name: impl Into<String>, species_id: impl Into<String>) -> &mut Self {
        self.species.insert(name.into(), species_id.into());
        self
    }

    /// Registers an exchange reaction under its reactant name.
    pub fn add_exchange(
        &mut self,
        reactant_name: impl Into<String>,
        reaction_id: impl Into<String>,
    ) -> &mut Self {
        self.exchanges.insert(reactant_name.into(), reaction_id.into());
        self
    }

    /// Adds a curated metabolite-to-species mapping.
    pub fn add_curated_species(
        &mut self,
        metabolite_id: impl Into<String>,
        species_id: impl Into<String>,
    ) -> &mut Self {
        self.curated_species
            .entry(metabolite_id.into())
            .or_default()
            .push(species_id.into());
        self
    }

    /// Adds a curated metabolite-to-exchange mapping.
    pub fn add_curated_exchange(
        &mut self,
        metabolite_id: impl Into<String>,
        reaction_id: impl Into<String>,
    ) -> &mut Self {
        self.curated_exchanges
            .entry(metabolite_id.into())
            .or_default()
            .push(reaction_id.into());
        self
    }
}

impl EntityCatalog for InMemoryCatalog {
    fn curated_species(&self, metabolite: &MetaboliteRef) -> Vec<String> {
        self.curated_species
            .get(&metabolite.id)
            .cloned()
            .unwrap_or_default()
    }

    fn curated_exchanges(&self, metabolite: &MetaboliteRef) -> Vec<String> {
        self.curated_exchanges
            .get(&metabolite.id)
            .cloned()
            .unwrap_or_default()
    }

    fn lookup_species(&self, name: &str) -> Option<String> {
        self.species.get(name).cloned()
    }

    fn lookup_exchange(&self, name: &str) -> Option<String> {
        self.exchanges.get(name).cloned()
    }
}

lazy_static! {
    // Substitution order is fixed; candidates depend on it being stable.
    static ref TRANSCODE_RULES: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"-").unwrap(), "_DASH_"),
        (Regex::new(r"\(").unwrap(), "_LPAREN_"),
        (Regex::new(r"\)").unwrap(), "_RPAREN_"),
        (Regex::new(r"\[").unwrap(), "_LSQBKT_"),
        (Regex::new(r"\]").unwrap(), "_RSQBKT_"),
    ];
}

/// Replaces the characters disallowed in model entity identifiers with
/// fixed literal tokens. Idempotent for names already free of them.
pub fn transcode(name: &str) -> String {
    TRANSCODE_RULES
        .iter()
        .fold(name.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// Transcodes a metabolite short name, first collapsing the two
/// historically special "-produced"/"-consumed" rate variants onto their
/// base compounds.
pub fn transcoded_metabolite_name(short_name: &str) -> String {
    let base = match short_name {
        "CO2p" => "co2",
        "O2c" => "o2",
        other => other,
    };
    transcode(base)
}

/// Which side of a match is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchSide {
    Species,
    Exchange,
}

impl MatchSide {
    fn compartment(&self) -> &'static str {
        match self {
            MatchSide::Species => "c",
            MatchSide::Exchange => "e",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MatchSide::Species => "species",
            MatchSide::Exchange => "exchange",
        }
    }
}

/// Ordered candidate identifiers for one metabolite short name.
fn candidates(short_name: &str, side: MatchSide) -> Vec<String> {
    let transcoded = transcoded_metabolite_name(short_name);
    let suffix = side.compartment();
    vec![
        short_name.to_string(),
        transcoded.clone(),
        format!("M_{short_name}_{suffix}"),
        format!("M_{transcoded}_{suffix}"),
        format!("M_{transcoded}_{suffix}_"),
    ]
}

/// Resolves metabolites to model entities, memoizing per export.
pub struct IdentityMatcher<'a> {
    catalog: &'a dyn EntityCatalog,
    cache: HashMap<String, EntityMatch>,
}

impl<'a> IdentityMatcher<'a> {
    pub fn new(catalog: &'a dyn EntityCatalog) -> Self {
        Self {
            catalog,
            cache: HashMap::new(),
        }
    }

    /// Resolves one metabolite, returning the memoized match on repeated
    /// calls without reattempting lookups.
    pub fn resolve(&mut self, metabolite: &MetaboliteRef, report: &mut ExportReport) -> EntityMatch {
        if let Some(matched) = self.cache.get(&metabolite.id) {
            return matched.clone();
        }

        let matched = EntityMatch {
            species_id: self.match_side(metabolite, MatchSide::Species, report),
            reaction_id: self.match_side(metabolite, MatchSide::Exchange, report),
        };
        self.cache
            .insert(metabolite.id.clone(), matched.clone());
        matched
    }

    fn match_side(
        &self,
        metabolite: &MetaboliteRef,
        side: MatchSide,
        report: &mut ExportReport,
    ) -> Option<String> {
        let curated = match side {
            MatchSide::Species => self.catalog.curated_species(metabolite),
            MatchSide::Exchange => self.catalog.curated_exchanges(metabolite),
        };
        if let Some(first) = curated.first() {
            if curated.len() > 1 {
                report.warn(
                    DiagnosticKind::MultipleMatches,
                    format!(
                        "Multiple {} matches found for {}. Selected {}",
                        side.label(),
                        metabolite.short_name,
                        first
                    ),
                );
            }
            return Some(first.clone());
        }

        for guess in candidates(&metabolite.short_name, side) {
            let found = match side {
                MatchSide::Species => self.catalog.lookup_species(&guess),
                MatchSide::Exchange => self.catalog.lookup_exchange(&guess),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }
}
