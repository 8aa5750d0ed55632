//! Species collaborators: rest masses in, hadron PDG codes out.
//!
//! Naming hadrons is not the engine's job. The engine only needs a rest mass
//! per parton species to compute invariant masses, and hands finished hadrons
//! to a [`SpeciesResolver`] supplied by the caller.

use std::collections::HashMap;

/// PDG codes for the quark species the engine works with.
pub mod pdg {
    pub const DOWN: i32 = 1;
    pub const UP: i32 = 2;
    pub const STRANGE: i32 = 3;
    pub const CHARM: i32 = 4;
    pub const BOTTOM: i32 = 5;
    pub const TOP: i32 = 6;
    pub const GLUON: i32 = 21;
}

/// Rest-mass lookup by PDG code.
pub trait MassTable {
    /// Rest mass in GeV, or `None` for an unknown species.
    fn mass(&self, species: i32) -> Option<f64>;

    /// Rest mass with unknown species treated as massless.
    fn mass_or_zero(&self, species: i32) -> f64 {
        self.mass(species).unwrap_or(0.0)
    }
}

/// Assigns a hadron species from its constituents.
///
/// `constituents` holds the PDG codes of the partons in grouping order.
pub trait SpeciesResolver {
    fn resolve(&mut self, constituents: &[i32], invariant_mass: f64) -> i32;
}

impl<F> SpeciesResolver for F
where
    F: FnMut(&[i32], f64) -> i32,
{
    fn resolve(&mut self, constituents: &[i32], invariant_mass: f64) -> i32 {
        self(constituents, invariant_mass)
    }
}

/// Constituent-quark and light-hadron masses keyed by PDG code.
///
/// Quark masses are constituent masses; antiparticles share the entry of
/// their particle.
#[derive(Debug, Clone)]
pub struct PdgMassTable {
    masses: HashMap<i32, f64>,
}

impl PdgMassTable {
    /// Empty table; every lookup misses.
    pub fn empty() -> Self {
        Self {
            masses: HashMap::new(),
        }
    }

    /// Insert or replace the mass for `species` (and its antiparticle).
    pub fn with_mass(mut self, species: i32, mass: f64) -> Self {
        self.masses.insert(species.abs(), mass);
        self
    }
}

impl Default for PdgMassTable {
    fn default() -> Self {
        let entries: [(i32, f64); 23] = [
            (pdg::DOWN, 0.325),
            (pdg::UP, 0.325),
            (pdg::STRANGE, 0.5),
            (pdg::CHARM, 1.60),
            (pdg::BOTTOM, 5.0),
            (pdg::TOP, 172.5),
            (pdg::GLUON, 0.0),
            (11, 0.000_510_999),
            (13, 0.105_658_4),
            (15, 1.776_86),
            (22, 0.0),
            (111, 0.134_976_8),
            (211, 0.139_570_4),
            (113, 0.775_26),
            (213, 0.775_11),
            (221, 0.547_862),
            (223, 0.782_65),
            (333, 1.019_461),
            (311, 0.497_611),
            (321, 0.493_677),
            (2212, 0.938_272_1),
            (2112, 0.939_565_4),
            (3122, 1.115_683),
        ];
        Self {
            masses: entries.into_iter().collect(),
        }
    }
}

impl MassTable for PdgMassTable {
    fn mass(&self, species: i32) -> Option<f64> {
        self.masses.get(&species.abs()).copied()
    }
}
