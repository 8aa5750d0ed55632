//! What every acceptance order shares: the pool being matched, how a seed
//! finds its neighbours and how a grouping becomes a hadron.

use crate::combine::strategy::Discovery;
use crate::core::kinematics::{compose, geometric_cost};
use crate::core::particle::{Hadron, Parton};
use crate::core::pool::Availability;
use crate::core::spatial::{scan_nearest, Neighbor, SpatialIndex};
use crate::core::species::MassTable;

/// Net charge 0: one quark, one antiquark.
#[inline]
pub(crate) fn is_meson(a: &Parton, b: &Parton) -> bool {
    a.charge_thirds() + b.charge_thirds() == 0
}

/// Net charge +-1: three quarks or three antiquarks.
#[inline]
pub(crate) fn is_baryon(a: &Parton, b: &Parton, c: &Parton) -> bool {
    (a.charge_thirds() + b.charge_thirds() + c.charge_thirds()).abs() == 3
}

/// The partons one strategy pass may combine.
pub(crate) struct Pool<'a> {
    pub partons: &'a [Parton],
    /// Pool members in pool order; seeds are visited in this order.
    pub slots: &'a [usize],
    pub masses: &'a dyn MassTable,
    /// Baryon preference r; baryon ranking costs are divided by it.
    pub preference: f64,
}

impl<'a> Pool<'a> {
    #[inline]
    pub fn parton(&self, slot: usize) -> Option<&'a Parton> {
        self.partons.get(slot)
    }

    /// Perimeter scaled for comparison against meson distances.
    #[inline]
    pub fn baryon_rank(&self, perimeter: f64) -> f64 {
        perimeter / self.preference
    }

    /// Claim `members` and build the hadron, or `None` if any is taken.
    pub fn form(&self, members: &[usize], avail: &mut Availability) -> Option<Hadron> {
        let quarks: Vec<&Parton> = members
            .iter()
            .map(|&s| self.parton(s))
            .collect::<Option<_>>()?;
        if !avail.claim(members) {
            return None;
        }
        Some(compose(&quarks, geometric_cost(&quarks), self.masses))
    }
}

/// How a seed's neighbours are found for one pass.
pub(crate) enum Neighborhood<'a> {
    /// Linear scan over every free pool member.
    Scan,
    /// kd-tree over the pool members free when the pass started.
    Tree {
        index: SpatialIndex<'a>,
        k: usize,
        window: usize,
    },
}

impl<'a> Neighborhood<'a> {
    pub fn new(discovery: Discovery, pool: &Pool<'a>, avail: &Availability) -> Self {
        match discovery {
            Discovery::Exhaustive => Neighborhood::Scan,
            Discovery::KdTree {
                neighbors,
                opposite_window,
            } => Neighborhood::Tree {
                index: SpatialIndex::build(pool.partons, pool.slots, avail),
                k: neighbors,
                window: opposite_window,
            },
        }
    }

    /// Free partons a seed may group with, by ascending distance.
    pub fn around(&self, pool: &Pool<'_>, seed: usize, avail: &Availability) -> Vec<Neighbor> {
        match self {
            Neighborhood::Scan => scan_nearest(pool.partons, pool.slots, seed, avail),
            Neighborhood::Tree { index, k, .. } => index.k_nearest(seed, *k, avail),
        }
    }
}
