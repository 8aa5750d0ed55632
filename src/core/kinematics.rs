//! Four-momentum bookkeeping shared by every strategy and the afterburner.

use crate::core::particle::{Hadron, Parton, DIM};
use crate::core::species::MassTable;

/// Baryon number of a group, rounded to guard against drift in thirds-valued sums.
#[inline]
pub fn net_charge(members: &[&Parton]) -> i32 {
    members.iter().map(|q| q.charge).sum::<f64>().round() as i32
}

/// Distance for a pair, perimeter for a triple.
pub fn geometric_cost(members: &[&Parton]) -> f64 {
    let mut cost = 0.0;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            cost += a.distance_to(b);
        }
    }
    cost
}

/// Perimeter of the triangle spanned by three partons.
#[inline]
pub fn perimeter(a: &Parton, b: &Parton, c: &Parton) -> f64 {
    a.distance_to(b) + a.distance_to(c) + b.distance_to(c)
}

/// sqrt(max(0, E^2 - |p|^2)) with each constituent on shell.
pub fn invariant_mass(members: &[&Parton], masses: &dyn MassTable) -> f64 {
    let mut e_tot = 0.0;
    let mut p_tot = [0.0_f64; DIM];
    for q in members {
        e_tot += q.energy(masses.mass_or_zero(q.species));
        for (acc, &pk) in p_tot.iter_mut().zip(q.p.iter()) {
            *acc += pk;
        }
    }
    let psq: f64 = p_tot.iter().map(|&c| c * c).sum();
    (e_tot * e_tot - psq).max(0.0).sqrt()
}

/// Build a hadron from its constituents.
///
/// Position and formation time are means, momentum is the vector sum and
/// the charge is the rounded sum of constituent charges.
pub fn compose(members: &[&Parton], formation_cost: f64, masses: &dyn MassTable) -> Hadron {
    let n = members.len() as f64;
    let mut r = [0.0_f64; DIM];
    let mut p = [0.0_f64; DIM];
    let mut t = 0.0;
    for q in members {
        for k in 0..DIM {
            r[k] += q.r[k];
            p[k] += q.p[k];
        }
        t += q.t;
    }
    for rk in &mut r {
        *rk /= n;
    }
    Hadron {
        r,
        t: t / n,
        p,
        charge: net_charge(members),
        formation_cost,
        mass: invariant_mass(members, masses),
        constituents: members.iter().map(|q| q.id).collect(),
        species: 0,
        forced: false,
    }
}
