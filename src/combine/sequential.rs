//! Seed-ordered acceptance: each free seed takes the first valid grouping
//! along its neighbours, nearest first.

use crate::combine::pool::{is_baryon, is_meson, Neighborhood, Pool};
use crate::core::particle::Hadron;
use crate::core::pool::Availability;
use rand::Rng;

/// First valid meson or baryon wins.
pub(crate) fn accept_first(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    avail: &mut Availability,
) -> Vec<Hadron> {
    walk_seeds(pool, hood, avail, &mut || true)
}

/// As [`accept_first`], but each valid meson is turned down with
/// probability r/(1+r), leaving the seed free to look further for a baryon.
pub(crate) fn accept_first_stochastic<R: Rng>(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    avail: &mut Availability,
    rng: &mut R,
) -> Vec<Hadron> {
    let reject = pool.preference / (1.0 + pool.preference);
    walk_seeds(pool, hood, avail, &mut || rng.random::<f64>() >= reject)
}

fn walk_seeds(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    avail: &mut Availability,
    keep_meson: &mut dyn FnMut() -> bool,
) -> Vec<Hadron> {
    let mut formed = Vec::new();
    for &seed in pool.slots {
        if !avail.is_free(seed) {
            continue;
        }
        if let Some(h) = first_grouping(pool, hood, seed, avail, keep_meson) {
            formed.push(h);
        }
    }
    formed
}

fn first_grouping(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    seed: usize,
    avail: &mut Availability,
    keep_meson: &mut dyn FnMut() -> bool,
) -> Option<Hadron> {
    let qa = pool.parton(seed)?;
    let near = hood.around(pool, seed, avail);
    for (i, b) in near.iter().enumerate() {
        // the index is not updated as hadrons form
        if !avail.is_free(b.slot) {
            continue;
        }
        let qb = pool.parton(b.slot)?;
        if is_meson(qa, qb) {
            if keep_meson() {
                return pool.form(&[seed, b.slot], avail);
            }
            continue;
        }
        for c in &near[i + 1..] {
            if !avail.is_free(c.slot) {
                continue;
            }
            if pool.parton(c.slot).is_some_and(|qc| is_baryon(qa, qb, qc)) {
                return pool.form(&[seed, b.slot, c.slot], avail);
            }
        }
    }
    None
}
