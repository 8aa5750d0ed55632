//! Competitive acceptance: per seed, the best meson and the best baryon
//! compete on ranking cost.

use crate::combine::pool::{is_meson, Neighborhood, Pool};
use crate::core::kinematics::perimeter;
use crate::core::particle::Hadron;
use crate::core::pool::Availability;
use crate::core::spatial::Neighbor;

/// Two same-sign partners for a seed and the triangle's perimeter.
#[derive(Debug, Clone, Copy)]
struct Triple {
    b: usize,
    c: usize,
    perimeter: f64,
}

pub(crate) fn accept_cheaper(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    avail: &mut Availability,
) -> Vec<Hadron> {
    let mut formed = Vec::new();
    for &seed in pool.slots {
        if !avail.is_free(seed) {
            continue;
        }
        if let Some(h) = cheaper_of_both(pool, hood, seed, avail) {
            formed.push(h);
        }
    }
    formed
}

fn cheaper_of_both(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    seed: usize,
    avail: &mut Availability,
) -> Option<Hadron> {
    let (partner, triple) = match hood {
        Neighborhood::Scan => exhaustive_contenders(pool, hood, seed, avail),
        Neighborhood::Tree { index, window, .. } => {
            let partner = index.nearest_opposite(seed, *window, avail);
            let same = index.nearest_same(seed, 2, avail);
            let triple = match (pool.parton(seed), same.as_slice()) {
                (Some(qa), [b, c]) => Some(Triple {
                    b: b.slot,
                    c: c.slot,
                    perimeter: perimeter(qa, pool.parton(b.slot)?, pool.parton(c.slot)?),
                }),
                _ => None,
            };
            (partner, triple)
        }
    };

    match (partner, triple) {
        (Some(m), Some(t)) if m.distance < pool.baryon_rank(t.perimeter) => {
            pool.form(&[seed, m.slot], avail)
        }
        (_, Some(t)) => pool.form(&[seed, t.b, t.c], avail),
        (Some(m), None) => pool.form(&[seed, m.slot], avail),
        (None, None) => None,
    }
}

/// Nearest free opposite-sign parton and the smallest-perimeter pair of
/// free same-sign partons, over the whole pool.
fn exhaustive_contenders(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    seed: usize,
    avail: &Availability,
) -> (Option<Neighbor>, Option<Triple>) {
    let Some(qa) = pool.parton(seed) else {
        return (None, None);
    };
    let near = hood.around(pool, seed, avail);
    let partner = near
        .iter()
        .copied()
        .find(|n| pool.parton(n.slot).is_some_and(|qb| is_meson(qa, qb)));

    let same: Vec<usize> = near
        .iter()
        .map(|n| n.slot)
        .filter(|&s| pool.parton(s).is_some_and(|qb| qb.same_sign(qa)))
        .collect();
    let mut best: Option<Triple> = None;
    for (i, &b) in same.iter().enumerate() {
        let Some(qb) = pool.parton(b) else { continue };
        for &c in &same[i + 1..] {
            let Some(qc) = pool.parton(c) else { continue };
            let p = perimeter(qa, qb, qc);
            if best.map_or(true, |t| p < t.perimeter) {
                best = Some(Triple { b, c, perimeter: p });
            }
        }
    }
    (partner, best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::strategy::Discovery;
    use crate::core::particle::{Parton, CHARGE_QUANTUM};
    use crate::core::species::PdgMassTable;
    use crate::error::Result;

    fn at(id: u32, x: f64, y: f64, charge: f64) -> Result<Parton> {
        Parton::new(id, [x, y, 0.0], 0.0, [0.0; 3], charge, 1)
    }

    /// Quark triangle of perimeter 3 at the origin, antiquark 1.2 from q0.
    fn contest() -> Result<Vec<Parton>> {
        let h = 3.0_f64.sqrt() / 2.0;
        Ok(vec![
            at(0, 0.0, 0.0, CHARGE_QUANTUM)?,
            at(1, 1.0, 0.0, CHARGE_QUANTUM)?,
            at(2, 0.5, h, CHARGE_QUANTUM)?,
            at(3, -1.2, 0.0, -CHARGE_QUANTUM)?,
        ])
    }

    #[test]
    fn lower_ranked_contender_wins() -> Result<()> {
        let partons = contest()?;
        let slots = [0, 1, 2, 3];
        let masses = PdgMassTable::default();
        for discovery in [
            Discovery::Exhaustive,
            Discovery::KdTree {
                neighbors: 20,
                opposite_window: 10,
            },
        ] {
            // 1.2 < 3/1: meson; 1.2 > 3/4: baryon.
            for (r, expect) in [(1.0, vec![0u32, 3]), (4.0, vec![0, 1, 2])] {
                let pool = Pool {
                    partons: &partons,
                    slots: &slots,
                    masses: &masses,
                    preference: r,
                };
                let mut avail = Availability::new(4);
                let hood = Neighborhood::new(discovery, &pool, &avail);
                let got = accept_cheaper(&pool, &hood, &mut avail);
                let mut ids = got[0].constituents.clone();
                ids.sort_unstable();
                assert_eq!(ids, expect, "{discovery:?} r = {r}");
            }
        }
        Ok(())
    }

    #[test]
    fn lone_seed_forms_nothing() -> Result<()> {
        let partons = vec![at(0, 0.0, 0.0, CHARGE_QUANTUM)?, at(1, 1.0, 0.0, CHARGE_QUANTUM)?];
        let slots = [0, 1];
        let masses = PdgMassTable::default();
        let pool = Pool {
            partons: &partons,
            slots: &slots,
            masses: &masses,
            preference: 1.0,
        };
        let mut avail = Availability::new(2);
        let hood = Neighborhood::new(Discovery::Exhaustive, &pool, &avail);
        assert!(accept_cheaper(&pool, &hood, &mut avail).is_empty());
        assert_eq!(avail.remaining(), 2);
        Ok(())
    }
}
