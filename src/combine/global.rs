//! Sorted acceptance: rank every candidate grouping, then accept cheapest first.

use crate::combine::pool::{is_baryon, is_meson, Neighborhood, Pool};
use crate::core::kinematics::perimeter;
use crate::core::particle::Hadron;
use crate::core::pool::Availability;
use ordered_float::NotNan;

/// Member slot placeholder for the third position of a meson.
const NONE: usize = usize::MAX;

/// A candidate grouping with its ranking key.
///
/// Members are stored in ascending slot order so that the same grouping
/// reached from different seeds compares equal and sorts identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    rank: NotNan<f64>,
    arity: u8,
    members: [usize; 3],
}

impl Candidate {
    fn meson(pool: &Pool<'_>, a: usize, b: usize) -> Option<Self> {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        let (qa, qb) = (pool.parton(a)?, pool.parton(b)?);
        if !is_meson(qa, qb) {
            return None;
        }
        Some(Self {
            rank: NotNan::new(qa.distance_to(qb)).ok()?,
            arity: 2,
            members: [a, b, NONE],
        })
    }

    fn baryon(pool: &Pool<'_>, a: usize, b: usize, c: usize) -> Option<Self> {
        let mut m = [a, b, c];
        m.sort_unstable();
        let (qa, qb, qc) = (pool.parton(m[0])?, pool.parton(m[1])?, pool.parton(m[2])?);
        if !is_baryon(qa, qb, qc) {
            return None;
        }
        Some(Self {
            rank: NotNan::new(pool.baryon_rank(perimeter(qa, qb, qc))).ok()?,
            arity: 3,
            members: m,
        })
    }

    fn members(&self) -> &[usize] {
        &self.members[..self.arity as usize]
    }
}

/// Every valid pair and triple among the free pool members.
fn all_groupings(pool: &Pool<'_>, avail: &Availability) -> Vec<Candidate> {
    let free: Vec<usize> = avail.filter_free(pool.slots).collect();
    let mut out = Vec::new();
    for (i, &a) in free.iter().enumerate() {
        let Some(qa) = pool.parton(a) else { continue };
        for (j, &b) in free.iter().enumerate().skip(i + 1) {
            out.extend(Candidate::meson(pool, a, b));
            if pool.parton(b).is_some_and(|qb| qb.same_sign(qa)) {
                for &c in &free[j + 1..] {
                    out.extend(Candidate::baryon(pool, a, b, c));
                }
            }
        }
    }
    out
}

/// Pairs and triples formed by each free seed with its neighbours.
fn local_groupings(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    avail: &Availability,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for seed in avail.filter_free(pool.slots) {
        let near = hood.around(pool, seed, avail);
        for (i, b) in near.iter().enumerate() {
            out.extend(Candidate::meson(pool, seed, b.slot));
            for c in &near[i + 1..] {
                out.extend(Candidate::baryon(pool, seed, b.slot, c.slot));
            }
        }
    }
    out
}

/// Accept candidates in ascending (cost, arity, members) order, skipping
/// any whose members were consumed by an earlier acceptance.
pub(crate) fn accept_sorted(
    pool: &Pool<'_>,
    hood: &Neighborhood<'_>,
    avail: &mut Availability,
) -> Vec<Hadron> {
    let mut candidates = match hood {
        Neighborhood::Scan => all_groupings(pool, avail),
        Neighborhood::Tree { .. } => local_groupings(pool, hood, avail),
    };
    candidates.sort_unstable();
    candidates.dedup();
    candidates
        .iter()
        .filter_map(|c| pool.form(c.members(), avail))
        .collect()
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

    #[test]
    fn cheapest_grouping_accepted_first() -> Result<()> {
        // q0 and qbar1 are 1 apart; qbar2 sits 0.5 from qbar1 but cannot pair with it.
        let partons = vec![
            at(0, 0.0, 0.0, CHARGE_QUANTUM)?,
            at(1, 1.0, 0.0, -CHARGE_QUANTUM)?,
            at(2, 1.5, 0.0, -CHARGE_QUANTUM)?,
        ];
        let slots = [0, 1, 2];
        let masses = PdgMassTable::default();
        let pool = Pool {
            partons: &partons,
            slots: &slots,
            masses: &masses,
            preference: 1.0,
        };
        let mut avail = Availability::new(3);
        let hood = Neighborhood::new(Discovery::Exhaustive, &pool, &avail);
        let got = accept_sorted(&pool, &hood, &mut avail);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].constituents, vec![0, 1]);
        assert!(avail.is_free(2));
        Ok(())
    }

    #[test]
    fn preference_can_flip_to_baryon() -> Result<()> {
        // Triangle of quarks with perimeter 3 and an antiquark 1.2 from q0.
        let h = 3.0_f64.sqrt() / 2.0;
        let partons = vec![
            at(0, 0.0, 0.0, CHARGE_QUANTUM)?,
            at(1, 1.0, 0.0, CHARGE_QUANTUM)?,
            at(2, 0.5, h, CHARGE_QUANTUM)?,
            at(3, -1.2, 0.0, -CHARGE_QUANTUM)?,
        ];
        let slots = [0, 1, 2, 3];
        let masses = PdgMassTable::default();
        for (r, expect_baryon) in [(1.0, false), (4.0, true)] {
            let pool = Pool {
                partons: &partons,
                slots: &slots,
                masses: &masses,
                preference: r,
            };
            let mut avail = Availability::new(4);
            let hood = Neighborhood::new(Discovery::Exhaustive, &pool, &avail);
            let got = accept_sorted(&pool, &hood, &mut avail);
            assert_eq!(got[0].is_baryon(), expect_baryon, "r = {r}");
            // recorded cost is never scaled
            if expect_baryon {
                assert!((got[0].formation_cost - 3.0).abs() < 1e-9);
            }
        }
        Ok(())
    }
}
