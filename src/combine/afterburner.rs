//! Forced closure over whatever the strategy left behind.
//!
//! Free quarks and antiquarks are paired index for index into mesons; the
//! surplus sign is grouped into consecutive triples as baryons. Spatial
//! cost plays no part. At most two partons survive.

use crate::combine::pool::Pool;
use crate::core::particle::{Hadron, Parton};
use crate::core::pool::Availability;
use crate::core::species::MassTable;

/// Force the free partons into hadrons and return them, all marked `forced`.
pub fn afterburn(
    partons: &[Parton],
    avail: &mut Availability,
    masses: &dyn MassTable,
) -> Vec<Hadron> {
    let (quarks, antiquarks): (Vec<usize>, Vec<usize>) = avail
        .free_slots()
        .filter(|&s| s < partons.len())
        .partition(|&s| partons[s].charge > 0.0);
    let slots: Vec<usize> = avail.free_slots().collect();
    let pool = Pool {
        partons,
        slots: &slots,
        masses,
        preference: 1.0,
    };

    let paired = quarks.len().min(antiquarks.len());
    let mut formed = Vec::with_capacity(paired + quarks.len().max(antiquarks.len()) / 3);
    for (&q, &qbar) in quarks.iter().zip(&antiquarks) {
        formed.extend(pool.form(&[q, qbar], avail));
    }
    let surplus = if quarks.len() > paired {
        &quarks[paired..]
    } else {
        &antiquarks[paired..]
    };
    for triple in surplus.chunks_exact(3) {
        formed.extend(pool.form(triple, avail));
    }
    for h in &mut formed {
        h.forced = true;
    }
    formed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::CHARGE_QUANTUM;
    use crate::core::species::PdgMassTable;
    use crate::error::Result;

    fn scattered(charges: &[f64]) -> Result<Vec<Parton>> {
        charges
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let x = (i * 37 % 11) as f64;
                Parton::new(i as u32, [x, -x, 0.5 * x], 0.1 * i as f64, [0.0, 0.0, 1.0], c, 1)
            })
            .collect()
    }

    #[test]
    fn three_quarks_two_antiquarks() -> Result<()> {
        let q = CHARGE_QUANTUM;
        let partons = scattered(&[q, -q, q, q, -q])?;
        let mut avail = Availability::new(5);
        let got = afterburn(&partons, &mut avail, &PdgMassTable::default());
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|h| h.is_meson() && h.forced && h.charge == 0));
        assert_eq!(got[0].constituents, vec![0, 1]);
        assert_eq!(got[1].constituents, vec![2, 4]);
        assert_eq!(avail.remaining(), 1);
        assert!(avail.is_free(3));
        Ok(())
    }

    #[test]
    fn surplus_grouped_into_baryons() -> Result<()> {
        let q = CHARGE_QUANTUM;
        // one antiquark, eight quarks: 1 meson, 2 baryons, 1 left
        let mut charges = vec![-q];
        charges.extend(std::iter::repeat(q).take(8));
        let partons = scattered(&charges)?;
        let mut avail = Availability::new(partons.len());
        let got = afterburn(&partons, &mut avail, &PdgMassTable::default());
        let baryons: Vec<&Hadron> = got.iter().filter(|h| h.is_baryon()).collect();
        assert_eq!(got.len() - baryons.len(), 1);
        assert_eq!(baryons.len(), 2);
        assert!(baryons.iter().all(|h| h.charge == 1));
        assert_eq!(avail.remaining(), 1);
        Ok(())
    }

    #[test]
    fn consumed_partons_untouched() -> Result<()> {
        let q = CHARGE_QUANTUM;
        let partons = scattered(&[q, -q, q, -q])?;
        let mut avail = Availability::new(4);
        assert!(avail.claim(&[0, 1]));
        let got = afterburn(&partons, &mut avail, &PdgMassTable::default());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].constituents, vec![2, 3]);
        assert_eq!(avail.remaining(), 0);
        Ok(())
    }

    #[test]
    fn empty_pool_forms_nothing() {
        let mut avail = Availability::new(0);
        assert!(afterburn(&[], &mut avail, &PdgMassTable::default()).is_empty());
    }
}
