use crate::core::particle::{Hadron, Parton, DIM};
use crate::core::pool::Availability;
use crate::core::species::SpeciesResolver;
use crate::error::{Error, Result};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One collision event: its partons, the hadrons formed from them and the
/// record of which partons have been consumed.
///
/// Slots in the [`Availability`] token index `partons()`.
#[derive(Debug, Clone)]
pub struct Event {
    id: u64,
    partons: Vec<Parton>,
    hadrons: Vec<Hadron>,
    avail: Availability,
}

/// Counts after combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: u64,
    pub mesons: usize,
    pub baryons: usize,
    /// Hadrons produced by the afterburner (included in `mesons`/`baryons`).
    pub forced: usize,
    pub unconsumed: usize,
    pub total: usize,
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {}: {} partons -> {} mesons, {} baryons ({} forced), {} left",
            self.event_id, self.total, self.mesons, self.baryons, self.forced, self.unconsumed
        )
    }
}

impl Event {
    /// Errors:
    /// - `Error::InvalidParam` if two partons share an id.
    pub fn new(id: u64, partons: Vec<Parton>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(partons.len());
        for q in &partons {
            if !seen.insert(q.id) {
                return Err(Error::InvalidParam(format!(
                    "duplicate parton id {} in event {id}",
                    q.id
                )));
            }
        }
        let avail = Availability::new(partons.len());
        Ok(Self {
            id,
            partons,
            hadrons: Vec::new(),
            avail,
        })
    }

    /// Caller-assigned event number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Input partons; positions reflect any free streaming done by frame passes.
    pub fn partons(&self) -> &[Parton] {
        &self.partons
    }

    /// Hadrons formed so far, strategy output first, then forced ones.
    pub fn hadrons(&self) -> &[Hadron] {
        &self.hadrons
    }

    /// Hand the hadrons over to the caller, leaving the event's list empty.
    pub fn take_hadrons(&mut self) -> Vec<Hadron> {
        std::mem::take(&mut self.hadrons)
    }

    /// Which parton slots are still free.
    pub fn availability(&self) -> &Availability {
        &self.avail
    }

    /// Partons not consumed by any hadron, in input order.
    pub fn unconsumed(&self) -> impl Iterator<Item = &Parton> + '_ {
        self.avail.free_slots().filter_map(|s| self.partons.get(s))
    }

    /// Split borrows for the engine: positions may be free-streamed while
    /// the availability token is updated.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Parton], &mut Availability) {
        (&mut self.partons, &mut self.avail)
    }

    pub(crate) fn push_hadrons(&mut self, hadrons: impl IntoIterator<Item = Hadron>) {
        self.hadrons.extend(hadrons);
    }

    /// Hadron and leftover counts as of now.
    pub fn summary(&self) -> EventSummary {
        let mut s = EventSummary {
            event_id: self.id,
            unconsumed: self.avail.remaining(),
            total: self.partons.len(),
            ..EventSummary::default()
        };
        for h in &self.hadrons {
            if h.is_baryon() {
                s.baryons += 1;
            } else {
                s.mesons += 1;
            }
            if h.forced {
                s.forced += 1;
            }
        }
        s
    }

    /// Verify `3*baryons + 2*mesons + unconsumed == total` with at most two
    /// partons left over.
    pub fn check_closure(&self) -> Result<()> {
        let s = self.summary();
        if 3 * s.baryons + 2 * s.mesons + s.unconsumed != s.total || s.unconsumed > 2 {
            return Err(Error::ClosureViolation {
                baryons: s.baryons,
                mesons: s.mesons,
                unconsumed: s.unconsumed,
                total: s.total,
            });
        }
        Ok(())
    }

    /// Assign a species code to every hadron from its constituents' species.
    pub fn assign_species(&mut self, resolver: &mut dyn SpeciesResolver) {
        let by_id: HashMap<u32, i32> = self.partons.iter().map(|q| (q.id, q.species)).collect();
        let mut codes = Vec::with_capacity(3);
        for h in &mut self.hadrons {
            codes.clear();
            codes.extend(h.constituents.iter().filter_map(|id| by_id.get(id).copied()));
            h.species = resolver.resolve(&codes, h.mass);
        }
    }

    /// Permute the positions of a random `fraction` of the partons among
    /// themselves. Momenta, times and charges stay with their parton.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `fraction` is outside [0, 1].
    pub fn shuffle_positions<R: Rng + ?Sized>(&mut self, fraction: f64, rng: &mut R) -> Result<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidParam(format!(
                "shuffle fraction must be in [0, 1], got {fraction}"
            )));
        }
        let n = self.partons.len();
        let count = ((n as f64) * fraction).round() as usize;
        if count < 2 {
            return Ok(());
        }
        let chosen = index::sample(rng, n, count).into_vec();
        let mut positions: Vec<[f64; DIM]> = chosen.iter().map(|&i| self.partons[i].r).collect();
        positions.shuffle(rng);
        for (&i, r) in chosen.iter().zip(positions) {
            self.partons[i].r = r;
        }
        Ok(())
    }
}

/// Standard position-shuffling levels used to probe sensitivity to spatial correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShuffleLevel {
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl ShuffleLevel {
    /// Share of partons whose positions are shuffled.
    pub fn fraction(self) -> f64 {
        match self {
            ShuffleLevel::Quarter => 0.25,
            ShuffleLevel::Half => 0.5,
            ShuffleLevel::ThreeQuarters => 0.75,
            ShuffleLevel::Full => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::CHARGE_QUANTUM;
    use rand::{rngs::StdRng, SeedableRng};

    fn partons(n: usize) -> Result<Vec<Parton>> {
        (0..n)
            .map(|i| {
                let c = if i % 2 == 0 { CHARGE_QUANTUM } else { -CHARGE_QUANTUM };
                Parton::new(i as u32, [i as f64, 0.0, 0.0], 0.0, [0.0, 0.0, 1.0], c, 2)
            })
            .collect()
    }

    fn meson(ids: [u32; 2]) -> Hadron {
        Hadron {
            r: [0.0; 3],
            t: 0.0,
            p: [0.0; 3],
            charge: 0,
            formation_cost: 1.0,
            mass: 0.7,
            constituents: ids.to_vec(),
            species: 0,
            forced: false,
        }
    }

    #[test]
    fn duplicate_ids_rejected() -> Result<()> {
        let mut ps = partons(3)?;
        ps[2].id = 0;
        assert!(matches!(Event::new(1, ps), Err(Error::InvalidParam(_))));
        Ok(())
    }

    #[test]
    fn closure_counts_hadrons_and_leftovers() -> Result<()> {
        let mut ev = Event::new(7, partons(5)?)?;
        // Before anything is consumed, five leftovers break the remainder bound.
        assert!(matches!(
            ev.check_closure(),
            Err(Error::ClosureViolation { unconsumed: 5, .. })
        ));
        {
            let (_, avail) = ev.parts_mut();
            assert!(avail.claim(&[0, 1]));
            assert!(avail.claim(&[2, 3]));
        }
        let mut forced = meson([2, 3]);
        forced.forced = true;
        ev.push_hadrons([meson([0, 1]), forced]);
        ev.check_closure()?;
        let s = ev.summary();
        assert_eq!((s.mesons, s.baryons, s.forced, s.unconsumed, s.total), (2, 0, 1, 1, 5));
        assert_eq!(ev.unconsumed().map(|q| q.id).collect::<Vec<_>>(), vec![4]);
        Ok(())
    }

    #[test]
    fn species_resolver_sees_constituent_codes() -> Result<()> {
        let mut ps = partons(2)?;
        ps[1].species = -3;
        let mut ev = Event::new(0, ps)?;
        ev.push_hadrons([meson([0, 1])]);
        let mut seen = Vec::new();
        ev.assign_species(&mut |codes: &[i32], _m: f64| {
            seen.extend_from_slice(codes);
            321
        });
        assert_eq!(seen, vec![2, -3]);
        assert_eq!(ev.hadrons()[0].species, 321);
        Ok(())
    }

    #[test]
    fn shuffle_preserves_position_multiset() -> Result<()> {
        let mut ev = Event::new(0, partons(40)?)?;
        let before: Vec<[f64; 3]> = ev.partons().iter().map(|q| q.r).collect();
        let mut rng = StdRng::seed_from_u64(5);
        ev.shuffle_positions(ShuffleLevel::Full.fraction(), &mut rng)?;
        let mut after: Vec<f64> = ev.partons().iter().map(|q| q.r[0]).collect();
        after.sort_unstable_by(f64::total_cmp);
        let expected: Vec<f64> = before.iter().map(|r| r[0]).collect();
        assert_eq!(after, expected);
        // charges and momenta did not move with the positions
        for (i, q) in ev.partons().iter().enumerate() {
            assert_eq!(q.id, i as u32);
            assert_eq!(q.p, [0.0, 0.0, 1.0]);
        }
        Ok(())
    }

    #[test]
    fn shuffle_fraction_bounds() -> Result<()> {
        let mut ev = Event::new(0, partons(4)?)?;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ev.shuffle_positions(1.5, &mut rng).is_err());
        ev.shuffle_positions(0.0, &mut rng)?;
        for (i, q) in ev.partons().iter().enumerate() {
            assert_eq!(q.r[0], i as f64);
        }
        Ok(())
    }
}
