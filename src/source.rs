//! Seeded toy events for tests, benchmarks and the Python demo.

use crate::core::event::Event;
use crate::core::particle::{Parton, CHARGE_QUANTUM};
use crate::core::species::pdg;
use crate::error::{Error, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::TAU;

/// Tsallis temperature (GeV).
const TSALLIS_T: f64 = 0.7;
/// Tsallis power index.
const TSALLIS_N: f64 = 4.0;
/// Upper edge of the sampled transverse momentum (GeV).
const PT_MAX: f64 = 5.0;

/// Quark flavours by relative abundance; the sign follows the drawn charge.
const FLAVOURS: [(i32, u32); 3] = [(pdg::DOWN, 10), (pdg::UP, 10), (pdg::STRANGE, 3)];

/// Generates events of partons in the unit disk (z = 0) with Tsallis-shaped
/// transverse momenta and random baryon number.
///
/// After `multiplicity` partons are drawn, further draws are kept only when
/// they move the net baryon number toward the target, so every event carries
/// exactly `target_baryon_number`.
#[derive(Debug, Clone)]
pub struct ToyEventSource {
    rng: StdRng,
    multiplicity: usize,
    target_baryon_number: i32,
    time_window: (f64, f64),
    flavours: WeightedIndex<u32>,
    next_id: u64,
}

impl ToyEventSource {
    /// `seed = None` draws a seed from the thread RNG.
    pub fn new(multiplicity: usize, seed: Option<u64>) -> Result<Self> {
        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        let flavours = WeightedIndex::new(FLAVOURS.iter().map(|&(_, w)| w))
            .map_err(|e| Error::InvalidParam(format!("flavour weights: {e}")))?;
        Ok(Self {
            rng,
            multiplicity,
            target_baryon_number: 0,
            time_window: (0.0, 5.0),
            flavours,
            next_id: 0,
        })
    }

    /// Net baryon number the closing loop steers each event toward.
    pub fn with_target_baryon_number(mut self, b: i32) -> Self {
        self.target_baryon_number = b;
        self
    }

    /// Formation times are drawn uniformly from `[t0, t1)`; `t0 == t1` pins them.
    ///
    /// Errors:
    /// - `Error::InvalidParam` unless both ends are finite and `t0 <= t1`.
    pub fn with_time_window(mut self, t0: f64, t1: f64) -> Result<Self> {
        if !t0.is_finite() || !t1.is_finite() || t0 > t1 {
            return Err(Error::InvalidParam(format!(
                "time window must be finite with t0 <= t1, got [{t0}, {t1})"
            )));
        }
        self.time_window = (t0, t1);
        Ok(self)
    }

    /// Draw the next event; ids count up from 0.
    pub fn next_event(&mut self) -> Result<Event> {
        let mut partons = Vec::with_capacity(self.multiplicity + 8);
        let mut thirds = 0i32;
        for _ in 0..self.multiplicity {
            let q = self.parton(partons.len() as u32)?;
            thirds += q.charge_thirds();
            partons.push(q);
        }
        let target = 3 * self.target_baryon_number;
        while thirds != target {
            let q = self.parton(partons.len() as u32)?;
            let step = q.charge_thirds();
            if (thirds < target && step > 0) || (thirds > target && step < 0) {
                thirds += step;
                partons.push(q);
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        Event::new(id, partons)
    }

    fn parton(&mut self, id: u32) -> Result<Parton> {
        let rng = &mut self.rng;

        let rho = rng.random::<f64>().sqrt();
        let phi_r = rng.random_range(0.0..TAU);
        let r = [rho * phi_r.cos(), rho * phi_r.sin(), 0.0];

        let pt = loop {
            let pt = rng.random_range(0.0..PT_MAX);
            if rng.random::<f64>() < (1.0 + pt / TSALLIS_T).powf(-TSALLIS_N) {
                break pt;
            }
        };
        let phi_p = rng.random_range(0.0..TAU);
        let p = [pt * phi_p.cos(), pt * phi_p.sin(), 0.0];

        let (t0, t1) = self.time_window;
        let t = if t1 > t0 { rng.random_range(t0..t1) } else { t0 };

        let sign = if rng.random_bool(0.5) { 1 } else { -1 };
        let flavour = FLAVOURS[self.flavours.sample(rng)].0;
        Parton::new(id, r, t, p, f64::from(sign) * CHARGE_QUANTUM, sign * flavour)
    }
}

impl Iterator for ToyEventSource {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_close_on_target_baryon_number() -> Result<()> {
        for target in [-2, 0, 3] {
            let mut src = ToyEventSource::new(50, Some(7))?.with_target_baryon_number(target);
            let ev = src.next_event()?;
            let thirds: i32 = ev.partons().iter().map(|q| q.charge_thirds()).sum();
            assert_eq!(thirds, 3 * target);
            assert!(ev.partons().len() >= 50);
        }
        Ok(())
    }

    #[test]
    fn partons_stay_in_unit_disk() -> Result<()> {
        let mut src = ToyEventSource::new(200, Some(1))?.with_time_window(1.0, 2.0)?;
        let ev = src.next_event()?;
        for q in ev.partons() {
            assert!(q.r[0].hypot(q.r[1]) <= 1.0);
            assert_eq!(q.r[2], 0.0);
            assert!(q.p[0].hypot(q.p[1]) < PT_MAX);
            assert!((1.0..2.0).contains(&q.t));
            assert_eq!(q.species.signum(), q.charge_thirds());
        }
        Ok(())
    }

    #[test]
    fn same_seed_same_events() -> Result<()> {
        let a: Vec<Event> = ToyEventSource::new(30, Some(42))?.take(3).collect::<Result<_>>()?;
        let b: Vec<Event> = ToyEventSource::new(30, Some(42))?.take(3).collect::<Result<_>>()?;
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.id(), y.id());
            assert_eq!(x.partons(), y.partons());
        }
        assert_eq!(a[2].id(), 2);
        Ok(())
    }

    #[test]
    fn inverted_time_window_rejected() -> Result<()> {
        assert!(ToyEventSource::new(1, Some(0))?.with_time_window(2.0, 1.0).is_err());
        Ok(())
    }
}
