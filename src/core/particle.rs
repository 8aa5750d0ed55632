use crate::error::{Error, Result};

/// Fixed spatial dimension (3D).
pub const DIM: usize = 3;

/// Baryon number carried by a single quark.
pub const CHARGE_QUANTUM: f64 = 1.0 / 3.0;

/// A parton entering hadronization.
///
/// Fields:
/// - `id`: stable identifier, unique within an event
/// - `r`: position vector [x, y, z] (fm)
/// - `t`: formation time (fm/c)
/// - `p`: momentum vector [px, py, pz] (GeV)
/// - `charge`: baryon number, +1/3 for quarks and -1/3 for antiquarks
/// - `species`: PDG code (1 = d, 2 = u, 3 = s, negative for antiquarks)
///
/// Whether a parton has been consumed is tracked by the event's
/// [`Availability`](crate::core::Availability), not by the parton itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Parton {
    /// Stable parton identifier.
    pub id: u32,
    /// Position (x, y, z).
    pub r: [f64; DIM],
    /// Formation time.
    pub t: f64,
    /// Momentum (px, py, pz).
    pub p: [f64; DIM],
    /// Baryon number in units of 1 (so +-1/3).
    pub charge: f64,
    /// PDG species code.
    pub species: i32,
}

impl Parton {
    /// Create a new parton after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if any coordinate is NaN/inf, or if `charge` is not +-1/3.
    pub fn new(
        id: u32,
        r: [f64; DIM],
        t: f64,
        p: [f64; DIM],
        charge: f64,
        species: i32,
    ) -> Result<Self> {
        if !r.iter().all(|x| x.is_finite()) || !t.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !p.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("momentum must be finite".into()));
        }
        let thirds = charge * 3.0;
        if !thirds.is_finite() || (thirds - thirds.round()).abs() > 1e-9 || thirds.round().abs() != 1.0
        {
            return Err(Error::InvalidParam(format!(
                "parton charge must be +-1/3, got {charge}"
            )));
        }
        Ok(Self {
            id,
            r,
            t,
            p,
            charge,
            species,
        })
    }

    /// Baryon number in thirds: +1 for a quark, -1 for an antiquark.
    #[inline]
    pub fn charge_thirds(&self) -> i32 {
        (self.charge * 3.0).round() as i32
    }

    /// True when both partons carry baryon number of the same sign.
    #[inline]
    pub fn same_sign(&self, other: &Parton) -> bool {
        self.charge * other.charge > 0.0
    }

    /// Squared spatial distance (time component ignored).
    #[inline]
    pub fn distance_sq_to(&self, other: &Parton) -> f64 {
        distance_sq(&self.r, &other.r)
    }

    /// Spatial distance (time component ignored).
    #[inline]
    pub fn distance_to(&self, other: &Parton) -> f64 {
        self.distance_sq_to(other).sqrt()
    }

    /// |p|.
    #[inline]
    pub fn momentum_magnitude(&self) -> f64 {
        self.p.iter().map(|&c| c * c).sum::<f64>().sqrt()
    }

    /// On-shell energy for the given rest mass: sqrt(|p|^2 + m^2).
    #[inline]
    pub fn energy(&self, mass: f64) -> f64 {
        let psq: f64 = self.p.iter().map(|&c| c * c).sum();
        (psq + mass * mass).sqrt()
    }

    /// Free-stream the position by `dt` along the momentum direction at unit speed.
    ///
    /// A parton at rest does not move. The formation time is left untouched.
    pub fn drift(&mut self, dt: f64) {
        let pmag = self.momentum_magnitude();
        if pmag <= 0.0 || dt == 0.0 {
            return;
        }
        for (rk, &pk) in self.r.iter_mut().zip(self.p.iter()) {
            *rk += dt * pk / pmag;
        }
    }
}

/// A hadron formed from two (meson) or three (baryon) partons.
#[derive(Debug, Clone, PartialEq)]
pub struct Hadron {
    /// Mean constituent position.
    pub r: [f64; DIM],
    /// Mean constituent formation time.
    pub t: f64,
    /// Summed constituent momentum.
    pub p: [f64; DIM],
    /// Integer baryon number: 0 for mesons, +-1 for baryons.
    pub charge: i32,
    /// Geometric formation cost: pair distance or triangle perimeter.
    pub formation_cost: f64,
    /// Invariant mass of the constituent system.
    pub mass: f64,
    /// Constituent parton ids, in the order they were grouped.
    pub constituents: Vec<u32>,
    /// PDG code; 0 until a species resolver has run.
    pub species: i32,
    /// Set when the hadron was produced by the afterburner.
    pub forced: bool,
}

impl Hadron {
    /// Two constituents.
    #[inline]
    pub fn is_meson(&self) -> bool {
        self.constituents.len() == 2
    }

    /// Three constituents.
    #[inline]
    pub fn is_baryon(&self) -> bool {
        self.constituents.len() == 3
    }
}

#[inline]
pub(crate) fn distance_sq(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
