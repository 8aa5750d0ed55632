//! Coalescence parameters.
//!
//! `CoalescenceConfig` is plain data with serde derives so a host
//! application can embed it in its own configuration file; names are the
//! same strings accepted by `FromStr` on [`StrategyKind`] and [`FramePolicy`].

use crate::combine::strategy::StrategyKind;
use crate::core::frame::FramePolicy;
use crate::core::spatial::DEFAULT_OPPOSITE_WINDOW;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// kd-tree neighbours examined per seed unless configured otherwise.
pub const DEFAULT_NEIGHBORS: usize = 20;

/// Everything a [`Coalescer`](crate::Coalescer) needs; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoalescenceConfig {
    pub strategy: StrategyKind,
    /// r > 0; larger values favour baryons.
    pub baryon_preference: f64,
    /// Number of time frames for the time-ordered strategies.
    pub frame_count: usize,
    pub frame_policy: FramePolicy,
    /// Frame width for `FramePolicy::FixedStep` (fm/c).
    pub fixed_step: f64,
    /// Neighbours examined per seed by the kd-tree strategies.
    pub neighbors: usize,
    /// Candidates scanned for an opposite-sign partner by `KDTreeDualGreedy`.
    pub opposite_window: usize,
    /// Seed for the stochastic strategies; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for CoalescenceConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::KdTreeGlobal,
            baryon_preference: 1.0,
            frame_count: 10,
            frame_policy: FramePolicy::EqualTime,
            fixed_step: 0.5,
            neighbors: DEFAULT_NEIGHBORS,
            opposite_window: DEFAULT_OPPOSITE_WINDOW,
            seed: None,
        }
    }
}

impl CoalescenceConfig {
    /// Defaults with the given strategy.
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Build from configuration-file names.
    ///
    /// Errors:
    /// - `Error::UnknownStrategy` / `Error::UnknownFramePolicy` for unrecognized names
    pub fn from_names(strategy: &str, frame_policy: &str) -> Result<Self> {
        Ok(Self {
            strategy: strategy.parse()?,
            frame_policy: frame_policy.parse()?,
            ..Self::default()
        })
    }

    /// Baryon preference r.
    pub fn with_baryon_preference(mut self, r: f64) -> Self {
        self.baryon_preference = r;
        self
    }

    /// Frame count and boundary policy for the time-ordered strategies.
    pub fn with_frames(mut self, count: usize, policy: FramePolicy) -> Self {
        self.frame_count = count;
        self.frame_policy = policy;
        self
    }

    /// Frame width for `FixedStep`.
    pub fn with_fixed_step(mut self, dt: f64) -> Self {
        self.fixed_step = dt;
        self
    }

    /// kd-tree neighbours per seed.
    pub fn with_neighbors(mut self, k: usize) -> Self {
        self.neighbors = k;
        self
    }

    /// Opposite-sign search window for `KDTreeDualGreedy`.
    pub fn with_opposite_window(mut self, window: usize) -> Self {
        self.opposite_window = window;
        self
    }

    /// Fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Errors:
    /// - `Error::InvalidParam` if r is not finite and > 0, `frame_count` or
    ///   `neighbors` or `opposite_window` is 0, or `fixed_step` is not
    ///   finite and > 0.
    pub fn validate(&self) -> Result<()> {
        if !self.baryon_preference.is_finite() || self.baryon_preference <= 0.0 {
            return Err(Error::InvalidParam(
                "baryon_preference must be finite and > 0".into(),
            ));
        }
        if self.frame_count == 0 {
            return Err(Error::InvalidParam("frame_count must be >= 1".into()));
        }
        if !self.fixed_step.is_finite() || self.fixed_step <= 0.0 {
            return Err(Error::InvalidParam("fixed_step must be finite and > 0".into()));
        }
        if self.neighbors == 0 {
            return Err(Error::InvalidParam("neighbors must be >= 1".into()));
        }
        if self.opposite_window == 0 {
            return Err(Error::InvalidParam("opposite_window must be >= 1".into()));
        }
        Ok(())
    }
}
