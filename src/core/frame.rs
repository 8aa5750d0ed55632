//! Formation-time partitioning of an event into ordered frames.
//!
//! Frames are half-open intervals `[lower, upper)` between consecutive
//! boundaries. Combination runs frame by frame so that partons only meet
//! partons that have already formed; survivors of a frame are free-streamed
//! by the frame's width and carried into the next one.

use crate::core::particle::Parton;
use crate::core::pool::Availability;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Padding added past the latest formation time so the last frame includes it.
const LAST_FRAME_PAD: f64 = 1e-6;

/// Upper edge of the last frame: strictly above `t_max` even where a fixed
/// pad would be lost to rounding.
fn past_last(t_max: f64) -> f64 {
    t_max + LAST_FRAME_PAD.max(t_max.abs() * 4.0 * f64::EPSILON)
}

/// How frame boundaries are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FramePolicy {
    /// Boundaries every `fixed_step` from the earliest formation time.
    FixedStep,
    /// `frame_count` equal-width frames over the observed time range.
    EqualTime,
    /// Roughly equal parton counts per frame, with a minimum width.
    Adaptive,
}

impl FramePolicy {
    /// Every policy.
    pub const ALL: [FramePolicy; 3] = [
        FramePolicy::FixedStep,
        FramePolicy::EqualTime,
        FramePolicy::Adaptive,
    ];

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            FramePolicy::FixedStep => "FixedStep",
            FramePolicy::EqualTime => "EqualTime",
            FramePolicy::Adaptive => "Adaptive",
        }
    }
}

impl fmt::Display for FramePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FramePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FramePolicy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownFramePolicy(s.to_string()))
    }
}

/// Builds and serves time frames for one event.
#[derive(Debug, Clone)]
pub struct TimeFrameManager {
    frame_count: usize,
    policy: FramePolicy,
    fixed_step: f64,
    boundaries: Vec<f64>,
}

impl TimeFrameManager {
    /// Errors:
    /// - `Error::InvalidParam` if `frame_count` is 0, or if `policy` is
    ///   `FixedStep` and `fixed_step` is not finite and > 0.
    pub fn new(frame_count: usize, policy: FramePolicy, fixed_step: f64) -> Result<Self> {
        if frame_count == 0 {
            return Err(Error::InvalidParam("frame_count must be >= 1".into()));
        }
        if policy == FramePolicy::FixedStep && (!fixed_step.is_finite() || fixed_step <= 0.0) {
            return Err(Error::InvalidParam(
                "fixed_step must be finite and > 0 for FixedStep frames".into(),
            ));
        }
        Ok(Self {
            frame_count,
            policy,
            fixed_step,
            boundaries: Vec::new(),
        })
    }

    /// Boundary policy in use.
    pub fn policy(&self) -> FramePolicy {
        self.policy
    }

    /// Configured number of frames.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Frames available after the last build (0 when nothing was built).
    pub fn built_frames(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// Boundaries from the last build, ascending.
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Rebuild boundaries from the formation times of `slots`.
    ///
    /// Fewer than two partons produce no boundaries.
    pub fn build_frames(&mut self, partons: &[Parton], slots: &[usize]) {
        self.boundaries.clear();
        let mut times: Vec<f64> = slots
            .iter()
            .filter_map(|&s| partons.get(s).map(|q| q.t))
            .collect();
        if times.len() < 2 {
            return;
        }
        times.sort_unstable_by(f64::total_cmp);
        let (t_min, t_max) = (times[0], times[times.len() - 1]);
        let n = self.frame_count;

        match self.policy {
            FramePolicy::FixedStep => {
                self.boundaries = (0..=n)
                    .map(|i| t_min + i as f64 * self.fixed_step)
                    .collect();
            }
            FramePolicy::EqualTime => {
                let step = (t_max - t_min) / n as f64;
                self.boundaries = (0..=n).map(|i| t_min + i as f64 * step).collect();
                if let Some(last) = self.boundaries.last_mut() {
                    *last = past_last(t_max);
                }
            }
            FramePolicy::Adaptive => self.build_adaptive(&times),
        }
    }

    fn build_adaptive(&mut self, sorted: &[f64]) {
        let total = sorted.len();
        let n = self.frame_count;
        let (t_min, t_max) = (sorted[0], sorted[total - 1]);
        let min_width = (t_max - t_min) / (10 * n) as f64;

        self.boundaries.push(t_min);
        for frame in 1..n {
            let prev = self.boundaries[frame - 1];
            // frame < n keeps the quantile index inside `sorted`
            let target = total * frame / n;
            self.boundaries.push(sorted[target].max(prev + min_width));
        }
        let prev = self.boundaries[n - 1];
        self.boundaries.push(past_last(t_max).max(prev));
    }

    /// `(lower, upper)` of frame `index`; `(0, 0)` when out of range.
    pub fn frame_range(&self, index: usize) -> (f64, f64) {
        if index + 1 >= self.boundaries.len() {
            return (0.0, 0.0);
        }
        (self.boundaries[index], self.boundaries[index + 1])
    }

    /// Width of frame `index`; 0 when out of range.
    pub fn time_step(&self, index: usize) -> f64 {
        let (lo, hi) = self.frame_range(index);
        hi - lo
    }

    /// Free partons among `slots` formed within frame `index`, in slot order.
    pub fn partons_in_frame(
        &self,
        partons: &[Parton],
        slots: &[usize],
        avail: &Availability,
        index: usize,
    ) -> Vec<usize> {
        let (lo, hi) = self.frame_range(index);
        avail
            .filter_free(slots)
            .filter(|&s| partons.get(s).is_some_and(|q| q.t >= lo && q.t < hi))
            .collect()
    }

    /// Free-stream the free partons among `slots` by the width of frame `index`.
    pub fn advance(
        &self,
        partons: &mut [Parton],
        slots: &[usize],
        avail: &Availability,
        index: usize,
    ) {
        let dt = self.time_step(index);
        if dt == 0.0 {
            return;
        }
        for s in avail.filter_free(slots) {
            if let Some(q) = partons.get_mut(s) {
                q.drift(dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::CHARGE_QUANTUM;

    fn at_times(times: &[f64]) -> Result<Vec<Parton>> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| Parton::new(i as u32, [0.0; 3], t, [1.0, 0.0, 0.0], CHARGE_QUANTUM, 2))
            .collect()
    }

    fn all(partons: &[Parton]) -> Vec<usize> {
        (0..partons.len()).collect()
    }

    #[test]
    fn policy_names_round_trip() -> Result<()> {
        for p in FramePolicy::ALL {
            assert_eq!(p.to_string().parse::<FramePolicy>()?, p);
        }
        let err = "Sliding".parse::<FramePolicy>().unwrap_err();
        assert!(matches!(err, Error::UnknownFramePolicy(ref s) if s == "Sliding"));
        Ok(())
    }

    #[test]
    fn fixed_step_boundaries() -> Result<()> {
        let partons = at_times(&[1.0, 1.5, 7.0])?;
        let mut tfm = TimeFrameManager::new(3, FramePolicy::FixedStep, 0.5)?;
        tfm.build_frames(&partons, &all(&partons));
        assert_eq!(tfm.boundaries(), &[1.0, 1.5, 2.0, 2.5]);
        assert_eq!(tfm.built_frames(), 3);
        Ok(())
    }

    #[test]
    fn fixed_step_requires_positive_step() {
        assert!(TimeFrameManager::new(3, FramePolicy::FixedStep, 0.0).is_err());
        assert!(TimeFrameManager::new(0, FramePolicy::EqualTime, 1.0).is_err());
        // dt is irrelevant to other policies
        assert!(TimeFrameManager::new(3, FramePolicy::Adaptive, 0.0).is_ok());
    }

    #[test]
    fn adaptive_frames_balance_counts() -> Result<()> {
        let times: Vec<f64> = (0..100).map(|i| (i as f64 / 10.0).powi(2)).collect();
        let partons = at_times(&times)?;
        let slots = all(&partons);
        let avail = Availability::new(partons.len());
        let mut tfm = TimeFrameManager::new(4, FramePolicy::Adaptive, 1.0)?;
        tfm.build_frames(&partons, &slots);
        assert_eq!(tfm.built_frames(), 4);
        for i in 0..4 {
            assert_eq!(tfm.partons_in_frame(&partons, &slots, &avail, i).len(), 25);
        }
        Ok(())
    }

    #[test]
    fn adaptive_enforces_minimum_width() -> Result<()> {
        // Nine partons at t=0 and one at t=10: quantile boundaries would collapse to 0.
        let mut times = vec![0.0; 9];
        times.push(10.0);
        let partons = at_times(&times)?;
        let mut tfm = TimeFrameManager::new(5, FramePolicy::Adaptive, 1.0)?;
        tfm.build_frames(&partons, &all(&partons));
        let b = tfm.boundaries();
        assert_eq!(b.len(), 6);
        for w in b.windows(2) {
            assert!(w[1] - w[0] >= 10.0 / 50.0 - 1e-12, "degenerate frame {w:?}");
        }
        assert!(b[5] > 10.0);
        Ok(())
    }

    #[test]
    fn late_times_keep_every_parton_in_a_frame() -> Result<()> {
        let partons = at_times(&[1e11, 1.3e11, 2e11])?;
        let slots = all(&partons);
        let avail = Availability::new(partons.len());
        for policy in [FramePolicy::EqualTime, FramePolicy::Adaptive] {
            let mut tfm = TimeFrameManager::new(2, policy, 1.0)?;
            tfm.build_frames(&partons, &slots);
            let placed: usize = (0..tfm.built_frames())
                .map(|i| tfm.partons_in_frame(&partons, &slots, &avail, i).len())
                .sum();
            assert_eq!(placed, partons.len(), "{policy}");
            assert!(tfm.boundaries().last().is_some_and(|&b| b > 2e11), "{policy}");
        }
        Ok(())
    }

    #[test]
    fn too_few_partons_build_nothing() -> Result<()> {
        let partons = at_times(&[3.0])?;
        let mut tfm = TimeFrameManager::new(4, FramePolicy::EqualTime, 1.0)?;
        tfm.build_frames(&partons, &all(&partons));
        assert!(tfm.boundaries().is_empty());
        let avail = Availability::new(1);
        assert!(tfm.partons_in_frame(&partons, &[0], &avail, 0).is_empty());
        assert_eq!(tfm.frame_range(0), (0.0, 0.0));
        Ok(())
    }

    #[test]
    fn out_of_range_frame_is_zero_width() -> Result<()> {
        let partons = at_times(&[0.0, 4.0])?;
        let mut tfm = TimeFrameManager::new(2, FramePolicy::EqualTime, 1.0)?;
        tfm.build_frames(&partons, &all(&partons));
        assert_eq!(tfm.frame_range(7), (0.0, 0.0));
        assert_eq!(tfm.time_step(7), 0.0);
        Ok(())
    }

    #[test]
    fn advance_moves_only_free_partons() -> Result<()> {
        let mut partons = at_times(&[0.0, 2.0, 4.0])?;
        let slots = all(&partons);
        let mut avail = Availability::new(3);
        assert!(avail.claim(&[1]));
        let mut tfm = TimeFrameManager::new(2, FramePolicy::EqualTime, 1.0)?;
        tfm.build_frames(&partons, &slots);
        tfm.advance(&mut partons, &slots, &avail, 0);
        assert!((partons[0].r[0] - 2.0).abs() < 1e-12);
        assert_eq!(partons[1].r[0], 0.0);
        assert!((partons[2].r[0] - 2.0).abs() < 1e-12);
        Ok(())
    }
}
