//! The ten named strategies as points on two axes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which candidate groupings a seed gets to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discovery {
    /// Every free pair and triple of the pool.
    Exhaustive,
    /// Each seed's `neighbors` nearest free partons, via the kd-tree.
    /// Opposite-sign partner searches look at `opposite_window` candidates.
    KdTree {
        neighbors: usize,
        opposite_window: usize,
    },
}

/// In which order candidate groupings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acceptance {
    /// Collect all candidates, sort by cost, accept greedily.
    Global,
    /// Seeds in pool order; first valid grouping along the seed's neighbours wins.
    Greedy,
    /// Per seed, best meson against best baryon; the cheaper one wins.
    DualGreedy,
    /// Like `Greedy`, but valid mesons are rejected with probability r/(1+r).
    Stochastic,
}

/// Strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    BruteForceGlobal,
    BruteForceGreedy,
    BruteForceDualGreedy,
    BruteForceStochastic,
    #[serde(rename = "KDTreeGlobal")]
    KdTreeGlobal,
    #[serde(rename = "KDTreeGreedy")]
    KdTreeGreedy,
    #[serde(rename = "KDTreeDualGreedy")]
    KdTreeDualGreedy,
    #[serde(rename = "KDTreeStochastic")]
    KdTreeStochastic,
    ExhaustiveSorted,
    ExhaustiveCompetitive,
}

impl StrategyKind {
    /// Every strategy, in configuration-name order.
    pub const ALL: [StrategyKind; 10] = [
        StrategyKind::BruteForceGlobal,
        StrategyKind::BruteForceGreedy,
        StrategyKind::BruteForceDualGreedy,
        StrategyKind::BruteForceStochastic,
        StrategyKind::KdTreeGlobal,
        StrategyKind::KdTreeGreedy,
        StrategyKind::KdTreeDualGreedy,
        StrategyKind::KdTreeStochastic,
        StrategyKind::ExhaustiveSorted,
        StrategyKind::ExhaustiveCompetitive,
    ];

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::BruteForceGlobal => "BruteForceGlobal",
            StrategyKind::BruteForceGreedy => "BruteForceGreedy",
            StrategyKind::BruteForceDualGreedy => "BruteForceDualGreedy",
            StrategyKind::BruteForceStochastic => "BruteForceStochastic",
            StrategyKind::KdTreeGlobal => "KDTreeGlobal",
            StrategyKind::KdTreeGreedy => "KDTreeGreedy",
            StrategyKind::KdTreeDualGreedy => "KDTreeDualGreedy",
            StrategyKind::KdTreeStochastic => "KDTreeStochastic",
            StrategyKind::ExhaustiveSorted => "ExhaustiveSorted",
            StrategyKind::ExhaustiveCompetitive => "ExhaustiveCompetitive",
        }
    }

    /// Whether neighbours come from the kd-tree.
    pub fn uses_kd_tree(self) -> bool {
        matches!(
            self,
            StrategyKind::KdTreeGlobal
                | StrategyKind::KdTreeGreedy
                | StrategyKind::KdTreeDualGreedy
                | StrategyKind::KdTreeStochastic
        )
    }

    /// Acceptance order of this strategy.
    pub fn acceptance(self) -> Acceptance {
        match self {
            StrategyKind::BruteForceGlobal
            | StrategyKind::KdTreeGlobal
            | StrategyKind::ExhaustiveSorted => Acceptance::Global,
            StrategyKind::BruteForceGreedy | StrategyKind::KdTreeGreedy => Acceptance::Greedy,
            StrategyKind::BruteForceDualGreedy
            | StrategyKind::KdTreeDualGreedy
            | StrategyKind::ExhaustiveCompetitive => Acceptance::DualGreedy,
            StrategyKind::BruteForceStochastic | StrategyKind::KdTreeStochastic => {
                Acceptance::Stochastic
            }
        }
    }

    /// Whether the strategy walks time frames instead of seeing the whole event at once.
    pub fn time_ordered(self) -> bool {
        matches!(
            self,
            StrategyKind::ExhaustiveSorted | StrategyKind::ExhaustiveCompetitive
        )
    }
}

/// A strategy resolved to its two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
    pub discovery: Discovery,
    pub acceptance: Acceptance,
    pub time_ordered: bool,
}

impl Strategy {
    /// `neighbors` and `opposite_window` only matter for the kd-tree variants.
    pub fn new(kind: StrategyKind, neighbors: usize, opposite_window: usize) -> Self {
        let discovery = if kind.uses_kd_tree() {
            Discovery::KdTree {
                neighbors,
                opposite_window,
            }
        } else {
            Discovery::Exhaustive
        };
        Self {
            discovery,
            acceptance: kind.acceptance(),
            time_ordered: kind.time_ordered(),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() -> Result<()> {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>()?, kind);
        }
        Ok(())
    }

    #[test]
    fn unknown_name_is_fatal() {
        let err = "KDTreeOptimal".parse::<StrategyKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownStrategy(ref s) if s == "KDTreeOptimal"));
        // no case folding
        assert!("kdtreeglobal".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn axes_cover_every_combination() {
        use std::collections::HashSet;
        let pairs: HashSet<(Discovery, Acceptance)> = StrategyKind::ALL
            .iter()
            .map(|&k| Strategy::new(k, 20, 10))
            .map(|s| (s.discovery, s.acceptance))
            .collect();
        assert_eq!(pairs.len(), 8);
        assert_eq!(
            StrategyKind::ALL.iter().filter(|k| k.time_ordered()).count(),
            2
        );
    }
}
