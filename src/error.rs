use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the coalescence core.
///
/// Running out of candidates is never an error: such partons are left for the
/// afterburner. Only bad configuration, bad input and a broken closure
/// invariant are surfaced here.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value or parton field.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Strategy name not among the ten known variants.
    #[error("unknown combination strategy: {0:?}")]
    UnknownStrategy(String),

    /// Frame policy name not among FixedStep, EqualTime, Adaptive.
    #[error("unknown time-frame policy: {0:?}")]
    UnknownFramePolicy(String),

    /// Post-afterburner bookkeeping did not close: 3B + 2M + U != N, or U > 2.
    #[error(
        "closure violated: 3*{baryons} + 2*{mesons} + {unconsumed} != {total} partons"
    )]
    ClosureViolation {
        baryons: usize,
        mesons: usize,
        unconsumed: usize,
        total: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("baryon_preference must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("baryon_preference"));
    }

    #[test]
    fn closure_violation_lists_counts() {
        let e = Error::ClosureViolation {
            baryons: 1,
            mesons: 2,
            unconsumed: 4,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("3*1 + 2*2 + 4 != 10"), "{msg}");
    }

    #[test]
    fn unknown_names_are_quoted() {
        let msg = Error::UnknownStrategy("KDTreeBest".into()).to_string();
        assert!(msg.contains("\"KDTreeBest\""));
    }
}
