use crate::combine::afterburner::afterburn;
use crate::combine::competitive::accept_cheaper;
use crate::combine::global::accept_sorted;
use crate::combine::pool::{Neighborhood, Pool};
use crate::combine::sequential::{accept_first, accept_first_stochastic};
use crate::combine::strategy::{Acceptance, Strategy};
use crate::config::CoalescenceConfig;
use crate::core::event::{Event, EventSummary};
use crate::core::frame::TimeFrameManager;
use crate::core::particle::{Hadron, Parton};
use crate::core::pool::Availability;
use crate::core::species::{MassTable, PdgMassTable};
use crate::error::Result;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

/// Runs the configured strategy over events, then closes them with the afterburner.
///
/// One `Coalescer` processes events one at a time; the stochastic strategies
/// draw from a single RNG stream across events, so a seeded coalescer fed
/// the same events in the same order reproduces its output.
pub struct Coalescer {
    config: CoalescenceConfig,
    strategy: Strategy,
    frames: TimeFrameManager,
    masses: Box<dyn MassTable + Send + Sync>,
    rng: StdRng,
}

impl Coalescer {
    /// Coalescer with the default PDG mass table.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the configuration does not validate.
    pub fn new(config: CoalescenceConfig) -> Result<Self> {
        Self::with_masses(config, PdgMassTable::default())
    }

    /// Coalescer with a caller-supplied mass table.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the configuration does not validate.
    pub fn with_masses(
        config: CoalescenceConfig,
        masses: impl MassTable + Send + Sync + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let frames =
            TimeFrameManager::new(config.frame_count, config.frame_policy, config.fixed_step)?;
        let rng: StdRng = match config.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Ok(Self {
            strategy: Strategy::new(config.strategy, config.neighbors, config.opposite_window),
            config,
            frames,
            masses: Box::new(masses),
            rng,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &CoalescenceConfig {
        &self.config
    }

    /// The configured strategy resolved to its axes.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Run the configured strategy over the event's free partons.
    ///
    /// The hadrons are stored in the event; the ones formed by this call are
    /// also returned. Partons without a valid partner stay free.
    pub fn combine(&mut self, event: &mut Event) -> Vec<Hadron> {
        let (partons, avail) = event.parts_mut();
        let formed = if self.strategy.time_ordered {
            self.combine_frames(partons, avail)
        } else {
            let slots: Vec<usize> = avail.free_slots().collect();
            self.pass(partons, &slots, avail)
        };
        debug!(
            strategy = %self.config.strategy,
            formed = formed.len(),
            left = avail.remaining(),
            "strategy pass complete"
        );
        event.push_hadrons(formed.iter().cloned());
        formed
    }

    /// Force the event's remaining free partons into hadrons.
    pub fn afterburn(&mut self, event: &mut Event) -> Vec<Hadron> {
        let (partons, avail) = event.parts_mut();
        let formed = afterburn(partons, avail, &*self.masses);
        if !formed.is_empty() {
            debug!(
                event = event.id(),
                forced = formed.len(),
                "afterburner closed leftovers"
            );
        }
        event.push_hadrons(formed.iter().cloned());
        formed
    }

    /// Combine, afterburn and check that every parton is accounted for.
    ///
    /// Errors:
    /// - `Error::ClosureViolation` if `3B + 2M + U != N` or more than two
    ///   partons are left.
    pub fn run(&mut self, event: &mut Event) -> Result<EventSummary> {
        let span = tracing::info_span!(
            "coalesce",
            event = event.id(),
            strategy = %self.config.strategy
        );
        let _guard = span.enter();

        self.combine(event);
        self.afterburn(event);
        event.check_closure()?;

        let summary = event.summary();
        info!(
            partons = summary.total,
            mesons = summary.mesons,
            baryons = summary.baryons,
            forced = summary.forced,
            unconsumed = summary.unconsumed,
            "event coalesced"
        );
        Ok(summary)
    }

    /// One strategy pass over `slots`.
    fn pass(
        &mut self,
        partons: &[Parton],
        slots: &[usize],
        avail: &mut Availability,
    ) -> Vec<Hadron> {
        let pool = Pool {
            partons,
            slots,
            masses: &*self.masses,
            preference: self.config.baryon_preference,
        };
        let hood = Neighborhood::new(self.strategy.discovery, &pool, avail);
        match self.strategy.acceptance {
            Acceptance::Global => accept_sorted(&pool, &hood, avail),
            Acceptance::Greedy => accept_first(&pool, &hood, avail),
            Acceptance::DualGreedy => accept_cheaper(&pool, &hood, avail),
            Acceptance::Stochastic => accept_first_stochastic(&pool, &hood, avail, &mut self.rng),
        }
    }

    /// Frame-by-frame passes: each frame's pool is the partons formed in it
    /// plus the free leftovers of earlier frames, free-streamed forward.
    fn combine_frames(
        &mut self,
        partons: &mut [Parton],
        avail: &mut Availability,
    ) -> Vec<Hadron> {
        let all: Vec<usize> = avail.free_slots().collect();
        self.frames.build_frames(partons, &all);

        let mut formed = Vec::new();
        let mut carried: Vec<usize> = Vec::new();
        for frame in 0..self.frames.built_frames() {
            let mut pool = carried;
            pool.extend(self.frames.partons_in_frame(partons, &all, avail, frame));
            let made = self.pass(partons, &pool, avail);
            let (lower, upper) = self.frames.frame_range(frame);
            debug!(
                frame,
                lower,
                upper,
                pool = pool.len(),
                formed = made.len(),
                "frame combined"
            );
            formed.extend(made);
            self.frames.advance(partons, &pool, avail, frame);
            carried = avail.filter_free(&pool).collect();
        }
        formed
    }
}
