//! Spatial coalescence of partons into hadrons.
//!
//! An [`Event`] holds the partons of one collision. A [`Coalescer`] runs one
//! of ten matching strategies over it (optionally frame by frame in formation
//! time), then closes the event with the afterburner so that every parton but
//! at most two ends up in a meson or a baryon.
//!
//! ```no_run
//! use hadrocoal::{CoalescenceConfig, Coalescer, StrategyKind, ToyEventSource};
//!
//! # fn main() -> hadrocoal::error::Result<()> {
//! let mut coalescer = Coalescer::new(CoalescenceConfig::new(StrategyKind::KdTreeGlobal))?;
//! for event in ToyEventSource::new(200, Some(1))?.take(10) {
//!     let mut event = event?;
//!     let summary = coalescer.run(&mut event)?;
//!     println!("{summary}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod combine;
pub mod config;
pub mod core;
pub mod error;
pub mod source;

#[cfg(feature = "python")]
mod python;

pub use crate::combine::{Coalescer, StrategyKind};
pub use crate::config::CoalescenceConfig;
pub use crate::core::{Event, EventSummary, FramePolicy, Hadron, Parton};
pub use crate::source::ToyEventSource;
