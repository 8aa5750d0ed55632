#![allow(missing_docs)] // Doc comments live on public items in the submodules

//! Data model and building blocks of the coalescence engine.
//!
//! Partons, hadrons and the per-event availability token, plus the spatial
//! index, the time-frame manager and the kinematics shared by every
//! strategy.

pub mod event;
pub mod frame;
pub mod kinematics;
pub mod particle;
pub mod pool;
pub mod spatial;
pub mod species;

pub use event::{Event, EventSummary, ShuffleLevel};
pub use frame::{FramePolicy, TimeFrameManager};
pub use particle::{Hadron, Parton};
pub use pool::Availability;
pub use spatial::{Neighbor, SpatialIndex};
pub use species::{MassTable, PdgMassTable, SpeciesResolver};
