//! Matching strategies and the engine that drives them.
//!
//! A strategy is a discovery breadth (every pair and triple, or each seed's
//! kd-tree neighbours) combined with an acceptance order (sorted, greedy,
//! competitive, stochastic). All of them only ever consume partons through
//! the event's [`Availability`](crate::core::Availability) token, so no
//! parton ends up in two hadrons. The afterburner closes whatever is left.

pub mod afterburner;
mod competitive;
pub mod engine;
mod global;
mod pool;
mod sequential;
pub mod strategy;

pub use afterburner::afterburn;
pub use engine::Coalescer;
pub use strategy::{Acceptance, Discovery, Strategy, StrategyKind};
