//! The window registry: each context publishes its own record into the
//! shared store, reconciles the global set on a recurring tick, evicts
//! stale peers by timeout, and notifies its consumer through two callbacks.
//!
//! There is no central coordinator. Every invariant is restorable by any
//! single honest participant: a window republishes its own authoritative
//! record every tick, and the liveness sweeper is the only
//! correctness-bearing cleanup for windows that vanish without warning.

pub mod policy;
pub mod registry;
pub mod runner;
pub mod snapshot;
pub mod sweeper;

pub use policy::RegistryPolicy;
pub use registry::{Registry, ShapeSource, SharedRegistry};
pub use runner::{spawn_ticker, TickerHandle};
pub use sweeper::LivenessSweeper;
