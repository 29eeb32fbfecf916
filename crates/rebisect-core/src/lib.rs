//! # rebisect-core
//!
//! Core library for rebisect: the bisection engine that finds how far a
//! branch can be rebased onto a diverged upstream, plus configuration and
//! run-record persistence.

pub mod bisect;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod state;
pub mod traits;

pub use bisect::{Bisection, Offset, Outcome, Probe, ProbeStep, search};
pub use config::Config;
pub use error::{Error, Result};
pub use state::{RunRecord, State};
pub use traits::StateStore;
