//! Shared building blocks
//!
//! nalgebra-backed math aliases and helpers used by the loader, plus the
//! log targets the pipeline writes to.

pub mod logging;
pub mod math;
