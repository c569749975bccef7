//! Round clock
//!
//! Produces the countdown for the display and signals round expiry to the
//! coordinator - exactly once per armed deadline.

mod core;

pub use core::RoundClock;
