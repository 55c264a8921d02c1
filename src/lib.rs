//! Recovers the internal state of an MT19937 generator from 624 consecutive
//! outputs and replays its stream in both time directions, including the
//! derived values of CPython's `random` module.

pub mod error;
pub mod mersenne;
pub mod predict;
pub mod state;
pub mod temper;
