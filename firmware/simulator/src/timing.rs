//! Timing constants for the simulator.
//!
//! These constants use `std::time::Duration` which is not available in `no_std`
//! environments, so they are defined here rather than in the common crate.

use std::time::Duration;

/// Simulated loop period. Matches the firmware's 1 ms activity wait.
pub const TICK: Duration = Duration::from_millis(1);

/// Keep running after the last frame so the bus timeout is visible.
pub const TAIL: Duration = Duration::from_millis(1_500);
