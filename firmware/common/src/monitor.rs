//! Bus activity monitor.
//!
//! Two states, [`BusStatus::Active`] and [`BusStatus::Inactive`], starting
//! inactive. Any matched frame makes the bus active immediately. The timeout
//! is polled once per loop tick: more than `timeout_ms` since the last matched
//! frame flips the bus inactive and clears gear and drive mode. There is no
//! hysteresis band in either direction.

use crate::vehicle::VehicleState;

/// Derived bus status.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusStatus {
    Active,
    Inactive,
}

/// Edge reported when the status changes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusTransition {
    /// First matched frame after being inactive.
    Activated,
    /// No matched frame within the timeout; gear and mode were cleared.
    TimedOut {
        /// How long the bus had been silent when the timeout was noticed.
        idle_ms: u64,
    },
}

/// Timeout state machine over [`VehicleState`]'s activity fields.
#[derive(Clone, Copy, Debug)]
pub struct BusActivityMonitor {
    timeout_ms: u64,
}

impl BusActivityMonitor {
    pub const fn new(timeout_ms: u64) -> Self { Self { timeout_ms } }

    #[inline]
    pub const fn timeout_ms(&self) -> u64 { self.timeout_ms }

    /// Current status as recorded in the state.
    #[inline]
    pub const fn status(state: &VehicleState) -> BusStatus {
        if state.bus_active() {
            BusStatus::Active
        } else {
            BusStatus::Inactive
        }
    }

    /// Record a matched frame at `now_ms`.
    pub fn frame_observed(
        &self,
        state: &mut VehicleState,
        now_ms: u64,
    ) -> Option<BusTransition> {
        let was_active = state.bus_active();
        state.mark_frame(now_ms);
        (!was_active).then_some(BusTransition::Activated)
    }

    /// Evaluate the timeout. Call once per loop tick.
    pub fn tick(
        &self,
        state: &mut VehicleState,
        now_ms: u64,
    ) -> Option<BusTransition> {
        if !state.bus_active() {
            return None;
        }

        let idle_ms = now_ms.saturating_sub(state.last_frame_ms());
        if idle_ms > self.timeout_ms {
            state.mark_inactive();
            Some(BusTransition::TimedOut { idle_ms })
        } else {
            None
        }
    }
}

impl Default for BusActivityMonitor {
    fn default() -> Self { Self::new(crate::config::BUS_TIMEOUT_MS) }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::vehicle::{GearLabel, ModeLabel};

    fn active_state(at_ms: u64) -> VehicleState {
        let mut state = VehicleState::new();
        state.mark_frame(at_ms);
        state.set_gear(GearLabel::Numeric(5));
        state.set_drive_mode(ModeLabel::Drive);
        state.set_oil_temp(98);
        state.set_coolant_temp(90);
        state.set_tcu_oil_temp(70);
        state
    }

    #[test]
    fn test_starts_inactive() {
        let state = VehicleState::new();
        assert_eq!(BusActivityMonitor::status(&state), BusStatus::Inactive);
    }

    #[test]
    fn test_inactive_tick_is_noop() {
        let monitor = BusActivityMonitor::default();
        let mut state = VehicleState::new();
        assert_eq!(monitor.tick(&mut state, 50_000), None);
        assert_eq!(state, VehicleState::new());
    }

    #[test]
    fn test_first_frame_activates() {
        let monitor = BusActivityMonitor::default();
        let mut state = VehicleState::new();
        assert_eq!(monitor.frame_observed(&mut state, 200), Some(BusTransition::Activated));
        assert_eq!(BusActivityMonitor::status(&state), BusStatus::Active);
        assert_eq!(state.last_frame_ms(), 200);
    }

    #[test]
    fn test_active_frame_only_updates_timestamp() {
        let monitor = BusActivityMonitor::default();
        let mut state = active_state(100);
        let before = state;
        assert_eq!(monitor.frame_observed(&mut state, 400), None);
        assert_eq!(state.last_frame_ms(), 400);
        assert_eq!(state.gear(), before.gear());
        assert_eq!(state.drive_mode(), before.drive_mode());
    }

    #[test]
    fn test_exactly_timeout_stays_active() {
        let monitor = BusActivityMonitor::default();
        let mut state = active_state(1_000);
        assert_eq!(monitor.tick(&mut state, 2_000), None);
        assert!(state.bus_active());
    }

    #[test]
    fn test_timeout_clears_gear_and_mode_only() {
        let monitor = BusActivityMonitor::default();
        let mut state = active_state(1_000);
        assert_eq!(monitor.tick(&mut state, 2_001), Some(BusTransition::TimedOut { idle_ms: 1_001 }));
        assert!(!state.bus_active());
        assert_eq!(state.gear(), GearLabel::Unknown);
        assert_eq!(state.drive_mode(), ModeLabel::Unknown);
        assert_eq!(state.oil_temp(), Some(98));
        assert_eq!(state.coolant_temp(), Some(90));
        assert_eq!(state.tcu_oil_temp(), Some(70));
    }

    #[test]
    fn test_timeout_reported_once() {
        let monitor = BusActivityMonitor::default();
        let mut state = active_state(0);
        assert!(monitor.tick(&mut state, 1_500).is_some());
        assert_eq!(monitor.tick(&mut state, 1_600), None);
        assert_eq!(monitor.tick(&mut state, 9_000), None);
    }

    #[test]
    fn test_single_frame_restores() {
        let monitor = BusActivityMonitor::default();
        let mut state = active_state(0);
        monitor.tick(&mut state, 5_000);
        assert_eq!(monitor.frame_observed(&mut state, 5_001), Some(BusTransition::Activated));
        assert!(state.bus_active());
        assert_eq!(monitor.tick(&mut state, 5_002), None);
    }

    #[test]
    fn test_clock_behind_last_frame_does_not_time_out() {
        let monitor = BusActivityMonitor::default();
        let mut state = active_state(5_000);
        assert_eq!(monitor.tick(&mut state, 100), None);
        assert!(state.bus_active());
    }

    proptest! {
        #[test]
        fn prop_active_iff_within_timeout(
            last in 0u64..100_000,
            idle in 0u64..5_000,
            timeout in 1u64..3_000,
        ) {
            let monitor = BusActivityMonitor::new(timeout);
            let mut state = active_state(last);
            let transition = monitor.tick(&mut state, last + idle);
            prop_assert_eq!(state.bus_active(), idle <= timeout);
            prop_assert_eq!(transition.is_some(), idle > timeout);
            prop_assert_eq!(state.oil_temp(), Some(98));
        }
    }
}
