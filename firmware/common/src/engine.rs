//! One control-loop iteration: drain the bus, evaluate the timeout, refresh.
//!
//! [`GearView`] owns the single [`VehicleState`] and lends it to the decoder
//! and monitor mutably and to the compositor immutably. The caller owns the
//! loop and the collaborators:
//!
//! ```ignore
//! let mut view = GearView::new(GearViewConfig::new())?;
//! loop {
//!     let report = view.poll(&mut bus, &mut display, &clock);
//!     // log report.transition / report.display_error
//! }
//! ```

use crate::compositor::Compositor;
use crate::config::{ConfigError, GearViewConfig};
use crate::debug::DebugOverlay;
use crate::decoder::FrameDecoder;
use crate::frame::RawFrame;
use crate::monitor::{BusActivityMonitor, BusTransition};
use crate::traits::{CanBus, Clock, DisplayError, TextDisplay};
use crate::vehicle::VehicleState;

/// What happened during one [`GearView::poll`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Frames taken from the bus.
    pub received: u32,
    /// Frames that matched a decode rule.
    pub matched: u32,
    /// Bus status change, if any.
    pub transition: Option<BusTransition>,
    /// Whether a refresh was issued.
    pub rendered: bool,
    /// Set when the refresh's `present` failed.
    pub display_error: Option<DisplayError>,
}

/// Telemetry decode-and-refresh engine.
pub struct GearView {
    state: VehicleState,
    decoder: FrameDecoder,
    monitor: BusActivityMonitor,
    compositor: Compositor,
    debug: Option<DebugOverlay>,
}

impl GearView {
    /// Build the engine after validating `config`.
    pub fn new(config: GearViewConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: VehicleState::new(),
            decoder: FrameDecoder::new(&config),
            monitor: BusActivityMonitor::new(config.bus_timeout_ms),
            compositor: Compositor::new(&config),
            debug: config.debug_overlay.then(DebugOverlay::new),
        })
    }

    #[inline]
    pub const fn state(&self) -> &VehicleState { &self.state }

    #[inline]
    pub const fn compositor(&self) -> &Compositor { &self.compositor }

    #[inline]
    pub const fn debug_overlay(&self) -> Option<&DebugOverlay> { self.debug.as_ref() }

    /// Decode one frame and record it with the monitor when it matched.
    ///
    /// Returns whether the frame matched a rule, and the activation edge if
    /// this frame woke the bus up.
    pub fn ingest(
        &mut self,
        frame: &RawFrame,
        now_ms: u64,
    ) -> (bool, Option<BusTransition>) {
        if let Some(overlay) = self.debug.as_mut() {
            overlay.frame_received();
        }

        match self.decoder.decode(frame) {
            Some(update) => {
                FrameDecoder::apply(&mut self.state, update);
                (true, self.monitor.frame_observed(&mut self.state, now_ms))
            }
            None => (false, None),
        }
    }

    /// Run one loop iteration at the clock's current time.
    pub fn poll<B, D, C>(
        &mut self,
        bus: &mut B,
        display: &mut D,
        clock: &C,
    ) -> PollReport
    where
        B: CanBus,
        D: TextDisplay,
        C: Clock,
    {
        let now_ms = clock.now_ms();
        let mut report = PollReport::default();

        if bus.has_activity_alert() {
            while let Some(frame) = bus.try_receive_frame() {
                report.received = report.received.saturating_add(1);
                let (matched, transition) = self.ingest(&frame, now_ms);
                if matched {
                    report.matched = report.matched.saturating_add(1);
                }
                if transition.is_some() {
                    report.transition = transition;
                }
            }
        }

        if let Some(transition) = self.monitor.tick(&mut self.state, now_ms) {
            report.transition = Some(transition);
        }

        match self.compositor.refresh(&self.state, display, now_ms, self.debug.as_mut()) {
            Ok(rendered) => report.rendered = rendered,
            Err(e) => {
                report.rendered = true;
                report.display_error = Some(e);
            }
        }

        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
