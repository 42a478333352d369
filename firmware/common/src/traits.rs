//! Collaborator traits.
//!
//! The engine never touches hardware directly. The firmware and the simulator
//! implement these for their bus controller, display and time source.

use core::cell::Cell;

use embedded_graphics::geometry::{Point, Size};

use crate::frame::RawFrame;
use crate::layout::TextScale;

// =============================================================================
// Bus
// =============================================================================

/// Receive side of a listen-only CAN controller.
pub trait CanBus {
    /// Next pending frame, without blocking.
    fn try_receive_frame(&mut self) -> Option<RawFrame>;

    /// Fast-path hint that frames are pending.
    ///
    /// When this returns `false` the engine skips draining for the tick.
    /// Controllers without an interrupt line keep the default.
    fn has_activity_alert(&mut self) -> bool { true }
}

// =============================================================================
// Display
// =============================================================================

/// Errors the display can report when pushing a frame out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// The I2C/SPI transfer failed (NACK, arbitration loss, ...).
    Bus,
    /// The display did not accept the frame in time.
    Timeout,
}

/// Text-only drawing surface.
///
/// One refresh is always `clear`, any number of `measure_text`/`draw_text`,
/// then exactly one `present`.
pub trait TextDisplay {
    /// Blank the back buffer.
    fn clear(&mut self);

    /// Bounding box of `text` at `scale`.
    fn measure_text(
        &self,
        text: &str,
        scale: TextScale,
    ) -> Size;

    /// Draw `text` with its top-left corner at `position`.
    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        scale: TextScale,
    );

    /// Push the back buffer to the panel.
    fn present(&mut self) -> Result<(), DisplayError>;
}

// =============================================================================
// Clock
// =============================================================================

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Clock that only moves when told to. Used by the simulator and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub const fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn set(
        &self,
        now_ms: u64,
    ) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(
        &self,
        delta_ms: u64,
    ) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 { self.now_ms.get() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(5);
        assert_eq!(clock.now_ms(), 5);
        clock.advance(120);
        assert_eq!(clock.now_ms(), 125);
        clock.set(3);
        assert_eq!(clock.now_ms(), 3);
    }
}
