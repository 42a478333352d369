//! Display compositor: fixed-interval refresh of the logical layout.
//!
//! CAN frames arrive in bursts of dozens per loop iteration; the panel only
//! needs a handful of frames per second. [`Compositor::refresh`] re-renders only
//! when at least `refresh_interval_ms` has passed since the last render, and
//! renders on schedule even when no new frames arrived.
//!
//! # Primary Label
//!
//! | Gear                 | Mode      | Label        |
//! |----------------------|-----------|--------------|
//! | Park/Neutral/Reverse | any       | `P`/`N`/`R`  |
//! | `Numeric(n)`         | D/S/M     | `D4`, `S2`.. |
//! | `Unknown`            | D/S/M     | `D`, `S`..   |
//! | anything else        | `Unknown` | (empty)      |

use heapless::String;

use crate::config::{GearViewConfig, TimeoutPolicy};
use crate::debug::DebugOverlay;
use crate::layout;
use crate::traits::{DisplayError, TextDisplay};
use crate::vehicle::{GearLabel, VehicleState};

/// Capacity of the primary label ("D8" plus slack).
pub const PRIMARY_LABEL_LEN: usize = 4;

/// Number of temperature readouts in the secondary region.
pub const READOUT_COUNT: usize = 3;

/// One temperature line: value plus unit tag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TempReadout {
    pub value: Option<i16>,
    pub tag: char,
}

/// Everything one refresh draws, before pixel placement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RenderPlan {
    /// Gear/mode label, empty when nothing should be shown.
    pub primary: String<PRIMARY_LABEL_LEN>,
    /// Oil (`O`), coolant (`C`), transmission (`T`).
    pub readouts: [TempReadout; READOUT_COUNT],
    /// Blank-screen policy active: draw nothing but the debug line.
    pub blank: bool,
}

impl RenderPlan {
    /// Plan with no label and unknown temperatures.
    pub const fn empty() -> Self {
        Self {
            primary: String::new(),
            readouts: [
                TempReadout { value: None, tag: 'O' },
                TempReadout { value: None, tag: 'C' },
                TempReadout { value: None, tag: 'T' },
            ],
            blank: false,
        }
    }
}

/// Refresh scheduler and layout composer.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    refresh_interval_ms: u64,
    policy: TimeoutPolicy,
    last_render_ms: u64,
    render_count: u32,
}

impl Compositor {
    pub const fn new(config: &GearViewConfig) -> Self {
        Self {
            refresh_interval_ms: config.refresh_interval_ms,
            policy: config.timeout_policy,
            last_render_ms: 0,
            render_count: 0,
        }
    }

    /// Whether a refresh would render at `now_ms`.
    #[inline]
    pub const fn due(
        &self,
        now_ms: u64,
    ) -> bool {
        now_ms.saturating_sub(self.last_render_ms) >= self.refresh_interval_ms
    }

    /// Number of refreshes that issued a frame.
    #[inline]
    pub const fn render_count(&self) -> u32 { self.render_count }

    /// Build the logical layout for `state`.
    pub fn compose(
        &self,
        state: &VehicleState,
    ) -> RenderPlan {
        let mut plan = RenderPlan::empty();

        if self.policy == TimeoutPolicy::BlankScreen && !state.bus_active() {
            plan.blank = true;
            return plan;
        }

        let gear = state.gear();
        if gear.is_symbolic() {
            if let Some(letter) = gear.glyph() {
                plan.primary.push(letter).ok();
            }
        } else if let Some(mode) = state.drive_mode().letter() {
            plan.primary.push(mode).ok();
            if let GearLabel::Numeric(_) = gear
                && let Some(digit) = gear.glyph()
            {
                plan.primary.push(digit).ok();
            }
        }

        plan.readouts[0].value = state.oil_temp();
        plan.readouts[1].value = state.coolant_temp();
        plan.readouts[2].value = state.tcu_oil_temp();
        plan
    }

    /// Render if the interval has elapsed.
    ///
    /// Returns `Ok(true)` when a frame was issued, `Ok(false)` for a no-op tick.
    /// A failed `present` still counts as the tick's render; the next attempt
    /// happens one interval later.
    pub fn refresh<D: TextDisplay>(
        &mut self,
        state: &VehicleState,
        display: &mut D,
        now_ms: u64,
        debug: Option<&mut DebugOverlay>,
    ) -> Result<bool, DisplayError> {
        if !self.due(now_ms) {
            return Ok(false);
        }
        self.last_render_ms = now_ms;
        self.render_count = self.render_count.wrapping_add(1);

        let plan = self.compose(state);
        match debug {
            Some(overlay) => {
                overlay.frame_rendered(now_ms);
                let line = overlay.line(state.bus_active());
                layout::draw(display, &plan, Some(line.as_str()))?;
            }
            None => layout::draw(display, &plan, None)?,
        }
        Ok(true)
    }
}

impl Default for Compositor {
    fn default() -> Self { Self::new(&GearViewConfig::new()) }
}

// =============================================================================
// Unit Tests
// =============================================================================
