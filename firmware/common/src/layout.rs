//! Screen geometry and the per-refresh display call sequence.
//!
//! ```text
//! +------------------------------------+
//! |                         101 O      |
//! |      D4                  88 C      |
//! |                          74 T      |
//! | | / 8fps                           |
//! +------------------------------------+
//! ```
//!
//! The gear label is centred in the left half. Temperatures are right-aligned
//! against their single-letter tag, one per line.

use embedded_graphics::geometry::Point;

use crate::compositor::RenderPlan;
use crate::format;
use crate::traits::{DisplayError, TextDisplay};

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (SH1106 128x64 OLED)
pub const SCREEN_WIDTH: u32 = 128;

/// Display height in pixels
pub const SCREEN_HEIGHT: u32 = 64;

pub const PADDING_LEFT: i32 = 10;
pub const PADDING_TOP: i32 = 4;
pub const PADDING_RIGHT: i32 = 10;

// =============================================================================
// Pre-computed Layout Constants
// =============================================================================

/// Horizontal nudge applied after centring the gear label in the left half.
pub const GEAR_X_NUDGE: i32 = 5;

/// Vertical distance between temperature lines.
pub const TEMP_LINE_HEIGHT: i32 = 16;

/// Top of the first temperature line.
pub const TEMP_START_Y: i32 = PADDING_TOP + 4;

/// Space reserved right of a temperature value for its tag.
pub const TAG_COLUMN_WIDTH: i32 = 8;

/// Tag x position, measured from the right edge.
pub const TAG_X: i32 = SCREEN_WIDTH as i32 - 6 - PADDING_RIGHT;

/// Baseline row of the debug line.
pub const DEBUG_LINE_Y: i32 = SCREEN_HEIGHT as i32 - 8;

/// Left half width, where the gear label is centred.
const HALF_WIDTH: i32 = (SCREEN_WIDTH / 2) as i32;

// =============================================================================
// Text Scale
// =============================================================================

/// Text size class. The display maps each to a concrete font.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextScale {
    /// Tags and the debug line.
    Small = 1,
    /// Temperature values.
    Medium = 2,
    /// Gear label.
    Large = 4,
}

impl TextScale {
    /// Integer magnification relative to the smallest size.
    #[inline]
    pub const fn factor(self) -> u32 { self as u32 }
}

// =============================================================================
// Drawing
// =============================================================================

/// Issue the display calls for one refresh.
///
/// Always `clear`, then the plan's text, then exactly one `present`.
pub fn draw<D: TextDisplay>(
    display: &mut D,
    plan: &RenderPlan,
    debug_line: Option<&str>,
) -> Result<(), DisplayError> {
    display.clear();

    if !plan.blank {
        draw_primary(display, plan.primary.as_str());

        for (row, readout) in plan.readouts.iter().enumerate() {
            let y = TEMP_START_Y + TEMP_LINE_HEIGHT * row as i32;
            let value = format::temperature::<6>(readout.value);
            let size = display.measure_text(value.as_str(), TextScale::Medium);
            let x = SCREEN_WIDTH as i32 - size.width as i32 - TAG_COLUMN_WIDTH - PADDING_RIGHT;
            display.draw_text(value.as_str(), Point::new(x, y), TextScale::Medium);

            let mut tag = [0u8; 4];
            display.draw_text(readout.tag.encode_utf8(&mut tag), Point::new(TAG_X, y), TextScale::Small);
        }
    }

    if let Some(line) = debug_line {
        display.draw_text(line, Point::new(PADDING_LEFT, DEBUG_LINE_Y), TextScale::Small);
    }

    display.present()
}

fn draw_primary<D: TextDisplay>(
    display: &mut D,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    let size = display.measure_text(text, TextScale::Large);
    let x = (HALF_WIDTH - size.width as i32) / 2 + GEAR_X_NUDGE;
    let y = (SCREEN_HEIGHT as i32 - size.height as i32) / 2;
    display.draw_text(text, Point::new(x, y), TextScale::Large);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::TempReadout;
    use crate::testing::{DisplayCall, RecordingDisplay};

    fn plan(primary: &str) -> RenderPlan {
        let mut plan = RenderPlan::empty();
        plan.primary.push_str(primary).unwrap();
        plan.readouts = [
            TempReadout { value: Some(125), tag: 'O' },
            TempReadout { value: Some(114), tag: 'C' },
            TempReadout { value: None, tag: 'T' },
        ];
        plan
    }

    #[test]
    fn test_geometry() {
        assert_eq!(TEMP_START_Y, 8);
        assert_eq!(TAG_X, 112);
        assert_eq!(DEBUG_LINE_Y, 56);
        assert_eq!(TextScale::Large.factor(), 4);
    }

    #[test]
    fn test_call_sequence() {
        let mut display = RecordingDisplay::new();
        draw(&mut display, &plan("D4"), None).unwrap();

        // 6x8 cell per scale unit in the recording display
        let calls = display.calls();
        assert_eq!(calls.first(), Some(&DisplayCall::Clear));
        assert_eq!(calls.last(), Some(&DisplayCall::Present));
        assert_eq!(display.present_count(), 1);

        // "D4" at scale 4 is 48x32: x = (64 - 48) / 2 + 5, y = (64 - 32) / 2
        assert!(calls.contains(&DisplayCall::text("D4", 13, 16, TextScale::Large)));
        // "125" at scale 2 is 36 wide: x = 128 - 36 - 8 - 10
        assert!(calls.contains(&DisplayCall::text("125", 74, 8, TextScale::Medium)));
        assert!(calls.contains(&DisplayCall::text("O", 112, 8, TextScale::Small)));
        assert!(calls.contains(&DisplayCall::text("114", 74, 24, TextScale::Medium)));
        assert!(calls.contains(&DisplayCall::text("C", 112, 24, TextScale::Small)));
        // Unknown TCU temperature: "--" is 24 wide
        assert!(calls.contains(&DisplayCall::text("--", 86, 40, TextScale::Medium)));
        assert!(calls.contains(&DisplayCall::text("T", 112, 40, TextScale::Small)));
    }

    #[test]
    fn test_empty_primary_not_drawn() {
        let mut display = RecordingDisplay::new();
        draw(&mut display, &plan(""), None).unwrap();
        assert!(display.drawn_texts().iter().all(|(_, scale)| *scale != TextScale::Large));
    }

    #[test]
    fn test_blank_plan_draws_only_debug_line() {
        let mut display = RecordingDisplay::new();
        let mut blank = plan("P");
        blank.blank = true;
        draw(&mut display, &blank, Some("| X 8fps")).unwrap();
        assert_eq!(
            display.calls(),
            &[
                DisplayCall::Clear,
                DisplayCall::text("| X 8fps", PADDING_LEFT, DEBUG_LINE_Y, TextScale::Small),
                DisplayCall::Present,
            ]
        );
    }

    #[test]
    fn test_present_error_propagates() {
        let mut display = RecordingDisplay::new();
        display.fail_next_present();
        assert_eq!(draw(&mut display, &plan("N"), None), Err(DisplayError::Bus));
        assert_eq!(display.present_count(), 1);
    }
}
