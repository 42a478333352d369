//! Host test doubles for the collaborator traits.

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use embedded_graphics::geometry::{Point, Size};

use crate::frame::RawFrame;
use crate::layout::TextScale;
use crate::traits::{CanBus, DisplayError, TextDisplay};

/// Glyph cell of the recording display at scale 1.
pub const CELL_WIDTH: u32 = 6;
pub const CELL_HEIGHT: u32 = 8;

// =============================================================================
// Bus
// =============================================================================

/// Bus that hands out a queue of frames.
#[derive(Debug, Default)]
pub struct ScriptedBus {
    pending: VecDeque<RawFrame>,
    alert: bool,
    receive_calls: usize,
}

impl ScriptedBus {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            alert: true,
            receive_calls: 0,
        }
    }

    pub fn push(
        &mut self,
        frame: RawFrame,
    ) {
        self.pending.push_back(frame);
    }

    /// Queue a standard frame.
    pub fn push_standard(
        &mut self,
        id: u16,
        data: &[u8],
    ) {
        if let Some(frame) = RawFrame::standard(id, data) {
            self.push(frame);
        }
    }

    pub fn set_alert(
        &mut self,
        alert: bool,
    ) {
        self.alert = alert;
    }

    pub fn pending(&self) -> usize { self.pending.len() }

    pub fn receive_calls(&self) -> usize { self.receive_calls }
}

impl CanBus for ScriptedBus {
    fn try_receive_frame(&mut self) -> Option<RawFrame> {
        self.receive_calls += 1;
        self.pending.pop_front()
    }

    fn has_activity_alert(&mut self) -> bool { self.alert }
}

// =============================================================================
// Display
// =============================================================================

/// One call made against [`RecordingDisplay`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DisplayCall {
    Clear,
    Text {
        text: String,
        position: Point,
        scale: TextScale,
    },
    Present,
}

impl DisplayCall {
    pub fn text(
        text: &str,
        x: i32,
        y: i32,
        scale: TextScale,
    ) -> Self {
        Self::Text {
            text: text.into(),
            position: Point::new(x, y),
            scale,
        }
    }
}

/// Display that records every call and measures text on a fixed grid.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    calls: Vec<DisplayCall>,
    fail_next_present: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self { Self::default() }

    pub fn calls(&self) -> &[DisplayCall] { &self.calls }

    pub fn present_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == DisplayCall::Present).count()
    }

    /// Texts drawn since the most recent `clear`.
    pub fn drawn_texts(&self) -> Vec<(String, TextScale)> {
        let start = self
            .calls
            .iter()
            .rposition(|c| *c == DisplayCall::Clear)
            .map_or(0, |i| i + 1);
        self.calls[start..]
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Text { text, scale, .. } => Some((text.clone(), *scale)),
                _ => None,
            })
            .collect()
    }

    /// Make the next `present` report a bus error.
    pub fn fail_next_present(&mut self) { self.fail_next_present = true; }
}

impl TextDisplay for RecordingDisplay {
    fn clear(&mut self) { self.calls.push(DisplayCall::Clear); }

    fn measure_text(
        &self,
        text: &str,
        scale: TextScale,
    ) -> Size {
        let chars = text.chars().count() as u32;
        Size::new(chars * CELL_WIDTH * scale.factor(), CELL_HEIGHT * scale.factor())
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        scale: TextScale,
    ) {
        self.calls.push(DisplayCall::Text {
            text: text.into(),
            position,
            scale,
        });
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.calls.push(DisplayCall::Present);
        if core::mem::take(&mut self.fail_next_present) {
            Err(DisplayError::Bus)
        } else {
            Ok(())
        }
    }
}
