//! On-screen debug line: render spinner, bus spinner and frame rate.
//!
//! Rendered as `<render> <bus|X> <fps>fps` in the bottom-left corner.

use heapless::String;

use crate::format::push_u32;

/// Spinner glyphs, advanced one step at a time.
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Received frames per bus spinner step.
pub const FRAMES_PER_BUS_SPIN: u32 = 2;

/// FPS averaging window.
pub const FPS_WINDOW_MS: u64 = 1000;

/// Capacity of the debug line.
pub const DEBUG_LINE_LEN: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct DebugOverlay {
    render_step: u8,
    bus_step: u8,
    frames_seen: u32,
    frames_in_window: u32,
    window_start_ms: u64,
    fps: u32,
}

impl DebugOverlay {
    pub const fn new() -> Self {
        Self {
            render_step: 0,
            bus_step: 0,
            frames_seen: 0,
            frames_in_window: 0,
            window_start_ms: 0,
            fps: 0,
        }
    }

    /// Count one received frame towards the bus spinner.
    pub fn frame_received(&mut self) {
        self.frames_seen = self.frames_seen.wrapping_add(1);
        if self.frames_seen % FRAMES_PER_BUS_SPIN == 0 {
            self.bus_step = (self.bus_step + 1) % SPINNER.len() as u8;
        }
    }

    /// Count one refresh and update the FPS estimate once per window.
    pub fn frame_rendered(
        &mut self,
        now_ms: u64,
    ) {
        self.render_step = (self.render_step + 1) % SPINNER.len() as u8;
        self.frames_in_window = self.frames_in_window.saturating_add(1);

        let elapsed = now_ms.saturating_sub(self.window_start_ms);
        if elapsed >= FPS_WINDOW_MS {
            let fps = u64::from(self.frames_in_window) * 1000 / elapsed;
            self.fps = u32::try_from(fps).unwrap_or(u32::MAX);
            self.frames_in_window = 0;
            self.window_start_ms = now_ms;
        }
    }

    #[inline]
    pub const fn fps(&self) -> u32 { self.fps }

    /// Build the overlay text. The bus glyph is `X` while the bus is inactive.
    pub fn line(
        &self,
        bus_active: bool,
    ) -> String<DEBUG_LINE_LEN> {
        let mut s = String::new();
        s.push(SPINNER[self.render_step as usize]).ok();
        s.push(' ').ok();
        s.push(if bus_active { SPINNER[self.bus_step as usize] } else { 'X' })
            .ok();
        s.push(' ').ok();
        push_u32(&mut s, self.fps);
        s.push_str("fps").ok();
        s
    }
}

impl Default for DebugOverlay {
    fn default() -> Self { Self::new() }
}
