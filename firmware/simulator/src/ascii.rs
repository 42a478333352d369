//! Terminal output for presented frames.
//!
//! Two pixel rows per character using half blocks, so the 128x64 panel prints
//! as 128x32 characters inside a frame.

use std::convert::Infallible;

use gearview_common::framebuffer::{HEIGHT, WIDTH};
use gearview_common::{Framebuffer, Present};

/// Keeps the last presented frame as text, and whether it changed.
#[derive(Default)]
pub struct AsciiPresenter {
    last: Option<String>,
    changed: bool,
    presents: u64,
}

impl AsciiPresenter {
    pub fn new() -> Self { Self::default() }

    /// The latest frame if it differs from the one before, once.
    pub fn take_changed(&mut self) -> Option<&str> {
        if std::mem::take(&mut self.changed) {
            self.last.as_deref()
        } else {
            None
        }
    }

    pub fn presents(&self) -> u64 { self.presents }
}

impl Present<Framebuffer> for AsciiPresenter {
    type Error = Infallible;

    fn present(
        &mut self,
        target: &Framebuffer,
    ) -> Result<(), Infallible> {
        self.presents += 1;
        let art = render(target);
        if self.last.as_deref() != Some(art.as_str()) {
            self.last = Some(art);
            self.changed = true;
        }
        Ok(())
    }
}

/// Draw the framebuffer with a border.
pub fn render(fb: &Framebuffer) -> String {
    let mut out = String::with_capacity((WIDTH + 3) * (HEIGHT / 2 + 2) * 3);
    let border: String = "─".repeat(WIDTH);

    out.push('┌');
    out.push_str(&border);
    out.push_str("┐\n");
    for y in (0..HEIGHT).step_by(2) {
        out.push('│');
        for x in 0..WIDTH {
            out.push(match (fb.pixel(x, y), fb.pixel(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push_str("│\n");
    }
    out.push('└');
    out.push_str(&border);
    out.push('┘');
    out
}

#[cfg(test)]
mod tests {
    use embedded_graphics::Pixel;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;

    use super::*;

    #[test]
    fn test_half_blocks() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(1, 1), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(2, 0), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(2, 1), BinaryColor::On).draw(&mut fb).unwrap();

        let art = render(&fb);
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), HEIGHT / 2 + 2);
        assert!(lines[1].starts_with("│▀▄█ "));
        assert_eq!(lines[1].chars().count(), WIDTH + 2);
    }

    #[test]
    fn test_reports_only_changes() {
        let mut presenter = AsciiPresenter::new();
        let mut fb = Framebuffer::new();
        presenter.present(&fb).unwrap();
        assert!(presenter.take_changed().is_some());
        assert!(presenter.take_changed().is_none());

        presenter.present(&fb).unwrap();
        assert!(presenter.take_changed().is_none());

        Pixel(Point::new(5, 5), BinaryColor::On).draw(&mut fb).unwrap();
        presenter.present(&fb).unwrap();
        assert!(presenter.take_changed().is_some());
        assert_eq!(presenter.presents(), 3);
    }
}
