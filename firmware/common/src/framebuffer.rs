//! 128x64 monochrome framebuffer in SH1106 page order.
//!
//! Eight pages of 128 column bytes; bit `n` of a column byte is row
//! `page * 8 + n`. The layout matches the controller's GDDRAM so a page can be
//! written out with a single data transfer.

use embedded_graphics::Pixel;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;

use crate::layout::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const WIDTH: usize = SCREEN_WIDTH as usize;
pub const HEIGHT: usize = SCREEN_HEIGHT as usize;
pub const PAGES: usize = HEIGHT / 8;

const _: () = assert!(HEIGHT % 8 == 0, "height must be whole pages");

pub struct Framebuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Column bytes of page `page`, `None` past the last page.
    #[inline]
    pub fn page(
        &self,
        page: usize,
    ) -> Option<&[u8; WIDTH]> {
        self.pages.get(page)
    }

    /// Whether the pixel at (`x`, `y`) is lit. Out of range reads as off.
    pub fn pixel(
        &self,
        x: usize,
        y: usize,
    ) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    pub fn lit_count(&self) -> u32 {
        self.pages.iter().flatten().map(|b| b.count_ones()).sum()
    }

    fn set(
        &mut self,
        x: usize,
        y: usize,
        on: bool,
    ) {
        let mask = 1 << (y % 8);
        let byte = &mut self.pages[y / 8][x];
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

impl Default for Framebuffer {
    fn default() -> Self { Self::new() }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size { Size::new(SCREEN_WIDTH, SCREEN_HEIGHT) }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < HEIGHT {
                self.set(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        for page in &mut self.pages {
            page.fill(fill);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    use super::*;

    #[test]
    fn test_page_bit_order() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(3, 10), BinaryColor::On).draw(&mut fb).unwrap();
        assert!(fb.pixel(3, 10));
        assert_eq!(fb.page(1).unwrap()[3], 0b0000_0100);
        assert_eq!(fb.lit_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = Framebuffer::new();
        Rectangle::new(Point::new(-4, -4), Size::new(200, 200))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.lit_count(), 128 * 64);
        assert!(!fb.pixel(128, 0));
        assert!(fb.page(PAGES).is_none());
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.clear(BinaryColor::On).unwrap();
        assert!(fb.pixel(127, 63));
        fb.clear(BinaryColor::Off).unwrap();
        assert_eq!(fb.lit_count(), 0);
    }
}
