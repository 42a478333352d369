//! [`TextDisplay`] over any monochrome embedded-graphics target.
//!
//! Text is drawn with ProFont into the target (usually a
//! [`Framebuffer`](crate::framebuffer::Framebuffer)); `present` hands the
//! finished target to a [`Present`] implementation that pushes it to the panel.

use embedded_graphics::Drawable;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text, TextStyle, TextStyleBuilder};
use profont::{PROFONT_7_POINT, PROFONT_12_POINT, PROFONT_24_POINT};

use crate::layout::TextScale;
use crate::traits::{DisplayError, TextDisplay};

// =============================================================================
// Text Styles
// =============================================================================

/// Positions are top-left corners.
const TOP_LEFT: TextStyle = TextStyleBuilder::new().baseline(Baseline::Top).build();

const SMALL_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_7_POINT, BinaryColor::On);
const MEDIUM_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_12_POINT, BinaryColor::On);
const LARGE_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&PROFONT_24_POINT, BinaryColor::On);

#[inline]
const fn style(scale: TextScale) -> MonoTextStyle<'static, BinaryColor> {
    match scale {
        TextScale::Small => SMALL_STYLE,
        TextScale::Medium => MEDIUM_STYLE,
        TextScale::Large => LARGE_STYLE,
    }
}

// =============================================================================
// Present Hook
// =============================================================================

/// Pushes a finished draw target to the physical panel.
pub trait Present<T> {
    type Error;

    fn present(
        &mut self,
        target: &T,
    ) -> Result<(), Self::Error>;
}

// =============================================================================
// Display Adapter
// =============================================================================

pub struct GraphicsDisplay<T, P> {
    target: T,
    presenter: P,
}

impl<T, P> GraphicsDisplay<T, P>
where
    T: DrawTarget<Color = BinaryColor>,
    P: Present<T>,
{
    pub const fn new(
        target: T,
        presenter: P,
    ) -> Self {
        Self { target, presenter }
    }

    pub fn target(&self) -> &T { &self.target }

    pub fn presenter(&self) -> &P { &self.presenter }

    pub fn presenter_mut(&mut self) -> &mut P { &mut self.presenter }
}

impl<T, P> TextDisplay for GraphicsDisplay<T, P>
where
    T: DrawTarget<Color = BinaryColor>,
    P: Present<T>,
{
    fn clear(&mut self) { self.target.clear(BinaryColor::Off).ok(); }

    fn measure_text(
        &self,
        text: &str,
        scale: TextScale,
    ) -> Size {
        style(scale).measure_string(text, Point::zero(), Baseline::Top).bounding_box.size
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        scale: TextScale,
    ) {
        Text::with_text_style(text, position, style(scale), TOP_LEFT)
            .draw(&mut self.target)
            .ok();
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.presenter.present(&self.target).map_err(|_| DisplayError::Bus)
    }
}
