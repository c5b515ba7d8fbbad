//! Resource lookups for the watchface
//!
//! Offsets, fonts and background images are looked up by name and display
//! shape. A missing resource is a hard error at creation time, there is no
//! fallback artwork.

use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::{OriginDimensions, Point, Size},
    image::ImageDrawable,
    mono_font::MonoFont,
    pixelcolor::{Rgb565, WebColors},
    primitives::{Circle, Primitive, PrimitiveStyle, Rectangle},
    Drawable,
};
use profont::{PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

use super::Shape;

/// Named dimensions, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dimen {
    /// Horizontal text inset
    XOffset,
    /// Baseline of the time text
    YOffset,
    /// Baseline of the first countdown line
    YOffsetCountdown,
}

/// Named text sizes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontId {
    /// Time display
    Digital,
    /// Countdown lines
    Countdown,
}

/// Named background images
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backdrop {
    /// Behind the time
    Face,
    /// Behind the countdown
    Countdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResourceError {
    MissingDimension(Dimen, Shape),
    MissingFont(FontId, Shape),
    MissingImage(Backdrop),
    /// Image cannot be produced at the requested size
    ImageSize(Backdrop),
}

/// Resource provider
pub trait Resources {
    /// Background image, already scaled to the display
    type Image: ImageDrawable<Color = Rgb565>;

    fn dimension(&self, id: Dimen, shape: Shape) -> Result<i32, ResourceError>;

    fn font(&self, id: FontId, shape: Shape) -> Result<&'static MonoFont<'static>, ResourceError>;

    fn background(&self, id: Backdrop, size: Size) -> Result<Self::Image, ResourceError>;
}

/// Background painted at draw time: a solid field with a centred ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plate {
    size: Size,
    field: Rgb565,
    ring: Rgb565,
}

impl Plate {
    const RING_WIDTH: u32 = 6;

    pub fn new(size: Size, field: Rgb565, ring: Rgb565) -> Self {
        Self { size, field, ring }
    }
}

impl OriginDimensions for Plate {
    fn size(&self) -> Size {
        self.size
    }
}

impl ImageDrawable for Plate {
    type Color = Rgb565;

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        let area = Rectangle::new(Point::zero(), self.size);
        target.fill_solid(&area, self.field)?;

        let diameter = self.size.width.min(self.size.height);
        Circle::with_center(area.center(), diameter.saturating_sub(Self::RING_WIDTH))
            .into_styled(PrimitiveStyle::with_stroke(self.ring, Self::RING_WIDTH))
            .draw(target)
    }

    fn draw_sub_image<D>(&self, target: &mut D, area: &Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        let mut target = target.translated(-area.top_left);
        self.draw(&mut target.clipped(area))
    }
}

/// Built-in resource table, ProFont faces and painted plates.
#[derive(Clone, Copy, Debug, Default)]
pub struct BundledResources;

impl Resources for BundledResources {
    type Image = Plate;

    fn dimension(&self, id: Dimen, shape: Shape) -> Result<i32, ResourceError> {
        Ok(match (id, shape) {
            (Dimen::XOffset, Shape::Square) => 15,
            (Dimen::XOffset, Shape::Round) => 25,
            (Dimen::YOffset, Shape::Square) => 150,
            (Dimen::YOffset, Shape::Round) => 160,
            (Dimen::YOffsetCountdown, Shape::Square) => 60,
            (Dimen::YOffsetCountdown, Shape::Round) => 72,
        })
    }

    fn font(&self, id: FontId, shape: Shape) -> Result<&'static MonoFont<'static>, ResourceError> {
        Ok(match (id, shape) {
            (FontId::Digital, Shape::Square) => &PROFONT_18_POINT,
            (FontId::Digital, Shape::Round) => &PROFONT_24_POINT,
            (FontId::Countdown, _) => &PROFONT_14_POINT,
        })
    }

    fn background(&self, id: Backdrop, size: Size) -> Result<Self::Image, ResourceError> {
        if size.width == 0 || size.height == 0 {
            return Err(ResourceError::ImageSize(id));
        }
        Ok(match id {
            Backdrop::Face => Plate::new(
                size,
                Rgb565::CSS_LIGHT_STEEL_BLUE,
                Rgb565::CSS_MIDNIGHT_BLUE,
            ),
            Backdrop::Countdown => Plate::new(size, Rgb565::CSS_WHEAT, Rgb565::CSS_DARK_RED),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::Canvas;
    use embedded_graphics::image::Image;

    #[test]
    fn lookups_differ_by_shape() {
        let res = BundledResources;
        assert_ne!(
            res.dimension(Dimen::YOffset, Shape::Square),
            res.dimension(Dimen::YOffset, Shape::Round)
        );
        let square = res.font(FontId::Digital, Shape::Square).unwrap();
        let round = res.font(FontId::Digital, Shape::Round).unwrap();
        assert!(round.character_size.height > square.character_size.height);
    }

    #[test]
    fn zero_sized_background_is_an_error() {
        let res = BundledResources;
        assert_eq!(
            res.background(Backdrop::Countdown, Size::new(0, 240)),
            Err(ResourceError::ImageSize(Backdrop::Countdown))
        );
    }

    #[test]
    fn plate_fills_the_display() {
        let mut canvas = Canvas::new(Size::new(40, 40));
        let plate = BundledResources
            .background(Backdrop::Face, Size::new(40, 40))
            .unwrap();
        Image::new(&plate, Point::zero()).draw(&mut canvas).unwrap();

        let field = canvas.count(Rgb565::CSS_LIGHT_STEEL_BLUE);
        let ring = canvas.count(Rgb565::CSS_MIDNIGHT_BLUE);
        assert!(ring > 0);
        assert_eq!(field + ring, 40 * 40);
        // Corners stay outside the ring
        assert_eq!(canvas.pixel(Point::zero()), Some(Rgb565::CSS_LIGHT_STEEL_BLUE));
    }
}
