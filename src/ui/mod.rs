//! UI definitions module
//! Based on: https://github.com/lupyuen/pinetime-watchface/blob/master/src/lib.rs

use chrono::NaiveDateTime;
use embedded_graphics::{
    draw_target::DrawTarget, geometry::Size, pixelcolor::Rgb565, primitives::Rectangle,
};

use resources::{ResourceError, Resources};

pub mod countdown;
pub mod engine;
pub mod resources;
pub mod xday_watchface;

#[cfg(test)]
pub(crate) mod testing;

/// Display outline, drives offsets and font sizes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    Square,
    Round,
}

impl Shape {
    pub fn from_round(is_round: bool) -> Self {
        if is_round {
            Shape::Round
        } else {
            Shape::Square
        }
    }
}

/// Kind of touch reported by the platform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapType {
    /// Finger went down
    Touch,
    /// Touch turned into something else (swipe, long press)
    TouchCancel,
    /// Completed single tap
    Tap,
}

/// Callbacks the lifecycle engine drives.
///
/// The engine calls these from a single event loop; none of them is ever
/// re-entered.
pub trait WatchFace {
    type Resources: Resources;

    /// Allocate drawing resources for a display of `size`.
    fn on_create(&mut self, resources: &Self::Resources, size: Size) -> Result<(), ResourceError>;

    /// Display shape became known. May be delivered more than once.
    fn on_shape(&mut self, shape: Shape);

    /// Ambient mode flipped.
    fn on_ambient_change(&mut self, ambient: bool, low_bit_ambient: bool);

    /// Draw the interactive face.
    fn on_draw<D>(
        &mut self,
        time: &NaiveDateTime,
        canvas: &mut D,
        bounds: Rectangle,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>;

    /// Draw the low power face.
    fn on_draw_ambient<D>(
        &mut self,
        time: &NaiveDateTime,
        canvas: &mut D,
        bounds: Rectangle,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>;

    /// Face was tapped at `(x, y)`.
    fn on_tap(&mut self, x: i32, y: i32, event_time: u64);
}
