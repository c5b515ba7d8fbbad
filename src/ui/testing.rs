//! Test doubles for the display and the platform host

use core::convert::Infallible;

use chrono::FixedOffset;
use embassy_time::Duration;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::Rgb565,
    Pixel,
};

use super::engine::{Host, UpdateToken, WatchFaceStyle};

/// In-memory display. Pixels outside the area are dropped.
pub struct Canvas {
    size: Size,
    pixels: Vec<Option<Rgb565>>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![None; (size.width * size.height) as usize],
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index(point).and_then(|i| self.pixels[i])
    }

    /// Number of pixels currently showing `color`
    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|p| **p == Some(color)).count()
    }

    /// Rows that contain at least one pixel of `color`
    pub fn rows_with(&self, color: Rgb565) -> Vec<u32> {
        (0..self.size.height)
            .filter(|y| {
                (0..self.size.width)
                    .any(|x| self.pixel(Point::new(x as i32, *y as i32)) == Some(color))
            })
            .collect()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = Some(color);
            }
        }
        Ok(())
    }
}

/// Everything the engine asked the host to do, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCall {
    Invalidate,
    Schedule(u64, UpdateToken),
    Cancel,
    TimeZoneListener(bool),
    Style(WatchFaceStyle),
}

/// Host with a settable clock that records every request.
pub struct RecordingHost {
    pub now_millis: i64,
    pub zone: FixedOffset,
    pub size: Size,
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            now_millis: 0,
            zone: FixedOffset::east_opt(0).unwrap(),
            size: Size::new(240, 240),
            calls: Vec::new(),
        }
    }

    pub fn invalidations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == HostCall::Invalidate)
            .count()
    }

    /// Last scheduled update as (delay in ms, token)
    pub fn last_schedule(&self) -> Option<(u64, UpdateToken)> {
        self.calls.iter().rev().find_map(|c| match c {
            HostCall::Schedule(delay, token) => Some((*delay, *token)),
            _ => None,
        })
    }

    /// Updates scheduled and not cancelled since
    pub fn pending(&self) -> usize {
        self.calls.iter().fold(0, |pending, call| match call {
            HostCall::Schedule(..) => pending + 1,
            HostCall::Cancel => 0,
            _ => pending,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Host for RecordingHost {
    fn now_millis(&self) -> i64 {
        self.now_millis
    }

    fn utc_offset(&self) -> FixedOffset {
        self.zone
    }

    fn display_size(&self) -> Size {
        self.size
    }

    fn invalidate(&mut self) {
        self.calls.push(HostCall::Invalidate);
    }

    fn schedule_update(&mut self, delay: Duration, token: UpdateToken) {
        self.calls.push(HostCall::Schedule(delay.as_millis(), token));
    }

    fn cancel_update(&mut self) {
        self.calls.push(HostCall::Cancel);
    }

    fn set_time_zone_listener(&mut self, enabled: bool) {
        self.calls.push(HostCall::TimeZoneListener(enabled));
    }

    fn apply_style(&mut self, style: WatchFaceStyle) {
        self.calls.push(HostCall::Style(style));
    }
}
