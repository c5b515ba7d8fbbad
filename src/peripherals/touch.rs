//! Touch controller module for PineTime

use cst816s::{TouchGesture, CST816S};
use embassy_nrf::{
    gpio::{Input, Output},
    peripherals::{P0_10, P0_28},
    twim::{self, Twim},
};
use embassy_time::Delay;
use xday_watchface::TapType;

/// A touch the panel reported
#[derive(Clone, Copy, defmt::Format)]
pub struct Touch {
    pub tap_type: TapType,
    pub x: i32,
    pub y: i32,
}

pub struct TouchController<'a, TWI>
where
    TWI: twim::Instance,
{
    /// Touchpad instance
    touchpad: CST816S<Twim<'a, TWI>, Input<'a, P0_28>, Output<'a, P0_10>>,
}

impl<'a, TWI> TouchController<'a, TWI>
where
    TWI: twim::Instance,
{
    /// Reset and configure the touch panel on boot
    pub fn init(
        twi: Twim<'a, TWI>,
        interrupt_pin: Input<'a, P0_28>,
        reset_pin: Output<'a, P0_10>,
    ) -> Result<Self, Error> {
        let mut touchpad = CST816S::new(twi, interrupt_pin, reset_pin);
        touchpad.setup(&mut Delay).map_err(|_| Error::Setup)?;
        Ok(Self { touchpad })
    }

    /// Check for new touch event
    pub fn try_event_detected(&mut self) -> Option<Touch> {
        let event = self.touchpad.read_one_touch_event(true)?;
        Some(Touch {
            tap_type: tap_type(event.gesture),
            x: event.x,
            y: event.y,
        })
    }
}

/// Only a single click counts as a tap on the face.
fn tap_type(gesture: TouchGesture) -> TapType {
    match gesture {
        TouchGesture::SingleClick => TapType::Tap,
        TouchGesture::None => TapType::Touch,
        _ => TapType::TouchCancel,
    }
}

#[derive(Debug, defmt::Format)]
pub enum Error {
    Setup,
}
