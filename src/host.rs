//! Watchface host for the PineTime
//!
//! Holds what the engine asks of the platform until the event loop in
//! `main.rs` acts on it: a redraw flag and at most one deadline.

use chrono::FixedOffset;
use embassy_time::{Duration, Instant};
use embedded_graphics::geometry::Size;
use xday_watchface::{system::time::TimeReference, ui::engine::WatchFaceStyle, Host, UpdateToken};

pub struct PineTimeHost {
    reference: TimeReference,
    zone: FixedOffset,
    size: Size,
    redraw: bool,
    update: Option<(Instant, UpdateToken)>,
}

impl PineTimeHost {
    pub fn new(reference: TimeReference, zone: FixedOffset, size: Size) -> Self {
        Self {
            reference,
            zone,
            size,
            redraw: false,
            update: None,
        }
    }

    /// Clear and return the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }

    /// Time left until the scheduled update, with its token
    pub fn next_update(&self) -> Option<(Duration, UpdateToken)> {
        self.update.map(|(at, token)| {
            let left = at
                .checked_duration_since(Instant::now())
                .unwrap_or(Duration::from_ticks(0));
            (left, token)
        })
    }

    /// The scheduled update is being delivered
    pub fn take_update(&mut self) -> Option<UpdateToken> {
        self.update.take().map(|(_, token)| token)
    }
}

impl Host for PineTimeHost {
    fn now_millis(&self) -> i64 {
        self.reference.now_millis(Instant::now())
    }

    fn utc_offset(&self) -> FixedOffset {
        self.zone
    }

    fn display_size(&self) -> Size {
        self.size
    }

    fn invalidate(&mut self) {
        self.redraw = true;
    }

    fn schedule_update(&mut self, delay: Duration, token: UpdateToken) {
        self.update = Some((Instant::now() + delay, token));
    }

    fn cancel_update(&mut self) {
        self.update = None;
    }

    fn set_time_zone_listener(&mut self, enabled: bool) {
        // The zone only changes with a new firmware build
        defmt::debug!("Time zone listener: {}", enabled);
    }

    fn apply_style(&mut self, style: WatchFaceStyle) {
        defmt::info!("Watchface style: {}", style);
    }
}
