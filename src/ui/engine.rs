//! Watchface lifecycle engine
//!
//! Sits between the platform and a [`WatchFace`]. Platform events come in
//! through the `on_*` methods, get normalized (repeated ambient changes are
//! dropped, the update timer is re-armed) and go out as the face callbacks.
//!
//! The update timer runs only while the face is visible and interactive. It
//! is a single deferred message on the host's event queue, tagged with an
//! [`UpdateToken`]; a fire whose token is no longer the armed one is ignored,
//! so cancelling never races with a message already in flight.

use chrono::FixedOffset;
use embassy_time::Duration;
use embedded_graphics::{
    draw_target::DrawTarget, geometry::Size, pixelcolor::Rgb565, primitives::Rectangle,
};

use super::{resources::ResourceError, Shape, TapType, WatchFace};
use crate::system::{config::FaceConfig, time::WallClock};

/// Identifies one scheduled update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdateToken(u32);

/// How notification cards may cover the face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeekMode {
    Short,
    Variable,
}

/// When the system draws a background behind peeking cards
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackgroundVisibility {
    Interruptive,
    Persistent,
}

/// Presentation options requested from the platform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchFaceStyle {
    pub peek_mode: PeekMode,
    pub background_visibility: BackgroundVisibility,
    pub accepts_tap_events: bool,
    pub show_system_ui_time: bool,
}

impl WatchFaceStyle {
    pub const DEFAULT: Self = Self {
        peek_mode: PeekMode::Variable,
        background_visibility: BackgroundVisibility::Interruptive,
        accepts_tap_events: true,
        show_system_ui_time: false,
    };
}

/// Platform services the engine relies on.
///
/// All calls happen on the host's single event loop.
pub trait Host {
    /// Wall clock, milliseconds since the Unix epoch (UTC)
    fn now_millis(&self) -> i64;

    /// Current time zone of the platform
    fn utc_offset(&self) -> FixedOffset;

    /// Display size in pixels
    fn display_size(&self) -> Size;

    /// Ask for a redraw as soon as possible.
    fn invalidate(&mut self);

    /// Deliver `token` to [`Engine::on_update_timer`] after `delay`.
    fn schedule_update(&mut self, delay: Duration, token: UpdateToken);

    /// Drop any scheduled update. Must be a no-op when none is pending.
    fn cancel_update(&mut self);

    /// Start or stop delivering time zone changes to
    /// [`Engine::on_time_zone_changed`].
    fn set_time_zone_listener(&mut self, enabled: bool);

    fn apply_style(&mut self, style: WatchFaceStyle);
}

/// Lifecycle engine for one watchface session
pub struct Engine<H, F>
where
    H: Host,
    F: WatchFace,
{
    host: H,
    face: F,
    config: FaceConfig,
    clock: WallClock,
    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
    time_zone_listener: bool,
    /// Token of the single pending update, if any
    pending: Option<UpdateToken>,
    next_token: u32,
}

impl<H, F> Engine<H, F>
where
    H: Host,
    F: WatchFace,
{
    pub fn new(host: H, face: F, config: FaceConfig) -> Self {
        let clock = WallClock::new(host.utc_offset());
        Self {
            host,
            face,
            config,
            clock,
            visible: false,
            ambient: false,
            low_bit_ambient: false,
            time_zone_listener: false,
            pending: None,
            next_token: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn face(&self) -> &F {
        &self.face
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_in_ambient_mode(&self) -> bool {
        self.ambient
    }

    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    /// Surface is ready: set up the clock and style, let the face allocate
    /// its resources. A resource error here is fatal for the session.
    pub fn on_surface_created(&mut self, resources: &F::Resources) -> Result<(), ResourceError> {
        self.host.apply_style(WatchFaceStyle::DEFAULT);
        self.clock = WallClock::new(self.host.utc_offset());
        self.face.on_create(resources, self.host.display_size())
    }

    /// Surface is going away, stop the update timer.
    pub fn on_destroy(&mut self) {
        self.cancel_update();
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        debug!("Visibility: {}", visible);
        self.visible = visible;
        if visible {
            self.register_time_zone_listener();
            // The zone may have changed while hidden
            self.clock.clear(self.host.utc_offset());
            self.clock.set_to_now(self.host.now_millis());
        } else {
            self.unregister_time_zone_listener();
        }
        self.update_timer();
    }

    /// Display shape became known. Forwarded every time it is delivered.
    pub fn on_apply_window_insets(&mut self, is_round: bool) {
        self.face.on_shape(Shape::from_round(is_round));
    }

    pub fn on_properties_changed(&mut self, low_bit_ambient: bool) {
        self.low_bit_ambient = low_bit_ambient;
    }

    /// Coarse once-a-minute tick from the platform
    pub fn on_time_tick(&mut self) {
        self.host.invalidate();
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.ambient == ambient {
            trace!("Ambient mode unchanged: {}", ambient);
            return;
        }
        debug!("Ambient mode: {}", ambient);
        self.ambient = ambient;
        self.face.on_ambient_change(ambient, self.low_bit_ambient);
        self.host.invalidate();
        self.update_timer();
    }

    /// Time zone receiver; only acts while registered.
    pub fn on_time_zone_changed(&mut self, zone: FixedOffset) {
        if !self.time_zone_listener {
            return;
        }
        debug!("Time zone offset: {}s", zone.local_minus_utc());
        self.clock.clear(zone);
        self.clock.set_to_now(self.host.now_millis());
    }

    pub fn on_tap_command(&mut self, tap_type: TapType, x: i32, y: i32, event_time: u64) {
        if tap_type == TapType::Tap {
            debug!("Tap at ({}, {})", x, y);
            self.face.on_tap(x, y, event_time);
        }
    }

    /// Draw a frame with the time as of now.
    pub fn on_draw<D>(&mut self, canvas: &mut D, bounds: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.clock.set_to_now(self.host.now_millis());
        if self.ambient {
            self.face.on_draw_ambient(self.clock.local(), canvas, bounds)
        } else {
            self.face.on_draw(self.clock.local(), canvas, bounds)
        }
    }

    /// A scheduled update came due.
    pub fn on_update_timer(&mut self, token: UpdateToken) {
        if self.pending != Some(token) {
            trace!("Dropping stale update {}", token);
            return;
        }
        self.pending = None;

        self.host.invalidate();
        if self.should_timer_be_running() {
            let interval = self.config.update_interval.as_millis().max(1) as i64;
            let delay = interval - self.host.now_millis().rem_euclid(interval);
            self.schedule_update(Duration::from_millis(delay as u64));
        }
    }

    /// The timer runs only while visible and interactive.
    pub fn should_timer_be_running(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Restart the update timer, or stop it if it should not run.
    fn update_timer(&mut self) {
        self.cancel_update();
        if self.should_timer_be_running() {
            self.schedule_update(Duration::from_millis(0));
        }
    }

    fn schedule_update(&mut self, delay: Duration) {
        self.cancel_update();
        let token = UpdateToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending = Some(token);
        trace!("Update {} in {}ms", token, delay.as_millis());
        self.host.schedule_update(delay, token);
    }

    fn cancel_update(&mut self) {
        if self.pending.take().is_some() {
            self.host.cancel_update();
        }
    }

    fn register_time_zone_listener(&mut self) {
        if self.time_zone_listener {
            return;
        }
        self.time_zone_listener = true;
        self.host.set_time_zone_listener(true);
    }

    fn unregister_time_zone_listener(&mut self) {
        if !self.time_zone_listener {
            return;
        }
        self.time_zone_listener = false;
        self.host.set_time_zone_listener(false);
    }
}
