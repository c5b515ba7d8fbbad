//! Watchface configuration

use embassy_time::Duration;

/// Which renderer features are enabled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// Time over the background plate only, taps are ignored.
    Basic,
    /// Tapping toggles between the time and the X-Day countdown.
    Countdown,
}

/// A point in time that comes back every year, in local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnnualTarget {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl AnnualTarget {
    /// July 5th, 07:00:00
    pub const X_DAY: Self = Self {
        month: 7,
        day: 5,
        hour: 7,
        minute: 0,
        second: 0,
    };
}

/// Configuration shared by the engine and the renderer.
#[derive(Clone, Copy, Debug)]
pub struct FaceConfig {
    /// Renderer feature set
    pub variant: Variant,
    /// Redraw period while interactive
    pub update_interval: Duration,
    /// Countdown target
    pub target: AnnualTarget,
    /// Last line of the countdown
    pub caption: &'static str,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceConfig {
    /// Countdown-capable face ticking once a second
    pub const fn new() -> Self {
        Self {
            variant: Variant::Countdown,
            update_interval: Duration::from_millis(1_000),
            target: AnnualTarget::X_DAY,
            caption: "Until X-Day!",
        }
    }

    pub const fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub const fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub const fn with_target(mut self, target: AnnualTarget) -> Self {
        self.target = target;
        self
    }
}
