//! Time keeping for the watchface

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use embassy_time::{Duration, Instant};

/// Wall clock time pinned to a system instant.
///
/// Without an RTC the firmware only knows the time it was given once, so the
/// current time is that reference plus whatever the monotonic clock counted
/// since.
#[derive(Clone, Copy, Debug)]
pub struct TimeReference {
    /// Milliseconds since the Unix epoch, UTC
    epoch_millis: i64,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Create new time reference from a Unix timestamp in seconds
    pub fn from_unix_secs(secs: i64, instant: Instant) -> Self {
        Self {
            epoch_millis: secs.saturating_mul(1_000),
            instant,
        }
    }

    /// Milliseconds since the Unix epoch at `now`
    pub fn now_millis(&self, now: Instant) -> i64 {
        let elapsed = now
            .checked_duration_since(self.instant)
            .unwrap_or(Duration::from_ticks(0));
        self.epoch_millis + elapsed.as_millis() as i64
    }
}

/// The time the face draws, resolved in one time zone.
///
/// Never cached across frames: the engine calls [`WallClock::set_to_now`]
/// right before every draw.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    zone: FixedOffset,
    local: NaiveDateTime,
}

impl WallClock {
    pub fn new(zone: FixedOffset) -> Self {
        Self {
            zone,
            local: NaiveDateTime::default(),
        }
    }

    /// Switch to another time zone. The local time is stale until the next
    /// [`WallClock::set_to_now`].
    pub fn clear(&mut self, zone: FixedOffset) {
        self.zone = zone;
    }

    /// Resolve the local time from a UTC timestamp in milliseconds.
    pub fn set_to_now(&mut self, utc_millis: i64) {
        match DateTime::from_timestamp_millis(utc_millis) {
            Some(utc) => self.local = utc.with_timezone(&self.zone).naive_local(),
            None => warn!("Timestamp out of range: {}", utc_millis),
        }
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Last resolved local time
    pub fn local(&self) -> &NaiveDateTime {
        &self.local
    }
}

/// Map an hour of the day (0-23) onto a 12 hour dial (1-12).
pub fn convert_24_to_12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn twelve_hour_dial() {
        for hour in 0..24 {
            let h = convert_24_to_12(hour);
            assert!((1..=12).contains(&h), "hour {hour} mapped to {h}");
        }
        assert_eq!(convert_24_to_12(0), 12);
        assert_eq!(convert_24_to_12(12), 12);
        assert_eq!(convert_24_to_12(13), 1);
        assert_eq!(convert_24_to_12(23), 11);
    }

    #[test]
    fn resolves_local_time_in_zone() {
        // 2024-03-03 10:15:30 UTC
        let utc_millis = 1_709_460_930_000;
        let mut clock = WallClock::new(FixedOffset::east_opt(3_600).unwrap());
        clock.set_to_now(utc_millis);
        assert_eq!(clock.local().hour(), 11);
        assert_eq!(clock.local().minute(), 15);
        assert_eq!(clock.local().second(), 30);

        clock.clear(FixedOffset::west_opt(5 * 3_600).unwrap());
        // Stale until refreshed
        assert_eq!(clock.local().hour(), 11);
        clock.set_to_now(utc_millis);
        assert_eq!(clock.local().hour(), 5);
    }

    #[test]
    fn out_of_range_timestamp_keeps_last_time() {
        let mut clock = WallClock::new(FixedOffset::east_opt(0).unwrap());
        clock.set_to_now(1_000);
        clock.set_to_now(i64::MAX);
        assert_eq!(clock.local().second(), 1);
    }

    #[test]
    fn reference_advances_with_instant() {
        let boot = Instant::from_millis(500);
        let reference = TimeReference::from_unix_secs(1_700_000_000, boot);
        assert_eq!(reference.now_millis(boot), 1_700_000_000_000);
        assert_eq!(
            reference.now_millis(boot + Duration::from_millis(1_250)),
            1_700_000_001_250
        );
        // An instant before the reference does not go backwards
        assert_eq!(
            reference.now_millis(Instant::from_millis(0)),
            1_700_000_000_000
        );
    }
}
