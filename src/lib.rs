//! X-Day watchface
//!
//! A digital watchface that shows the time over a background plate and, on
//! tap, switches to a countdown until the next X-Day. The lifecycle engine in
//! [`ui::engine`] turns platform events into calls on a [`ui::WatchFace`];
//! the PineTime firmware in `main.rs` is one host for it.
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod system;
pub mod ui;

pub use system::{
    config::{AnnualTarget, FaceConfig, Variant},
    time::WallClock,
};
pub use ui::{
    engine::{Engine, Host, UpdateToken},
    resources::{Backdrop, BundledResources, Dimen, FontId, ResourceError, Resources},
    xday_watchface::XDayWatchface,
    Shape, TapType, WatchFace,
};
