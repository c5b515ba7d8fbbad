#![no_std]
#![no_main]

mod board;
mod host;
mod peripherals;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    peripherals::{SPI2, TWISPI1},
    spim, twim,
};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel};
use embassy_time::{with_timeout, Duration, Instant, Ticker, Timer};

bind_interrupts!(struct Irqs {
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<TWISPI1>;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use host::PineTimeHost;
use peripherals::{
    backlight::{Backlight, INTERACTIVE_LEVEL},
    button::Button,
    display::Display,
    touch::{Touch, TouchController},
};
use xday_watchface::{
    system::time::TimeReference, BundledResources, Engine, FaceConfig, XDayWatchface,
};

// Others
use chrono::FixedOffset;

// Current UTC epoch and offset of the build machine
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

const FACE_CONFIG: FaceConfig = FaceConfig::new();

/// Everything that reaches the watchface, in arrival order
enum FaceEvent {
    Touch(Touch, Instant),
    Button,
    TimeTick,
}

static EVENTS: Channel<ThreadModeRawMutex, FaceEvent, 8> = Channel::new();

/// Polls the button state every 10ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_button(mut button: Button<'static>) {
    loop {
        if button.pressed().await {
            EVENTS.send(FaceEvent::Button).await;
        }

        // Re-schedule the timer interrupt in 10ms
        Timer::after(Duration::from_millis(10)).await;
    }
}

/// Polls the touch interrupt pin every 2ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_touch(mut touch: TouchController<'static, TWISPI1>) {
    loop {
        if let Some(event) = touch.try_event_detected() {
            EVENTS.send(FaceEvent::Touch(event, Instant::now())).await;
        }

        // Re-schedule the timer interrupt in 2ms
        Timer::after(Duration::from_millis(2)).await;
    }
}

/// Coarse minute tick, independent of the interactive update timer
#[embassy_executor::task(pool_size = 1)]
async fn time_tick() {
    let mut tick = Ticker::every(Duration::from_secs(60));
    loop {
        tick.next().await;
        EVENTS.send(FaceEvent::TimeTick).await;
    }
}

/// Runs the watchface engine. Events and scheduled updates are handled one
/// at a time on this task.
#[embassy_executor::task(pool_size = 1)]
async fn run_face(mut display: Display<'static, SPI2>, mut backlight: Backlight<'static>) {
    let zone = unwrap!(FixedOffset::east_opt(UTC_OFFSET));
    let reference = TimeReference::from_unix_secs(UTC_TIME, Instant::now());
    let host = PineTimeHost::new(reference, zone, display.size());

    let mut engine = Engine::new(host, XDayWatchface::new(FACE_CONFIG), FACE_CONFIG);
    unwrap!(engine.on_surface_created(&BundledResources));
    // The ST7789 keeps full colour depth when dimmed
    engine.on_properties_changed(false);
    engine.on_apply_window_insets(false);
    engine.on_visibility_changed(true);

    let bounds = display.bounds();
    loop {
        if engine.host_mut().take_redraw() && engine.on_draw(display.canvas(), bounds).is_err() {
            defmt::error!("Drawing the watchface failed");
        }

        let event = match engine.host().next_update() {
            Some((left, _)) => match with_timeout(left, EVENTS.receive()).await {
                Ok(event) => event,
                Err(_) => {
                    if let Some(token) = engine.host_mut().take_update() {
                        engine.on_update_timer(token);
                    }
                    continue;
                }
            },
            None => EVENTS.receive().await,
        };

        match event {
            FaceEvent::Touch(touch, at) => {
                engine.on_tap_command(touch.tap_type, touch.x, touch.y, at.as_millis())
            }
            FaceEvent::Button => {
                let ambient = !engine.is_in_ambient_mode();
                engine.on_ambient_mode_changed(ambient);
                if let Err(e) = backlight.follow_ambient(ambient) {
                    defmt::warn!("Backlight: {}", e);
                }
            }
            FaceEvent::TimeTick => engine.on_time_tick(),
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(board::config());
    defmt::info!("Initializing");

    // Initialize Backlight
    let backlight = unwrap!(Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        INTERACTIVE_LEVEL,
    ));

    // Initialize Button
    let button = Button::init(
        Input::new(p.P0_13, Pull::None),
        Output::new(p.P0_15, Level::Low, OutputDrive::Standard),
    );

    // Initialize I2C
    let mut i2c_config = twim::Config::default();
    // Use I2C at 400KHz (the fastest clock available on the nRF52832),
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = twim::Twim::new(p.TWISPI1, Irqs, p.P0_06, p.P0_07, i2c_config);

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;
    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
    ));

    // Initialize touch controller
    let touch = unwrap!(TouchController::init(
        i2c,
        // Touchpad external interrupt pin: P0.28/AIN4 (TP_INT)
        Input::new(p.P0_28, Pull::Up),
        // Touchpad reset pin: P0.10/NFC2 (TP_RESET)
        Output::new(p.P0_10, Level::High, OutputDrive::Standard),
    ));

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(poll_button(button)));
    unwrap!(spawner.spawn(poll_touch(touch)));
    unwrap!(spawner.spawn(time_tick()));
    unwrap!(spawner.spawn(run_face(display, backlight)));
}
