//! Board configuration

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::Priority,
};

/// nRF52832 setup for the PineTime
pub fn config() -> Config {
    // `Config` is `non_exhaustive`
    let mut config = Config::default();

    // Both clock sources have a crystal on the board
    config.hfclk_source = HfclkSource::ExternalXtal;
    config.lfclk_source = LfclkSource::ExternalXtal;

    // DC/DC regulator instead of the LDO
    config.dcdc.reg1 = true;

    // Priorities 0, 1 and 4 belong to the nRF SoftDevice
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;

    config.debug = Debug::Allowed;

    config
}
