//! ESP32-C3 board support for an ST7789 panel.
//!
//! Maps the wiring in [`pins`] onto esp-hal peripherals so the demo
//! binary only sees a ready-to-configure display.

pub mod pins;

use core::convert::Infallible;

use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    peripherals::Peripherals,
    spi,
    time::Rate,
};

use crate::drivers::st7789::SPI_FREQ_MHZ;
use crate::drivers::{Error, St7789};

// Type Aliases
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type Display =
    St7789<SpiBus, Output<'static>, Output<'static>, Output<'static>, Output<'static>>;
pub type DisplayError = Error<spi::Error, Infallible>;

#[derive(Debug)]
pub enum BoardError {
    /// SPI peripheral rejected the bus configuration.
    Spi(spi::master::ConfigError),
    Display(DisplayError),
}

impl From<spi::master::ConfigError> for BoardError {
    fn from(e: spi::master::ConfigError) -> Self {
        BoardError::Spi(e)
    }
}

impl From<DisplayError> for BoardError {
    fn from(e: DisplayError) -> Self {
        BoardError::Display(e)
    }
}

/// Complete board hardware, ready for `Display::configure`.
pub struct Board {
    pub display: Display,
    pub delay: Delay,
}

impl Board {
    pub fn init(p: Peripherals) -> Result<Self, BoardError> {
        // GPIO setup; lines start parked, the driver re-asserts this
        let cs = Output::new(p.GPIO10, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO4, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO5, Level::High, OutputConfig::default());
        let bl = Output::new(p.GPIO3, Level::Low, OutputConfig::default());

        // SPI bus, mode 0; CS is driven by the display driver itself
        let spi_cfg =
            spi::master::Config::default().with_frequency(Rate::from_mhz(SPI_FREQ_MHZ));
        let spi_bus = spi::master::Spi::new(p.SPI2, spi_cfg)?
            .with_sck(p.GPIO6)
            .with_mosi(p.GPIO7);

        let display = St7789::new(spi_bus, rst, dc, cs, bl)?;

        Ok(Board {
            display,
            delay: Delay::new(),
        })
    }
}
