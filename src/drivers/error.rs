// Driver errors.
//
// Geometry is checked before CS is asserted, so OutOfBounds never leaves a
// side effect. Bus and pin failures are passed through untouched; the
// operation stops where the failure happened and nothing is retried.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<SpiE, PinE> {
    /// Rectangle partly or fully outside the reported display area.
    OutOfBounds,
    /// The SPI bus reported a failure on a transfer.
    Spi(SpiE),
    /// A control line (RST, DC, CS, BL) could not be driven.
    Pin(PinE),
}

impl<SpiE, PinE> Error<SpiE, PinE> {
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::OutOfBounds)
    }

    /// True for failures that may have left a pixel stream half written.
    pub fn is_transport(&self) -> bool {
        !self.is_out_of_bounds()
    }
}

impl<SpiE: fmt::Debug, PinE: fmt::Debug> fmt::Display for Error<SpiE, PinE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfBounds => write!(f, "rectangle coordinates outside display area"),
            Error::Spi(e) => write!(f, "spi transfer failed: {:?}", e),
            Error::Pin(e) => write!(f, "control line failed: {:?}", e),
        }
    }
}

impl<SpiE: fmt::Debug, PinE: fmt::Debug> core::error::Error for Error<SpiE, PinE> {}

/// Failure inside the init sequence. The display must be treated as
/// unusable until `configure` succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigError<SpiE, PinE> {
    /// Name of the register write (or reset phase) that failed.
    pub step: &'static str,
    pub source: Error<SpiE, PinE>,
}

impl<SpiE: fmt::Debug, PinE: fmt::Debug> fmt::Display for ConfigError<SpiE, PinE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display configuration failed at {}: {}", self.step, self.source)
    }
}

impl<SpiE: fmt::Debug, PinE: fmt::Debug> core::error::Error for ConfigError<SpiE, PinE> {}
