// Blocking ST7789 TFT driver for LilyGo boards (240x320, RGB565 over SPI)

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "esp32c3")]
pub mod board;
pub mod drivers;

pub use drivers::{CacheStats, ColorCache, Config, ConfigError, Error, Rgba, Rotation, St7789, Window};
