// Display driver, board-independent.
//
// Everything here talks to embedded-hal traits only; pin assignments and
// bus setup live in board/.

pub mod cmd;
pub mod color;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod st7789;

#[cfg(test)]
pub(crate) mod mock;

pub use color::{CacheStats, ColorCache, Rgba};
pub use error::{ConfigError, Error};
pub use geometry::{Rotation, Window};
pub use st7789::{Config, St7789};
