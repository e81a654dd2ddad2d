//! GPIO |   Function   |      Notes
//! -----+--------------+----------------------------------
//!  3   | TFT BL       | Backlight enable, active HIGH
//!  4   | TFT DC       | Data/Command select
//!  5   | TFT RST      | Reset (active low)
//!  6   | SPI2 SCK     | Display clock
//!  7   | SPI2 MOSI    | Display data in (panel is write-only)
//! 10   | TFT CS       | Display chip select

// ----- TFT -----
pub const TFT_BL: u8 = 3;
pub const TFT_DC: u8 = 4;
pub const TFT_RST: u8 = 5;
pub const TFT_CS: u8 = 10;

// ----- SPI Bus -----
pub const SPI_SCK: u8 = 6;
pub const SPI_MOSI: u8 = 7;
