// ST7789 TFT driver (board-independent)
// Tuned for LilyGo panels: init sequence, gamma tables and inversion
// follow the vendor's 2024-07 sequence. No framebuffer; solid fills are
// streamed from a 4KB pattern buffer, see fill.rs for the tiers.
//
// Every public operation owns the bus for exactly one CS-low..CS-high
// bracket. Private helpers never touch CS, so they can be composed
// inside a bracket freely.

use embedded_graphics_core::Pixel;
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{Dimensions, OriginDimensions, Size};
use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_graphics_core::primitives::{PointsIter, Rectangle};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{ErrorType, SpiBus};
use log::{debug, error, info, warn};

use super::cmd;
use super::color::{ColorCache, Rgba, rgb565_raw};
use super::error::{ConfigError, Error};
use super::fill::{
    BYTES_PER_PIXEL, FillTier, PERSISTENT_BUF_SIZE, PatternBuffer, Replay, TRANSIENT_BUF_SIZE,
};
use super::geometry::{Rotation, Window, reported_size};

pub const DEFAULT_WIDTH: u16 = 240;
pub const DEFAULT_HEIGHT: u16 = 320;

// controller GRAM is 240 columns x 320 rows
pub const MAX_WIDTH: u16 = 240;
pub const MAX_HEIGHT: u16 = 320;

pub const SPI_FREQ_MHZ: u32 = 80;

const RESET_PULSE_MS: u32 = 20;
const RESET_SETTLE_MS: u32 = 150;
const SLEEP_OUT_MS: u32 = 120;
const SLEEP_IN_MS: u32 = 5;
const WAKE_MS: u32 = 5;

/// LilyGo positive voltage gamma (PVGAMCTRL).
pub const DEFAULT_PV_GAMMA: [u8; 14] = [
    0xd0, 0x00, 0x05, 0x0e, 0x15, 0x0d, 0x37, 0x43, 0x47, 0x09, 0x15, 0x12, 0x16, 0x19,
];

/// LilyGo negative voltage gamma (NVGAMCTRL).
pub const DEFAULT_NV_GAMMA: [u8; 14] = [
    0xd0, 0x00, 0x02, 0x07, 0x0a, 0x28, 0x31, 0x54, 0x47, 0x0e, 0x1c, 0x17, 0x1b, 0x1e,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Native (unrotated) width, at most `MAX_WIDTH`. Zero keeps the
    /// current value.
    pub width: u16,
    /// Native (unrotated) height, at most `MAX_HEIGHT`. Zero keeps the
    /// current value.
    pub height: u16,
    pub rotation: Rotation,
    /// Panel-specific gamma tables; `None` uses the LilyGo defaults.
    pub pv_gamma: Option<[u8; 14]>,
    pub nv_gamma: Option<[u8; 14]>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rotation: Rotation::Deg0,
            pv_gamma: None,
            nv_gamma: None,
        }
    }
}

// ── Init sequence ───────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub enum InitStep {
    Write(&'static str, u8, &'static [u8]),
    PositiveGamma,
    NegativeGamma,
    /// Full-window fill to black; clears stale controller RAM.
    Clear,
    DelayMs(u32),
}

// Vendor order; reordering or dropping steps gives a blank or
// wrongly colored panel.
pub const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::Write("SLPOUT", cmd::SLPOUT, &[]),
    InitStep::DelayMs(SLEEP_OUT_MS),
    InitStep::Write("COLMOD", cmd::COLMOD, &[cmd::COLMOD_16BIT]),
    InitStep::DelayMs(10),
    InitStep::Write("MADCTL", cmd::MADCTL, &[0x00]),
    InitStep::Write("PORCTRL", cmd::PORCTRL, &[0x0c, 0x0c, 0x00, 0x33, 0x33]),
    InitStep::Write("GCTRL", cmd::GCTRL, &[0x85]),
    InitStep::Write("VCOMS", cmd::VCOMS, &[0x3f]),
    InitStep::Write("LCMCTRL", cmd::LCMCTRL, &[0x2c]),
    InitStep::Write("VDVVRHEN", cmd::VDVVRHEN, &[0x01]),
    InitStep::Write("VRHS", cmd::VRHS, &[0x13]),
    InitStep::Write("VDVS", cmd::VDVS, &[0x20]),
    InitStep::Write("FRCTRL2", cmd::FRCTRL2, &[cmd::FRAMERATE_60]),
    InitStep::Write("PWCTRL1", cmd::PWCTRL1, &[0xa4, 0xa1]),
    InitStep::PositiveGamma,
    InitStep::NegativeGamma,
    // panels in this family ship inverted; without INVON colors are negated
    InitStep::Write("INVON", cmd::INVON, &[]),
    InitStep::Clear,
    InitStep::Write("WRDISBV", cmd::WRDISBV, &[0xff]),
    InitStep::Write("WRCTRLD", cmd::WRCTRLD, &[0x2c]),
    InitStep::Write("WRCABC", cmd::WRCABC, &[0x01]),
    InitStep::Write("NORON", cmd::NORON, &[]),
    InitStep::DelayMs(10),
    InitStep::Write("DISPON", cmd::DISPON, &[]),
    InitStep::DelayMs(100),
];

type DriverError<SPI, PinE> = Error<<SPI as ErrorType>::Error, PinE>;
type DriverConfigError<SPI, PinE> = ConfigError<<SPI as ErrorType>::Error, PinE>;

fn at<SpiE, PinE>(step: &'static str) -> impl FnOnce(Error<SpiE, PinE>) -> ConfigError<SpiE, PinE> {
    move |source| ConfigError { step, source }
}

pub struct St7789<SPI, RST, DC, CS, BL> {
    spi: SPI,
    rst: RST,
    dc: DC,
    cs: CS,
    bl: BL,
    width: u16,
    height: u16,
    rotation: Rotation,
    fill_buf: PatternBuffer<PERSISTENT_BUF_SIZE>,
    colors: ColorCache,
    // advisory; every fill still sends CASET/RASET/RAMWR
    last_window: Option<Window>,
}

impl<SPI, RST, DC, CS, BL, PinE> St7789<SPI, RST, DC, CS, BL>
where
    SPI: SpiBus,
    RST: OutputPin<Error = PinE>,
    DC: OutputPin<Error = PinE>,
    CS: OutputPin<Error = PinE>,
    BL: OutputPin<Error = PinE>,
{
    /// Take ownership of the control lines and park them idle (CS and RST
    /// inactive, DC in data mode, backlight off). The bus must already be
    /// configured; pass `&mut bus` to keep ownership of a shared bus.
    pub fn new(
        spi: SPI,
        rst: RST,
        dc: DC,
        cs: CS,
        bl: BL,
    ) -> Result<Self, DriverError<SPI, PinE>> {
        let mut this = Self {
            spi,
            rst,
            dc,
            cs,
            bl,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rotation: Rotation::Deg0,
            fill_buf: PatternBuffer::new(),
            colors: ColorCache::new(),
            last_window: None,
        };
        this.cs.set_high().map_err(Error::Pin)?;
        this.dc.set_high().map_err(Error::Pin)?;
        this.rst.set_high().map_err(Error::Pin)?;
        this.bl.set_low().map_err(Error::Pin)?;
        Ok(this)
    }

    /// Reset the controller and run the full init sequence, then turn
    /// the backlight on. A failure leaves the panel in an undefined state.
    pub fn configure<D: DelayNs>(
        &mut self,
        config: &Config,
        delay: &mut D,
    ) -> Result<(), DriverConfigError<SPI, PinE>> {
        if config.width > MAX_WIDTH || config.height > MAX_HEIGHT {
            error!(
                "st7789: panel {}x{} exceeds controller RAM",
                config.width, config.height
            );
            return Err(at("SIZE")(Error::OutOfBounds));
        }
        if config.width != 0 {
            self.width = config.width;
        }
        if config.height != 0 {
            self.height = config.height;
        }
        // MADCTL is 0x00 for the whole sequence; the requested rotation
        // is applied once the panel is on
        self.rotation = Rotation::Deg0;
        self.last_window = None;

        let res = self.run_configure(config, delay);
        if let Err(e) = &res {
            error!("st7789: configure failed at {}", e.step);
            self.last_window = None;
        }
        res
    }

    fn run_configure<D: DelayNs>(
        &mut self,
        config: &Config,
        delay: &mut D,
    ) -> Result<(), DriverConfigError<SPI, PinE>> {
        self.hardware_reset(delay).map_err(at("RESET"))?;

        self.start_write().map_err(at("CS"))?;
        let res = self.run_init_sequence(config, delay);
        let end = self.end_write().map_err(at("CS"));
        res?;
        end?;

        self.bl.set_high().map_err(|e| at("BACKLIGHT")(Error::Pin(e)))?;

        info!(
            "st7789: configured {}x{} rotation {}",
            self.width,
            self.height,
            self.rotation.degrees()
        );
        Ok(())
    }

    fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DriverError<SPI, PinE>> {
        self.rst.set_low().map_err(Error::Pin)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    fn run_init_sequence<D: DelayNs>(
        &mut self,
        config: &Config,
        delay: &mut D,
    ) -> Result<(), DriverConfigError<SPI, PinE>> {
        for step in INIT_SEQUENCE {
            match *step {
                InitStep::Write(name, opcode, data) => {
                    self.send_command(opcode, data).map_err(at(name))?
                }
                InitStep::PositiveGamma => {
                    let table = config.pv_gamma.unwrap_or(DEFAULT_PV_GAMMA);
                    self.send_command(cmd::PVGAMCTRL, &table)
                        .map_err(at("PVGAMCTRL"))?
                }
                InitStep::NegativeGamma => {
                    let table = config.nv_gamma.unwrap_or(DEFAULT_NV_GAMMA);
                    self.send_command(cmd::NVGAMCTRL, &table)
                        .map_err(at("NVGAMCTRL"))?
                }
                InitStep::Clear => {
                    let raw = self.colors.native(Rgba::BLACK);
                    let win = self.full_window();
                    self.last_window = None;
                    self.fill_window(win, raw).map_err(at("CLEAR"))?
                }
                InitStep::DelayMs(ms) => delay.delay_ms(ms),
            }
        }

        if config.rotation != Rotation::Deg0 {
            self.write_rotation(config.rotation).map_err(at("MADCTL"))?;
        }
        Ok(())
    }

    // ── Geometry ────────────────────────────────────────────

    /// Size as seen by callers: transposed for 90° and 270°.
    pub fn reported_size(&self) -> (u16, u16) {
        reported_size(self.width, self.height, self.rotation)
    }

    /// Native (unrotated) panel size.
    pub fn physical_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Last window programmed into the controller, if still known.
    pub fn last_window(&self) -> Option<Window> {
        self.last_window
    }

    pub fn color_cache(&self) -> &ColorCache {
        &self.colors
    }

    /// Rotate the display (clockwise). Changes the reported size.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DriverError<SPI, PinE>> {
        debug!("st7789: rotation -> {}", rotation.degrees());
        self.transaction(|d| d.write_rotation(rotation))
    }

    fn write_rotation(&mut self, rotation: Rotation) -> Result<(), DriverError<SPI, PinE>> {
        self.rotation = rotation;
        self.last_window = None;
        self.send_command(cmd::MADCTL, &[rotation.madctl()])
    }

    fn full_window(&self) -> Window {
        let (w, h) = self.reported_size();
        Window { x: 0, y: 0, w, h }
    }

    fn checked_window(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Result<Window, DriverError<SPI, PinE>> {
        Window::checked(x, y, w, h, self.reported_size()).ok_or_else(|| {
            warn!("st7789: rect {},{} {}x{} outside display", x, y, w, h);
            Error::OutOfBounds
        })
    }

    // CASET + RASET, then RAMWR: the controller expects w*h pixels next
    fn set_window(&mut self, win: Window) -> Result<(), DriverError<SPI, PinE>> {
        self.send_command(cmd::CASET, &win.caset())?;
        self.send_command(cmd::RASET, &win.raset())?;
        self.send_command(cmd::RAMWR, &[])?;
        self.last_window = Some(win);
        Ok(())
    }

    // ── Drawing ─────────────────────────────────────────────

    /// Fill a rectangle given in rotated coordinates. Fails without
    /// touching the bus if any part lies outside the reported area.
    pub fn fill_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Rgba,
    ) -> Result<(), DriverError<SPI, PinE>> {
        let win = self.checked_window(x, y, width, height)?;
        let raw = self.colors.native(color);
        self.transaction(|d| d.fill_window(win, raw))
    }

    /// Fill the whole reported area. Always re-addresses the full window.
    pub fn fill_screen(&mut self, color: Rgba) -> Result<(), DriverError<SPI, PinE>> {
        let raw = self.colors.native(color);
        self.fill_screen_raw(raw)
    }

    fn fill_screen_raw(&mut self, raw: u16) -> Result<(), DriverError<SPI, PinE>> {
        self.last_window = None;
        let win = self.full_window();
        self.transaction(|d| d.fill_window(win, raw))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) -> Result<(), DriverError<SPI, PinE>> {
        self.fill_rectangle(x, y, 1, 1, color)
    }

    /// Horizontal line from `x0` to `x1` inclusive, either order.
    pub fn draw_fast_hline(
        &mut self,
        x0: i32,
        x1: i32,
        y: i32,
        color: Rgba,
    ) -> Result<(), DriverError<SPI, PinE>> {
        let (a, b) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
        self.fill_rectangle(a, y, b.saturating_sub(a).saturating_add(1), 1, color)
    }

    /// Vertical line from `y0` to `y1` inclusive, either order.
    pub fn draw_fast_vline(
        &mut self,
        x: i32,
        y0: i32,
        y1: i32,
        color: Rgba,
    ) -> Result<(), DriverError<SPI, PinE>> {
        let (a, b) = if y0 > y1 { (y1, y0) } else { (y0, y1) };
        self.fill_rectangle(x, a, 1, b.saturating_sub(a).saturating_add(1), color)
    }

    // window + w*h copies of `raw`; batching depends on the pixel count
    // but the byte stream never does
    fn fill_window(&mut self, win: Window, raw: u16) -> Result<(), DriverError<SPI, PinE>> {
        self.set_window(win)?;

        let pixel = raw.to_be_bytes();
        let pixels = win.pixel_count();
        let total_bytes = pixels as usize * BYTES_PER_PIXEL;

        match FillTier::for_pixels(pixels) {
            FillTier::Direct => {
                for _ in 0..pixels {
                    self.transfer_byte(pixel[0])?;
                    self.transfer_byte(pixel[1])?;
                }
            }
            FillTier::Transient => {
                let mut buf = PatternBuffer::<TRANSIENT_BUF_SIZE>::new();
                let data = buf.load(pixel, total_bytes);
                for n in Replay::new(total_bytes, data.len()) {
                    self.spi.write(&data[..n]).map_err(Error::Spi)?;
                }
            }
            FillTier::Persistent => {
                let data = self.fill_buf.load(pixel, total_bytes);
                for n in Replay::new(total_bytes, data.len()) {
                    self.spi.write(&data[..n]).map_err(Error::Spi)?;
                }
            }
        }
        Ok(())
    }

    // arbitrary pixel stream into an in-bounds window, batched through
    // the persistent buffer; stops early if `colors` runs dry
    fn stream_window<I>(&mut self, win: Window, colors: I) -> Result<(), DriverError<SPI, PinE>>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        self.set_window(win)?;

        let mut colors = colors.into_iter();
        let mut remaining = win.pixel_count() as usize;
        while remaining > 0 {
            let want = remaining.min(PERSISTENT_BUF_SIZE / BYTES_PER_PIXEL);
            let mut got = 0;
            for (slot, color) in self
                .fill_buf
                .raw_mut()
                .chunks_exact_mut(BYTES_PER_PIXEL)
                .take(want)
                .zip(colors.by_ref())
            {
                slot.copy_from_slice(&rgb565_raw(color).to_be_bytes());
                got += 1;
            }
            if got > 0 {
                let data = &self.fill_buf.raw()[..got * BYTES_PER_PIXEL];
                self.spi.write(data).map_err(Error::Spi)?;
            }
            if got < want {
                break;
            }
            remaining -= got;
        }
        Ok(())
    }

    // ── Panel control ───────────────────────────────────────

    pub fn enable_backlight(&mut self, enable: bool) -> Result<(), DriverError<SPI, PinE>> {
        if enable {
            self.bl.set_high().map_err(Error::Pin)
        } else {
            self.bl.set_low().map_err(Error::Pin)
        }
    }

    /// Enter or leave sleep mode. RAM content survives sleep; the panel
    /// shows nothing while asleep.
    pub fn sleep<D: DelayNs>(
        &mut self,
        enter: bool,
        delay: &mut D,
    ) -> Result<(), DriverError<SPI, PinE>> {
        if enter {
            self.transaction(|d| d.send_command(cmd::SLPIN, &[]))?;
            delay.delay_ms(SLEEP_IN_MS);
        } else {
            self.transaction(|d| d.send_command(cmd::SLPOUT, &[]))?;
            // the controller needs 120ms before SLPIN again; only the
            // short command lockout is waited out here
            delay.delay_ms(WAKE_MS);
        }
        debug!("st7789: sleep {}", enter);
        Ok(())
    }

    pub fn invert_colors(&mut self, invert: bool) -> Result<(), DriverError<SPI, PinE>> {
        let opcode = if invert { cmd::INVON } else { cmd::INVOFF };
        self.transaction(|d| d.send_command(opcode, &[]))
    }

    /// Raw display brightness (WRDISBV), 0..=255.
    pub fn set_brightness(&mut self, level: u8) -> Result<(), DriverError<SPI, PinE>> {
        self.transaction(|d| d.send_command(cmd::WRDISBV, &[level]))
    }

    /// Brightness in percent; values above 100 are clamped to 100.
    pub fn set_brightness_percent(&mut self, percent: u8) -> Result<(), DriverError<SPI, PinE>> {
        self.set_brightness(percent_to_level(percent))
    }

    /// Give back the bus and control lines.
    pub fn release(self) -> (SPI, RST, DC, CS, BL) {
        (self.spi, self.rst, self.dc, self.cs, self.bl)
    }

    // ── Low-level SPI ───────────────────────────────────────

    // one CS bracket around `f`; CS is released on every path and the
    // window cache is dropped if the bus failed mid-stream
    fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, DriverError<SPI, PinE>>,
    ) -> Result<R, DriverError<SPI, PinE>> {
        self.start_write()?;
        let res = f(self);
        if res.as_ref().is_err_and(|e| e.is_transport()) {
            self.last_window = None;
        }
        let end = self.end_write();
        let out = res?;
        end?;
        Ok(out)
    }

    fn start_write(&mut self) -> Result<(), DriverError<SPI, PinE>> {
        self.cs.set_low().map_err(Error::Pin)
    }

    fn end_write(&mut self) -> Result<(), DriverError<SPI, PinE>> {
        let flushed = self.spi.flush().map_err(Error::Spi);
        self.cs.set_high().map_err(Error::Pin)?;
        flushed
    }

    // DC low for the opcode, DC high for data; DC is left high so pixel
    // data can follow RAMWR directly. Block writes may still be in flight,
    // so the bus is drained before each DC edge.
    fn send_command(&mut self, opcode: u8, data: &[u8]) -> Result<(), DriverError<SPI, PinE>> {
        self.spi.flush().map_err(Error::Spi)?;
        self.dc.set_low().map_err(Error::Pin)?;
        self.transfer_byte(opcode)?;
        self.spi.flush().map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Pin)?;
        for &b in data {
            self.transfer_byte(b)?;
        }
        Ok(())
    }

    #[inline]
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, DriverError<SPI, PinE>> {
        let mut word = [byte];
        self.spi.transfer_in_place(&mut word).map_err(Error::Spi)?;
        Ok(word[0])
    }
}

/// Clamp-at-boundary mapping of 0..=100 % onto 0..=255.
pub const fn percent_to_level(percent: u8) -> u8 {
    let p = if percent > 100 { 100 } else { percent } as u16;
    ((p * 255 + 50) / 100) as u8
}

// ── embedded-graphics ───────────────────────────────────────

impl<SPI, RST, DC, CS, BL, PinE> OriginDimensions for St7789<SPI, RST, DC, CS, BL>
where
    SPI: SpiBus,
    RST: OutputPin<Error = PinE>,
    DC: OutputPin<Error = PinE>,
    CS: OutputPin<Error = PinE>,
    BL: OutputPin<Error = PinE>,
{
    fn size(&self) -> Size {
        let (w, h) = self.reported_size();
        Size::new(w as u32, h as u32)
    }
}

impl<SPI, RST, DC, CS, BL, PinE> DrawTarget for St7789<SPI, RST, DC, CS, BL>
where
    SPI: SpiBus,
    RST: OutputPin<Error = PinE>,
    DC: OutputPin<Error = PinE>,
    CS: OutputPin<Error = PinE>,
    BL: OutputPin<Error = PinE>,
{
    type Color = Rgb565;
    type Error = DriverError<SPI, PinE>;

    // clipped per DrawTarget convention; one bracket for the whole batch
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.reported_size();
        self.transaction(|d| {
            for Pixel(p, color) in pixels {
                if p.x < 0 || p.y < 0 || p.x >= w as i32 || p.y >= h as i32 {
                    continue;
                }
                let win = Window {
                    x: p.x as u16,
                    y: p.y as u16,
                    w: 1,
                    h: 1,
                };
                d.fill_window(win, rgb565_raw(color))?;
            }
            Ok(())
        })
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.size == Size::zero() {
            return Ok(());
        }
        if clipped != *area {
            // partially visible: fall back to per-pixel clipping
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(p, c)| Pixel(p, c)),
            );
        }

        let win = Window {
            x: area.top_left.x as u16,
            y: area.top_left.y as u16,
            w: area.size.width as u16,
            h: area.size.height as u16,
        };
        self.transaction(|d| d.stream_window(win, colors))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.size == Size::zero() {
            return Ok(());
        }
        let win = Window {
            x: clipped.top_left.x as u16,
            y: clipped.top_left.y as u16,
            w: clipped.size.width as u16,
            h: clipped.size.height as u16,
        };
        self.transaction(|d| d.fill_window(win, rgb565_raw(color)))
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen_raw(rgb565_raw(color))
    }
}
