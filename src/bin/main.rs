// st7789-demo entry point
//
// Boot sequence: clocks -> board -> configure panel -> demo passes
// Passes: solid colors, rectangles and lines, all four rotations,
// embedded-graphics primitives, fill throughput; then blinks primaries
// forever.
//
// Any display error is logged and the demo halts; there is nothing to
// recover on a panel that stopped answering.

#![no_std]
#![no_main]

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use embedded_hal::delay::DelayNs;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::time::Instant;
use log::{error, info};

use lilygo_st7789::board::{Board, Display, DisplayError, pins};
use lilygo_st7789::{Config, Rgba, Rotation};

esp_bootloader_esp_idf::esp_app_desc!();

const PALETTE: [(&str, Rgba); 8] = [
    ("red", Rgba::RED),
    ("green", Rgba::GREEN),
    ("blue", Rgba::BLUE),
    ("white", Rgba::WHITE),
    ("black", Rgba::BLACK),
    ("yellow", Rgba::YELLOW),
    ("cyan", Rgba::CYAN),
    ("magenta", Rgba::MAGENTA),
];

const THROUGHPUT_ROUNDS: u32 = 10;
const SMALL_RECTS: i32 = 100;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");
    info!(
        "tft: sck={} mosi={} cs={} dc={} rst={} bl={}",
        pins::SPI_SCK,
        pins::SPI_MOSI,
        pins::TFT_CS,
        pins::TFT_DC,
        pins::TFT_RST,
        pins::TFT_BL
    );

    let mut board = match Board::init(peripherals) {
        Ok(board) => board,
        Err(e) => {
            error!("board init failed: {:?}", e);
            halt();
        }
    };

    if let Err(e) = board.display.configure(&Config::default(), &mut board.delay) {
        error!("{}", e);
        halt();
    }
    info!("display ready.");

    if let Err(e) = run(&mut board.display, &mut board.delay) {
        error!("demo stopped: {}", e);
    }
    halt();
}

fn run(display: &mut Display, delay: &mut Delay) -> Result<(), DisplayError> {
    basic_colors(display, delay)?;
    geometry(display, delay)?;
    rotations(display, delay)?;
    primitives(display, delay)?;
    throughput(display)?;

    info!("blinking...");
    loop {
        for color in [Rgba::RED, Rgba::GREEN, Rgba::BLUE] {
            display.fill_screen(color)?;
            delay.delay_ms(200);
        }
    }
}

fn basic_colors(display: &mut Display, delay: &mut Delay) -> Result<(), DisplayError> {
    info!("colors...");
    for (name, color) in PALETTE {
        info!("  {}", name);
        display.fill_screen(color)?;
        delay.delay_ms(1000);
    }
    Ok(())
}

fn geometry(display: &mut Display, delay: &mut Delay) -> Result<(), DisplayError> {
    info!("geometry...");
    display.fill_screen(Rgba::BLACK)?;

    let (w, h) = display.reported_size();
    let (w, h) = (w as i32, h as i32);
    info!("  size {}x{}", w, h);

    // three swatches across the top, two stripes below
    let rect_w = w / 4;
    display.fill_rectangle(10, 10, rect_w, 50, Rgba::RED)?;
    display.fill_rectangle(10 + rect_w + 10, 10, rect_w, 50, Rgba::GREEN)?;
    display.fill_rectangle(10 + 2 * (rect_w + 10), 10, rect_w, 50, Rgba::BLUE)?;
    display.fill_rectangle(10, 70, w - 20, 30, Rgba::YELLOW)?;
    display.fill_rectangle(10, 110, w - 20, 30, Rgba::WHITE)?;

    display.draw_fast_hline(0, w - 1, 150, Rgba::CYAN)?;
    display.draw_fast_vline(w / 2, 160, h - 1, Rgba::MAGENTA)?;

    delay.delay_ms(3000);
    Ok(())
}

fn rotations(display: &mut Display, delay: &mut Delay) -> Result<(), DisplayError> {
    info!("rotations...");
    for turns in 0..4 {
        let rotation = Rotation::from_quarter_turns(turns);
        info!("  {} degrees", rotation.degrees());
        display.set_rotation(rotation)?;
        display.fill_screen(Rgba::BLACK)?;

        // red marks the logical origin, green the far corner
        let (w, h) = display.reported_size();
        let (w, h) = (w as i32, h as i32);
        display.fill_rectangle(0, 0, w / 4, h / 4, Rgba::RED)?;
        display.fill_rectangle(3 * w / 4, 3 * h / 4, w / 4, h / 4, Rgba::GREEN)?;

        delay.delay_ms(2000);
    }
    display.set_rotation(Rotation::Deg0)
}

fn primitives(display: &mut Display, delay: &mut Delay) -> Result<(), DisplayError> {
    info!("primitives...");
    display.clear(Rgb565::BLACK)?;

    Circle::new(Point::new(20, 20), 80)
        .into_styled(PrimitiveStyle::with_stroke(Rgb565::YELLOW, 3))
        .draw(display)?;
    Rectangle::new(Point::new(120, 40), Size::new(100, 60))
        .into_styled(PrimitiveStyle::with_fill(Rgb565::BLUE))
        .draw(display)?;
    // partly off-screen; clipped by the driver
    Circle::new(Point::new(180, 260), 120)
        .into_styled(PrimitiveStyle::with_fill(Rgb565::MAGENTA))
        .draw(display)?;
    Text::new(
        "LilyGo ST7789",
        Point::new(20, 150),
        MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE),
    )
    .draw(display)?;

    delay.delay_ms(2000);
    Ok(())
}

fn throughput(display: &mut Display) -> Result<(), DisplayError> {
    info!("throughput...");
    let (w, h) = display.reported_size();

    let start = Instant::now();
    for _ in 0..THROUGHPUT_ROUNDS {
        display.fill_screen(Rgba::RED)?;
        display.fill_screen(Rgba::GREEN)?;
        display.fill_screen(Rgba::BLUE)?;
    }
    let fills = THROUGHPUT_ROUNDS * 3;
    let ms = start.elapsed().as_millis().max(1);
    let bytes = fills as u64 * w as u64 * h as u64 * 2;
    info!(
        "  {} screen fills in {}ms ({}ms each, {} KB/s)",
        fills,
        ms,
        ms / fills as u64,
        bytes / ms
    );

    display.fill_screen(Rgba::BLACK)?;
    let (wi, hi) = (w as i32, h as i32);
    let start = Instant::now();
    for i in 0..SMALL_RECTS {
        let x = (i * 3) % (wi - 10);
        let y = (i * 2) % (hi - 10);
        display.fill_rectangle(x, y, 10, 10, Rgba::RED)?;
    }
    info!(
        "  {} small rectangles in {}ms",
        SMALL_RECTS,
        start.elapsed().as_millis()
    );

    let stats = display.color_cache().stats();
    info!("  color cache: {} hits, {} misses", stats.hits, stats.misses);
    Ok(())
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
