// RGBA8888 -> RGB565 conversion with a small LRU cache.
//
// Fills are usually repeated with a handful of palette colors, so the
// packed value is memoized. Capacity is fixed; the least recently used
// entry is evicted once it is full.

use embedded_graphics_core::pixelcolor::{IntoStorage, Rgb565, Rgb888, RgbColor};
use heapless::Vec;

pub const COLOR_CACHE_CAPACITY: usize = 16;

/// 32-bit input color. Alpha only participates in the cache key; the
/// controller has no blending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn key(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }
}

impl From<Rgb888> for Rgba {
    fn from(c: Rgb888) -> Self {
        Self::rgb(c.r(), c.g(), c.b())
    }
}

impl From<Rgb565> for Rgba {
    // widen 5/6-bit channels by replicating the high bits into the low ones
    fn from(c: Rgb565) -> Self {
        let (r, g, b) = (c.r(), c.g(), c.b());
        Self::rgb((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

/// Pack to the controller's native 5-6-5 layout, red in the high bits.
#[inline]
pub const fn pack_rgb565(c: Rgba) -> u16 {
    let r = (c.r as u16) >> 3;
    let g = (c.g as u16) >> 2;
    let b = (c.b as u16) >> 3;
    (r << 11) | (g << 5) | b
}

#[inline]
pub fn rgb565_raw(c: Rgb565) -> u16 {
    c.into_storage()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

pub struct ColorCache {
    // oldest first; a hit moves the entry to the back
    entries: Vec<(u32, u16), COLOR_CACHE_CAPACITY>,
    stats: CacheStats,
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorCache {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            stats: CacheStats { hits: 0, misses: 0 },
        }
    }

    /// Packed RGB565 for `c`, from the cache when possible.
    pub fn native(&mut self, c: Rgba) -> u16 {
        let key = c.key();

        if let Some(pos) = self.entries.iter().position(|&(k, _)| k == key) {
            self.stats.hits = self.stats.hits.wrapping_add(1);
            let entry = self.entries.remove(pos);
            let pushed = self.entries.push(entry);
            debug_assert!(pushed.is_ok(), "slot freed by remove");
            return entry.1;
        }

        self.stats.misses = self.stats.misses.wrapping_add(1);
        let packed = pack_rgb565(c);
        if self.entries.is_full() {
            let evicted = self.entries.remove(0);
            log::trace!("color cache: evict {:08x}", evicted.0);
        }
        let pushed = self.entries.push((key, packed));
        debug_assert!(pushed.is_ok(), "full cache evicts first");
        packed
    }

    pub fn contains(&self, c: Rgba) -> bool {
        let key = c.key();
        self.entries.iter().any(|&(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

}
