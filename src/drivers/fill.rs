// Solid-fill transfer tiers.
//
// Bus cost is dominated by per-transfer overhead, so identical pixels are
// batched. Batch size follows the amount of work: filling a 4KB buffer for
// a 4-pixel fill costs more than it saves.
//
//   <= 500 px      direct, one transfer per byte
//   501..=2000 px  512B stack buffer, replayed
//   > 2000 px      4KB buffer owned by the driver, replayed

pub const DIRECT_MAX_PIXELS: u32 = 500;
pub const TRANSIENT_MAX_PIXELS: u32 = 2000;

pub const TRANSIENT_BUF_SIZE: usize = 512; // 256 px
pub const PERSISTENT_BUF_SIZE: usize = 4096; // 2048 px

pub const BYTES_PER_PIXEL: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillTier {
    Direct,
    Transient,
    Persistent,
}

impl FillTier {
    pub const fn for_pixels(pixels: u32) -> Self {
        if pixels > TRANSIENT_MAX_PIXELS {
            FillTier::Persistent
        } else if pixels > DIRECT_MAX_PIXELS {
            FillTier::Transient
        } else {
            FillTier::Direct
        }
    }
}

/// Byte buffer holding a repeated RGB565 pattern.
pub struct PatternBuffer<const N: usize> {
    buf: [u8; N],
}

impl<const N: usize> Default for PatternBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PatternBuffer<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N] }
    }

    /// Fill `min(N, total_bytes)` bytes with `pixel` and return them.
    pub fn load(&mut self, pixel: [u8; 2], total_bytes: usize) -> &[u8] {
        // keep whole pixels only
        let len = total_bytes.min(N) & !1;
        for px in self.buf[..len].chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&pixel);
        }
        &self.buf[..len]
    }

    pub fn raw(&self) -> &[u8; N] {
        &self.buf
    }

    pub fn raw_mut(&mut self) -> &mut [u8; N] {
        &mut self.buf
    }
}

/// Chunk lengths that replay a `chunk`-byte buffer until `total` bytes
/// have been produced. The last chunk may be short.
#[derive(Clone, Copy, Debug)]
pub struct Replay {
    remaining: usize,
    chunk: usize,
}

impl Replay {
    pub const fn new(total: usize, chunk: usize) -> Self {
        Self {
            remaining: if chunk == 0 { 0 } else { total },
            chunk,
        }
    }
}

impl Iterator for Replay {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.chunk.min(self.remaining);
        self.remaining -= n;
        Some(n)
    }
}
