// Rotation, reported size and window encoding.
//
// The controller does the logical->physical mapping itself once MADCTL is
// set, so windows are sent in logical (rotated) coordinates. Only the
// reported size has to be transposed here.

use super::cmd;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    // MX/MY/MV combinations fix which RAM direction is "right" and "down"
    // on screen for each rotation
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Deg0 => 0x00,
            Rotation::Deg90 => cmd::MADCTL_MX | cmd::MADCTL_MV,
            Rotation::Deg180 => cmd::MADCTL_MX | cmd::MADCTL_MY,
            Rotation::Deg270 => cmd::MADCTL_MY | cmd::MADCTL_MV,
        }
    }

    pub const fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Quarter turns modulo four.
    pub const fn from_quarter_turns(n: u8) -> Self {
        match n % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// (width, height) as seen by callers for a panel of `width`x`height`.
#[inline]
pub const fn reported_size(width: u16, height: u16, rotation: Rotation) -> (u16, u16) {
    if rotation.is_transposed() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Validated drawing window in controller coordinates. `w` and `h` are
/// never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Window {
    /// Accepts the rectangle only if it lies fully inside `bounds`.
    pub fn checked(x: i32, y: i32, w: i32, h: i32, bounds: (u16, u16)) -> Option<Self> {
        if x < 0 || y < 0 || w <= 0 || h <= 0 {
            return None;
        }
        let (bw, bh) = (bounds.0 as i64, bounds.1 as i64);
        if x as i64 + w as i64 > bw || y as i64 + h as i64 > bh {
            return None;
        }
        Some(Self {
            x: x as u16,
            y: y as u16,
            w: w as u16,
            h: h as u16,
        })
    }

    pub const fn pixel_count(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    #[inline]
    pub const fn x_end(&self) -> u16 {
        self.x + self.w - 1
    }

    #[inline]
    pub const fn y_end(&self) -> u16 {
        self.y + self.h - 1
    }

    /// CASET payload: start and end column, 16-bit big endian.
    pub const fn caset(&self) -> [u8; 4] {
        encode_range(self.x, self.x_end())
    }

    /// RASET payload: start and end row, 16-bit big endian.
    pub const fn raset(&self) -> [u8; 4] {
        encode_range(self.y, self.y_end())
    }
}

#[inline]
const fn encode_range(start: u16, end: u16) -> [u8; 4] {
    let s = start.to_be_bytes();
    let e = end.to_be_bytes();
    [s[0], s[1], e[0], e[1]]
}
