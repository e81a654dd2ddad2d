// ST7789 command registers (system function + panel function tables)
// plus the LilyGo extended set used by the init sequence.

// ── System function commands ────────────────────────────────

pub const NOP: u8 = 0x00;
pub const SWRESET: u8 = 0x01;
pub const RDDID: u8 = 0x04;
pub const RDDST: u8 = 0x09;
pub const SLPIN: u8 = 0x10;
pub const SLPOUT: u8 = 0x11;
pub const PTLON: u8 = 0x12;
pub const NORON: u8 = 0x13;
pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;
pub const CASET: u8 = 0x2A;
pub const RASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const RAMRD: u8 = 0x2E;
pub const PTLAR: u8 = 0x30;
pub const VSCRDEF: u8 = 0x33;
pub const MADCTL: u8 = 0x36;
pub const VSCRSADD: u8 = 0x37;
pub const COLMOD: u8 = 0x3A;
pub const GSCAN: u8 = 0x45;

// brightness
pub const WRDISBV: u8 = 0x51;
pub const WRCTRLD: u8 = 0x53;
pub const WRCABC: u8 = 0x55;

pub const RDID1: u8 = 0xDA;
pub const RDID2: u8 = 0xDB;
pub const RDID3: u8 = 0xDC;
pub const RDID4: u8 = 0xDD;

// ── Panel function commands ─────────────────────────────────

pub const PORCTRL: u8 = 0xB2;
pub const GCTRL: u8 = 0xB7;
pub const VCOMS: u8 = 0xBB;
pub const LCMCTRL: u8 = 0xC0;
pub const VDVVRHEN: u8 = 0xC2;
pub const VRHS: u8 = 0xC3;
pub const VDVS: u8 = 0xC4;
pub const FRCTRL2: u8 = 0xC6;
pub const PWCTRL1: u8 = 0xD0;
pub const PVGAMCTRL: u8 = 0xE0;
pub const NVGAMCTRL: u8 = 0xE1;

// ── MADCTL bits ─────────────────────────────────────────────

pub const MADCTL_MY: u8 = 0x80; // row address order (Y mirror)
pub const MADCTL_MX: u8 = 0x40; // column address order (X mirror)
pub const MADCTL_MV: u8 = 0x20; // row/column exchange
pub const MADCTL_ML: u8 = 0x10;
pub const MADCTL_BGR: u8 = 0x08;
pub const MADCTL_MH: u8 = 0x04;

// ── COLMOD values ───────────────────────────────────────────

pub const COLOR_RGB444: u8 = 0b011;
pub const COLOR_RGB565: u8 = 0b101;
pub const COLOR_RGB666: u8 = 0b111;

/// 65K RGB interface + 16 bit/pixel control interface.
pub const COLMOD_16BIT: u8 = (COLOR_RGB565 << 4) | COLOR_RGB565;

// FRCTRL2 value for 60 Hz (controller default)
pub const FRAMERATE_60: u8 = 0x0F;

pub const MAX_VSYNC_SCANLINES: u16 = 254;
