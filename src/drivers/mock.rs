// Recording embedded-hal doubles for host tests.
//
// Bus, pins and delay all append to one shared trace so tests can check
// the interleaving of DC/CS edges, bytes and pauses.

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Rst,
    Dc,
    Cs,
    Bl,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Pin(Line, bool),
    /// Single-byte full-duplex transfer.
    Transfer(u8),
    /// Block write.
    Write(Vec<u8>),
    Flush,
    DelayMs(u32),
}

/// One command as seen by the controller: opcode plus data bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u8,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct State {
    ops: Vec<Op>,
    bytes_sent: usize,
    fail_at: Option<usize>,
}

#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<State>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.borrow().ops.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().ops.clear();
    }

    /// Make the bus fail once `n` bytes have gone out.
    pub fn fail_after_bytes(&self, n: usize) {
        let mut s = self.0.borrow_mut();
        s.fail_at = Some(s.bytes_sent + n);
    }

    pub fn level(&self, line: Line) -> Option<bool> {
        self.0.borrow().ops.iter().rev().find_map(|op| match op {
            Op::Pin(l, level) if *l == line => Some(*level),
            _ => None,
        })
    }

    /// Every byte on the wire, in order.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for op in self.0.borrow().ops.iter() {
            match op {
                Op::Transfer(b) => out.push(*b),
                Op::Write(bs) => out.extend_from_slice(bs),
                _ => {}
            }
        }
        out
    }

    pub fn delays(&self) -> Vec<u32> {
        self.0
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::DelayMs(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    /// Decode the trace into frames using the DC line. Panics if a byte
    /// goes out while CS is deasserted or before any opcode.
    pub fn frames(&self) -> Vec<Frame> {
        fn push(b: u8, dc: bool, cs: bool, frames: &mut Vec<Frame>) {
            assert!(!cs, "byte {:#04x} sent with CS high", b);
            if dc {
                frames
                    .last_mut()
                    .expect("data byte before any command")
                    .data
                    .push(b);
            } else {
                frames.push(Frame {
                    opcode: b,
                    data: Vec::new(),
                });
            }
        }

        let mut frames: Vec<Frame> = Vec::new();
        let mut dc = true;
        let mut cs = true;
        for op in self.0.borrow().ops.iter() {
            match op {
                Op::Pin(Line::Dc, level) => dc = *level,
                Op::Pin(Line::Cs, level) => cs = *level,
                Op::Transfer(b) => push(*b, dc, cs, &mut frames),
                Op::Write(bs) => {
                    for &b in bs {
                        push(b, dc, cs, &mut frames);
                    }
                }
                _ => {}
            }
        }
        frames
    }

    pub fn opcodes(&self) -> Vec<u8> {
        self.frames().iter().map(|f| f.opcode).collect()
    }

    /// (asserts, deasserts) of CS.
    pub fn cs_edges(&self) -> (usize, usize) {
        let ops = self.0.borrow();
        let low = ops
            .ops
            .iter()
            .filter(|op| **op == Op::Pin(Line::Cs, false))
            .count();
        let high = ops
            .ops
            .iter()
            .filter(|op| **op == Op::Pin(Line::Cs, true))
            .count();
        (low, high)
    }

    fn record(&self, op: Op) {
        self.0.borrow_mut().ops.push(op);
    }

    fn send(&self, n: usize) -> Result<(), MockSpiError> {
        let mut s = self.0.borrow_mut();
        if let Some(limit) = s.fail_at {
            if s.bytes_sent + n > limit {
                s.fail_at = None;
                return Err(MockSpiError);
            }
        }
        s.bytes_sent += n;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockSpiError;

impl spi::Error for MockSpiError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

pub struct MockSpi(pub Trace);

impl spi::ErrorType for MockSpi {
    type Error = MockSpiError;
}

impl SpiBus for MockSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0xFF);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.0.send(words.len())?;
        self.0.record(Op::Write(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        read.fill(0xFF);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for w in words.iter_mut() {
            self.0.send(1)?;
            self.0.record(Op::Transfer(*w));
            *w = 0xFF;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.record(Op::Flush);
        Ok(())
    }
}

pub struct MockPin {
    line: Line,
    trace: Trace,
}

impl MockPin {
    pub fn new(line: Line, trace: &Trace) -> Self {
        Self {
            line,
            trace: trace.clone(),
        }
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.record(Op::Pin(self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.record(Op::Pin(self.line, true));
        Ok(())
    }
}

pub struct MockDelay(pub Trace);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.record(Op::DelayMs(ns / 1_000_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.record(Op::DelayMs(us / 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.record(Op::DelayMs(ms));
    }
}
