//! Implement the `Cable` trait on top of any adapter that can drive the JTAG lines one clock edge
//! at a time.
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::cable::{Bitbang, Cable};

/// `DelayNs` backed by `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        if ns > 0 {
            thread::sleep(Duration::from_nanos(ns.into()));
        }
    }
}

pub struct BitbangCable<B, Delay>
where
    B: Bitbang,
    Delay: DelayNs,
{
    half_period: u32,
    delay: Delay,
    lines: B,
    // Last values driven, so the clock can be parked low without glitching TMS/TDI
    tms: bool,
    tdi: bool,
}

impl<B, Delay> BitbangCable<B, Delay>
where
    B: Bitbang,
    Delay: DelayNs,
{
    pub fn new(freq_khz: u32, lines: B, delay: Delay) -> Self {
        let period_ns = 1_000_000 / freq_khz.max(1);
        let half_period = period_ns / 2;
        Self {
            half_period,
            delay,
            lines,
            tms: false,
            tdi: false,
        }
    }

    /// Assert or release TRST.  Adapters with a system reset line are left alone.
    pub fn reset_tap(&mut self, trst: bool) {
        self.lines.reset(trst, false);
    }

    pub fn into_inner(self) -> B {
        self.lines
    }

    // One full clock: TMS/TDI set up with TCK low, TDO sampled, rising edge
    fn clock(&mut self, tms: bool, tdi: bool) -> bool {
        self.tms = tms;
        self.tdi = tdi;
        self.lines.write(false, tms, tdi);
        self.delay.delay_ns(self.half_period);
        let tdo = self.lines.read();
        self.lines.write(true, tms, tdi);
        self.delay.delay_ns(self.half_period);
        tdo
    }

    // Leave TCK low between operations
    fn idle(&mut self) {
        self.lines.write(false, self.tms, self.tdi);
    }
}

impl<B, Delay> Cable for BitbangCable<B, Delay>
where
    B: Bitbang,
    Delay: DelayNs,
{
    fn change_mode(&mut self, tms: &[usize], tdo: bool) {
        for d in tms {
            self.clock(*d != 0, tdo);
        }
        self.idle();
    }

    fn read_data(&mut self, bits: usize) -> Vec<u8> {
        let mut buf = vec![0; bits.div_ceil(8)];
        for i in 0..bits {
            let bit = self.clock(false, true) as u8;
            buf[i / 8] |= bit << (i % 8);
        }
        self.idle();
        buf
    }

    fn write_data(&mut self, data: &[u8], bits: u8, pause_after: bool) {
        self.read_write_data(data, bits, pause_after);
    }

    fn read_write_data(&mut self, data: &[u8], bits: u8, pause_after: bool) -> Vec<u8> {
        assert!(bits <= 8);
        assert!(bits != 0);
        assert!(!data.is_empty());

        let total = (data.len() - 1) * 8 + bits as usize;
        let mut out_buffer = vec![0; data.len()];

        for i in 0..total {
            let tdi = (data[i / 8] >> (i % 8)) & 1 == 1;
            // TMS high on the final bit moves to Exit1
            let tms = pause_after && i == total - 1;
            let tdo = self.clock(tms, tdi) as u8;
            out_buffer[i / 8] |= tdo << (i % 8);
        }

        if pause_after {
            // Exit1 -> Pause
            let tdi = self.tdi;
            self.clock(false, tdi);
        }
        self.idle();
        out_buffer
    }
}
