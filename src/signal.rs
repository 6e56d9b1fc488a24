//! Bit layout of the SimpleLink control register.
//!
//! Writes put TCK, TMS and TDI in the top three bits and leave everything else zero.  TRST sits
//! just below them in bit 28 and is only ever changed by a read-modify-write.  The line the
//! driver samples comes back in bit 0.  Read and write positions differ on purpose: the ip-core
//! multiplexes them inside the one register.
use crate::cable::Bitbang;
use crate::mem::RegisterView;

pub const TCK: u32 = 1 << 31;
pub const TMS: u32 = 1 << 30;
pub const TDI: u32 = 1 << 29;
pub const TRST: u32 = 1 << 28;
/// Sampled input line.
pub const SAMPLE: u32 = 1;

/// Register value driving the given lines.  TRST is cleared.
pub fn encode_lines(tck: bool, tms: bool, tdi: bool) -> u32 {
    (u32::from(tck) << 31) | (u32::from(tms) << 30) | (u32::from(tdi) << 29)
}

pub fn decode_sample(value: u32) -> bool {
    value & SAMPLE != 0
}

/// `value` with the TRST bit set or cleared, every other bit kept.
pub fn apply_trst(value: u32, trst: bool) -> u32 {
    if trst {
        value | TRST
    } else {
        value & !TRST
    }
}

impl Bitbang for RegisterView {
    fn read(&mut self) -> bool {
        decode_sample(self.read_control())
    }

    fn write(&mut self, tck: bool, tms: bool, tdi: bool) {
        let value = encode_lines(tck, tms, tdi);
        log::trace!("simplelink write {:#010x}", value);
        self.write_control(value);
    }

    fn reset(&mut self, trst: bool, _srst: bool) {
        // No system reset line on this ip-core
        let value = apply_trst(self.read_control(), trst);
        log::trace!("simplelink reset trst={} -> {:#010x}", trst, value);
        self.write_control(value);
    }
}
