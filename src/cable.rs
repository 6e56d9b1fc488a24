//! JTAG adapters.  An adapter that drives the bus one clock edge at a time implements `Bitbang`;
//! `bitbang::BitbangCable` turns any such adapter into a `Cable` that shifts whole TMS sequences
//! and data registers.
use crate::config::Command;

pub mod bitbang;
pub mod simplelink;

pub trait Cable {
    /// Clock out a series of TMS values to change the state of the JTAG chain.  Each element of
    /// `tms` determines the value of the TMS line, zero for low and any other value for high.
    /// `tdo` controls the state of the TDI line during mode changes.
    fn change_mode(&mut self, tms: &[usize], tdo: bool);
    /// Shift in bits from the TDO line.  `bits` is the total number of bits to read.  Should be
    /// called with state = ShiftIR or ShiftDR, and will remain in that state.  Should clock out
    /// all ones.
    fn read_data(&mut self, bits: usize) -> Vec<u8>;
    /// Shift out bits on the TDI line.  `bits` is the number of bits to send from the last byte.
    /// Should be called with state = ShiftIR or ShiftDR.  State won't change unless `pause_after`
    /// is true, in which case it will be PauseIR or PauseDR on exit.
    fn write_data(&mut self, data: &[u8], bits: u8, pause_after: bool);

    fn read_write_data(&mut self, data: &[u8], bits: u8, pause_after: bool) -> Vec<u8>;
}

/// The three line-level primitives a bit-banging adapter offers to the code that clocks the
/// bus.  None of them can fail once the adapter is running.
pub trait Bitbang {
    /// Sample the adapter's input line.
    fn read(&mut self) -> bool;
    /// Drive TCK, TMS and TDI.
    fn write(&mut self, tck: bool, tms: bool, tdi: bool);
    /// Drive the TAP reset and system reset lines.  Adapters without one of them ignore it.
    fn reset(&mut self, trst: bool, srst: bool);
}

impl<B: Bitbang + ?Sized> Bitbang for &mut B {
    fn read(&mut self) -> bool {
        (**self).read()
    }

    fn write(&mut self, tck: bool, tms: bool, tdi: bool) {
        (**self).write(tck, tms, tdi)
    }

    fn reset(&mut self, trst: bool, srst: bool) {
        (**self).reset(trst, srst)
    }
}

/// Ways an adapter can clock the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Mode changes are driven as a sequence of TMS values.
    TmsSequence,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Jtag,
}

/// What an adapter declares to the framework that loads it.
#[derive(Clone, Copy, Debug)]
pub struct AdapterInfo {
    pub name: &'static str,
    pub capabilities: &'static [Capability],
    pub transports: &'static [Transport],
    pub commands: &'static [Command],
}
