//! This crate drives a JTAG bus through the SimpleLink FPGA ip-core.  The ip-core exposes TCK,
//! TMS, TDI and TRST, and samples the bus back, through one 32-bit control register that the
//! processor sees in physical memory.  The driver maps that register through `/dev/mem` and
//! toggles the lines in software.
//!
//! At the lowest level, `mem::RegisterView` is a mapped window over the ip-core with volatile
//! access to the control register, and `signal` describes where each line lives in it.
//! `RegisterView` implements the `Bitbang` trait: sample the input line, drive TCK/TMS/TDI, and
//! drive TRST.
//!
//! `cable::simplelink::SimpleLink` owns the mapping.  It takes the base address from a
//! `simplelink_baseaddr` style command, maps the window on `start` and unmaps it on `stop`, and
//! cleans up after itself if `start` fails.  While it is running, its JTAG lines can be
//! borrowed and handed to whatever clocks the bus.
//!
//! `cable::bitbang::BitbangCable` is one such user: it implements the `Cable` trait (TMS
//! sequences, shifting data in and out) on top of any `Bitbang` adapter.
//!
//! # Example
//! ```no_run
//! use simplelink_jtag::cable::Cable;
//! use simplelink_jtag::cable::bitbang::{BitbangCable, StdDelay};
//! use simplelink_jtag::cable::simplelink::SimpleLink;
//!
//! let mut link = SimpleLink::new();
//! link.configure(&["0x43c00000"]).expect("baseaddr");
//! link.start().expect("start");
//!
//! let lines = link.bitbang().expect("mapped");
//! let mut cable = BitbangCable::new(1000, lines, StdDelay);
//! // Test-Logic-Reset, then Run-Test/Idle
//! cable.change_mode(&[1, 1, 1, 1, 1, 0], true);
//!
//! link.stop();
//! ```

pub mod cable;
pub mod config;
pub mod error;
pub mod mem;
pub mod signal;
