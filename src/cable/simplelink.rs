//! Driver for the SimpleLink FPGA JTAG ip-core.  The ip-core exposes the JTAG lines through a
//! single control register in physical memory, which the driver maps through `/dev/mem`.
//!
//! `SimpleLink` owns the mapping.  Once `start` succeeds, `bitbang` lends out `Lines`, which
//! implements `Bitbang` and nothing else, so it can be driven directly or wrapped in a
//! `BitbangCable`.  `stop` cannot be called while the lines are lent out.
use std::path::{Path, PathBuf};

use crate::cable::{AdapterInfo, Bitbang, Capability, Transport};
use crate::config::{self, BaseAddress, BASEADDR_COMMAND};
use crate::error::{ConfigError, InitError};
use crate::mem::{RegisterView, DEV_MEM, WINDOW_SIZE};

/// Where the adapter is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing configured yet; `start` would use the default base address.
    Unconfigured,
    Configured,
    /// The register window is mapped and usable.
    Mapped,
    /// `start` failed.  Nothing is held.
    FailedInit,
    /// Stopped after running or failing.  Final.
    Unmapped,
}

/// The JTAG lines of a running adapter.  Only the `Bitbang` primitives are reachable; the
/// mapping stays with `SimpleLink`.
///
/// ```compile_fail
/// use simplelink_jtag::cable::simplelink::SimpleLink;
///
/// let mut link = SimpleLink::new();
/// link.start().unwrap();
/// link.bitbang().unwrap().release();
/// ```
pub struct Lines<'a>(&'a mut RegisterView);

impl Bitbang for Lines<'_> {
    fn read(&mut self) -> bool {
        self.0.read()
    }

    fn write(&mut self, tck: bool, tms: bool, tdi: bool) {
        self.0.write(tck, tms, tdi)
    }

    fn reset(&mut self, trst: bool, srst: bool) {
        self.0.reset(trst, srst)
    }
}

pub struct SimpleLink {
    base: BaseAddress,
    device: PathBuf,
    view: Option<RegisterView>,
    state: State,
}

impl Default for SimpleLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleLink {
    pub const INFO: AdapterInfo = AdapterInfo {
        name: "simplelink",
        capabilities: &[Capability::TmsSequence],
        transports: &[Transport::Jtag],
        commands: &[BASEADDR_COMMAND],
    };

    /// Create an unconfigured adapter that maps the ip-core at its default address through
    /// `/dev/mem`.
    pub fn new() -> Self {
        Self::with_device(DEV_MEM)
    }

    /// Create an unconfigured adapter mapping from `device` instead of `/dev/mem`, for example a
    /// UIO node exposing the ip-core.
    pub fn with_device(device: impl Into<PathBuf>) -> Self {
        Self {
            base: BaseAddress::default(),
            device: device.into(),
            view: None,
            state: State::Unconfigured,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Base address the next `start` will map.
    pub fn base_address(&self) -> BaseAddress {
        self.base
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Set the base address used by the next `start`.  A running mapping is not moved.
    pub fn set_base_address(&mut self, base: BaseAddress) {
        self.base = base;
        match self.state {
            State::Unconfigured | State::Configured => self.state = State::Configured,
            State::Mapped => log::info!("SimpleLink baseaddr {} takes effect on next start", base),
            State::FailedInit | State::Unmapped => {}
        }
    }

    /// Handle the `simplelink_baseaddr` command.  Expects exactly one argument of the form
    /// `0xNNNNNNNN`.  On error the configured address is left as it was.
    pub fn configure(&mut self, args: &[&str]) -> Result<(), ConfigError> {
        let base = config::parse_baseaddr_args(args)?;
        self.set_base_address(base);
        Ok(())
    }

    /// Run a configuration command by name.
    pub fn handle_command(&mut self, name: &str, args: &[&str]) -> Result<(), ConfigError> {
        if name == BASEADDR_COMMAND.name {
            self.configure(args)
        } else {
            Err(ConfigError::UnknownCommand(name.to_string()))
        }
    }

    /// Map the register window.  On failure nothing stays mapped and the adapter is left in
    /// `State::FailedInit`.  Starting an adapter that is already mapped is refused and the
    /// existing mapping kept.
    pub fn start(&mut self) -> Result<(), InitError> {
        match self.state {
            State::Unconfigured | State::Configured => {}
            State::Mapped => return Err(InitError::AlreadyStarted),
            State::FailedInit | State::Unmapped => return Err(InitError::ShutDown),
        }

        log::info!("SimpleLink FPGA JTAG ip-core driver");
        match RegisterView::acquire_from(&self.device, self.base, WINDOW_SIZE) {
            Ok(view) => {
                self.view = Some(view);
                self.state = State::Mapped;
                log::info!("SimpleLink initialization complete");
                Ok(())
            }
            Err(e) => {
                log::info!("SimpleLink initialization error: {}", e);
                self.clean();
                self.state = State::FailedInit;
                Err(e.into())
            }
        }
    }

    /// Release the register window.  Always succeeds, and does nothing unless the adapter is
    /// mapped or failed to start.
    pub fn stop(&mut self) {
        match self.state {
            State::Mapped | State::FailedInit => {
                self.clean();
                self.state = State::Unmapped;
            }
            State::Unconfigured | State::Configured | State::Unmapped => {}
        }
    }

    fn clean(&mut self) {
        if let Some(mut view) = self.view.take() {
            view.release();
        }
    }

    /// The JTAG lines, for the code clocking the bus.  `None` unless the adapter is in
    /// `State::Mapped`.
    pub fn bitbang(&mut self) -> Option<Lines<'_>> {
        self.view.as_mut().map(Lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    use crate::error::MappingError;

    fn device(len: u64) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(len).unwrap();
        file
    }

    fn control(link: &SimpleLink) -> u32 {
        link.view.as_ref().unwrap().read_control()
    }

    fn adapter(dev: &NamedTempFile) -> SimpleLink {
        let mut link = SimpleLink::with_device(dev.path());
        link.configure(&["0x00000000"]).unwrap();
        link
    }

    #[test]
    fn declares_jtag_with_tms_sequences() {
        let info = SimpleLink::INFO;
        assert_eq!(info.name, "simplelink");
        assert_eq!(info.capabilities, &[Capability::TmsSequence]);
        assert_eq!(info.transports, &[Transport::Jtag]);
        assert_eq!(info.commands[0].name, "simplelink_baseaddr");
    }

    #[test]
    fn configure_round_trips() {
        let mut link = SimpleLink::new();
        assert_eq!(link.state(), State::Unconfigured);
        assert_eq!(link.base_address(), BaseAddress::DEFAULT);

        link.configure(&["0x12345678"]).unwrap();
        assert_eq!(link.base_address().get(), 0x1234_5678);
        assert_eq!(link.state(), State::Configured);

        link.handle_command("simplelink_baseaddr", &["0xabcdef00"]).unwrap();
        assert_eq!(link.base_address().get(), 0xabcd_ef00);
    }

    #[test]
    fn bad_configuration_keeps_previous_address() {
        let mut link = SimpleLink::new();
        assert!(link.configure(&["0xzz"]).is_err());
        assert_eq!(link.base_address(), BaseAddress::DEFAULT);
        assert_eq!(link.state(), State::Unconfigured);

        link.configure(&["0x40000000"]).unwrap();
        let rejected: [&[&str]; 4] = [&[], &["0x1", "0x2"], &["40000000"], &["0x123456789"]];
        for args in rejected {
            assert!(link.configure(args).is_err());
            assert_eq!(link.base_address().get(), 0x4000_0000);
        }
        assert_eq!(
            link.handle_command("simplelink_speed", &["1"]),
            Err(ConfigError::UnknownCommand("simplelink_speed".to_string()))
        );
    }

    #[test]
    fn stop_without_start_does_nothing() {
        let mut link = SimpleLink::new();
        link.stop();
        link.stop();
        assert_eq!(link.state(), State::Unconfigured);
        assert!(link.bitbang().is_none());
    }

    #[test]
    fn start_and_stop() {
        let dev = device(0x10000);
        let mut link = adapter(&dev);
        link.start().unwrap();
        assert_eq!(link.state(), State::Mapped);
        assert!(link.bitbang().is_some());

        link.stop();
        assert_eq!(link.state(), State::Unmapped);
        assert!(link.bitbang().is_none());
        link.stop();
        assert_eq!(link.state(), State::Unmapped);
    }

    #[test]
    fn second_start_is_refused() {
        let dev = device(0x10000);
        let mut link = adapter(&dev);
        link.start().unwrap();
        link.bitbang().unwrap().write(true, false, false);

        assert!(matches!(link.start(), Err(InitError::AlreadyStarted)));
        assert_eq!(link.state(), State::Mapped);
        // Same mapping, still holding what was written
        assert_eq!(control(&link), 0x8000_0000);
    }

    #[test]
    fn lent_lines_keep_the_mapping() {
        let dev = device(0x10000);
        let mut link = adapter(&dev);
        link.start().unwrap();

        {
            let mut lines = link.bitbang().unwrap();
            lines.write(false, true, true);
            lines.reset(true, true);
            assert!(!lines.read());
        }

        assert_eq!(link.state(), State::Mapped);
        assert!(link.view.as_ref().unwrap().is_mapped());
        assert_eq!(control(&link), 0x7000_0000);
        // Lines can be lent again after the previous borrow ends
        link.bitbang().unwrap().write(true, false, false);
        assert_eq!(control(&link), 0x8000_0000);

        link.stop();
        assert!(link.view.is_none());
    }

    #[test]
    fn reconfigure_while_mapped_keeps_mapping() {
        let dev = device(0x10000);
        let mut link = adapter(&dev);
        link.start().unwrap();
        link.configure(&["0x43c00000"]).unwrap();
        assert_eq!(link.state(), State::Mapped);
        assert_eq!(link.view.as_ref().unwrap().base(), BaseAddress::new(0));
    }

    #[test]
    fn failed_start_releases_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = SimpleLink::with_device(dir.path().join("missing"));
        match link.start() {
            Err(InitError::Mapping(MappingError::Open { .. })) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(link.state(), State::FailedInit);
        assert!(link.bitbang().is_none());
        assert!(matches!(link.start(), Err(InitError::ShutDown)));

        link.stop();
        assert_eq!(link.state(), State::Unmapped);
        link.stop();
        assert_eq!(link.state(), State::Unmapped);
    }

    #[test]
    fn end_to_end_at_default_address() {
        // Sparse file reaching past the ip-core's window
        let dev = device(0x43c0_0000 + 0x10000);
        let mut link = SimpleLink::with_device(dev.path());
        link.configure(&["0x43C00000"]).unwrap();
        link.start().unwrap();

        link.bitbang().unwrap().write(true, true, false);
        assert_eq!(control(&link) >> 29, 0b110);
        assert_eq!(control(&link), 0b1100_0000_0000_0000_0000_0000_0000_0000);

        link.bitbang().unwrap().reset(true, false);
        assert_eq!(control(&link), 0xd000_0000);

        link.stop();
        assert_eq!(link.state(), State::Unmapped);
        link.stop();
        assert_eq!(link.state(), State::Unmapped);
    }
}
