//! Configuration of the SimpleLink adapter: the physical base address of the ip-core and the
//! command table through which a front end sets it.
use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;

/// Physical address of the SimpleLink register bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BaseAddress(u32);

impl BaseAddress {
    /// Where the ip-core sits in the default Zynq design.
    pub const DEFAULT: BaseAddress = BaseAddress(0x43C0_0000);

    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for BaseAddress {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for BaseAddress {
    fn from(address: u32) -> Self {
        Self(address)
    }
}

impl fmt::Display for BaseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Parse `0x` followed by one to eight hex digits.  Anything else, including surrounding
/// whitespace, an upper case `0X` or trailing characters, is rejected.
impl FromStr for BaseAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidAddress(s.to_string());

        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u32::from_str_radix(digits, 16).map(Self).map_err(|_| invalid())
    }
}

/// A configuration command understood by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub usage: &'static str,
}

/// Sets the base address of the ip-core.
pub const BASEADDR_COMMAND: Command = Command {
    name: "simplelink_baseaddr",
    help: "baseaddr of the SimpleLink ip-core",
    usage: "e.g 0x43c00000",
};

/// Parse the arguments of `simplelink_baseaddr`.
pub fn parse_baseaddr_args(args: &[&str]) -> Result<BaseAddress, ConfigError> {
    match args {
        [address] => address.parse(),
        _ => Err(ConfigError::ArgumentCount {
            command: BASEADDR_COMMAND.name,
            count: args.len(),
        }),
    }
}
