//! A window of physical memory mapped into the process, used to reach the SimpleLink register
//! bank.  The ip-core lays out five 32-bit slots (tck, tms, tdi, tdo, trst) but only the first
//! one is wired up as the control register, so that is the only one `RegisterView` exposes.
use std::ffi::c_void;
use std::fs::OpenOptions;
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::ptr::{self, NonNull};

use nix::fcntl::OFlag;
use nix::libc::off_t;
use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use nix::unistd::{sysconf, SysconfVar};

use crate::config::BaseAddress;
use crate::error::MappingError;

/// Device node giving access to physical memory.
pub const DEV_MEM: &str = "/dev/mem";

/// Size of the window the driver maps over the ip-core.
pub const WINDOW_SIZE: usize = 0xFFFF;

// Offset of the control register (the "tck" slot) inside the window
const CONTROL_OFFSET: usize = 0;
const REGISTER_SIZE: usize = core::mem::size_of::<u32>();

struct Mapping {
    // Start of the mapping, page aligned
    ptr: NonNull<c_void>,
    // Length handed to mmap
    len: usize,
    // Distance from `ptr` to the requested base address
    offset: usize,
}

/// Exclusive handle over a mapped register window.  The mapping is released by `release` or
/// when the view is dropped, whichever comes first.
pub struct RegisterView {
    mapping: Option<Mapping>,
    base: BaseAddress,
}

fn page_size() -> usize {
    sysconf(SysconfVar::PAGE_SIZE)
        .ok()
        .flatten()
        .and_then(|size| usize::try_from(size).ok())
        .unwrap_or(4096)
}

impl RegisterView {
    /// Map `size` bytes of physical memory starting at `base` through `/dev/mem`.
    ///
    /// Where `off_t` is 32 bits wide (32-bit ARM without large file support), bases at or above
    /// `0x8000_0000` cannot be passed to mmap and fail with `MappingError::AddressOutOfRange`.
    pub fn acquire(base: BaseAddress, size: usize) -> Result<Self, MappingError> {
        Self::acquire_from(DEV_MEM, base, size)
    }

    /// Map `size` bytes starting at offset `base` of the device node (or plain file) at `path`.
    /// A base that is not page aligned is mapped from the start of its page.
    pub fn acquire_from(
        path: impl AsRef<Path>,
        base: BaseAddress,
        size: usize,
    ) -> Result<Self, MappingError> {
        let path = path.as_ref();
        if size < CONTROL_OFFSET + REGISTER_SIZE {
            return Err(MappingError::WindowTooSmall { size });
        }
        if base.get() as usize % REGISTER_SIZE != 0 {
            return Err(MappingError::Misaligned(base));
        }

        log::debug!("Opening memory device: {}", path.display());
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_SYNC.bits())
            .open(path)
            .map_err(|source| MappingError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mapping_failed = |source: nix::Error| MappingError::Map {
            address: base,
            size,
            source,
        };

        let address = base.get() as usize;
        let offset = address % page_size();
        let map_base = off_t::try_from(address - offset)
            .map_err(|_| MappingError::AddressOutOfRange(base))?;
        let len = size
            .checked_add(offset)
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| mapping_failed(nix::Error::EOVERFLOW))?;

        log::debug!("Mapping {:#x} bytes at {} (page offset {:#x})", size, base, offset);
        // Safety: a fresh shared mapping chosen by the kernel aliases no Rust object.  The file
        // can be closed once the mapping exists.
        let ptr = unsafe {
            mmap(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &file,
                map_base,
            )
        }
        .map_err(mapping_failed)?;

        Ok(Self {
            mapping: Some(Mapping {
                ptr,
                len: len.get(),
                offset,
            }),
            base,
        })
    }

    /// Physical address the view starts at.
    pub fn base(&self) -> BaseAddress {
        self.base
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    fn control(&self) -> *mut u32 {
        let mapping = self
            .mapping
            .as_ref()
            .unwrap_or_else(|| panic!("register access on released window at {}", self.base));
        // Safety: acquire checked that the control register lies inside the mapping.
        unsafe {
            mapping
                .ptr
                .as_ptr()
                .cast::<u8>()
                .add(mapping.offset + CONTROL_OFFSET)
                .cast::<u32>()
        }
    }

    /// Read the control register.
    ///
    /// # Panics
    ///
    /// Panics if the view has been released.
    pub fn read_control(&self) -> u32 {
        // Safety: the pointer is aligned and valid for as long as the mapping exists.
        unsafe { ptr::read_volatile(self.control()) }
    }

    /// Write the control register.
    ///
    /// # Panics
    ///
    /// Panics if the view has been released.
    pub fn write_control(&mut self, value: u32) {
        // Safety: see read_control.  `&mut self` keeps writes exclusive.
        unsafe { ptr::write_volatile(self.control(), value) }
    }

    /// Unmap the window.  Releasing an already released view does nothing.
    pub fn release(&mut self) {
        let Some(mapping) = self.mapping.take() else {
            return;
        };

        log::debug!("Unmapping register window at {}", self.base);
        // Safety: the mapping came from mmap with this length and no reference into it
        // survives `&mut self`.
        if let Err(e) = unsafe { munmap(mapping.ptr, mapping.len) } {
            log::warn!("munmap of register window at {} failed: {}", self.base, e);
        }
    }
}

impl Drop for RegisterView {
    fn drop(&mut self) {
        self.release();
    }
}
