//! Boot image resolution.

use crate::config::BootEntry;
use crate::error::{EmuError, Result};
use std::io;
use std::path::Path;
use varvara::VmCore;

/// Source of program images.
pub trait RomStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads images from the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRomStore;

impl RomStore for FsRomStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Load the first image in `entries` that reads and loads.
///
/// # Errors
///
/// `BootImageMissing` listing every path tried when none succeeds.
pub fn load_boot_image<'a>(
    vm: &mut dyn VmCore,
    store: &dyn RomStore,
    entries: &'a [BootEntry],
) -> Result<&'a BootEntry> {
    for entry in entries {
        match store.read(&entry.path) {
            Ok(image) if vm.load(&image) => {
                tracing::info!(path = %entry.path.display(), bytes = image.len(), "boot image loaded");
                return Ok(entry);
            }
            Ok(image) => {
                tracing::warn!(path = %entry.path.display(), bytes = image.len(), "boot image rejected");
            }
            Err(err) => {
                tracing::warn!(path = %entry.path.display(), error = %err, "boot image unavailable");
            }
        }
    }
    let tried = entries.iter().map(|e| e.path.clone()).collect();
    let err = EmuError::BootImageMissing { tried };
    tracing::error!("{err}");
    Err(err)
}
