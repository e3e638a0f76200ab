//! Error types for the console front-end.
//!
//! Only start-up can fail. Once the frame loop is running there is no
//! recoverable error path: device reactions report failure through their own
//! registers and the bus never rejects an access.

use std::path::PathBuf;
use thiserror::Error;
use varvara::DeviceError;

pub type Result<T> = std::result::Result<T, EmuError>;

/// Fatal front-end errors. None of these are retried.
#[derive(Debug, Error)]
pub enum EmuError {
    /// A hardware subsystem failed to initialise.
    #[error("{subsystem} init failed: {reason}")]
    FatalInit {
        subsystem: &'static str,
        reason: String,
    },

    /// No program image could be loaded from any known location.
    #[error("no boot image found (tried {})", display_paths(.tried))]
    BootImageMissing { tried: Vec<PathBuf> },

    /// Device table could not be assembled.
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_image_missing_lists_paths() {
        let err = EmuError::BootImageMissing {
            tried: vec![PathBuf::from("boot.rom"), PathBuf::from("/uxn/boot.rom")],
        };
        assert_eq!(
            err.to_string(),
            "no boot image found (tried boot.rom, /uxn/boot.rom)"
        );
    }

    #[test]
    fn test_fatal_init_message() {
        let err = EmuError::FatalInit {
            subsystem: "audio",
            reason: "zero-length buffer".into(),
        };
        assert_eq!(err.to_string(), "audio init failed: zero-length buffer");
    }
}
