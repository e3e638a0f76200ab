//! Front-end configuration.

use crate::input::Buttons;
use std::path::PathBuf;
use varvara::SAMPLE_FREQUENCY;

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: u16 = 320;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: u16 = 240;
/// Stereo frames per audio buffer.
pub const AUDIO_BUFFER_FRAMES: usize = 2048;

/// One candidate location for the program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootEntry {
    /// Image path.
    pub path: PathBuf,
    /// Directory to make current once this image is chosen.
    pub workdir: Option<PathBuf>,
}

impl BootEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            workdir: None,
        }
    }

    pub fn in_dir(path: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            workdir: Some(workdir.into()),
        }
    }
}

/// Host-side settings for one emulator instance.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Audio output rate in Hz.
    pub sample_rate: u32,
    /// Stereo frames per audio buffer.
    pub buffer_frames: usize,
    /// Screen width written to the screen device at boot.
    pub screen_width: u16,
    /// Screen height written to the screen device at boot.
    pub screen_height: u16,
    /// Boot image locations, tried in order.
    pub boot_entries: Vec<BootEntry>,
    /// Buttons that quit when all held together.
    pub quit_chord: Buttons,
    /// Buttons that toggle which screen shows the program.
    pub swap_buttons: Buttons,
}

impl HostConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_buffer_frames(mut self, buffer_frames: usize) -> Self {
        self.buffer_frames = buffer_frames;
        self
    }

    pub fn with_screen_size(mut self, width: u16, height: u16) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_boot_entries(mut self, entries: Vec<BootEntry>) -> Self {
        self.boot_entries = entries;
        self
    }

    /// Audio buffer length in samples (two per stereo frame).
    pub fn buffer_samples(&self) -> usize {
        self.buffer_frames * 2
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_FREQUENCY,
            buffer_frames: AUDIO_BUFFER_FRAMES,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            boot_entries: vec![
                BootEntry::in_dir("romfs:/boot.rom", "romfs:/"),
                BootEntry::new("boot.rom"),
                BootEntry::in_dir("/uxn/boot.rom", "/uxn"),
                BootEntry::in_dir("/uxn/launcher.rom", "/uxn"),
            ],
            quit_chord: Buttons::L | Buttons::R | Buttons::START | Buttons::SELECT,
            swap_buttons: Buttons::L | Buttons::R,
        }
    }
}
