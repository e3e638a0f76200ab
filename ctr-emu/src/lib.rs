//! # Handheld Console Front-End
//!
//! Binds the `varvara` device layer to a dual-screen handheld: buttons, touch
//! surface and soft keyboard in, stereo audio and two screens out.
//!
//! ## Architecture
//!
//! - **Input translation**: raw input is sampled once per frame and turned into
//!   edge-triggered controller and pointer events; a vector is evaluated only
//!   when something changed
//! - **Audio**: two output buffers alternate between the mixer and the hardware
//!   playback queue; the mixer runs in the completion context and shares the
//!   voices with the main context through one lock
//! - **Frame loop**: [`Emulator`] orders input, events, screen vector and
//!   redraw, and handles quit, halt and soft reset
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ctr_emu::{Emulator, FsRomStore, HostConfig};
//!
//! let mut emu = Emulator::new(core, HostConfig::default(), Box::new(FsRomStore))?;
//! let mut mixer = emu.mixer()?;
//! mixer.prime(&mut ndsp);
//! // hand `mixer` to the audio callback, then:
//! emu.run(&mut platform)?;
//! ```
//!
//! ## Module Organization
//!
//! - `config`: host settings and boot locations
//! - `input`: physical input sample types
//! - `system`: translators, mixer, boot resolution, frame scheduler
//! - `error`: fatal start-up errors

pub mod config;
pub mod error;
pub mod input;
pub mod system;

pub use config::{BootEntry, HostConfig, AUDIO_BUFFER_FRAMES, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::{EmuError, Result};
pub use input::{Buttons, InputSample, Key, KeyboardSample, TouchPoint};
pub use system::{
    load_boot_image, AudioMixer, BufferState, ControlState, ControlStep, ControlTranslator,
    Emulator, FrameOutcome, FsRomStore, Host, PlaybackEngine, PointerState, PointerTranslator,
    RomStore,
};
