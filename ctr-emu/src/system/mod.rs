//! Console system integration: event translation, audio scheduling, and the frame loop.
//!
//! This module provides the top-level [`Emulator`] that drives the VM core
//! once per vertical blank and the [`AudioMixer`] that runs in the audio
//! completion context.

mod boot;
mod controller;
mod emulator;
mod mixer;
mod pointer;

pub use boot::{load_boot_image, FsRomStore, RomStore};
pub use controller::{ControlState, ControlStep, ControlTranslator};
pub use emulator::{Emulator, FrameOutcome, Host};
pub use mixer::{AudioMixer, BufferState, PlaybackEngine};
pub use pointer::{PointerState, PointerTranslator};
