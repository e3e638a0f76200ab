//! Frame scheduler.
//!
//! [`Emulator`] owns the VM core, the device bus, both event translators and
//! the display-swap flag; it is the one context object every per-frame step
//! runs against. The host platform plugs in through [`Host`].
//!
//! # Frame Order
//!
//! 1. Quit chord check
//! 2. Display swap toggle (L or R pressed)
//! 3. Controller translation (may evaluate the controller vector); the soft
//!    keyboard is ignored if the display was swapped when the frame began
//! 4. Pointer translation, only while swapped (may evaluate the pointer vector)
//! 5. Screen vector evaluation
//! 6. Halt check (system state port)
//! 7. Palette change forwarded, then redraw request
//!
//! # Example
//!
//! ```rust
//! use ctr_emu::{BootEntry, Emulator, FrameOutcome, HostConfig, InputSample, RomStore};
//! use std::path::Path;
//! use varvara::{PortBus, VmCore};
//!
//! struct Idle;
//!
//! impl VmCore for Idle {
//!     fn reset(&mut self) {}
//!     fn load(&mut self, _image: &[u8]) -> bool { true }
//!     fn eval(&mut self, _bus: &mut dyn PortBus, _vector: u16) {}
//! }
//!
//! struct OneRom;
//!
//! impl RomStore for OneRom {
//!     fn read(&self, _path: &Path) -> std::io::Result<Vec<u8>> {
//!         Ok(vec![0x00])
//!     }
//! }
//!
//! let config = HostConfig::default().with_boot_entries(vec![BootEntry::new("boot.rom")]);
//! let mut emu = Emulator::new(Idle, config, Box::new(OneRom)).unwrap();
//! emu.boot().unwrap();
//! emu.start();
//! assert_eq!(emu.step_frame(&InputSample::default()), FrameOutcome::Continue);
//! ```

use super::boot::{load_boot_image, RomStore};
use super::controller::ControlTranslator;
use super::mixer::AudioMixer;
use super::pointer::PointerTranslator;
use crate::config::{BootEntry, HostConfig};
use crate::error::Result;
use crate::input::{InputSample, KeyboardSample};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use varvara::devices::{audio, ids, ports};
use varvara::{DeviceBus, RegisterFile, SystemDevice, VmCore, VoiceBank, RESET_VECTOR};

/// The host platform as seen by the frame loop.
pub trait Host {
    /// Wait for the next vertical blank. Returns `false` once the platform is shutting down.
    fn next_frame(&mut self) -> bool;

    /// Sample buttons, touch and the soft keyboard.
    fn scan_input(&mut self) -> InputSample;

    /// Composite the VM display. `swapped` selects which screen shows it.
    fn redraw(&mut self, registers: &RegisterFile, swapped: bool);

    /// Blocking yes/no reset prompt.
    fn confirm_reset(&mut self) -> bool;

    /// The program rewrote its four-colour palette (system ports 0x8-0xD).
    fn palette_changed(&mut self, palette: &[u8; 6]) {
        let _ = palette;
    }

    /// Reinitialise the screen collaborator after a reset.
    fn reset_screen(&mut self) {}

    /// Clear the soft keyboard's latched state.
    fn clear_keyboard(&mut self) {}

    /// Make `dir` the working directory for file devices.
    fn enter_directory(&mut self, dir: &Path) {
        let _ = dir;
    }
}

/// Result of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// Quit chord held or the program halted.
    Quit,
    /// The system key was tapped.
    ResetRequested,
}

/// One running Varvara machine bound to a host console.
pub struct Emulator<V: VmCore> {
    vm: V,
    bus: DeviceBus,
    voices: Arc<VoiceBank>,
    config: HostConfig,
    store: Box<dyn RomStore>,
    control: ControlTranslator,
    pointer: PointerTranslator,
    swapped: bool,
    palette: Rc<Cell<Option<[u8; 6]>>>,
}

impl<V: VmCore> Emulator<V> {
    /// Wire the system and audio devices onto a fresh bus.
    ///
    /// Palette writes are latched and handed to [`Host::palette_changed`]
    /// before the next redraw.
    pub fn new(vm: V, config: HostConfig, store: Box<dyn RomStore>) -> Result<Self> {
        let voices = Arc::new(VoiceBank::new(config.sample_rate));
        let palette = Rc::new(Cell::new(None));
        let latch = Rc::clone(&palette);
        let system = SystemDevice::with_listener(Box::new(move |colors: &[u8; 6]| {
            latch.set(Some(*colors));
        }));

        let mut bus = DeviceBus::new();
        bus.attach(ids::SYSTEM, Box::new(system))?;
        audio::attach_voices(&mut bus, &voices)?;

        Ok(Self {
            vm,
            bus,
            voices,
            config,
            store,
            control: ControlTranslator::new(),
            pointer: PointerTranslator::new(),
            swapped: false,
            palette,
        })
    }

    pub fn vm(&self) -> &V {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut V {
        &mut self.vm
    }

    pub fn bus(&self) -> &DeviceBus {
        &self.bus
    }

    /// Bus access for attaching the console, screen, file and clock devices.
    pub fn bus_mut(&mut self) -> &mut DeviceBus {
        &mut self.bus
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Voices shared with the audio mixing context.
    pub fn voices(&self) -> &Arc<VoiceBank> {
        &self.voices
    }

    /// A mixer over this machine's voices, sized from the configuration.
    pub fn mixer(&self) -> Result<AudioMixer> {
        AudioMixer::new(Arc::clone(&self.voices), self.config.buffer_frames)
    }

    /// Whether the VM display is on the touch screen.
    pub fn is_swapped(&self) -> bool {
        self.swapped
    }

    pub fn control(&self) -> &ControlTranslator {
        &self.control
    }

    pub fn pointer(&self) -> &PointerTranslator {
        &self.pointer
    }

    /// The palette written since the last call, if any.
    pub fn take_palette(&mut self) -> Option<[u8; 6]> {
        self.palette.take()
    }

    /// Build the cold-boot state: reset everything, load an image, write the screen size.
    ///
    /// Returns the boot entry that loaded.
    pub fn boot(&mut self) -> Result<BootEntry> {
        self.voices.stop_all();
        self.vm.reset();
        self.bus.reset();
        self.control.reset();
        self.pointer.reset();

        let entry = load_boot_image(&mut self.vm, self.store.as_ref(), &self.config.boot_entries)?.clone();

        let registers = self.bus.registers_mut();
        registers.poke16(ports::SCREEN_WIDTH, self.config.screen_width);
        registers.poke16(ports::SCREEN_HEIGHT, self.config.screen_height);
        Ok(entry)
    }

    /// Evaluate the reset vector.
    pub fn start(&mut self) {
        tracing::trace!(vector = RESET_VECTOR, "boot vector");
        self.vm.eval(&mut self.bus, RESET_VECTOR);
    }

    /// Run one frame against `input`.
    pub fn step_frame(&mut self, input: &InputSample) -> FrameOutcome {
        let quit_chord = self.config.quit_chord;
        if input.all_held().contains(quit_chord) {
            tracing::info!("quit chord held");
            return FrameOutcome::Quit;
        }

        let was_swapped = self.swapped;
        if input.pressed.intersects(self.config.swap_buttons) {
            self.swapped = !self.swapped;
            tracing::debug!(swapped = self.swapped, "display swap");
        }

        // Keys typed this frame came from the keyboard shown before the toggle
        let mut control_input = *input;
        if was_swapped {
            control_input.keyboard = KeyboardSample::default();
        }
        let control = self.control.step(&control_input, &mut self.bus, &mut self.vm);

        let touch = if self.swapped { input.touch } else { None };
        self.pointer.step(touch, &mut self.bus, &mut self.vm);

        let vector = self.bus.vector(ids::SCREEN);
        self.vm.eval(&mut self.bus, vector);

        let state = self.bus.registers().peek(ports::SYSTEM_STATE);
        if state != 0 {
            tracing::info!(state, "program halted");
            return FrameOutcome::Quit;
        }

        if control.system_key {
            FrameOutcome::ResetRequested
        } else {
            FrameOutcome::Continue
        }
    }

    /// Prompt for and perform a soft reset.
    ///
    /// Returns `Ok(false)` if the user declined; nothing changes in that case.
    pub fn soft_reset(&mut self, host: &mut dyn Host) -> Result<bool> {
        if !host.confirm_reset() {
            tracing::debug!("reset declined");
            return Ok(false);
        }
        tracing::info!("soft reset");

        let entry = self.boot()?;
        if let Some(dir) = &entry.workdir {
            host.enter_directory(dir);
        }
        host.reset_screen();
        host.clear_keyboard();

        // Let go of every button first, so the reset press is not delivered
        while !host.scan_input().is_idle() {
            if !host.next_frame() {
                break;
            }
        }
        self.control.reset();
        self.pointer.reset();

        self.start();
        Ok(true)
    }

    /// Boot, then run frames until quit, halt, or the host shuts down.
    pub fn run(&mut self, host: &mut dyn Host) -> Result<()> {
        let entry = self.boot()?;
        if let Some(dir) = &entry.workdir {
            host.enter_directory(dir);
        }
        host.reset_screen();
        self.start();
        self.present(host);

        while host.next_frame() {
            let input = host.scan_input();
            match self.step_frame(&input) {
                FrameOutcome::Continue => {}
                FrameOutcome::Quit => break,
                FrameOutcome::ResetRequested => {
                    self.soft_reset(host)?;
                }
            }
            self.present(host);
        }

        self.voices.stop_all();
        tracing::info!("emulator stopped");
        Ok(())
    }

    fn present(&mut self, host: &mut dyn Host) {
        if let Some(palette) = self.take_palette() {
            tracing::debug!(?palette, "palette forwarded");
            host.palette_changed(&palette);
        }
        host.redraw(self.bus.registers(), self.swapped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Buttons, Key};
    use varvara::PortBus;

    #[derive(Default)]
    struct Counter {
        evals: Vec<u16>,
    }

    impl VmCore for Counter {
        fn reset(&mut self) {}

        fn load(&mut self, _image: &[u8]) -> bool {
            true
        }

        fn eval(&mut self, _bus: &mut dyn PortBus, vector: u16) {
            if vector != 0 {
                self.evals.push(vector);
            }
        }
    }

    struct AnyRom;

    impl RomStore for AnyRom {
        fn read(&self, _path: &Path) -> std::io::Result<Vec<u8>> {
            Ok(vec![0xA0])
        }
    }

    fn emulator() -> Emulator<Counter> {
        let mut emu = Emulator::new(Counter::default(), HostConfig::default(), Box::new(AnyRom)).unwrap();
        emu.boot().unwrap();
        emu
    }

    #[test]
    fn test_boot_writes_screen_size() {
        let emu = emulator();
        assert_eq!(emu.bus().registers().peek16(ports::SCREEN_WIDTH), 320);
        assert_eq!(emu.bus().registers().peek16(ports::SCREEN_HEIGHT), 240);
    }

    #[test]
    fn test_boot_uses_first_entry() {
        let mut emu = Emulator::new(Counter::default(), HostConfig::default(), Box::new(AnyRom)).unwrap();
        let entry = emu.boot().unwrap();
        assert_eq!(entry.path, Path::new("romfs:/boot.rom"));
    }

    #[test]
    fn test_quit_chord() {
        let mut emu = emulator();
        let chord = Buttons::L | Buttons::R | Buttons::START | Buttons::SELECT;
        assert_eq!(emu.step_frame(&InputSample::buttons(chord, Buttons::empty())), FrameOutcome::Quit);
    }

    #[test]
    fn test_swap_toggles_on_press_only() {
        let mut emu = emulator();
        emu.step_frame(&InputSample::buttons(Buttons::L, Buttons::L));
        assert!(emu.is_swapped());
        emu.step_frame(&InputSample::buttons(Buttons::L, Buttons::empty()));
        assert!(emu.is_swapped());
        emu.step_frame(&InputSample::buttons(Buttons::R, Buttons::R));
        assert!(!emu.is_swapped());
    }

    #[test]
    fn test_screen_vector_every_frame() {
        let mut emu = emulator();
        emu.bus_mut().registers_mut().poke16(0x20, 0x0300);
        emu.step_frame(&InputSample::default());
        emu.step_frame(&InputSample::default());
        assert_eq!(emu.vm().evals, vec![0x0300, 0x0300]);
    }

    #[test]
    fn test_halt_quits() {
        let mut emu = emulator();
        emu.bus_mut().registers_mut().poke(ports::SYSTEM_STATE, 1);
        assert_eq!(emu.step_frame(&InputSample::default()), FrameOutcome::Quit);
    }

    #[test]
    fn test_system_key_requests_reset() {
        let mut emu = emulator();
        assert_eq!(
            emu.step_frame(&InputSample::key(Key::System)),
            FrameOutcome::ResetRequested
        );
    }

    #[test]
    fn test_keyboard_masked_while_swapped() {
        let mut emu = emulator();
        emu.bus_mut().registers_mut().poke16(0x80, 0x0200);
        emu.step_frame(&InputSample::buttons(Buttons::R, Buttons::R));
        emu.step_frame(&InputSample::default());
        emu.vm_mut().evals.clear();

        assert_eq!(emu.step_frame(&InputSample::key(Key::Char(b'x'))), FrameOutcome::Continue);
        assert_eq!(emu.step_frame(&InputSample::key(Key::System)), FrameOutcome::Continue);
        assert!(emu.vm().evals.is_empty());
    }

    #[test]
    fn test_unswap_frame_still_masks_keyboard() {
        let mut emu = emulator();
        emu.bus_mut().registers_mut().poke16(0x80, 0x0200);
        emu.step_frame(&InputSample::buttons(Buttons::R, Buttons::R));
        emu.step_frame(&InputSample::default());
        emu.vm_mut().evals.clear();

        let mut input = InputSample::buttons(Buttons::R, Buttons::R);
        input.keyboard.key = Some(Key::Char(b'y'));
        emu.step_frame(&input);
        assert!(!emu.is_swapped());
        // R is not a controller bit and the key belongs to the hidden keyboard
        assert!(emu.vm().evals.is_empty());
    }

    #[test]
    fn test_palette_write_is_latched() {
        let mut emu = emulator();
        assert_eq!(emu.take_palette(), None);
        let mut ram = vec![0u8; 0x10000];
        emu.bus_mut().write(&mut ram, 0x08, 0x12);
        assert_eq!(emu.take_palette(), Some([0x12, 0, 0, 0, 0, 0]));
        assert_eq!(emu.take_palette(), None);
    }

    #[test]
    fn test_zero_buffer_config_is_fatal() {
        let config = HostConfig::default().with_buffer_frames(0);
        let emu = Emulator::new(Counter::default(), config, Box::new(AnyRom)).unwrap();
        assert!(emu.mixer().is_err());
    }
}
