//! Controller event translation.
//!
//! Once per frame the raw button and soft keyboard state is folded into one
//! byte of [`ControlFlags`]. The controller vector is evaluated only when that
//! byte differs from the last delivered one, or when a printable key was
//! tapped. Between deliveries the translator is idle and touches nothing.
//!
//! ## Delivery
//!
//! 1. Stage a printable key (1..=127) into the one-shot port 0x83
//! 2. Apply the delivered->sampled transition to port 0x82 (changed bits only)
//! 3. Evaluate the controller vector
//! 4. Zero port 0x83 again, so a key is visible to exactly one evaluation

use crate::input::{Buttons, InputSample, Key};
use varvara::devices::{ids, ports};
use varvara::{ControlFlags, DeviceBus, VmCore};

/// Last delivered and most recently sampled controller flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    /// Flags last written into the register file.
    pub delivered: ControlFlags,
    /// Flags sampled this frame.
    pub sampled: ControlFlags,
}

/// What one controller step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlStep {
    /// The controller vector was evaluated.
    pub delivered: bool,
    /// The system key was tapped; the caller should open the reset prompt.
    pub system_key: bool,
}

/// Edge-triggered controller translator.
#[derive(Debug, Default)]
pub struct ControlTranslator {
    state: ControlState,
}

impl ControlTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current translator state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Forget all delivered state (soft reset).
    pub fn reset(&mut self) {
        self.state = ControlState::default();
    }

    /// Map one frame of raw input to controller flags.
    pub fn sample_flags(input: &InputSample) -> ControlFlags {
        let held = input.all_held();
        let keyboard = &input.keyboard;

        // A, B, SELECT, START occupy the low nibble in both layouts
        let mut flags = ControlFlags::from_bits_truncate((held.bits() & 0x0F) as u8);
        flags.set(ControlFlags::CTRL, keyboard.ctrl || held.contains(Buttons::A));
        flags.set(ControlFlags::ALT, keyboard.alt || held.contains(Buttons::B));
        flags.set(ControlFlags::SHIFT, keyboard.shift || held.contains(Buttons::SELECT));
        if keyboard.key == Some(Key::Home) {
            flags.insert(ControlFlags::HOME);
        }
        flags.set(ControlFlags::UP, held.intersects(Buttons::UP));
        flags.set(ControlFlags::DOWN, held.intersects(Buttons::DOWN));
        flags.set(ControlFlags::LEFT, held.intersects(Buttons::LEFT));
        flags.set(ControlFlags::RIGHT, held.intersects(Buttons::RIGHT));
        flags
    }

    /// Printable key tapped this frame, if any.
    fn one_shot_key(input: &InputSample) -> Option<u8> {
        match input.keyboard.key {
            Some(Key::Char(code)) if (1..=127).contains(&code) => Some(code),
            _ => None,
        }
    }

    /// Run one frame of translation, evaluating the controller vector on change.
    pub fn step(&mut self, input: &InputSample, bus: &mut DeviceBus, vm: &mut dyn VmCore) -> ControlStep {
        let sampled = Self::sample_flags(input);
        self.state.sampled = sampled;

        let key = Self::one_shot_key(input);
        if let Some(code) = key {
            bus.registers_mut().poke(ports::CONTROLLER_KEY, code);
        }

        let delivered = self.state.delivered;
        let changed = ControlFlags::changed(delivered, sampled);
        let system_key = input.keyboard.key == Some(Key::System);

        if changed.is_empty() && key.is_none() {
            return ControlStep {
                delivered: false,
                system_key,
            };
        }

        let registers = bus.registers_mut();
        let register = ControlFlags::from_bits_retain(registers.peek(ports::CONTROLLER_BUTTONS));
        let next = ControlFlags::apply_transition(register, delivered, sampled);
        registers.poke(ports::CONTROLLER_BUTTONS, next.bits());
        self.state.delivered = sampled;

        let vector = bus.vector(ids::CONTROLLER);
        tracing::trace!(
            vector,
            flags = next.bits(),
            changed = changed.bits(),
            key,
            "controller event"
        );
        vm.eval(bus, vector);

        if key.is_some() {
            bus.registers_mut().poke(ports::CONTROLLER_KEY, 0);
        }

        ControlStep {
            delivered: true,
            system_key,
        }
    }
}
