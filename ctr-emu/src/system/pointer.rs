//! Pointer event translation from the touch surface.
//!
//! A contact sets the pointer state port to 1 and writes the coordinates; a
//! release clears it. The pointer vector is evaluated at most once per frame,
//! and only when the contact state or the position changed.

use crate::input::TouchPoint;
use varvara::devices::{ids, ports};
use varvara::{DeviceBus, VmCore};

/// Last delivered pointer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    pub contact: bool,
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Default)]
pub struct PointerTranslator {
    state: PointerState,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = PointerState::default();
    }

    /// Translate one frame of touch input. Returns whether the pointer vector ran.
    pub fn step(&mut self, touch: Option<TouchPoint>, bus: &mut DeviceBus, vm: &mut dyn VmCore) -> bool {
        let registers = bus.registers_mut();
        match touch {
            Some(point) => {
                let moved = point.x != self.state.x || point.y != self.state.y;
                if self.state.contact && !moved {
                    return false;
                }
                registers.poke16(ports::MOUSE_X, point.x);
                registers.poke16(ports::MOUSE_Y, point.y);
                registers.poke(ports::MOUSE_STATE, 1);
                self.state = PointerState {
                    contact: true,
                    x: point.x,
                    y: point.y,
                };
            }
            None => {
                if !self.state.contact {
                    return false;
                }
                registers.poke(ports::MOUSE_STATE, 0);
                self.state.contact = false;
            }
        }

        let vector = bus.vector(ids::MOUSE);
        tracing::trace!(
            vector,
            contact = self.state.contact,
            x = self.state.x,
            y = self.state.y,
            "pointer event"
        );
        vm.eval(bus, vector);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use varvara::PortBus;

    #[derive(Default)]
    struct Probe {
        seen: Vec<(u16, u16, u8)>,
    }

    impl VmCore for Probe {
        fn reset(&mut self) {}

        fn load(&mut self, _image: &[u8]) -> bool {
            true
        }

        fn eval(&mut self, bus: &mut dyn PortBus, _vector: u16) {
            let x = u16::from_be_bytes([bus.read(ports::MOUSE_X), bus.read(ports::MOUSE_X + 1)]);
            let y = u16::from_be_bytes([bus.read(ports::MOUSE_Y), bus.read(ports::MOUSE_Y + 1)]);
            self.seen.push((x, y, bus.read(ports::MOUSE_STATE)));
        }
    }

    #[test]
    fn test_touch_hold_move_release() {
        let mut pointer = PointerTranslator::new();
        let mut bus = DeviceBus::new();
        let mut vm = Probe::default();

        let a = Some(TouchPoint::new(10, 20));
        let b = Some(TouchPoint::new(11, 20));

        assert!(pointer.step(a, &mut bus, &mut vm));
        assert!(!pointer.step(a, &mut bus, &mut vm));
        assert!(pointer.step(b, &mut bus, &mut vm));
        assert!(pointer.step(None, &mut bus, &mut vm));
        assert!(!pointer.step(None, &mut bus, &mut vm));

        assert_eq!(vm.seen, vec![(10, 20, 1), (11, 20, 1), (11, 20, 0)]);
    }

    #[test]
    fn test_new_contact_at_same_spot_is_delivered() {
        let mut pointer = PointerTranslator::new();
        let mut bus = DeviceBus::new();
        let mut vm = Probe::default();

        let a = Some(TouchPoint::new(5, 5));
        pointer.step(a, &mut bus, &mut vm);
        pointer.step(None, &mut bus, &mut vm);
        assert!(pointer.step(a, &mut bus, &mut vm));
        assert_eq!(vm.seen.last(), Some(&(5, 5, 1)));
    }

    #[test]
    fn test_first_contact_at_origin_is_delivered() {
        let mut pointer = PointerTranslator::new();
        let mut bus = DeviceBus::new();
        let mut vm = Probe::default();

        assert!(pointer.step(Some(TouchPoint::new(0, 0)), &mut bus, &mut vm));
        assert_eq!(bus.registers().peek(ports::MOUSE_STATE), 1);
    }

    #[test]
    fn test_coordinates_are_big_endian() {
        let mut pointer = PointerTranslator::new();
        let mut bus = DeviceBus::new();
        let mut vm = Probe::default();

        pointer.step(Some(TouchPoint::new(0x0123, 0x00EF)), &mut bus, &mut vm);
        let regs = bus.registers();
        assert_eq!(regs.peek(0x92), 0x01);
        assert_eq!(regs.peek(0x93), 0x23);
        assert_eq!(regs.peek(0x94), 0x00);
        assert_eq!(regs.peek(0x95), 0xEF);
    }

    #[test]
    fn test_reset_clears_contact() {
        let mut pointer = PointerTranslator::new();
        let mut bus = DeviceBus::new();
        let mut vm = Probe::default();

        pointer.step(Some(TouchPoint::new(3, 4)), &mut bus, &mut vm);
        pointer.reset();
        assert_eq!(pointer.state(), PointerState::default());
    }
}
