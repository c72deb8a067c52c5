//! Input sources and priority resolution.
//!
//! Three sources can drive the player sphere, in strict priority order:
//!
//! 1. **Hand tracking** - a palm position and grab strength from the local
//!    hand bridge ([`hand::HandFeed`]). While a hand is visible the player is
//!    positioned directly from the palm.
//! 2. **Gamepad** - stick axes polled via gilrs ([`gamepad::GamepadInput`]),
//!    mapped to a force vector.
//! 3. **Keyboard** - WASD/R/F held-key state ([`keyboard::Keyboard`]),
//!    mapped to a force vector.
//!
//! An absent device is not an error; resolution simply falls through to the
//! next source. With no device and no keys held the result is a zero force.

pub mod gamepad;
pub mod hand;
pub mod keyboard;

pub use gamepad::GamepadInput;
pub use hand::{HandFeed, HandFrame};
pub use keyboard::Keyboard;

use glam::Vec3;
use winit::event::WindowEvent;

/// Force applied to the player per unit of stick/key deflection, in newtons.
pub const FORCE_SCALE: f32 = 20.0;

/// Stick deflection below this magnitude reads as zero.
pub const DEADZONE: f32 = 0.1;

/// The resolved input for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drive {
    /// A hand is visible: position the player at the palm and use the grab
    /// strength to attract or repel the points.
    Palm { position: Vec3, grab: f32 },
    /// No hand: push the player with a central force (possibly zero).
    Force(Vec3),
}

/// Linearly remap `v` from the range `a..b` to the range `c..d`.
pub fn map_range(v: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    (v - a) / (b - a) * (d - c) + c
}

/// Apply a radial deadzone to a stick axis value in -1..=1.
///
/// Values inside the zone read as zero; the remaining travel is remapped to
/// the full 0..1 range so there is no jump at the zone edge.
pub fn deadzone(v: f32) -> f32 {
    let av = v.abs();
    if av < DEADZONE {
        0.0
    } else {
        v.signum() * map_range(av, DEADZONE, 1.0, 0.0, 1.0)
    }
}

/// All input sources bundled together.
pub struct InputRig {
    hand: HandFeed,
    gamepad: GamepadInput,
    keyboard: Keyboard,
}

impl InputRig {
    /// Create the rig, connecting to the hand bridge at `hand_addr` in the
    /// background and opening the gamepad backend if one is available.
    pub fn new(hand_addr: &str) -> Self {
        Self {
            hand: HandFeed::connect(hand_addr),
            gamepad: GamepadInput::new(),
            keyboard: Keyboard::new(),
        }
    }

    /// Feed a window event to the keyboard tracker.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        self.keyboard.handle_event(event);
    }

    /// Resolve this frame's input to a [`Drive`].
    pub fn resolve_drive(&mut self) -> Drive {
        resolve(
            self.hand.latest(),
            self.gamepad.poll_axes(),
            self.keyboard.axes(),
        )
    }
}

/// Priority resolution: hand, then gamepad, then keyboard.
///
/// A connected gamepad with centered sticks still wins over the keyboard,
/// matching source *presence* priority rather than activity.
fn resolve(hand: Option<HandFrame>, pad: Option<Vec3>, keys: Vec3) -> Drive {
    if let Some(frame) = hand {
        return Drive::Palm {
            position: frame.scene_position(),
            grab: frame.grab,
        };
    }
    Drive::Force(pad.unwrap_or(keys) * FORCE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range() {
        assert!((map_range(0.5, 0.0, 1.0, 0.0, 10.0) - 5.0).abs() < 1e-6);
        // The attract/repel ramps from the grab-strength mapping.
        assert!((map_range(0.95, 0.9, 1.0, 0.0, -0.5) + 0.25).abs() < 1e-5);
        assert!((map_range(0.05, 0.1, 0.0, 0.0, 0.5) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_deadzone_inside_zone_is_zero() {
        assert_eq!(deadzone(0.0), 0.0);
        assert_eq!(deadzone(0.05), 0.0);
        assert_eq!(deadzone(-0.09), 0.0);
    }

    #[test]
    fn test_deadzone_remaps_to_full_range() {
        assert!((deadzone(1.0) - 1.0).abs() < 1e-6);
        assert!((deadzone(-1.0) + 1.0).abs() < 1e-6);
        // No jump at the zone edge.
        assert!(deadzone(DEADZONE + 1e-4).abs() < 0.001);
        // Halfway through the live range maps to 0.5.
        assert!((deadzone(0.55) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hand_wins_over_everything() {
        let frame = HandFrame {
            palm_mm: glam::Vec3::new(0.0, 250.0, 0.0),
            grab: 0.95,
        };
        let drive = resolve(Some(frame), Some(Vec3::ONE), Vec3::ONE);
        match drive {
            Drive::Palm { position, grab } => {
                assert!(position.length() < 1e-6);
                assert_eq!(grab, 0.95);
            }
            Drive::Force(_) => panic!("hand should take priority"),
        }
    }

    #[test]
    fn test_pad_presence_wins_over_keys() {
        // Centered sticks still shadow the keyboard.
        let drive = resolve(None, Some(Vec3::ZERO), Vec3::ONE);
        assert_eq!(drive, Drive::Force(Vec3::ZERO));
    }

    #[test]
    fn test_keyboard_is_last_resort() {
        let drive = resolve(None, None, Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(
            drive,
            Drive::Force(Vec3::new(FORCE_SCALE, 0.0, -FORCE_SCALE))
        );
    }

    #[test]
    fn test_no_input_is_zero_force() {
        assert_eq!(resolve(None, None, Vec3::ZERO), Drive::Force(Vec3::ZERO));
    }
}
