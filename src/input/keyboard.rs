//! Keyboard state tracking.
//!
//! Tracks held keys from raw winit events and maps the six movement keys to
//! a drive axis vector: A/D along x, W/S along z, R/F along y.

use std::collections::HashSet;

use glam::Vec3;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Held-key state for the movement bindings.
#[derive(Debug, Default)]
pub struct Keyboard {
    held: HashSet<KeyCode>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(code) = event.physical_key {
                match event.state {
                    ElementState::Pressed => {
                        self.held.insert(code);
                    }
                    ElementState::Released => {
                        self.held.remove(&code);
                    }
                }
            }
        }
    }

    fn axis(&self, neg: KeyCode, pos: KeyCode) -> f32 {
        match (self.held.contains(&neg), self.held.contains(&pos)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Current drive axes in -1..=1 per component.
    ///
    /// A/D push left/right, W/S push away/toward the viewer, R/F push
    /// up/down.
    pub fn axes(&self) -> Vec3 {
        Vec3::new(
            self.axis(KeyCode::KeyA, KeyCode::KeyD),
            self.axis(KeyCode::KeyF, KeyCode::KeyR),
            self.axis(KeyCode::KeyW, KeyCode::KeyS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests manipulate `held` directly; populating it normally goes through
    // handle_event.

    #[test]
    fn test_idle_axes_are_zero() {
        let keyboard = Keyboard::new();
        assert_eq!(keyboard.axes(), Vec3::ZERO);
    }

    #[test]
    fn test_axis_mapping() {
        let mut keyboard = Keyboard::new();
        keyboard.held.insert(KeyCode::KeyA);
        assert_eq!(keyboard.axes().x, -1.0);

        keyboard.held.clear();
        keyboard.held.insert(KeyCode::KeyS);
        assert_eq!(keyboard.axes().z, 1.0);

        keyboard.held.clear();
        keyboard.held.insert(KeyCode::KeyR);
        assert_eq!(keyboard.axes().y, 1.0);

        keyboard.held.clear();
        keyboard.held.insert(KeyCode::KeyF);
        assert_eq!(keyboard.axes().y, -1.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut keyboard = Keyboard::new();
        keyboard.held.insert(KeyCode::KeyA);
        keyboard.held.insert(KeyCode::KeyD);
        assert_eq!(keyboard.axes().x, 0.0);
    }

    #[test]
    fn test_release_clears_axis() {
        let mut keyboard = Keyboard::new();
        keyboard.held.insert(KeyCode::KeyW);
        assert_eq!(keyboard.axes().z, -1.0);
        keyboard.held.remove(&KeyCode::KeyW);
        assert_eq!(keyboard.axes().z, 0.0);
    }
}
