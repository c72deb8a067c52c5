//! Gamepad polling via gilrs.
//!
//! The first connected pad wins. Left stick drives the horizontal plane
//! (x and z), right stick Y drives the vertical axis. Every axis passes
//! through the shared deadzone.

use gilrs::{Axis, Gilrs};
use glam::Vec3;

use super::deadzone;

/// Wrapper around the gilrs context.
///
/// If the backend fails to initialize (headless systems, missing udev) the
/// wrapper stays inert and polling always reports no pad.
pub struct GamepadInput {
    gilrs: Option<Gilrs>,
}

impl GamepadInput {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!("gamepad backend unavailable: {}", e);
                None
            }
        };
        Self { gilrs }
    }

    /// Poll the first connected pad, returning deadzoned drive axes in
    /// -1..=1 per component, or `None` when no pad is connected.
    pub fn poll_axes(&mut self) -> Option<Vec3> {
        let gilrs = self.gilrs.as_mut()?;

        // Drain the event queue so gilrs updates its cached axis state.
        while gilrs.next_event().is_some() {}

        let (_id, pad) = gilrs.gamepads().next()?;
        let x = deadzone(pad.value(Axis::LeftStickX));
        let y = deadzone(pad.value(Axis::RightStickY));
        // gilrs reports stick-up as positive; pulling the stick toward you
        // pushes the player toward the viewer (+z).
        let z = -deadzone(pad.value(Axis::LeftStickY));
        Some(Vec3::new(x, y, z))
    }
}

impl Default for GamepadInput {
    fn default() -> Self {
        Self::new()
    }
}
