/// A high-level request produced from user input.
///
/// The frame loop and the controls consume actions, never raw events, so
/// the desktop app and tests drive the camera the same way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit around the target by a pointer delta in pixels.
    Orbit { dx: f32, dy: f32 },
    /// Slide camera and target by a pointer delta in pixels.
    Pan { dx: f32, dy: f32 },
    /// Dolly steps; positive moves toward the target.
    Zoom(f32),
    /// Return the camera to where it started.
    ResetView,
    ToggleInspector,
    Resize { width: u32, height: u32 },
    Exit,
    /// Input with no binding.
    Noop,
}

impl Action {
    /// Whether this action moves the camera.
    pub fn is_camera(&self) -> bool {
        matches!(
            self,
            Action::Orbit { .. } | Action::Pan { .. } | Action::Zoom(_) | Action::ResetView
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_actions() {
        assert!(Action::Orbit { dx: 1.0, dy: 0.0 }.is_camera());
        assert!(Action::Zoom(1.0).is_camera());
        assert!(Action::ResetView.is_camera());
        assert!(!Action::ToggleInspector.is_camera());
        assert!(!Action::Resize { width: 1, height: 1 }.is_camera());
        assert!(!Action::Noop.is_camera());
    }
}
