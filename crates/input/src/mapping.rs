use crate::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Other,
}

/// Keys with a binding. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    R,
    F1,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Orbit,
    Dolly,
    Pan,
}

/// Turns pointer and key events into [`Action`]s.
///
/// Left drag orbits, middle drag dollies, right drag pans, the wheel
/// dollies. Arrow keys are reported as key-pan directions through
/// [`PointerMapper::key_pan`] since they need the camera basis.
#[derive(Debug, Default)]
pub struct PointerMapper {
    drag: Option<DragMode>,
    last: Option<(f32, f32)>,
}

impl PointerMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        if !pressed {
            self.drag = None;
            return;
        }
        self.drag = match button {
            PointerButton::Left => Some(DragMode::Orbit),
            PointerButton::Middle => Some(DragMode::Dolly),
            PointerButton::Right => Some(DragMode::Pan),
            PointerButton::Other => self.drag,
        };
    }

    /// Cursor moved to `(x, y)` in physical pixels.
    pub fn moved(&mut self, x: f32, y: f32) -> Action {
        let previous = self.last.replace((x, y));
        let (Some(mode), Some((px, py))) = (self.drag, previous) else {
            return Action::Noop;
        };
        let (dx, dy) = (x - px, y - py);
        match mode {
            DragMode::Orbit => Action::Orbit { dx, dy },
            DragMode::Pan => Action::Pan { dx, dy },
            // Dragging down pulls the camera back.
            DragMode::Dolly if dy != 0.0 => Action::Zoom(-dy.signum()),
            DragMode::Dolly => Action::Noop,
        }
    }

    pub fn left_window(&mut self) {
        self.last = None;
    }

    /// Wheel delta in lines; positive is away from the user.
    pub fn wheel(&self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    /// Key press to action. Arrow keys return `Noop`; see [`Self::key_pan`].
    pub fn key(&self, key: Key) -> Action {
        match key {
            Key::R => Action::ResetView,
            Key::F1 => Action::ToggleInspector,
            Key::Escape => Action::Exit,
            _ => Action::Noop,
        }
    }

    /// Screen direction `(right, up)` for an arrow key.
    pub fn key_pan(&self, key: Key) -> Option<(f32, f32)> {
        match key {
            Key::ArrowUp => Some((0.0, 1.0)),
            Key::ArrowDown => Some((0.0, -1.0)),
            Key::ArrowLeft => Some((-1.0, 0.0)),
            Key::ArrowRight => Some((1.0, 0.0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_without_button_do_nothing() {
        let mut m = PointerMapper::new();
        assert_eq!(m.moved(10.0, 10.0), Action::Noop);
        assert_eq!(m.moved(20.0, 10.0), Action::Noop);
    }

    #[test]
    fn left_drag_orbits() {
        let mut m = PointerMapper::new();
        m.moved(100.0, 100.0);
        m.button(PointerButton::Left, true);
        assert_eq!(m.moved(110.0, 95.0), Action::Orbit { dx: 10.0, dy: -5.0 });
        m.button(PointerButton::Left, false);
        assert_eq!(m.moved(120.0, 95.0), Action::Noop);
    }

    #[test]
    fn right_drag_pans_middle_drag_dollies() {
        let mut m = PointerMapper::new();
        m.moved(0.0, 0.0);
        m.button(PointerButton::Right, true);
        assert_eq!(m.moved(3.0, 4.0), Action::Pan { dx: 3.0, dy: 4.0 });
        m.button(PointerButton::Right, false);

        m.button(PointerButton::Middle, true);
        assert_eq!(m.moved(3.0, 10.0), Action::Zoom(-1.0));
        assert_eq!(m.moved(3.0, 2.0), Action::Zoom(1.0));
        assert_eq!(m.moved(9.0, 2.0), Action::Noop);
    }

    #[test]
    fn first_move_after_leaving_has_no_delta() {
        let mut m = PointerMapper::new();
        m.button(PointerButton::Left, true);
        m.moved(0.0, 0.0);
        m.left_window();
        assert_eq!(m.moved(500.0, 500.0), Action::Noop);
        assert_eq!(m.moved(501.0, 500.0), Action::Orbit { dx: 1.0, dy: 0.0 });
    }

    #[test]
    fn wheel_and_keys() {
        let m = PointerMapper::new();
        assert_eq!(m.wheel(1.0), Action::Zoom(1.0));
        assert_eq!(m.wheel(0.0), Action::Noop);
        assert_eq!(m.key(Key::R), Action::ResetView);
        assert_eq!(m.key(Key::F1), Action::ToggleInspector);
        assert_eq!(m.key(Key::Escape), Action::Exit);
        assert_eq!(m.key(Key::ArrowUp), Action::Noop);
        assert_eq!(m.key_pan(Key::ArrowLeft), Some((-1.0, 0.0)));
        assert_eq!(m.key_pan(Key::Other), None);
    }
}
