/// Raw pointer/wheel input considered by the viewport's gesture filter.
/// One event is consumed per dispatch; the filter decides whether it is
/// honored at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    /// Button press that may start a pan; carries no movement itself.
    MouseDown,
    /// Pointer movement with the button held. `distance` is the total
    /// travel of the gesture so far, used to tell a click from a pan.
    Drag { dx: f32, dy: f32, distance: f32 },
    /// Wheel/pinch step; `factor` multiplies the current scale.
    Wheel { factor: f32 },
    DoubleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub fn any(self) -> bool {
        self.ctrl || self.alt || self.shift
    }
}

impl GestureEvent {
    pub fn mouse_down(button: PointerButton) -> Self {
        Self {
            kind: GestureKind::MouseDown,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn drag(button: PointerButton, dx: f32, dy: f32, distance: f32) -> Self {
        Self {
            kind: GestureKind::Drag { dx, dy, distance },
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn wheel(factor: f32) -> Self {
        Self {
            kind: GestureKind::Wheel { factor },
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn double_click() -> Self {
        Self {
            kind: GestureKind::DoubleClick,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
