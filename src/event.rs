//! Normalized input events.
//!
//! The contract between the host shell and the editing core: whatever the
//! OS or UI toolkit delivers is translated into this vocabulary before
//! dispatch, so the core never sees toolkit types. Events address a window;
//! a registry routes them to the matching session.

/// Identifies one editor window / session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WindowId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    /// One scroll-wheel notch. X11 reports the wheel as button presses, so
    /// the normalizer folds both directions into this: `pressed = true` is a
    /// zoom-in tick, `pressed = false` a zoom-out tick.
    ScrollTick,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyCommand {
    /// The control modifier itself, latched for eyedrop picking.
    Ctrl,
    Save,
    Select,
    SelectAll,
    Move,
    ToggleMinimap,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EventKind {
    /// The window was asked to close.
    Quit,
    PointerButton {
        button: PointerButton,
        pressed: bool,
        x: f32,
        y: f32,
    },
    Key {
        key: KeyCommand,
        pressed: bool,
        ctrl: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct InputEvent {
    pub window: WindowId,
    pub kind: EventKind,
}

impl InputEvent {
    pub fn quit(window: WindowId) -> InputEvent {
        InputEvent { window, kind: EventKind::Quit }
    }

    pub fn button(
        window: WindowId,
        button: PointerButton,
        pressed: bool,
        x: f32,
        y: f32,
    ) -> InputEvent {
        InputEvent {
            window,
            kind: EventKind::PointerButton { button, pressed, x, y },
        }
    }

    pub fn key(window: WindowId, key: KeyCommand, pressed: bool, ctrl: bool) -> InputEvent {
        InputEvent {
            window,
            kind: EventKind::Key { key, pressed, ctrl },
        }
    }
}
