//! Editor sessions and the registry that owns them.
//!
//! An [`EditorSession`] is the per-window aggregate: one pixel buffer, one
//! viewport, one palette, one gesture, one selection. The host drains its
//! normalized event batch into [`SessionRegistry::update`] once per loop
//! iteration; each session latches button/modifier state from its events and
//! then runs exactly one gesture tick against the current pointer position.

use std::path::PathBuf;

use crate::canvas::{Color, PixelBuffer, Region};
use crate::event::{EventKind, InputEvent, KeyCommand, PointerButton, WindowId};
use crate::gesture::{Gesture, MoveDrag, clamp_floating};
use crate::palette::Palette;
use crate::viewport::Viewport;

// ============================================================================
// EDITOR SESSION
// ============================================================================

pub struct EditorSession {
    pub id: WindowId,
    buffer: PixelBuffer,
    pub viewport: Viewport,
    pub palette: Palette,
    gesture: Gesture,
    selection: Region,
    active_color: Color,
    /// File the buffer was loaded from / last saved to.
    pub path: Option<PathBuf>,
    pub show_minimap: bool,

    // Latched input state, updated by events, consumed by the tick.
    pointer: (f32, f32),
    last_pointer: (f32, f32),
    primary_down: bool,
    middle_down: bool,
    ctrl_down: bool,

    /// Redraw needed. Starts true so the first frame always renders; cleared
    /// at the top of each update so anything that frame touches re-arms it.
    dirty: bool,
    /// Unsaved pixel edits exist (drives the title star, not redraws).
    modified: bool,
    /// A save command arrived; the host consumes this and runs the save.
    pending_save: bool,
}

impl EditorSession {
    pub fn new(id: WindowId, buffer: PixelBuffer, path: Option<PathBuf>) -> EditorSession {
        // Painting is masked by the selection, so a fresh session selects
        // the whole image; nothing would be paintable otherwise.
        let selection = Region::full(buffer.width(), buffer.height());
        EditorSession {
            id,
            buffer,
            viewport: Viewport::default(),
            palette: Palette::default(),
            gesture: Gesture::Idle,
            selection,
            active_color: Color::default(),
            path,
            show_minimap: false,
            pointer: (0.0, 0.0),
            last_pointer: (0.0, 0.0),
            primary_down: false,
            middle_down: false,
            ctrl_down: false,
            dirty: true,
            modified: false,
            pending_save: false,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn selection(&self) -> Region {
        self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clears the unsaved-edits marker after a successful save.
    pub fn mark_saved(&mut self) {
        self.modified = false;
        self.dirty = true;
    }

    /// True once per save command.
    pub fn take_pending_save(&mut self) -> bool {
        std::mem::take(&mut self.pending_save)
    }

    /// One loop iteration for this session: clear the redraw flag, apply the
    /// events addressed to this window, then advance pan, gesture, and
    /// painting against `pointer` (current position, screen space).
    pub fn update(&mut self, events: &[InputEvent], pointer: (f32, f32)) {
        self.dirty = false;
        self.pointer = pointer;
        let id = self.id;
        for ev in events.iter().filter(|ev| ev.window == id) {
            self.handle_event(&ev.kind);
        }
        self.tick();
        self.last_pointer = self.pointer;
    }

    // -- Event dispatch ------------------------------------------------------

    fn handle_event(&mut self, kind: &EventKind) {
        match *kind {
            // Window teardown is the registry's job.
            EventKind::Quit => {}
            EventKind::PointerButton { button, pressed, x, y } => {
                self.handle_button(button, pressed, x, y)
            }
            EventKind::Key { key, pressed, ctrl: _ } => self.handle_key(key, pressed),
        }
    }

    fn handle_button(&mut self, button: PointerButton, pressed: bool, x: f32, y: f32) {
        match button {
            PointerButton::Primary => {
                self.primary_down = pressed;
                // A press in the palette picks a swatch and never reaches
                // the canvas.
                if pressed && let Some(index) = self.palette.hit_test(x, y) {
                    self.active_color = self.palette.color(index);
                    self.dirty = true;
                }
            }
            PointerButton::Middle => {
                self.middle_down = pressed;
                if pressed {
                    // Start panning from here, not from wherever the pointer
                    // was last frame.
                    self.last_pointer = (x, y);
                }
            }
            PointerButton::ScrollTick => {
                if self.viewport.zoom_step(x, y, pressed) {
                    self.dirty = true;
                }
            }
            PointerButton::Secondary => {}
        }
    }

    fn handle_key(&mut self, key: KeyCommand, pressed: bool) {
        if !pressed {
            if key == KeyCommand::Ctrl {
                self.ctrl_down = false;
            }
            return;
        }
        match key {
            KeyCommand::Ctrl => self.ctrl_down = true,
            KeyCommand::Save => self.pending_save = true,
            KeyCommand::Select => {
                if self.primary_down && self.gesture.is_idle() {
                    self.gesture = Gesture::SelectionStart;
                }
            }
            KeyCommand::SelectAll => {
                // Only meaningful mid-selection: widens the pending region
                // to the whole image and finishes the gesture.
                if self.gesture.selecting() {
                    self.selection = Region::full(self.buffer.width(), self.buffer.height());
                    self.gesture = Gesture::Idle;
                    self.dirty = true;
                }
            }
            KeyCommand::Move => {
                if self.primary_down && self.gesture.is_idle() && !self.selection.is_empty() {
                    self.gesture = Gesture::MoveStart;
                }
            }
            KeyCommand::ToggleMinimap => {
                self.show_minimap = !self.show_minimap;
                self.dirty = true;
            }
        }
    }

    // -- Per-frame tick ------------------------------------------------------

    fn tick(&mut self) {
        if self.middle_down {
            let dx = self.pointer.0 - self.last_pointer.0;
            let dy = self.pointer.1 - self.last_pointer.1;
            if dx != 0.0 || dy != 0.0 {
                self.viewport.pan_x += dx;
                self.viewport.pan_y += dy;
                self.dirty = true;
            }
        }
        self.tick_gesture();
        self.tick_paint();
    }

    fn tick_gesture(&mut self) {
        let (w, h) = (self.buffer.width(), self.buffer.height());
        let (sx, sy) = self.pointer;
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}

            Gesture::SelectionStart => {
                let (px, py) = self.viewport.pixel_at_clamped(sx, sy, w, h);
                self.selection = Region::point(px as i32, py as i32);
                self.dirty = true;
                self.gesture = Gesture::SelectionActive;
            }

            Gesture::SelectionActive => {
                if self.primary_down {
                    let (px, py) = self.viewport.pixel_at_clamped(sx, sy, w, h);
                    if (self.selection.x1, self.selection.y1) != (px as i32, py as i32) {
                        self.selection.x1 = px as i32;
                        self.selection.y1 = py as i32;
                        self.dirty = true;
                    }
                    self.gesture = Gesture::SelectionActive;
                } else {
                    self.selection = self.selection.normalized().clamped(w, h);
                    self.dirty = true;
                }
            }

            Gesture::MoveStart => {
                if self.selection.is_empty() || !self.primary_down {
                    // Degenerate selection, or the button was let go before
                    // the drag got hold of anything: silent cancel.
                } else {
                    // The anchor must come from an unclamped mapping: a grab
                    // can only start on a pixel actually under the pointer.
                    match self.viewport.screen_to_image(sx, sy, w, h) {
                        Some((px, py))
                            if self.selection.contains(px as i32, py as i32) =>
                        {
                            let floating = self.buffer.extract_region(self.selection);
                            self.gesture = Gesture::MoveActive(MoveDrag {
                                floating,
                                origin: (self.selection.x0, self.selection.y0),
                                anchor: (px as i32, py as i32),
                            });
                        }
                        _ => self.gesture = Gesture::MoveStart,
                    }
                }
            }

            Gesture::MoveActive(mut drag) => {
                if self.primary_down {
                    let (px, py) = self.viewport.pixel_at_clamped(sx, sy, w, h);
                    let delta = (px as i32 - drag.anchor.0, py as i32 - drag.anchor.1);
                    if delta != (0, 0) {
                        self.drag_floating(&mut drag, delta);
                        drag.anchor = (px as i32, py as i32);
                    }
                    self.gesture = Gesture::MoveActive(drag);
                } else {
                    // Drop the snapshot; the canvas already holds the pixels
                    // at their final position.
                    self.dirty = true;
                }
            }
        }
    }

    /// One step of a move drag: vacate the pixels at the current position,
    /// shift the floating origin, and paste the visible window of the
    /// snapshot at the new position. The origin keeps accumulating past the
    /// image edges; only the pasted window is clamped.
    fn drag_floating(&mut self, drag: &mut MoveDrag, delta: (i32, i32)) {
        self.buffer.fill_region(self.selection, Color::TRANSPARENT);
        drag.origin.0 += delta.0;
        drag.origin.1 += delta.1;
        let size = (drag.floating.width(), drag.floating.height());
        match clamp_floating(drag.origin, size, self.buffer.width(), self.buffer.height()) {
            Some((dest, offset)) => {
                self.buffer.blit(dest, &drag.floating, offset);
                self.selection = dest;
            }
            None => {
                // Fully off-canvas: nothing visible, selection collapses
                // until the drag comes back.
                self.selection = Region::point(
                    drag.origin.0.clamp(0, self.buffer.width() as i32),
                    drag.origin.1.clamp(0, self.buffer.height() as i32),
                );
            }
        }
        self.dirty = true;
        self.modified = true;
    }

    fn tick_paint(&mut self) {
        if !self.primary_down || !self.gesture.is_idle() {
            return;
        }
        let (sx, sy) = self.pointer;
        if self.palette.occupies(sx, sy) {
            return;
        }
        let (w, h) = (self.buffer.width(), self.buffer.height());
        let Some((px, py)) = self.viewport.screen_to_image(sx, sy, w, h) else {
            return;
        };
        if self.ctrl_down {
            // Eyedrop: pull the pointed-at pixel into the active color.
            let picked = self.buffer.get(px, py);
            if picked != self.active_color {
                self.active_color = picked;
                self.dirty = true;
            }
        } else if self.selection.contains(px as i32, py as i32)
            && self.buffer.get(px, py) != self.active_color
        {
            // The selection doubles as a paint mask.
            self.buffer.set(px, py, self.active_color);
            self.dirty = true;
            self.modified = true;
        }
    }
}

// ============================================================================
// SESSION REGISTRY
// ============================================================================

/// Owns every open session. Explicitly passed to dispatch and render, never
/// a process global, so independent hosts (and tests) can run side by side.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Vec<EditorSession>,
    next_id: u32,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    /// Open a session around a pixel buffer, transferring ownership of the
    /// buffer to it. Returns the new session's window id.
    pub fn open(&mut self, buffer: PixelBuffer, path: Option<PathBuf>) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.sessions.push(EditorSession::new(id, buffer, path));
        id
    }

    /// Close a session; its buffer is dropped with it.
    pub fn close(&mut self, id: WindowId) {
        self.sessions.retain(|s| s.id != id);
    }

    pub fn get(&self, id: WindowId) -> Option<&EditorSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut EditorSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditorSession> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EditorSession> {
        self.sessions.iter_mut()
    }

    /// One loop iteration: tear down sessions addressed by quit events, then
    /// run every remaining session's update against its pointer position.
    pub fn update(&mut self, events: &[InputEvent], pointer_of: impl Fn(WindowId) -> (f32, f32)) {
        for ev in events {
            if matches!(ev.kind, EventKind::Quit) {
                self.close(ev.window);
            }
        }
        for session in &mut self.sessions {
            session.update(events, pointer_of(session.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8x8 white canvas with the viewport at the origin, one screen unit per
    /// pixel, so screen coordinates double as image coordinates. The default
    /// palette at (16, 16) lies outside that 8x8 screen area.
    fn test_session() -> EditorSession {
        let mut s = EditorSession::new(
            WindowId(0),
            PixelBuffer::new(8, 8, Color::WHITE),
            None,
        );
        s.viewport = Viewport { pan_x: 0.0, pan_y: 0.0, scale: 1.0 };
        s
    }

    fn press(button: PointerButton, x: f32, y: f32) -> InputEvent {
        InputEvent::button(WindowId(0), button, true, x, y)
    }

    fn release(button: PointerButton, x: f32, y: f32) -> InputEvent {
        InputEvent::button(WindowId(0), button, false, x, y)
    }

    fn key(k: KeyCommand) -> InputEvent {
        InputEvent::key(WindowId(0), k, true, false)
    }

    #[test]
    fn starts_dirty_with_full_selection() {
        let s = test_session();
        assert!(s.is_dirty());
        assert_eq!(s.selection(), Region::full(8, 8));
        assert!(!s.is_modified());
    }

    #[test]
    fn painting_respects_the_selection_mask() {
        let mut s = test_session();
        // Shrink the selection to (5,5)-(6,6), then try to paint (0,0).
        s.selection = Region::new(5, 5, 6, 6);
        s.update(&[press(PointerButton::Primary, 0.5, 0.5)], (0.5, 0.5));
        assert_eq!(s.buffer().get(0, 0), Color::WHITE);

        // Inside the mask the paint lands.
        s.update(&[], (5.5, 5.5));
        assert_eq!(s.buffer().get(5, 5), Color::default());
        assert!(s.is_modified());
    }

    #[test]
    fn eyedrop_reads_instead_of_writing() {
        let mut s = test_session();
        let mut buffer = PixelBuffer::new(8, 8, Color::WHITE);
        buffer.set(2, 2, Color::rgb(1, 2, 3));
        s.buffer = buffer;

        s.update(
            &[
                InputEvent::key(WindowId(0), KeyCommand::Ctrl, true, true),
                press(PointerButton::Primary, 2.5, 2.5),
            ],
            (2.5, 2.5),
        );
        assert_eq!(s.active_color(), Color::rgb(1, 2, 3));
        assert_eq!(s.buffer().get(2, 2), Color::rgb(1, 2, 3));
        assert!(!s.is_modified());
    }

    #[test]
    fn palette_press_picks_without_painting() {
        let mut s = test_session();
        // Move the canvas away so the palette press cannot also hit it.
        s.viewport.pan_x = 600.0;
        s.viewport.pan_y = 200.0;
        let swatch = s.palette.color(8);
        s.update(&[press(PointerButton::Primary, 16.5, 40.5)], (16.5, 40.5));
        assert_eq!(s.active_color(), swatch);
        assert!(s.is_dirty());
        assert!(!s.is_modified());
    }

    #[test]
    fn selection_gesture_normalizes_on_release() {
        let mut s = test_session();
        s.update(&[press(PointerButton::Primary, 6.5, 6.5)], (6.5, 6.5));
        s.update(&[key(KeyCommand::Select)], (6.5, 6.5));
        assert!(matches!(s.gesture(), Gesture::SelectionActive));

        // Drag up-left so the corners invert, then release.
        s.update(&[], (2.5, 3.5));
        s.update(&[release(PointerButton::Primary, 2.5, 3.5)], (2.5, 3.5));
        assert!(s.gesture().is_idle());
        assert_eq!(s.selection(), Region::new(2, 3, 6, 6));
    }

    #[test]
    fn select_all_only_mid_gesture() {
        let mut s = test_session();
        s.selection = Region::new(1, 1, 2, 2);

        // Idle: the command is ignored.
        s.update(&[key(KeyCommand::SelectAll)], (0.0, 0.0));
        assert_eq!(s.selection(), Region::new(1, 1, 2, 2));

        // Mid-selection: widens to the whole image and ends the gesture.
        s.update(&[press(PointerButton::Primary, 4.5, 4.5)], (4.5, 4.5));
        s.update(&[key(KeyCommand::Select), key(KeyCommand::SelectAll)], (4.5, 4.5));
        assert_eq!(s.selection(), Region::full(8, 8));
        assert!(s.gesture().is_idle());
    }

    #[test]
    fn move_with_empty_selection_cancels_silently() {
        let mut s = test_session();
        s.selection = Region::point(3, 3);
        s.update(&[press(PointerButton::Primary, 3.5, 3.5)], (3.5, 3.5));
        s.update(&[key(KeyCommand::Move)], (3.5, 3.5));
        assert!(s.gesture().is_idle());
    }

    #[test]
    fn move_start_waits_for_pointer_inside_selection() {
        let mut s = test_session();
        s.selection = Region::new(4, 4, 7, 7);
        s.update(&[press(PointerButton::Primary, 0.5, 0.5)], (0.5, 0.5));
        s.update(&[key(KeyCommand::Move)], (0.5, 0.5));
        assert!(matches!(s.gesture(), Gesture::MoveStart));

        s.update(&[], (5.5, 5.5));
        assert!(matches!(s.gesture(), Gesture::MoveActive(_)));
    }

    #[test]
    fn middle_drag_pans_from_the_press_point() {
        let mut s = test_session();
        s.update(&[press(PointerButton::Middle, 4.0, 4.0)], (4.0, 4.0));
        assert_eq!((s.viewport.pan_x, s.viewport.pan_y), (0.0, 0.0));

        s.update(&[], (7.0, 2.0));
        assert_eq!((s.viewport.pan_x, s.viewport.pan_y), (3.0, -2.0));

        s.update(&[release(PointerButton::Middle, 7.0, 2.0)], (9.0, 9.0));
        assert_eq!((s.viewport.pan_x, s.viewport.pan_y), (3.0, -2.0));
    }

    #[test]
    fn minimap_and_save_latches() {
        let mut s = test_session();
        s.update(&[key(KeyCommand::ToggleMinimap)], (0.0, 0.0));
        assert!(s.show_minimap);

        s.update(&[InputEvent::key(WindowId(0), KeyCommand::Save, true, true)], (0.0, 0.0));
        assert!(s.take_pending_save());
        assert!(!s.take_pending_save());
    }

    #[test]
    fn dirty_clears_when_nothing_happens() {
        let mut s = test_session();
        assert!(s.is_dirty());
        s.update(&[], (0.0, 0.0));
        assert!(!s.is_dirty());
    }

    #[test]
    fn registry_routes_events_per_window() {
        let mut reg = SessionRegistry::new();
        let a = reg.open(PixelBuffer::new(8, 8, Color::WHITE), None);
        let b = reg.open(PixelBuffer::new(8, 8, Color::WHITE), None);
        for id in [a, b] {
            let s = reg.get_mut(id).unwrap();
            s.viewport = Viewport { pan_x: 0.0, pan_y: 0.0, scale: 1.0 };
            s.selection = Region::full(8, 8);
        }

        // Paint lands only in window B.
        reg.update(
            &[InputEvent::button(b, PointerButton::Primary, true, 1.5, 1.5)],
            |_| (1.5, 1.5),
        );
        assert_eq!(reg.get(a).unwrap().buffer().get(1, 1), Color::WHITE);
        assert_eq!(reg.get(b).unwrap().buffer().get(1, 1), Color::default());

        reg.update(&[InputEvent::quit(b)], |_| (0.0, 0.0));
        assert_eq!(reg.len(), 1);
        assert!(reg.get(b).is_none());
        assert!(!reg.is_empty());
    }
}
