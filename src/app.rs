//! eframe frontend.
//!
//! Everything the editing core treats as a collaborator lives here: egui
//! input is translated into the normalized event stream, the registry runs
//! once per frame against the current pointer position, and the resulting
//! state is drawn (canvas quad, grid overlay, selection outline, palette,
//! minimap). The canvas texture is only re-uploaded on frames where the
//! session reports itself dirty.

use std::collections::HashMap;
use std::time::Duration;

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Stroke, TextureHandle, TextureOptions, pos2, vec2};
use rayon::prelude::*;

use crate::canvas::{Color, PixelBuffer};
use crate::config::EditorConfig;
use crate::event::{InputEvent, KeyCommand, PointerButton, WindowId};
use crate::session::{EditorSession, SessionRegistry};
use crate::viewport::Viewport;
use crate::{io, log_err};

/// Clear color behind the canvas, the original editor's light gray.
const BACKGROUND: Color32 = Color32::from_rgb(230, 230, 230);
/// Longest edge of the minimap, in screen points.
const MINIMAP_EDGE: f32 = 160.0;
/// Pixel count above which the buffer -> texture conversion goes parallel.
const PAR_CONVERT_THRESHOLD: usize = 256 * 256;

pub struct PixedApp {
    registry: SessionRegistry,
    /// Session shown in this OS window.
    window: WindowId,
    config: EditorConfig,
    textures: HashMap<WindowId, TextureHandle>,
    ctrl_was_down: bool,
    pointer: Pos2,
}

impl PixedApp {
    pub fn new(registry: SessionRegistry, window: WindowId, config: EditorConfig) -> PixedApp {
        PixedApp {
            registry,
            window,
            config,
            textures: HashMap::new(),
            ctrl_was_down: false,
            pointer: Pos2::ZERO,
        }
    }

    /// Fold this frame's egui input into normalized events for the core.
    fn collect_events(&mut self, ctx: &egui::Context) -> Vec<InputEvent> {
        let win = self.window;
        let mut events = Vec::new();

        let (ctrl_now, scroll, hover) = ctx.input(|i| {
            for ev in &i.events {
                match ev {
                    egui::Event::PointerButton { pos, button, pressed, .. } => {
                        let mapped = match button {
                            egui::PointerButton::Primary => Some(PointerButton::Primary),
                            egui::PointerButton::Secondary => Some(PointerButton::Secondary),
                            egui::PointerButton::Middle => Some(PointerButton::Middle),
                            _ => None,
                        };
                        if let Some(b) = mapped {
                            events.push(InputEvent::button(win, b, *pressed, pos.x, pos.y));
                        }
                    }
                    egui::Event::Key { key, pressed, modifiers, .. } => {
                        let with_ctrl = modifiers.ctrl || modifiers.command;
                        let mapped = match key {
                            egui::Key::S if with_ctrl => Some(KeyCommand::Save),
                            egui::Key::S => Some(KeyCommand::Select),
                            egui::Key::A => Some(KeyCommand::SelectAll),
                            egui::Key::M => Some(KeyCommand::Move),
                            egui::Key::Tab => Some(KeyCommand::ToggleMinimap),
                            _ => None,
                        };
                        if let Some(k) = mapped {
                            events.push(InputEvent::key(win, k, *pressed, with_ctrl));
                        }
                    }
                    _ => {}
                }
            }
            (i.modifiers.ctrl, i.scroll_delta.y, i.pointer.hover_pos())
        });

        // egui reports held modifiers per frame; the core wants transitions.
        if ctrl_now != self.ctrl_was_down {
            self.ctrl_was_down = ctrl_now;
            events.push(InputEvent::key(win, KeyCommand::Ctrl, ctrl_now, ctrl_now));
        }

        // One zoom tick per frame of wheel motion, anchored at the pointer.
        // Wheel-up doubles the pixels on screen, wheel-down halves them.
        if scroll != 0.0 && let Some(pos) = hover {
            let shrink = scroll < 0.0;
            events.push(InputEvent::button(win, PointerButton::ScrollTick, shrink, pos.x, pos.y));
        }

        events
    }

    fn window_title(&self) -> String {
        match self.registry.get(self.window) {
            Some(session) => {
                let name = session
                    .path
                    .as_deref()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .unwrap_or("untitled");
                let star = if session.is_modified() { "*" } else { "" };
                format!("{}{} - pixed", name, star)
            }
            None => "pixed".to_string(),
        }
    }

    fn draw_session(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.registry.get(self.window) else {
            return;
        };

        // Texture upload, gated on the session's redraw flag.
        if session.is_dirty() || !self.textures.contains_key(&session.id) {
            let img = buffer_to_color_image(session.buffer());
            match self.textures.get_mut(&session.id) {
                Some(tex) => tex.set(img, TextureOptions::NEAREST),
                None => {
                    let tex = ui.ctx().load_texture("canvas", img, TextureOptions::NEAREST);
                    self.textures.insert(session.id, tex);
                }
            }
        }

        let (_response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::hover());

        let vp = session.viewport;
        let (w, h) = (session.buffer().width(), session.buffer().height());
        let canvas_rect = Rect::from_min_size(
            pos2(vp.pan_x, vp.pan_y),
            vec2(w as f32 * vp.scale, h as f32 * vp.scale),
        );

        if let Some(tex) = self.textures.get(&session.id) {
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(tex.id(), canvas_rect, uv, Color32::WHITE);
            draw_grid(&painter, &vp, canvas_rect, self.config.tile_grid_spacing);
            draw_selection(&painter, session, &vp);
            draw_palette(&painter, session);
            if session.show_minimap {
                draw_minimap(&painter, tex, w, h);
            }
        }
    }
}

impl eframe::App for PixedApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.9, 0.9, 0.9, 1.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));

        let mut events = self.collect_events(ctx);
        if ctx.input(|i| i.viewport().close_requested()) {
            events.push(InputEvent::quit(self.window));
        }
        if let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) {
            self.pointer = pos;
        }

        let pointer = (self.pointer.x, self.pointer.y);
        self.registry.update(&events, |_| pointer);

        if self.registry.is_empty() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Save commands run here, outside the core: the dialog and the
        // encoder are collaborators the session only signals.
        if let Some(session) = self.registry.get_mut(self.window)
            && session.take_pending_save()
            && let Err(e) = io::save_session(session)
        {
            log_err!("save failed: {}", e);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| self.draw_session(ui));

        // Gestures advance against the live pointer even on frames without
        // input events, so keep the loop ticking while one is running.
        let gesture_running = self
            .registry
            .get(self.window)
            .is_some_and(|s| !s.gesture().is_idle());
        if gesture_running {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        crate::config::save(&self.config);
    }
}

// ============================================================================
// Painting helpers
// ============================================================================

fn to_color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn buffer_to_color_image(buffer: &PixelBuffer) -> ColorImage {
    let px = buffer.pixels();
    let pixels: Vec<Color32> = if px.len() >= PAR_CONVERT_THRESHOLD {
        px.par_iter().map(|c| to_color32(*c)).collect()
    } else {
        px.iter().map(|c| to_color32(*c)).collect()
    };
    ColorImage {
        size: [buffer.width() as usize, buffer.height() as usize],
        pixels,
    }
}

/// Pixel grid, drawn only when pixels are larger than two screen units:
/// a faint line per pixel column/row plus a stronger line every
/// `tile_spacing` pixels. Line ranges are clipped to the visible part of
/// the canvas so a deep zoom doesn't emit thousands of segments.
fn draw_grid(painter: &egui::Painter, vp: &Viewport, canvas_rect: Rect, tile_spacing: u32) {
    if vp.scale <= 2.0 {
        return;
    }
    let visible = painter.clip_rect().intersect(canvas_rect);
    if visible.width() <= 0.0 || visible.height() <= 0.0 {
        return;
    }

    let fine = Color32::from_black_alpha(48);
    let coarse = Color32::from_black_alpha(112);
    let tile = tile_spacing.max(1);

    let col0 = ((visible.min.x - vp.pan_x) / vp.scale).floor().max(0.0) as u32;
    let col1 = ((visible.max.x - vp.pan_x) / vp.scale).ceil() as u32;
    for col in col0..=col1 {
        let x = vp.pan_x + col as f32 * vp.scale;
        let color = if col % tile == 0 { coarse } else { fine };
        painter.line_segment(
            [pos2(x, visible.min.y), pos2(x, visible.max.y)],
            Stroke::new(1.0, color),
        );
    }

    let row0 = ((visible.min.y - vp.pan_y) / vp.scale).floor().max(0.0) as u32;
    let row1 = ((visible.max.y - vp.pan_y) / vp.scale).ceil() as u32;
    for row in row0..=row1 {
        let y = vp.pan_y + row as f32 * vp.scale;
        let color = if row % tile == 0 { coarse } else { fine };
        painter.line_segment(
            [pos2(visible.min.x, y), pos2(visible.max.x, y)],
            Stroke::new(1.0, color),
        );
    }
}

fn draw_selection(painter: &egui::Painter, session: &EditorSession, vp: &Viewport) {
    let region = session.selection().normalized();
    if region.is_empty() {
        return;
    }
    let (x0, y0) = vp.image_to_screen(region.x0 as f32, region.y0 as f32);
    let (x1, y1) = vp.image_to_screen(region.x1 as f32, region.y1 as f32);
    painter.rect_stroke(
        Rect::from_min_max(pos2(x0, y0), pos2(x1, y1)),
        0.0,
        Stroke::new(1.5, Color32::from_rgb(255, 200, 40)),
    );
}

fn draw_palette(painter: &egui::Painter, session: &EditorSession) {
    let palette = &session.palette;
    let (px, py) = palette.pos;
    let tile = palette.tile;
    let border = Color32::from_black_alpha(64);

    let mut rows = 0;
    for (i, color) in palette.colors().iter().enumerate() {
        let col = i % palette.per_row;
        let row = i / palette.per_row;
        rows = rows.max(row + 1);
        let rect = Rect::from_min_size(
            pos2(px + col as f32 * tile, py + row as f32 * tile),
            vec2(tile, tile),
        );
        painter.rect_filled(rect, 0.0, to_color32(*color));
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, border));
    }

    // Active color readout under the grid.
    let readout = Rect::from_min_size(
        pos2(px, py + rows as f32 * tile + 8.0),
        vec2(tile * 2.0, tile),
    );
    painter.rect_filled(readout, 2.0, to_color32(session.active_color()));
    painter.rect_stroke(readout, 2.0, Stroke::new(1.0, Color32::BLACK));
}

fn draw_minimap(painter: &egui::Painter, tex: &TextureHandle, img_w: u32, img_h: u32) {
    let clip = painter.clip_rect();
    let scale = MINIMAP_EDGE / img_w.max(img_h) as f32;
    let size = vec2(img_w as f32 * scale, img_h as f32 * scale);
    let rect = Rect::from_min_size(
        pos2(clip.max.x - size.x - 12.0, clip.min.y + 12.0),
        size,
    );
    painter.rect_filled(rect.expand(2.0), 0.0, Color32::from_gray(60));
    let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    painter.image(tex.id(), rect, uv, Color32::WHITE);
    painter.rect_stroke(rect.expand(2.0), 0.0, Stroke::new(1.0, Color32::BLACK));
}
