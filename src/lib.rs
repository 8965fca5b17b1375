//! pixed, a small raster pixel editor.
//!
//! The editing core is headless: [`session::SessionRegistry`] consumes a
//! batch of normalized [`event::InputEvent`]s plus the current pointer
//! position once per loop iteration and mutates pixel buffers, selections,
//! and viewports. [`app::PixedApp`] is the eframe shell that feeds it and
//! draws the result.

pub mod app;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod event;
pub mod gesture;
pub mod io;
pub mod logger;
pub mod palette;
pub mod session;
pub mod viewport;
