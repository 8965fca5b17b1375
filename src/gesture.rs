//! The selection / move gesture machine.
//!
//! One enum value per session. The machine is advanced once per frame by
//! [`crate::session::EditorSession`] against the current pointer position,
//! so a drag keeps tracking even on frames where no pointer event arrived.

use crate::canvas::{PixelBuffer, Region};

/// Gesture state of one editor session. Only one gesture can run at a time;
/// `MoveActive` owns the floating pixel snapshot for exactly as long as the
/// drag lasts, so the snapshot cannot leak or be aliased from another state.
#[derive(Debug)]
pub enum Gesture {
    /// No gesture running.
    Idle,
    /// A begin-selection command arrived; the next tick plants both corners
    /// on the pointer and hands over to `SelectionActive`.
    SelectionStart,
    /// Primary button held, second corner tracking the pointer. Released
    /// button normalizes the region and returns to `Idle`.
    SelectionActive,
    /// A begin-move command arrived; waits for the pointer to sit inside the
    /// selection, then snapshots it and hands over to `MoveActive`.
    MoveStart,
    /// Selection contents are floating under the pointer.
    MoveActive(MoveDrag),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// True while a selection is being dragged out (either phase).
    pub fn selecting(&self) -> bool {
        matches!(self, Gesture::SelectionStart | Gesture::SelectionActive)
    }
}

/// Payload of an in-progress move drag.
#[derive(Debug)]
pub struct MoveDrag {
    /// Snapshot of the selected pixels, taken when the drag began.
    pub floating: PixelBuffer,
    /// Unclamped image-space position of the snapshot's top-left corner.
    /// Keeps accumulating while the pointer pushes past an image edge, so
    /// dragging back in does not jump.
    pub origin: (i32, i32),
    /// Image pixel that was under the pointer on the previous tick.
    pub anchor: (i32, i32),
}

/// On-canvas window of a floating buffer whose unclamped top-left sits at
/// `origin`: the destination region on the image, plus the offset into the
/// buffer where reading starts. The offset is how much of the buffer hangs
/// off the top/left edge. `None` when the buffer is entirely off the canvas.
pub fn clamp_floating(
    origin: (i32, i32),
    size: (u32, u32),
    img_w: u32,
    img_h: u32,
) -> Option<(Region, (u32, u32))> {
    let span = Region::new(
        origin.0,
        origin.1,
        origin.0 + size.0 as i32,
        origin.1 + size.1 as i32,
    );
    let dest = span.intersect(&Region::full(img_w, img_h));
    if dest.is_empty() {
        return None;
    }
    let offset = ((dest.x0 - origin.0) as u32, (dest.y0 - origin.1) as u32);
    Some((dest, offset))
}

#[cfg(test)]
mod tests {
    use super::clamp_floating;
    use crate::canvas::Region;

    #[test]
    fn fully_inside_needs_no_offset() {
        let (dest, off) = clamp_floating((3, 4), (2, 2), 10, 10).unwrap();
        assert_eq!(dest, Region::new(3, 4, 5, 6));
        assert_eq!(off, (0, 0));
    }

    #[test]
    fn left_edge_shifts_the_source_window() {
        // Two columns hang off the left: the visible window starts at
        // buffer column 2 and the destination hugs the edge.
        let (dest, off) = clamp_floating((-2, 1), (5, 3), 10, 10).unwrap();
        assert_eq!(dest, Region::new(0, 1, 3, 4));
        assert_eq!(off, (2, 0));
    }

    #[test]
    fn bottom_right_clamps_without_offset() {
        let (dest, off) = clamp_floating((8, 9), (5, 3), 10, 10).unwrap();
        assert_eq!(dest, Region::new(8, 9, 10, 10));
        assert_eq!(off, (0, 0));
    }

    #[test]
    fn returning_from_an_edge_regrows_symmetrically() {
        // Push three columns off the left, then drag two back.
        let (dest, off) = clamp_floating((-3, 0), (4, 4), 8, 8).unwrap();
        assert_eq!((dest.width(), off.0), (1, 3));

        let (dest, off) = clamp_floating((-1, 0), (4, 4), 8, 8).unwrap();
        assert_eq!((dest.width(), off.0), (3, 1));

        let (dest, off) = clamp_floating((0, 0), (4, 4), 8, 8).unwrap();
        assert_eq!((dest.width(), off.0), (4, 0));
    }

    #[test]
    fn entirely_off_canvas_is_none() {
        assert!(clamp_floating((-4, 0), (4, 4), 8, 8).is_none());
        assert!(clamp_floating((8, 0), (4, 4), 8, 8).is_none());
        assert!(clamp_floating((0, -4), (4, 4), 8, 8).is_none());
        assert!(clamp_floating((0, 8), (4, 4), 8, 8).is_none());
    }
}
