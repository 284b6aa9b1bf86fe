// Driftchat Core — Per-Surface Drag State
//
// One DragState per draggable surface (trigger button, chat panel). A drag
// begins by recording where inside the surface the pointer grabbed it, so
// subsequent moves keep that grip point under the pointer instead of
// snapping the corner to the cursor.

use crate::geometry::{clamp_position, Point, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// Top-left corner of the surface, always clamped to the viewport.
    pub position: Point,
    /// True between begin_drag and end_drag for this surface only.
    pub dragging: bool,
    /// Pointer position minus surface top-left, captured at drag start.
    pub grab_offset: Point,
}

impl DragState {
    pub fn at(position: Point) -> Self {
        DragState {
            position,
            dragging: false,
            grab_offset: Point::ZERO,
        }
    }

    /// Start a drag: remember the grip point and mark the surface live.
    pub fn begin(&mut self, pointer: Point) {
        self.grab_offset = pointer.minus(self.position);
        self.dragging = true;
    }

    /// Apply a pointer move. Returns true if the position changed.
    /// Ignored entirely unless this surface is dragging.
    pub fn move_to(&mut self, pointer: Point, surface: Size, viewport: Size) -> bool {
        if !self.dragging {
            return false;
        }
        let next = clamp_position(pointer.minus(self.grab_offset), surface, viewport);
        if next == self.position {
            return false;
        }
        self.position = next;
        true
    }

    pub fn end(&mut self) {
        self.dragging = false;
    }

    /// Re-apply the viewport bound to the stored position. Used after a
    /// window resize so a surface can never be stranded off-screen.
    pub fn reclamp(&mut self, surface: Size, viewport: Size) {
        self.position = clamp_position(self.position, surface, viewport);
    }
}
