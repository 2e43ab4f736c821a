//! Pointer input adapter.
//!
//! Translates client-space pointer events into synchronous store and
//! engine calls. Touch points feed the same pipeline as mouse points;
//! the consuming UI maps both onto [`pointer_down`](PointerInput::pointer_down),
//! [`pointer_move`](PointerInput::pointer_move), and
//! [`pointer_up`](PointerInput::pointer_up).
//!
//! The interaction state machine is linear: `idle -> (down hits an
//! annotation) -> dragging -> (up/leave) -> idle`, and `idle -> (down
//! misses) -> new annotation created and selected -> idle`. There are
//! no other states and no undo.

use crate::annotation::{MemeStore, TextPatch};
use crate::geometry::Point;
use crate::render::{Painter, Surface};

/// Where the surface is displayed in the consumer's client coordinate
/// space (CSS layout may scale it independently of its pixel size).
#[derive(Debug, Clone, Copy)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub displayed_width: f32,
    pub displayed_height: f32,
}

/// Convert a client-space pointer position to surface-pixel space.
///
/// Decouples interaction logic from display scaling: hit-testing and
/// new-annotation placement always operate in surface pixels.
pub fn to_surface(
    client: Point,
    rect: &SurfaceRect,
    surface_width: u32,
    surface_height: u32,
) -> Point {
    Point::new(
        (client.x - rect.left) * (surface_width as f32 / rect.displayed_width.max(1.0)),
        (client.y - rect.top) * (surface_height as f32 / rect.displayed_height.max(1.0)),
    )
}

/// What a pointer-down did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// An existing annotation was hit and selected; a drag began.
    Selected(usize),
    /// The pointer missed everything; a new annotation was created
    /// and selected at that position.
    Created(usize),
    /// No image is loaded; the event was ignored.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        index: usize,
        /// Grab offset from the annotation center, so the grab point
        /// stays under the cursor for the whole drag.
        offset: Point,
    },
}

/// Pointer session state plus the defaults applied to annotations
/// created by clicking empty space.
#[derive(Debug, Clone)]
pub struct PointerInput {
    state: DragState,
    pub default_font_size: f32,
    pub default_color: String,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            default_font_size: 40.0,
            default_color: "#ffffff".to_string(),
        }
    }
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(font_size: f32, color: impl Into<String>) -> Self {
        Self {
            state: DragState::Idle,
            default_font_size: font_size,
            default_color: color.into(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pointer down at a surface-space position: select and start
    /// dragging the hit annotation, or create a new one on a miss.
    pub fn pointer_down(
        &mut self,
        store: &mut MemeStore,
        painter: &Painter,
        position: Point,
    ) -> PointerOutcome {
        if store.image().is_none() {
            return PointerOutcome::Ignored;
        }

        match painter.hit_test(position, store.annotations()) {
            Some(index) => {
                // select() cannot fail: hit_test returned an in-bounds index.
                let _ = store.select(Some(index));
                let annotation = &store.annotations()[index];
                self.state = DragState::Dragging {
                    index,
                    offset: Point::new(position.x - annotation.x, position.y - annotation.y),
                };
                PointerOutcome::Selected(index)
            }
            None => {
                store.add_text(
                    position.x,
                    position.y,
                    self.default_font_size,
                    self.default_color.clone(),
                );
                PointerOutcome::Created(store.len() - 1)
            }
        }
    }

    /// Pointer move while dragging: relocate the dragged annotation,
    /// clamping its measured text box to the surface so a caption can
    /// never be dragged fully out of view. The clamp applies only to
    /// interactive drags, nowhere else.
    pub fn pointer_move(
        &mut self,
        store: &mut MemeStore,
        painter: &Painter,
        surface: &Surface,
        position: Point,
    ) {
        let DragState::Dragging { index, offset } = self.state else {
            return;
        };
        if index >= store.len() {
            // The annotation vanished mid-drag (e.g. keyboard delete).
            self.state = DragState::Idle;
            return;
        }

        let mut x = position.x - offset.x;
        let mut y = position.y - offset.y;

        let moved = {
            let mut annotation = store.annotations()[index].clone();
            annotation.x = x;
            annotation.y = y;
            painter.text_rect(&annotation)
        };
        let half_w = moved.width / 2.0;
        let half_h = moved.height / 2.0;
        x = x.clamp(half_w, (surface.width() as f32 - half_w).max(half_w));
        y = y.clamp(half_h, (surface.height() as f32 - half_h).max(half_h));

        // In-bounds index checked above.
        let _ = store.update_text(index, TextPatch::new().position(x, y));
    }

    /// Pointer up or leave: end any drag.
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }
}
