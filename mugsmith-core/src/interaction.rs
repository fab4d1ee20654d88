//! Pointer-driven move/resize controller.
//!
//! One gesture slot is shared by every element. Pointer samples are coalesced
//! through a [`FrameScheduler`] so at most one recomputation happens per
//! display frame; each recomputation commits clamped geometry to the scene
//! immediately, so ending a gesture needs no final commit step.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::error::{CanvasError, CanvasResult};
use crate::frame::{FrameScheduler, FrameToken};
use crate::geometry::{clamp_range, Point, Rect};
use crate::scene::Scene;

/// One of the eight resize handles around an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    /// Top edge.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge.
    W,
    /// Top-left corner.
    Nw,
}

impl ResizeHandle {
    /// All handles, clockwise from the top edge.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    /// Handle drags the left edge.
    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Handle drags the right edge.
    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Handle drags the top edge.
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Handle drags the bottom edge.
    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// CSS cursor name for this handle.
    #[must_use]
    pub fn cursor_name(self) -> &'static str {
        match self {
            Self::N => "n-resize",
            Self::Ne => "ne-resize",
            Self::E => "e-resize",
            Self::Se => "se-resize",
            Self::S => "s-resize",
            Self::Sw => "sw-resize",
            Self::W => "w-resize",
            Self::Nw => "nw-resize",
        }
    }
}

/// Document-wide cursor forced while a gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Host default cursor.
    #[default]
    Default,
    /// Closed hand while moving.
    Grabbing,
    /// Directional resize cursor.
    Resize(ResizeHandle),
}

impl Cursor {
    /// CSS cursor name.
    #[must_use]
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grabbing => "grabbing",
            Self::Resize(handle) => handle.cursor_name(),
        }
    }
}

/// Global side effects the host applies while a gesture runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEffects {
    /// Cursor the host document should show.
    pub cursor: Cursor,
    /// Whether text selection is allowed.
    pub text_selection: bool,
}

impl Default for HostEffects {
    fn default() -> Self {
        Self {
            cursor: Cursor::Default,
            text_selection: true,
        }
    }
}

/// Transient translate applied by the view on top of committed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualFeedback {
    /// Translation in canvas pixels.
    pub translate: Point,
}

/// Active gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// No gesture in progress.
    Idle,
    /// Moving an element.
    Moving {
        /// Element being moved.
        id: ElementId,
        /// Element position when the gesture began.
        start_position: Point,
        /// Pointer offset from the element's top-left corner.
        start_offset: Point,
    },
    /// Resizing an element.
    Resizing {
        /// Element being resized.
        id: ElementId,
        /// Active handle.
        handle: ResizeHandle,
        /// Pointer position (canvas space) when the gesture began.
        start_pointer: Point,
        /// Element geometry when the gesture began.
        start_rect: Rect,
    },
}

impl Gesture {
    /// Element targeted by the gesture.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Moving { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }
}

/// Translates pointer events into committed element geometry.
#[derive(Debug)]
pub struct InteractionController {
    canvas_origin: Point,
    gesture: Gesture,
    frames: FrameScheduler<Point>,
    feedback: Option<VisualFeedback>,
    host: HostEffects,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(Point::default())
    }
}

impl InteractionController {
    /// Create a controller for a canvas whose top-left sits at `canvas_origin`
    /// in pointer coordinates.
    #[must_use]
    pub fn new(canvas_origin: Point) -> Self {
        Self {
            canvas_origin,
            gesture: Gesture::Idle,
            frames: FrameScheduler::new(),
            feedback: None,
            host: HostEffects::default(),
        }
    }

    /// Update the on-screen origin of the canvas (e.g. after layout or scroll).
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.canvas_origin = origin;
    }

    /// Current gesture.
    #[must_use]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Visual feedback for the element being dragged, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<VisualFeedback> {
        self.feedback
    }

    /// Effects the host should currently apply.
    #[must_use]
    pub fn host_effects(&self) -> HostEffects {
        self.host
    }

    /// Frame scheduler statistics (superseded, delivered).
    #[must_use]
    pub fn frame_stats(&self) -> (u64, u64) {
        (self.frames.superseded(), self.frames.delivered())
    }

    /// Begin moving `id`. Selects the element.
    ///
    /// # Errors
    ///
    /// Fails if another gesture is active or the element does not exist.
    pub fn begin_move(&mut self, scene: &mut Scene, id: ElementId, pointer: Point) -> CanvasResult<()> {
        self.ensure_idle()?;
        let position = scene
            .get(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?
            .position;
        scene.select(id)?;

        let canvas_pointer = self.to_canvas(pointer);
        self.gesture = Gesture::Moving {
            id,
            start_position: position,
            start_offset: canvas_pointer.delta_from(position),
        };
        self.host = HostEffects {
            cursor: Cursor::Grabbing,
            text_selection: false,
        };
        tracing::debug!(%id, "move gesture started");
        Ok(())
    }

    /// Begin resizing `id` from `handle`. Selects the element.
    ///
    /// # Errors
    ///
    /// Fails if another gesture is active or the element does not exist.
    pub fn begin_resize(
        &mut self,
        scene: &mut Scene,
        id: ElementId,
        handle: ResizeHandle,
        pointer: Point,
    ) -> CanvasResult<()> {
        self.ensure_idle()?;
        let rect = scene
            .get(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?
            .rect();
        scene.select(id)?;

        self.gesture = Gesture::Resizing {
            id,
            handle,
            start_pointer: self.to_canvas(pointer),
            start_rect: rect,
        };
        self.host = HostEffects {
            cursor: Cursor::Resize(handle),
            text_selection: false,
        };
        tracing::debug!(%id, ?handle, "resize gesture started");
        Ok(())
    }

    /// Record a pointer sample. The recomputation is deferred to the next
    /// frame; any sample still waiting is dropped.
    ///
    /// Returns `None` when no gesture is active.
    pub fn on_pointer_move(&mut self, pointer: Point) -> Option<FrameToken> {
        if self.is_active() {
            Some(self.frames.schedule(pointer))
        } else {
            None
        }
    }

    /// Run the once-per-frame recomputation for the latest pointer sample.
    ///
    /// Returns the committed rectangle, or `None` when nothing was pending.
    ///
    /// # Errors
    ///
    /// Fails if the gesture's element was removed mid-gesture; the gesture is
    /// then released.
    pub fn on_animation_frame(&mut self, scene: &mut Scene) -> CanvasResult<Option<Rect>> {
        let Some(pointer) = self.frames.take() else {
            return Ok(None);
        };
        match self.apply(scene, pointer) {
            Ok(rect) => Ok(rect),
            Err(err) => {
                self.release();
                Err(err)
            }
        }
    }

    /// Finish the gesture: flush the last pending sample, clear visual
    /// feedback and restore host effects.
    ///
    /// # Errors
    ///
    /// Fails if the gesture's element disappeared; state is released regardless.
    pub fn end_gesture(&mut self, scene: &mut Scene) -> CanvasResult<()> {
        let result = match self.frames.take() {
            Some(pointer) if self.is_active() => self.apply(scene, pointer).map(|_| ()),
            _ => Ok(()),
        };
        if let Some(id) = self.gesture.element() {
            tracing::debug!(%id, "gesture ended");
        }
        self.release();
        result
    }

    /// Abnormal termination (pointer released outside, window blur): drop
    /// the pending sample and restore host effects. Geometry already
    /// committed stays.
    pub fn abort_gesture(&mut self) {
        if let Some(id) = self.gesture.element() {
            tracing::debug!(%id, "gesture aborted");
        }
        self.frames.clear();
        self.release();
    }

    fn release(&mut self) {
        self.gesture = Gesture::Idle;
        self.feedback = None;
        self.frames.clear();
        self.host = HostEffects::default();
    }

    fn ensure_idle(&self) -> CanvasResult<()> {
        match self.gesture.element() {
            Some(active) => Err(CanvasError::InvalidOperation(format!(
                "gesture already active on {active}"
            ))),
            None => Ok(()),
        }
    }

    fn to_canvas(&self, pointer: Point) -> Point {
        pointer.delta_from(self.canvas_origin)
    }

    fn apply(&mut self, scene: &mut Scene, pointer: Point) -> CanvasResult<Option<Rect>> {
        let canvas_pointer = self.to_canvas(pointer);
        match self.gesture {
            Gesture::Idle => Ok(None),
            Gesture::Moving { id, start_offset, .. } => {
                let element = scene
                    .get(id)
                    .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
                let committed = element.position;
                let size = element.size;

                let target = canvas_pointer.delta_from(start_offset);
                self.feedback = Some(VisualFeedback {
                    translate: target.delta_from(committed),
                });
                let rect = scene.set_rect(id, Rect::from_parts(target, size))?;
                Ok(Some(rect))
            }
            Gesture::Resizing {
                id,
                handle,
                start_pointer,
                start_rect,
            } => {
                let delta = canvas_pointer.delta_from(start_pointer);
                let rect = resize_rect(start_rect, handle, delta, scene);
                self.feedback = None;
                Ok(Some(scene.set_rect(id, rect)?))
            }
        }
    }
}

/// Apply a handle drag of `delta` to `start`, keeping the opposite edge
/// anchored and the result inside the scene.
#[must_use]
pub fn resize_rect(start: Rect, handle: ResizeHandle, delta: Point, scene: &Scene) -> Rect {
    let bounds = scene.size();
    let min_w = scene.min_element_size().min(bounds.width);
    let min_h = scene.min_element_size().min(bounds.height);

    let (x, width) = if handle.moves_west() {
        let right = start.right().min(bounds.width);
        let x = clamp_range(start.x + delta.x, 0.0, right - min_w);
        (x, right - x)
    } else if handle.moves_east() {
        let width = clamp_range(start.width + delta.x, min_w, bounds.width - start.x);
        (start.x, width)
    } else {
        (start.x, start.width)
    };

    let (y, height) = if handle.moves_north() {
        let bottom = start.bottom().min(bounds.height);
        let y = clamp_range(start.y + delta.y, 0.0, bottom - min_h);
        (y, bottom - y)
    } else if handle.moves_south() {
        let height = clamp_range(start.height + delta.y, min_h, bounds.height - start.y);
        (start.y, height)
    } else {
        (start.y, start.height)
    };

    Rect::new(x, y, width, height)
}
