//! Pointer drag state machine for moving elements on the canvas.
//!
//! Only one element can be dragged at a time: the controller is a single
//! state holder keyed by the element being dragged, not per-element state.

use log::{debug, info};

use crate::canvas::clamp_to_canvas;
use crate::elements::element::ElementId;
use crate::elements::geometry::{Point2D, Size2D, Vector2D};
use crate::template_doc::TemplateDoc;

/// Which pointer pressed. Secondary buttons and non-primary touches never start a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub pointer_id: i32,
    pub button: i16,
    pub is_primary: bool,
}

impl PointerPress {
    pub fn primary(pointer_id: i32) -> Self {
        Self { pointer_id, button: 0, is_primary: true }
    }

    fn starts_drag(&self) -> bool {
        self.button == 0 && self.is_primary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: ElementId,
        /// pointer position minus element position, in logical units
        offset: Vector2D,
        size: Size2D,
        pointer_id: i32,
    },
}

/// Result of a press that started a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    pub id: ElementId,
    pub z_index: i32,
    /// Pointer to capture so movement is tracked outside the element.
    pub pointer_id: i32,
}

/// Position committed to the model by a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMove {
    pub id: ElementId,
    pub position: Point2D,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEnd {
    pub id: ElementId,
    pub pointer_id: i32,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged(&self) -> Option<ElementId> {
        match self.state {
            DragState::Dragging { id, .. } => Some(id),
            DragState::Idle => None,
        }
    }

    /// Idle → Dragging. `pointer` is already in logical units, `measured` is the
    /// element's laid-out size (zero when it has not been laid out yet).
    pub fn press(
        &mut self,
        doc: &mut TemplateDoc,
        id: ElementId,
        pointer: Point2D,
        measured: Size2D,
        press: PointerPress,
    ) -> Option<DragStart> {
        if self.is_dragging() || !press.starts_drag() {
            return None;
        }

        let element_pos = doc.get(id)?.position();
        let z_index = doc.bring_to_front(id)?;

        self.state = DragState::Dragging {
            id,
            offset: pointer - element_pos,
            size: measured,
            pointer_id: press.pointer_id,
        };
        debug!("drag start #{} at ({:.1}, {:.1})", id, element_pos.x, element_pos.y);

        Some(DragStart { id, z_index, pointer_id: press.pointer_id })
    }

    /// While dragging: move the element under the pointer, clamped to the canvas,
    /// and commit the position to the model.
    pub fn move_to(&mut self, doc: &mut TemplateDoc, pointer: Point2D) -> Option<DragMove> {
        let DragState::Dragging { id, offset, size, .. } = self.state else {
            return None;
        };

        let Some(element) = doc.get_mut(id) else {
            // element removed mid-drag
            self.state = DragState::Idle;
            return None;
        };

        let position = clamp_to_canvas(pointer - offset, size);
        element.set_position(position);

        Some(DragMove { id, position })
    }

    /// Dragging → Idle, wherever the pointer is released.
    pub fn release(&mut self, doc: &TemplateDoc) -> Option<DragEnd> {
        let DragState::Dragging { id, pointer_id, .. } = std::mem::take(&mut self.state) else {
            return None;
        };

        if let Some(element) = doc.get(id) {
            info!("element #{} dropped at ({:.1}, {:.1})", id, element.x, element.y);
        }
        Some(DragEnd { id, pointer_id })
    }
}
