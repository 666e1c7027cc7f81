use log::{debug, info};

use crate::elements::element::{Element, ElementId, ElementKind, ElementSummary};
use crate::elements::geometry::{Point2D, Size2D};
use crate::error::EditorError;

/// Background of the certificate. `uploaded` is only set once the backend
/// has accepted the file; a local preview alone does not count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Background {
    pub url: Option<String>,
    pub preview: Option<String>,
    pub uploaded: bool,
}

impl Background {
    /// Image the stage shows: the uploaded URL, else the local preview.
    pub fn display_src(&self) -> Option<&str> {
        self.url.as_deref().or(self.preview.as_deref())
    }
}

/// The template being edited: metadata plus the ordered element list.
#[derive(Debug, Clone, Default)]
pub struct TemplateDoc {
    pub name: String,
    pub merchant_id: Option<u32>,
    pub background: Background,
    elements: Vec<Element>,
    next_id: ElementId,
}

impl TemplateDoc {
    pub fn new() -> Self {
        Self { next_id: 1, ..Default::default() }
    }

    /// Append an element on top of the others and return its id.
    pub fn add_element(&mut self, kind: ElementKind, position: Point2D, size: Option<Size2D>) -> ElementId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let mut element = Element::new(id, kind, position, size);
        element.z_index = self.max_z_index() + 1;
        info!("add {} element #{} at ({:.1}, {:.1})", element.element_type().as_str(), id, element.x, element.y);

        self.elements.push(element);
        id
    }

    pub fn remove(&mut self, index: usize) -> Result<Element, EditorError> {
        if index >= self.elements.len() {
            return Err(EditorError::UnknownElement(index));
        }
        let removed = self.elements.remove(index);
        info!("removed element #{}", removed.id);
        Ok(removed)
    }

    /// Drop every element and the metadata; ids keep counting up.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.name.clear();
        self.merchant_id = None;
        self.background = Background::default();
    }

    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn nth(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn nth_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn max_z_index(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0)
    }

    /// Raise `id` above every other element. Returns its new z-index.
    pub fn bring_to_front(&mut self, id: ElementId) -> Option<i32> {
        let z = self.max_z_index() + 1;
        let element = self.get_mut(id)?;
        element.z_index = z;
        debug!("element #{} raised to z {}", id, z);
        Some(z)
    }

    /// Replace the whole element list, e.g. when loading a saved template.
    /// Ids are reassigned in order.
    pub fn replace_elements(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        self.next_id = 1;
        for mut element in elements {
            element.id = self.next_id;
            self.next_id += 1;
            self.elements.push(element);
        }
    }

    pub fn summaries(&self) -> Vec<ElementSummary> {
        self.elements.iter().enumerate().map(|(i, e)| ElementSummary::of(i, e)).collect()
    }
}
