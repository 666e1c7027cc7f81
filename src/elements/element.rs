use serde::{Deserialize, Serialize};

use crate::canvas::clamp_to_canvas;
use crate::error::EditorError;

use super::geometry::{Point2D, Size2D};
use super::image::ImageElement;
use super::qr_code::QrCodeElement;
use super::text_box::{TextBox, TextProperties};

pub type ElementId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Text,
    QrCode,
    Image,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::QrCode => "qrcode",
            ElementType::Image => "image",
        }
    }

    /// Size used when the caller does not give one.
    pub fn default_size(&self) -> Size2D {
        match self {
            ElementType::Text => Size2D::new(200.0, 30.0),
            ElementType::QrCode => Size2D::new(100.0, 100.0),
            ElementType::Image => Size2D::new(150.0, 100.0),
        }
    }
}

/// Per-type payload of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Text(TextBox),
    QrCode(QrCodeElement),
    Image(ImageElement),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::QrCode(_) => ElementType::QrCode,
            ElementKind::Image(_) => ElementType::Image,
        }
    }
}

/// One positioned object on the logical canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind, position: Point2D, size: Option<Size2D>) -> Self {
        let size = size.filter(|s| !s.is_empty()).unwrap_or_else(|| kind.element_type().default_size());
        let size = square_if_qr(&kind, size);
        let pos = clamp_to_canvas(position, size);
        Self {
            id,
            x: pos.x,
            y: pos.y,
            width: size.width,
            height: size.height,
            z_index: 0,
            kind,
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn size(&self) -> Size2D {
        Size2D::new(self.width, self.height)
    }

    pub fn set_position(&mut self, pos: Point2D) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match &self.kind {
            ElementKind::Text(tb) => Some(tb),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBox> {
        match &mut self.kind {
            ElementKind::Text(tb) => Some(tb),
            _ => None,
        }
    }

    /// Apply an edit from the element form. Position is re-clamped afterwards.
    pub fn apply(&mut self, patch: &ElementPatch) -> Result<(), EditorError> {
        if let Some(width) = patch.width {
            self.width = positive("width", width)?;
        }
        if let Some(height) = patch.height {
            self.height = positive("height", height)?;
        }

        match &mut self.kind {
            ElementKind::Text(tb) => {
                tb.apply(&patch.text_properties)?;
                if let Some(text) = patch.text.as_deref() {
                    if !tb.set_text(text) {
                        return Err(EditorError::InvalidInput("placeholder text cannot be edited".into()));
                    }
                }
            }
            ElementKind::QrCode(qr) => {
                if let Some(data) = patch.data.as_deref() {
                    qr.data = data.to_string();
                }
            }
            ElementKind::Image(img) => {
                if let Some(src) = patch.src.as_deref() {
                    *img = ImageElement::new(src);
                }
            }
        }

        let size = square_if_qr(&self.kind, self.size());
        self.height = size.height;

        let pos = Point2D::new(patch.x.unwrap_or(self.x), patch.y.unwrap_or(self.y));
        self.set_position(clamp_to_canvas(pos, self.size()));
        Ok(())
    }
}

/// QR codes are drawn width × width.
fn square_if_qr(kind: &ElementKind, size: Size2D) -> Size2D {
    match kind {
        ElementKind::QrCode(_) => Size2D::new(size.width, size.width),
        _ => size,
    }
}

fn positive(name: &str, value: f64) -> Result<f64, EditorError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EditorError::InvalidInput(format!("{name} must be positive, got {value}")))
    }
}

/// Field edits coming from `updateElement`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub text: Option<String>,
    pub data: Option<String>,
    pub src: Option<String>,
    #[serde(flatten)]
    pub text_properties: TextProperties,
}

/// Row of the element list shown next to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub index: usize,
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl ElementSummary {
    pub fn of(index: usize, element: &Element) -> Self {
        let label = match &element.kind {
            ElementKind::Text(tb) => tb.display_text().to_string(),
            ElementKind::QrCode(qr) => qr.data.clone(),
            ElementKind::Image(img) => img.src.clone(),
        };
        Self {
            index,
            id: element.id,
            element_type: element.element_type(),
            label,
            x: element.x,
            y: element.y,
        }
    }
}
