//! Builds the view of the canvas from the element model.
//!
//! Output is a plain description (styles, text, image sources) so the DOM
//! layer only has to create nodes; every model change redraws the full list.

use crate::canvas::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::elements::element::{Element, ElementId, ElementKind};
use crate::elements::geometry::Point2D;
use crate::elements::qr_code::qr_image_src;
use crate::elements::text_box::TextBox;
use crate::template_doc::TemplateDoc;

pub type Style = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    Text { text: String, style: Style },
    Image { src: String, alt: String, style: Style },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementView {
    pub id: ElementId,
    pub index: usize,
    pub selected: bool,
    /// Positioned container, logical units as CSS px on the unscaled stage.
    pub style: Style,
    pub content: ViewContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageView {
    pub style: Style,
    pub elements: Vec<ElementView>,
}

/// Stage of 842×595 CSS px scaled to fit its container.
pub fn render_stage(doc: &TemplateDoc, selected: Option<ElementId>, scale: f64) -> StageView {
    let mut style: Style = vec![
        ("position", "relative".into()),
        ("width", px(CANVAS_WIDTH)),
        ("height", px(CANVAS_HEIGHT)),
        ("transform", format!("scale({})", scale)),
        ("transform-origin", "top left".into()),
        ("overflow", "hidden".into()),
        ("background-size", "100% 100%".into()),
        ("background-repeat", "no-repeat".into()),
    ];
    match doc.background.display_src() {
        Some(src) => style.push(("background-image", format!("url(\"{}\")", src.replace('"', "%22")))),
        None => style.push(("background-image", "none".into())),
    }

    let elements = doc
        .elements()
        .iter()
        .enumerate()
        .map(|(index, element)| render_element(element, index, selected == Some(element.id)))
        .collect();

    StageView { style, elements }
}

pub fn render_element(element: &Element, index: usize, selected: bool) -> ElementView {
    let mut style = position_style(element.position());
    style.extend([
        ("position", "absolute".to_string()),
        ("width", px(element.width)),
        ("z-index", element.z_index.to_string()),
        ("cursor", "move".into()),
        ("user-select", "none".into()),
        ("touch-action", "none".into()),
    ]);
    if selected {
        style.push(("outline", "1px dashed #29B6F2".into()));
    }

    let content = match &element.kind {
        ElementKind::Text(tb) => {
            style.push(("min-height", px(element.height)));
            render_text(tb)
        }
        ElementKind::QrCode(qr) => {
            style.push(("height", px(element.width)));
            ViewContent::Image {
                src: qr.image_src(element.width),
                alt: "QR Code".into(),
                style: vec![("width", px(element.width)), ("height", px(element.width)), ("display", "block".into())],
            }
        }
        ElementKind::Image(img) => {
            style.push(("height", px(element.height)));
            ViewContent::Image {
                src: img.src.clone(),
                alt: "Gambar".into(),
                style: vec![
                    ("width", "100%".into()),
                    ("height", "100%".into()),
                    ("object-fit", "contain".into()),
                    ("display", "block".into()),
                    ("pointer-events", "none".into()),
                ],
            }
        }
    };

    ElementView { id: element.id, index, selected, style, content }
}

pub fn render_text(tb: &TextBox) -> ViewContent {
    ViewContent::Text {
        text: tb.display_text().to_string(),
        style: vec![
            ("font-family", tb.font.css_family()),
            ("font-weight", tb.font.weight.css_weight().to_string()),
            ("font-style", tb.font.style.as_str().into()),
            ("font-size", px(tb.font_size)),
            ("color", tb.color.clone()),
            ("text-align", tb.text_align.as_str().into()),
            ("white-space", "nowrap".into()),
            ("line-height", "1.2".into()),
        ],
    }
}

/// Styles written directly to a node while it is dragged.
pub fn position_style(pos: Point2D) -> Style {
    vec![("left", px(pos.x)), ("top", px(pos.y))]
}

/// Standalone QR preview used by the page's QR form.
pub fn qr_preview_src(data: &str, size: f64) -> String {
    qr_image_src(data, size)
}

fn px(value: f64) -> String {
    format!("{}px", (value * 100.0).round() / 100.0)
}
