//! Template Document wire format: validation and flattening of the element
//! model on save, and the inverse mapping when a stored template is loaded.

use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::elements::element::{Element, ElementId, ElementKind, ElementType};
use crate::elements::geometry::{Point2D, Size2D};
use crate::elements::image::ImageElement;
use crate::elements::qr_code::QrCodeElement;
use crate::elements::text_box::{TextAlign, TextBox, TextProperties};
use crate::error::{EditorError, ValidationError};
use crate::font::{FontDescriptor, FontSelection, FontStyle, FontWeight};
use crate::placeholder::PlaceholderType;
use crate::template_doc::TemplateDoc;

/// JSON body posted to the save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDocument {
    pub merchant_id: u32,
    pub name: String,
    pub background_image: String,
    pub elements: Vec<WireElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    #[serde(flatten)]
    pub payload: WirePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WirePayload {
    Text(WireText),
    QrCode(WireQrCode),
    Image(WireImage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireText {
    pub text: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    pub font_size: f64,
    pub color: String,
    pub text_align: String,
    pub placeholder_type: String,
    pub font: FontDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireQrCode {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireImage {
    pub src: String,
}

/// Checks in order; the first failure wins.
pub fn validate(doc: &TemplateDoc) -> Result<(u32, &str), ValidationError> {
    let merchant_id = doc.merchant_id.ok_or(ValidationError::MissingMerchant)?;
    if doc.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    let background = match (&doc.background.url, doc.background.uploaded) {
        (Some(url), true) if !url.trim().is_empty() => url.as_str(),
        _ => return Err(ValidationError::MissingBackground),
    };
    if doc.is_empty() {
        return Err(ValidationError::NoElements);
    }
    Ok((merchant_id, background))
}

/// Flatten the model into the save body. Reads the model only.
pub fn to_document(doc: &TemplateDoc, default_qr_data: &str) -> Result<TemplateDocument, ValidationError> {
    let (merchant_id, background) = validate(doc)?;

    Ok(TemplateDocument {
        merchant_id,
        name: doc.name.trim().to_string(),
        background_image: background.to_string(),
        elements: doc.elements().iter().map(|e| element_to_wire(e, default_qr_data)).collect(),
    })
}

pub fn element_to_wire(element: &Element, default_qr_data: &str) -> WireElement {
    let payload = match &element.kind {
        ElementKind::Text(tb) => WirePayload::Text(WireText {
            text: tb.text.clone(),
            font_family: tb.font.family.clone(),
            font_weight: tb.font.weight.as_str().to_string(),
            font_style: tb.font.style.as_str().to_string(),
            font_size: tb.font_size,
            color: tb.color.clone(),
            text_align: tb.text_align.as_str().to_string(),
            placeholder_type: tb.placeholder.as_str().to_string(),
            font: tb.font.descriptor(),
        }),
        ElementKind::QrCode(qr) => WirePayload::QrCode(WireQrCode {
            data: if qr.data.trim().is_empty() { default_qr_data.to_string() } else { qr.data.clone() },
        }),
        ElementKind::Image(img) => WirePayload::Image(WireImage { src: img.src.clone() }),
    };

    WireElement {
        id: element.id,
        element_type: element.element_type(),
        x: element.x,
        y: element.y,
        width: element.width,
        height: element.height,
        z_index: element.z_index,
        payload,
    }
}

/// A stored template, as fetched from the backend, mapped back onto the model.
#[derive(Debug, Clone)]
pub struct HydratedTemplate {
    pub name: String,
    pub merchant_id: Option<u32>,
    pub background_image: Option<String>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct StoredTemplate {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    merchant_id: Option<u32>,
    #[serde(default)]
    background_image: Option<String>,
    #[serde(default)]
    elements: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredElement {
    #[serde(rename = "type")]
    element_type: String,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    z_index: Option<i32>,
    text: Option<String>,
    font: Option<StoredFont>,
    data: Option<String>,
    qrcode: Option<String>,
    src: Option<String>,
    image_url: Option<String>,
    #[serde(flatten)]
    text_properties: TextProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredFont {
    family: Option<String>,
    weight: Option<String>,
    style: Option<String>,
}

/// Parse a stored template. Older documents used `qrcode` instead of `data`,
/// `imageUrl` instead of `src`, and may keep `elements` as a JSON string;
/// those aliases are resolved here and nowhere else.
pub fn hydrate(json: &str, default_qr_data: &str) -> Result<HydratedTemplate, EditorError> {
    let stored: StoredTemplate = serde_json::from_str(json)?;

    let raw: Vec<StoredElement> = match stored.elements {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(s) => serde_json::from_str(&s)?,
        value => serde_json::from_value(value)?,
    };

    let mut elements = Vec::with_capacity(raw.len());
    for (i, raw_element) in raw.into_iter().enumerate() {
        match from_stored(i, raw_element, default_qr_data)? {
            Some(element) => elements.push(element),
            None => warn!("skipping element {} of unknown type", i),
        }
    }
    info!("hydrated template with {} elements", elements.len());

    Ok(HydratedTemplate {
        name: stored.name.unwrap_or_default(),
        merchant_id: stored.merchant_id,
        background_image: stored.background_image.filter(|s| !s.trim().is_empty()),
        elements,
    })
}

fn from_stored(index: usize, mut stored: StoredElement, default_qr_data: &str) -> Result<Option<Element>, EditorError> {
    let kind = match stored.element_type.to_lowercase().as_str() {
        "text" => {
            // the nested font object wins over the flat fields
            if let Some(font) = stored.font.take() {
                let props = &mut stored.text_properties;
                props.font_family = font.family.or(props.font_family.take());
                props.font_weight = font.weight.or(props.font_weight.take());
                props.font_style = font.style.or(props.font_style.take());
            }
            drop_unreadable(index, &mut stored.text_properties);
            let mut tb = TextBox::new(stored.text.as_deref().unwrap_or_default(), FontSelection::default());
            tb.apply(&stored.text_properties)?;
            ElementKind::Text(tb)
        }
        "qrcode" | "qr" => {
            let data = stored.data.or(stored.qrcode).filter(|d| !d.trim().is_empty());
            ElementKind::QrCode(QrCodeElement::new(data.as_deref().unwrap_or(default_qr_data)))
        }
        "image" => {
            let src = stored.src.or(stored.image_url).unwrap_or_default();
            ElementKind::Image(ImageElement::new(&src))
        }
        _ => return Ok(None),
    };

    let size = match (stored.width, stored.height) {
        (Some(w), Some(h)) => Some(Size2D::new(w, h)),
        (Some(w), None) if kind.element_type() == ElementType::QrCode => Some(Size2D::new(w, w)),
        _ => None,
    };
    let position = Point2D::new(stored.x.unwrap_or(0.0), stored.y.unwrap_or(0.0));

    let mut element = Element::new(0, kind, position, size);
    element.z_index = stored.z_index.unwrap_or(index as i32 + 1);
    Ok(Some(element))
}

/// Stored text fields that no longer parse fall back to the defaults
/// instead of failing the whole template.
fn drop_unreadable(index: usize, props: &mut TextProperties) {
    if let Some(size) = props.font_size {
        if !(size.is_finite() && size > 0.0) {
            warn!("element {}: ignoring fontSize {}", index, size);
            props.font_size = None;
        }
    }
    drop_if_invalid::<TextAlign>(index, "textAlign", &mut props.text_align);
    drop_if_invalid::<FontWeight>(index, "fontWeight", &mut props.font_weight);
    drop_if_invalid::<FontStyle>(index, "fontStyle", &mut props.font_style);
    drop_if_invalid::<PlaceholderType>(index, "placeholderType", &mut props.placeholder_type);
}

fn drop_if_invalid<T: FromStr>(index: usize, field: &str, value: &mut Option<String>) {
    if value.as_deref().is_some_and(|v| v.parse::<T>().is_err()) {
        warn!("element {}: ignoring {} {:?}", index, field, value.take().unwrap_or_default());
    }
}
