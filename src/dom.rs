//! Applies view plans to the page and reads what the editor needs back from it.

use js_sys::Promise;
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, File, FileReader, HtmlElement, HtmlImageElement, HtmlInputElement, PointerEvent};

use crate::canvas::CanvasScale;
use crate::config::config;
use crate::editor::PointerContext;
use crate::elements::element::ElementId;
use crate::elements::geometry::{Point2D, Size2D};
use crate::error::EditorError;
use crate::placeholder::PlaceholderResolution;
use crate::renderer::{position_style, ElementView, StageView, Style, ViewContent};
use crate::upload::UploadState;

pub const ELEMENT_SELECTOR: &str = "[data-element-id]";

pub fn document() -> Result<Document, EditorError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| EditorError::Dom("no document".into()))
}

pub fn html_element(id: &str) -> Result<HtmlElement, EditorError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| EditorError::Dom(format!("#{} not found", id)))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| EditorError::Dom(format!("#{} is not an HTML element", id)))
}

pub fn stage() -> Result<HtmlElement, EditorError> {
    html_element(&config().stage_id)
}

fn apply_style(node: &HtmlElement, style: &Style) -> Result<(), EditorError> {
    let css = node.style();
    for (key, value) in style {
        css.set_property(key, value).map_err(EditorError::dom)?;
    }
    Ok(())
}

/// Scale of the stage for the container's current on-screen size.
pub fn current_scale() -> CanvasScale {
    match html_element(&config().container_id) {
        Ok(container) => {
            let rect = container.get_bounding_client_rect();
            CanvasScale::from_container(rect.width(), rect.height())
        }
        Err(_) => CanvasScale::default(),
    }
}

/// Measure stage origin and container size for this pointer event.
pub fn pointer_context(event: &PointerEvent) -> Result<PointerContext, EditorError> {
    let stage_rect = stage()?.get_bounding_client_rect();
    let container_rect = html_element(&config().container_id)?.get_bounding_client_rect();
    Ok(PointerContext {
        pointer: Point2D::new(event.client_x() as f64, event.client_y() as f64),
        origin: Point2D::new(stage_rect.left(), stage_rect.top()),
        container: Size2D::new(container_rect.width(), container_rect.height()),
    })
}

/// The element node under a pointer event, with its id.
pub fn element_target(event: &PointerEvent) -> Option<(ElementId, HtmlElement)> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let node = target.closest(ELEMENT_SELECTOR).ok()??;
    let id = node.get_attribute("data-element-id")?.parse::<ElementId>().ok()?;
    Some((id, node.dyn_into::<HtmlElement>().ok()?))
}

/// Laid-out size in unscaled CSS px, which are logical units on the stage.
pub fn measured_size(node: &HtmlElement) -> Size2D {
    Size2D::new(node.offset_width() as f64, node.offset_height() as f64)
}

/// Full redraw: drop every element node and rebuild from the plan.
pub fn apply_stage(view: &StageView) -> Result<(), EditorError> {
    let document = document()?;
    let stage = stage()?;
    apply_style(&stage, &view.style)?;

    while let Some(child) = stage.first_child() {
        stage.remove_child(&child).map_err(EditorError::dom)?;
    }
    for element in &view.elements {
        let node = build_element(&document, element)?;
        stage.append_child(&node).map_err(EditorError::dom)?;
    }
    debug!("stage redrawn with {} elements", view.elements.len());
    Ok(())
}

fn build_element(document: &Document, view: &ElementView) -> Result<HtmlElement, EditorError> {
    let node = create(document, "div")?;
    node.set_attribute("data-element-id", &view.id.to_string()).map_err(EditorError::dom)?;
    node.set_attribute("data-index", &view.index.to_string()).map_err(EditorError::dom)?;
    node.set_class_name(if view.selected { "certificate-element selected" } else { "certificate-element" });
    apply_style(&node, &view.style)?;

    match &view.content {
        ViewContent::Text { text, style } => {
            let span = create(document, "span")?;
            span.set_inner_text(text);
            apply_style(&span, style)?;
            node.append_child(&span).map_err(EditorError::dom)?;
        }
        ViewContent::Image { src, alt, style } => {
            let img = create(document, "img")?
                .dyn_into::<HtmlImageElement>()
                .map_err(|_| EditorError::Dom("img conversion failed".into()))?;
            img.set_src(src);
            img.set_alt(alt);
            img.set_draggable(false);
            apply_style(&img, style)?;
            node.append_child(&img).map_err(EditorError::dom)?;
        }
    }
    Ok(node)
}

fn create(document: &Document, tag: &str) -> Result<HtmlElement, EditorError> {
    document
        .create_element(tag)
        .map_err(EditorError::dom)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| EditorError::Dom(format!("<{}> conversion failed", tag)))
}

/// Write a dragged element's position straight to its node.
pub fn move_node(id: ElementId, position: Point2D) -> Result<(), EditorError> {
    let selector = format!("[data-element-id=\"{}\"]", id);
    let Some(node) = stage()?.query_selector(&selector).map_err(EditorError::dom)? else {
        return Ok(());
    };
    let node = node.dyn_into::<HtmlElement>().map_err(|_| EditorError::Dom("element node".into()))?;
    apply_style(&node, &position_style(position))
}

/// Raise the pressed node and move the selection outline onto it without a redraw.
pub fn mark_pressed(node: &HtmlElement, z_index: i32) -> Result<(), EditorError> {
    let nodes = stage()?.query_selector_all(ELEMENT_SELECTOR).map_err(EditorError::dom)?;
    for i in 0..nodes.length() {
        if let Some(other) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            other.set_class_name("certificate-element");
            other.style().remove_property("outline").map_err(EditorError::dom)?;
        }
    }
    node.set_class_name("certificate-element selected");
    let css = node.style();
    css.set_property("z-index", &z_index.to_string()).map_err(EditorError::dom)?;
    css.set_property("outline", "1px dashed #29B6F2").map_err(EditorError::dom)?;
    Ok(())
}

pub fn show_upload_state(state: &UploadState) -> Result<(), EditorError> {
    let cfg = config();
    if let Ok(status) = html_element(&cfg.upload_status_id) {
        status.set_inner_text(&state.status_text());
        let class = match state {
            UploadState::UploadFailed { .. } => "upload-status error",
            UploadState::Uploaded { .. } => "upload-status success",
            _ => "upload-status",
        };
        status.set_class_name(class);
    }
    let button = html_element(&cfg.upload_button_id)?;
    if state.trigger_enabled() {
        button.remove_attribute("disabled").map_err(EditorError::dom)?;
    } else {
        button.set_attribute("disabled", "disabled").map_err(EditorError::dom)?;
    }
    Ok(())
}

/// Fill the placeholder preview, and the text input when one is linked via `data-placeholder-input`.
pub fn show_placeholder(resolution: &PlaceholderResolution) -> Result<(), EditorError> {
    let preview = html_element(&config().preview_id)?;
    preview.set_inner_text(&resolution.preview);

    let input_id = preview.get_attribute("data-placeholder-input");
    if let Some(input) = input_id.and_then(|id| document().ok()?.get_element_by_id(&id)) {
        if let Ok(input) = input.dyn_into::<HtmlInputElement>() {
            input.set_value(&resolution.text);
            input.set_read_only(!resolution.editable);
        }
    }
    Ok(())
}

/// Read a chosen file as a data URL for the local preview.
pub async fn read_data_url(file: &File) -> Result<String, EditorError> {
    let reader = FileReader::new().map_err(EditorError::dom)?;

    let promise = Promise::new(&mut |resolve, reject| {
        reader.set_onload(Some(&resolve));
        reader.set_onerror(Some(&reject));
    });
    reader.read_as_data_url(file).map_err(EditorError::dom)?;
    JsFuture::from(promise).await.map_err(EditorError::dom)?;

    reader
        .result()
        .map_err(EditorError::dom)?
        .as_string()
        .ok_or_else(|| EditorError::Dom("file reader returned no data URL".into()))
}

/// Register a listener for the lifetime of the page.
pub fn add_listener<E, F>(target: &web_sys::EventTarget, event_type: &str, callback: F) -> Result<(), EditorError>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let mut callback = callback;
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            callback(event);
        }
    }) as Box<dyn FnMut(_)>);
    target
        .add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
        .map_err(EditorError::dom)?;
    closure.forget();
    Ok(())
}
