use std::cell::RefCell;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::{File, PointerEvent};

pub mod elements{
    pub mod geometry;
    pub mod element;
    pub mod text_box;
    pub mod qr_code;
    pub mod image;
}
pub use crate::elements::element::{ElementId, ElementPatch, ElementType};
pub use crate::elements::geometry::{Point2D, Size2D};
pub use crate::elements::text_box::TextProperties;

pub mod canvas;
pub mod config;
pub mod dom;
pub mod drag;
pub mod editor;
pub mod error;
pub mod font;
pub mod notification;
pub mod placeholder;
pub mod renderer;
pub mod request;
pub mod serializer;
pub mod state;
pub mod template_doc;
pub mod upload;

use crate::config::{config, set_config, EditorConfig};
use crate::drag::PointerPress;
use crate::editor::Editor;
use crate::error::EditorError;
use crate::font::FontSelection;
use crate::placeholder::PlaceholderType;
use crate::renderer::ViewContent;

thread_local! {
    static EDITOR: RefCell<Option<Editor>> = const { RefCell::new(None) };
    // File picked by `chooseBackground`, sent by `uploadBackground`.
    static CHOSEN_FILE: RefCell<Option<File>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        warn!("logger already initialised");
    }
    Ok(())
}

/// Run `f` on the editor. Borrows end before this returns, so never call it across an `.await`.
pub(crate) fn with_editor<R>(f: impl FnOnce(&mut Editor) -> R) -> Result<R, EditorError> {
    EDITOR.with(|cell| {
        let mut editor = cell.try_borrow_mut().map_err(|_| EditorError::Dom("editor is busy".into()))?;
        editor.as_mut().map(f).ok_or(EditorError::NotInitialised)
    })
}

fn redraw() -> Result<(), EditorError> {
    let scale = dom::current_scale().value();
    let view = with_editor(|editor| editor.stage_view(scale))?;
    dom::apply_stage(&view)
}

/// Surface a failure as a toast and hand it to the caller as a JS exception.
fn report<T>(result: Result<T, EditorError>) -> Result<T, JsValue> {
    result.map_err(|e| {
        notification::error(&e.to_string());
        JsValue::from(e)
    })
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    report(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).map_err(EditorError::from))
}

fn from_js<T: for<'de> Deserialize<'de> + Default>(value: JsValue) -> Result<T, EditorError> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}

// --- setup ---

#[wasm_bindgen(js_name = initEditor)]
pub fn init_editor(options: JsValue) -> Result<(), JsValue> {
    let options: EditorConfig = report(from_js(options))?;
    log::set_max_level(options.log_level().to_level_filter());
    set_config(options);

    let editor = Editor::new(&config().default_qr_data);
    EDITOR.with(|cell| *cell.borrow_mut() = Some(editor));
    CHOSEN_FILE.with(|cell| *cell.borrow_mut() = None);

    report(install_handlers())?;
    report(redraw())?;
    if let Ok(state) = with_editor(|editor| editor.upload_state().clone()) {
        let _ = dom::show_upload_state(&state);
    }
    info!("certificate editor ready");
    Ok(())
}

fn install_handlers() -> Result<(), EditorError> {
    let window = web_sys::window().ok_or_else(|| EditorError::Dom("no window".into()))?;
    let document = dom::document()?;
    let stage = dom::stage()?;

    // delegated, so redraws do not need to rebind
    {
        let stage_clone = stage.clone();
        dom::add_listener(&stage, "pointerdown", move |event: PointerEvent| {
            let Some((id, node)) = dom::element_target(&event) else {
                return;
            };
            let Ok(ctx) = dom::pointer_context(&event) else {
                return;
            };
            let press = PointerPress {
                pointer_id: event.pointer_id(),
                button: event.button(),
                is_primary: event.is_primary(),
            };
            let measured = dom::measured_size(&node);
            if let Ok(Some(start)) = with_editor(|editor| editor.pointer_down(id, ctx, measured, press)) {
                event.prevent_default();
                if let Err(e) = stage_clone.set_pointer_capture(start.pointer_id) {
                    warn!("pointer capture failed: {:?}", e);
                }
                if let Err(e) = dom::mark_pressed(&node, start.z_index) {
                    warn!("{}", e);
                }
            }
        })?;
    }

    dom::add_listener(&document, "pointermove", move |event: PointerEvent| {
        if !with_editor(|editor| editor.is_dragging()).unwrap_or(false) {
            return;
        }
        let Ok(ctx) = dom::pointer_context(&event) else {
            return;
        };
        if let Ok(Some(moved)) = with_editor(|editor| editor.pointer_move(ctx)) {
            event.prevent_default();
            if let Err(e) = dom::move_node(moved.id, moved.position) {
                warn!("{}", e);
            }
        }
    })?;

    for event_type in ["pointerup", "pointercancel"] {
        let stage_clone = stage.clone();
        dom::add_listener(&document, event_type, move |_event: PointerEvent| {
            if let Ok(Some(end)) = with_editor(|editor| editor.pointer_up()) {
                let _ = stage_clone.release_pointer_capture(end.pointer_id);
                if let Err(e) = redraw() {
                    warn!("{}", e);
                }
            }
        })?;
    }

    dom::add_listener(&window, "resize", move |_event: web_sys::Event| {
        if let Err(e) = redraw() {
            warn!("{}", e);
        }
    })?;

    Ok(())
}

// --- elements ---

/// Optional placement passed with the element properties.
#[derive(Debug, Default, Deserialize)]
struct Placement {
    x: Option<f64>,
    y: Option<f64>,
    size: Option<f64>,
}

impl Placement {
    fn position(&self) -> Option<Point2D> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point2D::new(x, y)),
            _ => None,
        }
    }
}

#[wasm_bindgen(js_name = addTextElement)]
pub fn add_text_element(text: Option<String>, properties: JsValue) -> Result<ElementId, JsValue> {
    let placement: Placement = report(from_js(properties.clone()))?;
    let props: TextProperties = report(from_js(properties))?;
    let text = text.unwrap_or_default();
    let id = report(with_editor(|editor| editor.add_text_element(&text, &props, placement.position())).and_then(|r| r))?;
    report(redraw())?;
    Ok(id)
}

#[wasm_bindgen(js_name = addQrCodeElement)]
pub fn add_qr_code_element(data: Option<String>, properties: JsValue) -> Result<ElementId, JsValue> {
    let placement: Placement = report(from_js(properties))?;
    let data = data.unwrap_or_default();
    let id = report(with_editor(|editor| editor.add_qr_element(&data, placement.position(), placement.size)))?;
    report(redraw())?;
    Ok(id)
}

#[wasm_bindgen(js_name = addImageElement)]
pub fn add_image_element(src: String, properties: JsValue) -> Result<ElementId, JsValue> {
    let placement: Placement = report(from_js(properties))?;
    let size = placement.size.map(|w| Size2D::new(w, w));
    let id = report(with_editor(|editor| editor.add_image_element(&src, placement.position(), size)).and_then(|r| r))?;
    report(redraw())?;
    Ok(id)
}

#[wasm_bindgen(js_name = editElement)]
pub fn edit_element(index: usize) -> Result<JsValue, JsValue> {
    let details = report(with_editor(|editor| editor.edit_element(index)).and_then(|r| r))?;
    report(redraw())?;
    to_js(&details)
}

#[wasm_bindgen(js_name = updateElement)]
pub fn update_element(index: usize, properties: JsValue) -> Result<(), JsValue> {
    let patch: ElementPatch = report(from_js(properties))?;
    report(with_editor(|editor| editor.update_element(index, &patch)).and_then(|r| r))?;
    report(redraw())
}

#[wasm_bindgen(js_name = removeElement)]
pub fn remove_element(index: usize) -> Result<(), JsValue> {
    report(with_editor(|editor| editor.remove_element(index)).and_then(|r| r))?;
    report(redraw())
}

#[wasm_bindgen(js_name = listElements)]
pub fn list_elements() -> Result<JsValue, JsValue> {
    let summaries = report(with_editor(|editor| editor.summaries()))?;
    to_js(&summaries)
}

// --- single-element rendering for the page's side panels ---

#[wasm_bindgen(js_name = renderQRCode)]
pub fn render_qr_code(data: String, size: Option<f64>) -> String {
    renderer::qr_preview_src(&data, size.unwrap_or_else(|| ElementType::QrCode.default_size().width))
}

fn rendered_content(index: usize, expected: ElementType) -> Result<ViewContent, EditorError> {
    with_editor(|editor| {
        if editor.element_type(index) != Some(expected) {
            return Err(EditorError::InvalidInput(format!("element {} is not {}", index, expected.as_str())));
        }
        editor
            .stage_view(1.0)
            .elements
            .into_iter()
            .nth(index)
            .map(|view| view.content)
            .ok_or(EditorError::UnknownElement(index))
    })?
}

/// Text an element displays on the canvas (preview string for placeholders).
#[wasm_bindgen(js_name = renderText)]
pub fn render_text(index: usize) -> Result<String, JsValue> {
    match report(rendered_content(index, ElementType::Text))? {
        ViewContent::Text { text, .. } => Ok(text),
        ViewContent::Image { .. } => Err(JsValue::from(EditorError::UnknownElement(index))),
    }
}

/// Image source an element displays; QR codes are regenerated.
#[wasm_bindgen(js_name = renderImage)]
pub fn render_image(index: usize) -> Result<String, JsValue> {
    let element_type = match report(with_editor(|editor| editor.element_type(index)))? {
        Some(ElementType::QrCode) => ElementType::QrCode,
        _ => ElementType::Image,
    };
    match report(rendered_content(index, element_type))? {
        ViewContent::Image { src, .. } => Ok(src),
        ViewContent::Text { .. } => Err(JsValue::from(EditorError::UnknownElement(index))),
    }
}

// --- fonts and placeholders ---

#[wasm_bindgen(js_name = setFontSelection)]
pub fn set_font_selection(family: String, weight: String, style: String) -> Result<(), JsValue> {
    let font = report(FontSelection::parse(&family, &weight, &style))?;
    report(with_editor(|editor| editor.set_font_selection(font)))
}

#[wasm_bindgen(js_name = updateSelectedElementFont)]
pub fn update_selected_element_font() -> Result<bool, JsValue> {
    let updated = report(with_editor(|editor| editor.update_selected_element_font()).and_then(|r| r))?;
    if updated {
        report(redraw())?;
    }
    Ok(updated)
}

#[wasm_bindgen(js_name = selectPlaceholder)]
pub fn select_placeholder(key: String) -> Result<JsValue, JsValue> {
    let placeholder = report(PlaceholderType::from_str(&key))?;
    let resolution = report(with_editor(|editor| editor.select_placeholder(placeholder)))?;
    if let Err(e) = dom::show_placeholder(&resolution) {
        warn!("{}", e);
    }
    to_js(&resolution)
}

/// Typing into the text field; returns false when a fixed placeholder is selected.
#[wasm_bindgen(js_name = setCustomText)]
pub fn set_custom_text(text: String) -> Result<bool, JsValue> {
    let accepted = report(with_editor(|editor| editor.set_custom_text(&text)))?;
    if accepted {
        update_preview()?;
    }
    Ok(accepted)
}

#[wasm_bindgen(js_name = updatePreview)]
pub fn update_preview() -> Result<(), JsValue> {
    let resolution = report(with_editor(|editor| editor.placeholder_preview()))?;
    report(dom::show_placeholder(&resolution))
}

// --- template metadata ---

#[wasm_bindgen(js_name = setTemplateName)]
pub fn set_template_name(name: String) -> Result<(), JsValue> {
    report(with_editor(|editor| editor.set_template_name(&name)))
}

#[wasm_bindgen(js_name = setMerchantId)]
pub fn set_merchant_id(merchant_id: Option<u32>) -> Result<(), JsValue> {
    report(with_editor(|editor| editor.set_merchant_id(merchant_id)))
}

// --- background ---

#[wasm_bindgen(js_name = chooseBackground)]
pub async fn choose_background(file: File) -> Result<(), JsValue> {
    let preview = report(dom::read_data_url(&file).await)?;
    let name = file.name();

    let state = report(
        with_editor(|editor| editor.choose_background(&name, preview).map(|_| editor.upload_state().clone()))
            .and_then(|r| r),
    )?;
    // only replace the file once the editor accepted it
    CHOSEN_FILE.with(|cell| *cell.borrow_mut() = Some(file));
    let _ = dom::show_upload_state(&state);
    report(redraw())
}

#[wasm_bindgen(js_name = uploadBackground)]
pub async fn upload_background() -> Result<(), JsValue> {
    let Some(file) = CHOSEN_FILE.with(|cell| cell.borrow().clone()) else {
        notification::error("pilih file background terlebih dahulu");
        return Ok(());
    };
    let (ticket, state) = report(with_editor(|editor| editor.begin_upload().map(|t| (t, editor.upload_state().clone()))).and_then(|r| r))?;
    let _ = dom::show_upload_state(&state);

    let result = request::upload_background(&file).await;

    let (outcome, state) = report(with_editor(|editor| (editor.finish_upload(&ticket, result), editor.upload_state().clone())))?;
    let _ = dom::show_upload_state(&state);
    report(redraw())?;
    match outcome {
        Ok(_) => {
            notification::success("Background berhasil diupload");
            Ok(())
        }
        Err(e) => {
            notification::error(&e.to_string());
            Ok(())
        }
    }
}

// --- save / load ---

/// Validate, POST and reset on success. Resolves to whether the template was saved.
#[wasm_bindgen(js_name = saveTemplate)]
pub async fn save_template() -> Result<bool, JsValue> {
    let document = match with_editor(|editor| editor.begin_save()) {
        Ok(Ok(document)) => document,
        Ok(Err(e)) => {
            notification::error(&e.to_string());
            return Ok(false);
        }
        Err(e) => return report(Err(e)),
    };

    let result = request::save_template(&document).await;
    let saved = result.is_ok();
    if let Err(e) = &result {
        notification::error(&e.to_string());
    }

    let reset = report(with_editor(|editor| editor.finish_save(&result)))?;
    if saved && !reset {
        notification::info("Template disimpan, perubahan selama penyimpanan dipertahankan");
    }
    if reset {
        CHOSEN_FILE.with(|cell| *cell.borrow_mut() = None);
        notification::success("Template berhasil disimpan");
        let state = report(with_editor(|editor| editor.upload_state().clone()))?;
        let _ = dom::show_upload_state(&state);
        let _ = update_preview();
        report(redraw())?;
    }
    Ok(saved)
}

#[wasm_bindgen(js_name = loadTemplate)]
pub fn load_template(json: String) -> Result<usize, JsValue> {
    let (count, state) = report(with_editor(|editor| editor.load_template(&json).map(|n| (n, editor.upload_state().clone()))).and_then(|r| r))?;
    CHOSEN_FILE.with(|cell| *cell.borrow_mut() = None);
    let _ = dom::show_upload_state(&state);
    report(redraw())?;
    info!("loaded template with {} elements", count);
    Ok(count)
}

/// Look up a participant certificate; resolves to its data or `null`.
#[wasm_bindgen(js_name = validateCertificate)]
pub async fn validate_certificate(certificate_number: String) -> Result<JsValue, JsValue> {
    if certificate_number.trim().is_empty() {
        notification::error("nomor sertifikat wajib diisi");
        return Ok(JsValue::NULL);
    }
    match request::validate_certificate(&certificate_number).await {
        Ok(Some(data)) => to_js(&data),
        Ok(None) => {
            notification::info("sertifikat tidak ditemukan");
            Ok(JsValue::NULL)
        }
        Err(e) => {
            notification::error(&e.to_string());
            Ok(JsValue::NULL)
        }
    }
}
