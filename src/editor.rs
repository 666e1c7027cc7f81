//! The editor controller: single owner of the template being edited and of
//! every piece of interaction state. The DOM layer forwards events here and
//! redraws from what it returns; nothing else holds a writable reference.

use log::{info, warn};
use serde::Serialize;

use crate::canvas::{CanvasScale, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::drag::{DragController, DragEnd, DragMove, DragStart, PointerPress};
use crate::elements::element::{ElementId, ElementKind, ElementPatch, ElementSummary, ElementType};
use crate::elements::geometry::{Point2D, Size2D};
use crate::elements::image::ImageElement;
use crate::elements::qr_code::QrCodeElement;
use crate::elements::text_box::{TextBox, TextProperties};
use crate::error::{EditorError, ValidationError};
use crate::font::FontSelection;
use crate::placeholder::{PlaceholderResolution, PlaceholderType};
use crate::renderer::{render_stage, StageView};
use crate::serializer::{self, TemplateDocument, WireElement};
use crate::state::State;
use crate::template_doc::TemplateDoc;
use crate::upload::{BackgroundUpload, UploadState, UploadTicket};

/// Where the pointer is and how big the preview container is, in screen px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerContext {
    pub pointer: Point2D,
    pub origin: Point2D,
    pub container: Size2D,
}

impl PointerContext {
    /// Pointer in logical units, with the scale measured for this event.
    pub fn to_logical(&self) -> Point2D {
        CanvasScale::from_container(self.container.width, self.container.height).to_logical(self.pointer, self.origin)
    }
}

/// Data the element form is filled with by `editElement`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDetails {
    pub index: usize,
    #[serde(flatten)]
    pub element: WireElement,
}

pub struct Editor {
    doc: TemplateDoc,
    state: State,
    drag: DragController,
    upload: BackgroundUpload,
    default_qr_data: String,
    /// Save body of the POST in flight, if any.
    saving: Option<TemplateDocument>,
}

impl Editor {
    pub fn new(default_qr_data: &str) -> Self {
        Self {
            doc: TemplateDoc::new(),
            state: State::new(),
            drag: DragController::new(),
            upload: BackgroundUpload::new(),
            default_qr_data: default_qr_data.to_string(),
            saving: None,
        }
    }

    pub fn doc(&self) -> &TemplateDoc {
        &self.doc
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn upload_state(&self) -> &UploadState {
        self.upload.state()
    }

    // --- metadata ---

    pub fn set_template_name(&mut self, name: &str) {
        self.doc.name = name.to_string();
    }

    pub fn set_merchant_id(&mut self, merchant_id: Option<u32>) {
        self.doc.merchant_id = merchant_id.filter(|id| *id > 0);
    }

    // --- font / placeholder selectors ---

    pub fn set_font_selection(&mut self, font: FontSelection) {
        self.state.set_font(font);
    }

    pub fn select_placeholder(&mut self, placeholder: PlaceholderType) -> PlaceholderResolution {
        self.state.select_placeholder(placeholder)
    }

    pub fn set_custom_text(&mut self, text: &str) -> bool {
        self.state.set_custom_text(text)
    }

    pub fn placeholder_preview(&self) -> PlaceholderResolution {
        self.state.placeholder().resolve()
    }

    /// Apply the font selectors to the selected element. Non-text selections are left alone.
    pub fn update_selected_element_font(&mut self) -> Result<bool, EditorError> {
        let Some(id) = self.state.selected() else {
            return Ok(false);
        };
        let font = self.state.font().clone();
        let Some(tb) = self.doc.get_mut(id).and_then(|e| e.as_text_mut()) else {
            return Ok(false);
        };
        tb.font = font;
        info!("font of element #{} updated", id);
        Ok(true)
    }

    // --- element list ---

    /// Add a text element. Without `text` the placeholder field's value is used,
    /// and the font selectors' current values become the element's font.
    pub fn add_text_element(&mut self, text: &str, props: &TextProperties, position: Option<Point2D>) -> Result<ElementId, EditorError> {
        let field = self.state.placeholder();
        let text = if text.is_empty() { field.text().to_string() } else { text.to_string() };

        let mut tb = TextBox::new(&text, self.state.font().clone());
        if props.placeholder_type.is_none() && !field.placeholder().is_custom() {
            tb.set_placeholder(field.placeholder());
        }
        tb.apply(props)?;

        if tb.placeholder.is_custom() && tb.text.trim().is_empty() {
            return Err(EditorError::InvalidInput("teks tidak boleh kosong".into()));
        }

        Ok(self.add(ElementKind::Text(tb), position, None))
    }

    pub fn add_qr_element(&mut self, data: &str, position: Option<Point2D>, size: Option<f64>) -> ElementId {
        let data = if data.trim().is_empty() { self.default_qr_data.as_str() } else { data };
        let size = size.map(|s| Size2D::new(s, s));
        self.add(ElementKind::QrCode(QrCodeElement::new(data)), position, size)
    }

    pub fn add_image_element(&mut self, src: &str, position: Option<Point2D>, size: Option<Size2D>) -> Result<ElementId, EditorError> {
        let image = ImageElement::new(src);
        if image.src.is_empty() {
            return Err(EditorError::InvalidInput("gambar belum dipilih".into()));
        }
        if image.is_data_url() {
            info!("image element embeds {} bytes inline", image.src.len());
        }
        Ok(self.add(ElementKind::Image(image), position, size))
    }

    fn add(&mut self, kind: ElementKind, position: Option<Point2D>, size: Option<Size2D>) -> ElementId {
        let position = position.unwrap_or_else(|| {
            let size = size.unwrap_or_else(|| kind.element_type().default_size());
            Point2D::new((CANVAS_WIDTH - size.width) / 2.0, (CANVAS_HEIGHT - size.height) / 2.0)
        });
        let id = self.doc.add_element(kind, position, size);
        self.state.set_selected(Some(id));
        id
    }

    /// Select the element at `index` and return what the form should show.
    pub fn edit_element(&mut self, index: usize) -> Result<ElementDetails, EditorError> {
        let element = self.doc.nth(index).ok_or(EditorError::UnknownElement(index))?;
        self.state.set_selected(Some(element.id));
        Ok(ElementDetails { index, element: serializer::element_to_wire(element, &self.default_qr_data) })
    }

    /// Apply a form edit; the element is unchanged when the edit is rejected.
    pub fn update_element(&mut self, index: usize, patch: &ElementPatch) -> Result<(), EditorError> {
        let element = self.doc.nth_mut(index).ok_or(EditorError::UnknownElement(index))?;
        let mut edited = element.clone();
        edited.apply(patch)?;
        *element = edited;
        Ok(())
    }

    pub fn remove_element(&mut self, index: usize) -> Result<(), EditorError> {
        let removed = self.doc.remove(index)?;
        if self.state.selected() == Some(removed.id) {
            self.state.set_selected(None);
        }
        if self.drag.dragged() == Some(removed.id) {
            self.drag.release(&self.doc);
        }
        Ok(())
    }

    pub fn element_type(&self, index: usize) -> Option<ElementType> {
        self.doc.nth(index).map(|e| e.element_type())
    }

    pub fn summaries(&self) -> Vec<ElementSummary> {
        self.doc.summaries()
    }

    pub fn stage_view(&self, scale: f64) -> StageView {
        render_stage(&self.doc, self.state.selected(), scale)
    }

    // --- dragging ---

    pub fn pointer_down(&mut self, id: ElementId, ctx: PointerContext, measured: Size2D, press: PointerPress) -> Option<DragStart> {
        let start = self.drag.press(&mut self.doc, id, ctx.to_logical(), measured, press)?;
        self.state.set_selected(Some(id));
        Some(start)
    }

    pub fn pointer_move(&mut self, ctx: PointerContext) -> Option<DragMove> {
        self.drag.move_to(&mut self.doc, ctx.to_logical())
    }

    pub fn pointer_up(&mut self) -> Option<DragEnd> {
        self.drag.release(&self.doc)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    // --- background ---

    /// Refused while an upload is in flight.
    pub fn choose_background(&mut self, file_name: &str, preview: String) -> Result<(), EditorError> {
        self.upload.choose(&mut self.doc.background, file_name, preview)
    }

    /// Errors when nothing is chosen or an upload runs. The ticket must be
    /// handed back to `finish_upload`.
    pub fn begin_upload(&mut self) -> Result<UploadTicket, EditorError> {
        self.upload.begin()
    }

    /// Commit the upload result, unless a newer file has been chosen since.
    pub fn finish_upload(&mut self, ticket: &UploadTicket, result: Result<String, EditorError>) -> Result<String, EditorError> {
        let applied = match &result {
            Ok(url) => self.upload.succeed(&mut self.doc.background, ticket, url.clone()),
            Err(e) => self.upload.fail(&mut self.doc.background, ticket, &e.to_string()),
        };
        if !applied {
            return Err(EditorError::Upload(format!("{} sudah diganti, hasil upload diabaikan", ticket.file_name)));
        }
        result
    }

    // --- save / load ---

    /// Validate and build the save body. No state changes.
    pub fn prepare_save(&self) -> Result<TemplateDocument, ValidationError> {
        serializer::to_document(&self.doc, &self.default_qr_data)
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// Validate and remember the body about to be posted. Only one save runs at a time.
    pub fn begin_save(&mut self) -> Result<TemplateDocument, EditorError> {
        if self.saving.is_some() {
            return Err(EditorError::Save("penyimpanan sedang berjalan".into()));
        }
        let document = self.prepare_save()?;
        self.saving = Some(document.clone());
        Ok(document)
    }

    /// After the POST. On success the editor is reset, unless the template was
    /// edited while the request ran; those edits are kept. Returns whether it reset.
    pub fn finish_save(&mut self, result: &Result<(), EditorError>) -> bool {
        let Some(sent) = self.saving.take() else {
            warn!("save finished without a save in flight");
            return false;
        };
        if let Err(e) = result {
            warn!("save failed, keeping {} elements for retry: {}", self.doc.count(), e);
            return false;
        }
        if self.prepare_save().ok().as_ref() != Some(&sent) {
            info!("template '{}' saved, keeping edits made during the save", sent.name);
            return false;
        }
        info!("template '{}' saved, resetting editor", sent.name);
        self.doc = TemplateDoc::new();
        self.state.reset();
        self.drag = DragController::new();
        self.upload.reset();
        true
    }

    /// Replace the current template with a stored one.
    pub fn load_template(&mut self, json: &str) -> Result<usize, EditorError> {
        let template = serializer::hydrate(json, &self.default_qr_data)?;

        self.drag = DragController::new();
        self.state.set_selected(None);
        self.upload.reset();
        self.doc.name = template.name;
        self.doc.merchant_id = template.merchant_id;
        self.doc.background = Default::default();
        if let Some(url) = template.background_image {
            self.upload.restore(&mut self.doc.background, url);
        }
        self.doc.replace_elements(template.elements);
        Ok(self.doc.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontStyle, FontWeight};
    use pretty_assertions::assert_eq;

    fn ctx(x: f64, y: f64) -> PointerContext {
        // container at half size: 421×297.5 px at (100, 50)
        PointerContext {
            pointer: Point2D::new(x, y),
            origin: Point2D::new(100.0, 50.0),
            container: Size2D::new(421.0, 297.5),
        }
    }

    #[test]
    fn drag_uses_scaled_coordinates() {
        let mut editor = Editor::new("https://example.com");
        let id = editor.add_qr_element("data", Some(Point2D::new(0.0, 0.0)), Some(100.0));

        // pointer 10px inside the element on screen = 20 logical units
        editor.pointer_down(id, ctx(110.0, 60.0), Size2D::new(100.0, 100.0), PointerPress::primary(1)).unwrap();
        let moved = editor.pointer_move(ctx(160.0, 110.0)).unwrap();
        assert_eq!(moved.position, Point2D::new(100.0, 100.0));
        assert!(editor.pointer_up().is_some());
        assert!(!editor.is_dragging());
    }

    #[test]
    fn new_text_takes_current_font_and_placeholder() {
        let mut editor = Editor::new("https://example.com");
        editor.set_font_selection(FontSelection::new("Lora", FontWeight::Bold, FontStyle::Normal));
        editor.select_placeholder(PlaceholderType::Tanggal);
        let id = editor.add_text_element("", &TextProperties::default(), None).unwrap();

        let tb = editor.doc().get(id).unwrap().as_text().unwrap().clone();
        assert_eq!(tb.text, "{TANGGAL}");
        assert_eq!(tb.font.family, "Lora");
        assert_eq!(tb.font.weight, FontWeight::Bold);
    }

    #[test]
    fn empty_custom_text_is_rejected() {
        let mut editor = Editor::new("https://example.com");
        assert!(editor.add_text_element("  ", &TextProperties::default(), None).is_err());
        assert!(editor.doc().is_empty());
    }

    #[test]
    fn font_update_only_touches_selected_text() {
        let mut editor = Editor::new("https://example.com");
        let first = editor.add_text_element("Satu", &TextProperties::default(), None).unwrap();
        let second = editor.add_text_element("Dua", &TextProperties::default(), None).unwrap();

        editor.set_font_selection(FontSelection::new("Poppins", FontWeight::Black, FontStyle::Italic));
        assert!(editor.update_selected_element_font().unwrap());

        assert_eq!(editor.doc().get(first).unwrap().as_text().unwrap().font, FontSelection::default());
        assert_eq!(editor.doc().get(second).unwrap().as_text().unwrap().font.family, "Poppins");

        editor.add_qr_element("", None, None);
        assert!(!editor.update_selected_element_font().unwrap());
    }

    #[test]
    fn rejected_update_leaves_element_unchanged() {
        let mut editor = Editor::new("https://example.com");
        editor.select_placeholder(PlaceholderType::Nama);
        editor.add_text_element("", &TextProperties::default(), Some(Point2D::new(10.0, 10.0))).unwrap();
        let before = editor.doc().nth(0).unwrap().clone();

        let patch = ElementPatch { x: Some(300.0), text: Some("manual".into()), ..Default::default() };
        assert!(editor.update_element(0, &patch).is_err());
        assert_eq!(editor.doc().nth(0).unwrap(), &before);
    }

    #[test]
    fn remove_clears_selection() {
        let mut editor = Editor::new("https://example.com");
        editor.add_qr_element("", None, None);
        editor.remove_element(0).unwrap();
        assert_eq!(editor.state().selected(), None);
        assert!(editor.remove_element(0).is_err());
    }

    fn saveable() -> Editor {
        let mut editor = Editor::new("https://example.com");
        editor.set_merchant_id(Some(2));
        editor.set_template_name("Seminar");
        editor.add_qr_element("", None, None);
        editor.choose_background("bg.png", "data:,".into()).unwrap();
        let ticket = editor.begin_upload().unwrap();
        editor.finish_upload(&ticket, Ok("https://cdn/bg.png".into())).unwrap();
        editor
    }

    #[test]
    fn failed_save_keeps_model() {
        let mut editor = saveable();
        editor.begin_save().unwrap();
        assert!(!editor.finish_save(&Err(EditorError::Save("500".into()))));
        assert_eq!(editor.doc().count(), 1);

        editor.begin_save().unwrap();
        assert!(editor.finish_save(&Ok(())));
        assert!(editor.doc().is_empty());
    }

    #[test]
    fn second_save_is_refused_while_one_runs() {
        let mut editor = saveable();
        editor.begin_save().unwrap();
        assert!(editor.is_saving());
        assert!(matches!(editor.begin_save(), Err(EditorError::Save(_))));
        editor.finish_save(&Ok(()));
        assert!(!editor.is_saving());
    }

    #[test]
    fn edits_made_during_save_survive_success() {
        let mut editor = saveable();
        editor.begin_save().unwrap();
        editor.add_qr_element("https://example.com/baru", None, None);

        assert!(!editor.finish_save(&Ok(())));
        assert_eq!(editor.doc().count(), 2);
        assert!(!editor.is_saving());
    }

    #[test]
    fn background_url_without_upload_blocks_save() {
        let mut editor = Editor::new("https://example.com");
        editor.set_merchant_id(Some(2));
        editor.set_template_name("Seminar");
        editor.add_qr_element("", None, None);
        editor.choose_background("bg.png", "data:,".into()).unwrap();
        let ticket = editor.begin_upload().unwrap();
        assert!(editor.finish_upload(&ticket, Err(EditorError::Upload("timeout".into()))).is_err());

        assert_eq!(editor.prepare_save().unwrap_err(), ValidationError::MissingBackground);
    }

    #[test]
    fn load_template_marks_background_uploaded() {
        let mut editor = Editor::new("https://example.com");
        let json = r#"{"name":"Lama","merchant_id":4,"background_image":"https://cdn/bg.png",
            "elements":[{"type":"qrcode","x":1,"y":2}]}"#;
        assert_eq!(editor.load_template(json).unwrap(), 1);
        let body = editor.prepare_save().unwrap();
        assert_eq!(body.background_image, "https://cdn/bg.png");
        assert_eq!(body.merchant_id, 4);
    }
}
