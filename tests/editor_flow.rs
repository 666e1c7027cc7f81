use certificate_template_editor::editor::{Editor, PointerContext};
use certificate_template_editor::drag::PointerPress;
use certificate_template_editor::error::ValidationError;
use certificate_template_editor::font::{FontSelection, FontStyle, FontWeight};
use certificate_template_editor::placeholder::PlaceholderType;
use certificate_template_editor::{Point2D, Size2D, TextProperties};
use pretty_assertions::assert_eq;
use serde_json::json;

const DEFAULT_QR: &str = "https://example.com/sertifikat/validate";

fn ready_editor() -> Editor {
    let mut editor = Editor::new(DEFAULT_QR);
    editor.set_merchant_id(Some(7));
    editor.set_template_name("Pelatihan K3");
    editor
}

fn confirm_upload(editor: &mut Editor, url: &str) {
    editor.choose_background("bg.jpg", "data:image/jpeg;base64,AAAA".into()).unwrap();
    let ticket = editor.begin_upload().unwrap();
    editor.finish_upload(&ticket, Ok(url.to_string())).unwrap();
}

#[test]
fn nomor_placeholder_is_saved_as_token_with_font() {
    let mut editor = ready_editor();
    editor.set_font_selection(FontSelection::new("Montserrat", FontWeight::SemiBold, FontStyle::Normal));
    let resolution = editor.select_placeholder(PlaceholderType::Nomor);
    assert_eq!(resolution.preview, "Nomor Sertifikat");
    assert!(!resolution.editable);

    editor.add_text_element("", &TextProperties::default(), Some(Point2D::new(300.0, 400.0))).unwrap();
    confirm_upload(&mut editor, "https://cdn.example.com/bg/42.jpg");

    let body = serde_json::to_value(editor.prepare_save().unwrap()).unwrap();
    assert_eq!(body["merchant_id"], json!(7));
    assert_eq!(body["background_image"], json!("https://cdn.example.com/bg/42.jpg"));

    let element = &body["elements"][0];
    assert_eq!(element["type"], json!("text"));
    assert_eq!(element["text"], json!("{NOMOR}"));
    assert_eq!(element["placeholderType"], json!("nomor"));
    assert_eq!(
        element["font"],
        json!({"family": "Montserrat", "weight": "semibold", "style": "normal", "cssWeight": 600})
    );
}

#[test]
fn nothing_is_sent_without_elements() {
    let mut editor = ready_editor();
    confirm_upload(&mut editor, "https://cdn.example.com/bg/1.jpg");
    assert_eq!(editor.prepare_save().unwrap_err(), ValidationError::NoElements);
}

#[test]
fn chosen_but_unconfirmed_background_blocks_save() {
    let mut editor = ready_editor();
    editor.add_qr_element("", None, None);
    editor.choose_background("bg.jpg", "data:image/jpeg;base64,AAAA".into()).unwrap();
    assert_eq!(editor.prepare_save().unwrap_err(), ValidationError::MissingBackground);
}

#[test]
fn validation_reports_first_failure() {
    let mut editor = Editor::new(DEFAULT_QR);
    assert_eq!(editor.prepare_save().unwrap_err(), ValidationError::MissingMerchant);
    editor.set_merchant_id(Some(1));
    assert_eq!(editor.prepare_save().unwrap_err(), ValidationError::MissingName);
    editor.set_template_name("  ");
    assert_eq!(editor.prepare_save().unwrap_err(), ValidationError::MissingName);
}

#[test]
fn dragged_position_is_what_gets_saved() {
    let mut editor = ready_editor();
    let id = editor.add_qr_element("https://example.com/cek/1", Some(Point2D::new(0.0, 0.0)), Some(100.0));
    confirm_upload(&mut editor, "https://cdn.example.com/bg/2.jpg");

    // container at full size, stage at the page origin
    let at = |x: f64, y: f64| PointerContext {
        pointer: Point2D::new(x, y),
        origin: Point2D::new(0.0, 0.0),
        container: Size2D::new(842.0, 595.0),
    };
    editor.pointer_down(id, at(10.0, 10.0), Size2D::new(100.0, 100.0), PointerPress::primary(3)).unwrap();
    editor.pointer_move(at(5000.0, 5000.0)).unwrap();
    editor.pointer_up().unwrap();

    let body = editor.prepare_save().unwrap();
    let saved = serde_json::to_value(&body.elements[0]).unwrap();
    assert_eq!(saved["x"], json!(742.0));
    assert_eq!(saved["y"], json!(495.0));
    assert_eq!(saved["data"], json!("https://example.com/cek/1"));
}

#[test]
fn saved_template_loads_back() {
    let mut editor = ready_editor();
    editor.select_placeholder(PlaceholderType::Nama);
    editor.add_text_element("", &TextProperties::default(), Some(Point2D::new(100.0, 200.0))).unwrap();
    editor.add_image_element("https://cdn.example.com/logo.png", Some(Point2D::new(10.0, 10.0)), None).unwrap();
    confirm_upload(&mut editor, "https://cdn.example.com/bg/3.jpg");
    let saved = serde_json::to_string(&editor.prepare_save().unwrap()).unwrap();

    let mut restored = Editor::new(DEFAULT_QR);
    assert_eq!(restored.load_template(&saved).unwrap(), 2);
    let again = restored.prepare_save().unwrap();
    assert_eq!(again.name, "Pelatihan K3");
    assert_eq!(again.elements.len(), 2);
    assert_eq!(serde_json::to_value(&again.elements[0]).unwrap()["text"], json!("{NAMA}"));
}

#[test]
fn background_cannot_be_swapped_while_uploading() {
    let mut editor = ready_editor();
    editor.add_qr_element("", None, None);
    editor.choose_background("a.png", "data:a".into()).unwrap();
    let ticket = editor.begin_upload().unwrap();

    assert!(editor.choose_background("b.png", "data:b".into()).is_err());
    editor.finish_upload(&ticket, Ok("https://cdn/a.png".into())).unwrap();
    assert_eq!(editor.prepare_save().unwrap().background_image, "https://cdn/a.png");
}

#[test]
fn upload_finishing_after_a_load_is_ignored() {
    let mut editor = ready_editor();
    editor.choose_background("a.png", "data:a".into()).unwrap();
    let ticket = editor.begin_upload().unwrap();

    let stored = r#"{"name":"Lama","merchant_id":7,"background_image":"https://cdn/lama.png",
        "elements":[{"type":"qrcode","x":0,"y":0}]}"#;
    editor.load_template(stored).unwrap();

    assert!(editor.finish_upload(&ticket, Ok("https://cdn/a.png".into())).is_err());
    assert_eq!(editor.prepare_save().unwrap().background_image, "https://cdn/lama.png");
}
