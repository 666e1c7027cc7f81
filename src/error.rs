use thiserror::Error;
use wasm_bindgen::JsValue;

/// Local checks run before a template is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("merchant belum dipilih")]
    MissingMerchant,
    #[error("nama template wajib diisi")]
    MissingName,
    #[error("background belum diupload")]
    MissingBackground,
    #[error("template belum memiliki elemen")]
    NoElements,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("save failed: {0}")]
    Save(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("DOM error: {0}")]
    Dom(String),
    #[error("no element at index {0}")]
    UnknownElement(usize),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("editor is not initialised")]
    NotInitialised,
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    /// Wrap an opaque JS exception thrown by a browser API.
    pub fn dom(value: JsValue) -> Self {
        EditorError::Dom(js_error_message(&value))
    }

    pub fn network(value: JsValue) -> Self {
        EditorError::Network(js_error_message(&value))
    }
}

impl From<serde_wasm_bindgen::Error> for EditorError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        EditorError::InvalidInput(e.to_string())
    }
}

impl From<EditorError> for JsValue {
    fn from(e: EditorError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

fn js_error_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
