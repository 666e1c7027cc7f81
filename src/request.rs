use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, RequestMode, Response};

use crate::config::config;
use crate::error::EditorError;
use crate::serializer::TemplateDocument;
use crate::upload::UploadResponse;

/// `{ message }` body the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}

pub fn error_message(status: u16, envelope: Option<ErrorEnvelope>) -> String {
    envelope
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// `data` of a validation response; an absent, null or empty `data` means no match.
pub fn certificate_from_response(body: serde_json::Value) -> Option<serde_json::Value> {
    match body.get("data")? {
        serde_json::Value::Null => None,
        serde_json::Value::Object(map) if map.is_empty() => None,
        serde_json::Value::Array(items) if items.is_empty() => None,
        data => Some(data.clone()),
    }
}

fn csrf_token() -> Option<String> {
    if let Some(token) = config().csrf_token.clone() {
        return Some(token);
    }
    let document = web_sys::window()?.document()?;
    document
        .query_selector("meta[name=\"csrf-token\"]")
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
}

async fn post(url: &str, body: &JsValue, content_type: Option<&str>) -> Result<Response, EditorError> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::SameOrigin);
    opts.set_body(body);

    let request = Request::new_with_str_and_init(url, &opts).map_err(EditorError::network)?;
    let headers = request.headers();
    headers.set("Accept", "application/json").map_err(EditorError::network)?;
    headers.set("X-Requested-With", "XMLHttpRequest").map_err(EditorError::network)?;
    if let Some(content_type) = content_type {
        headers.set("Content-Type", content_type).map_err(EditorError::network)?;
    }
    match csrf_token() {
        Some(token) => headers.set("X-CSRF-TOKEN", &token).map_err(EditorError::network)?,
        None => warn!("no CSRF token found for {}", url),
    }

    let window = web_sys::window().ok_or_else(|| EditorError::Dom("no window object".into()))?;
    let response = JsFuture::from(window.fetch_with_request(&request)).await.map_err(EditorError::network)?;
    response.dyn_into::<Response>().map_err(|_| EditorError::Network("response conversion failed".into()))
}

async fn json_body<T: for<'de> Deserialize<'de>>(response: &Response) -> Result<T, EditorError> {
    let promise = response.json().map_err(EditorError::network)?;
    let value = JsFuture::from(promise).await.map_err(EditorError::network)?;
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Send the chosen background and return the URL the backend stored it under.
pub async fn upload_background(file: &File) -> Result<String, EditorError> {
    let form = FormData::new().map_err(EditorError::dom)?;
    form.append_with_blob_and_filename("background_image", file, &file.name()).map_err(EditorError::dom)?;

    let url = config().upload_url();
    info!("uploading {} ({} bytes) to {}", file.name(), file.size(), url);
    let response = post(&url, &form.into(), None).await?;

    if !response.ok() {
        let envelope = json_body::<ErrorEnvelope>(&response).await.ok();
        return Err(EditorError::Upload(error_message(response.status(), envelope)));
    }
    json_body::<UploadResponse>(&response).await?.into_url()
}

pub async fn save_template(document: &TemplateDocument) -> Result<(), EditorError> {
    let body = serde_json::to_string(document)?;
    let url = config().save_url();
    info!("saving template '{}' with {} elements", document.name, document.elements.len());

    let response = post(&url, &JsValue::from_str(&body), Some("application/json")).await?;
    if response.ok() {
        Ok(())
    } else {
        let envelope = json_body::<ErrorEnvelope>(&response).await.ok();
        Err(EditorError::Save(error_message(response.status(), envelope)))
    }
}

/// Look up a participant certificate by number. `Ok(None)` when nothing matches.
pub async fn validate_certificate(certificate_number: &str) -> Result<Option<serde_json::Value>, EditorError> {
    let body = serde_json::json!({ "certificate_number": certificate_number.trim() }).to_string();
    let response = post(&config().validate_url(), &JsValue::from_str(&body), Some("application/json")).await?;

    if !response.ok() {
        if response.status() == 404 {
            return Ok(None);
        }
        let envelope = json_body::<ErrorEnvelope>(&response).await.ok();
        return Err(EditorError::Network(error_message(response.status(), envelope)));
    }
    let body: serde_json::Value = json_body(&response).await?;
    Ok(certificate_from_response(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_prefers_backend_text() {
        let envelope = ErrorEnvelope { message: Some("Nama template sudah dipakai".into()) };
        assert_eq!(error_message(422, Some(envelope)), "Nama template sudah dipakai");
        assert_eq!(error_message(500, None), "HTTP 500");
        assert_eq!(error_message(500, Some(ErrorEnvelope { message: Some(" ".into()) })), "HTTP 500");
    }

    #[test]
    fn certificate_lookup_results() {
        assert_eq!(
            certificate_from_response(json!({"data": {"nama": "Budi", "nomor": "001"}})),
            Some(json!({"nama": "Budi", "nomor": "001"}))
        );
        assert_eq!(certificate_from_response(json!({"data": null})), None);
        assert_eq!(certificate_from_response(json!({"data": {}})), None);
        assert_eq!(certificate_from_response(json!({"message": "not found"})), None);
    }
}
