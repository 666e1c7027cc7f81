//! Background image upload: NoFile → FileChosen → Uploading → Uploaded | UploadFailed.

use log::{info, warn};
use serde::Deserialize;

use crate::error::EditorError;
use crate::template_doc::Background;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadState {
    #[default]
    NoFile,
    /// A file is picked and previewed locally; nothing sent yet.
    FileChosen { file_name: String },
    Uploading { file_name: String },
    Uploaded { url: String },
    UploadFailed { file_name: String, message: String },
}

impl UploadState {
    /// The upload button is disabled while a request is in flight or nothing is chosen.
    pub fn trigger_enabled(&self) -> bool {
        matches!(self, UploadState::FileChosen { .. } | UploadState::UploadFailed { .. })
    }

    pub fn status_text(&self) -> String {
        match self {
            UploadState::NoFile => String::new(),
            UploadState::FileChosen { file_name } => format!("{file_name} siap diupload"),
            UploadState::Uploading { .. } => "Mengupload...".to_string(),
            UploadState::Uploaded { .. } => "Background berhasil diupload".to_string(),
            UploadState::UploadFailed { message, .. } => format!("Upload gagal: {message}"),
        }
    }

    fn file_name(&self) -> Option<&str> {
        match self {
            UploadState::FileChosen { file_name }
            | UploadState::Uploading { file_name }
            | UploadState::UploadFailed { file_name, .. } => Some(file_name),
            _ => None,
        }
    }
}

/// Body returned by the upload endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UploadResponse {
    Success { url: String },
    Error {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl UploadResponse {
    /// Turn the JSON envelope into the stored URL or an upload error.
    pub fn into_url(self) -> Result<String, EditorError> {
        match self {
            UploadResponse::Success { url } if !url.trim().is_empty() => Ok(url),
            UploadResponse::Success { .. } => Err(EditorError::Upload("server returned an empty url".into())),
            UploadResponse::Error { message, status } => Err(EditorError::Upload(
                message.or(status).unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}

/// Handed out by `begin`; only the ticket of the current upload may finish it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub generation: u64,
    pub file_name: String,
}

/// Drives the upload state and keeps the template background consistent with it.
#[derive(Debug, Default)]
pub struct BackgroundUpload {
    state: UploadState,
    /// Bumped on every choice, so a response for an older file is recognised.
    generation: u64,
}

impl BackgroundUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// A file was picked: show its local preview, forget any previous upload.
    /// Refused while a request is in flight.
    pub fn choose(&mut self, background: &mut Background, file_name: &str, preview: String) -> Result<(), EditorError> {
        if matches!(self.state, UploadState::Uploading { .. }) {
            return Err(EditorError::Upload("upload already in progress".into()));
        }
        info!("background file chosen: {}", file_name);
        self.generation += 1;
        *background = Background { url: None, preview: Some(preview), uploaded: false };
        self.state = UploadState::FileChosen { file_name: file_name.to_string() };
        Ok(())
    }

    /// Enter `Uploading`. Fails when nothing is chosen or a request is already in flight.
    pub fn begin(&mut self) -> Result<UploadTicket, EditorError> {
        if !self.state.trigger_enabled() {
            return Err(EditorError::Upload(match self.state {
                UploadState::Uploading { .. } => "upload already in progress".into(),
                _ => "no file chosen".into(),
            }));
        }
        let file_name = self.state.file_name().unwrap_or_default().to_string();
        self.state = UploadState::Uploading { file_name: file_name.clone() };
        Ok(UploadTicket { generation: self.generation, file_name })
    }

    fn is_current(&self, ticket: &UploadTicket) -> bool {
        ticket.generation == self.generation
            && matches!(&self.state, UploadState::Uploading { file_name } if *file_name == ticket.file_name)
    }

    /// Store the URL for the file of `ticket`. Returns false, changing nothing, for a stale ticket.
    pub fn succeed(&mut self, background: &mut Background, ticket: &UploadTicket, url: String) -> bool {
        if !self.is_current(ticket) {
            warn!("ignoring upload result for {} (superseded)", ticket.file_name);
            return false;
        }
        info!("background uploaded: {}", url);
        background.url = Some(url.clone());
        background.uploaded = true;
        self.state = UploadState::Uploaded { url };
        true
    }

    /// Roll back to "no background" so a save stays blocked; the chosen file can be re-sent.
    pub fn fail(&mut self, background: &mut Background, ticket: &UploadTicket, message: &str) -> bool {
        if !self.is_current(ticket) {
            warn!("ignoring upload failure for {} (superseded): {}", ticket.file_name, message);
            return false;
        }
        warn!("background upload failed: {}", message);
        *background = Background::default();
        self.state = UploadState::UploadFailed { file_name: ticket.file_name.clone(), message: message.to_string() };
        true
    }

    /// Background of a stored template, already on the server.
    pub fn restore(&mut self, background: &mut Background, url: String) {
        self.generation += 1;
        background.url = Some(url.clone());
        background.preview = None;
        background.uploaded = true;
        self.state = UploadState::Uploaded { url };
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = UploadState::NoFile;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn happy_path_sets_background_flag() {
        let mut bg = Background::default();
        let mut upload = BackgroundUpload::new();
        assert!(upload.begin().is_err());

        upload.choose(&mut bg, "bg.png", "data:image/png;base64,AA".into()).unwrap();
        assert_eq!(bg.display_src(), Some("data:image/png;base64,AA"));
        assert!(!bg.uploaded);

        let ticket = upload.begin().unwrap();
        assert!(!upload.state().trigger_enabled());
        assert!(upload.begin().is_err());

        assert!(upload.succeed(&mut bg, &ticket, "https://cdn/bg.png".into()));
        assert!(bg.uploaded);
        assert_eq!(upload.state(), &UploadState::Uploaded { url: "https://cdn/bg.png".into() });
    }

    #[test]
    fn failure_rolls_back_and_allows_retry() {
        let mut bg = Background::default();
        let mut upload = BackgroundUpload::new();
        upload.choose(&mut bg, "bg.png", "data:,".into()).unwrap();
        let ticket = upload.begin().unwrap();
        upload.fail(&mut bg, &ticket, "413 Payload Too Large");

        assert_eq!(bg, Background::default());
        assert!(upload.state().trigger_enabled());
        assert_eq!(upload.begin().unwrap().file_name, "bg.png");
    }

    #[test]
    fn choosing_during_upload_is_refused() {
        let mut bg = Background::default();
        let mut upload = BackgroundUpload::new();
        upload.choose(&mut bg, "a.png", "data:a".into()).unwrap();
        let ticket = upload.begin().unwrap();

        assert!(upload.choose(&mut bg, "b.png", "data:b".into()).is_err());
        assert_eq!(bg.preview.as_deref(), Some("data:a"));
        assert!(upload.succeed(&mut bg, &ticket, "https://cdn/a.png".into()));
    }

    #[test]
    fn result_for_a_replaced_file_is_ignored() {
        let mut bg = Background::default();
        let mut upload = BackgroundUpload::new();
        upload.choose(&mut bg, "same.png", "data:first".into()).unwrap();
        let first = upload.begin().unwrap();
        upload.fail(&mut bg, &first, "timeout");

        // same name, new file
        upload.choose(&mut bg, "same.png", "data:second".into()).unwrap();
        let second = upload.begin().unwrap();

        assert!(!upload.succeed(&mut bg, &first, "https://cdn/first.png".into()));
        assert!(!upload.fail(&mut bg, &first, "late"));
        assert_eq!(bg.url, None);
        assert!(!bg.uploaded);
        assert_eq!(upload.state(), &UploadState::Uploading { file_name: "same.png".into() });

        assert!(upload.succeed(&mut bg, &second, "https://cdn/second.png".into()));
        assert_eq!(bg.url.as_deref(), Some("https://cdn/second.png"));
    }

    #[test]
    fn response_envelopes() {
        let ok: UploadResponse = serde_json::from_str(r#"{"url": "https://cdn/a.png"}"#).unwrap();
        assert_eq!(ok.into_url().unwrap(), "https://cdn/a.png");

        let err: UploadResponse = serde_json::from_str(r#"{"status": "error", "message": "File terlalu besar"}"#).unwrap();
        assert_eq!(err.into_url().unwrap_err().to_string(), "upload failed: File terlalu besar");

        let empty: UploadResponse = serde_json::from_str(r#"{"url": ""}"#).unwrap();
        assert!(empty.into_url().is_err());
    }
}
