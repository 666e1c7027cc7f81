use log::Level;
use once_cell::sync::{Lazy, OnceCell};
use serde::Deserialize;

static CONFIG: OnceCell<EditorConfig> = OnceCell::new();
static DEFAULT_CONFIG: Lazy<EditorConfig> = Lazy::new(EditorConfig::default);

/// Settings handed over by the page when the editor is mounted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Backend origin, empty for same-origin requests.
    pub base_url: String,
    pub upload_path: String,
    pub save_path: String,
    pub validate_path: String,
    /// Element scaled to the on-screen preview size; holds the 842×595 stage.
    pub container_id: String,
    pub stage_id: String,
    pub upload_status_id: String,
    pub upload_button_id: String,
    pub preview_id: String,
    /// Overrides `<meta name="csrf-token">`.
    pub csrf_token: Option<String>,
    pub default_qr_data: String,
    pub notification_duration_ms: i32,
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            upload_path: "/sertifikat-templates/upload-image".to_string(),
            save_path: "/sertifikat-templates".to_string(),
            validate_path: "/sertifikat/validate/peserta".to_string(),
            container_id: "certificate-preview".to_string(),
            stage_id: "certificate-canvas".to_string(),
            upload_status_id: "upload-status".to_string(),
            upload_button_id: "upload-background-btn".to_string(),
            preview_id: "placeholder-preview".to_string(),
            csrf_token: None,
            default_qr_data: "https://example.com/sertifikat/validate".to_string(),
            notification_duration_ms: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn upload_url(&self) -> String {
        self.url(&self.upload_path)
    }

    pub fn save_url(&self) -> String {
        self.url(&self.save_path)
    }

    pub fn validate_url(&self) -> String {
        self.url(&self.validate_path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::Info)
    }
}

/// Keep the first configuration; later calls are ignored.
pub fn set_config(config: EditorConfig) {
    if CONFIG.set(config).is_err() {
        log::warn!("editor config already set, ignoring new value");
    }
}

/// The page's configuration, or the defaults until `set_config` has run.
/// Reading never fills the cell.
pub fn config() -> &'static EditorConfig {
    resolve(&CONFIG)
}

fn resolve(cell: &OnceCell<EditorConfig>) -> &EditorConfig {
    cell.get().unwrap_or(&DEFAULT_CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let cfg = EditorConfig { base_url: "https://admin.example.com/".into(), ..Default::default() };
        assert_eq!(cfg.upload_url(), "https://admin.example.com/sertifikat-templates/upload-image");

        let same_origin = EditorConfig::default();
        assert_eq!(same_origin.save_url(), "/sertifikat-templates");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: EditorConfig = serde_json::from_str(r#"{"baseUrl": "http://127.0.0.1:8000", "logLevel": "debug"}"#).unwrap();
        assert_eq!(cfg.validate_url(), "http://127.0.0.1:8000/sertifikat/validate/peserta");
        assert_eq!(cfg.log_level(), Level::Debug);
        assert_eq!(cfg.stage_id, "certificate-canvas");
    }

    #[test]
    fn reading_before_init_does_not_pin_defaults() {
        let cell = OnceCell::new();
        assert_eq!(resolve(&cell).stage_id, "certificate-canvas");

        let page = EditorConfig { stage_id: "canvas-2".into(), ..Default::default() };
        assert!(cell.set(page).is_ok());
        assert_eq!(resolve(&cell).stage_id, "canvas-2");
    }

    #[test]
    fn unknown_log_level_is_info() {
        let cfg = EditorConfig { log_level: "chatty".into(), ..Default::default() };
        assert_eq!(cfg.log_level(), Level::Info);
    }
}
