use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Keys of the placeholder selector. `Custom` means free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderType {
    #[default]
    Custom,
    Nama,
    Instruktur,
    Nomor,
    Tanggal,
}

pub const ALL_PLACEHOLDERS: [PlaceholderType; 5] = [
    PlaceholderType::Custom,
    PlaceholderType::Nama,
    PlaceholderType::Instruktur,
    PlaceholderType::Nomor,
    PlaceholderType::Tanggal,
];

impl PlaceholderType {
    /// Token stored in the template and substituted by the certificate renderer.
    pub fn token(&self) -> &'static str {
        match self {
            PlaceholderType::Custom => "",
            PlaceholderType::Nama => "{NAMA}",
            PlaceholderType::Instruktur => "{INSTRUKTUR}",
            PlaceholderType::Nomor => "{NOMOR}",
            PlaceholderType::Tanggal => "{TANGGAL}",
        }
    }

    /// Sample text shown in the editor preview.
    pub fn preview(&self) -> &'static str {
        match self {
            PlaceholderType::Custom => "",
            PlaceholderType::Nama => "Nama Peserta",
            PlaceholderType::Instruktur => "Nama Instruktur",
            PlaceholderType::Nomor => "Nomor Sertifikat",
            PlaceholderType::Tanggal => "Tanggal Terbit",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderType::Custom => "custom",
            PlaceholderType::Nama => "nama",
            PlaceholderType::Instruktur => "instruktur",
            PlaceholderType::Nomor => "nomor",
            PlaceholderType::Tanggal => "tanggal",
        }
    }

    pub fn is_custom(&self) -> bool {
        *self == PlaceholderType::Custom
    }

    /// Find the placeholder whose token is exactly `text`.
    pub fn from_token(text: &str) -> Option<Self> {
        ALL_PLACEHOLDERS.into_iter().find(|p| !p.is_custom() && p.token() == text.trim())
    }
}

impl FromStr for PlaceholderType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PLACEHOLDERS
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| EditorError::InvalidInput(format!("unknown placeholder: {s}")))
    }
}

/// What the text form shows after a placeholder key is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderResolution {
    pub placeholder: PlaceholderType,
    pub token: String,
    pub preview: String,
    /// Value of the text input.
    pub text: String,
    pub editable: bool,
}

/// State of the text input bound to the placeholder selector.
///
/// Custom text lives only while the field stays in custom mode. Any selection,
/// custom included, starts from an empty field.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderField {
    placeholder: PlaceholderType,
    custom_text: String,
}

impl PlaceholderField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(&self) -> PlaceholderType {
        self.placeholder
    }

    pub fn select(&mut self, placeholder: PlaceholderType) -> PlaceholderResolution {
        self.custom_text.clear();
        self.placeholder = placeholder;
        self.resolve()
    }

    /// Typing into the field; ignored unless the field is in custom mode.
    pub fn set_custom_text(&mut self, text: &str) -> bool {
        if !self.placeholder.is_custom() {
            return false;
        }
        self.custom_text = text.to_string();
        true
    }

    /// Text a new element should receive.
    pub fn text(&self) -> &str {
        if self.placeholder.is_custom() { &self.custom_text } else { self.placeholder.token() }
    }

    pub fn resolve(&self) -> PlaceholderResolution {
        PlaceholderResolution {
            placeholder: self.placeholder,
            token: self.placeholder.token().to_string(),
            preview: if self.placeholder.is_custom() {
                self.custom_text.clone()
            } else {
                self.placeholder.preview().to_string()
            },
            text: self.text().to_string(),
            editable: self.placeholder.is_custom(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_fixed_key_has_token_and_preview() {
        for p in ALL_PLACEHOLDERS {
            if p.is_custom() {
                assert_eq!(p.token(), "");
            } else {
                assert!(!p.token().is_empty(), "{:?} has no token", p);
                assert!(!p.preview().is_empty(), "{:?} has no preview", p);
            }
        }
    }

    #[test]
    fn nama_resolves_deterministically() {
        let mut field = PlaceholderField::new();
        for _ in 0..3 {
            let r = field.select(PlaceholderType::Nama);
            assert_eq!(r.token, "{NAMA}");
            assert_eq!(r.preview, "Nama Peserta");
            assert_eq!(r.text, "{NAMA}");
            assert!(!r.editable);
        }
    }

    #[test]
    fn custom_starts_empty_regardless_of_history() {
        let mut field = PlaceholderField::new();
        field.set_custom_text("Sertifikat Kelulusan");
        field.select(PlaceholderType::Nomor);
        assert!(!field.set_custom_text("ignored"));

        let r = field.select(PlaceholderType::Custom);
        assert_eq!(r.text, "");
        assert!(r.editable);
    }

    #[test]
    fn custom_text_kept_while_in_custom_mode() {
        let mut field = PlaceholderField::new();
        field.select(PlaceholderType::Custom);
        assert!(field.set_custom_text("Peserta Terbaik"));
        assert_eq!(field.text(), "Peserta Terbaik");
        assert_eq!(field.resolve().preview, "Peserta Terbaik");

        let r = field.select(PlaceholderType::Custom);
        assert_eq!(r.text, "");
    }

    #[test]
    fn parse_and_token_lookup() {
        assert_eq!("NOMOR".parse::<PlaceholderType>().unwrap(), PlaceholderType::Nomor);
        assert!("alamat".parse::<PlaceholderType>().is_err());
        assert_eq!(PlaceholderType::from_token("{TANGGAL}"), Some(PlaceholderType::Tanggal));
        assert_eq!(PlaceholderType::from_token(""), None);
    }
}
