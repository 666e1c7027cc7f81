use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::font::FontSelection;
use crate::placeholder::PlaceholderType;

pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

impl FromStr for TextAlign {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "start" => Ok(TextAlign::Left),
            "center" | "centre" => Ok(TextAlign::Center),
            "right" | "end" => Ok(TextAlign::Right),
            other => Err(EditorError::InvalidInput(format!("unknown text alignment: {other}"))),
        }
    }
}

/// Text element payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// Literal text, or the placeholder token when `placeholder` is not custom.
    pub text: String,
    pub font: FontSelection,
    pub font_size: f64,
    pub color: String,
    pub text_align: TextAlign,
    pub placeholder: PlaceholderType,
}

impl TextBox {
    pub fn new(text: &str, font: FontSelection) -> Self {
        let placeholder = PlaceholderType::from_token(text).unwrap_or_default();
        Self {
            text: text.to_string(),
            font,
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_string(),
            text_align: TextAlign::Left,
            placeholder,
        }
    }

    /// Switch the placeholder; fixed placeholders overwrite the text with their token.
    pub fn set_placeholder(&mut self, placeholder: PlaceholderType) {
        self.placeholder = placeholder;
        if !placeholder.is_custom() {
            self.text = placeholder.token().to_string();
        }
    }

    /// Editing the text of a placeholder element is refused: its text is derived.
    pub fn set_text(&mut self, text: &str) -> bool {
        if !self.placeholder.is_custom() {
            return false;
        }
        self.text = text.to_string();
        true
    }

    /// What the canvas shows: the sample value for placeholders, the text otherwise.
    pub fn display_text(&self) -> &str {
        if self.placeholder.is_custom() { &self.text } else { self.placeholder.preview() }
    }

    pub fn apply(&mut self, props: &TextProperties) -> Result<(), EditorError> {
        if let Some(size) = props.font_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(EditorError::InvalidInput(format!("font size must be positive, got {size}")));
            }
            self.font_size = size;
        }
        if let Some(color) = props.color.as_deref() {
            self.color = color.to_string();
        }
        if let Some(align) = props.text_align.as_deref() {
            self.text_align = align.parse()?;
        }
        if let Some(family) = props.font_family.as_deref() {
            self.font = FontSelection::new(family, self.font.weight, self.font.style);
        }
        if let Some(weight) = props.font_weight.as_deref() {
            self.font.weight = weight.parse()?;
        }
        if let Some(style) = props.font_style.as_deref() {
            self.font.style = style.parse()?;
        }
        if let Some(placeholder) = props.placeholder_type.as_deref() {
            self.set_placeholder(placeholder.parse()?);
        }
        Ok(())
    }
}

/// Optional properties passed along with `addTextElement` / `updateElement`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProperties {
    pub placeholder_type: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub text_align: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
}
