use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl FontWeight {
    /// Numeric CSS weight used by the browser and by the server-side font lookup.
    pub fn css_weight(&self) -> u16 {
        match self {
            FontWeight::Thin => 100,
            FontWeight::ExtraLight => 200,
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::ExtraBold => 800,
            FontWeight::Black => 900,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Thin => "thin",
            FontWeight::ExtraLight => "extralight",
            FontWeight::Light => "light",
            FontWeight::Regular => "regular",
            FontWeight::Medium => "medium",
            FontWeight::SemiBold => "semibold",
            FontWeight::Bold => "bold",
            FontWeight::ExtraBold => "extrabold",
            FontWeight::Black => "black",
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontWeight {
    type Err = EditorError;

    /// Accepts the weight names as well as CSS keywords and numbers ("bold", "700").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weight = match s.trim().to_lowercase().as_str() {
            "thin" | "100" => FontWeight::Thin,
            "extralight" | "extra-light" | "200" => FontWeight::ExtraLight,
            "light" | "300" => FontWeight::Light,
            "regular" | "normal" | "400" => FontWeight::Regular,
            "medium" | "500" => FontWeight::Medium,
            "semibold" | "semi-bold" | "600" => FontWeight::SemiBold,
            "bold" | "700" => FontWeight::Bold,
            "extrabold" | "extra-bold" | "800" => FontWeight::ExtraBold,
            "black" | "900" => FontWeight::Black,
            other => return Err(EditorError::InvalidInput(format!("unknown font weight: {other}"))),
        };
        Ok(weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

impl FromStr for FontStyle {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "" => Ok(FontStyle::Normal),
            "italic" | "oblique" => Ok(FontStyle::Italic),
            other => Err(EditorError::InvalidInput(format!("unknown font style: {other}"))),
        }
    }
}

/// Current values of the family/weight/style selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSelection {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl Default for FontSelection {
    fn default() -> Self {
        Self {
            family: DEFAULT_FONT_FAMILY.to_string(),
            weight: FontWeight::Regular,
            style: FontStyle::Normal,
        }
    }
}

impl FontSelection {
    pub fn new(family: &str, weight: FontWeight, style: FontStyle) -> Self {
        let family = family.trim();
        Self {
            family: if family.is_empty() { DEFAULT_FONT_FAMILY.to_string() } else { family.to_string() },
            weight,
            style,
        }
    }

    /// Parse raw selector values as they come from the page's `<select>`s.
    pub fn parse(family: &str, weight: &str, style: &str) -> Result<Self, EditorError> {
        Ok(Self::new(family, weight.parse()?, style.parse()?))
    }

    pub fn descriptor(&self) -> FontDescriptor {
        FontDescriptor {
            family: self.family.clone(),
            weight: self.weight.as_str().to_string(),
            style: self.style.as_str().to_string(),
            css_weight: self.weight.css_weight(),
        }
    }

    /// `font-family` value with a generic fallback.
    pub fn css_family(&self) -> String {
        format!("'{}', sans-serif", self.family.replace('\'', ""))
    }
}

/// Nested font object the server-side renderer uses to pick and embed the font file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    pub family: String,
    pub weight: String,
    pub style: String,
    pub css_weight: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn weight_accepts_css_keywords_and_numbers() {
        assert_eq!("bold".parse::<FontWeight>().unwrap(), FontWeight::Bold);
        assert_eq!("700".parse::<FontWeight>().unwrap(), FontWeight::Bold);
        assert_eq!("Normal".parse::<FontWeight>().unwrap(), FontWeight::Regular);
        assert!("heavy-ish".parse::<FontWeight>().is_err());
    }

    #[test]
    fn descriptor_carries_css_weight() {
        let font = FontSelection::parse("Poppins", "semibold", "italic").unwrap();
        assert_eq!(
            font.descriptor(),
            FontDescriptor {
                family: "Poppins".into(),
                weight: "semibold".into(),
                style: "italic".into(),
                css_weight: 600,
            }
        );
    }

    #[test]
    fn blank_family_falls_back_to_default() {
        let font = FontSelection::new("  ", FontWeight::Bold, FontStyle::Normal);
        assert_eq!(font.family, DEFAULT_FONT_FAMILY);
        assert_eq!(font.css_family(), "'Arial', sans-serif");
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let json = serde_json::to_value(FontSelection::default().descriptor()).unwrap();
        assert_eq!(json["cssWeight"], 400);
        assert_eq!(json["weight"], "regular");
    }
}
