use log::info;

use crate::elements::element::ElementId;
use crate::font::FontSelection;
use crate::placeholder::{PlaceholderField, PlaceholderResolution, PlaceholderType};

/// Values of the editor's side-panel controls.
#[derive(Debug, Default)]
pub struct State{
    font: FontSelection,
    placeholder: PlaceholderField,
    selected: Option<ElementId>,
}

impl State{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(&self) -> &FontSelection {
        &self.font
    }

    pub fn set_font(&mut self, value: FontSelection) {
        info!("font selection: {} {} {}", value.family, value.weight, value.style.as_str());
        self.font = value;
    }

    pub fn placeholder(&self) -> &PlaceholderField {
        &self.placeholder
    }

    pub fn select_placeholder(&mut self, value: PlaceholderType) -> PlaceholderResolution {
        self.placeholder.select(value)
    }

    pub fn set_custom_text(&mut self, text: &str) -> bool {
        self.placeholder.set_custom_text(text)
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn set_selected(&mut self, value: Option<ElementId>) {
        self.selected = value;
    }

    /// Back to a blank form after a successful save.
    pub fn reset(&mut self) {
        self.placeholder = PlaceholderField::new();
        self.selected = None;
    }
}
