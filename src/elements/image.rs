/// Image element payload: a URL or a data-URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub src: String,
}

impl ImageElement {
    pub fn new(src: &str) -> Self {
        Self { src: src.trim().to_string() }
    }

    pub fn is_data_url(&self) -> bool {
        self.src.starts_with("data:")
    }
}
