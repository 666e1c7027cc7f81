use base64::Engine as _;
use log::warn;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

/// Shown instead of a QR code that cannot be generated.
pub const QR_PLACEHOLDER_SRC: &str = "/images/qr-placeholder.png";

const QUIET_ZONE_MODULES: usize = 4;

/// QR element payload. The code itself is regenerated from `data` on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct QrCodeElement {
    pub data: String,
}

impl QrCodeElement {
    pub fn new(data: &str) -> Self {
        Self { data: data.to_string() }
    }

    pub fn image_src(&self, size: f64) -> String {
        qr_image_src(&self.data, size)
    }
}

/// Pixel size of one module so that the whole symbol (quiet zone included)
/// comes out close to `size` pixels wide.
pub fn module_size(symbol_width: usize, size: f64) -> u32 {
    let total = (symbol_width + 2 * QUIET_ZONE_MODULES) as f64;
    if !(size.is_finite() && size > 0.0) {
        return 1;
    }
    ((size / total).round() as u32).max(1)
}

/// Render `data` as an SVG QR code approximately `size` pixels wide.
pub fn render_qr_svg(data: &str, size: f64) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)?;
    let module = module_size(code.width(), size);

    Ok(code
        .render::<svg::Color>()
        .quiet_zone(true)
        .module_dimensions(module, module)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// `src` for an `<img>` showing the QR code, or the placeholder image on failure.
pub fn qr_image_src(data: &str, size: f64) -> String {
    match render_qr_svg(data, size) {
        Ok(svg) => format!(
            "data:image/svg+xml;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(svg.as_bytes())
        ),
        Err(e) => {
            warn!("QR generation failed for {} bytes of data: {}", data.len(), e);
            QR_PLACEHOLDER_SRC.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_size_tracks_requested_size() {
        // version 1 symbol: 21 modules + 8 quiet zone = 29
        assert_eq!(module_size(21, 29.0 * 4.0), 4);
        assert_eq!(module_size(21, 10.0), 1);
        assert_eq!(module_size(21, -3.0), 1);
    }

    #[test]
    fn svg_is_generated_for_urls() {
        let svg = render_qr_svg("https://example.com/sertifikat/123", 100.0).unwrap();
        assert!(svg.contains("<svg"));
        assert!(qr_image_src("https://example.com", 100.0).starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn oversized_payload_falls_back_to_placeholder() {
        let data = "x".repeat(5000);
        assert_eq!(qr_image_src(&data, 100.0), QR_PLACEHOLDER_SRC);
    }
}
