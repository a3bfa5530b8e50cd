//! QR code rendering to a data URL.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

use super::ProviderError;

/// Render `contents` (typically a tenant intake URL) as an SVG QR code,
/// base64-wrapped into a `data:` URL suitable for direct embedding.
pub fn qr_data_url(contents: &str) -> Result<String, ProviderError> {
    let code = QrCode::new(contents.as_bytes())
        .map_err(|e| ProviderError::Malformed(format!("qr encoding failed: {e}")))?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .build();

    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_svg_data_url() {
        let url = qr_data_url("https://app.example.com/assess/t-1").unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));

        let payload = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = STANDARD.decode(payload).unwrap();
        let svg_text = String::from_utf8(decoded).unwrap();
        assert!(svg_text.contains("<svg"));
    }

    #[test]
    fn distinct_contents_render_distinct_codes() {
        let a = qr_data_url("https://app.example.com/assess/a").unwrap();
        let b = qr_data_url("https://app.example.com/assess/b").unwrap();
        assert_ne!(a, b);
    }
}
