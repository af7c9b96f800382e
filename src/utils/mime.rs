//! Content-Type lookup for the dev server.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const SOURCE_MAP: &str = "application/json";
    pub const PDF: &str = "application/pdf";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";

    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    pub const MP4: &str = "video/mp4";
    pub const WEBM: &str = "video/webm";
    pub const MP3: &str = "audio/mpeg";

    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
}

/// Guess the Content-Type of a file from its extension.
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    from_extension(ext.as_deref())
}

pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        Some("map") => types::SOURCE_MAP,
        Some("json" | "webmanifest") => types::JSON,
        Some("xml") => types::XML,
        Some("txt") => types::PLAIN,

        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("avif") => types::AVIF,
        Some("ico") => types::ICO,

        Some("mp4") => types::MP4,
        Some("webm") => types::WEBM,
        Some("mp3") => types::MP3,

        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        Some("otf") => types::OTF,

        Some("pdf") => types::PDF,
        Some("wasm") => types::WASM,
        _ => types::OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("css/main.min.css")), types::CSS);
        assert_eq!(from_path(Path::new("js/main.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("js/main.js.map")), types::SOURCE_MAP);
        assert_eq!(from_path(Path::new("img/photo.WEBP")), types::WEBP);
        assert_eq!(from_path(Path::new("fonts/inter.woff2")), types::WOFF2);
        assert_eq!(from_path(Path::new("unknown.xyz")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("LICENSE")), types::OCTET_STREAM);
    }
}
