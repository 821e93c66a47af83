use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::OnceLock,
};

use base64::{
    engine::general_purpose,
    Engine as _,
};
use regex::Regex;
use serde::Serialize;
use sha2::{
    Digest,
    Sha256,
};
use thiserror::Error;

const FALLBACK_IMAGE_EXT: &str = "png";

/// A file a note references, either already on disk or still in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaAsset {
    Audio(AudioAsset),
    Image(ImageAsset),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioAsset {
    pub source_path: PathBuf,
    pub filename: String,
}

impl AudioAsset {
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { source_path: path.to_path_buf(), filename }
    }
}

/// Image bytes waiting to be written. The filename is derived from the
/// content, so identical images always share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageDecodeError {
    #[error("not an image data URL")]
    NotDataUrl,

    #[error("image data URL is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image payload is empty")]
    Empty,
}

fn data_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^data:image/([A-Za-z0-9.+-]+)((?:;[^;,]*)*),(.*)$")
            .expect("data URL pattern is valid")
    })
}

/// Decodes a `data:image/<subtype>;base64,<payload>` URL into an asset named
/// `{kind}_{hash}.{ext}`.
pub fn decode_image_data_url(data_url: &str, kind: &str) -> Result<ImageAsset, ImageDecodeError> {
    let captures = data_url_regex().captures(data_url.trim()).ok_or(ImageDecodeError::NotDataUrl)?;

    let subtype = &captures[1];
    let params = &captures[2];
    if !params.split(';').any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(ImageDecodeError::NotBase64);
    }

    let payload: String = captures[3].chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    let filename = format!("{}_{}.{}", kind, content_hash(&bytes), image_extension(subtype));
    Ok(ImageAsset { filename, bytes })
}

/// First 8 hex characters of the SHA-256 digest.
pub fn content_hash(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

pub fn image_extension(subtype: &str) -> &'static str {
    match subtype.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        _ => FALLBACK_IMAGE_EXT,
    }
}

pub fn sound_tag(filename: &str) -> String {
    format!("[sound:{}]", filename)
}

pub fn image_tag(filename: &str) -> String {
    format!(r#"<img src="{}">"#, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_decode_png() {
        let url = format!("data:image/png;base64,{}", PNG_B64);
        let asset = decode_image_data_url(&url, "sentence").unwrap();

        assert!(asset.filename.starts_with("sentence_"));
        assert!(asset.filename.ends_with(".png"));
        assert_eq!(asset.filename.len(), "sentence_".len() + 8 + ".png".len());
        assert_eq!(&asset.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_identical_content_shares_filename() {
        let a = decode_image_data_url(&format!("data:image/png;base64,{}", PNG_B64), "sentence");
        let b = decode_image_data_url(
            &format!("data:image/png;charset=binary;base64,{}\n", PNG_B64),
            "sentence",
        );
        assert_eq!(a.unwrap().filename, b.unwrap().filename);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(image_extension("jpeg"), "jpg");
        assert_eq!(image_extension("JPG"), "jpg");
        assert_eq!(image_extension("webp"), "webp");
        assert_eq!(image_extension("svg+xml"), "png");

        let asset = decode_image_data_url("data:image/jpeg;base64,/9j/4AAQ", "sentence").unwrap();
        assert!(asset.filename.ends_with(".jpg"));
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(
            decode_image_data_url("https://example.com/cat.png", "sentence"),
            Err(ImageDecodeError::NotDataUrl)
        );
        assert_eq!(
            decode_image_data_url("data:image/png,rawbytes", "sentence"),
            Err(ImageDecodeError::NotBase64)
        );
        assert!(matches!(
            decode_image_data_url("data:image/png;base64,***", "sentence"),
            Err(ImageDecodeError::Base64(_))
        ));
        assert_eq!(
            decode_image_data_url("data:image/png;base64,", "sentence"),
            Err(ImageDecodeError::Empty)
        );
    }

    #[test]
    fn test_content_hash_is_short_hex() {
        let hash = content_hash(b"abc");
        assert_eq!(hash, "ba7816bf");
    }

    #[test]
    fn test_tags() {
        assert_eq!(sound_tag("ねこ_1.mp3"), "[sound:ねこ_1.mp3]");
        assert_eq!(image_tag("sentence_ba7816bf.png"), r#"<img src="sentence_ba7816bf.png">"#);
    }

    #[test]
    fn test_audio_asset_filename() {
        let asset = AudioAsset::from_path(Path::new("/tmp/Audio/ねこ_1.mp3"));
        assert_eq!(asset.filename, "ねこ_1.mp3");
    }
}
