//! Glyph Commands
//!
//! Save, resolve, compose and export glyphs for this device's identity.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use glyph_pool_core::IMAGE_DATA_MARKER;
use tracing::debug;

use crate::models::response::{ExportResponse, ResolveEntry, SaveResponse, SaveTarget};
use crate::services::ComposedSentence;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Image payload given on the command line
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file, encoded into a data URL
    File(PathBuf),
    /// Ready-made `data:image/...` URL
    DataUrl(String),
}

fn mime_type_from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read an image file into a base64 data URL.
pub fn encode_image_file(path: &Path) -> AppResult<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mime = mime_type_from_extension(&ext)
        .ok_or_else(|| AppError::validation(format!("Unsupported image format: {:?}", ext)))?;

    let data = fs::read(path)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&data);
    Ok(format!("data:{};base64,{}", mime, b64))
}

/// Decode the bytes carried by a base64 image data URL.
pub fn decode_data_url(url: &str) -> AppResult<Vec<u8>> {
    if !url.starts_with(IMAGE_DATA_MARKER) {
        return Err(AppError::validation("not an image data URL"));
    }
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| AppError::validation("data URL has no payload"))?;
    if !header.ends_with(";base64") {
        return Err(AppError::validation("only base64 data URLs can be exported"));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::validation(format!("invalid base64 payload: {}", e)))
}

/// Save one glyph
pub async fn save_glyph(
    state: &AppState,
    character: &str,
    source: ImageSource,
) -> AppResult<SaveResponse> {
    let image = match source {
        ImageSource::File(path) => encode_image_file(&path)?,
        ImageSource::DataUrl(url) => url,
    };

    let target = if state.glyph_store().is_remote_available() {
        SaveTarget::Pool
    } else {
        SaveTarget::Local
    };
    let id = state.save(character, &image).await?;

    Ok(SaveResponse {
        character: character.to_string(),
        id,
        target,
    })
}

/// Resolve characters, reporting unresolved ones as "default"
pub async fn resolve_glyphs<S: AsRef<str>>(
    state: &AppState,
    characters: &[S],
) -> AppResult<Vec<ResolveEntry>> {
    let resolution = state.resolve(characters).await;

    let mut seen = std::collections::BTreeSet::new();
    let entries = characters
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| !c.is_empty() && seen.insert(*c))
        .map(|c| match resolution.get(c) {
            Some(resolved) => ResolveEntry {
                character: c.to_string(),
                source: resolved.provenance.to_string(),
                image: Some(resolved.image.clone()),
            },
            None => ResolveEntry {
                character: c.to_string(),
                source: "default".to_string(),
                image: None,
            },
        })
        .collect();

    Ok(entries)
}

/// Compose a sentence (the configured one when `sentence` is None)
pub async fn compose_sentence(
    state: &AppState,
    sentence: Option<&str>,
) -> AppResult<ComposedSentence> {
    Ok(state.compose(sentence).await)
}

/// Resolve one character and write its image bytes to `out`
pub async fn export_glyph(
    state: &AppState,
    character: &str,
    out: &Path,
) -> AppResult<ExportResponse> {
    let resolution = state.resolve(&[character]).await;
    let resolved = resolution.get(character).ok_or_else(|| {
        AppError::validation(format!("no glyph available for {:?}", character))
    })?;

    let bytes = decode_data_url(&resolved.image)?;
    fs::write(out, &bytes)?;
    debug!(character, path = %out.display(), bytes = bytes.len(), "glyph exported");

    Ok(ExportResponse {
        character: character.to_string(),
        source: resolved.provenance.to_string(),
        path: out.display().to_string(),
        bytes: bytes.len(),
    })
}
