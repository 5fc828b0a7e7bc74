//! Generated images kept for later showings.
//!
//! Every image is saved as `<prefix><prompt>.<format>` next to a JSON sidecar
//! of the same name holding what it was generated from. Names that are taken
//! get a `_1`, `_2`, … suffix.

use anyhow::Context;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const FILE_PREFIX: &str = "ink-easel - ";

const MAX_NAME_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub prompt: String,
    pub title: String,
    pub artist: String,
    pub provider: String,
}

/// File name for an image generated from `prompt`.
pub fn file_name(prompt: &str, format: &str) -> String {
    let prompt: String = prompt
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_NAME_LEN)
        .collect();
    format!("{FILE_PREFIX}{}.{format}", prompt.trim())
}

/// `path` if it is free, otherwise the first free `<stem>_<n>.<ext>`.
pub fn version_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_owned();
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|n| path.with_file_name(format!("{stem}_{n}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_owned())
}

pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension("json")
}

/// Save `image` into `folder` with its sidecar, returning the image's path.
///
/// A taken name gives the new image a `_N` suffix; existing files are never
/// renamed.
pub fn save(
    folder: &Path,
    image: &DynamicImage,
    format: &str,
    metadata: &Metadata,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(folder).with_context(|| format!("creating {}", folder.display()))?;
    let path = version_path(&folder.join(file_name(&metadata.prompt, format)));
    // JPEG has no alpha channel.
    image
        .to_rgb8()
        .save(&path)
        .with_context(|| format!("saving {}", path.display()))?;
    fs::write(sidecar_path(&path), serde_json::to_string_pretty(metadata)?)?;
    log::info!("Saved image to {}", path.display());
    Ok(path)
}

/// Metadata saved next to `image`, if there is any.
pub fn load(image: &Path) -> Option<Metadata> {
    let sidecar = sidecar_path(image);
    let text = fs::read_to_string(&sidecar).ok()?;
    match serde_json::from_str(&text) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            log::warn!("Ignoring {}: {}", sidecar.display(), e);
            None
        }
    }
}
