//! Where frames come from on disk: prompt files, image folders and the text
//! hidden in image file names.

use anyhow::Context;
use rand::{seq::SliceRandom, Rng};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Extensions of the images picked up from folders.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Trimmed, non-blank lines of the file at `path`.
pub fn read_lines(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Copy `example` to `primary` unless `primary` already exists.
///
/// Having neither is not an error here; reading `primary` will fail later.
pub fn backup_file(primary: impl AsRef<Path>, example: impl AsRef<Path>) -> anyhow::Result<()> {
    let (primary, example) = (primary.as_ref(), example.as_ref());
    if primary.exists() {
        return Ok(());
    }
    if !example.exists() {
        log::warn!(
            "Unable to find file at {} or at backup path {}",
            primary.display(),
            example.display()
        );
        return Ok(());
    }
    log::info!(
        "{} does not exist. Copying {} to {}",
        primary.display(),
        example.display(),
        primary.display()
    );
    if let Some(parent) = primary.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(example, primary)
        .with_context(|| format!("copying {} to {}", example.display(), primary.display()))?;
    Ok(())
}

/// Lines of `primary`, set up from `example` first if needed.
pub fn lines_with_backup(
    primary: impl AsRef<Path>,
    example: impl AsRef<Path>,
) -> anyhow::Result<Vec<String>> {
    backup_file(&primary, example)?;
    read_lines(primary)
}

/// Images directly inside `folder`, sorted. A missing folder has none.
pub fn image_files(folder: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_image(path))
        .collect();
    files.sort();
    files
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

pub fn random_image<R: Rng + ?Sized>(folder: impl AsRef<Path>, rng: &mut R) -> Option<PathBuf> {
    let folder = folder.as_ref();
    let files = image_files(folder);
    if files.is_empty() {
        log::warn!("Unable to find any images in {}", folder.display());
    }
    files.choose(rng).cloned()
}

/// Pulls a title and an artist out of names like
/// `"ink-easel - A quiet harbour by Hokusai.png"`.
#[derive(Debug, Clone)]
pub struct TextParser {
    preamble: Regex,
    artist: Regex,
    remove: Option<Regex>,
}

impl TextParser {
    /// `preamble` matches what precedes the title, `artist` what separates
    /// the title from the artist. Every match of a `remove` pattern is
    /// dropped from both.
    pub fn new<S: AsRef<str>>(preamble: &str, artist: &str, remove: &[S]) -> Result<Self, regex::Error> {
        let remove = remove
            .iter()
            .map(AsRef::as_ref)
            .filter(|pattern| !pattern.is_empty())
            .collect::<Vec<_>>();
        let remove = if remove.is_empty() {
            None
        } else {
            Some(Regex::new(&remove.join("|"))?)
        };
        Ok(Self {
            preamble: Regex::new(&format!("^(?:{preamble})"))?,
            artist: Regex::new(artist)?,
            remove,
        })
    }

    /// `(title, artist)` of the file at `path`.
    ///
    /// A name that does not have both a preamble and an artist comes back
    /// whole as the title, with an empty artist.
    pub fn title_and_artist(&self, path: &Path) -> (String, String) {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let split = self.preamble.find(&stem).and_then(|preamble| {
            let rest = &stem[preamble.end()..];
            self.artist
                .find(rest)
                .map(|artist| (&rest[..artist.start()], &rest[artist.end()..]))
        });
        match split {
            Some((title, artist)) => (self.remove_text(title), self.remove_text(artist)),
            None => (self.remove_text(&stem), String::new()),
        }
    }

    pub fn remove_text(&self, text: &str) -> String {
        match &self.remove {
            Some(remove) => remove.replace_all(text, "").trim().to_owned(),
            None => text.trim().to_owned(),
        }
    }
}
