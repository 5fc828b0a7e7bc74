use anyhow::Context;
use image::{imageops, RgbaImage};
use std::path::PathBuf;

/// Something a finished frame can be shown on.
pub trait Display {
    /// Width and height in pixels, as mounted.
    fn size(&self) -> (u32, u32);

    fn show(&mut self, frame: &RgbaImage) -> anyhow::Result<()>;
}

/// Writes every frame to a PNG file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngDisplay {
    width: u32,
    height: u32,
    path: PathBuf,
}

impl PngDisplay {
    pub fn new(width: u32, height: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            width,
            height,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Display for PngDisplay {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn show(&mut self, frame: &RgbaImage) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        frame
            .save_with_format(&self.path, image::ImageFormat::Png)
            .with_context(|| format!("writing frame to {}", self.path.display()))?;
        log::info!("Frame written to {}", self.path.display());
        Ok(())
    }
}

/// Turn `frame` clockwise by `degrees`, a multiple of 90.
pub fn rotate(frame: RgbaImage, degrees: u16) -> RgbaImage {
    match degrees % 360 {
        90 => imageops::rotate90(&frame),
        180 => imageops::rotate180(&frame),
        270 => imageops::rotate270(&frame),
        _ => frame,
    }
}
