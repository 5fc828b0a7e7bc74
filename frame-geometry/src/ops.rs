//! The sizing helpers applied to images.

use crate::{get_crop_size, max_tup, min_possible_tup, resize_tup_smaller};
use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Shrink `image` to fit within `width` × `height`, keeping its aspect ratio.
///
/// Images that already fit are returned as they are; nothing is enlarged.
pub fn thumbnail(image: &DynamicImage, (width, height): (u32, u32)) -> DynamicImage {
    if image.width() <= width && image.height() <= height {
        return image.clone();
    }
    image.thumbnail(width, height)
}

/// Shrink `image` to fit in a square as large as the larger side of `target`.
pub fn resize_image(image: &DynamicImage, target: (u32, u32)) -> DynamicImage {
    thumbnail(image, max_tup(target))
}

/// Shrink `image` as far as possible while still covering `target`.
pub fn fit_image(image: &DynamicImage, target: (u32, u32)) -> DynamicImage {
    thumbnail(image, min_possible_tup(target, image.dimensions()))
}

/// Centre `image` on a `width` × `height` canvas of `fill`.
///
/// Whatever sticks out of the canvas is cropped.
pub fn pad_to(image: &DynamicImage, (width, height): (u32, u32), fill: Rgba<u8>) -> RgbaImage {
    let crop = get_crop_size(image.width(), image.height(), width, height).round();
    let mut canvas = RgbaImage::from_pixel(width, height, fill);
    imageops::overlay(&mut canvas, &image.to_rgba8(), -crop.left, -crop.top);
    canvas
}

/// Fit `image` to exactly `target`, cropping the overhang and padding with
/// black where it falls short.
pub fn fit_to_display(image: &DynamicImage, target: (u32, u32)) -> RgbaImage {
    pad_to(&fit_image(image, target), target, BLACK)
}

/// Square `side` × `side` canvas with `image` in the middle and transparency
/// all around it, as sent to an image edit endpoint for outpainting.
pub fn infill_canvas(image: &DynamicImage, side: u32) -> RgbaImage {
    pad_to(image, (side, side), TRANSPARENT)
}

/// Shrink `image` by `percent` percent on both sides.
pub fn shrink_by_percent(image: &DynamicImage, percent: f64) -> DynamicImage {
    if percent <= 0.0 {
        return image.clone();
    }
    let [width, height] = resize_tup_smaller(
        [f64::from(image.width()), f64::from(image.height())],
        percent,
    );
    thumbnail(
        image,
        (width.round().max(1.0) as u32, height.round().max(1.0) as u32),
    )
}
