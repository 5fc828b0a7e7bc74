//! Size arithmetic for putting images of any shape on a fixed-size display.
//!
//! Everything at the crate root is a pure function on numbers; [`ops`]
//! applies them to actual images.

pub mod ops;

use num_traits::Num;

/// Box given by its edges, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect<T = f64> {
    pub left: T,
    pub top: T,
    pub right: T,
    pub bottom: T,
}

impl<T> Rect<T> {
    pub const fn new(left: T, top: T, right: T, bottom: T) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl<T: Copy> Rect<T> {
    pub fn set_bottom(self, bottom: T) -> Self {
        Self { bottom, ..self }
    }

    pub fn set_sides(self, left: T, right: T) -> Self {
        Self {
            left,
            right,
            ..self
        }
    }
}

impl<T: Copy + Num> Rect<T> {
    pub fn width(&self) -> T {
        self.right - self.left
    }

    pub fn height(&self) -> T {
        self.bottom - self.top
    }

    /// Grow the box by `amount` on every side.
    pub fn pad(self, amount: T) -> Self {
        Self::new(
            self.left - amount,
            self.top - amount,
            self.right + amount,
            self.bottom + amount,
        )
    }
}

impl Rect<f64> {
    pub fn round(&self) -> Rect<i64> {
        Rect::new(
            self.left.round() as i64,
            self.top.round() as i64,
            self.right.round() as i64,
            self.bottom.round() as i64,
        )
    }
}

impl<T> From<(T, T, T, T)> for Rect<T> {
    fn from((left, top, right, bottom): (T, T, T, T)) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl<T> From<Rect<T>> for (T, T, T, T) {
    fn from(rect: Rect<T>) -> Self {
        (rect.left, rect.top, rect.right, rect.bottom)
    }
}

/// Box that, cut out of an `original` sized image, leaves a `target` sized
/// image with the original content centred.
///
/// Negative `left`/`top` mean the original is smaller than the target along
/// that axis and has to be padded rather than cropped.
pub fn get_crop_size(
    original_width: u32,
    original_height: u32,
    target_width: u32,
    target_height: u32,
) -> Rect {
    let width_diff = (f64::from(target_width) - f64::from(original_width)) / 2.0;
    let height_diff = (f64::from(target_height) - f64::from(original_height)) / 2.0;
    Rect::new(
        -width_diff,
        -height_diff,
        f64::from(original_width) + width_diff,
        f64::from(original_height) + height_diff,
    )
}

/// Smallest multiple of `multiple` that is not below `number`.
///
/// A `multiple` of zero leaves `number` as is.
pub fn ceiling_multiple(number: u32, multiple: u32) -> u32 {
    if multiple == 0 {
        return number;
    }
    number.div_ceil(multiple) * multiple
}

/// Square as large as the larger side of `size`.
pub fn max_tup<T: Ord + Copy>((a, b): (T, T)) -> (T, T) {
    let side = a.max(b);
    (side, side)
}

/// Smallest size with the aspect ratio of `large` that still covers `target`.
///
/// `large` is scaled by whichever of its two side ratios to `target` is
/// smaller, so one side lands exactly on the target and the other overhangs.
/// Degenerate (zero) sizes are returned unchanged.
pub fn min_possible_tup(target: (u32, u32), large: (u32, u32)) -> (u32, u32) {
    let (width, height) = (u64::from(target.0), u64::from(target.1));
    let (large_width, large_height) = (u64::from(large.0), u64::from(large.1));
    if width == 0 || height == 0 || large_width == 0 || large_height == 0 {
        return large;
    }
    // Compare large_width / width against large_height / height without
    // leaving integers.
    let (w, h) = if large_width * height <= large_height * width {
        (width, (large_height * width).div_ceil(large_width))
    } else {
        ((large_width * height).div_ceil(large_height), height)
    };
    (saturate(w), saturate(h))
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// `number` reduced by `percent` percent.
pub fn resize_number_smaller(number: f64, percent: f64) -> f64 {
    number - number / 100.0 * percent
}

pub fn resize_tup_smaller<const N: usize>(values: [f64; N], percent: f64) -> [f64; N] {
    values.map(|value| resize_number_smaller(value, percent))
}

/// Smallest box containing every box of `rects`, `None` when empty.
pub fn max_area<T: Copy + PartialOrd>(rects: &[Rect<T>]) -> Option<Rect<T>> {
    let (first, rest) = rects.split_first()?;
    Some(rest.iter().fold(*first, |area, rect| {
        Rect::new(
            lesser(area.left, rect.left),
            lesser(area.top, rect.top),
            greater(area.right, rect.right),
            greater(area.bottom, rect.bottom),
        )
    }))
}

fn lesser<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

fn greater<T: PartialOrd>(a: T, b: T) -> T {
    if b > a {
        b
    } else {
        a
    }
}

/// Dimensions of a `width` × `height` area after rotating it by `degrees`.
pub fn rotate_dimensions(width: u32, height: u32, degrees: u16) -> (u32, u32) {
    if degrees % 180 == 90 {
        (height, width)
    } else {
        (width, height)
    }
}
