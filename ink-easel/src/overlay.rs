//! Caption and status icon drawn over a finished frame.

use crate::config::{IconConfig, TextConfig};
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10, FONT_7X13, FONT_9X15, FONT_9X18},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use frame_geometry::{max_area, Rect};
use image::{Rgba, RgbaImage};
use imageproc::{
    drawing::{
        draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut,
        draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut, Blend,
    },
    point::Point as Vertex,
    rect::Rect as PixelRect,
};
use serde::Deserialize;
use std::convert::Infallible;

/// Smallest first.
const FONTS: [&MonoFont<'static>; 5] = [&FONT_6X10, &FONT_7X13, &FONT_9X15, &FONT_9X18, &FONT_10X20];

/// How a frame came to be, shown as the status icon's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Generated,
    Historic,
    External,
    /// Test image shown because nothing else worked out.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Square,
    Cross,
    Triangle,
    Circle,
}

impl Status {
    pub fn shape(self) -> Shape {
        match self {
            Status::Generated => Shape::Square,
            Status::Historic => Shape::Circle,
            Status::External => Shape::Triangle,
            Status::Fallback => Shape::Cross,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// `embedded-graphics` view of an image. Pixels outside of it are dropped.
struct Canvas<'a>(&'a mut RgbaImage);

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                if x < self.0.width() && y < self.0.height() {
                    self.0
                        .put_pixel(x, y, Rgba([color.r(), color.g(), color.b(), u8::MAX]));
                }
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

/// Largest font no taller than `size` pixels.
fn font(size: u32) -> &'static MonoFont<'static> {
    FONTS
        .iter()
        .rev()
        .find(|font| font.character_size.height <= size)
        .copied()
        .unwrap_or(FONTS[0])
}

fn edges(rectangle: Rectangle) -> Rect<i32> {
    let Point { x, y } = rectangle.top_left;
    Rect::new(
        x,
        y,
        x + rectangle.size.width as i32,
        y + rectangle.size.height as i32,
    )
}

/// Run `draw` on `frame` with colours alpha-blended onto it.
fn blended(frame: &mut RgbaImage, draw: impl FnOnce(&mut Blend<RgbaImage>)) {
    let mut canvas = Blend(std::mem::take(frame));
    draw(&mut canvas);
    *frame = canvas.0;
}

/// Fill the part of `area` that lies on `frame`.
fn fill(frame: &mut RgbaImage, area: Rect<i32>, color: Rgba<u8>) {
    let left = area.left.max(0);
    let top = area.top.max(0);
    let right = area.right.min(frame.width() as i32);
    let bottom = area.bottom.min(frame.height() as i32);
    if right <= left || bottom <= top {
        return;
    }
    let rect = PixelRect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32);
    blended(frame, |canvas| draw_filled_rect_mut(canvas, rect, color));
}

/// Draw `title` above `artist`, centred near the bottom edge on a
/// translucent white box.
pub fn draw_caption(frame: &mut RgbaImage, title: &str, artist: &str, config: &TextConfig) {
    let (width, height) = frame.dimensions();
    let style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Bottom)
        .build();
    let lines: Vec<_> = [
        (title, config.title_loc, config.title_size),
        (artist, config.artist_loc, config.artist_size),
    ]
    .into_iter()
    .filter(|(text, ..)| !text.is_empty())
    .map(|(text, loc, size)| {
        Text::with_text_style(
            text,
            Point::new((width / 2) as i32, height as i32 - loc as i32),
            MonoTextStyle::new(font(size), Rgb888::BLACK),
            style,
        )
    })
    .collect();
    let boxes: Vec<_> = lines.iter().map(|line| edges(line.bounding_box())).collect();
    let Some(area) = max_area(&boxes) else {
        return;
    };

    let mut area = area.pad(config.padding as i32);
    if config.box_to_floor {
        area = area.set_bottom(height as i32);
    }
    if config.box_to_edge {
        area = area.set_sides(0, width as i32);
    }
    fill(frame, area, Rgba([255, 255, 255, config.opacity]));

    let mut canvas = Canvas(frame);
    for line in &lines {
        line.draw(&mut canvas).unwrap_or_else(|never| match never {});
    }
}

/// Draw `shape` in the configured corner.
pub fn draw_status_icon(frame: &mut RgbaImage, shape: Shape, config: &IconConfig) {
    let (width, height) = frame.dimensions();
    let size = config.icon_size;
    if size == 0 {
        return;
    }
    let far = |extent: u32| extent.saturating_sub(config.icon_padding + size);
    let (x, y) = match config.icon_corner {
        Corner::TopLeft => (config.icon_padding, config.icon_padding),
        Corner::TopRight => (far(width), config.icon_padding),
        Corner::BottomLeft => (config.icon_padding, far(height)),
        Corner::BottomRight => (far(width), far(height)),
    };
    let (x, y, s) = (x as i32, y as i32, size as i32);
    let line_width = config.icon_width as i32;
    let black = Rgba([0, 0, 0, config.icon_opacity]);
    let white = Rgba([255, 255, 255, config.icon_opacity]);
    log::debug!("Drawing {:?} status icon at ({}, {})", shape, x, y);

    blended(frame, |canvas| match shape {
        Shape::Square => {
            draw_filled_rect_mut(canvas, PixelRect::at(x, y).of_size(size, size), black);
            for i in 0..line_width.min(s / 2) {
                let side = (s - 2 * i) as u32;
                draw_hollow_rect_mut(canvas, PixelRect::at(x + i, y + i).of_size(side, side), white);
            }
        }
        Shape::Cross => {
            draw_filled_rect_mut(canvas, PixelRect::at(x, y).of_size(size, size), black);
            let (left, top) = (x as f32, y as f32);
            let (right, bottom) = ((x + s - 1) as f32, (y + s - 1) as f32);
            for offset in thickness(line_width) {
                draw_line_segment_mut(canvas, (left + offset, top), (right + offset, bottom), white);
                draw_line_segment_mut(canvas, (right + offset, top), (left + offset, bottom), white);
            }
        }
        Shape::Triangle => {
            let corners = [
                Vertex::new(x + s / 2, y),
                Vertex::new(x + s - 1, y + s - 1),
                Vertex::new(x, y + s - 1),
            ];
            draw_polygon_mut(canvas, &corners, black);
            for (i, from) in corners.iter().enumerate() {
                let to = corners[(i + 1) % corners.len()];
                draw_line_segment_mut(
                    canvas,
                    (from.x as f32, from.y as f32),
                    (to.x as f32, to.y as f32),
                    white,
                );
            }
        }
        Shape::Circle => {
            let center = (x + s / 2, y + s / 2);
            let radius = s / 2;
            draw_filled_circle_mut(canvas, center, radius, black);
            for r in (radius - line_width + 1).max(1)..=radius {
                draw_hollow_circle_mut(canvas, center, r, white);
            }
        }
    });
}

/// Horizontal offsets that widen a one pixel line to `width` pixels.
fn thickness(width: i32) -> impl Iterator<Item = f32> {
    let width = width.max(1);
    (0..width).map(move |i| (i - width / 2) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn font_sizes() {
        assert_eq!(font(20).character_size.height, 20);
        assert_eq!(font(14).character_size.height, 13);
        assert_eq!(font(4).character_size.height, 10);
    }

    #[test]
    fn caption_box() {
        let mut frame = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        draw_caption(&mut frame, "Title", "Artist", &TextConfig::default());
        // Box reaches the floor and both edges but not the top.
        assert!(frame.get_pixel(0, 99)[0] > 100);
        assert!(frame.get_pixel(199, 99)[0] > 100);
        assert_eq!(*frame.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        // Some of the text is black on the box.
        assert!((0..200)
            .flat_map(|x| (40..100).map(move |y| (x, y)))
            .any(|(x, y)| *frame.get_pixel(x, y) == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn caption_box_hugs_text() {
        let mut frame = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        let config = TextConfig {
            box_to_floor: false,
            box_to_edge: false,
            ..Default::default()
        };
        draw_caption(&mut frame, "Title", "", &config);
        assert_eq!(*frame.get_pixel(0, 99), Rgba([0, 0, 0, 255]));
        assert_eq!(*frame.get_pixel(100, 90), Rgba([0, 0, 0, 255]));
        // Padding left of the text.
        assert!(frame.get_pixel(70, 60)[0] > 100);
    }

    #[test]
    fn empty_caption() {
        let mut frame = RgbaImage::from_pixel(20, 20, RED);
        draw_caption(&mut frame, "", "", &TextConfig::default());
        assert!(frame.pixels().all(|p| *p == RED));
    }

    #[test]
    fn icons() {
        for (status, corner, inside, outside) in [
            (Status::Generated, Corner::TopLeft, (20, 20), (80, 80)),
            (Status::Historic, Corner::BottomRight, (80, 80), (20, 20)),
            (Status::External, Corner::TopRight, (80, 25), (20, 25)),
            (Status::Fallback, Corner::BottomLeft, (20, 80), (80, 20)),
        ] {
            let mut frame = RgbaImage::from_pixel(100, 100, RED);
            let config = IconConfig {
                icon_corner: corner,
                ..Default::default()
            };
            draw_status_icon(&mut frame, status.shape(), &config);
            assert_ne!(*frame.get_pixel(inside.0, inside.1), RED, "{status:?}");
            assert_eq!(*frame.get_pixel(outside.0, outside.1), RED, "{status:?}");
        }
    }
}
