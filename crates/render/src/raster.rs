//! Software rasterizer: paints a [`Scene`] into an RGBA bitmap.

use image::{Rgba, RgbaImage};

use crate::glyphs;
use crate::layout::{Align, Op, Rgb, Scene};

/// Paint a scene at the given integer oversampling factor.
///
/// The bitmap starts white; ops are painted in order. All scene
/// coordinates are in unscaled preview pixels.
pub fn rasterize(scene: &Scene, oversample: u32) -> RgbaImage {
    let s = oversample.max(1);
    let mut image = RgbaImage::from_pixel(
        scene.width * s,
        scene.height * s,
        Rgba([255, 255, 255, 255]),
    );

    for op in &scene.ops {
        match op {
            Op::Rect { x, y, w, h, color } => {
                fill_rect(&mut image, x * s, y * s, w * s, h * s, *color);
            }
            Op::Rule { x, y, w, color } => {
                // Rules keep a 1-scaled-pixel thickness so they stay hairlines.
                fill_rect(&mut image, x * s, y * s, w * s, s, *color);
            }
            Op::Text {
                x,
                y,
                scale,
                align,
                color,
                content,
            } => {
                let width = glyphs::text_width(content) * scale;
                let start_x = match align {
                    Align::Left => *x,
                    Align::Right => x.saturating_sub(width),
                };
                draw_text(&mut image, start_x * s, y * s, scale * s, *color, content);
            }
        }
    }

    image
}

fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
    let pixel = Rgba([color.0, color.1, color.2, 255]);
    let x_end = (x + w).min(image.width());
    let y_end = (y + h).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, pixel);
        }
    }
}

fn draw_text(image: &mut RgbaImage, x: u32, y: u32, scale: u32, color: Rgb, text: &str) {
    let mut pen_x = x;
    for c in text.chars() {
        let columns = glyphs::glyph(c);
        for (col, bits) in columns.iter().enumerate() {
            for row in 0..glyphs::GLYPH_HEIGHT {
                if bits >> row & 1 == 1 {
                    fill_rect(
                        image,
                        pen_x + col as u32 * scale,
                        y + row * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
        pen_x += glyphs::ADVANCE * scale;
    }
}
