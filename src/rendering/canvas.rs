//! Raster surface for one composition
//!
//! Every operation receives its style (color, alignment, font) as an
//! argument. The canvas keeps no current fill, font, or alignment between
//! calls.

use super::font::Typeface;
use crate::engine::measure::FontSpec;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

/// Horizontal anchoring of a text run relative to its x coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Axis-aligned pixel rectangle with float geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Area {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Pixel rows/columns covered, clipped to a `width` × `height` surface
    fn clipped(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x.round().max(0.0) as u32;
        let y0 = self.y.round().max(0.0) as u32;
        let x1 = ((self.x + self.width).round().max(0.0) as u32).min(width);
        let y1 = ((self.y + self.height).round().max(0.0) as u32).min(height);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }
}

/// Direction a linear gradient runs in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientAxis {
    /// Top to bottom between `start` and `end` y coordinates
    Vertical { start: f32, end: f32 },
    /// Left to right between `start` and `end` x coordinates
    Horizontal { start: f32, end: f32 },
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A fresh surface filled with `background`
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        let pixel = self.image.get_pixel_mut(x, y);
        *pixel = source_over(*pixel, color);
    }

    /// Composite `color` (alpha respected) over `area`
    pub fn fill_rect(&mut self, area: Area, color: Rgba<u8>) {
        let Some((x0, y0, x1, y1)) = area.clipped(self.width(), self.height()) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Composite a two-stop linear gradient over `area`. Positions before
    /// the axis start take `from`, positions after its end take `to`.
    pub fn fill_gradient(&mut self, area: Area, axis: GradientAxis, from: Rgba<u8>, to: Rgba<u8>) {
        let Some((x0, y0, x1, y1)) = area.clipped(self.width(), self.height()) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let (position, start, end) = match axis {
                    GradientAxis::Vertical { start, end } => (y as f32 + 0.5, start, end),
                    GradientAxis::Horizontal { start, end } => (x as f32 + 0.5, start, end),
                };
                let t = if end > start {
                    ((position - start) / (end - start)).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                self.blend_pixel(x, y, lerp_color(from, to, t));
            }
        }
    }

    /// Fill a closed polygon with an opaque color
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba<u8>) {
        let mut vertices: Vec<Point<i32>> = points
            .iter()
            .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        vertices.dedup();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return;
        }
        draw_polygon_mut(&mut self.image, &vertices, color);
    }

    /// Opaque straight line `thickness` pixels wide, widened to the right
    pub fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: u32, color: Rgba<u8>) {
        for offset in 0..thickness.max(1) {
            let dx = offset as f32;
            draw_line_segment_mut(&mut self.image, (from.0 + dx, from.1), (to.0 + dx, to.1), color);
        }
    }

    /// Composite a one pixel wide vertical line
    pub fn vertical_rule(&mut self, x: f32, top: f32, bottom: f32, color: Rgba<u8>) {
        self.fill_rect(Area::new(x, top, 1.0, bottom - top), color);
    }

    /// Composite a one pixel tall horizontal line
    pub fn horizontal_rule(&mut self, y: f32, left: f32, right: f32, color: Rgba<u8>) {
        self.fill_rect(Area::new(left, y, right - left, 1.0), color);
    }

    /// Stretch `source` to exactly cover `area` and composite it
    pub fn draw_image(&mut self, source: &DynamicImage, area: Area) {
        let width = area.width.round().max(1.0) as u32;
        let height = area.height.round().max(1.0) as u32;
        let scaled = imageops::resize(&source.to_rgba8(), width, height, FilterType::Triangle);
        let left = area.x.round() as i64;
        let top = area.y.round() as i64;

        for (sx, sy, pixel) in scaled.enumerate_pixels() {
            let x = left + sx as i64;
            let y = top + sy as i64;
            if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
                continue;
            }
            self.blend_pixel(x as u32, y as u32, *pixel);
        }
    }

    /// Draw one run of text. `x` is the left edge, center, or right edge of
    /// the run depending on `align`; `y` is the top of the em box.
    pub fn draw_text(
        &mut self,
        face: &dyn Typeface,
        text: &str,
        x: f32,
        y: f32,
        align: TextAlign,
        font: FontSpec,
        color: Rgba<u8>,
    ) {
        if text.is_empty() {
            return;
        }
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - face.measure_width(text, font) / 2.0,
            TextAlign::Right => x - face.measure_width(text, font),
        };
        face.draw_text(&mut self.image, text, left, y, font, color);
    }
}

/// Porter-Duff source-over in 8-bit integer math. An opaque destination
/// stays exactly opaque.
pub(crate) fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3] as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da = dst.0[3] as u32;
    // output alpha scaled by 255
    let out_alpha = sa * 255 + da * (255 - sa);
    if out_alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut channels = [0u8; 4];
    for (index, channel) in channels.iter_mut().take(3).enumerate() {
        let weighted = src.0[index] as u32 * sa * 255 + dst.0[index] as u32 * da * (255 - sa);
        *channel = ((weighted + out_alpha / 2) / out_alpha) as u8;
    }
    channels[3] = ((out_alpha + 127) / 255) as u8;
    Rgba(channels)
}

fn lerp_color(from: Rgba<u8>, to: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mut channels = [0u8; 4];
    for (index, channel) in channels.iter_mut().enumerate() {
        let a = from.0[index] as f32;
        let b = to.0[index] as f32;
        *channel = (a + (b - a) * t).round() as u8;
    }
    Rgba(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::font::BlockFace;

    const DARK: Rgba<u8> = Rgba([26, 26, 26, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_new_canvas_is_filled() {
        let canvas = Canvas::new(4, 3, DARK);
        assert_eq!(canvas.width(), 4);
        assert_eq!(canvas.height(), 3);
        assert!(canvas.image().pixels().all(|p| *p == DARK));
    }

    #[test]
    fn test_fill_rect_blends_alpha() {
        let mut canvas = Canvas::new(10, 10, WHITE);
        canvas.fill_rect(Area::new(0.0, 0.0, 5.0, 10.0), Rgba([0, 0, 0, 128]));
        let shaded = canvas.image().get_pixel(2, 2);
        assert!(shaded.0[0] > 100 && shaded.0[0] < 150, "got {:?}", shaded);
        assert_eq!(shaded.0[3], 255);
        assert_eq!(*canvas.image().get_pixel(7, 2), WHITE);
    }

    #[test]
    fn test_fill_rect_outside_is_ignored() {
        let mut canvas = Canvas::new(10, 10, WHITE);
        canvas.fill_rect(Area::new(20.0, 20.0, 5.0, 5.0), DARK);
        canvas.fill_rect(Area::new(-10.0, -10.0, 5.0, 5.0), DARK);
        assert!(canvas.image().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_vertical_gradient_darkens_downwards() {
        let mut canvas = Canvas::new(4, 100, WHITE);
        canvas.fill_gradient(
            Area::new(0.0, 0.0, 4.0, 100.0),
            GradientAxis::Vertical { start: 0.0, end: 100.0 },
            Rgba([0, 0, 0, 77]),
            Rgba([0, 0, 0, 204]),
        );
        let top = canvas.image().get_pixel(0, 0).0[0];
        let bottom = canvas.image().get_pixel(0, 99).0[0];
        assert!(top > bottom, "top {} should be lighter than bottom {}", top, bottom);
    }

    #[test]
    fn test_horizontal_gradient_clamps_after_end() {
        let mut canvas = Canvas::new(100, 2, WHITE);
        canvas.fill_gradient(
            Area::new(0.0, 0.0, 100.0, 2.0),
            GradientAxis::Horizontal { start: 0.0, end: 10.0 },
            Rgba([0, 0, 0, 0]),
            Rgba([0, 0, 0, 128]),
        );
        assert_eq!(canvas.image().get_pixel(50, 0), canvas.image().get_pixel(99, 0));
        assert!(canvas.image().get_pixel(0, 0).0[0] > canvas.image().get_pixel(50, 0).0[0]);
    }

    #[test]
    fn test_fill_polygon_covers_interior() {
        let mut canvas = Canvas::new(20, 20, DARK);
        canvas.fill_polygon(&[(2.0, 2.0), (18.0, 2.0), (18.0, 18.0), (2.0, 18.0)], WHITE);
        assert_eq!(*canvas.image().get_pixel(10, 10), WHITE);
        assert_eq!(*canvas.image().get_pixel(0, 0), DARK);
    }

    #[test]
    fn test_degenerate_polygon_is_ignored() {
        let mut canvas = Canvas::new(5, 5, DARK);
        canvas.fill_polygon(&[(1.0, 1.0), (1.0, 1.0)], WHITE);
        assert!(canvas.image().pixels().all(|p| *p == DARK));
    }

    #[test]
    fn test_draw_image_stretches() {
        let mut canvas = Canvas::new(8, 8, DARK);
        let red = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        canvas.draw_image(&red, Area::new(0.0, 0.0, 4.0, 8.0));
        assert_eq!(*canvas.image().get_pixel(3, 7), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.image().get_pixel(5, 7), DARK);
    }

    #[test]
    fn test_right_aligned_text_ends_at_x() {
        let face = BlockFace::default();
        let mut canvas = Canvas::new(200, 40, DARK);
        let font = FontSpec::normal(20.0);
        canvas.draw_text(&face, "ab", 100.0, 0.0, TextAlign::Right, font, WHITE);

        // "ab" is 22px wide: cells start at 79 and 90
        assert_eq!(*canvas.image().get_pixel(82, 10), WHITE);
        assert_eq!(*canvas.image().get_pixel(105, 10), DARK);
    }

    #[test]
    fn test_translucent_fill_keeps_opaque_canvas_opaque() {
        for alpha in [1u8, 77, 128, 140, 179, 204, 254] {
            let mut canvas = Canvas::new(2, 2, DARK);
            canvas.fill_rect(Area::new(0.0, 0.0, 2.0, 2.0), Rgba([0, 0, 0, alpha]));
            assert_eq!(canvas.image().get_pixel(0, 0).0[3], 255, "alpha {} leaked through", alpha);
        }
    }

    #[test]
    fn test_source_over_values() {
        // black at 50% over #1A1A1A
        assert_eq!(source_over(DARK, Rgba([0, 0, 0, 128])), Rgba([13, 13, 13, 255]));
        assert_eq!(source_over(DARK, Rgba([9, 9, 9, 0])), DARK);
        assert_eq!(source_over(Rgba([0, 0, 0, 0]), Rgba([200, 100, 50, 128])), Rgba([200, 100, 50, 128]));
    }

    #[test]
    fn test_draw_image_respects_source_alpha() {
        let mut canvas = Canvas::new(4, 4, WHITE);
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        canvas.draw_image(&clear, Area::new(-1.0, -1.0, 4.0, 4.0));
        assert!(canvas.image().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_lerp_color_endpoints() {
        let from = Rgba([0, 0, 0, 0]);
        let to = Rgba([200, 100, 50, 255]);
        assert_eq!(lerp_color(from, to, 0.0), from);
        assert_eq!(lerp_color(from, to, 1.0), to);
    }
}
