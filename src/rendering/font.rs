//! Typefaces: width measurement and glyph painting for one font family
//!
//! `OutlineFace` renders real glyph outlines through `ab_glyph`. `BlockFace`
//! paints every character as a filled cell with a fixed advance; it needs no
//! font file and is fully deterministic.

use crate::engine::config::FontConfig;
use crate::engine::error::{Result, ThumbnailError};
use crate::engine::measure::{FontSpec, FontWeight, MeasureText};
use super::canvas::source_over;
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;
use std::sync::Arc;

/// A single font family at any size and weight.
///
/// `draw_text` takes the top of the em box as `y` and the left edge of the
/// text as `x`. Widths reported by `measure_width` match what `draw_text`
/// covers horizontally.
pub trait Typeface: Send + Sync {
    fn name(&self) -> &str;

    fn measure_width(&self, text: &str, font: FontSpec) -> f32;

    fn draw_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: f32,
        y: f32,
        font: FontSpec,
        color: Rgba<u8>,
    );
}

/// Adapter exposing a shared typeface to the wrapper and solver
#[derive(Clone)]
pub struct TypefaceMeasure(Arc<dyn Typeface>);

impl TypefaceMeasure {
    pub fn new(face: Arc<dyn Typeface>) -> Self {
        Self(face)
    }

    pub fn face(&self) -> &dyn Typeface {
        self.0.as_ref()
    }
}

impl MeasureText for TypefaceMeasure {
    fn measure_width(&self, text: &str, font: FontSpec) -> f32 {
        self.0.measure_width(text, font)
    }
}

/// Outline font face with an optional dedicated bold face
pub struct OutlineFace {
    name: String,
    regular: FontVec,
    bold: Option<FontVec>,
}

impl OutlineFace {
    pub fn new(name: impl Into<String>, regular: FontVec, bold: Option<FontVec>) -> Self {
        Self {
            name: name.into(),
            regular,
            bold,
        }
    }

    pub fn has_bold_face(&self) -> bool {
        self.bold.is_some()
    }

    /// Face to use for a weight, and whether it must be emboldened
    fn face_for(&self, weight: FontWeight) -> (&FontVec, bool) {
        match (weight, &self.bold) {
            (FontWeight::Bold, Some(bold)) => (bold, false),
            (FontWeight::Bold, None) => (&self.regular, true),
            (FontWeight::Normal, _) => (&self.regular, false),
        }
    }
}

/// Scale at which one em equals `size` pixels
fn em_scale(font: &FontVec, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

/// Horizontal offset of the second pass used to embolden a regular face
fn faux_bold_offset(size: f32) -> f32 {
    (size / 24.0).round().max(1.0)
}

pub fn calculate_string_width(font: &FontVec, text: &str, font_size: f32) -> f32 {
    let scaled = font.as_scaled(em_scale(font, font_size));
    let mut width = 0.0f32;
    let mut previous: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            width += scaled.kern(previous, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }

    width
}

impl Typeface for OutlineFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn measure_width(&self, text: &str, font: FontSpec) -> f32 {
        let (face, faux_bold) = self.face_for(font.weight);
        let width = calculate_string_width(face, text, font.size);
        if faux_bold && !text.is_empty() {
            width + faux_bold_offset(font.size)
        } else {
            width
        }
    }

    fn draw_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: f32,
        y: f32,
        font: FontSpec,
        color: Rgba<u8>,
    ) {
        let (face, faux_bold) = self.face_for(font.weight);
        let scale = em_scale(face, font.size);
        let (x, y) = (x.round() as i32, y.round() as i32);

        paint_glyphs(image, face, scale, x, y, text, color);
        if faux_bold {
            let offset = faux_bold_offset(font.size) as i32;
            paint_glyphs(image, face, scale, x + offset, y, text, color);
        }
    }
}

/// Rasterize `text` with its em box top-left at (`x`, `y`), compositing
/// glyph coverage over the existing pixels
fn paint_glyphs(image: &mut RgbaImage, face: &FontVec, scale: PxScale, x: i32, y: i32, text: &str, color: Rgba<u8>) {
    let scaled = face.as_scaled(scale);
    let (width, height) = (image.width() as i32, image.height() as i32);
    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);

        let Some(outlined) = face.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = x + bounds.min.x as i32 + gx as i32;
            let py = y + bounds.min.y as i32 + gy as i32;
            if px < 0 || py < 0 || px >= width || py >= height {
                return;
            }
            let alpha = (color.0[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
            let pixel = image.get_pixel_mut(px as u32, py as u32);
            *pixel = source_over(*pixel, Rgba([color.0[0], color.0[1], color.0[2], alpha]));
        });
    }
}

/// Glyph-free face: each character is a fixed-advance cell, painted as a
/// filled block unless it is whitespace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFace {
    /// Advance per character as a fraction of the font size
    pub advance: f32,
    /// Extra advance fraction for bold text
    pub bold_extra: f32,
}

impl Default for BlockFace {
    fn default() -> Self {
        Self {
            advance: 0.55,
            bold_extra: 0.05,
        }
    }
}

impl BlockFace {
    fn char_advance(&self, font: FontSpec) -> f32 {
        let ratio = match font.weight {
            FontWeight::Normal => self.advance,
            FontWeight::Bold => self.advance + self.bold_extra,
        };
        font.size * ratio
    }
}

impl Typeface for BlockFace {
    fn name(&self) -> &str {
        "block"
    }

    fn measure_width(&self, text: &str, font: FontSpec) -> f32 {
        text.chars().count() as f32 * self.char_advance(font)
    }

    fn draw_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: f32,
        y: f32,
        font: FontSpec,
        color: Rgba<u8>,
    ) {
        let advance = self.char_advance(font);
        let cell_width = ((advance * 0.8).round() as u32).max(1);
        let cell_height = ((font.size * 0.7).round() as u32).max(1);

        for (index, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = x + index as f32 * advance + advance * 0.1;
            let top = y + font.size * 0.2;
            let rect = Rect::at(left.round() as i32, top.round() as i32).of_size(cell_width, cell_height);
            draw_filled_rect_mut(image, rect, color);
        }
    }
}

pub fn load_font_from_path<P: AsRef<Path>>(path: P) -> Option<FontVec> {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(bytes) => match FontVec::try_from_vec(bytes) {
            Ok(font) => Some(font),
            Err(err) => {
                log::warn!("{} is not a usable font: {}", path.display(), err);
                None
            }
        },
        Err(err) => {
            log::debug!("font {} not readable: {}", path.display(), err);
            None
        }
    }
}

/// Resolve the configured font family: the custom path first, then the
/// search list. Fails only when no regular face can be loaded.
pub fn get_typeface_with_config(config: &FontConfig) -> Result<OutlineFace> {
    let candidates: Vec<&Path> = config
        .custom_font_path
        .iter()
        .chain(config.search_paths.iter())
        .map(|p| p.as_path())
        .collect();

    let (path, regular) = candidates
        .iter()
        .find_map(|path| load_font_from_path(path).map(|font| (*path, font)))
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            ThumbnailError::FontUnavailable(tried.join(", "))
        })?;

    let bold = config.bold_font_path.as_ref().and_then(load_font_from_path);
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    log::info!(
        "using font {} ({})",
        name,
        if bold.is_some() { "with bold face" } else { "faux bold" }
    );
    Ok(OutlineFace::new(name, regular, bold))
}

/// Load a font file that must exist, reporting why it could not be used
pub fn load_required_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let bytes = std::fs::read(path.as_ref())?;
    FontVec::try_from_vec(bytes)
        .map_err(|err| ThumbnailError::InvalidFont(format!("{}: {}", path.as_ref().display(), err)))
}
