//! Layout compositor
//!
//! Each layout turns a [`RenderRequest`] into a [`DrawingPlan`]: a background
//! recipe plus positioned blocks of text lines. Planning is pure; it only
//! consults the measurer to size references and to center blocks.
//! [`paint_plan`] executes a plan on a [`Canvas`].

use super::canvas::{Area, Canvas, GradientAxis, TextAlign};
use super::font::Typeface;
use super::request::RenderRequest;
use crate::engine::config::{black, Palette};
use crate::engine::error::ThumbnailError;
use crate::engine::fit::solve_font_size;
use crate::engine::measure::{FontSpec, FontWeight, MeasureText};
use crate::engine::reference::format_reference;
use crate::engine::wrap::{wrap_text, wrapped_height};
use image::{DynamicImage, Rgba};
use std::fmt;
use std::str::FromStr;

/// Closed set of thumbnail layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutKind {
    /// Full-bleed image darkened by a vertical gradient, left-aligned text
    #[default]
    Overlay,
    /// Full-bleed image with a dark box in the top-right corner
    Minimal,
    /// Image on the left 60%, light gridded panel with text on the right
    SideModern,
    /// Full-bleed image under a uniform scrim, centered text
    Centered,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 4] = [
        LayoutKind::Overlay,
        LayoutKind::Minimal,
        LayoutKind::SideModern,
        LayoutKind::Centered,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Overlay => "overlay",
            LayoutKind::Minimal => "minimal",
            LayoutKind::SideModern => "side-modern",
            LayoutKind::Centered => "centered",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overlay" => Ok(LayoutKind::Overlay),
            "minimal" => Ok(LayoutKind::Minimal),
            "side-modern" | "side_modern" | "sidemodern" => Ok(LayoutKind::SideModern),
            "centered" | "center" => Ok(LayoutKind::Centered),
            other => Err(ThumbnailError::UnknownLayout(other.to_string())),
        }
    }
}

/// One logical text line before wrapping
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub text: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    /// Overrides the plan's default text color
    pub color: Option<Rgba<u8>>,
    /// Set on the formatted reference line
    pub atomic: bool,
}

impl LineSpec {
    pub fn new(text: impl Into<String>, font_size: f32, font_weight: FontWeight) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_weight,
            color: None,
            atomic: false,
        }
    }

    fn reference(text: String, font_size: f32, font_weight: FontWeight) -> Self {
        Self {
            atomic: true,
            ..Self::new(text, font_size, font_weight)
        }
    }

    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.font_size, self.font_weight)
    }
}

/// Lines stacked top to bottom inside a horizontal band
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub align: TextAlign,
    pub lines: Vec<LineSpec>,
}

impl TextBlock {
    /// Anchor passed to the canvas for this block's alignment
    fn anchor_x(&self) -> f32 {
        match self.align {
            TextAlign::Left => self.x,
            TextAlign::Center => self.x + self.width / 2.0,
            TextAlign::Right => self.x + self.width,
        }
    }
}

/// Geometry of the split panel background
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPanel {
    /// Right edge of the image region
    pub split_x: f32,
    /// Width over which the image tint ramps up
    pub tint_span: f32,
    pub tint_from: Rgba<u8>,
    pub tint_to: Rgba<u8>,
    pub panel: Vec<(f32, f32)>,
    pub panel_color: Rgba<u8>,
    pub grid_spacing: f32,
    pub grid_color: Rgba<u8>,
    pub separator: ((f32, f32), (f32, f32)),
    pub separator_color: Rgba<u8>,
    pub separator_width: u32,
}

/// How the area behind the text is produced
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundPlan {
    /// Base fill only
    Fill,
    /// Full-bleed image under a top-to-bottom gradient
    ImageWithGradient { from: Rgba<u8>, to: Rgba<u8> },
    /// Full-bleed image with a translucent box
    ImageWithCornerBox { area: Area, color: Rgba<u8> },
    SplitPanel(SplitPanel),
    /// Full-bleed image under a uniform translucent layer
    ImageWithScrim { color: Rgba<u8> },
}

impl BackgroundPlan {
    pub fn uses_image(&self) -> bool {
        !matches!(self, BackgroundPlan::Fill)
    }
}

/// Complete recipe for one composition
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPlan {
    pub base_fill: Rgba<u8>,
    pub background: BackgroundPlan,
    /// Color for lines without their own
    pub text_color: Rgba<u8>,
    pub blocks: Vec<TextBlock>,
}

/// Output surface dimensions and row spacing shared by all layouts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
}

impl Frame {
    pub fn new(width: u32, height: u32, line_height: f32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            line_height,
        }
    }
}

/// Reference size choice: the base size, and the solver floor used when
/// the reference is a range
struct ReferenceSizing {
    with_title: f32,
    without_title: f32,
    range_floor: Option<(u32, u32)>,
    weight: FontWeight,
}

/// Field sizes and order for one layout
struct FieldSet {
    title: f32,
    reference: ReferenceSizing,
    date: Option<f32>,
    author: f32,
    date_before_author: bool,
}

const OVERLAY_FIELDS: FieldSet = FieldSet {
    title: 80.0,
    reference: ReferenceSizing {
        with_title: 56.0,
        without_title: 96.0,
        range_floor: None,
        weight: FontWeight::Bold,
    },
    date: Some(30.0),
    author: 30.0,
    date_before_author: true,
};

const MINIMAL_FIELDS: FieldSet = FieldSet {
    title: 48.0,
    reference: ReferenceSizing {
        with_title: 36.0,
        without_title: 56.0,
        range_floor: None,
        weight: FontWeight::Normal,
    },
    date: None,
    author: 32.0,
    date_before_author: true,
};

const SIDE_MODERN_FIELDS: FieldSet = FieldSet {
    title: 64.0,
    reference: ReferenceSizing {
        with_title: 56.0,
        without_title: 96.0,
        range_floor: Some((32, 48)),
        weight: FontWeight::Bold,
    },
    date: Some(36.0),
    author: 40.0,
    date_before_author: false,
};

const CENTERED_FIELDS: FieldSet = FieldSet {
    title: 72.0,
    reference: ReferenceSizing {
        with_title: 48.0,
        without_title: 88.0,
        range_floor: Some((32, 48)),
        weight: FontWeight::Bold,
    },
    date: Some(30.0),
    author: 30.0,
    date_before_author: true,
};

/// Build the logical lines of a layout in drawing order
fn field_lines<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    fields: &FieldSet,
    measure: &M,
    max_width: f32,
) -> Vec<LineSpec> {
    let title = request.title_text();
    let mut lines = Vec::new();

    if let Some(title) = title {
        lines.push(LineSpec::new(title, fields.title, FontWeight::Bold));
    }

    if let Some(reference) = &request.reference {
        let sizing = &fields.reference;
        let text = format_reference(reference);
        let base = if title.is_some() {
            sizing.with_title
        } else {
            sizing.without_title
        };
        let size = match sizing.range_floor {
            Some((floor_with_title, floor_without_title)) if reference.is_range() => {
                let floor = if title.is_some() {
                    floor_with_title
                } else {
                    floor_without_title
                };
                let solved = solve_font_size(measure, &text, max_width, base as u32, floor, sizing.weight);
                log::debug!("range reference {:?} sized {} (base {}, floor {})", text, solved, base, floor);
                solved as f32
            }
            _ => base,
        };
        lines.push(LineSpec::reference(text, size, sizing.weight));
    }

    let date = fields
        .date
        .and_then(|size| request.date_text().map(|date| LineSpec::new(date, size, FontWeight::Normal)));
    let author = request
        .author_text()
        .map(|author| LineSpec::new(author, fields.author, FontWeight::Normal));

    if fields.date_before_author {
        lines.extend(date);
        lines.extend(author);
    } else {
        lines.extend(author);
        lines.extend(date);
    }
    lines
}

/// Stacked height of every line once wrapped to `width`
pub fn block_height<M: MeasureText + ?Sized>(
    measure: &M,
    lines: &[LineSpec],
    width: f32,
    line_height: f32,
) -> f32 {
    lines
        .iter()
        .map(|line| wrapped_height(measure, &line.text, width, line.font_size, line.font_weight, line_height))
        .sum()
}

/// Build the drawing plan for `request`.
///
/// `has_image` reports whether a background bitmap is available; without
/// one every layout falls back to the text-only composition.
pub fn plan_layout<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    has_image: bool,
    frame: Frame,
    measure: &M,
    palette: &Palette,
) -> DrawingPlan {
    if !has_image {
        return plan_text_only(request, frame, measure, palette);
    }

    match request.layout {
        LayoutKind::Overlay => plan_overlay(request, frame, measure, palette),
        LayoutKind::Minimal => plan_minimal(request, frame, measure, palette),
        LayoutKind::SideModern => plan_side_modern(request, frame, measure, palette),
        LayoutKind::Centered => plan_centered(request, frame, measure, palette),
    }
}

/// Left-aligned band 80px in from both sides, fixed top with a title
fn overlay_block<M: MeasureText + ?Sized>(request: &RenderRequest, frame: Frame, measure: &M) -> TextBlock {
    let x = 80.0;
    let width = frame.width - 160.0;
    let lines = field_lines(request, &OVERLAY_FIELDS, measure, width);
    let y = if request.title_text().is_some() {
        120.0
    } else {
        (frame.height - block_height(measure, &lines, width, frame.line_height)) / 2.0
    };

    TextBlock {
        x,
        y,
        width,
        align: TextAlign::Left,
        lines,
    }
}

pub fn plan_text_only<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    frame: Frame,
    measure: &M,
    palette: &Palette,
) -> DrawingPlan {
    DrawingPlan {
        base_fill: palette.base_fill,
        background: BackgroundPlan::Fill,
        text_color: palette.text,
        blocks: vec![overlay_block(request, frame, measure)],
    }
}

fn plan_overlay<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    frame: Frame,
    measure: &M,
    palette: &Palette,
) -> DrawingPlan {
    DrawingPlan {
        base_fill: palette.base_fill,
        background: BackgroundPlan::ImageWithGradient {
            from: black(0.3),
            to: black(0.8),
        },
        text_color: palette.text,
        blocks: vec![overlay_block(request, frame, measure)],
    }
}

fn plan_minimal<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    frame: Frame,
    measure: &M,
    palette: &Palette,
) -> DrawingPlan {
    const BOX_WIDTH: f32 = 500.0;
    const BOX_HEIGHT: f32 = 200.0;
    const MARGIN: f32 = 40.0;

    let corner = Area::new(frame.width - BOX_WIDTH - MARGIN, MARGIN, BOX_WIDTH, BOX_HEIGHT);
    let x = frame.width - BOX_WIDTH - 20.0;
    let width = BOX_WIDTH - 40.0;
    let lines = field_lines(request, &MINIMAL_FIELDS, measure, width);
    let y = if request.title_text().is_some() {
        60.0
    } else {
        corner.y + (BOX_HEIGHT - block_height(measure, &lines, width, frame.line_height)) / 2.0
    };

    DrawingPlan {
        base_fill: palette.base_fill,
        background: BackgroundPlan::ImageWithCornerBox {
            area: corner,
            color: black(0.7),
        },
        text_color: palette.text,
        blocks: vec![TextBlock {
            x,
            y,
            width,
            align: TextAlign::Right,
            lines,
        }],
    }
}

fn plan_side_modern<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    frame: Frame,
    measure: &M,
    palette: &Palette,
) -> DrawingPlan {
    let split_x = frame.width * 0.6;
    let panel_width = frame.width - split_x;
    let foot_x = split_x + panel_width * 0.1;

    let background = SplitPanel {
        split_x,
        tint_span: split_x * 0.3,
        tint_from: black(0.1),
        tint_to: black(0.3),
        panel: vec![
            (split_x, 0.0),
            (frame.width, 0.0),
            (frame.width, frame.height),
            (foot_x, frame.height),
        ],
        panel_color: palette.panel,
        grid_spacing: 40.0,
        grid_color: palette.grid,
        separator: ((split_x, 0.0), (foot_x, frame.height)),
        separator_color: palette.separator,
        separator_width: 2,
    };

    // 60px padding on the left, 40px more on the right for the diagonal
    let x = split_x + 60.0;
    let width = panel_width - 100.0;
    let lines = field_lines(request, &SIDE_MODERN_FIELDS, measure, width);
    let y = if request.title_text().is_some() {
        100.0
    } else {
        (frame.height - block_height(measure, &lines, width, frame.line_height)) / 2.0
    };

    DrawingPlan {
        base_fill: palette.base_fill,
        background: BackgroundPlan::SplitPanel(background),
        text_color: palette.panel_text,
        blocks: vec![TextBlock {
            x,
            y,
            width,
            align: TextAlign::Left,
            lines,
        }],
    }
}

fn plan_centered<M: MeasureText + ?Sized>(
    request: &RenderRequest,
    frame: Frame,
    measure: &M,
    palette: &Palette,
) -> DrawingPlan {
    let x = 80.0;
    let width = frame.width - 160.0;
    let lines = field_lines(request, &CENTERED_FIELDS, measure, width);
    let y = (frame.height - block_height(measure, &lines, width, frame.line_height)) / 2.0;

    DrawingPlan {
        base_fill: palette.base_fill,
        background: BackgroundPlan::ImageWithScrim { color: black(0.55) },
        text_color: palette.text,
        blocks: vec![TextBlock {
            x,
            y,
            width,
            align: TextAlign::Center,
            lines,
        }],
    }
}

fn paint_background(canvas: &mut Canvas, background: &BackgroundPlan, image: Option<&DynamicImage>) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let full = Area::new(0.0, 0.0, width, height);

    match background {
        BackgroundPlan::Fill => {}
        BackgroundPlan::ImageWithGradient { from, to } => {
            if let Some(image) = image {
                canvas.draw_image(image, full);
            }
            canvas.fill_gradient(full, GradientAxis::Vertical { start: 0.0, end: height }, *from, *to);
        }
        BackgroundPlan::ImageWithCornerBox { area, color } => {
            if let Some(image) = image {
                canvas.draw_image(image, full);
            }
            canvas.fill_rect(*area, *color);
        }
        BackgroundPlan::SplitPanel(panel) => {
            let image_area = Area::new(0.0, 0.0, panel.split_x, height);
            if let Some(image) = image {
                canvas.draw_image(image, image_area);
            }
            canvas.fill_gradient(
                image_area,
                GradientAxis::Horizontal {
                    start: 0.0,
                    end: panel.tint_span,
                },
                panel.tint_from,
                panel.tint_to,
            );
            canvas.fill_polygon(&panel.panel, panel.panel_color);

            if panel.grid_spacing > 0.0 {
                let mut x = panel.split_x;
                while x < width {
                    canvas.vertical_rule(x, 0.0, height, panel.grid_color);
                    x += panel.grid_spacing;
                }
                let mut y = 0.0;
                while y < height {
                    canvas.horizontal_rule(y, panel.split_x, width, panel.grid_color);
                    y += panel.grid_spacing;
                }
            }

            let (from, to) = panel.separator;
            canvas.stroke_line(from, to, panel.separator_width, panel.separator_color);
        }
        BackgroundPlan::ImageWithScrim { color } => {
            if let Some(image) = image {
                canvas.draw_image(image, full);
            }
            canvas.fill_rect(full, *color);
        }
    }
}

/// Execute `plan` on `canvas`. The canvas is expected to hold the plan's
/// base fill already.
pub fn paint_plan<M: MeasureText + ?Sized>(
    canvas: &mut Canvas,
    plan: &DrawingPlan,
    image: Option<&DynamicImage>,
    face: &dyn Typeface,
    measure: &M,
    line_height: f32,
) {
    paint_background(canvas, &plan.background, image);

    for block in &plan.blocks {
        let anchor = block.anchor_x();
        let mut y = block.y;

        for line in &block.lines {
            let rows = wrap_text(measure, &line.text, block.width, line.font_size, line.font_weight);
            if line.atomic && rows.len() > 1 {
                log::debug!("reference {:?} wrapped onto {} rows", line.text, rows.len());
            }
            let color = line.color.unwrap_or(plan.text_color);

            for row in rows {
                canvas.draw_text(face, &row, anchor, y, block.align, line.font(), color);
                y += line.font_size * line_height;
            }
        }
    }
}
