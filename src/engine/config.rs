// Configuration for the thumbnail composer
// Geometry defaults are the fixed output contract; colors and paths are tunable

use image::Rgba;
use std::path::PathBuf;

/// Output surface configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Output width in pixels (default 1280)
    pub width: u32,

    /// Output height in pixels (default 720)
    pub height: u32,

    /// Row advance as a multiple of the font size (default 1.5)
    pub line_height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            line_height: 1.5,
        }
    }
}

/// Font discovery configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    /// Regular face; tried before the search list
    pub custom_font_path: Option<PathBuf>,

    /// Bold face; without one, bold text is emboldened from the regular face
    pub bold_font_path: Option<PathBuf>,

    /// Fallback locations for a regular face, tried in order
    pub search_paths: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        let search_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf",
            "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        Self {
            custom_font_path: None,
            bold_font_path: None,
            search_paths,
        }
    }
}

/// Colors shared by every layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Base fill behind everything (#1A1A1A)
    pub base_fill: Rgba<u8>,

    /// Text on dark backgrounds (white)
    pub text: Rgba<u8>,

    /// Light side panel (#E8E8E8)
    pub panel: Rgba<u8>,

    /// Text on the light panel (#1A1A1A)
    pub panel_text: Rgba<u8>,

    /// Panel grid lines (200,200,200 at 30%)
    pub grid: Rgba<u8>,

    /// Diagonal panel separator (#C0C0C0)
    pub separator: Rgba<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base_fill: Rgba([26, 26, 26, 255]),
            text: Rgba([255, 255, 255, 255]),
            panel: Rgba([232, 232, 232, 255]),
            panel_text: Rgba([26, 26, 26, 255]),
            grid: Rgba([200, 200, 200, alpha(0.3)]),
            separator: Rgba([192, 192, 192, 255]),
        }
    }
}

/// Export artifact configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// File name prefix (default "thumbnail")
    pub file_prefix: String,

    /// Directory exports are written to (default: working directory)
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "thumbnail".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Master configuration combining all composer settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub font: FontConfig,
    pub palette: Palette,
    pub export: ExportConfig,
}

/// Convert a 0.0..=1.0 opacity to an 8-bit alpha channel
pub fn alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Black at the given opacity
pub fn black(opacity: f32) -> Rgba<u8> {
    Rgba([0, 0, 0, alpha(opacity)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_defaults_match_output_contract() {
        let canvas = CanvasConfig::default();
        assert_eq!((canvas.width, canvas.height), (1280, 720));
        assert_eq!(canvas.line_height, 1.5);
    }

    #[test]
    fn test_alpha_conversion() {
        assert_eq!(alpha(0.0), 0);
        assert_eq!(alpha(1.0), 255);
        assert_eq!(alpha(0.5), 128);
        assert_eq!(alpha(2.0), 255);
        assert_eq!(black(1.0), Rgba([0, 0, 0, 255]));
        assert_eq!(black(0.5).0[..3], [0, 0, 0]);
    }

    #[test]
    fn test_font_config_has_search_paths() {
        let font = FontConfig::default();
        assert!(font.custom_font_path.is_none());
        assert!(!font.search_paths.is_empty());
    }

    #[test]
    fn test_export_defaults() {
        let export = ExportConfig::default();
        assert_eq!(export.file_prefix, "thumbnail");
    }
}
