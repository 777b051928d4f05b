//! Text engine: everything that decides what text goes where, independent
//! of any raster surface.

pub mod config;
pub mod error;
pub mod fit;
pub mod measure;
pub mod reference;
pub mod wrap;

pub use fit::solve_font_size;
pub use measure::{CachedMeasure, FontSpec, FontWeight, MeasureText};
pub use reference::{find_reference_spans, format_reference, is_range_reference, ScriptureReference};
pub use wrap::{tokenize, wrap_text, wrapped_height, Token, TokenKind};
