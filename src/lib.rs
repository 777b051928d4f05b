//! Thumbnail composer: lays out a title, scripture reference, date and author
//! over a background image and rasterizes the result to a 1280×720 bitmap.

pub mod engine;
pub mod rendering;
pub mod repl;
