//! Text measurement adapter
//!
//! Everything above this module (font-size solving, wrapping, layout) is a
//! deterministic function of the widths reported here. The font is passed
//! explicitly on every call; nothing assumes a previously set font.

use std::collections::HashMap;
use std::sync::RwLock;

/// Font weight used by the layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Size and weight of the fixed font family for one measurement or paint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Pixel size (em height)
    pub size: f32,
    pub weight: FontWeight,
}

impl FontSpec {
    pub fn new(size: f32, weight: FontWeight) -> Self {
        Self { size, weight }
    }

    pub fn normal(size: f32) -> Self {
        Self::new(size, FontWeight::Normal)
    }

    pub fn bold(size: f32) -> Self {
        Self::new(size, FontWeight::Bold)
    }
}

/// Source of rendered text widths.
///
/// Implementations must be pure with respect to their inputs and
/// non-decreasing in `font.size` for fixed text.
pub trait MeasureText {
    /// Pixel width `text` occupies when drawn with `font`
    fn measure_width(&self, text: &str, font: FontSpec) -> f32;
}

impl<F> MeasureText for F
where
    F: Fn(&str, FontSpec) -> f32,
{
    fn measure_width(&self, text: &str, font: FontSpec) -> f32 {
        self(text, font)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    size_bits: u32,
    weight: FontWeight,
}

/// Memoizing wrapper around any [`MeasureText`].
///
/// A render measures the same candidate lines several times (height pass,
/// then paint pass). Entries are written at most once per key with the same
/// value, so concurrent readers always observe a consistent width.
pub struct CachedMeasure<M> {
    inner: M,
    cache: RwLock<HashMap<MeasureKey, f32>>,
}

impl<M: MeasureText> CachedMeasure<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Number of distinct measurements remembered so far
    pub fn cached_entries(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}

impl<M: MeasureText> MeasureText for CachedMeasure<M> {
    fn measure_width(&self, text: &str, font: FontSpec) -> f32 {
        let key = MeasureKey {
            text: text.to_string(),
            size_bits: font.size.to_bits(),
            weight: font.weight,
        };

        if let Ok(cache) = self.cache.read() {
            if let Some(width) = cache.get(&key) {
                return *width;
            }
        }

        let width = self.inner.measure_width(text, font);
        // A poisoned lock only costs the memoization, never the answer
        if let Ok(mut cache) = self.cache.write() {
            cache.entry(key).or_insert(width);
        }
        width
    }
}
