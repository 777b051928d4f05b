//! Largest font size at which a single unwrapped line fits a width

use super::measure::{FontSpec, FontWeight, MeasureText};

/// Find the largest integer size in `[min_size, max_size]` at which `text`
/// fits within `max_width` on one line.
///
/// Returns `max_size` without searching when it already fits, and
/// `min_size` when nothing in range fits; overflow at the floor is left to
/// the wrapper's character fallback. Relies on width growing
/// monotonically with size.
pub fn solve_font_size<M: MeasureText + ?Sized>(
    measure: &M,
    text: &str,
    max_width: f32,
    max_size: u32,
    min_size: u32,
    weight: FontWeight,
) -> u32 {
    let (min_size, max_size) = if min_size > max_size {
        (max_size, min_size)
    } else {
        (min_size, max_size)
    };

    let fits = |size: u32| measure.measure_width(text, FontSpec::new(size as f32, weight)) <= max_width;

    if fits(max_size) {
        return max_size;
    }

    let mut low = min_size;
    let mut high = max_size;
    let mut best = min_size;

    while low <= high {
        let mid = low + (high - low) / 2;
        if fits(mid) {
            best = mid;
            low = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            high = mid - 1;
        }
    }

    log::debug!(
        "solved font size {} for {:?} (range {}..={}, width {})",
        best,
        text,
        min_size,
        max_size,
        max_width
    );
    best
}
