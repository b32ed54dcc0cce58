use std::fmt::Write as _;

use crate::foundation::core::Point;

/// Format a coordinate for SVG path data.
///
/// Integral values print without a fractional part and everything else keeps at most three
/// decimals. Non-finite values print as-is so that parsing the path back fails loudly.
pub(crate) fn fmt_coord(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    let mut s = format!("{rounded:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Append `x,y` to `out`.
pub(crate) fn push_point(out: &mut String, p: Point) {
    let _ = write!(out, "{},{}", fmt_coord(p.x), fmt_coord(p.y));
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
