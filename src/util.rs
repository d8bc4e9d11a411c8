/// Round to two decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of `part` in `whole` as a percentage, or None for an empty whole
pub fn percent(part: usize, whole: usize) -> Option<f64> {
    match whole {
        positive if positive > 0 => Some(part as f64 / whole as f64 * 100.0),
        _ => None,
    }
}
