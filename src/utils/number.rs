/// Convert a completed fraction in [0, 1] to a rounded percentage string.
pub fn fraction_to_percentage(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i64)
}
