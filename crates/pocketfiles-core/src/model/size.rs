/// Human-readable byte counts for file listings.
///
/// All internal sizes are `u64` bytes. Floating point is only used
/// at the display-formatting boundary.

/// Binary unit ladder. Each step is a factor of 1024.
const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with one decimal place in the largest unit that keeps
/// the value under 1024. Plain bytes are printed without a fraction.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return if unit == "B" {
                format!("{bytes} B")
            } else {
                format!("{value:.1} {unit}")
            };
        }
        value /= 1024.0;
    }
    format!("{value:.1} EB")
}

/// Format a file count with thousand separators, e.g. `12,408`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
