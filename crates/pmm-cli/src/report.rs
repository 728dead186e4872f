use std::io::{self, Write};

use pmm_core::Matrix;

/// Significant digits used for the timing line.
pub const SIGNIFICANT_DIGITS: usize = 8;

/// Rule printed above the timing summary.
pub const RULE: &str = "******************************************************";

/// Write `m` one row per line: `Row <i>:\t` then each value as `{:.2}\t`.
pub fn write_matrix<W: Write>(out: &mut W, m: &Matrix) -> io::Result<()> {
    for i in 0..m.dim() {
        write!(out, "Row {}:\t", i + 1)?;
        for v in m.row(i) {
            write!(out, "{v:.2}\t")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Format a duration in seconds with eight significant digits, trailing
/// zeros dropped.
pub fn format_seconds(secs: f64) -> String {
    if secs == 0.0 || !secs.is_finite() {
        return format!("{secs}");
    }
    let magnitude = secs.abs().log10().floor() as i32;
    let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - magnitude).max(0) as usize;
    let mut s = format!("{secs:.decimals$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}
