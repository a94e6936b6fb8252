//! Numeric text rendering
//!
//! Every result float is shown with 8 significant digits, trailing zeros
//! stripped, the exponent written without sign padding or leading zeros
//! (`1e-6`, not `1e-006`), and integral values without a decimal point.

/// Number of significant digits in displayed results.
pub const DISPLAY_DIGITS: usize = 8;

/// Renders a float the way results are printed.
pub fn show_number(d: f64) -> String {
    if d.is_infinite() || d.is_nan() {
        return d.to_string();
    }

    // Small integral values print as plain integers. Values beyond the
    // i32 range fall through to significant-digit notation.
    if d == (d as i32) as f64 {
        return (d as i32).to_string();
    }

    // Round to DISPLAY_DIGITS significant digits first; the rounded
    // exponent decides between fixed and scientific notation.
    let sci = format!("{:.*e}", DISPLAY_DIGITS - 1, d);
    let (mantissa, exp) = sci
        .split_once('e')
        .expect("float in scientific notation always has an exponent");
    let exp: i32 = exp.parse().expect("exponent is an integer");

    if exp < -4 || exp >= DISPLAY_DIGITS as i32 {
        format!("{}e{}", trim_zeros(mantissa), exp)
    } else {
        let decimals = (DISPLAY_DIGITS as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, d))
    }
}

/// Rounds a float to the displayed precision by a round trip through its
/// textual form. Used where rounded values are compared for equality.
pub fn round_to_display(d: f64) -> f64 {
    if d.is_infinite() || d.is_nan() {
        return d;
    }
    format!("{:.*e}", DISPLAY_DIGITS - 1, d)
        .parse()
        .expect("rendered float parses back")
}

fn trim_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
