#![forbid(unsafe_code)]

//! CSS value parsing and formatting.
//!
//! Inline style values round-trip through the DOM as strings (`"120px"`,
//! `"12deg"`, `""`). Parsing follows JavaScript `parseFloat` semantics: the
//! longest numeric prefix wins and trailing units are ignored. This is how
//! the page has always read its own `style.left` / `style.top` back.
//!
//! # Failure Modes
//!
//! None surface. Unparseable input yields `None`; callers pick the default.

/// Parse the longest leading decimal literal, like JavaScript `parseFloat`.
///
/// Leading whitespace is skipped. `"Infinity"` (optionally signed) is
/// accepted. Returns `None` where `parseFloat` would return `NaN`.
#[must_use]
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// `parseFloat(value) || 0`: unparseable input reads as zero.
#[must_use]
pub fn parse_float_or_zero(input: &str) -> f64 {
    match parse_float(input) {
        Some(v) if v != 0.0 => v,
        _ => 0.0,
    }
}

/// Parse a finite number, falling back to `default` for absent, `NaN` or
/// infinite values.
#[must_use]
pub fn parse_finite_or(input: &str, default: f64) -> f64 {
    parse_float(input)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Parse a fraction written either as a percentage (`"50%"`) or a bare
/// number (`"0.5"`).
#[must_use]
pub fn parse_fraction(input: &str) -> Option<f64> {
    let value = parse_float(input).filter(|v| v.is_finite())?;
    if input.trim_end().ends_with('%') {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

/// Parse a CSS angle into degrees. Unitless values are read as degrees.
///
/// Supports `deg`, `rad`, `grad` and `turn`.
#[must_use]
pub fn parse_angle_deg(input: &str) -> Option<f64> {
    let value = parse_float(input).filter(|v| v.is_finite())?;
    let unit = input.trim().trim_start_matches(|c: char| {
        c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')
    });
    let degrees = match unit.to_ascii_lowercase().as_str() {
        "rad" => value.to_degrees(),
        "grad" => value * 0.9,
        "turn" => value * 360.0,
        _ => value,
    };
    Some(degrees)
}

/// Format a number the way a JavaScript template literal would, so that
/// written values read back identically. Negative zero prints as `0`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    format!("{value}")
}

/// `"{value}px"`.
#[must_use]
pub fn format_px(value: f64) -> String {
    format!("{}px", format_number(value))
}

/// `"{value}deg"`.
#[must_use]
pub fn format_deg(value: f64) -> String {
    format!("{}deg", format_number(value))
}
