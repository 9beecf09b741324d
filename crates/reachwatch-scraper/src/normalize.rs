//! Conversion of human-formatted and loosely-typed counts into integers.
//!
//! Upstream pages render counts as display text ("1.2M subscribers",
//! "12,345 videos") while JSON payloads mix numbers and digit strings. Both
//! paths end in `Option<u64>`: `None` means the value was absent or
//! unreadable, never zero.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<number>\d[\d.]*)(?P<suffix>[KkMmBb]?)").expect("valid regex")
});

/// Separators stripped before parsing: thousands commas, spaces, NBSP and
/// narrow NBSP.
fn is_separator(c: char) -> bool {
    matches!(c, ',' | ' ' | '\u{a0}' | '\u{202f}')
}

/// Parses display text such as `"12.3K"`, `"1,234,567 views"` or `"2M"`.
///
/// Only the first ASCII-whitespace-delimited token is considered. A number
/// with an optional `K`/`M`/`B` suffix (any case) is scaled exactly; failing
/// that, every digit in the token is concatenated.
#[must_use]
pub fn parse_count(text: Option<&str>) -> Option<u64> {
    let token = text?.split_ascii_whitespace().next()?;
    let candidate: String = token.chars().filter(|c| !is_separator(*c)).collect();

    if let Some(caps) = COUNT_RE.captures(&candidate) {
        let multiplier = match caps.name("suffix").map(|m| m.as_str()) {
            Some("K" | "k") => 1_000,
            Some("M" | "m") => 1_000_000,
            Some("B" | "b") => 1_000_000_000,
            _ => 1,
        };
        if let Some(value) = scale_decimal(&caps["number"], multiplier) {
            return Some(value);
        }
    }

    digits_only(&candidate)
}

/// Multiplies a `123` / `12.3` literal by `multiplier` without float
/// rounding, truncating any remaining fraction. Returns `None` for literals
/// with more than one `.`.
fn scale_decimal(number: &str, multiplier: u64) -> Option<u64> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if frac_part.contains('.') {
        return None;
    }

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let frac_digits = &frac_part[..frac_part.len().min(18)];
    let frac_scaled = if frac_digits.is_empty() {
        0
    } else {
        let frac_value: u128 = frac_digits.parse().ok()?;
        let denominator = 10u128.pow(u32::try_from(frac_digits.len()).ok()?);
        frac_value * u128::from(multiplier) / denominator
    };

    let total = int_value
        .checked_mul(u128::from(multiplier))?
        .checked_add(frac_scaled)?;
    u64::try_from(total).ok()
}

fn digits_only(s: &str) -> Option<u64> {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Normalizes a JSON stat that may be a number or a digit string.
#[must_use]
pub fn normalize_stat(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let truncated = f.trunc() as u64;
                    truncated
                })
        }),
        Value::String(s) => digits_only(s),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
