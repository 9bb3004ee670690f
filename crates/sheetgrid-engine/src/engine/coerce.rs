//! Text to number coercion.
//!
//! Cell values are always text. Aggregates turn them into numbers with one of
//! two policies, neither of which can fail: text that does not hold a number
//! contributes `0`. This is a compatibility behavior, not an oversight.

use serde::{Deserialize, Serialize};

/// How aggregate inputs are read as numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercion {
    /// Use the leading numeric token: `"12abc"` is 12.
    #[default]
    Lenient,
    /// The whole trimmed text must be a number: `"12abc"` is 0.
    Strict,
}

impl Coercion {
    pub fn coerce(&self, text: &str) -> f64 {
        match self {
            Coercion::Lenient => lenient_number(text),
            Coercion::Strict => strict_number(text),
        }
    }
}

/// Tolerant numeric parse.
///
/// Skips leading whitespace and reads the longest decimal token
/// (`[+-]digits[.digits][e[+-]digits]` or `Infinity`). Returns `0` when there
/// is no such token.
pub fn lenient_number(text: &str) -> f64 {
    let text = text.trim_start();
    match leading_number_len(text) {
        Some(len) => zero_if_nan(parse_token(&text[..len])),
        None => 0.0,
    }
}

/// Whole-text numeric parse; anything but a single decimal token is `0`.
pub fn strict_number(text: &str) -> f64 {
    let text = text.trim();
    match leading_number_len(text) {
        Some(len) if len == text.len() => zero_if_nan(parse_token(text)),
        _ => 0.0,
    }
}

/// Whether `text` is acceptable content for a cell declared as a number.
///
/// Blank text is accepted, as are decimal, exponent, `Infinity` and
/// `0x`/`0o`/`0b` integer forms.
pub fn is_numeric_text(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    if leading_number_len(text) == Some(text.len()) {
        return true;
    }
    is_radix_integer(text)
}

fn zero_if_nan(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { n }
}

fn parse_token(token: &str) -> f64 {
    let (negative, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let magnitude = if unsigned == "Infinity" {
        f64::INFINITY
    } else {
        unsigned.parse::<f64>().unwrap_or(0.0)
    };
    if negative { -magnitude } else { magnitude }
}

/// Byte length of the decimal number token at the start of `text`.
fn leading_number_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }
    if text[i..].starts_with("Infinity") {
        return Some(i + "Infinity".len());
    }

    let int_end = digits_from(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;

    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        let frac_digits = frac_end - (i + 1);
        // "5." is a number, "." is not.
        if mantissa_digits > 0 || frac_digits > 0 {
            mantissa_digits += frac_digits;
            i = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    Some(i)
}

fn is_radix_integer(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}
