//! Display formatting helpers.

use std::fmt;

/// Metric-style magnitude suffixes, one per power of 1000.
const SUFFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];

/// A number reduced to an abbreviated magnitude form.
///
/// Values are truncated toward zero, never rounded: 1290 abbreviates to
/// "1.2K", not "1.3K". Magnitudes past the suffix table (and non-finite
/// inputs) render as the infinity sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Abbreviated {
    Number {
        value: f64,
        suffix: &'static str,
        max_decimals: u32,
    },
    OutOfRange {
        negative: bool,
    },
}

/// Abbreviate `value` with at most `max_decimals` decimal places.
pub fn abbreviate(value: f64, max_decimals: u32) -> Abbreviated {
    if !value.is_finite() {
        return Abbreviated::OutOfRange {
            negative: value.is_sign_negative(),
        };
    }

    let magnitude = value.abs();
    if magnitude < 1000.0 {
        return Abbreviated::Number {
            value: truncate(value, max_decimals),
            suffix: "",
            max_decimals,
        };
    }

    let exponent = (magnitude.log10() / 3.0) as usize;
    match SUFFIXES.get(exponent) {
        Some(suffix) => Abbreviated::Number {
            value: truncate(value / 1000f64.powi(exponent as i32), max_decimals),
            suffix,
            max_decimals,
        },
        None => Abbreviated::OutOfRange {
            negative: value < 0.0,
        },
    }
}

/// Abbreviate an appearance count for the details view.
pub fn abbreviate_count(count: i64) -> Abbreviated {
    abbreviate(count as f64, 1)
}

fn truncate(value: f64, max_decimals: u32) -> f64 {
    let scale = 10f64.powi(max_decimals as i32);
    (value * scale).trunc() / scale
}

impl fmt::Display for Abbreviated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number {
                value,
                suffix,
                max_decimals,
            } => {
                if value.fract() == 0.0 {
                    write!(f, "{value:.0}{suffix}")
                } else {
                    // Truncation already capped the decimals; trim the
                    // trailing zeros the fixed-width format adds back.
                    let rendered = format!("{value:.*}", *max_decimals as usize);
                    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
                    write!(f, "{rendered}{suffix}")
                }
            }
            Self::OutOfRange { negative: false } => write!(f, "\u{221e}"),
            Self::OutOfRange { negative: true } => write!(f, "-\u{221e}"),
        }
    }
}
