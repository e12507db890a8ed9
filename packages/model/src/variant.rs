//! Structure layout variants.
//!
//! A variant decides how many columns a structure owns and how wide each one
//! renders. Both lookups are total: an unrecognized variant string (e.g. from a
//! malformed persisted document) behaves as a single full-width column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest column count accepted for numeric (`n-k`) variants.
pub const MIN_NUMERIC_COLUMNS: u8 = 2;
/// Largest column count accepted for numeric (`n-k`) variants.
pub const MAX_NUMERIC_COLUMNS: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Variant {
    /// `1-1`: one full-width column
    Single,
    /// `2-2`, `3-3`, `4-4`: equal shares
    Equal(u8),
    /// `1-2-left` / `1-2-right`: two columns, 67/33
    TwoThirds { wide_left: bool },
    /// `1-3-left` / `1-3-right`: two columns, 75/25
    ThreeQuarters { wide_left: bool },
    /// `1-2-1`: narrow, wide, narrow
    WideCenter,
    /// `n-k`: k equal columns, k in 2..=6
    Numeric(u8),
    /// Anything else, kept verbatim so it round-trips
    Unknown(String),
}

impl Variant {
    /// Numeric variant with the requested count clamped to the supported range.
    pub fn numeric(requested: i64) -> Self {
        let clamped = requested.clamp(MIN_NUMERIC_COLUMNS as i64, MAX_NUMERIC_COLUMNS as i64);
        Variant::Numeric(clamped as u8)
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "1" | "1-1" => return Variant::Single,
            "2-2" => return Variant::Equal(2),
            "3-3" => return Variant::Equal(3),
            "4-4" => return Variant::Equal(4),
            "1-2-left" => return Variant::TwoThirds { wide_left: true },
            "1-2-right" => return Variant::TwoThirds { wide_left: false },
            "1-3-left" => return Variant::ThreeQuarters { wide_left: true },
            "1-3-right" => return Variant::ThreeQuarters { wide_left: false },
            "1-2-1" => return Variant::WideCenter,
            _ => {}
        }

        if let Some(count) = raw.strip_prefix("n-") {
            if let Ok(count) = count.parse::<i64>() {
                return Variant::numeric(count);
            }
        }

        Variant::Unknown(raw.to_string())
    }

    pub fn column_count(&self) -> usize {
        self.widths().len()
    }

    /// Column widths in percent. Always non-empty and summing to ~100.
    pub fn widths(&self) -> Vec<f64> {
        match self {
            Variant::Single | Variant::Unknown(_) => vec![100.0],
            Variant::Equal(n) | Variant::Numeric(n) => equal_shares(*n as usize),
            Variant::TwoThirds { wide_left: true } => vec![67.0, 33.0],
            Variant::TwoThirds { wide_left: false } => vec![33.0, 67.0],
            Variant::ThreeQuarters { wide_left: true } => vec![75.0, 25.0],
            Variant::ThreeQuarters { wide_left: false } => vec![25.0, 75.0],
            Variant::WideCenter => vec![25.0, 50.0, 25.0],
        }
    }

    /// Widths formatted as CSS percentages (`"33.33%"`).
    pub fn css_widths(&self) -> Vec<String> {
        self.widths().into_iter().map(format_percent).collect()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Variant::Numeric(_))
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Equal(2)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Single => f.write_str("1-1"),
            Variant::Equal(n) => write!(f, "{n}-{n}"),
            Variant::TwoThirds { wide_left } => {
                write!(f, "1-2-{}", if *wide_left { "left" } else { "right" })
            }
            Variant::ThreeQuarters { wide_left } => {
                write!(f, "1-3-{}", if *wide_left { "left" } else { "right" })
            }
            Variant::WideCenter => f.write_str("1-2-1"),
            Variant::Numeric(n) => write!(f, "n-{n}"),
            Variant::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl From<String> for Variant {
    fn from(raw: String) -> Self {
        Variant::parse(&raw)
    }
}

impl From<Variant> for String {
    fn from(variant: Variant) -> Self {
        variant.to_string()
    }
}

/// `count` equal shares; a zero count degrades to one full column.
pub fn equal_shares(count: usize) -> Vec<f64> {
    let count = count.max(1);
    vec![100.0 / count as f64; count]
}

/// Format a percentage with at most two decimals and no trailing zeros.
pub fn format_percent(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", trimmed)
}
