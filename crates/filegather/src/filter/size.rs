//! Size range parsing and matching.

use serde::{Deserialize, Serialize};

use crate::error::{GatherError, Result};

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// An inclusive byte-size range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: u64,
    pub max: u64,
}

impl Default for SizeRange {
    fn default() -> Self {
        Self::any()
    }
}

impl SizeRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// No size restriction.
    pub fn any() -> Self {
        Self::new(0, u64::MAX)
    }

    pub fn under_1mb() -> Self {
        Self::new(0, MB)
    }

    pub fn between_1mb_and_10mb() -> Self {
        Self::new(MB, 10 * MB)
    }

    pub fn over_10mb() -> Self {
        Self::new(10 * MB, u64::MAX)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max == u64::MAX
    }

    pub fn contains(&self, size: u64) -> bool {
        self.min <= size && size <= self.max
    }

    /// Parses `any`, a keyword (`empty`, `tiny`, `small`, `medium`, `large`,
    /// `huge`, `gigantic`), a comparison (`<1mb`, `>=10kb`), a range
    /// (`1mb..10mb`, `..500k`, `2g..`) or a plain size (`=4kb`, `4096`).
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GatherError::Parse("size: requires a value".to_string()));
        }

        if let Some((op, value_raw)) = parse_size_comparison(trimmed) {
            if size_keyword(value_raw).is_some() {
                return Err(GatherError::Parse(
                    "size keywords cannot be used with comparison operators".to_string(),
                ));
            }
            let value = parse_size_literal(value_raw)?;
            return Ok(match op {
                SizeComparisonOp::Lt => {
                    if value == 0 {
                        return Err(GatherError::Parse(
                            "size: nothing is smaller than 0 bytes".to_string(),
                        ));
                    }
                    Self::new(0, value - 1)
                }
                SizeComparisonOp::Lte => Self::new(0, value),
                SizeComparisonOp::Gt => Self::new(value.saturating_add(1), u64::MAX),
                SizeComparisonOp::Gte => Self::new(value, u64::MAX),
                SizeComparisonOp::Eq => Self::new(value, value),
            });
        }

        if let Some((start_raw, end_raw)) = parse_size_range(trimmed) {
            let min = if start_raw.is_empty() {
                0
            } else {
                parse_size_literal(start_raw)?
            };
            let max = if end_raw.is_empty() {
                u64::MAX
            } else {
                parse_size_literal(end_raw)?
            };
            if min > max {
                return Err(GatherError::Parse(
                    "size range start must be less than or equal to end".to_string(),
                ));
            }
            return Ok(Self::new(min, max));
        }

        if let Some(range) = size_keyword(trimmed) {
            return Ok(range);
        }

        let value = parse_size_literal(trimmed)?;
        Ok(Self::new(value, value))
    }
}

#[derive(Debug, Clone, Copy)]
enum SizeComparisonOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

fn parse_size_comparison(raw: &str) -> Option<(SizeComparisonOp, &str)> {
    for (operator, kind) in [
        ("<=", SizeComparisonOp::Lte),
        (">=", SizeComparisonOp::Gte),
        ("<", SizeComparisonOp::Lt),
        (">", SizeComparisonOp::Gt),
        ("=", SizeComparisonOp::Eq),
    ] {
        if let Some(value) = raw.strip_prefix(operator) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some((kind, trimmed));
        }
    }
    None
}

fn parse_size_range(raw: &str) -> Option<(&str, &str)> {
    let split = raw.find("..")?;
    let start = raw[..split].trim();
    let end = raw[split + 2..].trim();
    if start.is_empty() && end.is_empty() {
        return None;
    }
    Some((start, end))
}

fn size_keyword(raw: &str) -> Option<SizeRange> {
    let range = match raw.trim().to_ascii_lowercase().as_str() {
        "any" | "all" => SizeRange::any(),
        "empty" => SizeRange::new(0, 0),
        "tiny" => SizeRange::new(0, 10 * KB),
        "small" => SizeRange::new(10 * KB + 1, 100 * KB),
        "medium" => SizeRange::new(100 * KB + 1, MB),
        "large" => SizeRange::new(MB + 1, 16 * MB),
        "huge" => SizeRange::new(16 * MB + 1, 128 * MB),
        "gigantic" | "giant" => SizeRange::new(128 * MB + 1, u64::MAX),
        _ => return None,
    };
    Some(range)
}

fn parse_size_literal(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatherError::Parse("size: expected a number".to_string()));
    }

    let split = trimmed
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || *ch == '.'))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    let (number_part, unit_part) = trimmed.split_at(split);
    if number_part.is_empty() {
        return Err(GatherError::Parse(format!(
            "size: expected a numeric value in {raw:?}"
        )));
    }

    let value: f64 = number_part
        .parse()
        .map_err(|_| GatherError::Parse(format!("size: failed to parse number in {raw:?}")))?;
    let multiplier = size_unit_multiplier(unit_part)?;
    let bytes = (value * multiplier as f64).round();
    if !bytes.is_finite() || bytes < 0.0 {
        return Err(GatherError::Parse(format!(
            "size: value {raw:?} is out of range"
        )));
    }

    if bytes >= u64::MAX as f64 {
        Ok(u64::MAX)
    } else {
        Ok(bytes as u64)
    }
}

fn size_unit_multiplier(unit: &str) -> Result<u64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "byte" | "bytes" => Ok(1),
        "k" | "kb" | "kib" | "kilobyte" | "kilobytes" => Ok(KB),
        "m" | "mb" | "mib" | "megabyte" | "megabytes" => Ok(MB),
        "g" | "gb" | "gib" | "gigabyte" | "gigabytes" => Ok(1024 * MB),
        "t" | "tb" | "tib" | "terabyte" | "terabytes" => Ok(1024_u64.pow(4)),
        _ => Err(GatherError::Parse(format!("unknown size unit: {unit}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let range = SizeRange::new(10, 20);
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }

    #[test]
    fn presets_follow_megabyte_boundaries() {
        assert!(SizeRange::under_1mb().contains(MB));
        assert!(SizeRange::between_1mb_and_10mb().contains(MB));
        assert!(!SizeRange::over_10mb().contains(10 * MB - 1));
        assert!(SizeRange::any().is_unbounded());
    }

    #[test]
    fn parse_comparisons() {
        assert_eq!(SizeRange::parse("<1kb").unwrap(), SizeRange::new(0, 1023));
        assert_eq!(SizeRange::parse("<=1kb").unwrap(), SizeRange::new(0, 1024));
        assert_eq!(
            SizeRange::parse(">1k").unwrap(),
            SizeRange::new(1025, u64::MAX)
        );
        assert_eq!(
            SizeRange::parse(">= 2 MB").unwrap(),
            SizeRange::new(2 * MB, u64::MAX)
        );
        assert_eq!(SizeRange::parse("=4096").unwrap(), SizeRange::new(4096, 4096));
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(
            SizeRange::parse("1mb..10mb").unwrap(),
            SizeRange::new(MB, 10 * MB)
        );
        assert_eq!(SizeRange::parse("..500").unwrap(), SizeRange::new(0, 500));
        assert_eq!(
            SizeRange::parse("1.5k..").unwrap(),
            SizeRange::new(1536, u64::MAX)
        );
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(SizeRange::parse("empty").unwrap(), SizeRange::new(0, 0));
        assert!(SizeRange::parse("Any").unwrap().is_unbounded());
    }

    #[test]
    fn parse_errors() {
        assert!(SizeRange::parse("").is_err());
        assert!(SizeRange::parse("10mb..1mb").is_err());
        assert!(SizeRange::parse("<small").is_err());
        assert!(SizeRange::parse("12 parsecs").is_err());
        assert!(SizeRange::parse("<0").is_err());
    }
}
