// src/config/duration.rs

use std::time::Duration;

/// Parse a timeout string such as `"10s"`, `"1m30s"`, `"250ms"` or `"1.5h"`.
///
/// Returns `None` when the value is zero or negative (timeout disabled).
///
/// Accepted units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is allowed without a unit.
pub fn parse_timeout(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim();
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    if body.is_empty() {
        return Err(format!("invalid duration '{s}'"));
    }
    if body == "0" {
        return Ok(None);
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = body;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("invalid duration '{s}': missing unit"))?;
        let (num_part, after_num) = rest.split_at(num_len);
        if num_part.is_empty() || num_part == "." {
            return Err(format!("invalid duration '{s}'"));
        }
        let value: f64 = num_part
            .parse()
            .map_err(|e| format!("invalid duration '{s}': {e}"))?;

        let unit_len = after_num
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_num.len());
        let (unit, after_unit) = after_num.split_at(unit_len);

        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            _ => return Err(format!("invalid duration '{s}': unknown unit '{unit}'")),
        };

        total_nanos += value * scale;
        rest = after_unit;
    }

    if negative || total_nanos < 1.0 {
        return Ok(None);
    }
    if total_nanos > u64::MAX as f64 {
        return Err(format!("invalid duration '{s}': out of range"));
    }

    Ok(Some(Duration::from_nanos(total_nanos.round() as u64)))
}
