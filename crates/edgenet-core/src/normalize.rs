// ── Field normalization ──
//
// Router firmware is loose about types: counters may be numbers or
// strings such as "12345 bytes", signal may be missing or textual.
// These helpers turn raw JSON values into the canonical record fields.

use serde_json::Value;

/// Byte counter: numbers pass through, the first run of digits in a
/// string is used, anything else is zero.
pub fn byte_counter(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(truncate_f64))
            .unwrap_or(0),
        Some(Value::String(s)) => first_digits(s).unwrap_or(0),
        _ => 0,
    }
}

/// Signal percentage clamped to 0..=100. Non-numeric input is `None`.
pub fn signal(value: Option<&Value>) -> Option<u8> {
    let pct = match value? {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.clamp(0, 100),
            None => i64::try_from(truncate_f64(n.as_f64()?.clamp(0.0, 100.0))).ok()?,
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?.clamp(0, 100),
        _ => return None,
    };
    u8::try_from(pct).ok()
}

/// `11n` → `802.11n`. Already-canonical or unknown tokens are unchanged.
pub fn wireless_mode(mode: Option<&str>) -> Option<String> {
    let mode = mode.map(str::trim).filter(|m| !m.is_empty())?;
    if mode.starts_with("11") {
        Some(format!("802.{mode}"))
    } else {
        Some(mode.to_owned())
    }
}

/// Non-negative integer from a number or numeric string.
pub fn unsigned(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(truncate_f64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whole minutes, rounding down.
pub fn minutes(seconds: u64) -> u64 {
    seconds / 60
}

fn first_digits(s: &str) -> Option<u64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = s[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    // Saturate rather than drop absurdly long digit runs.
    Some(digits.parse().unwrap_or(u64::MAX))
}

#[allow(clippy::as_conversions, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncate_f64(f: f64) -> u64 {
    f.trunc() as u64
}
