//! Power-descriptor scaling.
//!
//! Catalog power values are heterogeneous strings: grouped integers
//! ("60.000.000"), or "<number> <scale-word>" pairs ("3 Billion",
//! "969 Googolplex"). Scale words reach far beyond what any fixed-width
//! integer holds, so all arithmetic here happens in log10 space computed
//! from digit counts; the raw magnitude is never materialised. The result
//! is compressed into a bounded 0..=10000 presentation range by a monotonic
//! mapping, which preserves relative ordering across astronomically
//! different magnitudes.

use lazy_regex::regex_captures;

/// Upper bound of the compressed presentation range.
pub const SCALE_MAX: i64 = 10_000;

/// Multiplier applied when no transformation is active.
pub const NO_TRANSFORMATION_MULTIPLIER: f64 = 1.0;

const MULTIPLIER_MIN: f64 = 1.1;
const MULTIPLIER_MAX: f64 = 5.0;

/// Scale a raw power descriptor into 0..=10000.
///
/// Unparseable, missing, or sentinel values ("unknown", "illimited") yield
/// the minimum scale value rather than an error: gameplay must stay
/// resilient to catalog gaps.
pub fn scale_power(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("unknown")
        || trimmed.eq_ignore_ascii_case("illimited")
    {
        return 0;
    }

    let Some((_, number, suffix)) = regex_captures!(r"^([\d.,]+)\s*([a-zA-Z]*)$", trimmed) else {
        return 0;
    };

    // "." and "," are digit grouping in catalog data, not decimal points.
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return 0;
    }

    // log10 of the numeric part from its leading digits; exact enough for
    // a two-decimal presentation scale and immune to overflow.
    let lead_len = digits.len().min(15);
    let lead: f64 = digits[..lead_len].parse().unwrap_or(0.0);
    if lead <= 0.0 {
        return 0;
    }
    let log10_number = lead.log10() + (digits.len() - lead_len) as f64;

    let log10_value = log10_number + f64::from(suffix_exponent(suffix));

    // Compressed presentation value: log10(v + 1) * 100. For magnitudes
    // beyond f64 range the +1 is negligible and we stay in log space.
    let scaled = if log10_value < 15.0 {
        (10f64.powf(log10_value) + 1.0).log10() * 100.0
    } else {
        log10_value * 100.0
    };

    (scaled.round() as i64).clamp(0, SCALE_MAX)
}

/// Multiplier for an active transformation: the ratio of its scaled power to
/// the base card's scaled power, clamped to [1.1, 5.0].
pub fn transformation_multiplier(base_raw: &str, transformation_raw: &str) -> f64 {
    let base = scale_power(base_raw).max(1) as f64;
    let transformed = scale_power(transformation_raw) as f64;
    (transformed / base).clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
}

/// Apply a multiplier to a base attribute value, rounding to nearest.
pub fn apply_multiplier(base: i32, multiplier: f64) -> i32 {
    (f64::from(base) * multiplier).round() as i32
}

/// Decimal exponent for a scale word; unrecognised words scale by 1.
fn suffix_exponent(suffix: &str) -> i32 {
    match suffix.to_ascii_lowercase().as_str() {
        "thousand" => 3,
        "million" => 6,
        "billion" => 9,
        "trillion" => 12,
        "quadrillion" => 15,
        "quintillion" => 18,
        "sextillion" => 21,
        "septillion" => 24,
        "octillion" => 27,
        "nonillion" => 30,
        "decillion" => 33,
        "googol" => 100,
        // 10^googol in the source material; any huge exponent beyond
        // googol keeps the ordering correct after compression.
        "googolplex" => 200,
        _ => 0,
    }
}
