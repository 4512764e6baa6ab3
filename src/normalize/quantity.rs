//! Kubernetes quantity parsing
//!
//! Quantities look like `"500m"`, `"2Gi"` or `"1.5"`: a decimal number
//! followed by an optional alphabetic unit suffix. A parse that fails means
//! "unknown", which callers must not confuse with zero.

/// A quantity split into its numeric part and unit suffix
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub number: f64,
    pub unit: String,
}

/// SI scale for CPU cores
const CPU_SCALE: &[(&str, f64)] = &[
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("", 1.0),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

const KI: f64 = 1024.0;

/// Binary and decimal scales for memory bytes
const MEMORY_SCALE: &[(&str, f64)] = &[
    ("", 1.0),
    ("Ki", KI),
    ("Mi", KI * KI),
    ("Gi", KI * KI * KI),
    ("Ti", KI * KI * KI * KI),
    ("Pi", KI * KI * KI * KI * KI),
    ("Ei", KI * KI * KI * KI * KI * KI),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Split `<digits and dots><letters>` into number and unit
pub fn parse_quantity(value: &str) -> Option<Quantity> {
    let text = value.trim();
    if text.is_empty() {
        return None;
    }

    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    if digits.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let number: f64 = digits.parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    Some(Quantity {
        number,
        unit: unit.to_string(),
    })
}

fn scaled(value: &str, table: &[(&str, f64)]) -> Option<f64> {
    let parsed = parse_quantity(value)?;
    table
        .iter()
        .find(|(unit, _)| *unit == parsed.unit)
        .map(|(_, factor)| parsed.number * factor)
}

/// CPU quantity in cores
pub fn parse_cpu_cores(value: &str) -> Option<f64> {
    scaled(value, CPU_SCALE)
}

/// Memory quantity in bytes
pub fn parse_memory_bytes(value: &str) -> Option<f64> {
    scaled(value, MEMORY_SCALE)
}

/// Share of capacity as a whole percent in `0..=100`.
///
/// Unknown or non-finite inputs and non-positive capacity give 0.
pub fn to_percent(used: Option<f64>, capacity: Option<f64>) -> u8 {
    let (Some(used), Some(capacity)) = (used, capacity) else {
        return 0;
    };
    if !used.is_finite() || !capacity.is_finite() || capacity <= 0.0 {
        return 0;
    }
    let percent = (used / capacity * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
