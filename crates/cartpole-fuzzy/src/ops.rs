//! Zadeh fuzzy operators: AND = min, OR = max, NOT = complement

/// Minimum of all operands; 1 for no operands
#[inline]
pub fn fuzzy_and<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().fold(1.0, f64::min)
}

/// Maximum of all operands; 0 for no operands
#[inline]
pub fn fuzzy_or<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().fold(0.0, f64::max)
}

#[inline]
pub fn fuzzy_not(value: f64) -> f64 {
    1.0 - value
}
