/// Converts an integer operand to a float for mixed arithmetic.
///
/// Large magnitudes round to the nearest representable `f64`, exactly like
/// an implicit C conversion.
///
/// ## Example
/// ```
/// use winter::util::num::int_to_float;
///
/// assert_eq!(int_to_float(42), 42.0);
/// assert_eq!(int_to_float(-7), -7.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub const fn int_to_float(value: i64) -> f64 {
    value as f64
}

/// Rounds a float to the nearest integer, saturating at the `i64` bounds.
///
/// `NaN` maps to `0`. Used by integer exponentiation, which computes in
/// floating point and rounds the result.
///
/// ## Example
/// ```
/// use winter::util::num::round_to_int;
///
/// assert_eq!(round_to_int(511.9999), 512);
/// assert_eq!(round_to_int(-2.5), -3);
/// assert_eq!(round_to_int(f64::INFINITY), i64::MAX);
/// assert_eq!(round_to_int(f64::NAN), 0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_int(value: f64) -> i64 {
    value.round() as i64
}

/// Converts a character code to the integer payload of a character literal.
#[must_use]
pub fn char_code(c: char) -> i64 {
    i64::from(u32::from(c))
}
