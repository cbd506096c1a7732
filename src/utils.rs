//! Common small functions used throughout the crate
//!
//! These are left public for the convenience of the user, e.g. the prettier
//! scientific number formatting used by the summary displays.

use std::fmt::LowerExp;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Extends primitives with more specific formatting options
pub trait NumberFmt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so
    /// this allows easy definition.
    ///
    /// Works for anything that can be represented as scientific using the
    /// LowerExp trait.
    ///
    /// ```rust
    /// # use cosmopart::utils::NumberFmt;
    /// let number = -1.0;
    /// assert_eq!(number.sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((1.0).sci(5, 2), "1.00000e+00".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: LowerExp> NumberFmt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut num = f!("{:.precision$e}", &self, precision = precision);
        // Safe to `unwrap` as `num` is guaranteed to contain `'e'`
        let exp = num.split_off(num.find('e').unwrap());
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        // Pad the exponent with zeros if needed and put it back on the number
        num.push_str(&f!("e{}{:0>pad$}", sign, exp, pad = exp_pad));
        num
    }
}

/// Smallest value in a float slice, NaN entries excluded
///
/// Floating-point types do not implement Ord because of NaN, so the built-in
/// min method is unavailable. Folding with [f64::min] sidesteps that and
/// returns infinity for an empty slice, which callers treat as "no data".
///
/// ```rust
/// # use cosmopart::utils::slice_min;
/// assert_eq!(slice_min(&[3.0, 1.0, 2.0]), 1.0);
/// assert_eq!(slice_min(&[]), f64::INFINITY);
/// ```
pub fn slice_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest value in a float slice, NaN entries excluded
///
/// Counterpart to [slice_min], returning negative infinity for an empty
/// slice.
///
/// ```rust
/// # use cosmopart::utils::slice_max;
/// assert_eq!(slice_max(&[3.0, 1.0, 2.0]), 3.0);
/// assert_eq!(slice_max(&[]), f64::NEG_INFINITY);
/// ```
pub fn slice_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
