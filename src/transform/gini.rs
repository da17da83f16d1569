//! Gini coefficient of a numeric distribution.
//!
//! 0 is perfect equality; values approach 1 as one member holds
//! everything. Negative inputs are shifted so the minimum is zero first,
//! which changes the measurement to inequality over non-negative values -
//! a known limitation of the coefficient, stated here rather than hidden.

use crate::error::{Error, Result};

/// Guards the denominator against an all-zero input.
const EPSILON: f64 = 1e-7;

/// Compute the Gini coefficient of `values`.
///
/// With ascending-sorted values and 1-based ranks i = 1..n:
///
/// ```text
/// G = sum((2i - n - 1) * x_i) / (n * sum(x_i))
/// ```
///
/// A single-element input telescopes to 0. An empty input is an
/// [`Error::InvalidArgument`] rather than a division by zero.
pub fn gini(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InvalidArgument(
            "gini coefficient requires at least one value".to_string(),
        ));
    }

    let mut xs = values.to_vec();

    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    if min < 0.0 {
        for x in &mut xs {
            *x -= min;
        }
    }
    for x in &mut xs {
        *x += EPSILON;
    }
    xs.sort_by(f64::total_cmp);

    let n = xs.len() as f64;
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (index, x) in xs.iter().enumerate() {
        let rank = (index + 1) as f64;
        weighted += (2.0 * rank - n - 1.0) * x;
        total += x;
    }

    Ok(weighted / (n * total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(gini(&[]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn single_element_is_zero() {
        assert_eq!(gini(&[123.4]).unwrap(), 0.0);
    }

    #[test]
    fn perfect_equality_is_near_zero() {
        let g = gini(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert!(g.abs() < 1e-6, "expected ~0, got {g}");

        let g = gini(&[42.0; 50]).unwrap();
        assert!(g.abs() < 1e-6);
    }

    #[test]
    fn concentrated_distribution_is_high() {
        let g = gini(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert!(g > 0.5, "expected > 0.5, got {g}");

        // One holder with everything approaches the theoretical maximum.
        let mut values = vec![0.0; 99];
        values.push(100.0);
        let g = gini(&values).unwrap();
        assert!(g > 0.95, "expected near 1, got {g}");
    }

    #[test]
    fn invariant_under_positive_scaling() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let scaled: Vec<f64> = values.iter().map(|x| x * 7.5).collect();
        let g1 = gini(&values).unwrap();
        let g2 = gini(&scaled).unwrap();
        assert!((g1 - g2).abs() < 1e-6, "expected {g1} ~= {g2}");
    }

    #[test]
    fn negative_values_are_shifted() {
        // [-1, 0, 1] measures like [0, 1, 2]
        let g_shifted = gini(&[-1.0, 0.0, 1.0]).unwrap();
        let g_reference = gini(&[0.0, 1.0, 2.0]).unwrap();
        assert!((g_shifted - g_reference).abs() < 1e-6);
    }

    #[test]
    fn unordered_input_matches_sorted_input() {
        let g1 = gini(&[5.0, 1.0, 3.0]).unwrap();
        let g2 = gini(&[1.0, 3.0, 5.0]).unwrap();
        assert_eq!(g1, g2);
    }
}
