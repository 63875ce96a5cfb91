//! Finite-difference derivative estimates for checking chain rules.

use crate::error::TensorError;
use num_traits::Float;

/// Default step for [`central_difference_default`].
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Estimate `∂f/∂vals[arg]` at `vals`.
///
/// Computes the one-sided difference `(f(x + ε·e_arg) - f(x)) / ε`, whose
/// error is O(ε). Compare against analytic derivatives with a tolerance of
/// the same order.
///
/// # Errors
///
/// Returns `TensorError::ArgumentOutOfRange` if `arg >= vals.len()`.
///
/// # Examples
///
/// ```
/// use ndgrad::autodiff::central_difference;
///
/// let d = central_difference(|x: &[f64]| x[0] * x[0], &[3.0], 0, 1e-6).unwrap();
/// assert!((d - 6.0).abs() < 1e-4);
/// ```
pub fn central_difference<T, F>(
    f: F,
    vals: &[T],
    arg: usize,
    epsilon: T,
) -> Result<T, TensorError>
where
    T: Float,
    F: Fn(&[T]) -> T,
{
    if arg >= vals.len() {
        return Err(TensorError::ArgumentOutOfRange {
            arg,
            len: vals.len(),
        });
    }

    let mut shifted = vals.to_vec();
    shifted[arg] = shifted[arg] + epsilon;
    Ok((f(&shifted) - f(vals)) / epsilon)
}

/// [`central_difference`] with `epsilon = DEFAULT_EPSILON`.
pub fn central_difference_default<F>(f: F, vals: &[f64], arg: usize) -> Result<f64, TensorError>
where
    F: Fn(&[f64]) -> f64,
{
    central_difference(f, vals, arg, DEFAULT_EPSILON)
}
