//! Lagrange interpolation through `k` distinct abscissae.

#![forbid(unsafe_code)]

use crate::field::{self, FieldElem, FieldError};
use crate::poly::Polynomial;
use crate::P;

/// Interpolates the unique polynomial `L` of degree `< x.len()` with
/// `L(x[i]) = y[i])` for every `i`.
///
/// Classical Lagrange: for each `i`, the basis numerator
/// `N_i(t) = prod_{j != i} (t - x[j])` is built in the additive form
/// `(t + (P - x[j]))`, which keeps every coefficient in `[0, P)` without
/// ever introducing a negative intermediate value. `N_i` is then scaled
/// by `y[i] / N_i(x[i])` and all `k` scaled basis polynomials are summed.
///
/// # Errors
/// Propagates [`FieldError::InverseUndefined`] from the field division
/// `y[i] / N_i(x[i])`. This cannot happen when `x` holds distinct elements
/// of `[0, P)`, which every caller in this crate guarantees by
/// construction; a correct implementation surfaces the error rather than
/// risk silently producing a wrong polynomial.
pub fn lagrange_interpolate(x: &[FieldElem], y: &[FieldElem]) -> Result<Polynomial, FieldError> {
    debug_assert_eq!(x.len(), y.len());
    let mut total = Polynomial::zero();
    for i in 0..x.len() {
        let basis = single_basis(x, i)?;
        let scale = field::div(y[i], basis.evaluate(x[i]))?;
        total = total.add(&basis.scale(scale));
    }
    Ok(total)
}

/// `N_i(t) = prod_{j != i} (t - x[j])`, unscaled.
fn single_basis(x: &[FieldElem], i: usize) -> Result<Polynomial, FieldError> {
    let mut basis = Polynomial::one();
    for (j, &xj) in x.iter().enumerate() {
        if j == i {
            continue;
        }
        let linear = Polynomial::from_coeffs(&[P - xj, 1]);
        basis = basis
            .mul(&linear)
            .expect("lagrange basis degree is bounded by the caller's point count");
    }
    Ok(basis)
}
