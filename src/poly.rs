//! Dense, fixed-capacity polynomials over [`crate::field`].
//!
//! Every polynomial returned by this module is reduced: `degree == 0 ||
//! coeffs[degree] != 0`. Capacity is `N` (the codec never needs a degree
//! above `N - 1`, and products the codec forms never legitimately exceed
//! `N`), so there is no heap allocation anywhere in this module.

#![forbid(unsafe_code)]

use crate::field::{self, FieldElem};
use crate::N;

/// Maximum representable degree. One past this and `mul` rejects the result.
pub const RS_MAX_POLY_DEGREE: usize = N;

/// Errors produced by polynomial operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolyError {
    /// `mul` would need a degree above [`RS_MAX_POLY_DEGREE`].
    #[error("polynomial multiply degree overflow: {lhs} + {rhs} > {max}")]
    DegreeOverflow { lhs: usize, rhs: usize, max: usize },
}

/// A dense polynomial `c[0] + c[1] x + ... + c[degree] x^degree`.
#[derive(Debug, Clone, Copy)]
pub struct Polynomial {
    degree: usize,
    coeffs: [FieldElem; RS_MAX_POLY_DEGREE + 1],
}

impl Polynomial {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self {
            degree: 0,
            coeffs: [0; RS_MAX_POLY_DEGREE + 1],
        }
    }

    /// The constant polynomial `1`.
    pub fn one() -> Self {
        let mut p = Self::zero();
        p.coeffs[0] = 1;
        p
    }

    /// Builds a polynomial from coefficients in ascending order, reducing
    /// trailing zero coefficients.
    pub fn from_coeffs(coeffs: &[FieldElem]) -> Self {
        let mut p = Self::zero();
        p.degree = coeffs.len().saturating_sub(1);
        p.coeffs[..coeffs.len()].copy_from_slice(coeffs);
        p.reduce();
        p
    }

    /// Current degree. `0` for both the zero polynomial and any nonzero
    /// constant.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Coefficient of `x^i`, or `0` if `i` is above the current degree.
    pub fn coeff(&self, i: usize) -> FieldElem {
        self.coeffs.get(i).copied().unwrap_or(0)
    }

    /// Drops high-order zero coefficients. Invariant maintained by every
    /// other method in this module; exposed so callers building a
    /// `Polynomial` by hand (e.g. tests) can restore it.
    pub fn reduce(&mut self) {
        while self.degree > 0 && self.coeffs[self.degree] == 0 {
            self.degree -= 1;
        }
    }

    /// `self + other`.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let degree = self.degree.max(other.degree);
        let mut out = Polynomial::zero();
        out.degree = degree;
        for i in 0..=degree {
            out.coeffs[i] = field::add(self.coeff(i), other.coeff(i));
        }
        out.reduce();
        out
    }

    /// `self * other`. Schoolbook, `O(d(self) * d(other))`.
    ///
    /// # Errors
    /// [`PolyError::DegreeOverflow`] if `d(self) + d(other) > RS_MAX_POLY_DEGREE`.
    pub fn mul(&self, other: &Polynomial) -> Result<Polynomial, PolyError> {
        let degree = self.degree + other.degree;
        if degree > RS_MAX_POLY_DEGREE {
            return Err(PolyError::DegreeOverflow {
                lhs: self.degree,
                rhs: other.degree,
                max: RS_MAX_POLY_DEGREE,
            });
        }
        let mut out = Polynomial::zero();
        out.degree = degree;
        for i in 0..=self.degree {
            if self.coeffs[i] == 0 {
                continue;
            }
            for j in 0..=other.degree {
                out.coeffs[i + j] = field::add(out.coeffs[i + j], field::mul(self.coeffs[i], other.coeffs[j]));
            }
        }
        out.reduce();
        Ok(out)
    }

    /// `self` scaled by field element `a`.
    pub fn scale(&self, a: FieldElem) -> Polynomial {
        let mut out = *self;
        for i in 0..=out.degree {
            out.coeffs[i] = field::mul(out.coeffs[i], a);
        }
        out.reduce();
        out
    }

    /// Evaluates `self` at `x` via Horner's method, `O(degree)` field ops.
    pub fn evaluate(&self, x: FieldElem) -> FieldElem {
        let mut acc = self.coeffs[self.degree];
        for i in (0..self.degree).rev() {
            acc = field::add(self.coeffs[i], field::mul(acc, x));
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_evaluate(p: &Polynomial, x: FieldElem) -> FieldElem {
        let mut acc = 0;
        let mut power = 1;
        for i in 0..=p.degree() {
            acc = field::add(acc, field::mul(p.coeff(i), power));
            power = field::mul(power, x);
        }
        acc
    }

    #[test]
    fn evaluate_matches_direct_power_sum() {
        let p = Polynomial::from_coeffs(&[5, 0, 3, 7]);
        for x in 0..20 {
            assert_eq!(p.evaluate(x), direct_evaluate(&p, x));
        }
    }

    #[test]
    fn reduce_drops_trailing_zeros() {
        let p = Polynomial::from_coeffs(&[1, 2, 0, 0]);
        assert_eq!(p.degree(), 1);
    }

    #[test]
    fn add_is_aliasing_safe() {
        let p = Polynomial::from_coeffs(&[1, 2, 3]);
        let q = p.add(&p);
        assert_eq!(q.coeff(0), 2);
        assert_eq!(q.coeff(1), 4);
        assert_eq!(q.coeff(2), 6);
    }

    #[test]
    fn mul_is_aliasing_safe_and_matches_schoolbook() {
        let p = Polynomial::from_coeffs(&[1, 1]); // 1 + x
        let q = p.mul(&p).unwrap(); // (1+x)^2 = 1 + 2x + x^2
        assert_eq!(q.degree(), 2);
        assert_eq!(q.coeff(0), 1);
        assert_eq!(q.coeff(1), 2);
        assert_eq!(q.coeff(2), 1);
    }

    #[test]
    fn mul_rejects_degree_overflow() {
        let huge = Polynomial::from_coeffs(&vec![1; RS_MAX_POLY_DEGREE]);
        assert!(matches!(huge.mul(&huge), Err(PolyError::DegreeOverflow { .. })));
    }

    #[test]
    fn scale_multiplies_every_coefficient() {
        let p = Polynomial::from_coeffs(&[1, 2, 3]);
        let q = p.scale(5);
        assert_eq!(q.coeff(0), 5);
        assert_eq!(q.coeff(1), 10);
        assert_eq!(q.coeff(2), 15);
    }
}
