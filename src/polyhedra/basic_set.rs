use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use super::simplify;
use crate::math::seq;

/// A conjunction of linear equalities and inequalities over `dim`
/// variables and a number of existentially quantified integer divisions.
///
/// Constraint rows are stored densely as `[cst, coeffs...]` with the div
/// coefficients trailing, so a row has `1 + dim + n_div` entries and the
/// constraint reads `cst + coeffs · vars (>=|=) 0`. A div definition is
/// `[denom, cst, coeffs...]`; the div equals `floor((cst + coeffs·vars) /
/// denom)` and a zero denominator marks a placeholder whose value is
/// unconstrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicSet {
    dim: usize,
    divs: Vec<Vec<BigInt>>,
    eqs: Vec<Vec<BigInt>>,
    ineqs: Vec<Vec<BigInt>>,
    empty: bool,
}

impl BasicSet {
    /// The universe set over `dim` variables.
    pub fn universe(dim: usize) -> BasicSet {
        BasicSet {
            dim,
            divs: vec![],
            eqs: vec![],
            ineqs: vec![],
            empty: false,
        }
    }

    /// Number of set variables, excluding divs.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of set variables plus divs.
    pub fn total_dim(&self) -> usize {
        self.dim + self.divs.len()
    }

    pub fn n_div(&self) -> usize {
        self.divs.len()
    }

    pub fn divs(&self) -> &[Vec<BigInt>] {
        &self.divs
    }

    pub fn eqs(&self) -> &[Vec<BigInt>] {
        &self.eqs
    }

    pub fn ineqs(&self) -> &[Vec<BigInt>] {
        &self.ineqs
    }

    fn width(&self) -> usize {
        1 + self.total_dim()
    }

    fn pad(&self, mut row: Vec<BigInt>) -> Vec<BigInt> {
        assert!(row.len() <= self.width(), "constraint has too many coefficients");
        row.resize(self.width(), BigInt::zero());
        row
    }

    /// Add `cst + coeffs · vars = 0`; missing trailing coefficients are zero.
    pub fn add_equality(&mut self, row: Vec<BigInt>) {
        let row = self.pad(row);
        self.eqs.push(row);
    }

    /// Add `cst + coeffs · vars >= 0`; missing trailing coefficients are zero.
    pub fn add_inequality(&mut self, row: Vec<BigInt>) {
        let row = self.pad(row);
        self.ineqs.push(row);
    }

    /// Convenience for tests and builders.
    pub fn add_equality_i64(&mut self, row: &[i64]) {
        self.add_equality(row.iter().map(|&x| BigInt::from(x)).collect());
    }

    /// Convenience for tests and builders.
    pub fn add_inequality_i64(&mut self, row: &[i64]) {
        self.add_inequality(row.iter().map(|&x| BigInt::from(x)).collect());
    }

    /// Append a div defined by `row = [denom, cst, coeffs...]` (over the
    /// current total dimension), widening every stored row with a zero
    /// column. Returns the new div's index.
    pub fn alloc_div(&mut self, mut row: Vec<BigInt>) -> usize {
        let old_width = 1 + self.width();
        assert!(row.len() <= old_width, "div body has too many coefficients");
        row.resize(old_width, BigInt::zero());
        for c in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
            c.push(BigInt::zero());
        }
        for d in self.divs.iter_mut() {
            d.push(BigInt::zero());
        }
        row.push(BigInt::zero());
        self.divs.push(row);
        self.divs.len() - 1
    }

    /// Drop the youngest div together with its column. Only used to
    /// reverse an [`alloc_div`](Self::alloc_div).
    pub fn drop_last_div(&mut self) {
        self.divs.pop();
        for c in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
            c.pop();
        }
        for d in self.divs.iter_mut() {
            d.pop();
        }
    }

    pub fn drop_last_equality(&mut self) {
        self.eqs.pop();
    }

    pub fn drop_last_inequality(&mut self) {
        self.ineqs.pop();
    }

    pub fn swap_div(&mut self, a: usize, b: usize) {
        simplify::swap_divs(
            self.dim,
            &mut self.divs,
            &mut self.eqs,
            &mut self.ineqs,
            a,
            b,
        );
    }

    /// Reorder the divs so each one references only earlier divs.
    pub fn order_divs(&mut self) {
        simplify::order_divs(self.dim, &mut self.divs, &mut self.eqs, &mut self.ineqs);
    }

    /// The inequality `e - m*d >= 0` implied by div `d = floor(e/m)`.
    pub fn ineq_for_div(&self, div: usize) -> Vec<BigInt> {
        let mut ineq: Vec<BigInt> = self.divs[div][1..].to_vec();
        ineq[1 + self.dim + div] = -self.divs[div][0].clone();
        ineq
    }

    /// Materialize the two defining inequalities of every known div into
    /// the constraint list, skipping ones already present:
    ///
    ///   e - m*d >= 0
    ///   -e + m*d + m - 1 >= 0
    pub fn known_div_constraints(&mut self) {
        for div in 0..self.divs.len() {
            if self.divs[div][0].is_zero() {
                continue;
            }
            let lower = self.ineq_for_div(div);
            let mut upper: Vec<BigInt> = lower.clone();
            seq::neg(&mut upper);
            upper[0] += &self.divs[div][0] - BigInt::one();
            for ineq in [lower, upper] {
                if !self.ineqs.iter().any(|c| *c == ineq) {
                    self.ineqs.push(ineq);
                }
            }
        }
    }

    /// Gaussian elimination of the equalities.
    pub fn gauss(&mut self) {
        if simplify::gauss(self.dim, &mut self.divs, &mut self.eqs, &mut self.ineqs) {
            self.mark_empty();
        }
    }

    /// Divide constraints by the gcd of their coefficients, flooring
    /// inequality constants and detecting unsatisfiable equalities.
    pub fn normalize_constraints(&mut self) {
        if simplify::normalize_constraints(&mut self.eqs, &mut self.ineqs) {
            self.mark_empty();
        }
    }

    /// Gauss, normalize and drop duplicate inequalities.
    pub fn simplify(&mut self) {
        self.gauss();
        self.normalize_constraints();
        let mut seen: Vec<Vec<BigInt>> = Vec::with_capacity(self.ineqs.len());
        self.ineqs.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(c.clone());
                true
            }
        });
    }

    /// No-op beyond sealing the set; kept for symmetry with the printer
    /// and the map type.
    pub fn finalize(&mut self) {}

    pub fn mark_empty(&mut self) {
        self.empty = true;
        self.eqs.clear();
        self.ineqs.clear();
        self.divs.clear();
    }

    /// Whether the set is syntactically known to be empty. No solving is
    /// performed.
    pub fn fast_is_empty(&self) -> bool {
        if self.empty {
            return true;
        }
        self.ineqs
            .iter()
            .any(|c| seq::first_non_zero(&c[1..]).is_none() && c[0].is_negative())
            || self
                .eqs
                .iter()
                .any(|c| seq::first_non_zero(&c[1..]).is_none() && !c[0].is_zero())
    }

    /// Evaluate one constraint row at an integer point `[1, vars...]`.
    pub fn eval_row(row: &[BigInt], point: &[BigInt]) -> BigInt {
        seq::inner_product(row, point)
    }

    /// Extend an integer point over the set dimensions with the values of
    /// all divs, in order. `None` when a placeholder div is present.
    pub fn extend_with_divs(&self, dims: &[BigInt]) -> Option<Vec<BigInt>> {
        assert_eq!(dims.len(), self.dim);
        let mut point = Vec::with_capacity(1 + self.total_dim());
        point.push(BigInt::one());
        point.extend_from_slice(dims);
        for div in &self.divs {
            if div[0].is_zero() {
                return None;
            }
            let e = seq::inner_product(&div[1..], &point);
            point.push(num_integer::Integer::div_floor(&e, &div[0]));
        }
        point.remove(0);
        Some(point)
    }

    /// Whether the integer point over the set dimensions lies in the set,
    /// with div values computed from their definitions.
    pub fn contains_point(&self, dims: &[BigInt]) -> bool {
        match self.extend_with_divs(dims) {
            Some(full) => self.contains(&full),
            None => false,
        }
    }

    /// Whether the integer point `vars` (with div values included) lies in
    /// the set.
    pub fn contains(&self, vars: &[BigInt]) -> bool {
        if self.empty {
            return false;
        }
        let mut point = Vec::with_capacity(1 + vars.len());
        point.push(BigInt::one());
        point.extend_from_slice(vars);
        self.eqs.iter().all(|c| Self::eval_row(c, &point).is_zero())
            && self
                .ineqs
                .iter()
                .all(|c| !Self::eval_row(c, &point).is_negative())
    }
}

pub(crate) fn format_term(
    f: &mut fmt::Formatter<'_>,
    coeff: &BigInt,
    name: &str,
    first: &mut bool,
) -> fmt::Result {
    if coeff.is_zero() {
        return Ok(());
    }
    if *first {
        *first = false;
        if *coeff == BigInt::one() {
            return write!(f, "{}", name);
        }
        if *coeff == -BigInt::one() {
            return write!(f, "-{}", name);
        }
        return write!(f, "{}{}", coeff, name);
    }
    if coeff.is_negative() {
        if *coeff == -BigInt::one() {
            write!(f, " - {}", name)
        } else {
            write!(f, " - {}{}", -coeff, name)
        }
    } else if *coeff == BigInt::one() {
        write!(f, " + {}", name)
    } else {
        write!(f, " + {}{}", coeff, name)
    }
}

pub(crate) fn format_row(
    f: &mut fmt::Formatter<'_>,
    row: &[BigInt],
    names: &[String],
    rel: &str,
) -> fmt::Result {
    let mut first = true;
    for (coeff, name) in row[1..].iter().zip(names.iter()) {
        format_term(f, coeff, name, &mut first)?;
    }
    if first {
        write!(f, "0")?;
    }
    if !row[0].is_zero() {
        if row[0].is_negative() {
            write!(f, " - {}", -&row[0])?;
        } else {
            write!(f, " + {}", row[0])?;
        }
    }
    write!(f, " {} 0", rel)
}

pub(crate) fn div_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("e{}", i)).collect()
}

impl fmt::Display for BasicSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = (0..self.dim).map(|i| format!("p{}", i)).collect();
        names.extend(div_names(self.divs.len()));
        write!(f, "{{ [")?;
        for i in 0..self.dim {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", names[i])?;
        }
        write!(f, "]")?;
        if self.empty {
            return write!(f, " : false }}");
        }
        let mut sep = " : ";
        for (d, div) in self.divs.iter().enumerate() {
            if div[0].is_zero() {
                continue;
            }
            write!(f, "{}{} = floor((", sep, names[self.dim + d])?;
            let mut first = true;
            for (coeff, name) in div[2..].iter().zip(names.iter()) {
                format_term(f, coeff, name, &mut first)?;
            }
            if first {
                write!(f, "{}", div[1])?;
            } else if !div[1].is_zero() {
                write!(f, " + {}", div[1])?;
            }
            write!(f, ")/{})", div[0])?;
            sep = " and ";
        }
        for eq in &self.eqs {
            write!(f, "{}", sep)?;
            format_row(f, eq, &names, "=")?;
            sep = " and ";
        }
        for ineq in &self.ineqs {
            write!(f, "{}", sep)?;
            format_row(f, ineq, &names, ">=")?;
            sep = " and ";
        }
        write!(f, " }}")
    }
}
