use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use super::basic_set::{div_names, format_row, format_term};
use super::simplify;
use super::BasicSet;
use crate::math::seq;

/// A basic relation between input and output tuples, parametrized by a
/// tuple of parameters, as a conjunction of linear constraints.
///
/// Constraint rows are `[cst, params..., ins..., outs..., divs...]`; div
/// definitions are `[denom, cst, ...same columns...]` with a zero
/// denominator marking a placeholder div. A map flagged `rational` asks
/// the solver for the rational rather than the integer optimum.
///
/// # Example
/// ```rust
/// use parlex::BasicMap;
///
/// // One parameter p, no inputs, one output x, constrained by x >= p.
/// let mut rel = BasicMap::new(1, 0, 1);
/// rel.add_inequality_i64(&[0, -1, 1]);
/// assert!(!rel.fast_is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicMap {
    n_param: usize,
    n_in: usize,
    n_out: usize,
    divs: Vec<Vec<BigInt>>,
    eqs: Vec<Vec<BigInt>>,
    ineqs: Vec<Vec<BigInt>>,
    rational: bool,
    empty: bool,
}

impl BasicMap {
    /// The universe relation with the given dimensions and no constraints.
    pub fn new(n_param: usize, n_in: usize, n_out: usize) -> BasicMap {
        BasicMap {
            n_param,
            n_in,
            n_out,
            divs: vec![],
            eqs: vec![],
            ineqs: vec![],
            rational: false,
            empty: false,
        }
    }

    pub fn n_param(&self) -> usize {
        self.n_param
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    pub fn n_div(&self) -> usize {
        self.divs.len()
    }

    /// Parameters, inputs and outputs, excluding divs.
    pub fn dim(&self) -> usize {
        self.n_param + self.n_in + self.n_out
    }

    /// All variables a constraint row ranges over, divs included.
    pub fn total_dim(&self) -> usize {
        self.dim() + self.divs.len()
    }

    /// The dimensions a compatible domain set ranges over.
    pub fn domain_dim(&self) -> usize {
        self.n_param + self.n_in
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

    pub fn is_rational(&self) -> bool {
        self.rational
    }

    /// Ask for the rational optimum instead of the integer one.
    pub fn set_rational(&mut self) {
        self.rational = true;
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

    /// Append a div defined by `row = [denom, cst, coeffs...]` over the
    /// current total dimension; a zero denominator (or an empty row) makes
    /// it a placeholder. Returns the new div's index.
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

    pub fn swap_div(&mut self, a: usize, b: usize) {
        simplify::swap_divs(
            self.dim(),
            &mut self.divs,
            &mut self.eqs,
            &mut self.ineqs,
            a,
            b,
        );
    }

    pub fn order_divs(&mut self) {
        simplify::order_divs(self.dim(), &mut self.divs, &mut self.eqs, &mut self.ineqs);
    }

    /// Promote opposite inequality pairs to explicit equalities. The
    /// parametric engine is sensitive to implicit equalities, so this runs
    /// before every solve.
    pub fn detect_equalities(&mut self) {
        if simplify::detect_equalities(&mut self.eqs, &mut self.ineqs) {
            self.mark_empty();
        }
    }

    pub fn gauss(&mut self) {
        if simplify::gauss(self.dim(), &mut self.divs, &mut self.eqs, &mut self.ineqs) {
            self.mark_empty();
        }
    }

    pub fn normalize_constraints(&mut self) {
        if simplify::normalize_constraints(&mut self.eqs, &mut self.ineqs) {
            self.mark_empty();
        }
    }

    /// Seal the map after construction; currently gauss + normalization.
    pub fn finalize(&mut self) {
        self.gauss();
        self.normalize_constraints();
    }

    pub fn mark_empty(&mut self) {
        self.empty = true;
        self.eqs.clear();
        self.ineqs.clear();
        self.divs.clear();
    }

    /// Whether the relation is syntactically known to be empty.
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

    /// Whether `dom` ranges over exactly the parameters and input
    /// dimensions of this relation.
    pub fn compatible_domain(&self, dom: &BasicSet) -> bool {
        dom.dim() == self.domain_dim()
    }

    /// Check if div `div` of `dom` also occurs among our divs: same
    /// denominator, same coefficients over the domain dimensions, and no
    /// reference to further dimensions or divs on either side.
    fn find_context_div(&self, dom: &BasicSet, div: usize) -> Option<usize> {
        let d_dim = dom.dim();
        let dom_div = &dom.divs()[div];
        if dom_div[0].is_zero() {
            return None;
        }
        if seq::first_non_zero(&dom_div[2 + d_dim..]).is_some() {
            return None;
        }
        let b_dim = self.dim();
        for (i, cand) in self.divs.iter().enumerate() {
            if cand[0].is_zero() {
                continue;
            }
            if seq::first_non_zero(&cand[2 + d_dim..2 + b_dim + self.divs.len()]).is_some() {
                continue;
            }
            if cand[..2 + d_dim] == dom_div[..2 + d_dim] {
                return Some(i);
            }
        }
        None
    }

    /// Line up our divs with the divs of the domain: each div of `dom`
    /// must appear in this relation, in the same order, after all the divs
    /// of the relation that do not occur in `dom`. Missing ones get a
    /// placeholder slot.
    pub fn align_divs_with(&mut self, dom: &BasicSet) {
        let common = (0..dom.n_div())
            .filter(|&i| self.find_context_div(dom, i).is_some())
            .count();
        let other = self.divs.len() - common;
        for i in 0..dom.n_div() {
            let pos = match self.find_context_div(dom, i) {
                Some(pos) => pos,
                None => self.alloc_div(vec![]),
            };
            if pos != other + i {
                self.swap_div(pos, other + i);
            }
        }
    }

    /// Extend an integer point over parameters, inputs and outputs with
    /// the values of all divs, in order. `None` when a placeholder div is
    /// present.
    pub fn extend_with_divs(&self, dims: &[BigInt]) -> Option<Vec<BigInt>> {
        assert_eq!(dims.len(), self.dim());
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

    /// Whether the integer point over parameters, inputs and outputs lies
    /// in the relation, with div values computed from their definitions.
    pub fn contains_point(&self, dims: &[BigInt]) -> bool {
        match self.extend_with_divs(dims) {
            Some(full) => self.contains(&full),
            None => false,
        }
    }

    /// Whether the integer point `vars` (with div values included) lies in
    /// the relation.
    pub fn contains(&self, vars: &[BigInt]) -> bool {
        if self.empty {
            return false;
        }
        let mut point = Vec::with_capacity(1 + vars.len());
        point.push(BigInt::one());
        point.extend_from_slice(vars);
        self.eqs
            .iter()
            .all(|c| seq::inner_product(c, &point).is_zero())
            && self
                .ineqs
                .iter()
                .all(|c| !seq::inner_product(c, &point).is_negative())
    }
}

impl fmt::Display for BasicMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = (0..self.n_param).map(|i| format!("p{}", i)).collect();
        names.extend((0..self.n_in).map(|i| format!("i{}", i)));
        names.extend((0..self.n_out).map(|i| format!("o{}", i)));
        names.extend(div_names(self.divs.len()));
        write!(f, "{{ [")?;
        for i in 0..self.n_param + self.n_in {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", names[i])?;
        }
        write!(f, "] -> [")?;
        for i in 0..self.n_out {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", names[self.n_param + self.n_in + i])?;
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
            write!(f, "{}{} = floor((", sep, names[self.dim() + d])?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_divs_places_domain_divs_last() {
        // Domain over one parameter with div e0 = floor(p/2).
        let mut dom = BasicSet::universe(1);
        dom.alloc_div(vec![2.into(), 0.into(), 1.into()]);

        // Relation with its own unrelated div and a copy of the domain div.
        let mut rel = BasicMap::new(1, 0, 1);
        rel.alloc_div(vec![2.into(), 0.into(), 1.into(), 0.into()]);
        rel.alloc_div(vec![3.into(), 1.into(), 0.into(), 1.into()]);

        rel.align_divs_with(&dom);
        assert_eq!(rel.n_div(), 2);
        // The domain div must sit in the trailing slot.
        assert_eq!(rel.divs()[1][0], BigInt::from(2));
        assert_eq!(rel.divs()[1][2], BigInt::from(1));
    }

    #[test]
    fn align_divs_allocates_placeholders() {
        let mut dom = BasicSet::universe(1);
        dom.alloc_div(vec![2.into(), 0.into(), 1.into()]);

        let mut rel = BasicMap::new(1, 0, 1);
        rel.align_divs_with(&dom);
        assert_eq!(rel.n_div(), 1);
        assert!(rel.divs()[0][0].is_zero());
    }

    #[test]
    fn display_names_all_dimension_kinds() {
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, -1, 1]);
        assert_eq!(format!("{}", rel), "{ [p0] -> [o0] : -p0 + o0 >= 0 }");
    }
}
