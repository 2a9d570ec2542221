//! Solution accumulators: the sinks a solved leaf of the parameter tree is
//! handed to. Both own the context tableau; the map sink collects basic
//! maps (and optionally the domain pieces with no solution), the visitor
//! sink calls back with each (piece, affine map) pair as it is found.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;
use serde::Serialize;

use crate::error::Error;
use crate::math::Value;
use crate::polyhedra::{BasicMap, BasicSet};
use crate::tableau::Tableau;

/// A dense matrix of exact rationals, the affine output map handed to the
/// [`foreach_lexopt`](crate::foreach_lexopt) visitor. Row 0 is
/// `(1, 0, ..., 0)`; row `1 + i` holds the affine expression of output `i`
/// over `(1, params..., divs...)`.
#[derive(Debug, Clone, Serialize)]
pub struct Matrix {
    rows: Vec<Vec<Value>>,
}

impl Matrix {
    pub(crate) fn from_rows(rows: Vec<Vec<Value>>) -> Matrix {
        Matrix { rows }
    }

    pub fn n_row(&self) -> usize {
        self.rows.len()
    }

    pub fn n_col(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn at(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

pub(crate) enum Sink<'a> {
    Pieces {
        pieces: Vec<BasicMap>,
        empty: Option<Vec<BasicSet>>,
    },
    Visit(&'a mut dyn FnMut(BasicSet, Matrix) -> Result<(), Error>),
}

/// The accumulator driven by `find_solutions`: the context tableau plus
/// the sink the leaves go to.
pub(crate) struct Sol<'a> {
    pub(crate) context: Tableau,
    pub(crate) sink: Sink<'a>,
    pub(crate) max: bool,
    pub(crate) n_param: usize,
    pub(crate) n_in: usize,
    pub(crate) n_out: usize,
}

impl<'a> Sol<'a> {
    /// Record the leaf described by the main tableau over the current
    /// state of the context.
    pub(crate) fn add(&mut self, tab: &Tableau) -> Result<(), Error> {
        if tab.is_empty_state() {
            return self.add_empty_piece();
        }
        if matches!(self.sink, Sink::Visit(_)) {
            return self.visit_piece(tab);
        }
        let piece = self.build_piece(tab)?;
        if let Sink::Pieces { pieces, .. } = &mut self.sink {
            pieces.push(piece);
        }
        Ok(())
    }

    /// Record the current context as a piece with no solution, when the
    /// sink tracks those.
    pub(crate) fn add_empty_piece(&mut self) -> Result<(), Error> {
        let Sink::Pieces {
            empty: Some(empty), ..
        } = &mut self.sink
        else {
            return Ok(());
        };
        let mut bset = self
            .context
            .bset
            .clone()
            .ok_or(Error::Internal("context has no mirrored set"))?;
        bset.simplify();
        bset.finalize();
        if !bset.fast_is_empty() {
            empty.push(bset);
        }
        Ok(())
    }

    /// Build the basic map of a solved leaf: the context's divs and
    /// constraints (with zero coefficients on the outputs) plus one
    /// equality per output variable read off its tableau row,
    /// `cst + sum a_j y_j -+ denom * x_i = 0`.
    fn build_piece(&self, tab: &Tableau) -> Result<BasicMap, Error> {
        let ctx_bset = self
            .context
            .bset
            .as_ref()
            .ok_or(Error::Internal("context has no mirrored set"))?;
        let total = self.n_param + self.n_in + self.n_out;
        let nparam_tab = tab.n_param;
        let n_div = tab.n_div;
        debug_assert_eq!(nparam_tab, self.n_param + self.n_in);
        debug_assert_eq!(n_div, ctx_bset.n_div());

        let mut bmap = BasicMap::new(self.n_param, self.n_in, self.n_out);
        if tab.rational {
            bmap.set_rational();
        }
        for i in 0..n_div {
            let src = &ctx_bset.divs()[i];
            let mut row = Vec::with_capacity(2 + total + i);
            row.push(src[0].clone());
            row.push(src[1].clone());
            row.extend(src[2..2 + nparam_tab].iter().cloned());
            row.extend(std::iter::repeat(BigInt::zero()).take(self.n_out));
            row.extend(src[2 + nparam_tab..2 + nparam_tab + i].iter().cloned());
            bmap.alloc_div(row);
        }
        for eq in ctx_bset.eqs() {
            bmap.add_equality(widen_context_row(eq, nparam_tab, self.n_out));
        }
        for ineq in ctx_bset.ineqs() {
            bmap.add_inequality(widen_context_row(ineq, nparam_tab, self.n_out));
        }
        for k in 0..self.n_out {
            let i = nparam_tab + k;
            if !tab.vars[i].is_row {
                return Err(Error::InvalidArgument(
                    "output variable is unbounded over the domain",
                ));
            }
            let r = tab.vars[i].index;
            let row = &tab.rows[r];
            if tab.big_param && row.big_m != row.denom {
                return Err(Error::Internal("optimum depends on the big parameter"));
            }
            let mut eq = vec![BigInt::zero(); 1 + total + n_div];
            eq[0] = row.cst.clone();
            for j in 0..nparam_tab {
                if !tab.vars[j].is_row {
                    eq[1 + j] = row.cols[tab.vars[j].index].clone();
                }
            }
            for j in 0..n_div {
                let vj = tab.n_var() - n_div + j;
                if !tab.vars[vj].is_row {
                    eq[1 + total + j] = row.cols[tab.vars[vj].index].clone();
                }
            }
            eq[1 + nparam_tab + k] = if self.max {
                row.denom.clone()
            } else {
                -row.denom.clone()
            };
            bmap.add_equality(eq);
        }
        bmap.finalize();
        Ok(bmap)
    }

    /// Hand the raw context set and the affine output matrix to the
    /// visitor. The set is not simplified: the matrix columns refer to its
    /// divs, and simplification could reorder or drop them. An output that
    /// ended up non-basic keeps an all-zero matrix row.
    fn visit_piece(&mut self, tab: &Tableau) -> Result<(), Error> {
        let ncol = 1 + tab.n_param + tab.n_div;
        let mut rows = Vec::with_capacity(1 + self.n_out);
        let mut first = vec![Value::zero(); ncol];
        first[0] = Value::one();
        rows.push(first);
        for k in 0..self.n_out {
            let i = tab.n_param + k;
            let mut row = vec![Value::zero(); ncol];
            if tab.vars[i].is_row {
                let r = tab.vars[i].index;
                let tr = &tab.rows[r];
                if tab.big_param && tr.big_m != tr.denom {
                    return Err(Error::Internal("optimum depends on the big parameter"));
                }
                row[0] = Value::from_frac(tr.cst.clone(), tr.denom.clone());
                for j in 0..tab.n_param {
                    if !tab.vars[j].is_row {
                        row[1 + j] =
                            Value::from_frac(tr.cols[tab.vars[j].index].clone(), tr.denom.clone());
                    }
                }
                for j in 0..tab.n_div {
                    let vj = tab.n_var() - tab.n_div + j;
                    if !tab.vars[vj].is_row {
                        row[1 + tab.n_param + j] =
                            Value::from_frac(tr.cols[tab.vars[vj].index].clone(), tr.denom.clone());
                    }
                }
                if self.max {
                    for v in row.iter_mut() {
                        *v = -v.clone();
                    }
                }
            }
            rows.push(row);
        }
        let mut bset = self
            .context
            .bset
            .clone()
            .ok_or(Error::Internal("context has no mirrored set"))?;
        bset.finalize();
        let mat = Matrix::from_rows(rows);
        match &mut self.sink {
            Sink::Visit(f) => f(bset, mat),
            _ => Err(Error::Internal("visitor sink expected")),
        }
    }

    pub(crate) fn into_map_result(self) -> (Vec<BasicMap>, Option<Vec<BasicSet>>) {
        match self.sink {
            Sink::Pieces { pieces, empty } => (pieces, empty),
            Sink::Visit(_) => (vec![], None),
        }
    }
}

fn widen_context_row(row: &[BigInt], nparam_tab: usize, n_out: usize) -> Vec<BigInt> {
    let mut out = Vec::with_capacity(row.len() + n_out);
    out.extend(row[..1 + nparam_tab].iter().cloned());
    out.extend(std::iter::repeat(BigInt::zero()).take(n_out));
    out.extend(row[1 + nparam_tab..].iter().cloned());
    out
}
