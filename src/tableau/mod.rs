//! The rational simplex tableau the engine pivots on.
//!
//! Every row stores a strictly positive denominator, a constant, the
//! coefficient of the big parameter M (meaningful only when the tableau
//! was created with one) and one coefficient per column. The value of the
//! row is `(cst + big_m * M + sum coeffs * col_values) / denom`, and the
//! sample value of a non-basic (column) variable is zero.
//!
//! Mutations push undo records so a snapshot can be rolled back to a
//! logically identical state; see [`undo`].

mod undo;

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use term_table::row::Row;
use term_table::table_cell::TableCell;
use term_table::Table;

use crate::error::Error;
use crate::math::seq;
use crate::math::Value;
use crate::polyhedra::BasicSet;
pub(crate) use undo::UndoOp;

/// Identity of the entity at a row or column: a structural variable or a
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Var(usize),
    Con(usize),
}

/// The sign a row's parametric constant can take over the live part of the
/// parameter domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSign {
    Unknown,
    Pos,
    Neg,
    Any,
}

/// Book-keeping shared by variables and constraints.
#[derive(Debug, Clone, Default)]
pub struct TabVar {
    pub is_row: bool,
    pub index: usize,
    pub is_nonneg: bool,
    pub is_zero: bool,
    pub is_redundant: bool,
    pub frozen: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct TabRow {
    pub denom: BigInt,
    pub cst: BigInt,
    pub big_m: BigInt,
    pub cols: Vec<BigInt>,
}

impl TabRow {
    fn zero(n_col: usize) -> TabRow {
        TabRow {
            denom: BigInt::one(),
            cst: BigInt::zero(),
            big_m: BigInt::zero(),
            cols: vec![BigInt::zero(); n_col],
        }
    }
}

#[derive(Debug)]
pub struct Tableau {
    pub(crate) rows: Vec<TabRow>,
    pub(crate) row_var: Vec<TabId>,
    pub(crate) col_var: Vec<TabId>,
    pub(crate) vars: Vec<TabVar>,
    pub(crate) cons: Vec<TabVar>,
    pub(crate) n_param: usize,
    pub(crate) n_div: usize,
    pub(crate) n_dead: usize,
    pub(crate) n_redundant: usize,
    pub(crate) n_eq: usize,
    pub(crate) big_param: bool,
    pub(crate) rational: bool,
    pub(crate) empty: bool,
    pub(crate) row_signs: Option<Vec<RowSign>>,
    /// Mirror of the constraints added through a context tableau, the
    /// object solution pieces are minted from.
    pub(crate) bset: Option<BasicSet>,
    /// Integer points of the context, rows `[1, vars...]`. The first
    /// `n_outside` rows have been evicted by a constraint.
    pub(crate) samples: Vec<Vec<BigInt>>,
    pub(crate) n_outside: usize,
    pub(crate) undo: Vec<UndoOp>,
}

impl Tableau {
    /// A tableau over `n_var` variables, all initially non-basic, with no
    /// constraints yet.
    pub fn new(n_var: usize, big_param: bool) -> Tableau {
        Tableau {
            rows: vec![],
            row_var: vec![],
            col_var: (0..n_var).map(TabId::Var).collect(),
            vars: (0..n_var)
                .map(|i| TabVar {
                    index: i,
                    ..TabVar::default()
                })
                .collect(),
            cons: vec![],
            n_param: 0,
            n_div: 0,
            n_dead: 0,
            n_redundant: 0,
            n_eq: 0,
            big_param,
            rational: false,
            empty: false,
            row_signs: None,
            bset: None,
            samples: vec![],
            n_outside: 0,
            undo: vec![],
        }
    }

    pub fn n_var(&self) -> usize {
        self.vars.len()
    }

    pub fn n_con(&self) -> usize {
        self.cons.len()
    }

    pub fn n_row(&self) -> usize {
        self.rows.len()
    }

    pub fn n_col(&self) -> usize {
        self.col_var.len()
    }

    pub fn is_empty_state(&self) -> bool {
        self.empty
    }

    pub fn var(&self, id: TabId) -> &TabVar {
        match id {
            TabId::Var(i) => &self.vars[i],
            TabId::Con(i) => &self.cons[i],
        }
    }

    pub fn var_mut(&mut self, id: TabId) -> &mut TabVar {
        match id {
            TabId::Var(i) => &mut self.vars[i],
            TabId::Con(i) => &mut self.cons[i],
        }
    }

    /// Capacity reservation; the undo machinery does not need it but the
    /// call sites keep the original allocation rhythm.
    pub fn extend_cons(&mut self, n: usize) {
        self.cons.reserve(n);
        self.rows.reserve(n);
    }

    /// Capacity reservation for additional variables.
    pub fn extend_vars(&mut self, n: usize) {
        self.vars.reserve(n);
        for row in &mut self.rows {
            row.cols.reserve(n);
        }
    }

    /// Allocate a fresh constraint with an all-zero row. Returns the
    /// constraint index.
    pub fn allocate_con(&mut self) -> usize {
        let con = self.cons.len();
        self.cons.push(TabVar {
            is_row: true,
            index: self.rows.len(),
            ..TabVar::default()
        });
        self.rows.push(TabRow::zero(self.n_col()));
        self.row_var.push(TabId::Con(con));
        if let Some(signs) = &mut self.row_signs {
            signs.push(RowSign::Unknown);
        }
        self.undo.push(UndoOp::Allocate(TabId::Con(con)));
        con
    }

    /// Allocate a fresh variable as a new trailing column. Returns the
    /// variable index.
    pub fn allocate_var(&mut self) -> usize {
        let v = self.vars.len();
        self.vars.push(TabVar {
            index: self.n_col(),
            ..TabVar::default()
        });
        self.col_var.push(TabId::Var(v));
        for row in &mut self.rows {
            row.cols.push(BigInt::zero());
        }
        self.undo.push(UndoOp::Allocate(TabId::Var(v)));
        v
    }

    /// Add the constraint `line[0] + sum line[1+i] * x_i` as a new row,
    /// substituting basic variables and accounting for the big parameter
    /// of the shifted variables. Returns the constraint index.
    pub fn add_row(&mut self, line: &[BigInt]) -> usize {
        debug_assert_eq!(line.len(), 1 + self.n_var());
        let con = self.allocate_con();
        let r = self.cons[con].index;

        let mut denom = BigInt::one();
        let mut cst = line[0].clone();
        let mut big_m = BigInt::zero();
        let mut cols = vec![BigInt::zero(); self.n_col()];
        for i in 0..self.n_var() {
            let c = line[1 + i].clone();
            if c.is_zero() || self.vars[i].is_zero {
                continue;
            }
            if self.vars[i].is_row {
                let vrow = self.rows[self.vars[i].index].clone();
                let l = denom.lcm(&vrow.denom);
                let f_self = &l / &denom;
                let f_other = (&l / &vrow.denom) * &c;
                if !f_self.is_one() {
                    cst *= &f_self;
                    big_m *= &f_self;
                    seq::scale(&mut cols, &f_self);
                }
                denom = l;
                cst += &f_other * &vrow.cst;
                big_m += &f_other * &vrow.big_m;
                for (dst, src) in cols.iter_mut().zip(vrow.cols.iter()) {
                    *dst += &f_other * src;
                }
            } else {
                cols[self.vars[i].index] += &c * &denom;
            }
            // A shifted variable stands for M + x, so its coefficient
            // contributes -c to the column of M.
            if self.big_param && i >= self.n_param && i < self.n_var() - self.n_div {
                big_m -= &c * &denom;
            }
        }
        self.rows[r] = TabRow {
            denom,
            cst,
            big_m,
            cols,
        };
        self.normalize_row(r);
        con
    }

    /// [`add_row`](Self::add_row) plus marking the constraint non-negative.
    pub fn add_ineq(&mut self, line: &[BigInt]) -> usize {
        let con = self.add_row(line);
        self.set_nonneg(TabId::Con(con));
        con
    }

    /// Mark the entity non-negative, recording the change for rollback.
    pub fn set_nonneg(&mut self, id: TabId) {
        if !self.var(id).is_nonneg {
            self.var_mut(id).is_nonneg = true;
            self.undo.push(UndoOp::Nonneg(id));
        }
    }

    pub(crate) fn normalize_row(&mut self, r: usize) {
        let row = &mut self.rows[r];
        let mut g = row.denom.gcd(&row.cst);
        if self.big_param {
            g = g.gcd(&row.big_m);
        }
        for c in &row.cols {
            if g.is_one() {
                return;
            }
            g = g.gcd(c);
        }
        if g.is_one() || g.is_zero() {
            return;
        }
        row.denom = &row.denom / &g;
        row.cst = &row.cst / &g;
        row.big_m = &row.big_m / &g;
        for c in row.cols.iter_mut() {
            *c = &*c / &g;
        }
    }

    /// Exchange the basic variable of `row` with the variable of `col`.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let a = self.rows[row].cols[col].clone();
        debug_assert!(!a.is_zero(), "pivoting on a zero entry");
        let s_pos = a.is_positive();
        let old = self.rows[row].clone();

        // Row for the entering variable, solved out of the old row.
        let mut pr = TabRow {
            denom: a.abs(),
            cst: if s_pos { -&old.cst } else { old.cst.clone() },
            big_m: if s_pos { -&old.big_m } else { old.big_m.clone() },
            cols: old
                .cols
                .iter()
                .map(|c| if s_pos { -c } else { c.clone() })
                .collect(),
        };
        pr.cols[col] = if s_pos { old.denom.clone() } else { -&old.denom };
        self.rows[row] = pr;
        self.normalize_row(row);
        self.set_row_sign(row, RowSign::Unknown);
        let pr = self.rows[row].clone();

        for i in 0..self.rows.len() {
            if i == row {
                continue;
            }
            let b = self.rows[i].cols[col].clone();
            if b.is_zero() {
                continue;
            }
            // The row changes, so a cached sign no longer applies.
            self.set_row_sign(i, RowSign::Unknown);
            let r = &mut self.rows[i];
            r.denom = &r.denom * &pr.denom;
            r.cst = &r.cst * &pr.denom + &b * &pr.cst;
            r.big_m = &r.big_m * &pr.denom + &b * &pr.big_m;
            for j in 0..r.cols.len() {
                if j == col {
                    r.cols[j] = &b * &pr.cols[j];
                } else {
                    r.cols[j] = &r.cols[j] * &pr.denom + &b * &pr.cols[j];
                }
            }
            self.normalize_row(i);
        }

        let r_id = self.row_var[row];
        let c_id = self.col_var[col];
        self.row_var[row] = c_id;
        self.col_var[col] = r_id;
        {
            let v = self.var_mut(c_id);
            v.is_row = true;
            v.index = row;
        }
        {
            let v = self.var_mut(r_id);
            v.is_row = false;
            v.index = col;
        }
    }

    pub(crate) fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        self.rows.swap(r1, r2);
        self.row_var.swap(r1, r2);
        if let Some(signs) = &mut self.row_signs {
            signs.swap(r1, r2);
        }
        let id1 = self.row_var[r1];
        let id2 = self.row_var[r2];
        self.var_mut(id1).index = r1;
        self.var_mut(id2).index = r2;
    }

    pub(crate) fn swap_cols(&mut self, c1: usize, c2: usize) {
        if c1 == c2 {
            return;
        }
        for row in &mut self.rows {
            row.cols.swap(c1, c2);
        }
        self.col_var.swap(c1, c2);
        let id1 = self.col_var[c1];
        let id2 = self.col_var[c2];
        self.var_mut(id1).index = c1;
        self.var_mut(id2).index = c2;
    }

    /// Remove a non-basic column whose variable is constrained to zero.
    pub fn kill_col(&mut self, col: usize) {
        let id = self.col_var[col];
        debug_assert!(!self.var(id).is_row);
        self.var_mut(id).is_zero = true;
        self.swap_cols(col, self.n_dead);
        self.n_dead += 1;
        self.undo.push(UndoOp::KillCol(id));
    }

    /// Whether the row is obviously implied by the non-negativity of what
    /// it combines: non-negative constant (and M coefficient) and only
    /// non-negative coefficients on non-negative constraint columns.
    pub fn row_is_redundant(&self, row: usize) -> bool {
        let id = self.row_var[row];
        if matches!(id, TabId::Con(_)) && !self.var(id).is_nonneg {
            return false;
        }
        let r = &self.rows[row];
        if r.cst.is_negative() {
            return false;
        }
        if self.big_param && r.big_m.is_negative() {
            return false;
        }
        for j in self.n_dead..self.n_col() {
            let e = &r.cols[j];
            if e.is_zero() {
                continue;
            }
            match self.col_var[j] {
                TabId::Var(_) => return false,
                TabId::Con(_) => {
                    if e.is_negative() || !self.var(self.col_var[j]).is_nonneg {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Move the row into the redundant zone; redundant rows are skipped by
    /// all scans but stay up to date under pivoting.
    pub fn mark_redundant(&mut self, row: usize) {
        debug_assert!(row >= self.n_redundant);
        let id = self.row_var[row];
        if matches!(id, TabId::Var(_)) && !self.var(id).is_nonneg {
            self.var_mut(id).is_nonneg = true;
            self.undo.push(UndoOp::Nonneg(id));
        }
        self.var_mut(id).is_redundant = true;
        self.swap_rows(row, self.n_redundant);
        self.undo.push(UndoOp::Redundant(id));
        self.n_redundant += 1;
    }

    /// Enter the terminal empty state. No further mutation is meaningful.
    pub fn mark_empty(&mut self) {
        if !self.empty {
            self.empty = true;
            self.undo.push(UndoOp::Empty);
        }
    }

    /// A token identifying the current undo-stack depth.
    pub fn snapshot(&self) -> usize {
        self.undo.len()
    }

    /// Record the current basis; rolling back past this point re-pivots
    /// until the recorded set of column variables is restored.
    pub fn push_basis(&mut self) {
        self.undo.push(UndoOp::SavedBasis(self.col_var.clone()));
    }

    pub(crate) fn push_undo(&mut self, op: UndoOp) {
        self.undo.push(op);
    }

    /// Evict the sample at index `s`; it no longer satisfies a live
    /// constraint. Reversible.
    pub fn drop_sample(&mut self, s: usize) {
        if s != self.n_outside {
            self.samples.swap(self.n_outside, s);
        }
        self.n_outside += 1;
        self.undo.push(UndoOp::DropSample);
    }

    /// Whether no variable sits at an infinite sample value: either there
    /// is no big parameter, or every variable is basic with an M
    /// coefficient equal to the row denominator.
    pub fn sample_is_finite(&self) -> bool {
        if !self.big_param {
            return true;
        }
        self.vars.iter().all(|v| {
            v.is_row && {
                let r = &self.rows[v.index];
                r.big_m == r.denom
            }
        })
    }

    /// The current sample as a rational vector over the variables,
    /// ignoring the big-parameter offset.
    pub fn sample_value(&self) -> Vec<Value> {
        self.vars
            .iter()
            .map(|v| {
                if v.is_row {
                    let r = &self.rows[v.index];
                    Value::from_frac(r.cst.clone(), r.denom.clone())
                } else {
                    Value::zero()
                }
            })
            .collect()
    }

    /// The current sample as an integer row `[1, vars...]`, for the sample
    /// cache. Fails if some coordinate is not integral.
    pub fn integer_sample(&self) -> Result<Vec<BigInt>, Error> {
        let mut out = Vec::with_capacity(1 + self.n_var());
        out.push(BigInt::one());
        for v in &self.vars {
            if v.is_row {
                let r = &self.rows[v.index];
                let (q, rem) = r.cst.div_mod_floor(&r.denom);
                if !rem.is_zero() {
                    return Err(Error::Internal("sample value is not integral"));
                }
                out.push(q);
            } else {
                out.push(BigInt::zero());
            }
        }
        Ok(out)
    }

    /// A copy sharing no state, with a fresh undo stack.
    pub fn duplicate(&self) -> Tableau {
        Tableau {
            rows: self.rows.clone(),
            row_var: self.row_var.clone(),
            col_var: self.col_var.clone(),
            vars: self.vars.clone(),
            cons: self.cons.clone(),
            n_param: self.n_param,
            n_div: self.n_div,
            n_dead: self.n_dead,
            n_redundant: self.n_redundant,
            n_eq: self.n_eq,
            big_param: self.big_param,
            rational: self.rational,
            empty: self.empty,
            row_signs: self.row_signs.clone(),
            bset: self.bset.clone(),
            samples: self.samples.clone(),
            n_outside: self.n_outside,
            undo: vec![],
        }
    }

    /// Drop the big-parameter column; only valid when every variable has
    /// been proven non-negative, so the shift is no longer needed.
    pub fn drop_big_param(&mut self) {
        self.big_param = false;
        for row in &mut self.rows {
            row.big_m = BigInt::zero();
        }
    }

    pub(crate) fn row_sign_of(&self, row: usize) -> RowSign {
        self.row_signs
            .as_ref()
            .map_or(RowSign::Unknown, |s| s[row])
    }

    pub(crate) fn set_row_sign(&mut self, row: usize, sign: RowSign) {
        if let Some(signs) = &mut self.row_signs {
            signs[row] = sign;
        }
    }

    fn id_label(&self, id: TabId) -> String {
        match id {
            TabId::Var(i) => format!("x{}", i),
            TabId::Con(i) => format!("c{}", i),
        }
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        let mut header = vec![TableCell::new(""), TableCell::new("den"), TableCell::new("1")];
        if self.big_param {
            header.push(TableCell::new("M"));
        }
        for id in &self.col_var {
            header.push(TableCell::new(self.id_label(*id)));
        }
        table.add_row(Row::new(header));
        for (r, row) in self.rows.iter().enumerate() {
            let mut cells = vec![
                TableCell::new(self.id_label(self.row_var[r])),
                TableCell::new(row.denom.to_string()),
                TableCell::new(row.cst.to_string()),
            ];
            if self.big_param {
                cells.push(TableCell::new(row.big_m.to_string()));
            }
            for c in &row.cols {
                cells.push(TableCell::new(c.to_string()));
            }
            table.add_row(Row::new(cells));
        }
        write!(f, "{}", table.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn add_row_stores_the_constraint() {
        let mut tab = Tableau::new(2, false);
        // 3 + x0 - 2 x1 >= 0
        let con = tab.add_row(&line(&[3, 1, -2]));
        let r = tab.cons[con].index;
        assert_eq!(tab.rows[r].denom, BigInt::from(1));
        assert_eq!(tab.rows[r].cst, BigInt::from(3));
        assert_eq!(tab.rows[r].cols, line(&[1, -2]));
    }

    #[test]
    fn add_row_substitutes_basic_variables() {
        let mut tab = Tableau::new(2, false);
        let c0 = tab.add_row(&line(&[1, 2, 0]));
        let r0 = tab.cons[c0].index;
        // Make x0 basic: x0 = (c0 - 1) / 2.
        let col = tab.vars[0].index;
        tab.pivot(r0, col);
        assert!(tab.vars[0].is_row);
        // x0 + x1 now expands through the row of x0.
        let c1 = tab.add_row(&line(&[0, 1, 1]));
        let r1 = tab.cons[c1].index;
        assert_eq!(tab.rows[r1].denom, BigInt::from(2));
        assert_eq!(tab.rows[r1].cst, BigInt::from(-1));
    }

    #[test]
    fn pivot_back_and_forth_is_identity() {
        let mut tab = Tableau::new(2, false);
        let con = tab.add_row(&line(&[5, 3, -7]));
        let r = tab.cons[con].index;
        let before = tab.rows[r].clone();
        let col = tab.vars[1].index;
        tab.pivot(r, col);
        assert!(!tab.cons[con].is_row);
        let row_back = tab.vars[1].index;
        let col_back = tab.cons[con].index;
        tab.pivot(row_back, col_back);
        assert!(tab.cons[con].is_row);
        let after = &tab.rows[tab.cons[con].index];
        assert_eq!(after.denom, before.denom);
        assert_eq!(after.cst, before.cst);
        assert_eq!(after.cols, before.cols);
    }

    #[test]
    fn rollback_drops_constraints_and_flags() {
        let mut tab = Tableau::new(2, false);
        tab.add_row(&line(&[1, 1, 0]));
        let snap = tab.snapshot();
        tab.push_basis();
        let con = tab.add_ineq(&line(&[4, 0, 1]));
        tab.mark_empty();
        assert!(tab.empty);
        assert_eq!(tab.n_con(), 2);
        let _ = con;
        tab.rollback(snap).unwrap();
        assert!(!tab.empty);
        assert_eq!(tab.n_con(), 1);
        assert_eq!(tab.n_row(), 1);
    }

    #[test]
    fn rollback_restores_the_basis() {
        let mut tab = Tableau::new(1, false);
        let c0 = tab.add_row(&line(&[2, 1]));
        let snap = tab.snapshot();
        tab.push_basis();
        let r0 = tab.cons[c0].index;
        tab.pivot(r0, tab.vars[0].index);
        assert!(tab.vars[0].is_row);
        tab.rollback(snap).unwrap();
        assert!(!tab.vars[0].is_row);
        let r = tab.cons[c0].index;
        assert_eq!(tab.rows[r].cst, BigInt::from(2));
    }
}
