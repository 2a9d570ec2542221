//! The lexicographic dual-simplex engine.
//!
//! Feasibility is restored by always pivoting the violated row itself,
//! choosing the column that induces the lexicographically smallest
//! increment of the sample point. Starting from a sample that is
//! lexicographically below every point of the problem space (courtesy of
//! the big-parameter shift `x' = M + x`), the first feasible sample found
//! this way is the lexicographic minimum.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::Error;
use crate::math::seq;
use crate::tableau::{RowSign, TabId, TabRow, Tableau};

pub(crate) const I_CST: u8 = 1 << 0;
pub(crate) const I_PAR: u8 = 1 << 1;
pub(crate) const I_VAR: u8 = 1 << 2;

/// The "parametric constant" of a row: its constant term and the
/// coefficients of the context variables (parameters first, then divs).
/// The big-parameter coefficient is not part of it. Parameters that are
/// basic contribute zero.
pub(crate) fn get_row_parameter_line(tab: &Tableau, row: usize) -> Vec<BigInt> {
    let mut line = Vec::with_capacity(1 + tab.n_param + tab.n_div);
    line.push(tab.rows[row].cst.clone());
    for i in 0..tab.n_param {
        if tab.vars[i].is_row {
            line.push(BigInt::zero());
        } else {
            line.push(tab.rows[row].cols[tab.vars[i].index].clone());
        }
    }
    for i in 0..tab.n_div {
        let v = tab.n_var() - tab.n_div + i;
        if tab.vars[v].is_row {
            line.push(BigInt::zero());
        } else {
            line.push(tab.rows[row].cols[tab.vars[v].index].clone());
        }
    }
    line
}

/// Whether two rows have the same parametric constant. The coefficients of
/// the big parameter have to agree as well, otherwise the actual constants
/// differ.
pub(crate) fn identical_parameter_line(tab: &Tableau, row1: usize, row2: usize) -> bool {
    if tab.rows[row1].cst != tab.rows[row2].cst {
        return false;
    }
    if tab.big_param && tab.rows[row1].big_m != tab.rows[row2].big_m {
        return false;
    }
    for i in 0..tab.n_param + tab.n_div {
        let pos = if i < tab.n_param {
            i
        } else {
            tab.n_var() - tab.n_div + (i - tab.n_param)
        };
        if tab.vars[pos].is_row {
            continue;
        }
        let col = tab.vars[pos].index;
        if tab.rows[row1].cols[col] != tab.rows[row2].cols[col] {
            return false;
        }
    }
    true
}

/// The inequality stating that the parametric constant of the row is
/// non-negative, normalized. Only meaningful when the row's big-parameter
/// coefficient is zero.
pub(crate) fn get_row_parameter_ineq(tab: &Tableau, row: usize) -> Vec<BigInt> {
    let mut ineq = get_row_parameter_line(tab, row);
    seq::normalize(&mut ineq);
    ineq
}

/// The integer division `floor((sum (-a_i mod m) y_i) / m)` used by a
/// parametric cut on the given row, as `[m, cst, coeffs...]`.
pub(crate) fn get_row_parameter_div(tab: &Tableau, row: usize) -> Vec<BigInt> {
    let mut div = Vec::with_capacity(2 + tab.n_param + tab.n_div);
    div.push(tab.rows[row].denom.clone());
    div.extend(get_row_parameter_line(tab, row));
    seq::normalize(&mut div);
    let m = div[0].clone();
    seq::neg(&mut div[1..]);
    seq::fdiv_r_assign(&mut div[1..], &m);
    div
}

/// The integer division `floor((sum (a_i mod m) y_i) / m)` used when
/// transferring an integrality constraint to the context.
pub(crate) fn get_row_split_div(tab: &Tableau, row: usize) -> Vec<BigInt> {
    let mut div = Vec::with_capacity(2 + tab.n_param + tab.n_div);
    div.push(tab.rows[row].denom.clone());
    div.extend(get_row_parameter_line(tab, row));
    seq::normalize(&mut div);
    let m = div[0].clone();
    seq::fdiv_r_assign(&mut div[1..], &m);
    div
}

/// Whether the parametric constant is negative for every admissible
/// parameter value, judged without consulting the context: by the sign of
/// the big-parameter coefficient if there is one, else by the constant
/// and the signs of the coefficients of proven-non-negative parameters.
pub(crate) fn is_obviously_neg(tab: &Tableau, row: usize) -> bool {
    let r = &tab.rows[row];
    if tab.big_param {
        if r.big_m.is_positive() {
            return false;
        }
        if r.big_m.is_negative() {
            return true;
        }
    }
    if !r.cst.is_negative() {
        return false;
    }
    for i in 0..tab.n_param + tab.n_div {
        let pos = if i < tab.n_param {
            i
        } else {
            tab.n_var() - tab.n_div + (i - tab.n_param)
        };
        if tab.vars[pos].is_row {
            continue;
        }
        let c = &r.cols[tab.vars[pos].index];
        if c.is_zero() {
            continue;
        }
        if !tab.vars[pos].is_nonneg || c.is_positive() {
            return false;
        }
    }
    true
}

/// Dual of [`is_obviously_neg`].
pub(crate) fn is_obviously_nonneg(tab: &Tableau, row: usize) -> bool {
    let r = &tab.rows[row];
    if tab.big_param {
        if r.big_m.is_positive() {
            return true;
        }
        if r.big_m.is_negative() {
            return false;
        }
    }
    if r.cst.is_negative() {
        return false;
    }
    for i in 0..tab.n_param + tab.n_div {
        let pos = if i < tab.n_param {
            i
        } else {
            tab.n_var() - tab.n_div + (i - tab.n_param)
        };
        if tab.vars[pos].is_row {
            continue;
        }
        let c = &r.cols[tab.vars[pos].index];
        if c.is_zero() {
            continue;
        }
        if !tab.vars[pos].is_nonneg || c.is_negative() {
            return false;
        }
    }
    true
}

/// Of two candidate pivot columns for `row`, return the one that yields
/// the lexicographically smaller increment of the sample point. The
/// virtual column entry of a non-basic variable is 1 in its own column and
/// 0 elsewhere; for a basic variable it is the entry of its row.
fn lexmin_col_pair(tab: &Tableau, row: usize, col1: usize, col2: usize) -> Result<usize, Error> {
    let tr = &tab.rows[row];
    for i in tab.n_param..tab.n_var() - tab.n_div {
        if !tab.vars[i].is_row {
            if tab.vars[i].index == col1 {
                return Ok(col2);
            }
            if tab.vars[i].index == col2 {
                return Ok(col1);
            }
            continue;
        }
        if tab.vars[i].index == row {
            continue;
        }
        let r = &tab.rows[tab.vars[i].index];
        let s1 = r.cols[col1].sign();
        let s2 = r.cols[col2].sign();
        if s1 == num_bigint::Sign::NoSign && s2 == num_bigint::Sign::NoSign {
            continue;
        }
        if s1 < s2 {
            return Ok(col1);
        }
        if s2 < s1 {
            return Ok(col2);
        }
        let t = &r.cols[col2] * &tr.cols[col1] - &r.cols[col1] * &tr.cols[col2];
        if t.is_positive() {
            return Ok(col1);
        }
        if t.is_negative() {
            return Ok(col2);
        }
    }
    Err(Error::Internal("indistinguishable pivot columns"))
}

/// The pivot column for `row` yielding the lexicographically smallest
/// positive increment of the sample point, or `None` when no column is
/// eligible (the row cannot be made non-negative).
pub(crate) fn lexmin_pivot_col(tab: &Tableau, row: usize) -> Result<Option<usize>, Error> {
    let mut col: Option<usize> = None;
    for j in tab.n_dead..tab.n_col() {
        if let TabId::Var(i) = tab.col_var[j] {
            if i < tab.n_param || i >= tab.n_var() - tab.n_div {
                continue;
            }
        }
        if !tab.rows[row].cols[j].is_positive() {
            continue;
        }
        col = Some(match col {
            None => j,
            Some(c) => lexmin_col_pair(tab, row, c, j)?,
        });
    }
    Ok(col)
}

/// The first known violated non-negative constraint. Rows with a negative
/// big-parameter coefficient come first; otherwise a row has to be
/// obviously negative or already classified negative.
fn first_neg(tab: &mut Tableau) -> Option<usize> {
    if tab.big_param {
        for row in tab.n_redundant..tab.n_row() {
            if !tab.var(tab.row_var[row]).is_nonneg {
                continue;
            }
            if tab.rows[row].big_m.is_negative() {
                return Some(row);
            }
        }
    }
    for row in tab.n_redundant..tab.n_row() {
        if !tab.var(tab.row_var[row]).is_nonneg {
            continue;
        }
        if tab.row_signs.is_some() {
            if tab.row_sign_of(row) == RowSign::Unknown && is_obviously_neg(tab, row) {
                tab.set_row_sign(row, RowSign::Neg);
            }
            if tab.row_sign_of(row) != RowSign::Neg {
                continue;
            }
        } else if !is_obviously_neg(tab, row) {
            continue;
        }
        return Some(row);
    }
    None
}

/// Resolve all known violated constraints by pivoting, each time with the
/// lex-smallest-increment column. Marks the tableau empty when a violated
/// row admits no pivot.
pub(crate) fn restore_lexmin(tab: &mut Tableau) -> Result<(), Error> {
    if tab.empty {
        return Ok(());
    }
    while let Some(row) = first_neg(tab) {
        match lexmin_pivot_col(tab, row)? {
            None => {
                log::trace!("no pivot column for violated row {}:\n{}", row, tab);
                tab.mark_empty();
                return Ok(());
            }
            Some(col) => {
                log::trace!("lexmin pivot at row {} col {}", row, col);
                tab.pivot(row, col);
            }
        }
    }
    Ok(())
}

/// For an equality row, the column to eliminate: the last non-parameter
/// variable with a non-zero coefficient, else any live column with
/// coefficient one or minus one (a parameter whose value stays integral
/// whenever the others are).
pub(crate) fn last_var_col_or_int_par_col(tab: &Tableau, row: usize) -> Option<usize> {
    for i in (tab.n_param..tab.n_var() - tab.n_div).rev() {
        if tab.vars[i].is_row {
            continue;
        }
        let col = tab.vars[i].index;
        if col < tab.n_dead {
            continue;
        }
        if !tab.rows[row].cols[col].is_zero() {
            return Some(col);
        }
    }
    for col in tab.n_dead..tab.n_col() {
        let c = &tab.rows[row].cols[col];
        if c.is_one() || *c == -BigInt::one() {
            return Some(col);
        }
    }
    None
}

/// Add an equality known to hold over the whole problem. The equality is
/// used to eliminate a column when possible; a pure parameter equality
/// with no unit coefficient falls back to the two-inequality form.
pub(crate) fn add_lexmin_valid_eq(tab: &mut Tableau, eq: &[BigInt]) -> Result<(), Error> {
    let con = tab.add_row(eq);
    let r = tab.cons[con].index;
    match last_var_col_or_int_par_col(tab, r) {
        None => {
            tab.set_nonneg(TabId::Con(con));
            let mut neg = eq.to_vec();
            seq::neg(&mut neg);
            let con2 = tab.add_row(&neg);
            tab.set_nonneg(TabId::Con(con2));
        }
        Some(col) => {
            tab.pivot(r, col);
            tab.kill_col(col);
            tab.n_eq += 1;
            restore_lexmin(tab)?;
        }
    }
    Ok(())
}

fn is_constant(tab: &Tableau, row: usize) -> bool {
    tab.rows[row].cols[tab.n_dead..]
        .iter()
        .all(|c| c.is_zero())
}

/// Add an equality that may or may not be satisfiable. A constant row must
/// be zero or the tableau becomes empty; otherwise the equality goes in as
/// two inequalities, restoring feasibility after each, with an
/// opportunistic column kill at the end.
pub(crate) fn add_lexmin_eq(tab: &mut Tableau, eq: &[BigInt]) -> Result<(), Error> {
    if tab.bset.is_some() {
        let bset = tab.bset.as_mut().expect("mirror checked");
        bset.add_equality(eq.to_vec());
        tab.push_undo(crate::tableau::UndoOp::BsetEq);
    }
    let con1 = tab.add_row(eq);
    tab.set_nonneg(TabId::Con(con1));
    let row = tab.cons[con1].index;
    if is_constant(tab, row) {
        if !tab.rows[row].cst.is_zero() || (tab.big_param && !tab.rows[row].big_m.is_zero()) {
            tab.mark_empty();
        }
        return Ok(());
    }

    restore_lexmin(tab)?;
    if tab.empty {
        return Ok(());
    }

    let mut neg = eq.to_vec();
    seq::neg(&mut neg);
    let con2 = tab.add_row(&neg);
    tab.set_nonneg(TabId::Con(con2));

    restore_lexmin(tab)?;
    if tab.empty {
        return Ok(());
    }

    if !tab.cons[con1].is_row {
        let col = tab.cons[con1].index;
        tab.kill_col(col);
    } else if !tab.cons[con2].is_row {
        let col = tab.cons[con2].index;
        tab.kill_col(col);
    } else if tab.rows[tab.cons[con1].index].cst.is_zero() {
        let r1 = tab.cons[con1].index;
        let found = tab.rows[r1].cols[tab.n_dead..]
            .iter()
            .position(|c| !c.is_zero());
        if let Some(i) = found {
            let col = tab.n_dead + i;
            tab.pivot(r1, col);
            tab.kill_col(col);
        }
    }
    Ok(())
}

/// Add an inequality, resolving any violation it introduces.
pub(crate) fn add_lexmin_ineq(tab: &mut Tableau, ineq: &[BigInt]) -> Result<(), Error> {
    if tab.bset.is_some() {
        let bset = tab.bset.as_mut().expect("mirror checked");
        bset.add_inequality(ineq.to_vec());
        tab.push_undo(crate::tableau::UndoOp::BsetIneq);
    }
    let con = tab.add_ineq(ineq);
    let r = tab.cons[con].index;
    if tab.row_is_redundant(r) {
        tab.mark_redundant(r);
        return Ok(());
    }
    restore_lexmin(tab)?;
    if !tab.empty && tab.cons[con].is_row {
        let r = tab.cons[con].index;
        if tab.row_is_redundant(r) {
            tab.mark_redundant(r);
        }
    }
    Ok(())
}

fn integer_constant(tab: &Tableau, row: usize) -> bool {
    tab.rows[row].cst.is_multiple_of(&tab.rows[row].denom)
}

fn integer_parameter(tab: &Tableau, row: usize) -> bool {
    let r = &tab.rows[row];
    for i in 0..tab.n_param + tab.n_div {
        let pos = if i < tab.n_param {
            i
        } else {
            tab.n_var() - tab.n_div + (i - tab.n_param)
        };
        if tab.vars[pos].is_row {
            continue;
        }
        if !r.cols[tab.vars[pos].index].is_multiple_of(&r.denom) {
            return false;
        }
    }
    true
}

fn integer_variable(tab: &Tableau, row: usize) -> bool {
    let r = &tab.rows[row];
    for j in tab.n_dead..tab.n_col() {
        if let TabId::Var(i) = tab.col_var[j] {
            if i < tab.n_param || i >= tab.n_var() - tab.n_div {
                continue;
            }
        }
        if !r.cols[j].is_multiple_of(&r.denom) {
            return false;
        }
    }
    true
}

/// The first output variable whose sample value is not integral, with
/// flags classifying which parts of its row are integral. A row whose
/// constant and parameter parts are both integral has an integral sample
/// and is skipped.
pub(crate) fn first_non_integer(tab: &Tableau) -> Option<(usize, u8)> {
    for i in tab.n_param..tab.n_var() - tab.n_div {
        if !tab.vars[i].is_row {
            continue;
        }
        let row = tab.vars[i].index;
        let mut flags = 0u8;
        if integer_constant(tab, row) {
            flags |= I_CST;
        }
        if integer_parameter(tab, row) {
            flags |= I_PAR;
        }
        if flags & I_CST != 0 && flags & I_PAR != 0 {
            continue;
        }
        if integer_variable(tab, row) {
            flags |= I_VAR;
        }
        return Some((row, flags));
    }
    None
}

/// Add a Gomory cut for the non-integral sample value of `row`:
/// for `m r = f + sum a_i y_i` the cut is
/// `-{-f/m} + sum {a_i/m} y_i >= 0`. The coefficient of the big parameter
/// is zero, and the cut is violated at the current sample.
pub(crate) fn add_cut(tab: &mut Tableau, row: usize) -> usize {
    let src = tab.rows[row].clone();
    let con = tab.allocate_con();
    let r = tab.cons[con].index;
    let cut = TabRow {
        denom: src.denom.clone(),
        cst: -(-&src.cst).mod_floor(&src.denom),
        big_m: BigInt::zero(),
        cols: src
            .cols
            .iter()
            .enumerate()
            .map(|(j, c)| {
                if j < tab.n_dead {
                    BigInt::zero()
                } else {
                    c.mod_floor(&src.denom)
                }
            })
            .collect(),
    };
    tab.rows[r] = cut;
    tab.set_nonneg(TabId::Con(con));
    tab.set_row_sign(r, RowSign::Neg);
    r
}

/// Add cuts until the sample point is integral or the tableau is found
/// integer infeasible. Used on non-parametric tableaus, in particular the
/// context.
pub(crate) fn cut_to_integer_lexmin(tab: &mut Tableau) -> Result<(), Error> {
    if tab.empty {
        return Ok(());
    }
    while let Some((row, flags)) = first_non_integer(tab) {
        if flags & I_VAR != 0 {
            tab.mark_empty();
            return Ok(());
        }
        add_cut(tab, row);
        restore_lexmin(tab)?;
        if tab.empty {
            break;
        }
    }
    Ok(())
}

/// Rewrite `row` after the div `d` equal to its fractional parameter part
/// has been added: all coefficients are floored, the denominator becomes
/// one and the column of `d` receives a unit coefficient.
pub(crate) fn set_row_cst_to_div(tab: &mut Tableau, row: usize, d: usize) -> Result<(), Error> {
    let denom = tab.rows[row].denom.clone();
    {
        let r = &mut tab.rows[row];
        r.cst = r.cst.div_floor(&denom);
        r.big_m = r.big_m.div_floor(&denom);
        seq::fdiv_q_assign(&mut r.cols, &denom);
        r.denom = BigInt::one();
    }
    let dv = tab.n_var() - tab.n_div + d;
    if tab.vars[dv].is_row {
        return Err(Error::Internal("fresh div ended up in the basis"));
    }
    let col = tab.vars[dv].index;
    tab.rows[row].cols[col] = BigInt::one();
    Ok(())
}

/// Whether no pivot can be performed on the row: no positive coefficient
/// in a non-parameter column.
pub(crate) fn is_critical(tab: &Tableau, row: usize) -> bool {
    for j in tab.n_dead..tab.n_col() {
        if let TabId::Var(i) = tab.col_var[j] {
            if i < tab.n_param || i >= tab.n_var() - tab.n_div {
                continue;
            }
        }
        if tab.rows[row].cols[j].is_positive() {
            return false;
        }
    }
    true
}

/// Whether the inequality can never be satisfied with equality by integer
/// values: the gcd of its coefficients does not divide the constant. The
/// vector is scaled down by that gcd in place, flooring the constant, and
/// callers keep using the scaled form.
pub(crate) fn is_strict(vec: &mut [BigInt]) -> bool {
    let g = seq::gcd(&vec[1..]);
    if g.is_one() || g.is_zero() {
        return false;
    }
    let strict = !vec[0].is_multiple_of(&g);
    vec[0] = vec[0].div_floor(&g);
    for x in vec[1..].iter_mut() {
        *x = &*x / &g;
    }
    strict
}

/// Add a parametric cut for the non-integral parameter part of `row`.
/// With `a_i` the constant/parameter coefficients and `b_i` the variable
/// coefficients, the div `q = floor(sum {-a_i} y_i)` is installed in the
/// context and the main tableau receives
///
///   c = sum -{-a_i} y_i + sum {b_i} x_i + q >= 0
///
/// When `q` happens to be basic in the main tableau, its row is combined
/// into the cut instead of referencing its column.
pub(crate) fn add_parametric_cut(
    tab: &mut Tableau,
    row: usize,
    ctx: &mut Tableau,
) -> Result<usize, Error> {
    ctx.extend_cons(3);
    tab.extend_cons(1);
    let div = get_row_parameter_div(tab, row);
    let d = super::context::get_div(tab, ctx, &div)?;

    let src = tab.rows[row].clone();
    let con = tab.allocate_con();
    let r = tab.cons[con].index;
    let mut cut = TabRow {
        denom: src.denom.clone(),
        cst: -(-&src.cst).mod_floor(&src.denom),
        big_m: BigInt::zero(),
        cols: vec![BigInt::zero(); tab.n_col()],
    };
    for j in tab.n_dead..tab.n_col() {
        let param_col = match tab.col_var[j] {
            TabId::Var(i) => i < tab.n_param || i >= tab.n_var() - tab.n_div,
            TabId::Con(_) => false,
        };
        cut.cols[j] = if param_col {
            -(-&src.cols[j]).mod_floor(&src.denom)
        } else {
            src.cols[j].mod_floor(&src.denom)
        };
    }

    let dv = tab.n_var() - tab.n_div + d;
    if tab.vars[dv].is_row {
        let d_row = tab.vars[dv].index;
        let drow = tab.rows[d_row].clone();
        let g = drow.denom.gcd(&cut.denom);
        let f = &drow.denom / &g;
        let dc_g = &cut.denom / &g;
        cut.cst = &cut.cst * &f + &drow.cst * &dc_g;
        cut.big_m = &cut.big_m * &f + &drow.big_m * &dc_g;
        for j in 0..cut.cols.len() {
            cut.cols[j] = &cut.cols[j] * &f + &drow.cols[j] * &dc_g;
        }
        cut.denom = &dc_g * &drow.denom;
    } else {
        let col = tab.vars[dv].index;
        cut.cols[col] = src.denom.clone();
    }

    tab.rows[r] = cut;
    tab.normalize_row(r);
    tab.set_nonneg(TabId::Con(con));
    tab.set_row_sign(r, RowSign::Neg);
    Ok(r)
}

/// Classify the sign the parametric constant of `row` can take over the
/// live context: always non-negative, always non-positive (pivot), or
/// both (split). Cached signs, obvious non-negativity and rows with an
/// identical parameter line are answered without touching the context;
/// otherwise the cached samples vote on a hypothesis which is then
/// verified against the context by one feasibility probe per direction.
///
/// Zero counts as positive when the row is critical (no pivot column
/// exists) or strict (no integer point satisfies it with equality), since
/// treating it as non-positive would lose the solutions at zero.
pub(crate) fn row_sign(tab: &Tableau, ctx: &mut Tableau, row: usize) -> Result<RowSign, Error> {
    if tab.row_sign_of(row) != RowSign::Unknown {
        return Ok(tab.row_sign_of(row));
    }
    if is_obviously_nonneg(tab, row) {
        return Ok(RowSign::Pos);
    }
    for row2 in tab.n_redundant..tab.n_row() {
        if row2 == row || tab.row_sign_of(row2) == RowSign::Unknown {
            continue;
        }
        if identical_parameter_line(tab, row, row2) {
            return Ok(tab.row_sign_of(row2));
        }
    }

    let critical = is_critical(tab, row);
    let mut ineq = get_row_parameter_ineq(tab, row);
    let strict = is_strict(&mut ineq);

    let mut res = RowSign::Unknown;
    for sample in &ctx.samples[ctx.n_outside..] {
        let v = seq::inner_product(&ineq, sample);
        let sgn = if v.is_positive() {
            1
        } else if v.is_negative() {
            -1
        } else {
            0
        };
        if sgn > 0 || (sgn == 0 && (critical || strict)) {
            if res == RowSign::Unknown {
                res = RowSign::Pos;
            }
            if res == RowSign::Neg {
                res = RowSign::Any;
            }
        }
        if sgn < 0 {
            if res == RowSign::Unknown {
                res = RowSign::Neg;
            }
            if res == RowSign::Pos {
                res = RowSign::Any;
            }
        }
        if res == RowSign::Any {
            return Ok(res);
        }
    }

    if res == RowSign::Unknown || res == RowSign::Pos {
        // can the row become negative?
        let mut probe = ineq.clone();
        seq::neg(&mut probe);
        probe[0] -= BigInt::one();
        let feasible = probe_context(ctx, &probe)?;
        if !feasible {
            res = RowSign::Pos;
        } else {
            res = if res == RowSign::Unknown {
                RowSign::Neg
            } else {
                RowSign::Any
            };
        }
    }

    if res == RowSign::Neg {
        // can the row become positive?
        let mut probe = ineq.clone();
        if !critical && !strict {
            probe[0] -= BigInt::one();
        }
        if probe_context(ctx, &probe)? {
            res = RowSign::Any;
        }
    }

    Ok(res)
}

/// Add the inequality on a snapshot of the context and report integer
/// feasibility, rolling the context back on every path.
fn probe_context(ctx: &mut Tableau, ineq: &[BigInt]) -> Result<bool, Error> {
    let snap = ctx.snapshot();
    ctx.push_basis();
    let res = (|| -> Result<bool, Error> {
        add_lexmin_ineq(ctx, ineq)?;
        super::context::context_is_feasible(ctx)
    })();
    ctx.rollback(snap)?;
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    fn int_tab(n_var: usize) -> Tableau {
        let mut tab = Tableau::new(n_var, true);
        for i in 0..n_var {
            tab.vars[i].is_nonneg = true;
            tab.vars[i].frozen = true;
        }
        tab
    }

    #[test]
    fn restore_lexmin_finds_the_minimum() {
        // x >= 3 over a single non-negative variable.
        let mut tab = int_tab(1);
        add_lexmin_ineq(&mut tab, &line(&[-3, 1])).unwrap();
        restore_lexmin(&mut tab).unwrap();
        assert!(!tab.empty);
        let sample = tab.sample_value();
        assert_eq!(sample[0], crate::math::Value::from_i64(3));
    }

    #[test]
    fn lexmin_prefers_the_earlier_variable() {
        // x + y >= 10 with x, y >= 0: the lex-smallest solution is (0, 10).
        let mut tab = int_tab(2);
        add_lexmin_ineq(&mut tab, &line(&[-10, 1, 1])).unwrap();
        add_lexmin_ineq(&mut tab, &line(&[0, 1, 0])).unwrap();
        add_lexmin_ineq(&mut tab, &line(&[0, 0, 1])).unwrap();
        restore_lexmin(&mut tab).unwrap();
        let sample = tab.sample_value();
        assert_eq!(sample[0], crate::math::Value::zero());
        assert_eq!(sample[1], crate::math::Value::from_i64(10));
    }

    #[test]
    fn conflicting_constraints_mark_empty() {
        let mut tab = int_tab(1);
        add_lexmin_ineq(&mut tab, &line(&[-4, 1])).unwrap();
        // x <= 2 contradicts x >= 4.
        add_lexmin_ineq(&mut tab, &line(&[2, -1])).unwrap();
        assert!(tab.empty);
    }

    #[test]
    fn cuts_reach_the_integer_minimum() {
        // 2x >= 5 has rational minimum 5/2; the integer minimum is 3.
        let mut tab = int_tab(1);
        add_lexmin_ineq(&mut tab, &line(&[-5, 2])).unwrap();
        cut_to_integer_lexmin(&mut tab).unwrap();
        assert!(!tab.empty);
        assert_eq!(tab.sample_value()[0], crate::math::Value::from_i64(3));
    }

    #[test]
    fn integer_infeasible_equality_empties_the_tableau() {
        // 2x = 1 has no integer solution.
        let mut tab = int_tab(1);
        add_lexmin_eq(&mut tab, &line(&[-1, 2])).unwrap();
        cut_to_integer_lexmin(&mut tab).unwrap();
        assert!(tab.empty);
    }

    #[test]
    fn valid_equality_eliminates_a_column() {
        let mut tab = int_tab(2);
        add_lexmin_valid_eq(&mut tab, &line(&[-4, 0, 2])).unwrap();
        assert_eq!(tab.n_dead, 1);
        restore_lexmin(&mut tab).unwrap();
        assert_eq!(tab.sample_value()[1], crate::math::Value::from_i64(2));
    }

    #[test]
    fn strictness_scales_the_vector_down() {
        let mut v = line(&[3, 2, 4]);
        assert!(is_strict(&mut v));
        assert_eq!(v, line(&[1, 1, 2]));

        let mut v = line(&[4, 2, 4]);
        assert!(!is_strict(&mut v));
        assert_eq!(v, line(&[2, 1, 2]));
    }
}
