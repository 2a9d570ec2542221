//! The parametric driver: classifies row signs over the live parameter
//! region, splits the context when a row can take both signs, applies the
//! integrality machinery of the engine and hands every solved leaf to the
//! accumulator. Leaves are emitted in depth-first, left-branch-first
//! order of the parameter tree.

use num_bigint::BigInt;
use num_traits::One;

use super::context::{
    check_samples, context_valid_sample_or_feasible, get_div, min_at_most_neg_one,
};
use super::lexmin::{
    add_cut, add_lexmin_eq, add_lexmin_ineq, add_parametric_cut, first_non_integer,
    get_row_parameter_ineq, get_row_parameter_line, get_row_split_div, is_strict, restore_lexmin,
    row_sign, set_row_cst_to_div, I_PAR, I_VAR,
};
use super::sol::Sol;
use crate::error::Error;
use crate::math::seq;
use crate::tableau::{RowSign, TabId, Tableau};

/// Explore the positive branch of a split: on a snapshot of the context,
/// constrain the parameters by `ineq`, evict stale samples and recurse on
/// a copy of the main tableau. The context is restored on every path out.
fn find_in_pos(sol: &mut Sol, tab: &Tableau, ineq: &[BigInt]) -> Result<(), Error> {
    let snap = sol.context.snapshot();
    sol.context.push_basis();
    let res = (|| -> Result<(), Error> {
        let dup = tab.duplicate();
        add_lexmin_ineq(&mut sol.context, ineq)?;
        check_samples(&mut sol.context, ineq, false);
        find_solutions(sol, dup)
    })();
    sol.context.rollback(snap)?;
    res
}

/// Record a "no solution" leaf for the open half-space `ineq > 0`,
/// represented over the integers as `ineq - 1 >= 0`.
fn no_sol_in_strict(sol: &mut Sol, tab: &mut Tableau, ineq: &[BigInt]) -> Result<(), Error> {
    let snap = sol.context.snapshot();
    sol.context.push_basis();
    let res = (|| -> Result<(), Error> {
        let mut strict = ineq.to_vec();
        strict[0] -= BigInt::one();
        add_lexmin_ineq(&mut sol.context, &strict)?;
        context_valid_sample_or_feasible(&mut sol.context, &strict, false)?;
        let saved = tab.empty;
        tab.empty = true;
        let r = sol.add(tab);
        tab.empty = saved;
        r
    })();
    sol.context.rollback(snap)?;
    res
}

/// Among the rows that could split the context, pick the one whose
/// positive half-space makes the most other candidates redundant; in the
/// positive branch those rows are then positive as well, saving splits.
fn best_split(tab: &Tableau, ctx: &mut Tableau) -> Result<Option<usize>, Error> {
    let snap = ctx.snapshot();
    ctx.push_basis();
    let res = (|| -> Result<Option<usize>, Error> {
        let mut best: Option<(usize, usize)> = None;
        let snap2 = ctx.snapshot();
        for split in tab.n_redundant..tab.n_row() {
            if !tab.var(tab.row_var[split]).is_nonneg {
                continue;
            }
            if tab.row_sign_of(split) != RowSign::Any {
                continue;
            }
            let ineq = get_row_parameter_ineq(tab, split);
            add_lexmin_ineq(ctx, &ineq)?;
            let mut r = 0;
            if !ctx.empty {
                for row in tab.n_redundant..tab.n_row() {
                    if row == split {
                        continue;
                    }
                    if !tab.var(tab.row_var[row]).is_nonneg {
                        continue;
                    }
                    if tab.row_sign_of(row) != RowSign::Any {
                        continue;
                    }
                    let other = get_row_parameter_ineq(tab, row);
                    if !min_at_most_neg_one(ctx, &other)? {
                        r += 1;
                    }
                }
            }
            if best.map_or(true, |(_, best_r)| r > best_r) {
                best = Some((split, r));
            }
            ctx.rollback(snap2)?;
        }
        Ok(best.map(|(row, _)| row))
    })();
    ctx.rollback(snap)?;
    res
}

/// Compute the lexicographic optimum of `tab` over the current context.
/// On entry no obvious pivot is pending; `restore_lexmin` re-establishes
/// that after every step. Rows that can take either sign split the
/// context: the non-negative part is handled by recursion, the negative
/// part continues here with the forced pivot.
pub(crate) fn find_solutions(sol: &mut Sol, mut tab: Tableau) -> Result<(), Error> {
    if tab.empty || sol.context.empty {
        return sol.add(&tab);
    }
    loop {
        let mut split: Option<usize> = None;
        let mut n_split = 0;
        let mut neg_found = false;
        for row in tab.n_redundant..tab.n_row() {
            if !tab.var(tab.row_var[row]).is_nonneg {
                continue;
            }
            let sgn = row_sign(&tab, &mut sol.context, row)?;
            tab.set_row_sign(row, sgn);
            if sgn == RowSign::Any {
                n_split += 1;
                if split.is_none() {
                    split = Some(row);
                }
            }
            if sgn == RowSign::Neg {
                neg_found = true;
                break;
            }
        }
        if neg_found {
            restore_lexmin(&mut tab)?;
            if tab.empty {
                break;
            }
            continue;
        }
        if let Some(mut split_row) = split {
            if n_split != 1 {
                split_row = best_split(&tab, &mut sol.context)?
                    .ok_or(Error::Internal("no split row among candidates"))?;
            }
            log::debug!("splitting the context on row {}", split_row);
            let mut ineq = get_row_parameter_ineq(&tab, split_row);
            is_strict(&mut ineq);
            for row in tab.n_redundant..tab.n_row() {
                if !tab.var(tab.row_var[row]).is_nonneg {
                    continue;
                }
                if tab.row_sign_of(row) == RowSign::Any {
                    tab.set_row_sign(row, RowSign::Unknown);
                }
            }
            tab.set_row_sign(split_row, RowSign::Pos);
            find_in_pos(sol, &tab, &ineq)?;
            tab.set_row_sign(split_row, RowSign::Neg);
            seq::neg(&mut ineq);
            ineq[0] -= BigInt::one();
            add_lexmin_ineq(&mut sol.context, &ineq)?;
            check_samples(&mut sol.context, &ineq, false);
            restore_lexmin(&mut tab)?;
            if tab.empty {
                break;
            }
            continue;
        }
        if tab.rational {
            break;
        }
        let Some((row, flags)) = first_non_integer(&tab) else {
            break;
        };
        if flags & I_PAR != 0 {
            if flags & I_VAR != 0 {
                tab.mark_empty();
                break;
            }
            add_cut(&mut tab, row);
        } else if flags & I_VAR != 0 {
            // The parameter combination itself has to be integral: move
            // the requirement into the context through a new div.
            let div = get_row_split_div(&tab, row);
            let d = get_div(&mut tab, &mut sol.context, &div)?;
            let ineq = sol
                .context
                .bset
                .as_ref()
                .ok_or(Error::Internal("context has no mirrored set"))?
                .ineq_for_div(d);
            no_sol_in_strict(sol, &mut tab, &ineq)?;
            let mut neg_ineq = ineq.clone();
            seq::neg(&mut neg_ineq);
            add_lexmin_ineq(&mut sol.context, &neg_ineq)?;
            check_samples(&mut sol.context, &neg_ineq, false);
            set_row_cst_to_div(&mut tab, row, d)?;
        } else {
            add_parametric_cut(&mut tab, row, &mut sol.context)?;
        }
        restore_lexmin(&mut tab)?;
        if tab.empty {
            break;
        }
    }
    sol.add(&tab)
}

/// Entry point of the driver: first transfer every purely parametric row
/// (a parameter or div pivoted into the basis) to the context as an
/// equality, recording both strict complements as "no solution" leaves,
/// then run the main loop.
pub(crate) fn find_solutions_main(sol: &mut Sol, mut tab: Tableau) -> Result<(), Error> {
    let mut row = tab.n_redundant;
    while row < tab.n_row() {
        let TabId::Var(v) = tab.row_var[row] else {
            row += 1;
            continue;
        };
        if v >= tab.n_param && v < tab.n_var() - tab.n_div {
            row += 1;
            continue;
        }
        let p = if v < tab.n_param {
            v
        } else {
            v + tab.n_param - (tab.n_var() - tab.n_div)
        };
        let mut eq = get_row_parameter_line(&tab, row);
        eq[1 + p] = -tab.rows[row].denom.clone();
        seq::normalize(&mut eq);

        no_sol_in_strict(sol, &mut tab, &eq)?;
        seq::neg(&mut eq);
        no_sol_in_strict(sol, &mut tab, &eq)?;
        seq::neg(&mut eq);

        add_lexmin_eq(&mut sol.context, &eq)?;
        context_valid_sample_or_feasible(&mut sol.context, &eq, true)?;
        check_samples(&mut sol.context, &eq, true);

        tab.mark_redundant(row);
        if sol.context.empty {
            break;
        }
        row = tab.n_redundant;
    }
    find_solutions(sol, tab)
}
