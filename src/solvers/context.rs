//! The parameter-side tableau: the domain constraints plus everything the
//! driver learns about the parameters during a solve, a cache of known
//! integer parameter points, and the integer divisions introduced by
//! parametric cuts.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::lexmin::{
    add_lexmin_ineq, add_lexmin_valid_eq, cut_to_integer_lexmin, restore_lexmin,
};
use crate::error::Error;
use crate::math::seq;
use crate::polyhedra::BasicSet;
use crate::tableau::{Tableau, UndoOp};

/// Build the context tableau from the domain. Every variable is shifted by
/// the context's own big parameter, marked non-negative and frozen; the
/// set itself is pinned to the tableau so constraints added later are
/// mirrored into it.
pub(crate) fn context_tab_from_set(mut bset: BasicSet) -> Result<Tableau, Error> {
    bset.known_div_constraints();
    let mut tab = Tableau::new(bset.total_dim(), true);
    for i in 0..tab.n_var() {
        tab.vars[i].is_nonneg = true;
        tab.vars[i].frozen = true;
    }
    if bset.fast_is_empty() {
        tab.mark_empty();
    } else {
        for eq in bset.eqs().to_vec() {
            add_lexmin_valid_eq(&mut tab, &eq)?;
            if tab.empty {
                break;
            }
        }
        if !tab.empty {
            for ineq in bset.ineqs().to_vec() {
                add_lexmin_ineq(&mut tab, &ineq)?;
                if tab.empty {
                    break;
                }
            }
        }
    }
    tab.bset = Some(bset);
    Ok(tab)
}

/// Check whether the context still contains an integer point. The check
/// runs the cutting loop to completion on a snapshot; a finite sample
/// found on the way is kept in the sample cache, which later short-cuts
/// sign queries.
pub(crate) fn context_is_feasible(ctx: &mut Tableau) -> Result<bool, Error> {
    let snap = ctx.snapshot();
    ctx.push_basis();
    let res = (|| -> Result<bool, Error> {
        cut_to_integer_lexmin(ctx)?;
        if !ctx.empty && ctx.sample_is_finite() {
            let sample = ctx.integer_sample()?;
            ctx.samples.push(sample);
        }
        Ok(!ctx.empty)
    })();
    ctx.rollback(snap)?;
    res
}

fn sample_satisfies(sample: &[BigInt], ineq: &[BigInt], eq: bool) -> bool {
    let v = seq::inner_product(ineq, sample);
    if eq {
        v.is_zero()
    } else {
        !v.is_negative()
    }
}

/// Scan the live samples for one satisfying the constraint; only when none
/// does, fall back to the full feasibility check.
pub(crate) fn context_valid_sample_or_feasible(
    ctx: &mut Tableau,
    ineq: &[BigInt],
    eq: bool,
) -> Result<bool, Error> {
    debug_assert!(ctx
        .samples
        .iter()
        .all(|s| s.len() == 1 + ctx.n_var()));
    let found = ctx.samples[ctx.n_outside..]
        .iter()
        .any(|s| sample_satisfies(s, ineq, eq));
    if found {
        return Ok(true);
    }
    context_is_feasible(ctx)
}

/// Evict every live sample that violates the constraint.
pub(crate) fn check_samples(ctx: &mut Tableau, ineq: &[BigInt], eq: bool) {
    let mut i = ctx.n_outside;
    while i < ctx.samples.len() {
        if !sample_satisfies(&ctx.samples[i], ineq, eq) {
            ctx.drop_sample(i);
        }
        i += 1;
    }
}

/// Whether the constraint `line >= 0` can reach values at or below minus
/// one over the current context, i.e. whether the context together with
/// `line <= -1` is rationally feasible. This is the redundancy and
/// non-negativity probe; the context is left untouched.
pub(crate) fn min_at_most_neg_one(ctx: &mut Tableau, line: &[BigInt]) -> Result<bool, Error> {
    let snap = ctx.snapshot();
    ctx.push_basis();
    let res = (|| -> Result<bool, Error> {
        let mut probe = line.to_vec();
        seq::neg(&mut probe);
        probe[0] -= BigInt::one();
        add_lexmin_ineq(ctx, &probe)?;
        Ok(!ctx.empty)
    })();
    ctx.rollback(snap)?;
    res
}

/// Look for an existing div with the same denominator and coefficients.
pub(crate) fn find_div(ctx: &Tableau, div: &[BigInt]) -> Option<usize> {
    let bset = ctx.bset.as_ref()?;
    bset.divs()
        .iter()
        .position(|d| d[0] == div[0] && d[1..] == div[1..])
}

/// Add the div to the context (variable, sample column, mirrored
/// definition and the two defining inequalities) and as a fresh frozen
/// variable of the main tableau. Returns the new div's index.
pub(crate) fn add_div(tab: &mut Tableau, ctx: &mut Tableau, div: &[BigInt]) -> Result<usize, Error> {
    ctx.extend_vars(1);
    tab.extend_vars(1);
    let v = ctx.allocate_var();
    ctx.vars[v].is_nonneg = true;
    ctx.vars[v].frozen = true;

    let m = div[0].clone();
    let n_outside = ctx.n_outside;
    for (i, sample) in ctx.samples.iter_mut().enumerate() {
        if i < n_outside {
            sample.push(BigInt::zero());
        } else {
            let e = seq::inner_product(&div[1..], sample);
            sample.push(e.div_floor(&m));
        }
    }

    let (lower, upper, _k) = {
        let bset = ctx
            .bset
            .as_mut()
            .ok_or(Error::Internal("context has no mirrored set"))?;
        let k = bset.alloc_div(div.to_vec());
        let lower = bset.ineq_for_div(k);
        let mut upper = lower.clone();
        seq::neg(&mut upper);
        upper[0] += &m - BigInt::one();
        (lower, upper, k)
    };
    ctx.push_undo(UndoOp::BsetDiv);
    add_lexmin_ineq(ctx, &lower)?;
    add_lexmin_ineq(ctx, &upper)?;

    let mv = tab.allocate_var();
    if !ctx.big_param {
        tab.vars[mv].is_nonneg = true;
    }
    tab.vars[mv].frozen = true;
    tab.n_div += 1;
    Ok(tab.n_div - 1)
}

/// The index of a div equal to `div`, creating it when absent.
pub(crate) fn get_div(tab: &mut Tableau, ctx: &mut Tableau, div: &[BigInt]) -> Result<usize, Error> {
    match find_div(ctx, div) {
        Some(d) => Ok(d),
        None => add_div(tab, ctx, div),
    }
}

/// Probe each context variable for provable non-negativity, marking the
/// corresponding main-tableau variable when the probe succeeds. When every
/// context variable is non-negative, the context's big-parameter column is
/// dropped entirely.
pub(crate) fn detect_nonnegative_parameters(
    tab: &mut Tableau,
    ctx: &mut Tableau,
) -> Result<(), Error> {
    if ctx.n_var() == 0 {
        return Ok(());
    }
    let mut n = 0;
    for i in 0..ctx.n_var() {
        if ctx.empty {
            break;
        }
        let mut line = vec![BigInt::zero(); 1 + ctx.n_var()];
        line[1 + i] = BigInt::one();
        if !min_at_most_neg_one(ctx, &line)? {
            let j = if i < tab.n_param {
                i
            } else {
                i - tab.n_param + (tab.n_var() - tab.n_div)
            };
            tab.vars[j].is_nonneg = true;
            n += 1;
        }
    }
    if n == ctx.n_var() {
        log::debug!("all parameters non-negative, dropping the big parameter");
        ctx.drop_big_param();
        restore_lexmin(ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(dim: usize, ineqs: &[&[i64]]) -> BasicSet {
        let mut bset = BasicSet::universe(dim);
        for ineq in ineqs {
            bset.add_inequality_i64(ineq);
        }
        bset
    }

    fn line(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn feasible_context_records_a_sample() {
        let mut ctx = context_tab_from_set(set_with(1, &[&[0, 1]])).unwrap();
        restore_lexmin(&mut ctx).unwrap();
        assert!(context_is_feasible(&mut ctx).unwrap());
        assert_eq!(ctx.samples.len(), 1);
        assert_eq!(ctx.samples[0], line(&[1, 0]));
    }

    #[test]
    fn infeasible_context_is_detected() {
        // p >= 2 and p <= 1.
        let mut ctx = context_tab_from_set(set_with(1, &[&[-2, 1], &[1, -1]])).unwrap();
        restore_lexmin(&mut ctx).unwrap();
        assert!(!context_is_feasible(&mut ctx).unwrap());
        assert!(ctx.empty);
    }

    #[test]
    fn samples_short_circuit_feasibility() {
        let mut ctx = context_tab_from_set(set_with(1, &[&[0, 1]])).unwrap();
        restore_lexmin(&mut ctx).unwrap();
        assert!(context_is_feasible(&mut ctx).unwrap());
        // p >= 0 is satisfied by the cached sample p = 0.
        assert!(context_valid_sample_or_feasible(&mut ctx, &line(&[0, 1]), false).unwrap());
    }

    #[test]
    fn check_samples_evicts_violators() {
        let mut ctx = context_tab_from_set(set_with(1, &[&[0, 1]])).unwrap();
        restore_lexmin(&mut ctx).unwrap();
        assert!(context_is_feasible(&mut ctx).unwrap());
        assert_eq!(ctx.samples.len() - ctx.n_outside, 1);
        // p - 5 >= 0 evicts the sample p = 0.
        check_samples(&mut ctx, &line(&[-5, 1]), false);
        assert_eq!(ctx.samples.len() - ctx.n_outside, 0);
    }

    #[test]
    fn nonnegative_parameter_detection_drops_big_param() {
        let mut rel_tab = Tableau::new(1, true);
        let mut ctx = context_tab_from_set(set_with(1, &[&[0, 1]])).unwrap();
        restore_lexmin(&mut ctx).unwrap();
        rel_tab.n_param = 1;
        detect_nonnegative_parameters(&mut rel_tab, &mut ctx).unwrap();
        assert!(rel_tab.vars[0].is_nonneg);
        assert!(!ctx.big_param);
    }

    #[test]
    fn unconstrained_parameter_keeps_big_param() {
        let mut rel_tab = Tableau::new(1, true);
        let mut ctx = context_tab_from_set(BasicSet::universe(1)).unwrap();
        restore_lexmin(&mut ctx).unwrap();
        rel_tab.n_param = 1;
        detect_nonnegative_parameters(&mut rel_tab, &mut ctx).unwrap();
        assert!(!rel_tab.vars[0].is_nonneg);
        assert!(ctx.big_param);
    }
}
