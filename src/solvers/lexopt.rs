//! Public entry points: the parametric lexicographic optimum of a basic
//! relation, either collected as a piecewise map or streamed to a visitor.

use super::context::{context_is_feasible, context_tab_from_set, detect_nonnegative_parameters};
use super::driver::find_solutions_main;
use super::lexmin::{add_lexmin_ineq, add_lexmin_valid_eq, restore_lexmin};
use super::sol::{Matrix, Sink, Sol};
use crate::error::Error;
use crate::math::seq;
use crate::polyhedra::{BasicMap, BasicSet};
use crate::tableau::Tableau;

/// Build the main tableau for the lexicographic optimization of `rel`.
/// Every non-parameter variable is represented shifted by the big
/// parameter (`x' = M + x` for minimization, `x' = M - x` for
/// maximization, which negates the output coefficients on entry), so the
/// initial all-zero sample is lexicographically below every point.
fn tab_for_lexmin(rel: &BasicMap, dom: &BasicSet, max: bool) -> Result<Tableau, Error> {
    let mut tab = Tableau::new(rel.total_dim(), true);
    tab.rational = rel.is_rational();
    tab.n_param = dom.dim();
    tab.n_div = dom.n_div();
    tab.row_signs = Some(vec![]);
    if rel.fast_is_empty() {
        tab.mark_empty();
        return Ok(tab);
    }
    for i in tab.n_param..tab.n_var() - tab.n_div {
        tab.vars[i].is_nonneg = true;
        tab.vars[i].frozen = true;
    }
    let lo = 1 + tab.n_param;
    let hi = 1 + tab.n_var() - tab.n_div;
    for eq in rel.eqs() {
        let mut row = eq.clone();
        if max {
            seq::neg(&mut row[lo..hi]);
        }
        add_lexmin_valid_eq(&mut tab, &row)?;
        if tab.empty {
            return Ok(tab);
        }
    }
    for ineq in rel.ineqs() {
        let mut row = ineq.clone();
        if max {
            seq::neg(&mut row[lo..hi]);
        }
        add_lexmin_ineq(&mut tab, &row)?;
        if tab.empty {
            return Ok(tab);
        }
    }
    Ok(tab)
}

fn init_context(dom: BasicSet) -> Result<Tableau, Error> {
    let mut context = context_tab_from_set(dom)?;
    restore_lexmin(&mut context)?;
    context_is_feasible(&mut context)?;
    Ok(context)
}

fn solve(sol: &mut Sol, rel: &BasicMap, max: bool) -> Result<(), Error> {
    let context_empty = sol
        .context
        .bset
        .as_ref()
        .map_or(true, |b| b.fast_is_empty());
    if context_empty {
        return Ok(());
    }
    if rel.fast_is_empty() {
        return sol.add_empty_piece();
    }
    let dom = sol
        .context
        .bset
        .as_ref()
        .ok_or(Error::Internal("context has no mirrored set"))?
        .clone();
    let mut tab = tab_for_lexmin(rel, &dom, max)?;
    detect_nonnegative_parameters(&mut tab, &mut sol.context)?;
    find_solutions_main(sol, tab)
}

/// Compute the lexicographic minimum (or maximum, with `max`) of `rel`
/// over the parameter domain `dom`.
///
/// For every parameter point of `dom` admitting a feasible output tuple,
/// exactly one returned piece applies and fixes the optimum as an affine
/// function of the parameters (possibly through integer divisions). With
/// `track_empty`, the second component collects the parts of `dom` where
/// no output tuple exists.
///
/// Every output dimension has to be bounded over `dom` in the direction
/// being optimized, otherwise `Error::InvalidArgument` is returned.
///
/// # Example
/// ```rust
/// use parlex::{partial_lexopt, BasicMap, BasicSet};
///
/// // x >= 0 and x >= p, minimized over all values of p.
/// let mut rel = BasicMap::new(1, 0, 1);
/// rel.add_inequality_i64(&[0, 0, 1]);
/// rel.add_inequality_i64(&[0, -1, 1]);
/// let dom = BasicSet::universe(1);
///
/// let (pieces, _) = partial_lexopt(rel, dom, false, false).unwrap();
/// // One piece with x = 0 (p <= 0) and one with x = p (p >= 0).
/// assert_eq!(pieces.len(), 2);
/// ```
pub fn partial_lexopt(
    mut rel: BasicMap,
    mut dom: BasicSet,
    track_empty: bool,
    max: bool,
) -> Result<(Vec<BasicMap>, Option<Vec<BasicSet>>), Error> {
    if !rel.compatible_domain(&dom) {
        return Err(Error::InvalidArgument(
            "domain dimensions do not match the relation",
        ));
    }
    rel.detect_equalities();
    if dom.n_div() > 0 {
        dom.order_divs();
        rel.align_divs_with(&dom);
    }
    let mut sol = Sol {
        context: init_context(dom)?,
        sink: Sink::Pieces {
            pieces: vec![],
            empty: track_empty.then(Vec::new),
        },
        max,
        n_param: rel.n_param(),
        n_in: rel.n_in(),
        n_out: rel.n_out(),
    };
    solve(&mut sol, &rel, max)?;
    Ok(sol.into_map_result())
}

/// Stream the lexicographic optimum of `rel` to `visit`, one (domain
/// piece, affine output matrix) pair per leaf of the parameter tree. The
/// domain is the universe over the relation's parameters and inputs. An
/// error returned by the visitor aborts the traversal and is forwarded.
pub fn foreach_lexopt<F>(rel: &BasicMap, max: bool, mut visit: F) -> Result<(), Error>
where
    F: FnMut(BasicSet, Matrix) -> Result<(), Error>,
{
    let mut rel = rel.clone();
    rel.detect_equalities();
    let dom = BasicSet::universe(rel.domain_dim());
    let mut sol = Sol {
        context: init_context(dom)?,
        sink: Sink::Visit(&mut visit),
        max,
        n_param: rel.n_param(),
        n_in: rel.n_in(),
        n_out: rel.n_out(),
    };
    solve(&mut sol, &rel, max)
}
