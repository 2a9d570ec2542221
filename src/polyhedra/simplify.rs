//! Constraint-system simplification shared by [`BasicSet`](super::BasicSet)
//! and [`BasicMap`](super::BasicMap).
//!
//! Constraint rows are `[cst, coeffs...]` with the div coefficients in the
//! trailing positions; div rows are `[denom, cst, coeffs...]`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::math::seq;

/// Gaussian elimination of the equalities, substituting into the
/// inequalities and the div definitions. Returns `true` when a
/// contradiction (`0 = c`, `c != 0`) is found.
pub fn gauss(
    dim: usize,
    divs: &mut [Vec<BigInt>],
    eqs: &mut Vec<Vec<BigInt>>,
    ineqs: &mut [Vec<BigInt>],
) -> bool {
    let total = dim + divs.len();
    let mut done = 0;
    for col in (1..=total).rev() {
        if done == eqs.len() {
            break;
        }
        let Some(k) = (done..eqs.len()).find(|&k| !eqs[k][col].is_zero()) else {
            continue;
        };
        eqs.swap(done, k);
        if eqs[done][col].is_negative() {
            seq::neg(&mut eqs[done]);
        }
        let src = eqs[done].clone();
        for (j, eq) in eqs.iter_mut().enumerate() {
            if j != done {
                seq::elim(eq, &src, col, None);
            }
        }
        for ineq in ineqs.iter_mut() {
            seq::elim(ineq, &src, col, None);
        }
        for div in divs.iter_mut() {
            if div[0].is_zero() {
                continue;
            }
            let (denom, body) = div.split_at_mut(1);
            seq::elim(body, &src, col, Some(&mut denom[0]));
        }
        done += 1;
    }
    // Leftover equalities have no non-zero coefficient: they are either
    // trivial or contradictions.
    let mut empty = false;
    eqs.retain(|eq| {
        if seq::first_non_zero(&eq[1..]).is_some() {
            return true;
        }
        if !eq[0].is_zero() {
            empty = true;
        }
        false
    });
    empty
}

/// Divide every constraint by the gcd of its coefficients. Equalities whose
/// gcd does not divide the constant, or reduced to `0 = c` with `c != 0`,
/// make the system empty; the constant of an inequality is floored.
/// Returns `true` when the system is detected empty.
pub fn normalize_constraints(eqs: &mut Vec<Vec<BigInt>>, ineqs: &mut Vec<Vec<BigInt>>) -> bool {
    let mut empty = false;
    let mut i = 0;
    while i < eqs.len() {
        let g = seq::gcd(&eqs[i][1..]);
        if g.is_zero() {
            if !eqs[i][0].is_zero() {
                empty = true;
            }
            eqs.remove(i);
            continue;
        }
        if !eqs[i][0].is_multiple_of(&g) {
            empty = true;
        } else if !g.is_one() {
            for x in eqs[i].iter_mut() {
                *x = &*x / &g;
            }
        }
        i += 1;
    }
    let mut i = 0;
    while i < ineqs.len() {
        let g = seq::gcd(&ineqs[i][1..]);
        if g.is_zero() {
            if ineqs[i][0].is_negative() {
                empty = true;
            }
            ineqs.remove(i);
            continue;
        }
        if !g.is_one() {
            ineqs[i][0] = ineqs[i][0].div_floor(&g);
            for x in ineqs[i][1..].iter_mut() {
                *x = &*x / &g;
            }
        }
        i += 1;
    }
    empty
}

/// Swap divs `a` and `b`: their definition rows and the two columns they
/// occupy in every constraint and div body.
pub fn swap_divs(
    dim: usize,
    divs: &mut Vec<Vec<BigInt>>,
    eqs: &mut [Vec<BigInt>],
    ineqs: &mut [Vec<BigInt>],
    a: usize,
    b: usize,
) {
    if a == b {
        return;
    }
    divs.swap(a, b);
    for row in eqs.iter_mut().chain(ineqs.iter_mut()) {
        row.swap(1 + dim + a, 1 + dim + b);
    }
    for div in divs.iter_mut() {
        div.swap(2 + dim + a, 2 + dim + b);
    }
}

/// Reorder the divs so that every div only references divs at lower
/// positions.
pub fn order_divs(
    dim: usize,
    divs: &mut Vec<Vec<BigInt>>,
    eqs: &mut [Vec<BigInt>],
    ineqs: &mut [Vec<BigInt>],
) {
    let mut i = 0;
    while i < divs.len() {
        if divs[i][0].is_zero() {
            i += 1;
            continue;
        }
        let tail = &divs[i][2 + dim + i..];
        match seq::first_non_zero(tail) {
            Some(pos) => {
                let other = i + pos;
                swap_divs(dim, divs, eqs, ineqs, i, other);
            }
            None => i += 1,
        }
    }
}

/// Promote pairs of opposite inequalities to equalities. Returns `true`
/// when a conflicting pair (`e >= c` together with `e <= c - k`, `k > 0`)
/// is found.
pub fn detect_equalities(eqs: &mut Vec<Vec<BigInt>>, ineqs: &mut Vec<Vec<BigInt>>) -> bool {
    let mut i = 0;
    while i < ineqs.len() {
        let mut matched = None;
        for j in i + 1..ineqs.len() {
            let opposite = ineqs[i][1..]
                .iter()
                .zip(ineqs[j][1..].iter())
                .all(|(a, b)| *a == -b);
            if opposite {
                matched = Some(j);
                break;
            }
        }
        let Some(j) = matched else {
            i += 1;
            continue;
        };
        let sum = &ineqs[i][0] + &ineqs[j][0];
        if sum.is_negative() {
            return true;
        }
        if sum.is_zero() {
            let eq = ineqs[i].clone();
            ineqs.remove(j);
            ineqs.remove(i);
            eqs.push(eq);
            continue;
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn gauss_substitutes_into_inequalities() {
        // x1 = 2 and x0 + x1 >= 5 over two dims.
        let mut eqs = vec![row(&[-2, 0, 1])];
        let mut ineqs = vec![row(&[-5, 1, 1])];
        let empty = gauss(2, &mut [], &mut eqs, &mut ineqs);
        assert!(!empty);
        assert_eq!(ineqs[0], row(&[-3, 1, 0]));
    }

    #[test]
    fn normalize_floors_inequality_constants() {
        let mut eqs = vec![];
        let mut ineqs = vec![row(&[-5, 2, 0])];
        assert!(!normalize_constraints(&mut eqs, &mut ineqs));
        // 2x >= 5 becomes x >= 3 over the integers.
        assert_eq!(ineqs[0], row(&[-3, 1, 0]));
    }

    #[test]
    fn normalize_detects_unsatisfiable_equality() {
        let mut eqs = vec![row(&[1, 2, 0])];
        let mut ineqs = vec![];
        assert!(normalize_constraints(&mut eqs, &mut ineqs));
    }

    #[test]
    fn opposite_inequalities_become_an_equality() {
        let mut eqs = vec![];
        let mut ineqs = vec![row(&[-3, 1, 1]), row(&[3, -1, -1]), row(&[0, 1, 0])];
        assert!(!detect_equalities(&mut eqs, &mut ineqs));
        assert_eq!(eqs.len(), 1);
        assert_eq!(ineqs.len(), 1);
        assert_eq!(eqs[0], row(&[-3, 1, 1]));
    }
}
