//! Helpers for dense coefficient vectors of arbitrary-precision integers.
//!
//! Constraint rows, integer-division definitions and tableau rows are all
//! stored as `[BigInt]` slices; the functions here keep the element-wise
//! arithmetic in one place.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

/// Inner product of the common prefix of two vectors.
pub fn inner_product(a: &[BigInt], b: &[BigInt]) -> BigInt {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Gcd of the absolute values of all entries; zero for an all-zero slice.
pub fn gcd(v: &[BigInt]) -> BigInt {
    let mut g = BigInt::zero();
    for x in v {
        if !x.is_zero() {
            g = g.gcd(x);
        }
    }
    g
}

/// Divide every entry of `v` by the common gcd of the whole slice.
pub fn normalize(v: &mut [BigInt]) {
    let g = gcd(v);
    if g.is_zero() || g == BigInt::from(1) {
        return;
    }
    for x in v.iter_mut() {
        *x = &*x / &g;
    }
}

pub fn neg(v: &mut [BigInt]) {
    for x in v.iter_mut() {
        *x = -std::mem::take(x);
    }
}

pub fn scale(v: &mut [BigInt], f: &BigInt) {
    for x in v.iter_mut() {
        *x = &*x * f;
    }
}

/// Replace every entry by its floor remainder modulo `m` (result in `[0, m)`).
pub fn fdiv_r_assign(v: &mut [BigInt], m: &BigInt) {
    for x in v.iter_mut() {
        *x = x.mod_floor(m);
    }
}

/// Replace every entry by its floor quotient by `m`.
pub fn fdiv_q_assign(v: &mut [BigInt], m: &BigInt) {
    for x in v.iter_mut() {
        *x = x.div_floor(m);
    }
}

/// `dst = a * dst + b * src`, element-wise over the common prefix.
pub fn combine(dst: &mut [BigInt], a: &BigInt, b: &BigInt, src: &[BigInt]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = &*d * a + s * b;
    }
}

/// Eliminate position `pos` of `dst` using `src`, which must have a
/// non-zero entry at `pos`. The combination is exact: `dst` is scaled by
/// `src[pos]/g` and `src` is subtracted `dst[pos]/g` times, with `g` their
/// gcd. When `denom` is given it is the denominator of `dst` (as in an
/// integer-division definition) and is scaled along, keeping the value of
/// `dst/denom` unchanged.
pub fn elim(dst: &mut [BigInt], src: &[BigInt], pos: usize, denom: Option<&mut BigInt>) {
    if dst[pos].is_zero() {
        return;
    }
    let g = dst[pos].gcd(&src[pos]);
    let a = (&src[pos] / &g).abs();
    let sgn = if src[pos].is_negative() { -1 } else { 1 };
    let b = -BigInt::from(sgn) * (&dst[pos] / &g);
    combine(dst, &a, &b, src);
    if let Some(d) = denom {
        *d = &*d * &a;
        let mut whole: Vec<BigInt> = Vec::with_capacity(1 + dst.len());
        whole.push(d.clone());
        whole.extend_from_slice(dst);
        let g = gcd(&whole);
        if !g.is_zero() && g != BigInt::from(1) {
            *d = &*d / &g;
            for x in dst.iter_mut() {
                *x = &*x / &g;
            }
        }
    }
    debug_assert!(dst[pos].is_zero());
}

pub fn first_non_zero(v: &[BigInt]) -> Option<usize> {
    v.iter().position(|x| !x.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn normalize_divides_by_common_gcd() {
        let mut v = vec_of(&[6, -9, 12]);
        normalize(&mut v);
        assert_eq!(v, vec_of(&[2, -3, 4]));
    }

    #[test]
    fn elim_zeroes_the_target_position() {
        let mut dst = vec_of(&[5, 4, 7]);
        let src = vec_of(&[1, 6, 0]);
        elim(&mut dst, &src, 1, None);
        assert!(dst[1].is_zero());
        // 3*(5,4,7) - 2*(1,6,0) = (13, 0, 21)
        assert_eq!(dst, vec_of(&[13, 0, 21]));
    }

    #[test]
    fn elim_scales_the_denominator() {
        let mut dst = vec_of(&[1, 2, 1]);
        let mut d = BigInt::from(2);
        let src = vec_of(&[0, 3, 0]);
        elim(&mut dst, &src, 1, Some(&mut d));
        // 3*(1,2,1) - 2*(0,3,0) = (3,0,3) over 6, normalized to (1,0,1)/2.
        assert_eq!(dst, vec_of(&[1, 0, 1]));
        assert_eq!(d, BigInt::from(2));
    }
}
