#[cfg(test)]
pub mod value_tests {
    use parlex::Value;

    fn samples() -> Vec<Value> {
        vec![
            Value::from_i64(0),
            Value::from_i64(1),
            Value::from_i64(-1),
            Value::from_i64(7),
            Value::from_i64(-42),
            Value::from_frac(1.into(), 2.into()),
            Value::from_frac((-3).into(), 4.into()),
            Value::from_frac(22.into(), 7.into()),
            Value::infty(),
            Value::neginfty(),
        ]
    }

    /// NaN never compares equal, so laws that can produce NaN on both
    /// sides need this.
    fn same(a: &Value, b: &Value) -> bool {
        (a.is_nan() && b.is_nan()) || a == b
    }

    #[test]
    fn addition_and_multiplication_commute() {
        for a in samples() {
            for b in samples() {
                let ab = a.clone() + b.clone();
                let ba = b.clone() + a.clone();
                assert!(same(&ab, &ba), "{} + {} != {} + {}", a, b, b, a);
                let ab = a.clone() * b.clone();
                let ba = b.clone() * a.clone();
                assert!(same(&ab, &ba), "{} * {} != {} * {}", a, b, b, a);
            }
        }
    }

    #[test]
    fn addition_is_associative_on_finite_values() {
        let finite: Vec<Value> = samples().into_iter().filter(|v| v.is_rat()).collect();
        for a in &finite {
            for b in &finite {
                for c in &finite {
                    let l = (a.clone() + b.clone()) + c.clone();
                    let r = a.clone() + (b.clone() + c.clone());
                    assert_eq!(l, r);
                }
            }
        }
    }

    #[test]
    fn identities_hold() {
        for a in samples() {
            assert!(same(&(a.clone() + Value::zero()), &a));
            assert!(same(&(a.clone() * Value::one()), &a));
        }
    }

    #[test]
    fn negation_cancels_finite_values() {
        for a in samples() {
            if a.is_rat() {
                assert!((a.clone() + (-a.clone())).is_zero());
            }
        }
        assert!((Value::infty() + Value::neginfty()).is_nan());
    }

    #[test]
    fn special_value_rule_table() {
        assert!((Value::infty() - Value::infty()).is_nan());
        assert!((Value::zero() * Value::infty()).is_nan());
        assert!((Value::infty() / Value::infty()).is_nan());
        assert!((Value::from_i64(5) / Value::zero()).is_nan());
        assert!((Value::from_i64(5) / Value::infty()).is_zero());
        assert!((Value::infty() + Value::from_i64(-100)).is_infty());
        assert!((Value::neginfty() * Value::from_i64(-3)).is_infty());
        for a in samples() {
            assert!((a.clone() + Value::nan()).is_nan());
            assert!((a.clone() * Value::nan()).is_nan());
            assert!((a.clone() - Value::nan()).is_nan());
            assert!((a.clone() / Value::nan()).is_nan());
        }
    }

    #[test]
    fn floor_brackets_the_value() {
        for a in samples() {
            if !a.is_rat() {
                continue;
            }
            let f = a.clone().floor();
            assert!(f.le(&a));
            assert!(a.lt(&(f + Value::one())));
        }
    }

    #[test]
    fn ceil_is_negated_floor() {
        for a in samples() {
            if !a.is_rat() {
                continue;
            }
            let l = (-a.clone()).ceil();
            let r = -(a.clone().floor());
            assert_eq!(l, r);
        }
    }

    #[test]
    fn trunc_rounds_towards_zero() {
        assert_eq!(
            Value::from_frac(7.into(), 2.into()).trunc(),
            Value::from_i64(3)
        );
        assert_eq!(
            Value::from_frac((-7).into(), 2.into()).trunc(),
            Value::from_i64(-3)
        );
    }

    #[test]
    fn two_exp_round_trips() {
        for n in 0u64..=60 {
            let p = Value::from_u64(n).two_exp().unwrap();
            assert!(p.is_int());
            let num = p.as_rational().unwrap().numer().clone();
            // floor(log2(2^n)) == n
            assert_eq!(num.bits(), n + 1);
        }
    }

    #[test]
    fn two_exp_rejects_rationals() {
        assert!(Value::from_frac(1.into(), 2.into()).two_exp().is_err());
        assert!(Value::infty().two_exp().is_err());
    }

    #[test]
    fn normalization_is_idempotent() {
        let cases = [(4i64, 6i64), (-4, 6), (4, -6), (0, 5), (10, 1), (-9, -3)];
        for (n, d) in cases {
            let v = Value::from_frac(n.into(), d.into());
            let num = v.get_num_i64().unwrap();
            let den = v.get_den_i64().unwrap();
            assert!(den >= 1);
            assert_eq!(gcd_u64(num.unsigned_abs(), den.unsigned_abs()), 1);
            // rebuilding from the normalized parts changes nothing
            let w = Value::from_frac(num.into(), den.into());
            assert_eq!(v, w);
        }
    }

    #[test]
    fn accessors_reject_special_values() {
        assert!(Value::infty().get_num_i64().is_err());
        assert!(Value::nan().get_den_i64().is_err());
        assert!(Value::neginfty().get_f64().is_err());
        assert_eq!(Value::from_frac(3.into(), 4.into()).get_f64().unwrap(), 0.75);
    }

    #[test]
    fn modulo_uses_floor_semantics() {
        let r = Value::from_i64(-7).modulo(Value::from_i64(3));
        assert_eq!(r, Value::from_i64(2));
        assert!(Value::from_frac(1.into(), 2.into())
            .modulo(Value::from_i64(3))
            .is_nan());
    }

    #[test]
    fn gcdext_satisfies_bezout() {
        let pairs = [(12i64, 18i64), (-12, 18), (7, 13), (0, 5), (6, 0)];
        for (a, b) in pairs {
            let (g, x, y) = Value::from_i64(a).gcdext(Value::from_i64(b));
            let lhs = x * Value::from_i64(a) + y * Value::from_i64(b);
            assert_eq!(lhs, g);
        }
    }

    #[test]
    fn comparisons_order_the_extended_line() {
        assert!(Value::neginfty().lt(&Value::from_i64(-1000000)));
        assert!(Value::from_i64(1000000).lt(&Value::infty()));
        assert!(Value::from_frac(1.into(), 3.into()).lt(&Value::from_frac(1.into(), 2.into())));
        assert!(!Value::nan().lt(&Value::nan()));
        assert!(!Value::nan().ge(&Value::zero()));
        assert_eq!(
            Value::from_i64(3).cmp_i64(3),
            Some(std::cmp::Ordering::Equal)
        );
        assert_eq!(Value::nan().cmp_i64(0), None);
    }

    fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
        while b != 0 {
            let t = a % b;
            a = b;
            b = t;
        }
        a
    }
}
