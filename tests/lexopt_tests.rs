#[cfg(test)]
pub mod lexopt_tests {
    use num_bigint::BigInt;
    use parlex::{foreach_lexopt, partial_lexopt, BasicMap, BasicSet, Error, Value};

    fn point(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    /// How many of the pieces contain the given (params..., outputs...)
    /// point. Disjointness of the solution means this is 0 or 1.
    fn pieces_containing(pieces: &[BasicMap], dims: &[i64]) -> usize {
        pieces
            .iter()
            .filter(|p| p.contains_point(&point(dims)))
            .count()
    }

    /// The single-output optimum at `params` must be claimed by exactly
    /// one piece, and no piece may claim any other output value from the
    /// window.
    fn assert_optimum(pieces: &[BasicMap], params: &[i64], expected: i64, window: &[i64]) {
        let mut dims = params.to_vec();
        dims.push(expected);
        assert_eq!(
            pieces_containing(pieces, &dims),
            1,
            "expected optimum {} at {:?}",
            expected,
            params
        );
        for &w in window {
            if w == expected {
                continue;
            }
            let mut other = params.to_vec();
            other.push(w);
            assert_eq!(
                pieces_containing(pieces, &other),
                0,
                "non-optimal {} claimed at {:?}",
                w,
                params
            );
        }
    }

    #[test]
    fn should_split_on_the_sign_of_the_parameter() {
        // x >= 0 and x >= p: the minimum is max(p, 0).
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, 0, 1]);
        rel.add_inequality_i64(&[0, -1, 1]);
        let (pieces, empty) = partial_lexopt(rel, BasicSet::universe(1), true, false).unwrap();
        assert!(empty.unwrap().is_empty());
        for p in -3..=3 {
            let expected = p.max(0);
            assert_optimum(&pieces, &[p], expected, &(-4..=5).collect::<Vec<_>>());
        }
    }

    #[test]
    fn should_introduce_a_div_for_the_parity_split() {
        // 2x >= p: the minimum is ceil(p/2).
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, -1, 2]);
        let (pieces, _) = partial_lexopt(rel, BasicSet::universe(1), false, false).unwrap();
        assert!(pieces.iter().any(|p| p.n_div() > 0));
        for p in -4..=4 {
            let expected = if p >= 0 { (p + 1) / 2 } else { p / 2 };
            assert_optimum(&pieces, &[p], expected, &(-5..=5).collect::<Vec<_>>());
        }
    }

    #[test]
    fn should_minimize_lexicographically_without_parameters() {
        // x + y >= 10, x >= 0, y >= 0: lexmin is (0, 10).
        let mut rel = BasicMap::new(0, 0, 2);
        rel.add_inequality_i64(&[-10, 1, 1]);
        rel.add_inequality_i64(&[0, 1, 0]);
        rel.add_inequality_i64(&[0, 0, 1]);
        let (pieces, _) = partial_lexopt(rel, BasicSet::universe(0), false, false).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces_containing(&pieces, &[0, 10]), 1);
        assert_eq!(pieces_containing(&pieces, &[1, 9]), 0);
        assert_eq!(pieces_containing(&pieces, &[0, 11]), 0);
    }

    #[test]
    fn should_maximize_when_asked() {
        // 0 <= x <= p over p >= 0: the maximum is p.
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, 0, 1]);
        rel.add_inequality_i64(&[0, 1, -1]);
        let mut dom = BasicSet::universe(1);
        dom.add_inequality_i64(&[0, 1]);
        let (pieces, _) = partial_lexopt(rel, dom, false, true).unwrap();
        for p in 0..=4 {
            assert_optimum(&pieces, &[p], p, &(-1..=5).collect::<Vec<_>>());
        }
    }

    #[test]
    fn should_track_the_infeasible_parameters() {
        // 3x = p: solvable only when p is a multiple of three.
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_equality_i64(&[0, -1, 3]);
        let (pieces, empty) = partial_lexopt(rel, BasicSet::universe(1), true, false).unwrap();
        let empty = empty.unwrap();
        assert!(!empty.is_empty());
        for p in -6..=6 {
            if p % 3 == 0 {
                assert_optimum(&pieces, &[p], p / 3, &(-3..=3).collect::<Vec<_>>());
                assert!(
                    !empty.iter().any(|s| s.contains_point(&point(&[p]))),
                    "p = {} wrongly reported infeasible",
                    p
                );
            } else {
                for x in -3..=3 {
                    assert_eq!(pieces_containing(&pieces, &[p, x]), 0);
                }
                assert_eq!(
                    empty
                        .iter()
                        .filter(|s| s.contains_point(&point(&[p])))
                        .count(),
                    1,
                    "p = {} must be reported infeasible exactly once",
                    p
                );
            }
        }
    }

    #[test]
    fn should_split_on_the_order_of_two_parameters() {
        // x >= p1 and x >= p2: the minimum is max(p1, p2).
        let mut rel = BasicMap::new(2, 0, 1);
        rel.add_inequality_i64(&[0, -1, 0, 1]);
        rel.add_inequality_i64(&[0, 0, -1, 1]);
        let (pieces, _) = partial_lexopt(rel, BasicSet::universe(2), false, false).unwrap();
        assert!(pieces.len() >= 2);
        for p1 in -2..=2 {
            for p2 in -2..=2 {
                let expected = p1.max(p2);
                assert_optimum(&pieces, &[p1, p2], expected, &(-3..=3).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn should_preserve_the_optimum_under_resolving() {
        // Idempotence: solving the graph of the optimum again changes
        // nothing about which points are optimal.
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, 0, 1]);
        rel.add_inequality_i64(&[0, -1, 1]);
        let (pieces, _) = partial_lexopt(rel, BasicSet::universe(1), false, false).unwrap();
        let mut resolved = Vec::new();
        for piece in &pieces {
            let (again, _) =
                partial_lexopt(piece.clone(), BasicSet::universe(1), false, false).unwrap();
            resolved.extend(again);
        }
        for p in -3..=3 {
            let expected: i64 = p.max(0);
            assert_eq!(pieces_containing(&resolved, &[p, expected]), 1);
            for x in -4..=5 {
                if x != expected {
                    assert_eq!(pieces_containing(&resolved, &[p, x]), 0);
                }
            }
        }
    }

    #[test]
    fn should_stream_pieces_with_affine_matrices() {
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, 0, 1]);
        rel.add_inequality_i64(&[0, -1, 1]);
        let mut seen: Vec<(BasicSet, parlex::Matrix)> = Vec::new();
        foreach_lexopt(&rel, false, |dom, mat| {
            assert_eq!(mat.n_row(), 2);
            assert_eq!(*mat.at(0, 0), Value::one());
            seen.push((dom, mat));
            Ok(())
        })
        .unwrap();
        assert!(seen.len() >= 2);
        for p in -3..=3i64 {
            let expected = Value::from_i64(p.max(0));
            let mut hits = 0;
            for (dom, mat) in &seen {
                let Some(full) = dom.extend_with_divs(&point(&[p])) else {
                    continue;
                };
                if !dom.contains(&full) {
                    continue;
                }
                hits += 1;
                let mut value = mat.at(1, 0).clone();
                for (j, coord) in full.iter().enumerate() {
                    let c = Value::from_int(coord.clone());
                    value = value + mat.at(1, 1 + j).clone() * c;
                }
                assert_eq!(value, expected, "wrong optimum at p = {}", p);
            }
            assert_eq!(hits, 1, "p = {} must be covered exactly once", p);
        }
    }

    #[test]
    fn should_abort_the_traversal_on_visitor_error() {
        let mut rel = BasicMap::new(1, 0, 1);
        rel.add_inequality_i64(&[0, 0, 1]);
        rel.add_inequality_i64(&[0, -1, 1]);
        let mut calls = 0;
        let res = foreach_lexopt(&rel, false, |_, _| {
            calls += 1;
            Err(Error::InvalidArgument("stop"))
        });
        assert_eq!(res, Err(Error::InvalidArgument("stop")));
        assert_eq!(calls, 1);
    }

    #[test]
    fn should_reject_a_mismatched_domain() {
        let rel = BasicMap::new(1, 0, 1);
        let dom = BasicSet::universe(2);
        assert!(matches!(
            partial_lexopt(rel, dom, false, false),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn should_report_an_empty_relation_as_all_infeasible() {
        let mut rel = BasicMap::new(1, 0, 1);
        // 0 >= 1
        rel.add_inequality_i64(&[-1, 0, 0]);
        let (pieces, empty) = partial_lexopt(rel, BasicSet::universe(1), true, false).unwrap();
        assert!(pieces.is_empty());
        let empty = empty.unwrap();
        assert_eq!(empty.len(), 1);
        assert!(empty[0].contains_point(&point(&[17])));
    }
}
