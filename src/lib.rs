//! # parlex
//! parlex computes the lexicographic minimum (or maximum) of the integer
//! points of a rational polyhedron, parametrized by a second tuple of
//! coordinates: for every value of the parameters inside a given domain,
//! the result pins down the lexicographically smallest feasible tuple as
//! an affine function of the parameters, guarded by a region of the
//! parameter space.
//!
//! The solver is a parametric integer-programming engine built on an
//! exact rational dual-simplex tableau: feasibility is restored with
//! lexicographically smallest increments, integrality with Gomory-style
//! cuts (parametric ones introduce integer divisions of the parameters),
//! and the parameter space is split whenever the sign of a constraint
//! depends on the parameters.
//!
//! ```rust
//! use parlex::{partial_lexopt, BasicMap, BasicSet};
//!
//! // One parameter p, one output x, constrained by 2x >= p.
//! let mut rel = BasicMap::new(1, 0, 1);
//! rel.add_inequality_i64(&[0, -1, 2]);
//! let dom = BasicSet::universe(1);
//!
//! let (pieces, empty) = partial_lexopt(rel, dom, true, false).unwrap();
//! // x = ceil(p/2), expressed with an integer division of p.
//! assert!(!pieces.is_empty());
//! assert!(empty.unwrap().is_empty());
//! for piece in &pieces {
//!     println!("{}", piece);
//! }
//! ```
//!
//! Results can also be streamed with [`foreach_lexopt`], which hands each
//! (domain piece, affine output matrix) pair to a visitor as it is found.

mod error;
mod math;
mod polyhedra;
mod solvers;
mod tableau;

pub use error::Error;
pub use math::Value;
pub use polyhedra::{BasicMap, BasicSet};
pub use solvers::{foreach_lexopt, partial_lexopt, Matrix};
