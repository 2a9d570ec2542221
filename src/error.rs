use std::fmt;

/// Errors reported by the solver and its data types.
///
/// Infeasibility is never an error: discovering that a (sub)problem has no
/// solution converts the working tableau into its terminal empty state and
/// the driver emits a "no solution" piece instead.
///
/// Out-of-memory conditions abort the process (standard Rust allocation
/// behavior) and therefore have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A value or argument of the wrong shape: a non-integer where an
    /// integer is required, a domain that does not match the relation, or
    /// an output variable that is unbounded over part of the domain.
    InvalidArgument(&'static str),
    /// An invariant of the simplex machinery was violated. These indicate
    /// a bug in the engine and propagate to the top level.
    Internal(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            Error::Internal(s) => write!(f, "internal error: {}", s),
        }
    }
}

impl std::error::Error for Error {}
