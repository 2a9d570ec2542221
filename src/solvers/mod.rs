mod context;
mod driver;
mod lexmin;
mod lexopt;
mod sol;

pub use lexopt::{foreach_lexopt, partial_lexopt};
pub use sol::Matrix;
