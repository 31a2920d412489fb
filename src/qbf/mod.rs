//! Quadratic binary functions `f(x) = x'Ax`.
//!
//! [`QbfModel`] owns the coefficient matrix. Evaluating a move always goes
//! through an [`Assignment`] built from the solution being modified, or a
//! [`DeltaTable`] cached from one for a full neighborhood scan.

mod instance;
mod model;
mod solution;

pub use instance::InstanceParser;
pub use model::{Assignment, DeltaTable, QbfModel};
pub use solution::BinarySolution;
