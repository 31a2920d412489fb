//! Tabu Search for quadratic binary functions with prohibited triples.
//!
//! Maximizes (or minimizes) `f(x) = x'Ax` over binary vectors `x` such that
//! no prohibited triple of indices is selected at once:
//!
//! - **QBF model** ([`qbf`]): coefficient matrix, instance parsing and
//!   `O(n)` incremental evaluation of insertion, removal and exchange moves.
//! - **Prohibited triples** ([`triples`]): the deterministic constraint set
//!   of an instance size and the candidate list it induces.
//! - **Tabu Search** ([`tabu`]): move scan under a FIFO tabu list with
//!   aspiration, plus aging-based restart and power-move diversification.
//! - **Experiments** ([`experiment`]): independent variants run side by
//!   side with an explicit join.
//!
//! # Example
//!
//! ```
//! use qbfpt_tabu::qbf::InstanceParser;
//! use qbfpt_tabu::tabu::TabuConfig;
//! use qbfpt_tabu::QbfPt;
//!
//! let model = InstanceParser::parse("4\n1 0 0 0\n1 0 0\n1 0\n1").unwrap();
//! let problem = QbfPt::new(model);
//! let result = problem
//!     .solve(&TabuConfig::default().with_tenure(1).with_max_iterations(200).with_seed(3))
//!     .unwrap();
//! assert!(problem.triples().is_feasible(&result.best));
//! assert_eq!(result.best_value, 3.0);
//! ```

pub mod error;
pub mod experiment;
pub mod qbf;
pub mod tabu;
pub mod triples;

mod problem;

pub use error::{QbfError, Result};
pub use problem::QbfPt;
