//! Tabu Search (TS) for binary search spaces.
//!
//! Insertion, removal and exchange moves are scanned every iteration under
//! a FIFO tabu list with an aspiration override. Two optional long-term
//! controllers watch how many variables have stayed selected for too long:
//!
//! - **restart** freezes those variables against removal and clears the
//!   tabu list, pushing the search towards insertions and exchanges
//!   elsewhere;
//! - **power moves** do the same and additionally scan two-variable
//!   insertions and removals.
//!
//! Both controllers read the same age signal and write the same locks.
//! They can be enabled together; each keeps its own threshold.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search, Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search, Part II", *ORSA Journal on Computing* 2(1), 4-32.

mod config;
mod engine;
mod list;
mod memory;
mod runner;
mod types;

pub use config::{Objective, TabuConfig, ThresholdSchedule};
pub use engine::{ExecutedMove, IterationReport, TabuSearch};
pub use list::TabuList;
pub use memory::{AdaptiveThreshold, LongTermMemory};
pub use runner::{TabuResult, TabuRunner};
pub use types::{Move, MoveEvaluator, SearchSpace};
