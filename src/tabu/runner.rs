//! Fixed-budget Tabu Search driver.
//!
//! # Algorithm
//!
//! 1. Start from the empty solution (cost 0)
//! 2. Run exactly `max_iterations` engine steps
//! 3. Track the best solution and its value after every step
//!
//! There is no stagnation exit; the only early stop is an external
//! cancellation flag.
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search, Part I", *ORSA Journal on Computing* 1(3), 190-206.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::TabuConfig;
use super::engine::TabuSearch;
use super::types::SearchSpace;
use crate::error::Result;
use crate::qbf::BinarySolution;

/// Result of a Tabu Search run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuResult {
    /// Best solution found.
    pub best: BinarySolution,
    /// Objective value `f(x)` of the best solution.
    pub best_value: f64,
    /// Total iterations executed.
    pub iterations: usize,
    /// Iteration at which the best solution was found (0 = the empty start).
    pub best_iteration: usize,
    /// Best value after each iteration.
    pub value_history: Vec<f64>,
    /// Times the restart controller fired.
    pub restarts: usize,
    /// Times the power-move controller fired.
    pub power_phases: usize,
    /// Whether the run was cancelled before exhausting its budget.
    pub cancelled: bool,
}

/// Tabu Search runner.
pub struct TabuRunner;

impl TabuRunner {
    /// Executes Tabu Search over `space` for `config.max_iterations` steps.
    ///
    /// # Examples
    ///
    /// ```
    /// use qbfpt_tabu::qbf::QbfModel;
    /// use qbfpt_tabu::tabu::{TabuConfig, TabuRunner};
    /// use qbfpt_tabu::QbfPt;
    ///
    /// let model = QbfModel::from_upper_triangle(3, &[1.0, -4.0, 1.0, 2.0, 1.0, 3.0]).unwrap();
    /// let problem = QbfPt::new(model);
    /// let config = TabuConfig::default().with_tenure(1).with_max_iterations(50).with_seed(7);
    ///
    /// let result = TabuRunner::run(&problem, &config).unwrap();
    /// assert_eq!(result.best_value, 6.0);
    /// ```
    pub fn run<S: SearchSpace>(space: &S, config: &TabuConfig) -> Result<TabuResult> {
        Self::run_with_cancel(space, config, None)
    }

    /// Runs Tabu Search with an optional cancellation token checked once
    /// per iteration.
    #[tracing::instrument(
        level = "debug",
        name = "Tabu Search",
        skip_all,
        fields(size = space.size(), tenure = config.tenure)
    )]
    pub fn run_with_cancel<S: SearchSpace>(
        space: &S,
        config: &TabuConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TabuResult> {
        let mut engine = TabuSearch::new(space, config.clone())?;

        let mut best_iteration = 0;
        let mut value_history = Vec::with_capacity(config.max_iterations);
        let mut cancelled = false;

        for _ in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let report = engine.step();
            if report.improved_best {
                best_iteration = report.iteration;
            }
            value_history.push(engine.best().cost());
        }

        let best = engine.best().clone();
        tracing::info!(
            best_value = best.cost(),
            selected = best.len(),
            iterations = engine.iteration(),
            best_iteration,
            restarts = engine.restarts(),
            power_phases = engine.power_phases(),
            cancelled,
            "tabu search finished"
        );

        Ok(TabuResult {
            best_value: best.cost(),
            best,
            iterations: engine.iteration(),
            best_iteration,
            value_history,
            restarts: engine.restarts(),
            power_phases: engine.power_phases(),
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QbfError;
    use crate::qbf::QbfModel;
    use crate::tabu::Objective;
    use crate::triples::ForbiddenTriples;
    use crate::QbfPt;

    fn unconstrained(upper: &[f64], n: usize) -> QbfPt {
        QbfPt::with_triples(
            QbfModel::from_upper_triangle(n, upper).unwrap(),
            ForbiddenTriples::from_triples(n, []),
        )
        .unwrap()
    }

    #[test]
    fn test_runs_exact_budget() {
        let problem = unconstrained(&[1.0, 1.0, 1.0], 2);
        let config = TabuConfig::default()
            .with_tenure(1)
            .with_max_iterations(37)
            .with_seed(42);

        let result = TabuRunner::run(&problem, &config).unwrap();
        assert_eq!(result.iterations, 37);
        assert_eq!(result.value_history.len(), 37);
        assert!(!result.cancelled);
        assert_eq!(result.best_value, 3.0);
    }

    #[test]
    fn test_history_non_decreasing_when_maximizing() {
        let problem = unconstrained(&[2.0, -3.0, 1.0, 1.0, 4.0, -2.0], 3);
        let config = TabuConfig::default()
            .with_tenure(1)
            .with_max_iterations(100)
            .with_seed(42);

        let result = TabuRunner::run(&problem, &config).unwrap();
        for window in result.value_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best value history should be non-decreasing: {} < {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(result.best.cost(), result.best_value);
    }

    #[test]
    fn test_history_non_increasing_when_minimizing() {
        let problem = unconstrained(&[2.0, -3.0, 1.0, 1.0, 4.0, -2.0], 3);
        let config = TabuConfig::default()
            .with_tenure(1)
            .with_max_iterations(100)
            .with_objective(Objective::Minimize)
            .with_seed(42);

        let result = TabuRunner::run(&problem, &config).unwrap();
        for window in result.value_history.windows(2) {
            assert!(window[1] <= window[0]);
        }
        // x = {0, 1}: 2 - 3 + 1 = 0; x = {2}: -2
        assert_eq!(result.best_value, -2.0);
    }

    #[test]
    fn test_best_iteration_recorded() {
        let problem = unconstrained(&[1.0, 1.0, 1.0], 2);
        let config = TabuConfig::default()
            .with_tenure(1)
            .with_max_iterations(20)
            .with_seed(42);

        let result = TabuRunner::run(&problem, &config).unwrap();
        assert!(result.best_iteration >= 1);
        assert!(result.best_iteration <= result.iterations);
        assert_eq!(result.value_history[result.best_iteration - 1], result.best_value);
    }

    #[test]
    fn test_cancellation() {
        let problem = unconstrained(&[1.0, 1.0, 1.0], 2);
        let config = TabuConfig::default().with_max_iterations(1000).with_seed(1);
        let flag = Arc::new(AtomicBool::new(true));

        let result = TabuRunner::run_with_cancel(&problem, &config, Some(flag)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.best_value, 0.0);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let problem = unconstrained(&[1.0], 1);
        let config = TabuConfig::default().with_max_iterations(0);
        assert!(matches!(
            TabuRunner::run(&problem, &config),
            Err(QbfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_seed_reproducibility() {
        let problem = QbfPt::new(
            QbfModel::from_upper_triangle(
                6,
                &[
                    3.0, -1.0, 2.0, -4.0, 1.0, 0.0, //
                    2.0, -2.0, 1.0, 3.0, -1.0, //
                    -1.0, 2.0, 0.5, 1.0, //
                    4.0, -3.0, 2.0, //
                    1.0, -2.0, //
                    2.5,
                ],
            )
            .unwrap(),
        );
        let config = TabuConfig::default()
            .with_tenure(2)
            .with_max_iterations(80)
            .with_restart(true)
            .with_power_moves(true)
            .with_max_age(3)
            .with_seed(99);

        let a = TabuRunner::run(&problem, &config).unwrap();
        let b = TabuRunner::run(&problem, &config).unwrap();
        assert_eq!(a.value_history, b.value_history);
        assert_eq!(a.best, b.best);
    }
}
