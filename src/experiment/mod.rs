//! Concurrent comparison runs.
//!
//! An [`Experiment`] is a list of labelled configurations executed against
//! the same search space. Every run owns its own engine, RNG and memory
//! structures; runs share nothing but a read-only reference to the space.
//! [`Experiment::run`] returns only after every run has been joined.

use std::time::{Duration, Instant};

use crate::error::{QbfError, Result};
use crate::tabu::{SearchSpace, TabuConfig, TabuResult, TabuRunner};

/// One labelled configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    pub label: String,
    pub config: TabuConfig,
}

/// Outcome of one variant.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub label: String,
    pub result: TabuResult,
    pub elapsed: Duration,
}

/// A set of variants run side by side.
#[derive(Debug, Clone, Default)]
pub struct Experiment {
    variants: Vec<Variant>,
}

impl Experiment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variant.
    pub fn with_variant(mut self, label: impl Into<String>, config: TabuConfig) -> Self {
        self.variants.push(Variant {
            label: label.into(),
            config,
        });
        self
    }

    /// The six reference variants for an instance of size `size`:
    /// baseline (tenure 10), tenure 15, best-improving, power moves,
    /// restart intensification and a size-proportional tenure
    /// (`floor(0.2 * n)`, at least 1).
    pub fn standard_suite(size: usize, max_iterations: usize) -> Self {
        let base = TabuConfig::default()
            .with_tenure(10)
            .with_max_iterations(max_iterations);
        let proportional = ((size as f64 * 0.2).floor() as usize).max(1);

        Self::new()
            .with_variant("standard", base.clone())
            .with_variant("tenure 15", base.clone().with_tenure(15))
            .with_variant("best improving", base.clone().with_best_improving(true))
            .with_variant("power moves", base.clone().with_power_moves(true))
            .with_variant("restart", base.clone().with_restart(true))
            .with_variant("proportional tenure", base.with_tenure(proportional))
    }

    /// Applies the same seed to every variant.
    pub fn with_seed(mut self, seed: u64) -> Self {
        for variant in &mut self.variants {
            variant.config.seed = Some(seed);
        }
        self
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Runs every variant concurrently and waits for all of them.
    ///
    /// Summaries are returned in variant order. Configurations are
    /// validated up front so that no run starts if any would fail.
    #[tracing::instrument(level = "info", skip_all, fields(variants = self.variants.len()))]
    pub fn run<S: SearchSpace>(&self, space: &S) -> Result<Vec<RunSummary>> {
        for variant in &self.variants {
            variant
                .config
                .validate()
                .map_err(|e| QbfError::InvalidConfig(format!("{}: {e}", variant.label)))?;
        }

        let summaries = self.run_all(space);
        summaries.into_iter().collect()
    }

    #[cfg(feature = "parallel")]
    fn run_all<S: SearchSpace>(&self, space: &S) -> Vec<Result<RunSummary>> {
        use rayon::prelude::*;

        self.variants
            .par_iter()
            .map(|variant| run_variant(space, variant))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all<S: SearchSpace>(&self, space: &S) -> Vec<Result<RunSummary>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .variants
                .iter()
                .map(|variant| scope.spawn(move || run_variant(space, variant)))
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(summary) => summary,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

fn run_variant<S: SearchSpace>(space: &S, variant: &Variant) -> Result<RunSummary> {
    let start = Instant::now();
    let result = TabuRunner::run(space, &variant.config)?;
    let elapsed = start.elapsed();
    tracing::info!(
        label = %variant.label,
        best_value = result.best_value,
        elapsed_ms = elapsed.as_millis() as u64,
        "variant finished"
    );
    Ok(RunSummary {
        label: variant.label.clone(),
        result,
        elapsed,
    })
}
