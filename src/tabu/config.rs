//! Tabu Search configuration.

/// Optimization direction.
///
/// The engine always compares oriented values where lower is better;
/// reported values are the raw objective `f(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    /// Search for the largest `f(x)`.
    #[default]
    Maximize,
    /// Search for the smallest `f(x)`.
    Minimize,
}

impl Objective {
    /// Maps an objective value onto the internal lower-is-better scale.
    #[inline]
    pub fn orient(self, value: f64) -> f64 {
        match self {
            Objective::Maximize => -value,
            Objective::Minimize => value,
        }
    }

    /// Whether `candidate` is strictly better than `incumbent`.
    #[inline]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.orient(candidate) < self.orient(incumbent)
    }
}

/// Stepping rule for an adaptive diversification threshold.
///
/// The controller fires when the fraction of over-aged variables exceeds
/// the current level; each firing raises the level by `step`. Once the
/// level passes `ceiling`, locks and ages are released and the level drops
/// back to `reset`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdSchedule {
    /// Initial level.
    pub start: f64,
    /// Increment per firing.
    pub step: f64,
    /// Level above which the controller cools down. The comparison
    /// tolerates 1e-9 of accumulated rounding, so `0.2 + 0.1 + 0.1` does not
    /// count as above a ceiling of `0.4` and the defaults cool down on the
    /// third firing.
    pub ceiling: f64,
    /// Level after a cool-down.
    pub reset: f64,
}

impl ThresholdSchedule {
    /// Default restart schedule: 0.2, +0.1, cool-down above 0.4 back to 0.
    pub const RESTART: Self = Self {
        start: 0.2,
        step: 0.1,
        ceiling: 0.4,
        reset: 0.0,
    };

    /// Default power-move schedule: 0.2, +0.1, cool-down above 0.4 back to 0.2.
    pub const POWER_MOVE: Self = Self {
        start: 0.2,
        step: 0.1,
        ceiling: 0.4,
        reset: 0.2,
    };

    fn validate(&self, name: &str) -> Result<(), String> {
        if self.step.is_nan() || self.step <= 0.0 {
            return Err(format!("{name}: step must be positive"));
        }
        if self.start < 0.0 || self.reset < 0.0 {
            return Err(format!("{name}: start and reset must be non-negative"));
        }
        if self.start > self.ceiling || self.reset > self.ceiling {
            return Err(format!("{name}: start and reset must not exceed ceiling"));
        }
        Ok(())
    }
}

/// Configuration parameters for the QBF-PT Tabu Search.
///
/// # Examples
///
/// ```
/// use qbfpt_tabu::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_tenure(20)
///     .with_max_iterations(5000)
///     .with_best_improving(true)
///     .with_restart(true);
/// assert_eq!(config.tenure, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Iterations an index stays tabu after being toggled. The tabu list
    /// holds `2 * tenure` slots, or `6 * tenure` with power moves.
    pub tenure: usize,
    /// Fixed iteration budget. There is no convergence exit.
    pub max_iterations: usize,
    /// Scan every move (`true`) or stop each phase at the first improving
    /// admissible move (`false`).
    pub best_improving: bool,
    /// Enable the power-move controller (two-variable compound moves).
    pub power_moves: bool,
    /// Enable the restart controller (freezing stale selected variables).
    pub restart: bool,
    /// Optimization direction.
    pub objective: Objective,
    /// Iterations a variable may stay selected before counting as over-aged.
    pub max_age: usize,
    /// Threshold stepping of the restart controller.
    pub restart_schedule: ThresholdSchedule,
    /// Threshold stepping of the power-move controller.
    pub power_schedule: ThresholdSchedule,
    /// Random seed for tie-breaking shuffles (None for random).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tenure: 10,
            max_iterations: 1000,
            best_improving: false,
            power_moves: false,
            restart: false,
            objective: Objective::Maximize,
            max_age: 50,
            restart_schedule: ThresholdSchedule::RESTART,
            power_schedule: ThresholdSchedule::POWER_MOVE,
            seed: None,
        }
    }
}

impl TabuConfig {
    /// Sets the tabu tenure.
    pub fn with_tenure(mut self, tenure: usize) -> Self {
        self.tenure = tenure;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Selects best-improving (`true`) or first-improving scanning.
    pub fn with_best_improving(mut self, enabled: bool) -> Self {
        self.best_improving = enabled;
        self
    }

    /// Enables or disables power moves.
    pub fn with_power_moves(mut self, enabled: bool) -> Self {
        self.power_moves = enabled;
        self
    }

    /// Enables or disables the restart controller.
    pub fn with_restart(mut self, enabled: bool) -> Self {
        self.restart = enabled;
        self
    }

    /// Sets the optimization direction.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the over-age limit.
    pub fn with_max_age(mut self, max_age: usize) -> Self {
        self.max_age = max_age;
        self
    }

    /// Sets the restart threshold schedule.
    pub fn with_restart_schedule(mut self, schedule: ThresholdSchedule) -> Self {
        self.restart_schedule = schedule;
        self
    }

    /// Sets the power-move threshold schedule.
    pub fn with_power_schedule(mut self, schedule: ThresholdSchedule) -> Self {
        self.power_schedule = schedule;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of tabu list slots implied by tenure and power moves.
    pub fn tabu_capacity(&self) -> usize {
        let slots_per_iteration = if self.power_moves { 6 } else { 2 };
        slots_per_iteration * self.tenure
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.tenure == 0 {
            return Err("tenure must be at least 1".into());
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if self.max_age == 0 {
            return Err("max_age must be at least 1".into());
        }
        self.restart_schedule.validate("restart_schedule")?;
        self.power_schedule.validate("power_schedule")?;
        Ok(())
    }
}
