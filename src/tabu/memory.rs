//! Long-term memory for the diversification controllers.
//!
//! Ages and removal locks are sized from the instance and owned by one
//! engine. Neither affects feasibility; they only shape which moves the
//! scan is allowed to consider.

use super::config::ThresholdSchedule;
use crate::qbf::BinarySolution;

/// Absorbs accumulated rounding in `start + k * step`.
const LEVEL_EPSILON: f64 = 1e-9;

/// Per-variable ages and removal locks.
#[derive(Debug, Clone)]
pub struct LongTermMemory {
    ages: Vec<usize>,
    locked: Vec<bool>,
    max_age: usize,
}

impl LongTermMemory {
    pub fn new(size: usize, max_age: usize) -> Self {
        Self {
            ages: vec![0; size],
            locked: vec![false; size],
            max_age,
        }
    }

    /// Ages every selected variable by one iteration and resets the rest.
    ///
    /// Returns the fraction of variables whose age exceeds `max_age`.
    pub fn advance(&mut self, solution: &BinarySolution) -> f64 {
        let mut over_aged = 0usize;
        for (age, &selected) in self.ages.iter_mut().zip(solution.selection()) {
            if selected {
                *age += 1;
            } else {
                *age = 0;
            }
            if *age > self.max_age {
                over_aged += 1;
            }
        }
        if self.ages.is_empty() {
            0.0
        } else {
            over_aged as f64 / self.ages.len() as f64
        }
    }

    /// Locks every over-aged variable against removal. Returns how many
    /// variables are locked afterwards.
    pub fn lock_over_aged(&mut self) -> usize {
        for (lock, &age) in self.locked.iter_mut().zip(&self.ages) {
            if age > self.max_age {
                *lock = true;
            }
        }
        self.locked_count()
    }

    /// Clears every lock and age.
    pub fn release(&mut self) {
        self.locked.iter_mut().for_each(|l| *l = false);
        self.ages.iter_mut().for_each(|a| *a = 0);
    }

    #[inline]
    pub fn is_locked(&self, index: usize) -> bool {
        self.locked[index]
    }

    pub fn age(&self, index: usize) -> usize {
        self.ages[index]
    }

    pub fn locked_count(&self) -> usize {
        self.locked.iter().filter(|&&l| l).count()
    }
}

/// Current level of one diversification controller.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveThreshold {
    schedule: ThresholdSchedule,
    level: f64,
}

impl AdaptiveThreshold {
    pub fn new(schedule: ThresholdSchedule) -> Self {
        Self {
            schedule,
            level: schedule.start,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Whether `fraction` of over-aged variables fires the controller.
    pub fn is_exceeded_by(&self, fraction: f64) -> bool {
        fraction > self.level
    }

    /// Raises the level after a firing.
    pub fn advance(&mut self) {
        self.level += self.schedule.step;
    }

    /// Whether the level has passed the ceiling.
    pub fn needs_cool_down(&self) -> bool {
        self.level > self.schedule.ceiling + LEVEL_EPSILON
    }

    pub fn reset(&mut self) {
        self.level = self.schedule.reset;
    }
}
