//! Tabu Search engine state machine.
//!
//! # Iteration
//!
//! 1. Age selected variables, compute the over-aged fraction
//! 2. Restart controller: freeze over-aged variables, clear the tabu list
//! 3. Power-move controller: same freeze, plus a compound-move scan
//! 4. Rebuild and shuffle the candidate list and the member order
//! 5. Scan insertions, removals and exchanges under tabu + aspiration
//! 6. Execute the winning single move, then the compound moves
//! 7. Refresh the cached cost and the best-known solution

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::config::TabuConfig;
use super::list::TabuList;
use super::memory::{AdaptiveThreshold, LongTermMemory};
use super::types::{Move, MoveEvaluator, SearchSpace};
use crate::error::{QbfError, Result};
use crate::qbf::BinarySolution;

/// A move chosen by the scan together with its raw delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutedMove {
    /// The move.
    pub mv: Move,
    /// Change in `f(x)` relative to the solution the scan started from.
    pub delta: f64,
    /// Whether the move was tabu and admitted only because it beat the
    /// best-known value.
    pub aspiration: bool,
}

/// What happened during one call to [`TabuSearch::step`].
#[derive(Debug, Clone)]
pub struct IterationReport {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Moves applied this iteration, single move first.
    pub moves: Vec<ExecutedMove>,
    /// Fraction of variables older than `max_age` after aging.
    pub over_aged_fraction: f64,
    /// The restart controller fired.
    pub restarted: bool,
    /// The power-move controller fired and compound moves were scanned.
    pub power_phase: bool,
    /// `f(x)` of the current solution after the iteration.
    pub value: f64,
    /// The best-known solution was replaced.
    pub improved_best: bool,
}

/// Running Tabu Search over a [`SearchSpace`].
///
/// Starts from the empty solution and advances one iteration per
/// [`step`](Self::step). All memory structures are sized from the space.
pub struct TabuSearch<'s, S: SearchSpace> {
    space: &'s S,
    config: TabuConfig,
    rng: StdRng,
    current: BinarySolution,
    best: BinarySolution,
    candidates: Vec<usize>,
    tabu: TabuList,
    memory: LongTermMemory,
    restart: AdaptiveThreshold,
    power: AdaptiveThreshold,
    iteration: usize,
    restarts: usize,
    power_phases: usize,
}

/// Best admissible move of one class seen so far during a scan.
#[derive(Debug, Clone, Copy)]
struct Pick {
    mv: Move,
    delta: f64,
    score: f64,
    aspiration: bool,
}

impl<'s, S: SearchSpace> TabuSearch<'s, S> {
    /// Creates an engine in its initialized state.
    pub fn new(space: &'s S, config: TabuConfig) -> Result<Self> {
        config.validate().map_err(QbfError::InvalidConfig)?;
        let size = space.size();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let mut current = BinarySolution::empty(size);
        current.set_cost(space.evaluate(&current));

        Ok(Self {
            space,
            rng,
            best: current.clone(),
            candidates: space.candidates(&current),
            current,
            tabu: TabuList::new(config.tabu_capacity(), size),
            memory: LongTermMemory::new(size, config.max_age),
            restart: AdaptiveThreshold::new(config.restart_schedule),
            power: AdaptiveThreshold::new(config.power_schedule),
            config,
            iteration: 0,
            restarts: 0,
            power_phases: 0,
        })
    }

    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    /// The incumbent solution.
    pub fn current(&self) -> &BinarySolution {
        &self.current
    }

    /// The best solution seen so far.
    pub fn best(&self) -> &BinarySolution {
        &self.best
    }

    pub fn tabu_list(&self) -> &TabuList {
        &self.tabu
    }

    pub fn memory(&self) -> &LongTermMemory {
        &self.memory
    }

    /// Iterations executed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Times the restart controller fired.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Times the power-move controller fired.
    pub fn power_phases(&self) -> usize {
        self.power_phases
    }

    /// Runs one iteration.
    pub fn step(&mut self) -> IterationReport {
        self.iteration += 1;

        let over_aged = self.memory.advance(&self.current);
        let restarted = self.config.restart && self.run_restart_controller(over_aged);

        self.candidates = self.space.candidates(&self.current);
        self.candidates.shuffle(&mut self.rng);
        let mut members = self.current.members().to_vec();
        members.shuffle(&mut self.rng);

        let power_phase = self.config.power_moves && self.power.is_exceeded_by(over_aged);
        if power_phase {
            self.power.advance();
            let locked = self.memory.lock_over_aged();
            self.tabu.clear();
            self.power_phases += 1;
            tracing::debug!(
                iteration = self.iteration,
                over_aged,
                locked,
                level = self.power.level(),
                "power-move phase"
            );
        }

        let space = self.space;
        let evaluator = space.evaluator(&self.current);
        let single = self.scan_single(&evaluator, &members);
        let (pair_in, pair_out) = if power_phase {
            (
                self.scan_pair_insertion(&evaluator),
                self.scan_pair_removal(&evaluator, &members),
            )
        } else {
            (None, None)
        };

        if power_phase && self.power.needs_cool_down() {
            self.memory.release();
            self.power.reset();
            tracing::debug!(iteration = self.iteration, "power-move cool-down");
        }

        let mut moves = Vec::with_capacity(3);
        self.execute(single, &mut moves);
        if self.config.power_moves {
            let pair_in = pair_in.filter(|p| self.still_applicable(p.mv));
            self.execute(pair_in, &mut moves);
            let pair_out = pair_out.filter(|p| self.still_applicable(p.mv));
            self.execute(pair_out, &mut moves);
        }

        let value = self.space.evaluate(&self.current);
        self.current.set_cost(value);
        debug_assert!(
            self.space.is_feasible(&self.current),
            "infeasible solution after iteration {}",
            self.iteration
        );

        let improved_best = self.config.objective.is_better(value, self.best.cost());
        if improved_best {
            self.best = self.current.clone();
        }

        tracing::trace!(
            iteration = self.iteration,
            value,
            best = self.best.cost(),
            moves = moves.len(),
            "iteration"
        );

        IterationReport {
            iteration: self.iteration,
            moves,
            over_aged_fraction: over_aged,
            restarted,
            power_phase,
            value,
            improved_best,
        }
    }

    /// Fires the restart controller if the over-aged fraction exceeds its
    /// level, then cools it down once the level passes the ceiling.
    fn run_restart_controller(&mut self, over_aged: f64) -> bool {
        let mut fired = false;
        if self.restart.is_exceeded_by(over_aged) {
            self.restart.advance();
            let locked = self.memory.lock_over_aged();
            self.tabu.clear();
            self.restarts += 1;
            fired = true;
            tracing::debug!(
                iteration = self.iteration,
                over_aged,
                locked,
                level = self.restart.level(),
                "restart: freezing over-aged variables"
            );
        }
        if self.restart.needs_cool_down() {
            self.memory.release();
            self.restart.reset();
            tracing::debug!(iteration = self.iteration, "restart cool-down");
        }
        fired
    }

    /// Tabu and aspiration test. `Some(aspiration)` when admissible.
    fn admit(&self, mv: Move, delta: f64) -> Option<bool> {
        let tabu = mv.indices().any(|i| self.tabu.contains(i));
        if !tabu {
            return Some(false);
        }
        let resulting = self.current.cost() + delta;
        self.config
            .objective
            .is_better(resulting, self.best.cost())
            .then_some(true)
    }

    /// Offers a move to `pick`. Returns `true` when the scan of the current
    /// phase should stop (first-improving mode found an improving move).
    fn offer(&self, pick: &mut Option<Pick>, mv: Move, delta: f64) -> bool {
        let Some(aspiration) = self.admit(mv, delta) else {
            return false;
        };
        let score = self.config.objective.orient(delta);
        if pick.is_none_or(|p| score < p.score) {
            *pick = Some(Pick {
                mv,
                delta,
                score,
                aspiration,
            });
            return !self.config.best_improving && score < 0.0;
        }
        false
    }

    fn scan_single<E: MoveEvaluator>(&self, evaluator: &E, members: &[usize]) -> Option<Pick> {
        let mut pick = None;

        for &incoming in &self.candidates {
            let mv = Move::Insert(incoming);
            if self.offer(&mut pick, mv, evaluator.insertion(incoming)) {
                break;
            }
        }

        for &outgoing in members {
            if self.memory.is_locked(outgoing) {
                continue;
            }
            let mv = Move::Remove(outgoing);
            if self.offer(&mut pick, mv, evaluator.removal(outgoing)) {
                break;
            }
        }

        'exchange: for &incoming in &self.candidates {
            for &outgoing in members {
                if self.memory.is_locked(outgoing) {
                    continue;
                }
                let mv = Move::Exchange { incoming, outgoing };
                if self.offer(&mut pick, mv, evaluator.exchange(incoming, outgoing)) {
                    break 'exchange;
                }
            }
        }

        pick
    }

    /// Best pair `(a, b)` where `b` is insertable once `a` is selected.
    fn scan_pair_insertion<E: MoveEvaluator>(&self, evaluator: &E) -> Option<Pick> {
        let mut pick = None;
        let mut scratch = self.current.clone();

        'outer: for &first in &self.candidates {
            scratch.insert(first);
            let follow_ups = self.space.candidates(&scratch);
            scratch.remove(first);

            for second in follow_ups {
                // follow-ups are a subset of the candidate list, so (b, a)
                // is scanned from the other side
                if second <= first {
                    continue;
                }
                let mv = Move::PairInsert(first, second);
                if self.offer(&mut pick, mv, evaluator.pair_insertion(first, second)) {
                    break 'outer;
                }
            }
        }

        pick
    }

    fn scan_pair_removal<E: MoveEvaluator>(
        &self,
        evaluator: &E,
        members: &[usize],
    ) -> Option<Pick> {
        let mut pick = None;

        'outer: for &first in members {
            if self.memory.is_locked(first) {
                continue;
            }
            for &second in members {
                if second <= first || self.memory.is_locked(second) {
                    continue;
                }
                let mv = Move::PairRemove(first, second);
                if self.offer(&mut pick, mv, evaluator.pair_removal(first, second)) {
                    break 'outer;
                }
            }
        }

        pick
    }

    /// Re-checks a compound move against the solution after the single
    /// move has been applied.
    fn still_applicable(&self, mv: Move) -> bool {
        match mv {
            Move::PairInsert(a, b) => {
                if !self.space.can_insert(a, &self.current) {
                    return false;
                }
                let mut scratch = self.current.clone();
                scratch.insert(a);
                self.space.can_insert(b, &scratch)
            }
            Move::PairRemove(a, b) => {
                self.current.contains(a)
                    && self.current.contains(b)
                    && !self.memory.is_locked(a)
                    && !self.memory.is_locked(b)
            }
            _ => true,
        }
    }

    /// Applies `pick` (or records an empty slot pair) and rotates the tabu
    /// list by two slots.
    fn execute(&mut self, pick: Option<Pick>, executed: &mut Vec<ExecutedMove>) {
        let entries = match pick {
            Some(p) => {
                self.space.apply(&mut self.current, p.mv);
                for index in p.mv.entering().into_iter().flatten() {
                    self.candidates.retain(|&c| c != index);
                }
                for index in p.mv.leaving().into_iter().flatten() {
                    self.candidates.push(index);
                }
                executed.push(ExecutedMove {
                    mv: p.mv,
                    delta: p.delta,
                    aspiration: p.aspiration,
                });
                p.mv.tabu_entries()
            }
            None => [None, None],
        };
        for entry in entries {
            self.tabu.push(entry);
        }
    }
}
