//! Moves and the capability traits the engine searches over.

use crate::qbf::BinarySolution;

/// A neighborhood move on a binary solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Move {
    /// Select one index.
    Insert(usize),
    /// Deselect one index.
    Remove(usize),
    /// Select `incoming`, deselect `outgoing`.
    Exchange {
        /// Index entering the solution.
        incoming: usize,
        /// Index leaving the solution.
        outgoing: usize,
    },
    /// Select two indices (power move).
    PairInsert(usize, usize),
    /// Deselect two indices (power move).
    PairRemove(usize, usize),
}

impl Move {
    /// Indices this move selects.
    pub fn entering(self) -> [Option<usize>; 2] {
        match self {
            Move::Insert(i) => [Some(i), None],
            Move::Exchange { incoming, .. } => [Some(incoming), None],
            Move::PairInsert(a, b) => [Some(a), Some(b)],
            Move::Remove(_) | Move::PairRemove(..) => [None, None],
        }
    }

    /// Indices this move deselects.
    pub fn leaving(self) -> [Option<usize>; 2] {
        match self {
            Move::Remove(i) => [Some(i), None],
            Move::Exchange { outgoing, .. } => [Some(outgoing), None],
            Move::PairRemove(a, b) => [Some(a), Some(b)],
            Move::Insert(_) | Move::PairInsert(..) => [None, None],
        }
    }

    /// Every index the move toggles.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        self.leaving()
            .into_iter()
            .chain(self.entering())
            .flatten()
    }

    /// Tabu slot pair pushed after executing the move.
    ///
    /// Single moves fill `[leaving, entering]`; compound moves fill both
    /// slots with their two indices.
    pub fn tabu_entries(self) -> [Option<usize>; 2] {
        match self {
            Move::Insert(i) => [None, Some(i)],
            Move::Remove(i) => [Some(i), None],
            Move::Exchange { incoming, outgoing } => [Some(outgoing), Some(incoming)],
            Move::PairInsert(a, b) | Move::PairRemove(a, b) => [Some(a), Some(b)],
        }
    }

    /// Whether this is a two-variable compound move.
    pub fn is_compound(self) -> bool {
        matches!(self, Move::PairInsert(..) | Move::PairRemove(..))
    }
}

/// Incremental objective deltas for one fixed solution.
///
/// Every delta is the change in the raw objective `f(x)` and is only valid
/// for the solution the evaluator was built from.
pub trait MoveEvaluator {
    /// Delta of selecting `index`.
    fn insertion(&self, index: usize) -> f64;
    /// Delta of deselecting `index`.
    fn removal(&self, index: usize) -> f64;
    /// Delta of selecting `incoming` while deselecting `outgoing`.
    fn exchange(&self, incoming: usize, outgoing: usize) -> f64;
    /// Delta of selecting both `a` and `b`.
    fn pair_insertion(&self, a: usize, b: usize) -> f64;
    /// Delta of deselecting both `a` and `b`.
    fn pair_removal(&self, a: usize, b: usize) -> f64;

    /// Delta of an arbitrary [`Move`].
    fn delta(&self, mv: Move) -> f64 {
        match mv {
            Move::Insert(i) => self.insertion(i),
            Move::Remove(i) => self.removal(i),
            Move::Exchange { incoming, outgoing } => self.exchange(incoming, outgoing),
            Move::PairInsert(a, b) => self.pair_insertion(a, b),
            Move::PairRemove(a, b) => self.pair_removal(a, b),
        }
    }
}

/// A binary search space: candidate generation, move evaluation and move
/// application for the Tabu Search engine.
pub trait SearchSpace: Send + Sync {
    /// Evaluator bound to one solution snapshot.
    type Evaluator<'a>: MoveEvaluator
    where
        Self: 'a;

    /// Number of binary variables.
    fn size(&self) -> usize;

    /// Full objective value `f(x)` of `solution`.
    fn evaluate(&self, solution: &BinarySolution) -> f64;

    /// Builds an evaluator whose variable vector reflects `solution`.
    fn evaluator<'a>(&'a self, solution: &BinarySolution) -> Self::Evaluator<'a>;

    /// Unselected indices that can be inserted without violating a
    /// constraint.
    fn candidates(&self, solution: &BinarySolution) -> Vec<usize>;

    /// Whether `index` can be selected in `solution`.
    fn can_insert(&self, index: usize, solution: &BinarySolution) -> bool;

    /// Whether `solution` satisfies every constraint.
    fn is_feasible(&self, _solution: &BinarySolution) -> bool {
        true
    }

    /// Applies `mv` to `solution`. The cached cost is left stale.
    fn apply(&self, solution: &mut BinarySolution, mv: Move) {
        for index in mv.leaving().into_iter().flatten() {
            solution.remove(index);
        }
        for index in mv.entering().into_iter().flatten() {
            solution.insert(index);
        }
    }
}
