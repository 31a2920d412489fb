//! The QBF-PT problem: a quadratic binary function with prohibited triples.

use std::path::Path;

use crate::error::{QbfError, Result};
use crate::qbf::{BinarySolution, DeltaTable, InstanceParser, QbfModel};
use crate::tabu::{MoveEvaluator, SearchSpace, TabuConfig, TabuResult, TabuRunner};
use crate::triples::ForbiddenTriples;

/// A coefficient matrix together with its prohibited triples.
///
/// Both parts are immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct QbfPt {
    model: QbfModel,
    triples: ForbiddenTriples,
}

impl QbfPt {
    /// Binds `model` to the triples generated for its size.
    pub fn new(model: QbfModel) -> Self {
        let triples = ForbiddenTriples::generate(model.size());
        Self { model, triples }
    }

    /// Binds `model` to an explicit constraint set.
    pub fn with_triples(model: QbfModel, triples: ForbiddenTriples) -> Result<Self> {
        if triples.size() != model.size() {
            return Err(QbfError::InvalidDimension(format!(
                "triples built for size {}, model has size {}",
                triples.size(),
                model.size()
            )));
        }
        Ok(Self { model, triples })
    }

    /// Loads an instance file and generates its triples.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        InstanceParser::load(path).map(Self::new)
    }

    pub fn model(&self) -> &QbfModel {
        &self.model
    }

    pub fn triples(&self) -> &ForbiddenTriples {
        &self.triples
    }

    /// Runs Tabu Search on this problem.
    pub fn solve(&self, config: &TabuConfig) -> Result<TabuResult> {
        TabuRunner::run(self, config)
    }
}

impl MoveEvaluator for DeltaTable<'_> {
    fn insertion(&self, index: usize) -> f64 {
        DeltaTable::insertion(self, index)
    }

    fn removal(&self, index: usize) -> f64 {
        DeltaTable::removal(self, index)
    }

    fn exchange(&self, incoming: usize, outgoing: usize) -> f64 {
        DeltaTable::exchange(self, incoming, outgoing)
    }

    fn pair_insertion(&self, a: usize, b: usize) -> f64 {
        DeltaTable::pair_insertion(self, a, b)
    }

    fn pair_removal(&self, a: usize, b: usize) -> f64 {
        DeltaTable::pair_removal(self, a, b)
    }
}

impl SearchSpace for QbfPt {
    type Evaluator<'a> = DeltaTable<'a>;

    fn size(&self) -> usize {
        self.model.size()
    }

    fn evaluate(&self, solution: &BinarySolution) -> f64 {
        self.model.evaluate(solution)
    }

    fn evaluator<'a>(&'a self, solution: &BinarySolution) -> DeltaTable<'a> {
        self.model.assignment(solution).delta_table()
    }

    fn candidates(&self, solution: &BinarySolution) -> Vec<usize> {
        self.triples.candidate_list(solution)
    }

    fn can_insert(&self, index: usize, solution: &BinarySolution) -> bool {
        self.triples.can_insert(index, solution)
    }

    fn is_feasible(&self, solution: &BinarySolution) -> bool {
        self.triples.is_feasible(solution)
    }
}
