//! Binary solution: a set of selected indices with a cached objective value.

use std::fmt;

/// A subset of `0..size` together with the cached value of `f(x)` for the
/// variable vector derived from that subset.
///
/// Mutation is restricted to the crate so that the cached cost can only
/// drift between a move and the engine's end-of-iteration refresh. External
/// callers obtain evaluated solutions from
/// [`QbfModel::solution`](super::QbfModel::solution).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinarySolution {
    members: Vec<usize>,
    selected: Vec<bool>,
    cost: f64,
}

impl BinarySolution {
    /// The empty selection. Its cost is zero for every QBF.
    pub fn empty(size: usize) -> Self {
        Self {
            members: Vec::new(),
            selected: vec![false; size],
            cost: 0.0,
        }
    }

    /// Domain size `n`.
    pub fn size(&self) -> usize {
        self.selected.len()
    }

    /// Number of selected indices.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `index` is selected.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.selected[index]
    }

    /// Selected indices in insertion order (not sorted).
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Selected indices in ascending order.
    pub fn sorted_members(&self) -> Vec<usize> {
        let mut sorted = self.members.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Membership flags indexed by variable.
    pub fn selection(&self) -> &[bool] {
        &self.selected
    }

    /// Cached objective value `f(x)`.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The variable vector rendered as `"1 0 1 ..."`.
    pub fn bit_string(&self) -> String {
        self.selected
            .iter()
            .map(|&s| if s { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn insert(&mut self, index: usize) -> bool {
        if self.selected[index] {
            return false;
        }
        self.selected[index] = true;
        self.members.push(index);
        true
    }

    pub(crate) fn remove(&mut self, index: usize) -> bool {
        if !self.selected[index] {
            return false;
        }
        self.selected[index] = false;
        if let Some(pos) = self.members.iter().position(|&m| m == index) {
            self.members.swap_remove(pos);
        }
        true
    }

    pub(crate) fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}

impl fmt::Display for BinarySolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cost=[{}], size=[{}], elements={:?}",
            self.cost,
            self.len(),
            self.sorted_members()
        )
    }
}
