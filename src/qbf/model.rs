//! Coefficient matrix and incremental evaluation of `f(x) = x'Ax`.
//!
//! The matrix is stored dense and row-major. Nothing assumes symmetry: the
//! interaction between `i` and `j` is always read as `A[i][j] + A[j][i]`, so
//! an instance that only populates the upper triangle evaluates correctly.
//!
//! Delta operations live on [`Assignment`], which can only be obtained from a
//! concrete [`BinarySolution`]. That makes "the variable vector reflects the
//! solution being evaluated" a property of the type rather than a calling
//! convention.

use super::solution::BinarySolution;
use crate::error::{QbfError, Result};

/// Quadratic binary function over `n` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct QbfModel {
    size: usize,
    coefficients: Vec<f64>,
}

impl QbfModel {
    /// Builds a model from a dense row-major `n * n` matrix.
    pub fn new(size: usize, coefficients: Vec<f64>) -> Result<Self> {
        if size == 0 {
            return Err(QbfError::InvalidDimension("size must be positive".into()));
        }
        let expected = size
            .checked_mul(size)
            .ok_or_else(|| QbfError::InvalidDimension(format!("size {size} is too large")))?;
        if coefficients.len() != expected {
            return Err(QbfError::InvalidMatrix {
                expected,
                found: coefficients.len(),
            });
        }
        Ok(Self { size, coefficients })
    }

    /// Builds a model from the upper triangle (diagonal included), row-major.
    ///
    /// Entries below the diagonal are zero-filled, so each off-diagonal pair
    /// is populated exactly once.
    pub fn from_upper_triangle(size: usize, upper: &[f64]) -> Result<Self> {
        if size == 0 {
            return Err(QbfError::InvalidDimension("size must be positive".into()));
        }
        let expected = size
            .checked_add(1)
            .and_then(|s| s.checked_mul(size))
            .map(|len| len / 2)
            .ok_or_else(|| QbfError::InvalidDimension(format!("size {size} is too large")))?;
        // `upper` holds at least n(n+1)/2 values, so n * n below cannot overflow
        if upper.len() < expected {
            return Err(QbfError::Truncated {
                expected,
                found: upper.len(),
            });
        }
        let mut coefficients = vec![0.0; size * size];
        let mut values = upper.iter();
        for i in 0..size {
            for j in i..size {
                if let Some(&v) = values.next() {
                    coefficients[i * size + j] = v;
                }
            }
        }
        Ok(Self { size, coefficients })
    }

    /// Number of variables `n`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `A[i][j]`.
    #[inline]
    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        self.coefficients[i * self.size + j]
    }

    /// Combined off-diagonal weight `A[i][j] + A[j][i]`.
    #[inline]
    pub fn interaction(&self, i: usize, j: usize) -> f64 {
        self.coefficient(i, j) + self.coefficient(j, i)
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.coefficients[i * self.size..(i + 1) * self.size]
    }

    /// Full `O(n^2)` evaluation of `x'Ax` for the given solution.
    pub fn evaluate(&self, solution: &BinarySolution) -> f64 {
        self.assignment(solution).value()
    }

    /// Recomputes and caches the cost of `solution`.
    pub fn refresh(&self, solution: &mut BinarySolution) {
        let cost = self.evaluate(solution);
        solution.set_cost(cost);
    }

    /// Builds an evaluated solution from a set of indices.
    ///
    /// # Panics
    ///
    /// Panics if an index is outside `0..n`.
    pub fn solution<I>(&self, indices: I) -> BinarySolution
    where
        I: IntoIterator<Item = usize>,
    {
        let mut solution = BinarySolution::empty(self.size);
        for index in indices {
            assert!(
                index < self.size,
                "index {index} out of range for size {}",
                self.size
            );
            solution.insert(index);
        }
        self.refresh(&mut solution);
        solution
    }

    /// Materializes the variable vector for `solution`.
    pub fn assignment(&self, solution: &BinarySolution) -> Assignment<'_> {
        debug_assert_eq!(solution.size(), self.size, "solution size mismatch");
        let variables = solution
            .selection()
            .iter()
            .map(|&s| if s { 1.0 } else { 0.0 })
            .collect();
        Assignment {
            model: self,
            variables,
        }
    }
}

/// The variable vector `x` of one solution, bound to its model.
#[derive(Debug, Clone)]
pub struct Assignment<'m> {
    model: &'m QbfModel,
    variables: Vec<f64>,
}

impl<'m> Assignment<'m> {
    /// `x_i` as 0.0 or 1.0.
    pub fn variables(&self) -> &[f64] {
        &self.variables
    }

    #[inline]
    fn is_set(&self, i: usize) -> bool {
        self.variables[i] == 1.0
    }

    /// `x'Ax`.
    pub fn value(&self) -> f64 {
        let x = &self.variables;
        let mut sum = 0.0;
        for (i, &xi) in x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            let row: f64 = self
                .model
                .row(i)
                .iter()
                .zip(x)
                .map(|(a, xj)| a * xj)
                .sum();
            sum += row * xi;
        }
        sum
    }

    /// Marginal effect of toggling `i`:
    /// `sum_{j != i} x_j (A[i][j] + A[j][i]) + A[i][i]`.
    pub fn contribution(&self, i: usize) -> f64 {
        let mut sum = 0.0;
        for (j, &xj) in self.variables.iter().enumerate() {
            if i != j {
                sum += xj * self.model.interaction(i, j);
            }
        }
        sum + self.model.coefficient(i, i)
    }

    /// Change in `f` from selecting `i`; zero if already selected.
    pub fn insertion_delta(&self, i: usize) -> f64 {
        if self.is_set(i) {
            return 0.0;
        }
        self.contribution(i)
    }

    /// Change in `f` from deselecting `i`; zero if not selected.
    pub fn removal_delta(&self, i: usize) -> f64 {
        if !self.is_set(i) {
            return 0.0;
        }
        -self.contribution(i)
    }

    /// Change in `f` from selecting `incoming` and deselecting `outgoing`.
    pub fn exchange_delta(&self, incoming: usize, outgoing: usize) -> f64 {
        if incoming == outgoing {
            return 0.0;
        }
        if self.is_set(incoming) {
            return self.removal_delta(outgoing);
        }
        if !self.is_set(outgoing) {
            return self.insertion_delta(incoming);
        }
        self.contribution(incoming)
            - self.contribution(outgoing)
            - self.model.interaction(incoming, outgoing)
    }

    /// Change in `f` from selecting both `a` and `b`.
    ///
    /// Degrades to a single insertion when one of them is already selected
    /// or when they are the same index.
    pub fn pair_insertion_delta(&self, a: usize, b: usize) -> f64 {
        if a == b || self.is_set(b) {
            return self.insertion_delta(a);
        }
        if self.is_set(a) {
            return self.insertion_delta(b);
        }
        self.contribution(a) + self.contribution(b) + self.model.interaction(a, b)
    }

    /// Change in `f` from deselecting both `a` and `b`.
    pub fn pair_removal_delta(&self, a: usize, b: usize) -> f64 {
        if a == b || !self.is_set(b) {
            return self.removal_delta(a);
        }
        if !self.is_set(a) {
            return self.removal_delta(b);
        }
        -self.contribution(a) - self.contribution(b) + self.model.interaction(a, b)
    }

    /// Caches every contribution for an `O(1)`-per-move scan.
    pub fn delta_table(&self) -> DeltaTable<'m> {
        let contributions = (0..self.model.size)
            .map(|i| self.contribution(i))
            .collect();
        DeltaTable {
            model: self.model,
            selected: self.variables.iter().map(|&x| x == 1.0).collect(),
            contributions,
        }
    }
}

/// Contributions of every index for one fixed assignment.
///
/// Produces the same deltas as [`Assignment`], each in constant time.
#[derive(Debug, Clone)]
pub struct DeltaTable<'m> {
    model: &'m QbfModel,
    selected: Vec<bool>,
    contributions: Vec<f64>,
}

impl DeltaTable<'_> {
    /// Cached [`Assignment::contribution`].
    #[inline]
    pub fn contribution(&self, i: usize) -> f64 {
        self.contributions[i]
    }

    pub fn insertion(&self, i: usize) -> f64 {
        if self.selected[i] {
            0.0
        } else {
            self.contributions[i]
        }
    }

    pub fn removal(&self, i: usize) -> f64 {
        if self.selected[i] {
            -self.contributions[i]
        } else {
            0.0
        }
    }

    pub fn exchange(&self, incoming: usize, outgoing: usize) -> f64 {
        if incoming == outgoing {
            return 0.0;
        }
        if self.selected[incoming] {
            return self.removal(outgoing);
        }
        if !self.selected[outgoing] {
            return self.insertion(incoming);
        }
        self.contributions[incoming]
            - self.contributions[outgoing]
            - self.model.interaction(incoming, outgoing)
    }

    pub fn pair_insertion(&self, a: usize, b: usize) -> f64 {
        if a == b || self.selected[b] {
            return self.insertion(a);
        }
        if self.selected[a] {
            return self.insertion(b);
        }
        self.contributions[a] + self.contributions[b] + self.model.interaction(a, b)
    }

    pub fn pair_removal(&self, a: usize, b: usize) -> f64 {
        if a == b || !self.selected[b] {
            return self.removal(a);
        }
        if !self.selected[a] {
            return self.removal(b);
        }
        -self.contributions[a] - self.contributions[b] + self.model.interaction(a, b)
    }
}
