//! Prohibited triples.
//!
//! For an instance of size `n` exactly `n` triples are derived from two
//! affine index permutations, `l(u) = 1 + ((p1 * u + p2) mod n)`, with
//! `(p1, p2) = (131, 1031)` for the second member and `(193, 1093)` for the
//! third. The construction depends on `n` alone, so every run over the same
//! instance sees the same constraint set.
//!
//! A solution is feasible when no triple has all of its members selected.

use crate::qbf::BinarySolution;

const FIRST_PERMUTATION: (usize, usize) = (131, 1031);
const SECOND_PERMUTATION: (usize, usize) = (193, 1093);

/// The prohibited triple list `T` of one instance size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenTriples {
    size: usize,
    triples: Vec<[usize; 3]>,
}

impl ForbiddenTriples {
    /// Derives the `n` triples for instance size `size`.
    ///
    /// Each triple is sorted ascending and 0-based. For `size >= 3` all three
    /// members are distinct; smaller sizes produce degenerate triples with
    /// repeated members.
    pub fn generate(size: usize) -> Self {
        assert!(size > 0, "instance size must be positive");
        let l = |u: usize, (p1, p2): (usize, usize)| 1 + (p1 * u + p2) % size;

        let triples = (0..size)
            .map(|i| {
                let own = i + 1;

                let mut first = l(i, FIRST_PERMUTATION);
                if first == own {
                    first = 1 + first % size;
                }

                let raw = l(i, SECOND_PERMUTATION);
                let shifted = 1 + raw % size;
                let second = if raw != own && raw != first {
                    raw
                } else if shifted != own && shifted != first {
                    shifted
                } else {
                    1 + (raw + 1) % size
                };

                let mut triple = [own - 1, first - 1, second - 1];
                triple.sort_unstable();
                triple
            })
            .collect();

        Self { size, triples }
    }

    /// Builds a constraint set from explicit triples (each is sorted).
    ///
    /// # Panics
    ///
    /// Panics if a member lies outside `0..size`.
    pub fn from_triples(size: usize, triples: impl IntoIterator<Item = [usize; 3]>) -> Self {
        let triples = triples
            .into_iter()
            .map(|mut t| {
                assert!(
                    t.iter().all(|&m| m < size),
                    "triple {t:?} out of range for size {size}"
                );
                t.sort_unstable();
                t
            })
            .collect();
        Self { size, triples }
    }

    /// Instance size the triples were built for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether there are no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// The triples as `(min, middle, max)`.
    pub fn triples(&self) -> &[[usize; 3]] {
        &self.triples
    }

    /// Whether no triple is fully selected in `solution`.
    pub fn is_feasible(&self, solution: &BinarySolution) -> bool {
        self.violated(solution).is_none()
    }

    /// First triple fully contained in `solution`, if any.
    pub fn violated(&self, solution: &BinarySolution) -> Option<[usize; 3]> {
        self.triples
            .iter()
            .copied()
            .find(|t| t.iter().all(|&m| solution.contains(m)))
    }

    /// Whether selecting `index` keeps `solution` feasible.
    ///
    /// Already-selected indices are not insertable.
    pub fn can_insert(&self, index: usize, solution: &BinarySolution) -> bool {
        if solution.contains(index) {
            return false;
        }
        !self.triples.iter().any(|t| {
            t.contains(&index)
                && t
                    .iter()
                    .filter(|&&m| m != index)
                    .all(|&m| solution.contains(m))
        })
    }

    /// Candidate list: every unselected index whose insertion would not
    /// complete a triple.
    ///
    /// Rebuilt from scratch in `O(n + |T|)`; ascending order.
    pub fn candidate_list(&self, solution: &BinarySolution) -> Vec<usize> {
        let mut eligible: Vec<bool> = solution.selection().iter().map(|&s| !s).collect();
        for triple in &self.triples {
            // A triple is its set of distinct members; when exactly one of
            // them is unselected, selecting it completes the triple.
            let mut open = triple.iter().copied().filter(|&m| !solution.contains(m));
            if let Some(last) = open.next() {
                if open.all(|m| m == last) {
                    eligible[last] = false;
                }
            }
        }
        eligible
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qbf::QbfModel;
    use proptest::prelude::*;

    fn solution(size: usize, indices: &[usize]) -> BinarySolution {
        let model = QbfModel::new(size, vec![0.0; size * size]).unwrap();
        model.solution(indices.iter().copied())
    }

    #[test]
    fn test_generate_small_sizes() {
        assert_eq!(ForbiddenTriples::generate(3).triples(), &[[0, 1, 2]; 3]);
        assert_eq!(
            ForbiddenTriples::generate(4).triples(),
            &[[0, 1, 3], [1, 2, 3], [1, 2, 3], [0, 1, 3]]
        );
        assert_eq!(
            ForbiddenTriples::generate(5).triples(),
            &[[0, 1, 3], [1, 2, 3], [2, 3, 4], [2, 3, 4], [0, 1, 4]]
        );
    }

    #[test]
    fn test_generate_size_ten() {
        let t = ForbiddenTriples::generate(10);
        assert_eq!(
            t.triples(),
            &[
                [0, 1, 3],
                [1, 2, 6],
                [2, 3, 9],
                [2, 3, 4],
                [4, 5, 6],
                [5, 6, 8],
                [1, 6, 7],
                [4, 7, 8],
                [7, 8, 9],
                [0, 1, 9],
            ]
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        for n in [1, 2, 7, 20, 100, 400] {
            assert_eq!(ForbiddenTriples::generate(n), ForbiddenTriples::generate(n));
            assert_eq!(ForbiddenTriples::generate(n).len(), n);
        }
    }

    #[test]
    fn test_each_triple_contains_its_own_index() {
        let t = ForbiddenTriples::generate(60);
        for (i, triple) in t.triples().iter().enumerate() {
            assert!(triple.contains(&i), "triple {i} = {triple:?}");
        }
    }

    #[test]
    fn test_candidate_list_excludes_completing_index() {
        let t = ForbiddenTriples::generate(4);
        // {0, 1} selected: 3 would complete (0, 1, 3)
        let sol = solution(4, &[0, 1]);
        assert_eq!(t.candidate_list(&sol), vec![2]);
        assert!(t.can_insert(2, &sol));
        assert!(!t.can_insert(3, &sol));
        assert!(!t.can_insert(0, &sol));
    }

    #[test]
    fn test_degenerate_triples_for_tiny_sizes() {
        let one = ForbiddenTriples::generate(1);
        assert_eq!(one.triples(), &[[0, 0, 0]]);
        let empty = solution(1, &[]);
        assert!(one.candidate_list(&empty).is_empty());
        assert!(!one.can_insert(0, &empty));
        assert!(!one.is_feasible(&solution(1, &[0])));

        let two = ForbiddenTriples::generate(2);
        let cases: [&[usize]; 3] = [&[], &[0], &[1]];
        for picked in cases {
            let sol = solution(2, picked);
            for i in 0..2 {
                assert_eq!(two.candidate_list(&sol).contains(&i), two.can_insert(i, &sol));
            }
        }
    }

    #[test]
    fn test_feasibility() {
        let t = ForbiddenTriples::generate(4);
        assert!(t.is_feasible(&solution(4, &[0, 1, 2])));
        assert!(t.is_feasible(&solution(4, &[0, 2, 3])));
        assert_eq!(t.violated(&solution(4, &[1, 2, 3])), Some([1, 2, 3]));
        assert!(!t.is_feasible(&solution(4, &[0, 1, 2, 3])));
    }

    #[test]
    fn test_from_triples_sorts_members() {
        let t = ForbiddenTriples::from_triples(5, [[4, 0, 2]]);
        assert_eq!(t.triples(), &[[0, 2, 4]]);
    }

    proptest! {
        #[test]
        fn prop_distinct_members_from_three_up(n in 3usize..600) {
            let t = ForbiddenTriples::generate(n);
            for &[a, b, c] in t.triples() {
                prop_assert!(a < b && b < c && c < n);
            }
        }

        #[test]
        fn prop_candidate_list_agrees_with_can_insert(
            n in 1usize..40,
            bits in prop::collection::vec(any::<bool>(), 40),
        ) {
            let t = ForbiddenTriples::generate(n);
            let picked: Vec<usize> = (0..n).filter(|&i| bits[i]).collect();
            let sol = solution(n, &picked);
            let cl = t.candidate_list(&sol);
            for i in 0..n {
                prop_assert_eq!(cl.contains(&i), t.can_insert(i, &sol));
            }
        }
    }
}
