//! Maximum bipartite matching between predicates and elements
//!
//! Edges connect a predicate to every element it accepts. The solver finds
//! a matching of maximum cardinality with augmenting paths (Kuhn's
//! algorithm), so the unmatched sets it reports are as small as any
//! assignment allows. A greedy assignment would not guarantee that.

use super::Predicate;
use crate::errors::{EquivexError, Result};

#[derive(Debug, Clone)]
pub struct MaximumMatchingProblem {
    predicate_count: usize,
    element_count: usize,
    /// `edges[p][e]` holds when predicate `p` accepts element `e`
    edges: Vec<Vec<bool>>,
}

impl MaximumMatchingProblem {
    /// Evaluate every predicate against every element once.
    ///
    /// # Errors
    ///
    /// [`EquivexError::EmptyPredicates`] or [`EquivexError::EmptyElements`]
    /// when either side is empty.
    pub fn new<T>(predicates: &[Predicate<'_, T>], elements: &[T]) -> Result<Self> {
        let edges = predicates
            .iter()
            .map(|p| elements.iter().map(|e| p.matches(e)).collect())
            .collect();
        Self::checked(predicates.len(), elements.len(), edges)
    }

    /// Build from a precomputed adjacency matrix, one row per predicate.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`EquivexError::InvalidArgument`] for
    /// ragged rows.
    pub fn from_adjacency(edges: Vec<Vec<bool>>) -> Result<Self> {
        let element_count = edges.first().map_or(0, Vec::len);
        if edges.iter().any(|row| row.len() != element_count) {
            return Err(EquivexError::InvalidArgument {
                name: "edges".to_string(),
                reason: "every row must have one entry per element".to_string(),
            });
        }
        Self::checked(edges.len(), element_count, edges)
    }

    fn checked(
        predicate_count: usize,
        element_count: usize,
        edges: Vec<Vec<bool>>,
    ) -> Result<Self> {
        if predicate_count == 0 {
            return Err(EquivexError::EmptyPredicates);
        }
        if element_count == 0 {
            return Err(EquivexError::EmptyElements);
        }
        Ok(Self {
            predicate_count,
            element_count,
            edges,
        })
    }

    pub fn predicate_count(&self) -> usize {
        self.predicate_count
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn solve(&self) -> MaximumMatchingSolution {
        let mut element_owner: Vec<Option<usize>> = vec![None; self.element_count];
        for predicate in 0..self.predicate_count {
            let mut visited = vec![false; self.element_count];
            self.augment(predicate, &mut visited, &mut element_owner);
        }

        let mut predicate_match = vec![None; self.predicate_count];
        for (element, owner) in element_owner.iter().enumerate() {
            if let Some(predicate) = owner {
                predicate_match[*predicate] = Some(element);
            }
        }
        MaximumMatchingSolution {
            predicate_match,
            element_count: self.element_count,
        }
    }

    /// Try to give `predicate` an element, re-routing current owners along
    /// an alternating path when needed.
    fn augment(
        &self,
        predicate: usize,
        visited: &mut [bool],
        element_owner: &mut [Option<usize>],
    ) -> bool {
        for element in 0..self.element_count {
            if !self.edges[predicate][element] || visited[element] {
                continue;
            }
            visited[element] = true;
            let free = match element_owner[element] {
                None => true,
                Some(owner) => self.augment(owner, visited, element_owner),
            };
            if free {
                element_owner[element] = Some(predicate);
                return true;
            }
        }
        false
    }
}

/// A maximum matching, immutable once solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaximumMatchingSolution {
    predicate_match: Vec<Option<usize>>,
    element_count: usize,
}

impl MaximumMatchingSolution {
    pub fn element_for(&self, predicate: usize) -> Option<usize> {
        self.predicate_match.get(predicate).copied().flatten()
    }

    pub fn unmatched_predicates(&self) -> Vec<usize> {
        self.predicate_match
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_none())
            .map(|(p, _)| p)
            .collect()
    }

    pub fn unmatched_elements(&self) -> Vec<usize> {
        let mut matched = vec![false; self.element_count];
        for element in self.predicate_match.iter().flatten() {
            matched[*element] = true;
        }
        (0..self.element_count).filter(|e| !matched[*e]).collect()
    }

    /// `(predicate, element)` pairs in predicate order
    pub fn matched_pairs(&self) -> Vec<(usize, usize)> {
        self.predicate_match
            .iter()
            .enumerate()
            .filter_map(|(p, m)| m.map(|e| (p, e)))
            .collect()
    }

    pub fn matched_count(&self) -> usize {
        self.predicate_match.iter().flatten().count()
    }

    /// Every predicate and every element is matched
    pub fn is_perfect(&self) -> bool {
        self.matched_count() == self.predicate_match.len()
            && self.matched_count() == self.element_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augmenting_path_beats_greedy() {
        // Greedy gives element 0 to predicate 0 and leaves predicate 1 unmatched.
        let problem =
            MaximumMatchingProblem::from_adjacency(vec![vec![true, true], vec![true, false]])
                .unwrap();
        let solution = problem.solve();
        assert!(solution.is_perfect());
        assert_eq!(solution.element_for(0), Some(1));
        assert_eq!(solution.element_for(1), Some(0));
    }

    #[test]
    fn test_unmatched_sets() {
        let problem = MaximumMatchingProblem::from_adjacency(vec![
            vec![false, false, false],
            vec![false, true, false],
        ])
        .unwrap();
        let solution = problem.solve();
        assert_eq!(solution.unmatched_predicates(), vec![0]);
        assert_eq!(solution.unmatched_elements(), vec![0, 2]);
        assert_eq!(solution.matched_pairs(), vec![(1, 1)]);
    }

    #[test]
    fn test_empty_sides_are_rejected() {
        assert_eq!(
            MaximumMatchingProblem::from_adjacency(vec![]).unwrap_err(),
            EquivexError::EmptyPredicates
        );
        assert_eq!(
            MaximumMatchingProblem::from_adjacency(vec![vec![]]).unwrap_err(),
            EquivexError::EmptyElements
        );
        let elements: Vec<i32> = vec![];
        let predicates = vec![Predicate::new("x > 0", |x: &i32| *x > 0)];
        assert_eq!(
            MaximumMatchingProblem::new(&predicates, &elements).unwrap_err(),
            EquivexError::EmptyElements
        );
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err =
            MaximumMatchingProblem::from_adjacency(vec![vec![true], vec![true, false]])
                .unwrap_err();
        assert!(matches!(err, EquivexError::InvalidArgument { .. }));
    }
}
