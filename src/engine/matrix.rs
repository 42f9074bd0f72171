use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{Combination, Variable};
use crate::error::Error;

/// Lazily enumerated cartesian product of the declared variables.
///
/// Combination `i` is the mixed-radix decomposition of `i` over the
/// per-variable case counts, so a worker claiming an index with `fetch_add`
/// receives that combination exactly once with no further coordination.
/// No combination is materialized before a worker asks for it. A matrix is
/// single-use; once exhausted it stays exhausted.
#[derive(Debug)]
pub(crate) struct Matrix {
    variables: Vec<Variable>,
    cursor: AtomicU64,
    total: u64,
}

impl Matrix {
    pub(crate) fn new(variables: &[Variable]) -> Result<Self, Error> {
        let mut total: u64 = 1;
        for variable in variables {
            total = total
                .checked_mul(variable.cases.len() as u64)
                .ok_or(Error::MatrixTooLarge)?;
        }
        Ok(Self {
            variables: variables.to_vec(),
            cursor: AtomicU64::new(0),
            total,
        })
    }

    /// Number of combinations this matrix yields in total.
    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Claim the next combination, or `None` once the space is exhausted.
    pub(crate) fn next(&self) -> Option<Combination> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        if index >= self.total {
            return None;
        }
        Some(self.decode(index))
    }

    fn decode(&self, mut index: u64) -> Combination {
        let mut picks = vec![0usize; self.variables.len()];
        for (slot, variable) in self.variables.iter().enumerate().rev() {
            let len = variable.cases.len() as u64;
            picks[slot] = (index % len) as usize;
            index /= len;
        }
        self.variables
            .iter()
            .zip(picks)
            .map(|(variable, pick)| variable.cases[pick].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Case;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn variable(name: &str, cases: &[&str]) -> Variable {
        let mut var = Variable::new(name);
        for case in cases {
            var = var.case(Case::new(*case));
        }
        var
    }

    fn drain(matrix: &Matrix) -> Vec<Vec<String>> {
        let mut combos = Vec::new();
        while let Some(combination) = matrix.next() {
            combos.push(combination.into_iter().map(|case| case.name).collect());
        }
        combos
    }

    #[test]
    fn yields_the_full_product_exactly_once() {
        let matrix = Matrix::new(&[
            variable("size", &["s", "m"]),
            variable("flavor", &["a", "b", "c"]),
        ])
        .unwrap();
        assert_eq!(matrix.total(), 6);

        let combos = drain(&matrix);
        assert_eq!(combos.len(), 6);
        let distinct: HashSet<_> = combos.iter().cloned().collect();
        assert_eq!(distinct.len(), 6);
        assert!(matrix.next().is_none());
    }

    #[test]
    fn combinations_follow_declaration_order() {
        let matrix = Matrix::new(&[
            variable("first", &["f"]),
            variable("second", &["s1", "s2"]),
        ])
        .unwrap();
        for combo in drain(&matrix) {
            assert_eq!(combo[0], "f");
            assert!(combo[1].starts_with('s'));
        }
    }

    #[test]
    fn no_variables_yield_one_empty_combination() {
        let matrix = Matrix::new(&[]).unwrap();
        assert_eq!(matrix.total(), 1);
        assert!(matrix.next().unwrap().is_empty());
        assert!(matrix.next().is_none());
    }

    #[test]
    fn an_empty_variable_collapses_the_product() {
        let matrix = Matrix::new(&[
            variable("populated", &["a", "b"]),
            variable("empty", &[]),
        ])
        .unwrap();
        assert_eq!(matrix.total(), 0);
        assert!(matrix.next().is_none());
    }

    #[test]
    fn oversized_product_fails_construction() {
        let variables: Vec<Variable> = (0..64)
            .map(|i| variable(&format!("v{i}"), &["0", "1"]))
            .collect();
        assert!(matches!(
            Matrix::new(&variables),
            Err(Error::MatrixTooLarge)
        ));
    }

    #[test]
    fn concurrent_consumers_split_the_space_without_overlap() {
        let matrix = Arc::new(
            Matrix::new(&[
                variable("a", &["1", "2", "3", "4", "5"]),
                variable("b", &["x", "y", "z"]),
                variable("c", &["p", "q"]),
            ])
            .unwrap(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let matrix = Arc::clone(&matrix);
            let seen = Arc::clone(&seen);
            handles.push(std::thread::spawn(move || {
                while let Some(combination) = matrix.next() {
                    let names: Vec<String> =
                        combination.into_iter().map(|case| case.name).collect();
                    seen.lock().unwrap().push(names);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 30);
        let distinct: HashSet<_> = seen.iter().cloned().collect();
        assert_eq!(distinct.len(), 30);
    }
}
