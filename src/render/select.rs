//! Name-based selection of suites and tests
//!
//! A suite whose name matches is selected with all of its tests; otherwise
//! only the tests whose names match are kept. Matching is a case-sensitive
//! regex search.

use regex::Regex;
use thiserror::Error;

use crate::domain::{SuiteId, Suites};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("Invalid match pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No matches found for pattern: {0}")]
    NoMatches(String),
}

/// A suite picked for rendering with the indices of its picked tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub suite: SuiteId,
    pub tests: Vec<usize>,
}

/// A compiled selection filter
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pattern: Option<Regex>,
}

impl Selection {
    /// Selects everything
    pub fn all() -> Self {
        Self { pattern: None }
    }

    /// Compiles a pattern; an empty pattern selects everything
    pub fn new(pattern: &str) -> Result<Self, SelectError> {
        if pattern.is_empty() {
            return Ok(Self::all());
        }

        let regex = Regex::new(pattern).map_err(|source| SelectError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self { pattern: Some(regex) })
    }

    /// Returns true if this selection filters nothing out
    pub fn is_all(&self) -> bool {
        self.pattern.is_none()
    }

    /// Picks suites and tests in suite order
    ///
    /// Fails with [`SelectError::NoMatches`] when a pattern is set and
    /// nothing in the whole forest matches it.
    pub fn select(&self, suites: &Suites) -> Result<Vec<Selected>, SelectError> {
        let Some(regex) = &self.pattern else {
            return Ok(suites
                .iter()
                .map(|(id, suite)| Selected {
                    suite: id,
                    tests: (0..suite.tests.len()).collect(),
                })
                .collect());
        };

        let mut selected = Vec::new();
        for (id, suite) in suites.iter() {
            if regex.is_match(&suite.name) {
                selected.push(Selected {
                    suite: id,
                    tests: (0..suite.tests.len()).collect(),
                });
                continue;
            }

            let tests: Vec<usize> = suite
                .tests
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.is_placeholder() && regex.is_match(&t.name))
                .map(|(i, _)| i)
                .collect();

            if !tests.is_empty() {
                selected.push(Selected { suite: id, tests });
            }
        }

        if selected.is_empty() {
            return Err(SelectError::NoMatches(regex.as_str().to_string()));
        }

        Ok(selected)
    }
}
