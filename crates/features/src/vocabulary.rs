//! Neighbourhood name → integer code table.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Code given to names the vocabulary has never seen.
pub const UNKNOWN_NEIGHBOURHOOD_CODE: u32 = 0;

/// Categorical vocabulary fitted over a training corpus.
///
/// Known names get codes `1..=len()` in lexicographic order; `0` is reserved
/// for unknown names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighbourhoodVocabulary {
    codes: BTreeMap<String, u32>,
}

impl NeighbourhoodVocabulary {
    /// Empty vocabulary: every name is unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fit over every name in the corpus (duplicates collapse).
    pub fn fit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let codes = distinct
            .into_iter()
            .zip(1u32..)
            .collect::<BTreeMap<_, _>>();

        Self { codes }
    }

    pub fn code(&self, name: &str) -> Option<u32> {
        self.codes.get(name.trim()).copied()
    }

    /// Code for `name`, falling back to [`UNKNOWN_NEIGHBOURHOOD_CODE`].
    pub fn code_or_unknown(&self, name: &str) -> u32 {
        self.code(name).unwrap_or(UNKNOWN_NEIGHBOURHOOD_CODE)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check a deserialized table: codes must be non-zero and distinct.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.codes.len());
        for (name, code) in &self.codes {
            if *code == UNKNOWN_NEIGHBOURHOOD_CODE {
                return Err(format!("neighbourhood {name:?} uses the reserved unknown code"));
            }
            if !seen.insert(*code) {
                return Err(format!("neighbourhood code {code} is assigned more than once"));
            }
        }
        Ok(())
    }
}
