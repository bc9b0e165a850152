//! Error types and utilities for butterfly-osm toolkit
//!
//! Provides the shared error enum for encoded values, tag parsing and import
//! assembly, plus fuzzy matching for mistyped attribute names.

use strsim::{jaro_winkler, normalized_levenshtein};
use thiserror::Error;

/// Find the best fuzzy match using hybrid character-based scoring
///
/// Combines Jaro-Winkler (70%) with normalized Levenshtein (30%), plus two
/// bonuses tuned for snake_case attribute names:
/// - Prefix matching: 20% bonus for strong prefix similarity (≥4 chars)
/// - Part matching: 12% bonus when the input closely matches one `_` part
///
/// Minimum threshold: 0.65 similarity to balance precision vs recall
fn find_best_fuzzy_match<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best_match = None;
    let mut best_score = 0.0f64;

    // Empirically tuned: rejects "speed" → "road_class" but keeps
    // "mopde_access" → "moped_access".
    let min_threshold = 0.65;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();

        // Jaro-Winkler: strong for transposition/prefix typos ("mopde").
        let jw_score = jaro_winkler(&input_lower, &candidate_lower);

        // Normalized Levenshtein: better for insertions/deletions ("road_clas").
        let lev_score = normalized_levenshtein(&input_lower, &candidate_lower);

        let combined_score = (jw_score * 0.7) + (lev_score * 0.3);

        let mut semantic_bonus = 0.0;

        let prefix_len = input_lower.chars().count().min(7);
        if prefix_len >= 4 {
            let input_prefix = input_lower.chars().take(prefix_len).collect::<String>();
            let candidate_prefix = candidate_lower.chars().take(prefix_len).collect::<String>();

            let prefix_similarity = normalized_levenshtein(&input_prefix, &candidate_prefix);
            if prefix_similarity > 0.7 {
                semantic_bonus += 0.2 * prefix_similarity;
            }
        }

        // Compound names: "speed" should still find "max_speed".
        if candidate_lower.contains('_') {
            for part in candidate_lower.split('_') {
                if part.len() >= 4 {
                    let part_similarity = jaro_winkler(&input_lower, part);
                    if part_similarity > 0.85 {
                        semantic_bonus += 0.12 * part_similarity;
                    }
                }
            }
        }

        let final_score = combined_score + semantic_bonus;

        if final_score >= min_threshold && final_score > best_score {
            best_score = final_score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Suggest a correction for a potentially misspelled name
///
/// Returns `None` when `input` already matches a candidate (ignoring case) or
/// when nothing is close enough.
pub fn suggest_correction<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();
    if candidates.clone().any(|c| c.eq_ignore_ascii_case(input)) {
        return None;
    }
    find_best_fuzzy_match(input, candidates)
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean '{s}'?"),
        None => String::new(),
    }
}

/// Main error type for butterfly-osm operations
#[derive(Debug, Error)]
pub enum Error {
    /// A value does not fit the bit range of an encoded value
    #[error("value {value} is out of range [{min}, {max}] for encoded value '{name}'")]
    ValueOutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// An encoded value declaration is malformed (zero or too many bits, bad factor)
    #[error("invalid definition for encoded value '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// Two encoded values registered under one name
    #[error("encoded value '{0}' is already registered")]
    DuplicateEncodedValue(String),

    /// Two import units registered under one key
    #[error("import key '{0}' is already registered")]
    DuplicateImportKey(String),

    /// A configured key names no import unit
    #[error("unknown encoded value key '{key}'{}", did_you_mean(.suggestion))]
    UnknownImportKey {
        key: String,
        suggestion: Option<String>,
    },

    /// A lookup names no registered encoded value
    #[error("encoded value '{name}' not available{}", did_you_mean(.suggestion))]
    EncodedValueNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// A lookup expects a different kind than the one registered
    #[error("encoded value '{name}' is {actual}, not {expected}")]
    KindMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Edge storage has fewer words per edge than the layout needs
    #[error("edge storage holds {actual} ints per edge, layout needs {required}")]
    StorageTooNarrow { required: usize, actual: usize },

    /// Invalid configuration or parameters
    #[error("invalid configuration: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for butterfly-osm operations
pub type Result<T> = std::result::Result<T, Error>;
