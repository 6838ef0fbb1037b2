//! Decoder for the composite dbNSFP prediction field.
//!
//! Each comma-separated entry describes one protein isoform set:
//!
//! ```text
//! refAA|altAA|...|...|id1&id2|...|pos1&pos2|algo1|algo2|...
//! ```
//!
//! with the algorithm columns starting at index 7.

use indexmap::IndexMap;

use super::{AlgorithmPrediction, EffectPredictions, PredictionSet};
use crate::{
    common::non_missing,
    refs::{algorithms::FIRST_ALGORITHM_FIELD, PredictionAlgorithmTable},
};

const REF_AA: usize = 0;
const ALT_AA: usize = 1;
const IDS: usize = 4;
const AA_POSITIONS: usize = 6;

/// Error type for decoding the prediction field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} prediction algorithms, found {found}")]
    SchemaMismatch { expected: usize, found: usize },
    #[error("malformed prediction entry {0:?}")]
    MalformedEntry(String),
}

/// Decoder bound to the algorithm list of the input stream.
#[derive(Debug, Clone)]
pub struct PredictionFieldDecoder<'a> {
    algorithms: &'a PredictionAlgorithmTable,
}

/// Collapse the `&`-separated raw values of one algorithm.
///
/// Empty values become `.`, which is dropped again if a real value exists.
fn collapse_values(raw: &str) -> Vec<String> {
    let mut values = Vec::<String>::new();
    for value in raw.split('&') {
        let value = if value.is_empty() { "." } else { value };
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    if values.len() > 1 {
        values.retain(|v| v != ".");
    }
    values
}

impl<'a> PredictionFieldDecoder<'a> {
    pub fn new(algorithms: &'a PredictionAlgorithmTable) -> Self {
        Self { algorithms }
    }

    /// Decode all entries of `value`.
    ///
    /// A single entry whose number of algorithm columns differs from the
    /// algorithm table fails the whole field.
    pub fn decode(&self, value: &str) -> Result<EffectPredictions, DecodeError> {
        let mut result = EffectPredictions::default();

        for entry in value.split(',') {
            let columns = entry.split('|').collect::<Vec<_>>();
            if columns.len() <= AA_POSITIONS {
                return Err(DecodeError::MalformedEntry(entry.to_string()));
            }
            let found = columns.len() - FIRST_ALGORITHM_FIELD;
            if found != self.algorithms.len() {
                return Err(DecodeError::SchemaMismatch {
                    expected: self.algorithms.len(),
                    found,
                });
            }

            let predictions = PredictionSet(
                self.algorithms
                    .names()
                    .iter()
                    .zip(&columns[FIRST_ALGORITHM_FIELD..])
                    .map(|(name, raw)| AlgorithmPrediction {
                        algorithm: name.to_lowercase(),
                        values: collapse_values(raw),
                    })
                    .collect(),
            );

            // Ids are joined with `&` or `;`.
            let mut ids = IndexMap::new();
            for id in columns[IDS].split(['&', ';']).filter_map(non_missing) {
                ids.insert(id, ());
            }
            let amino_acids = non_missing(columns[REF_AA]).zip(non_missing(columns[ALT_AA]));

            if let Some((ref_aa, alt_aa)) = amino_acids {
                for pos in columns[AA_POSITIONS].split('&') {
                    for id in ids.keys() {
                        result.insert(
                            format!("{}:p.{}{}{}", id, ref_aa, pos, alt_aa),
                            predictions.clone(),
                        );
                    }
                }
            } else {
                for id in ids.keys() {
                    result.insert(id.to_string(), predictions.clone());
                }
            }
        }

        Ok(result)
    }
}
