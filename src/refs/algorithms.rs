//! Ordered list of deleteriousness prediction algorithms.

use std::path::Path;

use serde::Deserialize;

use super::{open_table, ReferenceLoadError};

lazy_static::lazy_static! {
    static ref SCORE_PRED_SUFFIX: regex::Regex =
        regex::Regex::new(r#"((_score)|(_pred))"*$"#).unwrap();
}

/// Index of the first algorithm subfield in the composite prediction field.
pub const FIRST_ALGORITHM_FIELD: usize = 7;

#[derive(Debug, Deserialize)]
struct AlgorithmRow {
    algorithm: String,
}

/// Algorithm names in the order of the composite prediction field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionAlgorithmTable {
    names: Vec<String>,
}

impl PredictionAlgorithmTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load from a TSV file with an `algorithm` column.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let mut reader = open_table(path, &["algorithm"])?;

        let mut names = Vec::new();
        for row in reader.deserialize() {
            let row: AlgorithmRow = row.map_err(|source| ReferenceLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            names.push(row.algorithm);
        }

        Ok(Self { names })
    }

    /// Derive from the header description of the prediction INFO field.
    ///
    /// The description ends in `Format: a|b|...`; the algorithms start at
    /// subfield 7 and lose their `_score`/`_pred` suffix.  Returns `None` if
    /// there is no `Format: ` part.
    pub fn from_header_description(description: &str) -> Option<Self> {
        let (_, format) = description.split_once("Format: ")?;
        let names = format
            .split('|')
            .skip(FIRST_ALGORITHM_FIELD)
            .map(|subtag| SCORE_PRED_SUFFIX.replace(subtag, "").into_owned())
            .collect();
        Some(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::PredictionAlgorithmTable;

    #[test]
    fn from_header_description() {
        let description = "Format: Ensembl_transcriptid|Uniprot_acc|genename|aaref|aaalt|\
                           Ensembl_proteinid|aapos|SIFT_pred|Provean_pred|MutationTaster_pred\"";

        let table = PredictionAlgorithmTable::from_header_description(description).unwrap();

        assert_eq!(
            table.names(),
            &["SIFT".to_string(), "Provean".into(), "MutationTaster".into()]
        );
    }

    #[test]
    fn from_header_description_without_format() {
        assert!(PredictionAlgorithmTable::from_header_description("dbNSFP predictions").is_none());
    }

    #[test]
    fn load() -> Result<(), anyhow::Error> {
        let table = PredictionAlgorithmTable::load(Path::new("tests/refs/algorithms.tsv"))?;

        assert_eq!(table.len(), 4);
        assert_eq!(table.names()[0], "SIFT");
        assert_eq!(table.names()[3], "GERP++_RS");

        Ok(())
    }
}
