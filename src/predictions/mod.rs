//! Aggregation of deleteriousness predictions per protein change.

use std::fmt;

use indexmap::IndexMap;

pub mod decoder;

pub use decoder::{DecodeError, PredictionFieldDecoder};

/// Output tag holding the merged predictions.
pub const EFFECT_PREDICTIONS: &str = "EFFECT_PREDICTIONS";

/// Output tags for algorithms whose name does not map directly.
const ALGORITHM_TAGS: &[(&str, &str)] = &[
    ("sift", "DBNSFP_SIFT"),
    ("provean", "DBNSFP_PROVEAN"),
    ("m-cap", "DBNSFP_M_CAP"),
    ("mutpred", "DBNSFP_MUTPRED"),
    ("metarnn", "DBNSFP_META_RNN"),
    ("fathmm", "DBNSFP_FATHMM"),
    ("fathmm_mkl_coding", "DBNSFP_FATHMM_MKL"),
    ("mutationtaster", "DBNSFP_MUTATIONTASTER"),
    ("mutationassessor", "DBNSFP_MUTATIONASSESSOR"),
    ("deogen2", "DBNSFP_DEOGEN2"),
    ("primateai", "DBNSFP_PRIMATEAI"),
    ("list_s2", "DBNSFP_LIST_S2"),
    ("gerp_rs", "DBNSFP_GERP"),
    ("bayesdel_addaf", "DBNSFP_BAYESDEL_ADDAF"),
    ("aloft", "DBNSFP_ALOFTPRED"),
    ("splice_site_rf", "DBNSFP_SPLICE_SITE_RF"),
    ("splice_site_ada", "DBNSFP_SPLICE_SITE_ADA"),
];

/// Output tag for one algorithm, e.g., `DBNSFP_SIFT`.
pub fn algorithm_tag(algorithm: &str) -> String {
    let lower = algorithm.to_lowercase();
    ALGORITHM_TAGS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, tag)| tag.to_string())
        .unwrap_or_else(|| {
            let sanitized = lower
                .to_uppercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>();
            format!("DBNSFP_{}", sanitized)
        })
}

/// Collapsed predictions of one algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmPrediction {
    /// Lowercase algorithm name.
    pub algorithm: String,
    /// Distinct raw values, `.` if there is none.
    pub values: Vec<String>,
}

impl AlgorithmPrediction {
    /// The values joined with `|`.
    pub fn joined_values(&self) -> String {
        self.values.join("|")
    }
}

impl fmt::Display for AlgorithmPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", &self.algorithm, self.joined_values())
    }
}

/// Predictions of all algorithms, in algorithm table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionSet(pub Vec<AlgorithmPrediction>);

impl PredictionSet {
    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmPrediction> {
        self.0.iter()
    }
}

impl fmt::Display for PredictionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.0.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        write!(f, "{}", parts.join("&"))
    }
}

/// Predictions keyed by `<gene>:<protein change>` or `<gene>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectPredictions {
    entries: IndexMap<String, PredictionSet>,
}

impl EffectPredictions {
    pub fn insert(&mut self, key: String, predictions: PredictionSet) {
        self.entries.insert(key, predictions);
    }

    pub fn get(&self, key: &str) -> Option<&PredictionSet> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Predictions for the principal consequence.
    ///
    /// Looks up `<gene>:<protein change>` and, for splice consequences,
    /// falls back to `<gene>`.
    pub fn lookup(
        &self,
        gene: &str,
        protein_change: Option<&str>,
        consequence: &str,
    ) -> Option<&PredictionSet> {
        protein_change
            .and_then(|change| self.get(&format!("{}:{}", gene, change)))
            .or_else(|| {
                if consequence.contains("splice_") {
                    self.get(gene)
                } else {
                    None
                }
            })
    }
}

/// Output annotations for a prediction set.
pub fn to_annotations(predictions: &PredictionSet) -> IndexMap<String, String> {
    let mut result = IndexMap::new();
    result.insert(EFFECT_PREDICTIONS.to_string(), predictions.to_string());
    for prediction in predictions.iter() {
        result.insert(
            algorithm_tag(&prediction.algorithm),
            prediction.joined_values(),
        );
    }
    result
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{algorithm_tag, to_annotations, AlgorithmPrediction, EffectPredictions, PredictionSet};

    fn set() -> PredictionSet {
        PredictionSet(vec![
            AlgorithmPrediction {
                algorithm: "sift".into(),
                values: vec!["D".into()],
            },
            AlgorithmPrediction {
                algorithm: "gerp_rs".into(),
                values: vec!["C".into(), "N".into()],
            },
            AlgorithmPrediction {
                algorithm: "cadd".into(),
                values: vec![".".into()],
            },
        ])
    }

    #[rstest::rstest]
    #[case("SIFT", "DBNSFP_SIFT")]
    #[case("M-CAP", "DBNSFP_M_CAP")]
    #[case("fathmm_mkl_coding", "DBNSFP_FATHMM_MKL")]
    #[case("aloft", "DBNSFP_ALOFTPRED")]
    #[case("CADD", "DBNSFP_CADD")]
    #[case("GERP++_RS", "DBNSFP_GERP___RS")]
    fn tags(#[case] algorithm: &str, #[case] expected: &str) {
        assert_eq!(algorithm_tag(algorithm), expected);
    }

    #[test]
    fn lookup() {
        let mut predictions = EffectPredictions::default();
        predictions.insert("ENSG00000141510:p.R213X".into(), set());
        predictions.insert("ENSG00000105976".into(), set());

        assert!(predictions
            .lookup("ENSG00000141510", Some("p.R213X"), "stop_gained")
            .is_some());
        assert!(predictions
            .lookup("ENSG00000141510", Some("p.R213Q"), "missense_variant")
            .is_none());
        assert!(predictions
            .lookup("ENSG00000105976", None, "splice_donor_variant")
            .is_some());
        assert!(predictions
            .lookup("ENSG00000105976", None, "intron_variant")
            .is_none());
    }

    #[test]
    fn annotations() {
        let annotations = to_annotations(&set());

        assert_eq!(
            annotations.into_iter().collect::<Vec<_>>(),
            vec![
                (
                    "EFFECT_PREDICTIONS".to_string(),
                    "sift:D&gerp_rs:C|N&cadd:.".to_string()
                ),
                ("DBNSFP_SIFT".into(), "D".into()),
                ("DBNSFP_GERP".into(), "C|N".into()),
                ("DBNSFP_CADD".into(), ".".into()),
            ]
        );
    }
}
