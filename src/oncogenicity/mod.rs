//! Weighted-evidence oncogenicity classification of the principal consequence.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    csq::TranscriptConsequenceBlock,
    hotspots::HotspotMatch,
    predictions::PredictionSet,
};

/// Tumor type that accepts hotspots observed in any cancer type.
pub const ANY_TUMOR_TYPE: &str = "Any";

/// Prediction codes counted as damaging.
const DAMAGING_CODES: &[&str] = &["D", "A", "H", "M"];
/// Prediction codes counted as tolerated.
const TOLERATED_CODES: &[&str] = &["T", "N", "B", "L"];
/// Minimal number of algorithms with a call for a consensus.
const MIN_CALLED_ALGORITHMS: usize = 3;

/// The five oncogenicity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum Oncogenicity {
    #[strum(serialize = "Oncogenic")]
    Oncogenic,
    #[strum(serialize = "Likely_Oncogenic")]
    LikelyOncogenic,
    #[strum(serialize = "VUS")]
    Vus,
    #[strum(serialize = "Likely_Benign")]
    LikelyBenign,
    #[strum(serialize = "Benign")]
    Benign,
}

impl Oncogenicity {
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=-7 => Oncogenicity::Benign,
            -6..=-1 => Oncogenicity::LikelyBenign,
            0..=5 => Oncogenicity::Vus,
            6..=9 => Oncogenicity::LikelyOncogenic,
            _ => Oncogenicity::Oncogenic,
        }
    }
}

/// Evidence codes and their points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceCode {
    /// Null variant in a tumor suppressor.
    OncgOvs1,
    /// Hotspot match on the principal change.
    OncgOs3,
    /// In-frame indel in oncogene or tumor suppressor, or stop-lost in tumor suppressor.
    OncgOm2,
    /// Codon-level or alternative transcript hotspot match.
    OncgOm3,
    /// Damaging prediction consensus.
    OncgOp1,
    /// Absent or rare in gnomAD.
    OncgOp4,
    /// Common in gnomAD.
    OncgSbvs1,
    /// Uncommon in gnomAD.
    OncgSbs1,
    /// Tolerated prediction consensus.
    OncgSbp1,
    /// Synonymous without splice region impact.
    OncgSbp2,
}

impl EvidenceCode {
    pub fn points(&self) -> i32 {
        match self {
            EvidenceCode::OncgOvs1 => 8,
            EvidenceCode::OncgOs3 => 4,
            EvidenceCode::OncgOm2 | EvidenceCode::OncgOm3 => 2,
            EvidenceCode::OncgOp1 | EvidenceCode::OncgOp4 => 1,
            EvidenceCode::OncgSbvs1 => -8,
            EvidenceCode::OncgSbs1 => -4,
            EvidenceCode::OncgSbp1 | EvidenceCode::OncgSbp2 => -1,
        }
    }
}

/// Allele frequency cut-offs on the maximal gnomAD frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Below this (or absent) the variant counts as rare.
    pub rare_af: f64,
    /// Above this the variant counts as uncommon.
    pub uncommon_af: f64,
    /// Above this the variant counts as common.
    pub common_af: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rare_af: 0.0001,
            uncommon_af: 0.01,
            common_af: 0.05,
        }
    }
}

/// Call of the prediction algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Consensus {
    Damaging,
    Tolerated,
    Undecided,
}

/// Majority call over the algorithms with a damaging or tolerated value.
///
/// An algorithm with both kinds of values does not vote.
pub fn prediction_consensus(predictions: &PredictionSet) -> Consensus {
    let (mut damaging, mut tolerated) = (0, 0);
    for prediction in predictions.iter() {
        let is_damaging = prediction
            .values
            .iter()
            .any(|v| DAMAGING_CODES.contains(&v.as_str()));
        let is_tolerated = prediction
            .values
            .iter()
            .any(|v| TOLERATED_CODES.contains(&v.as_str()));
        match (is_damaging, is_tolerated) {
            (true, false) => damaging += 1,
            (false, true) => tolerated += 1,
            _ => (),
        }
    }

    let called = damaging + tolerated;
    if called < MIN_CALLED_ALGORITHMS {
        Consensus::Undecided
    } else if damaging * 2 > called {
        Consensus::Damaging
    } else if tolerated * 2 > called {
        Consensus::Tolerated
    } else {
        Consensus::Undecided
    }
}

/// Maximal frequency over all `*_AF_GNOMAD` subfields of the block.
pub fn max_gnomad_af(block: &TranscriptConsequenceBlock) -> Option<f64> {
    block
        .fields()
        .iter()
        .filter(|(name, _)| name.ends_with("_AF_GNOMAD"))
        .flat_map(|(_, value)| value.split('&'))
        .filter_map(|value| value.parse::<f64>().ok())
        .fold(None, |acc: Option<f64>, af| {
            Some(acc.map_or(af, |acc| acc.max(af)))
        })
}

/// Result of classifying one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct OncogenicityCall {
    pub codes: Vec<EvidenceCode>,
    pub score: i32,
    pub label: Oncogenicity,
}

impl OncogenicityCall {
    pub fn new(codes: Vec<EvidenceCode>) -> Self {
        let score = codes.iter().map(EvidenceCode::points).sum();
        Self {
            codes,
            score,
            label: Oncogenicity::from_score(score),
        }
    }

    pub fn to_annotations(&self) -> IndexMap<String, String> {
        let mut result = IndexMap::new();
        result.insert("ONCOGENICITY".to_string(), self.label.to_string());
        result.insert("ONCOGENICITY_SCORE".to_string(), self.score.to_string());
        if !self.codes.is_empty() {
            result.insert("ONCOGENICITY_CODE".to_string(), self.codes.iter().join("|"));
        }
        result
    }
}

/// Classifier configured with thresholds and the tumor type of the sample.
#[derive(Debug, Clone)]
pub struct Classifier {
    thresholds: Thresholds,
    tumor_type: String,
}

impl Classifier {
    pub fn new(thresholds: Thresholds, tumor_type: &str) -> Self {
        Self {
            thresholds,
            tumor_type: tumor_type.to_string(),
        }
    }

    fn hotspot_counts(&self, hotspot: &HotspotMatch<'_>) -> bool {
        self.tumor_type.eq_ignore_ascii_case(ANY_TUMOR_TYPE)
            || hotspot.entry.observed_in(&self.tumor_type)
    }

    /// Collect the evidence codes for the principal block and reduce them.
    pub fn classify(
        &self,
        principal: &TranscriptConsequenceBlock,
        hotspot: Option<&HotspotMatch<'_>>,
        predictions: Option<&PredictionSet>,
    ) -> OncogenicityCall {
        let is_tsg = principal.is_tumor_suppressor();
        let is_oncogene = principal.is_oncogene();
        let is_stop_lost = principal.has_consequence("stop_lost");
        let is_inframe_indel = principal.has_consequence("inframe_insertion")
            || principal.has_consequence("inframe_deletion");

        let mut codes = Vec::new();

        if is_tsg && principal.derived().null_variant && !is_stop_lost {
            codes.push(EvidenceCode::OncgOvs1);
        }

        if let Some(hotspot) = hotspot.filter(|h| self.hotspot_counts(h)) {
            if hotspot.kind.is_principal() && !hotspot.kind.is_codon() {
                codes.push(EvidenceCode::OncgOs3);
            } else {
                codes.push(EvidenceCode::OncgOm3);
            }
        }

        if (is_inframe_indel && (is_tsg || is_oncogene)) || (is_stop_lost && is_tsg) {
            codes.push(EvidenceCode::OncgOm2);
        }

        let consensus = predictions
            .map(prediction_consensus)
            .unwrap_or(Consensus::Undecided);
        match consensus {
            Consensus::Damaging => codes.push(EvidenceCode::OncgOp1),
            Consensus::Tolerated => codes.push(EvidenceCode::OncgSbp1),
            Consensus::Undecided => (),
        }

        match max_gnomad_af(principal) {
            None => codes.push(EvidenceCode::OncgOp4),
            Some(af) if af < self.thresholds.rare_af => codes.push(EvidenceCode::OncgOp4),
            Some(af) if af > self.thresholds.common_af => codes.push(EvidenceCode::OncgSbvs1),
            Some(af) if af > self.thresholds.uncommon_af => codes.push(EvidenceCode::OncgSbs1),
            Some(_) => (),
        }

        if principal.has_consequence("synonymous_variant")
            && !principal.has_consequence("splice_region_variant")
        {
            codes.push(EvidenceCode::OncgSbp2);
        }

        tracing::trace!("oncogenicity evidence: {:?}", &codes);
        OncogenicityCall::new(codes)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{
        max_gnomad_af, prediction_consensus, Classifier, Consensus, EvidenceCode, Oncogenicity,
        Thresholds, ANY_TUMOR_TYPE,
    };
    use crate::{
        csq::TranscriptConsequenceBlock,
        hotspots::{HotspotMatch, HotspotSite, MatchKind},
        predictions::{AlgorithmPrediction, PredictionSet},
        refs::hotspots::HotspotEntry,
    };

    fn block(fields: &[(&str, &str)]) -> TranscriptConsequenceBlock {
        TranscriptConsequenceBlock::new(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            None,
        )
    }

    fn predictions(calls: &[(&str, &str)]) -> PredictionSet {
        PredictionSet(
            calls
                .iter()
                .map(|(algorithm, values)| AlgorithmPrediction {
                    algorithm: algorithm.to_string(),
                    values: values.split('|').map(String::from).collect(),
                })
                .collect(),
        )
    }

    fn tp53_hotspot() -> HotspotEntry {
        HotspotEntry {
            entrez_gene: "7157".into(),
            hgvsp: "p.R213X".into(),
            codon: "p.R213".into(),
            hgvsc: ".".into(),
            label: "TP53|7157|R213|X|3.1e-44".into(),
            cancer_types: "Breast:30,Colon/Rectum:42".into(),
            samples: Some(131),
        }
    }

    #[rstest::rstest]
    #[case(14, Oncogenicity::Oncogenic)]
    #[case(10, Oncogenicity::Oncogenic)]
    #[case(9, Oncogenicity::LikelyOncogenic)]
    #[case(6, Oncogenicity::LikelyOncogenic)]
    #[case(5, Oncogenicity::Vus)]
    #[case(0, Oncogenicity::Vus)]
    #[case(-1, Oncogenicity::LikelyBenign)]
    #[case(-6, Oncogenicity::LikelyBenign)]
    #[case(-7, Oncogenicity::Benign)]
    #[case(-13, Oncogenicity::Benign)]
    fn bins(#[case] score: i32, #[case] expected: Oncogenicity) {
        assert_eq!(Oncogenicity::from_score(score), expected);
    }

    #[rstest::rstest]
    #[case(&[("sift", "D"), ("provean", "D"), ("mutationtaster", "A"), ("fathmm", "T")], Consensus::Damaging)]
    #[case(&[("sift", "T"), ("provean", "N"), ("mutationassessor", "L")], Consensus::Tolerated)]
    #[case(&[("sift", "D"), ("provean", "D")], Consensus::Undecided)]
    #[case(&[("sift", "D"), ("provean", "N"), ("mutationtaster", "D|N"), ("fathmm", "T")], Consensus::Tolerated)]
    #[case(&[("sift", "D"), ("provean", "N"), ("mutationtaster", "A"), ("fathmm", "T")], Consensus::Undecided)]
    #[case(&[("sift", "."), ("provean", "."), ("mutationtaster", ".")], Consensus::Undecided)]
    fn consensus(#[case] calls: &[(&str, &str)], #[case] expected: Consensus) {
        assert_eq!(prediction_consensus(&predictions(calls)), expected);
    }

    #[test]
    fn max_af() {
        let with_af = block(&[
            ("Consequence", "missense_variant"),
            ("GLOBAL_AF_GNOMAD", "0.001"),
            ("NFE_AF_GNOMAD", "0.02&0.03"),
            ("GLOBAL_AF_1KG", "0.4"),
        ]);
        assert_eq!(max_gnomad_af(&with_af), Some(0.03));
        assert_eq!(max_gnomad_af(&block(&[])), None);
    }

    #[test]
    fn stop_gained_in_tsg_at_hotspot() {
        let principal = block(&[
            ("Consequence", "stop_gained"),
            ("SYMBOL", "TP53"),
            ("HGVSp", "ENSP00000269305.4:p.Arg213Ter"),
            ("TUMOR_SUPPRESSOR", "1"),
            ("GLOBAL_AF_GNOMAD", "0.000004"),
        ]);
        let entry = tp53_hotspot();
        let hotspot = HotspotMatch {
            entry: &entry,
            site: HotspotSite::Exonic,
            kind: MatchKind::ByHgvspPrincipal,
        };
        let predictions = predictions(&[
            ("sift", "D"),
            ("provean", "D"),
            ("mutationtaster", "A"),
        ]);

        let call = Classifier::new(Thresholds::default(), ANY_TUMOR_TYPE).classify(
            &principal,
            Some(&hotspot),
            Some(&predictions),
        );

        assert_eq!(
            call.codes,
            vec![
                EvidenceCode::OncgOvs1,
                EvidenceCode::OncgOs3,
                EvidenceCode::OncgOp1,
                EvidenceCode::OncgOp4
            ]
        );
        assert_eq!(call.score, 14);
        assert_eq!(call.label, Oncogenicity::Oncogenic);
        assert_eq!(
            call.to_annotations().into_iter().collect::<Vec<_>>(),
            vec![
                ("ONCOGENICITY".to_string(), "Oncogenic".to_string()),
                ("ONCOGENICITY_SCORE".into(), "14".into()),
                (
                    "ONCOGENICITY_CODE".into(),
                    "ONCG_OVS1|ONCG_OS3|ONCG_OP1|ONCG_OP4".into()
                ),
            ]
        );
    }

    #[test]
    fn synonymous_without_evidence() {
        let principal = block(&[
            ("Consequence", "synonymous_variant"),
            ("SYMBOL", "KRAS"),
        ]);

        let call = Classifier::new(Thresholds::default(), ANY_TUMOR_TYPE).classify(
            &principal, None, None,
        );

        assert_eq!(
            call.codes,
            vec![EvidenceCode::OncgOp4, EvidenceCode::OncgSbp2]
        );
        assert_eq!(call.score, 0);
        assert_eq!(call.label, Oncogenicity::Vus);
    }

    #[test]
    fn common_variant_is_benign() {
        let principal = block(&[
            ("Consequence", "missense_variant"),
            ("GLOBAL_AF_GNOMAD", "0.2"),
        ]);
        let predictions = predictions(&[("sift", "T"), ("provean", "N"), ("fathmm", "T")]);

        let call = Classifier::new(Thresholds::default(), ANY_TUMOR_TYPE).classify(
            &principal,
            None,
            Some(&predictions),
        );

        assert_eq!(
            call.codes,
            vec![EvidenceCode::OncgSbp1, EvidenceCode::OncgSbvs1]
        );
        assert_eq!(call.label, Oncogenicity::Benign);
    }

    #[test]
    fn tumor_type_filters_hotspot() {
        let principal = block(&[("Consequence", "missense_variant")]);
        let entry = tp53_hotspot();
        let hotspot = HotspotMatch {
            entry: &entry,
            site: HotspotSite::Exonic,
            kind: MatchKind::ByCodonNonprincipal,
        };

        let breast = Classifier::new(Thresholds::default(), "breast").classify(
            &principal,
            Some(&hotspot),
            None,
        );
        assert_eq!(
            breast.codes,
            vec![EvidenceCode::OncgOm3, EvidenceCode::OncgOp4]
        );

        let lung =
            Classifier::new(Thresholds::default(), "Lung").classify(&principal, Some(&hotspot), None);
        assert_eq!(lung.codes, vec![EvidenceCode::OncgOp4]);
    }

    #[test]
    fn inframe_and_stop_lost() {
        let classifier = Classifier::new(Thresholds::default(), ANY_TUMOR_TYPE);

        let inframe = block(&[
            ("Consequence", "inframe_deletion"),
            ("ONCOGENE", "TRUE"),
            ("GLOBAL_AF_GNOMAD", "0.001"),
        ]);
        assert_eq!(
            classifier.classify(&inframe, None, None).codes,
            vec![EvidenceCode::OncgOm2]
        );

        let stop_lost = block(&[
            ("Consequence", "stop_lost"),
            ("TUMOR_SUPPRESSOR", "1"),
            ("GLOBAL_AF_GNOMAD", "0.02"),
        ]);
        assert_eq!(
            classifier.classify(&stop_lost, None, None).codes,
            vec![EvidenceCode::OncgOm2, EvidenceCode::OncgSbs1]
        );
    }

    #[test]
    fn stop_retained_is_not_null() {
        let principal = block(&[
            ("Consequence", "stop_retained_variant"),
            ("TUMOR_SUPPRESSOR", "1"),
            ("GLOBAL_AF_GNOMAD", "0.001"),
        ]);

        let call = Classifier::new(Thresholds::default(), ANY_TUMOR_TYPE).classify(
            &principal, None, None,
        );

        assert_eq!(call.codes, vec![]);
        assert_eq!(call.score, 0);
        assert_eq!(call.label, Oncogenicity::Vus);
    }
}
