//! Compact per-transcript consequence summaries (`VEP_ALL_CSQ`).

use std::fmt;

use super::block::TranscriptConsequenceBlock;

/// One entry of `VEP_ALL_CSQ`.
///
/// Missing values are represented by `.` when displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsequenceSummary {
    pub consequence: String,
    pub symbol: Option<String>,
    pub entrez_gene: Option<String>,
    /// HGVSc without the transcript prefix.
    pub hgvsc: Option<String>,
    /// HGVSp without the protein prefix, in three-letter notation.
    pub hgvsp: Option<String>,
    pub feature_type: Option<String>,
    pub feature: Option<String>,
    pub biotype: Option<String>,
}

/// Drop the `<accession>:` prefix of an HGVS string.
fn strip_accession(hgvs: &str) -> &str {
    hgvs.split_once(':').map(|(_, change)| change).unwrap_or(hgvs)
}

impl From<&TranscriptConsequenceBlock> for ConsequenceSummary {
    fn from(block: &TranscriptConsequenceBlock) -> Self {
        let owned = |value: Option<&str>| value.map(String::from);
        Self {
            consequence: block.consequence().unwrap_or(".").to_string(),
            symbol: owned(block.symbol()),
            entrez_gene: owned(block.entrez_gene()),
            hgvsc: owned(block.hgvsc().map(strip_accession)),
            hgvsp: owned(block.hgvsp().map(strip_accession)),
            feature_type: owned(block.feature_type()),
            feature: owned(block.feature()),
            biotype: owned(block.biotype()),
        }
    }
}

impl fmt::Display for ConsequenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_dot = |value: &Option<String>| value.as_deref().unwrap_or(".").to_string();
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}:{}",
            &self.consequence,
            or_dot(&self.symbol),
            or_dot(&self.entrez_gene),
            or_dot(&self.hgvsc),
            or_dot(&self.hgvsp),
            or_dot(&self.feature_type),
            or_dot(&self.feature),
            or_dot(&self.biotype),
        )
    }
}

#[cfg(test)]
mod test {
    use crate::csq::block::TranscriptConsequenceBlock;

    use super::ConsequenceSummary;

    #[test]
    fn display() {
        let block = TranscriptConsequenceBlock::new(
            [
                ("Consequence", "stop_gained"),
                ("SYMBOL", "TP53"),
                ("ENTREZGENE", "7157"),
                ("HGVSc", "ENST00000269305.9:c.637C>T"),
                ("HGVSp", "ENSP00000269305.4:p.Arg213Ter"),
                ("Feature_type", "Transcript"),
                ("Feature", "ENST00000269305"),
                ("BIOTYPE", "protein_coding"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            None,
        );

        insta::assert_snapshot!(
            ConsequenceSummary::from(&block).to_string(),
            @"stop_gained:TP53:7157:c.637C>T:p.Arg213Ter:Transcript:ENST00000269305:protein_coding"
        );
    }

    #[test]
    fn display_missing() {
        let summary = ConsequenceSummary {
            consequence: "TF_binding_site_variant".into(),
            feature_type: Some("MotifFeature".into()),
            feature: Some("ENSM00208374688".into()),
            ..Default::default()
        };

        insta::assert_snapshot!(
            summary.to_string(),
            @"TF_binding_site_variant:.:.:.:.:MotifFeature:ENSM00208374688:."
        );
    }
}
