//! Collection of regulatory and motif feature consequences.

use super::block::TranscriptConsequenceBlock;

lazy_static::lazy_static! {
    static ref REGULATORY_BIOTYPE: regex::Regex =
        regex::Regex::new(r"^(enhancer|promoter|open|CTCF|TF_)").unwrap();
}

const MOTIF_FIELDS: &[&str] = &[
    "MOTIF_NAME",
    "MOTIF_POS",
    "HIGH_INF_POS",
    "MOTIF_SCORE_CHANGE",
    "TRANSCRIPTION_FACTORS",
];

/// Format one block as
/// `Consequence|Feature_type|Feature|BIOTYPE|MOTIF_NAME|MOTIF_POS|HIGH_INF_POS|MOTIF_SCORE_CHANGE|TRANSCRIPTION_FACTORS`.
fn format_block(block: &TranscriptConsequenceBlock) -> Option<String> {
    let consequence = block.consequence()?;
    let feature_type = block.feature_type()?;
    let feature = block.feature()?;

    match feature_type {
        "RegulatoryFeature" => {
            let biotype = block
                .biotype()
                .filter(|b| REGULATORY_BIOTYPE.is_match(b))
                .unwrap_or_default();
            Some(format!(
                "{}|{}|{}|{}|||||",
                consequence, feature_type, feature, biotype
            ))
        }
        "MotifFeature" => {
            let motif = MOTIF_FIELDS
                .iter()
                .map(|name| block.get(name))
                .collect::<Option<Vec<_>>>()?;
            Some(format!(
                "{}|{}|{}|TF_binding_site|{}",
                consequence,
                feature_type,
                feature,
                motif.join("|")
            ))
        }
        _ => None,
    }
}

/// Regulatory annotation of a variant, `None` if there is nothing to report.
///
/// Variants with a single block are not annotated.
pub fn regulatory_annotation(blocks: &[TranscriptConsequenceBlock]) -> Option<String> {
    if blocks.len() <= 1 {
        return None;
    }
    let annotations = blocks.iter().filter_map(format_block).collect::<Vec<_>>();
    if annotations.is_empty() {
        None
    } else {
        Some(annotations.join(","))
    }
}
