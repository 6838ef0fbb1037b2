//! Per-record summarisation of the consequence and prediction fields.

use std::collections::HashSet;

use itertools::Itertools;

use super::{config::Config, header::is_output_tag};
use crate::{
    csq::{regulatory::regulatory_annotation, resolve_principal, CsqDecoder, CsqFieldMap},
    hotspots::{match_hotspots, PrincipalChange},
    oncogenicity::Classifier,
    predictions::{self, EffectPredictions, PredictionFieldDecoder},
    record::VariantRecord,
    refs::{PredictionAlgorithmTable, ReferenceData, TranscriptXrefMap},
};

/// INFO field with the VEP consequences.
pub const CSQ_KEY: &str = "CSQ";
/// INFO field with the dbNSFP predictions.
pub const DBNSFP_KEY: &str = "DBNSFP";

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Annotations were added.
    Annotated,
    /// No consequence field or no picked block; the record is skipped.
    NoConsequence,
}

/// Annotates records of one input stream.
#[derive(Debug)]
pub struct Annotator<'a> {
    refs: &'a ReferenceData,
    config: &'a Config,
    csq_fields: CsqFieldMap,
    algorithms: Option<PredictionAlgorithmTable>,
    classifier: Option<Classifier>,
    /// Transcripts already reported as lacking an xref.
    warned_xrefs: HashSet<String>,
}

impl<'a> Annotator<'a> {
    pub fn new(
        refs: &'a ReferenceData,
        config: &'a Config,
        csq_fields: CsqFieldMap,
        algorithms: Option<PredictionAlgorithmTable>,
    ) -> Self {
        let classifier = config
            .oncogenicity
            .then(|| Classifier::new(config.thresholds, &config.tumor_type));
        Self {
            refs,
            config,
            csq_fields,
            algorithms,
            classifier,
            warned_xrefs: HashSet::new(),
        }
    }

    /// Decode the prediction field, empty on a malformed field.
    fn predictions(&self, record: &VariantRecord) -> EffectPredictions {
        let (Some(algorithms), Some(value)) = (&self.algorithms, record.info(DBNSFP_KEY)) else {
            return EffectPredictions::default();
        };
        match PredictionFieldDecoder::new(algorithms).decode(value) {
            Ok(predictions) => predictions,
            Err(e) => {
                tracing::debug!(
                    "{}: ignoring {} field: {}",
                    record.variant_id(),
                    DBNSFP_KEY,
                    e
                );
                EffectPredictions::default()
            }
        }
    }

    /// Add all annotations to `record`.
    pub fn annotate(&mut self, record: &mut VariantRecord) -> Outcome {
        let Some(csq) = record.info(CSQ_KEY).map(String::from) else {
            return Outcome::NoConsequence;
        };
        let record_xref = record
            .info(&self.config.xref_tag)
            .map(|value| TranscriptXrefMap::from_info_field(value, &self.refs.xref_layout));

        let decoded =
            CsqDecoder::new(&self.csq_fields, &self.refs.xref).decode(&csq, record_xref.as_ref());
        for transcript_id in &decoded.missing_xrefs {
            if self.warned_xrefs.insert(transcript_id.clone()) {
                tracing::warn!("no gene xref for transcript {}", transcript_id);
            }
        }

        let Some(principal) = resolve_principal(&decoded.blocks) else {
            return Outcome::NoConsequence;
        };
        let block = principal.block;
        tracing::trace!(
            "{}: principal consequence {:?} ({})",
            record.variant_id(),
            block.feature(),
            principal.reason
        );

        for (key, value) in block.to_annotations() {
            if self.refs.infotags.contains(&key) && is_output_tag(&key, self.config) {
                record.annotate(key, value);
            }
        }
        record.annotate("VEP_ALL_CSQ", decoded.summaries.iter().join(","));

        if self.config.regulatory {
            if let Some(regulatory) = regulatory_annotation(&decoded.blocks) {
                record.annotate("REGULATORY_ANNOTATION", regulatory);
            }
        }

        let effect_predictions = self.predictions(record);
        let predictions = block.gene().and_then(|gene| {
            effect_predictions.lookup(
                gene,
                block.derived().short_protein_change.as_deref(),
                block.consequence().unwrap_or_default(),
            )
        });
        if let Some(predictions) = predictions {
            for (key, value) in predictions::to_annotations(predictions) {
                record.annotate(key, value);
            }
        }

        let principal_change = PrincipalChange::new(
            block.derived().short_protein_change.as_deref(),
            block.hgvsc(),
        );
        let hotspot = match_hotspots(&decoded.summaries, &self.refs.hotspots, &principal_change);
        if let Some(hotspot) = &hotspot {
            for (key, value) in hotspot.to_annotations() {
                record.annotate(key, value);
            }
        }

        if let Some(classifier) = &self.classifier {
            let call = classifier.classify(block, hotspot.as_ref(), predictions);
            for (key, value) in call.to_annotations() {
                record.annotate(key, value);
            }
        }

        Outcome::Annotated
    }
}
