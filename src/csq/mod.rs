//! Decoding of the multi-transcript consequence field.

pub mod aa;
pub mod block;
pub mod fields;
pub mod pick;
pub mod regulatory;
pub mod summary;

pub use block::{CodingStatus, ExonicStatus, TranscriptConsequenceBlock};
pub use fields::CsqFieldMap;
pub use pick::{resolve_principal, PickReason, Principal};
pub use summary::ConsequenceSummary;

use crate::refs::TranscriptXrefMap;

/// All blocks of one variant and their compact summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedConsequences {
    pub blocks: Vec<TranscriptConsequenceBlock>,
    pub summaries: Vec<ConsequenceSummary>,
    /// Ensembl transcripts without any xref entry, in block order.
    pub missing_xrefs: Vec<String>,
}

/// Decoder for the consequence field of one input stream.
#[derive(Debug, Clone)]
pub struct CsqDecoder<'a> {
    fields: &'a CsqFieldMap,
    xref: &'a TranscriptXrefMap,
}

impl<'a> CsqDecoder<'a> {
    pub fn new(fields: &'a CsqFieldMap, xref: &'a TranscriptXrefMap) -> Self {
        Self { fields, xref }
    }

    /// Decode the comma-separated blocks of `value`.
    ///
    /// Each block's transcript is looked up in `record_xref` first and then in
    /// the static xref map.
    pub fn decode(
        &self,
        value: &str,
        record_xref: Option<&TranscriptXrefMap>,
    ) -> DecodedConsequences {
        let mut result = DecodedConsequences::default();

        for raw in value.split(',') {
            let fields = self.fields.decode(raw);
            let transcript_id = fields.get("Feature").cloned();
            let xref = transcript_id.as_deref().and_then(|id| {
                record_xref
                    .and_then(|map| map.get(id))
                    .or_else(|| self.xref.get(id))
            });
            if xref.is_none() {
                if let Some(id) = transcript_id.filter(|id| id.starts_with("ENST")) {
                    result.missing_xrefs.push(id);
                }
            }

            let block = TranscriptConsequenceBlock::new(fields, xref);
            result.summaries.push(ConsequenceSummary::from(&block));
            result.blocks.push(block);
        }

        result
    }
}
