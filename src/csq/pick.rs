//! Selection of the principal consequence among the picked blocks.

use super::block::TranscriptConsequenceBlock;

/// Rule that selected the principal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PickReason {
    /// Only one block was picked.
    Single,
    /// First exonic protein-coding pick.
    Exonic,
    /// First protein-coding pick with a 5' or 3' UTR consequence.
    Utr,
    /// First protein-coding pick.
    FirstProteinCoding,
    /// First pick, none being protein-coding.
    FirstPicked,
}

/// The principal consequence of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal<'a> {
    /// Index into the decoded blocks.
    pub index: usize,
    pub block: &'a TranscriptConsequenceBlock,
    pub reason: PickReason,
}

fn principal(
    (index, block): (usize, &TranscriptConsequenceBlock),
    reason: PickReason,
) -> Principal<'_> {
    Principal {
        index,
        block,
        reason,
    }
}

/// Select the principal block.
///
/// Among several picked blocks, the protein-coding ones are considered and
/// the first exonic one wins, then the first UTR one, then the first one.
/// Without protein-coding picks the first pick is taken.  Returns `None`
/// if no block was picked.
pub fn resolve_principal(blocks: &[TranscriptConsequenceBlock]) -> Option<Principal<'_>> {
    let picked = blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| block.is_picked())
        .collect::<Vec<_>>();
    match picked.as_slice() {
        [] => None,
        [single] => Some(principal(*single, PickReason::Single)),
        [first, ..] => {
            let coding = picked
                .iter()
                .copied()
                .filter(|(_, block)| block.is_protein_coding())
                .collect::<Vec<_>>();
            if coding.is_empty() {
                return Some(principal(*first, PickReason::FirstPicked));
            }

            let is_utr = |block: &TranscriptConsequenceBlock| {
                block.has_consequence("5_prime_UTR_variant")
                    || block.has_consequence("3_prime_UTR_variant")
            };
            let chosen = if let Some(exonic) = coding.iter().find(|(_, b)| b.is_exonic()) {
                principal(*exonic, PickReason::Exonic)
            } else if let Some(utr) = coding.iter().find(|(_, b)| is_utr(b)) {
                principal(*utr, PickReason::Utr)
            } else {
                principal(coding[0], PickReason::FirstProteinCoding)
            };
            Some(chosen)
        }
    }
}
