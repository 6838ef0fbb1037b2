//! Matching of consequences against the cancer hotspot registry.

use indexmap::IndexMap;

use crate::{
    csq::{aa::three_to_one, ConsequenceSummary},
    refs::{hotspots::HotspotEntry, HotspotRegistry},
};

lazy_static::lazy_static! {
    static ref HOTSPOT_CSQ: regex::Regex = regex::Regex::new(
        r"^(missense|stop|start|inframe|splice_donor|splice_acceptor|frameshift)"
    ).unwrap();
    static ref CODON: regex::Regex = regex::Regex::new(r"^p\.[A-Z][0-9]+").unwrap();
    static ref HGVSC_ALT: regex::Regex = regex::Regex::new(r">(A|G|C|T)+$").unwrap();
}

/// Where a hotspot hit was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HotspotSite {
    Exonic,
    Splice,
}

/// Provenance of the accepted hotspot match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MatchKind {
    ByHgvspPrincipal,
    ByHgvspNonprincipal,
    ByHgvscPrincipal,
    ByHgvscNonprincipal,
    ByCodonPrincipal,
    ByCodonNonprincipal,
}

impl MatchKind {
    pub fn is_principal(&self) -> bool {
        matches!(
            self,
            MatchKind::ByHgvspPrincipal | MatchKind::ByHgvscPrincipal | MatchKind::ByCodonPrincipal
        )
    }

    /// Whether the match is on codon level only.
    pub fn is_codon(&self) -> bool {
        matches!(
            self,
            MatchKind::ByCodonPrincipal | MatchKind::ByCodonNonprincipal
        )
    }
}

/// The accepted hotspot match of a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotMatch<'a> {
    pub entry: &'a HotspotEntry,
    pub site: HotspotSite,
    pub kind: MatchKind,
}

impl<'a> HotspotMatch<'a> {
    /// `<exonic|splice>|<hotspot label>`
    pub fn label(&self) -> String {
        format!("{}|{}", self.site, &self.entry.label)
    }

    pub fn to_annotations(&self) -> IndexMap<String, String> {
        let mut result = IndexMap::new();
        result.insert("MUTATION_HOTSPOT".to_string(), self.label());
        result.insert(
            "MUTATION_HOTSPOT_CANCERTYPE".to_string(),
            self.entry.cancer_types.clone(),
        );
        result.insert("MUTATION_HOTSPOT_MATCH".to_string(), self.kind.to_string());
        if let Some(samples) = self.entry.samples {
            result.insert("MUTATION_HOTSPOT_SAMPLES".to_string(), samples.to_string());
        }
        result
    }
}

/// Codon part of a single-letter protein change, e.g., `p.G12` of `p.G12V`.
pub fn codon_of(protein_change: &str) -> Option<&str> {
    CODON.find(protein_change).map(|m| m.as_str())
}

/// Splice change without the alternate base(s), e.g., `c.3082+1G`.
pub fn splice_key(hgvsc: &str) -> String {
    let change = hgvsc.split_once(':').map(|(_, c)| c).unwrap_or(hgvsc);
    HGVSC_ALT.replace(change, "").into_owned()
}

/// The principal consequence's changes that hotspot hits are compared with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalChange {
    /// Single-letter protein change.
    pub protein: Option<String>,
    /// Splice change without alternate base.
    pub splice: Option<String>,
}

impl PrincipalChange {
    pub fn new(short_protein_change: Option<&str>, hgvsc: Option<&str>) -> Self {
        Self {
            protein: short_protein_change.map(String::from),
            splice: hgvsc.map(splice_key),
        }
    }

    fn codon(&self) -> Option<&str> {
        self.protein.as_deref().and_then(codon_of)
    }
}

/// Candidate hit before provenance has been decided.
struct Hit<'a> {
    entry: &'a HotspotEntry,
    site: HotspotSite,
}

/// Pick one of the distinct hits.
///
/// A hit equal to the principal change wins.  Otherwise, with several hits
/// the first one in transcript order is kept as non-principal.
fn choose<'a, F>(hits: IndexMap<String, Hit<'a>>, is_principal: F) -> Option<(Hit<'a>, bool)>
where
    F: Fn(&Hit<'a>) -> bool,
{
    let num_hits = hits.len();
    let mut first = None;
    for (label, hit) in hits {
        if is_principal(&hit) {
            return Some((hit, true));
        }
        if first.is_none() {
            first = Some((label, hit));
        }
    }
    first.map(|(label, hit)| {
        if num_hits > 1 {
            tracing::debug!(
                "{} hotspot hits, none matching the principal change; keeping {}",
                num_hits,
                label
            );
        }
        (hit, false)
    })
}

/// Match all summaries of a variant against the registry.
///
/// Protein and splice changes are tried first; codon-level matches are
/// only considered if there is no such hit.
pub fn match_hotspots<'a>(
    summaries: &[ConsequenceSummary],
    registry: &'a HotspotRegistry,
    principal: &PrincipalChange,
) -> Option<HotspotMatch<'a>> {
    let mut mutation_hits = IndexMap::new();
    let mut codon_hits = IndexMap::new();

    for summary in summaries {
        if !HOTSPOT_CSQ.is_match(&summary.consequence) {
            continue;
        }
        let Some(entrez) = summary.entrez_gene.as_deref() else {
            continue;
        };

        let protein_change = summary.hgvsp.as_deref().map(three_to_one);
        let is_splice_site = summary
            .consequence
            .split('&')
            .any(|t| t == "splice_donor_variant" || t == "splice_acceptor_variant");
        let key = match (&protein_change, summary.hgvsc.as_deref()) {
            (_, Some(hgvsc)) if is_splice_site => format!("{}-{}", entrez, splice_key(hgvsc)),
            (Some(change), _) => format!("{}-{}", entrez, change),
            _ => continue,
        };

        if let Some(entry) = registry.by_mutation(&key) {
            let site = HotspotSite::Exonic;
            mutation_hits
                .entry(format!("{}|{}", site, &entry.label))
                .or_insert(Hit { entry, site });
        }
        if let Some(entry) = registry.by_splice(&key) {
            let site = HotspotSite::Splice;
            mutation_hits
                .entry(format!("{}|{}", site, &entry.label))
                .or_insert(Hit { entry, site });
        }

        if let Some(codon) = protein_change.as_deref().and_then(codon_of) {
            if let Some(entry) = registry.by_codon(&format!("{}-{}", entrez, codon)) {
                codon_hits
                    .entry(format!("exonic|{}", &entry.label))
                    .or_insert(Hit {
                        entry,
                        site: HotspotSite::Exonic,
                    });
            }
        }
    }

    if !mutation_hits.is_empty() {
        let (hit, is_principal) = choose(mutation_hits, |hit| match hit.site {
            HotspotSite::Exonic => principal.protein.as_deref() == Some(hit.entry.hgvsp.as_str()),
            HotspotSite::Splice => principal.splice.as_deref() == Some(hit.entry.hgvsc.as_str()),
        })?;
        let kind = match (hit.site, is_principal) {
            (HotspotSite::Exonic, true) => MatchKind::ByHgvspPrincipal,
            (HotspotSite::Exonic, false) => MatchKind::ByHgvspNonprincipal,
            (HotspotSite::Splice, true) => MatchKind::ByHgvscPrincipal,
            (HotspotSite::Splice, false) => MatchKind::ByHgvscNonprincipal,
        };
        Some(HotspotMatch {
            entry: hit.entry,
            site: hit.site,
            kind,
        })
    } else {
        let (hit, is_principal) = choose(codon_hits, |hit| {
            principal.codon() == Some(hit.entry.codon.as_str())
        })?;
        Some(HotspotMatch {
            entry: hit.entry,
            site: hit.site,
            kind: if is_principal {
                MatchKind::ByCodonPrincipal
            } else {
                MatchKind::ByCodonNonprincipal
            },
        })
    }
}
