//! One transcript consequence block and its derived attributes.

use indexmap::IndexMap;

use super::aa::three_to_one;
use crate::{common::is_truthy, refs::xref::GeneXref};

lazy_static::lazy_static! {
    static ref CODING: regex::Regex = regex::Regex::new(
        r"^(stop_gained|stop_lost|start_lost|frameshift_|missense_|splice_donor|splice_acceptor|protein_altering|inframe_)"
    ).unwrap();
    static ref EXONIC: regex::Regex = regex::Regex::new(
        r"^(stop_gained|stop_lost|start_lost|frameshift_|missense_|splice_donor|splice_acceptor|inframe_|protein_altering|synonymous)"
    ).unwrap();
    static ref NULL: regex::Regex = regex::Regex::new(r"^(stop_gained|stop_lost|frameshift_)").unwrap();
    static ref SPLICE_DONOR_HGVSC: regex::Regex = regex::Regex::new(r"(\+3(A|G)>|\+4G>|\+5G>)").unwrap();
    static ref INTRONIC_CSQ: regex::Regex = regex::Regex::new(r"^(splice_region_variant|intron_variant)").unwrap();
    static ref INTRONIC_OFFSET: regex::Regex = regex::Regex::new(
        r"((-|\+)[0-9]+(dup|del|inv|((ins|del|dup|inv|delins)(A|G|C|T)+)|(A|C|T|G)+>(A|G|C|T)+))$"
    ).unwrap();
    static ref INTRONIC_OFFSET_STRIP: regex::Regex = regex::Regex::new(
        r"(\+|dup|del|delins|ins|inv|(A|G|C|T)+|>)"
    ).unwrap();
    static ref EXON_DISTANCE_CSQ: regex::Regex = regex::Regex::new(
        r"^(synonymous_|missense_|stop_|inframe_|start_)"
    ).unwrap();
    static ref PFAM_VERSION: regex::Regex = regex::Regex::new(r"\.[0-9]+$").unwrap();
}

/// Whether the consequence alters the coding sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum CodingStatus {
    Coding,
    #[default]
    Noncoding,
}

/// Whether the consequence is exonic, synonymous changes included.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ExonicStatus {
    Exonic,
    #[default]
    Nonexonic,
}

/// Attributes computed from the raw subfields of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedAttributes {
    pub coding_status: CodingStatus,
    pub exonic_status: ExonicStatus,
    pub null_variant: bool,
    pub splice_donor_relevant: bool,
    /// Signed offset into the intron, `0` if not applicable.
    pub intron_position: i32,
    /// Distance to the nearest exon boundary, negative from the exon end.
    pub exon_position: i32,
    /// Protein change in single-letter notation.
    pub short_protein_change: Option<String>,
    pub cds_change: Option<String>,
    pub amino_acid_start: Option<String>,
    pub amino_acid_end: Option<String>,
    pub last_exon: bool,
    pub last_intron: bool,
    pub pfam_domain: Option<String>,
    pub cosmic_ids: Vec<String>,
    pub dbsnp_ids: Vec<String>,
}

/// One transcript's annotation from the consequence field.
///
/// The derived attributes are computed once on construction from the raw
/// subfields and cannot be changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptConsequenceBlock {
    fields: IndexMap<String, String>,
    derived: DerivedAttributes,
}

impl TranscriptConsequenceBlock {
    /// Build from named subfields, merging in the transcript's xref if any.
    ///
    /// Xref annotations never replace a subfield that is already present.
    pub fn new(mut fields: IndexMap<String, String>, xref: Option<&GeneXref>) -> Self {
        if let Some(xref) = xref {
            for (name, value) in &xref.annotations {
                if !fields.contains_key(name) {
                    fields.insert(name.clone(), value.clone());
                }
            }
        }
        let derived = derive_attributes(&fields);
        Self { fields, derived }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn derived(&self) -> &DerivedAttributes {
        &self.derived
    }

    pub fn consequence(&self) -> Option<&str> {
        self.get("Consequence")
    }

    /// Whether any `&`-separated consequence term equals `term`.
    pub fn has_consequence(&self, term: &str) -> bool {
        self.consequence()
            .map(|csq| csq.split('&').any(|t| t == term))
            .unwrap_or(false)
    }

    pub fn feature(&self) -> Option<&str> {
        self.get("Feature")
    }

    pub fn feature_type(&self) -> Option<&str> {
        self.get("Feature_type")
    }

    pub fn symbol(&self) -> Option<&str> {
        self.get("SYMBOL")
    }

    /// Ensembl gene id.
    pub fn gene(&self) -> Option<&str> {
        self.get("Gene")
    }

    pub fn biotype(&self) -> Option<&str> {
        self.get("BIOTYPE")
    }

    pub fn hgvsc(&self) -> Option<&str> {
        self.get("HGVSc")
    }

    pub fn hgvsp(&self) -> Option<&str> {
        self.get("HGVSp")
    }

    /// Entrez gene id from the merged xref annotations.
    pub fn entrez_gene(&self) -> Option<&str> {
        self.get("ENTREZGENE").or_else(|| self.get("ENTREZ_ID"))
    }

    pub fn is_tumor_suppressor(&self) -> bool {
        self.get("TUMOR_SUPPRESSOR").map(is_truthy).unwrap_or(false)
    }

    pub fn is_oncogene(&self) -> bool {
        self.get("ONCOGENE").map(is_truthy).unwrap_or(false)
    }

    /// Whether VEP picked this block.
    pub fn is_picked(&self) -> bool {
        self.get("PICK") == Some("1")
    }

    pub fn is_protein_coding(&self) -> bool {
        self.biotype() == Some("protein_coding")
    }

    pub fn is_exonic(&self) -> bool {
        self.derived.exonic_status == ExonicStatus::Exonic
    }

    /// Flatten raw and derived attributes into output key/value pairs.
    ///
    /// Boolean attributes are written as `"1"` when set and left out
    /// otherwise.  The raw `DOMAINS` subfield is replaced by `PFAM_DOMAIN`.
    pub fn to_annotations(&self) -> IndexMap<String, String> {
        let mut result = self
            .fields
            .iter()
            .filter(|(name, _)| name.as_str() != "DOMAINS")
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<IndexMap<_, _>>();

        let d = &self.derived;
        result.insert("CODING_STATUS".into(), d.coding_status.to_string());
        result.insert("EXONIC_STATUS".into(), d.exonic_status.to_string());
        result.insert("INTRON_POSITION".into(), d.intron_position.to_string());
        result.insert("EXON_POSITION".into(), d.exon_position.to_string());

        let flags = [
            ("NULL_VARIANT", d.null_variant),
            ("SPLICE_DONOR_RELEVANT", d.splice_donor_relevant),
            ("LAST_EXON", d.last_exon),
            ("LAST_INTRON", d.last_intron),
        ];
        for (name, value) in flags {
            if value {
                result.insert(name.into(), "1".into());
            }
        }

        let optionals = [
            ("HGVSp_short", &d.short_protein_change),
            ("CDS_CHANGE", &d.cds_change),
            ("AMINO_ACID_START", &d.amino_acid_start),
            ("AMINO_ACID_END", &d.amino_acid_end),
            ("PFAM_DOMAIN", &d.pfam_domain),
        ];
        for (name, value) in optionals {
            if let Some(value) = value {
                result.insert(name.into(), value.clone());
            }
        }

        if !d.cosmic_ids.is_empty() {
            result.insert("COSMIC_MUTATION_ID".into(), d.cosmic_ids.join("&"));
        }
        if !d.dbsnp_ids.is_empty() {
            result.insert("DBSNPRSID".into(), d.dbsnp_ids.join("&"));
        }

        result
    }
}

/// Parse `n/N` into `(n, N)`.
fn split_rank(value: &str) -> Option<(&str, &str)> {
    value.split_once('/')
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Signed intronic offset from the end of an HGVSc string.
fn intron_position(hgvsc: &str) -> Option<i32> {
    let offset = INTRONIC_OFFSET.find(hgvsc)?;
    INTRONIC_OFFSET_STRIP
        .replace_all(offset.as_str(), "")
        .parse()
        .ok()
}

/// Distance to the exon boundary from `<exon>+<dist>+<start|end>+<len>`.
fn exon_position(nearest_exon: &str) -> Option<i32> {
    let parts = nearest_exon.split('+').collect::<Vec<_>>();
    if parts.len() != 4 {
        return None;
    }
    let distance = parts[1].parse::<i32>().ok()?;
    match parts[2] {
        "end" => Some(-distance),
        "start" => Some(distance),
        _ => None,
    }
}

fn derive_attributes(fields: &IndexMap<String, String>) -> DerivedAttributes {
    let get = |name: &str| fields.get(name).map(String::as_str);
    let consequence = get("Consequence").unwrap_or_default();
    let hgvsc = get("HGVSc");

    let mut d = DerivedAttributes::default();
    if CODING.is_match(consequence) {
        d.coding_status = CodingStatus::Coding;
    }
    if EXONIC.is_match(consequence) {
        d.exonic_status = ExonicStatus::Exonic;
    }
    d.null_variant = NULL.is_match(consequence);
    d.splice_donor_relevant = consequence.starts_with("splice_region_variant")
        && hgvsc.map(|h| SPLICE_DONOR_HGVSC.is_match(h)).unwrap_or(false);

    if INTRONIC_CSQ.is_match(consequence) {
        if let Some(pos) = hgvsc.and_then(intron_position) {
            d.intron_position = pos;
        }
    }
    if EXON_DISTANCE_CSQ.is_match(consequence) {
        if let Some(pos) = get("NearestExonJB").and_then(exon_position) {
            d.exon_position = pos;
        }
    }

    // Protein position is `start[-end]/length`.
    let protein_position = get("Protein_position")
        .filter(|p| !p.starts_with('-'))
        .map(|p| p.split('/').next().unwrap_or(p));
    if let Some(position) = protein_position {
        match position.split_once('-') {
            Some((start, end)) => {
                d.amino_acid_start = Some(start).filter(|s| is_digits(s)).map(String::from);
                d.amino_acid_end = Some(end).filter(|s| is_digits(s)).map(String::from);
            }
            None if is_digits(position) => {
                d.amino_acid_start = Some(position.to_string());
                d.amino_acid_end = Some(position.to_string());
            }
            None => (),
        }
    }

    if let (Some(amino_acids), Some(position)) = (get("Amino_acids"), protein_position) {
        let mut protein_change = get("HGVSp")
            .and_then(|hgvsp| hgvsp.split_once(':'))
            .filter(|(protein_id, _)| protein_id.starts_with("ENSP"))
            .map(|(_, change)| three_to_one(change));
        if consequence.contains("synonymous_variant") {
            protein_change = Some(format!("p.{}{}{}", amino_acids, position, amino_acids));
        }
        if consequence.contains("stop_lost") {
            if let Some((_, alt)) = amino_acids.split_once('/') {
                protein_change = Some(format!("p.X{}{}", position, alt));
            }
        }
        d.short_protein_change = protein_change;
    }

    let exon_number = get("EXON").and_then(split_rank);
    if let Some((n, total)) = exon_number {
        d.last_exon = n == total;
    }
    if let Some((n, total)) = get("INTRON").and_then(split_rank) {
        d.last_intron = n == total;
    }

    if let Some(hgvsc) = hgvsc {
        if consequence.contains("splice_acceptor_variant")
            || consequence.contains("splice_donor_variant")
        {
            d.cds_change = Some(format!("{}:{}", consequence, hgvsc));
        }
        if let Some(protein_change) = &d.short_protein_change {
            let exon = exon_number.map(|(n, _)| n).unwrap_or("NA");
            d.cds_change = Some(format!(
                "{}:{}:exon{}:{}",
                consequence, hgvsc, exon, protein_change
            ));
        }
    }

    if let Some(domains) = get("DOMAINS") {
        d.pfam_domain = domains
            .split('&')
            .find(|domain| domain.starts_with("Pfam"))
            .map(|domain| {
                PFAM_VERSION
                    .replace(&domain.replace("Pfam:", ""), "")
                    .into_owned()
            });
    }

    if let Some(existing) = get("Existing_variation") {
        for id in existing.split('&') {
            if id.starts_with("COSV") || id.starts_with("COSM") {
                d.cosmic_ids.push(id.to_string());
            } else if id.starts_with("rs") {
                d.dbsnp_ids.push(id.to_string());
            }
        }
    }

    d
}
