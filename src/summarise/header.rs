//! Construction of the output VCF header.

use noodles_vcf as vcf;
use vcf::header::record::value::{
    map::{
        info::{Number, Type},
        Info,
    },
    Map,
};

use super::config::Config;
use crate::{
    predictions::{algorithm_tag, EFFECT_PREDICTIONS},
    refs::{
        infotags::{InfoTag, InfoTagNumber, InfoTagType},
        InfoTagTable, PredictionAlgorithmTable,
    },
};

/// Definitions of tags written by the worker itself, used when the INFO
/// tag table does not declare them.
const SUMMARY_TAGS: &[(&str, Number, Type, &str)] = &[
    (
        "VEP_ALL_CSQ",
        Number::Unknown,
        Type::String,
        "All transcript consequences (Consequence:SYMBOL:ENTREZGENE:HGVSc:HGVSp:Feature_type:Feature:BIOTYPE)",
    ),
    (
        EFFECT_PREDICTIONS,
        Number::Count(1),
        Type::String,
        "Merged dbNSFP predictions of the principal protein change (algorithm:values, &-separated)",
    ),
    (
        "MUTATION_HOTSPOT",
        Number::Count(1),
        Type::String,
        "Known cancer mutation hotspot (exonic|splice, gene, entrez id, codon, alteration, q-value)",
    ),
    (
        "MUTATION_HOTSPOT_CANCERTYPE",
        Number::Unknown,
        Type::String,
        "Cancer types the hotspot was observed in",
    ),
    (
        "MUTATION_HOTSPOT_MATCH",
        Number::Count(1),
        Type::String,
        "How the hotspot was matched (by_hgvsp, by_hgvsc or by_codon, on the principal transcript or not)",
    ),
    (
        "MUTATION_HOTSPOT_SAMPLES",
        Number::Count(1),
        Type::Integer,
        "Number of tumor samples with the hotspot mutation",
    ),
];

const REGULATORY_TAGS: &[(&str, Number, Type, &str)] = &[(
    "REGULATORY_ANNOTATION",
    Number::Unknown,
    Type::String,
    "Regulatory and motif feature consequences (Consequence|Feature_type|Feature|BIOTYPE|MOTIF_NAME|MOTIF_POS|HIGH_INF_POS|MOTIF_SCORE_CHANGE|TRANSCRIPTION_FACTORS)",
)];

const ONCOGENICITY_TAGS: &[(&str, Number, Type, &str)] = &[
    (
        "ONCOGENICITY",
        Number::Count(1),
        Type::String,
        "Oncogenicity (Oncogenic, Likely_Oncogenic, VUS, Likely_Benign, Benign)",
    ),
    (
        "ONCOGENICITY_SCORE",
        Number::Count(1),
        Type::Integer,
        "Sum of the oncogenicity evidence points",
    ),
    (
        "ONCOGENICITY_CODE",
        Number::Count(1),
        Type::String,
        "Oncogenicity evidence codes, |-separated",
    ),
];

/// Key of the header line echoing the VEP pick criteria.
pub const PICK_ORDER_KEY: &str = "onco_csq_worker_pick_order";
/// Key of the header line with the worker version.
pub const VERSION_KEY: &str = "onco_csq_worker_version";

fn number(number: InfoTagNumber) -> Number {
    match number {
        InfoTagNumber::Count(n) => Number::Count(n),
        InfoTagNumber::AlternateBases => Number::AlternateBases,
        InfoTagNumber::ReferenceAlternateBases => Number::ReferenceAlternateBases,
        InfoTagNumber::Samples => Number::Samples,
        InfoTagNumber::Unknown => Number::Unknown,
    }
}

fn ty(kind: InfoTagType) -> Type {
    match kind {
        InfoTagType::Integer => Type::Integer,
        InfoTagType::Float => Type::Float,
        InfoTagType::Flag => Type::Flag,
        InfoTagType::Character => Type::Character,
        InfoTagType::String => Type::String,
    }
}

/// INFO definition for one row of the tag table.
pub fn info_definition(tag: &InfoTag) -> Map<Info> {
    Map::<Info>::new(number(tag.number), ty(tag.kind), tag.description.clone())
}

/// Whether a tag of the table goes to the output.
pub fn is_output_tag(tag: &str, config: &Config) -> bool {
    config.lof_prediction || !tag.starts_with("LoF")
}

/// Generate the output header from the input header.
///
/// Input definitions are kept; table rows and the worker's own tags are
/// added where the input does not define them yet.
pub fn build_output_header(
    input_header: &vcf::Header,
    infotags: &InfoTagTable,
    algorithms: Option<&PredictionAlgorithmTable>,
    config: &Config,
    worker_version: &str,
) -> Result<vcf::Header, anyhow::Error> {
    let mut header = input_header.clone();

    for tag in infotags.iter().filter(|t| is_output_tag(&t.tag, config)) {
        header
            .infos_mut()
            .entry(tag.tag.clone())
            .or_insert_with(|| info_definition(tag));
    }

    let mut builtin = SUMMARY_TAGS.to_vec();
    if config.regulatory {
        builtin.extend_from_slice(REGULATORY_TAGS);
    }
    if config.oncogenicity {
        builtin.extend_from_slice(ONCOGENICITY_TAGS);
    }
    for (key, number, ty, description) in builtin {
        header
            .infos_mut()
            .entry(key.to_string())
            .or_insert_with(|| Map::<Info>::new(number, ty, description));
    }

    if let Some(algorithms) = algorithms {
        for name in algorithms.names() {
            header
                .infos_mut()
                .entry(algorithm_tag(name))
                .or_insert_with(|| {
                    Map::<Info>::new(
                        Number::Count(1),
                        Type::String,
                        format!("dbNSFP {} prediction of the principal protein change", name),
                    )
                });
        }
    }

    header.insert(
        PICK_ORDER_KEY
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid header key: {}", e))?,
        vcf::header::record::Value::from(config.pick_order.join(",").as_str()),
    )?;
    header.insert(
        VERSION_KEY
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid header key: {}", e))?,
        vcf::header::record::Value::from(worker_version),
    )?;

    Ok(header)
}
