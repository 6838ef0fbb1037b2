//! Positional schema of the consequence INFO field.

use std::borrow::Cow;

use indexmap::IndexMap;
use noodles_vcf as vcf;

lazy_static::lazy_static! {
    static ref GNOMAD_AF: regex::Regex = regex::Regex::new(r"^gnomAD[eg]?_(([A-Z]+)_)?AF$").unwrap();
    static ref KG_POP_AF: regex::Regex = regex::Regex::new(r"^(AFR|AMR|SAS|EUR|EAS)_AF$").unwrap();
}

/// Subfields that must be part of the schema.
pub const REQUIRED_FIELDS: &[&str] = &["Consequence", "Feature"];

/// Error type for deriving the consequence field schema.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("no INFO/{0} definition in VCF header")]
    MissingDefinition(String),
    #[error("description of INFO/{0} lacks a `Format: ` schema")]
    MissingSchema(String),
    #[error("schema of INFO/{key} lacks required subfield {field:?}")]
    MissingField { key: String, field: String },
}

/// Rename allele frequency subfields to their output names.
///
/// `gnomAD_AF` becomes `GLOBAL_AF_GNOMAD`, `gnomAD_NFE_AF` becomes
/// `NFE_AF_GNOMAD`, `AF` becomes `GLOBAL_AF_1KG`, and `EUR_AF` becomes
/// `EUR_AF_1KG`.  Other names are returned unchanged.
pub fn rename_af_field(name: &str) -> Cow<'_, str> {
    if let Some(captures) = GNOMAD_AF.captures(name) {
        match captures.get(2) {
            Some(pop) => Cow::Owned(format!("{}_AF_GNOMAD", pop.as_str())),
            None => Cow::Borrowed("GLOBAL_AF_GNOMAD"),
        }
    } else if name == "AF" {
        Cow::Borrowed("GLOBAL_AF_1KG")
    } else if KG_POP_AF.is_match(name) {
        Cow::Owned(format!("{}_1KG", name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Map from subfield index to (renamed) subfield name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsqFieldMap {
    names: Vec<String>,
}

impl CsqFieldMap {
    /// Derive from a `... Format: a|b|c` description.
    pub fn from_description(description: &str) -> Option<Self> {
        let (_, format) = description.split_once("Format: ")?;
        let names = format
            .split('|')
            .map(|name| rename_af_field(name.trim_matches('"').trim()).into_owned())
            .collect();
        Some(Self { names })
    }

    /// Derive from the INFO definition `key` in `header`.
    pub fn from_header(header: &vcf::Header, key: &str) -> Result<Self, Error> {
        let definition = header
            .infos()
            .get(key)
            .ok_or_else(|| Error::MissingDefinition(key.to_string()))?;
        let result = Self::from_description(definition.description())
            .ok_or_else(|| Error::MissingSchema(key.to_string()))?;
        for field in REQUIRED_FIELDS {
            if result.index_of(field).is_none() {
                return Err(Error::MissingField {
                    key: key.to_string(),
                    field: field.to_string(),
                });
            }
        }
        Ok(result)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Split one transcript block into named subfields.
    ///
    /// Empty subfields and subfields beyond the schema are dropped.
    pub fn decode(&self, block: &str) -> IndexMap<String, String> {
        self.names
            .iter()
            .zip(block.split('|'))
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{rename_af_field, CsqFieldMap, Error};
    use crate::record::test::read_vcf;

    #[rstest::rstest]
    #[case("gnomAD_AF", "GLOBAL_AF_GNOMAD")]
    #[case("gnomAD_NFE_AF", "NFE_AF_GNOMAD")]
    #[case("gnomADe_AF", "GLOBAL_AF_GNOMAD")]
    #[case("gnomADe_AFR_AF", "AFR_AF_GNOMAD")]
    #[case("AF", "GLOBAL_AF_1KG")]
    #[case("EUR_AF", "EUR_AF_1KG")]
    #[case("MAX_AF", "MAX_AF")]
    #[case("SYMBOL", "SYMBOL")]
    fn rename(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(rename_af_field(name), expected);
    }

    #[test]
    fn from_description() {
        let fields = CsqFieldMap::from_description(
            "Consequence annotations from Ensembl VEP. Format: Allele|Consequence|SYMBOL|gnomAD_AF|PICK\"",
        )
        .unwrap();

        assert_eq!(
            fields.names(),
            &["Allele", "Consequence", "SYMBOL", "GLOBAL_AF_GNOMAD", "PICK"]
        );
        assert_eq!(fields.index_of("PICK"), Some(4));
        assert_eq!(fields.index_of("gnomAD_AF"), None);
    }

    #[test]
    fn decode() {
        let fields = CsqFieldMap::from_description("Format: Allele|Consequence|SYMBOL|PICK").unwrap();

        let decoded = fields.decode("T|missense_variant||1|extra");

        assert_eq!(
            decoded.into_iter().collect::<Vec<_>>(),
            vec![
                ("Allele".to_string(), "T".to_string()),
                ("Consequence".into(), "missense_variant".into()),
                ("PICK".into(), "1".into()),
            ]
        );
    }

    #[test]
    fn from_header_errors() {
        let (header, _) = read_vcf(
            "##fileformat=VCFv4.3\n\
             ##INFO=<ID=CSQ,Number=.,Type=String,Description=\"Consequences\">\n\
             ##INFO=<ID=ALT_CSQ,Number=.,Type=String,Description=\"Format: Allele|SYMBOL\">\n\
             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n",
        );

        assert_eq!(
            CsqFieldMap::from_header(&header, "CSQ"),
            Err(Error::MissingSchema("CSQ".into()))
        );
        assert_eq!(
            CsqFieldMap::from_header(&header, "ANN"),
            Err(Error::MissingDefinition("ANN".into()))
        );
        assert_eq!(
            CsqFieldMap::from_header(&header, "ALT_CSQ"),
            Err(Error::MissingField {
                key: "ALT_CSQ".into(),
                field: "Consequence".into()
            })
        );
    }
}
