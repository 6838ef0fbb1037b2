//! Internal representation of one variant record and its annotation
//! side-channel.

use indexmap::IndexMap;
use noodles_vcf as vcf;
use vcf::{
    header::record::value::map::info::{Number, Type},
    variant::record_buf::info::field::{value::Array, Value},
};

use crate::common::is_truthy;

/// Trait for attempting conversion from VCF record.
pub trait TryFromVcf: Sized {
    /// Error type to use.
    type Error;

    /// Convert from VCF record.
    ///
    /// # Arguments
    ///
    /// * `record` - VCF record.
    /// * `header` - VCF header.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be converted.
    fn try_from_vcf(record: &vcf::variant::RecordBuf, header: &vcf::Header)
        -> Result<Self, Self::Error>;
}

/// Supporting code for `VariantRecord`.
pub(crate) mod variant_record {
    /// Error type for `TryFromVcf` implementation.
    #[derive(thiserror::Error, Debug, Clone)]
    pub enum Error {
        #[error("Missing POS value")]
        MissingVariantStart,
        #[error("Missing ALT values")]
        MissingAlternateBases,
    }
}

/// One variant with its input INFO values and the annotations derived for it.
///
/// Identity is `(chrom, pos, reference, alternative)`.  The `annotations` map
/// is filled by the summarisation steps and then written back to the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantRecord {
    /// Chromosome name as in the input.
    pub chrom: String,
    /// 1-based position.
    pub pos: usize,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele(s), comma-separated.
    pub alternative: String,
    /// Whether FILTER is `PASS` or missing.
    pub filter_pass: bool,
    /// INFO values from the input, rendered as text.
    pub info: IndexMap<String, String>,
    /// Derived annotations; flags are stored as `"1"`.
    pub annotations: IndexMap<String, String>,
}

impl VariantRecord {
    /// Identifier used in log messages, e.g., `g.17:7675088C>T`.
    pub fn variant_id(&self) -> String {
        format!(
            "g.{}:{}{}>{}",
            &self.chrom, self.pos, &self.reference, &self.alternative
        )
    }

    /// Input INFO value, if present.
    pub fn info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// Derived annotation, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Set a derived annotation, replacing any previous value.
    pub fn annotate<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.annotations.insert(key.into(), value.into());
    }

    /// Write the derived annotations to the INFO column of `record`.
    ///
    /// Values are typed according to the INFO definitions of `header`; keys
    /// without a definition are skipped, as are values that do not parse as
    /// the declared type.  Flags are only set for truthy values.
    pub fn write_annotations(&self, record: &mut vcf::variant::RecordBuf, header: &vcf::Header) {
        for (key, value) in &self.annotations {
            let Some(definition) = header.infos().get(key.as_str()) else {
                tracing::trace!("no header definition for {}, skipping", key);
                continue;
            };

            let typed = match definition.ty() {
                Type::Flag => {
                    if is_truthy(value) {
                        Some(Value::Flag)
                    } else {
                        continue;
                    }
                }
                Type::Integer => match value.parse::<i32>() {
                    Ok(v) => Some(Value::Integer(v)),
                    Err(_) => {
                        tracing::debug!("{}: {}={:?} is not an integer", self.variant_id(), key, value);
                        continue;
                    }
                },
                Type::Float => match value.parse::<f32>() {
                    Ok(v) => Some(Value::Float(v)),
                    Err(_) => {
                        tracing::debug!("{}: {}={:?} is not a float", self.variant_id(), key, value);
                        continue;
                    }
                },
                Type::Character => value.chars().next().map(Value::Character),
                Type::String => match definition.number() {
                    Number::Count(1) => Some(Value::String(value.clone())),
                    _ => Some(Value::Array(Array::String(
                        value.split(',').map(|s| Some(s.to_string())).collect(),
                    ))),
                },
            };

            record.info_mut().insert(key.clone(), typed);
        }
    }
}

/// Render an INFO value as text, joining arrays with `,` and using `.` for
/// missing array elements.
pub fn value_to_string(value: &Value) -> String {
    fn join<T, F>(values: &[Option<T>], f: F) -> String
    where
        F: Fn(&T) -> String,
    {
        values
            .iter()
            .map(|v| v.as_ref().map(&f).unwrap_or_else(|| String::from(".")))
            .collect::<Vec<_>>()
            .join(",")
    }

    match value {
        Value::Integer(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Flag => String::from("1"),
        Value::Character(c) => c.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(Array::Integer(values)) => join(values, |v| v.to_string()),
        Value::Array(Array::Float(values)) => join(values, |v| v.to_string()),
        Value::Array(Array::Character(values)) => join(values, |c| c.to_string()),
        Value::Array(Array::String(values)) => join(values, |s| s.clone()),
    }
}

impl TryFromVcf for VariantRecord {
    type Error = variant_record::Error;

    fn try_from_vcf(
        record: &vcf::variant::RecordBuf,
        header: &vcf::Header,
    ) -> Result<Self, Self::Error> {
        let chrom = record.reference_sequence_name().to_string();
        let pos = usize::from(
            record
                .variant_start()
                .ok_or(Self::Error::MissingVariantStart)?,
        );
        let reference = record.reference_bases().to_string();
        let alternate_bases = record.alternate_bases().as_ref();
        if alternate_bases.is_empty() {
            return Err(Self::Error::MissingAlternateBases);
        }
        let alternative = alternate_bases.join(",");
        let filter_pass = record
            .filters()
            .as_ref()
            .iter()
            .all(|filter| filter == "PASS");

        let mut info = IndexMap::new();
        for key in header.infos().keys() {
            if let Some(value) = record.info().get(key.as_str()) {
                let text = value
                    .map(value_to_string)
                    .unwrap_or_else(|| String::from("."));
                info.insert(key.to_string(), text);
            }
        }

        Ok(Self {
            chrom,
            pos,
            reference,
            alternative,
            filter_pass,
            info,
            annotations: Default::default(),
        })
    }
}
