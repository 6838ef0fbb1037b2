//! Transcript to gene cross-references.
//!
//! There are two sources: the static gene/transcript table and an optional
//! per-record INFO field laid out according to the xref name map.  Both end up
//! in a `TranscriptXrefMap`.

use std::{collections::HashMap, path::Path};

use indexmap::IndexMap;
use serde::Deserialize;

use super::{open_table, ReferenceLoadError};

/// Column holding the transcript identifier.
pub const TRANSCRIPT_ID_COLUMN: &str = "ENSEMBL_TRANSCRIPT_ID";

/// Gene annotation attached to one transcript.
///
/// Holds all non-empty named columns except the transcript id itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneXref {
    pub annotations: IndexMap<String, String>,
}

impl GeneXref {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.annotations.get(name).map(String::as_str)
    }
}

/// Map from transcript id to gene annotation.
#[derive(Debug, Clone, Default)]
pub struct TranscriptXrefMap {
    entries: HashMap<String, GeneXref>,
}

impl TranscriptXrefMap {
    /// Load the static gene/transcript table.
    ///
    /// A transcript id occurring twice is an error.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let mut reader = open_table(path, &[TRANSCRIPT_ID_COLUMN])?;
        let headers = reader
            .headers()
            .map_err(|source| ReferenceLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        let id_idx = headers
            .iter()
            .position(|name| name == TRANSCRIPT_ID_COLUMN)
            .ok_or_else(|| ReferenceLoadError::MissingColumn {
                path: path.to_path_buf(),
                column: TRANSCRIPT_ID_COLUMN.into(),
            })?;

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|source| ReferenceLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            let transcript_id = record.get(id_idx).unwrap_or_default().to_string();

            let mut xref = GeneXref::default();
            for (idx, (name, value)) in headers.iter().zip(record.iter()).enumerate() {
                if idx != id_idx && !value.is_empty() {
                    xref.annotations.insert(name.to_string(), value.to_string());
                }
            }

            if entries.insert(transcript_id.clone(), xref).is_some() {
                return Err(ReferenceLoadError::DuplicateKey {
                    path: path.to_path_buf(),
                    key: transcript_id,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Decode the per-record xref INFO field.
    ///
    /// The field holds one comma-separated entry per transcript, each a
    /// pipe-separated list whose positions are given by `layout`.  Values
    /// beyond the end of an entry and empty values are skipped.
    pub fn from_info_field(value: &str, layout: &XrefLayout) -> Self {
        let id_idx = layout.index_of(TRANSCRIPT_ID_COLUMN).unwrap_or(0);

        let mut entries = HashMap::new();
        for entry in value.split(',') {
            let fields = entry.split('|').collect::<Vec<_>>();
            let Some(transcript_id) = fields.get(id_idx) else {
                continue;
            };

            let mut xref = GeneXref::default();
            for (name, idx) in layout.iter() {
                if idx == id_idx || name == TRANSCRIPT_ID_COLUMN {
                    continue;
                }
                if let Some(value) = fields.get(idx).filter(|v| !v.is_empty()) {
                    xref.annotations.insert(name.to_string(), value.to_string());
                }
            }
            entries.insert(transcript_id.to_string(), xref);
        }

        Self { entries }
    }

    pub fn get(&self, transcript_id: &str) -> Option<&GeneXref> {
        self.entries.get(transcript_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct NameMapRow {
    name: String,
    index: usize,
}

/// Positional layout of the per-record xref INFO field.
#[derive(Debug, Clone, Default)]
pub struct XrefLayout {
    indices: IndexMap<String, usize>,
}

impl XrefLayout {
    /// Load from TSV with columns `name` and `index`.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let mut reader = open_table(path, &["name", "index"])?;

        let mut indices = IndexMap::new();
        for row in reader.deserialize() {
            let row: NameMapRow = row.map_err(|source| ReferenceLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            if indices.contains_key(&row.name) {
                return Err(ReferenceLoadError::DuplicateKey {
                    path: path.to_path_buf(),
                    key: row.name,
                });
            }
            indices.insert(row.name, row.index);
        }

        Ok(Self { indices })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.indices.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::{TranscriptXrefMap, XrefLayout};
    use crate::refs::ReferenceLoadError;

    #[test]
    fn load_static_table() -> Result<(), anyhow::Error> {
        let xref = TranscriptXrefMap::load(Path::new("tests/refs/gene_transcript_xref.tsv"))?;

        let tp53 = xref.get("ENST00000269305").unwrap();
        assert_eq!(tp53.get("ENTREZGENE"), Some("7157"));
        assert_eq!(tp53.get("SYMBOL"), Some("TP53"));
        assert_eq!(tp53.get("TUMOR_SUPPRESSOR"), Some("TRUE"));

        let kras = xref.get("ENST00000256078").unwrap();
        assert_eq!(kras.get("ENTREZGENE"), Some("3845"));
        assert_eq!(kras.get("ONCOGENE"), Some("TRUE"));

        assert!(xref.get("ENST00000000000").is_none());

        Ok(())
    }

    #[test]
    fn duplicate_transcript_is_fatal() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("xref.tsv");
        std::fs::write(
            &path,
            "ENSEMBL_TRANSCRIPT_ID\tENTREZGENE\tSYMBOL\n\
             ENST00000269305\t7157\tTP53\n\
             ENST00000269305\t7157\tTP53\n",
        )?;

        let err = TranscriptXrefMap::load(&path).unwrap_err();
        assert!(
            matches!(&err, ReferenceLoadError::DuplicateKey { key, .. } if key == "ENST00000269305"),
            "{:?}",
            err
        );

        Ok(())
    }

    #[test]
    fn load_layout() -> Result<(), anyhow::Error> {
        let layout = XrefLayout::load(Path::new("tests/refs/xref_namemap.tsv"))?;

        assert_eq!(layout.index_of("ENSEMBL_TRANSCRIPT_ID"), Some(0));
        assert_eq!(layout.index_of("SYMBOL"), Some(3));
        assert_eq!(layout.index_of("ONCOGENE"), Some(12));
        assert_eq!(layout.index_of("NOT_THERE"), None);

        Ok(())
    }

    #[test]
    fn decode_info_field() -> Result<(), anyhow::Error> {
        let layout = XrefLayout::load(Path::new("tests/refs/xref_namemap.tsv"))?;
        let value = "ENST00000311936|ENSG00000133703|ENSP00000308495|KRAS|KRAS|3845|||||||TRUE,\
                     ENST00000556131|ENSG00000133703";

        let xref = TranscriptXrefMap::from_info_field(value, &layout);

        assert_eq!(xref.len(), 2);
        let kras = xref.get("ENST00000311936").unwrap();
        assert_eq!(kras.get("SYMBOL"), Some("KRAS"));
        assert_eq!(kras.get("ENTREZ_ID"), Some("3845"));
        assert_eq!(kras.get("ONCOGENE"), Some("TRUE"));
        assert_eq!(kras.get("TUMOR_SUPPRESSOR"), None);
        assert_eq!(kras.get("ENSEMBL_TRANSCRIPT_ID"), None);

        let short = xref.get("ENST00000556131").unwrap();
        assert_eq!(short.get("ENSEMBL_GENE_ID"), Some("ENSG00000133703"));
        assert_eq!(short.get("SYMBOL"), None);

        Ok(())
    }
}
