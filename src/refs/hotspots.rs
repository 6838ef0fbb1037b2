//! Registry of known cancer mutation hotspots.

use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use super::{open_table, ReferenceLoadError};
use crate::common::non_missing;

/// One row of the hotspot table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HotspotEntry {
    /// Entrez gene id.
    #[serde(rename = "entrezgene")]
    pub entrez_gene: String,
    /// Protein change in single-letter notation, e.g., `p.G12V`.
    #[serde(rename = "hgvsp2")]
    pub hgvsp: String,
    /// Codon, e.g., `p.G12`.
    pub codon: String,
    /// Splice-site change without the alternate base, or `.`.
    pub hgvsc: String,
    /// Hotspot descriptor, pipe-separated.
    #[serde(rename = "MUTATION_HOTSPOT2")]
    pub label: String,
    /// Cancer types the hotspot has been observed in.
    #[serde(rename = "MUTATION_HOTSPOT_CANCERTYPE")]
    pub cancer_types: String,
    /// Number of samples supporting the hotspot, if given.
    #[serde(
        rename = "MUTATION_HOTSPOT_SAMPLES",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub samples: Option<u32>,
}

impl HotspotEntry {
    /// Whether the hotspot was observed in the given tumor type.
    ///
    /// Matching is case-insensitive on the cancer type list.
    pub fn observed_in(&self, tumor_type: &str) -> bool {
        self.cancer_types
            .to_lowercase()
            .contains(&tumor_type.to_lowercase())
    }
}

/// Hotspots keyed by `<entrez>-<change>` for protein, codon, and splice changes.
#[derive(Debug, Clone, Default)]
pub struct HotspotRegistry {
    mutation: HashMap<String, HotspotEntry>,
    codon: HashMap<String, HotspotEntry>,
    splice: HashMap<String, HotspotEntry>,
    num_rows: usize,
}

impl HotspotRegistry {
    /// Load the hotspot table.
    ///
    /// When two rows produce the same key, the first one is kept.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let mut reader = open_table(
            path,
            &[
                "entrezgene",
                "hgvsp2",
                "codon",
                "hgvsc",
                "MUTATION_HOTSPOT2",
                "MUTATION_HOTSPOT_CANCERTYPE",
            ],
        )?;

        let mut result = Self::default();
        for row in reader.deserialize() {
            let entry: HotspotEntry = row.map_err(|source| ReferenceLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            result.insert(entry);
        }

        Ok(result)
    }

    /// Add one entry to the maps it belongs to.
    pub fn insert(&mut self, entry: HotspotEntry) {
        self.num_rows += 1;
        self.mutation
            .entry(format!("{}-{}", &entry.entrez_gene, &entry.hgvsp))
            .or_insert_with(|| entry.clone());
        self.codon
            .entry(format!("{}-{}", &entry.entrez_gene, &entry.codon))
            .or_insert_with(|| entry.clone());
        if let Some(hgvsc) = non_missing(&entry.hgvsc) {
            let key = format!("{}-{}", &entry.entrez_gene, hgvsc);
            self.splice.entry(key).or_insert(entry);
        }
    }

    pub fn by_mutation(&self, key: &str) -> Option<&HotspotEntry> {
        self.mutation.get(key)
    }

    pub fn by_codon(&self, key: &str) -> Option<&HotspotEntry> {
        self.codon.get(key)
    }

    pub fn by_splice(&self, key: &str) -> Option<&HotspotEntry> {
        self.splice.get(key)
    }

    /// Number of rows loaded.
    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::HotspotRegistry;

    #[test]
    fn load() -> Result<(), anyhow::Error> {
        let registry = HotspotRegistry::load(Path::new("tests/refs/cancer_hotspots.tsv"))?;

        let kras = registry.by_mutation("3845-p.G12V").unwrap();
        assert_eq!(kras.label, "KRAS|3845|G12|V|0.0e+00");
        assert_eq!(kras.samples, Some(2175));
        assert!(kras.observed_in("Colon/Rectum"));
        assert!(!kras.observed_in("Breast"));

        assert!(registry.by_codon("3845-p.G12").is_some());
        assert!(registry.by_mutation("3845-p.G13D").is_none());

        let met = registry.by_splice("4233-c.3082+1G").unwrap();
        assert_eq!(met.samples, None);
        assert!(registry.by_splice("3845-.").is_none());

        Ok(())
    }

    #[test]
    fn duplicate_key_keeps_first() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("hotspots.tsv");
        std::fs::write(
            &path,
            "entrezgene\thgvsp2\tcodon\thgvsc\tMUTATION_HOTSPOT2\tMUTATION_HOTSPOT_CANCERTYPE\n\
             3845\tp.G12V\tp.G12\t.\tfirst\tLung\n\
             3845\tp.G12V\tp.G12\t.\tsecond\tColon\n",
        )?;

        let registry = HotspotRegistry::load(&path)?;
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.by_mutation("3845-p.G12V").unwrap().label, "first");
        assert_eq!(registry.by_codon("3845-p.G12").unwrap().label, "first");

        Ok(())
    }
}
