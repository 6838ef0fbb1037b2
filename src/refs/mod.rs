//! Loaders for the static reference tables.
//!
//! All tables are tab-separated with a header line and are fully materialized
//! in memory before streaming starts.  Any problem here is fatal for the run.

use std::{
    io::BufRead,
    path::{Path, PathBuf},
    time::Instant,
};

use thousands::Separable;

use crate::common::open_read_maybe_gz;

pub mod algorithms;
pub mod hotspots;
pub mod infotags;
pub mod xref;

pub use algorithms::PredictionAlgorithmTable;
pub use hotspots::HotspotRegistry;
pub use infotags::InfoTagTable;
pub use xref::{TranscriptXrefMap, XrefLayout};

/// Error type for loading reference tables.
#[derive(thiserror::Error, Debug)]
pub enum ReferenceLoadError {
    #[error("could not open reference table {path:?}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("reference table {path:?} lacks required column {column:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("problem parsing reference table {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("duplicate key {key:?} in reference table {path:?}")]
    DuplicateKey { path: PathBuf, key: String },
    #[error("invalid value {value:?} in column {column:?} of {path:?}")]
    InvalidValue {
        path: PathBuf,
        column: String,
        value: String,
    },
}

/// Open a tab-separated reference table and check its header line.
///
/// Returns the reader positioned after the header.  Columns not listed in
/// `required` are allowed and ignored by the callers.
pub(crate) fn open_table(
    path: &Path,
    required: &[&str],
) -> Result<csv::Reader<Box<dyn BufRead>>, ReferenceLoadError> {
    let input = open_read_maybe_gz(path).map_err(|e| ReferenceLoadError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .flexible(false)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|source| ReferenceLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    for column in required {
        if !headers.iter().any(|name| name == *column) {
            return Err(ReferenceLoadError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    Ok(reader)
}

/// Paths to the reference tables of one run.
#[derive(Debug, Clone, Default)]
pub struct ReferencePaths {
    /// INFO tag metadata table.
    pub infotags: PathBuf,
    /// Gene/transcript cross-reference table.
    pub xref: PathBuf,
    /// Name to index map of the per-record xref INFO field.
    pub xref_namemap: PathBuf,
    /// Mutation hotspot table.
    pub hotspots: PathBuf,
    /// Optional list of prediction algorithms, overriding the VCF header.
    pub algorithms: Option<PathBuf>,
}

/// Bundle of all read-only reference structures.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub infotags: InfoTagTable,
    pub xref: TranscriptXrefMap,
    pub xref_layout: XrefLayout,
    pub hotspots: HotspotRegistry,
    pub algorithms: Option<PredictionAlgorithmTable>,
}

impl ReferenceData {
    /// Load all reference tables.
    #[tracing::instrument(skip_all)]
    pub fn load(paths: &ReferencePaths) -> Result<Self, ReferenceLoadError> {
        let before_loading = Instant::now();

        tracing::info!("loading INFO tag metadata from {:?}", &paths.infotags);
        let infotags = InfoTagTable::load(&paths.infotags)?;
        tracing::info!("loading transcript xrefs from {:?}", &paths.xref);
        let xref = TranscriptXrefMap::load(&paths.xref)?;
        tracing::info!("loading xref name map from {:?}", &paths.xref_namemap);
        let xref_layout = XrefLayout::load(&paths.xref_namemap)?;
        tracing::info!("loading mutation hotspots from {:?}", &paths.hotspots);
        let hotspots = HotspotRegistry::load(&paths.hotspots)?;
        let algorithms = paths
            .algorithms
            .as_ref()
            .map(|path| {
                tracing::info!("loading prediction algorithms from {:?}", path);
                PredictionAlgorithmTable::load(path)
            })
            .transpose()?;

        tracing::info!(
            "... done loading {} INFO tags, {} transcript xrefs, {} hotspots in {:?}",
            infotags.len().separate_with_commas(),
            xref.len().separate_with_commas(),
            hotspots.len().separate_with_commas(),
            before_loading.elapsed()
        );

        Ok(Self {
            infotags,
            xref,
            xref_layout,
            hotspots,
            algorithms,
        })
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::path::PathBuf;

    use super::{ReferenceData, ReferenceLoadError, ReferencePaths};

    pub(crate) fn test_paths() -> ReferencePaths {
        ReferencePaths {
            infotags: "tests/refs/infotags.tsv".into(),
            xref: "tests/refs/gene_transcript_xref.tsv".into(),
            xref_namemap: "tests/refs/xref_namemap.tsv".into(),
            hotspots: "tests/refs/cancer_hotspots.tsv".into(),
            algorithms: None,
        }
    }

    #[test]
    fn load_all() -> Result<(), anyhow::Error> {
        let data = ReferenceData::load(&test_paths())?;

        assert!(data.infotags.contains("SYMBOL"));
        assert!(data.xref.get("ENST00000269305").is_some());
        assert!(!data.hotspots.is_empty());
        assert!(data.algorithms.is_none());

        Ok(())
    }

    #[test]
    fn missing_file_is_fatal() {
        let paths = ReferencePaths {
            hotspots: PathBuf::from("tests/refs/no-such-file.tsv"),
            ..test_paths()
        };

        let err = ReferenceData::load(&paths).unwrap_err();
        assert!(matches!(err, ReferenceLoadError::Open { .. }), "{:?}", err);
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = match super::open_table(
            std::path::Path::new("tests/refs/xref_namemap.tsv"),
            &["name", "index", "position"],
        ) {
            Ok(_) => panic!("expected missing column error"),
            Err(err) => err,
        };

        assert!(
            matches!(&err, ReferenceLoadError::MissingColumn { column, .. } if column == "position"),
            "{:?}",
            err
        );
    }
}
