//! INFO tag metadata: which annotations may be written to the output.

use std::{path::Path, str::FromStr};

use indexmap::IndexMap;
use serde::Deserialize;

use super::{open_table, ReferenceLoadError};

/// Value type of an INFO tag, as written to the output header.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum InfoTagType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

/// Declared number of values of an INFO tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTagNumber {
    /// Fixed count, e.g., `0` for flags or `1` for scalars.
    Count(usize),
    /// `A`
    AlternateBases,
    /// `R`
    ReferenceAlternateBases,
    /// `G`
    Samples,
    /// `.`
    Unknown,
}

impl FromStr for InfoTagNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "A" => InfoTagNumber::AlternateBases,
            "R" => InfoTagNumber::ReferenceAlternateBases,
            "G" => InfoTagNumber::Samples,
            "." => InfoTagNumber::Unknown,
            _ => InfoTagNumber::Count(s.parse()?),
        })
    }
}

/// One row of the metadata table.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoTag {
    pub tag: String,
    pub number: InfoTagNumber,
    pub kind: InfoTagType,
    pub description: String,
}

/// Raw row as found in the TSV file.
#[derive(Debug, Deserialize)]
struct InfoTagRow {
    tag: String,
    number: String,
    #[serde(rename = "type")]
    kind: String,
    description: String,
}

/// Ordered table of known output INFO tags.
#[derive(Debug, Clone, Default)]
pub struct InfoTagTable {
    tags: IndexMap<String, InfoTag>,
}

impl InfoTagTable {
    /// Load from TSV with columns `tag`, `number`, `type`, `description`.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let mut reader = open_table(path, &["tag", "number", "type", "description"])?;

        let mut tags = IndexMap::new();
        for row in reader.deserialize() {
            let row: InfoTagRow = row.map_err(|source| ReferenceLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            let number =
                row.number
                    .parse::<InfoTagNumber>()
                    .map_err(|_| ReferenceLoadError::InvalidValue {
                        path: path.to_path_buf(),
                        column: "number".into(),
                        value: row.number.clone(),
                    })?;
            let kind = row
                .kind
                .parse::<InfoTagType>()
                .map_err(|_| ReferenceLoadError::InvalidValue {
                    path: path.to_path_buf(),
                    column: "type".into(),
                    value: row.kind.clone(),
                })?;

            if tags.contains_key(&row.tag) {
                tracing::warn!("duplicate INFO tag {:?} in {:?}, keeping first", &row.tag, path);
                continue;
            }
            tags.insert(
                row.tag.clone(),
                InfoTag {
                    tag: row.tag,
                    number,
                    kind,
                    description: row.description,
                },
            );
        }

        Ok(Self { tags })
    }

    pub fn get(&self, tag: &str) -> Option<&InfoTag> {
        self.tags.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate in table order.
    pub fn iter(&self) -> impl Iterator<Item = &InfoTag> {
        self.tags.values()
    }
}
