//! Run configuration from an optional TOML file and the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Args;
use crate::oncogenicity::{Thresholds, ANY_TUMOR_TYPE};

/// Default INFO field carrying per-record transcript xrefs.
pub const DEFAULT_XREF_TAG: &str = "GVANNO_XREF";

/// Default VEP pick criteria, only recorded in the output header.
pub const DEFAULT_PICK_ORDER: &[&str] = &[
    "mane_select",
    "mane_plus_clinical",
    "canonical",
    "appris",
    "tsl",
    "biotype",
    "ccds",
    "rank",
    "length",
];

/// Settings of one `csq summarise` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Collect regulatory and motif feature consequences.
    pub regulatory: bool,
    /// Classify the oncogenicity of each variant.
    pub oncogenicity: bool,
    /// Keep `LoF*` fields of the principal consequence.
    pub lof_prediction: bool,
    /// Tumor type hotspot evidence must have been observed in.
    pub tumor_type: String,
    /// INFO field with per-record transcript xrefs.
    pub xref_tag: String,
    pub pick_order: Vec<String>,
    /// Allele frequency cut-offs of the classifier.
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regulatory: false,
            oncogenicity: false,
            lof_prediction: false,
            tumor_type: ANY_TUMOR_TYPE.to_string(),
            xref_tag: DEFAULT_XREF_TAG.to_string(),
            pick_order: DEFAULT_PICK_ORDER.iter().map(|s| s.to_string()).collect(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("could not read config file {:?}: {}", path, e))?;
        toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("problem parsing config file {:?}: {}", path, e))
    }

    /// Build from the command line, reading `--path-config` first.
    ///
    /// Switches given on the command line turn features on; values given on
    /// the command line replace the file's.
    pub fn from_args(args: &Args) -> Result<Self, anyhow::Error> {
        let mut config = match &args.path_config {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };

        config.regulatory |= args.regulatory;
        config.oncogenicity |= args.oncogenicity;
        config.lof_prediction |= args.lof_prediction;
        if let Some(tumor_type) = &args.tumor_type {
            config.tumor_type = tumor_type.clone();
        }
        if let Some(xref_tag) = &args.xref_tag {
            config.xref_tag = xref_tag.clone();
        }
        if let Some(pick_order) = &args.pick_order {
            config.pick_order = pick_order.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Config;
    use crate::summarise::test::args;

    #[test]
    fn defaults() -> Result<(), anyhow::Error> {
        let config = Config::from_args(&args("tests/data/summarise/scenarios.vcf", "out.vcf"))?;

        assert_eq!(config, Config::default());
        assert_eq!(config.tumor_type, "Any");
        assert_eq!(config.xref_tag, "GVANNO_XREF");
        assert_eq!(config.pick_order.len(), 9);

        Ok(())
    }

    #[test]
    fn file_then_command_line() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("config.toml");
        std::fs::write(
            &path,
            "regulatory = true\n\
             tumor_type = \"Lung\"\n\
             pick_order = [\"canonical\", \"rank\"]\n\
             \n\
             [thresholds]\n\
             common_af = 0.1\n",
        )?;

        let mut args = args("tests/data/summarise/scenarios.vcf", "out.vcf");
        args.path_config = Some(path.to_str().expect("invalid path").into());
        args.oncogenicity = true;
        args.tumor_type = Some("Breast".into());

        let config = Config::from_args(&args)?;

        assert!(config.regulatory);
        assert!(config.oncogenicity);
        assert!(!config.lof_prediction);
        assert_eq!(config.tumor_type, "Breast");
        assert_eq!(config.pick_order, vec!["canonical", "rank"]);
        assert_eq!(config.thresholds.common_af, 0.1);
        assert_eq!(config.thresholds.rare_af, 0.0001);

        Ok(())
    }

    #[test]
    fn bad_file() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("config.toml");
        std::fs::write(&path, "regulatory = \"maybe\"\n")?;

        assert!(Config::load(&path).is_err());

        Ok(())
    }
}
