//! Run configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `ATTRENC_*` environment variables. The launcher applies its flags last.

use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{PipelineError, Result};
use crate::learner::TrainingParams;

/// Fraction of records kept for training
pub const DEFAULT_SPLIT_RATIO: f64 = 0.9;

/// How a single column is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Categorical,
    Continuous,
}

/// Attribute-type configuration for a dataset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AttributeTypes {
    /// Every column is categorical
    #[default]
    AllCategorical,
    /// Listed columns are continuous, every other column is categorical
    ContinuousSubset { continuous: Vec<usize> },
    /// Explicit partition of column indices; must cover every column exactly once
    Explicit {
        continuous: Vec<usize>,
        categorical: Vec<usize>,
    },
}

impl AttributeTypes {
    /// Resolve the kind of every column of a table with `column_count` columns.
    ///
    /// Fails if an index is out of range, assigned twice, left unassigned, or if
    /// the target (last) column is not categorical.
    pub fn resolve(&self, column_count: usize) -> Result<Vec<AttributeKind>> {
        if column_count == 0 {
            return Err(PipelineError::InvalidConfig(
                "dataset has no columns".to_string(),
            ));
        }

        let kinds = match self {
            AttributeTypes::AllCategorical => vec![AttributeKind::Categorical; column_count],
            AttributeTypes::ContinuousSubset { continuous } => {
                let mut kinds: Vec<Option<AttributeKind>> = vec![None; column_count];
                assign(&mut kinds, continuous, AttributeKind::Continuous)?;
                kinds
                    .into_iter()
                    .map(|kind| kind.unwrap_or(AttributeKind::Categorical))
                    .collect()
            }
            AttributeTypes::Explicit {
                continuous,
                categorical,
            } => {
                let mut kinds: Vec<Option<AttributeKind>> = vec![None; column_count];
                assign(&mut kinds, continuous, AttributeKind::Continuous)?;
                assign(&mut kinds, categorical, AttributeKind::Categorical)?;

                kinds
                    .into_iter()
                    .enumerate()
                    .map(|(idx, kind)| {
                        kind.ok_or_else(|| {
                            PipelineError::InvalidConfig(format!(
                                "column {} has no attribute type",
                                idx
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        };

        if kinds[column_count - 1] != AttributeKind::Categorical {
            return Err(PipelineError::InvalidConfig(format!(
                "target column {} must be categorical",
                column_count - 1
            )));
        }

        Ok(kinds)
    }
}

fn assign(
    kinds: &mut [Option<AttributeKind>],
    columns: &[usize],
    kind: AttributeKind,
) -> Result<()> {
    let column_count = kinds.len();
    for &idx in columns {
        let slot = kinds.get_mut(idx).ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "column {} is out of range for {} columns",
                idx, column_count
            ))
        })?;
        if slot.is_some() {
            return Err(PipelineError::InvalidConfig(format!(
                "column {} is assigned more than once",
                idx
            )));
        }
        *slot = Some(kind);
    }
    Ok(())
}

/// Which rows the attribute descriptors are derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceScope {
    /// Train and test rows together, before partitioning
    #[default]
    FullDataset,
    /// Training rows only; test rows are encoded against what training saw
    TrainOnly,
}

/// What the encoder does with a feature value absent from its class list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnseenCategoryPolicy {
    /// Fail with `UnknownCategory`
    #[default]
    Reject,
    /// Emit an all-zero block for the attribute
    ZeroVector,
}

/// Known datasets with their attribute layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemPreset {
    Heart,
    BreastCancer,
}

impl ProblemPreset {
    pub fn attribute_types(&self) -> AttributeTypes {
        match self {
            ProblemPreset::Heart => AttributeTypes::Explicit {
                continuous: vec![0, 3, 4, 7, 9, 11],
                categorical: vec![1, 2, 5, 6, 8, 10, 12, 13],
            },
            ProblemPreset::BreastCancer => AttributeTypes::AllCategorical,
        }
    }

    pub fn dataset_file(&self) -> PathBuf {
        match self {
            ProblemPreset::Heart => PathBuf::from("resources/heart.csv"),
            ProblemPreset::BreastCancer => PathBuf::from("resources/breast-cancer-wisconsin.csv"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProblemPreset::Heart => "heart",
            ProblemPreset::BreastCancer => "breast-cancer",
        }
    }
}

/// Complete parameter set for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Delimited-text dataset with a header row
    pub dataset_file: PathBuf,
    /// Column attribute types
    pub attribute_types: AttributeTypes,
    /// Training share of the shuffled dataset
    pub split_ratio: f64,
    /// Seed for the partitioner; `None` draws from OS entropy
    pub seed: Option<u64>,
    pub inference_scope: InferenceScope,
    pub unseen_category: UnseenCategoryPolicy,
    /// Echoed in the report
    pub problem_number: u32,
    /// Knobs handed to the learner
    pub params: TrainingParams,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset_file: ProblemPreset::Heart.dataset_file(),
            attribute_types: ProblemPreset::Heart.attribute_types(),
            split_ratio: DEFAULT_SPLIT_RATIO,
            seed: None,
            inference_scope: InferenceScope::default(),
            unseen_category: UnseenCategoryPolicy::default(),
            problem_number: 1,
            params: TrainingParams::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl RunConfig {
    /// Defaults for a known dataset
    pub fn for_preset(preset: ProblemPreset) -> Self {
        Self {
            dataset_file: preset.dataset_file(),
            attribute_types: preset.attribute_types(),
            ..Self::default()
        }
    }

    /// Layer an optional TOML file and `ATTRENC_*` environment variables over
    /// `base`.
    pub fn load(base: &RunConfig, path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(base)?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(PipelineError::InvalidConfig(format!(
                    "configuration file {} not found",
                    path.display()
                )));
            }
            info!("Loading configuration from: {}", path.display());
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("ATTRENC")
                .prefix_separator("_")
                .separator("__"),
        );

        let config: RunConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.split_ratio > 0.0 && self.split_ratio <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "split ratio {} must lie in (0, 1]",
                self.split_ratio
            )));
        }

        if self.dataset_file.as_os_str().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "dataset file path is empty".to_string(),
            ));
        }

        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(PipelineError::InvalidConfig(format!(
                "unknown log format {:?}",
                self.log_format
            )));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| {
            PipelineError::InvalidConfig(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_all_categorical_resolution() {
        let kinds = AttributeTypes::AllCategorical.resolve(3).unwrap();
        assert_eq!(kinds, vec![AttributeKind::Categorical; 3]);
    }

    #[test]
    fn test_heart_preset_covers_fourteen_columns() {
        let kinds = ProblemPreset::Heart.attribute_types().resolve(14).unwrap();
        assert_eq!(kinds[0], AttributeKind::Continuous);
        assert_eq!(kinds[1], AttributeKind::Categorical);
        assert_eq!(kinds[13], AttributeKind::Categorical);
        assert_eq!(
            kinds.iter().filter(|k| **k == AttributeKind::Continuous).count(),
            6
        );
    }

    #[test]
    fn test_explicit_rejects_gaps_and_duplicates() {
        let gap = AttributeTypes::Explicit {
            continuous: vec![0],
            categorical: vec![2],
        };
        assert!(matches!(gap.resolve(3), Err(PipelineError::InvalidConfig(_))));

        let dup = AttributeTypes::Explicit {
            continuous: vec![0, 1],
            categorical: vec![1, 2],
        };
        assert!(matches!(dup.resolve(3), Err(PipelineError::InvalidConfig(_))));

        let out_of_range = AttributeTypes::Explicit {
            continuous: vec![5],
            categorical: vec![0, 1, 2],
        };
        assert!(matches!(
            out_of_range.resolve(3),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_continuous_subset_defaults_to_categorical() {
        let types = AttributeTypes::ContinuousSubset {
            continuous: vec![0, 2],
        };
        assert_eq!(
            types.resolve(4).unwrap(),
            vec![
                AttributeKind::Continuous,
                AttributeKind::Categorical,
                AttributeKind::Continuous,
                AttributeKind::Categorical,
            ]
        );

        let repeated = AttributeTypes::ContinuousSubset {
            continuous: vec![1, 1],
        };
        assert!(matches!(repeated.resolve(3), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_continuous_target_rejected() {
        let types = AttributeTypes::Explicit {
            continuous: vec![1],
            categorical: vec![0],
        };
        assert!(matches!(types.resolve(2), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_split_ratio_validation() {
        let mut config = RunConfig::default();
        assert!(config.validate().is_ok());

        config.split_ratio = 0.0;
        assert!(config.validate().is_err());

        config.split_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("run.toml");

        let mut config = RunConfig::for_preset(ProblemPreset::BreastCancer);
        config.seed = Some(7);
        config.split_ratio = 0.8;
        config.save_to_file(&config_path).unwrap();

        let loaded = RunConfig::load(&RunConfig::default(), Some(&config_path)).unwrap();
        assert_eq!(loaded.attribute_types, AttributeTypes::AllCategorical);
        assert_eq!(loaded.seed, Some(7));
        assert_eq!(loaded.split_ratio, 0.8);
    }

    #[test]
    fn test_missing_config_file() {
        let missing = Path::new("/nonexistent/run.toml");
        let result = RunConfig::load(&RunConfig::default(), Some(missing));
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }
}
