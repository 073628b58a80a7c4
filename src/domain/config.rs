//! Run configuration

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        overrides::OverrideMap,
        region::{MalformedReference, region_id_from_reference},
    },
    storage::VOLUME_EXTENSION,
};

/// Configuration for a compositing run.
///
/// A run loads the hierarchy and annotation once and then executes every
/// rule in order. Each rule merges the default output of one pipeline step
/// with the per-region overrides supplied for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct MergeConfig {
    /// Path of the region hierarchy JSON file.
    pub hierarchy: PathBuf,

    /// Path of the annotation volume.
    pub annotation: PathBuf,

    /// Extension of the dataset files to merge, without the leading dot.
    pub extension: String,

    /// The merge jobs, executed in order.
    pub rules: Vec<Rule>,
}

/// A single merge job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Name of the rule, unique within a configuration.
    pub name: String,

    /// The default dataset file, or a directory of dataset files.
    pub default_output: PathBuf,

    /// Where merged datasets are written.
    ///
    /// Defaults to `<name>/merged`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Region overrides, applied in order.
    #[serde(default)]
    pub overrides: Vec<RegionOverride>,
}

/// A region reference and the directory of volumes replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOverride {
    /// Region reference whose last path segment is the region id.
    pub region: String,

    /// Directory holding the replacement volumes.
    pub dir: PathBuf,
}

impl Rule {
    /// Builds the ordered override map of this rule.
    ///
    /// # Errors
    ///
    /// Returns an error if a region reference does not end in a region id.
    pub fn override_map(&self) -> Result<OverrideMap, MalformedReference> {
        self.overrides
            .iter()
            .map(|entry| {
                region_id_from_reference(&entry.region).map(|region| (region, entry.dir.clone()))
            })
            .collect()
    }

    /// The directory merged datasets are written to.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| Path::new(&self.name).join("merged"))
    }

    fn resolve_paths(&mut self, base: &Path) {
        self.output_dir = Some(base.join(self.output_dir()));
        self.default_output = base.join(&self.default_output);
        for entry in &mut self.overrides {
            entry.dir = base.join(&entry.dir);
        }
    }
}

/// Errors that can occur when loading a [`MergeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration file is not valid YAML.
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration defines no rules.
    #[error("the config file defines no rules")]
    NoRules,

    /// Two rules share a name.
    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),

    /// A rule refers to a region that cannot be resolved to an id.
    #[error("rule '{rule}': {source}")]
    Region {
        /// Name of the rule.
        rule: String,
        /// The parse failure.
        source: MalformedReference,
    },
}

impl MergeConfig {
    /// Loads the configuration from a TOML or YAML file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, anything else as
    /// TOML. Relative paths in the configuration are resolved against the
    /// directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, defines no
    /// rules, repeats a rule name, or contains a malformed region reference.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .is_some_and(|extension| extension == "yaml" || extension == "yml");
        let mut config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.validate()?;
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new("")));
        Ok(config)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.rules.is_empty() {
            return Err(LoadError::NoRules);
        }

        let mut names = HashSet::new();
        for rule in &self.rules {
            if !names.insert(rule.name.as_str()) {
                return Err(LoadError::DuplicateRule(rule.name.clone()));
            }
            rule.override_map().map_err(|source| LoadError::Region {
                rule: rule.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        self.hierarchy = base.join(&self.hierarchy);
        self.annotation = base.join(&self.annotation);
        for rule in &mut self.rules {
            rule.resolve_paths(base);
        }
    }
}

fn default_extension() -> String {
    VOLUME_EXTENSION.to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        hierarchy: PathBuf,

        annotation: PathBuf,

        #[serde(default = "default_extension")]
        extension: String,

        #[serde(default)]
        rules: Vec<Rule>,
    },
}

impl From<Versions> for MergeConfig {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                hierarchy,
                annotation,
                extension,
                rules,
            } => Self {
                hierarchy,
                annotation,
                extension,
                rules,
            },
        }
    }
}

impl From<MergeConfig> for Versions {
    fn from(config: MergeConfig) -> Self {
        Self::V1 {
            hierarchy: config.hierarchy,
            annotation: config.annotation,
            extension: config.extension,
            rules: config.rules,
        }
    }
}
