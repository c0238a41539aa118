//! Dataset configuration: field positions, free-price tokens, exclusions and
//! locale tolerance.
//!
//! Nothing about a dataset's layout is inferred. Each dataset supplies a
//! [`DatasetConfig`], either from a built-in preset or from YAML, and the
//! pipeline checks it against the header arity before touching any record.

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    cli::parse_delimiter, error::PipelineError, locale::DEFAULT_LOCALE_THRESHOLD,
    metric::MetricFormat,
};

/// Row in the Google Play export whose columns are shifted by one.
pub const GOOGLE_PLAY_CORRUPT_ROW: usize = 10472;

/// Positions of the semantic fields inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIndex {
    pub name: usize,
    pub category: usize,
    pub price: usize,
    pub metric: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, usize>,
}

impl FieldIndex {
    pub fn new(name: usize, category: usize, price: usize, metric: usize) -> Self {
        Self {
            name,
            category,
            price,
            metric,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, label: &str, position: usize) -> Self {
        self.extra.insert(label.to_string(), position);
        self
    }

    fn mapped(&self) -> impl Iterator<Item = (&str, usize)> {
        [
            ("name", self.name),
            ("category", self.category),
            ("price", self.price),
            ("metric", self.metric),
        ]
        .into_iter()
        .chain(self.extra.iter().map(|(label, idx)| (label.as_str(), *idx)))
    }

    /// Fails if any mapped field lies outside a record of `arity` fields.
    pub fn check_arity(&self, arity: usize) -> Result<(), PipelineError> {
        for (label, position) in self.mapped() {
            if position >= arity {
                return Err(PipelineError::config(format!(
                    "field '{label}' maps to position {position} but records have {arity} field(s)"
                )));
            }
        }
        Ok(())
    }

    /// Resolves a field reference: semantic name, extra label, header name,
    /// then numeric position.
    pub fn resolve(
        &self,
        reference: &str,
        header: &[String],
    ) -> Result<usize, PipelineError> {
        let trimmed = reference.trim();
        let position = match trimmed {
            "name" => Some(self.name),
            "category" => Some(self.category),
            "price" => Some(self.price),
            "metric" => Some(self.metric),
            other => self
                .extra
                .get(other)
                .copied()
                .or_else(|| header.iter().position(|h| h == other))
                .or_else(|| other.parse::<usize>().ok()),
        };
        match position {
            Some(idx) if idx < header.len() => Ok(idx),
            Some(idx) => Err(PipelineError::config(format!(
                "field '{trimmed}' resolves to position {idx} but records have {} field(s)",
                header.len()
            ))),
            None => Err(PipelineError::config(format!(
                "field '{trimmed}' is not mapped and matches no header"
            ))),
        }
    }
}

fn default_locale_threshold() -> usize {
    DEFAULT_LOCALE_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub fields: FieldIndex,
    /// Encoding of the metric field used to resolve duplicates.
    #[serde(default)]
    pub metric_format: MetricFormat,
    /// Exact price tokens that mean "free".
    pub free_values: Vec<String>,
    /// 0-based data-row indexes known to be corrupt.
    #[serde(default)]
    pub exclude_rows: Vec<usize>,
    #[serde(default = "default_locale_threshold")]
    pub locale_threshold: usize,
}

impl DatasetConfig {
    /// Google Play export (`googleplaystore.csv`, 13 columns).
    pub fn google_play() -> Self {
        Self {
            name: "google-play".to_string(),
            fields: FieldIndex::new(0, 1, 7, 3)
                .with_extra("rating", 2)
                .with_extra("installs", 5)
                .with_extra("genres", 9),
            metric_format: MetricFormat::Plain,
            free_values: vec!["0".to_string()],
            exclude_rows: vec![GOOGLE_PLAY_CORRUPT_ROW],
            locale_threshold: DEFAULT_LOCALE_THRESHOLD,
        }
    }

    /// Apple App Store export (`AppleStore.csv`, 16 columns).
    pub fn app_store() -> Self {
        Self {
            name: "app-store".to_string(),
            fields: FieldIndex::new(1, 11, 4, 5)
                .with_extra("id", 0)
                .with_extra("user_rating", 7),
            metric_format: MetricFormat::Plain,
            free_values: vec!["0.0".to_string()],
            exclude_rows: Vec::new(),
            locale_threshold: DEFAULT_LOCALE_THRESHOLD,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening dataset config {path:?}"))?;
        serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing dataset config {path:?}"))
    }

    /// Checks everything that can be checked before records are read.
    pub fn check(&self, arity: usize) -> Result<(), PipelineError> {
        self.fields.check_arity(arity)?;
        if self.free_values.is_empty() {
            return Err(PipelineError::config(format!(
                "dataset '{}' defines no free price values",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum Preset {
    GooglePlay,
    AppStore,
}

impl Preset {
    pub fn config(self) -> DatasetConfig {
        match self {
            Preset::GooglePlay => DatasetConfig::google_play(),
            Preset::AppStore => DatasetConfig::app_store(),
        }
    }
}

/// One group-average request in a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageQuery {
    #[serde(default = "default_group_field")]
    pub group: String,
    pub metric: String,
    #[serde(default)]
    pub format: Option<MetricFormat>,
}

fn default_group_field() -> String {
    "category".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub input: PathBuf,
    /// Field delimiter; inferred from the file extension when absent.
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Character encoding label of the input (defaults to utf-8).
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub dataset: Option<DatasetConfig>,
    #[serde(default)]
    pub frequency: Vec<String>,
    #[serde(default)]
    pub averages: Vec<AverageQuery>,
}

impl DatasetProfile {
    pub fn dataset_config(&self) -> Result<DatasetConfig> {
        match (&self.dataset, self.preset) {
            (Some(config), None) => Ok(config.clone()),
            (None, Some(preset)) => Ok(preset.config()),
            (Some(_), Some(_)) => Err(anyhow!(
                "Profile entry for {:?} sets both 'preset' and 'dataset'",
                self.input
            )),
            (None, None) => Err(anyhow!(
                "Profile entry for {:?} needs either 'preset' or 'dataset'",
                self.input
            )),
        }
    }

    pub fn delimiter(&self) -> Result<Option<u8>> {
        self.delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()
            .map_err(|err| anyhow!("Invalid delimiter for {:?}: {err}", self.input))
    }
}

/// Multi-dataset report definition used by the `profile` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub datasets: Vec<DatasetProfile>,
}

impl ProfileConfig {
    /// Loads a profile; relative `input` paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile {path:?}"))?;
        let mut profile: ProfileConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing profile {path:?}"))?;
        if let Some(base) = path.parent() {
            for entry in &mut profile.datasets {
                if entry.input.is_relative() {
                    entry.input = base.join(&entry.input);
                }
            }
        }
        Ok(profile)
    }
}
