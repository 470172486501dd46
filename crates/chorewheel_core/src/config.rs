//! Scheduler configuration: chore slates, monthly cycle and fallback policy.
//!
//! # Responsibility
//! - Provide the built-in default slates.
//! - Parse and render the TOML configuration file.
//! - Reject ambiguous slates before a scheduler is built.
//!
//! # Invariants
//! - A `SchedulerConfig` handed to the scheduler has passed `validate()`.
//! - Catalog order in the file is allocation order.

use crate::model::catalog::{CatalogEntry, CatalogError, ChoreCatalog, MonthlyCatalog};
use crate::service::allocator::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_MONTHLY_CYCLE_LEN: u32 = 4;
const DEFAULT_MONTHLY_START_WEEK: u32 = 3;

const DEFAULT_WEEKLY_SLATE: &[(&str, u32)] = &[
    ("Annex Bathrooms Upstairs/Downstairs", 3),
    ("HCRU Upstairs Bathrooms", 3),
    ("HCRU Downstairs Bathrooms", 3),
    ("HCRU Upstairs Hallways/Stairs", 3),
    ("HCRU Downstairs Hallways", 3),
    ("Annex hallways/stairs", 3),
    ("Conference Room", 2),
    ("Microwaves HCRU", 1),
    ("Annex Microwaves", 1),
    ("Annex Headhouse", 2),
    ("HCRU Headhouse", 2),
    ("Growth Chamber Center Room", 2),
    ("Growth Chamber Bathroom", 2),
];

const DEFAULT_MONTHLY_SLATES: &[(u32, &[(&str, u32)])] = &[
    (0, &[("Growth Chamber Shower", 4)]),
    (2, &[("Fridges", 3)]),
];

/// Configuration load/parse failures.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Render(toml::ser::Error),
    Invalid(CatalogError),
    /// Two `[[monthly]]` tables share a cycle index.
    DuplicateMonthlySlate(u32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Render(err) => write!(f, "failed to render config: {err}"),
            Self::Invalid(err) => write!(f, "invalid chore slates: {err}"),
            Self::DuplicateMonthlySlate(cycle) => {
                write!(f, "monthly slate {cycle} is declared twice")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Invalid(err) => Some(err),
            Self::DuplicateMonthlySlate(_) => None,
        }
    }
}

impl From<CatalogError> for ConfigError {
    fn from(value: CatalogError) -> Self {
        Self::Invalid(value)
    }
}

/// Everything the period scheduler needs besides state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub weekly: ChoreCatalog,
    pub monthly: MonthlyCatalog,
    pub fallback: FallbackPolicy,
    /// Monthly slate key is `(week_number + 1) % monthly_cycle_len`.
    pub monthly_cycle_len: u32,
    /// First week number on which monthly slates are considered.
    pub monthly_start_week: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let mut monthly = MonthlyCatalog::new();
        for (cycle, pairs) in DEFAULT_MONTHLY_SLATES {
            monthly.insert(*cycle, ChoreCatalog::from_pairs(pairs.iter().copied()));
        }

        Self {
            weekly: ChoreCatalog::from_pairs(DEFAULT_WEEKLY_SLATE.iter().copied()),
            monthly,
            fallback: FallbackPolicy::default(),
            monthly_cycle_len: DEFAULT_MONTHLY_CYCLE_LEN,
            monthly_start_week: DEFAULT_MONTHLY_START_WEEK,
        }
    }
}

impl SchedulerConfig {
    /// Weekly-only configuration with default cycle settings.
    pub fn weekly_only(weekly: ChoreCatalog) -> Self {
        Self {
            weekly,
            monthly: MonthlyCatalog::new(),
            ..Self::default()
        }
    }

    /// Checks slate-level and cross-slate invariants.
    ///
    /// # Errors
    /// - Any `ChoreCatalog::validate` failure on the weekly or a monthly slate.
    /// - `ZeroCycleLength` when `monthly_cycle_len == 0`.
    /// - `MonthlyKeyOutOfRange` for slates that can never be selected.
    /// - `ChoreInBothSlates` when a monthly chore is also weekly.
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.weekly.validate()?;
        if self.monthly_cycle_len == 0 {
            return Err(CatalogError::ZeroCycleLength);
        }

        for (cycle, catalog) in self.monthly.slates() {
            catalog.validate()?;
            if cycle >= self.monthly_cycle_len {
                return Err(CatalogError::MonthlyKeyOutOfRange {
                    key: cycle,
                    cycle_len: self.monthly_cycle_len,
                });
            }
            if let Some(entry) = catalog
                .entries()
                .iter()
                .find(|entry| self.weekly.contains(&entry.chore))
            {
                return Err(CatalogError::ChoreInBothSlates {
                    chore: entry.chore.clone(),
                    cycle,
                });
            }
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source).map_err(ConfigError::Parse)?;
        let config = Self::try_from(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Renders this configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(&ConfigFile::from(self)).map_err(ConfigError::Render)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    fallback: FallbackPolicy,
    #[serde(default = "default_monthly_cycle_len")]
    monthly_cycle_len: u32,
    #[serde(default = "default_monthly_start_week")]
    monthly_start_week: u32,
    weekly: Vec<CatalogEntry>,
    #[serde(default)]
    monthly: Vec<MonthlySlateFile>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MonthlySlateFile {
    cycle: u32,
    chores: Vec<CatalogEntry>,
}

fn default_monthly_cycle_len() -> u32 {
    DEFAULT_MONTHLY_CYCLE_LEN
}

fn default_monthly_start_week() -> u32 {
    DEFAULT_MONTHLY_START_WEEK
}

impl TryFrom<ConfigFile> for SchedulerConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let mut monthly = MonthlyCatalog::new();
        let mut cycles = BTreeSet::new();
        for slate in file.monthly {
            if !cycles.insert(slate.cycle) {
                return Err(ConfigError::DuplicateMonthlySlate(slate.cycle));
            }
            monthly.insert(slate.cycle, ChoreCatalog::new(slate.chores));
        }

        Ok(Self {
            weekly: ChoreCatalog::new(file.weekly),
            monthly,
            fallback: file.fallback,
            monthly_cycle_len: file.monthly_cycle_len,
            monthly_start_week: file.monthly_start_week,
        })
    }
}

impl From<&SchedulerConfig> for ConfigFile {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            fallback: config.fallback,
            monthly_cycle_len: config.monthly_cycle_len,
            monthly_start_week: config.monthly_start_week,
            weekly: config.weekly.entries().to_vec(),
            monthly: config
                .monthly
                .slates()
                .map(|(cycle, catalog)| MonthlySlateFile {
                    cycle,
                    chores: catalog.entries().to_vec(),
                })
                .collect(),
        }
    }
}
