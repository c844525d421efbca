//! YAML configuration for the generate command.
//!
//! Every field has a default, so an empty file (or no file at all) reproduces
//! the stock restaurant, cinema and ecommerce runs.

use anyhow::Context;
use seed_data_gen::fake::supplier_name_space;
use seed_data_gen::pipeline::cinema::CinemaConfig;
use seed_data_gen::pipeline::ecommerce::EcommerceConfig;
use seed_data_gen::pipeline::restaurant::RestaurantConfig;
use seed_data_gen::{CountRange, PipelineKind, MAX_LOOKBACK_DAYS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeederConfig {
    /// Fixed RNG seed; a fresh one is drawn per run when absent
    pub seed: Option<u64>,
    /// Directory the seed files are written to
    pub output_dir: PathBuf,
    pub restaurant: RestaurantConfig,
    pub cinema: CinemaConfig,
    pub ecommerce: EcommerceConfig,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            seed: None,
            output_dir: PathBuf::from("."),
            restaurant: RestaurantConfig::default(),
            cinema: CinemaConfig::default(),
            ecommerce: EcommerceConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    /// Restrict the run to these pipelines (empty = all enabled)
    pub only: Vec<PipelineKind>,
    pub batch_size: Option<usize>,
    pub include_schema: bool,
}

impl SeederConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SeederConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if !overrides.only.is_empty() {
            self.restaurant.enabled = overrides.only.contains(&PipelineKind::Restaurant);
            self.cinema.enabled = overrides.only.contains(&PipelineKind::Cinema);
            self.ecommerce.enabled = overrides.only.contains(&PipelineKind::Ecommerce);
        }
        if let Some(size) = overrides.batch_size {
            self.restaurant.batch_size = size;
            self.cinema.batch_size = size;
            self.ecommerce.batch_size = size;
        }
        if overrides.include_schema {
            self.restaurant.include_schema = true;
            self.cinema.include_schema = true;
            self.ecommerce.include_schema = true;
        }
    }

    /// Enabled pipelines in run order
    pub fn enabled(&self) -> Vec<PipelineKind> {
        PipelineKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                PipelineKind::Restaurant => self.restaurant.enabled,
                PipelineKind::Cinema => self.cinema.enabled,
                PipelineKind::Ecommerce => self.ecommerce.enabled,
            })
            .collect()
    }

    pub fn output_path(&self, kind: PipelineKind) -> PathBuf {
        let file = match kind {
            PipelineKind::Restaurant => &self.restaurant.output,
            PipelineKind::Cinema => &self.cinema.output,
            PipelineKind::Ecommerce => &self.ecommerce.output,
        };
        self.output_dir.join(file)
    }

    pub fn batch_size(&self, kind: PipelineKind) -> usize {
        match kind {
            PipelineKind::Restaurant => self.restaurant.batch_size,
            PipelineKind::Cinema => self.cinema.batch_size,
            PipelineKind::Ecommerce => self.ecommerce.batch_size,
        }
    }

    /// Reject settings that would produce an empty or inconsistent run
    pub fn validate(&self) -> anyhow::Result<()> {
        let enabled = self.enabled();
        if enabled.is_empty() {
            anyhow::bail!("No pipelines enabled");
        }

        for kind in enabled {
            match kind {
                PipelineKind::Restaurant => {
                    let c = &self.restaurant;
                    check_common(kind, &c.output, c.child_count, c.lookback_days, c.batch_size)?;
                    check_naming(kind, &c.label, c.database.as_deref())?;
                    check_range(kind, "quantity", c.quantity)?;
                }
                PipelineKind::Cinema => {
                    let c = &self.cinema;
                    check_common(kind, &c.output, c.child_count, c.lookback_days, c.batch_size)?;
                    check_naming(kind, &c.label, c.database.as_deref())?;
                    check_range(kind, "screens", c.screens)?;
                    check_range(kind, "tickets", c.tickets)?;
                    if c.max_duration == 0 {
                        anyhow::bail!("{}: max_duration must be greater than 0", kind);
                    }
                }
                PipelineKind::Ecommerce => {
                    let c = &self.ecommerce;
                    check_common(kind, &c.output, c.child_count, c.lookback_days, c.batch_size)?;
                    check_naming(kind, &c.label, c.database.as_deref())?;
                    check_range(kind, "quantity", c.quantity)?;
                    if c.products == 0 {
                        anyhow::bail!("{}: products must be greater than 0", kind);
                    }
                    let space = supplier_name_space();
                    if c.suppliers > space {
                        anyhow::bail!(
                            "{}: suppliers must be at most {} (distinct supplier names)",
                            kind,
                            space
                        );
                    }
                    if let Some(name) = &c.summary_table {
                        check_identifier(kind, "summary_table", name)?;
                        if matches!(name.as_str(), "Suppliers" | "Products" | "Orders") {
                            anyhow::bail!(
                                "{}: summary_table must not reuse table name {}",
                                kind,
                                name
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn check_common(
    kind: PipelineKind,
    output: &str,
    child_count: CountRange,
    lookback_days: u32,
    batch_size: usize,
) -> anyhow::Result<()> {
    if output.trim().is_empty() {
        anyhow::bail!("{}: output file name must not be empty", kind);
    }
    check_range(kind, "child_count", child_count)?;
    if lookback_days == 0 || lookback_days > MAX_LOOKBACK_DAYS {
        anyhow::bail!(
            "{}: lookback_days must be between 1 and {}",
            kind,
            MAX_LOOKBACK_DAYS
        );
    }
    if batch_size == 0 {
        anyhow::bail!("{}: batch_size must be greater than 0", kind);
    }
    Ok(())
}

/// `label` lands in a `--` comment line; `database` in `USE`.
fn check_naming(kind: PipelineKind, label: &str, database: Option<&str>) -> anyhow::Result<()> {
    if label.contains(['\n', '\r']) {
        anyhow::bail!("{}: label must be a single line", kind);
    }
    if let Some(db) = database {
        check_identifier(kind, "database", db)?;
    }
    Ok(())
}

/// Names are emitted unquoted, so only `[A-Za-z0-9_]+` is accepted
fn check_identifier(kind: PipelineKind, field: &str, name: &str) -> anyhow::Result<()> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        anyhow::bail!(
            "{}: {} {:?} must be a non-empty identifier of letters, digits and underscores",
            kind,
            field,
            name
        );
    }
    Ok(())
}

fn check_range(kind: PipelineKind, field: &str, range: CountRange) -> anyhow::Result<()> {
    if range.low > range.high {
        anyhow::bail!(
            "{}: {} low bound {} exceeds high bound {}",
            kind,
            field,
            range.low,
            range.high
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SeederConfig::default();
        config.validate().unwrap();
        assert_eq!(config.enabled(), PipelineKind::ALL.to_vec());
        assert_eq!(
            config.output_path(PipelineKind::Cinema),
            PathBuf::from("./pvrinox_seed.sql")
        );
    }

    #[test]
    fn test_reversed_range_rejected() {
        let mut config = SeederConfig::default();
        config.restaurant.child_count = CountRange::new(250, 150);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("restaurant: child_count"));
    }
}
