//! CLI configuration

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cnm_core::limits::{validate_cluster_size, validate_traversal_depth};
use cnm_core::{Category, LevelOfDetail};
use serde::{Deserialize, Serialize};

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cnm")
        .join("config.toml")
}

/// Explicit path if given, else the default location
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

/// Markdown file stem to category, for the standard document set
fn default_categories() -> BTreeMap<String, String> {
    [
        ("applications", Category::Application),
        ("materials", Category::Material),
        ("mechanisms", Category::Mechanism),
        ("methods", Category::Method),
        ("phenomena", Category::Phenomenon),
        ("theoretical", Category::Theory),
    ]
    .into_iter()
    .map(|(stem, category)| (stem.to_string(), category.to_string()))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Distance within which every node renders
    pub near_distance: f64,
    /// Importance required per unit of distance beyond `near_distance`
    pub importance_per_unit: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let lod = LevelOfDetail::default();
        Self {
            near_distance: lod.near_distance,
            importance_per_unit: lod.importance_per_unit,
        }
    }
}

impl RenderConfig {
    pub fn level_of_detail(&self) -> LevelOfDetail {
        LevelOfDetail::new(self.near_distance, self.importance_per_unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Default hop count for `neighbors`
    pub neighbor_depth: u32,
    /// Default node cap for `cluster`
    pub cluster_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            neighbor_depth: 1,
            cluster_size: 50,
        }
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub categories: BTreeMap<String, String>,
    pub render: RenderConfig,
    pub query: QueryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            render: RenderConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.category_map()?;
        validate_traversal_depth(self.query.neighbor_depth)?;
        validate_cluster_size(self.query.cluster_size)?;
        Ok(())
    }

    /// Lowercased file stem to parsed category
    pub fn category_map(&self) -> anyhow::Result<HashMap<String, Category>> {
        self.categories
            .iter()
            .map(|(stem, name)| -> anyhow::Result<(String, Category)> {
                let category = name
                    .parse::<Category>()
                    .with_context(|| format!("categories.{}", stem))?;
                Ok((stem.to_lowercase(), category))
            })
            .collect()
    }

    /// Known keys, category entries excluded
    pub fn keys() -> &'static [&'static str] {
        &[
            "render.near_distance",
            "render.importance_per_unit",
            "query.neighbor_depth",
            "query.cluster_size",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "render.near_distance" => Some(self.render.near_distance.to_string()),
            "render.importance_per_unit" => Some(self.render.importance_per_unit.to_string()),
            "query.neighbor_depth" => Some(self.query.neighbor_depth.to_string()),
            "query.cluster_size" => Some(self.query.cluster_size.to_string()),
            _ => key
                .strip_prefix("categories.")
                .and_then(|stem| self.categories.get(stem).cloned()),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "render.near_distance" => self.render.near_distance = value.parse()?,
            "render.importance_per_unit" => self.render.importance_per_unit = value.parse()?,
            "query.neighbor_depth" => self.query.neighbor_depth = value.parse()?,
            "query.cluster_size" => self.query.cluster_size = value.parse()?,
            _ => match key.strip_prefix("categories.") {
                Some(stem) if !stem.is_empty() => {
                    let category: Category = value.parse()?;
                    self.categories.insert(stem.to_string(), category.to_string());
                }
                _ => anyhow::bail!(
                    "Unknown config key: {} (available: {}, categories.<stem>)",
                    key,
                    Self::keys().join(", ")
                ),
            },
        }
        self.validate()
    }
}
