//! Engine configuration
//!
//! ```yaml
//! version: 1
//! preset: default
//! max_hops: 256
//! pass_through_fallback: disabled
//! ```
//!
//! Fields left out of the file keep the preset's value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use crate::features::path_tracer::domain::DEFAULT_MAX_HOPS;

/// Hard ceiling for `max_hops`
pub const MAX_HOPS_LIMIT: usize = 65_536;

/// Supported configuration file versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// What to do when a deleted termination is not on any known path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Look once at the paired face of a single-position pass-through
    #[default]
    OneHop,
    /// Never look past the deleted termination
    Disabled,
}

/// Consistency engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trace length bound; longer walks fail as loops
    pub max_hops: usize,
    /// Trace with rayon during `rebuild_all`
    pub parallel_rebuild: bool,
    pub pass_through_fallback: FallbackPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(Preset::Default)
    }
}

impl EngineConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Strict => Self {
                max_hops: 128,
                parallel_rebuild: true,
                pass_through_fallback: FallbackPolicy::OneHop,
            },
            Preset::Default => Self {
                max_hops: DEFAULT_MAX_HOPS,
                parallel_rebuild: true,
                pass_through_fallback: FallbackPolicy::OneHop,
            },
            Preset::Permissive => Self {
                max_hops: 4096,
                parallel_rebuild: true,
                pass_through_fallback: FallbackPolicy::Disabled,
            },
        }
    }

    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new(Preset::Default)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_hops == 0 || self.max_hops > MAX_HOPS_LIMIT {
            return Err(ConfigError::range_with_hint(
                "max_hops",
                self.max_hops,
                1,
                MAX_HOPS_LIMIT,
                "A trace needs at least one hop; very long bounds only delay loop detection",
            ));
        }
        Ok(())
    }

    /// Load and validate a YAML v1 configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: EngineConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = match file.preset.as_deref() {
            Some(name) => Preset::from_str(name)?,
            None => Preset::Default,
        };

        let mut builder = EngineConfigBuilder::new(preset);
        if let Some(max_hops) = file.max_hops {
            builder = builder.max_hops(max_hops);
        }
        if let Some(parallel) = file.parallel_rebuild {
            builder = builder.parallel_rebuild(parallel);
        }
        if let Some(policy) = file.pass_through_fallback {
            builder = builder.pass_through_fallback(policy);
        }
        builder.build()
    }

    /// Export as a YAML v1 document (explicit values, no preset)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = EngineConfigFileV1 {
            version: Some(1),
            preset: None,
            max_hops: Some(self.max_hops),
            parallel_rebuild: Some(self.parallel_rebuild),
            pass_through_fallback: Some(self.pass_through_fallback),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

/// On-disk format, version 1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineConfigFileV1 {
    version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_hops: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parallel_rebuild: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pass_through_fallback: Option<FallbackPolicy>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new(preset: Preset) -> Self {
        Self {
            config: EngineConfig::preset(preset),
        }
    }

    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.config.max_hops = max_hops;
        self
    }

    pub fn parallel_rebuild(mut self, parallel: bool) -> Self {
        self.config.parallel_rebuild = parallel;
        self
    }

    pub fn pass_through_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.config.pass_through_fallback = policy;
        self
    }

    pub fn build(self) -> ConfigResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
