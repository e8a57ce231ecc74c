//! Engine configuration
//!
//! Two tiers:
//! - Preset: `EngineConfig::preset(Preset::Strict)`
//! - YAML v1 file or builder overrides on top of a preset
//!
//! # Examples
//!
//! ```rust,ignore
//! use cablepath_engine::config::{EngineConfig, FallbackPolicy, Preset};
//!
//! let config = EngineConfig::builder()
//!     .max_hops(256)
//!     .pass_through_fallback(FallbackPolicy::Disabled)
//!     .build()?;
//!
//! let config = EngineConfig::from_yaml("cablepath.yaml")?;
//! ```

pub mod engine_config;
pub mod error;
pub mod preset;

pub use engine_config::{
    EngineConfig, EngineConfigBuilder, FallbackPolicy, MAX_HOPS_LIMIT, SUPPORTED_VERSIONS,
};
pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
