//! Preset configurations
//!
//! Presets provide complete engine configurations for common deployments.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Audit runs on well-documented plants
    ///
    /// - max_hops=128
    /// - one-hop pass-through fallback
    Strict,

    /// Interactive editing
    ///
    /// - max_hops=512
    /// - one-hop pass-through fallback
    Default,

    /// Large or partially documented plants
    ///
    /// - max_hops=4096
    /// - pass-through fallback disabled (never ambiguous)
    Permissive,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "default" => Ok(Self::Default),
            "permissive" => Ok(Self::Permissive),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Default => "default",
            Self::Permissive => "permissive",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Default
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!(Preset::from_str("STRICT").unwrap(), Preset::Strict);
        assert_eq!(Preset::from_str("permissive").unwrap(), Preset::Permissive);
        assert!(matches!(
            Preset::from_str("fast"),
            Err(ConfigError::UnknownPreset(name)) if name == "fast"
        ));
        assert_eq!(Preset::default().to_string(), "default");
    }
}
