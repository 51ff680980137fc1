use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a mapper configuration document cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse mapper configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Knobs for the mapping engine.
///
/// Every field has a default, so a configuration document only needs to
/// name what it changes.
///
/// # Examples
///
/// ```
/// use bondmap::MapperConfig;
///
/// let config = MapperConfig::from_toml_str("site_radius = 3\ndetect_ambiguity = false").unwrap();
/// assert_eq!(config.site_radius, Some(3));
/// assert!(!config.detect_ambiguity);
/// assert!(config.reverse_bond_check);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Only atoms within this many bonds of an anchor take part in the
    /// mapping. `None` uses the whole template, which is what partial
    /// templates cut by an upstream extractor expect.
    pub site_radius: Option<usize>,

    /// Check bonds in both directions. Without it only bonds of the
    /// template being mapped from (the pre one, or the post one when its
    /// site is smaller) must reappear between the images.
    pub reverse_bond_check: bool,

    /// Look for a second, structurally different mapping after the first
    /// one is found and report it as a warning.
    pub detect_ambiguity: bool,

    /// Search nodes the ambiguity probe may expand before giving up
    /// silently.
    pub ambiguity_node_budget: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            site_radius: None,
            reverse_bond_check: true,
            detect_ambiguity: true,
            ambiguity_node_budget: 100_000,
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}
