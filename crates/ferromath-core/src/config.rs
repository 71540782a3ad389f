use crate::error::{Error, Result};
use crate::splitter::SplitStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Display environments recognized by default (each also in starred form).
pub const MATH_ENVIRONMENTS: &[&str] = &[
    "equation",
    "align",
    "gather",
    "multline",
    "flalign",
    "alignat",
    "split",
    "displaymath",
];

/// Default half-width, in bytes, of the locator's search window.
pub const DEFAULT_WINDOW: usize = 5000;

/// Controls which math regions the locator recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocatorConfig {
    /// Environment names (without `*`) treated as math.
    pub recognized_environments: BTreeSet<String>,
    /// Accept any alphabetic environment name as math.
    pub allow_arbitrary_environment_names: bool,
    /// Half-width of the first search window around the offset. `0` disables
    /// windowing.
    pub window: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            recognized_environments: MATH_ENVIRONMENTS.iter().map(|s| s.to_string()).collect(),
            allow_arbitrary_environment_names: false,
            window: DEFAULT_WINDOW,
        }
    }
}

impl LocatorConfig {
    /// A configuration accepting every alphabetic environment name.
    pub fn any_environment() -> Self {
        Self {
            allow_arbitrary_environment_names: true,
            ..Self::default()
        }
    }

    /// Returns true if `\begin{name}` opens a math region.
    ///
    /// A trailing `*` is ignored, so `align*` is accepted wherever `align` is.
    pub fn accepts(&self, name: &str) -> bool {
        let base = name.strip_suffix('*').unwrap_or(name);
        if base.is_empty() {
            return false;
        }
        self.recognized_environments.contains(name)
            || self.recognized_environments.contains(base)
            || (self.allow_arbitrary_environment_names
                && base.chars().all(|c| c.is_ascii_alphabetic()))
    }

    pub fn validate(&self) -> Result<()> {
        match self
            .recognized_environments
            .iter()
            .find(|name| !is_environment_name(name))
        {
            Some(bad) => Err(Error::InvalidEnvironment(bad.clone())),
            None => Ok(()),
        }
    }
}

/// Top-level engine configuration.
///
/// Every field has a default, so a configuration file only needs the keys it
/// changes:
///
/// ```
/// use ferromath_core::Config;
///
/// let config = Config::from_json_str(r#"{ "split": { "environment": "align*" } }"#)?;
/// assert_eq!(config.split.environment, "align*");
/// assert_eq!(config.split.indent, 4);
/// assert!(config.auto_brace);
/// # Ok::<(), ferromath_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub locator: LocatorConfig,
    pub split: SplitStyle,
    /// Enables the auto-bracing detector.
    pub auto_brace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locator: LocatorConfig::default(),
            split: SplitStyle::default(),
            auto_brace: true,
        }
    }
}

impl Config {
    /// Name of the per-project configuration file.
    pub const FILE_NAME: &'static str = ".ferromath.json";

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Loads [`Config::FILE_NAME`] from `dir` if it exists.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(Self::FILE_NAME);
        if !path.is_file() {
            log::debug!("No {} in {:?}", Self::FILE_NAME, dir);
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    pub fn validate(&self) -> Result<()> {
        self.locator.validate()?;
        self.split.validate()
    }
}

/// An environment name: ASCII letters with an optional trailing `*`.
pub fn is_environment_name(name: &str) -> bool {
    let base = name.strip_suffix('*').unwrap_or(name);
    !base.is_empty() && base.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_whitelist() {
        let config = LocatorConfig::default();
        assert!(config.accepts("equation"));
        assert!(config.accepts("align*"));
        assert!(config.accepts("displaymath"));
        assert!(!config.accepts("cases"));
        assert!(!config.accepts("*"));
    }

    #[test]
    fn test_arbitrary_names() {
        let config = LocatorConfig::any_environment();
        assert!(config.accepts("cases"));
        assert!(config.accepts("pmatrix*"));
        assert!(!config.accepts("my-env"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(r#"{ "locator": { "window": 0 } }"#).unwrap();
        assert_eq!(config.locator.window, 0);
        assert_eq!(
            config.locator.recognized_environments.len(),
            MATH_ENVIRONMENTS.len()
        );
        assert!(config.auto_brace);
    }

    #[test]
    fn test_rejects_bad_environment_names() {
        let err = Config::from_json_str(
            r#"{ "locator": { "recognizedEnvironments": ["equation", "not valid"] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidEnvironment(name) if name == "not valid"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Config::from_json_str("{ locator"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_environment_name() {
        assert!(is_environment_name("align*"));
        assert!(!is_environment_name(""));
        assert!(!is_environment_name("a*b"));
    }
}
