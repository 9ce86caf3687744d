//! Optional TOML configuration for the command-line adapter.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file consulted when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "wrappy.toml";

/// Settings loaded from the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Tracing filter directives used when neither `--log` nor `RUST_LOG` is set.
    pub(crate) log_filter: Option<String>,
    /// External solution checker.
    pub(crate) checker: Option<CheckerConfig>,
}

/// Program invoked to score solutions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CheckerConfig {
    /// Executable to run.
    pub(crate) program: PathBuf,
    /// Arguments placed before the task and solution paths.
    #[serde(default)]
    pub(crate) args: Vec<String>,
}

impl Config {
    /// Loads the explicitly requested file, or the default file when present.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.is_file() {
                    Self::read(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(Config::parse("").expect("parses"), Config::default());
    }

    #[test]
    fn checker_section_is_read() {
        let config = Config::parse(
            r#"
            log_filter = "wrappy_world=debug"

            [checker]
            program = "node"
            args = ["checker/check.js"]
            "#,
        )
        .expect("parses");

        assert_eq!(config.log_filter.as_deref(), Some("wrappy_world=debug"));
        assert_eq!(
            config.checker,
            Some(CheckerConfig {
                program: PathBuf::from("node"),
                args: vec!["checker/check.js".to_owned()],
            })
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Config::parse("verbosity = 3").expect_err("unknown key must fail");
        assert!(
            format!("{error:#}").contains("verbosity"),
            "error should name the offending key: {error:#}"
        );
        assert!(Config::parse("[checker]\nprogram = \"x\"\ntimeout = 5").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = Path::new("definitely/not/here/wrappy.toml");
        assert!(Config::load(Some(missing)).is_err());
    }
}
