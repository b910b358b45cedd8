//! Configuration for the duplicate scanner.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use itertools::Itertools;
use serde::Deserialize;

use poster_tools::print_error;

use crate::Args;

/// Default scan root when neither CLI nor config file provide one.
pub const DEFAULT_POSTER_DIR: &str = "/data/Posters";

/// OS junk directories that never participate in duplicate detection.
const DEFAULT_IGNORE_DIRS: &[&str] = &["__MACOSX"];

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct DupesConfig {
    #[serde(default)]
    pub(crate) default_dir: Option<PathBuf>,
    #[serde(default)]
    ignore_dirs: Vec<String>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    posterdupes: DupesConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) ignore_dirs: Vec<String>,
    pub(crate) verbose: bool,
}

impl DupesConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    pub(crate) fn get_user_config() -> Self {
        poster_tools::config::CONFIG_PATH
            .as_deref()
            .and_then(|path| {
                if !path.exists() {
                    return None;
                }
                fs::read_to_string(path)
                    .map_err(|e| {
                        print_error!("Error reading config file {}: {e}", path.display());
                    })
                    .ok()
            })
            .and_then(|config_string| Self::from_toml_str(&config_string).ok())
            .unwrap_or_default()
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.posterdupes)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: &Args) -> Self {
        let user_config = DupesConfig::get_user_config();

        let ignore_dirs: Vec<String> = DEFAULT_IGNORE_DIRS
            .iter()
            .map(std::string::ToString::to_string)
            .chain(user_config.ignore_dirs)
            .unique()
            .collect();

        Self {
            ignore_dirs,
            verbose: args.verbose || user_config.verbose,
        }
    }
}
