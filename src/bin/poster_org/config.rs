//! Configuration for the poster organizer.
//!
//! Libraries are declared in the user config file; the remote media server
//! is not queried. CLI flags override the config file values.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

use poster_tools::print_error;

use crate::Args;
use crate::catalog::Library;

/// Default poster root when neither CLI nor config file provide one.
pub const DEFAULT_POSTER_DIR: &str = "/data/Posters";

/// Processing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Action {
    /// Process new loose posters and zip bundles.
    New,
    /// Re-organize existing poster folders.
    Sync,
}

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct PosterOrgConfig {
    #[serde(default)]
    all: bool,
    #[serde(default)]
    copy: bool,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    libraries: Vec<Library>,
    #[serde(default)]
    poster_dir: Option<PathBuf>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    posterorg: PosterOrgConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) action: Action,
    pub(crate) all: bool,
    pub(crate) copy: bool,
    pub(crate) dryrun: bool,
    pub(crate) filter: Option<String>,
    pub(crate) force: bool,
    pub(crate) libraries: Vec<Library>,
    pub(crate) library_names: Vec<String>,
    pub(crate) poster_dir: PathBuf,
    pub(crate) unlinked: bool,
    pub(crate) verbose: bool,
}

impl PosterOrgConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    fn get_user_config() -> Self {
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
            .map(|config| config.posterorg)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: Args) -> Self {
        let user_config = PosterOrgConfig::get_user_config();

        let poster_dir = args
            .path
            .or(user_config.poster_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_POSTER_DIR));

        Self {
            action: args.action,
            all: args.all || user_config.all,
            copy: args.copy || user_config.copy,
            dryrun: args.print || user_config.dryrun,
            filter: args.filter,
            force: args.force || user_config.force,
            libraries: user_config.libraries,
            library_names: args.libraries,
            poster_dir,
            unlinked: args.unlinked,
            verbose: args.verbose || user_config.verbose,
        }
    }
}
