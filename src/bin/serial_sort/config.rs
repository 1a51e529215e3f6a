use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

use serial_sort::print_error;

use crate::Args;

/// Directory that incoming files are dropped into, relative to the working directory.
pub const DEFAULT_SOURCE_DIR: &str = "Files";
/// Allow-list of serial prefixes, one per line.
pub const DEFAULT_PREFIX_FILE: &str = "valid_prefixes.txt";
/// Fallback destination root. Real deployments point this at a network share
/// through the user config file or `--dest`.
pub const DEFAULT_DESTINATION_ROOT: &str = "Sorted";

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) auto: bool,
    pub(crate) category: Option<String>,
    pub(crate) debug: bool,
    pub(crate) destination_root: PathBuf,
    pub(crate) dryrun: bool,
    pub(crate) prefix_file: PathBuf,
    pub(crate) stats: bool,
    pub(crate) verbose: bool,
}

/// Config from the user config file
#[derive(Debug, Default, Deserialize)]
struct SerialSortConfig {
    #[serde(default)]
    auto: bool,
    #[serde(default)]
    destination_root: Option<String>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    prefix_file: Option<String>,
    #[serde(default)]
    stats: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    serialsort: SerialSortConfig,
}

impl SerialSortConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    fn get_user_config() -> Self {
        serial_sort::config::CONFIG_PATH
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
            .map(|config| config.serialsort)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: &Args) -> Self {
        let user_config = SerialSortConfig::get_user_config();

        let destination_root = args.dest.clone().unwrap_or_else(|| {
            user_config
                .destination_root
                .map_or_else(|| PathBuf::from(DEFAULT_DESTINATION_ROOT), PathBuf::from)
        });

        let prefix_file = args.prefixes.clone().unwrap_or_else(|| {
            user_config
                .prefix_file
                .map_or_else(|| PathBuf::from(DEFAULT_PREFIX_FILE), PathBuf::from)
        });

        Self {
            auto: args.auto || user_config.auto,
            category: args.category.clone(),
            debug: args.debug,
            destination_root,
            dryrun: args.print || user_config.dryrun,
            prefix_file,
            stats: args.stats || user_config.stats,
            verbose: args.verbose || user_config.verbose,
        }
    }
}
