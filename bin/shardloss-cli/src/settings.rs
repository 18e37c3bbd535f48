//! Settings loading
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `SHARDLOSS_*` environment variables.

use config::{Config as ConfigSource, Environment, File, Map};
use shardloss_common::{Error, Result, Settings};
use std::path::Path;

/// Environment variable prefix, e.g. `SHARDLOSS_SHARD_COUNT`
pub const ENV_PREFIX: &str = "SHARDLOSS";

/// Load settings from the file (if any) and the process environment
pub fn load(path: Option<&Path>) -> Result<Settings> {
    load_from(path, None)
}

/// Load settings, optionally replacing the process environment with `env`
pub fn load_from(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Settings> {
    let mut builder = ConfigSource::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(env),
    );

    builder
        .build()
        .and_then(|source| source.try_deserialize::<Settings>())
        .map_err(|e| Error::Settings(e.to_string()))
}
