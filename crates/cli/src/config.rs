//! CLI configuration utilities

use anyhow::Result;
use ::config::{Config, Environment, File};
use oak_http::ClientConfig;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file inside the data directory
pub const CONFIG_FILE: &str = "oak.toml";

/// Resolve the data directory: explicit flag, then `OAK_STATE_DIR`, then the
/// platform data dir.
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        if let Ok(dir) = std::env::var("OAK_STATE_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("oak")
        }
    })
}

/// Load client settings.
///
/// Layers, lowest priority first: built-in defaults, `oak.toml` in the data
/// directory (or the explicit `file`, which must exist), then `OAK_*`
/// environment variables.
pub fn load(data_dir: &Path, file: Option<&Path>) -> Result<ClientConfig> {
    let mut builder = Config::builder().add_source(Config::try_from(&ClientConfig::default())?);

    builder = match file {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::from(data_dir.join(CONFIG_FILE)).required(false)),
    };

    builder = builder.add_source(
        Environment::with_prefix("OAK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    Ok(builder.build()?.try_deserialize()?)
}

/// Write the default configuration as TOML
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content = toml::to_string_pretty(&ClientConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
