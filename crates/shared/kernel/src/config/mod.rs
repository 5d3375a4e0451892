use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides (`ABOOK__DATABASE__URL` maps to `database.url`).
pub const ENV_PREFIX: &str = "ABOOK";

/// Default configuration file stem, resolved against the working directory.
pub const DEFAULT_CONFIG: &str = "abook";

#[abook_derive::abook_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a required file overlaid with `ABOOK__`-prefixed environment variables.
///
/// The file format is picked from its extension (`abook.toml`, `abook.yaml`, ...). Without
/// a path the `abook` file in the working directory is used.
///
/// # Errors
/// Fails if the file is missing, an override is malformed, or the merged settings do not
/// deserialize into `T`.
///
/// # Example
/// ```rust
/// use abook_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct ShellConfig {
///     page_size: u16,
/// }
///
/// let cfg: ShellConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load(path, true)
}

/// Like [`load_config`], but a missing file falls back to `T`'s serde defaults plus
/// environment overrides.
///
/// # Errors
/// Fails if an existing file or an override is malformed, or deserialization fails.
pub fn load_optional_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load(path, false)
}

fn load<T>(path: Option<impl AsRef<Path>>, required: bool) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
