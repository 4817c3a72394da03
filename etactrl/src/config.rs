use directories::UserDirs;
use serde::Deserialize;

/// A configuration that is constructed from ~/.etactrl[.toml|.yaml|.json] and
/// environment vars ETA_HOST and ETA_HIDE_IO_VARIABLES.
#[derive(Debug, Default, Deserialize)]
pub struct EnvConfig {
    pub host: Option<String>,
    pub hide_io_variables: Option<bool>,
}

impl EnvConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let mut s = config::Config::new();

        UserDirs::new().and_then(|dirs| {
            dirs.home_dir()
                .join(".etactrl")
                .to_str()
                .map(|path| s.merge(config::File::with_name(path).required(false)).ok())
        });

        s.merge(config::Environment::with_prefix("eta"))?;

        s.try_into()
    }
}

/// Connection settings after merging command line flags over [`EnvConfig`].
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub host: String,
    pub hide_io_variables: bool,
}

impl Settings {
    pub fn resolve(host: Option<&str>, show_io: bool, env: EnvConfig) -> anyhow::Result<Self> {
        let host = match host.map(str::to_string).or(env.host) {
            Some(host) => host,
            None => {
                return Err(anyhow::anyhow!(
                    "No host given. Use --host or set ETA_HOST."
                ))
            }
        };
        let hide_io_variables = !show_io && env.hide_io_variables.unwrap_or(true);
        Ok(Settings {
            host,
            hide_io_variables,
        })
    }
}
