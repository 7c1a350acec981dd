// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Layered server configuration.
//!
//! Values are merged in this order, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`eidiv.toml` unless `--config` names another one)
//! 3. Environment variables prefixed with `EIDIV_`, using `__` between
//!    section and key, e.g. `EIDIV_MAIL__TRANSPORT=spool`
//!
//! Command-line flags are applied on top by the binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use eidiv_api::RecordingSettings;
use eidiv_domain::{NumberingPolicy, YearBasis};
use eidiv_reports::MailSettings;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// File read when no `--config` is given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "eidiv.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "EIDIV_";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: String::from("127.0.0.1"),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` file. Unset means an in-memory database.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentConfig {
    /// Printed on every report.
    pub name: String,
    /// IANA zone used for local times and numbering years.
    pub timezone: String,
    pub default_district: String,
}

impl Default for DepartmentConfig {
    fn default() -> Self {
        Self {
            name: String::from("Freiwillige Feuerwehr"),
            timezone: String::from("Europe/Berlin"),
            default_district: String::from(eidiv_domain::DEFAULT_DISTRICT),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingConfig {
    pub year_basis: YearBasis,
}

/// Where outgoing mail goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTransportKind {
    /// Log each message and drop it.
    #[default]
    Log,
    /// Write each message to the spool directory for a relay to pick up.
    Spool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransportKind,
    pub spool_dir: PathBuf,
    pub from: String,
    pub subject_prefix: String,
    pub use_bcc: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        let settings = MailSettings::default();
        Self {
            transport: MailTransportKind::default(),
            spool_dir: PathBuf::from("spool"),
            from: settings.from,
            subject_prefix: settings.subject_prefix,
            use_bcc: settings.use_bcc,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub department: DepartmentConfig,
    pub numbering: NumberingConfig,
    pub mail: MailConfig,
}

impl Config {
    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads the configuration. Call [`Config::validate`] once command-line
    /// overrides have been applied.
    ///
    /// An explicitly named file must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the named file is missing or a value has the
    /// wrong type.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path: &Path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            Some(path) => path,
            None => Path::new(DEFAULT_CONFIG_FILE),
        };

        Ok(Self::figment(path).extract::<Self>().map_err(Box::new)?)
    }

    /// # Errors
    ///
    /// Returns an error if the time zone is unknown, the port is 0, the
    /// bind address is not an IP address, or the sender is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;

        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: "server.port",
                message: String::from("port must not be 0"),
            });
        }
        self.socket_addr()?;

        if self.mail.from.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "mail.from",
                message: String::from("sender address must not be empty"),
            });
        }
        if self.department.default_district.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "department.default_district",
                message: String::from("default district must not be empty"),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `department.timezone` is not an IANA zone name.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        eidiv_domain::parse_timezone(&self.department.timezone).map_err(|e| {
            ConfigError::Invalid {
                key: "department.timezone",
                message: e.to_string(),
            }
        })
    }

    /// # Errors
    ///
    /// Returns an error if the bind address does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind, self.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "server.bind",
                message: format!("'{}' is not an IP address: {e}", self.server.bind),
            })
    }

    /// # Errors
    ///
    /// Returns an error if the time zone is unknown.
    pub fn recording_settings(&self) -> Result<RecordingSettings, ConfigError> {
        Ok(RecordingSettings {
            policy: NumberingPolicy::new(self.timezone()?, self.numbering.year_basis),
            default_district: self.department.default_district.trim().to_string(),
        })
    }

    #[must_use]
    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            from: self.mail.from.trim().to_string(),
            subject_prefix: self.mail.subject_prefix.clone(),
            use_bcc: self.mail.use_bcc,
        }
    }
}
