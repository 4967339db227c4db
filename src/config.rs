//! Service configuration, read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use thiserror::Error;

use crate::getpass::dates::MissingTimePolicy;

#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// The getpass `.docx` template; read-only.
    pub template_path: PathBuf,
    /// Where returned artifacts are written. Never cleaned by the service.
    pub output_dir: PathBuf,
    /// Document-to-PDF converter, invoked as `<cmd> -f pdf -o <pdf> <docx>`.
    pub converter_command: String,
    pub converter_timeout: Duration,
    pub missing_time: MissingTimePolicy,
    /// CORS origins; empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            template_path: PathBuf::from("static/GETPASS.docx"),
            output_dir: PathBuf::from("output"),
            converter_command: "unoconv".to_string(),
            converter_timeout: Duration::from_secs(120),
            missing_time: MissingTimePolicy::Midday,
            allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("GETPASS_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|err| ConfigError {
                key: "GETPASS_PORT",
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => defaults.port,
        };

        let converter_timeout = match get("GETPASS_CONVERTER_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError {
                        key: "GETPASS_CONVERTER_TIMEOUT_SECS",
                        value,
                        reason: "must be at least 1 second".to_string(),
                    })
                }
                Err(err) => {
                    return Err(ConfigError {
                        key: "GETPASS_CONVERTER_TIMEOUT_SECS",
                        value: value.clone(),
                        reason: err.to_string(),
                    })
                }
            },
            None => defaults.converter_timeout,
        };

        let missing_time = match get("GETPASS_MISSING_TIME") {
            Some(value) => value.parse::<MissingTimePolicy>().map_err(|reason| ConfigError {
                key: "GETPASS_MISSING_TIME",
                value: value.clone(),
                reason,
            })?,
            None => defaults.missing_time,
        };

        let allowed_origins = get("GETPASS_ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("GETPASS_HOST").unwrap_or(defaults.host),
            port,
            template_path: get("GETPASS_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_path),
            output_dir: get("GETPASS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            converter_command: get("GETPASS_CONVERTER").unwrap_or(defaults.converter_command),
            converter_timeout,
            missing_time,
            allowed_origins,
        })
    }
}
