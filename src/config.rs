//! Environment-driven defaults. CLI flags can only turn features on top of these.
//!
//! - `CHATDOC_ANIMATED`: split words for reveal animation (default off)
//! - `CHATDOC_CHECK_LINK_CREDIBILITY`: annotate links with a trust verdict (default off)
//! - `CHATDOC_ENABLE_COPY`: attach the copy control (default off)
//! - `CHATDOC_COPY_ACK_MS`: how long "copied" shows, in milliseconds (default 1000)
//! - `CHATDOC_COPY_COMMAND`: fallback copy command line (default per platform)

use std::env;
use std::time::Duration;

use crate::copy::{COPY_COMMAND_ENV, CommandHost, DEFAULT_ACK_WINDOW, SystemClipboard};
use crate::render::RenderOptions;

pub const ANIMATED_ENV: &str = "CHATDOC_ANIMATED";
pub const CHECK_LINKS_ENV: &str = "CHATDOC_CHECK_LINK_CREDIBILITY";
pub const ENABLE_COPY_ENV: &str = "CHATDOC_ENABLE_COPY";
pub const COPY_ACK_ENV: &str = "CHATDOC_COPY_ACK_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub animated: bool,
    pub check_link_credibility: bool,
    pub enable_copy: bool,
    pub copy_ack: Duration,
    pub copy_command: Option<CommandHost>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animated: false,
            check_link_credibility: false,
            enable_copy: false,
            copy_ack: DEFAULT_ACK_WINDOW,
            copy_command: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        from_lookup(|var| env::var(var).ok())
    }

    /// Render options before CLI flags are applied.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            animated: self.animated,
            check_link_credibility: self.check_link_credibility,
            enable_copy: self.enable_copy,
            ..Default::default()
        }
    }

    pub fn clipboard(&self) -> SystemClipboard {
        match &self.copy_command {
            Some(host) => SystemClipboard::with_fallback_command(host.clone()),
            None => SystemClipboard::default(),
        }
    }
}

/// Load configuration from the process environment.
pub fn load() -> Result<Config, ConfigError> {
    Config::from_env()
}

/// Load configuration through `lookup`, which returns a variable's value if set.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let flag = |var: &'static str| match lookup(var) {
        Some(value) => parse_bool(var, &value),
        None => Ok(false),
    };

    let copy_ack = match lookup(COPY_ACK_ENV) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid {
                var: COPY_ACK_ENV,
                value,
            })?,
        None => DEFAULT_ACK_WINDOW,
    };

    let copy_command =
        lookup(COPY_COMMAND_ENV).and_then(|line| CommandHost::from_command_line(&line));

    Ok(Config {
        animated: flag(ANIMATED_ENV)?,
        check_link_credibility: flag(CHECK_LINKS_ENV)?,
        enable_copy: flag(ENABLE_COPY_ENV)?,
        copy_ack,
        copy_command,
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
        }),
    }
}
