// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::game_data::Language;

/// Default backend address, matching the companion server's default bind.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default file holding the persisted language choice.
pub const DEFAULT_LANGUAGE_FILE: &str = "language.json";

/// Upper bound for a configured reconnect delay, in seconds.
pub const MAX_RECONNECT_SECS: u64 = 24 * 60 * 60;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL without a trailing slash.
    pub api_base_url: String,
    /// JSON file the selected language is persisted to.
    pub language_file: PathBuf,
    /// Language forced from the environment or command line.
    pub language: Option<Language>,
    /// Convert ANSI colour codes in log lines to HTML.
    pub log_html: bool,
    /// Delay before reconnecting a dropped log stream.
    pub reconnect_delay: Duration,
    /// Skip the log stream entirely.
    pub no_logs: bool,
    /// Dump prometheus metrics before exiting.
    pub print_metrics: bool,
    /// Item ids to resolve and print after loading.
    pub items: Vec<String>,
    /// Weapon ids to resolve and print after loading.
    pub weapons: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            language_file: PathBuf::from(DEFAULT_LANGUAGE_FILE),
            language: None,
            log_html: false,
            reconnect_delay: Duration::from_secs(5),
            no_logs: false,
            print_metrics: false,
            items: Vec::new(),
            weapons: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables (a `.env` file in the working directory is read first):
    /// - `EER_API_BASE_URL` - Backend base URL (default: `http://127.0.0.1:8000`)
    /// - `EER_LANGUAGE_FILE` - Persisted language file (default: `language.json`)
    /// - `EER_LANGUAGE` - Language code to use and persist
    /// - `EER_LOG_HTML` - Set to `true` to convert ANSI log colours to HTML
    /// - `EER_RECONNECT_SECS` - Log stream reconnect delay (default: 5, at most one day)
    ///
    /// CLI flags override the environment:
    /// `--base-url <URL>`, `--language-file <PATH>`, `--language <CODE>`, `--html`,
    /// `--reconnect-secs <N>`, `--no-logs`, `--metrics`, `--item <ID>`, `--weapon <ID>`.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from explicit arguments and an environment lookup.
    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_base_url = Self::parse_cli_value(args, "--base-url")
            .or_else(|| env("EER_API_BASE_URL"))
            .map(|url| normalize_base_url(&url))
            .transpose()?
            .unwrap_or(defaults.api_base_url);

        let language_file = Self::parse_cli_value(args, "--language-file")
            .or_else(|| env("EER_LANGUAGE_FILE"))
            .map(PathBuf::from)
            .unwrap_or(defaults.language_file);

        let language = Self::parse_cli_value(args, "--language")
            .or_else(|| env("EER_LANGUAGE"))
            .map(|code| code.parse::<Language>())
            .transpose()?;

        let log_html = args.iter().any(|a| a == "--html")
            || env("EER_LOG_HTML")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false);

        let reconnect_delay = Self::parse_cli_value(args, "--reconnect-secs")
            .and_then(|v| v.parse::<u64>().ok())
            .or_else(|| env("EER_RECONNECT_SECS").and_then(|v| v.parse::<u64>().ok()))
            .map(|secs| Duration::from_secs(secs.min(MAX_RECONNECT_SECS)))
            .unwrap_or(defaults.reconnect_delay);

        Ok(Config {
            api_base_url,
            language_file,
            language,
            log_html,
            reconnect_delay,
            no_logs: args.iter().any(|a| a == "--no-logs"),
            print_metrics: args.iter().any(|a| a == "--metrics"),
            items: Self::parse_cli_values(args, "--item"),
            weapons: Self::parse_cli_values(args, "--weapon"),
        })
    }

    /// WebSocket endpoint for the backend log stream.
    pub fn logs_ws_url(&self) -> String {
        format!("{}/ws/logs", websocket_base(&self.api_base_url))
    }

    /// Parse a CLI flag value like `--base-url http://host:8000`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }

    /// Collect every value given for a repeatable flag.
    fn parse_cli_values(args: &[String], flag: &str) -> Vec<String> {
        args.windows(2)
            .filter(|pair| pair[0] == flag)
            .map(|pair| pair[1].clone())
            .collect()
    }
}

fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(Error::InvalidUrl(url.to_string()))
    }
}

/// Swap the `http` scheme prefix for `ws`, so `https` becomes `wss`.
pub fn websocket_base(http_base: &str) -> String {
    match http_base.strip_prefix("http") {
        Some(rest) => format!("ws{rest}"),
        None => http_base.to_string(),
    }
}
