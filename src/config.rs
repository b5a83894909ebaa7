use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::theme::Theme;

/// Compass Dash - terminal dashboard for a Compass ledger node
///
/// Configuration priority: CLI args > Environment variables (.env honored) > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "compass-dash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compass ledger node dashboard", long_about = None)]
pub struct CliArgs {
    /// JSON-RPC endpoint of the node (editable at runtime from Settings)
    #[arg(long, env = "COMPASS_RPC_URL")]
    pub rpc_url: Option<String>,

    /// SQLite file holding the remembered wallet address
    #[arg(long, env = "COMPASS_SESSION_DB")]
    pub session_db: Option<String>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Color theme: nord, dos-blue, amber-crt, green-phosphor
    #[arg(long, env = "COMPASS_THEME", value_parser = clap::value_parser!(Theme))]
    pub theme: Option<Theme>,

    /// Comma-separated tickers shown on Trading and Models (e.g. "BTC,ETH")
    #[arg(long, env = "COMPASS_TICKERS")]
    pub tickers: Option<String>,

    /// HTTP transport timeout in milliseconds (1000-600000); unset means none
    #[arg(long, env = "RPC_TIMEOUT_MS")]
    pub rpc_timeout_ms: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub session_db: PathBuf,
    pub render_fps: u32,
    pub theme: Theme,
    pub tickers: Vec<String>,
    pub rpc_timeout: Option<Duration>,
}

pub const DEFAULT_RPC_URL: &str = "http://localhost:9000/";
pub const DEFAULT_SESSION_DB: &str = "./compass_session.db";
pub const DEFAULT_TICKERS: &[&str] = &["BTC", "ETH", "SOL", "LTC"];

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Upper-cased, de-duplicated, order preserved
fn parse_tickers(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in s.split(',').map(|t| t.trim().to_ascii_uppercase()) {
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

/// Apply defaults and validation to already-parsed arguments
pub fn from_args(args: CliArgs) -> Result<Config> {
    let rpc_url = args
        .rpc_url
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    validate_url(&rpc_url, "COMPASS_RPC_URL")?;

    let session_db = args
        .session_db
        .unwrap_or_else(|| DEFAULT_SESSION_DB.to_string());
    if session_db.trim().is_empty() {
        return Err(anyhow!("COMPASS_SESSION_DB cannot be empty"));
    }

    let render_fps = validate_in_range(args.render_fps.unwrap_or(20), 1, 120, "RENDER_FPS")?;

    let tickers = match args.tickers {
        Some(s) => parse_tickers(&s),
        None => DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
    };
    if tickers.is_empty() {
        return Err(anyhow!("COMPASS_TICKERS must contain at least one ticker"));
    }

    let rpc_timeout = match args.rpc_timeout_ms {
        Some(ms) => Some(Duration::from_millis(validate_in_range(
            ms,
            1000,
            600_000,
            "RPC_TIMEOUT_MS",
        )?)),
        None => None,
    };

    Ok(Config {
        rpc_url,
        session_db: PathBuf::from(session_db),
        render_fps,
        theme: args.theme.unwrap_or_default(),
        tickers,
        rpc_timeout,
    })
}

/// Validate URL format (basic scheme check)
pub fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    pub fn log_summary(&self) {
        log::info!("⚙️  RPC endpoint: {}", self.rpc_url);
        log::info!("⚙️  Session DB: {}", self.session_db.display());
        log::info!("⚙️  Tickers: {}", self.tickers.join(","));
        log::info!("⚙️  Theme: {} @ {} fps", self.theme, self.render_fps);
        match self.rpc_timeout {
            Some(t) => log::info!("⚙️  Transport timeout: {}ms", t.as_millis()),
            None => log::info!("⚙️  Transport timeout: none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_set() {
        let cfg = from_args(CliArgs::default()).unwrap();
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.render_fps, 20);
        assert_eq!(cfg.theme, Theme::Nord);
        assert_eq!(cfg.tickers, vec!["BTC", "ETH", "SOL", "LTC"]);
        assert!(cfg.rpc_timeout.is_none());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let args = CliArgs {
            rpc_url: Some("ws://node:9000".into()),
            ..Default::default()
        };
        assert!(from_args(args).is_err());
        assert!(validate_url("", "X").is_err());
        assert!(validate_url("https://node", "X").is_ok());
    }

    #[test]
    fn range_checks() {
        let args = CliArgs {
            render_fps: Some(0),
            ..Default::default()
        };
        assert!(from_args(args).is_err());

        let args = CliArgs {
            rpc_timeout_ms: Some(500),
            ..Default::default()
        };
        assert!(from_args(args).is_err());

        let args = CliArgs {
            rpc_timeout_ms: Some(2500),
            ..Default::default()
        };
        assert_eq!(
            from_args(args).unwrap().rpc_timeout,
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn tickers_are_normalized() {
        assert_eq!(parse_tickers(" btc, ETH,,btc ,sol"), vec!["BTC", "ETH", "SOL"]);
        let args = CliArgs {
            tickers: Some(" , ".into()),
            ..Default::default()
        };
        assert!(from_args(args).is_err());
    }
}
