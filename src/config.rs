use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;
const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub scanner: ScannerConfig,
    /// Surface a non-zero scanner exit as a terminal error frame.
    pub report_scanner_exit: bool,
    pub keep_alive: Duration,
    pub static_dir: Option<PathBuf>,
}

/// How to launch the external scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub program: String,
    /// Placed before the fixed flags, e.g. the script path when `program` is an interpreter.
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub max_line_bytes: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            program: "sherlock".to_string(),
            args: Vec::new(),
            workdir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            scanner: ScannerConfig::default(),
            report_scanner_exit: true,
            keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            static_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset keys take their
    /// defaults; unparseable values are logged and also fall back.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let scanner = ScannerConfig {
            program: get_or_default(&get, "SCANNER_PROGRAM", "sherlock"),
            args: get("SCANNER_ARGS")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            workdir: get("SCANNER_WORKDIR").map(PathBuf::from),
            timeout_secs: parse_positive(&get, "SCANNER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            max_line_bytes: parse_positive(&get, "MAX_LINE_BYTES", DEFAULT_MAX_LINE_BYTES),
        };

        Config {
            host: get_or_default(&get, "HOST", "0.0.0.0"),
            port: parse_or_default(&get, "PORT", DEFAULT_PORT),
            scanner,
            report_scanner_exit: parse_flag(&get, "REPORT_SCANNER_EXIT", true),
            keep_alive: Duration::from_secs(parse_positive(
                &get,
                "SSE_KEEP_ALIVE_SECS",
                DEFAULT_KEEP_ALIVE_SECS,
            )),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        }
    }
}

fn get_or_default(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get(key).unwrap_or_else(|| default.to_string())
}

fn parse_or_default<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("invalid value {raw:?} for {key}, using default");
            default
        }),
        None => default,
    }
}

fn parse_positive<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy,
{
    let value = parse_or_default(get, key, default);
    if value > T::default() {
        value
    } else {
        log::warn!("{key} must be positive, using default");
        default
    }
}

fn parse_flag(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            log::warn!("invalid value {v:?} for {key}, using default");
            default
        }
        None => default,
    }
}
