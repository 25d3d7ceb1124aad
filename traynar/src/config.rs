use crate::theme::ThemeMode;
use anyhow::{anyhow, Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "http://server.eba-rptzmmzd.us-east-1.elasticbeanstalk.com";
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Application configuration, built once at the root and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Scheme and host of the authentication API, without trailing slash
    pub api_host: String,
    pub login_timeout: Duration,
    pub signup_timeout: Duration,
    pub theme: ThemeMode,
    /// Pre-filled country code on the signup form
    pub default_country_code: String,
    pub mock_delays: MockDelays,
}

/// Fixed delays the mock services wait before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelays {
    pub transcription: Duration,
    pub evaluation: Duration,
    pub history: Duration,
}

impl Default for MockDelays {
    fn default() -> Self {
        MockDelays {
            transcription: Duration::from_millis(3000),
            evaluation: Duration::from_millis(2000),
            history: Duration::from_millis(1000),
        }
    }
}

impl MockDelays {
    /// Same delay for every mock service; tests use `MockDelays::uniform(Duration::ZERO)`
    pub fn uniform(delay: Duration) -> Self {
        MockDelays {
            transcription: delay,
            evaluation: delay,
            history: delay,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_host: DEFAULT_API_HOST.to_string(),
            login_timeout: Duration::from_millis(15_000),
            signup_timeout: Duration::from_millis(12_000),
            theme: ThemeMode::Light,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            mock_delays: MockDelays::default(),
        }
    }
}

impl Config {
    /// Defaults, overridden by any `TRAYNAR_*` environment variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, but reading variables through the given lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(host) = lookup("TRAYNAR_API_HOST") {
            config = config.with_api_host(&host)?;
        }
        if let Some(ms) = lookup("TRAYNAR_LOGIN_TIMEOUT_MS") {
            config.login_timeout = parse_millis("TRAYNAR_LOGIN_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("TRAYNAR_SIGNUP_TIMEOUT_MS") {
            config.signup_timeout = parse_millis("TRAYNAR_SIGNUP_TIMEOUT_MS", &ms)?;
        }
        if let Some(theme) = lookup("TRAYNAR_THEME") {
            config.theme = ThemeMode::from_str(&theme)?;
        }
        if let Some(code) = lookup("TRAYNAR_COUNTRY_CODE") {
            config.default_country_code = code.trim().to_string();
        }
        if let Some(ms) = lookup("TRAYNAR_MOCK_DELAY_MS") {
            config.mock_delays = MockDelays::uniform(parse_millis("TRAYNAR_MOCK_DELAY_MS", &ms)?);
        }
        log::debug!("config loaded: {:?}", config);
        Ok(config)
    }

    pub fn with_api_host(mut self, host: &str) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(anyhow!("API host must start with http:// or https://: {}", host));
        }
        self.api_host = host.to_string();
        Ok(self)
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of milliseconds, got {raw:?}"))?;
    Ok(Duration::from_millis(ms))
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.login_timeout, Duration::from_secs(15));
    assert_eq!(config.signup_timeout, Duration::from_secs(12));
    assert_eq!(config.default_country_code, "+91");
    assert_eq!(config.theme, ThemeMode::Light);
}

#[test]
fn test_config_from_lookup() {
    let config = Config::from_lookup(|key| match key {
        "TRAYNAR_API_HOST" => Some("http://localhost:8080/".to_string()),
        "TRAYNAR_LOGIN_TIMEOUT_MS" => Some("250".to_string()),
        "TRAYNAR_THEME" => Some("auto".to_string()),
        "TRAYNAR_MOCK_DELAY_MS" => Some("0".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.api_host, "http://localhost:8080");
    assert_eq!(config.login_timeout, Duration::from_millis(250));
    assert_eq!(config.signup_timeout, Duration::from_secs(12));
    assert_eq!(config.theme, ThemeMode::Auto);
    assert_eq!(config.mock_delays, MockDelays::uniform(Duration::ZERO));

    assert!(Config::from_lookup(|key| match key {
        "TRAYNAR_SIGNUP_TIMEOUT_MS" => Some("soon".to_string()),
        _ => None,
    })
    .is_err());
    assert!(Config::default().with_api_host("localhost:8080").is_err());
}
