use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Wire protocol constants — must match what UI clients expect
pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_PORT: u16 = 18620;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const HANDSHAKE_TIMEOUT_MS: u64 = 10_000; // close if client doesn't auth in 10s
pub const MAX_PAYLOAD_BYTES: usize = 262_144; // largest accepted WS text frame

/// Scheduler scan cadence. The engine wakes this often to find due jobs.
pub const DEFAULT_TICK_SECS: u64 = 30;

/// Top-level config (cronkite.toml + CRONKITE_* env overrides).
///
/// Env keys use `__` as the section separator, e.g. `CRONKITE_GATEWAY__PORT`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CronkiteConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Where the job file lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-job scans.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Start the periodic scheduler when the daemon boots (default: true).
    #[serde(default = "bool_true")]
    pub start_on_launch: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
            start_on_launch: true,
        }
    }
}

/// Process execution limits. No timeout unless one is configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

/// Token auth is on out of the box — the control surface can run arbitrary
/// commands, so even the loopback default asks for the shared token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default = "default_token")]
    pub token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Token,
            token: default_token(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    #[default]
    Token,
    None,
}

fn bool_true() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}
fn default_store_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronkite/cronjobs.json", home)
}
fn default_token() -> Option<String> {
    Some("change-me".to_string())
}

impl CronkiteConfig {
    /// Load config from a TOML file with CRONKITE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. $CRONKITE_CONFIG
    ///   3. ~/.cronkite/cronkite.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("CRONKITE_CONFIG").ok())
            .unwrap_or_else(default_config_path);
        tracing::debug!(%path, "loading config");

        let config: CronkiteConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CRONKITE_").split("__"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronkite/cronkite.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = CronkiteConfig::default();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.scheduler.tick_secs, 30);
        assert!(cfg.scheduler.start_on_launch);
        assert!(cfg.exec.timeout_secs.is_none());
        assert!(cfg.store.path.ends_with("cronjobs.json"));
        assert_eq!(cfg.gateway.auth.mode, AuthMode::Token);
        assert_eq!(cfg.gateway.auth.token.as_deref(), Some("change-me"));
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: CronkiteConfig = Figment::new()
            .merge(Toml::string(""))
            .extract()
            .unwrap();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.gateway.auth.mode, AuthMode::Token);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let toml = r#"
            [gateway]
            port = 9000

            [gateway.auth]
            mode = "none"

            [scheduler]
            tick_secs = 5
        "#;
        let cfg: CronkiteConfig = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .unwrap();
        assert_eq!(cfg.gateway.port, 9000);
        assert_eq!(cfg.gateway.bind, DEFAULT_BIND);
        assert_eq!(cfg.gateway.auth.mode, AuthMode::None);
        assert_eq!(cfg.scheduler.tick_secs, 5);
        assert!(cfg.scheduler.start_on_launch);
        assert!(cfg.store.path.ends_with("cronjobs.json"));
    }

    #[test]
    fn exec_timeout_parses() {
        let toml = r#"
            [gateway]
            [gateway.auth]
            mode = "token"
            token = "t"

            [exec]
            timeout_secs = 120
        "#;
        let cfg: CronkiteConfig = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .unwrap();
        assert_eq!(cfg.exec.timeout_secs, Some(120));
    }
}
