use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    #[serde(default)]
    pub owners: OwnersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8081, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: true,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }

/// Downstream dependency endpoints and the shared HTTP client policy.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_people_url")]
    pub people_service_url: String,
    #[serde(default = "default_pets_url")]
    pub pets_service_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Extra attempts for idempotent requests. POST is never retried.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            people_service_url: default_people_url(),
            pets_service_url: default_pets_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_count: default_retry_count(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            pool_max_idle_per_host: default_pool_max_idle(),
            pool_idle_timeout_secs: default_pool_idle_timeout(),
        }
    }
}

fn default_people_url() -> String { "http://people-service:8084".into() }
fn default_pets_url() -> String { "http://pets-service:8085".into() }
fn default_timeout_ms() -> u64 { 5_000 }
fn default_connect_timeout_ms() -> u64 { 2_000 }
fn default_retry_count() -> u32 { 1 }
fn default_backoff_base_ms() -> u64 { 100 }
fn default_backoff_max_ms() -> u64 { 2_000 }
fn default_pool_max_idle() -> usize { 32 }
fn default_pool_idle_timeout() -> u64 { 90 }

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u64,
    #[serde(default = "default_recovery_timeout")]
    pub recovery_timeout_secs: u64,
    #[serde(default = "default_half_open_calls")]
    pub half_open_max_calls: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout(),
            half_open_max_calls: default_half_open_calls(),
        }
    }
}

fn default_failure_threshold() -> u64 { 5 }
fn default_recovery_timeout() -> u64 { 30 }
fn default_half_open_calls() -> u64 { 1 }

impl CircuitBreakerConfig {
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.recovery_timeout_secs)
    }
}

/// What to do when the people service cannot record the person twin of a new owner.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonSyncPolicy {
    /// Reject the owner and persist nothing.
    #[default]
    Strict,
    /// Persist the owner flagged as unsynced and retry in the background.
    Deferred,
}

impl std::str::FromStr for PersonSyncPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "deferred" => Ok(Self::Deferred),
            other => Err(anyhow!("unknown person sync policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnersConfig {
    #[serde(default)]
    pub person_sync: PersonSyncPolicy,
    #[serde(default = "default_sync_attempts")]
    pub sync_max_attempts: u32,
    #[serde(default = "default_sync_backoff_base_ms")]
    pub sync_backoff_base_ms: u64,
    #[serde(default = "default_sync_backoff_max_ms")]
    pub sync_backoff_max_ms: u64,
    /// Zero disables the pet type cache; every listing then hits the pets service.
    #[serde(default)]
    pub pet_types_cache_ttl_secs: u64,
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            person_sync: PersonSyncPolicy::default(),
            sync_max_attempts: default_sync_attempts(),
            sync_backoff_base_ms: default_sync_backoff_base_ms(),
            sync_backoff_max_ms: default_sync_backoff_max_ms(),
            pet_types_cache_ttl_secs: 0,
        }
    }
}

fn default_sync_attempts() -> u32 { 8 }
fn default_sync_backoff_base_ms() -> u64 { 500 }
fn default_sync_backoff_max_ms() -> u64 { 30_000 }

impl OwnersConfig {
    pub fn sync_backoff_base(&self) -> Duration {
        Duration::from_millis(self.sync_backoff_base_ms)
    }

    pub fn sync_backoff_max(&self) -> Duration {
        Duration::from_millis(self.sync_backoff_max_ms)
    }

    pub fn pet_types_cache_ttl(&self) -> Option<Duration> {
        (self.pet_types_cache_ttl_secs > 0).then(|| Duration::from_secs(self.pet_types_cache_ttl_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_log_format() -> String { "compact".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, built-in defaults otherwise; then env overrides and validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment values. The lookup is injected so tests avoid process-global state.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| anyhow!("SERVER_PORT 不是合法端口: {port}"))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            if self.database.url.trim().is_empty() {
                self.database.url = url;
            }
        }
        if let Some(url) = lookup("PEOPLE_SERVICE_URL") {
            self.remote.people_service_url = url;
        }
        if let Some(url) = lookup("PETS_SERVICE_URL") {
            self.remote.pets_service_url = url;
        }
        if let Some(ms) = lookup("REMOTE_TIMEOUT_MS") {
            self.remote.timeout_ms = ms.parse().map_err(|_| anyhow!("REMOTE_TIMEOUT_MS 必须为整数毫秒: {ms}"))?;
        }
        if let Some(n) = lookup("REMOTE_RETRY_COUNT") {
            self.remote.retry_count = n.parse().map_err(|_| anyhow!("REMOTE_RETRY_COUNT 必须为非负整数: {n}"))?;
        }
        if let Some(policy) = lookup("PERSON_SYNC_POLICY") {
            self.owners.person_sync = policy.parse()?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.validate()?;
        self.remote.normalize_and_validate()?;
        self.circuit_breaker.validate()?;
        self.owners.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::Memory {
            return Ok(());
        }
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url 为空；请在 config.toml 或环境变量 DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url 必须以 postgresql:// 或 postgres:// 开头"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections 必须 >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database 超时配置必须为正整数秒"));
        }
        Ok(())
    }
}

impl RemoteConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        for (name, url) in [
            ("remote.people_service_url", &mut self.people_service_url),
            ("remote.pets_service_url", &mut self.pets_service_url),
        ] {
            let trimmed = url.trim().trim_end_matches('/').to_string();
            let lower = trimmed.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("{name} 必须以 http:// 或 https:// 开头"));
            }
            *url = trimmed;
        }
        if self.timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(anyhow!("remote 超时配置必须为正整数毫秒"));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(anyhow!("remote.backoff_max_ms 必须 >= backoff_base_ms"));
        }
        Ok(())
    }
}

impl CircuitBreakerConfig {
    fn validate(&self) -> Result<()> {
        if self.enabled && (self.failure_threshold == 0 || self.half_open_max_calls == 0) {
            return Err(anyhow!("circuit_breaker 阈值必须 >= 1"));
        }
        Ok(())
    }
}

impl OwnersConfig {
    fn validate(&self) -> Result<()> {
        if self.sync_max_attempts == 0 {
            return Err(anyhow!("owners.sync_max_attempts 必须 >= 1"));
        }
        Ok(())
    }
}
