use crate::cli::{AskArgs, ConnectArgs, ServeArgs};
use crate::error::AskError;
use crate::handler::DEFAULT_MAX_RESULTS;
use crate::llm::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./sample.db";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub max_results: usize,
    pub request_timeout_secs: Option<u64>,
    pub listen: SocketAddr,
    pub verbose: bool,
    pub show_secrets: bool,
}

/// Where queries run.
#[derive(Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub read_only: bool,
}

/// Which model writes the SQL.
#[derive(Debug)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: SecretString,
    pub model: String,
    pub max_output_tokens: u32,
}

// --- TOML config file structs ---

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    profiles: HashMap<String, TomlProfile>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDefaults {
    max_results: Option<usize>,
    timeout: Option<u64>,
    verbose: Option<bool>,
    max_connections: Option<u32>,
    listen: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct TomlProfile {
    database_url: Option<String>,
    max_connections: Option<u32>,
    read_only: Option<bool>,
    model: Option<String>,
    api_key: Option<String>,
    api_key_env: Option<String>,
    api_base: Option<String>,
    max_output_tokens: Option<u32>,
}

/// Config path resolution result: explicit paths must exist, the platform
/// default may not.
struct ResolvedConfigPath {
    path: PathBuf,
    explicit: bool,
}

/// Resolve the config file path: --config flag > env var > platform default.
fn resolve_config_path(cli_config: Option<&PathBuf>) -> Option<ResolvedConfigPath> {
    if let Some(path) = cli_config {
        return Some(ResolvedConfigPath { path: path.clone(), explicit: true });
    }
    if let Some(path) = env_non_empty("ASKDB_CONFIG") {
        return Some(ResolvedConfigPath { path: PathBuf::from(path), explicit: true });
    }
    ProjectDirs::from("", "", "askdb").map(|dirs| ResolvedConfigPath {
        path: dirs.config_dir().join("config.toml"),
        explicit: false,
    })
}

fn load_toml_config(resolved: Option<&ResolvedConfigPath>) -> Result<TomlConfig, AskError> {
    let resolved = match resolved {
        Some(r) => r,
        None => return Ok(TomlConfig::default()),
    };

    if !resolved.path.exists() {
        if resolved.explicit {
            return Err(AskError::Config {
                message: format!("config file not found: {}", resolved.path.display()),
            });
        }
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&resolved.path).map_err(|e| AskError::Config {
        message: format!("cannot read config file {}: {}", resolved.path.display(), e),
    })?;

    toml::from_str(&content).map_err(|e| AskError::Config {
        message: format!("invalid config file {}: {}", resolved.path.display(), e),
    })
}

/// `Some(s)` only when `s` is non-empty.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Read an environment variable, treating empty as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve a secret from a direct value, env indirection, or fallback env var.
fn resolve_secret(
    direct: Option<&str>,
    env_key: Option<&str>,
    fallback_env: &str,
) -> Option<SecretString> {
    if let Some(val) = non_empty(direct) {
        return Some(SecretString::from(val.to_string()));
    }
    // api_key_env = "MY_GEMINI_KEY"
    if let Some(val) = non_empty(env_key).and_then(env_non_empty) {
        return Some(SecretString::from(val));
    }
    env_non_empty(fallback_env).map(SecretString::from)
}

fn load_profile(toml_config: &TomlConfig, name: Option<&String>) -> Result<TomlProfile, AskError> {
    let profile = name
        .map(|name| {
            toml_config.profiles.get(name).cloned().ok_or_else(|| AskError::Config {
                message: format!("profile '{}' not found in config file", name),
            })
        })
        .transpose()?;
    Ok(profile.unwrap_or_default())
}

fn resolve_database(
    args: &ConnectArgs,
    profile: &TomlProfile,
    toml_config: &TomlConfig,
) -> DatabaseConfig {
    let url = non_empty(args.database_url.as_deref())
        .or(profile.database_url.as_deref())
        .unwrap_or(DEFAULT_DATABASE_URL)
        .to_string();

    let max_connections = args
        .max_connections
        .or(profile.max_connections)
        .or(toml_config.defaults.max_connections)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    DatabaseConfig {
        url,
        max_connections,
        read_only: args.read_only || profile.read_only.unwrap_or(false),
    }
}

fn resolve_llm(args: &ConnectArgs, profile: &TomlProfile) -> Result<LlmConfig, AskError> {
    let api_key = resolve_secret(
        args.api_key.as_deref(),
        profile.api_key_env.as_deref(),
        "GEMINI_API_KEY",
    )
    .or_else(|| {
        non_empty(profile.api_key.as_deref()).map(|k| SecretString::from(k.to_string()))
    })
    .ok_or_else(|| AskError::Config {
        message: "no API key specified — set GEMINI_API_KEY or use --api-key".to_string(),
    })?;

    let model = non_empty(args.model.as_deref())
        .or(profile.model.as_deref())
        .unwrap_or(DEFAULT_MODEL)
        .to_string();

    let api_base = non_empty(args.api_base.as_deref())
        .or(profile.api_base.as_deref())
        .unwrap_or(DEFAULT_API_BASE)
        .to_string();

    Ok(LlmConfig {
        api_base,
        api_key,
        model,
        max_output_tokens: profile.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
    })
}

fn resolve_listen(cli: Option<SocketAddr>, toml_config: &TomlConfig) -> Result<SocketAddr, AskError> {
    if let Some(addr) = cli {
        return Ok(addr);
    }
    let raw = toml_config.defaults.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
    raw.parse().map_err(|e| AskError::Config {
        message: format!("invalid listen address '{}': {}", raw, e),
    })
}

/// Build AppConfig for the `serve` subcommand.
pub fn load_from_serve_args(
    args: &ServeArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, AskError> {
    let resolved_path = resolve_config_path(config_path);
    let toml_config = load_toml_config(resolved_path.as_ref())?;
    let profile = load_profile(&toml_config, args.connect.profile.as_ref())?;

    let database = resolve_database(&args.connect, &profile, &toml_config);
    let llm = resolve_llm(&args.connect, &profile)?;

    // timeout: --no-timeout > CLI/ENV > TOML > 120
    let request_timeout_secs = if args.no_timeout {
        None
    } else {
        Some(
            args.timeout
                .unwrap_or_else(|| toml_config.defaults.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        )
    };

    Ok(AppConfig {
        database,
        llm,
        max_results: toml_config.defaults.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        request_timeout_secs,
        listen: resolve_listen(args.listen, &toml_config)?,
        verbose: verbose || toml_config.defaults.verbose.unwrap_or(false),
        show_secrets,
    })
}

/// Build AppConfig for the `ask` subcommand.
pub fn load_from_ask_args(
    args: &AskArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, AskError> {
    let resolved_path = resolve_config_path(config_path);
    let toml_config = load_toml_config(resolved_path.as_ref())?;
    let profile = load_profile(&toml_config, args.connect.profile.as_ref())?;

    let database = resolve_database(&args.connect, &profile, &toml_config);
    let llm = resolve_llm(&args.connect, &profile)?;

    // max_results: CLI/ENV > TOML > 200
    let max_results = args
        .max_results
        .unwrap_or_else(|| toml_config.defaults.max_results.unwrap_or(DEFAULT_MAX_RESULTS));

    Ok(AppConfig {
        database,
        llm,
        max_results,
        request_timeout_secs: toml_config.defaults.timeout,
        listen: resolve_listen(None, &toml_config)?,
        verbose: verbose || toml_config.defaults.verbose.unwrap_or(false),
        show_secrets,
    })
}
