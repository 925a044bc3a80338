//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `CLASSNOTES_WORK_DIR`, `CLASSNOTES_LOG_LEVEL` and
//! `CLASSNOTES_BIND` env overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bootstrap::logger::parse_level;
use crate::core::error::AppError;

use super::raw::RawConfig;
use super::types::*;

/// Values that take precedence over whatever the TOML says.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub work_dir: Option<String>,
    pub log_level: Option<String>,
    pub bind: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            work_dir: env::var("CLASSNOTES_WORK_DIR").ok(),
            log_level: env::var("CLASSNOTES_LOG_LEVEL").ok(),
            bind: env::var("CLASSNOTES_BIND").ok(),
        }
    }
}

/// Deep-merge two TOML values.
/// Tables are merged recursively, so an overlay only needs the keys that
/// differ from its base. Any other value type in the overlay replaces the
/// base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// merged `toml::Value`. `visited` holds canonicalized paths already seen in
/// this chain so circular references are caught.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base_str = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str());

    match base_str {
        Some(base_str) => {
            let base_path = if Path::new(base_str).is_absolute() {
                PathBuf::from(base_str)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(base_str)
            };
            let base_val = load_raw_merged(&base_path, visited)?;
            Ok(merge_toml(base_val, overlay_val))
        }
        None => Ok(overlay_val),
    }
}

/// Load config from the given path, or `config/default.toml` when present,
/// then apply env-var overrides. With neither, built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        let cfg = resolve(RawConfig::default(), &overrides);
        validate(&cfg)?;
        Ok(cfg)
    }
}

/// Load from an explicit path with explicit overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    let cfg = resolve(parsed, overrides);
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), AppError> {
    parse_level(&cfg.log_level)
        .map_err(|e| AppError::Config(format!("server.log_level: {e}")))?;
    if cfg.ingest.chunk_size == 0 {
        return Err(AppError::Config("ingest.chunk_size must be > 0".into()));
    }
    if cfg.ingest.allowed_extension.trim_start_matches('.').is_empty() {
        return Err(AppError::Config("ingest.allowed_extension must not be empty".into()));
    }
    if cfg.embedding.hashing.dimension == 0 {
        return Err(AppError::Config("embedding.hashing.dimension must be > 0".into()));
    }
    if cfg.embedding.openai.max_batch_size == 0 {
        return Err(AppError::Config("embedding.openai.max_batch_size must be > 0".into()));
    }
    Ok(())
}

fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Config {
    let s = parsed.server;

    let work_dir = expand_home(overrides.work_dir.as_deref().unwrap_or(&s.work_dir));
    let log_level = overrides.log_level.clone().unwrap_or(s.log_level);
    let bind = overrides.bind.clone().unwrap_or(s.bind);
    let log_file = s.log_file.map(|p| {
        let p = expand_home(&p);
        if p.is_absolute() { p } else { work_dir.join(p) }
    });

    Config {
        name: s.name,
        work_dir,
        log_level,
        log_file,
        http: HttpConfig {
            bind,
            cors_permissive: s.cors_permissive,
        },
        ingest: IngestConfig {
            chunk_size: parsed.ingest.chunk_size,
            allowed_extension: parsed
                .ingest
                .allowed_extension
                .trim_start_matches('.')
                .to_ascii_lowercase(),
            max_upload_bytes: parsed.ingest.max_upload_bytes,
        },
        query: QueryConfig {
            default_k: parsed.query.default_k.max(1),
            preview_limit: parsed.query.preview_limit,
            prompt_template: parsed.query.prompt_template.as_deref().map(expand_home),
        },
        embedding: EmbeddingConfig {
            provider: parsed.embedding.provider,
            openai: OpenAiEmbeddingConfig {
                api_base_url: parsed.embedding.openai.api_base_url,
                model: parsed.embedding.openai.model,
                dimension: parsed.embedding.openai.dimension,
                timeout_seconds: parsed.embedding.openai.timeout_seconds,
                max_batch_size: parsed.embedding.openai.max_batch_size,
            },
            hashing: HashingEmbeddingConfig {
                dimension: parsed.embedding.hashing.dimension,
            },
        },
        embedding_api_key: env::var("EMBEDDING_API_KEY").ok().filter(|k| !k.is_empty()),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Built-in configuration rooted at `work_dir`: hashing embedder, dummy LLM,
/// no API keys.
pub fn defaults_at(work_dir: &Path) -> Config {
    let overrides = EnvOverrides {
        work_dir: Some(work_dir.display().to_string()),
        ..EnvOverrides::default()
    };
    let mut cfg = resolve(RawConfig::default(), &overrides);
    cfg.llm_api_key = None;
    cfg.embedding_api_key = None;
    cfg
}
