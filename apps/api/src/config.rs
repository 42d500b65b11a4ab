use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::editing::visual_diff::{DEFAULT_DELETION_COLOR, DEFAULT_INSERTION_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Fs,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fs" | "file" => Ok(StoreBackend::Fs),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND must be 'fs' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; a missing API key only disables AI suggestions.
#[derive(Debug, Clone)]
pub struct Config {
    pub document_root: PathBuf,
    pub store_backend: StoreBackend,
    pub anthropic_api_key: Option<String>,
    pub deletion_color: String,
    pub insertion_color: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            document_root: env_or("DOCUMENT_ROOT", "./documents").into(),
            store_backend: env_or("STORE_BACKEND", "fs").parse()?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            deletion_color: color_env("DELETION_COLOR", DEFAULT_DELETION_COLOR)?,
            insertion_color: color_env("INSERTION_COLOR", DEFAULT_INSERTION_COLOR)?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn color_env(key: &str, default: &str) -> Result<String> {
    let value = env_or(key, default);
    if !is_hex_color(&value) {
        bail!("{key} must be a #RRGGBB color, got '{value}'");
    }
    Ok(value.to_ascii_uppercase())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
