use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Optional settings file. Every field can also come from the environment
/// (`NOTION_API_TOKEN`, `NOTION_DATABASE_ID`), which takes precedence.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_token: Option<String>,
    pub database_id: Option<String>,
}

/// Fully resolved credentials, ready for the API client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_token: String,
    pub database_id: String,
}

impl Config {
    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Resolve credentials: a CLI override wins over the environment, which
    /// wins over the config file. Missing values are reported before any
    /// network call is made.
    pub fn resolve(self, database_id_override: Option<String>) -> Result<Credentials> {
        let api_token = env::var("NOTION_API_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .or(self.api_token)
            .context("no Notion API token; set NOTION_API_TOKEN or api_token in the config file")?;
        let database_id = database_id_override
            .or_else(|| env::var("NOTION_DATABASE_ID").ok().filter(|v| !v.is_empty()))
            .or(self.database_id)
            .context(
                "no database id; pass --database-id, set NOTION_DATABASE_ID, \
                 or set database_id in the config file",
            )?;
        Ok(Credentials {
            api_token,
            database_id,
        })
    }
}
