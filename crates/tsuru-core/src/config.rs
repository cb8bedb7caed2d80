//! Client configuration.
//!
//! The target (the tsuru server base URL) comes from the `--target` flag or
//! `TSURU_TARGET`, falling back to `~/.tsuru_target`. The session token lives
//! in `~/.tsuru_token` unless `TSURU_TOKEN` overrides it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// File holding the selected target, relative to the home directory
const TARGET_FILE: &str = ".tsuru_target";

/// File holding the session token, relative to the home directory
const TOKEN_FILE: &str = ".tsuru_token";

/// Environment variable overriding the stored session token
pub const TOKEN_ENV: &str = "TSURU_TOKEN";

/// Environment variable selecting the target
pub const TARGET_ENV: &str = "TSURU_TARGET";

#[derive(Debug, Clone)]
pub struct Config {
    target: String,
    home: PathBuf,
    token_override: Option<String>,
}

impl Config {
    /// Resolve configuration for this invocation.
    ///
    /// `target` is the already-resolved flag/env value, if any.
    pub fn load(target: Option<String>) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;

        let target = match target.filter(|t| !t.trim().is_empty()) {
            Some(t) => t,
            None => Self::read_target_file(&home)?,
        };

        let token_override = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty());

        let config = Self::new(&target, home).with_token_override(token_override);
        debug!(server = %config.target, "Configuration loaded");
        Ok(config)
    }

    pub fn new(target: &str, home: PathBuf) -> Self {
        Self {
            target: normalize_target(target),
            home,
            token_override: None,
        }
    }

    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        self.token_override = token;
        self
    }

    fn read_target_file(home: &Path) -> Result<String> {
        let path = home.join(TARGET_FILE);
        if !path.exists() {
            anyhow::bail!(
                "You have not selected any target. Set {} or write the server URL to {}",
                TARGET_ENV,
                path.display()
            );
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read target file {}", path.display()))?;
        let target = contents.trim();
        if target.is_empty() {
            anyhow::bail!("Target file {} is empty", path.display());
        }
        Ok(target.to_string())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn token_path(&self) -> PathBuf {
        self.home.join(TOKEN_FILE)
    }

    pub fn token_override(&self) -> Option<&str> {
        self.token_override.as_deref()
    }
}

/// Prepend `http://` when the target has no scheme and drop trailing slashes.
fn normalize_target(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
