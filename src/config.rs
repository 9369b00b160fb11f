use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LishConfig {
    pub prompt: PromptConfig,
    pub history: HistoryConfig,
    /// Leading-word rewrites, `ll = "ls -l"`.
    pub aliases: HashMap<String, String>,
    /// Initial session variables.
    pub env: HashMap<String, String>,
    /// Script sourced into the session at startup.
    pub rc: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Placeholders: `{user}`, `{host}`, `{cwd}`, `{status}`.
    pub format: String,
    pub show_time: bool,
    pub show_status: bool,
    pub color: bool,
    /// Lines running longer than this report their duration; 0 never does.
    pub slow_command_ms: u64,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            format: "[{user}@{host} {cwd}]{status}$ ".to_string(),
            show_time: false,
            show_status: true,
            color: true,
            slow_command_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub file: Option<PathBuf>,
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: None,
            max_size: 1000,
        }
    }
}

impl HistoryConfig {
    pub fn path(&self) -> PathBuf {
        match &self.file {
            Some(file) => expand_home(file),
            None => home_dir().join(".lish_history"),
        }
    }
}

pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// `~` and `~/rest` resolve against the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// `--config`, else `$LISH_CONFIG`, else `~/.lish/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    env::var_os("LISH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".lish").join("config.toml"))
}

impl LishConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse lish config")
    }

    /// A missing file yields the defaults; an explicit path must exist.
    pub fn load(explicit: Option<&Path>, env_dir: &Path) -> Result<Self> {
        let path = config_path(explicit);
        let mut config = if path.exists() || explicit.is_some() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            debug!("loaded config from {}", path.display());
            Self::parse(&content).with_context(|| format!("in {}", path.display()))?
        } else {
            debug!("no config at {}, using defaults", path.display());
            Self::default()
        };
        config.merge_dotenv(env_dir)?;
        Ok(config)
    }

    /// `.env` (or `.env.$LISH_ENV`) in `dir` overrides `[env]`.
    pub fn merge_dotenv(&mut self, dir: &Path) -> Result<()> {
        let env_filename = env::var("LISH_ENV")
            .map(|v| format!(".env.{}", v))
            .unwrap_or_else(|_| ".env".to_string());
        let env_path = dir.join(&env_filename);
        if !env_path.exists() {
            return Ok(());
        }

        debug!("merging environment from {}", env_path.display());
        for item in dotenvy::from_path_iter(&env_path)
            .with_context(|| format!("Failed to read {}", env_filename))?
        {
            let (key, val) = item.with_context(|| format!("Malformed line in {}", env_filename))?;
            self.env.insert(key, val);
        }
        Ok(())
    }
}

impl PromptConfig {
    pub fn render(&self, last_status: i32) -> String {
        let cwd = env::current_dir()
            .map(|dir| shorten_home(&dir))
            .unwrap_or_else(|_| "?".to_string());
        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "user".to_string());
        let host = hostname();
        let status = if self.show_status && last_status != 0 {
            format!(" {}", last_status)
        } else {
            String::new()
        };

        let (user, host, cwd, status) = if self.color {
            (
                user.green().to_string(),
                host.green().to_string(),
                cwd.blue().bold().to_string(),
                status.red().to_string(),
            )
        } else {
            (user, host, cwd, status)
        };

        let mut prompt = self
            .format
            .replace("{user}", &user)
            .replace("{host}", &host)
            .replace("{cwd}", &cwd)
            .replace("{status}", &status);
        if self.show_time {
            prompt = format!("{} {}", Local::now().format("%H:%M:%S"), prompt);
        }
        prompt
    }
}

fn shorten_home(dir: &Path) -> String {
    match dir.strip_prefix(home_dir()) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => dir.display().to_string(),
    }
}

fn hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
