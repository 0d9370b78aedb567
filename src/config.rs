use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xdg::BaseDirectories;

use crate::controller::ControllerOptions;

pub const APP_NAME: &str = "commentree";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 未設定時は $VISUAL → $EDITOR → vi
    pub editor: Option<String>,
    pub server: ServerConfig,
    pub comments: CommentsConfig,
    pub notifications: NotificationsConfig,
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// "load more" 1回あたりのトップレベル件数
    pub page_size: usize,
    /// インデントの最大段数（ツリー自体は切り詰めない）
    pub max_indent_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub comment: char,
    pub reply: char,
    pub delete: char,
    pub load_more: char,
    pub refresh: char,
    pub editor: char,
    pub toggle_replies: char,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            timeout_secs: 10,
        }
    }
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            max_indent_depth: 3,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { ttl_secs: 5 }
    }
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            comment: 'c',
            reply: 'r',
            delete: 'd',
            load_more: 'm',
            refresh: 'R',
            editor: 'e',
            toggle_replies: 'o',
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// ファイルが無ければデフォルト値
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// 0 を許さない設定値を補正する
    fn normalize(&mut self) {
        if self.comments.page_size == 0 {
            tracing::warn!("comments.page_size must be at least 1, using 1");
            self.comments.page_size = 1;
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        BaseDirectories::with_prefix(APP_NAME)
            .ok()
            .map(|dirs| dirs.get_config_home().join("config.toml"))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            page_size: self.comments.page_size.max(1),
            max_indent_depth: self.comments.max_indent_depth,
            notification_ttl: Duration::from_secs(self.notifications.ttl_secs),
        }
    }
}
