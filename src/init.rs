use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

use commentree::config::APP_NAME;

/// Default config.toml content
const DEFAULT_CONFIG: &str = r#"# Editor for composing comment bodies.
# Resolved in order: this value → $VISUAL → $EDITOR → vi
# Supports arguments: editor = "code --wait"
# editor = "vim"

[server]
# Base URL of the comments service (overridden by --server)
base_url = "http://127.0.0.1:5000"
timeout_secs = 10

[comments]
# Top-level comments revealed per "load more"
page_size = 5
# Replies deeper than this are drawn at the maximum indentation
max_indent_depth = 3

[notifications]
# Seconds before a notification hides itself
ttl_secs = 5

[keybindings]
comment = 'c'
reply = 'r'
delete = 'd'
load_more = 'm'
refresh = 'R'
editor = 'e'
# Collapse / expand the replies of the selected comment (Space also works)
toggle_replies = 'o'
"#;

/// Run the init command
pub fn run_init(force: bool) -> Result<()> {
    let base_dirs =
        BaseDirectories::with_prefix(APP_NAME).context("Failed to get config directory")?;
    let config_path = init_config_dir(&base_dirs.get_config_home(), force)?;

    println!();
    println!("Initialization complete!");
    println!("Edit {} to point ctree at your server.", config_path.display());

    Ok(())
}

/// `config_home` を作成し config.toml を書き出す
fn init_config_dir(config_home: &Path, force: bool) -> Result<PathBuf> {
    if !config_home.exists() {
        println!(
            "Creating configuration directory: {}",
            config_home.display()
        );
        fs::create_dir_all(config_home).context("Failed to create config directory")?;
    }

    let config_path = config_home.join("config.toml");
    write_file_if_needed(&config_path, DEFAULT_CONFIG, force, "config.toml")?;
    Ok(config_path)
}

/// Write a file if it doesn't exist or force is true
fn write_file_if_needed(path: &Path, content: &str, force: bool, name: &str) -> Result<()> {
    if path.exists() && !force {
        println!(
            "Skipping {} (already exists, use --force to overwrite)",
            name
        );
        return Ok(());
    }

    println!("Writing {}...", name);
    fs::write(path, content).with_context(|| format!("Failed to write {}", name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commentree::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_home = temp_dir.path().join(APP_NAME);

        let path = init_config_dir(&config_home, false).unwrap();

        assert_eq!(path, config_home.join("config.toml"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# editor = \"vim\""));
        assert!(content.contains("[server]"));
    }

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(config.editor, None);
        assert_eq!(config.server.base_url, defaults.server.base_url);
        assert_eq!(config.controller_options(), defaults.controller_options());
        assert_eq!(config.keybindings.load_more, defaults.keybindings.load_more);
    }

    #[test]
    fn test_init_skips_existing() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "custom = true").unwrap();

        init_config_dir(temp_dir.path(), false).unwrap();

        assert_eq!(fs::read_to_string(&config_path).unwrap(), "custom = true");
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "custom = true").unwrap();

        init_config_dir(temp_dir.path(), true).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[comments]"));
        assert!(!content.contains("custom = true"));
    }
}
