use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use commentree::api::{ApiClient, CommentsApi, HttpCommentsApi};
use commentree::config::{Config, APP_NAME};
use commentree::headless::{self, RenderFormat};

mod app;
mod editor;
mod init;
mod ui;

#[derive(Parser, Debug)]
#[command(name = "ctree")]
#[command(about = "TUI for nested comment threads")]
#[command(version)]
struct Args {
    /// Comments server base URL (overrides [server] base_url)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Top-level comments revealed per "load more"
    #[arg(long, global = true)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch comments once and print them (no TUI)
    Render {
        /// Print the forest as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Number of top-level comments to include (default: page size)
        #[arg(long)]
        visible: Option<usize>,
    },
    /// Write a default config file to ~/.config/commentree/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// ログは TUI と干渉しないようキャッシュディレクトリのファイルへ出力する
fn init_logging() -> Result<()> {
    let base_dirs =
        xdg::BaseDirectories::with_prefix(APP_NAME).context("Failed to get cache directory")?;
    let cache_home = base_dirs.get_cache_home();
    fs::create_dir_all(&cache_home).context("Failed to create cache directory")?;
    let log_file =
        File::create(cache_home.join("ctree.log")).context("Failed to create log file")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", APP_NAME)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(page_size) = args.page_size {
        config.comments.page_size = page_size.max(1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Command::Init { force }) = args.command {
        return init::run_init(force);
    }

    if let Err(e) = init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let mut config = Config::load()?;
    apply_overrides(&mut config, &args);
    tracing::info!(server = %config.server.base_url, "starting");

    let client = ApiClient::new(&config.server.base_url, config.server.timeout())?;
    let api: Arc<dyn CommentsApi> = Arc::new(HttpCommentsApi::new(client));

    match args.command {
        Some(Command::Render { json, visible }) => {
            let format = if json {
                RenderFormat::Json
            } else {
                RenderFormat::Html
            };
            headless::run_render(api.as_ref(), config.controller_options(), visible, format).await
        }
        _ => {
            let mut app = app::App::new(config, api);
            app.run().await
        }
    }
}
