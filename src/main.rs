use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use pvj::app::App;
use pvj::config::Config;
use pvj::document::{DocumentSource, JsonDocument};
use pvj::error::AppResult;
use pvj::input::KeymapPreset;
use pvj::logging::init_file_logging;

/// Interactive terminal JSON viewer.
#[derive(Debug, Parser)]
#[command(name = "pvj", version)]
struct Cli {
    /// JSON file to open, or `-` to read standard input.
    file: OsString,

    /// Config file to load instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keymap preset (`default` or `emacs`).
    #[arg(long, value_name = "PRESET")]
    keymap: Option<String>,

    /// Log file to append to.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(preset) = &cli.keymap {
        config.keymap.preset = KeymapPreset::parse(preset).id().to_string();
    }

    let log_path = init_file_logging(&config.log, cli.log_file.as_deref())?;
    info!(log = %log_path.display(), "logging initialized");

    let document = JsonDocument::load(DocumentSource::from_arg(&cli.file))?;
    let mut app = App::new(document, config);
    app.run().await
}
