// ============================================================================
// IKAT headless client
// ============================================================================
//
// Usage examples:
//   ikat annotate                                  (random image from the server)
//   ikat annotate --image photo.jpg --script marks.txt
//   ikat annotate --offline --image photo.jpg --script marks.txt --dump --record
//   ikat hash photo.jpg
//   ikat init-config

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use ikat::backend::{AnnotationBackend, BackendError, HttpBackend, MemoryBackend};
use ikat::config::{AppConfig, ConfigError, LogLevel};
use ikat::constants::api;
use ikat::hash::content_hash;
use ikat::input::{ScriptError, ScriptedInput};
use ikat::render::DisplayList;
use ikat::{EditorError, LogNotifier, Session};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// IKAT headless annotation client.
#[derive(Parser, Debug)]
#[command(name = "ikat", version, about = "IKAT headless annotation client")]
struct Cli {
    /// Configuration file (default: <config dir>/ikat/ikat-config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load an image, replay scripted input and report the resulting annotation
    Annotate(AnnotateArgs),

    /// Print the content hash and image URL of a file
    Hash {
        /// Image file
        file: PathBuf,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    /// Upload this image instead of fetching a random one
    #[arg(short, long, value_name = "FILE", conflicts_with = "hash")]
    image: Option<PathBuf>,

    /// Open a stored image by content hash
    #[arg(long, value_name = "HASH")]
    hash: Option<String>,

    /// Input script, one event per line
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Server base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Use an in-process store instead of a server
    #[arg(long, requires = "image")]
    offline: bool,

    /// Print the display list of the final frame
    #[arg(long)]
    dump: bool,

    /// Print the annotation record as it would be saved
    #[arg(long)]
    record: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Load or save failure, already shown through the session's notifier
    #[error(transparent)]
    Session(#[from] EditorError),

    #[error("Cannot build annotation record: {0}")]
    Record(EditorError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Config file {0:?} already exists (use --force to overwrite)")]
    ConfigExists(PathBuf),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl CliError {
    /// Check whether the user has already seen this error.
    fn is_reported(&self) -> bool {
        matches!(self, CliError::Session(_))
    }
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    // init-config must work before any config file exists
    let loaded = match cli.command {
        Command::InitConfig { .. } => Ok(AppConfig::default()),
        _ => load_config(cli.config.as_deref()),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    apply_log_level(config.preferences.log_level);

    let result = match cli.command {
        Command::Annotate(args) => annotate(&config, args).await,
        Command::Hash { file } => print_hash(&config, &file),
        Command::InitConfig { force } => init_config(cli.config, force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

/// Install env_logger before the config is read, at the default level.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace")).init();
    apply_log_level(LogLevel::default());
}

/// Limit logging to the configured level. `RUST_LOG` takes precedence.
fn apply_log_level(level: LogLevel) {
    if std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_none() {
        log::set_max_level(level.to_level_filter());
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_from_path(path),
        None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Commands
// ============================================================================

async fn annotate(config: &AppConfig, args: AnnotateArgs) -> Result<(), CliError> {
    let editor = config.build_editor();
    if args.offline {
        let session = Session::new(editor, MemoryBackend::new(), LogNotifier);
        run_annotate(&session, &args).await
    } else {
        let base_url = args.server.as_deref().unwrap_or(&config.server.base_url);
        let session = Session::new(editor, HttpBackend::new(base_url)?, LogNotifier);
        run_annotate(&session, &args).await
    }
}

async fn run_annotate<B: AnnotationBackend>(
    session: &Session<B>,
    args: &AnnotateArgs,
) -> Result<(), CliError> {
    let mut script = match &args.script {
        Some(path) => {
            let bytes = read_file(path)?;
            ScriptedInput::parse(&String::from_utf8_lossy(&bytes))?
        }
        None => ScriptedInput::default(),
    };

    let size = if let Some(path) = &args.image {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        session.upload_image(&filename, read_file(path)?).await?
    } else if let Some(hash) = &args.hash {
        session.open_image(hash, true).await?
    } else {
        session.load_random_image(true).await?
    };
    println!("canvas: {}x{}", size.width, size.height);

    let applied = session.run(&mut script).await;
    log::debug!("Applied {} input events", applied);

    print_summary(session);

    if args.dump {
        let mut list = DisplayList::new();
        if session.render(&mut list) {
            for command in list.commands() {
                println!("{:?}", command);
            }
        }
    }

    if args.record {
        let record = session.editor().build_record().map_err(CliError::Record)?;
        println!("{}", record.to_json()?);
    }

    Ok(())
}

fn print_summary<B: AnnotationBackend>(session: &Session<B>) {
    let editor = session.editor();
    println!("image: {}", editor.image_hash().unwrap_or("-"));
    println!("mode: {} ({})", editor.mode().name(), editor.mode().hint());
    println!("subject points: {}", editor.subject_points().len());
    println!(
        "composition points: {} ({}{})",
        editor.composition_point_count(),
        editor.shape_type().name(),
        if editor.is_shape_auto() { ", auto" } else { "" }
    );
    println!("labels: {}", editor.labels().selected_labels().join(", "));
}

fn print_hash(config: &AppConfig, file: &Path) -> Result<(), CliError> {
    let hash = content_hash(&read_file(file)?);
    println!("{}", hash);
    println!(
        "{}{}",
        config.server.base_url.trim_end_matches('/'),
        api::image_url(&hash)
    );
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let path = path
        .or_else(AppConfig::default_path)
        .ok_or(CliError::NoConfigDir)?;
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path));
    }
    AppConfig::new().save_to_path(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_are_not_printed_twice() {
        assert!(CliError::Session(EditorError::NothingMarked).is_reported());
        assert!(!CliError::Record(EditorError::NothingMarked).is_reported());
        assert!(!CliError::NoConfigDir.is_reported());
    }

    #[test]
    fn test_record_error_message() {
        let err = CliError::Record(EditorError::NoImageLoaded);
        assert_eq!(
            err.to_string(),
            "Cannot build annotation record: Please load an image first"
        );
    }
}
