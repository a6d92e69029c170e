//! Sarah Bot — service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Init logger once at the effective level (CLI `-v` flags > env > config)
//!   5. Prepare work dir, interaction log, and rate-sheet generator
//!   6. Serve the HTTP channel until Ctrl-C

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use sarah_bot::bootstrap::logger;
use sarah_bot::core::{config, error::AppError};
use sarah_bot::subsystems::agents::chat::ChatService;
use sarah_bot::subsystems::comms::AxumChannel;
use sarah_bot::subsystems::documents::RateSheetGenerator;
use sarah_bot::subsystems::knowledge::KnowledgeBase;
use sarah_bot::subsystems::memory::InteractionLog;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.assistant.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level)?;

    info!(
        bot_name = %config.assistant.bot_name,
        work_dir = %config.assistant.work_dir.display(),
        configured_log_level = %config.assistant.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    std::fs::create_dir_all(&config.assistant.work_dir)?;

    let documents = RateSheetGenerator::new(config.downloads_dir());
    documents.ensure_dir()?;

    let log = InteractionLog::open(config.db_path())?;

    let service = Arc::new(ChatService::new(KnowledgeBase::default(), log, documents));

    info!(db = %config.db_path().display(), downloads = %config.downloads_dir().display(), "subsystems ready");

    if !config.comms_axum_should_load() {
        return Err(AppError::Config(
            "no comms channel enabled — set [comms.axum_channel] enabled = true".into(),
        ));
    }

    // Shared shutdown token — Ctrl-C cancels it, the channel watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    println!(
        "✓ {} ready — chat API on http://{}",
        config.assistant.bot_name, config.comms.axum_channel.bind
    );

    let channel = AxumChannel::new(
        "axum",
        config.comms.axum_channel.bind.clone(),
        service,
        config.downloads_dir(),
    );
    channel.run(shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: sarah-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn   (suppress info noise, show warnings+errors only)
    //   -vv     → info   (normal operational output)
    //   -vvv    → debug  (flow-level diagnostics)
    //   -vvvv+  → trace  (full payload dumps, very verbose)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs {
        log_level,
        config_path,
    }
}
