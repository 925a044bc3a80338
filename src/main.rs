//! classnotes server entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Open the vector store and build providers
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Serve HTTP until shutdown

use classnotes::config::{self, Config};
use classnotes::error::AppError;
use classnotes::logger;
use classnotes::subsystems::comms::axum_channel::{self, AppState};
use classnotes::subsystems::notes::NotesService;
use tokio_util::sync::CancellationToken;
use tracing::info;

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();
    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(
        effective_log_level,
        args.log_level.is_some(),
        config.log_file.as_deref(),
    )?;

    info!(
        name = %config.name,
        work_dir = %config.work_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let notes = NotesService::from_config(&config)?;
    let state = AppState::new(notes, &config.name);

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    print_startup_summary(&config);

    axum_channel::run_server(
        state,
        &config.http,
        config.ingest.max_upload_bytes,
        shutdown,
    )
    .await
}

fn print_startup_summary(config: &Config) {
    let fit = |text: String| -> String {
        const WIDTH: usize = 58;
        if text.chars().count() >= WIDTH {
            let mut out = text.chars().take(WIDTH - 1).collect::<String>();
            out.push('…');
            out
        } else {
            format!("{text:<WIDTH$}")
        }
    };

    let embedding_line = match config.embedding.provider.as_str() {
        "hashing" => format!("hashing dim={}", config.embedding.hashing.dimension),
        other => format!("{other} model={}", config.embedding.openai.model),
    };
    let llm_line = match config.llm.provider.as_str() {
        "dummy" => "dummy (echo)".to_string(),
        other => format!(
            "{other} model={} timeout={}s",
            config.llm.openai.model, config.llm.openai.timeout_seconds
        ),
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ 📚 {}║", fit(format!("{} ready", config.name)));
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║   {}║", fit(format!("pid      {}", std::process::id())));
    println!("║   {}║", fit(format!("http     http://{}", config.http.bind)));
    println!("║   {}║", fit(format!("store    {}", config.store_dir().display())));
    println!("║   {}║", fit(format!("embed    {embedding_line}")));
    println!("║   {}║", fit(format!("llm      {llm_line}")));
    println!("╚══════════════════════════════════════════════════════════════╝");
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
                println!("Usage: classnotes [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!(
                    "  -f, --config <PATH>        Path to configuration file (default: config/default.toml)"
                );
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            },
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs {
        log_level: logger::verbosity_level(verbosity),
        config_path,
    }
}
