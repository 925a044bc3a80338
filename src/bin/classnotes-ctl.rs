//! `classnotes-ctl`: operator CLI over the same store and providers the
//! server uses.
//!
//! Runs each command in-process against the configured work directory, so it
//! works whether or not the server is up.
//!
//! # Usage
//!
//! ```text
//! classnotes-ctl [-f <config>] ingest <file.txt> <class> <subject> <topic>
//! classnotes-ctl [-f <config>] ask <class> <subject> <topic> <question> [-k N]
//! classnotes-ctl [-f <config>] records <class> <subject> <topic>
//! classnotes-ctl [-f <config>] collections
//! ```

use std::path::PathBuf;
use std::process;

use classnotes::config;
use classnotes::logger;
use classnotes::subsystems::notes::{NoteTags, NotesService};

// ── CLI arg parsing ────────────────────────────────────────────────────────

struct Args {
    config_path: Option<String>,
    k: Option<usize>,
    command: Option<String>,
    rest: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut config_path = None;
    let mut k = None;
    let mut command = None;
    let mut rest = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-f" => {
                config_path = Some(iter.next().ok_or("-f/--config requires a path argument")?);
            }
            "-k" => {
                let raw = iter.next().ok_or("-k requires a number")?;
                let n = raw
                    .parse::<usize>()
                    .map_err(|_| format!("-k expects a non-negative integer, got '{raw}'"))?;
                k = Some(n);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--" => {
                rest.extend(iter);
                break;
            }
            _ if command.is_none() => command = Some(arg),
            _ => rest.push(arg),
        }
    }

    Ok(Args {
        config_path,
        k,
        command,
        rest,
    })
}

fn print_help() {
    eprintln!("usage: classnotes-ctl [-f <config>] <command>");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  ingest <file.txt> <class> <subject> <topic>     index a notes file");
    eprintln!("  ask <class> <subject> <topic> <question> [-k N] answer a question");
    eprintln!("  records <class> <subject> <topic>               preview stored chunks");
    eprintln!("  collections                                     list known namespaces");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --config, -f <path>   configuration file (default: config/default.toml)");
    eprintln!("  -k <n>                chunks to retrieve for 'ask'");
    eprintln!("  --help,   -h          print this help");
}

enum Command {
    Ingest { path: PathBuf, tags: NoteTags },
    Ask { tags: NoteTags, question: String },
    Records { tags: NoteTags },
    Collections,
}

fn tags_from(rest: &[String], usage: &str) -> Result<NoteTags, String> {
    match rest {
        [class_name, subject, topic, ..] => Ok(NoteTags::new(
            class_name.as_str(),
            subject.as_str(),
            topic.as_str(),
        )),
        _ => Err(usage.to_string()),
    }
}

fn build_command(cmd: &str, rest: &[String]) -> Result<Command, String> {
    match cmd {
        "ingest" => {
            const USAGE: &str = "usage: classnotes-ctl ingest <file.txt> <class> <subject> <topic>";
            let (path, tail) = rest.split_first().ok_or(USAGE)?;
            Ok(Command::Ingest {
                path: PathBuf::from(path),
                tags: tags_from(tail, USAGE)?,
            })
        }
        "ask" => {
            const USAGE: &str = "usage: classnotes-ctl ask <class> <subject> <topic> <question> [-k N]";
            let tags = tags_from(rest, USAGE)?;
            let question = rest.get(3..).map(|q| q.join(" ")).unwrap_or_default();
            if question.trim().is_empty() {
                return Err(USAGE.to_string());
            }
            Ok(Command::Ask { tags, question })
        }
        "records" => Ok(Command::Records {
            tags: tags_from(rest, "usage: classnotes-ctl records <class> <subject> <topic>")?,
        }),
        "collections" | "ls" => Ok(Command::Collections),
        other => Err(format!(
            "unknown command: {other}\n  run 'classnotes-ctl --help' for usage"
        )),
    }
}

async fn run(notes: NotesService, cmd: Command, k: Option<usize>) -> Result<(), String> {
    match cmd {
        Command::Ingest { path, tags } => {
            let summary = notes
                .ingest_text_file(&path, &tags)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&summary)
        }
        Command::Ask { tags, question } => {
            let answer = notes
                .answer(&question, &tags, k)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", answer.answer);
            if !answer.sources.is_empty() {
                println!();
                println!("sources ({}):", answer.sources.len());
                for source in &answer.sources {
                    println!("---");
                    println!("{source}");
                }
            }
            Ok(())
        }
        Command::Records { tags } => {
            let preview = notes
                .preview_records(&tags)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&preview)
        }
        Command::Collections => {
            let store = notes.store().clone();
            let names = tokio::task::spawn_blocking(move || store.list_collections())
                .await
                .map_err(|e| e.to_string())?
                .map_err(|e| e.to_string())?;
            println!("ok  collections ({}):", names.len());
            for name in &names {
                println!("      {name}");
            }
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let _ = dotenvy::dotenv();

    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let Some(cmd_str) = args.command.as_deref() else {
        eprintln!("error: no command given");
        eprintln!("  run 'classnotes-ctl --help' for usage");
        process::exit(1);
    };

    let cmd = match build_command(cmd_str, &args.rest) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let cfg = match config::load(args.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    // Keep stdout clean for command output; only warnings reach stderr.
    if let Err(e) = logger::init("warn", false, None) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: cannot start runtime: {e}");
            process::exit(1);
        }
    };

    let result = rt.block_on(async {
        let notes = NotesService::from_config(&cfg).map_err(|e| e.to_string())?;
        run(notes, cmd, args.k).await
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
