#![forbid(unsafe_code)]

use std::env;
use std::process;

use formcraft_harness::cli::{Command, HELP_TEXT, Opts, VERSION};
use formcraft_harness::{
    HarnessError, ReplayOptions, Script, load_document, replay, text_checksum,
};
use formcraft_runtime::EditorConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    let opts = match Opts::parse_from(env::args().skip(1)) {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            println!("{HELP_TEXT}");
            return;
        }
        Ok(Command::Version) => {
            println!("formcraft-replay {VERSION}");
            return;
        }
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Run with --help for usage information.");
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FORMCRAFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&opts) {
        eprintln!("formcraft-replay: {err}");
        process::exit(1);
    }
}

fn run(opts: &Opts) -> Result<(), HarnessError> {
    let script = Script::load(&opts.script)?;
    let initial = match &opts.forest {
        Some(path) => Some(load_document(path)?),
        None => None,
    };
    let options = ReplayOptions {
        config: EditorConfig::from_env()?,
        initial,
        compact: opts.compact,
    };

    let report = replay(&script, &options)?;
    println!("{}", report.markup);
    if opts.tree {
        println!("{}", report.snapshot.to_json()?);
    }
    if opts.checksum {
        println!("{}", text_checksum(&report.markup));
    }
    tracing::info!(
        revision = report.revision,
        rejected = report.rejected_drops(),
        "replay finished"
    );
    Ok(())
}
