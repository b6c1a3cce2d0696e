use anyhow::{Context, Result};
use clap::Parser;
use jarwalk::archive::clean_origin;
use jarwalk::cli::Cli;
use jarwalk::config::Settings;
use jarwalk::filter::ClassFilter;
use jarwalk::javap::{Converter, Dex2Jar, Javap};
use jarwalk::walk::Walker;
use std::io;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::resolve(cli);
    debug!(?settings, "resolved settings");

    let filter = ClassFilter::new(settings.only.as_deref(), settings.not.as_deref())?;
    let javap = Javap::new(settings.javap.clone());
    let dex2jar = settings.dex2jar.clone().map(Dex2Jar::new);
    if dex2jar.is_none() {
        debug!("dex2jar not configured, dex entries will be skipped");
    }

    let workspace = tempfile::Builder::new()
        .prefix("jarwalk")
        .tempdir()
        .context("failed to create temp directory")?;
    let origin = clean_origin(&settings.jar_file.to_string_lossy());

    let start = Instant::now();
    let mut walker = Walker::new(&javap, workspace.path(), io::stdout().lock())
        .with_converter(dex2jar.as_ref().map(|d| d as &dyn Converter))
        .with_filter(filter)
        .with_extra_args(settings.extra_args.clone());
    walker.walk(&settings.jar_file, &origin)?;

    let stats = walker.stats();
    info!(
        archives = stats.archives,
        classes = stats.classes,
        filtered = stats.filtered,
        dex_skipped = stats.dex_skipped,
        skipped = stats.skipped,
        duration_ms = start.elapsed().as_millis() as u64,
        "walk finished"
    );

    Ok(())
}
