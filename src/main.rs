use anyhow::Context;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    parse_args(std::env::args().skip(1).collect())?;
    init_logging()?;
    repertoire::app::run()
}

fn parse_args(args: Vec<String>) -> anyhow::Result<()> {
    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
    }
    Ok(())
}

/// The terminal belongs to the dashboard, so logs go to a file.
fn init_logging() -> anyhow::Result<()> {
    repertoire::config::ensure_config_dir()?;
    let path = repertoire::config::log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn print_help() {
    println!("Repertoire");
    println!("  Compares a performance log against the song catalog and lists");
    println!("  the songs never performed.");
    println!();
    println!("  Sources, column names and ranking size are read from");
    println!("  settings.json in $REPERTOIRE_CONFIG_DIR (default ~/.config/repertoire).");
    println!("  Logs are written to repertoire.log in the same directory; RUST_LOG");
    println!("  sets the level.");
}
