use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use parsnip::json;

/// Parse a JSON document with the parsnip reference grammar.
#[derive(Debug, Parser)]
#[command(name = "parsnip", version)]
struct Cli {
    /// File to parse
    path: Option<PathBuf>,

    /// Print the grammar's production registry as JSON and exit
    #[arg(long)]
    registry: bool,

    /// Print the raw parse tree
    #[arg(long)]
    tree: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if cli.registry {
        let grammar = json::grammar()?;
        println!("{}", grammar.grammar.registry().to_json()?);
        return Ok(());
    }

    let Some(path) = cli.path else {
        bail!("no input file given");
    };
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let parsed = json::parse(&source, &path.display().to_string())?;
    info!(errors = parsed.errors.len(), "parsed {}", path.display());

    for error in &parsed.errors {
        eprintln!("{}", error.diagnostic());
    }
    if cli.tree {
        println!("{}", parsed.tree);
    }
    if parsed.tree.is_err() {
        bail!("{} could not be parsed", path.display());
    }

    let value = parsed.value()?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    if !parsed.errors.is_empty() {
        bail!("{} parsed with {} error(s)", path.display(), parsed.errors.len());
    }
    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
