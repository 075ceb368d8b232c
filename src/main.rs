use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_workforce::{Engine, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "u-workforce")]
#[command(version)]
#[command(about = "Allocate staff to work units and build a weekly schedule")]
struct Args {
    /// Request JSON file ("-" reads stdin)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Result JSON file (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Engine configuration JSON file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json(&text)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let request = read_input(&args.input)?;
    let result = Engine::new(config)
        .allocate_json(&request)
        .context("allocation failed")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(output = %path.display(), "Result written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
