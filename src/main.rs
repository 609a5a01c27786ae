use anyhow::{Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use rsswire::config::Config;
use rsswire::rss;

#[derive(Parser, Debug)]
#[command(
    name = "rsswire",
    about = "Re-serialize an RSS feed through its typed model"
)]
struct Args {
    /// Feed document to read (`-` for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Config file with output settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the document without indentation
    #[arg(long)]
    compact: bool,

    /// Indent string per nesting level (overrides config)
    #[arg(long, value_name = "STRING")]
    indent: Option<String>,

    /// Prefix written at the start of every line (overrides config)
    #[arg(long, value_name = "STRING")]
    prefix: Option<String>,

    /// Serialize under the default root instead of the captured one
    #[arg(long)]
    reset_root: bool,

    /// Print the structural dump instead of XML
    #[arg(long)]
    dump: bool,

    /// Write output to a file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read feed from stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("Failed to read feed file: {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    if args.compact {
        config.compact = true;
    }
    if args.reset_root {
        config.reset_root = true;
    }
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if let Some(prefix) = args.prefix {
        config.prefix = prefix;
    }

    let bytes = read_input(&args.input)?;
    let mut feed = rss::parse(&bytes)
        .with_context(|| format!("Failed to parse feed: {}", args.input.display()))?;
    if config.reset_root {
        feed.reset_root();
    }
    tracing::info!(title = %feed.title, items = feed.items.len(), "Loaded feed");

    let output = if args.dump {
        let mut dump = feed.dump().context("Failed to render feed dump")?;
        dump.push('\n');
        dump.into_bytes()
    } else if config.compact {
        feed.marshal().context("Failed to serialize feed")?
    } else {
        feed.marshal_indent(&config.prefix, &config.indent)
            .context("Failed to serialize feed")?
    };

    match &args.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&output)
                .context("Failed to write output to stdout")?;
            if !args.dump {
                stdout.write_all(b"\n").context("Failed to write output to stdout")?;
            }
        }
    }

    Ok(())
}
