//! # Counter Uplink
//!
//! Decode people-counter LoRaWAN uplinks from the command line.
//!
//! Reads network-server uplinks as JSON lines on stdin
//! (`{"fPort": 1, "bytes": [..]}`) and writes one decoded record per line to
//! stdout. A single frame can also be decoded with `--port` and `--hex`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use counter_uplink::config::Config;
use counter_uplink::{decode_uplink, CommandRegistry, DecodedRecord, UplinkInput};

#[derive(Parser, Debug)]
#[command(name = "counter-uplink", version, about = "People counter uplink decoder")]
struct Cli {
    /// Configuration file (TOML).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Port (FPort) of a single uplink to decode.
    #[arg(long, value_name = "PORT", requires = "hex")]
    port: Option<u8>,

    /// Payload of a single uplink, hex encoded.
    #[arg(long, value_name = "HEX", requires = "port")]
    hex: Option<String>,

    /// Pretty-print decoded records.
    #[arg(long)]
    pretty: bool,

    /// Print the command table and exit.
    #[arg(long, conflicts_with_all = ["port", "hex"])]
    list_commands: bool,
}

/// Main entry point
///
/// 1. Load configuration (defaults when `--config` is absent)
/// 2. Set up logging to stderr; stdout carries only decoded records
/// 3. Build the command table once, then decode either the single
///    `--port`/`--hex` frame or the stdin stream until EOF or Ctrl+C
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Initialize logging
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let level: tracing::Level = config.logging.level.parse()?;
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    info!("Counter Uplink v{} starting...", env!("CARGO_PKG_VERSION"));

    let registry = CommandRegistry::standard()?;
    let pretty = cli.pretty || config.output.pretty;

    if cli.list_commands {
        for (channel, command_id, descriptor) in registry.iter() {
            println!("{:>3} {:>3} {}", channel, command_id, descriptor.name());
        }
        return Ok(());
    }

    if let (Some(port), Some(hex)) = (cli.port, cli.hex.as_deref()) {
        let input = UplinkInput::from_hex(port, hex)?;
        println!("{}", render(&decode_uplink(&registry, &input), pretty)?);
        return Ok(());
    }

    run_stream(&registry, pretty).await
}

/// Decode JSON-line uplinks from stdin until EOF or Ctrl+C
async fn run_stream(registry: &CommandRegistry, pretty: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut decoded: u64 = 0;

    info!("Reading uplinks from stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input");
                    break;
                };

                if line.trim().is_empty() {
                    continue;
                }

                let mut output = render(&decode_line(registry, &line), pretty)?;
                output.push('\n');
                stdout.write_all(output.as_bytes()).await?;
                stdout.flush().await?;
                decoded += 1;
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!("Total uplinks decoded: {}", decoded);
    Ok(())
}

/// Decode one input line; unparseable lines become an error record
fn decode_line(registry: &CommandRegistry, line: &str) -> DecodedRecord {
    match UplinkInput::from_json(line) {
        Ok(input) => decode_uplink(registry, &input),
        Err(e) => {
            warn!("Invalid input line: {}", e);
            DecodedRecord::from_error(format!("invalid input: {}", e))
        }
    }
}

fn render(record: &DecodedRecord, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(record)
    } else {
        serde_json::to_string(record)
    }
}
