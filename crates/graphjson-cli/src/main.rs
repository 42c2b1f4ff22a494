//! `graphjson` CLI: encode, decode, and inspect object-graph JSON from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Encode plain JSON (stdin → stdout)
//! echo '{"name":"Alice","tags":[1,2]}' | graphjson encode
//!
//! # Encode from file to file, sharing repeated long strings
//! graphjson encode --share-strings -i data.json -o data.graph
//!
//! # Decode graph text back to pretty-printed plain JSON
//! graphjson decode -i data.graph
//!
//! # Show sharing statistics, as text or JSON
//! graphjson stats -i data.json
//! graphjson stats --json -i data.json
//!
//! # List the types the default coder understands
//! graphjson types
//!
//! # Log what the coder is doing (-v info, -vv debug, -vvv trace)
//! graphjson -vv encode -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graphjson_core::json::{from_json, from_json_interned, to_json};
use graphjson_core::{is_standard_type, Coder, EncodeStats};
use serde::Serialize;
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "graphjson",
    version,
    about = "Reference-preserving object-graph JSON CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode plain JSON to graph text
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Write repeated long strings once and reference them afterwards
        #[arg(long)]
        share_strings: bool,
    },
    /// Decode graph text back to plain JSON
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show encoding statistics (sizes, definitions, references)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the types the default coder can encode and decode
    Types {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct StatsReport {
    json_bytes: usize,
    #[serde(flatten)]
    encode: EncodeStats,
}

#[derive(Serialize)]
struct TypeEntry {
    name: String,
    standard: bool,
    /// Canonical identifier the name resolves to in the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let coder = Coder::default_coder();

    match cli.command {
        Commands::Encode {
            input,
            output,
            share_strings,
        } => {
            let json = parse_json(&read_input(input.as_deref())?)?;
            let value = if share_strings {
                from_json_interned(&json)
            } else {
                from_json(&json)
            }
            .context("Failed to convert JSON input")?;
            let text = coder
                .encode(&value)
                .context("Failed to encode JSON to graph text")?;
            write_output(output.as_deref(), &text)?;
        }
        Commands::Decode { input, output } => {
            let text = read_input(input.as_deref())?;
            let value = coder
                .decode(&text)
                .context("Failed to decode graph text")?;
            let json = to_json(&value, coder.registry()).context("Failed to convert to JSON")?;
            let pretty = serde_json::to_string_pretty(&json)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Stats { input, json } => {
            let raw = read_input(input.as_deref())?;
            let value = from_json_interned(&parse_json(&raw)?)
                .context("Failed to convert JSON input")?;
            let (_, stats) = coder
                .encode_with_stats(&value)
                .context("Failed to encode JSON to graph text")?;
            info!(input_bytes = raw.len(), "computed encode statistics");

            let report = StatsReport {
                json_bytes: raw.len(),
                encode: stats,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_stats(&report);
            }
        }
        Commands::Types { json } => {
            let entries = type_entries(coder);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    match (&entry.canonical, entry.standard) {
                        (_, true) => println!("{}", entry.name),
                        (Some(canonical), false) if canonical != &entry.name => {
                            println!("{} (extended, alias of {})", entry.name, canonical)
                        }
                        _ => println!("{} (extended)", entry.name),
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_stats(report: &StatsReport) {
    let ratio = if report.json_bytes > 0 {
        (1.0 - (report.encode.bytes as f64 / report.json_bytes as f64)) * 100.0
    } else {
        0.0
    };
    println!("JSON size:    {} bytes", report.json_bytes);
    println!("Graph size:   {} bytes", report.encode.bytes);
    println!("Reduction:    {:.1}%", ratio);
    println!("Tracked:      {}", report.encode.tracked);
    println!("Definitions:  {}", report.encode.definitions);
    println!("References:   {}", report.encode.references);
}

fn type_entries(coder: &Coder) -> Vec<TypeEntry> {
    coder
        .supported_types()
        .into_iter()
        .map(|name| {
            let standard = is_standard_type(&name);
            let canonical = coder
                .registry()
                .lookup(&name)
                .map(|entry| entry.type_id().to_string());
            TypeEntry {
                name,
                standard,
                canonical,
            }
        })
        .collect()
}

fn parse_json(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("Failed to parse input as JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
