use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rm16::Assembler;
use rm16_tools::{save_raw_bin, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "rm16 two-pass assembler")]
struct Opts {
    /// Input assembly file
    #[arg(short, long)]
    input: PathBuf,
    /// Output image (little-endian 32-bit words)
    #[arg(short, long)]
    output: PathBuf,
    /// Address the first word is loaded at; labels resolve against it
    #[arg(long, value_parser = parse_u16, default_value = "0")]
    origin: u16,
    /// Export the label table as JSON
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,
}

fn parse_u16(s: &str) -> Result<u16> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u16::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u16>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;

    let mut asm = Assembler::with_origin(opts.origin);
    let words = asm.assemble(&text)?;
    save_raw_bin(&opts.output, &Image { base: opts.origin, words })?;

    if let Some(path) = opts.labels {
        fs::write(path, serde_json::to_string_pretty(asm.labels())?)?;
    }
    Ok(())
}
