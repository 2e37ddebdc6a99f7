use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use rm16_tools::{listing, load_raw_bin, ListingLine};

#[derive(Parser, Debug)]
#[command(author, version, about = "rm16 disassembler CLI", long_about = None)]
struct Cli {
    /// Load address of the first word in the image
    #[arg(long, value_parser = parse_u16, default_value = "0x8000")]
    base: u16,
    /// Skip N words at the start of the file
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit words loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Input image path
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disassemble the address range [start, end)
    Range {
        /// Start address (hex or dec)
        #[arg(value_parser = parse_u16)]
        start: u16,
        /// End address (hex or dec, exclusive)
        #[arg(value_parser = parse_u16)]
        end: u16,
        /// Show the raw instruction word
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Disassemble the whole image
    Listing {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_u16(s: &str) -> Result<u16> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u16::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u16>()?)
    }
}

fn render_text(lines: &[ListingLine], show_bytes: bool) -> String {
    let mut s = String::new();
    for l in lines {
        if show_bytes {
            s.push_str(&format!("{:04x}:  {:08x}  {}\n", l.addr, l.raw, l.text));
        } else {
            s.push_str(&format!("{:04x}:  {}\n", l.addr, l.text));
        }
    }
    s
}

fn emit(text: String, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let img = load_raw_bin(&cli.input, cli.base, cli.skip, cli.len)?;

    match cli.cmd {
        Command::Range { start, end, show_bytes, out } => {
            anyhow::ensure!(end >= start, "end must be >= start");
            let count = (end - start) as usize;
            emit(render_text(&listing(&img, start, count), show_bytes), out)?;
        }
        Command::Listing { format, out } => {
            let lines = listing(&img, img.base, img.words.len());
            let text = match format {
                OutputFormat::Text => render_text(&lines, true),
                OutputFormat::Json => serde_json::to_string_pretty(&lines)? + "\n",
            };
            emit(text, out)?;
        }
    }
    Ok(())
}
