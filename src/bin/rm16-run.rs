use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rm16::exec::IntExecutor;
use rm16::isa::rm16::Rm16Decoder;
use rm16::memory::{image_from_le_bytes, IO_START};
use rm16::{load_program, Assembler, Cpu, CpuConfig, IoDevice, LinearMemory, MappedBus};

fn parse_u16(s: &str) -> Result<u16> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u16::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u16>()?)
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble or load a program and run it on the rm16 emulator")]
struct Opts {
    /// Load address and initial PC
    #[arg(short, long, value_parser = parse_u16, default_value = "0x8000")]
    base: u16,
    /// Stop after this many instructions
    #[arg(long, default_value_t = 10_000_000u64)]
    max_steps: u64,
    /// Treat the input as a raw image of little-endian 32-bit words
    #[arg(long)]
    binary: bool,
    /// Print the final machine state as JSON
    #[arg(long)]
    dump_json: bool,
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

/// Port 0x9000 writes go to stdout; everything else reads as zero.
struct StdoutConsole;

impl IoDevice for StdoutConsole {
    fn read_io(&mut self, _port: u16) -> Result<u16> {
        Ok(0)
    }
    fn write_io(&mut self, port: u16, value: u16) -> Result<()> {
        if port == IO_START {
            let mut out = std::io::stdout();
            out.write_all(&[(value & 0xFF) as u8])?;
            out.flush()?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let words = if opts.binary {
        let bytes = std::fs::read(&opts.input)
            .with_context(|| format!("reading {}", opts.input.display()))?;
        image_from_le_bytes(&bytes)?
    } else {
        let src = std::fs::read_to_string(&opts.input)
            .with_context(|| format!("reading {}", opts.input.display()))?;
        Assembler::with_origin(opts.base).assemble(&src)?
    };

    let mut bus = MappedBus::new(LinearMemory::new(), StdoutConsole);
    load_program(&mut bus, opts.base, &words)?;

    let cfg = CpuConfig {
        load_base: opts.base,
        ..CpuConfig::default()
    };
    let mut cpu = Cpu::new(cfg);
    let dec = Rm16Decoder::new();
    let exec = IntExecutor;

    match cpu.run(&mut bus, &dec, &exec, opts.max_steps) {
        Ok(steps) => eprintln!("stopped after {steps} steps ({:?})", cpu.state),
        Err(trap) => eprintln!("TRAP: {trap}"),
    }

    if opts.dump_json {
        println!("{}", serde_json::to_string_pretty(&cpu)?);
    } else {
        eprintln!("{cpu}");
    }
    Ok(())
}
