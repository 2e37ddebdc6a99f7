use std::fmt;

use anyhow::Error;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::decoder::{DecodeError, Decoder};
use crate::exec::Executor;
use crate::instructions::{REGISTERS, SP};
use crate::memory::Bus;

/// Base of the interrupt vector table; vector `n` lives at `VECTOR_BASE + n`.
pub const VECTOR_BASE: u16 = 0xFF00;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuConfig {
    pub load_base: u16,
    pub stack_top: u16, // SP after reset
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            load_base: 0x8000,
            stack_top: 0xFF00,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags: u8 {
const ZERO = 1 << 0;
const SIGN = 1 << 1;
const CARRY = 1 << 2;
const INTERRUPT_ENABLE = 1 << 3; // never gates delivery
}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Halted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u16,
    pub flags: Flags,
    pub regs: [u16; 16],
    pub state: RunState,
    pub cfg: CpuConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("decode error at {pc:#06x}: {source}")]
    Decode {
        pc: u16,
        #[source]
        source: DecodeError,
    },
    #[error("division by zero at {pc:#06x}")]
    DivideByZero { pc: u16 },
    #[error("bus error at {addr:#06x}: {source}")]
    Bus {
        addr: u16,
        #[source]
        source: Error,
    },
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        let mut cpu = Self {
            pc: 0,
            flags: Flags::empty(),
            regs: [0; 16],
            state: RunState::Running,
            cfg,
        };
        cpu.reset(cfg.load_base);
        cpu
    }

    /// Clears registers and flags and restarts at `reset_pc`.
    pub fn reset(&mut self, reset_pc: u16) {
        self.regs = [0; 16];
        self.regs[SP] = self.cfg.stack_top;
        self.flags = Flags::empty();
        self.pc = reset_pc;
        self.state = RunState::Running;
    }

    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    pub fn sp(&self) -> u16 {
        self.regs[SP]
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.flags.contains(Flags::INTERRUPT_ENABLE)
    }

    /// External shutdown request.
    pub fn shutdown(&mut self) {
        debug!(pc = self.pc, "shutdown requested");
        self.state = RunState::Halted;
    }

    /// Z/S/C from an unmasked result.
    pub fn set_flags(&mut self, result: i64) {
        let masked = result & 0xFFFF;
        self.flags.set(Flags::ZERO, masked == 0);
        self.flags.set(Flags::SIGN, masked & 0x8000 != 0);
        self.flags.set(Flags::CARRY, !(0..=0xFFFF).contains(&result));
    }

    pub fn push<B: Bus>(&mut self, bus: &mut B, val: u16) -> Result<(), Trap> {
        let sp = self.regs[SP].wrapping_sub(1);
        self.regs[SP] = sp;
        bus.write_word(sp, val)
            .map_err(|source| Trap::Bus { addr: sp, source })
    }

    pub fn pop<B: Bus>(&mut self, bus: &mut B) -> Result<u16, Trap> {
        let sp = self.regs[SP];
        let val = bus
            .read_word(sp)
            .map_err(|source| Trap::Bus { addr: sp, source })?;
        self.regs[SP] = sp.wrapping_add(1);
        Ok(val)
    }

    /// Interrupt entry: push PC, push A, clear IE, jump through the vector table.
    /// `INT` and external devices share this sequence.
    pub fn interrupt<B: Bus>(&mut self, bus: &mut B, vector: u8) -> Result<(), Trap> {
        self.push(bus, self.pc)?;
        self.push(bus, self.regs[0])?;
        self.flags.remove(Flags::INTERRUPT_ENABLE);
        let slot = VECTOR_BASE | vector as u16;
        let handler = bus
            .read_word(slot)
            .map_err(|source| Trap::Bus { addr: slot, source })?;
        debug!(vector, handler, ret = self.pc, "interrupt");
        self.pc = handler;
        Ok(())
    }

    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<(), Trap> {
        if self.is_halted() {
            return Ok(());
        }
        let pc = self.pc;
        let res = self.fetch_exec(pc, bus, dec, exec);
        if let Err(trap) = &res {
            warn!(pc, %trap, "cpu halted on trap");
            self.state = RunState::Halted;
        }
        res
    }

    fn fetch_exec<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        pc: u16,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<(), Trap> {
        let raw32 = bus
            .read_cell(pc)
            .map_err(|source| Trap::Bus { addr: pc, source })?;
        self.pc = pc.wrapping_add(1);
        let d = dec.decode(raw32).map_err(|source| Trap::Decode { pc, source })?;
        trace!(pc, raw = raw32, ?d, "step");
        exec.exec(self, bus, d)
    }

    /// Steps until halted or `max_steps` are spent; returns the steps taken.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
        max_steps: u64,
    ) -> Result<u64, Trap> {
        let mut steps = 0;
        while !self.is_halted() && steps < max_steps {
            self.step(bus, dec, exec)?;
            steps += 1;
        }
        Ok(steps)
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PC: {:#06x}", self.pc)?;
        for row in 0..4 {
            let line = (row * 4..row * 4 + 4)
                .map(|i| format!("{}={:#06x}", REGISTERS[i], self.regs[i]))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(f, "{line}")?;
        }
        write!(
            f,
            "Flags: Z={} S={} C={} IE={}",
            self.flags.contains(Flags::ZERO),
            self.flags.contains(Flags::SIGN),
            self.flags.contains(Flags::CARRY),
            self.interrupts_enabled()
        )
    }
}
