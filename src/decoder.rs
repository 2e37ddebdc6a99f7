use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::addressing::AddrMode;
use crate::isa::codec::Format;

/// Arithmetic/logic group shared by RR, RI and RM (opcodes 0x10..=0x1C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alu {
    Add = 0x10,
    Sub = 0x11,
    Mul = 0x12,
    Div = 0x13,
    And = 0x14,
    Or = 0x15,
    Xor = 0x16,
    Not = 0x17,
    Shl = 0x18,
    Slr = 0x19,
    Sar = 0x1A,
    Rol = 0x1B,
    Ror = 0x1C,
}

impl Alu {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x10 => Alu::Add,
            0x11 => Alu::Sub,
            0x12 => Alu::Mul,
            0x13 => Alu::Div,
            0x14 => Alu::And,
            0x15 => Alu::Or,
            0x16 => Alu::Xor,
            0x17 => Alu::Not,
            0x18 => Alu::Shl,
            0x19 => Alu::Slr,
            0x1A => Alu::Sar,
            0x1B => Alu::Rol,
            0x1C => Alu::Ror,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RrOp {
    Mov,
    Psh,
    Pop,
    Swp,
    Alu(Alu),
    Inc,
    Dec,
    Cmp,
    Ret,
    Hlt,
    Nop,
    Rti,
    Sti,
    Cli,
}

impl RrOp {
    pub fn from_code(code: u8) -> Option<Self> {
        if let Some(alu) = Alu::from_code(code) {
            return Some(RrOp::Alu(alu));
        }
        Some(match code {
            0x00 => RrOp::Mov,
            0x02 => RrOp::Psh,
            0x03 => RrOp::Pop,
            0x04 => RrOp::Swp,
            0x1D => RrOp::Inc,
            0x1E => RrOp::Dec,
            0x23 => RrOp::Cmp,
            0x24 => RrOp::Ret,
            0x25 => RrOp::Hlt,
            0x26 => RrOp::Nop,
            0x31 => RrOp::Rti,
            0x32 => RrOp::Sti,
            0x33 => RrOp::Cli,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            RrOp::Mov => 0x00,
            RrOp::Psh => 0x02,
            RrOp::Pop => 0x03,
            RrOp::Swp => 0x04,
            RrOp::Alu(alu) => alu as u8,
            RrOp::Inc => 0x1D,
            RrOp::Dec => 0x1E,
            RrOp::Cmp => 0x23,
            RrOp::Ret => 0x24,
            RrOp::Hlt => 0x25,
            RrOp::Nop => 0x26,
            RrOp::Rti => 0x31,
            RrOp::Sti => 0x32,
            RrOp::Cli => 0x33,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiOp {
    Mov,
    Alu(Alu),
    Inc,
    Dec,
    Jmp,
    Jsr,
    Cmp,
    Ret,
    Hlt,
    Nop,
    Int,
    Rti,
    Sti,
    Cli,
}

impl RiOp {
    pub fn from_code(code: u8) -> Option<Self> {
        if let Some(alu) = Alu::from_code(code) {
            return Some(RiOp::Alu(alu));
        }
        Some(match code {
            0x00 => RiOp::Mov,
            0x1D => RiOp::Inc,
            0x1E => RiOp::Dec,
            0x20 => RiOp::Jmp,
            0x22 => RiOp::Jsr,
            0x23 => RiOp::Cmp,
            0x24 => RiOp::Ret,
            0x25 => RiOp::Hlt,
            0x26 => RiOp::Nop,
            0x30 => RiOp::Int,
            0x31 => RiOp::Rti,
            0x32 => RiOp::Sti,
            0x33 => RiOp::Cli,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            RiOp::Mov => 0x00,
            RiOp::Alu(alu) => alu as u8,
            RiOp::Inc => 0x1D,
            RiOp::Dec => 0x1E,
            RiOp::Jmp => 0x20,
            RiOp::Jsr => 0x22,
            RiOp::Cmp => 0x23,
            RiOp::Ret => 0x24,
            RiOp::Hlt => 0x25,
            RiOp::Nop => 0x26,
            RiOp::Int => 0x30,
            RiOp::Rti => 0x31,
            RiOp::Sti => 0x32,
            RiOp::Cli => 0x33,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RmOp {
    /// Load.
    Mov,
    Str,
    Alu(Alu),
    Jmp,
    Jsr,
    Cmp,
}

impl RmOp {
    pub fn from_code(code: u8) -> Option<Self> {
        if let Some(alu) = Alu::from_code(code) {
            return Some(RmOp::Alu(alu));
        }
        Some(match code {
            0x00 => RmOp::Mov,
            0x01 => RmOp::Str,
            0x20 => RmOp::Jmp,
            0x22 => RmOp::Jsr,
            0x23 => RmOp::Cmp,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            RmOp::Mov => 0x00,
            RmOp::Str => 0x01,
            RmOp::Alu(alu) => alu as u8,
            RmOp::Jmp => 0x20,
            RmOp::Jsr => 0x22,
            RmOp::Cmp => 0x23,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RcmOp {
    Jmp,
    /// Jump if the register value satisfies the condition.
    Jcr,
    Jsr,
    /// Jump if the flags satisfy the condition.
    Jcf,
}

impl RcmOp {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x20 => RcmOp::Jmp,
            0x21 => RcmOp::Jcr,
            0x22 => RcmOp::Jsr,
            0x27 => RcmOp::Jcf,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            RcmOp::Jmp => 0x20,
            RcmOp::Jcr => 0x21,
            RcmOp::Jsr => 0x22,
            RcmOp::Jcf => 0x27,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cond: u8 {
const LT = 0b100;
const EQ = 0b010;
const GT = 0b001;
const LE = Self::LT.bits() | Self::EQ.bits();
const GE = Self::GT.bits() | Self::EQ.bits();
const NE = Self::LT.bits() | Self::GT.bits();
const AL = Self::LT.bits() | Self::EQ.bits() | Self::GT.bits();
}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoded {
    Rr { op: RrOp, rd: u8, rs1: u8, rs2: u8 },
    /// `imm` is already sign-extended.
    Ri { op: RiOp, rd: u8, imm: i32 },
    Rm { op: RmOp, rd: u8, mode: AddrMode, field: u32 },
    Rcm { op: RcmOp, reg: u8, cond: Cond, addr: u16 },
}

impl Decoded {
    pub fn format(&self) -> Format {
        match self {
            Decoded::Rr { .. } => Format::Rr,
            Decoded::Ri { .. } => Format::Ri,
            Decoded::Rm { .. } => Format::Rm,
            Decoded::Rcm { .. } => Format::Rcm,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown {format} opcode {opcode:#04x} in word {raw:#010x}")]
    UnknownOpcode { format: Format, opcode: u8, raw: u32 },
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Result<Decoded, DecodeError>;
}
