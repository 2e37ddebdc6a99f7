//! Bit packing for the 32-bit instruction word.
//!
//! ```text
//!        31 30 | 29..24 | 23 ..................................... 0
//! RR     0  0  | opcode | 23..12 reserved | 11..8 rd | 7..4 rs1 | 3..0 rs2
//! RI     0  1  | opcode | 23..20 reserved | 19..16 rd | 15..0 imm16
//! RM     1  0  | opcode | 23 res | 22..19 rd | 18..17 mode | 16..0 field
//! RCM    1  1  | opcode | 23 res | 22..19 reg | 18..16 cond | 15..0 addr
//! ```
//!
//! Packing masks every field to its width; unpacking extracts exactly these
//! ranges, so `unpack(pack(w)) == w` for in-range fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::addressing::AddrMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Rr = 0b00,
    Ri = 0b01,
    Rm = 0b10,
    Rcm = 0b11,
}

impl Format {
    pub fn of(raw: u32) -> Self {
        match (raw >> 30) & 0b11 {
            0b00 => Format::Rr,
            0b01 => Format::Ri,
            0b10 => Format::Rm,
            _ => Format::Rcm,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Format::Rr => "RR",
            Format::Ri => "RI",
            Format::Rm => "RM",
            Format::Rcm => "RCM",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrWord {
    pub opcode: u8,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiWord {
    pub opcode: u8,
    pub rd: u8,
    /// Raw 16-bit immediate; see [`RiWord::value`].
    pub imm: u16,
}

impl RiWord {
    /// The immediate sign-extended to 32 bits.
    pub fn value(&self) -> i32 {
        self.imm as i16 as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmWord {
    pub opcode: u8,
    pub rd: u8,
    pub mode: AddrMode,
    /// 17-bit mode-specific field.
    pub field: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcmWord {
    pub opcode: u8,
    pub reg: u8,
    /// 3-bit LT/EQ/GT mask.
    pub cond: u8,
    pub addr: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Word {
    Rr(RrWord),
    Ri(RiWord),
    Rm(RmWord),
    Rcm(RcmWord),
}

#[inline]
fn head(format: Format, opcode: u8) -> u32 {
    ((format as u32) << 30) | (((opcode & 0x3F) as u32) << 24)
}

impl Word {
    pub fn format(&self) -> Format {
        match self {
            Word::Rr(_) => Format::Rr,
            Word::Ri(_) => Format::Ri,
            Word::Rm(_) => Format::Rm,
            Word::Rcm(_) => Format::Rcm,
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Word::Rr(w) => w.opcode,
            Word::Ri(w) => w.opcode,
            Word::Rm(w) => w.opcode,
            Word::Rcm(w) => w.opcode,
        }
    }

    pub fn pack(&self) -> u32 {
        match *self {
            Word::Rr(w) => {
                head(Format::Rr, w.opcode)
                    | (((w.rd & 0xF) as u32) << 8)
                    | (((w.rs1 & 0xF) as u32) << 4)
                    | (w.rs2 & 0xF) as u32
            }
            Word::Ri(w) => head(Format::Ri, w.opcode) | (((w.rd & 0xF) as u32) << 16) | w.imm as u32,
            Word::Rm(w) => {
                head(Format::Rm, w.opcode)
                    | (((w.rd & 0xF) as u32) << 19)
                    | ((w.mode.bits() as u32) << 17)
                    | (w.field & 0x1FFFF)
            }
            Word::Rcm(w) => {
                head(Format::Rcm, w.opcode)
                    | (((w.reg & 0xF) as u32) << 19)
                    | (((w.cond & 0b111) as u32) << 16)
                    | w.addr as u32
            }
        }
    }

    pub fn unpack(raw: u32) -> Self {
        let opcode = ((raw >> 24) & 0x3F) as u8;
        match Format::of(raw) {
            Format::Rr => Word::Rr(RrWord {
                opcode,
                rd: ((raw >> 8) & 0xF) as u8,
                rs1: ((raw >> 4) & 0xF) as u8,
                rs2: (raw & 0xF) as u8,
            }),
            Format::Ri => Word::Ri(RiWord {
                opcode,
                rd: ((raw >> 16) & 0xF) as u8,
                imm: (raw & 0xFFFF) as u16,
            }),
            Format::Rm => Word::Rm(RmWord {
                opcode,
                rd: ((raw >> 19) & 0xF) as u8,
                mode: AddrMode::from_bits(((raw >> 17) & 0b11) as u8),
                field: raw & 0x1FFFF,
            }),
            Format::Rcm => Word::Rcm(RcmWord {
                opcode,
                reg: ((raw >> 19) & 0xF) as u8,
                cond: ((raw >> 16) & 0b111) as u8,
                addr: (raw & 0xFFFF) as u16,
            }),
        }
    }
}
