//! Mnemonic tables shared by the assembler and the disassembler.

use crate::decoder::Cond;

/// Conventional register roles.
pub const SP: usize = 7;

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub opcode: u8,
}

/// Opcode numbers are shared across formats; whether a format accepts one is
/// decided by the decoder.
pub const TABLE: &[InstrDesc] = &[
    InstrDesc { mnemonic: "MOV", opcode: 0x00 },
    InstrDesc { mnemonic: "STR", opcode: 0x01 },
    InstrDesc { mnemonic: "PSH", opcode: 0x02 },
    InstrDesc { mnemonic: "POP", opcode: 0x03 },
    InstrDesc { mnemonic: "SWP", opcode: 0x04 },
    InstrDesc { mnemonic: "ADD", opcode: 0x10 },
    InstrDesc { mnemonic: "SUB", opcode: 0x11 },
    InstrDesc { mnemonic: "MUL", opcode: 0x12 },
    InstrDesc { mnemonic: "DIV", opcode: 0x13 },
    InstrDesc { mnemonic: "AND", opcode: 0x14 },
    InstrDesc { mnemonic: "OR", opcode: 0x15 },
    InstrDesc { mnemonic: "XOR", opcode: 0x16 },
    InstrDesc { mnemonic: "NOT", opcode: 0x17 },
    InstrDesc { mnemonic: "SHL", opcode: 0x18 },
    InstrDesc { mnemonic: "SLR", opcode: 0x19 },
    InstrDesc { mnemonic: "SAR", opcode: 0x1A },
    InstrDesc { mnemonic: "ROL", opcode: 0x1B },
    InstrDesc { mnemonic: "ROR", opcode: 0x1C },
    InstrDesc { mnemonic: "INC", opcode: 0x1D },
    InstrDesc { mnemonic: "DEC", opcode: 0x1E },
    InstrDesc { mnemonic: "JMP", opcode: 0x20 },
    InstrDesc { mnemonic: "JCR", opcode: 0x21 },
    InstrDesc { mnemonic: "JSR", opcode: 0x22 },
    InstrDesc { mnemonic: "CMP", opcode: 0x23 },
    InstrDesc { mnemonic: "RET", opcode: 0x24 },
    InstrDesc { mnemonic: "HLT", opcode: 0x25 },
    InstrDesc { mnemonic: "NOP", opcode: 0x26 },
    InstrDesc { mnemonic: "JCF", opcode: 0x27 },
    InstrDesc { mnemonic: "INT", opcode: 0x30 },
    InstrDesc { mnemonic: "RTI", opcode: 0x31 },
    InstrDesc { mnemonic: "STI", opcode: 0x32 },
    InstrDesc { mnemonic: "CLI", opcode: 0x33 },
];

pub const REGISTERS: [&str; 16] = [
    "A", "B", "C", "D", "X", "Y", "Z", "SP", "MP1", "MP2", "MP3", "MP4", "E", "F", "G", "H",
];

pub const CONDITIONS: &[(&str, Cond)] = &[
    ("LT", Cond::LT),
    ("EQ", Cond::EQ),
    ("GT", Cond::GT),
    ("LE", Cond::LE),
    ("GE", Cond::GE),
    ("NE", Cond::NE),
    ("AL", Cond::AL),
];

pub fn opcode(mnemonic: &str) -> Option<u8> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic).map(|d| d.opcode)
}

pub fn mnemonic(opcode: u8) -> Option<&'static str> {
    TABLE.iter().find(|d| d.opcode == opcode).map(|d| d.mnemonic)
}

pub fn register(name: &str) -> Option<u8> {
    REGISTERS.iter().position(|r| *r == name).map(|i| i as u8)
}

pub fn register_name(index: u8) -> &'static str {
    REGISTERS[(index & 0xF) as usize]
}

/// MP1..MP4 as a 0-based pointer index.
pub fn pointer(name: &str) -> Option<u8> {
    match register(name)? {
        r @ 8..=11 => Some(r - 8),
        _ => None,
    }
}

pub fn condition(name: &str) -> Option<Cond> {
    CONDITIONS.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

pub fn condition_name(cond: Cond) -> Option<&'static str> {
    CONDITIONS.iter().find(|(_, c)| *c == cond).map(|(n, _)| *n)
}
