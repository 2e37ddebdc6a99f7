use serde::{Deserialize, Serialize};

/// First register of the memory-pointer bank (MP1..MP4 live at 8..=11).
pub const MP_BASE: usize = 8;

/// Addressing mode of an RM-format instruction, from bits 18..17.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddrMode {
    /// `[addr]`
    Direct = 0b00,
    /// `[MPn + imm4]`
    PointerImm = 0b01,
    /// `[base12 + reg]`
    DirectReg = 0b10,
    /// `[MPn + reg]`, reachable only from hand-built words
    PointerReg = 0b11,
}

impl AddrMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => AddrMode::Direct,
            0b01 => AddrMode::PointerImm,
            0b10 => AddrMode::DirectReg,
            _ => AddrMode::PointerReg,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Effective address for `mode` and the 17-bit mode field.
/// Additions wrap at 16 bits and never touch the flags.
pub fn resolve(mode: AddrMode, field: u32, regs: &[u16; 16]) -> u16 {
    match mode {
        AddrMode::Direct => (field & 0xFFFF) as u16,
        AddrMode::PointerImm => {
            let mp = ((field >> 14) & 0b11) as usize;
            let offset = ((field >> 10) & 0xF) as u16;
            regs[MP_BASE + mp].wrapping_add(offset)
        }
        AddrMode::DirectReg => {
            let base = ((field >> 4) & 0xFFF) as u16;
            let reg = (field & 0xF) as usize;
            base.wrapping_add(regs[reg])
        }
        AddrMode::PointerReg => {
            let mp = ((field >> 14) & 0b11) as usize;
            let reg = ((field >> 10) & 0xF) as usize;
            regs[MP_BASE + mp].wrapping_add(regs[reg])
        }
    }
}

// Field builders. Callers range-check; values are masked to their widths here.

pub fn direct(addr: u16) -> u32 {
    addr as u32
}

pub fn pointer_imm(mp: u8, offset: u8) -> u32 {
    (((mp & 0b11) as u32) << 14) | (((offset & 0xF) as u32) << 10)
}

pub fn direct_reg(base: u16, reg: u8) -> u32 {
    (((base & 0xFFF) as u32) << 4) | (reg & 0xF) as u32
}

pub fn pointer_reg(mp: u8, reg: u8) -> u32 {
    (((mp & 0b11) as u32) << 14) | (((reg & 0xF) as u32) << 10)
}
