use crate::addressing::{AddrMode, MP_BASE};
use crate::decoder::{Cond, Decoded, Decoder};
use crate::instructions::{condition_name, mnemonic, register_name};
use crate::isa::rm16::Rm16Decoder;

fn mn(code: u8) -> String {
    mnemonic(code).map(str::to_string).unwrap_or_else(|| format!("{code:#04x}"))
}

fn cond(c: Cond) -> String {
    condition_name(c).map(str::to_string).unwrap_or_else(|| format!("{:#05b}", c.bits()))
}

/// Memory operand in source syntax. Mode 11 prints as `[MPn + reg]`, which the
/// assembler does not accept.
pub fn fmt_address(mode: AddrMode, field: u32) -> String {
    let mp = || register_name(MP_BASE as u8 + ((field >> 14) & 0b11) as u8);
    match mode {
        AddrMode::Direct => format!("[{:#06x}]", field & 0xFFFF),
        AddrMode::PointerImm => format!("[{} + {}]", mp(), (field >> 10) & 0xF),
        AddrMode::DirectReg => format!("[{:#05x} + {}]", (field >> 4) & 0xFFF, register_name((field & 0xF) as u8)),
        AddrMode::PointerReg => format!("[{} + {}]", mp(), register_name(((field >> 10) & 0xF) as u8)),
    }
}

pub fn fmt_decoded(d: &Decoded) -> String {
    let operands = match *d {
        Decoded::Rr { op, rd, rs1, rs2 } => format!(
            "{} {}, {}, {}",
            mn(op.code()),
            register_name(rd),
            register_name(rs1),
            register_name(rs2)
        ),
        Decoded::Ri { op, rd, imm } => {
            format!("{} {}, {:#06x}", mn(op.code()), register_name(rd), imm as u16)
        }
        Decoded::Rm { op, rd, mode, field } => {
            format!("{} {}, {}", mn(op.code()), register_name(rd), fmt_address(mode, field))
        }
        Decoded::Rcm { op, reg, cond: c, addr } => {
            format!("{} {}, {}, {:#06x}", mn(op.code()), register_name(reg), cond(c), addr)
        }
    };
    format!("{} {operands}", d.format())
}

/// Any cell as text; undecodable words print as `??? <raw>`.
pub fn disassemble(raw32: u32) -> String {
    match Rm16Decoder::new().decode(raw32) {
        Ok(d) => fmt_decoded(&d),
        Err(_) => format!("??? {raw32:#010x}"),
    }
}
