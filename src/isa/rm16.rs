use crate::decoder::{Cond, DecodeError, Decoded, Decoder, RcmOp, RiOp, RmOp, RrOp};
use crate::isa::codec::Word;

/// Format-then-opcode decoder for the 32-bit instruction word.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rm16Decoder;

impl Rm16Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Rm16Decoder {
    fn decode(&self, raw32: u32) -> Result<Decoded, DecodeError> {
        let word = Word::unpack(raw32);
        let unknown = || DecodeError::UnknownOpcode {
            format: word.format(),
            opcode: word.opcode(),
            raw: raw32,
        };
        let d = match word {
            Word::Rr(w) => Decoded::Rr {
                op: RrOp::from_code(w.opcode).ok_or_else(unknown)?,
                rd: w.rd,
                rs1: w.rs1,
                rs2: w.rs2,
            },
            Word::Ri(w) => Decoded::Ri {
                op: RiOp::from_code(w.opcode).ok_or_else(unknown)?,
                rd: w.rd,
                imm: w.value(),
            },
            Word::Rm(w) => Decoded::Rm {
                op: RmOp::from_code(w.opcode).ok_or_else(unknown)?,
                rd: w.rd,
                mode: w.mode,
                field: w.field,
            },
            Word::Rcm(w) => Decoded::Rcm {
                op: RcmOp::from_code(w.opcode).ok_or_else(unknown)?,
                reg: w.reg,
                cond: Cond::from_bits_truncate(w.cond),
                addr: w.addr,
            },
        };
        Ok(d)
    }
}
