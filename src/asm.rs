//! Two-pass assembler.
//!
//! Source is line oriented. `;` starts a comment, a bare `NAME:` line binds a
//! label to the current address, and every instruction line starts with its
//! format keyword (`RR`, `RI`, `RM`, `RCM`) followed by a mnemonic and
//! comma-separated operands:
//!
//! ```text
//!         RI MOV A, 0x0005
//! LOOP:
//!         RM ADD A, [MP1 + 2]
//!         RCM JCF A, NE, LOOP
//! MSG:
//!         .DATA "Hi"
//! ```
//!
//! Everything except string literals is upper-cased before either pass runs.
//! The label pass runs to completion before encoding, so labels may be used
//! ahead of their definition.

use std::collections::BTreeMap;

use tracing::debug;

use crate::addressing::{self, AddrMode};
use crate::decoder::Cond;
use crate::instructions::{condition, opcode, pointer, register};
use crate::isa::codec::{RcmWord, RiWord, RmWord, RrWord, Word};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmErrorKind {
    #[error("unknown format keyword `{0}`")]
    UnknownFormat(String),
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("unknown register `{0}`")]
    UnknownRegister(String),
    #[error("unknown condition `{0}`")]
    UnknownCondition(String),
    #[error("unknown directive `{0}`")]
    UnknownDirective(String),
    #[error("{format} expects {expected} operand(s), found {found}")]
    OperandCount {
        format: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("cannot parse immediate or resolve label `{0}`")]
    BadImmediate(String),
    #[error("{what} too large: {value:#x} (limit {limit:#x})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        limit: i64,
    },
    #[error("label `{0}` defined more than once")]
    DuplicateLabel(String),
    #[error("malformed label `{0}`")]
    BadLabel(String),
    #[error("malformed directive operands `{0}`")]
    BadDirective(String),
}

/// An assembly failure, tagged with the 1-based source line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind} in `{text}`")]
pub struct AsmError {
    pub line: usize,
    pub text: String,
    pub kind: AsmErrorKind,
}

#[derive(Debug, Clone)]
struct SourceLine {
    line: usize,
    text: String,
}

impl SourceLine {
    fn err(&self, kind: AsmErrorKind) -> AsmError {
        AsmError {
            line: self.line,
            text: self.text.clone(),
            kind,
        }
    }

    fn label(&self) -> Option<&str> {
        self.text.strip_suffix(':').map(str::trim)
    }

    fn is_directive(&self) -> bool {
        self.text.starts_with('.')
    }
}

/// Strip the comment and upper-case everything outside string literals.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_str = false;
    for c in raw.chars() {
        match c {
            '"' => {
                in_str = !in_str;
                out.push(c);
            }
            ';' if !in_str => break,
            _ if in_str => out.push(c),
            _ => out.extend(c.to_uppercase()),
        }
    }
    out.trim().to_string()
}

fn preprocess(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .map(|(i, raw)| SourceLine { line: i + 1, text: normalize(raw) })
        .filter(|l| !l.text.is_empty())
        .collect()
}

fn split_operands(s: &str) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    s.split(',').map(str::trim).collect()
}

/// First whitespace-delimited word and the remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace).unwrap_or((s, ""))
}

fn parse_number(s: &str) -> Option<i64> {
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (digits, radix) = match body.strip_prefix("0X") {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    // from_str_radix would also take a sign here
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let v = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { -v } else { v })
}

fn check_range(what: &'static str, value: i64, min: i64, max: i64) -> Result<i64, AsmErrorKind> {
    if value < min || value > max {
        Err(AsmErrorKind::OutOfRange { what, value, limit: max })
    } else {
        Ok(value)
    }
}

fn reg(name: &str) -> Result<u8, AsmErrorKind> {
    register(name).ok_or_else(|| AsmErrorKind::UnknownRegister(name.to_string()))
}

enum Directive {
    Data(String),
    Byte(Vec<String>),
    Word(Vec<String>),
}

fn parse_directive(text: &str) -> Result<Directive, AsmErrorKind> {
    let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let rest = rest.trim();
    let list = || -> Result<Vec<String>, AsmErrorKind> {
        let items: Vec<String> = split_operands(rest).into_iter().map(str::to_string).collect();
        if items.is_empty() || items.iter().any(String::is_empty) {
            return Err(AsmErrorKind::BadDirective(rest.to_string()));
        }
        Ok(items)
    };
    match name {
        ".DATA" => {
            let body = rest
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .filter(|b| !b.contains('"'))
                .ok_or_else(|| AsmErrorKind::BadDirective(rest.to_string()))?;
            Ok(Directive::Data(body.to_string()))
        }
        ".BYTE" => Ok(Directive::Byte(list()?)),
        ".WORD" => Ok(Directive::Word(list()?)),
        _ => Err(AsmErrorKind::UnknownDirective(name.to_string())),
    }
}

impl Directive {
    fn len(&self) -> usize {
        match self {
            Directive::Data(s) => s.chars().count() + 1,
            Directive::Byte(v) => v.len(),
            Directive::Word(v) => v.len() * 2,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Assembler {
    origin: u16,
    labels: BTreeMap<String, u16>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels resolve relative to `origin` (the load address).
    pub fn with_origin(origin: u16) -> Self {
        Self {
            origin,
            labels: BTreeMap::new(),
        }
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// Label table of the last run.
    pub fn labels(&self) -> &BTreeMap<String, u16> {
        &self.labels
    }

    pub fn assemble(&mut self, source: &str) -> Result<Vec<u32>, AsmError> {
        let lines = preprocess(source);
        self.labels.clear();
        self.collect_labels(&lines)?;

        let mut out = Vec::with_capacity(lines.len());
        for line in &lines {
            if line.label().is_some() {
                continue;
            }
            if line.is_directive() {
                let words = self.encode_directive(&line.text).map_err(|k| line.err(k))?;
                out.extend(words);
            } else {
                out.push(self.encode_line(&line.text).map_err(|k| line.err(k))?);
            }
        }
        debug!(words = out.len(), labels = self.labels.len(), origin = self.origin, "assembled");
        Ok(out)
    }

    fn collect_labels(&mut self, lines: &[SourceLine]) -> Result<(), AsmError> {
        let mut addr = self.origin;
        for line in lines {
            if let Some(name) = line.label() {
                if name.is_empty() || name.contains(char::is_whitespace) {
                    return Err(line.err(AsmErrorKind::BadLabel(name.to_string())));
                }
                if self.labels.insert(name.to_string(), addr).is_some() {
                    return Err(line.err(AsmErrorKind::DuplicateLabel(name.to_string())));
                }
            } else if line.is_directive() {
                let d = parse_directive(&line.text).map_err(|k| line.err(k))?;
                addr = addr.wrapping_add(d.len() as u16);
            } else {
                addr = addr.wrapping_add(1);
            }
        }
        Ok(())
    }

    /// Decimal, `0x` hex, or a label from the first pass.
    fn value(&self, s: &str) -> Result<i64, AsmErrorKind> {
        if let Some(&addr) = self.labels.get(s) {
            return Ok(addr as i64);
        }
        parse_number(s).ok_or_else(|| AsmErrorKind::BadImmediate(s.to_string()))
    }

    fn encode_line(&self, text: &str) -> Result<u32, AsmErrorKind> {
        let (format, rest) = split_word(text);
        let (mnemonic, rest) = split_word(rest);
        let operands = split_operands(rest);

        let encoder: fn(&Self, u8, &[&str]) -> Result<Word, AsmErrorKind> = match format {
            "RR" => Self::encode_rr,
            "RI" => Self::encode_ri,
            "RM" => Self::encode_rm,
            "RCM" => Self::encode_rcm,
            _ => return Err(AsmErrorKind::UnknownFormat(format.to_string())),
        };
        let op = opcode(mnemonic).ok_or_else(|| AsmErrorKind::UnknownMnemonic(mnemonic.to_string()))?;
        Ok(encoder(self, op, &operands)?.pack())
    }

    fn encode_rr(&self, opcode: u8, ops: &[&str]) -> Result<Word, AsmErrorKind> {
        let (rd, rs1, rs2) = match *ops {
            [] => (0, 0, 0),
            [d] => {
                let d = reg(d)?;
                (d, d, d)
            }
            [d, s1] => {
                let d = reg(d)?;
                (d, reg(s1)?, d)
            }
            [d, s1, s2] => (reg(d)?, reg(s1)?, reg(s2)?),
            _ => {
                return Err(AsmErrorKind::OperandCount {
                    format: "RR",
                    expected: "0 to 3",
                    found: ops.len(),
                })
            }
        };
        Ok(Word::Rr(RrWord { opcode, rd, rs1, rs2 }))
    }

    fn encode_ri(&self, opcode: u8, ops: &[&str]) -> Result<Word, AsmErrorKind> {
        let (rd, imm) = match *ops {
            [] => (0, 0),
            [imm] => (0, self.value(imm)?),
            [d, imm] => (reg(d)?, self.value(imm)?),
            _ => {
                return Err(AsmErrorKind::OperandCount {
                    format: "RI",
                    expected: "0 to 2",
                    found: ops.len(),
                })
            }
        };
        let imm = check_range("immediate", imm, -0x8000, 0xFFFF)?;
        Ok(Word::Ri(RiWord {
            opcode,
            rd,
            imm: (imm & 0xFFFF) as u16,
        }))
    }

    fn encode_rm(&self, opcode: u8, ops: &[&str]) -> Result<Word, AsmErrorKind> {
        let (rd, mem) = match *ops {
            [mem] => (0, mem),
            [d, mem] => (reg(d)?, mem),
            _ => {
                return Err(AsmErrorKind::OperandCount {
                    format: "RM",
                    expected: "1 or 2",
                    found: ops.len(),
                })
            }
        };
        let (mode, field) = self.encode_address(mem)?;
        Ok(Word::Rm(RmWord { opcode, rd, mode, field }))
    }

    fn encode_rcm(&self, opcode: u8, ops: &[&str]) -> Result<Word, AsmErrorKind> {
        let (reg_idx, cond, addr) = match *ops {
            [addr] => (0, Cond::AL, addr),
            [r, c, addr] => {
                let cond = condition(c).ok_or_else(|| AsmErrorKind::UnknownCondition(c.to_string()))?;
                (reg(r)?, cond, addr)
            }
            _ => {
                return Err(AsmErrorKind::OperandCount {
                    format: "RCM",
                    expected: "1 or 3",
                    found: ops.len(),
                })
            }
        };
        let addr = check_range("address", self.value(addr)?, 0, 0xFFFF)?;
        Ok(Word::Rcm(RcmWord {
            opcode,
            reg: reg_idx,
            cond: cond.bits(),
            addr: addr as u16,
        }))
    }

    /// `[addr]` -> mode 00, `[MPn + imm4]` -> mode 01, `[base12 + reg]` -> mode 10.
    /// Mode 11 has no source syntax.
    fn encode_address(&self, operand: &str) -> Result<(AddrMode, u32), AsmErrorKind> {
        let inner = operand.trim();
        let inner = inner.strip_prefix('[').unwrap_or(inner);
        let inner = inner.strip_suffix(']').unwrap_or(inner).trim();

        match inner.split_once('+') {
            Some((base, offset)) => {
                let (base, offset) = (base.trim(), offset.trim());
                if let Some(mp) = pointer(base) {
                    let off = check_range("offset", self.value(offset)?, 0, 0xF)?;
                    Ok((AddrMode::PointerImm, addressing::pointer_imm(mp, off as u8)))
                } else {
                    let base = check_range("base", self.value(base)?, 0, 0xFFF)?;
                    let r = reg(offset)?;
                    Ok((AddrMode::DirectReg, addressing::direct_reg(base as u16, r)))
                }
            }
            None => {
                let addr = check_range("address", self.value(inner)?, 0, 0xFFFF)?;
                Ok((AddrMode::Direct, addressing::direct(addr as u16)))
            }
        }
    }

    fn encode_directive(&self, text: &str) -> Result<Vec<u32>, AsmErrorKind> {
        match parse_directive(text)? {
            Directive::Data(s) => {
                let mut words = s.chars().map(|c| c as u32).collect::<Vec<_>>();
                if let Some(&w) = words.iter().find(|&&w| w > 0xFFFF) {
                    return Err(AsmErrorKind::OutOfRange { what: "character", value: w as i64, limit: 0xFFFF });
                }
                words.push(0);
                Ok(words)
            }
            Directive::Byte(items) => items
                .iter()
                .map(|v| -> Result<u32, AsmErrorKind> {
                    Ok(check_range("byte", self.value(v)?, 0, 0xFF)? as u32)
                })
                .collect(),
            Directive::Word(items) => {
                let mut words = Vec::with_capacity(items.len() * 2);
                for v in &items {
                    let w = check_range("word", self.value(v)?, -0x8000, 0xFFFF)? & 0xFFFF;
                    words.push((w & 0xFF) as u32);
                    words.push((w >> 8) as u32);
                }
                Ok(words)
            }
        }
    }
}

/// Assemble with origin 0.
pub fn assemble(source: &str) -> Result<Vec<u32>, AsmError> {
    Assembler::new().assemble(source)
}
