use tracing::debug;

use crate::addressing::{resolve, AddrMode};
use crate::cpu::{Cpu, Flags, RunState, Trap};
use crate::decoder::{Alu, Cond, Decoded, RcmOp, RiOp, RmOp, RrOp};
use crate::memory::Bus;

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap>;
}

/// Floor division; `None` on a zero divisor.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

impl Alu {
    /// Unmasked result of `a op b`. `Not` complements `b`; shifts and rotates
    /// take the low four bits of `b`.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        let sh = (b & 0xF) as u32;
        Some(match self {
            Alu::Add => a + b,
            Alu::Sub => a - b,
            Alu::Mul => a * b,
            Alu::Div => return floor_div(a, b),
            Alu::And => a & b,
            Alu::Or => a | b,
            Alu::Xor => a ^ b,
            Alu::Not => !b,
            Alu::Shl => a << sh,
            Alu::Slr => (a & 0xFFFF) >> sh,
            Alu::Sar => ((a & 0xFFFF) as u16 as i16 as i64) >> sh,
            Alu::Rol => ((a & 0xFFFF) as u16).rotate_left(sh) as i64,
            Alu::Ror => ((a & 0xFFFF) as u16).rotate_right(sh) as i64,
        })
    }
}

/// LT/EQ/GT of a register value read as signed.
pub fn check_value(cond: Cond, value: u16) -> bool {
    let v = value as i16;
    (cond.contains(Cond::LT) && v < 0)
        || (cond.contains(Cond::EQ) && v == 0)
        || (cond.contains(Cond::GT) && v > 0)
}

/// LT on SIGN, EQ on ZERO, GT on neither.
pub fn check_flags(cond: Cond, flags: Flags) -> bool {
    let sign = flags.contains(Flags::SIGN);
    let zero = flags.contains(Flags::ZERO);
    (cond.contains(Cond::LT) && sign)
        || (cond.contains(Cond::EQ) && zero)
        || (cond.contains(Cond::GT) && !sign && !zero)
}

fn load<B: Bus>(bus: &mut B, addr: u16) -> Result<u16, Trap> {
    bus.read_word(addr).map_err(|source| Trap::Bus { addr, source })
}

fn store<B: Bus>(bus: &mut B, addr: u16, val: u16) -> Result<(), Trap> {
    bus.write_word(addr, val)
        .map_err(|source| Trap::Bus { addr, source })
}

/// Address of the instruction being executed; the PC has already moved past it.
fn current_pc(cpu: &Cpu) -> u16 {
    cpu.pc.wrapping_sub(1)
}

fn arith(cpu: &mut Cpu, rd: usize, alu: Alu, a: i64, b: i64) -> Result<(), Trap> {
    let res = alu
        .apply(a, b)
        .ok_or(Trap::DivideByZero { pc: current_pc(cpu) })?;
    cpu.set_flags(res);
    cpu.regs[rd] = (res & 0xFFFF) as u16;
    Ok(())
}

fn halt(cpu: &mut Cpu) {
    debug!(pc = current_pc(cpu), "halt");
    cpu.state = RunState::Halted;
}

fn exec_rr<B: Bus>(cpu: &mut Cpu, bus: &mut B, op: RrOp, rd: usize, rs1: usize, rs2: usize) -> Result<(), Trap> {
    match op {
        RrOp::Mov => cpu.regs[rd] = cpu.regs[rs1],
        RrOp::Psh => cpu.push(bus, cpu.regs[rd])?,
        RrOp::Pop => cpu.regs[rd] = cpu.pop(bus)?,
        RrOp::Swp => cpu.regs.swap(rd, rs1),
        RrOp::Alu(Alu::Not) => {
            let b = cpu.regs[rs1] as i64;
            arith(cpu, rd, Alu::Not, 0, b)?;
        }
        RrOp::Alu(alu) => {
            let a = cpu.regs[rs1] as i64;
            let b = cpu.regs[rs2] as i64;
            arith(cpu, rd, alu, a, b)?;
        }
        RrOp::Inc | RrOp::Dec => {
            let a = cpu.regs[rd] as i64;
            let alu = if op == RrOp::Inc { Alu::Add } else { Alu::Sub };
            arith(cpu, rd, alu, a, 1)?;
        }
        RrOp::Cmp => cpu.set_flags(cpu.regs[rd] as i64 - cpu.regs[rs1] as i64),
        RrOp::Ret | RrOp::Rti => cpu.pc = cpu.pop(bus)?,
        RrOp::Hlt => halt(cpu),
        RrOp::Nop => {}
        RrOp::Sti => cpu.flags.insert(Flags::INTERRUPT_ENABLE),
        RrOp::Cli => cpu.flags.remove(Flags::INTERRUPT_ENABLE),
    }
    Ok(())
}

fn exec_ri<B: Bus>(cpu: &mut Cpu, bus: &mut B, op: RiOp, rd: usize, imm: i32) -> Result<(), Trap> {
    let imm = imm as i64;
    let a = cpu.regs[rd] as i64;
    match op {
        RiOp::Mov => cpu.regs[rd] = (imm & 0xFFFF) as u16,
        RiOp::Alu(alu) => arith(cpu, rd, alu, a, imm)?,
        RiOp::Inc => arith(cpu, rd, Alu::Add, a, 1)?,
        RiOp::Dec => arith(cpu, rd, Alu::Sub, a, 1)?,
        RiOp::Jmp => cpu.pc = (imm & 0xFFFF) as u16,
        RiOp::Jsr => {
            cpu.push(bus, cpu.pc)?;
            cpu.pc = (imm & 0xFFFF) as u16;
        }
        RiOp::Cmp => cpu.set_flags(a - imm),
        // RTI restores only the PC; A stays as the handler left it.
        RiOp::Ret | RiOp::Rti => cpu.pc = cpu.pop(bus)?,
        RiOp::Hlt => halt(cpu),
        RiOp::Nop => {}
        RiOp::Int => cpu.interrupt(bus, (imm & 0xFF) as u8)?,
        RiOp::Sti => cpu.flags.insert(Flags::INTERRUPT_ENABLE),
        RiOp::Cli => cpu.flags.remove(Flags::INTERRUPT_ENABLE),
    }
    Ok(())
}

fn exec_rm<B: Bus>(cpu: &mut Cpu, bus: &mut B, op: RmOp, rd: usize, mode: AddrMode, field: u32) -> Result<(), Trap> {
    let addr = resolve(mode, field, &cpu.regs);
    let a = cpu.regs[rd] as i64;
    match op {
        RmOp::Mov => cpu.regs[rd] = load(bus, addr)?,
        RmOp::Str => store(bus, addr, cpu.regs[rd])?,
        RmOp::Alu(Alu::Div) => {
            let divisor = load(bus, addr)?;
            if divisor == 0 {
                // Saturates instead of trapping; flags are left alone.
                cpu.regs[rd] = 0xFFFF;
            } else {
                arith(cpu, rd, Alu::Div, a, divisor as i64)?;
            }
        }
        RmOp::Alu(alu) => {
            let b = load(bus, addr)? as i64;
            arith(cpu, rd, alu, a, b)?;
        }
        RmOp::Jmp => cpu.pc = addr,
        RmOp::Jsr => {
            cpu.push(bus, cpu.pc)?;
            cpu.pc = addr;
        }
        RmOp::Cmp => {
            let b = load(bus, addr)? as i64;
            cpu.set_flags(a - b);
        }
    }
    Ok(())
}

fn exec_rcm<B: Bus>(cpu: &mut Cpu, bus: &mut B, op: RcmOp, reg: usize, cond: Cond, addr: u16) -> Result<(), Trap> {
    match op {
        RcmOp::Jmp => cpu.pc = addr,
        RcmOp::Jcr => {
            if check_value(cond, cpu.regs[reg]) {
                cpu.pc = addr;
            }
        }
        RcmOp::Jsr => {
            cpu.push(bus, cpu.pc)?;
            cpu.pc = addr;
        }
        RcmOp::Jcf => {
            if check_flags(cond, cpu.flags) {
                cpu.pc = addr;
            }
        }
    }
    Ok(())
}

pub struct IntExecutor;
impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap> {
        match d {
            Decoded::Rr { op, rd, rs1, rs2 } => exec_rr(cpu, bus, op, rd as usize, rs1 as usize, rs2 as usize),
            Decoded::Ri { op, rd, imm } => exec_ri(cpu, bus, op, rd as usize, imm),
            Decoded::Rm { op, rd, mode, field } => exec_rm(cpu, bus, op, rd as usize, mode, field),
            Decoded::Rcm { op, reg, cond, addr } => exec_rcm(cpu, bus, op, reg as usize, cond, addr),
        }
    }
}
