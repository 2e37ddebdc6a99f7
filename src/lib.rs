pub mod addressing;
pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod memory;

pub mod isa {
    pub mod codec; // 32-bit instruction word layout
    pub mod rm16;
}

pub use asm::{assemble, AsmError, AsmErrorKind, Assembler};
pub use cpu::{Cpu, CpuConfig, Flags, RunState, Trap};
pub use memory::{load_program, Bus, IoDevice, LinearMemory, MappedBus, NullDevice};
