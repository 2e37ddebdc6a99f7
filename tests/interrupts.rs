use rm16::cpu::VECTOR_BASE;
use rm16::exec::IntExecutor;
use rm16::isa::rm16::Rm16Decoder;
use rm16::{assemble, load_program, Bus, Cpu, CpuConfig, LinearMemory};

fn boot(src: &str) -> (Cpu, LinearMemory) {
    let words = assemble(src).unwrap();
    let mut mem = LinearMemory::new();
    load_program(&mut mem, 0, &words).unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);
    (cpu, mem)
}

#[test]
fn int_saves_pc_and_a_then_vectors() {
    let (mut cpu, mut mem) = boot("RI MOV A, 0x0042\nRI STI\nRI INT 0x02");
    mem.write_word(VECTOR_BASE + 2, 0x9000).unwrap();

    let dec = Rm16Decoder::new();
    for _ in 0..2 {
        cpu.step(&mut mem, &dec, &IntExecutor).unwrap();
    }
    assert!(cpu.interrupts_enabled());
    cpu.step(&mut mem, &dec, &IntExecutor).unwrap();

    assert_eq!(cpu.pc, 0x9000);
    assert!(!cpu.interrupts_enabled());
    assert_eq!(cpu.sp(), 0xFEFE);
    assert_eq!(mem.read_word(0xFEFF).unwrap(), 3);
    assert_eq!(mem.read_word(0xFEFE).unwrap(), 0x0042);
}

#[test]
fn handler_pops_a_before_rti() {
    let (mut cpu, mut mem) = boot(
        "RI MOV A, 0x0011\n\
         RI INT 0x05\n\
         RI MOV B, 1\n\
         RI HLT\n\
         HANDLER:\n\
         RI MOV A, 0x00FF\n\
         RR POP A\n\
         RI RTI",
    );
    mem.write_word(VECTOR_BASE + 5, 4).unwrap();
    cpu.run(&mut mem, &Rm16Decoder::new(), &IntExecutor, 100).unwrap();

    assert!(cpu.is_halted());
    assert_eq!(cpu.regs[0], 0x0011);
    assert_eq!(cpu.regs[1], 1);
    assert_eq!(cpu.sp(), 0xFF00);
}

#[test]
fn rti_pops_only_the_pc() {
    // Without the POP, RTI returns to the saved A value.
    let (mut cpu, mut mem) = boot("RI MOV A, 0x0020\nRI INT 0x01\nRI HLT\nRI HLT\nRI RTI");
    mem.write_word(VECTOR_BASE + 1, 4).unwrap();
    mem.write_cell(0x0020, assemble("RI HLT").unwrap()[0]).unwrap();
    cpu.run(&mut mem, &Rm16Decoder::new(), &IntExecutor, 100).unwrap();

    assert_eq!(cpu.pc, 0x0021);
    assert_eq!(cpu.sp(), 0xFEFF);
}

#[test]
fn sti_cli_toggle_ie_without_gating_int() {
    let (mut cpu, mut mem) = boot("RI STI\nRR CLI\nRI INT 0x00");
    mem.write_word(VECTOR_BASE, 0x0100).unwrap();
    let dec = Rm16Decoder::new();

    cpu.step(&mut mem, &dec, &IntExecutor).unwrap();
    assert!(cpu.interrupts_enabled());
    cpu.step(&mut mem, &dec, &IntExecutor).unwrap();
    assert!(!cpu.interrupts_enabled());
    cpu.step(&mut mem, &dec, &IntExecutor).unwrap();
    assert_eq!(cpu.pc, 0x0100);
}

#[test]
fn external_interrupt_uses_same_entry() {
    let (mut cpu, mut mem) = boot("RI NOP");
    mem.write_word(VECTOR_BASE + 0x10, 0x0777).unwrap();
    cpu.regs[0] = 0xAAAA;
    cpu.pc = 0x0123;
    cpu.interrupt(&mut mem, 0x10).unwrap();

    assert_eq!(cpu.pc, 0x0777);
    assert_eq!(cpu.pop(&mut mem).unwrap(), 0xAAAA);
    assert_eq!(cpu.pop(&mut mem).unwrap(), 0x0123);
}
