use rm16::exec::IntExecutor;
use rm16::isa::rm16::Rm16Decoder;
use rm16::{assemble, load_program, Cpu, CpuConfig, LinearMemory};

fn run(src: &str) -> Cpu {
    let words = assemble(src).unwrap();
    let mut mem = LinearMemory::new();
    load_program(&mut mem, 0, &words).unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);
    cpu.run(&mut mem, &Rm16Decoder::new(), &IntExecutor, 1000).unwrap();
    assert!(cpu.is_halted());
    cpu
}

#[test]
fn unconditional_jumps_in_three_formats() {
    let cpu = run(
        "RI JMP ONE\n\
         RI MOV A, 1\n\
         ONE:\n\
         RCM JMP TWO\n\
         RI MOV A, 2\n\
         TWO:\n\
         RM JMP [THREE]\n\
         RI MOV A, 3\n\
         THREE:\n\
         RI MOV B, 7\n\
         RI HLT",
    );
    assert_eq!(cpu.regs[0], 0);
    assert_eq!(cpu.regs[1], 7);
}

#[test]
fn jcr_tests_register_as_signed() {
    let cpu = run(
        "RI MOV A, -1\n\
         RCM JCR A, LT, NEG\n\
         RI MOV B, 1\n\
         RI HLT\n\
         NEG:\n\
         RI MOV B, 2\n\
         RI HLT",
    );
    assert_eq!(cpu.regs[1], 2);

    let cpu = run(
        "RI MOV A, 0x7FFF\n\
         RCM JCR A, LE, SKIP\n\
         RI MOV B, 1\n\
         SKIP:\n\
         RI HLT",
    );
    assert_eq!(cpu.regs[1], 1);
}

#[test]
fn jcf_follows_flags() {
    let cpu = run(
        "RI MOV A, 4\n\
         RI CMP A, 4\n\
         RCM JCF A, EQ, SAME\n\
         RI MOV B, 1\n\
         RI HLT\n\
         SAME:\n\
         RI MOV B, 2\n\
         RI HLT",
    );
    assert_eq!(cpu.regs[1], 2);

    // GT holds only when neither SIGN nor ZERO is set
    let cpu = run(
        "RI MOV A, 9\n\
         RI CMP A, 4\n\
         RCM JCF A, GT, BIG\n\
         RI HLT\n\
         BIG:\n\
         RI MOV B, 3\n\
         RI HLT",
    );
    assert_eq!(cpu.regs[1], 3);
}

#[test]
fn countdown_loop() {
    let cpu = run(
        "RI MOV A, 5\n\
         RI MOV B, 0\n\
         LOOP:\n\
         RI ADD B, 2\n\
         RR DEC A\n\
         RCM JCF A, NE, LOOP\n\
         RI HLT",
    );
    assert_eq!(cpu.regs[0], 0);
    assert_eq!(cpu.regs[1], 10);
}

#[test]
fn subroutine_call_and_return() {
    let cpu = run(
        "RCM JSR SUB\n\
         RI JSR SUB\n\
         RM JSR [SUB]\n\
         RI HLT\n\
         SUB:\n\
         RR INC A\n\
         RR RET",
    );
    assert_eq!(cpu.regs[0], 3);
    assert_eq!(cpu.sp(), 0xFF00);
}

#[test]
fn jsr_pushes_return_address() {
    let words = assemble("RCM JSR TARGET\nRI HLT\nTARGET:\nRI HLT").unwrap();
    let mut mem = LinearMemory::new();
    load_program(&mut mem, 0, &words).unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);
    cpu.step(&mut mem, &Rm16Decoder::new(), &IntExecutor).unwrap();
    assert_eq!(cpu.pc, 2);
    assert_eq!(cpu.sp(), 0xFEFF);
    assert_eq!(cpu.pop(&mut mem).unwrap(), 1);
}
