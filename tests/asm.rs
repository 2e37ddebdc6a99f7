use pretty_assertions::assert_eq;

use rm16::{assemble, AsmErrorKind, Assembler};

fn kind(src: &str) -> AsmErrorKind {
    assemble(src).unwrap_err().kind
}

#[test]
fn encodes_ri_mov() {
    assert_eq!(assemble("RI MOV A, 0x0005").unwrap(), vec![0x4000_0005]);
    assert_eq!(assemble("RI ADD B, 3").unwrap(), vec![0x5001_0003]);
}

#[test]
fn label_resolves_to_its_address() {
    let mut asm = Assembler::new();
    let words = asm
        .assemble("RI NOP\nRI NOP\nLOOP:\nRI NOP\nRI JMP LOOP")
        .unwrap();
    assert_eq!(words.len(), 4);
    assert_eq!(asm.labels().get("LOOP"), Some(&2));
    assert_eq!(words[3], 0x6000_0002);
}

#[test]
fn forward_references_and_origin() {
    let mut asm = Assembler::with_origin(0x8000);
    let words = asm.assemble("RCM JMP END\nRI NOP\nEND:\nRI HLT").unwrap();
    assert_eq!(asm.origin(), 0x8000);
    assert_eq!(asm.labels().get("END"), Some(&0x8002));
    assert_eq!(words[0] & 0xFFFF, 0x8002);
}

#[test]
fn data_emits_characters_and_terminator() {
    assert_eq!(assemble(".DATA \"HI\"").unwrap(), vec![72, 73, 0]);
}

#[test]
fn string_literals_keep_case_and_semicolons() {
    assert_eq!(assemble(".data \"Hi\"").unwrap(), vec![72, 105, 0]);
    assert_eq!(assemble(".DATA \"a;b\" ; trailing").unwrap(), vec![97, 59, 98, 0]);
}

#[test]
fn byte_and_word_directives() {
    assert_eq!(assemble(".BYTE 1, 0x02, 255").unwrap(), vec![1, 2, 255]);
    assert_eq!(assemble(".WORD 0x1234, -1").unwrap(), vec![0x34, 0x12, 0xFF, 0xFF]);
}

#[test]
fn directives_advance_label_addresses() {
    let mut asm = Assembler::new();
    asm.assemble(".DATA \"AB\"\n.WORD 7\n.BYTE 1\nEND:\nRI HLT").unwrap();
    assert_eq!(asm.labels().get("END"), Some(&6));
}

#[test]
fn source_is_case_insensitive() {
    assert_eq!(assemble("ri mov a, 0x0a").unwrap(), assemble("RI MOV A, 10").unwrap());
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let src = "; header\n\n   RI NOP   ; idle\n\t\nRI HLT";
    assert_eq!(assemble(src).unwrap().len(), 2);
}

#[test]
fn relaxed_operand_forms() {
    // missing sources default to rd
    assert_eq!(assemble("RR INC B").unwrap(), assemble("RR INC B, B, B").unwrap());
    assert_eq!(assemble("RR NOT A, C").unwrap(), assemble("RR NOT A, C, A").unwrap());
    // one RCM operand means reg A, always
    assert_eq!(assemble("RCM JMP 0x10").unwrap(), assemble("RCM JMP A, AL, 0x10").unwrap());
    // one RM operand targets A
    assert_eq!(assemble("RM JMP [0x10]").unwrap(), assemble("RM JMP A, [0x10]").unwrap());
}

#[test]
fn error_reports_line_and_text() {
    let err = assemble("; header\n\nRI MOV A, 1\nRR BAD A").unwrap_err();
    assert_eq!(err.line, 4);
    assert_eq!(err.text, "RR BAD A");
    assert_eq!(err.kind, AsmErrorKind::UnknownMnemonic("BAD".into()));
    assert_eq!(err.to_string(), "line 4: unknown mnemonic `BAD` in `RR BAD A`");
}

#[test]
fn lookup_errors() {
    assert_eq!(kind("XX MOV A"), AsmErrorKind::UnknownFormat("XX".into()));
    assert_eq!(kind("RR MOV Q, A"), AsmErrorKind::UnknownRegister("Q".into()));
    assert_eq!(kind("RCM JCR A, XX, 0"), AsmErrorKind::UnknownCondition("XX".into()));
    assert_eq!(kind(".ORG 0x100"), AsmErrorKind::UnknownDirective(".ORG".into()));
    assert_eq!(kind("RI MOV A, NOWHERE"), AsmErrorKind::BadImmediate("NOWHERE".into()));
}

#[test]
fn immediates_are_plain_decimal_or_hex() {
    for bad in ["--5", "+5", "0X-5", "0X+5", "-", "0X", "5A", "0XG1", "- 5"] {
        assert_eq!(
            kind(&format!("RI MOV A, {bad}")),
            AsmErrorKind::BadImmediate(bad.into()),
            "{bad}"
        );
    }
    assert_eq!(assemble("RI MOV A, -5").unwrap(), vec![0x4000_FFFB]);
    assert_eq!(assemble("RI MOV A, -0x10").unwrap(), vec![0x4000_FFF0]);
    assert_eq!(assemble("RI MOV A, 0xfF").unwrap(), vec![0x4000_00FF]);
}

#[test]
fn operand_count_errors() {
    assert_eq!(
        kind("RM MOV"),
        AsmErrorKind::OperandCount { format: "RM", expected: "1 or 2", found: 0 }
    );
    assert_eq!(
        kind("RCM JMP A, 0"),
        AsmErrorKind::OperandCount { format: "RCM", expected: "1 or 3", found: 2 }
    );
    assert!(matches!(kind("RI MOV A, 1, 2"), AsmErrorKind::OperandCount { found: 3, .. }));
    assert!(matches!(kind("RR ADD A, B, C, D"), AsmErrorKind::OperandCount { found: 4, .. }));
}

#[test]
fn range_errors() {
    assert!(matches!(kind("RI MOV A, 0x10000"), AsmErrorKind::OutOfRange { what: "immediate", .. }));
    assert!(matches!(kind("RI MOV A, -0x8001"), AsmErrorKind::OutOfRange { what: "immediate", .. }));
    assert!(matches!(kind("RCM JMP 0x10000"), AsmErrorKind::OutOfRange { what: "address", .. }));
    assert!(matches!(kind(".BYTE 256"), AsmErrorKind::OutOfRange { what: "byte", .. }));
    assert!(matches!(kind(".WORD 0x10000"), AsmErrorKind::OutOfRange { what: "word", .. }));
}

#[test]
fn label_errors() {
    assert_eq!(kind("A1:\nRI NOP\nA1:"), AsmErrorKind::DuplicateLabel("A1".into()));
    assert_eq!(kind("TWO WORDS:"), AsmErrorKind::BadLabel("TWO WORDS".into()));
    assert!(matches!(kind(".DATA HI"), AsmErrorKind::BadDirective(_)));
    assert!(matches!(kind(".BYTE"), AsmErrorKind::BadDirective(_)));
}

#[test]
fn assembler_can_be_reused() {
    let mut asm = Assembler::new();
    asm.assemble("FIRST:\nRI NOP").unwrap();
    asm.assemble("SECOND:\nRI NOP").unwrap();
    assert_eq!(asm.labels().keys().map(String::as_str).collect::<Vec<_>>(), vec!["SECOND"]);
}
