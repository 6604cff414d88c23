//! End-to-end listings over synthesized method bodies, exercising the
//! public API the way a metadata reader would drive it.

use cildasm::{
    disassemble, ClauseKind, Error, ExceptionClause, MethodBody, Result, Token, TokenResolver,
    UserStrings,
};

/// `#US` heap with one string at index 1: "Hi" (two UTF-16 units plus the
/// trailing flag byte).
const US_HEAP: &[u8] = &[0x00, 0x05, 0x48, 0x00, 0x69, 0x00, 0x01];

struct Fixture<'a> {
    strings: UserStrings<'a>,
}

impl Fixture<'_> {
    fn new() -> Fixture<'static> {
        Fixture {
            strings: UserStrings::from(US_HEAP).unwrap(),
        }
    }
}

impl TokenResolver for Fixture<'_> {
    fn field(&self, token: Token) -> Result<String> {
        if token.row() == 0xBAD {
            return Err(Error::OutOfBounds);
        }
        Ok(format!("int32 Program::counter{}", token.row()))
    }

    fn method(&self, token: Token) -> Result<String> {
        Ok(format!("void Program::Run{}()", token.row()))
    }

    fn token(&self, _token: Token) -> Result<String> {
        Ok("[mscorlib]System.Exception".to_string())
    }

    fn type_name(&self, token: Token) -> Result<String> {
        Ok(format!("Program{}", token.row()))
    }

    fn user_string(&self, index: u32) -> Result<&[u8]> {
        self.strings.raw(index as usize)
    }
}

fn listing(code: &[u8], clauses: Vec<ExceptionClause>) -> String {
    let body = MethodBody::new(code, clauses);
    let mut out = Vec::new();
    disassemble(&body, &Fixture::new(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn tiny_header_end_to_end() {
    // Tiny header: flags 0x2, code size 3 -> first byte (3 << 2) | 0x2
    let raw = [0x0E, 0x00, 0x17, 0x2A];
    let body = MethodBody::from_bytes(&raw).unwrap();
    assert!(!body.is_fat);

    let mut out = Vec::new();
    disassemble(&body, &Fixture::new(), &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\tIL_0000: nop \n\tIL_0001: ldc.i4.1 \n\tIL_0002: ret \n"
    );
}

#[test]
fn fat_header_with_eh_section_end_to_end() {
    // Fat header (12 bytes), 9 code bytes, small EH section with one
    // catch clause over try [0, 5), handler [5, 3)
    let mut raw = Vec::new();
    raw.extend_from_slice(&0x300Bu16.to_le_bytes()); // fat, more sects, header 3 dwords
    raw.extend_from_slice(&2u16.to_le_bytes()); // max stack
    raw.extend_from_slice(&9u32.to_le_bytes()); // code size
    raw.extend_from_slice(&0u32.to_le_bytes()); // no locals
    raw.extend_from_slice(&[0x00, 0xDE, 0x05, 0x14, 0x7A, 0x26, 0xDE, 0x00, 0x2A]);
    raw.extend_from_slice(&[0x00, 0x00, 0x00]); // pad to 4-byte boundary

    raw.push(0x01); // EHTABLE, small
    raw.push(16); // section size: 4 + one 12-byte clause
    raw.extend_from_slice(&[0x00, 0x00]); // reserved
    raw.extend_from_slice(&0u16.to_le_bytes()); // kind: catch
    raw.extend_from_slice(&0u16.to_le_bytes()); // try offset
    raw.push(5); // try length
    raw.extend_from_slice(&5u16.to_le_bytes()); // handler offset
    raw.push(3); // handler length
    raw.extend_from_slice(&0x0100_0010u32.to_le_bytes());

    let body = MethodBody::from_bytes(&raw).unwrap();
    assert!(body.is_fat);
    assert_eq!(body.max_stack, 2);
    assert_eq!(body.exception_clauses.len(), 1);

    let mut out = Vec::new();
    disassemble(&body, &Fixture::new(), &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\t.try { // 0\n\
         \t  IL_0000: nop \n\
         \t  IL_0001: leave.s IL_0008\n\
         \t  IL_0003: ldnull \n\
         \t  IL_0004: throw \n\
         \t} // end .try 0\n\
         \tcatch [mscorlib]System.Exception { // 0\n\
         \t  IL_0005: pop \n\
         \t  IL_0006: leave.s IL_0008\n\
         \t} // end handler 0\n\
         \tIL_0008: ret \n"
    );
}

#[test]
fn nested_clauses_open_outer_close_inner_first() {
    // Inner catch declared before the outer finally enclosing it, the order
    // CIL mandates. Code is twelve nops so every offset is an instruction.
    let inner = ExceptionClause {
        kind: ClauseKind::Catch,
        try_offset: 2,
        try_length: 2,
        handler_offset: 4,
        handler_length: 2,
        token_or_filter: 0x0100_0010,
    };
    let outer = ExceptionClause {
        kind: ClauseKind::Finally,
        try_offset: 0,
        try_length: 8,
        handler_offset: 8,
        handler_length: 2,
        token_or_filter: 0,
    };

    let text = listing(&[0x00; 12], vec![inner, outer]);
    assert_eq!(
        text,
        "\t.try { // 1\n\
         \t  IL_0000: nop \n\
         \t  IL_0001: nop \n\
         \t  .try { // 0\n\
         \t    IL_0002: nop \n\
         \t    IL_0003: nop \n\
         \t  } // end .try 0\n\
         \t  catch [mscorlib]System.Exception { // 0\n\
         \t    IL_0004: nop \n\
         \t    IL_0005: nop \n\
         \t  } // end handler 0\n\
         \t  IL_0006: nop \n\
         \t  IL_0007: nop \n\
         \t} // end .try 1\n\
         \tfinally  { // 1\n\
         \t  IL_0008: nop \n\
         \t  IL_0009: nop \n\
         \t} // end handler 1\n\
         \tIL_000a: nop \n\
         \tIL_000b: nop \n"
    );

    // Brackets balance and nesting returns to the margin
    let opens = text.matches(" { ").count();
    let closes = text.matches("} // end").count();
    assert_eq!(opens, 4);
    assert_eq!(opens, closes);
}

#[test]
fn filter_opens_handler_without_try() {
    let clause = ExceptionClause {
        kind: ClauseKind::Filter,
        try_offset: 0,
        try_length: 1,
        handler_offset: 1,
        handler_length: 1,
        token_or_filter: 0,
    };

    let text = listing(&[0x00, 0x00, 0x2A], vec![clause]);
    assert!(!text.contains(".try"));
    assert!(text.contains("\tfilter  { // 0\n"));
    assert!(text.contains("\t} // end handler 0\n"));
}

#[test]
fn switch_targets_listed_one_per_line() {
    // switch [2, -10]; ret. Operand ends at 13, so targets are 15 and 3.
    let mut code = vec![0x45];
    code.extend_from_slice(&2u32.to_le_bytes());
    code.extend_from_slice(&2i32.to_le_bytes());
    code.extend_from_slice(&(-10i32).to_le_bytes());
    code.push(0x2A);

    let text = listing(&code, Vec::new());
    assert_eq!(
        text,
        "\tIL_0000: switch (\n\
         \t  IL_000f,\n\
         \t  IL_0003)\n\
         \tIL_000d: ret \n"
    );
}

#[test]
fn ldstr_narrows_from_user_string_heap() {
    let mut code = vec![0x72];
    code.extend_from_slice(&0x7000_0001u32.to_le_bytes());
    let text = listing(&code, Vec::new());
    assert_eq!(text, "\tIL_0000: ldstr \"Hi\"\n");
}

#[test]
fn ldstr_with_bad_index_degrades_to_placeholder() {
    let mut code = vec![0x72];
    code.extend_from_slice(&0x7000_0099u32.to_le_bytes());
    let text = listing(&code, Vec::new());
    assert_eq!(text, "\tIL_0000: ldstr \"<unresolved:0x70000099>\"\n");
}

#[test]
fn unresolvable_field_does_not_abort() {
    // ldsfld with the row the fixture refuses, then ret
    let mut code = vec![0x7E];
    code.extend_from_slice(&0x0400_0BADu32.to_le_bytes());
    code.push(0x2A);

    let text = listing(&code, Vec::new());
    assert_eq!(
        text,
        "\tIL_0000: ldsfld <unresolved:0x04000bad>\n\tIL_0005: ret \n"
    );
}

#[test]
fn call_resolves_method_name() {
    let mut code = vec![0x28];
    code.extend_from_slice(&0x0A00_0007u32.to_le_bytes());
    let text = listing(&code, Vec::new());
    assert_eq!(text, "\tIL_0000: call void Program::Run7()\n");
}

#[test]
fn truncated_stream_reports_offset() {
    // ret, then call missing its token
    let body = MethodBody::new(&[0x2A, 0x28, 0x07], Vec::new());
    let mut out = Vec::new();
    let result = disassemble(&body, &Fixture::new(), &mut out);
    assert!(matches!(
        result,
        Err(Error::TruncatedInstruction { offset: 1 })
    ));
    // The first instruction was already written before the abort
    assert!(out.starts_with(b"\tIL_0000: ret \n"));
}

#[test]
fn clause_past_code_end_loses_only_its_brackets() {
    let bad = ExceptionClause {
        kind: ClauseKind::Finally,
        try_offset: 0,
        try_length: 100,
        handler_offset: 100,
        handler_length: 1,
        token_or_filter: 0,
    };

    let text = listing(&[0x00, 0x2A], vec![bad]);
    assert_eq!(text, "\tIL_0000: nop \n\tIL_0001: ret \n");
}
