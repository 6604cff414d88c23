use cildasm::{
    disassemble, ClauseKind, Error, ExceptionClause, MethodBody, Result, Token, TokenResolver,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

struct StaticNames;

impl TokenResolver for StaticNames {
    fn field(&self, _token: Token) -> Result<String> {
        Ok("int32 Program::counter".to_string())
    }
    fn method(&self, _token: Token) -> Result<String> {
        Ok("void Program::Run()".to_string())
    }
    fn token(&self, _token: Token) -> Result<String> {
        Ok("[mscorlib]System.Exception".to_string())
    }
    fn type_name(&self, _token: Token) -> Result<String> {
        Ok("Program".to_string())
    }
    fn user_string(&self, _index: u32) -> Result<&[u8]> {
        Err(Error::OutOfBounds)
    }
}

/// A repetitive but representative instruction mix: loads, a call, a field
/// access, a short branch, all inside a try/catch.
fn synthesize_code(blocks: usize) -> Vec<u8> {
    let mut code = Vec::new();
    for _ in 0..blocks {
        code.push(0x00); // nop
        code.push(0x17); // ldc.i4.1
        code.push(0x20); // ldc.i4
        code.extend_from_slice(&1234i32.to_le_bytes());
        code.push(0x28); // call
        code.extend_from_slice(&0x0A00_0001u32.to_le_bytes());
        code.push(0x7E); // ldsfld
        code.extend_from_slice(&0x0400_0001u32.to_le_bytes());
        code.push(0x2B); // br.s +0
        code.push(0x00);
    }
    code.push(0x2A); // ret
    code
}

fn bench_disassemble(c: &mut Criterion) {
    let code = synthesize_code(512);
    let try_length = (code.len() - 1) as u32;
    let clause = ExceptionClause {
        kind: ClauseKind::Catch,
        try_offset: 0,
        try_length,
        handler_offset: try_length,
        handler_length: 1,
        token_or_filter: 0x0100_0010,
    };
    let body = MethodBody::new(&code, vec![clause]);

    let mut group = c.benchmark_group("disassemble");
    group.throughput(criterion::Throughput::Bytes(code.len() as u64));
    group.bench_function("mixed_body", |b| {
        let mut out = Vec::with_capacity(128 * 1024);
        b.iter(|| {
            out.clear();
            disassemble(black_box(&body), &StaticNames, &mut out).unwrap();
            black_box(out.len())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_disassemble);
criterion_main!(benches);
