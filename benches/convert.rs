//! Benchmarks for the conversion pipeline.
//!
//! Measures a full conversion of synthetic symbol data for a binary with many methods, and the
//! serialization step on its own.

extern crate pdbport;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use pdbport::{
    binary::{BinarySource, CodeViewEntry},
    convert::{ConversionOptions, Converter},
    metadata::tables::TableId,
    prelude::*,
};
use std::hint::black_box;

const METHODS: u32 = 2_000;

struct Synthetic;

impl BinarySource for Synthetic {
    fn codeview(&self) -> pdbport::Result<Option<CodeViewEntry>> {
        Ok(Some(CodeViewEntry {
            guid: uguid::guid!("11111111-2222-3333-4444-555555555555"),
            age: 1,
            stamp: 0x6000_0000,
            path: "bench.pdb".to_string(),
        }))
    }

    fn row_count(&self, table: TableId) -> pdbport::Result<u32> {
        Ok(match table {
            TableId::Module => 1,
            TableId::TypeDef => METHODS / 10,
            TableId::MethodDef => METHODS,
            _ => 0,
        })
    }
}

/// Every method gets 16 sequence points in one of 8 documents and two nested scopes.
fn symbols() -> SymbolData {
    let documents: Vec<String> = (0..8).map(|i| format!("/src/Bench/File{i}.cs")).collect();

    let mut symbols = SymbolData::new();
    for document in &documents {
        symbols.add_document(Document::new(document.as_str()).with_language(LANGUAGE_CSHARP));
    }

    for row in 1..=METHODS {
        let document = &documents[row as usize % documents.len()];
        let points = (0..16)
            .map(|i| SequencePoint::new(document.as_str(), i * 4, row + i, 9, row + i, 40))
            .collect();

        let scope = LocalScope::new(0, 64)
            .with_variable(LocalVariable::new("index", 0))
            .with_constant(LocalConstant::new("Limit", ConstantValue::I4(16)))
            .with_child(LocalScope::new(8, 48).with_variable(LocalVariable::new("item", 1)));

        symbols.add_method(
            Token::new(0x0600_0000 | row),
            MethodSymbols {
                local_signature: Some(row),
                sequence_points: points,
                root_scope: Some(LocalScope::new(0, 64).with_child(scope)),
                ..MethodSymbols::default()
            },
        );
    }

    symbols
}

fn bench_convert(c: &mut Criterion) {
    let symbols = symbols();

    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Elements(u64::from(METHODS)));
    group.bench_function("convert_to_vec", |b| {
        b.iter(|| {
            let converted =
                convert_to_vec(black_box(&Synthetic), black_box(&symbols), ConversionOptions::new())
                    .unwrap();
            black_box(converted)
        });
    });
    group.bench_function("finalize", |b| {
        b.iter_batched(
            || {
                Converter::new(&Synthetic, &symbols, ConversionOptions::new())
                    .discover()
                    .unwrap()
                    .translate()
                    .unwrap()
            },
            |translated| {
                let mut out = Vec::new();
                black_box(translated.finalize(&mut out).unwrap())
            },
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
