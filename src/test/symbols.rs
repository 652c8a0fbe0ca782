//! Symbol data for the three methods of the default [`super::PeImage`].
//!
//! - method 1: single document, hidden point, nested scopes with variables and a constant
//! - method 2: no symbols
//! - method 3: two documents, async `MoveNext` whose kickoff method is method 1

use crate::{
    metadata::{tables::TableId, token::Token},
    symbols::{
        AsyncMethodInfo, ConstantValue, Document, LocalConstant, LocalScope, LocalVariable,
        MethodSymbols, SequencePoint, SymbolData, HASH_ALGORITHM_SHA256, LANGUAGE_CSHARP,
    },
};

pub const PROGRAM: &str = "/src/App/Program.cs";
pub const HELPER: &str = "/src/App/Helper.cs";

pub fn method(row: u32) -> Token {
    Token::from_parts(TableId::MethodDef, row)
}

pub fn first_method() -> MethodSymbols {
    MethodSymbols {
        local_signature: Some(1),
        sequence_points: vec![
            SequencePoint::new(PROGRAM, 0, 10, 9, 10, 30),
            SequencePoint::new(PROGRAM, 6, 11, 9, 11, 40),
            SequencePoint::hidden(PROGRAM, 12),
            SequencePoint::new(PROGRAM, 14, 12, 5, 12, 6),
        ],
        root_scope: Some(
            LocalScope::new(0, 20).with_child(
                LocalScope::new(0, 20)
                    .with_variable(LocalVariable::new("x", 0))
                    .with_variable(LocalVariable::new("y", 1))
                    .with_constant(LocalConstant::new("Limit", ConstantValue::I4(10)))
                    .with_child(LocalScope::new(6, 14).with_variable(LocalVariable::new("i", 2))),
            ),
        ),
        ..MethodSymbols::default()
    }
}

pub fn third_method() -> MethodSymbols {
    MethodSymbols {
        sequence_points: vec![
            SequencePoint::new(PROGRAM, 0, 20, 5, 20, 20),
            SequencePoint::new(HELPER, 4, 3, 9, 3, 25),
        ],
        async_info: Some(AsyncMethodInfo::new(method(1))),
        ..MethodSymbols::default()
    }
}

pub fn sample_symbols() -> SymbolData {
    let mut symbols = SymbolData::new();
    symbols
        .add_document(
            Document::new(PROGRAM)
                .with_checksum(HASH_ALGORITHM_SHA256, vec![0xAB; 32])
                .with_language(LANGUAGE_CSHARP),
        )
        .add_document(Document::new(HELPER).with_language(LANGUAGE_CSHARP))
        .add_method(method(1), first_method())
        .add_method(method(3), third_method())
        .set_entry_point(method(1));

    symbols
}
