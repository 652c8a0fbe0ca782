use pdbport::{
    metadata::tables::{DocumentRaw, LocalScopeRaw, MethodDebugInformationRaw},
    prelude::*,
};
use uguid::guid;

/// A binary described directly by its facts, as a build tool holding an in-memory image would.
struct Facts {
    codeview: Option<CodeViewEntry>,
    methods: u32,
    types: u32,
    entry_point: Option<Token>,
}

impl Facts {
    fn new(methods: u32) -> Facts {
        Facts {
            codeview: Some(CodeViewEntry {
                guid: guid!("0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"),
                age: 1,
                stamp: 0x1234_5678,
                path: "obj/Release/Legacy.pdb".to_string(),
            }),
            methods,
            types: 2,
            entry_point: None,
        }
    }
}

impl BinarySource for Facts {
    fn codeview(&self) -> Result<Option<CodeViewEntry>> {
        Ok(self.codeview.clone())
    }

    fn row_count(&self, table: TableId) -> Result<u32> {
        Ok(match table {
            TableId::Module => 1,
            TableId::TypeDef => self.types,
            TableId::MethodDef => self.methods,
            _ => 0,
        })
    }

    fn entry_point(&self) -> Option<Token> {
        self.entry_point
    }
}

fn method(row: u32) -> Token {
    Token::new(0x0600_0000 | row)
}

#[test]
fn pdb_id_from_codeview() {
    let facts = Facts::new(1);
    let (bytes, report) = convert_to_vec(&facts, &SymbolData::new(), ConversionOptions::strict()).unwrap();

    let pdb = PortablePdb::read(&bytes).unwrap();
    assert_eq!(pdb.guid(), guid!("0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"));
    assert_eq!(pdb.stamp(), 0x1234_5678);
    assert_eq!(pdb.pdb_id(), &report.pdb_id);
    assert_eq!(pdb.entry_point(), None);
    assert_eq!(pdb.external_rows(TableId::Module), 1);
    assert_eq!(pdb.external_rows(TableId::TypeDef), 2);
    assert_eq!(pdb.external_rows(TableId::MethodDef), 1);
}

#[test]
fn missing_codeview() {
    let facts = Facts {
        codeview: None,
        ..Facts::new(1)
    };

    let mut out = Vec::new();
    let result = convert(&facts, &SymbolData::new(), ConversionOptions::new(), &mut out);
    assert!(matches!(result, Err(Error::MissingDebugDirectory)));
    assert!(out.is_empty());
}

#[test]
fn wide_method_indices() {
    // more than 0xFFFF methods: MethodDef indices in LocalScope need 4 bytes
    let methods = 70_000;
    let last = method(methods);

    let mut symbols = SymbolData::new();
    symbols
        .add_document(Document::new(r"C:\src\Legacy\Module1.vb").with_language(LANGUAGE_VISUAL_BASIC))
        .add_method(
            last,
            MethodSymbols {
                sequence_points: vec![
                    SequencePoint::new(r"C:\src\Legacy\Module1.vb", 0, 4, 5, 4, 18),
                    SequencePoint::new(r"C:\src\Legacy\Module1.vb", 7, 5, 9, 5, 30),
                ],
                root_scope: Some(
                    LocalScope::new(0, 12).with_child(
                        LocalScope::new(0, 12)
                            .with_variable(LocalVariable::new("count", 0))
                            .with_constant(LocalConstant::new(
                                "Name",
                                ConstantValue::String(Some("Legacy".to_string())),
                            )),
                    ),
                ),
                ..MethodSymbols::default()
            },
        )
        .set_entry_point(last);

    let facts = Facts::new(methods);
    let (bytes, report) = convert_to_vec(&facts, &symbols, ConversionOptions::strict()).unwrap();
    assert_eq!(report.methods, methods);
    assert_eq!(report.methods_with_symbols, 1);
    assert_eq!(report.entry_point, Some(last));

    let pdb = PortablePdb::read(&bytes).unwrap();
    assert_eq!(pdb.entry_point(), Some(last));

    let documents = pdb.table::<DocumentRaw>().unwrap();
    let document = documents.get(1).unwrap();
    assert_eq!(pdb.document_name(document.name).unwrap(), r"C:\src\Legacy\Module1.vb");
    assert_eq!(pdb.guids().get(document.language as usize).unwrap(), LANGUAGE_VISUAL_BASIC);
    assert_eq!(document.hash, 0);

    let rows = pdb.table::<MethodDebugInformationRaw>().unwrap();
    assert_eq!(rows.row_count(), methods);
    let row = rows.get(methods).unwrap();
    assert_eq!(row.document, 1);
    let points = pdb.sequence_points(&row).unwrap().unwrap();
    assert_eq!(points.points.len(), 2);
    assert_eq!((points.points[1].il_offset, points.points[1].start_line), (7, 5));

    let scope = pdb.table::<LocalScopeRaw>().unwrap().get(1).unwrap();
    assert_eq!(scope.method, methods);
    assert_eq!((scope.start_offset, scope.length), (0, 12));
}

#[test]
fn placeholders_are_reported() {
    let mut symbols = SymbolData::new();
    symbols.add_document(Document::new("/src/Async.cs")).add_method(
        method(2),
        MethodSymbols {
            sequence_points: vec![SequencePoint::new("/src/Async.cs", 0, 1, 1, 1, 10)],
            root_scope: Some(
                LocalScope::new(0, 30).with_child(LocalScope::new(0, 30).with_namespace("System")),
            ),
            async_info: Some(AsyncMethodInfo {
                kickoff_method: method(1),
                catch_handler_offset: Some(24),
                steps: Vec::new(),
            }),
            ..MethodSymbols::default()
        },
    );

    let facts = Facts {
        entry_point: Some(method(1)),
        ..Facts::new(2)
    };

    let strict = convert_to_vec(&facts, &symbols, ConversionOptions::strict());
    assert!(matches!(
        strict,
        Err(Error::Unsupported {
            feature: UnsupportedFeature::ImportScopes,
            ..
        })
    ));

    let (bytes, report) = convert_to_vec(&facts, &symbols, ConversionOptions::new()).unwrap();
    assert!(!report.is_lossless());
    let features: Vec<UnsupportedFeature> = report.placeholders.iter().map(|p| p.feature).collect();
    assert_eq!(
        features,
        [UnsupportedFeature::ImportScopes, UnsupportedFeature::AsyncSteppingInformation]
    );

    let pdb = PortablePdb::read(&bytes).unwrap();
    assert_eq!(pdb.entry_point(), Some(method(1)));
    assert_eq!(pdb.tables().row_count(TableId::StateMachineMethod), 1);
    assert_eq!(pdb.tables().row_count(TableId::LocalScope), 1);
}

#[test]
fn output_is_deterministic() {
    let mut symbols = SymbolData::new();
    symbols
        .add_document(Document::new("/src/b.cs"))
        .add_document(Document::new("/src/a.cs"))
        .add_method(
            method(1),
            MethodSymbols::with_sequence_points(vec![
                SequencePoint::new("/src/a.cs", 0, 3, 1, 3, 9),
                SequencePoint::new("/src/b.cs", 2, 8, 1, 8, 9),
            ]),
        );

    let facts = Facts::new(1);
    let (first, _) = convert_to_vec(&facts, &symbols, ConversionOptions::new()).unwrap();
    let (second, _) = convert_to_vec(&facts, &symbols, ConversionOptions::new()).unwrap();
    assert_eq!(first, second);

    // documents keep the order of the symbol source
    let pdb = PortablePdb::read(&first).unwrap();
    let documents = pdb.table::<DocumentRaw>().unwrap();
    assert_eq!(pdb.document_name(documents.get(1).unwrap().name).unwrap(), "/src/b.cs");
}
