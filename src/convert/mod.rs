//! Conversion of legacy symbol data into a Portable PDB.
//!
//! A conversion runs in three phases, each consuming the previous state:
//!
//! 1. [`Converter::discover`] reads the CodeView entry of the binary and the row counts of its
//!    type-system tables.
//! 2. [`Discovered::translate`] adds every document, then one `MethodDebugInformation` row per
//!    `MethodDef` of the binary, in row order, along with the scope and state machine rows of
//!    the methods that have symbols.
//! 3. [`Translated::finalize`] lays out the Portable PDB and writes it.
//!
//! Nothing is written before the last phase, so a conversion that fails leaves the output
//! untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use pdbport::{binary::PeBinary, convert::{ConversionOptions, Converter}, symbols::SymbolData};
//! use std::path::Path;
//!
//! let binary = PeBinary::from_file(Path::new("App.dll"))?;
//! let symbols = SymbolData::new();
//!
//! let translated = Converter::new(&binary, &symbols, ConversionOptions::new())
//!     .discover()?
//!     .translate()?;
//!
//! let mut out = std::fs::File::create("App.pdb")?;
//! let report = translated.finalize(&mut out)?;
//! println!("{} methods, {} placeholders", report.methods, report.placeholders.len());
//! # Ok::<(), pdbport::Error>(())
//! ```

pub mod contentid;
pub mod documents;
pub mod options;
pub mod rowcounts;
pub mod scopes;
pub mod sequencepoints;

pub use contentid::ContentId;
pub use documents::DocumentTable;
pub use options::{
    ConversionOptions, ConversionReport, FeatureGate, Placeholder, UnsupportedFeature,
    UnsupportedPolicy,
};
pub use rowcounts::RowCounts;
pub use scopes::ScopeSerializer;
pub use sequencepoints::{encode_sequence_points, EncodedSequencePoints};

use std::io::Write;

use crate::{
    binary::{BinarySource, CodeViewEntry},
    metadata::{
        builder::{PdbBuilder, PdbHeader},
        tables::TableId,
        token::Token,
    },
    symbols::{MethodSymbols, RangeConvention, SymbolSource},
    Error, Result,
};

/// Entry state of a conversion.
pub struct Converter<'a, B: ?Sized, S: ?Sized> {
    binary: &'a B,
    symbols: &'a S,
    options: ConversionOptions,
}

impl<'a, B, S> Converter<'a, B, S>
where
    B: BinarySource + ?Sized,
    S: SymbolSource + ?Sized,
{
    /// Prepare the conversion of `symbols` for `binary`.
    pub fn new(binary: &'a B, symbols: &'a S, options: ConversionOptions) -> Self {
        Converter {
            binary,
            symbols,
            options,
        }
    }

    /// Read the CodeView entry and row counts of the binary.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingDebugDirectory`] if the binary has no CodeView entry and
    /// propagates errors of the binary reader.
    pub fn discover(self) -> Result<Discovered<'a, B, S>> {
        let Some(codeview) = self.binary.codeview()? else {
            return Err(Error::MissingDebugDirectory);
        };
        let row_counts = RowCounts::harvest(self.binary)?;

        tracing::debug!(
            guid = %codeview.guid,
            stamp = codeview.stamp,
            methods = row_counts.methods(),
            "discovered binary"
        );

        Ok(Discovered {
            binary: self.binary,
            symbols: self.symbols,
            options: self.options,
            codeview,
            row_counts,
        })
    }
}

/// State after discovery: the binary is known, no rows have been produced yet.
pub struct Discovered<'a, B: ?Sized, S: ?Sized> {
    binary: &'a B,
    symbols: &'a S,
    options: ConversionOptions,
    codeview: CodeViewEntry,
    row_counts: RowCounts,
}

impl<'a, B, S> Discovered<'a, B, S>
where
    B: BinarySource + ?Sized,
    S: SymbolSource + ?Sized,
{
    /// The CodeView entry of the binary.
    #[must_use]
    pub fn codeview(&self) -> &CodeViewEntry {
        &self.codeview
    }

    /// The row counts of the binary.
    #[must_use]
    pub fn row_counts(&self) -> &RowCounts {
        &self.row_counts
    }

    /// Produce the rows of every document and method.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unsupported`] for inclusive scope ranges or, under
    /// [`UnsupportedPolicy::Reject`], the first unsupported feature; the format errors of the
    /// sequence point encoder and the scope serializer; and any error of the symbol source.
    pub fn translate(self) -> Result<Translated> {
        if self.symbols.range_convention() == RangeConvention::Inclusive {
            return Err(Error::Unsupported {
                feature: UnsupportedFeature::InclusiveScopeRanges,
                method: None,
            });
        }

        let mut builder = PdbBuilder::new();
        let mut gate = FeatureGate::new(self.options.unsupported);
        let mut documents = DocumentTable::new();
        let mut scopes = ScopeSerializer::new();

        for document in self.symbols.documents()? {
            documents.get_or_add(
                &mut builder,
                &document.name,
                document.hash_algorithm,
                &document.checksum,
                document.language,
            );
        }
        tracing::debug!(documents = documents.len(), "added documents");

        let methods = self.row_counts.methods();
        let mut methods_with_symbols = 0_u32;
        for row in 1..=methods {
            let method = Token::from_parts(TableId::MethodDef, row);
            match self.symbols.method(method)? {
                None => {
                    builder.add_method_debug_information(None, None);
                }
                Some(symbols) => {
                    translate_method(
                        &mut builder,
                        &mut gate,
                        &documents,
                        &mut scopes,
                        method,
                        methods,
                        &symbols,
                    )?;
                    methods_with_symbols += 1;
                }
            }
        }

        let entry_point = self.entry_point(methods);

        tracing::debug!(
            methods,
            methods_with_symbols,
            scopes = builder.row_count(TableId::LocalScope),
            placeholders = gate.placeholders().len(),
            "translated methods"
        );

        let report = ConversionReport {
            pdb_id: ContentId::from_codeview(&self.codeview).to_bytes(),
            entry_point,
            documents: builder.row_count(TableId::Document),
            methods,
            methods_with_symbols,
            scopes: builder.row_count(TableId::LocalScope),
            bytes: 0,
            placeholders: gate.into_placeholders(),
        };

        Ok(Translated {
            builder,
            content_id: ContentId::from_codeview(&self.codeview),
            row_counts: self.row_counts,
            entry_point,
            report,
        })
    }

    /// The user entry point: from the options, else the symbols, else the CLR header. A token
    /// that is not a `MethodDef` of the binary is dropped.
    fn entry_point(&self, methods: u32) -> Option<Token> {
        let token = self
            .options
            .entry_point
            .or_else(|| self.symbols.user_entry_point())
            .or_else(|| self.binary.entry_point())?;

        if token.table_id() == Some(TableId::MethodDef) && (1..=methods).contains(&token.row()) {
            Some(token)
        } else {
            tracing::warn!(%token, "entry point is not a method of the binary, ignoring it");
            None
        }
    }
}

/// Add the rows of one method that has symbols.
fn translate_method(
    builder: &mut PdbBuilder,
    gate: &mut FeatureGate,
    documents: &DocumentTable,
    scopes: &mut ScopeSerializer,
    method: Token,
    methods: u32,
    symbols: &MethodSymbols,
) -> Result<()> {
    let encoded = encode_sequence_points(
        method,
        symbols.local_signature,
        &symbols.sequence_points,
        |name| documents.get(name),
    )?;
    match encoded {
        Some(encoded) => {
            let blob = builder.add_blob(&encoded.blob);
            builder.add_method_debug_information(encoded.single_document, Some(blob));
        }
        None => {
            builder.add_method_debug_information(None, None);
        }
    }

    if let Some(root) = &symbols.root_scope {
        scopes.serialize_root(builder, gate, method, root)?;
    }

    if let Some(info) = &symbols.async_info {
        let kickoff = info.kickoff_method;
        if kickoff.table_id() != Some(TableId::MethodDef) || !(1..=methods).contains(&kickoff.row())
        {
            return Err(malformed_error!(
                "Kickoff method {} of {} is not a method of the binary",
                kickoff,
                method
            ));
        }

        builder.add_state_machine_method(method.row(), kickoff.row());
        if info.has_stepping_information() {
            gate.encounter(UnsupportedFeature::AsyncSteppingInformation, Some(method))?;
        }
    }

    if symbols.edit_and_continue.is_some() {
        gate.encounter(UnsupportedFeature::EditAndContinue, Some(method))?;
    }

    tracing::trace!(
        %method,
        points = symbols.sequence_points.len(),
        scoped = symbols.root_scope.is_some(),
        state_machine = symbols.async_info.is_some(),
        "translated method"
    );

    Ok(())
}

/// State after translation: every row exists, the PDB has not been laid out.
#[derive(Debug)]
pub struct Translated {
    builder: PdbBuilder,
    content_id: ContentId,
    row_counts: RowCounts,
    entry_point: Option<Token>,
    report: ConversionReport,
}

impl Translated {
    /// The builder holding the produced rows.
    #[must_use]
    pub fn builder(&self) -> &PdbBuilder {
        &self.builder
    }

    /// The PDB id that will be written.
    #[must_use]
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// The report so far; `bytes` is filled in by [`Translated::finalize`].
    #[must_use]
    pub fn report(&self) -> &ConversionReport {
        &self.report
    }

    /// Lay out the Portable PDB and write it to `out`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if writing fails.
    pub fn finalize<W: Write + ?Sized>(self, out: &mut W) -> Result<ConversionReport> {
        let header = PdbHeader {
            id: self.content_id.to_bytes(),
            entry_point: self.entry_point,
        };

        let mut bytes = Vec::new();
        self.builder
            .serialize(&header, &self.row_counts.entries(), &mut bytes)?;
        out.write_all(&bytes)?;

        let mut report = self.report;
        report.bytes = bytes.len();

        tracing::debug!(bytes = report.bytes, "wrote portable pdb");
        Ok(report)
    }
}

/// Run all three phases, writing the Portable PDB to `out`.
///
/// # Errors
/// See [`Converter::discover`], [`Discovered::translate`] and [`Translated::finalize`].
pub fn convert<B, S, W>(
    binary: &B,
    symbols: &S,
    options: ConversionOptions,
    out: &mut W,
) -> Result<ConversionReport>
where
    B: BinarySource + ?Sized,
    S: SymbolSource + ?Sized,
    W: Write + ?Sized,
{
    Converter::new(binary, symbols, options)
        .discover()?
        .translate()?
        .finalize(out)
}

/// Run all three phases, returning the Portable PDB bytes.
///
/// # Errors
/// See [`convert`].
pub fn convert_to_vec<B, S>(
    binary: &B,
    symbols: &S,
    options: ConversionOptions,
) -> Result<(Vec<u8>, ConversionReport)>
where
    B: BinarySource + ?Sized,
    S: SymbolSource + ?Sized,
{
    let mut bytes = Vec::new();
    let report = convert(binary, symbols, options, &mut bytes)?;
    Ok((bytes, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binary::PeBinary,
        metadata::{
            pdb::PortablePdb,
            tables::{
                DocumentRaw, ImportScopeRaw, LocalConstantRaw, LocalScopeRaw,
                MethodDebugInformationRaw, StateMachineMethodRaw,
            },
        },
        symbols::{AsyncStep, EditAndContinueData, LocalScope, SequencePoint, SymbolData},
        test::{method, sample_symbols, PeImage, HELPER, PROGRAM},
    };

    fn binary() -> PeBinary {
        PeBinary::from_mem(PeImage::default().build()).unwrap()
    }

    #[test]
    fn sample_conversion() {
        let (bytes, report) =
            convert_to_vec(&binary(), &sample_symbols(), ConversionOptions::strict()).unwrap();
        assert_eq!(report.bytes, bytes.len());
        assert!(report.is_lossless());
        assert_eq!((report.documents, report.methods, report.methods_with_symbols), (2, 3, 2));

        let pdb = PortablePdb::read(&bytes).unwrap();
        assert_eq!(pdb.guid(), PeImage::GUID);
        assert_eq!(pdb.stamp(), PeImage::STAMP);
        assert_eq!(pdb.pdb_id(), &report.pdb_id);
        assert_eq!(pdb.entry_point(), Some(method(1)));
        assert_eq!(pdb.external_rows(TableId::MethodDef), 3);
        assert_eq!(pdb.external_rows(TableId::TypeDef), 2);

        let documents = pdb.table::<DocumentRaw>().unwrap();
        assert_eq!(documents.row_count(), 2);
        let program = documents.get(1).unwrap();
        assert_eq!(pdb.document_name(program.name).unwrap(), PROGRAM);
        assert_eq!(pdb.blob(program.hash).unwrap(), [0xAB; 32]);
        assert_eq!(pdb.document_name(documents.get(2).unwrap().name).unwrap(), HELPER);

        let methods = pdb.table::<MethodDebugInformationRaw>().unwrap();
        assert_eq!(methods.row_count(), 3);

        let first = methods.get(1).unwrap();
        assert_eq!(first.document, 1);
        let points = pdb.sequence_points(&first).unwrap().unwrap();
        assert_eq!(points.local_signature, 1);
        assert_eq!(points.points.len(), 4);
        assert_eq!((points.points[1].il_offset, points.points[1].start_line), (6, 11));
        assert!(points.points[2].is_hidden);
        assert_eq!(points.points[3].end_column, 6);

        // method 2 has no symbols
        let second = methods.get(2).unwrap();
        assert_eq!((second.document, second.sequence_points), (0, 0));

        let third = methods.get(3).unwrap();
        assert_eq!(third.document, 0);
        let points = pdb.sequence_points(&third).unwrap().unwrap();
        let documents: Vec<u32> = points.points.iter().map(|point| point.document).collect();
        assert_eq!(documents, [1, 2]);

        let scopes: Vec<LocalScopeRaw> = pdb.table::<LocalScopeRaw>().unwrap().iter().collect();
        assert_eq!(scopes.len(), 2);
        assert_eq!((scopes[0].method, scopes[0].start_offset, scopes[0].length), (1, 0, 20));
        assert_eq!((scopes[1].start_offset, scopes[1].length), (6, 8));
        assert_eq!((scopes[0].variable_list, scopes[1].variable_list), (1, 3));
        assert_eq!((scopes[0].constant_list, scopes[1].constant_list), (1, 2));

        let constant = pdb.table::<LocalConstantRaw>().unwrap().get(1).unwrap();
        assert_eq!(pdb.string(constant.name).unwrap(), "Limit");
        assert_eq!(pdb.blob(constant.signature).unwrap(), [0x08, 10, 0, 0, 0]);

        let import_scope = pdb.table::<ImportScopeRaw>().unwrap().get(1).unwrap();
        assert_eq!((import_scope.parent, import_scope.imports), (0, 0));

        let state_machine = pdb.table::<StateMachineMethodRaw>().unwrap().get(1).unwrap();
        assert_eq!((state_machine.move_next_method, state_machine.kickoff_method), (3, 1));
    }

    #[test]
    fn missing_debug_directory() {
        let image = PeImage {
            codeview: None,
            ..PeImage::default()
        };
        let binary = PeBinary::from_mem(image.build()).unwrap();

        let symbols = sample_symbols();
        let result = Converter::new(&binary, &symbols, ConversionOptions::new()).discover();
        assert!(matches!(result, Err(Error::MissingDebugDirectory)));
    }

    #[test]
    fn phases() {
        let binary = binary();
        let symbols = sample_symbols();

        let discovered = Converter::new(&binary, &symbols, ConversionOptions::new())
            .discover()
            .unwrap();
        assert_eq!(discovered.codeview().path, "test.pdb");
        assert_eq!(discovered.row_counts().methods(), 3);

        let translated = discovered.translate().unwrap();
        assert_eq!(translated.builder().row_count(TableId::MethodDebugInformation), 3);
        assert_eq!(translated.content_id().stamp, PeImage::STAMP);
        assert_eq!(translated.report().bytes, 0);

        let mut out = Vec::new();
        let report = translated.finalize(&mut out).unwrap();
        assert_eq!(&out[..4], b"BSJB");
        assert_eq!(report.bytes, out.len());
    }

    #[test]
    fn empty_methods() {
        let mut symbols = SymbolData::new();
        symbols.add_document(sample_symbols().documents().unwrap().remove(0));

        let (bytes, report) =
            convert_to_vec(&binary(), &symbols, ConversionOptions::new()).unwrap();
        assert_eq!(report.methods_with_symbols, 0);

        let pdb = PortablePdb::read(&bytes).unwrap();
        let methods = pdb.table::<MethodDebugInformationRaw>().unwrap();
        assert_eq!(methods.row_count(), 3);
        assert!(methods.iter().all(|row| row.document == 0 && row.sequence_points == 0));
        assert!(!pdb.tables().has_table(TableId::LocalScope));
        assert!(!pdb.tables().has_table(TableId::ImportScope));

        // no symbol entry point: the CLR header's is used
        assert_eq!(pdb.entry_point(), Some(method(1)));
    }

    #[test]
    fn entry_point_resolution() {
        let binary = binary();
        let symbols = sample_symbols();

        let options = ConversionOptions::new().with_entry_point(method(2));
        let (_, report) = convert_to_vec(&binary, &symbols, options).unwrap();
        assert_eq!(report.entry_point, Some(method(2)));

        // out of range tokens are dropped
        let options = ConversionOptions::new().with_entry_point(method(9));
        let (_, report) = convert_to_vec(&binary, &symbols, options).unwrap();
        assert_eq!(report.entry_point, None);

        let image = PeImage {
            entry_point: 0,
            ..PeImage::default()
        };
        let binary = PeBinary::from_mem(image.build()).unwrap();
        let (_, report) =
            convert_to_vec(&binary, &SymbolData::new(), ConversionOptions::new()).unwrap();
        assert_eq!(report.entry_point, None);
    }

    #[test]
    fn unknown_document() {
        let mut symbols = sample_symbols();
        symbols.add_method(
            method(2),
            MethodSymbols::with_sequence_points(vec![SequencePoint::new(
                "/src/App/Missing.cs",
                0,
                1,
                1,
                1,
                2,
            )]),
        );

        let result = convert_to_vec(&binary(), &symbols, ConversionOptions::new());
        match result {
            Err(Error::SequencePoints { method: failed, message }) => {
                assert_eq!(failed, method(2));
                assert!(message.contains("Missing.cs"));
            }
            other => panic!("expected a sequence point error, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_features() {
        let mut symbols = sample_symbols();
        let mut third = crate::test::third_method();
        if let Some(info) = third.async_info.as_mut() {
            info.steps.push(AsyncStep {
                yield_offset: 2,
                resume_offset: 4,
                resume_method: method(3),
            });
        }
        third.edit_and_continue = Some(EditAndContinueData::default());
        symbols.add_method(method(3), third);

        let result = convert_to_vec(&binary(), &symbols, ConversionOptions::strict());
        assert!(matches!(
            result,
            Err(Error::Unsupported {
                feature: UnsupportedFeature::AsyncSteppingInformation,
                method: Some(_)
            })
        ));

        let (bytes, report) =
            convert_to_vec(&binary(), &symbols, ConversionOptions::new()).unwrap();
        assert_eq!(
            report.placeholders,
            [
                Placeholder {
                    method: Some(method(3)),
                    feature: UnsupportedFeature::AsyncSteppingInformation
                },
                Placeholder {
                    method: Some(method(3)),
                    feature: UnsupportedFeature::EditAndContinue
                },
            ]
        );

        // the state machine row survives
        let pdb = PortablePdb::read(&bytes).unwrap();
        assert_eq!(pdb.tables().row_count(TableId::StateMachineMethod), 1);
    }

    #[test]
    fn inclusive_ranges() {
        let mut symbols = sample_symbols();
        symbols.set_range_convention(RangeConvention::Inclusive);

        let result = convert_to_vec(&binary(), &symbols, ConversionOptions::new());
        assert!(matches!(
            result,
            Err(Error::Unsupported {
                feature: UnsupportedFeature::InclusiveScopeRanges,
                method: None
            })
        ));
    }

    #[test]
    fn invalid_kickoff() {
        let mut symbols = sample_symbols();
        let mut third = crate::test::third_method();
        third.async_info = Some(crate::symbols::AsyncMethodInfo::new(method(12)));
        symbols.add_method(method(3), third);

        assert!(matches!(
            convert_to_vec(&binary(), &symbols, ConversionOptions::new()),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn failed_conversion_writes_nothing() {
        let mut symbols = sample_symbols();
        symbols.add_method(
            method(2),
            MethodSymbols {
                root_scope: Some(LocalScope::new(0, 4).with_child(LocalScope::new(2, 8))),
                ..MethodSymbols::default()
            },
        );

        let mut out = Vec::new();
        let result = convert(&binary(), &symbols, ConversionOptions::new(), &mut out);
        assert!(matches!(result, Err(Error::ScopeNesting { .. })));
        assert!(out.is_empty());
    }
}
