//! Decoding of the sequence-points blob of a `MethodDebugInformation` row.
//!
//! The blob maps IL offsets to source spans. It is delta encoded against the previous record
//! and uses ECMA-335 compressed integers throughout:
//!
//! ```text
//! header         LocalSignature (uint), InitialDocument (uint, only if the row has no Document)
//! first record   δIL (uint)                        absolute IL offset
//! later records  δIL (uint, non-zero)              IL offset minus the previous one
//!                or 0 followed by Document (uint)  switches the current document
//! span           δLines (uint)
//!                δColumns (uint if δLines is 0, int otherwise)
//!                δLines = δColumns = 0 marks a hidden sequence point, no start position follows
//!                StartLine (uint for the first non-hidden point, int delta afterwards)
//!                StartColumn (uint for the first non-hidden point, int delta afterwards)
//! ```
//!
//! Hidden sequence points are reported with the conventional line `0xFEEFEE`.
//!
//! # Example
//!
//! ```rust
//! use pdbport::metadata::sequencepoints::parse_sequence_points;
//!
//! // local signature 0, one point at IL 1 spanning line 10, columns 2..7
//! let points = parse_sequence_points(&[0, 1, 0, 5, 10, 2], Some(1))?;
//! assert_eq!(points.points.len(), 1);
//! assert_eq!(points.points[0].end_column, 7);
//! # Ok::<(), pdbport::Error>(())
//! ```
//!
//! # Reference
//! - [Portable PDB: Sequence Points Blob](https://github.com/dotnet/runtime/blob/main/docs/design/specs/PortablePdb-Metadata.md#sequence-points-blob)

use crate::{file::parser::Parser, Result};

/// Line number marking a hidden sequence point.
pub const HIDDEN_LINE: u32 = 0x00FE_EFEE;

/// One decoded sequence point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePoint {
    /// `Document` row the point belongs to
    pub document: u32,
    /// IL offset of the first instruction covered
    pub il_offset: u32,
    /// First source line, [`HIDDEN_LINE`] for hidden points
    pub start_line: u32,
    /// First source column
    pub start_column: u16,
    /// Last source line
    pub end_line: u32,
    /// Column past the end of the span
    pub end_column: u16,
    /// `true` for points that hide compiler generated IL from the debugger
    pub is_hidden: bool,
}

/// The decoded content of a sequence-points blob.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequencePoints {
    /// `StandAloneSig` row of the method's local signature, 0 if none
    pub local_signature: u32,
    /// The points, in blob order
    pub points: Vec<SequencePoint>,
}

impl SequencePoints {
    /// The first point covering `il_offset` exactly.
    #[must_use]
    pub fn find_by_il_offset(&self, il_offset: u32) -> Option<&SequencePoint> {
        self.points.iter().find(|sp| sp.il_offset == il_offset)
    }
}

/// Decode a sequence-points blob.
///
/// `document` is the `Document` column of the owning row; `None` means the blob names its
/// initial document in the header.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] on a truncated blob and [`crate::Error::Malformed`]
/// if a line or column leaves its valid range.
pub fn parse_sequence_points(blob: &[u8], document: Option<u32>) -> Result<SequencePoints> {
    let mut parser = Parser::new(blob);

    let local_signature = parser.read_compressed_uint()?;
    let mut current_document = match document {
        Some(document) => document,
        None => parser.read_compressed_uint()?,
    };

    let mut points = Vec::new();
    let mut il_offset = 0_u32;
    let mut previous_start: Option<(u32, u16)> = None;

    while parser.has_more_data() {
        let delta_il = parser.read_compressed_uint()?;
        if !points.is_empty() && delta_il == 0 {
            current_document = parser.read_compressed_uint()?;
            continue;
        }

        il_offset = if points.is_empty() {
            delta_il
        } else {
            il_offset
                .checked_add(delta_il)
                .ok_or_else(|| malformed_error!("IL offset overflow at record {}", points.len()))?
        };

        let delta_lines = parser.read_compressed_uint()?;
        let delta_columns = if delta_lines == 0 {
            i64::from(parser.read_compressed_uint()?)
        } else {
            i64::from(parser.read_compressed_int()?)
        };

        if delta_lines == 0 && delta_columns == 0 {
            points.push(SequencePoint {
                document: current_document,
                il_offset,
                start_line: HIDDEN_LINE,
                start_column: 0,
                end_line: HIDDEN_LINE,
                end_column: 0,
                is_hidden: true,
            });
            continue;
        }

        let (start_line, start_column) = match previous_start {
            None => (
                i64::from(parser.read_compressed_uint()?),
                i64::from(parser.read_compressed_uint()?),
            ),
            Some((line, column)) => (
                i64::from(line) + i64::from(parser.read_compressed_int()?),
                i64::from(column) + i64::from(parser.read_compressed_int()?),
            ),
        };

        let start_line = line_number(start_line)?;
        let start_column = column_number(start_column)?;
        let end_line = line_number(i64::from(start_line) + i64::from(delta_lines))?;
        let end_column = column_number(i64::from(start_column) + delta_columns)?;

        previous_start = Some((start_line, start_column));
        points.push(SequencePoint {
            document: current_document,
            il_offset,
            start_line,
            start_column,
            end_line,
            end_column,
            is_hidden: false,
        });
    }

    Ok(SequencePoints {
        local_signature,
        points,
    })
}

fn line_number(value: i64) -> Result<u32> {
    match u32::try_from(value) {
        Ok(line) if line < 0x2000_0000 => Ok(line),
        _ => Err(malformed_error!("Invalid sequence point line - {}", value)),
    }
}

fn column_number(value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| malformed_error!("Invalid sequence point column - {}", value))
}
