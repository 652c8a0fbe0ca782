//! Encoding of method sequence points into a sequence-points blob.
//!
//! The blob layout is the one [`crate::metadata::sequencepoints`] decodes. When every point of
//! a method lies in one document the `MethodDebugInformation` row names that document and the
//! blob header carries only the local signature; otherwise the row's document is nil, the
//! header names the initial document and each change of document is written as a `0` record
//! followed by the new document row.
//!
//! Points at the same IL offset as their predecessor produce an IL delta of 0. Readers that
//! treat a non-first zero delta as a document record will misread such points, so symbol
//! sources should merge them.

use crate::{
    metadata::{builder::DocumentHandle, sequencepoints::HIDDEN_LINE, token::Token},
    symbols::SequencePoint,
    utils::compressed::{
        write_compressed_int, write_compressed_uint, MAX_COMPRESSED_INT, MAX_COMPRESSED_UINT,
        MIN_COMPRESSED_INT,
    },
    Result,
};

/// Lines at or above this value cannot be encoded.
const MAX_LINE: u32 = 0x2000_0000;

/// Largest `StandAloneSig` row a local signature can name.
const MAX_LOCAL_SIGNATURE: u32 = 0x00FF_FFFF;

/// A sequence-points blob and the document column of its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequencePoints {
    /// The blob
    pub blob: Vec<u8>,
    /// The only document the points refer to, `None` if there are several
    pub single_document: Option<DocumentHandle>,
}

/// Encode the sequence points of `method`.
///
/// `resolve_document` maps a document name to its row; a name it does not know is an error.
/// Returns `None` for a method without sequence points.
///
/// # Errors
/// Returns [`crate::Error::SequencePoints`] for an unknown document, a decreasing IL offset,
/// a span that ends before it starts, a non-hidden point of zero width and positions that
/// cannot be encoded.
pub fn encode_sequence_points<F>(
    method: Token,
    local_signature: Option<u32>,
    points: &[SequencePoint],
    mut resolve_document: F,
) -> Result<Option<EncodedSequencePoints>>
where
    F: FnMut(&str) -> Option<DocumentHandle>,
{
    let Some(first) = points.first() else {
        return Ok(None);
    };

    let local_signature = local_signature.unwrap_or(0);
    if local_signature > MAX_LOCAL_SIGNATURE {
        return Err(sequence_point_error!(
            method,
            "local signature row {} out of range",
            local_signature
        ));
    }

    let mut documents = Vec::with_capacity(points.len());
    for point in points {
        match resolve_document(&point.document) {
            Some(document) => documents.push(document),
            None => {
                return Err(sequence_point_error!(
                    method,
                    "unknown document '{}' at IL offset {}",
                    point.document,
                    point.il_offset
                ))
            }
        }
    }

    let initial_document = documents[0];
    let single_document = documents
        .iter()
        .all(|document| *document == initial_document)
        .then_some(initial_document);

    let mut blob = Vec::with_capacity(4 + points.len() * 6);
    write_compressed_uint(local_signature, &mut blob);
    if single_document.is_none() {
        write_compressed_uint(initial_document.row(), &mut blob);
    }

    let mut current_document = initial_document;
    let mut previous_offset = first.il_offset;
    let mut previous_start: Option<(u32, u16)> = None;

    for (index, (point, &document)) in points.iter().zip(&documents).enumerate() {
        if document != current_document {
            write_compressed_uint(0, &mut blob);
            write_compressed_uint(document.row(), &mut blob);
            current_document = document;
        }

        let delta_il = if index == 0 {
            point.il_offset
        } else if point.il_offset < previous_offset {
            return Err(sequence_point_error!(
                method,
                "IL offset {} follows IL offset {}",
                point.il_offset,
                previous_offset
            ));
        } else {
            point.il_offset - previous_offset
        };
        if delta_il > MAX_COMPRESSED_UINT {
            return Err(sequence_point_error!(
                method,
                "IL offset {} cannot be encoded",
                point.il_offset
            ));
        }
        write_compressed_uint(delta_il, &mut blob);
        previous_offset = point.il_offset;

        if point.hidden || point.start_line == HIDDEN_LINE {
            write_compressed_uint(0, &mut blob);
            write_compressed_uint(0, &mut blob);
            continue;
        }

        write_span(method, point, &mut blob)?;

        match previous_start {
            None => {
                write_compressed_uint(point.start_line, &mut blob);
                write_compressed_uint(u32::from(point.start_column), &mut blob);
            }
            Some((line, column)) => {
                let delta_line = i64::from(point.start_line) - i64::from(line);
                let delta_line = i32::try_from(delta_line)
                    .ok()
                    .filter(|delta| (MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT).contains(delta))
                    .ok_or_else(|| {
                        sequence_point_error!(
                            method,
                            "line {} at IL offset {} is too far from line {}",
                            point.start_line,
                            point.il_offset,
                            line
                        )
                    })?;
                write_compressed_int(delta_line, &mut blob);
                write_compressed_int(
                    i32::from(point.start_column) - i32::from(column),
                    &mut blob,
                );
            }
        }
        previous_start = Some((point.start_line, point.start_column));
    }

    tracing::trace!(
        %method,
        points = points.len(),
        bytes = blob.len(),
        single_document = single_document.is_some(),
        "encoded sequence points"
    );

    Ok(Some(EncodedSequencePoints {
        blob,
        single_document,
    }))
}

/// Write `δLines` and `δColumns` of a visible point.
fn write_span(method: Token, point: &SequencePoint, blob: &mut Vec<u8>) -> Result<()> {
    if point.start_line == 0 || point.start_line >= MAX_LINE || point.end_line >= MAX_LINE {
        return Err(sequence_point_error!(
            method,
            "lines {}..{} at IL offset {} are out of range",
            point.start_line,
            point.end_line,
            point.il_offset
        ));
    }

    if point.end_line < point.start_line {
        return Err(sequence_point_error!(
            method,
            "span at IL offset {} ends on line {} before it starts on line {}",
            point.il_offset,
            point.end_line,
            point.start_line
        ));
    }

    let delta_lines = point.end_line - point.start_line;
    let delta_columns = i32::from(point.end_column) - i32::from(point.start_column);

    if delta_lines == 0 {
        if delta_columns <= 0 {
            return Err(sequence_point_error!(
                method,
                "span at IL offset {} has width {} on line {}",
                point.il_offset,
                delta_columns,
                point.start_line
            ));
        }

        write_compressed_uint(0, blob);
        write_compressed_uint(delta_columns.unsigned_abs(), blob);
    } else {
        write_compressed_uint(delta_lines, blob);
        write_compressed_int(delta_columns, blob);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{sequencepoints::parse_sequence_points, tables::TableId},
        Error,
    };

    const METHOD: Token = Token(0x0600_0005);

    fn resolve(name: &str) -> Option<DocumentHandle> {
        match name {
            "a.cs" => Some(DocumentHandle(1)),
            "b.cs" => Some(DocumentHandle(2)),
            _ => None,
        }
    }

    fn encode(points: &[SequencePoint]) -> Result<Option<EncodedSequencePoints>> {
        encode_sequence_points(METHOD, None, points, resolve)
    }

    #[test]
    fn no_points() {
        assert_eq!(encode(&[]).unwrap(), None);
    }

    #[test]
    fn il_offset_deltas() {
        let points = [
            SequencePoint::new("a.cs", 0, 1, 1, 1, 5),
            SequencePoint::new("a.cs", 5, 2, 1, 2, 5),
            SequencePoint::new("a.cs", 5, 3, 1, 3, 5),
            SequencePoint::new("a.cs", 12, 4, 1, 4, 5),
        ];
        let encoded = encode(&points).unwrap().unwrap();
        assert_eq!(encoded.single_document, Some(DocumentHandle(1)));

        #[rustfmt::skip]
        let expected = [
            0x00,                         // local signature
            0x00, 0x00, 0x04, 0x01, 0x01, // IL 0: absolute line 1, column 1
            0x05, 0x00, 0x04, 0x02, 0x00, // IL delta 5: line +1
            0x00, 0x00, 0x04, 0x02, 0x00, // IL delta 0: line +1
            0x07, 0x00, 0x04, 0x02, 0x00, // IL delta 7: line +1
        ];
        assert_eq!(encoded.blob, expected);
    }

    #[test]
    fn hidden_points() {
        let points = [
            SequencePoint::hidden("a.cs", 0),
            SequencePoint::new("a.cs", 3, 7, 5, 9, 2),
            SequencePoint::hidden("a.cs", 8),
        ];
        let encoded = encode(&points).unwrap().unwrap();

        #[rustfmt::skip]
        let expected = [
            0x00,
            0x00, 0x00, 0x00,             // hidden
            0x03, 0x02, 0x7B, 0x07, 0x05, // 2 lines, columns -3, first visible: absolute
            0x05, 0x00, 0x00,             // hidden
        ];
        assert_eq!(encoded.blob, expected);

        let decoded = parse_sequence_points(&encoded.blob, Some(1)).unwrap();
        assert!(decoded.points[0].is_hidden);
        assert_eq!(decoded.points[1].start_line, 7);
        assert_eq!(decoded.points[1].end_column, 2);
        assert!(decoded.points[2].is_hidden);
    }

    #[test]
    fn legacy_hidden_line() {
        let mut point = SequencePoint::new("a.cs", 0, HIDDEN_LINE, 0, HIDDEN_LINE, 0);
        point.hidden = false;
        let encoded = encode(&[point]).unwrap().unwrap();
        assert_eq!(encoded.blob, [0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn multiple_documents() {
        let points = [
            SequencePoint::new("a.cs", 0, 10, 1, 10, 4),
            SequencePoint::new("b.cs", 2, 3, 1, 3, 4),
            SequencePoint::new("a.cs", 6, 12, 5, 12, 8),
        ];
        let encoded = encode_sequence_points(METHOD, Some(3), &points, resolve)
            .unwrap()
            .unwrap();
        assert_eq!(encoded.single_document, None);

        #[rustfmt::skip]
        let expected = [
            0x03, 0x01,                   // local signature 3, initial document 1
            0x00, 0x00, 0x03, 0x0A, 0x01, // IL 0, line 10
            0x00, 0x02,                   // document 2
            0x02, 0x00, 0x03, 0x73, 0x00, // IL +2, line -7
            0x00, 0x01,                   // document 1
            0x04, 0x00, 0x03, 0x12, 0x08, // IL +4, line +9, column +4
        ];
        assert_eq!(encoded.blob, expected);

        let decoded = parse_sequence_points(&encoded.blob, None).unwrap();
        assert_eq!(decoded.local_signature, 3);
        let documents: Vec<u32> = decoded.points.iter().map(|point| point.document).collect();
        assert_eq!(documents, [1, 2, 1]);
        assert_eq!(decoded.points[2].start_column, 5);
    }

    #[test]
    fn format_errors() {
        let unknown = [SequencePoint::new("c.cs", 4, 1, 1, 1, 2)];
        let decreasing = [
            SequencePoint::new("a.cs", 4, 1, 1, 1, 2),
            SequencePoint::new("a.cs", 2, 2, 1, 2, 2),
        ];
        let zero_width = [SequencePoint::new("a.cs", 0, 3, 4, 3, 4)];
        let negative_width = [SequencePoint::new("a.cs", 0, 3, 8, 3, 4)];
        let backwards = [SequencePoint::new("a.cs", 0, 5, 1, 4, 9)];
        let line_zero = [SequencePoint::new("a.cs", 0, 0, 1, 0, 3)];

        for points in [
            &unknown[..],
            &decreasing[..],
            &zero_width[..],
            &negative_width[..],
            &backwards[..],
            &line_zero[..],
        ] {
            match encode(points) {
                Err(Error::SequencePoints { method, .. }) => assert_eq!(method, METHOD),
                other => panic!("expected a sequence point error, got {other:?}"),
            }
        }

        let error = encode(&decreasing).unwrap_err();
        assert!(error.to_string().contains("IL offset 2"));

        let error = encode_sequence_points(
            Token::from_parts(TableId::MethodDef, 1),
            Some(0x0100_0000),
            &zero_width,
            resolve,
        );
        assert!(error.is_err());
    }
}
