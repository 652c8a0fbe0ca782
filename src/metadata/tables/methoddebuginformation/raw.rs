use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of a `MethodDebugInformation` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDebugInformationRaw {
    /// Row identifier, equal to the `MethodDef` row it describes
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// Index into the `Document` table when all sequence points share one document, else 0
    pub document: u32,
    /// Index into `#Blob` heap for the sequence-point blob, 0 if the method has none
    pub sequence_points: u32,
}

impl TableRow for MethodDebugInformationRaw {
    const TABLE: TableId = TableId::MethodDebugInformation;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            sizes.table_index_bytes(TableId::Document) + // document
            sizes.blob_bytes()                           // sequence_points
        )
    }
}

impl RowReadable for MethodDebugInformationRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodDebugInformationRaw {
            rid,
            token: Token::from_parts(TableId::MethodDebugInformation, rid),
            offset: *offset,
            document: read_le_at_dyn(data, offset, sizes.is_large(TableId::Document))?,
            sequence_points: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for MethodDebugInformationRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.document, sizes.is_large(TableId::Document))?;
        write_le_at_dyn(data, offset, self.sequence_points, sizes.is_large_blob())?;
        Ok(())
    }
}
