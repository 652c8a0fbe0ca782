use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of a `Document` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRaw {
    /// Row identifier (1-based index in the table)
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// Index into `#Blob` heap for the document-name blob
    pub name: u32,
    /// Index into `#GUID` heap for the hash algorithm
    pub hash_algorithm: u32,
    /// Index into `#Blob` heap for the checksum bytes
    pub hash: u32,
    /// Index into `#GUID` heap for the source language
    pub language: u32,
}

impl TableRow for DocumentRaw {
    const TABLE: TableId = TableId::Document;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            sizes.blob_bytes() +  // name
            sizes.guid_bytes() +  // hash_algorithm
            sizes.blob_bytes() +  // hash
            sizes.guid_bytes()    // language
        )
    }
}

impl RowReadable for DocumentRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(DocumentRaw {
            rid,
            token: Token::from_parts(TableId::Document, rid),
            offset: *offset,
            name: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            hash_algorithm: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            hash: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            language: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
        })
    }
}

impl RowWritable for DocumentRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.name, sizes.is_large_blob())?;
        write_le_at_dyn(data, offset, self.hash_algorithm, sizes.is_large_guid())?;
        write_le_at_dyn(data, offset, self.hash, sizes.is_large_blob())?;
        write_le_at_dyn(data, offset, self.language, sizes.is_large_guid())?;
        Ok(())
    }
}
