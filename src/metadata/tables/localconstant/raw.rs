use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of a `LocalConstant` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConstantRaw {
    /// Row identifier (1-based index in the table)
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// Index into `#Strings` heap for the constant name
    pub name: u32,
    /// Index into `#Blob` heap for the constant signature
    pub signature: u32,
}

impl TableRow for LocalConstantRaw {
    const TABLE: TableId = TableId::LocalConstant;

    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.str_bytes() + sizes.blob_bytes())
    }
}

impl RowReadable for LocalConstantRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(LocalConstantRaw {
            rid,
            token: Token::from_parts(TableId::LocalConstant, rid),
            offset: *offset,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for LocalConstantRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())?;
        write_le_at_dyn(data, offset, self.signature, sizes.is_large_blob())
    }
}
