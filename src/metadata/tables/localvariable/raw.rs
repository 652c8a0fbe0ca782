use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of a `LocalVariable` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableRaw {
    /// Row identifier (1-based index in the table)
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// `LocalVariableAttributes` bits
    pub attributes: u16,
    /// Slot of the variable in the method's local signature
    pub index: u16,
    /// Index into `#Strings` heap for the variable name
    pub name: u32,
}

impl TableRow for LocalVariableRaw {
    const TABLE: TableId = TableId::LocalVariable;

    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(2 + 2 + sizes.str_bytes())
    }
}

impl RowReadable for LocalVariableRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(LocalVariableRaw {
            rid,
            token: Token::from_parts(TableId::LocalVariable, rid),
            offset: *offset,
            attributes: read_le_at::<u16>(data, offset)?,
            index: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl RowWritable for LocalVariableRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at(data, offset, self.attributes)?;
        write_le_at(data, offset, self.index)?;
        write_le_at_dyn(data, offset, self.name, sizes.is_large_str())
    }
}
