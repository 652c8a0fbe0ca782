use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of a `StateMachineMethod` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachineMethodRaw {
    /// Row identifier (1-based index in the table)
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// Index into the external `MethodDef` table for the `MoveNext` method
    pub move_next_method: u32,
    /// Index into the external `MethodDef` table for the kickoff method
    pub kickoff_method: u32,
}

impl TableRow for StateMachineMethodRaw {
    const TABLE: TableId = TableId::StateMachineMethod;

    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.table_index_bytes(TableId::MethodDef) * 2)
    }
}

impl RowReadable for StateMachineMethodRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(StateMachineMethodRaw {
            rid,
            token: Token::from_parts(TableId::StateMachineMethod, rid),
            offset: *offset,
            move_next_method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
            kickoff_method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

impl RowWritable for StateMachineMethodRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.move_next_method, sizes.is_large(TableId::MethodDef))?;
        write_le_at_dyn(data, offset, self.kickoff_method, sizes.is_large(TableId::MethodDef))
    }
}
