use crate::{
    file::io::{read_le_at, read_le_at_dyn, write_le_at, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of a `LocalScope` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalScopeRaw {
    /// Row identifier (1-based index in the table)
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// Index into the external `MethodDef` table
    pub method: u32,
    /// Index into the `ImportScope` table
    pub import_scope: u32,
    /// First row of this scope's run in the `LocalVariable` table
    pub variable_list: u32,
    /// First row of this scope's run in the `LocalConstant` table
    pub constant_list: u32,
    /// IL offset the scope starts at
    pub start_offset: u32,
    /// Length of the scope in bytes of IL
    pub length: u32,
}

impl TableRow for LocalScopeRaw {
    const TABLE: TableId = TableId::LocalScope;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            sizes.table_index_bytes(TableId::MethodDef) +     // method
            sizes.table_index_bytes(TableId::ImportScope) +   // import_scope
            sizes.table_index_bytes(TableId::LocalVariable) + // variable_list
            sizes.table_index_bytes(TableId::LocalConstant) + // constant_list
            4 +                                               // start_offset
            4                                                 // length
        )
    }
}

impl RowReadable for LocalScopeRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(LocalScopeRaw {
            rid,
            token: Token::from_parts(TableId::LocalScope, rid),
            offset: *offset,
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
            import_scope: read_le_at_dyn(data, offset, sizes.is_large(TableId::ImportScope))?,
            variable_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::LocalVariable))?,
            constant_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::LocalConstant))?,
            start_offset: read_le_at::<u32>(data, offset)?,
            length: read_le_at::<u32>(data, offset)?,
        })
    }
}

impl RowWritable for LocalScopeRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.method, sizes.is_large(TableId::MethodDef))?;
        write_le_at_dyn(data, offset, self.import_scope, sizes.is_large(TableId::ImportScope))?;
        write_le_at_dyn(data, offset, self.variable_list, sizes.is_large(TableId::LocalVariable))?;
        write_le_at_dyn(data, offset, self.constant_list, sizes.is_large(TableId::LocalConstant))?;
        write_le_at(data, offset, self.start_offset)?;
        write_le_at(data, offset, self.length)?;
        Ok(())
    }
}
