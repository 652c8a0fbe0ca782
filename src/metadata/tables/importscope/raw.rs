use crate::{
    file::io::{read_le_at_dyn, write_le_at_dyn},
    metadata::{
        tables::{RowReadable, RowWritable, TableId, TableInfoRef, TableRow},
        token::Token,
    },
    Result,
};

/// Raw binary representation of an `ImportScope` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportScopeRaw {
    /// Row identifier (1-based index in the table)
    pub rid: u32,
    /// Metadata token for this row
    pub token: Token,
    /// Byte offset of this row in the tables stream
    pub offset: usize,
    /// Index into the `ImportScope` table for the parent scope, 0 for a root
    pub parent: u32,
    /// Index into `#Blob` heap for the imports blob
    pub imports: u32,
}

impl TableRow for ImportScopeRaw {
    const TABLE: TableId = TableId::ImportScope;

    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(sizes.table_index_bytes(TableId::ImportScope) + sizes.blob_bytes())
    }
}

impl RowReadable for ImportScopeRaw {
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ImportScopeRaw {
            rid,
            token: Token::from_parts(TableId::ImportScope, rid),
            offset: *offset,
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::ImportScope))?,
            imports: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl RowWritable for ImportScopeRaw {
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        _rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()> {
        write_le_at_dyn(data, offset, self.parent, sizes.is_large(TableId::ImportScope))?;
        write_le_at_dyn(data, offset, self.imports, sizes.is_large_blob())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::TableInfo;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x00, 0x00, // parent
            0x00, 0x00, // imports
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::ImportScope, 1)], false, false, false));
        let row = ImportScopeRaw::row_read(&data, &mut 0, 1, &sizes).unwrap();
        assert_eq!((row.parent, row.imports), (0, 0));
        assert_eq!(row.token.value(), 0x3500_0001);
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x00, // parent
            0x03, 0x00, 0x01, 0x00, // imports
        ];

        let sizes = Arc::new(TableInfo::from_rows(&[(TableId::ImportScope, 2)], false, false, true));
        let row = ImportScopeRaw::row_read(&data, &mut 0, 2, &sizes).unwrap();
        assert_eq!((row.parent, row.imports), (1, 0x0001_0003));

        let mut written = vec![0u8; 6];
        row.row_write(&mut written, &mut 0, 2, &sizes).unwrap();
        assert_eq!(written, data);
    }
}
