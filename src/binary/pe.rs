use std::path::Path;

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    binary::{
        codeview::{DebugDirectoryEntry, DEBUG_DIRECTORY_ENTRY_SIZE},
        BinarySource, CodeViewEntry, IMAGE_DEBUG_TYPE_CODEVIEW,
    },
    file::File,
    metadata::{
        cor20header::Cor20Header, root::Root, streams::TablesHeader, tables::TableId,
        token::Token,
    },
    Result,
};

/// A .NET PE image, read eagerly.
///
/// Construction parses the CLR header, the metadata root and the tables stream header of the
/// image, and scans its debug directory. Later queries never fail.
///
/// # Examples
///
/// ```rust,no_run
/// use pdbport::binary::{BinarySource, PeBinary};
/// use pdbport::metadata::tables::TableId;
/// use std::path::Path;
///
/// let binary = PeBinary::from_file(Path::new("App.dll"))?;
/// if let Some(codeview) = binary.codeview()? {
///     println!("{} age {} -> {}", codeview.guid, codeview.age, codeview.path);
/// }
/// println!("{} methods", binary.row_count(TableId::MethodDef)?);
/// # Ok::<(), pdbport::Error>(())
/// ```
pub struct PeBinary {
    file: File,
    codeview: Option<CodeViewEntry>,
    rows: [u32; TableId::COUNT],
    entry_point: Option<Token>,
}

impl PeBinary {
    /// Load and parse a PE image from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a well formed .NET image.
    pub fn from_file(path: &Path) -> Result<PeBinary> {
        Self::from_pe(File::from_file(path)?)
    }

    /// Parse a PE image held in memory.
    ///
    /// # Errors
    /// Returns an error if the buffer is not a well formed .NET image.
    pub fn from_mem(data: Vec<u8>) -> Result<PeBinary> {
        Self::from_pe(File::from_mem(data)?)
    }

    /// Parse the .NET structures of an already loaded PE file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the CLR header, the metadata or the debug
    /// directory are damaged, and [`crate::Error::OutOfBounds`] if they point outside the image.
    pub fn from_pe(file: File) -> Result<PeBinary> {
        let (clr_rva, clr_size) = file.clr()?;
        let header = Cor20Header::read(file.data_slice(file.rva_to_offset(clr_rva)?, clr_size)?)?;

        let metadata = file.data_slice(
            file.rva_to_offset(header.meta_data_rva as usize)?,
            header.meta_data_size as usize,
        )?;
        let root = Root::read(metadata)?;
        let name = if root.stream_header("#~").is_some() {
            "#~"
        } else {
            "#-"
        };
        let tables = TablesHeader::from(root.stream(name, metadata)?)?;

        let mut rows = [0_u32; TableId::COUNT];
        for table in TableId::iter().filter(|table| !table.is_debug_table()) {
            rows[table.ordinal()] = tables.row_count(table);
        }

        let codeview = Self::read_codeview(&file)?;

        tracing::debug!(
            version = %root.version,
            methods = rows[TableId::MethodDef.ordinal()],
            codeview = codeview.is_some(),
            "parsed binary"
        );

        Ok(PeBinary {
            file,
            codeview,
            rows,
            entry_point: header.entry_point(),
        })
    }

    fn read_codeview(file: &File) -> Result<Option<CodeViewEntry>> {
        let Some((rva, size)) = file.debug_directory() else {
            return Ok(None);
        };

        let directory = file.data_slice(file.rva_to_offset(rva)?, size)?;
        if directory.len() % DEBUG_DIRECTORY_ENTRY_SIZE != 0 {
            return Err(malformed_error!(
                "Debug directory size {} is not a multiple of {}",
                size,
                DEBUG_DIRECTORY_ENTRY_SIZE
            ));
        }

        for entry in DebugDirectoryEntry::read_all(directory)? {
            tracing::trace!(
                data_type = entry.data_type,
                major = entry.major_version,
                minor = entry.minor_version,
                size = entry.size_of_data,
                "debug directory entry"
            );

            if entry.data_type != IMAGE_DEBUG_TYPE_CODEVIEW || entry.size_of_data == 0 {
                continue;
            }

            let offset = if entry.pointer_to_raw_data != 0 {
                entry.pointer_to_raw_data as usize
            } else {
                file.rva_to_offset(entry.address_of_raw_data as usize)?
            };

            let data = file.data_slice(offset, entry.size_of_data as usize)?;
            if let Some(codeview) = CodeViewEntry::read(data, entry.time_date_stamp)? {
                return Ok(Some(codeview));
            }
        }

        Ok(None)
    }

    /// The underlying PE file.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }
}

impl BinarySource for PeBinary {
    fn codeview(&self) -> Result<Option<CodeViewEntry>> {
        Ok(self.codeview.clone())
    }

    fn row_count(&self, table: TableId) -> Result<u32> {
        Ok(self.rows[table.ordinal()])
    }

    fn entry_point(&self) -> Option<Token> {
        self.entry_point
    }
}
