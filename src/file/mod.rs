//! PE file abstraction for .NET binaries.
//!
//! This module loads a Portable Executable from disk or memory, validates that it carries a
//! CLR runtime header and exposes the few PE structures the converter needs: the CLR header
//! and debug data directories, the section table and RVA to file offset translation.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - A parsed PE image, owning its backing data
//! - [`crate::file::Backend`] - Trait for data sources (memory-mapped files, memory buffers)
//! - [`crate::file::parser::Parser`] - Cursor based reader for metadata structures
//! - [`crate::file::io`] - Little-endian primitive reads and writes
//!
//! # Examples
//!
//! ```rust,no_run
//! use pdbport::file::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("assembly.dll"))?;
//!
//! let (clr_rva, clr_size) = file.clr()?;
//! let clr_header = file.data_slice(file.rva_to_offset(clr_rva)?, clr_size)?;
//! println!("CLR header: {} bytes", clr_header.len());
//!
//! if let Some((debug_rva, debug_size)) = file.debug_directory() {
//!     println!("{} debug directory entries", debug_size / 28);
//! #   let _ = debug_rva;
//! }
//! # Ok::<(), pdbport::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::pe::{section_table::SectionTable, PE};
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Backend trait for file data sources.
///
/// Abstracts over where the bytes of a PE image live, so that files on disk can be memory
/// mapped while generated or downloaded images stay in a plain buffer.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

#[self_referencing]
/// A loaded PE file with .NET metadata.
///
/// Wraps the goblin parse of the image together with the bytes it borrows from. Loading
/// fails unless the image has an optional header with a CLR runtime header directory.
///
/// # Examples
///
/// ```rust,no_run
/// use pdbport::file::File;
///
/// let data = std::fs::read("assembly.dll")?;
/// let file = File::from_mem(data)?;
///
/// for section in file.sections() {
///     println!("{:?} at RVA 0x{:x}", section.name(), section.virtual_address);
/// }
/// # Ok::<(), pdbport::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed PE structure, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Loads a PE file from the given path. The file is memory-mapped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is empty, is not a PE image or has no CLR
    /// runtime header.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty, is not a PE image or has no CLR runtime header.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let data = data.as_ref();
            match PE::parse(data.data()) {
                Ok(pe) => match pe.header.optional_header {
                    Some(optional_header) => {
                        if optional_header
                            .data_directories
                            .get_clr_runtime_header()
                            .is_none()
                        {
                            Err(malformed_error!(
                                "File does not have a CLR runtime header directory"
                            ))
                        } else {
                            Ok(pe)
                        }
                    }
                    None => Err(malformed_error!("File does not have an OptionalHeader")),
                },
                Err(error) => Err(GoblinErr(error)),
            }
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the RVA and size of the CLR runtime header.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the directory is missing; [`File`] only loads
    /// images that have one, so this does not happen for a successfully loaded file.
    pub fn clr(&self) -> Result<(usize, usize)> {
        self.with_pe(|pe| {
            let Some(clr_dir) = pe
                .header
                .optional_header
                .as_ref()
                .and_then(|header| header.data_directories.get_clr_runtime_header())
            else {
                return Err(malformed_error!(
                    "File does not have a CLR runtime header directory"
                ));
            };

            Ok((clr_dir.virtual_address as usize, clr_dir.size as usize))
        })
    }

    /// Returns the RVA and size of the debug directory, if the image has one.
    #[must_use]
    pub fn debug_directory(&self) -> Option<(usize, usize)> {
        self.with_pe(|pe| {
            pe.header
                .optional_header
                .as_ref()
                .and_then(|header| header.data_directories.get_debug_table())
                .filter(|directory| directory.virtual_address != 0 && directory.size != 0)
                .map(|directory| (directory.virtual_address as usize, directory.size as usize))
        })
    }

    /// Returns an iterator over the section headers.
    pub fn sections(&self) -> impl Iterator<Item = &SectionTable> {
        self.with_pe(|pe| pe.sections.iter())
    }

    /// Returns the raw bytes of the whole image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Returns `len` bytes of the image starting at file offset `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range runs past the image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Converts a relative virtual address into a file offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if no section contains `rva` or a section header
    /// overflows.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let rva_u32 =
            u32::try_from(rva).map_err(|_| malformed_error!("RVA too large to fit in u32: {}", rva))?;

        self.with_pe(|pe| {
            for section in &pe.sections {
                let size = section.virtual_size.max(section.size_of_raw_data);
                let Some(section_max) = section.virtual_address.checked_add(size) else {
                    return Err(malformed_error!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        size
                    ));
                };

                if section.virtual_address <= rva_u32 && section_max > rva_u32 {
                    return Ok((rva - section.virtual_address as usize)
                        + section.pointer_to_raw_data as usize);
                }
            }

            Err(malformed_error!(
                "RVA could not be converted to offset - {}",
                rva
            ))
        })
    }
}
