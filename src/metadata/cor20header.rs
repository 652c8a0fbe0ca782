//! CLR 2.0 (Cor20) header of a .NET binary.
//!
//! Found through the `IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR` data directory. The converter
//! needs it to locate the metadata root (and through it the row counts of the type-system
//! tables) and to fall back to the managed entry point when the symbols name none.
//!
//! # Reference
//! - [ECMA-335 II.25.3.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::parser::Parser,
    metadata::{tables::TableId, token::Token},
    Error::OutOfBounds,
    Result,
};

/// Size of the CLR header in bytes.
pub const COR20_HEADER_SIZE: usize = 72;

/// `COMIMAGE_FLAGS_NATIVE_ENTRYPOINT`: the entry point field holds an RVA, not a token.
const FLAG_NATIVE_ENTRYPOINT: u32 = 0x0000_0010;

/// The CLR header, as laid out in the binary.
pub struct Cor20Header {
    /// Size of header in bytes
    pub cb: u32,
    /// The minimum version of runtime required to run this program
    pub major_runtime_version: u16,
    /// The minor portion of the version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata
    pub meta_data_size: u32,
    /// Flags describing this runtime
    pub flags: u32,
    /// Token of the entry point `MethodDef` or `File`, or an RVA for native entry points
    pub entry_point_token: u32,
    /// RVA of implementation specific resources
    pub resource_rva: u32,
    /// Size of implementation specific resources
    pub resource_size: u32,
    /// RVA of the strong name signature
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature
    pub strong_name_signature_size: u32,
    /// RVA of the VTable fixups
    pub vtable_fixups_rva: u32,
    /// Size of the VTable fixups
    pub vtable_fixups_size: u32,
}

impl Cor20Header {
    /// Parse a CLR header.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than 72 bytes, or
    /// [`crate::Error::Malformed`] if a field violates ECMA-335 II.25.3.3.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        const VALID_FLAGS: u32 = 0x0000_001F;

        if data.len() < COR20_HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb as usize != COR20_HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;
        if major_runtime_version == 0 || major_runtime_version > 10 {
            return Err(malformed_error!(
                "Invalid major runtime version: {}",
                major_runtime_version
            ));
        }

        let (meta_data_rva, meta_data_size) = read_pair(&mut parser, "Metadata")?;
        if meta_data_rva == 0 {
            return Err(malformed_error!("Metadata directory cannot be empty"));
        }
        if meta_data_size > 0x1000_0000 {
            return Err(malformed_error!(
                "Metadata size {} exceeds reasonable limit (256MB)",
                meta_data_size
            ));
        }

        let flags = parser.read_le::<u32>()?;
        if flags & !VALID_FLAGS != 0 {
            return Err(malformed_error!(
                "Invalid CLR flags: 0x{:08X} contains undefined bits",
                flags
            ));
        }

        let entry_point_token = parser.read_le::<u32>()?;
        let (resource_rva, resource_size) = read_pair(&mut parser, "Resource")?;
        let (strong_name_signature_rva, strong_name_signature_size) =
            read_pair(&mut parser, "Strong name")?;

        let code_manager_table = (parser.read_le::<u32>()?, parser.read_le::<u32>()?);
        if code_manager_table != (0, 0) {
            return Err(malformed_error!(
                "Code Manager Table fields must be zero (reserved)"
            ));
        }

        let (vtable_fixups_rva, vtable_fixups_size) = read_pair(&mut parser, "VTable fixups")?;

        let export_address_table_jmp = (parser.read_le::<u32>()?, parser.read_le::<u32>()?);
        if export_address_table_jmp != (0, 0) {
            return Err(malformed_error!(
                "Export Address Table Jump fields must be zero (reserved)"
            ));
        }

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
            entry_point_token,
            resource_rva,
            resource_size,
            strong_name_signature_rva,
            strong_name_signature_size,
            vtable_fixups_rva,
            vtable_fixups_size,
        })
    }

    /// The managed entry point, if the binary declares a `MethodDef` as its entry point.
    #[must_use]
    pub fn entry_point(&self) -> Option<Token> {
        if self.flags & FLAG_NATIVE_ENTRYPOINT != 0 {
            return None;
        }

        let token = Token::new(self.entry_point_token);
        (!token.is_null() && token.table_id() == Some(TableId::MethodDef)).then_some(token)
    }
}

/// Read an RVA/size pair, both of which must be zero or both non-zero.
fn read_pair(parser: &mut Parser, name: &str) -> Result<(u32, u32)> {
    let rva = parser.read_le::<u32>()?;
    let size = parser.read_le::<u32>()?;
    if (rva == 0) != (size == 0) {
        return Err(malformed_error!("{} values are invalid", name));
    }

    Ok((rva, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const HEADER: [u8; 72] = [
        0x48, 0x00, 0x00, 0x00, // cb = 72
        0x02, 0x00,             // major_runtime_version = 2
        0x05, 0x00,             // minor_runtime_version = 5
        0x50, 0x20, 0x00, 0x00, // meta_data_rva = 0x2050
        0x00, 0x01, 0x00, 0x00, // meta_data_size = 0x100
        0x01, 0x00, 0x00, 0x00, // flags = ILONLY
        0x02, 0x00, 0x00, 0x06, // entry_point_token = 0x06000002
        0x00, 0x00, 0x00, 0x00, // resource_rva
        0x00, 0x00, 0x00, 0x00, // resource_size
        0x00, 0x00, 0x00, 0x00, // strong_name_signature_rva
        0x00, 0x00, 0x00, 0x00, // strong_name_signature_size
        0x00, 0x00, 0x00, 0x00, // code_manager_table_rva
        0x00, 0x00, 0x00, 0x00, // code_manager_table_size
        0x00, 0x00, 0x00, 0x00, // vtable_fixups_rva
        0x00, 0x00, 0x00, 0x00, // vtable_fixups_size
        0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_rva
        0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_size
        0x00, 0x00, 0x00, 0x00, // managed_native_header_rva
        0x00, 0x00, 0x00, 0x00, // managed_native_header_size
    ];

    #[test]
    fn crafted() {
        let header = Cor20Header::read(&HEADER).unwrap();

        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 5);
        assert_eq!(header.meta_data_rva, 0x2050);
        assert_eq!(header.meta_data_size, 0x100);
        assert_eq!(header.flags, 1);
        assert_eq!(header.entry_point(), Some(Token::new(0x0600_0002)));
    }

    #[test]
    fn entry_point_variants() {
        let mut data = HEADER;
        data[23] = 0x26; // File token
        assert_eq!(Cor20Header::read(&data).unwrap().entry_point(), None);

        let mut data = HEADER;
        data[16] = 0x11; // ILONLY | NATIVE_ENTRYPOINT
        assert_eq!(Cor20Header::read(&data).unwrap().entry_point(), None);

        let mut data = HEADER;
        data[20..24].copy_from_slice(&[0, 0, 0, 0]);
        assert_eq!(Cor20Header::read(&data).unwrap().entry_point(), None);
    }

    #[test]
    fn invalid() {
        assert!(matches!(Cor20Header::read(&HEADER[..40]), Err(OutOfBounds)));

        let mut data = HEADER;
        data[0] = 0x40;
        assert!(Cor20Header::read(&data).is_err());

        let mut data = HEADER;
        data[28] = 0x10; // resource size without rva
        assert!(Cor20Header::read(&data).is_err());

        let mut data = HEADER;
        data[44] = 0x01; // code manager table
        assert!(Cor20Header::read(&data).is_err());
    }
}
