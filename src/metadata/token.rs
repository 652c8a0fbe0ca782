//! Metadata tokens.
//!
//! A token packs a table number into its high byte and a 1-based row number into the low
//! 24 bits. The converter addresses methods of the external binary (`MethodDef`, table
//! `0x06`) and local signatures (`StandAloneSig`, table `0x11`) this way.

use std::fmt;

use crate::metadata::tables::TableId;

/// A metadata token: table number in bits 24..32, row number in bits 0..24.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Build the token of `row` in `table`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pdbport::{metadata::tables::TableId, Token};
    ///
    /// let token = Token::from_parts(TableId::MethodDef, 3);
    /// assert_eq!(token.value(), 0x0600_0003);
    /// ```
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token((u32::from(table as u8) << 24) | (row & 0x00FF_FFFF))
    }

    /// The raw token value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table number of this token.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table of this token, if it names a known table.
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_index(self.table())
    }

    /// The 1-based row number of this token.
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// `true` for the nil token.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
