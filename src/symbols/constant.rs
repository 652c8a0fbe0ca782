//! Values of local constants and their `LocalConstantSig` encoding.
//!
//! A primitive constant is stored as its element type code followed by the value:
//!
//! ```text
//! BOOLEAN 0x02  u8        CHAR 0x03  u16        STRING 0x0E  UTF-16LE code units
//! I1 0x04 / U1 0x05       I2 0x06 / U2 0x07     I4 0x08 / U4 0x09     I8 0x0A / U8 0x0B
//! R4 0x0C  f32            R8 0x0D  f64          null string  STRING 0xFF
//! ```
//!
//! Enum, decimal, `DateTime` and other non-primitive constants need a type reference into the
//! binary's metadata and are reported as [`ConstantValue::NotSupported`].
//!
//! # Reference
//! - [Portable PDB: LocalConstantSig](https://github.com/dotnet/runtime/blob/main/docs/design/specs/PortablePdb-Metadata.md#localconstantsig-blob)

use widestring::U16String;

use crate::file::io::push_le;

const ELEMENT_TYPE_BOOLEAN: u8 = 0x02;
const ELEMENT_TYPE_CHAR: u8 = 0x03;
const ELEMENT_TYPE_I1: u8 = 0x04;
const ELEMENT_TYPE_U1: u8 = 0x05;
const ELEMENT_TYPE_I2: u8 = 0x06;
const ELEMENT_TYPE_U2: u8 = 0x07;
const ELEMENT_TYPE_I4: u8 = 0x08;
const ELEMENT_TYPE_U4: u8 = 0x09;
const ELEMENT_TYPE_I8: u8 = 0x0A;
const ELEMENT_TYPE_U8: u8 = 0x0B;
const ELEMENT_TYPE_R4: u8 = 0x0C;
const ELEMENT_TYPE_R8: u8 = 0x0D;
const ELEMENT_TYPE_STRING: u8 = 0x0E;

/// Marker following `ELEMENT_TYPE_STRING` for a null string.
const NULL_STRING: u8 = 0xFF;

/// The value of a local constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// `bool`
    Boolean(bool),
    /// `char`, as a UTF-16 code unit
    Char(u16),
    /// `sbyte`
    I1(i8),
    /// `byte`
    U1(u8),
    /// `short`
    I2(i16),
    /// `ushort`
    U2(u16),
    /// `int`
    I4(i32),
    /// `uint`
    U4(u32),
    /// `long`
    I8(i64),
    /// `ulong`
    U8(u64),
    /// `float`
    R4(f32),
    /// `double`
    R8(f64),
    /// `string`, `None` for a null reference
    String(Option<String>),
    /// A constant whose type lives in the binary's metadata
    NotSupported,
}

impl ConstantValue {
    /// Encode the value as a `LocalConstantSig` blob, `None` for [`ConstantValue::NotSupported`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pdbport::symbols::ConstantValue;
    ///
    /// assert_eq!(ConstantValue::I4(-2).signature(), Some(vec![0x08, 0xFE, 0xFF, 0xFF, 0xFF]));
    /// assert_eq!(ConstantValue::String(None).signature(), Some(vec![0x0E, 0xFF]));
    /// assert_eq!(ConstantValue::NotSupported.signature(), None);
    /// ```
    #[must_use]
    pub fn signature(&self) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(9);

        match self {
            ConstantValue::Boolean(value) => {
                out.push(ELEMENT_TYPE_BOOLEAN);
                out.push(u8::from(*value));
            }
            ConstantValue::Char(value) => {
                out.push(ELEMENT_TYPE_CHAR);
                push_le(&mut out, *value);
            }
            ConstantValue::I1(value) => {
                out.push(ELEMENT_TYPE_I1);
                push_le(&mut out, *value);
            }
            ConstantValue::U1(value) => {
                out.push(ELEMENT_TYPE_U1);
                push_le(&mut out, *value);
            }
            ConstantValue::I2(value) => {
                out.push(ELEMENT_TYPE_I2);
                push_le(&mut out, *value);
            }
            ConstantValue::U2(value) => {
                out.push(ELEMENT_TYPE_U2);
                push_le(&mut out, *value);
            }
            ConstantValue::I4(value) => {
                out.push(ELEMENT_TYPE_I4);
                push_le(&mut out, *value);
            }
            ConstantValue::U4(value) => {
                out.push(ELEMENT_TYPE_U4);
                push_le(&mut out, *value);
            }
            ConstantValue::I8(value) => {
                out.push(ELEMENT_TYPE_I8);
                push_le(&mut out, *value);
            }
            ConstantValue::U8(value) => {
                out.push(ELEMENT_TYPE_U8);
                push_le(&mut out, *value);
            }
            ConstantValue::R4(value) => {
                out.push(ELEMENT_TYPE_R4);
                push_le(&mut out, *value);
            }
            ConstantValue::R8(value) => {
                out.push(ELEMENT_TYPE_R8);
                push_le(&mut out, *value);
            }
            ConstantValue::String(None) => {
                out.push(ELEMENT_TYPE_STRING);
                out.push(NULL_STRING);
            }
            ConstantValue::String(Some(value)) => {
                out.push(ELEMENT_TYPE_STRING);
                for unit in U16String::from_str(value).as_slice() {
                    push_le(&mut out, *unit);
                }
            }
            ConstantValue::NotSupported => return None,
        }

        Some(out)
    }
}
