//! `LocalConstant` table (0x34) of the Portable PDB format.
//!
//! The signature blob holds the constant's type and value, see
//! [`crate::symbols::ConstantValue::signature`].

mod raw;

pub use raw::*;
