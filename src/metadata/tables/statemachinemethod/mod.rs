//! `StateMachineMethod` table (0x36) of the Portable PDB format.
//!
//! Maps the `MoveNext` method of a compiler-generated async or iterator state machine back to
//! the user method that created it. Sorted by `MoveNext` method.

mod raw;

pub use raw::*;
