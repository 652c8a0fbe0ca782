//! Metadata streams.
//!
//! Readers for the heaps (`#Strings`, `#Blob`, `#GUID`), the stream directory entries of the
//! metadata root and the header of the tables stream.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesheader;

pub use blob::Blob;
pub use guid::Guid;
pub use streamheader::{StreamHeader, STREAM_NAMES};
pub use strings::Strings;
pub use tablesheader::TablesHeader;
