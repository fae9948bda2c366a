//! Table format constants.

/// Magic bytes identifying a Thicket parse table blob.
pub const MAGIC: [u8; 4] = *b"THKT";

/// Current table format version. Bump on any change to the body layout.
pub const VERSION: u32 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 64;
