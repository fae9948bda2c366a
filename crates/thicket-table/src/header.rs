//! Table blob header (64 bytes).
//!
//! Layout:
//! - 0-19: identity and sizes (magic, version, checksum, total_size, body_size)
//! - 20-33: counts (7 × u16)
//! - 34-63: reserved
//!
//! The body that follows is the postcard encoding of [`TableData`](crate::TableData).

use super::{HEADER_SIZE, MAGIC, VERSION};

/// File header - first 64 bytes of a table blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: b"THKT"
    pub magic: [u8; 4],
    /// Format version
    pub version: u32,
    /// CRC32 checksum of the body
    pub checksum: u32,
    /// Total blob size in bytes (header + body)
    pub total_size: u32,
    /// Body size in bytes
    pub body_size: u32,

    pub symbol_count: u16,
    pub terminal_count: u16,
    pub external_count: u16,
    pub field_count: u16,
    pub production_count: u16,
    pub state_count: u16,
    pub action_list_count: u16,

    pub _reserved: [u8; 30],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            total_size: 0,
            body_size: 0,
            symbol_count: 0,
            terminal_count: 0,
            external_count: 0,
            field_count: 0,
            production_count: 0,
            state_count: 0,
            action_list_count: 0,
            _reserved: [0; 30],
        }
    }
}

impl Header {
    /// Decode header from the first 64 bytes.
    ///
    /// Callers check the length first; see [`ParseTable::from_bytes`](crate::ParseTable::from_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let u32_at = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);

        let mut reserved = [0u8; 30];
        reserved.copy_from_slice(&bytes[34..64]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32_at(4),
            checksum: u32_at(8),
            total_size: u32_at(12),
            body_size: u32_at(16),
            symbol_count: u16_at(20),
            terminal_count: u16_at(22),
            external_count: u16_at(24),
            field_count: u16_at(26),
            production_count: u16_at(28),
            state_count: u16_at(30),
            action_list_count: u16_at(32),
            _reserved: reserved,
        }
    }

    /// Encode header to 64 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.body_size.to_le_bytes());
        bytes[20..22].copy_from_slice(&self.symbol_count.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.terminal_count.to_le_bytes());
        bytes[24..26].copy_from_slice(&self.external_count.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.field_count.to_le_bytes());
        bytes[28..30].copy_from_slice(&self.production_count.to_le_bytes());
        bytes[30..32].copy_from_slice(&self.state_count.to_le_bytes());
        bytes[32..34].copy_from_slice(&self.action_list_count.to_le_bytes());
        bytes[34..64].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }
}
