//! Item headers of the encapsulated pixel-data region.
//!
//! Inside an encapsulated Pixel Data element every child is an 8-byte header
//! followed by its payload:
//!
//! ```text
//! group   u16 LE   (always 0xFFFE)
//! element u16 LE   (0xE000 item, 0xE0DD sequence delimiter)
//! length  u32 LE
//! ```
//!
//! The layout is fixed little endian regardless of the data set's transfer
//! syntax, so no VR or byte-order negotiation happens here.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{self, Read, Write};

/// Size of one item header on disk.
pub const ITEM_HEADER_SIZE: u64 = 8;

/// Length value meaning "undefined length" in a data element header.
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

/// A data element tag as (group, element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    /// `(FFFE,E000)`: one fragment.
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    /// `(FFFE,E00D)`: item delimiter; never valid between fragments.
    pub const ITEM_DELIMITATION: Tag = Tag(0xFFFE, 0xE00D);
    /// `(FFFE,E0DD)`: end of the fragment sequence.
    pub const SEQUENCE_DELIMITATION: Tag = Tag(0xFFFE, 0xE0DD);
    /// `(7FE0,0010)`: Pixel Data.
    pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

    #[inline]
    pub fn group(self) -> u16 { self.0 }

    #[inline]
    pub fn element(self) -> u16 { self.1 }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// One decoded item header: tag plus declared payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    pub tag:    Tag,
    pub length: u32,
}

impl ElementHeader {
    pub fn new(tag: Tag, length: u32) -> Self {
        Self { tag, length }
    }

    pub fn is_item(&self) -> bool {
        self.tag == Tag::ITEM
    }

    /// True only for a well-formed terminator: `(FFFE,E0DD)` with length 0.
    pub fn is_sequence_delimiter(&self) -> bool {
        self.tag == Tag::SEQUENCE_DELIMITATION && self.length == 0
    }

    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let group   = reader.read_u16::<LittleEndian>()?;
        let element = reader.read_u16::<LittleEndian>()?;
        let length  = reader.read_u32::<LittleEndian>()?;
        Ok(Self { tag: Tag(group, element), length })
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0..2].copy_from_slice(&self.tag.0.to_le_bytes());
        out[2..4].copy_from_slice(&self.tag.1.to_le_bytes());
        out[4..8].copy_from_slice(&self.length.to_le_bytes());
        out
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.tag.0)?;
        writer.write_u16::<LittleEndian>(self.tag.1)?;
        writer.write_u32::<LittleEndian>(self.length)?;
        Ok(())
    }
}

impl fmt::Display for ElementHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.tag, self.length)
    }
}
