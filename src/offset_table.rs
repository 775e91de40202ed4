//! Basic Offset Table loader.
//!
//! The first item of an encapsulated Pixel Data element is the Basic Offset
//! Table: either empty, or one u32 LE per frame giving the distance from the
//! first byte of the first fragment *header* to the first byte of that
//! frame's first fragment header.
//!
//! # Wraparound
//! Multi-gigabyte multi-frame objects overflow the 32-bit entries.  Offsets are
//! required to increase, so an entry smaller than its corrected predecessor is
//! taken as a wrap and every following entry is shifted by a further 2^32.
//!
//! # Quirk: image in the table slot
//! Some writers store a single-frame JPEG directly in the table item.  When
//! the table length is inconsistent with the frame count and its bytes carry
//! a JPEG / JPEG 2000 signature, the slot is reported as an embedded image
//! rather than skipped.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

use crate::sniff::sniff_image_signature;

const WRAP: u64 = 1 << 32;

/// Corrected 64-bit frame offsets, one per expected frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasicOffsetTable {
    offsets: Vec<u64>,
}

impl BasicOffsetTable {
    /// Build from raw on-disk values, applying wraparound correction.
    pub fn from_raw(raw: &[u32]) -> Self {
        let mut offsets = Vec::with_capacity(raw.len());
        let mut high = 0u64;
        for &value in raw {
            let mut corrected = high | value as u64;
            if let Some(&prev) = offsets.last() {
                if corrected < prev {
                    high += WRAP;
                    corrected += WRAP;
                }
            }
            offsets.push(corrected);
        }
        Self { offsets }
    }

    /// Read `entries` little-endian u32 values from `reader`.
    pub fn read<R: Read>(mut reader: R, entries: usize) -> io::Result<Self> {
        let mut raw = Vec::with_capacity(entries);
        for _ in 0..entries {
            raw.push(reader.read_u32::<LittleEndian>()?);
        }
        Ok(Self::from_raw(&raw))
    }

    pub fn len(&self) -> usize { self.offsets.len() }

    pub fn is_empty(&self) -> bool { self.offsets.is_empty() }

    pub fn get(&self, frame: usize) -> Option<u64> {
        self.offsets.get(frame).copied()
    }

    pub fn as_slice(&self) -> &[u64] { &self.offsets }
}

/// What the Basic Offset Table item turned out to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSlot {
    /// Zero-length table.
    Absent,
    /// Well-formed table, one entry per frame.
    Table(BasicOffsetTable),
    /// The slot holds image data; the reader is left at `start_pos`.
    EmbeddedImage { start_pos: u64, length: u32 },
    /// Length inconsistent with the frame count; the bytes were skipped.
    Skipped { declared: u32, expected: u64 },
}

/// Interpret the table item whose header has just been read.
///
/// `reader` must be positioned at the first payload byte of the table item.
/// On return it is positioned after the payload, except for
/// [`TableSlot::EmbeddedImage`] where it is left at the payload start.
pub fn load_offset_table<R: Read + Seek>(
    reader:  &mut R,
    length:  u32,
    frames:  u32,
) -> io::Result<TableSlot> {
    if length == 0 {
        return Ok(TableSlot::Absent);
    }
    let expected = frames as u64 * 4;
    if length as u64 == expected {
        return Ok(TableSlot::Table(BasicOffsetTable::read(reader, frames as usize)?));
    }
    if sniff_image_signature(reader)? {
        let start_pos = reader.stream_position()?;
        return Ok(TableSlot::EmbeddedImage { start_pos, length });
    }
    reader.seek(SeekFrom::Current(length as i64))?;
    Ok(TableSlot::Skipped { declared: length, expected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn overflow_correction() {
        let t = BasicOffsetTable::from_raw(&[10, 20, 5, 15]);
        assert_eq!(t.as_slice(), &[10, 20, 5 + WRAP, 15 + WRAP]);
        assert!(t.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn repeated_wraps_accumulate() {
        let t = BasicOffsetTable::from_raw(&[0, 0xFFFF_FF00, 0x100, 0xFFFF_FFF0, 0x10]);
        assert_eq!(
            t.as_slice(),
            &[0, 0xFFFF_FF00, WRAP + 0x100, WRAP + 0xFFFF_FFF0, 2 * WRAP + 0x10]
        );
    }

    #[test]
    fn equal_entries_do_not_wrap() {
        let t = BasicOffsetTable::from_raw(&[0, 8, 8]);
        assert_eq!(t.as_slice(), &[0, 8, 8]);
    }

    #[test]
    fn read_le_entries() {
        let bytes = [0u8, 0, 0, 0, 0x10, 0, 0, 0];
        let t = BasicOffsetTable::read(Cursor::new(&bytes), 2).unwrap();
        assert_eq!(t.as_slice(), &[0, 16]);
    }

    #[test]
    fn absent_table() {
        let mut cur = Cursor::new(Vec::<u8>::new());
        assert_eq!(load_offset_table(&mut cur, 0, 3).unwrap(), TableSlot::Absent);
    }

    #[test]
    fn well_formed_table() {
        let mut cur = Cursor::new(vec![0u8, 0, 0, 0, 0x20, 0, 0, 0, 0xAA]);
        let slot = load_offset_table(&mut cur, 8, 2).unwrap();
        assert_eq!(slot, TableSlot::Table(BasicOffsetTable::from_raw(&[0, 32])));
        assert_eq!(cur.position(), 8);
    }

    #[test]
    fn jpeg_in_table_slot() {
        let mut cur = Cursor::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xD9]);
        let slot = load_offset_table(&mut cur, 7, 2).unwrap();
        assert_eq!(slot, TableSlot::EmbeddedImage { start_pos: 0, length: 7 });
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn malformed_table_is_skipped() {
        let mut cur = Cursor::new(vec![1u8, 2, 3, 4, 5, 6, 7, 0xEE]);
        let slot = load_offset_table(&mut cur, 7, 2).unwrap();
        assert_eq!(slot, TableSlot::Skipped { declared: 7, expected: 8 });
        assert_eq!(cur.position(), 7);
    }
}
