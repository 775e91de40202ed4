//! Encapsulated pixel-data writer.
//!
//! Produces the item sequence that [`ItemParser`](crate::parser::ItemParser)
//! reads: a Basic Offset Table item, one item per fragment, and the sequence
//! delimiter.  The Pixel Data element header itself is not written.
//!
//! ```text
//! (FFFE,E000) #4n   offset table (n u32 LE, may be empty)
//! (FFFE,E000) #len  fragment payload
//! ...
//! (FFFE,E0DD) #0    sequence delimiter
//! ```

use std::io::{self, Write};

use crate::tag::{ElementHeader, Tag, ITEM_HEADER_SIZE};

pub struct EncapsulatedWriter<W: Write> {
    writer:            W,
    pub bytes_written: u64,
}

impl<W: Write> EncapsulatedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, bytes_written: 0 }
    }

    /// Write the Basic Offset Table item; an empty slice writes an empty table.
    pub fn write_offset_table(&mut self, offsets: &[u32]) -> io::Result<()> {
        let payload: Vec<u8> = offsets.iter().flat_map(|o| o.to_le_bytes()).collect();
        self.write_raw_item(&payload)
    }

    /// Write one fragment item.
    pub fn write_fragment(&mut self, payload: &[u8]) -> io::Result<()> {
        self.write_raw_item(payload)
    }

    /// Write an item with arbitrary payload, e.g. a non-conforming table.
    pub fn write_raw_item(&mut self, payload: &[u8]) -> io::Result<()> {
        let length = u32::try_from(payload.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "item payload exceeds 4 GiB")
        })?;
        ElementHeader::new(Tag::ITEM, length).write(&mut self.writer)?;
        self.writer.write_all(payload)?;
        self.bytes_written += ITEM_HEADER_SIZE + payload.len() as u64;
        Ok(())
    }

    /// Write the sequence delimiter and hand back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        ElementHeader::new(Tag::SEQUENCE_DELIMITATION, 0).write(&mut self.writer)?;
        self.bytes_written += ITEM_HEADER_SIZE;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Offset-table entries for `frames`, each a list of fragment payloads.
///
/// Entries are truncated to 32 bits the way a writer of huge objects would
/// store them.
pub fn frame_offsets(frames: &[Vec<Vec<u8>>]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(frames.len());
    let mut pos = 0u64;
    for frame in frames {
        offsets.push(pos as u32);
        pos += frame.iter().map(|f| ITEM_HEADER_SIZE + f.len() as u64).sum::<u64>();
    }
    offsets
}

/// Write `frames` as a complete fragment sequence into `writer`.
pub fn write_frames<W: Write>(
    writer:     W,
    frames:     &[Vec<Vec<u8>>],
    with_table: bool,
) -> io::Result<W> {
    let mut w = EncapsulatedWriter::new(writer);
    if with_table {
        w.write_offset_table(&frame_offsets(frames))?;
    } else {
        w.write_offset_table(&[])?;
    }
    for fragment in frames.iter().flatten() {
        w.write_fragment(fragment)?;
    }
    w.finish()
}

/// In-memory fragment sequence for `frames`.
pub fn encapsulate_frames(frames: &[Vec<Vec<u8>>], with_table: bool) -> Vec<u8> {
    let mut out = Vec::new();
    let mut push_item = |tag: Tag, payload: &[u8]| {
        out.extend_from_slice(&ElementHeader::new(tag, payload.len() as u32).to_bytes());
        out.extend_from_slice(payload);
    };
    let table: Vec<u8> = if with_table {
        frame_offsets(frames).iter().flat_map(|o| o.to_le_bytes()).collect()
    } else {
        Vec::new()
    };
    push_item(Tag::ITEM, &table);
    for fragment in frames.iter().flatten() {
        push_item(Tag::ITEM, fragment);
    }
    push_item(Tag::SEQUENCE_DELIMITATION, &[]);
    out
}
