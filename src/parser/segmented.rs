//! Logical cursor over the concatenated fragment payloads.
//!
//! [`SegmentedReader`] presents the pixel data as one virtual byte stream:
//! reads are split at fragment boundaries by the segment resolver and served
//! from the physical stream, skipping the item headers in between.

use std::io::{self, Read, Seek, SeekFrom};

use super::ItemParser;
use crate::error::Result;
use crate::item::Item;

pub struct SegmentedReader<'a, R: Read + Seek> {
    parser: &'a mut ItemParser<R>,
    pos:    u64,
}

impl<'a, R: Read + Seek> SegmentedReader<'a, R> {
    pub(super) fn new(parser: &'a mut ItemParser<R>) -> Self {
        Self { parser, pos: 0 }
    }

    /// Current virtual position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Put both cursors at the first byte of `frame`.
    pub fn seek_frame(&mut self, frame: u32) -> Result<Item> {
        let item = self.parser.seek_frame(frame)?;
        self.pos = item.offset;
        Ok(item)
    }

    /// Compute `frame`'s length, then seek to it.  Returns the length.
    pub fn seek_frame_for_read(&mut self, frame: u32) -> Result<u64> {
        let length = self.parser.frame_byte_length(frame)?;
        self.seek_frame(frame)?;
        Ok(length)
    }

    /// Read until `buf` is full or the resolver reports end of data.
    /// Returns the number of bytes read.
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_segment(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn read_segment(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let seg = self.parser.resolve(self.pos, buf.len())?;
        if seg.is_end_of_data() {
            return Ok(0);
        }
        let n = seg.length as usize;
        self.parser.reader.seek(SeekFrom::Start(seg.start_pos))?;
        self.parser.reader.read_exact(&mut buf[..n])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Read for SegmentedReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_segment(buf).map_err(Into::into)
    }
}

impl<R: Read + Seek> Seek for SegmentedReader<'_, R> {
    /// Seeks in virtual space only; the physical stream moves on the next
    /// read.  `SeekFrom::End` is relative to the fragments discovered so far.
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let base = match target {
            SeekFrom::Start(p)   => return Ok(self.set_pos(p)),
            SeekFrom::Current(d) => (self.pos, d),
            SeekFrom::End(d)     => (self.parser.items.last().map_or(0, Item::next_offset), d),
        };
        match base.0.checked_add_signed(base.1) {
            Some(p) => Ok(self.set_pos(p)),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

impl<R: Read + Seek> SegmentedReader<'_, R> {
    fn set_pos(&mut self, pos: u64) -> u64 {
        self.pos = pos;
        pos
    }
}
