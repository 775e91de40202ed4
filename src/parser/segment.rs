//! Virtual-to-physical segment resolution.
//!
//! A caller reading "byte `pos` of the pixel data" asks for a segment of up
//! to `len` bytes.  The answer is the physical start of that byte and how
//! many bytes can be read contiguously before the fragment ends, or the
//! end-of-data sentinel when `pos` is past the current frame.

use std::io::{Read, Seek};
use tracing::debug;

use super::ItemParser;
use crate::error::Result;

/// Segment length signalling end of data.
pub const END_OF_DATA: i64 = -1;

/// A contiguous physical byte range, or the end-of-data sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSegment {
    pub start_pos: u64,
    /// Granted byte count; [`END_OF_DATA`] when nothing more can be read.
    pub length:    i64,
}

impl StreamSegment {
    pub fn new(start_pos: u64, length: i64) -> Self {
        Self { start_pos, length }
    }

    pub fn end_of_data() -> Self {
        Self { start_pos: 0, length: END_OF_DATA }
    }

    #[inline]
    pub fn is_end_of_data(&self) -> bool {
        self.length == END_OF_DATA
    }
}

/// Maps a virtual position and requested length to a physical segment.
///
/// This is the seam an image decoder's segmented input stream plugs into.
pub trait SegmentMapper {
    fn stream_segment(&mut self, pos: u64, len: usize) -> Result<StreamSegment>;
}

impl<R: Read + Seek> SegmentMapper for ItemParser<R> {
    fn stream_segment(&mut self, pos: u64, len: usize) -> Result<StreamSegment> {
        self.resolve(pos, len)
    }
}

impl<R: Read + Seek> ItemParser<R> {
    /// Index of the last fragment whose `offset` is `<= offset`.
    ///
    /// Fragments are ordered by `offset`, so this is a binary search.  Among
    /// zero-length fragments sharing an offset, the last one wins.
    pub fn locate(&self, offset: u64) -> Option<usize> {
        self.items
            .partition_point(|item| item.offset <= offset)
            .checked_sub(1)
    }

    /// Resolve `len` bytes at virtual position `pos`.
    pub fn resolve(&mut self, pos: u64, len: usize) -> Result<StreamSegment> {
        debug!(pos, len, "get stream segment");
        loop {
            if self.is_end_of_frame(pos)? {
                debug!(pos, "end of frame");
                return Ok(StreamSegment::end_of_data());
            }
            let item = match self.locate(pos) {
                Some(idx) => self.items[idx],
                None      => return Ok(StreamSegment::end_of_data()),
            };
            if pos < item.next_offset() {
                let length = (item.next_offset() - pos).min(len as u64);
                let start = match item.start_pos.checked_add(pos - item.offset) {
                    Some(start) => start,
                    None        => return Ok(StreamSegment::end_of_data()),
                };
                if length > 0 {
                    let seg = StreamSegment::new(start, length as i64);
                    debug!(start = seg.start_pos, len = seg.length, "return stream segment");
                    return Ok(seg);
                }
                return Ok(StreamSegment::end_of_data());
            }
            // The single-frame scan may have pulled in only an empty
            // fragment; retry against the grown index.
            if self.last_item_seen || self.number_of_frames > 1 {
                return Ok(StreamSegment::end_of_data());
            }
        }
    }

    /// Whether `pos` lies past the end of the current frame.
    ///
    /// * If the next frame's first fragment is known, its offset is the bound.
    /// * With several frames expected and no known bound, this never fires:
    ///   walking fragment arithmetic across frames is unreliable, so
    ///   multi-frame callers must go through the per-frame API.
    /// * With a single frame, fragments are summed.  Past the known total,
    ///   one more fragment is discovered and `false` is returned so the
    ///   caller retries against the grown index; once the sequence is
    ///   complete the answer is `true`.  This last path is best effort.
    pub(super) fn is_end_of_frame(&mut self, pos: u64) -> Result<bool> {
        let next = self.frame as usize + 1;
        if next < self.frame_starts.len() {
            return Ok(self.items[self.frame_starts[next]].offset <= pos);
        }
        if self.number_of_frames > 1 {
            return Ok(false);
        }
        let known: u64 = self.items.iter().map(|i| i.length as u64).sum();
        if pos < known {
            return Ok(false);
        }
        if self.last_item_seen {
            return Ok(true);
        }
        self.discover_next()?;
        Ok(false)
    }
}
