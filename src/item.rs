use serde::{Deserialize, Serialize};
use std::fmt;

/// One fragment of encapsulated pixel data.
///
/// `offset` is virtual: the position of the payload in the concatenation of
/// every fragment discovered so far.  `start_pos` is physical: the position
/// of the first payload byte in the underlying stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub offset:    u64,
    pub start_pos: u64,
    pub length:    u32,
}

impl Item {
    pub fn new(offset: u64, start_pos: u64, length: u32) -> Self {
        Self { offset, start_pos, length }
    }

    /// Virtual offset of the fragment that follows this one.
    #[inline]
    pub fn next_offset(&self) -> u64 {
        self.offset + self.length as u64
    }

    /// Physical position just past this fragment's payload, i.e. the next
    /// item header.
    #[inline]
    pub fn next_item_pos(&self) -> u64 {
        self.start_pos + self.length as u64
    }

    #[inline]
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.next_offset()
    }

    pub fn extent(&self) -> FragmentExtent {
        FragmentExtent { start_pos: self.start_pos, length: self.length }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item[off={}, pos={}, len={}]", self.offset, self.start_pos, self.length)
    }
}

/// Physical byte range of one fragment payload, for external indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentExtent {
    pub start_pos: u64,
    pub length:    u32,
}
