//! Lazy fragment index over encapsulated pixel data.
//!
//! # Discovery
//! [`ItemParser`] never reads the whole Pixel Data element up front.  Each
//! call to [`ItemParser::discover_next`] seeks past the payload of the last
//! known fragment, reads one item header and appends one [`Item`].  Callers
//! that need frame *f* drive discovery forward until frame *f*'s first
//! fragment is known; already-indexed fragments are never re-read.
//!
//! # Frame boundaries
//! A fragment starts a new frame when:
//!
//! 1. it is the first fragment, or the codec is RLE (one fragment per frame);
//! 2. its position matches the next Basic Offset Table entry;
//! 3. with no table and a JPEG-family codec, its payload begins with SOI/SOC.
//!
//! Anything else is a continuation of the current frame.
//!
//! # Offset-table synthesis
//! When a table is present, frames not yet reached by sequential discovery
//! are synthesised from it at construction, one fragment per frame.  The
//! last frame is still found by discovery so that its length comes from the
//! stream.
//!
//! # Errors
//! Structural anomalies (bad table length, bad terminator) are logged and
//! recorded in [`ItemParser::anomalies`].  I/O failures stop discovery for
//! good and are returned once; later discovery calls return `None`.

mod segment;
mod segmented;

pub use segment::{SegmentMapper, StreamSegment, END_OF_DATA};
pub use segmented::SegmentedReader;

use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;
use tracing::{debug, warn};

use crate::error::{Anomaly, FragmentError, Result};
use crate::item::{FragmentExtent, Item};
use crate::offset_table::{load_offset_table, BasicOffsetTable, TableSlot};
use crate::options::ParseOptions;
use crate::sniff::{is_frame_start, peek};
use crate::tag::{ElementHeader, ITEM_HEADER_SIZE};
use crate::transfer_syntax::FragmentCodec;

/// Contiguous physical range of a single-fragment frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameExtent {
    pub start_pos: u64,
    pub length:    u64,
}

pub struct ItemParser<R: Read + Seek> {
    reader:           R,
    items:            Vec<Item>,
    /// Index into `items` of each frame's first fragment.
    frame_starts:     Vec<usize>,
    number_of_frames: u32,
    codec:            FragmentCodec,
    offset_table:     Option<BasicOffsetTable>,
    /// Physical position of the first fragment header (after the table item).
    first_item_pos:   u64,
    last_item_seen:   bool,
    /// Frame of the last `seek_frame`; bounds end-of-frame checks.
    frame:            u32,
    anomalies:        Vec<Anomaly>,
}

impl<R: Read + Seek> ItemParser<R> {
    /// Open the fragment sequence.
    ///
    /// `reader` must be positioned at the header of the first item (the Basic
    /// Offset Table), i.e. just after the Pixel Data element header.
    pub fn new(mut reader: R, options: &ParseOptions) -> Result<Self> {
        let codec = options.codec();
        let number_of_frames = codec.effective_frames(options.number_of_frames);
        if number_of_frames != options.number_of_frames {
            debug!(
                declared = options.number_of_frames,
                codec = codec.name(),
                "indexing video payload as a single frame"
            );
        }

        let header = ElementHeader::read(&mut reader)?;
        debug!(%header, "read offset table header");

        let mut parser = Self {
            reader,
            items:            Vec::new(),
            frame_starts:     Vec::new(),
            number_of_frames,
            codec,
            offset_table:     None,
            first_item_pos:   0,
            last_item_seen:   false,
            frame:            0,
            anomalies:        Vec::new(),
        };

        if !header.is_item() {
            // No table item at all: empty or broken pixel data.
            parser.end_of_sequence(header);
            parser.first_item_pos = parser.reader.stream_position()?;
            return Ok(parser);
        }

        match load_offset_table(&mut parser.reader, header.length, number_of_frames)? {
            TableSlot::Absent => {}
            TableSlot::Table(table) => {
                debug!(entries = table.len(), "loaded Basic Offset Table");
                parser.offset_table = Some(table);
            }
            TableSlot::EmbeddedImage { start_pos, length } => {
                debug!("JPEG image is in the offset table sequence slot");
                let item = Item::new(0, start_pos, length);
                parser.add_first_item_of_frame(&item);
                parser.items.push(item);
                parser.last_item_seen = true;
            }
            TableSlot::Skipped { declared, expected } => {
                warn!(
                    declared,
                    frames = number_of_frames,
                    "skip Basic Offset Table with illegal length"
                );
                parser.anomalies.push(Anomaly::MalformedOffsetTable { declared, expected });
            }
        }
        parser.first_item_pos = parser.reader.stream_position()?;

        parser.discover_next()?;
        parser.synthesize_from_table();
        Ok(parser)
    }

    // ── Discovery ───────────────────────────────────────────────────────────

    /// Read at most one more fragment from the stream.
    ///
    /// Returns `Ok(None)` once the sequence delimiter (or anything else that
    /// is not an item) has been read.  An I/O failure is returned once and
    /// ends discovery.
    pub fn discover_next(&mut self) -> Result<Option<Item>> {
        if self.last_item_seen {
            return Ok(None);
        }
        match self.read_next_item() {
            Ok(item) => Ok(item),
            Err(e) => {
                warn!(error = %e, "i/o error reading next item");
                self.anomalies.push(Anomaly::Io { message: e.to_string() });
                self.last_item_seen = true;
                Err(FragmentError::Io(e))
            }
        }
    }

    fn read_next_item(&mut self) -> io::Result<Option<Item>> {
        if let Some(last) = self.items.last() {
            self.reader.seek(SeekFrom::Start(last.next_item_pos()))?;
        }
        let header = ElementHeader::read(&mut self.reader)?;
        debug!(%header, "read");

        if !header.is_item() {
            self.end_of_sequence(header);
            return Ok(None);
        }

        let item = Item::new(
            self.items.last().map_or(0, Item::next_offset),
            self.reader.stream_position()?,
            header.length,
        );

        if self.items.is_empty() || self.codec.one_fragment_per_frame() {
            self.add_first_item_of_frame(&item);
        } else if self.frame_starts.len() < self.number_of_frames as usize {
            let frame = self.frame_starts.len();
            let table_hit = self.offset_table.as_ref().map(|table| {
                let first = self.items[self.frame_starts[0]];
                table.get(frame).map(|off| first.start_pos + off) == Some(item.start_pos)
            });
            match table_hit {
                Some(true) => {
                    debug!(
                        item = self.items.len() + 1,
                        entry = frame + 1,
                        "start position matches Basic Offset Table entry"
                    );
                    self.add_first_item_of_frame(&item);
                }
                Some(false) => {}
                None if self.codec.sniffs_markers() => {
                    if is_frame_start(&peek(&mut self.reader, 2)?) {
                        debug!(item = self.items.len() + 1, "detected JPEG SOI/SOC");
                        self.add_first_item_of_frame(&item);
                    }
                }
                None => {}
            }
        }

        self.items.push(item);
        Ok(Some(item))
    }

    fn end_of_sequence(&mut self, header: ElementHeader) {
        if !header.is_sequence_delimiter() {
            warn!(%header, "expected (FFFE,E0DD) #0");
            self.anomalies.push(Anomaly::UnexpectedTerminator {
                tag:    header.tag,
                length: header.length,
            });
        }
        self.last_item_seen = true;
    }

    /// Register `item` (about to be pushed) as the next frame's first fragment.
    fn add_first_item_of_frame(&mut self, item: &Item) {
        debug!(
            item = self.items.len() + 1,
            frame = self.frame_starts.len() + 1,
            %item,
            "detected first item of frame"
        );
        self.frame_starts.push(self.items.len());
    }

    /// Fill frame starts that sequential discovery has not reached yet
    /// straight from the offset table, one fragment per frame.
    fn synthesize_from_table(&mut self) {
        let offsets = match &self.offset_table {
            Some(table) => table.as_slice().to_vec(),
            None        => return,
        };
        let (first, mut prev) = match (self.frame_starts.first(), self.items.last()) {
            (Some(&idx), Some(&last)) => (self.items[idx], last),
            _ => return,
        };
        let next_frame = self.frame_starts.len();
        if next_frame + 1 >= offsets.len() {
            return;
        }
        // A gap before the next frame's payload means the current frame has
        // continuation fragments; leave those to sequential table matching.
        if prev.next_item_pos() + ITEM_HEADER_SIZE != first.start_pos + offsets[next_frame] {
            debug!(
                frame = next_frame + 1,
                "frame does not follow the first fragment; not synthesising from table"
            );
            return;
        }
        warn!(
            frames = offsets.len() - 1 - next_frame,
            "synthesising frames from Basic Offset Table assuming one fragment per frame"
        );

        for i in self.frame_starts.len()..offsets.len().saturating_sub(1) {
            let length = offsets[i + 1]
                .checked_sub(offsets[i])
                .and_then(|d| d.checked_sub(ITEM_HEADER_SIZE))
                .and_then(|d| u32::try_from(d).ok());
            let length = match length {
                Some(l) => l,
                None => {
                    warn!(entry = i + 1, "offset table entries too close to synthesise frame");
                    break;
                }
            };
            let item = Item::new(prev.next_offset(), first.start_pos + offsets[i], length);
            self.add_first_item_of_frame(&item);
            self.items.push(item);
            prev = item;
        }
    }

    /// Discover until frame `frame`'s first fragment is known; returns its
    /// index in the fragment list.
    pub fn discover_until_frame(&mut self, frame: u32) -> Result<usize> {
        while self.frame_starts.len() <= frame as usize {
            if self.discover_next()?.is_none() {
                return Err(FragmentError::FrameNotFound {
                    frame,
                    found: self.frame_starts.len(),
                });
            }
        }
        Ok(self.frame_starts[frame as usize])
    }

    /// Discover every remaining fragment.
    pub fn discover_all(&mut self) -> Result<()> {
        while self.discover_next()?.is_some() {}
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Total number of fragments (reads to the end of the sequence).
    pub fn number_of_fragments(&mut self) -> Result<usize> {
        self.discover_all()?;
        Ok(self.items.len())
    }

    /// `(start_pos, length)` of every fragment, for external indexing.
    pub fn fragment_extents(&mut self) -> Result<Vec<FragmentExtent>> {
        self.discover_all()?;
        Ok(self.items.iter().map(Item::extent).collect())
    }

    /// Snapshot of the fragments discovered so far.
    pub fn fragments(&self) -> Vec<Item> {
        self.items.clone()
    }

    pub fn fragment(&self, index: usize) -> Option<Item> {
        self.items.get(index).copied()
    }

    pub fn discovered_fragments(&self) -> usize { self.items.len() }

    pub fn frames_found(&self) -> usize { self.frame_starts.len() }

    /// Frame count in effect (after the video override).
    pub fn number_of_frames(&self) -> u32 { self.number_of_frames }

    pub fn codec(&self) -> FragmentCodec { self.codec }

    pub fn offset_table(&self) -> Option<&BasicOffsetTable> { self.offset_table.as_ref() }

    /// True once the end of the fragment sequence has been reached.
    pub fn is_complete(&self) -> bool { self.last_item_seen }

    pub fn anomalies(&self) -> &[Anomaly] { &self.anomalies }

    /// Frame of the last [`seek_frame`](Self::seek_frame).
    pub fn current_frame(&self) -> u32 { self.frame }

    pub fn into_inner(self) -> R { self.reader }

    // ── Frame navigation ─────────────────────────────────────────────────────

    pub fn first_fragment_of(&mut self, frame: u32) -> Result<Item> {
        let idx = self.discover_until_frame(frame)?;
        Ok(self.items[idx])
    }

    /// Indices into the fragment list making up `frame`.
    fn frame_fragment_range(&mut self, frame: u32) -> Result<Range<usize>> {
        let start = self.discover_until_frame(frame)?;
        let end = if u64::from(frame) + 1 < u64::from(self.number_of_frames) {
            // A declared frame that never shows up leaves this one running to
            // the end of the sequence.
            match self.discover_until_frame(frame + 1) {
                Ok(next) => next,
                Err(FragmentError::FrameNotFound { .. }) => self.items.len(),
                Err(e) => return Err(e),
            }
        } else {
            self.discover_all()?;
            self.items.len()
        };
        Ok(start..end)
    }

    /// Total payload bytes of `frame` across all of its fragments.
    pub fn frame_byte_length(&mut self, frame: u32) -> Result<u64> {
        let range = self.frame_fragment_range(frame)?;
        Ok(self.items[range].iter().map(|i| i.length as u64).sum())
    }

    /// Physical ranges of every fragment of `frame`, in stream order.
    pub fn frame_segments(&mut self, frame: u32) -> Result<Vec<FragmentExtent>> {
        let range = self.frame_fragment_range(frame)?;
        Ok(self.items[range].iter().map(Item::extent).collect())
    }

    /// `(start_pos, length)` of a frame stored in exactly one fragment.
    ///
    /// A frame split over several fragments has item headers between its
    /// payload bytes and is rejected with [`FragmentError::FragmentedFrame`];
    /// use [`frame_segments`](Self::frame_segments) for those.
    pub fn frame_extent_in_stream(&mut self, frame: u32) -> Result<FrameExtent> {
        let range = self.frame_fragment_range(frame)?;
        if range.len() != 1 {
            return Err(FragmentError::FragmentedFrame { frame, fragments: range.len() });
        }
        let item = self.items[range.start];
        Ok(FrameExtent { start_pos: item.start_pos, length: item.length as u64 })
    }

    /// Move the physical stream to `frame`'s first payload byte and make it
    /// the current frame.  Returns the fragment; its `offset` is where a
    /// logical cursor has to be placed.
    pub fn seek_frame(&mut self, frame: u32) -> Result<Item> {
        debug!(frame = u64::from(frame) + 1, "seek frame");
        let item = self.first_fragment_of(frame)?;
        self.reader.seek(SeekFrom::Start(item.start_pos))?;
        self.frame = frame;
        debug!(%item, "seek");
        Ok(item)
    }

    /// Read the whole of `frame` through the segment resolver.
    pub fn read_frame(&mut self, frame: u32) -> Result<Vec<u8>> {
        let expected = self.frame_byte_length(frame)?;
        let mut data = vec![0u8; expected as usize];
        let mut cursor = self.segmented();
        cursor.seek_frame(frame)?;
        let read = cursor.read_fully(&mut data)?;
        if (read as u64) < expected {
            return Err(FragmentError::ShortRead { frame, expected, read: read as u64 });
        }
        Ok(data)
    }

    /// Logical cursor over the virtual address space, positioned at 0.
    pub fn segmented(&mut self) -> SegmentedReader<'_, R> {
        SegmentedReader::new(self)
    }

    /// Position the stream after the last fragment and read the header that
    /// follows it (normally the sequence delimiter).
    pub fn seek_footer(&mut self) -> Result<ElementHeader> {
        self.discover_all()?;
        let pos = self.items.last().map_or(self.first_item_pos, Item::next_item_pos);
        self.reader.seek(SeekFrom::Start(pos))?;
        Ok(ElementHeader::read(&mut self.reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use crate::transfer_syntax::{JPEG_2000, JPEG_BASELINE_1, MPEG2_MAIN_PROFILE, RLE_LOSSLESS};
    use crate::writer::{encapsulate_frames, EncapsulatedWriter};
    use std::io::Cursor;

    fn jpeg(len: usize, fill: u8) -> Vec<u8> {
        let mut v = vec![0xFF, 0xD8];
        v.resize(len, fill);
        v
    }

    fn open(bytes: Vec<u8>, frames: u32, ts: &str) -> ItemParser<Cursor<Vec<u8>>> {
        ItemParser::new(Cursor::new(bytes), &ParseOptions::new(frames, ts)).unwrap()
    }

    #[test]
    fn construction_discovers_first_fragment_only() {
        let frames = vec![vec![jpeg(10, 1)], vec![jpeg(12, 2)], vec![jpeg(14, 3)]];
        let mut p = open(encapsulate_frames(&frames, false), 3, JPEG_BASELINE_1);
        assert_eq!(p.discovered_fragments(), 1);
        assert_eq!(p.frames_found(), 1);
        assert!(!p.is_complete());
        assert_eq!(p.number_of_fragments().unwrap(), 3);
        assert!(p.is_complete());
    }

    #[test]
    fn jpeg_markers_split_frames() {
        let frames = vec![
            vec![jpeg(100, 1), vec![7u8; 50], vec![8u8; 75]],
            vec![jpeg(40, 2)],
        ];
        let mut p = open(encapsulate_frames(&frames, false), 2, JPEG_BASELINE_1);
        assert_eq!(p.frame_byte_length(0).unwrap(), 225);
        assert_eq!(p.frame_byte_length(1).unwrap(), 40);
        assert_eq!(p.first_fragment_of(1).unwrap().offset, 225);
    }

    #[test]
    fn sniffing_does_not_move_discovery() {
        let frames = vec![vec![jpeg(6, 1)], vec![jpeg(6, 2)]];
        let mut p = open(encapsulate_frames(&frames, false), 2, JPEG_BASELINE_1);
        p.discover_all().unwrap();
        let items = p.fragments();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].start_pos, items[0].next_item_pos() + ITEM_HEADER_SIZE);
    }

    #[test]
    fn rle_every_fragment_is_a_frame() {
        let frames = vec![vec![vec![1u8; 64]], vec![vec![2u8; 64]], vec![vec![3u8; 64]]];
        let mut p = open(encapsulate_frames(&frames, false), 3, RLE_LOSSLESS);
        assert_eq!(p.first_fragment_of(2).unwrap().offset, 128);
        assert_eq!(p.frames_found(), 3);
    }

    #[test]
    fn other_codec_without_table_only_knows_frame_zero() {
        let frames = vec![vec![vec![1u8; 8]], vec![vec![2u8; 8]]];
        let mut p = open(encapsulate_frames(&frames, false), 2, "1.2.840.10008.1.2.1.99");
        assert!(matches!(
            p.first_fragment_of(1),
            Err(FragmentError::FrameNotFound { frame: 1, found: 1 })
        ));
    }

    #[test]
    fn table_matches_multi_fragment_frames() {
        let frames = vec![
            vec![jpeg(20, 1), vec![9u8; 10]],
            vec![vec![0u8; 16], vec![5u8; 4]],
        ];
        // Frame 1 has no SOI, so only the table can find it.
        let mut p = open(encapsulate_frames(&frames, true), 2, JPEG_BASELINE_1);
        assert!(p.offset_table().is_some());
        assert_eq!(p.frame_byte_length(0).unwrap(), 30);
        assert_eq!(p.frame_byte_length(1).unwrap(), 20);
    }

    #[test]
    fn table_synthesises_middle_frames() {
        let frames: Vec<Vec<Vec<u8>>> = (0..4u8).map(|f| vec![vec![f; 10 + f as usize]]).collect();
        let p = open(encapsulate_frames(&frames, true), 4, "");
        // First fragment from discovery, frames 1 and 2 from the table.
        assert_eq!(p.frames_found(), 3);
        assert_eq!(p.discovered_fragments(), 3);
        let items = p.fragments();
        assert_eq!(items[1].length, 11);
        assert_eq!(items[2].length, 12);
        assert_eq!(items[2].offset, items[1].next_offset());
    }

    #[test]
    fn table_with_multi_fragment_first_frame_skips_synthesis() {
        let frames = vec![
            vec![jpeg(100, 1), vec![7u8; 50], vec![8u8; 75]],
            vec![jpeg(10, 2)],
            vec![jpeg(10, 3)],
        ];
        let mut p = open(encapsulate_frames(&frames, true), 3, JPEG_BASELINE_1);
        assert_eq!(p.frames_found(), 1);
        assert_eq!(p.frame_byte_length(0).unwrap(), 225);
        assert_eq!(p.read_frame(0).unwrap(), frames[0].concat());
        assert_eq!(p.read_frame(2).unwrap(), frames[2].concat());
        assert_eq!(p.number_of_fragments().unwrap(), 5);
    }

    #[test]
    fn jpeg2000_soc_splits_frames() {
        let j2k = |len: usize, fill: u8| {
            let mut v = vec![0xFF, 0x4F, 0xFF, 0x51];
            v.resize(len, fill);
            v
        };
        let frames = vec![
            vec![j2k(30, 1), vec![5u8; 12]],
            vec![j2k(20, 2), vec![6u8; 8], vec![7u8; 4]],
            vec![j2k(16, 3)],
        ];
        let mut p = open(encapsulate_frames(&frames, false), 3, JPEG_2000);
        assert_eq!(p.first_fragment_of(1).unwrap().offset, 42);
        assert_eq!(p.first_fragment_of(2).unwrap().offset, 74);
        assert_eq!(p.frame_byte_length(1).unwrap(), 32);
        assert_eq!(p.read_frame(2).unwrap(), frames[2].concat());
    }

    #[test]
    fn synthesised_frames_chain_into_discovery() {
        let frames: Vec<Vec<Vec<u8>>> = (0..4u8).map(|f| vec![vec![f; 10 + f as usize]]).collect();
        let mut p = open(encapsulate_frames(&frames, true), 4, "");
        assert_eq!(p.first_fragment_of(3).unwrap().length, 13);
        assert_eq!(p.read_frame(3).unwrap(), vec![3u8; 13]);
        assert_eq!(p.number_of_fragments().unwrap(), 4);
    }

    #[test]
    fn video_is_one_frame() {
        let frames = vec![vec![vec![1u8; 8], vec![2u8; 8], vec![3u8; 8]]];
        let mut p = open(encapsulate_frames(&frames, false), 30, MPEG2_MAIN_PROFILE);
        assert_eq!(p.number_of_frames(), 1);
        assert_eq!(p.frame_byte_length(0).unwrap(), 24);
        assert!(matches!(p.first_fragment_of(1), Err(FragmentError::FrameNotFound { .. })));
    }

    #[test]
    fn embedded_jpeg_in_table_slot() {
        let mut buf = Vec::new();
        {
            let mut w = EncapsulatedWriter::new(&mut buf);
            w.write_raw_item(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xD9]).unwrap();
            w.finish().unwrap();
        }
        let mut p = open(buf, 2, JPEG_BASELINE_1);
        assert!(p.is_complete());
        assert_eq!(p.number_of_fragments().unwrap(), 1);
        assert_eq!(p.fragment(0), Some(Item::new(0, 8, 7)));
        assert!(p.anomalies().is_empty());
    }

    #[test]
    fn malformed_table_is_skipped_with_anomaly() {
        let mut buf = Vec::new();
        {
            let mut w = EncapsulatedWriter::new(&mut buf);
            w.write_raw_item(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
            w.write_fragment(&jpeg(16, 1)).unwrap();
            w.write_fragment(&jpeg(16, 2)).unwrap();
            w.finish().unwrap();
        }
        let mut p = open(buf, 2, JPEG_BASELINE_1);
        assert!(p.offset_table().is_none());
        assert_eq!(
            p.anomalies(),
            &[Anomaly::MalformedOffsetTable { declared: 7, expected: 8 }]
        );
        assert_eq!(p.first_fragment_of(1).unwrap().offset, 16);
    }

    #[test]
    fn bad_terminator_is_recorded() {
        let mut buf = Vec::new();
        {
            let mut w = EncapsulatedWriter::new(&mut buf);
            w.write_offset_table(&[]).unwrap();
            w.write_fragment(&[1, 2, 3, 4]).unwrap();
        }
        ElementHeader::new(Tag::ITEM_DELIMITATION, 0).write(&mut buf).unwrap();
        let mut p = open(buf, 1, "");
        assert_eq!(p.number_of_fragments().unwrap(), 1);
        assert_eq!(
            p.anomalies(),
            &[Anomaly::UnexpectedTerminator { tag: Tag::ITEM_DELIMITATION, length: 0 }]
        );
    }

    #[test]
    fn truncated_stream_fails_once() {
        let mut buf = encapsulate_frames(&[vec![vec![1u8; 8]], vec![vec![2u8; 8]]], false);
        buf.truncate(buf.len() - 20);
        let mut p = open(buf, 2, RLE_LOSSLESS);
        assert!(matches!(p.discover_next(), Err(FragmentError::Io(_))));
        assert!(p.is_complete());
        assert!(matches!(p.discover_next(), Ok(None)));
        assert!(matches!(p.anomalies(), [Anomaly::Io { .. }]));
    }

    #[test]
    fn fragmented_frame_has_no_single_extent() {
        let frames = vec![vec![jpeg(10, 1), vec![2u8; 6]], vec![jpeg(4, 3)]];
        let mut p = open(encapsulate_frames(&frames, false), 2, JPEG_BASELINE_1);
        assert!(matches!(
            p.frame_extent_in_stream(0),
            Err(FragmentError::FragmentedFrame { frame: 0, fragments: 2 })
        ));
        let segs = p.frame_segments(0).unwrap();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].start_pos, segs[0].start_pos + 10 + ITEM_HEADER_SIZE);

        let extent = p.frame_extent_in_stream(1).unwrap();
        assert_eq!(extent.length, 4);
    }

    #[test]
    fn seek_footer_reads_delimiter() {
        let frames = vec![vec![vec![1u8; 8]]];
        let mut p = open(encapsulate_frames(&frames, false), 1, "");
        let footer = p.seek_footer().unwrap();
        assert!(footer.is_sequence_delimiter());
        // Table item, one 8-byte fragment, delimiter.
        assert_eq!(p.into_inner().position(), 32);
    }

    #[test]
    fn empty_sequence() {
        let mut buf = Vec::new();
        {
            let mut w = EncapsulatedWriter::new(&mut buf);
            w.write_offset_table(&[]).unwrap();
            w.finish().unwrap();
        }
        let mut p = open(buf, 1, "");
        assert!(p.is_complete());
        assert_eq!(p.number_of_fragments().unwrap(), 0);
        assert!(p.seek_footer().unwrap().is_sequence_delimiter());
        assert!(matches!(p.first_fragment_of(0), Err(FragmentError::FrameNotFound { .. })));
    }
}
