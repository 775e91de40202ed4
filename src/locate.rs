//! Finding the fragment sequence inside a whole DICOM file.
//!
//! This is a byte-pattern scan for an undefined-length Pixel Data header, not
//! a data-set decoder.  Both header forms are recognised:
//!
//! ```text
//! explicit VR   E0 7F 10 00  'O' 'B'|'W'  00 00  FF FF FF FF
//! implicit VR   E0 7F 10 00  FF FF FF FF
//! ```
//!
//! The *last* match wins, so icon images nested earlier in the data set are
//! passed over.

use std::io::{self, Read, Seek, SeekFrom};
use tracing::debug;

use crate::tag::{Tag, UNDEFINED_LENGTH};

const SCAN_CHUNK: usize = 64 * 1024;

const EXPLICIT_HEADER_SIZE: usize = 12;
const IMPLICIT_HEADER_SIZE: usize = 8;

/// Bytes carried between chunks so a header split across reads is still seen.
const OVERLAP: usize = EXPLICIT_HEADER_SIZE - 1;

fn pixel_data_tag_bytes() -> [u8; 4] {
    let mut out = [0u8; 4];
    out[0..2].copy_from_slice(&Tag::PIXEL_DATA.group().to_le_bytes());
    out[2..4].copy_from_slice(&Tag::PIXEL_DATA.element().to_le_bytes());
    out
}

/// Length of the Pixel Data header starting at `w[0]`, if there is one.
fn header_at(w: &[u8], tag: &[u8; 4]) -> Option<usize> {
    let undefined = UNDEFINED_LENGTH.to_le_bytes();
    if w.len() < IMPLICIT_HEADER_SIZE || w[0..4] != tag[..] {
        return None;
    }
    if w.len() >= EXPLICIT_HEADER_SIZE
        && w[4] == b'O'
        && (w[5] == b'B' || w[5] == b'W')
        && w[6..8] == [0, 0]
        && w[8..12] == undefined
    {
        return Some(EXPLICIT_HEADER_SIZE);
    }
    if w[4..8] == undefined {
        return Some(IMPLICIT_HEADER_SIZE);
    }
    None
}

/// End index of the last Pixel Data header in `window`.
fn last_header_end(window: &[u8], tag: &[u8; 4]) -> Option<usize> {
    (0..window.len())
        .rev()
        .find_map(|i| header_at(&window[i..], tag).map(|len| i + len))
}

/// Scan `reader` from the start and return the position just past the last
/// undefined-length Pixel Data header, i.e. where the Basic Offset Table item
/// begins.  `Ok(None)` when no such header exists.
pub fn find_encapsulated_pixel_data<R: Read + Seek>(reader: &mut R) -> io::Result<Option<u64>> {
    scan(reader, SCAN_CHUNK)
}

fn scan<R: Read + Seek>(reader: &mut R, chunk: usize) -> io::Result<Option<u64>> {
    let tag = pixel_data_tag_bytes();
    reader.seek(SeekFrom::Start(0))?;

    let mut buf     = vec![0u8; chunk + OVERLAP];
    let mut carried = 0usize;
    let mut base    = 0u64;
    let mut found   = None;

    loop {
        let n = match reader.read(&mut buf[carried..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let filled = carried + n;
        if let Some(end) = last_header_end(&buf[..filled], &tag) {
            found = Some(base + end as u64);
        }
        let keep = filled.min(OVERLAP);
        buf.copy_within(filled - keep..filled, 0);
        base += (filled - keep) as u64;
        carried = keep;
    }

    if let Some(pos) = found {
        debug!(pos, "found encapsulated Pixel Data");
    }
    Ok(found)
}
