//! Magic-byte sniffing for JPEG and JPEG 2000 payloads.
//!
//! Two different questions are asked of fragment bytes:
//!
//! * [`is_image_signature`]: does a small window *contain* a JPEG or JPEG 2000
//!   signature?  Used once, on the Basic Offset Table slot, to detect writers
//!   that put a whole image where the table belongs.
//! * [`is_frame_start`]: do the first two payload bytes carry an SOI (`FFD8`)
//!   or SOC (`FF4F`) marker?  Used per fragment to find frame boundaries.

use std::io::{self, Read, Seek, SeekFrom};

/// Bytes inspected by [`sniff_image_signature`].
pub const SNIFF_WINDOW: usize = 10;

/// JPEG SOI followed by the first byte of the next marker.
pub const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// JP2 signature box (`jP  \r\n`).
pub const JP2_MAGIC: [u8; 10] = [0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A];

/// Raw JPEG 2000 codestream: SOC followed by SIZ.
pub const J2K_MAGIC: [u8; 4] = [0xFF, 0x4F, 0xFF, 0x51];

const SOI: [u8; 2] = [0xFF, 0xD8];
const SOC: [u8; 2] = [0xFF, 0x4F];

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn is_jpeg_magic(window: &[u8]) -> bool {
    contains(window, &JPEG_MAGIC)
}

pub fn is_jpeg2000_magic(window: &[u8]) -> bool {
    contains(window, &JP2_MAGIC) || contains(window, &J2K_MAGIC)
}

/// True when `window` contains any JPEG-family signature.
pub fn is_image_signature(window: &[u8]) -> bool {
    is_jpeg_magic(window) || is_jpeg2000_magic(window)
}

/// True when the two leading bytes are a JPEG SOI or a JPEG 2000 SOC marker.
pub fn is_frame_start(lead: &[u8]) -> bool {
    lead.len() >= 2 && (lead[..2] == SOI || lead[..2] == SOC)
}

/// Read up to `n` bytes and restore the stream position.
///
/// Hitting the end of the stream is not an error; the returned buffer is
/// simply shorter than `n`.
pub fn peek<R: Read + Seek>(reader: &mut R, n: usize) -> io::Result<Vec<u8>> {
    let mark = reader.stream_position()?;
    let mut buf = vec![0u8; n];
    let mut filled = 0;
    while filled < n {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(k) => filled += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                reader.seek(SeekFrom::Start(mark))?;
                return Err(e);
            }
        }
    }
    buf.truncate(filled);
    reader.seek(SeekFrom::Start(mark))?;
    Ok(buf)
}

/// Non-consuming check of the next [`SNIFF_WINDOW`] bytes.
pub fn sniff_image_signature<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    Ok(is_image_signature(&peek(reader, SNIFF_WINDOW)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn jpeg_signature_anywhere_in_window() {
        assert!(is_image_signature(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]));
        assert!(is_image_signature(&[0x00, 0x00, 0xFF, 0xD8, 0xFF, 0xDB]));
        assert!(!is_image_signature(&[0xFF, 0xD8]));
        assert!(!is_image_signature(&[]));
    }

    #[test]
    fn jpeg2000_signatures() {
        assert!(is_jpeg2000_magic(&JP2_MAGIC));
        assert!(is_jpeg2000_magic(&[0xFF, 0x4F, 0xFF, 0x51, 0x00, 0x2F]));
        assert!(!is_jpeg2000_magic(&JP2_MAGIC[..9]));
    }

    #[test]
    fn frame_start_markers() {
        assert!(is_frame_start(&[0xFF, 0xD8, 0x00]));
        assert!(is_frame_start(&[0xFF, 0x4F]));
        assert!(!is_frame_start(&[0xFF, 0xD9]));
        assert!(!is_frame_start(&[0xFF]));
    }

    #[test]
    fn peek_restores_position() {
        let mut cur = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        cur.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(peek(&mut cur, 2).unwrap(), vec![3, 4]);
        assert_eq!(cur.position(), 2);
        assert_eq!(peek(&mut cur, 10).unwrap(), vec![3, 4, 5]);
        assert_eq!(cur.position(), 2);
    }

    #[test]
    fn sniff_short_stream() {
        let mut cur = Cursor::new(vec![0xFF, 0xD8, 0xFF]);
        assert!(sniff_image_signature(&mut cur).unwrap());
        assert_eq!(cur.position(), 0);
    }
}
