use std::fmt;
use std::io;
use thiserror::Error;

use crate::tag::Tag;

/// Failures surfaced to callers of the fragment index.
#[derive(Error, Debug)]
pub enum FragmentError {
    /// Discovery ended before the requested frame's first fragment was seen.
    #[error("Could not detect first item of frame #{} ({found} frame(s) found)", ordinal(.frame))]
    FrameNotFound { frame: u32, found: usize },
    #[error("Short read for frame #{}: expected {expected} bytes, got {read}", ordinal(.frame))]
    ShortRead { frame: u32, expected: u64, read: u64 },
    /// A single contiguous range was requested for a frame whose fragments
    /// are separated by item headers in the stream.
    #[error("Frame #{} spans {fragments} fragments and has no contiguous extent", ordinal(.frame))]
    FragmentedFrame { frame: u32, fragments: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FragmentError>;

/// 1-based frame number for messages.
fn ordinal(frame: &u32) -> u64 {
    u64::from(*frame) + 1
}

impl From<FragmentError> for io::Error {
    fn from(e: FragmentError) -> Self {
        match e {
            FragmentError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

/// Structural problems that were recovered from locally.
///
/// These never abort parsing; they are logged when they happen and kept on
/// the parser for later inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// Basic Offset Table length does not match `4 * frames`; table skipped.
    MalformedOffsetTable { declared: u32, expected: u64 },
    /// Something other than `(FFFE,E0DD) #0` ended the fragment sequence.
    UnexpectedTerminator { tag: Tag, length: u32 },
    /// A read or seek failed during discovery; discovery stopped there.
    Io { message: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MalformedOffsetTable { declared, expected } => write!(
                f,
                "skipped Basic Offset Table with illegal length {declared} (expected {expected})"
            ),
            Anomaly::UnexpectedTerminator { tag, length } => {
                write!(f, "expected (FFFE,E0DD) #0 but read {tag} #{length}")
            }
            Anomaly::Io { message } => write!(f, "i/o error reading next item: {message}"),
        }
    }
}
