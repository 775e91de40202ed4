//! Transfer-syntax classification for frame-boundary detection.
//!
//! Only the *category* of a transfer syntax matters to the fragment index:
//!
//! | Category     | Boundary rule                                           |
//! |--------------|---------------------------------------------------------|
//! | `RunLength`  | every fragment starts a new frame                       |
//! | `JpegFamily` | offset table if present, else SOI/SOC marker sniffing   |
//! | `Video`      | the whole stream is one frame                           |
//! | `Other`      | offset table if present, else the first fragment only   |

use serde::{Deserialize, Serialize};

// ── Known UIDs ──────────────────────────────────────────────────────────────

pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";

pub const JPEG_BASELINE_1:                  &str = "1.2.840.10008.1.2.4.50";
pub const JPEG_EXTENDED_2_4:                &str = "1.2.840.10008.1.2.4.51";
pub const JPEG_LOSSLESS_SV1:                &str = "1.2.840.10008.1.2.4.70";
pub const JPEG_LS_LOSSLESS:                 &str = "1.2.840.10008.1.2.4.80";
pub const JPEG_LS_NEAR_LOSSLESS:            &str = "1.2.840.10008.1.2.4.81";
pub const JPEG_2000_LOSSLESS:               &str = "1.2.840.10008.1.2.4.90";
pub const JPEG_2000:                        &str = "1.2.840.10008.1.2.4.91";
pub const HTJ2K_LOSSLESS:                   &str = "1.2.840.10008.1.2.4.201";

pub const MPEG2_MAIN_PROFILE:               &str = "1.2.840.10008.1.2.4.100";
pub const MPEG4_AVC_H264_HIGH_PROFILE_4_1:  &str = "1.2.840.10008.1.2.4.102";

pub const EXPLICIT_VR_LITTLE_ENDIAN:        &str = "1.2.840.10008.1.2.1";

/// JPEG, JPEG-LS and JPEG 2000 syntaxes; each frame starts with SOI or SOC.
const JPEG_FAMILY: &[&str] = &[
    "1.2.840.10008.1.2.4.50",
    "1.2.840.10008.1.2.4.51",
    "1.2.840.10008.1.2.4.52",
    "1.2.840.10008.1.2.4.53",
    "1.2.840.10008.1.2.4.54",
    "1.2.840.10008.1.2.4.55",
    "1.2.840.10008.1.2.4.56",
    "1.2.840.10008.1.2.4.57",
    "1.2.840.10008.1.2.4.58",
    "1.2.840.10008.1.2.4.59",
    "1.2.840.10008.1.2.4.60",
    "1.2.840.10008.1.2.4.61",
    "1.2.840.10008.1.2.4.62",
    "1.2.840.10008.1.2.4.63",
    "1.2.840.10008.1.2.4.64",
    "1.2.840.10008.1.2.4.65",
    "1.2.840.10008.1.2.4.66",
    "1.2.840.10008.1.2.4.70",
    "1.2.840.10008.1.2.4.80",
    "1.2.840.10008.1.2.4.81",
    "1.2.840.10008.1.2.4.90",
    "1.2.840.10008.1.2.4.91",
    "1.2.840.10008.1.2.4.92",
    "1.2.840.10008.1.2.4.93",
    "1.2.840.10008.1.2.4.201",
    "1.2.840.10008.1.2.4.202",
    "1.2.840.10008.1.2.4.203",
];

/// MPEG-2, MPEG-4 AVC and HEVC syntaxes.
const VIDEO: &[&str] = &[
    "1.2.840.10008.1.2.4.100",
    "1.2.840.10008.1.2.4.101",
    "1.2.840.10008.1.2.4.102",
    "1.2.840.10008.1.2.4.103",
    "1.2.840.10008.1.2.4.104",
    "1.2.840.10008.1.2.4.105",
    "1.2.840.10008.1.2.4.106",
    "1.2.840.10008.1.2.4.107",
    "1.2.840.10008.1.2.4.108",
];

// ── FragmentCodec ────────────────────────────────────────────────────────────

/// Closed set of frame-boundary policies, selected by transfer syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentCodec {
    RunLength,
    JpegFamily,
    Video,
    Other,
}

impl FragmentCodec {
    /// Classify a transfer syntax UID.  Trailing NUL padding and whitespace
    /// (as stored in even-length UI values) are ignored.
    pub fn from_uid(uid: &str) -> Self {
        let uid = uid.trim_end_matches(['\0', ' ']).trim();
        if uid == RLE_LOSSLESS {
            FragmentCodec::RunLength
        } else if JPEG_FAMILY.contains(&uid) {
            FragmentCodec::JpegFamily
        } else if VIDEO.contains(&uid) {
            FragmentCodec::Video
        } else {
            FragmentCodec::Other
        }
    }

    /// Human-readable name (for diagnostics only, never parsed).
    pub fn name(self) -> &'static str {
        match self {
            FragmentCodec::RunLength  => "run-length",
            FragmentCodec::JpegFamily => "jpeg-family",
            FragmentCodec::Video      => "video",
            FragmentCodec::Other      => "other",
        }
    }

    /// Every fragment is the first fragment of a frame.
    #[inline]
    pub fn one_fragment_per_frame(self) -> bool {
        self == FragmentCodec::RunLength
    }

    /// Frame starts can be recognised by an SOI/SOC marker.
    #[inline]
    pub fn sniffs_markers(self) -> bool {
        self == FragmentCodec::JpegFamily
    }

    /// Frame count to index with, given the declared Number of Frames.
    /// Video payloads have no per-frame fragment boundaries, so they are
    /// always indexed as a single frame.
    #[inline]
    pub fn effective_frames(self, declared: u32) -> u32 {
        match self {
            FragmentCodec::Video => 1,
            _                    => declared,
        }
    }
}

impl Default for FragmentCodec {
    fn default() -> Self {
        FragmentCodec::Other
    }
}
