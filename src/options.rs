use serde::{Deserialize, Serialize};

use crate::transfer_syntax::FragmentCodec;

/// Construction inputs for [`ItemParser`](crate::parser::ItemParser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Declared Number of Frames `(0028,0008)`; 1 when the attribute is absent.
    pub number_of_frames: u32,
    /// Transfer Syntax UID of the data set.
    pub transfer_syntax:  String,
}

impl ParseOptions {
    pub fn new(number_of_frames: u32, transfer_syntax: impl Into<String>) -> Self {
        Self { number_of_frames, transfer_syntax: transfer_syntax.into() }
    }

    pub fn codec(&self) -> FragmentCodec {
        FragmentCodec::from_uid(&self.transfer_syntax)
    }

    /// Frame count after the video single-frame override.
    pub fn effective_frames(&self) -> u32 {
        self.codec().effective_frames(self.number_of_frames)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            number_of_frames: 1,
            transfer_syntax:  String::new(),
        }
    }
}
