pub mod error;
pub mod item;
pub mod locate;
pub mod offset_table;
pub mod options;
pub mod parser;
pub mod sniff;
pub mod tag;
pub mod transfer_syntax;
pub mod writer;

pub use error::{Anomaly, FragmentError, Result};
pub use item::{FragmentExtent, Item};
pub use offset_table::BasicOffsetTable;
pub use options::ParseOptions;
pub use parser::{FrameExtent, ItemParser, SegmentMapper, SegmentedReader, StreamSegment};
pub use transfer_syntax::FragmentCodec;
pub use writer::{encapsulate_frames, EncapsulatedWriter};
