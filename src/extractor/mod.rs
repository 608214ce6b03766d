pub mod dimensions;
pub mod record_extractor;

pub use dimensions::{DimensionError, DimensionReader, ImageHeaderReader};
pub use record_extractor::{
    format_timestamp, Extractor, ImageRecord, FAILURE_NOTE, TIMESTAMP_FORMAT,
};
