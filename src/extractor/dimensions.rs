use image::ImageReader;
use std::path::Path;
use thiserror::Error;

/// Why a single file could not be measured. Never escapes the extractor.
#[derive(Error, Debug)]
pub enum DimensionError {
    #[error("cannot open file: {0}")]
    Open(#[source] std::io::Error),

    #[error("cannot decode image header: {0}")]
    Decode(#[from] image::ImageError),

    #[error("cannot read file metadata: {0}")]
    Metadata(#[source] std::io::Error),
}

/// Reports the pixel width and height of an image file.
///
/// Implementations must release every handle they open before returning, on
/// the error path as well as on success.
pub trait DimensionReader: Send + Sync {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), DimensionError>;
}

/// Reads dimensions with the `image` crate, touching only the file header.
///
/// The format is sniffed from the leading bytes, falling back to the file
/// extension when the signature is not recognised. The file is opened
/// read-only, so other readers are not locked out.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageHeaderReader;

impl DimensionReader for ImageHeaderReader {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), DimensionError> {
        let reader = ImageReader::open(path)
            .map_err(DimensionError::Open)?
            .with_guessed_format()
            .map_err(DimensionError::Open)?;

        Ok(reader.into_dimensions()?)
    }
}
