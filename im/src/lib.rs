use {
    image::{codecs::png::PngEncoder, ColorType, ImageEncoder, ImageError},
    std::fmt,
};

pub use image::{Rgba, RgbaImage};

/// Decodes an image from bytes into the rgba format.
///
/// The format is guessed from the content, so a file extension is not needed.
///
/// # Errors
/// See [`Error`] for details.
pub fn decode(data: &[u8]) -> Result<RgbaImage, Error> {
    let im = image::load_from_memory(data)?;
    Ok(im.into_rgba8())
}

/// Encodes the rgba image in a png bytes buffer.
///
/// # Errors
/// See [`Error`] for details.
pub fn encode_png(im: &RgbaImage) -> Result<Vec<u8>, Error> {
    const DEFAULT_BUFFER_CAP: usize = 256;

    let mut buf = Vec::with_capacity(DEFAULT_BUFFER_CAP);
    let encoder = PngEncoder::new(&mut buf);
    let (width, height) = im.dimensions();
    encoder.write_image(im, width, height, ColorType::Rgba8)?;
    Ok(buf)
}

/// The image error.
#[derive(Debug)]
pub enum Error {
    /// The data is corrupt, has an unsupported format or can't be encoded.
    Image(ImageError),
}

impl From<ImageError> for Error {
    fn from(v: ImageError) -> Self {
        Self::Image(v)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Image(err) => write!(f, "image error: {err}"),
        }
    }
}
