use std::path::Path;

use focal_image::{ImageSize, Rgba8Image};

use crate::error::IoError;

/// Properties of a decoded image as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Bits per pixel of the stored color type, e.g. 24 for an RGB bitmap.
    pub bit_depth: u16,
}

/// Decodes an in-memory image into an RGBA image.
///
/// The format is guessed from the data; any format enabled in the image crate is
/// accepted (BMP, PNG, JPEG). Images without alpha are made fully opaque.
///
/// # Arguments
///
/// * `bytes` - The encoded image data.
///
/// # Returns
///
/// The decoded image and the properties of the stored image.
pub fn decode_image_rgba8(bytes: &[u8]) -> Result<(Rgba8Image, ImageInfo), IoError> {
    let img = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    let info = ImageInfo {
        width: img.width() as usize,
        height: img.height() as usize,
        bit_depth: img.color().bits_per_pixel(),
    };

    let size = ImageSize {
        width: info.width,
        height: info.height,
    };
    let image = Rgba8Image::new(size, img.into_rgba8().into_raw())?;

    Ok((image, info))
}

/// Reads an image from the given file path into an RGBA image.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Example
///
/// ```no_run
/// use focal_io::functional as F;
///
/// let image = F::read_image_rgba8("photo.bmp").unwrap();
/// assert_eq!(image.num_channels(), 4);
/// ```
pub fn read_image_rgba8(file_path: impl AsRef<Path>) -> Result<Rgba8Image, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    let bytes = std::fs::read(&file_path)?;
    let (image, info) = decode_image_rgba8(&bytes)?;

    log::debug!(
        "read {} ({}x{}, {} bits per pixel)",
        file_path.display(),
        info.width,
        info.height,
        info.bit_depth
    );

    Ok(image)
}

/// Writes an RGBA image to the given file path as PNG.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG image.
/// * `image` - The image to write.
pub fn write_image_png_rgba8(
    file_path: impl AsRef<Path>,
    image: &Rgba8Image,
) -> Result<(), IoError> {
    let [width, height]: [u32; 2] = image.size().into();
    image::save_buffer_with_format(
        file_path.as_ref(),
        image.as_slice(),
        width,
        height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    Ok(())
}
