use image::{GenericImageView, ImageFormat, ImageReader};
use std::fs;
use std::path::Path;

use crate::error::DecodeError;
use crate::viewport::Size;

// ---------------------------------------------------------------------------
// Decoded image data (CPU side, blitted straight into the softbuffer frame)
// ---------------------------------------------------------------------------

pub struct DecodedImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub format_name: String,
    /// Average colour at half intensity, painted behind the image.
    pub backdrop: [u8; 3],
}

impl DecodedImage {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format_name", &self.format_name)
            .finish_non_exhaustive()
    }
}

/// Decode `path` into RGBA8. The decoder is picked from the extension and
/// falls back to sniffing the header when the extension is unknown.
pub fn decode_image(path: &Path) -> Result<DecodedImage, DecodeError> {
    let file_size = fs::metadata(path)?.len();

    let mut reader = ImageReader::open(path)?;
    match ImageFormat::from_path(path) {
        Ok(format) => reader.set_format(format),
        Err(_) => reader = reader.with_guessed_format()?,
    }

    let format_name = reader
        .format()
        .map(|f| format!("{:?}", f).to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let img = reader.decode()?;
    let (width, height) = img.dimensions();
    let rgba_bytes = img.to_rgba8().into_raw();
    let [r, g, b] = average_rgb(&rgba_bytes);

    log::debug!(
        "Decoded {:?}: {}x{} {} ({} bytes on disk)",
        path,
        width,
        height,
        format_name,
        file_size
    );

    Ok(DecodedImage {
        rgba_bytes,
        width,
        height,
        file_size,
        format_name,
        backdrop: [r / 2, g / 2, b / 2],
    })
}

/// Mean colour over an RGBA8 buffer, ignoring alpha.
pub fn average_rgb(rgba: &[u8]) -> [u8; 3] {
    let pixels = (rgba.len() / 4) as u64;
    if pixels == 0 {
        return [0, 0, 0];
    }
    let mut sum = [0u64; 3];
    for px in rgba.chunks_exact(4) {
        sum[0] += px[0] as u64;
        sum[1] += px[1] as u64;
        sum[2] += px[2] as u64;
    }
    [
        (sum[0] / pixels) as u8,
        (sum[1] / pixels) as u8,
        (sum[2] / pixels) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn decodes_png_and_halves_backdrop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbaImage::from_pixel(4, 2, Rgba([200, 100, 50, 255]))
            .save(&path)
            .unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.size(), Size::new(4, 2));
        assert_eq!(decoded.rgba_bytes.len(), 4 * 2 * 4);
        assert_eq!(decoded.format_name, "PNG");
        assert_eq!(decoded.backdrop, [100, 50, 25]);
        assert!(decoded.file_size > 0);
    }

    #[test]
    fn unknown_extension_sniffs_header() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("pixel.png");
        RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]))
            .save(&png)
            .unwrap();
        let renamed = dir.path().join("pixel.dat");
        fs::rename(&png, &renamed).unwrap();

        let decoded = decode_image(&renamed).unwrap();
        assert_eq!((decoded.width, decoded.height), (1, 1));
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(decode_image(&path), Err(DecodeError::Image(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_image(&dir.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn average_of_empty_buffer_is_black() {
        assert_eq!(average_rgb(&[]), [0, 0, 0]);
        assert_eq!(average_rgb(&[10, 20, 30, 255, 30, 40, 50, 0]), [20, 30, 40]);
    }
}
