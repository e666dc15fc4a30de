pub mod detector;
pub mod extractor;
pub mod fetch;
pub mod queue;
pub mod runner;
pub mod status;

use base64::Engine;
use image::RgbImage;

/// PNG-encode an image and base64 it for a JSON request body to a model
/// serving endpoint.
pub(crate) fn encode_image_base64(image: &RgbImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buf))
}
