//! Image-to-tensor conversion for model input

use crate::error::DetectError;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Resize an image to the model input size and convert it to a
/// normalized NCHW float tensor in RGB channel order.
pub fn image_to_chw_tensor(
    img: &DynamicImage,
    target_width: u32,
    target_height: u32,
) -> Result<Array4<f32>, DetectError> {
    if target_width == 0 || target_height == 0 {
        return Err(DetectError::Config(
            "Target dimensions cannot be zero".to_string(),
        ));
    }

    let total = target_width
        .checked_mul(target_height)
        .and_then(|p| p.checked_mul(3))
        .ok_or_else(|| {
            DetectError::Config("Target dimensions too large, would overflow".to_string())
        })?;
    if total > 100_000_000 {
        return Err(DetectError::Config(
            "Target dimensions too large (max 100M pixels)".to_string(),
        ));
    }

    let resized = img
        .resize_exact(target_width, target_height, FilterType::Triangle)
        .to_rgb8();

    let (w, h) = (target_width as usize, target_height as usize);
    let mut tensor = Array4::<f32>::zeros((1, 3, h, w));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = pixel[0] as f32 / 255.0;
        tensor[[0, 1, y, x]] = pixel[1] as f32 / 255.0;
        tensor[[0, 2, y, x]] = pixel[2] as f32 / 255.0;
    }

    Ok(tensor)
}
