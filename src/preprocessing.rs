use image::{
    imageops::{self, FilterType},
    DynamicImage, ImageError, ImageReader,
};
use ndarray::{Array, Ix4};
use std::io::Cursor;

/// Side length, in pixels, of the square input the classifier was trained on.
pub const INPUT_SIZE: u32 = 60;
pub const CHANNELS: usize = 3;

/// Decodes an uploaded file, guessing the format from its leading bytes.
pub fn decode_image(image_data: &[u8]) -> Result<DynamicImage, ImageError> {
    let image_reader = ImageReader::new(Cursor::new(image_data)).with_guessed_format()?;
    image_reader.decode()
}

/// Builds the `[1, 60, 60, 3]` channels-last tensor the network expects.
///
/// The image is squashed to 60x60 regardless of its aspect ratio, matching
/// how the training set was prepared, and every channel is scaled to `[0, 1]`.
pub fn to_input_tensor(image: &DynamicImage) -> Array<f32, Ix4> {
    let rgb = imageops::resize(
        &image.to_rgb8(),
        INPUT_SIZE,
        INPUT_SIZE,
        FilterType::CatmullRom,
    );

    let side = INPUT_SIZE as usize;
    let mut input = Array::zeros((1, side, side, CHANNELS));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for (c, value) in pixel.0.iter().enumerate() {
            input[[0, y, x, c]] = (*value as f32) / 255.;
        }
    }

    input
}

pub fn transform_image_bytes(image_data: &[u8]) -> Result<Array<f32, Ix4>, ImageError> {
    let image = decode_image(image_data)?;
    Ok(to_input_tensor(&image))
}
