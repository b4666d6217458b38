//! Test fixtures: images generated in memory.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8, 255])
    }))
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode png");
    buffer
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height).to_rgb8())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .expect("encode jpeg");
    buffer
}
