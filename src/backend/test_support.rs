// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rendered text images for backend tests

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use super::{DecodedImage, UploadedImage};
use crate::vision::decode_image_bytes;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const SCALE: u32 = 8;
const MARGIN: u32 = 40;

/// 5x7 block glyphs, one row per string
fn glyph(c: char) -> [&'static str; 7] {
    match c {
        'G' => ["01110", "10001", "10000", "10111", "10001", "10001", "01111"],
        'I' => ["11111", "00100", "00100", "00100", "00100", "00100", "11111"],
        'K' => ["10001", "10010", "10100", "11000", "10100", "10010", "10001"],
        'L' => ["10000", "10000", "10000", "10000", "10000", "10000", "11111"],
        'N' => ["10001", "11001", "10101", "10011", "10001", "10001", "10001"],
        'O' => ["01110", "10001", "10001", "10001", "10001", "10001", "01110"],
        _ => ["00000"; 7],
    }
}

/// Black block letters on white, large enough for OCR engines to read
pub fn render_text(text: &str) -> DynamicImage {
    let advance = (GLYPH_WIDTH + 1) * SCALE;
    let width = MARGIN * 2 + advance * text.chars().count() as u32;
    let height = MARGIN * 2 + GLYPH_HEIGHT * SCALE;
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (i, c) in text.chars().enumerate() {
        let left = MARGIN + advance * i as u32;
        for (row, bits) in glyph(c).iter().enumerate() {
            for (col, bit) in bits.chars().enumerate() {
                if bit != '1' {
                    continue;
                }
                let x0 = left + col as u32 * SCALE;
                let y0 = MARGIN + row as u32 * SCALE;
                for y in y0..y0 + SCALE {
                    for x in x0..x0 + SCALE {
                        canvas.put_pixel(x, y, Rgb([0, 0, 0]));
                    }
                }
            }
        }
    }

    DynamicImage::ImageRgb8(canvas)
}

/// A rendered image that went through the normal PNG upload path
pub fn decoded_text_image(text: &str) -> DecodedImage {
    let mut png = Vec::new();
    render_text(text)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    let bytes = Bytes::from(png);
    let (image, info) = decode_image_bytes(&bytes).unwrap();

    DecodedImage {
        upload: UploadedImage {
            bytes,
            filename: None,
        },
        image,
        info,
    }
}
