// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Exact pixel-equality verification.
//!
//! Confirms that a compressed image decodes to the same pixels as its
//! source. The comparison is exact: no tolerance, no colour-space
//! conversion. Channels are compared as straight (non-premultiplied) RGBA at
//! 16-bit depth so both 8-bit and 16-bit sources compare without loss.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader};

use crate::error::VerifyError;

/// Outcome of comparing two decoded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Same bounds and every pixel equal.
    Identical,
    /// Bounds differ; pixels were not compared.
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },
    /// First differing pixel in row-major order.
    PixelMismatch {
        x: u32,
        y: u32,
        left: [u16; 4],
        right: [u16; 4],
    },
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identical => write!(f, "images are identical"),
            Self::DimensionMismatch { left, right } => write!(
                f,
                "images have different bounds: {}x{} != {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Self::PixelMismatch { x, y, left, right } => write!(
                f,
                "pixel at ({}, {}) is different: rgba{:?} != rgba{:?}",
                x, y, left, right
            ),
        }
    }
}

/// Decode an image file, naming the path in any error.
pub fn decode_file(path: &Path) -> Result<DynamicImage, VerifyError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| VerifyError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    reader.decode().map_err(|source| VerifyError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode an in-memory image. `label` names it in any error.
pub fn decode_bytes(bytes: &[u8], label: &Path) -> Result<DynamicImage, VerifyError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|source| VerifyError::Open {
            path: label.to_path_buf(),
            source,
        })?;

    reader.decode().map_err(|source| VerifyError::Decode {
        path: label.to_path_buf(),
        source,
    })
}

/// Decode both files and compare them pixel by pixel.
pub fn compare_files(left: &Path, right: &Path) -> Result<Comparison, VerifyError> {
    let a = decode_file(left)?;
    let b = decode_file(right)?;
    Ok(compare_images(&a, &b))
}

/// Compare two decoded images.
pub fn compare_images(left: &DynamicImage, right: &DynamicImage) -> Comparison {
    let left_bounds = left.dimensions();
    let right_bounds = right.dimensions();
    if left_bounds != right_bounds {
        return Comparison::DimensionMismatch {
            left: left_bounds,
            right: right_bounds,
        };
    }

    let a = left.to_rgba16();
    let b = right.to_rgba16();

    // enumerate_pixels walks rows top to bottom, left to right.
    for ((x, y, pa), (_, _, pb)) in a.enumerate_pixels().zip(b.enumerate_pixels()) {
        if pa.0 != pb.0 {
            return Comparison::PixelMismatch {
                x,
                y,
                left: pa.0,
                right: pb.0,
            };
        }
    }

    Comparison::Identical
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255])
        })
    }

    #[test]
    fn test_identical_images() {
        let img = DynamicImage::ImageRgba8(gradient(8, 8));
        assert_eq!(compare_images(&img, &img), Comparison::Identical);
    }

    #[test]
    fn test_dimension_mismatch_is_not_error() {
        let a = solid(4, 4, [0, 0, 0, 255]);
        let b = solid(4, 5, [0, 0, 0, 255]);
        assert_eq!(
            compare_images(&a, &b),
            Comparison::DimensionMismatch {
                left: (4, 4),
                right: (4, 5)
            }
        );
    }

    #[test]
    fn test_single_channel_difference_reports_coordinate() {
        let a = gradient(4, 4);
        let mut b = a.clone();
        let mut p = *b.get_pixel(2, 3);
        p.0[3] = 254;
        b.put_pixel(2, 3, p);

        let result = compare_images(
            &DynamicImage::ImageRgba8(a.clone()),
            &DynamicImage::ImageRgba8(b),
        );
        match result {
            Comparison::PixelMismatch { x, y, left, right } => {
                assert_eq!((x, y), (2, 3));
                assert_eq!(left[3], 0xFFFF);
                assert_eq!(right[3], 254 * 257);
                assert_eq!(left[..3], right[..3]);
            }
            other => panic!("expected pixel mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_first_mismatch_in_raster_order() {
        let a = gradient(4, 4);
        let mut b = a.clone();
        // (3, 0) comes before (0, 1) in row-major order.
        b.put_pixel(0, 1, Rgba([1, 1, 1, 1]));
        b.put_pixel(3, 0, Rgba([2, 2, 2, 2]));

        let result = compare_images(&DynamicImage::ImageRgba8(a), &DynamicImage::ImageRgba8(b));
        assert!(matches!(result, Comparison::PixelMismatch { x: 3, y: 0, .. }));
    }

    #[test]
    fn test_fully_transparent_pixels_with_different_color_differ() {
        let a = solid(1, 1, [10, 20, 30, 0]);
        let b = solid(1, 1, [0, 0, 0, 0]);
        assert!(!compare_images(&a, &b).is_identical());
    }

    #[test]
    fn test_rgb8_and_rgba8_with_opaque_alpha_are_equal() {
        let rgba = gradient(4, 4);
        let rgb = DynamicImage::ImageRgba8(rgba.clone()).to_rgb8();
        let result = compare_images(&DynamicImage::ImageRgba8(rgba), &DynamicImage::ImageRgb8(rgb));
        assert_eq!(result, Comparison::Identical);
    }

    #[test]
    fn test_sixteen_bit_precision_preserved() {
        let a: ImageBuffer<Rgba<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Rgba([1000, 0, 0, 65535]));
        let b: ImageBuffer<Rgba<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Rgba([1001, 0, 0, 65535]));
        let result = compare_images(&DynamicImage::ImageRgba16(a), &DynamicImage::ImageRgba16(b));
        assert!(matches!(result, Comparison::PixelMismatch { x: 0, y: 0, .. }));
    }

    #[test]
    fn test_compare_files_roundtrip_png() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        gradient(6, 6).save_with_format(&a, ImageFormat::Png).unwrap();
        gradient(6, 6).save_with_format(&b, ImageFormat::Png).unwrap();

        assert_eq!(compare_files(&a, &a).unwrap(), Comparison::Identical);
        assert_eq!(compare_files(&a, &b).unwrap(), Comparison::Identical);
    }

    #[test]
    fn test_compare_files_names_undecodable_path() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        gradient(2, 2).save_with_format(&good, ImageFormat::Png).unwrap();
        std::fs::write(&bad, b"definitely not a png").unwrap();

        match compare_files(&good, &bad) {
            Err(VerifyError::Decode { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_compare_files_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(matches!(
            compare_files(&missing, &missing),
            Err(VerifyError::Open { .. })
        ));
    }

    #[test]
    fn test_display_messages() {
        let msg = Comparison::PixelMismatch {
            x: 2,
            y: 3,
            left: [0, 0, 0, 0],
            right: [1, 0, 0, 0],
        }
        .to_string();
        assert!(msg.contains("(2, 3)"));
        assert!(Comparison::DimensionMismatch {
            left: (1, 2),
            right: (3, 4)
        }
        .to_string()
        .contains("1x2 != 3x4"));
    }
}
